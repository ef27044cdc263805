use crate::Keypoint;

/// Interior angle at `vertex` in degrees, in `[0, 180]`, from the vectors
/// `vertex -> a` and `vertex -> c`.
///
/// Coincident points give `0.0` instead of NaN, so a zero reading can be
/// degenerate. Callers gate on visibility before trusting it.
pub fn angle_between(a: Keypoint, vertex: Keypoint, c: Keypoint) -> f32 {
    let to_a = a.position - vertex.position;
    let to_c = c.position - vertex.position;
    let norm = to_a.length() * to_c.length();
    if norm == 0.0 || !norm.is_finite() {
        return 0.0;
    }
    let cosine = (to_a.dot(to_c) / norm).clamp(-1.0, 1.0);
    let degrees = cosine.acos().to_degrees();
    if degrees.is_finite() { degrees } else { 0.0 }
}
