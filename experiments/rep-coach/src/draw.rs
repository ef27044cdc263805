use {
    exercise::{Color, Phase},
    pose::{Keypoint, Keypoints, Landmark, SKELETON},
    trainer::Snapshot,
};

pub const BONE_COLOR: [u8; 3] = [200, 200, 200];
pub const JOINT_COLOR: [u8; 3] = [180, 220, 0];
pub const TRACK_COLOR: [u8; 3] = [0x1e, 0x29, 0x3b];

const JOINT_RADIUS: i32 = 4;
const HIGHLIGHT_RADIUS: i32 = 7;
const STRIP_HEIGHT: usize = 8;
const BAR_HEIGHT: usize = 6;
const TALLY_SIZE: usize = 10;
const TALLY_GAP: usize = 4;

pub fn rgb(color: Color) -> [u8; 3] {
    [color.r, color.g, color.b]
}

/// Pixel position of a normalized keypoint.
pub fn to_pixel(keypoint: &Keypoint, width: usize, height: usize) -> (i32, i32) {
    (
        (keypoint.position.x * width as f32).round() as i32,
        (keypoint.position.y * height as f32).round() as i32,
    )
}

/// Draw a line using Bresenham's algorithm, clipped to the buffer
pub fn draw_line(
    buf: &mut [u8],
    width: usize,
    height: usize,
    mut x0: i32,
    mut y0: i32,
    mut x1: i32,
    mut y1: i32,
    color: [u8; 3],
) {
    // Cohen-Sutherland
    loop {
        let outcode0 = outcode(x0, y0, width as i32, height as i32);
        let outcode1 = outcode(x1, y1, width as i32, height as i32);
        if (outcode0 | outcode1) == 0 {
            break;
        }
        if (outcode0 & outcode1) != 0 {
            return;
        }
        let out = if outcode0 != 0 { outcode0 } else { outcode1 };
        let (x, y) = clip_point(x0, y0, x1, y1, out, width as i32, height as i32);
        if out == outcode0 {
            (x0, y0) = (x, y);
        } else {
            (x1, y1) = (x, y);
        }
    }

    let dx = (x1 - x0).abs();
    let dy = (y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx - dy;
    loop {
        set_pixel(buf, width, x0 as usize, y0 as usize, color);
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x0 += sx;
        }
        if e2 < dx {
            err += dx;
            y0 += sy;
        }
    }
}

/// Draw a filled circle, clipped to the buffer
pub fn draw_filled_circle(
    buf: &mut [u8],
    width: usize,
    height: usize,
    cx: i32,
    cy: i32,
    radius: i32,
    color: [u8; 3],
) {
    let r2 = radius * radius;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let (x, y) = (cx + dx, cy + dy);
            if dx * dx + dy * dy <= r2 && x >= 0 && x < width as i32 && y >= 0 && y < height as i32
            {
                set_pixel(buf, width, x as usize, y as usize, color);
            }
        }
    }
}

/// Fill an axis-aligned rectangle, clipped to the buffer
pub fn fill_rect(
    buf: &mut [u8],
    width: usize,
    height: usize,
    x: usize,
    y: usize,
    w: usize,
    h: usize,
    color: [u8; 3],
) {
    for py in y..(y + h).min(height) {
        for px in x..(x + w).min(width) {
            set_pixel(buf, width, px, py, color);
        }
    }
}

/// Bones and joints whose visibility reaches `threshold`.
pub fn draw_skeleton(
    buf: &mut [u8],
    width: usize,
    height: usize,
    keypoints: &Keypoints,
    threshold: f32,
) {
    for (a, b) in SKELETON {
        let (pa, pb) = (keypoints[a], keypoints[b]);
        if pa.visibility >= threshold && pb.visibility >= threshold {
            let (x0, y0) = to_pixel(&pa, width, height);
            let (x1, y1) = to_pixel(&pb, width, height);
            draw_line(buf, width, height, x0, y0, x1, y1, BONE_COLOR);
        }
    }
    for (_, keypoint) in keypoints.iter() {
        if keypoint.visibility >= threshold {
            let (x, y) = to_pixel(keypoint, width, height);
            draw_filled_circle(buf, width, height, x, y, JOINT_RADIUS, JOINT_COLOR);
        }
    }
}

/// Emphasize the measured joint triplet in the feedback colour.
pub fn draw_joints(
    buf: &mut [u8],
    width: usize,
    height: usize,
    keypoints: &Keypoints,
    joints: [Landmark; 3],
    threshold: f32,
    color: [u8; 3],
) {
    let [a, vertex, c] = keypoints.triplet(joints);
    if [a, vertex, c].iter().any(|k| k.visibility < threshold) {
        return;
    }
    let (ax, ay) = to_pixel(&a, width, height);
    let (vx, vy) = to_pixel(&vertex, width, height);
    let (cx, cy) = to_pixel(&c, width, height);
    for offset in -1..=1 {
        draw_line(buf, width, height, ax + offset, ay, vx + offset, vy, color);
        draw_line(buf, width, height, vx + offset, vy, cx + offset, cy, color);
    }
    draw_filled_circle(buf, width, height, vx, vy, HIGHLIGHT_RADIUS, color);
}

/// Green below a third of the range, amber below two thirds, red above.
pub fn gauge_color(angle: f32) -> [u8; 3] {
    let fraction = angle / 180.0;
    if fraction < 0.33 {
        [0x22, 0xc5, 0x5e]
    } else if fraction < 0.66 {
        [0xf5, 0x9e, 0x0b]
    } else {
        [0xef, 0x44, 0x44]
    }
}

/// Feedback strip along the top, angle bar along the bottom, phase and tally in the corner.
pub fn draw_status(
    buf: &mut [u8],
    width: usize,
    height: usize,
    feedback: [u8; 3],
    angle: Option<f32>,
    phase: Phase,
    reps: u32,
) {
    fill_rect(buf, width, height, 0, 0, width, STRIP_HEIGHT, feedback);

    let bar_y = height.saturating_sub(BAR_HEIGHT);
    fill_rect(buf, width, height, 0, bar_y, width, BAR_HEIGHT, TRACK_COLOR);
    if let Some(angle) = angle {
        let filled = ((angle.clamp(0.0, 180.0) / 180.0) * width as f32) as usize;
        fill_rect(buf, width, height, 0, bar_y, filled, BAR_HEIGHT, gauge_color(angle));
    }

    // phase block: filled when down, hollow when up
    let top = STRIP_HEIGHT + TALLY_GAP;
    fill_rect(buf, width, height, TALLY_GAP, top, TALLY_SIZE * 2, TALLY_SIZE * 2, feedback);
    if phase == Phase::Up {
        fill_rect(
            buf,
            width,
            height,
            TALLY_GAP + 3,
            top + 3,
            TALLY_SIZE * 2 - 6,
            TALLY_SIZE * 2 - 6,
            TRACK_COLOR,
        );
    }

    // one mark per rep, wrapping onto further rows
    let left = TALLY_GAP * 2 + TALLY_SIZE * 2;
    let per_row = (width.saturating_sub(left) / (TALLY_SIZE + TALLY_GAP)).max(1);
    for rep in 0..reps as usize {
        let x = left + (rep % per_row) * (TALLY_SIZE + TALLY_GAP);
        let y = top + (rep / per_row) * (TALLY_SIZE + TALLY_GAP);
        fill_rect(buf, width, height, x, y, TALLY_SIZE, TALLY_SIZE, JOINT_COLOR);
    }
}

/// Convert HWC RGB buffer to packed 0x00RRGGBB for minifb
pub fn rgb_to_argb(buf: &[u8], width: usize, height: usize) -> Vec<u32> {
    buf.chunks_exact(3)
        .take(width * height)
        .map(|p| ((p[0] as u32) << 16) | ((p[1] as u32) << 8) | p[2] as u32)
        .collect()
}

fn set_pixel(buf: &mut [u8], width: usize, x: usize, y: usize, color: [u8; 3]) {
    let idx = (y * width + x) * 3;
    if let Some(pixel) = buf.get_mut(idx..idx + 3) {
        pixel.copy_from_slice(&color);
    }
}

const INSIDE: u8 = 0;
const LEFT: u8 = 1;
const RIGHT: u8 = 2;
const BOTTOM: u8 = 4;
const TOP: u8 = 8;

fn outcode(x: i32, y: i32, width: i32, height: i32) -> u8 {
    let mut code = INSIDE;
    if x < 0 {
        code |= LEFT;
    } else if x >= width {
        code |= RIGHT;
    }
    if y < 0 {
        code |= TOP;
    } else if y >= height {
        code |= BOTTOM;
    }
    code
}

fn clip_point(
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
    outcode: u8,
    width: i32,
    height: i32,
) -> (i32, i32) {
    let dx = x1 - x0;
    let dy = y1 - y0;
    if outcode & TOP != 0 {
        (x0 + dx * (0 - y0) / dy, 0)
    } else if outcode & BOTTOM != 0 {
        (x0 + dx * (height - 1 - y0) / dy, height - 1)
    } else if outcode & LEFT != 0 {
        (0, y0 + dy * (0 - x0) / dx)
    } else {
        (width - 1, y0 + dy * (width - 1 - x0) / dx)
    }
}

/// One-line summary for the window title.
pub fn status_line(snapshot: &Snapshot) -> String {
    let angle = match snapshot.angle {
        Some(angle) => format!("{:.0}°", angle),
        None => "--".to_string(),
    };
    let backend = match (snapshot.backend, snapshot.loading) {
        (_, Some(loading)) => format!("loading {}...", loading),
        (Some(active), None) => active.to_string(),
        (None, None) => "no backend".to_string(),
    };
    format!(
        "{} | reps {} | {} | {} | {} | {}",
        snapshot.exercise_name, snapshot.reps, snapshot.phase, angle, snapshot.message, backend
    )
}
