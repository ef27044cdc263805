use pose::{
    COCO_KEYPOINT_COUNT, COCO_TO_LANDMARK, CocoKeypoint, Keypoint, Keypoints, LANDMARK_COUNT,
    Landmark, SKELETON,
};

#[test]
fn test_all_is_in_slot_order() {
    assert_eq!(Landmark::ALL.len(), LANDMARK_COUNT);
    for (index, landmark) in Landmark::ALL.iter().enumerate() {
        assert_eq!(landmark.index(), index);
        assert_eq!(Landmark::try_from(index), Ok(*landmark));
    }
}

#[test]
fn test_try_from_out_of_range() {
    let err = Landmark::try_from(33).unwrap_err();
    assert!(err.contains("33"));
}

#[test]
fn test_names_round_trip() {
    assert_eq!(Landmark::from_name("left_hip"), Some(Landmark::LeftHip));
    assert_eq!(Landmark::from_name("right_foot_index"), Some(Landmark::RightFootIndex));
    assert_eq!(Landmark::LeftKnee.to_string(), "left_knee");
    for landmark in Landmark::ALL {
        assert_eq!(Landmark::from_name(landmark.name()), Some(landmark));
    }
}

#[test]
fn test_from_name_unknown() {
    assert_eq!(Landmark::from_name("left_tail"), None);
    assert_eq!(Landmark::from_name("LEFT_HIP"), None);
}

#[test]
fn test_coco_mapping_table() {
    let expected = [0, 2, 5, 7, 8, 11, 12, 13, 14, 15, 16, 23, 24, 25, 26, 27, 28];
    let actual: Vec<usize> = COCO_TO_LANDMARK.iter().map(|l| l.index()).collect();
    assert_eq!(actual, expected);
}

#[test]
fn test_coco_keypoint_landmark() {
    assert_eq!(CocoKeypoint::LeftKnee.landmark(), Landmark::LeftKnee);
    assert_eq!(CocoKeypoint::RightEye.landmark(), Landmark::RightEye);
    assert_eq!(CocoKeypoint::try_from(16), Ok(CocoKeypoint::RightAnkle));
    assert!(CocoKeypoint::try_from(COCO_KEYPOINT_COUNT).is_err());
}

#[test]
fn test_skeleton_edges_are_valid() {
    for (a, b) in SKELETON {
        assert_ne!(a, b);
    }
    assert!(SKELETON.contains(&(Landmark::LeftKnee, Landmark::LeftAnkle)));
    assert!(SKELETON.contains(&(Landmark::LeftShoulder, Landmark::RightShoulder)));
}

#[test]
fn test_missing_keypoints() {
    let keypoints = Keypoints::missing();
    assert_eq!(keypoints.as_slice().len(), LANDMARK_COUNT);
    assert!(keypoints.as_slice().iter().all(|kp| *kp == Keypoint::MISSING));
    assert!(!keypoints.any_visible());
    assert_eq!(Keypoint::MISSING.position.x, 0.0);
    assert_eq!(Keypoint::MISSING.visibility, 0.0);
}

#[test]
fn test_keypoints_set_and_triplet() {
    let mut keypoints = Keypoints::missing();
    keypoints.set(Landmark::LeftHip, Keypoint::new(0.4, 0.5, 0.9));
    keypoints[Landmark::LeftKnee] = Keypoint::new(0.4, 0.7, 0.8);

    let [hip, knee, ankle] =
        keypoints.triplet([Landmark::LeftHip, Landmark::LeftKnee, Landmark::LeftAnkle]);
    assert_eq!(hip.visibility, 0.9);
    assert_eq!(knee.position.y, 0.7);
    assert_eq!(ankle, Keypoint::MISSING);
    assert_eq!(keypoints[23].visibility, 0.9);
    assert!(keypoints.any_visible());

    let visible: Vec<Landmark> = keypoints
        .iter()
        .filter(|(_, kp)| !kp.is_missing())
        .map(|(landmark, _)| landmark)
        .collect();
    assert_eq!(visible, vec![Landmark::LeftHip, Landmark::LeftKnee]);
}
