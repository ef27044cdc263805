use {
    exercise::{Color, ExerciseRecord, FeedbackRecord, Registry, RegistryError},
    pose::Landmark,
    std::fs,
};

fn record(id: u32, down_max: f32, up_min: f32) -> ExerciseRecord {
    ExerciseRecord {
        id,
        name: format!("Exercise {id}"),
        joints: [
            "left_shoulder".to_string(),
            "left_elbow".to_string(),
            "left_wrist".to_string(),
        ],
        down_max,
        up_min,
        tip: String::new(),
        feedback: vec![FeedbackRecord {
            angle_min: 0.0,
            angle_max: 180.0,
            message: "ok".to_string(),
            color: "#22c55e".to_string(),
        }],
    }
}

fn invalid_id(result: Result<Registry, RegistryError>) -> u32 {
    match result {
        Err(RegistryError::InvalidExerciseDefinition { id, .. }) => id,
        other => panic!("expected InvalidExerciseDefinition, got {other:?}"),
    }
}

#[test]
fn test_builtin_catalog() {
    let registry = Registry::builtin().unwrap();
    assert_eq!(registry.len(), 9);
    assert_eq!(registry.ids().collect::<Vec<_>>(), (0..9).collect::<Vec<_>>());

    let names: Vec<&str> = registry.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "Squat",
            "Bicep Curl",
            "Push-up",
            "Lateral Raise",
            "Overhead Press",
            "Tricep Extension",
            "Front Raise",
            "Lunge",
            "Shoulder Tap"
        ]
    );

    let squat = registry.require(0).unwrap();
    assert_eq!(
        squat.joints,
        [Landmark::LeftHip, Landmark::LeftKnee, Landmark::LeftAnkle]
    );
    assert_eq!(squat.vertex(), Landmark::LeftKnee);
    assert_eq!((squat.down_max, squat.up_min), (100.0, 160.0));
    assert_eq!(squat.tip, "Keep your back straight and knees over toes.");
    assert_eq!(squat.feedback.len(), 3);
    assert_eq!(squat.feedback[1].color, Color::rgb(0xf5, 0x9e, 0x0b));

    let press = registry.require(4).unwrap();
    assert_eq!(
        press.joints,
        [Landmark::LeftElbow, Landmark::LeftShoulder, Landmark::LeftHip]
    );
    assert_eq!(registry.first().map(|e| e.id), Some(0));
}

#[test]
fn test_builtin_feedback_covers_angle_domain() {
    let registry = Registry::builtin().unwrap();
    for exercise in registry.iter() {
        for angle in (0..=180).map(|a| a as f32) {
            assert!(
                exercise.feedback_for(angle).is_some(),
                "{} has no feedback at {angle}",
                exercise.name
            );
        }
    }
}

#[test]
fn test_rejects_down_max_not_below_up_min() {
    let records = vec![record(0, 60.0, 140.0), record(1, 150.0, 150.0), record(2, 50.0, 90.0)];
    assert_eq!(invalid_id(Registry::load(records)), 1);
    assert_eq!(invalid_id(Registry::load(vec![record(3, 160.0, 100.0)])), 3);
}

#[test]
fn test_rejects_duplicate_id() {
    let records = vec![record(0, 60.0, 140.0), record(1, 60.0, 140.0), record(0, 90.0, 160.0)];
    match Registry::load(records) {
        Err(RegistryError::InvalidExerciseDefinition { id, reason }) => {
            assert_eq!(id, 0);
            assert!(reason.contains("duplicate"));
        }
        other => panic!("expected duplicate rejection, got {other:?}"),
    }
}

#[test]
fn test_rejects_thresholds_outside_domain() {
    assert_eq!(invalid_id(Registry::load(vec![record(4, -5.0, 140.0)])), 4);
    assert_eq!(invalid_id(Registry::load(vec![record(5, 60.0, 181.0)])), 5);
    assert_eq!(invalid_id(Registry::load(vec![record(6, f32::NAN, 140.0)])), 6);
}

#[test]
fn test_rejects_bad_joints() {
    let mut unknown = record(7, 60.0, 140.0);
    unknown.joints[1] = "left_tentacle".to_string();
    assert_eq!(invalid_id(Registry::load(vec![unknown])), 7);

    let mut repeated = record(8, 60.0, 140.0);
    repeated.joints[2] = "left_shoulder".to_string();
    assert_eq!(invalid_id(Registry::load(vec![repeated])), 8);
}

#[test]
fn test_rejects_bad_feedback_rules() {
    let mut out_of_range = record(9, 60.0, 140.0);
    out_of_range.feedback[0].angle_max = 200.0;
    assert_eq!(invalid_id(Registry::load(vec![out_of_range])), 9);

    let mut inverted = record(10, 60.0, 140.0);
    inverted.feedback[0].angle_min = 120.0;
    inverted.feedback[0].angle_max = 90.0;
    assert_eq!(invalid_id(Registry::load(vec![inverted])), 10);

    let mut bad_color = record(11, 60.0, 140.0);
    bad_color.feedback[0].color = "green".to_string();
    assert_eq!(invalid_id(Registry::load(vec![bad_color])), 11);
}

#[test]
fn test_rule_gaps_are_allowed() {
    let mut sparse = record(12, 60.0, 140.0);
    sparse.feedback[0].angle_max = 30.0;
    let registry = Registry::load(vec![sparse]).unwrap();
    assert!(registry.require(12).unwrap().feedback_for(90.0).is_none());
}

#[test]
fn test_empty_catalog_is_rejected() {
    assert!(matches!(
        Registry::load(Vec::new()),
        Err(RegistryError::Catalog(_))
    ));
}

#[test]
fn test_get_and_require() {
    let registry = Registry::load(vec![record(3, 60.0, 140.0), record(1, 60.0, 140.0)]).unwrap();
    assert!(registry.get(3).is_some());
    assert!(registry.get(2).is_none());
    assert_eq!(
        registry.require(2).unwrap_err(),
        RegistryError::UnknownExercise(2)
    );
    // listing is in id order regardless of catalog order
    assert_eq!(registry.ids().collect::<Vec<_>>(), vec![1, 3]);
}

#[test]
fn test_from_json() {
    let json = r##"[
        {
            "id": 42,
            "name": "Wall Sit",
            "joints": ["right_hip", "right_knee", "right_ankle"],
            "down_max": 95,
            "up_min": 150,
            "feedback": [
                { "angle_min": 0, "angle_max": 180, "message": "hold", "color": "#AABBCC" }
            ]
        }
    ]"##;
    let registry = Registry::from_json(json).unwrap();
    let wall_sit = registry.require(42).unwrap();
    assert_eq!(wall_sit.tip, "");
    assert_eq!(wall_sit.vertex(), Landmark::RightKnee);
    assert_eq!(wall_sit.feedback[0].color, Color::rgb(0xaa, 0xbb, 0xcc));
}

#[test]
fn test_from_json_malformed() {
    assert!(matches!(
        Registry::from_json("{ not json"),
        Err(RegistryError::Catalog(_))
    ));
    assert!(matches!(
        Registry::from_json(r#"[{"id": 1, "name": "x"}]"#),
        Err(RegistryError::Catalog(_))
    ));
}

#[test]
fn test_from_file() {
    let dir = std::env::temp_dir().join(format!("repcoach-catalog-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("exercises.json");
    let records = vec![record(5, 60.0, 140.0)];
    fs::write(&path, serde_json::to_string(&records).unwrap()).unwrap();

    let registry = Registry::from_file(&path).unwrap();
    assert_eq!(registry.len(), 1);

    assert!(matches!(
        Registry::from_file(dir.join("missing.json")),
        Err(RegistryError::Catalog(_))
    ));
    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_color_parsing() {
    let color: Color = "#ef4444".parse().unwrap();
    assert_eq!(color, Color::WARNING);
    assert_eq!(color.to_string(), "#ef4444");
    assert_eq!(color.to_argb(), 0xFFEF4444);
    assert!("ef4444".parse::<Color>().is_err());
    assert!("#ef44".parse::<Color>().is_err());
    assert!("#gg4444".parse::<Color>().is_err());
}

#[test]
fn test_error_display() {
    let err = RegistryError::InvalidExerciseDefinition {
        id: 3,
        reason: "duplicate id".to_string(),
    };
    assert_eq!(err.to_string(), "invalid exercise definition 3: duplicate id");
    assert_eq!(
        RegistryError::UnknownExercise(9).to_string(),
        "unknown exercise id 9"
    );
}
