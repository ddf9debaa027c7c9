//! Integration tests for file and batch conversion

use glam::{Quat, Vec3};
use rig_motion::animation::{AnimationClip, Curve, FrameRange, Keyframe};
use rig_motion::document::write_document;
use rig_motion::pipeline::{EYELASH_MATERIAL, batch_inputs};
use rig_motion::{
    Armature, ConversionConfig, ExportOptions, Joint, Mesh, RigError, Scene, ShapeChannel,
    Skeleton, SkinBinding, Transform, batch_convert, convert_file, load_scene, process_scene,
    save_scene,
};
use std::f32::consts::FRAC_PI_2;
use std::path::Path;
use tempfile::TempDir;

fn mixamo_scene(hip: &str) -> Scene {
    let up = |y: f32| Transform::from_translation(Vec3::new(0.0, y, 0.0));
    let skeleton = Skeleton::new(vec![
        Joint::new(
            hip,
            None,
            Transform::from_translation_rotation(
                Vec3::new(0.0, 0.0, 1.0),
                Quat::from_rotation_x(FRAC_PI_2),
            ),
        ),
        Joint::new("mixamorig:Spine", Some(0), up(0.1)),
        Joint::new("mixamorig:RightUpLeg", Some(0), Transform::from_translation(Vec3::new(-0.1, -0.05, 0.0))),
        Joint::new("mixamorig:RightLeg", Some(2), up(-0.45)),
        Joint::new("mixamorig:RightFoot", Some(3), up(-0.45)),
        Joint::new("mixamorig:LeftUpLeg", Some(0), Transform::from_translation(Vec3::new(0.1, -0.05, 0.0))),
        Joint::new("mixamorig:LeftLeg", Some(5), up(-0.45)),
        Joint::new("mixamorig:LeftFoot", Some(6), up(-0.45)),
    ])
    .unwrap();

    let mut clip = AnimationClip::new("mixamo.com", FrameRange::new(1, 24));
    clip.joint_channels_mut(hip).translation = Some(Curve::new(vec![
        Keyframe::new(1.0, Vec3::ZERO),
        Keyframe::new(24.0, Vec3::new(0.0, 0.0, -1.5)),
    ]));
    clip.joint_channels_mut("mixamorig:Spine").rotation =
        Some(Curve::constant(1.0, Quat::from_rotation_x(0.1)));

    let mut body = Mesh::new("Body");
    body.vertices = vec![Vec3::ZERO, Vec3::X, Vec3::Y];
    body.indices = vec![0, 1, 2];
    body.skin = Some(SkinBinding {
        armature: "Armature".to_string(),
        groups: vec![hip.to_string(), "mixamorig:Spine".to_string()],
        influences: vec![vec![(0, 1.0)], vec![(1, 1.0)], vec![(0, 0.5), (1, 0.5)]],
    });
    for name in ["Smile_Left", "Smile_Right", "MouthOpen"] {
        body.shape_channels
            .push(ShapeChannel::new(name, vec![Vec3::Z * 0.01; 3]));
    }

    Scene {
        armature: Some(Armature {
            name: "Armature".to_string(),
            transform: Transform::IDENTITY,
            skeleton,
            clip: Some("mixamo.com".to_string()),
        }),
        meshes: vec![body, Mesh::new("Eyelashes")],
        materials: Vec::new(),
        clips: vec![clip, AnimationClip::new("Unused", FrameRange::new(0, 1))],
    }
}

fn write_scene(dir: &Path, name: &str, scene: &Scene) {
    save_scene(scene, &dir.join(name), &ExportOptions::default()).unwrap();
}

fn joint_names(scene: &Scene) -> Vec<String> {
    scene
        .armature
        .as_ref()
        .unwrap()
        .skeleton
        .joints()
        .iter()
        .map(|j| j.name.clone())
        .collect()
}

#[test]
fn test_process_scene_with_defaults() {
    let mut scene = mixamo_scene("mixamorig:Hips");
    let report = process_scene(&mut scene, &ConversionConfig::default()).unwrap();

    assert_eq!(report.root_motion.hip, "Pelvis");
    assert_eq!(report.root_motion.frames, 24);
    assert!(!report.root_motion.bind_mesh_created);
    assert!(!report.knee_fixed);
    assert_eq!(report.removed_clips, 1);
    assert_eq!(report.facial_meshes, 1);
    assert!(report.eyelash_material_added);

    assert_eq!(
        joint_names(&scene),
        vec!["Pelvis", "spine_01", "thigh_r", "calf_r", "foot_r", "thigh_l", "calf_l", "foot_l"]
    );
    assert_eq!(scene.armature.as_ref().unwrap().name, "root");
    assert_eq!(scene.clips.len(), 1);

    let body = scene.mesh("Body").unwrap();
    assert!(body.is_bound_to("root"));
    assert_eq!(
        body.skin.as_ref().unwrap().groups,
        vec!["Pelvis".to_string(), "spine_01".to_string()]
    );
    assert!(body.shape_channel("AI").is_some());
    assert_eq!(body.shape_channel("AI").unwrap().mix_weight("MouthOpen"), 0.5);

    let eyelashes = scene.mesh("Eyelashes").unwrap();
    assert_eq!(eyelashes.materials, vec![EYELASH_MATERIAL.to_string()]);
}

#[test]
fn test_remove_namespace_takes_precedence() {
    let mut scene = mixamo_scene("mixamorig:Hips");
    let config = ConversionConfig {
        remove_namespace: true,
        use_target_bone_names: true,
        facial_rig: false,
        ..ConversionConfig::default()
    };

    let report = process_scene(&mut scene, &config).unwrap();

    assert_eq!(report.root_motion.hip, "Hips");
    assert_eq!(report.facial_meshes, 0);
    assert!(joint_names(&scene).contains(&"RightUpLeg".to_string()));
    assert!(scene.mesh("Body").unwrap().shape_channel("AI").is_none());
}

#[test]
fn test_knee_fix_uses_target_names() {
    let mut scene = mixamo_scene("mixamorig:Hips");
    let reference = {
        let mut plain = scene.clone();
        process_scene(&mut plain, &ConversionConfig::default()).unwrap();
        plain
    };
    let offset = Vec3::new(0.0, -0.02, 0.0);
    let config = ConversionConfig {
        knee_offset: offset,
        ..ConversionConfig::default()
    };

    let report = process_scene(&mut scene, &config).unwrap();
    assert!(report.knee_fixed);

    // foot_r and foot_l (tails of calf_r and calf_l) move, nothing else does
    let fixed = &scene.armature.as_ref().unwrap().skeleton;
    let plain = &reference.armature.as_ref().unwrap().skeleton;
    for index in 0..fixed.len() {
        let moved = fixed.rest_head(index).unwrap() - plain.rest_head(index).unwrap();
        let name = fixed.joint(index).unwrap().name.as_str();
        if name == "foot_r" || name == "foot_l" {
            assert!((moved - offset).length() < 1e-5, "{name}: {moved}");
        } else {
            assert!(moved.length() < 1e-5, "{name}: {moved}");
        }
    }
}

#[test]
fn test_knee_fix_with_unknown_joint_fails() {
    let mut scene = mixamo_scene("mixamorig:Hips");
    let config = ConversionConfig {
        knee_offset: Vec3::X,
        knee_bones: vec!["Knee".to_string()],
        ..ConversionConfig::default()
    };
    assert!(matches!(
        process_scene(&mut scene, &config),
        Err(RigError::MissingJoint(name)) if name == "Knee"
    ));
}

#[test]
fn test_convert_file_round_trip() {
    let dir = TempDir::new().unwrap();
    write_scene(dir.path(), "walk.yaml", &mixamo_scene("mixamorig:Hips"));
    let dst = dir.path().join("walk_root.json");
    let config = ConversionConfig {
        add_leaf_bones: true,
        ..ConversionConfig::default()
    };

    convert_file(&dir.path().join("walk.yaml"), &dst, &config).unwrap();

    let converted = load_scene(&dst).unwrap();
    let names = joint_names(&converted);
    assert!(names.contains(&"spine_01_end".to_string()));
    assert!(names.contains(&"foot_l_end".to_string()));
    assert!(!names.contains(&"Pelvis_end".to_string()));
    let clip = converted.active_clip().unwrap();
    assert!(clip.object.translation.is_some());
    assert!(clip.object.rotation.is_some());
}

#[test]
fn test_convert_file_rejects_unknown_extension() {
    let dir = TempDir::new().unwrap();
    write_scene(dir.path(), "walk.json", &mixamo_scene("mixamorig:Hips"));

    let result = convert_file(
        &dir.path().join("walk.json"),
        &dir.path().join("walk.fbx"),
        &ConversionConfig::default(),
    );
    assert!(matches!(result, Err(RigError::UnsupportedFormat(_))));
    assert!(!dir.path().join("walk.fbx").exists());
}

#[test]
fn test_batch_converts_sorted_matches() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();
    write_scene(src.path(), "b_run.yaml", &mixamo_scene("mixamorig:Hips"));
    write_scene(src.path(), "a_walk.json", &mixamo_scene("mixamorig:Hips"));
    std::fs::write(src.path().join("notes.txt"), "not a rig").unwrap();

    let mut seen = Vec::new();
    let count = batch_convert(
        src.path(),
        dst.path(),
        "*",
        &ConversionConfig::default(),
        |path, _| seen.push(path.file_name().unwrap().to_string_lossy().to_string()),
    )
    .unwrap();

    assert_eq!(count, 2);
    assert_eq!(seen, vec!["a_walk.json", "b_run.yaml"]);
    assert!(dst.path().join("a_walk.json").exists());
    assert!(dst.path().join("b_run.json").exists());
}

#[test]
fn test_batch_pattern_filters_inputs() {
    let src = TempDir::new().unwrap();
    write_scene(src.path(), "walk.json", &mixamo_scene("mixamorig:Hips"));
    write_scene(src.path(), "run.json", &mixamo_scene("mixamorig:Hips"));

    let inputs = batch_inputs(src.path(), "w*").unwrap();
    assert_eq!(inputs, vec![src.path().join("walk.json")]);
}

#[test]
fn test_batch_stops_at_first_failure() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();
    write_scene(src.path(), "1_walk.json", &mixamo_scene("mixamorig:Hips"));
    write_scene(src.path(), "2_broken.json", &mixamo_scene("mixamorig:Torso"));
    write_scene(src.path(), "3_run.json", &mixamo_scene("mixamorig:Hips"));

    let result = batch_convert(
        src.path(),
        dst.path(),
        "*.json",
        &ConversionConfig::default(),
        |_, _| {},
    );

    assert!(matches!(result, Err(RigError::MissingHipJoint { .. })));
    assert!(dst.path().join("1_walk.json").exists());
    assert!(!dst.path().join("2_broken.json").exists());
    assert!(!dst.path().join("3_run.json").exists());
}

#[test]
fn test_invalid_document_is_rejected() {
    let dir = TempDir::new().unwrap();
    let mut scene = mixamo_scene("mixamorig:Hips");
    scene.clips[0]
        .joint_channels_mut("mixamorig:Tail")
        .translation = Some(Curve::constant(0.0, Vec3::ZERO));
    let path = dir.path().join("tail.json");
    write_document(&scene, &path).unwrap();

    assert!(matches!(
        load_scene(&path),
        Err(RigError::InvalidClip { .. })
    ));
}
