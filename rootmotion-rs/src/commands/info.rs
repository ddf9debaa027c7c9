//! Rig document inspection

use anyhow::{Context, Result};
use console::style;
use std::path::Path;

use rig_cli_utils::{
    add_table_row, create_table, format_bytes, format_frames, format_rotation, format_vec3, heading,
};
use rig_motion::{HIP_CANDIDATES, Scene, load_scene};

pub fn execute(path: &Path, detailed: bool) -> Result<()> {
    let scene = load_scene(path).with_context(|| format!("Failed to load {}", path.display()))?;

    println!("{}", heading("Rig Document Information"));
    println!();
    println!("{}: {}", style("File").bold(), path.display());
    if let Ok(metadata) = std::fs::metadata(path) {
        println!("{}: {}", style("Size").bold(), format_bytes(metadata.len()));
    }
    println!();

    print_armature(&scene, detailed);
    print_clips(&scene);
    print_meshes(&scene);
    Ok(())
}

fn print_armature(scene: &Scene, detailed: bool) {
    let Some(armature) = &scene.armature else {
        println!("{}: none", style("Armature").bold());
        println!();
        return;
    };
    let skeleton = &armature.skeleton;

    println!("{}: {}", style("Armature").bold(), armature.name);
    println!("  Joints: {}", skeleton.len());
    let hip = HIP_CANDIDATES
        .iter()
        .find(|name| skeleton.contains(name))
        .map_or("not found", |name| *name);
    println!("  Hip: {hip}");
    println!("  Location: {}", format_vec3(armature.transform.translation));
    println!("  Rotation: {}", format_rotation(armature.transform.rotation));
    println!("  Scale: {}", format_vec3(armature.transform.scale));
    println!(
        "  Active clip: {}",
        armature.clip.as_deref().unwrap_or("none")
    );
    println!();

    if detailed && !skeleton.is_empty() {
        let mut table = create_table(&["#", "Joint", "Parent", "Rest head"]);
        for (index, joint) in skeleton.joints().iter().enumerate() {
            let parent = joint
                .parent
                .and_then(|p| skeleton.joint(p))
                .map_or_else(|| "-".to_string(), |p| p.name.clone());
            let head = skeleton
                .rest_head(index)
                .map_or_else(|| "-".to_string(), format_vec3);
            add_table_row(
                &mut table,
                vec![index.to_string(), joint.name.clone(), parent, head],
            );
        }
        table.printstd();
        println!();
    }
}

fn print_clips(scene: &Scene) {
    println!("{}: {}", style("Clips").bold(), scene.clips.len());
    if scene.clips.is_empty() {
        return;
    }
    let mut table = create_table(&["Clip", "Frames", "Animated joints", "Object motion"]);
    for clip in &scene.clips {
        add_table_row(
            &mut table,
            vec![
                clip.name.clone(),
                format_frames(clip.range.start, clip.range.end),
                clip.joints.len().to_string(),
                if clip.object.is_empty() { "no" } else { "yes" }.to_string(),
            ],
        );
    }
    table.printstd();
    println!();
}

fn print_meshes(scene: &Scene) {
    println!("{}: {}", style("Meshes").bold(), scene.meshes.len());
    if scene.meshes.is_empty() {
        return;
    }
    let mut table = create_table(&["Mesh", "Vertices", "Shape channels", "Materials", "Bound to"]);
    for mesh in &scene.meshes {
        let bound = mesh
            .skin
            .as_ref()
            .map_or_else(|| "-".to_string(), |skin| skin.armature.clone());
        add_table_row(
            &mut table,
            vec![
                mesh.name.clone(),
                mesh.vertices.len().to_string(),
                mesh.shape_channels.len().to_string(),
                mesh.materials.join(", "),
                bound,
            ],
        );
    }
    table.printstd();
}
