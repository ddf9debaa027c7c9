//! Single-document conversion

use anyhow::{Context, Result};
use console::style;
use std::path::Path;

use rig_cli_utils::{format_bytes, success, warning};
use rig_motion::{ConversionReport, convert_file};

use crate::cli::ConvertArgs;

pub fn execute(src: &Path, dst: &Path, args: &ConvertArgs, quiet: bool) -> Result<()> {
    let config = args.load_config()?;
    log::debug!("Conversion settings: {config:?}");

    let report = convert_file(src, dst, &config)
        .with_context(|| format!("Failed to convert {}", src.display()))?;

    if !quiet {
        print_report(dst, &report);
    }
    Ok(())
}

fn print_report(dst: &Path, report: &ConversionReport) {
    let motion = &report.root_motion;
    println!(
        "{}",
        success(&format!(
            "Moved {} frames of '{}' motion to the root",
            motion.frames, motion.hip
        ))
    );
    println!("  {}: {}", style("Output").bold(), dst.display());
    if let Ok(metadata) = std::fs::metadata(dst) {
        println!("  {}: {}", style("Size").bold(), format_bytes(metadata.len()));
    }

    if motion.bind_mesh_created {
        println!("  {}", warning("No mesh was bound to the armature, added a placeholder"));
    }
    if report.knee_fixed {
        println!("  Knee fix applied");
    }
    if report.removed_clips > 0 {
        println!("  Removed {} unused clips", report.removed_clips);
    }
    if report.facial_meshes > 0 {
        println!("  Facial poses baked into {} meshes", report.facial_meshes);
    }
    if report.eyelash_material_added {
        println!("  Added the eyelash material");
    }
}
