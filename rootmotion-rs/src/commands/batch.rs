//! Directory conversion

use anyhow::{Context, Result};
use indicatif::ProgressDrawTarget;
use std::path::Path;

use rig_cli_utils::{add_table_row, create_progress_bar, create_table, success, truncate_path, warning};
use rig_motion::batch_convert;
use rig_motion::pipeline::batch_inputs;

use crate::cli::ConvertArgs;

pub fn execute(
    src_dir: &Path,
    dst_dir: &Path,
    pattern: &str,
    args: &ConvertArgs,
    quiet: bool,
) -> Result<()> {
    let config = args.load_config()?;

    let total = batch_inputs(src_dir, pattern)
        .with_context(|| format!("Failed to list {}", src_dir.display()))?
        .len();
    if total == 0 {
        if !quiet {
            println!(
                "{}",
                warning(&format!(
                    "No rig documents matching '{pattern}' in {}",
                    src_dir.display()
                ))
            );
        }
        return Ok(());
    }

    let pb = create_progress_bar(total as u64, "Converting");
    if quiet {
        pb.set_draw_target(ProgressDrawTarget::hidden());
    }

    let mut table = create_table(&["File", "Hip", "Frames", "Facial meshes"]);
    let result = batch_convert(src_dir, dst_dir, pattern, &config, |input, report| {
        let name = input
            .file_name()
            .map_or_else(|| input.display().to_string(), |n| n.to_string_lossy().into_owned());
        pb.set_message(name.clone());
        pb.inc(1);
        add_table_row(
            &mut table,
            vec![
                truncate_path(&name, 40),
                report.root_motion.hip.clone(),
                report.root_motion.frames.to_string(),
                report.facial_meshes.to_string(),
            ],
        );
    });

    match result {
        Ok(count) => {
            pb.finish_and_clear();
            if !quiet {
                table.printstd();
                println!(
                    "{}",
                    success(&format!("Converted {count} files into {}", dst_dir.display()))
                );
            }
            Ok(())
        }
        Err(e) => {
            pb.abandon_with_message("failed");
            Err(e).with_context(|| format!("Batch conversion of {} stopped", src_dir.display()))
        }
    }
}
