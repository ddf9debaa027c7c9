//! Main entry point for the rootmotion-rs CLI

mod cli;
mod commands;

use anyhow::{Result, bail};
use clap::CommandFactory;
use clap::Parser;
use clap_complete::{Generator, generate};
use std::io;

use crate::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logger; RUST_LOG still overrides the verbosity flags
    env_logger::Builder::new()
        .filter_level(log_level(cli.verbose, cli.quiet))
        .parse_default_env()
        .init();

    // Execute command
    match cli.command {
        Some(Commands::Convert { src, dst, args }) => {
            commands::convert::execute(&src, &dst, &args, cli.quiet)
        }
        Some(Commands::Batch {
            src_dir,
            dst_dir,
            pattern,
            args,
        }) => commands::batch::execute(&src_dir, &dst_dir, &pattern, &args, cli.quiet),
        Some(Commands::Info { file, detailed }) => commands::info::execute(&file, detailed),
        Some(Commands::Completions { shell }) => {
            print_completions(shell, &mut Cli::command());
            Ok(())
        }
        None => {
            // Without a subcommand the last two paths are source and destination
            let [.., src, dst] = cli.paths.as_slice() else {
                bail!("Expected a source and a destination path (see --help)");
            };
            commands::convert::execute(src, dst, &cli.convert, cli.quiet)
        }
    }
}

fn log_level(verbose: u8, quiet: bool) -> log::LevelFilter {
    match (verbose, quiet) {
        (0, true) => log::LevelFilter::Error,
        (0, false) => log::LevelFilter::Warn,
        (1, _) => log::LevelFilter::Info,
        (2, _) => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    }
}

fn print_completions<G: Generator>(generator: G, cmd: &mut clap::Command) {
    generate(
        generator,
        cmd,
        cmd.get_name().to_string(),
        &mut io::stdout(),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level() {
        assert_eq!(log_level(0, false), log::LevelFilter::Warn);
        assert_eq!(log_level(0, true), log::LevelFilter::Error);
        assert_eq!(log_level(1, false), log::LevelFilter::Info);
        assert_eq!(log_level(2, true), log::LevelFilter::Debug);
        assert_eq!(log_level(5, false), log::LevelFilter::Trace);
    }
}
