use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands::{
    check_command, debug_command, docgen_command, init_command, run_command, targets_command,
};

#[derive(Parser, Debug)]
#[command(name = "emurunner")]
#[command(version, about, long_about = None)]
#[command(after_help = "ENVIRONMENT:\n    RUST_LOG=debug    Enable debug logging")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a main file and run it in the emulator
    #[command(visible_alias = "r")]
    Run {
        /// Main source file, as given to the builder (e.g., src/main.adb)
        main: String,

        /// Wait for the emulator instead of handing it an interactive console
        #[arg(long)]
        no_console: bool,

        /// Print the commands without executing them
        #[arg(short, long)]
        dry_run: bool,
    },
    /// Build a main file, start it frozen in the emulator and attach gdb
    #[command(visible_alias = "d")]
    Debug {
        /// Main source file, as given to the builder (e.g., src/main.adb)
        main: String,

        /// Print the commands without executing them
        #[arg(short, long)]
        dry_run: bool,
    },
    /// Report whether the emulator for the current project is installed
    Check,
    /// List the emulator targets and whether they are enabled
    #[command(visible_alias = "t")]
    Targets {
        /// Print the targets as JSON
        #[arg(long)]
        json: bool,
    },
    /// Initialize emurunner configuration
    Init {
        /// Specify the current working directory
        #[arg(short, long)]
        cwd: Option<String>,

        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
    /// Generate a reStructuredText reference page from a symbol inventory
    Docgen {
        /// JSON inventory of the documented module
        inventory: PathBuf,

        /// Directory receiving `<module>.rst`
        #[arg(short, long, default_value = "generated")]
        out_dir: PathBuf,
    },
}

impl Commands {
    /// Execute the command
    pub async fn execute(self) -> Result<()> {
        match self {
            Commands::Run {
                main,
                no_console,
                dry_run,
            } => run_command(&main, !no_console, dry_run).await,
            Commands::Debug { main, dry_run } => debug_command(&main, dry_run).await,
            Commands::Check => check_command(),
            Commands::Targets { json } => targets_command(json),
            Commands::Init { cwd, force } => init_command(cwd.as_deref(), force),
            Commands::Docgen { inventory, out_dir } => docgen_command(&inventory, &out_dir),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_flags() {
        let cli = Cli::try_parse_from(["emurunner", "run", "prog.adb", "--no-console", "-d"]).unwrap();
        match cli.command {
            Commands::Run {
                main,
                no_console,
                dry_run,
            } => {
                assert_eq!(main, "prog.adb");
                assert!(no_console);
                assert!(dry_run);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_aliases_and_defaults() {
        let cli = Cli::try_parse_from(["emurunner", "d", "prog.adb"]).unwrap();
        assert!(matches!(cli.command, Commands::Debug { dry_run: false, .. }));

        let cli = Cli::try_parse_from(["emurunner", "docgen", "gps.json"]).unwrap();
        match cli.command {
            Commands::Docgen { out_dir, .. } => assert_eq!(out_dir, PathBuf::from("generated")),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_run_requires_main() {
        assert!(Cli::try_parse_from(["emurunner", "run"]).is_err());
    }
}
