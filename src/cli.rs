use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "skein")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Plan and apply declarative project configuration", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file (defaults to ~/.config/skein/config.toml)
    #[arg(long, global = true, env = "SKEIN_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Check project files for configuration errors
    Validate(ValidateArgs),

    /// Show what apply would change
    Plan(FileArgs),

    /// Apply a project and record its state
    Apply(ApplyArgs),

    /// Print the request document for a project
    Show(FileArgs),

    /// Inspect or delete stored state
    #[command(subcommand)]
    State(StateCommand),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args)]
pub struct ValidateArgs {
    /// Project files or directories containing them
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Number of files to validate in parallel
    #[arg(short, long)]
    pub jobs: Option<usize>,
}

#[derive(Args)]
pub struct FileArgs {
    /// Project file (.json or .toml)
    pub file: PathBuf,
}

#[derive(Args)]
pub struct ApplyArgs {
    /// Project file (.json or .toml)
    pub file: PathBuf,

    /// Show the plan without sending anything
    #[arg(long)]
    pub dry_run: bool,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Subcommand)]
pub enum StateCommand {
    /// List projects with stored state
    List,

    /// Print a project's stored response document
    Show {
        /// Project name
        project: String,
    },

    /// Forget a project's stored state
    Rm {
        /// Project name
        project: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_apply() {
        let cli = Cli::parse_from(["skein", "-vv", "apply", "shop.toml", "--yes"]);
        assert_eq!(cli.verbose, 2);
        let Command::Apply(args) = cli.command else {
            panic!("expected apply");
        };
        assert!(args.yes);
        assert!(!args.dry_run);
        assert_eq!(args.file, PathBuf::from("shop.toml"));
    }

    #[test]
    fn test_validate_requires_paths() {
        assert!(Cli::try_parse_from(["skein", "validate"]).is_err());
    }
}
