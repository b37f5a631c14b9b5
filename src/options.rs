use std::path::PathBuf;

#[derive(Debug, clap::Parser)]
#[clap(name = "gix-protect-paths", about = "Reject pushes and merges changing protected paths", version = clap::crate_version!())]
#[clap(subcommand_required = true, arg_required_else_help = true)]
pub struct Args {
    /// The git directory of the repository, like `.git` or the path of a bare repository.
    #[clap(long, env = "GIT_DIR", default_value = ".")]
    pub git_dir: PathBuf,

    /// Read `protectPaths.*` settings from this file instead of `<git-dir>/config`.
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// The user performing the push or merge. Defaults to `$USER`.
    #[clap(long, env = "PROTECT_PATHS_USER")]
    pub user: Option<String>,

    /// Determine the format to use when outputting results.
    #[clap(long, short = 'f', default_value = "human", value_enum)]
    pub format: OutputFormat,

    /// Log what is evaluated and why.
    #[clap(long, short = 'v')]
    pub verbose: bool,

    #[clap(subcommand)]
    pub cmd: Subcommands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

#[derive(Debug, clap::Subcommand)]
pub enum Subcommands {
    /// Run as git `pre-receive` hook, reading `<old> <new> <ref>` lines from stdin.
    PreReceive,
    /// Decide if merging a commit into a ref is allowed.
    MergeCheck {
        /// The ref merged into, like `refs/heads/main`.
        #[clap(long)]
        target_ref: String,
        /// The commit the target ref points to.
        #[clap(long)]
        target_commit: String,
        /// The commit to merge.
        #[clap(long)]
        source_commit: String,
    },
    /// Validate the `protectPaths.*` settings.
    CheckConfig,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{CommandFactory, Parser};

    #[test]
    fn definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn merge_check_takes_all_three_ends() {
        let args = Args::try_parse_from([
            "gix-protect-paths",
            "--git-dir",
            "repo.git",
            "--format",
            "json",
            "merge-check",
            "--target-ref",
            "refs/heads/main",
            "--target-commit",
            "a",
            "--source-commit",
            "b",
        ])
        .unwrap();
        assert_eq!(args.git_dir, PathBuf::from("repo.git"));
        assert_eq!(args.format, OutputFormat::Json);
        assert!(matches!(args.cmd, Subcommands::MergeCheck { ref target_ref, .. } if target_ref == "refs/heads/main"));
        assert!(Args::try_parse_from(["gix-protect-paths", "merge-check", "--target-ref", "x"]).is_err());
    }
}
