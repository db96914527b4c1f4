//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--cwd <path>`: Run as if in that directory
//! - `--debug`: Enable debug logging
//! - `--interactive` / `--no-interactive`: Control prompts
//! - `--quiet` / `-q`: Minimal output

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// commitweave - split pending changes into conventional commits
#[derive(Parser, Debug)]
#[command(name = "cw")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as if cw was started in this directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output; implies --no-interactive
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable interactive prompts
    #[arg(long = "interactive", global = true, conflicts_with = "no_interactive")]
    pub interactive_flag: bool,

    /// Disable interactive prompts
    #[arg(long, global = true)]
    pub no_interactive: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }

    /// Determine if interactive mode is enabled.
    ///
    /// Returns true if:
    /// - `--interactive` was explicitly set, OR
    /// - Neither `--no-interactive` nor `--quiet` was set AND stdin is a TTY
    pub fn interactive(&self) -> bool {
        if self.interactive_flag {
            true
        } else if self.no_interactive || self.quiet {
            false
        } else {
            std::io::stdin().is_terminal()
        }
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Split pending changes into planned commits
    #[command(
        name = "commit",
        long_about = "Split the pending changes into conventional commits.\n\n\
            The changed files and their diff are sent to the configured LLM provider, \
            which proposes a partition into commits. The plan is repaired (long messages \
            shortened, overlapping commits merged, sensitive files removed), validated, \
            shown for review, and then executed one commit at a time.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Plan, review, and commit
    cw commit

    # See the plan without touching the repository
    cw commit --dry-run

    # Everything in one commit, no confirmation
    cw commit --single --yes"
    )]
    Commit {
        /// Show the plan and simulate execution without committing
        #[arg(long)]
        dry_run: bool,

        /// Produce exactly one commit containing every file
        #[arg(long)]
        single: bool,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,

        /// Keep files that look like secrets (.env, keys, credentials)
        #[arg(long)]
        allow_sensitive: bool,

        /// Character budget for the diff sent to the provider
        #[arg(long, value_name = "CHARS")]
        max_diff: Option<usize>,
    },

    /// Suggest a commit message for the staged changes
    #[command(
        name = "message",
        long_about = "Generate one conventional commit message for the staged diff.\n\n\
            Prints the message by default. With --commit, the staged changes are \
            committed with it after confirmation."
    )]
    Message {
        /// Commit the staged changes with the generated message
        #[arg(long)]
        commit: bool,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Undo recent commits, keeping their changes in the working tree
    #[command(
        name = "reverse",
        long_about = "Undo the last COUNT commits.\n\n\
            HEAD moves back COUNT commits with a soft reset and the index is cleared, \
            so every change from the undone commits is left unstaged in the working \
            tree. Commits that already exist on a remote are refused unless --force \
            is given.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Undo the last commit
    cw reverse

    # Undo three commits even though they were pushed
    cw reverse 3 --force"
    )]
    Reverse {
        /// Number of commits to undo
        #[arg(default_value_t = 1)]
        count: usize,

        /// Allow undoing commits that were already pushed
        #[arg(long)]
        force: bool,
    },

    /// Rewrite recent history in an interactive editor
    #[command(
        name = "rebase",
        long_about = "Open the history wizard.\n\n\
            Choose a commit to rebase onto, then reorder, squash, reword, or drop \
            the commits after it. The result is applied with git rebase -i without \
            opening an editor. A failed rebase is aborted and the repository is left \
            as it was."
    )]
    Rebase {
        /// Do not warn about rewriting pushed commits
        #[arg(long)]
        force: bool,
    },

    /// Show configuration
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        after_help = "\
INSTALLATION:
    # Bash
    cw completion bash > ~/.local/share/bash-completion/completions/cw

    # Zsh
    cw completion zsh > ~/.zfunc/_cw

    # Fish
    cw completion fish > ~/.config/fish/completions/cw.fish

    # PowerShell
    cw completion powershell >> $PROFILE"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Config subcommands.
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigAction {
    /// Print the effective configuration (default)
    Show,
    /// Print the config file locations
    Path,
}

/// Supported shells for completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}
