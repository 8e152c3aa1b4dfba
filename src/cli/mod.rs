//! CLI command definitions and handlers

use clap::{Args, Parser, Subcommand};

use crate::team::TeamStatus;

pub mod admin;
pub mod args;
pub mod context;
pub mod init;
pub mod leaderboard;
pub mod logo;
pub mod status;
pub mod team;

pub use args::{GlobalOptions, OutputFormat};
pub use context::CommandContext;

use args::parse_status;

/// teamrate - rate team projects and follow the leaderboard
#[derive(Parser, Debug)]
#[command(name = "teamrate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (pretty, table, json)
    #[arg(
        long,
        global = true,
        env = "TEAMRATE_FORMAT",
        hide_env = true,
        hide_possible_values = true
    )]
    pub format: Option<OutputFormat>,

    /// Override config file location
    #[arg(long, global = true, env = "TEAMRATE_CONFIG", hide_env = true)]
    pub config: Option<String>,

    /// Act as this user instead of the configured one
    #[arg(long, global = true, env = "TEAMRATE_USER", hide_env = true)]
    pub user: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true, env = "TEAMRATE_DEBUG", hide_env = true)]
    pub debug: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create or update the configuration file
    #[command(after_help = "\
Examples:
  teamrate init                                      # Interactive setup
  teamrate init --user alice --reviewer alice        # Local store, alice reviews
  teamrate init --user bob --backend firestore --project-id my-proj --api-key KEY")]
    Init(InitArgs),

    /// Show configuration status
    Status,

    /// Browse, create, edit and rate teams
    #[command(subcommand)]
    Team(TeamCommands),

    /// Show approved teams ranked by average rating
    Leaderboard {
        /// Show only the top N teams
        #[arg(long, short = 'n')]
        limit: Option<usize>,
    },

    /// Review submitted teams (reviewers only)
    #[command(subcommand)]
    Admin(AdminCommands),
}

/// Options for `init`; the identity comes from the global `--user`
#[derive(Args, Debug, Clone, Default)]
pub struct InitArgs {
    /// Storage backend (local, firestore)
    #[arg(long, value_parser = ["local", "firestore"])]
    pub backend: Option<String>,

    /// Display name recorded on teams you create
    #[arg(long)]
    pub name: Option<String>,

    /// Firestore project id
    #[arg(long)]
    pub project_id: Option<String>,

    /// Firestore web API key
    #[arg(long)]
    pub api_key: Option<String>,

    /// Firestore endpoint override (emulator or proxy)
    #[arg(long, hide = true)]
    pub base_url: Option<String>,

    /// Local store file (defaults to teams.db beside the config)
    #[arg(long)]
    pub db_path: Option<String>,

    /// Identity allowed to review teams (repeatable)
    #[arg(long = "reviewer")]
    pub reviewers: Vec<String>,
}

/// Team subcommands
#[derive(Subcommand, Debug)]
pub enum TeamCommands {
    /// List teams
    #[command(after_help = "\
Examples:
  teamrate team list                     # All teams
  teamrate team list --status approved   # Only approved teams
  teamrate team list --mine              # Teams you created
  teamrate team list --search orbit      # Name or project contains 'orbit'")]
    List {
        /// Only teams with this status (pending, approved, rejected)
        #[arg(long, value_parser = parse_status)]
        status: Option<TeamStatus>,

        /// Only teams you created
        #[arg(long)]
        mine: bool,

        /// Case-insensitive match on team or project name
        #[arg(long, short = 's')]
        search: Option<String>,
    },

    /// Show a team with its rating breakdown and suggestions
    Show {
        /// Team ID
        id: String,
    },

    /// Submit a new team for review
    Create {
        /// Team name
        #[arg(long)]
        name: String,

        /// Project name
        #[arg(long)]
        project: String,

        /// Logo image file (png, jpg, gif, svg, webp; max 5 MB) or URL
        #[arg(long)]
        logo: Option<String>,

        /// Creator name shown on the team (defaults to the configured name)
        #[arg(long)]
        display_name: Option<String>,

        /// Create even if a team with the same name exists
        #[arg(long)]
        allow_duplicate: bool,
    },

    /// Edit a team you created
    Edit {
        /// Team ID
        id: String,

        /// New team name
        #[arg(long)]
        name: Option<String>,

        /// New project name
        #[arg(long)]
        project: Option<String>,

        /// New logo file or URL
        #[arg(long, conflicts_with = "clear_logo")]
        logo: Option<String>,

        /// Remove the logo
        #[arg(long)]
        clear_logo: bool,
    },

    /// Rate a team from 1 to 10
    #[command(after_help = "\
Examples:
  teamrate team rate abc123 8
  teamrate team rate abc123 6 --suggestion \"Add a live demo\"

Rating again replaces your earlier rating and suggestion.")]
    Rate {
        /// Team ID
        id: String,

        /// Rating from 1 to 10
        #[arg(allow_negative_numbers = true)]
        rating: i64,

        /// Feedback for the team
        #[arg(long)]
        suggestion: Option<String>,
    },
}

/// Reviewer subcommands
#[derive(Subcommand, Debug)]
pub enum AdminCommands {
    /// List every team, newest first
    List {
        /// Only teams with this status (pending, approved, rejected)
        #[arg(long, value_parser = parse_status)]
        status: Option<TeamStatus>,
    },

    /// Approve a team so it appears on the leaderboard
    Approve {
        /// Team ID
        id: String,
    },

    /// Reject a team
    Reject {
        /// Team ID
        id: String,
    },

    /// Move a team back to pending
    Reset {
        /// Team ID
        id: String,
    },
}

impl AdminCommands {
    /// Status a review subcommand sets, if it is one
    pub fn target_status(&self) -> Option<(&str, TeamStatus)> {
        match self {
            AdminCommands::List { .. } => None,
            AdminCommands::Approve { id } => Some((id.as_str(), TeamStatus::Approved)),
            AdminCommands::Reject { id } => Some((id.as_str(), TeamStatus::Rejected)),
            AdminCommands::Reset { id } => Some((id.as_str(), TeamStatus::Pending)),
        }
    }
}
