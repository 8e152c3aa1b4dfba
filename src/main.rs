//! teamrate - submit team projects, rate them, and follow the leaderboard

use clap::Parser;

mod cli;
mod config;
mod error;
mod models;
mod output;
mod store;
mod team;

use cli::{Cli, Commands, GlobalOptions, TeamCommands};
use error::Result;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

fn init_logging(debug: bool) {
    let default_filter = if debug { "teamrate=debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let opts = GlobalOptions::from_cli(&cli);
    init_logging(opts.debug);

    match &cli.command {
        Commands::Init(args) => cli::init::run(&opts, args),
        Commands::Status => cli::status::run(&opts),
        Commands::Team(team_cmd) => match team_cmd {
            TeamCommands::List {
                status,
                mine,
                search,
            } => cli::team::list(&opts, *status, *mine, search.as_deref()).await,
            TeamCommands::Show { id } => cli::team::show(&opts, id).await,
            TeamCommands::Create {
                name,
                project,
                logo,
                display_name,
                allow_duplicate,
            } => {
                cli::team::create(
                    &opts,
                    name,
                    project,
                    logo.as_deref(),
                    display_name.as_deref(),
                    *allow_duplicate,
                )
                .await
            }
            TeamCommands::Edit {
                id,
                name,
                project,
                logo,
                clear_logo,
            } => {
                cli::team::edit(
                    &opts,
                    id,
                    name.as_deref(),
                    project.as_deref(),
                    logo.as_deref(),
                    *clear_logo,
                )
                .await
            }
            TeamCommands::Rate {
                id,
                rating,
                suggestion,
            } => cli::team::rate(&opts, id, *rating, suggestion.as_deref()).await,
        },
        Commands::Leaderboard { limit } => cli::leaderboard::run(&opts, *limit).await,
        Commands::Admin(admin_cmd) => cli::admin::run(&opts, admin_cmd).await,
    }
}
