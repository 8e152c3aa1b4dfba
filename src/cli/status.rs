//! Status command implementation

use colored::Colorize;

use crate::cli::args::GlobalOptions;
use crate::cli::context::resolve_config_path;
use crate::config::{Backend, Config};
use crate::error::Result;
use crate::team::{ReviewPolicy, ReviewerList};

/// Run the status command to display configuration status
pub fn run(opts: &GlobalOptions) -> Result<()> {
    println!("{}\n", "teamrate Configuration Status".bold());

    let config_path = resolve_config_path(opts.config_ref())?;
    let config = match Config::load_from(&config_path) {
        Ok(config) => config,
        Err(err) => {
            println!("{} Configuration not usable: {}", "✗".red(), err);
            println!();
            println!(
                "Run {} to create a configuration file.",
                "teamrate init".cyan()
            );
            println!();
            return Ok(());
        }
    };

    println!("Config file: {}", config_path.display().to_string().cyan());
    println!();

    match &config.backend {
        Backend::Local { .. } => {
            let path = config
                .local_store_path(&config_path)
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            println!("{} Local store: {}", "✓".green(), path);
        }
        Backend::Firestore {
            project_id,
            api_key,
            id_token,
            base_url,
        } => {
            println!("{} Firestore project: {}", "✓".green(), project_id);
            if api_key.is_some() {
                println!("{} API key configured", "✓".green());
            } else {
                println!("{} No API key set", "○".dimmed());
            }
            if id_token.is_some() {
                println!("{} ID token configured", "✓".green());
            }
            if let Some(url) = base_url {
                println!("{} Custom endpoint: {}", "○".dimmed(), url.cyan());
            }
        }
    }

    let reviewers = ReviewerList::new(&config.reviewers);
    match config.identity(opts.user_ref()) {
        Ok(identity) => {
            if opts.user.is_some() {
                println!(
                    "{} Acting as: {} {}",
                    "✓".green(),
                    identity.bold(),
                    "(via --user)".dimmed()
                );
            } else {
                println!("{} Acting as: {}", "✓".green(), identity.bold());
            }

            if reviewers.can_review(&identity) {
                println!("{} You can review teams", "✓".green());
            }
        }
        Err(_) => {
            println!("{} No user id configured", "✗".red());
            println!("  → Run 'teamrate init --user <ID>' to set one");
        }
    }

    match &config.display_name {
        Some(name) => println!("{} Display name: {}", "✓".green(), name),
        None => println!("{} No display name (teams show as Anonymous)", "○".dimmed()),
    }

    if reviewers.is_empty() {
        println!("{} No reviewers configured, so no team can be approved", "⚠".yellow());
    } else {
        println!("Reviewers: {}", config.reviewers.join(", ").dimmed());
    }

    println!();
    Ok(())
}
