//! Init command implementation

use std::io::IsTerminal;
use std::path::PathBuf;

use colored::Colorize;
use dialoguer::{Input, Select, theme::ColorfulTheme};

use crate::cli::InitArgs;
use crate::cli::args::GlobalOptions;
use crate::cli::context::resolve_config_path;
use crate::config::{Backend, Config};
use crate::error::{ConfigError, Result};

/// Merge `init` flags into an existing config.
///
/// Values not given on the command line keep what the config already had, so
/// re-running `init` with one flag only changes that setting.
pub fn apply_init(mut config: Config, args: &InitArgs, user: Option<&str>) -> Result<Config> {
    if let Some(user) = user.map(str::trim).filter(|u| !u.is_empty()) {
        config.user_id = Some(user.to_string());
    }
    if config.user_id.is_none() {
        return Err(ConfigError::MissingIdentity.into());
    }

    if let Some(name) = args.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        config.display_name = Some(name.to_string());
    }

    if !args.reviewers.is_empty() {
        config.reviewers = args
            .reviewers
            .iter()
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .collect();
    }

    let backend = args.backend.as_deref().unwrap_or_else(|| {
        if args.project_id.is_some() {
            "firestore"
        } else {
            config.backend.name()
        }
    });

    config.backend = match (backend, &config.backend) {
        ("firestore", Backend::Firestore {
            project_id,
            api_key,
            id_token,
            base_url,
        }) => Backend::Firestore {
            project_id: args.project_id.clone().unwrap_or_else(|| project_id.clone()),
            api_key: args.api_key.clone().or_else(|| api_key.clone()),
            id_token: id_token.clone(),
            base_url: args.base_url.clone().or_else(|| base_url.clone()),
        },
        ("firestore", _) => Backend::Firestore {
            project_id: args
                .project_id
                .clone()
                .ok_or(ConfigError::MissingProjectId)?,
            api_key: args.api_key.clone(),
            id_token: None,
            base_url: args.base_url.clone(),
        },
        (_, Backend::Local { path }) => Backend::Local {
            path: args.db_path.as_ref().map(PathBuf::from).or_else(|| path.clone()),
        },
        _ => Backend::Local {
            path: args.db_path.as_ref().map(PathBuf::from),
        },
    };

    config.validate()?;
    Ok(config)
}

/// Ask for whatever `init` still needs when running in a terminal
fn prompt_missing(existing: &Config, args: &mut InitArgs, user: &mut Option<String>) -> Result<()> {
    let theme = ColorfulTheme::default();

    if user.is_none() && existing.user_id.is_none() {
        let id: String = Input::with_theme(&theme)
            .with_prompt("Your user id")
            .interact_text()?;
        *user = Some(id);
    }

    if args.name.is_none() && existing.display_name.is_none() {
        let name: String = Input::with_theme(&theme)
            .with_prompt("Display name (shown on teams you create)")
            .allow_empty(true)
            .interact_text()?;
        args.name = Some(name);
    }

    if args.backend.is_none() && args.project_id.is_none() {
        let choices = ["local", "firestore"];
        let current = choices
            .iter()
            .position(|c| *c == existing.backend.name())
            .unwrap_or(0);
        let idx = Select::with_theme(&theme)
            .with_prompt("Where should teams be stored?")
            .items(&choices)
            .default(current)
            .interact()?;
        args.backend = Some(choices[idx].to_string());
    }

    if args.backend.as_deref() == Some("firestore")
        && args.project_id.is_none()
        && !matches!(existing.backend, Backend::Firestore { .. })
    {
        let project: String = Input::with_theme(&theme)
            .with_prompt("Firestore project id")
            .interact_text()?;
        args.project_id = Some(project);

        let key: String = Input::with_theme(&theme)
            .with_prompt("Web API key (leave empty for none)")
            .allow_empty(true)
            .interact_text()?;
        if !key.trim().is_empty() {
            args.api_key = Some(key);
        }
    }

    Ok(())
}

/// Run the init command
pub fn run(opts: &GlobalOptions, args: &InitArgs) -> Result<()> {
    let config_path = resolve_config_path(opts.config_ref())?;
    let existing = Config::load_from(&config_path).unwrap_or_default();

    let mut args = args.clone();
    let mut user = opts.user.clone();

    if std::io::stdin().is_terminal() {
        println!("{}", "Welcome to teamrate!".bold().green());
        println!("Let's set up your configuration.\n");
        prompt_missing(&existing, &mut args, &mut user)?;
    }

    let config = apply_init(existing, &args, user.as_deref())?;
    config.save_to(&config_path)?;

    println!(
        "{} Configuration saved to: {}",
        "✓".green(),
        config_path.display()
    );
    match &config.backend {
        Backend::Local { .. } => {
            if let Some(path) = config.local_store_path(&config_path) {
                println!("  Local store: {}", path.display());
            }
        }
        Backend::Firestore { project_id, .. } => {
            println!("  Firestore project: {}", project_id.bold());
        }
    }
    if !config.reviewers.is_empty() {
        println!("  Reviewers: {}", config.reviewers.join(", "));
    }

    println!("\n{}", "You're all set! Try running:".bold());
    println!("  {} - Show configuration status", "teamrate status".cyan());
    println!("  {} - Browse teams", "teamrate team list".cyan());

    Ok(())
}
