//! Reviewer commands

use std::collections::BTreeMap;

use colored::Colorize;
use serde::Serialize;

use crate::cli::team::print_teams;
use crate::cli::{AdminCommands, CommandContext, GlobalOptions, OutputFormat};
use crate::error::{Result, TeamError};
use crate::models::TeamDisplay;
use crate::output::{Formattable, json};
use crate::team::{Team, TeamStatus};

/// Number of teams in each status, keyed by status name
pub fn status_counts(teams: &[Team]) -> BTreeMap<&'static str, usize> {
    TeamStatus::ALL
        .iter()
        .map(|status| {
            (
                status.as_str(),
                teams.iter().filter(|t| t.status == *status).count(),
            )
        })
        .collect()
}

#[derive(Debug, Serialize)]
struct AdminListing<'a> {
    teams: &'a [Team],
    counts: BTreeMap<&'static str, usize>,
}

/// Dispatch an admin subcommand
pub async fn run(opts: &GlobalOptions, command: &AdminCommands) -> Result<()> {
    match command {
        AdminCommands::List { status } => list(opts, *status).await,
        review => match review.target_status() {
            Some((id, status)) => set_status(opts, id, status).await,
            None => Ok(()),
        },
    }
}

/// Run the admin list command
pub async fn list(opts: &GlobalOptions, status: Option<TeamStatus>) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let reviewer = ctx.identity()?;
    if !ctx.repo.can_review(&reviewer) {
        return Err(TeamError::NotAuthorized(format!(
            "{} is not allowed to review teams",
            reviewer
        ))
        .into());
    }

    let all = ctx.repo.get_all_for_admin().await?;
    let counts = status_counts(&all);
    let teams: Vec<Team> = match status {
        Some(status) => all.into_iter().filter(|t| t.status == status).collect(),
        None => all,
    };

    match ctx.format {
        OutputFormat::Json => {
            println!(
                "{}",
                json::format_json(&AdminListing {
                    teams: &teams,
                    counts,
                })?
            );
        }
        OutputFormat::Pretty => {
            let summary: Vec<String> = TeamStatus::ALL
                .iter()
                .map(|s| format!("{} {}", counts.get(s.as_str()).unwrap_or(&0), s))
                .collect();
            println!("{}\n", summary.join(" · ").dimmed());
            print_teams(&teams, ctx.format)?;
        }
        OutputFormat::Table => print_teams(&teams, ctx.format)?,
    }
    Ok(())
}

fn verb(status: TeamStatus) -> &'static str {
    match status {
        TeamStatus::Approved => "Approved",
        TeamStatus::Rejected => "Rejected",
        TeamStatus::Pending => "Moved back to pending:",
    }
}

/// Run approve, reject or reset
pub async fn set_status(opts: &GlobalOptions, id: &str, status: TeamStatus) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let reviewer = ctx.identity()?;

    ctx.repo.set_status(id, status, &reviewer).await?;
    let team = ctx.repo.get_team(id).await?;

    match ctx.format {
        OutputFormat::Pretty => {
            println!("{} {} {}", "✓".green(), verb(status), team.team_name.bold());
        }
        OutputFormat::Table => vec![TeamDisplay::from(&team)].print(ctx.format)?,
        OutputFormat::Json => println!("{}", json::format_json(&team)?),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Document;
    use crate::team::record::decode_team;
    use chrono::Utc;
    use serde_json::json;

    fn team(id: &str, status: &str) -> Team {
        let doc = Document {
            id: id.to_string(),
            fields: json!({"teamName": id, "status": status})
                .as_object()
                .cloned()
                .unwrap(),
        };
        decode_team(&doc, Utc::now())
    }

    #[test]
    fn test_status_counts() {
        let teams = vec![
            team("a", "pending"),
            team("b", "approved"),
            team("c", "approved"),
            team("d", "bogus"),
        ];
        let counts = status_counts(&teams);

        assert_eq!(counts["pending"], 2);
        assert_eq!(counts["approved"], 2);
        assert_eq!(counts["rejected"], 0);
    }

    #[test]
    fn test_verb_per_status() {
        assert_eq!(verb(TeamStatus::Approved), "Approved");
        assert_eq!(verb(TeamStatus::Rejected), "Rejected");
        assert!(verb(TeamStatus::Pending).contains("pending"));
    }
}
