//! Team commands

use colored::Colorize;
use log::debug;
use serde::Serialize;

use crate::cli::logo::resolve_logo;
use crate::cli::{CommandContext, GlobalOptions, OutputFormat};
use crate::error::{Result, TeamError};
use crate::models::{SuggestionDisplay, TeamDisplay};
use crate::models::display::format_average;
use crate::output::formatters::{format_timestamp_local, rating_bar};
use crate::output::{Formattable, json};
use crate::team::aggregate::{distribution, most_common, score_range};
use crate::team::{NewTeam, Team, TeamEdit, TeamStatus};

/// Print a list of teams in the chosen format
pub fn print_teams(teams: &[Team], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", json::format_json(teams)?),
        _ => {
            let rows: Vec<TeamDisplay> = teams.iter().map(TeamDisplay::from).collect();
            rows.print(format)?;
        }
    }
    Ok(())
}

/// Run the team list command
pub async fn list(
    opts: &GlobalOptions,
    status: Option<TeamStatus>,
    mine: bool,
    search: Option<&str>,
) -> Result<()> {
    let ctx = CommandContext::new(opts)?;

    let mut teams = if mine {
        let owner = ctx.identity()?;
        ctx.repo.list_teams_by_owner(&owner).await?
    } else if status == Some(TeamStatus::Approved) {
        ctx.repo.list_approved_teams().await?
    } else {
        ctx.repo.list_teams().await?
    };
    debug!("Fetched {} teams", teams.len());

    if let Some(status) = status {
        teams.retain(|t| t.status == status);
    }
    if let Some(term) = search {
        teams.retain(|t| t.matches_search(term));
    }

    print_teams(&teams, ctx.format)
}

/// Per-score breakdown included in `team show --format json`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RatingStats {
    distribution: [usize; 10],
    most_common: Option<u8>,
    lowest: Option<u8>,
    highest: Option<u8>,
    your_rating: Option<u8>,
}

#[derive(Debug, Serialize)]
struct TeamDetail<'a> {
    team: &'a Team,
    stats: RatingStats,
}

fn rating_stats(team: &Team, viewer: Option<&str>) -> RatingStats {
    let values = team.values();
    let range = score_range(&values);
    RatingStats {
        distribution: distribution(&values),
        most_common: most_common(&values),
        lowest: range.map(|(lo, _)| lo),
        highest: range.map(|(_, hi)| hi),
        your_rating: viewer.and_then(|v| team.rating_by(v)),
    }
}

fn status_label(status: TeamStatus) -> String {
    match status {
        TeamStatus::Pending => status.as_str().yellow().to_string(),
        TeamStatus::Approved => status.as_str().green().to_string(),
        TeamStatus::Rejected => status.as_str().red().to_string(),
    }
}

fn print_team_pretty(team: &Team, stats: &RatingStats, viewer: Option<&str>) {
    println!("{}", team.team_name.bold());
    println!("Project:     {}", team.project_name);
    println!("ID:          {}", team.id.dimmed());
    println!(
        "Created by:  {} on {}",
        team.created_by_name,
        format_timestamp_local(&team.created_at)
    );
    println!("Status:      {}", status_label(team.status));
    if let (Some(by), Some(at)) = (&team.reviewed_by, &team.reviewed_at) {
        println!("Reviewed by: {} on {}", by, format_timestamp_local(at));
    }
    if let Some(logo) = &team.logo_url {
        if logo.starts_with("data:") {
            println!("Logo:        {}", "(embedded image)".dimmed());
        } else {
            println!("Logo:        {}", logo);
        }
    }

    println!();
    if team.total_ratings == 0 {
        println!("{}", "No ratings yet.".dimmed());
    } else {
        println!(
            "Average:     {} from {} rating{}",
            format_average(team.average_rating, team.total_ratings).bold(),
            team.total_ratings,
            if team.total_ratings == 1 { "" } else { "s" }
        );
        if let Some(score) = stats.most_common {
            println!("Most common: {}", score);
        }
        if let (Some(lo), Some(hi)) = (stats.lowest, stats.highest) {
            println!("Range:       {} - {}", lo, hi);
        }
        if let Some(mine) = stats.your_rating {
            println!("You rated:   {}", mine.to_string().cyan());
        }
        println!("Raters:      {}", team.rated_by().join(", ").dimmed());

        println!();
        let max = stats.distribution.iter().copied().max().unwrap_or(0);
        for (idx, count) in stats.distribution.iter().enumerate().rev() {
            println!("{:>3} | {} {}", idx + 1, rating_bar(*count, max).cyan(), count);
        }
    }

    if let Some(own) = viewer.and_then(|v| team.suggestion_by(v)) {
        println!("\nYour suggestion: {}", own.text.cyan());
    }

    if !team.suggestions.is_empty() {
        println!("\n{}", "Suggestions".bold());
        for suggestion in &team.suggestions {
            println!(
                "  [{}] {} {}",
                suggestion.rating,
                suggestion.text,
                format!("({})", suggestion.rater_id).dimmed()
            );
        }
    }
}

/// Run the team show command
pub async fn show(opts: &GlobalOptions, id: &str) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let team = ctx.repo.get_team(id).await?;
    let viewer = ctx.identity().ok();
    let stats = rating_stats(&team, viewer.as_deref());

    match ctx.format {
        OutputFormat::Pretty => print_team_pretty(&team, &stats, viewer.as_deref()),
        OutputFormat::Table => {
            vec![TeamDisplay::from(&team)].print(ctx.format)?;
            if !team.suggestions.is_empty() {
                let rows: Vec<SuggestionDisplay> =
                    team.suggestions.iter().map(SuggestionDisplay::from).collect();
                rows.print(ctx.format)?;
            }
        }
        OutputFormat::Json => {
            println!(
                "{}",
                json::format_json(&TeamDetail {
                    team: &team,
                    stats,
                })?
            );
        }
    }
    Ok(())
}

/// Find a team whose name matches `name`, ignoring case and surrounding space
pub fn find_duplicate<'a>(teams: &'a [Team], name: &str) -> Option<&'a Team> {
    let wanted = name.trim().to_lowercase();
    teams
        .iter()
        .find(|t| t.team_name.trim().to_lowercase() == wanted)
}

/// Run the team create command
pub async fn create(
    opts: &GlobalOptions,
    name: &str,
    project: &str,
    logo: Option<&str>,
    display_name: Option<&str>,
    allow_duplicate: bool,
) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let owner = ctx.identity()?;

    if !allow_duplicate && !name.trim().is_empty() {
        let existing = ctx.repo.list_teams().await?;
        if let Some(team) = find_duplicate(&existing, name) {
            return Err(TeamError::InvalidInput(format!(
                "A team named '{}' already exists ({}). Use --allow-duplicate to create it anyway.",
                team.team_name, team.id
            ))
            .into());
        }
    }

    let mut new_team = NewTeam::new(name, project);
    if let Some(logo) = logo {
        new_team = new_team.logo_url(&resolve_logo(logo)?);
    }
    if let Some(creator) = display_name.or(ctx.config.display_name.as_deref()) {
        new_team = new_team.created_by_name(creator);
    }
    let team = ctx.repo.create_team(&new_team, &owner).await?;

    match ctx.format {
        OutputFormat::Pretty => {
            println!(
                "{} Created team {} ({})",
                "✓".green(),
                team.team_name.bold(),
                team.id
            );
            println!("  It will appear on the leaderboard once a reviewer approves it.");
        }
        OutputFormat::Table => vec![TeamDisplay::from(&team)].print(ctx.format)?,
        OutputFormat::Json => println!("{}", json::format_json(&team)?),
    }
    Ok(())
}

/// Build the edit requested by `team edit` flags
pub fn build_edit(
    name: Option<&str>,
    project: Option<&str>,
    logo: Option<&str>,
    clear_logo: bool,
) -> Result<TeamEdit> {
    let logo_url = if clear_logo {
        Some(String::new())
    } else {
        logo.map(resolve_logo).transpose()?
    };
    Ok(TeamEdit {
        team_name: name.map(str::to_string),
        project_name: project.map(str::to_string),
        logo_url,
    })
}

/// Run the team edit command
pub async fn edit(
    opts: &GlobalOptions,
    id: &str,
    name: Option<&str>,
    project: Option<&str>,
    logo: Option<&str>,
    clear_logo: bool,
) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let actor = ctx.identity()?;
    let edit = build_edit(name, project, logo, clear_logo)?;

    let team = ctx.repo.update_team(id, &edit, &actor).await?;

    match ctx.format {
        OutputFormat::Pretty => {
            println!("{} Updated team {}", "✓".green(), team.team_name.bold());
        }
        OutputFormat::Table => vec![TeamDisplay::from(&team)].print(ctx.format)?,
        OutputFormat::Json => println!("{}", json::format_json(&team)?),
    }
    Ok(())
}

/// Run the team rate command
pub async fn rate(
    opts: &GlobalOptions,
    id: &str,
    rating: i64,
    suggestion: Option<&str>,
) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let rater = ctx.identity()?;

    let team = ctx.repo.rate_team(id, rating, &rater, suggestion).await?;

    match ctx.format {
        OutputFormat::Pretty => {
            println!(
                "{} Rated {} {}/10",
                "✓".green(),
                team.team_name.bold(),
                rating
            );
            println!(
                "  Average is now {} from {} rating{}",
                format_average(team.average_rating, team.total_ratings),
                team.total_ratings,
                if team.total_ratings == 1 { "" } else { "s" }
            );
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

    fn team(id: &str, name: &str, ratings: serde_json::Value) -> Team {
        let doc = Document {
            id: id.to_string(),
            fields: json!({"teamName": name, "projectName": "P", "ratings": ratings})
                .as_object()
                .cloned()
                .unwrap(),
        };
        decode_team(&doc, Utc::now())
    }

    #[test]
    fn test_find_duplicate_ignores_case() {
        let teams = vec![team("a", "Falcons", json!([])), team("b", "Owls", json!([]))];
        assert_eq!(find_duplicate(&teams, "  falcons ").map(|t| t.id.as_str()), Some("a"));
        assert!(find_duplicate(&teams, "Hawks").is_none());
    }

    #[test]
    fn test_rating_stats() {
        let team = team(
            "a",
            "Falcons",
            json!([
                {"raterId": "u1", "value": 4},
                {"raterId": "u2", "value": 9},
                {"raterId": "u3", "value": 4}
            ]),
        );
        let stats = rating_stats(&team, Some("u2"));

        assert_eq!(stats.distribution[3], 2);
        assert_eq!(stats.distribution[8], 1);
        assert_eq!(stats.most_common, Some(4));
        assert_eq!(stats.lowest, Some(4));
        assert_eq!(stats.highest, Some(9));
        assert_eq!(stats.your_rating, Some(9));
    }

    #[test]
    fn test_build_edit() {
        let edit = build_edit(Some("New"), None, None, false).unwrap();
        assert_eq!(edit.team_name.as_deref(), Some("New"));
        assert!(edit.logo_url.is_none());

        let clear = build_edit(None, None, None, true).unwrap();
        assert_eq!(clear.logo_url.as_deref(), Some(""));

        let url = build_edit(None, None, Some("https://example.com/l.png"), false).unwrap();
        assert_eq!(url.logo_url.as_deref(), Some("https://example.com/l.png"));
    }
}
