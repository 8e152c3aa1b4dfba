//! Leaderboard command

use log::debug;

use crate::cli::{CommandContext, GlobalOptions, OutputFormat};
use crate::error::Result;
use crate::models::StandingDisplay;
use crate::output::{Formattable, json};
use crate::team::Standing;

/// Keep the top `limit` standings
pub fn top(mut standings: Vec<Standing>, limit: Option<usize>) -> Vec<Standing> {
    if let Some(limit) = limit {
        standings.truncate(limit);
    }
    standings
}

/// Run the leaderboard command
pub async fn run(opts: &GlobalOptions, limit: Option<usize>) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let standings = top(ctx.repo.leaderboard().await?, limit);
    debug!("Showing {} standings", standings.len());

    match ctx.format {
        OutputFormat::Json => println!("{}", json::format_json(&standings)?),
        _ => {
            let rows: Vec<StandingDisplay> = standings.iter().map(StandingDisplay::from).collect();
            rows.print(ctx.format)?;
        }
    }
    Ok(())
}
