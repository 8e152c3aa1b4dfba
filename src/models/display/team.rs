//! Team, leaderboard and suggestion display models

use serde::Serialize;
use tabled::Tabled;

use super::common::{format_average, format_datetime, truncate_string};
use crate::team::model::Suggestion;
use crate::team::{Standing, Team};

/// Team display model for table output.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct TeamDisplay {
    #[tabled(rename = "ID")]
    pub id: String,

    #[tabled(rename = "TEAM")]
    pub team_name: String,

    #[tabled(rename = "PROJECT")]
    pub project_name: String,

    /// Average rating, `--` when unrated
    #[tabled(rename = "AVG")]
    pub average: String,

    #[tabled(rename = "RATINGS")]
    pub total_ratings: usize,

    #[tabled(rename = "STATUS")]
    pub status: String,

    #[tabled(rename = "CREATED BY")]
    pub created_by: String,

    #[tabled(rename = "CREATED")]
    pub created_at: String,
}

impl From<&Team> for TeamDisplay {
    fn from(team: &Team) -> Self {
        Self {
            id: team.id.clone(),
            team_name: truncate_string(&team.team_name, 30),
            project_name: truncate_string(&team.project_name, 30),
            average: format_average(team.average_rating, team.total_ratings),
            total_ratings: team.total_ratings,
            status: team.status.to_string(),
            created_by: truncate_string(&team.created_by_name, 20),
            created_at: format_datetime(&team.created_at),
        }
    }
}

/// Leaderboard row.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct StandingDisplay {
    #[tabled(rename = "#")]
    pub position: usize,

    #[tabled(rename = "TEAM")]
    pub team_name: String,

    #[tabled(rename = "PROJECT")]
    pub project_name: String,

    #[tabled(rename = "AVG")]
    pub average: String,

    #[tabled(rename = "RATINGS")]
    pub total_ratings: usize,

    #[tabled(rename = "ID")]
    pub id: String,
}

impl From<&Standing> for StandingDisplay {
    fn from(standing: &Standing) -> Self {
        let team = &standing.team;
        Self {
            position: standing.position,
            team_name: truncate_string(&team.team_name, 30),
            project_name: truncate_string(&team.project_name, 30),
            average: format_average(team.average_rating, team.total_ratings),
            total_ratings: team.total_ratings,
            id: team.id.clone(),
        }
    }
}

/// Suggestion row.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct SuggestionDisplay {
    #[tabled(rename = "RATING")]
    pub rating: u8,

    #[tabled(rename = "SUGGESTION")]
    pub text: String,

    #[tabled(rename = "FROM")]
    pub rater_id: String,

    #[tabled(rename = "SUBMITTED")]
    pub submitted_at: String,
}

impl From<&Suggestion> for SuggestionDisplay {
    fn from(suggestion: &Suggestion) -> Self {
        Self {
            rating: suggestion.rating,
            text: truncate_string(&suggestion.text, 60),
            rater_id: suggestion.rater_id.clone(),
            submitted_at: format_datetime(&suggestion.submitted_at),
        }
    }
}
