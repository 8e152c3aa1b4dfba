//! Team, rating and suggestion models

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TeamError;

/// Lowest accepted rating
pub const MIN_RATING: i64 = 1;

/// Highest accepted rating
pub const MAX_RATING: i64 = 10;

/// Creator display name used when none was given
pub const ANONYMOUS: &str = "Anonymous";

/// Review state of a team; only approved teams reach the leaderboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl TeamStatus {
    pub const ALL: [TeamStatus; 3] = [TeamStatus::Pending, TeamStatus::Approved, TeamStatus::Rejected];

    pub fn as_str(&self) -> &'static str {
        match self {
            TeamStatus::Pending => "pending",
            TeamStatus::Approved => "approved",
            TeamStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for TeamStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TeamStatus {
    type Err = TeamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(TeamStatus::Pending),
            "approved" => Ok(TeamStatus::Approved),
            "rejected" => Ok(TeamStatus::Rejected),
            other => Err(TeamError::InvalidInput(format!(
                "Unknown status '{}' (expected pending, approved or rejected)",
                other
            ))),
        }
    }
}

/// One rater's score for a team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub rater_id: String,
    pub value: u8,
}

/// Free-text feedback left alongside a rating
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub rater_id: String,
    pub text: String,
    /// Rating given together with this suggestion
    pub rating: u8,
    pub submitted_at: DateTime<Utc>,
}

/// A submitted team project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    /// Store-assigned identifier
    pub id: String,

    pub team_name: String,

    pub project_name: String,

    /// Remote URL or inlined `data:` URI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,

    /// Ratings in submission order, at most one per rater
    #[serde(default)]
    pub ratings: Vec<Rating>,

    /// At most one suggestion per rater
    #[serde(default)]
    pub suggestions: Vec<Suggestion>,

    /// Mean of `ratings` rounded to one decimal, 0 when unrated
    pub average_rating: f64,

    pub total_ratings: usize,

    pub created_by: String,

    pub created_by_name: String,

    pub created_at: DateTime<Utc>,

    pub status: TeamStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl Team {
    /// Rating values in submission order
    pub fn values(&self) -> Vec<u8> {
        self.ratings.iter().map(|r| r.value).collect()
    }

    /// Rater ids, positionally matching [`Team::values`]
    pub fn rated_by(&self) -> Vec<&str> {
        self.ratings.iter().map(|r| r.rater_id.as_str()).collect()
    }

    /// The rating a given rater gave, if any
    pub fn rating_by(&self, rater_id: &str) -> Option<u8> {
        self.ratings
            .iter()
            .find(|r| r.rater_id == rater_id)
            .map(|r| r.value)
    }

    pub fn suggestion_by(&self, rater_id: &str) -> Option<&Suggestion> {
        self.suggestions.iter().find(|s| s.rater_id == rater_id)
    }

    /// Case-insensitive substring match on team or project name.
    ///
    /// A blank term matches everything.
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        term.is_empty()
            || self.team_name.to_lowercase().contains(&term)
            || self.project_name.to_lowercase().contains(&term)
    }
}

/// Input for creating a team
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTeam {
    pub team_name: String,
    pub project_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by_name: Option<String>,
}

impl NewTeam {
    pub fn new(team_name: &str, project_name: &str) -> Self {
        Self {
            team_name: team_name.to_string(),
            project_name: project_name.to_string(),
            ..Self::default()
        }
    }

    pub fn logo_url(mut self, logo_url: &str) -> Self {
        self.logo_url = Some(logo_url.to_string());
        self
    }

    pub fn created_by_name(mut self, name: &str) -> Self {
        self.created_by_name = Some(name.to_string());
        self
    }
}

/// Owner edit of a team's descriptive fields.
///
/// `None` leaves a field unchanged. An empty `logo_url` removes the logo.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamEdit {
    pub team_name: Option<String>,
    pub project_name: Option<String>,
    pub logo_url: Option<String>,
}

impl TeamEdit {
    pub fn is_empty(&self) -> bool {
        self.team_name.is_none() && self.project_name.is_none() && self.logo_url.is_none()
    }
}
