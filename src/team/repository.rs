//! Team repository
//!
//! The only code that reads or writes team records. Every public operation
//! runs its store calls through [`with_retry`]; transient failures that
//! outlast the retry budget surface as [`TeamError::Unavailable`].

use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use log::{debug, error, info};
use serde_json::Value;

use super::aggregate::{Standing, rank_leaderboard};
use super::model::{MAX_RATING, MIN_RATING, NewTeam, Rating, Suggestion, Team, TeamEdit, TeamStatus};
use super::policy::ReviewPolicy;
use super::record::{
    self, CREATED_BY, CREATED_AT, LOGO_URL, PROJECT_NAME, RATED_BY, RATINGS, REVIEWED_AT,
    REVIEWED_BY, STATUS, SUGGESTIONS, TEAM_NAME, decode_team, is_legacy_layout, rating_value,
    suggestion_value, timestamp_value,
};
use super::retry::{RetryPolicy, with_retry};
use crate::error::{Error, Operation, Result, StoreError, TeamError};
use crate::store::{Document, DocumentStore, Query, Update};

/// Collection holding team records
pub const TEAMS: &str = "teams";

/// Reads and writes teams through a document store
pub struct TeamRepository {
    store: Arc<dyn DocumentStore>,
    reviewers: Arc<dyn ReviewPolicy>,
    retry: RetryPolicy,
}

impl TeamRepository {
    pub fn new(store: Arc<dyn DocumentStore>, reviewers: Arc<dyn ReviewPolicy>) -> Self {
        Self {
            store,
            reviewers,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Whether `actor_id` may change team status
    pub fn can_review(&self, actor_id: &str) -> bool {
        self.reviewers.can_review(actor_id)
    }

    /// Every team, any status
    pub async fn list_teams(&self) -> Result<Vec<Team>> {
        self.run(Operation::FetchTeams, || self.fetch(Query::all()))
            .await
    }

    /// Approved teams, newest first
    pub async fn list_approved_teams(&self) -> Result<Vec<Team>> {
        let query = Query::all().where_eq(STATUS, TeamStatus::Approved.as_str());
        let mut teams = self
            .run(Operation::FetchApprovedTeams, || self.fetch(query.clone()))
            .await?;
        teams.retain(|t| t.status == TeamStatus::Approved);
        newest_first(&mut teams);
        Ok(teams)
    }

    /// Every team, newest first, for the review queue
    pub async fn get_all_for_admin(&self) -> Result<Vec<Team>> {
        let query = Query::all().order_by_desc(CREATED_AT);
        self.run(Operation::FetchTeams, || self.fetch(query.clone()))
            .await
    }

    /// Teams created by `owner_id`, newest first
    pub async fn list_teams_by_owner(&self, owner_id: &str) -> Result<Vec<Team>> {
        let query = Query::all().where_eq(CREATED_BY, owner_id);
        let mut teams = self
            .run(Operation::FetchTeams, || self.fetch(query.clone()))
            .await?;
        newest_first(&mut teams);
        Ok(teams)
    }

    pub async fn get_team(&self, team_id: &str) -> Result<Team> {
        self.run(Operation::FetchTeam, || self.fetch_team(team_id))
            .await
    }

    /// Approved teams in leaderboard order
    pub async fn leaderboard(&self) -> Result<Vec<Standing>> {
        Ok(rank_leaderboard(self.list_approved_teams().await?))
    }

    /// Create a pending team owned by `owner_id`.
    pub async fn create_team(&self, new_team: &NewTeam, owner_id: &str) -> Result<Team> {
        let team_name = required(&new_team.team_name, "Team name")?;
        let project_name = required(&new_team.project_name, "Project name")?;
        let owner_id = required(owner_id, "Owner id")?;

        let trimmed = NewTeam {
            team_name: team_name.to_string(),
            project_name: project_name.to_string(),
            logo_url: new_team.logo_url.clone(),
            created_by_name: new_team.created_by_name.clone(),
        };
        let now = Utc::now();
        let fields = record::new_team_fields(&trimmed, owner_id, now);

        let id = self
            .run(Operation::CreateTeam, || self.store.create(TEAMS, fields.clone()))
            .await?;
        info!("Created team {} ({})", id, team_name);

        Ok(decode_team(&Document { id, fields }, now))
    }

    /// Record `rater_id`'s rating, replacing an earlier one by the same rater.
    ///
    /// A non-blank suggestion replaces the rater's previous suggestion; a
    /// re-rating without one drops it.
    pub async fn rate_team(
        &self,
        team_id: &str,
        rating: i64,
        rater_id: &str,
        suggestion: Option<&str>,
    ) -> Result<Team> {
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(TeamError::InvalidRating(rating).into());
        }
        let value = u8::try_from(rating).map_err(|_| TeamError::InvalidRating(rating))?;
        let rater_id = required(rater_id, "Rater id")?;
        let text = suggestion.map(str::trim).filter(|t| !t.is_empty());

        self.run(Operation::RateTeam, || {
            self.rate_once(team_id, value, rater_id, text)
        })
        .await
    }

    /// Set a team's review status. Only reviewers may do this.
    pub async fn set_status(&self, team_id: &str, status: TeamStatus, reviewer_id: &str) -> Result<()> {
        if !self.reviewers.can_review(reviewer_id) {
            return Err(TeamError::NotAuthorized(format!(
                "{} is not allowed to review teams",
                reviewer_id
            ))
            .into());
        }

        let update = Update::new()
            .set(STATUS, status.as_str())
            .set(REVIEWED_BY, reviewer_id.trim())
            .set(REVIEWED_AT, timestamp_value(Utc::now()));

        self.run(Operation::UpdateStatus, || self.apply(team_id, &update))
            .await?;
        info!("Team {} marked {} by {}", team_id, status, reviewer_id.trim());
        Ok(())
    }

    /// Edit a team's name, project or logo. Only its creator may do this.
    pub async fn update_team(&self, team_id: &str, edit: &TeamEdit, actor_id: &str) -> Result<Team> {
        if edit.is_empty() {
            return Err(TeamError::InvalidInput("Nothing to update".to_string()).into());
        }

        let mut update = Update::new();
        if let Some(name) = &edit.team_name {
            update = update.set(TEAM_NAME, required(name, "Team name")?);
        }
        if let Some(project) = &edit.project_name {
            update = update.set(PROJECT_NAME, required(project, "Project name")?);
        }
        if let Some(logo) = &edit.logo_url {
            let logo = logo.trim();
            update = if logo.is_empty() {
                update.set(LOGO_URL, Value::Null)
            } else {
                update.set(LOGO_URL, logo)
            };
        }

        self.run(Operation::UpdateTeam, || {
            self.update_once(team_id, &update, actor_id)
        })
        .await
    }

    /// Retry `operation`, turning an exhausted transient failure into the
    /// operation's user-facing message.
    async fn run<T, F, Fut>(&self, op: Operation, operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        with_retry(&self.retry, operation).await.map_err(|err| {
            if err.is_transient() {
                error!("{:?} failed: {}", op, err);
                TeamError::Unavailable(op).into()
            } else {
                err
            }
        })
    }

    async fn fetch(&self, query: Query) -> Result<Vec<Team>> {
        debug!("Fetching teams ({:?})", query);
        let docs = self.store.list(TEAMS, &query).await?;
        let now = Utc::now();
        Ok(docs.iter().map(|doc| decode_team(doc, now)).collect())
    }

    async fn fetch_document(&self, team_id: &str) -> Result<Document> {
        self.store
            .get(TEAMS, team_id)
            .await?
            .ok_or_else(|| TeamError::TeamNotFound(team_id.to_string()).into())
    }

    async fn fetch_team(&self, team_id: &str) -> Result<Team> {
        let doc = self.fetch_document(team_id).await?;
        Ok(decode_team(&doc, Utc::now()))
    }

    async fn apply(&self, team_id: &str, update: &Update) -> Result<()> {
        self.store
            .update(TEAMS, team_id, update)
            .await
            .map_err(|err| match err {
                Error::Store(StoreError::NotFound(_)) => {
                    TeamError::TeamNotFound(team_id.to_string()).into()
                }
                other => other,
            })
    }

    async fn rate_once(
        &self,
        team_id: &str,
        value: u8,
        rater_id: &str,
        text: Option<&str>,
    ) -> Result<Team> {
        let doc = self.fetch_document(team_id).await?;
        let now = Utc::now();
        let legacy = is_legacy_layout(&doc.fields);
        let team = decode_team(&doc, now);

        let rating = Rating {
            rater_id: rater_id.to_string(),
            value,
        };
        let suggestion = text.map(|text| Suggestion {
            rater_id: rater_id.to_string(),
            text: text.to_string(),
            rating: value,
            submitted_at: now,
        });

        let update = if team.rating_by(rater_id).is_none() && !legacy {
            debug!("First rating of {} by {}", team_id, rater_id);
            let mut update = Update::new().append(RATINGS, vec![rating_value(&rating)]);
            if let Some(suggestion) = &suggestion {
                update = update.append(SUGGESTIONS, vec![suggestion_value(suggestion)]);
            }
            update
        } else {
            debug!("Rewriting ratings of {} for {}", team_id, rater_id);
            let mut ratings = team.ratings;
            match ratings.iter_mut().find(|r| r.rater_id == rater_id) {
                Some(existing) => existing.value = value,
                None => ratings.push(rating),
            }
            let mut suggestions = team.suggestions;
            suggestions.retain(|s| s.rater_id != rater_id);
            suggestions.extend(suggestion);

            let mut update = Update::new()
                .set(RATINGS, Value::Array(ratings.iter().map(rating_value).collect()))
                .set(
                    SUGGESTIONS,
                    Value::Array(suggestions.iter().map(suggestion_value).collect()),
                );
            if legacy {
                update = update.set(RATED_BY, Value::Null);
            }
            update
        };

        self.apply(team_id, &update).await?;
        self.fetch_team(team_id).await
    }

    async fn update_once(&self, team_id: &str, update: &Update, actor_id: &str) -> Result<Team> {
        let team = self.fetch_team(team_id).await?;
        if team.created_by != actor_id.trim() {
            return Err(TeamError::NotAuthorized(
                "only the team's creator can edit it".to_string(),
            )
            .into());
        }
        self.apply(team_id, update).await?;
        self.fetch_team(team_id).await
    }
}

/// Trimmed value, or `InvalidInput` when blank
fn required<'a>(value: &'a str, what: &str) -> Result<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(TeamError::InvalidInput(format!("{} must not be blank", what)).into());
    }
    Ok(value)
}

fn newest_first(teams: &mut [Team]) {
    teams.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{FieldOp, MockStore, SqliteStore};
    use crate::team::policy::ReviewerList;
    use futures::future::join_all;
    use serde_json::json;
    use std::time::Duration;

    fn repo(store: Arc<dyn DocumentStore>) -> TeamRepository {
        TeamRepository::new(store, Arc::new(ReviewerList::new(["admin1"])))
            .with_retry(RetryPolicy::new(3, Duration::from_millis(10)))
    }

    fn network() -> StoreError {
        StoreError::Network("connection reset".to_string())
    }

    async fn seeded() -> Arc<MockStore> {
        Arc::new(
            MockStore::new()
                .with_document(
                    TEAMS,
                    "falcons",
                    json!({
                        "teamName": "Falcons",
                        "projectName": "Orbit",
                        "ratings": [{"raterId": "u1", "value": 8}],
                        "suggestions": [],
                        "createdBy": "owner",
                        "createdAt": "2024-05-01T10:00:00.000Z",
                        "status": "approved"
                    }),
                )
                .await
                .with_document(
                    TEAMS,
                    "owls",
                    json!({
                        "teamName": "Owls",
                        "projectName": "Nest",
                        "ratings": [{"raterId": "u1", "value": 9}, {"raterId": "u2", "value": 9}],
                        "createdBy": "other",
                        "createdAt": "2024-05-03T10:00:00.000Z",
                        "status": "approved"
                    }),
                )
                .await
                .with_document(
                    TEAMS,
                    "hawks",
                    json!({
                        "teamName": "Hawks",
                        "projectName": "Talon",
                        "createdBy": "owner",
                        "createdAt": "2024-05-02T10:00:00.000Z",
                        "status": "pending"
                    }),
                )
                .await,
        )
    }

    #[tokio::test]
    async fn test_rating_scenario() {
        let store = Arc::new(MockStore::new());
        let repo = repo(store.clone());

        let team = repo
            .create_team(&NewTeam::new("Falcons", "Orbit"), "owner")
            .await
            .unwrap();
        assert_eq!(team.total_ratings, 0);
        assert_eq!(team.average_rating, 0.0);
        assert_eq!(team.status, TeamStatus::Pending);

        let team = repo.rate_team(&team.id, 8, "u1", None).await.unwrap();
        assert_eq!(team.values(), vec![8]);
        assert_eq!(team.rated_by(), vec!["u1"]);
        assert_eq!(team.average_rating, 8.0);

        let team = repo.rate_team(&team.id, 5, "u1", None).await.unwrap();
        assert_eq!(team.values(), vec![5]);
        assert_eq!(team.total_ratings, 1);

        let team = repo.rate_team(&team.id, 9, "u2", None).await.unwrap();
        assert_eq!(team.values(), vec![5, 9]);
        assert_eq!(team.rated_by(), vec!["u1", "u2"]);
        assert_eq!(team.average_rating, 7.0);
        assert_eq!(team.total_ratings, 2);
    }

    #[tokio::test]
    async fn test_create_team_trims_and_defaults() {
        let store = Arc::new(MockStore::new());
        let repo = repo(store.clone());

        let team = repo
            .create_team(&NewTeam::new("  Falcons ", " Orbit"), "owner")
            .await
            .unwrap();
        assert_eq!(team.id, "mock-team-1");
        assert_eq!(team.team_name, "Falcons");
        assert_eq!(team.project_name, "Orbit");
        assert_eq!(team.created_by_name, "Anonymous");
        assert!(team.logo_url.is_none());

        let stored = store.fields(TEAMS, &team.id).await.unwrap();
        assert_eq!(stored["teamName"], json!("Falcons"));
        assert!(!stored.contains_key("averageRating"));
    }

    #[tokio::test]
    async fn test_create_team_rejects_blank_names() {
        let store = Arc::new(MockStore::new());
        let repo = repo(store.clone());

        let err = repo
            .create_team(&NewTeam::new("   ", "Orbit"), "owner")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Team(TeamError::InvalidInput(_))));
        assert_eq!(store.call_counts().await.total(), 0);
    }

    #[tokio::test]
    async fn test_first_rating_is_one_combined_append() {
        let store = seeded().await;
        let repo = repo(store.clone());

        let team = repo
            .rate_team("hawks", 7, "u3", Some("  Add a demo video "))
            .await
            .unwrap();
        assert_eq!(team.values(), vec![7]);
        assert_eq!(team.suggestions.len(), 1);
        assert_eq!(team.suggestions[0].text, "Add a demo video");
        assert_eq!(team.suggestions[0].rating, 7);

        let updates = store.updates().await;
        assert_eq!(updates.len(), 1);
        let ops = &updates[0].1.ops;
        assert_eq!(ops.len(), 2);
        assert!(matches!(&ops[0], FieldOp::Append(field, _) if field == RATINGS));
        assert!(matches!(&ops[1], FieldOp::Append(field, _) if field == SUGGESTIONS));
    }

    #[tokio::test]
    async fn test_rerating_replaces_suggestion() {
        let store = seeded().await;
        let repo = repo(store.clone());

        repo.rate_team("hawks", 8, "u1", Some("Great")).await.unwrap();
        let team = repo
            .rate_team("hawks", 6, "u1", Some("Better docs"))
            .await
            .unwrap();
        assert_eq!(team.values(), vec![6]);
        assert_eq!(team.suggestions.len(), 1);
        assert_eq!(team.suggestions[0].text, "Better docs");
        assert_eq!(team.suggestions[0].rating, 6);

        let team = repo.rate_team("hawks", 7, "u1", None).await.unwrap();
        assert_eq!(team.values(), vec![7]);
        assert!(team.suggestions.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_rating_makes_no_store_calls() {
        let store = seeded().await;
        let repo = repo(store.clone());

        for rating in [0, 11, -3] {
            let err = repo.rate_team("falcons", rating, "u9", None).await.unwrap_err();
            assert!(matches!(err, Error::Team(TeamError::InvalidRating(r)) if r == rating));
        }
        assert_eq!(store.call_counts().await.total(), 0);
    }

    #[tokio::test]
    async fn test_rate_unknown_team_is_not_retried() {
        let store = Arc::new(MockStore::new());
        let repo = repo(store.clone());

        let err = repo.rate_team("missing", 5, "u1", None).await.unwrap_err();
        assert!(matches!(err, Error::Team(TeamError::TeamNotFound(ref id)) if id == "missing"));

        let counts = store.call_counts().await;
        assert_eq!(counts.get, 1);
        assert_eq!(counts.update, 0);
    }

    #[tokio::test]
    async fn test_transient_failure_recovers() {
        let store = Arc::new(
            MockStore::new()
                .with_document(TEAMS, "falcons", json!({"teamName": "Falcons"}))
                .await
                .fail_next(2, network)
                .await,
        );
        let repo = repo(store.clone());

        let teams = repo.list_teams().await.unwrap();
        assert_eq!(teams.len(), 1);
        assert_eq!(store.call_counts().await.list, 3);
    }

    #[tokio::test]
    async fn test_exhausted_retries_become_unavailable() {
        let store = Arc::new(MockStore::new().fail_next(3, network).await);
        let repo = repo(store.clone());

        let err = repo.list_teams().await.unwrap_err();
        assert!(matches!(
            err,
            Error::Team(TeamError::Unavailable(Operation::FetchTeams))
        ));
        assert_eq!(
            err.to_string(),
            "Failed to fetch teams. Please check your internet connection."
        );
        assert_eq!(store.call_counts().await.list, 3);
    }

    #[tokio::test]
    async fn test_rate_failure_message() {
        let store = Arc::new(MockStore::new().fail_next(3, network).await);
        let repo = repo(store.clone());

        let err = repo.rate_team("falcons", 5, "u1", None).await.unwrap_err();
        assert!(err.to_string().starts_with("Failed to submit rating."));
    }

    #[tokio::test]
    async fn test_approved_teams_newest_first() {
        let store = seeded().await;
        let repo = repo(store.clone());

        let teams = repo.list_approved_teams().await.unwrap();
        let ids: Vec<&str> = teams.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["owls", "falcons"]);
        assert!(teams.iter().all(|t| t.status == TeamStatus::Approved));
    }

    #[tokio::test]
    async fn test_admin_list_and_owner_list() {
        let store = seeded().await;
        let repo = repo(store.clone());

        let all = repo.get_all_for_admin().await.unwrap();
        let ids: Vec<&str> = all.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["owls", "hawks", "falcons"]);

        let mine = repo.list_teams_by_owner("owner").await.unwrap();
        let ids: Vec<&str> = mine.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["hawks", "falcons"]);
    }

    #[tokio::test]
    async fn test_leaderboard_ranks_approved_teams() {
        let store = seeded().await;
        let repo = repo(store.clone());

        let standings = repo.leaderboard().await.unwrap();
        assert_eq!(standings.len(), 2);
        assert_eq!(standings[0].team.id, "owls");
        assert_eq!(standings[0].position, 1);
        assert_eq!(standings[1].team.id, "falcons");
    }

    #[tokio::test]
    async fn test_set_status_by_reviewer() {
        let store = seeded().await;
        let repo = repo(store.clone());

        repo.set_status("hawks", TeamStatus::Approved, "Admin1")
            .await
            .unwrap();

        let approved = repo.list_approved_teams().await.unwrap();
        let hawks = approved.iter().find(|t| t.id == "hawks").unwrap();
        assert_eq!(hawks.reviewed_by.as_deref(), Some("Admin1"));
        assert!(hawks.reviewed_at.is_some());
    }

    #[tokio::test]
    async fn test_set_status_requires_reviewer() {
        let store = seeded().await;
        let repo = repo(store.clone());

        let err = repo
            .set_status("hawks", TeamStatus::Approved, "u1")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Team(TeamError::NotAuthorized(_))));
        assert_eq!(store.call_counts().await.total(), 0);
    }

    #[tokio::test]
    async fn test_set_status_unknown_team() {
        let store = Arc::new(MockStore::new());
        let repo = repo(store.clone());

        let err = repo
            .set_status("missing", TeamStatus::Rejected, "admin1")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Team(TeamError::TeamNotFound(_))));
        assert_eq!(store.call_counts().await.update, 1);
    }

    #[tokio::test]
    async fn test_update_team_by_owner() {
        let store = seeded().await;
        let repo = repo(store.clone());

        let edit = TeamEdit {
            team_name: Some(" Hawks II ".to_string()),
            logo_url: Some("https://example.com/hawk.png".to_string()),
            ..TeamEdit::default()
        };
        let team = repo.update_team("hawks", &edit, "owner").await.unwrap();
        assert_eq!(team.team_name, "Hawks II");
        assert_eq!(team.project_name, "Talon");
        assert_eq!(team.logo_url.as_deref(), Some("https://example.com/hawk.png"));

        let clear = TeamEdit {
            logo_url: Some(String::new()),
            ..TeamEdit::default()
        };
        let team = repo.update_team("hawks", &clear, "owner").await.unwrap();
        assert!(team.logo_url.is_none());
    }

    #[tokio::test]
    async fn test_update_team_rejections() {
        let store = seeded().await;
        let repo = repo(store.clone());

        let rename = TeamEdit {
            team_name: Some("Stolen".to_string()),
            ..TeamEdit::default()
        };
        let err = repo.update_team("hawks", &rename, "intruder").await.unwrap_err();
        assert!(matches!(err, Error::Team(TeamError::NotAuthorized(_))));

        let err = repo
            .update_team("hawks", &TeamEdit::default(), "owner")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Team(TeamError::InvalidInput(_))));

        let blank = TeamEdit {
            project_name: Some("  ".to_string()),
            ..TeamEdit::default()
        };
        let err = repo.update_team("hawks", &blank, "owner").await.unwrap_err();
        assert!(matches!(err, Error::Team(TeamError::InvalidInput(_))));

        let err = repo.update_team("missing", &rename, "owner").await.unwrap_err();
        assert!(matches!(err, Error::Team(TeamError::TeamNotFound(_))));
    }

    #[tokio::test]
    async fn test_rating_migrates_legacy_layout() {
        let store = Arc::new(
            MockStore::new()
                .with_document(
                    TEAMS,
                    "legacy",
                    json!({
                        "teamName": "Legacy",
                        "projectName": "Old",
                        "ratings": [8],
                        "ratedBy": ["u1"],
                        "createdBy": "owner",
                        "status": "approved"
                    }),
                )
                .await,
        );
        let repo = repo(store.clone());

        let team = repo.rate_team("legacy", 9, "u2", None).await.unwrap();
        assert_eq!(team.values(), vec![8, 9]);
        assert_eq!(team.rated_by(), vec!["u1", "u2"]);

        let stored = store.fields(TEAMS, "legacy").await.unwrap();
        assert_eq!(
            stored["ratings"],
            json!([{"raterId": "u1", "value": 8}, {"raterId": "u2", "value": 9}])
        );
        assert_eq!(stored["ratedBy"], Value::Null);
    }

    #[tokio::test]
    async fn test_concurrent_first_ratings_all_land() {
        let store = Arc::new(MockStore::new());
        let repo = repo(store.clone());
        let team = repo
            .create_team(&NewTeam::new("Falcons", "Orbit"), "owner")
            .await
            .unwrap();

        let raters: Vec<String> = (1..=10).map(|i| format!("rater-{}", i)).collect();
        let results = join_all(
            raters
                .iter()
                .enumerate()
                .map(|(i, rater)| repo.rate_team(&team.id, (i % 10 + 1) as i64, rater, None)),
        )
        .await;
        assert!(results.iter().all(|r| r.is_ok()));

        let team = repo.get_team(&team.id).await.unwrap();
        assert_eq!(team.total_ratings, 10);
        assert_eq!(team.values().len(), team.rated_by().len());
        assert_eq!(team.average_rating, 5.5);
    }

    #[tokio::test]
    async fn test_concurrent_ratings_on_sqlite() {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let repo = repo(store);
        let team = repo
            .create_team(&NewTeam::new("Owls", "Nest"), "owner")
            .await
            .unwrap();

        let raters: Vec<String> = (1..=8).map(|i| format!("rater-{}", i)).collect();
        let results = join_all(
            raters
                .iter()
                .map(|rater| repo.rate_team(&team.id, 6, rater, Some("solid"))),
        )
        .await;
        assert!(results.iter().all(|r| r.is_ok()));

        let team = repo.get_team(&team.id).await.unwrap();
        assert_eq!(team.total_ratings, 8);
        assert_eq!(team.suggestions.len(), 8);
        assert_eq!(team.average_rating, 6.0);
    }

    #[tokio::test]
    async fn test_admin_list_orders_mixed_precision_timestamps() {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        for (name, created_at) in [
            ("Early", "2024-05-01T10:00:00Z"),
            ("Later", "2024-05-01T10:00:00.500Z"),
        ] {
            let fields = json!({"teamName": name, "projectName": "P", "createdAt": created_at});
            store
                .create(TEAMS, fields.as_object().cloned().unwrap())
                .await
                .unwrap();
        }

        let teams = repo(store).get_all_for_admin().await.unwrap();
        let names: Vec<&str> = teams.iter().map(|t| t.team_name.as_str()).collect();
        assert_eq!(names, vec!["Later", "Early"]);
    }
}
