//! Stored team record layout
//!
//! Converts between raw document fields and [`Team`]. Reading is lenient:
//! malformed entries are skipped with a warning rather than failing the whole
//! listing, and the legacy parallel-array rating layout is still understood.

use chrono::{DateTime, SecondsFormat, Utc};
use log::warn;
use serde_json::{Value, json};

use super::aggregate::compute_average;
use super::model::{ANONYMOUS, NewTeam, Rating, Suggestion, Team, TeamStatus};
use crate::store::{Document, Fields};

pub const TEAM_NAME: &str = "teamName";
pub const PROJECT_NAME: &str = "projectName";
pub const LOGO_URL: &str = "logoUrl";
pub const RATINGS: &str = "ratings";
pub const RATED_BY: &str = "ratedBy";
pub const SUGGESTIONS: &str = "suggestions";
pub const CREATED_BY: &str = "createdBy";
pub const CREATED_BY_NAME: &str = "createdByName";
pub const CREATED_AT: &str = "createdAt";
pub const STATUS: &str = "status";
pub const REVIEWED_BY: &str = "reviewedBy";
pub const REVIEWED_AT: &str = "reviewedAt";

/// Encode a timestamp the way every record stores it.
///
/// Fixed millisecond precision with a `Z` suffix keeps string order equal to
/// time order, which the stores rely on for `createdAt` ordering.
pub fn timestamp_value(ts: DateTime<Utc>) -> Value {
    Value::String(ts.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Read a stored timestamp: RFC 3339 string, epoch millis, or a
/// `{seconds, nanoseconds}` map as exported by the hosted store's SDKs.
pub fn coerce_timestamp(value: Option<&Value>) -> Option<DateTime<Utc>> {
    match value? {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|ts| ts.with_timezone(&Utc)),
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        Value::Object(map) => {
            let seconds = map
                .get("seconds")
                .or_else(|| map.get("_seconds"))
                .and_then(Value::as_i64)?;
            let nanos = map
                .get("nanoseconds")
                .or_else(|| map.get("_nanoseconds"))
                .and_then(Value::as_u64)
                .unwrap_or(0);
            DateTime::from_timestamp(seconds, u32::try_from(nanos).unwrap_or(0))
        }
        _ => None,
    }
}

pub fn rating_value(rating: &Rating) -> Value {
    json!({
        "raterId": rating.rater_id,
        "value": rating.value,
    })
}

pub fn suggestion_value(suggestion: &Suggestion) -> Value {
    json!({
        "raterId": suggestion.rater_id,
        "text": suggestion.text,
        "rating": suggestion.rating,
        "submittedAt": timestamp_value(suggestion.submitted_at),
    })
}

/// Whether the record still uses parallel `ratings`/`ratedBy` arrays.
pub fn is_legacy_layout(fields: &Fields) -> bool {
    fields
        .get(RATINGS)
        .and_then(Value::as_array)
        .is_some_and(|items| items.iter().any(Value::is_number))
}

/// Fields for a freshly created team. Names are expected to be trimmed.
pub fn new_team_fields(new_team: &NewTeam, owner_id: &str, now: DateTime<Utc>) -> Fields {
    let mut fields = Fields::new();
    fields.insert(TEAM_NAME.into(), Value::String(new_team.team_name.clone()));
    fields.insert(PROJECT_NAME.into(), Value::String(new_team.project_name.clone()));
    if let Some(logo) = new_team.logo_url.as_deref().map(str::trim)
        && !logo.is_empty()
    {
        fields.insert(LOGO_URL.into(), Value::String(logo.to_string()));
    }
    fields.insert(RATINGS.into(), Value::Array(Vec::new()));
    fields.insert(SUGGESTIONS.into(), Value::Array(Vec::new()));
    fields.insert(CREATED_BY.into(), Value::String(owner_id.to_string()));
    let name = new_team
        .created_by_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(ANONYMOUS);
    fields.insert(CREATED_BY_NAME.into(), Value::String(name.to_string()));
    fields.insert(CREATED_AT.into(), timestamp_value(now));
    fields.insert(STATUS.into(), Value::String(TeamStatus::Pending.as_str().into()));
    fields.insert(REVIEWED_BY.into(), Value::Null);
    fields.insert(REVIEWED_AT.into(), Value::Null);
    fields
}

fn string_field(fields: &Fields, key: &str) -> Option<String> {
    fields.get(key).and_then(Value::as_str).map(str::to_string)
}

fn score(value: &Value) -> Option<u8> {
    value.as_i64().and_then(|v| u8::try_from(v).ok())
}

fn decode_ratings(id: &str, fields: &Fields) -> Vec<Rating> {
    let items = match fields.get(RATINGS).and_then(Value::as_array) {
        Some(items) => items,
        None => return Vec::new(),
    };

    let mut ratings: Vec<Rating> = Vec::with_capacity(items.len());
    let mut push = |rater_id: String, value: u8| {
        if ratings.iter().any(|r| r.rater_id == rater_id) {
            warn!("Team {} has a duplicate rating from {}; keeping the first", id, rater_id);
        } else {
            ratings.push(Rating { rater_id, value });
        }
    };

    if is_legacy_layout(fields) {
        let raters: Vec<&Value> = fields
            .get(RATED_BY)
            .and_then(Value::as_array)
            .map(|r| r.iter().collect())
            .unwrap_or_default();
        if raters.len() != items.len() {
            warn!(
                "Team {} has {} ratings but {} raters; ignoring the unmatched tail",
                id,
                items.len(),
                raters.len()
            );
        }
        for (value, rater) in items.iter().zip(raters) {
            match (score(value), rater.as_str()) {
                (Some(value), Some(rater)) => push(rater.to_string(), value),
                _ => warn!("Team {} has a malformed legacy rating entry", id),
            }
        }
    } else {
        for item in items {
            let rater = item.get("raterId").and_then(Value::as_str);
            let value = item.get("value").and_then(score);
            match (rater, value) {
                (Some(rater), Some(value)) => push(rater.to_string(), value),
                _ => warn!("Team {} has a malformed rating entry: {}", id, item),
            }
        }
    }
    ratings
}

fn decode_suggestions(id: &str, fields: &Fields, now: DateTime<Utc>) -> Vec<Suggestion> {
    let Some(items) = fields.get(SUGGESTIONS).and_then(Value::as_array) else {
        return Vec::new();
    };

    let mut suggestions: Vec<Suggestion> = Vec::with_capacity(items.len());
    for item in items {
        // Older records used userId/suggestion/timestamp
        let rater = item
            .get("raterId")
            .or_else(|| item.get("userId"))
            .and_then(Value::as_str);
        let text = item
            .get("text")
            .or_else(|| item.get("suggestion"))
            .and_then(Value::as_str);
        let (Some(rater), Some(text)) = (rater, text) else {
            warn!("Team {} has a malformed suggestion entry: {}", id, item);
            continue;
        };
        if suggestions.iter().any(|s| s.rater_id == rater) {
            continue;
        }
        let submitted_at = coerce_timestamp(item.get("submittedAt").or_else(|| item.get("timestamp")))
            .unwrap_or(now);
        suggestions.push(Suggestion {
            rater_id: rater.to_string(),
            text: text.to_string(),
            rating: item.get("rating").and_then(score).unwrap_or(0),
            submitted_at,
        });
    }
    suggestions
}

/// Build a [`Team`] from a stored document, deriving the aggregates.
///
/// `now` stands in for unreadable creation and suggestion timestamps.
pub fn decode_team(doc: &Document, now: DateTime<Utc>) -> Team {
    let fields = &doc.fields;

    let status = match fields.get(STATUS).and_then(Value::as_str) {
        None => TeamStatus::Pending,
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("Team {} has unknown status '{}'; treating as pending", doc.id, raw);
            TeamStatus::Pending
        }),
    };

    let ratings = decode_ratings(&doc.id, fields);
    let values: Vec<u8> = ratings.iter().map(|r| r.value).collect();

    Team {
        id: doc.id.clone(),
        team_name: string_field(fields, TEAM_NAME).unwrap_or_default(),
        project_name: string_field(fields, PROJECT_NAME).unwrap_or_default(),
        logo_url: string_field(fields, LOGO_URL).filter(|l| !l.is_empty()),
        average_rating: compute_average(&values),
        total_ratings: ratings.len(),
        ratings,
        suggestions: decode_suggestions(&doc.id, fields, now),
        created_by: string_field(fields, CREATED_BY).unwrap_or_default(),
        created_by_name: string_field(fields, CREATED_BY_NAME)
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| ANONYMOUS.to_string()),
        created_at: coerce_timestamp(fields.get(CREATED_AT)).unwrap_or(now),
        status,
        reviewed_by: string_field(fields, REVIEWED_BY),
        reviewed_at: coerce_timestamp(fields.get(REVIEWED_AT)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(fields: Value) -> Document {
        Document {
            id: "team-1".to_string(),
            fields: fields.as_object().cloned().unwrap(),
        }
    }

    fn ts(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_timestamp_value_sorts_as_string() {
        let earlier = timestamp_value(ts("2024-05-01T09:59:59.5Z"));
        let later = timestamp_value(ts("2024-05-01T10:00:00Z"));
        assert_eq!(later, json!("2024-05-01T10:00:00.000Z"));
        assert!(earlier.as_str().unwrap() < later.as_str().unwrap());
    }

    #[test]
    fn test_coerce_timestamp_variants() {
        let expected = ts("2024-05-01T10:00:00Z");
        assert_eq!(coerce_timestamp(Some(&json!("2024-05-01T10:00:00Z"))), Some(expected));
        assert_eq!(
            coerce_timestamp(Some(&json!(expected.timestamp_millis()))),
            Some(expected)
        );
        assert_eq!(
            coerce_timestamp(Some(&json!({"seconds": expected.timestamp(), "nanoseconds": 0}))),
            Some(expected)
        );
        assert_eq!(coerce_timestamp(Some(&json!("yesterday"))), None);
        assert_eq!(coerce_timestamp(Some(&Value::Null)), None);
        assert_eq!(coerce_timestamp(None), None);
    }

    #[test]
    fn test_new_team_fields() {
        let now = ts("2024-05-01T10:00:00Z");
        let new_team = NewTeam::new("Falcons", "Orbit").logo_url("  ");
        let fields = new_team_fields(&new_team, "u1", now);

        assert_eq!(fields[TEAM_NAME], json!("Falcons"));
        assert_eq!(fields[RATINGS], json!([]));
        assert_eq!(fields[SUGGESTIONS], json!([]));
        assert_eq!(fields[STATUS], json!("pending"));
        assert_eq!(fields[CREATED_BY_NAME], json!("Anonymous"));
        assert_eq!(fields[CREATED_AT], json!("2024-05-01T10:00:00.000Z"));
        assert!(!fields.contains_key(LOGO_URL));
        assert!(!fields.contains_key("averageRating"));
        assert!(!fields.contains_key("totalRatings"));
    }

    #[test]
    fn test_decode_pairs_layout() {
        let now = Utc::now();
        let team = decode_team(
            &doc(json!({
                "teamName": "Falcons",
                "projectName": "Orbit",
                "ratings": [{"raterId": "u1", "value": 5}, {"raterId": "u2", "value": 9}],
                "suggestions": [{
                    "raterId": "u2",
                    "text": "More tests",
                    "rating": 9,
                    "submittedAt": "2024-05-02T08:00:00.000Z"
                }],
                "createdBy": "owner",
                "createdByName": "Ada",
                "createdAt": "2024-05-01T10:00:00.000Z",
                "status": "approved",
                "reviewedBy": "admin1",
                "reviewedAt": "2024-05-03T10:00:00.000Z"
            })),
            now,
        );

        assert_eq!(team.values(), vec![5, 9]);
        assert_eq!(team.rated_by(), vec!["u1", "u2"]);
        assert_eq!(team.average_rating, 7.0);
        assert_eq!(team.total_ratings, 2);
        assert_eq!(team.suggestions.len(), 1);
        assert_eq!(team.suggestions[0].submitted_at, ts("2024-05-02T08:00:00Z"));
        assert_eq!(team.status, TeamStatus::Approved);
        assert_eq!(team.reviewed_by.as_deref(), Some("admin1"));
        assert_eq!(team.created_at, ts("2024-05-01T10:00:00Z"));
    }

    #[test]
    fn test_decode_defaults() {
        let now = Utc::now();
        let team = decode_team(&doc(json!({"teamName": "Owls", "projectName": "Nest"})), now);

        assert_eq!(team.status, TeamStatus::Pending);
        assert_eq!(team.created_by_name, "Anonymous");
        assert_eq!(team.created_at, now);
        assert_eq!(team.average_rating, 0.0);
        assert_eq!(team.total_ratings, 0);
        assert!(team.reviewed_by.is_none());
        assert!(team.reviewed_at.is_none());
        assert!(team.logo_url.is_none());
    }

    #[test]
    fn test_decode_legacy_parallel_arrays() {
        let fields = json!({
            "teamName": "Hawks",
            "projectName": "Talon",
            "ratings": [8, 6, 4],
            "ratedBy": ["u1", "u2"],
            "suggestions": [{"userId": "u1", "suggestion": "Nice", "rating": 8, "timestamp": 1714557600000i64}]
        });
        assert!(is_legacy_layout(fields.as_object().unwrap()));

        let team = decode_team(&doc(fields), Utc::now());
        assert_eq!(team.values(), vec![8, 6]);
        assert_eq!(team.rated_by(), vec!["u1", "u2"]);
        assert_eq!(team.average_rating, 7.0);
        assert_eq!(team.suggestions[0].text, "Nice");
        assert_eq!(team.suggestions[0].submitted_at, ts("2024-05-01T10:00:00Z"));
    }

    #[test]
    fn test_decode_keeps_first_duplicate_rater() {
        let team = decode_team(
            &doc(json!({
                "ratings": [
                    {"raterId": "u1", "value": 3},
                    {"raterId": "u1", "value": 9},
                    {"raterId": "u2"}
                ]
            })),
            Utc::now(),
        );
        assert_eq!(team.values(), vec![3]);
        assert_eq!(team.total_ratings, 1);
    }

    #[test]
    fn test_unknown_status_reads_as_pending() {
        let team = decode_team(&doc(json!({"status": "archived"})), Utc::now());
        assert_eq!(team.status, TeamStatus::Pending);
    }
}
