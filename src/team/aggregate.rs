//! Rating aggregation and leaderboard ordering

use std::cmp::Ordering;

use serde::Serialize;

use super::model::Team;

/// Number of distinct scores on the rating scale
pub const SCALE: usize = 10;

/// Mean rating rounded to one decimal place.
///
/// An empty slice yields `0.0`, which callers read as "no ratings" since 0 is
/// outside the rating scale. Values are not range-checked.
pub fn compute_average(ratings: &[u8]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    let sum: f64 = ratings.iter().map(|&r| f64::from(r)).sum();
    let mean = sum / ratings.len() as f64;
    (mean * 10.0).round() / 10.0
}

/// Count of each score 1..=10; index 0 holds the count of 1s.
///
/// Out-of-scale values are ignored.
pub fn distribution(ratings: &[u8]) -> [usize; SCALE] {
    let mut counts = [0; SCALE];
    for &r in ratings {
        if (1..=SCALE as u8).contains(&r) {
            counts[usize::from(r) - 1] += 1;
        }
    }
    counts
}

/// Most frequent score, lowest score winning ties
pub fn most_common(ratings: &[u8]) -> Option<u8> {
    let counts = distribution(ratings);
    let (idx, &count) = counts
        .iter()
        .enumerate()
        .max_by(|(ia, a), (ib, b)| a.cmp(b).then(ib.cmp(ia)))?;
    (count > 0).then_some(idx as u8 + 1)
}

/// Lowest and highest score given
pub fn score_range(ratings: &[u8]) -> Option<(u8, u8)> {
    let min = *ratings.iter().min()?;
    let max = *ratings.iter().max()?;
    Some((min, max))
}

/// A team's place on the leaderboard
#[derive(Debug, Clone, Serialize)]
pub struct Standing {
    /// 1-based rank
    pub position: usize,
    pub team: Team,
}

/// Rank teams by average rating, then number of ratings, then name.
pub fn rank_leaderboard(mut teams: Vec<Team>) -> Vec<Standing> {
    teams.sort_by(|a, b| {
        b.average_rating
            .partial_cmp(&a.average_rating)
            .unwrap_or(Ordering::Equal)
            .then(b.total_ratings.cmp(&a.total_ratings))
            .then_with(|| a.team_name.to_lowercase().cmp(&b.team_name.to_lowercase()))
    });

    teams
        .into_iter()
        .enumerate()
        .map(|(i, team)| Standing {
            position: i + 1,
            team,
        })
        .collect()
}
