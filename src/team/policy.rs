//! Who may review teams

/// Decides whether an identity may change a team's review status
pub trait ReviewPolicy: Send + Sync {
    fn can_review(&self, actor_id: &str) -> bool;
}

/// Fixed list of reviewer identities, compared case-insensitively.
///
/// An empty list authorizes nobody.
#[derive(Debug, Clone, Default)]
pub struct ReviewerList {
    reviewers: Vec<String>,
}

impl ReviewerList {
    pub fn new<I, S>(reviewers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let reviewers = reviewers
            .into_iter()
            .map(|r| normalize(r.as_ref()))
            .filter(|r| !r.is_empty())
            .collect();
        Self { reviewers }
    }

    pub fn is_empty(&self) -> bool {
        self.reviewers.is_empty()
    }
}

fn normalize(id: &str) -> String {
    id.trim().to_lowercase()
}

impl ReviewPolicy for ReviewerList {
    fn can_review(&self, actor_id: &str) -> bool {
        let actor = normalize(actor_id);
        !actor.is_empty() && self.reviewers.contains(&actor)
    }
}
