//! Teams, ratings and the review workflow

pub mod aggregate;
pub mod model;
pub mod policy;
pub mod record;
pub mod repository;
pub mod retry;

pub use aggregate::Standing;
pub use model::{NewTeam, Team, TeamEdit, TeamStatus};
pub use policy::{ReviewPolicy, ReviewerList};
pub use repository::TeamRepository;
pub use retry::RetryPolicy;
