use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Cat;

/// Adoption entity - links a user to a cat they have claimed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adoption {
    pub id: i32,
    pub user_id: i32,
    pub cat_id: i32,
    pub adopted_at: DateTime<Utc>,
}

/// An adoption joined with the adopted cat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdoptedCat {
    pub adoption: Adoption,
    pub cat: Cat,
}
