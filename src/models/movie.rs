use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub description: String,
    /// Minutes
    pub duration: i32,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewMovie {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[validate(range(min = 1))]
    pub duration: i32,
}
