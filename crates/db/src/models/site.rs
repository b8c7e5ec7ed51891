//! Site entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use veille_core::types::{DbId, Timestamp};

/// A row from the `sites` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Site {
    pub id: DbId,
    pub name: String,
    pub url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new site.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSite {
    pub name: String,
    pub url: Option<String>,
}
