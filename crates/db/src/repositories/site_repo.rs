//! Repository for the `sites` table.

use sqlx::PgPool;
use veille_core::types::DbId;

use crate::models::site::{CreateSite, Site};

const COLUMNS: &str = "id, name, url, created_at, updated_at";

pub struct SiteRepo;

impl SiteRepo {
    pub async fn create(pool: &PgPool, input: &CreateSite) -> Result<Site, sqlx::Error> {
        let query = format!(
            "INSERT INTO sites (name, url) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Site>(&query)
            .bind(input.name.trim())
            .bind(&input.url)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Site>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sites WHERE id = $1");
        sqlx::query_as::<_, Site>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all sites alphabetically.
    pub async fn list(pool: &PgPool) -> Result<Vec<Site>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sites ORDER BY name, id");
        sqlx::query_as::<_, Site>(&query).fetch_all(pool).await
    }

    /// Delete a site. Schedule and scan site links cascade.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sites WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
