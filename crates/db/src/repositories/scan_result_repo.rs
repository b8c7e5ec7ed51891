//! Repository for `scan_results` and the subtype tables.

use sqlx::PgPool;
use veille_core::types::DbId;

use crate::models::scan_result::{CreateScanResult, ResultDetail, ScanResult, ScanResultRow};

/// Base query joining both subtype tables.
const SELECT_JOINED: &str = "SELECT r.id, r.scan_id, r.date_posted, r.source, r.details, r.created_at,
            j.title AS journal_title, j.author AS journal_author,
            s.author AS social_author, s.comment_count AS social_comment_count,
            s.share_count AS social_share_count, s.like_count AS social_like_count
     FROM scan_results r
     LEFT JOIN journals j ON j.scan_result_id = r.id
     LEFT JOIN social_posts s ON s.scan_result_id = r.id";

pub struct ScanResultRepo;

impl ScanResultRepo {
    /// Insert a result and its subtype row under the same id.
    pub async fn create(
        pool: &PgPool,
        input: &CreateScanResult,
    ) -> Result<ScanResult, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let (id, created_at): (DbId, veille_core::types::Timestamp) = sqlx::query_as(
            "INSERT INTO scan_results (scan_id, date_posted, source, details)
             VALUES ($1, $2, $3, $4)
             RETURNING id, created_at",
        )
        .bind(input.scan_id)
        .bind(input.date_posted)
        .bind(&input.source)
        .bind(&input.details)
        .fetch_one(&mut *tx)
        .await?;

        match &input.detail {
            ResultDetail::Article { title, author } => {
                sqlx::query(
                    "INSERT INTO journals (scan_result_id, title, author) VALUES ($1, $2, $3)",
                )
                .bind(id)
                .bind(title)
                .bind(author)
                .execute(&mut *tx)
                .await?;
            }
            ResultDetail::SocialPost {
                author,
                comment_count,
                share_count,
                like_count,
            } => {
                sqlx::query(
                    "INSERT INTO social_posts
                        (scan_result_id, author, comment_count, share_count, like_count)
                     VALUES ($1, $2, $3, $4, $5)",
                )
                .bind(id)
                .bind(author)
                .bind(comment_count)
                .bind(share_count)
                .bind(like_count)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;

        Ok(ScanResult {
            id,
            scan_id: input.scan_id,
            date_posted: input.date_posted,
            source: input.source.clone(),
            details: input.details.clone(),
            created_at,
            detail: Some(input.detail.clone()),
        })
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ScanResult>, sqlx::Error> {
        let query = format!("{SELECT_JOINED} WHERE r.id = $1");
        let row = sqlx::query_as::<_, ScanResultRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(ScanResult::from))
    }

    /// All results of a scan, newest posting first.
    pub async fn list_by_scan(pool: &PgPool, scan_id: DbId) -> Result<Vec<ScanResult>, sqlx::Error> {
        let query = format!("{SELECT_JOINED} WHERE r.scan_id = $1 ORDER BY r.date_posted DESC, r.id");
        let rows = sqlx::query_as::<_, ScanResultRow>(&query)
            .bind(scan_id)
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(ScanResult::from).collect())
    }

    pub async fn count_by_scan(pool: &PgPool, scan_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM scan_results WHERE scan_id = $1")
            .bind(scan_id)
            .fetch_one(pool)
            .await
    }
}
