//! Scan result entity model.
//!
//! A result is a base row in `scan_results` plus exactly one subtype row
//! (`journals` for news articles, `social_posts` for social media) sharing
//! its id. In Rust the subtype is the [`ResultDetail`] enum.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use veille_core::types::{DbId, Timestamp};

/// Subtype payload of a scan result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResultDetail {
    /// A news article.
    Article { title: String, author: String },
    /// A social network post.
    SocialPost {
        author: String,
        comment_count: i32,
        share_count: i32,
        like_count: i32,
    },
}

impl ResultDetail {
    pub fn title(&self) -> Option<&str> {
        match self {
            Self::Article { title, .. } => Some(title),
            Self::SocialPost { .. } => None,
        }
    }

    pub fn author(&self) -> &str {
        match self {
            Self::Article { author, .. } | Self::SocialPost { author, .. } => author,
        }
    }
}

/// A scan result with its subtype.
#[derive(Debug, Clone, Serialize)]
pub struct ScanResult {
    pub id: DbId,
    pub scan_id: DbId,
    pub date_posted: Timestamp,
    pub source: String,
    pub details: String,
    pub created_at: Timestamp,
    /// `None` only for legacy rows without a subtype.
    pub detail: Option<ResultDetail>,
}

impl ScanResult {
    pub fn title(&self) -> Option<&str> {
        self.detail.as_ref().and_then(ResultDetail::title)
    }
}

/// Flat row produced by joining `scan_results` with both subtype tables.
#[derive(Debug, FromRow)]
pub(crate) struct ScanResultRow {
    pub id: DbId,
    pub scan_id: DbId,
    pub date_posted: Timestamp,
    pub source: String,
    pub details: String,
    pub created_at: Timestamp,
    pub journal_title: Option<String>,
    pub journal_author: Option<String>,
    pub social_author: Option<String>,
    pub social_comment_count: Option<i32>,
    pub social_share_count: Option<i32>,
    pub social_like_count: Option<i32>,
}

impl From<ScanResultRow> for ScanResult {
    fn from(row: ScanResultRow) -> Self {
        let detail = match (row.journal_title, row.journal_author, row.social_author) {
            (Some(title), Some(author), _) => Some(ResultDetail::Article { title, author }),
            (_, _, Some(author)) => Some(ResultDetail::SocialPost {
                author,
                comment_count: row.social_comment_count.unwrap_or(0),
                share_count: row.social_share_count.unwrap_or(0),
                like_count: row.social_like_count.unwrap_or(0),
            }),
            _ => None,
        };

        Self {
            id: row.id,
            scan_id: row.scan_id,
            date_posted: row.date_posted,
            source: row.source,
            details: row.details,
            created_at: row.created_at,
            detail,
        }
    }
}

/// DTO for inserting a result together with its subtype.
#[derive(Debug, Clone)]
pub struct CreateScanResult {
    pub scan_id: DbId,
    pub date_posted: Timestamp,
    pub source: String,
    pub details: String,
    pub detail: ResultDetail,
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn row() -> ScanResultRow {
        ScanResultRow {
            id: 1,
            scan_id: 2,
            date_posted: Utc::now(),
            source: "https://example.org".into(),
            details: "details".into(),
            created_at: Utc::now(),
            journal_title: None,
            journal_author: None,
            social_author: None,
            social_comment_count: None,
            social_share_count: None,
            social_like_count: None,
        }
    }

    #[test]
    fn journal_columns_become_article() {
        let mut r = row();
        r.journal_title = Some("Breach".into());
        r.journal_author = Some("Unknown".into());
        let result = ScanResult::from(r);
        assert_eq!(result.title(), Some("Breach"));
        assert_eq!(
            result.detail,
            Some(ResultDetail::Article {
                title: "Breach".into(),
                author: "Unknown".into()
            })
        );
    }

    #[test]
    fn social_columns_become_social_post() {
        let mut r = row();
        r.social_author = Some("@leaker".into());
        r.social_like_count = Some(12);
        let result = ScanResult::from(r);
        assert_eq!(result.title(), None);
        assert_eq!(
            result.detail,
            Some(ResultDetail::SocialPost {
                author: "@leaker".into(),
                comment_count: 0,
                share_count: 0,
                like_count: 12
            })
        );
    }

    #[test]
    fn missing_subtype_is_none() {
        assert_eq!(ScanResult::from(row()).detail, None);
    }

    #[test]
    fn detail_serializes_with_kind_tag() {
        let detail = ResultDetail::Article {
            title: "t".into(),
            author: "a".into(),
        };
        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["kind"], "article");
        assert_eq!(json["title"], "t");
    }
}
