//! Keyword handling for news queries.

/// Whether a keyword string contains at least one searchable term.
pub fn has_keywords(keywords: Option<&str>) -> bool {
    keywords.is_some_and(|k| !k.trim().is_empty())
}

/// Build the news-service query term from an operator keyword string.
///
/// Spaces and commas separate terms; the terms are joined with `+`, which
/// the news service reads as a conjunction. Returns `None` when nothing
/// searchable remains.
pub fn build_query(keywords: &str) -> Option<String> {
    let terms: Vec<&str> = keywords
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .collect();

    if terms.is_empty() {
        None
    } else {
        Some(terms.join("+"))
    }
}
