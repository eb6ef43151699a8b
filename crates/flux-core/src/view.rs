//! Presentation-ready view of a search hit.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;

use crate::document::Document;

const UNTITLED: &str = "(Untitled)";
const FALLBACK_URL: &str = "#";

/// Display fields of a single result row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultView {
    pub title: String,
    pub url: String,
    /// "Post" or "Project"
    pub type_label: &'static str,
    /// `YYYY-MM-DD`, only when the document date parses
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    pub excerpt: String,
    /// Encrypted posts are shown with a lock marker
    pub locked: bool,
}

impl From<&Document> for ResultView {
    fn from(doc: &Document) -> Self {
        Self {
            title: non_empty_or(&doc.title, UNTITLED),
            url: non_empty_or(&doc.url, FALLBACK_URL),
            type_label: doc.kind.label(),
            date: doc.date.as_deref().and_then(format_date),
            excerpt: doc.excerpt.clone().unwrap_or_default(),
            locked: doc.encrypted,
        }
    }
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

/// Normalizes a document date to its UTC calendar day.
///
/// Accepts RFC 3339 timestamps, naive `YYYY-MM-DD[ T]HH:MM:SS` timestamps and
/// plain dates. Anything else yields `None` and the date is not displayed.
pub fn format_date(raw: &str) -> Option<String> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc).format("%Y-%m-%d").to_string());
    }

    for pattern in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, pattern) {
            return Some(dt.format("%Y-%m-%d").to_string());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|d| d.format("%Y-%m-%d").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentKind;

    fn sample() -> Document {
        Document {
            id: "p1".to_string(),
            title: String::new(),
            content: None,
            excerpt: None,
            url: String::new(),
            date: Some("2024-03-05T23:30:00-02:00".to_string()),
            kind: DocumentKind::Project,
            encrypted: true,
        }
    }

    #[test]
    fn test_view_fallbacks() {
        let view = ResultView::from(&sample());
        assert_eq!(view.title, "(Untitled)");
        assert_eq!(view.url, "#");
        assert_eq!(view.type_label, "Project");
        assert_eq!(view.excerpt, "");
        assert!(view.locked);
    }

    #[test]
    fn test_date_is_normalized_to_utc_day() {
        let view = ResultView::from(&sample());
        assert_eq!(view.date.as_deref(), Some("2024-03-06"));
    }

    #[test]
    fn test_format_date_variants() {
        assert_eq!(format_date("2023-01-02").as_deref(), Some("2023-01-02"));
        assert_eq!(
            format_date("2023-01-02 10:00:00").as_deref(),
            Some("2023-01-02")
        );
        assert_eq!(format_date("last tuesday"), None);
    }
}
