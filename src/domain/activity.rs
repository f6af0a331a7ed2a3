// Editor activity domain model and feed reconciliation
use crate::domain::lenient;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    Approved,
    Rejected,
    UnderReview,
    #[serde(other)]
    Unknown,
}

impl ActivityAction {
    pub fn label(self) -> &'static str {
        match self {
            ActivityAction::Approved => "Approved",
            ActivityAction::Rejected => "Rejected",
            ActivityAction::UnderReview => "Under Review",
            ActivityAction::Unknown => "Unknown",
        }
    }
}

/// One review action taken by an editor. Immutable once received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(rename = "publication_title", default)]
    pub subject_title: Option<String>,
    pub action: ActivityAction,
    #[serde(deserialize_with = "lenient::timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "editor_name", default)]
    pub actor_name: Option<String>,
    #[serde(rename = "author_name", default)]
    pub subject_name: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

/// Composite identity used for duplicate detection
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActivityIdentity {
    subject_title: String,
    action: ActivityAction,
    timestamp: DateTime<Utc>,
}

impl ActivityEntry {
    pub fn identity(&self) -> ActivityIdentity {
        ActivityIdentity {
            subject_title: self.subject_title.clone().unwrap_or_default(),
            action: self.action,
            timestamp: self.timestamp,
        }
    }

    /// The note only carries meaning for rejections
    pub fn rejection_note(&self) -> Option<&str> {
        match self.action {
            ActivityAction::Rejected => self.note.as_deref(),
            _ => None,
        }
    }
}

/// Builds a display window from one fetched page: first occurrence of
/// each identity wins, then newest first. Ties keep arrival order.
pub fn reconcile(raw: Vec<ActivityEntry>) -> Vec<ActivityEntry> {
    let mut seen = HashSet::with_capacity(raw.len());
    let mut window: Vec<ActivityEntry> = raw
        .into_iter()
        .filter(|entry| seen.insert(entry.identity()))
        .collect();
    window.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    window
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;

    pub(crate) fn entry(title: &str, action: ActivityAction, minute: u32) -> ActivityEntry {
        ActivityEntry {
            id: None,
            subject_title: Some(title.to_string()),
            action,
            timestamp: Utc.with_ymd_and_hms(2025, 3, 14, 9, minute, 0).unwrap(),
            actor_name: Some("Ada".to_string()),
            subject_name: Some("Grace".to_string()),
            note: None,
        }
    }

    #[test]
    fn test_duplicates_collapse_and_newest_first() {
        let raw = vec![
            entry("T1", ActivityAction::Approved, 1),
            entry("T1", ActivityAction::Approved, 1),
            entry("T2", ActivityAction::Rejected, 5),
        ];

        let window = reconcile(raw);

        assert_eq!(window.len(), 2);
        assert_eq!(window[0].subject_title.as_deref(), Some("T2"));
        assert_eq!(window[1].subject_title.as_deref(), Some("T1"));
    }

    #[test]
    fn test_first_occurrence_wins() {
        let mut first = entry("T1", ActivityAction::Rejected, 2);
        first.note = Some("missing references".to_string());
        let mut second = entry("T1", ActivityAction::Rejected, 2);
        second.note = Some("later copy".to_string());

        let window = reconcile(vec![first, second]);

        assert_eq!(window.len(), 1);
        assert_eq!(window[0].rejection_note(), Some("missing references"));
    }

    #[test]
    fn test_same_title_different_action_is_distinct() {
        let window = reconcile(vec![
            entry("T1", ActivityAction::UnderReview, 1),
            entry("T1", ActivityAction::Approved, 1),
        ]);
        assert_eq!(window.len(), 2);
        // Equal timestamps keep arrival order
        assert_eq!(window[0].action, ActivityAction::UnderReview);
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let raw: Vec<_> = (0..10)
            .map(|i| entry(&format!("P{i}"), ActivityAction::Approved, i))
            .collect();
        let once = reconcile(raw);
        let twice = reconcile(once.clone());
        assert_eq!(once.len(), 10);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_note_ignored_unless_rejected() {
        let mut approved = entry("T1", ActivityAction::Approved, 1);
        approved.note = Some("stray".to_string());
        assert_eq!(approved.rejection_note(), None);
    }

    #[test]
    fn test_decode_wire_entry() {
        let json = r#"{
            "id": 7,
            "publication_title": "Soil Carbon",
            "action": "under_review",
            "timestamp": "2025-03-14T09:30:00+01:00",
            "editor_name": "Ada",
            "author_name": null
        }"#;
        let decoded: ActivityEntry = serde_json::from_str(json).unwrap();
        assert_eq!(decoded.action, ActivityAction::UnderReview);
        assert_eq!(decoded.timestamp, Utc.with_ymd_and_hms(2025, 3, 14, 8, 30, 0).unwrap());
        assert_eq!(decoded.subject_name, None);

        let unknown: ActivityEntry = serde_json::from_str(
            r#"{"action": "withdrawn", "timestamp": "2025-03-14T09:30:00Z"}"#,
        )
        .unwrap();
        assert_eq!(unknown.action, ActivityAction::Unknown);
    }

    #[test]
    fn test_naive_timestamp_read_as_utc() {
        let page: crate::domain::listing::CursorPage<ActivityEntry> = serde_json::from_str(
            r#"{"count": 1, "results": [
                {"action": "approved", "timestamp": "2025-03-14T09:30:00.123456"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(
            page.results[0].timestamp,
            Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0).unwrap()
                + chrono::Duration::microseconds(123_456)
        );

        let missing = serde_json::from_str::<ActivityEntry>(r#"{"action": "approved"}"#);
        assert!(missing.is_err());
    }
}
