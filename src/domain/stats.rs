// Statistics domain models - sections of the aggregate stats response
use crate::domain::lenient;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One independently paginated result set inside the aggregate response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Monthly,
    Editors,
    Payments,
    Subscriptions,
    Users,
    AllPayments,
}

impl Section {
    pub const ALL: [Section; 6] = [
        Section::Monthly,
        Section::Editors,
        Section::Payments,
        Section::Subscriptions,
        Section::Users,
        Section::AllPayments,
    ];

    /// Prefix of the `<prefix>_page` / `<prefix>_size` query parameters
    pub fn query_prefix(self) -> &'static str {
        match self {
            Section::Monthly => "monthly",
            Section::Editors => "editors",
            Section::Payments => "payments",
            Section::Subscriptions => "subs",
            Section::Users => "users",
            Section::AllPayments => "all_payments",
        }
    }

    /// Key of this section's payload in the stats response body
    pub fn response_key(self) -> &'static str {
        match self {
            Section::Monthly => "monthly_data",
            Section::Editors => "editors_actions",
            Section::Payments => "payment_details",
            Section::Subscriptions => "subscription_details",
            Section::Users => "users",
            Section::AllPayments => "all_payments",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Section::Monthly => "Monthly data",
            Section::Editors => "Editors",
            Section::Payments => "Payments",
            Section::Subscriptions => "Subscriptions",
            Section::Users => "Users",
            Section::AllPayments => "All payments",
        }
    }

    /// Sections filtered by the free-text search
    pub fn is_searchable(self) -> bool {
        matches!(self, Section::Users | Section::AllPayments)
    }

    pub fn from_slug(slug: &str) -> Option<Section> {
        Section::ALL.into_iter().find(|s| s.query_prefix() == slug)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonthlyUploads {
    pub month: String,
    pub total: u64,
    pub approved: u64,
    pub rejected: u64,
    pub under_review: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorTally {
    #[serde(rename = "editor__full_name")]
    pub editor_name: Option<String>,
    pub approved: u64,
    pub rejected: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentTally {
    #[serde(rename = "user__full_name")]
    pub user_name: Option<String>,
    pub payment_type: String,
    #[serde(deserialize_with = "lenient::amount")]
    pub total_amount: f64,
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubscriptionUsage {
    #[serde(rename = "user__full_name")]
    pub user_name: Option<String>,
    pub free_reviews_used: u64,
    pub free_reviews_granted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: u64,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl UserSummary {
    /// Case-insensitive match on email or full name
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.email.to_lowercase().contains(&query)
            || self
                .full_name
                .as_deref()
                .is_some_and(|name| name.to_lowercase().contains(&query))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentRecord {
    pub id: Option<u64>,
    #[serde(rename = "user__full_name")]
    pub user_name: Option<String>,
    pub payment_type: String,
    #[serde(deserialize_with = "lenient::amount")]
    pub amount: f64,
    pub reference: Option<String>,
    #[serde(deserialize_with = "lenient::optional_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Decoded rows of one section, typed per section
#[derive(Debug, Clone, PartialEq)]
pub enum SectionRows {
    Monthly(Vec<MonthlyUploads>),
    Editors(Vec<EditorTally>),
    Payments(Vec<PaymentTally>),
    Subscriptions(Vec<SubscriptionUsage>),
    Users(Vec<UserSummary>),
    AllPayments(Vec<PaymentRecord>),
}

impl SectionRows {
    pub fn empty(section: Section) -> Self {
        match section {
            Section::Monthly => SectionRows::Monthly(Vec::new()),
            Section::Editors => SectionRows::Editors(Vec::new()),
            Section::Payments => SectionRows::Payments(Vec::new()),
            Section::Subscriptions => SectionRows::Subscriptions(Vec::new()),
            Section::Users => SectionRows::Users(Vec::new()),
            Section::AllPayments => SectionRows::AllPayments(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            SectionRows::Monthly(rows) => rows.len(),
            SectionRows::Editors(rows) => rows.len(),
            SectionRows::Payments(rows) => rows.len(),
            SectionRows::Subscriptions(rows) => rows.len(),
            SectionRows::Users(rows) => rows.len(),
            SectionRows::AllPayments(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Shape of a section payload: server-paged with a count, or a bare
/// echo whose count is its length.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionPayload {
    Paged { rows: SectionRows, count: u64 },
    Unpaged { rows: SectionRows },
}

impl SectionPayload {
    /// Total the section's pagination should use
    pub fn total_count(&self) -> u64 {
        match self {
            SectionPayload::Paged { count, .. } => *count,
            SectionPayload::Unpaged { rows } => rows.len() as u64,
        }
    }

    pub fn is_paged(&self) -> bool {
        matches!(self, SectionPayload::Paged { .. })
    }

    pub fn into_rows(self) -> SectionRows {
        match self {
            SectionPayload::Paged { rows, .. } | SectionPayload::Unpaged { rows } => rows,
        }
    }
}

/// Scalar counters at the top of the stats response
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatsSummary {
    pub total_publications: u64,
    pub approved: u64,
    pub rejected: u64,
    pub under_review: u64,
    pub draft: u64,
    pub total_likes: u64,
    pub total_dislikes: u64,
    pub total_payments: f64,
    pub total_subscriptions: f64,
}

/// Decoded aggregate stats response. Sections the server left out are
/// absent from `sections`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsResponse {
    pub summary: StatsSummary,
    pub sections: BTreeMap<Section, SectionPayload>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_slugs_round_trip() {
        for section in Section::ALL {
            assert_eq!(Section::from_slug(section.query_prefix()), Some(section));
        }
        assert_eq!(Section::from_slug("monthly_data"), None);
    }

    #[test]
    fn test_user_search_on_email_or_name() {
        let user: UserSummary =
            serde_json::from_str(r#"{"id": 4, "email": "t.bello@example.org"}"#).unwrap();
        assert!(user.is_active);
        assert!(user.matches("BELLO"));
        assert!(!user.matches("tunde"));

        let named = UserSummary {
            full_name: Some("Tunde Bello".to_string()),
            ..user
        };
        assert!(named.matches("tunde"));
    }

    #[test]
    fn test_unpaged_count_is_row_count() {
        let payload = SectionPayload::Unpaged {
            rows: SectionRows::Editors(vec![EditorTally::default(), EditorTally::default()]),
        };
        assert_eq!(payload.total_count(), 2);
        assert!(!payload.is_paged());

        let payload = SectionPayload::Paged {
            rows: SectionRows::Editors(vec![EditorTally::default()]),
            count: 41,
        };
        assert_eq!(payload.total_count(), 41);
    }
}
