// View models - renderable projections of session and listing state
use crate::application::activity_feed::{FeedPhase, FeedSnapshot};
use crate::application::aggregate_fetcher::{SectionState, StatsSnapshot};
use crate::application::listing_service::{MessagePage, PublicationPage, UserPage};
use crate::domain::activity::{ActivityAction, ActivityEntry};
use crate::domain::paging::PageSize;
use crate::domain::stats::{MonthlyUploads, Section, SectionRows, StatsSummary};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub name: &'static str,
    pub value: u64,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyBar {
    pub month: String,
    pub total: u64,
    pub approved: u64,
    pub rejected: u64,
    pub under_review: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableView {
    pub section: &'static str,
    pub label: &'static str,
    pub columns: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
    pub page: u32,
    pub total_pages: u32,
    pub total_count: u64,
    pub size: u32,
    pub size_options: Vec<u32>,
    pub has_previous: bool,
    pub has_next: bool,
    pub server_paged: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsView {
    pub summary: StatsSummary,
    pub approval_pie: Vec<PieSlice>,
    pub monthly_chart: Vec<MonthlyBar>,
    pub tables: Vec<TableView>,
    pub search: Option<String>,
    pub loading: bool,
    pub unavailable: Option<String>,
}

impl StatsView {
    pub fn from_snapshot(snapshot: &StatsSnapshot) -> Self {
        let approval_pie = vec![
            PieSlice {
                name: "Approved",
                value: snapshot.summary.approved,
                color: "#4CAF50",
            },
            PieSlice {
                name: "Rejected",
                value: snapshot.summary.rejected,
                color: "#F44336",
            },
        ];

        let monthly_chart = match snapshot.sections.get(&Section::Monthly).map(|s| &s.rows) {
            Some(SectionRows::Monthly(rows)) => rows.iter().map(monthly_bar).collect(),
            _ => Vec::new(),
        };

        let tables = snapshot
            .sections
            .iter()
            .map(|(section, state)| table_view(*section, state))
            .collect();

        Self {
            summary: snapshot.summary.clone(),
            approval_pie,
            monthly_chart,
            tables,
            search: snapshot.search.clone(),
            loading: snapshot.loading,
            unavailable: snapshot.unavailable.clone(),
        }
    }
}

fn monthly_bar(row: &MonthlyUploads) -> MonthlyBar {
    MonthlyBar {
        month: format_month(&row.month),
        total: row.total,
        approved: row.approved,
        rejected: row.rejected,
        under_review: row.under_review,
    }
}

fn table_view(section: Section, state: &SectionState) -> TableView {
    let (columns, rows) = table_rows(&state.rows);
    TableView {
        section: section.query_prefix(),
        label: section.label(),
        columns,
        rows,
        page: state.query.page(),
        total_pages: state.query.total_pages(),
        total_count: state.query.total_count(),
        size: state.query.size().get(),
        size_options: PageSize::ALL.iter().map(|s| s.get()).collect(),
        has_previous: state.query.has_previous(),
        has_next: state.query.has_next(),
        server_paged: state.paged,
    }
}

fn name_or(name: &Option<String>, fallback: &str) -> String {
    name.clone().unwrap_or_else(|| fallback.to_string())
}

fn table_rows(rows: &SectionRows) -> (Vec<&'static str>, Vec<Vec<String>>) {
    match rows {
        SectionRows::Monthly(rows) => (
            vec!["Month", "Total", "Approved", "Rejected", "Under Review"],
            rows.iter()
                .map(|r| {
                    vec![
                        format_month(&r.month),
                        r.total.to_string(),
                        r.approved.to_string(),
                        r.rejected.to_string(),
                        r.under_review.to_string(),
                    ]
                })
                .collect(),
        ),
        SectionRows::Editors(rows) => (
            vec!["Editor", "Approved", "Rejected"],
            rows.iter()
                .map(|r| {
                    vec![
                        name_or(&r.editor_name, "Unknown"),
                        r.approved.to_string(),
                        r.rejected.to_string(),
                    ]
                })
                .collect(),
        ),
        SectionRows::Payments(rows) => (
            vec!["User", "Payment Type", "Total Amount", "Count"],
            rows.iter()
                .map(|r| {
                    vec![
                        name_or(&r.user_name, "Unknown"),
                        r.payment_type.clone(),
                        format_naira(r.total_amount),
                        r.count.to_string(),
                    ]
                })
                .collect(),
        ),
        SectionRows::Subscriptions(rows) => (
            vec!["User", "Free Reviews Used", "Free Reviews Granted"],
            rows.iter()
                .map(|r| {
                    vec![
                        name_or(&r.user_name, "Unknown"),
                        r.free_reviews_used.to_string(),
                        if r.free_reviews_granted { "Yes" } else { "No" }.to_string(),
                    ]
                })
                .collect(),
        ),
        SectionRows::Users(rows) => (
            vec!["ID", "Name", "Email", "Role", "Status"],
            rows.iter()
                .map(|r| {
                    vec![
                        r.id.to_string(),
                        name_or(&r.full_name, "N/A"),
                        r.email.clone(),
                        r.role.clone(),
                        if r.is_active { "Active" } else { "Blocked" }.to_string(),
                    ]
                })
                .collect(),
        ),
        SectionRows::AllPayments(rows) => (
            vec!["User", "Payment Type", "Amount", "Reference", "Date"],
            rows.iter()
                .map(|r| {
                    vec![
                        name_or(&r.user_name, "Unknown"),
                        r.payment_type.clone(),
                        format_naira(r.amount),
                        r.reference.clone().unwrap_or_default(),
                        r.created_at.map(format_date).unwrap_or_default(),
                    ]
                })
                .collect(),
        ),
    }
}

/// "2025-01-01" or an RFC 3339 instant becomes "Jan 2025"
pub fn format_month(raw: &str) -> String {
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return instant.format("%b %Y").to_string();
    }
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => date.format("%b %Y").to_string(),
        Err(_) => raw.to_string(),
    }
}

/// Naira amount with thousands separators and at most two decimals
pub fn format_naira(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let fraction = cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    match fraction {
        0 => format!("{sign}₦{grouped}"),
        f if f % 10 == 0 => format!("{sign}₦{grouped}.{}", f / 10),
        f => format!("{sign}₦{grouped}.{f:02}"),
    }
}

fn format_date(instant: DateTime<Utc>) -> String {
    instant.format("%b %d, %Y").to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectionDetails {
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityRow {
    pub key: String,
    pub title: String,
    pub author: String,
    pub editor: String,
    pub action: ActivityAction,
    pub label: &'static str,
    pub rejection: Option<RejectionDetails>,
    pub date: String,
    pub time: String,
}

impl From<&ActivityEntry> for ActivityRow {
    fn from(entry: &ActivityEntry) -> Self {
        let rejection = (entry.action == ActivityAction::Rejected).then(|| RejectionDetails {
            reason: entry
                .rejection_note()
                .unwrap_or("No reason provided")
                .to_string(),
        });
        let id = entry.id.map(|id| id.to_string()).unwrap_or_default();

        Self {
            key: format!("{}-{}", id, entry.timestamp.to_rfc3339()),
            title: name_or(&entry.subject_title, "Untitled Publication"),
            author: name_or(&entry.subject_name, "Unknown"),
            editor: name_or(&entry.actor_name, "System"),
            action: entry.action,
            label: entry.action.label(),
            rejection,
            date: format_date(entry.timestamp),
            time: entry.timestamp.format("%I:%M %p").to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityView {
    pub phase: FeedPhase,
    pub error: Option<&'static str>,
    pub total_count: u64,
    pub approved: usize,
    pub rejected: usize,
    pub under_review: usize,
    pub current_page: u32,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_previous: bool,
    pub entries: Vec<ActivityRow>,
}

impl ActivityView {
    /// `page_len` only feeds the advisory page total; navigation follows
    /// the server's cursors.
    pub fn from_snapshot(snapshot: &FeedSnapshot, page_len: u32) -> Self {
        let count_of = |action: ActivityAction| {
            snapshot
                .entries
                .iter()
                .filter(|entry| entry.action == action)
                .count()
        };

        Self {
            phase: snapshot.phase,
            error: snapshot.error.then_some("Failed to load editor activities"),
            total_count: snapshot.total_count,
            approved: count_of(ActivityAction::Approved),
            rejected: count_of(ActivityAction::Rejected),
            under_review: count_of(ActivityAction::UnderReview),
            current_page: snapshot.current_page,
            total_pages: snapshot
                .total_count
                .div_ceil(u64::from(page_len.max(1)))
                .max(1),
            has_next: snapshot.has_next,
            has_previous: snapshot.has_previous,
            entries: snapshot.entries.iter().map(ActivityRow::from).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageRow {
    pub id: u64,
    pub initial: String,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub text: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageListView {
    pub page: u32,
    pub total_count: u64,
    pub has_next: bool,
    pub has_previous: bool,
    pub messages: Vec<MessageRow>,
}

impl From<MessagePage> for MessageListView {
    fn from(page: MessagePage) -> Self {
        let messages = page
            .messages
            .into_iter()
            .map(|message| MessageRow {
                id: message.id,
                initial: message
                    .full_name
                    .as_deref()
                    .and_then(|name| name.chars().next())
                    .map(|c| c.to_uppercase().to_string())
                    .unwrap_or_else(|| "?".to_string()),
                full_name: message.full_name,
                email: message.email,
                text: message.text,
                created_at: message.created_at,
            })
            .collect();

        Self {
            page: page.page,
            total_count: page.total_count,
            has_next: page.has_next,
            has_previous: page.has_previous,
            messages,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicationRow {
    pub id: u64,
    pub title: String,
    pub author: String,
    pub status: String,
    pub publication_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicationListView {
    pub page: u32,
    pub total_pages: u32,
    pub next_page: Option<u32>,
    pub previous_page: Option<u32>,
    pub publications: Vec<PublicationRow>,
}

impl From<PublicationPage> for PublicationListView {
    fn from(page: PublicationPage) -> Self {
        let publications = page
            .publications
            .into_iter()
            .map(|publication| PublicationRow {
                id: publication.id,
                author: publication
                    .author
                    .as_ref()
                    .and_then(|author| author.display_name())
                    .unwrap_or("Unknown")
                    .to_string(),
                title: publication.title,
                status: publication.status,
                publication_date: publication.publication_date,
            })
            .collect();

        Self {
            page: page.page,
            total_pages: page.total_pages,
            next_page: page.next_page,
            previous_page: page.previous_page,
            publications,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserRow {
    pub id: u64,
    pub full_name: String,
    pub email: String,
    pub role: String,
    pub is_active: bool,
    pub status: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserListView {
    pub page: u32,
    pub total_pages: u32,
    pub total_count: u64,
    pub has_previous: bool,
    pub has_next: bool,
    pub users: Vec<UserRow>,
}

impl From<UserPage> for UserListView {
    fn from(page: UserPage) -> Self {
        let users = page
            .users
            .into_iter()
            .map(|user| UserRow {
                id: user.id,
                full_name: name_or(&user.full_name, "N/A"),
                status: if user.is_active { "Active" } else { "Blocked" },
                is_active: user.is_active,
                email: user.email,
                role: user.role,
            })
            .collect();

        Self {
            has_previous: page.page > 1,
            has_next: page.page < page.total_pages,
            page: page.page,
            total_pages: page.total_pages,
            total_count: page.total_count,
            users,
        }
    }
}
