// In-memory platform used by session and handler tests
use crate::application::aggregate_fetcher::AggregateRequest;
use crate::application::platform_api::{FetchError, FetchResult, PlatformApi};
use crate::domain::activity::{ActivityAction, ActivityEntry};
use crate::domain::listing::{
    CursorPage, Message, Passcode, PasscodeRole, Publication, UserUpdate,
};
use crate::domain::paging::PageSize;
use crate::domain::stats::{
    MonthlyUploads, Section, SectionPayload, SectionRows, StatsResponse, StatsSummary, UserSummary,
};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Default)]
struct FakeState {
    stats_delays: HashMap<u32, Duration>,
    stats_rejected_sizes: Vec<u32>,
    monthly_count: Option<u64>,
    stats_requests: Vec<AggregateRequest>,
    activity_requests: Vec<u32>,
    user_calls: Vec<String>,
    reject_token: bool,
    fail_stats: bool,
}

#[derive(Default)]
pub struct FakePlatform {
    state: Mutex<FakeState>,
}

impl FakePlatform {
    /// Delay stats responses whose monthly page size is `size`
    pub fn set_stats_delay(&self, size: PageSize, delay: Duration) {
        self.state.lock().unwrap().stats_delays.insert(size.get(), delay);
    }

    /// Answer 401 to stats requests whose monthly page size is `size`
    pub fn reject_stats_for(&self, size: PageSize) {
        self.state.lock().unwrap().stats_rejected_sizes.push(size.get());
    }

    /// Monthly row count reported from now on (20 by default)
    pub fn set_monthly_count(&self, count: u64) {
        self.state.lock().unwrap().monthly_count = Some(count);
    }

    pub fn reject_token(&self) {
        self.state.lock().unwrap().reject_token = true;
    }

    pub fn fail_stats(&self, fail: bool) {
        self.state.lock().unwrap().fail_stats = fail;
    }

    pub fn stats_requests(&self) -> Vec<AggregateRequest> {
        self.state.lock().unwrap().stats_requests.clone()
    }

    pub fn activity_requests(&self) -> Vec<u32> {
        self.state.lock().unwrap().activity_requests.clone()
    }

    pub fn user_calls(&self) -> Vec<String> {
        self.state.lock().unwrap().user_calls.clone()
    }

    fn check_token(&self) -> FetchResult<()> {
        if self.state.lock().unwrap().reject_token {
            return Err(FetchError::Unauthorized);
        }
        Ok(())
    }

    fn record_user_call(&self, call: String) -> FetchResult<()> {
        self.check_token()?;
        self.state.lock().unwrap().user_calls.push(call);
        Ok(())
    }
}

fn activity_page(page: u32) -> CursorPage<ActivityEntry> {
    let results = (0..10)
        .map(|i| ActivityEntry {
            id: Some(u64::from(page * 100 + i)),
            subject_title: Some(format!("P{page}-{i}")),
            action: if i % 3 == 0 {
                ActivityAction::Rejected
            } else {
                ActivityAction::Approved
            },
            timestamp: Utc.with_ymd_and_hms(2025, 3, 14, 9, i, 0).unwrap(),
            actor_name: Some("Ada".to_string()),
            subject_name: None,
            note: None,
        })
        .collect();

    CursorPage {
        results,
        next: (page < 3).then(|| format!("/editor-activities/?page={}", page + 1)),
        previous: (page > 1).then(|| format!("/editor-activities/?page={}", page - 1)),
        count: 30,
    }
}

#[async_trait]
impl PlatformApi for FakePlatform {
    async fn fetch_stats(&self, request: &AggregateRequest) -> FetchResult<StatsResponse> {
        let monthly_size = request
            .sections
            .iter()
            .find(|p| p.section == Section::Monthly)
            .map(|p| p.size.get())
            .unwrap_or(10);

        let (delay, fail, rejected, monthly_count) = {
            let mut state = self.state.lock().unwrap();
            state.stats_requests.push(request.clone());
            (
                state.stats_delays.get(&monthly_size).copied(),
                state.fail_stats,
                state.stats_rejected_sizes.contains(&monthly_size),
                state.monthly_count.unwrap_or(20),
            )
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.check_token()?;
        if rejected {
            return Err(FetchError::Unauthorized);
        }
        if fail {
            return Err(FetchError::Network("connection refused".to_string()));
        }

        let mut response = StatsResponse {
            summary: StatsSummary {
                total_publications: 12,
                approved: 3,
                rejected: 1,
                under_review: 6,
                draft: 2,
                total_payments: 125_000.0,
                ..Default::default()
            },
            ..Default::default()
        };
        response.sections.insert(
            Section::Monthly,
            SectionPayload::Paged {
                rows: SectionRows::Monthly(vec![MonthlyUploads {
                    month: format!("size-{monthly_size}"),
                    total: 4,
                    ..Default::default()
                }]),
                count: monthly_count,
            },
        );
        response.sections.insert(
            Section::Users,
            SectionPayload::Paged {
                rows: SectionRows::Users(vec![UserSummary {
                    id: 1,
                    full_name: Some("Chinwe Okafor".to_string()),
                    email: "c.okafor@example.org".to_string(),
                    role: "editor".to_string(),
                    is_active: true,
                }]),
                count: 100,
            },
        );
        Ok(response)
    }

    async fn fetch_editor_activities(&self, page: u32) -> FetchResult<CursorPage<ActivityEntry>> {
        self.state.lock().unwrap().activity_requests.push(page);
        self.check_token()?;
        Ok(activity_page(page))
    }

    async fn fetch_messages(&self, page: u32) -> FetchResult<CursorPage<Message>> {
        self.check_token()?;
        let message = |id: u64, name: &str, email: &str| Message {
            id,
            full_name: Some(name.to_string()),
            email: Some(email.to_string()),
            text: Some("Hello".to_string()),
            created_at: None,
        };
        Ok(CursorPage {
            results: vec![
                message(1, "Chinwe Okafor", "chinwe@example.org"),
                message(2, "Tunde Bello", "tunde@example.org"),
            ],
            next: None,
            previous: (page > 1).then(|| "/messages/".to_string()),
            count: 2,
        })
    }

    async fn fetch_publications(&self, page: u32) -> FetchResult<CursorPage<Publication>> {
        self.check_token()?;
        Ok(CursorPage {
            results: vec![Publication {
                id: u64::from(page),
                title: "Soil Carbon".to_string(),
                author: None,
                status: "approved".to_string(),
                publication_date: None,
            }],
            next: Some(format!("/publications/?page={}", page + 1)),
            previous: None,
            count: 13,
        })
    }

    async fn fetch_users(&self) -> FetchResult<Vec<UserSummary>> {
        self.check_token()?;
        Ok((1..=23)
            .map(|id| UserSummary {
                id,
                full_name: (id % 2 == 0).then(|| format!("Member {id}")),
                email: format!("user{id}@example.org"),
                role: "publisher".to_string(),
                is_active: id != 3,
            })
            .collect())
    }

    async fn block_user(&self, user_id: u64) -> FetchResult<()> {
        self.record_user_call(format!("block {user_id}"))
    }

    async fn unblock_user(&self, user_id: u64) -> FetchResult<()> {
        self.record_user_call(format!("unblock {user_id}"))
    }

    async fn update_user(&self, user_id: u64, update: &UserUpdate) -> FetchResult<UserSummary> {
        self.record_user_call(format!("update {user_id}"))?;
        Ok(UserSummary {
            id: user_id,
            full_name: Some(update.full_name.clone()),
            email: "user@example.org".to_string(),
            role: serde_json::to_value(update.role)
                .ok()
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_default(),
            is_active: true,
        })
    }

    async fn delete_user(&self, user_id: u64) -> FetchResult<()> {
        self.record_user_call(format!("delete {user_id}"))
    }

    async fn fetch_passcodes(&self) -> FetchResult<Vec<Passcode>> {
        self.check_token()?;
        Ok(vec![Passcode {
            id: Some(1),
            code: "AAAA-1111".to_string(),
            role: Some("editor".to_string()),
            created_at: None,
        }])
    }

    async fn create_passcode(&self, role: PasscodeRole) -> FetchResult<Passcode> {
        let role = serde_json::to_value(role)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string));
        self.record_user_call(format!("passcode {}", role.as_deref().unwrap_or("?")))?;
        Ok(Passcode {
            id: Some(2),
            code: "7KQ2-M9XD".to_string(),
            role,
            created_at: None,
        })
    }
}
