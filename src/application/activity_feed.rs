// Activity feed reconciler - polled, page-at-a-time editor activity log
use crate::application::platform_api::FetchResult;
use crate::domain::activity::{ActivityEntry, reconcile};
use crate::domain::listing::CursorPage;
use std::time::Duration;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedPhase {
    Idle,
    Loading,
    /// Loading while an earlier successful window is still on screen
    Refreshing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchTrigger {
    Poll,
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedTicket {
    seq: u64,
    pub page: u32,
    pub trigger: FetchTrigger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedOutcome {
    Applied,
    Failed,
    Stale,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeedSnapshot {
    pub phase: FeedPhase,
    pub entries: Vec<ActivityEntry>,
    pub current_page: u32,
    pub total_count: u64,
    pub has_next: bool,
    pub has_previous: bool,
    pub error: bool,
}

/// Window of one activity page plus the cursor flags the server sent
/// with it. Only the most recently issued ticket can change the window.
#[derive(Debug)]
pub struct ActivityFeedReconciler {
    window: Vec<ActivityEntry>,
    current_page: u32,
    total_count: u64,
    has_next: bool,
    has_previous: bool,
    error: bool,
    loaded: bool,
    phase: FeedPhase,
    next_seq: u64,
    latest: Option<u64>,
    manual_in_flight: Option<u64>,
}

impl Default for ActivityFeedReconciler {
    fn default() -> Self {
        Self {
            window: Vec::new(),
            current_page: 1,
            total_count: 0,
            has_next: false,
            has_previous: false,
            error: false,
            loaded: false,
            phase: FeedPhase::Idle,
            next_seq: 0,
            latest: None,
            manual_in_flight: None,
        }
    }
}

impl ActivityFeedReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[ActivityEntry] {
        &self.window
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn phase(&self) -> FeedPhase {
        self.phase
    }

    pub fn has_error(&self) -> bool {
        self.error
    }

    pub fn is_current(&self, ticket: &FeedTicket) -> bool {
        self.latest == Some(ticket.seq)
    }

    fn begin(&mut self, page: u32, trigger: FetchTrigger) -> FeedTicket {
        self.next_seq += 1;
        let seq = self.next_seq;
        self.latest = Some(seq);
        if trigger == FetchTrigger::Manual {
            self.manual_in_flight = Some(seq);
        }
        self.phase = if self.loaded {
            FeedPhase::Refreshing
        } else {
            FeedPhase::Loading
        };
        FeedTicket { seq, page, trigger }
    }

    /// Timer tick. Skipped while a manual fetch is outstanding so the
    /// manual result is the one that lands.
    pub fn begin_poll(&mut self) -> Option<FeedTicket> {
        if self.manual_in_flight.is_some() {
            tracing::debug!("Skipping activity poll, manual fetch in flight");
            return None;
        }
        Some(self.begin(self.current_page, FetchTrigger::Poll))
    }

    pub fn begin_refresh(&mut self) -> FeedTicket {
        self.begin(self.current_page, FetchTrigger::Manual)
    }

    /// `None` unless the last page carried a `next` cursor
    pub fn begin_next(&mut self) -> Option<FeedTicket> {
        if !self.has_next {
            return None;
        }
        Some(self.begin(self.current_page.saturating_add(1), FetchTrigger::Manual))
    }

    /// `None` unless the last page carried a `previous` cursor
    pub fn begin_previous(&mut self) -> Option<FeedTicket> {
        if !self.has_previous {
            return None;
        }
        let page = self.current_page.saturating_sub(1).max(1);
        Some(self.begin(page, FetchTrigger::Manual))
    }

    pub fn complete(
        &mut self,
        ticket: FeedTicket,
        result: FetchResult<CursorPage<ActivityEntry>>,
    ) -> FeedOutcome {
        if self.manual_in_flight == Some(ticket.seq) {
            self.manual_in_flight = None;
        }
        if self.latest != Some(ticket.seq) {
            tracing::debug!(
                "Dropping stale activity page {} ({:?})",
                ticket.page,
                ticket.trigger
            );
            return FeedOutcome::Stale;
        }
        self.phase = FeedPhase::Idle;

        match result {
            Ok(page) => {
                self.has_next = page.has_next();
                self.has_previous = page.has_previous();
                self.total_count = page.count;
                self.window = reconcile(page.results);
                self.current_page = ticket.page;
                self.error = false;
                self.loaded = true;
                FeedOutcome::Applied
            }
            Err(e) => {
                tracing::warn!("Failed to load editor activities: {}", e);
                self.error = true;
                FeedOutcome::Failed
            }
        }
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        FeedSnapshot {
            phase: self.phase(),
            entries: self.entries().to_vec(),
            current_page: self.current_page(),
            total_count: self.total_count,
            has_next: self.has_next,
            has_previous: self.has_previous,
            error: self.has_error(),
        }
    }
}
