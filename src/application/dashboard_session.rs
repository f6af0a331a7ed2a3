// Dashboard session - single-writer event loop over all dashboard state
use crate::application::activity_feed::{
    ActivityFeedReconciler, DEFAULT_POLL_INTERVAL, FeedSnapshot, FeedTicket,
};
use crate::application::aggregate_fetcher::{
    AggregateStatsFetcher, ApplyOutcome, RequestSeq, StatsSnapshot,
};
use crate::application::platform_api::{FetchResult, PlatformApi};
use crate::application::search_debouncer::{DEFAULT_QUIET_INTERVAL, SearchDebouncer};
use crate::domain::activity::ActivityEntry;
use crate::domain::listing::CursorPage;
use crate::domain::paging::PageSize;
use crate::domain::stats::{Section, StatsResponse};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, Interval, MissedTickBehavior};

#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub poll_interval: Duration,
    pub search_debounce: Duration,
    pub default_page_size: PageSize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            search_debounce: DEFAULT_QUIET_INTERVAL,
            default_page_size: PageSize::default(),
        }
    }
}

#[derive(Debug)]
pub enum SessionCommand {
    SetPage { section: Section, page: u32 },
    NextPage(Section),
    PreviousPage(Section),
    SetSize { section: Section, size: PageSize },
    SearchInput(String),
    RefreshStats,
    RefreshActivity,
    NextActivityPage,
    PreviousActivityPage,
    Snapshot(oneshot::Sender<DashboardSnapshot>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSnapshot {
    pub stats: StatsSnapshot,
    pub activity: FeedSnapshot,
    /// The platform rejected the session token
    pub session_expired: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("dashboard session has ended")]
pub struct SessionClosed;

enum Completion {
    Stats(RequestSeq, FetchResult<StatsResponse>),
    Activity(FeedTicket, FetchResult<CursorPage<ActivityEntry>>),
}

/// Cloneable front door to a running session
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<SessionCommand>,
}

impl SessionHandle {
    pub async fn send(&self, command: SessionCommand) -> Result<(), SessionClosed> {
        self.commands.send(command).await.map_err(|_| SessionClosed)
    }

    pub async fn snapshot(&self) -> Result<DashboardSnapshot, SessionClosed> {
        let (tx, rx) = oneshot::channel();
        self.send(SessionCommand::Snapshot(tx)).await?;
        rx.await.map_err(|_| SessionClosed)
    }
}

/// Starts the session loop on the current runtime. The first stats
/// request and the first activity poll go out immediately.
pub fn spawn_session(api: Arc<dyn PlatformApi>, settings: SessionSettings) -> SessionHandle {
    let (command_tx, command_rx) = mpsc::channel(64);
    let (completion_tx, completion_rx) = mpsc::channel(64);

    let session = DashboardSession {
        api,
        fetcher: AggregateStatsFetcher::new(settings.default_page_size),
        debouncer: SearchDebouncer::new(settings.search_debounce),
        feed: ActivityFeedReconciler::new(),
        completions: completion_tx,
        expired: false,
    };

    tokio::spawn(session.run(settings.poll_interval, command_rx, completion_rx));

    SessionHandle {
        commands: command_tx,
    }
}

struct DashboardSession {
    api: Arc<dyn PlatformApi>,
    fetcher: AggregateStatsFetcher,
    debouncer: SearchDebouncer,
    feed: ActivityFeedReconciler,
    completions: mpsc::Sender<Completion>,
    expired: bool,
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

impl DashboardSession {
    async fn run(
        mut self,
        poll_interval: Duration,
        mut commands: mpsc::Receiver<SessionCommand>,
        mut completions: mpsc::Receiver<Completion>,
    ) {
        let mut poll = tokio::time::interval(poll_interval);
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);

        self.fetch_stats();

        loop {
            let debounce_deadline = self.debouncer.deadline();
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.handle(command, &mut poll),
                    None => break,
                },
                Some(done) = completions.recv() => self.on_completion(done),
                _ = poll.tick(), if !self.expired => self.poll_activity(),
                _ = wait_until(debounce_deadline), if debounce_deadline.is_some() => {
                    self.flush_search();
                }
            }
        }

        tracing::debug!("Dashboard session loop stopped");
    }

    fn handle(&mut self, command: SessionCommand, poll: &mut Interval) {
        match command {
            SessionCommand::Snapshot(reply) => {
                let _ = reply.send(self.snapshot());
            }
            // An expired session only answers snapshots
            _ if self.expired => {}
            SessionCommand::SetPage { section, page } => {
                if self.fetcher.set_page(section, page) {
                    self.fetch_stats();
                }
            }
            SessionCommand::NextPage(section) => {
                if self.fetcher.next_page(section) {
                    self.fetch_stats();
                }
            }
            SessionCommand::PreviousPage(section) => {
                if self.fetcher.previous_page(section) {
                    self.fetch_stats();
                }
            }
            SessionCommand::SetSize { section, size } => {
                self.fetcher.set_size(section, size);
                self.fetch_stats();
            }
            SessionCommand::SearchInput(text) => {
                self.debouncer.input(text, Instant::now());
            }
            SessionCommand::RefreshStats => self.fetch_stats(),
            SessionCommand::RefreshActivity => {
                let ticket = self.feed.begin_refresh();
                self.fetch_activity(ticket);
            }
            SessionCommand::NextActivityPage => {
                if let Some(ticket) = self.feed.begin_next() {
                    poll.reset();
                    self.fetch_activity(ticket);
                }
            }
            SessionCommand::PreviousActivityPage => {
                if let Some(ticket) = self.feed.begin_previous() {
                    poll.reset();
                    self.fetch_activity(ticket);
                }
            }
        }
    }

    fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            stats: self.fetcher.snapshot(),
            activity: self.feed.snapshot(),
            session_expired: self.expired,
        }
    }

    fn flush_search(&mut self) {
        if let Some(text) = self.debouncer.poll(Instant::now()) {
            tracing::debug!("Committing search text {:?}", text);
            self.fetcher.commit_search(&text);
            self.fetch_stats();
        }
    }

    fn poll_activity(&mut self) {
        if let Some(ticket) = self.feed.begin_poll() {
            self.fetch_activity(ticket);
        }
    }

    fn fetch_stats(&mut self) {
        if self.expired {
            return;
        }
        let request = self.fetcher.issue();
        let api = self.api.clone();
        let tx = self.completions.clone();

        tokio::spawn(async move {
            let result = api.fetch_stats(&request).await;
            let _ = tx.send(Completion::Stats(request.seq, result)).await;
        });
    }

    fn fetch_activity(&mut self, ticket: FeedTicket) {
        if self.expired {
            return;
        }
        let api = self.api.clone();
        let tx = self.completions.clone();

        tokio::spawn(async move {
            let result = api.fetch_editor_activities(ticket.page).await;
            let _ = tx.send(Completion::Activity(ticket, result)).await;
        });
    }

    fn on_completion(&mut self, completion: Completion) {
        match completion {
            // Superseded responses never end the session
            Completion::Stats(seq, result) => {
                if self.fetcher.is_current(seq) && self.expire_on_unauthorized(&result) {
                    return;
                }
                if let ApplyOutcome::Applied { refetch: true } = self.fetcher.apply(seq, result) {
                    tracing::debug!("Page fell out of range after count update, refetching");
                    self.fetch_stats();
                }
            }
            Completion::Activity(ticket, result) => {
                if self.feed.is_current(&ticket) && self.expire_on_unauthorized(&result) {
                    return;
                }
                self.feed.complete(ticket, result);
            }
        }
    }

    fn expire_on_unauthorized<T>(&mut self, result: &FetchResult<T>) -> bool {
        if matches!(result, Err(e) if e.is_unauthorized()) {
            if !self.expired {
                tracing::warn!("Platform rejected the session token, ending session");
            }
            self.expired = true;
            return true;
        }
        false
    }
}
