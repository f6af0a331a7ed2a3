// Aggregate stats fetcher - one request for every section, fanned back out
use crate::application::platform_api::FetchResult;
use crate::domain::paging::{PageSize, PagedQueryState};
use crate::domain::stats::{Section, SectionRows, StatsResponse, StatsSummary};
use std::collections::BTreeMap;

/// Monotonic identity of an outbound stats request
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestSeq(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionParams {
    pub section: Section,
    pub page: u32,
    pub size: PageSize,
}

/// Snapshot of every section's paging parameters plus the committed
/// search text, stamped with the sequence number it was issued under.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRequest {
    pub seq: RequestSeq,
    pub sections: Vec<SectionParams>,
    pub search: Option<String>,
}

impl AggregateRequest {
    /// Query parameters in wire form. `search` is omitted when unset.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(self.sections.len() * 2 + 1);
        for params in &self.sections {
            let prefix = params.section.query_prefix();
            pairs.push((format!("{prefix}_page"), params.page.to_string()));
            pairs.push((format!("{prefix}_size"), params.size.get().to_string()));
        }
        if let Some(search) = &self.search {
            pairs.push(("search".to_string(), search.clone()));
        }
        pairs
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectionState {
    pub query: PagedQueryState,
    pub rows: SectionRows,
    /// False when the server echoed a bare array for this section
    pub paged: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ApplyOutcome {
    /// `refetch` is set when a shrinking count pushed a page out of range
    Applied { refetch: bool },
    /// Superseded by a newer request; nothing changed
    Stale,
    /// The latest request failed; previous values are intact
    Unavailable,
}

/// Read-only copy of the fetcher state handed to the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub struct StatsSnapshot {
    pub sections: BTreeMap<Section, SectionState>,
    pub summary: StatsSummary,
    pub search: Option<String>,
    pub unavailable: Option<String>,
    pub loading: bool,
}

#[derive(Debug)]
pub struct AggregateStatsFetcher {
    sections: BTreeMap<Section, SectionState>,
    search: Option<String>,
    summary: StatsSummary,
    next_seq: u64,
    latest_issued: Option<RequestSeq>,
    settled: Option<RequestSeq>,
    unavailable: Option<String>,
}

impl AggregateStatsFetcher {
    pub fn new(default_size: PageSize) -> Self {
        let sections = Section::ALL
            .into_iter()
            .map(|section| {
                let state = SectionState {
                    query: PagedQueryState::new(default_size),
                    rows: SectionRows::empty(section),
                    paged: true,
                };
                (section, state)
            })
            .collect();

        Self {
            sections,
            search: None,
            summary: StatsSummary::default(),
            next_seq: 0,
            latest_issued: None,
            settled: None,
            unavailable: None,
        }
    }

    #[cfg(test)]
    pub fn section(&self, section: Section) -> &SectionState {
        &self.sections[&section]
    }

    fn with_query<R>(
        &mut self,
        section: Section,
        f: impl FnOnce(&mut PagedQueryState) -> R,
    ) -> Option<R> {
        self.sections.get_mut(&section).map(|state| f(&mut state.query))
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn summary(&self) -> &StatsSummary {
        &self.summary
    }

    pub fn unavailable(&self) -> Option<&str> {
        self.unavailable.as_deref()
    }

    /// True while the latest issued request has not resolved
    pub fn is_loading(&self) -> bool {
        self.latest_issued.is_some() && self.latest_issued != self.settled
    }

    /// Whether `seq` is the most recently issued request
    pub fn is_current(&self, seq: RequestSeq) -> bool {
        self.latest_issued == Some(seq)
    }

    /// Returns true when a refetch is due
    pub fn set_page(&mut self, section: Section, page: u32) -> bool {
        self.with_query(section, |query| query.set_page(page))
            .unwrap_or(false)
    }

    pub fn next_page(&mut self, section: Section) -> bool {
        self.with_query(section, PagedQueryState::next_page)
            .unwrap_or(false)
    }

    pub fn previous_page(&mut self, section: Section) -> bool {
        self.with_query(section, PagedQueryState::previous_page)
            .unwrap_or(false)
    }

    /// Always requires a refetch
    pub fn set_size(&mut self, section: Section, size: PageSize) {
        self.with_query(section, |query| query.set_size(size));
    }

    /// Commits debounced search text and sends searchable sections back
    /// to their first page. Empty text means unfiltered.
    pub fn commit_search(&mut self, text: &str) {
        let text = text.trim();
        self.search = if text.is_empty() {
            None
        } else {
            Some(text.to_string())
        };
        for (section, state) in self.sections.iter_mut() {
            if section.is_searchable() {
                state.query.reset_page();
            }
        }
    }

    /// Builds the request for the current parameters. It supersedes every
    /// request issued before it.
    pub fn issue(&mut self) -> AggregateRequest {
        self.next_seq += 1;
        let seq = RequestSeq(self.next_seq);
        self.latest_issued = Some(seq);

        let sections = self
            .sections
            .iter()
            .map(|(section, state)| SectionParams {
                section: *section,
                page: state.query.page(),
                size: state.query.size(),
            })
            .collect();

        tracing::debug!("Issuing stats request {:?} (search={:?})", seq, self.search);

        AggregateRequest {
            seq,
            sections,
            search: self.search.clone(),
        }
    }

    pub fn apply(&mut self, seq: RequestSeq, result: FetchResult<StatsResponse>) -> ApplyOutcome {
        if self.latest_issued != Some(seq) {
            tracing::debug!(
                "Dropping stale stats response {:?} (latest is {:?})",
                seq,
                self.latest_issued
            );
            return ApplyOutcome::Stale;
        }
        self.settled = Some(seq);

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Stats unavailable: {}", e);
                self.unavailable = Some(e.to_string());
                return ApplyOutcome::Unavailable;
            }
        };

        let mut refetch = false;
        for (section, payload) in response.sections {
            let Some(state) = self.sections.get_mut(&section) else {
                continue;
            };
            refetch |= state.query.apply_server_count(payload.total_count());
            state.paged = payload.is_paged();
            state.rows = payload.into_rows();
        }

        self.summary = response.summary;
        self.unavailable = None;
        ApplyOutcome::Applied { refetch }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            sections: self.sections.clone(),
            summary: self.summary().clone(),
            search: self.search().map(str::to_string),
            unavailable: self.unavailable().map(str::to_string),
            loading: self.is_loading(),
        }
    }
}
