// Search debouncer - commits free-text filters once typing goes quiet
use std::time::Duration;
use tokio::time::Instant;

pub const DEFAULT_QUIET_INTERVAL: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, PartialEq, Eq)]
enum DebounceState {
    Idle,
    Pending { text: String, deadline: Instant },
}

/// Clock-injected debounce state machine. The caller passes `now` in, so
/// tests can drive it without real timers; the session loop sleeps until
/// [`SearchDebouncer::deadline`] and then calls [`SearchDebouncer::poll`].
#[derive(Debug, Clone)]
pub struct SearchDebouncer {
    quiet: Duration,
    state: DebounceState,
}

impl Default for SearchDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_QUIET_INTERVAL)
    }
}

impl SearchDebouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            state: DebounceState::Idle,
        }
    }

    /// Records a raw text change. Any pending commit is cancelled and the
    /// quiet interval restarts from `now`.
    pub fn input(&mut self, text: impl Into<String>, now: Instant) {
        self.state = DebounceState::Pending {
            text: text.into(),
            deadline: now + self.quiet,
        };
    }

    pub fn deadline(&self) -> Option<Instant> {
        match &self.state {
            DebounceState::Idle => None,
            DebounceState::Pending { deadline, .. } => Some(*deadline),
        }
    }

    #[cfg(test)]
    pub fn is_pending(&self) -> bool {
        matches!(self.state, DebounceState::Pending { .. })
    }

    /// Returns the text to commit once the quiet interval has elapsed,
    /// and goes back to idle.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        match &self.state {
            DebounceState::Pending { deadline, .. } if now >= *deadline => {
                match std::mem::replace(&mut self.state, DebounceState::Idle) {
                    DebounceState::Pending { text, .. } => Some(text),
                    DebounceState::Idle => None,
                }
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_rapid_typing_commits_once() {
        let start = Instant::now();
        let mut debouncer = SearchDebouncer::default();
        let mut commits = Vec::new();

        for (i, text) in ["a", "ab", "abc"].into_iter().enumerate() {
            let now = start + ms(100 * i as u64);
            if let Some(text) = debouncer.poll(now) {
                commits.push(text);
            }
            debouncer.input(text, now);
        }

        // Walk the clock forward in small steps past the deadline
        for step in 0..10 {
            if let Some(text) = debouncer.poll(start + ms(200 + step * 50)) {
                commits.push(text);
            }
        }

        assert_eq!(commits, vec!["abc".to_string()]);
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn test_deadline_restarts_on_each_input() {
        let start = Instant::now();
        let mut debouncer = SearchDebouncer::new(ms(300));

        debouncer.input("x", start);
        assert_eq!(debouncer.deadline(), Some(start + ms(300)));

        debouncer.input("xy", start + ms(250));
        assert_eq!(debouncer.deadline(), Some(start + ms(550)));
        assert_eq!(debouncer.poll(start + ms(300)), None);
        assert_eq!(debouncer.poll(start + ms(550)), Some("xy".to_string()));
        assert_eq!(debouncer.deadline(), None);
    }

    #[test]
    fn test_empty_text_is_committed() {
        let start = Instant::now();
        let mut debouncer = SearchDebouncer::default();
        debouncer.input("", start);
        assert_eq!(debouncer.poll(start + ms(300)), Some(String::new()));
    }

    #[test]
    fn test_idle_poll_yields_nothing() {
        let mut debouncer = SearchDebouncer::default();
        assert_eq!(debouncer.poll(Instant::now()), None);
    }
}
