// Application layer - dashboard use cases and session orchestration
pub mod activity_feed;
pub mod aggregate_fetcher;
pub mod dashboard_session;
pub mod listing_service;
pub mod platform_api;
pub mod search_debouncer;
#[cfg(test)]
pub mod testing;
