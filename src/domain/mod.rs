// Domain layer - dashboard data models and pure state rules
pub mod activity;
pub mod lenient;
pub mod listing;
pub mod paging;
pub mod stats;
