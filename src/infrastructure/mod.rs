// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod platform_client;
pub mod stats_mapper;
