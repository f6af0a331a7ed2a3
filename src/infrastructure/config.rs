use crate::application::dashboard_session::SessionSettings;
use crate::domain::paging::PageSize;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    #[serde(default)]
    pub server: ServerSettings,
    pub api: ApiSettings,
    #[serde(default)]
    pub dashboard: DashboardSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

#[derive(Deserialize, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub token: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl std::fmt::Debug for ApiSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiSettings")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DashboardSettings {
    pub poll_interval_secs: u64,
    pub search_debounce_ms: u64,
    pub default_page_size: PageSize,
    pub activity_page_len: u32,
    pub publications_page_len: u32,
    pub users_page_len: u32,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            poll_interval_secs: 30,
            search_debounce_ms: 300,
            default_page_size: PageSize::Ten,
            activity_page_len: 10,
            publications_page_len: 6,
            users_page_len: 10,
        }
    }
}

impl DashboardSettings {
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            poll_interval: Duration::from_secs(self.poll_interval_secs.max(1)),
            search_debounce: Duration::from_millis(self.search_debounce_ms),
            default_page_size: self.default_page_size,
        }
    }
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

/// Reads `config/dashboard.*`, then `DASHBOARD__SECTION__KEY` overrides
pub fn load_dashboard_config() -> anyhow::Result<DashboardConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(config::Environment::with_prefix("DASHBOARD").separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> Result<DashboardConfig, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    #[test]
    fn test_defaults_fill_missing_sections() {
        let config = parse(
            r#"
            [api]
            base_url = "http://localhost:8000/api"
            token = "secret"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.listen_addr, "0.0.0.0:8080");
        assert_eq!(config.api.timeout_secs, 15);

        let session = config.dashboard.session_settings();
        assert_eq!(session.poll_interval, Duration::from_secs(30));
        assert_eq!(session.search_debounce, Duration::from_millis(300));
        assert_eq!(session.default_page_size, PageSize::Ten);
        assert_eq!(config.dashboard.users_page_len, 10);
        assert!(!format!("{:?}", config.api).contains("secret"));
    }

    #[test]
    fn test_page_size_must_be_an_offered_option() {
        let base = r#"
            [api]
            base_url = "http://localhost:8000/api"
            token = "t"
            [dashboard]
        "#;
        let ok = parse(&format!("{base}default_page_size = 20")).unwrap();
        assert_eq!(ok.dashboard.default_page_size, PageSize::Twenty);
        assert!(parse(&format!("{base}default_page_size = 15")).is_err());
    }
}
