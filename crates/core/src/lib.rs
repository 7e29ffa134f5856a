pub mod cache;
pub mod discover;
pub mod domain;
pub mod extract;
pub mod verify;

pub mod config {
    #[derive(Debug, Clone)]
    pub struct Settings {
        pub search_base_url: Option<String>,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                search_base_url: std::env::var("SEARCH_BASE_URL").ok(),
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
            })
        }
    }
}
