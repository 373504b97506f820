use std::env;

/// Connection settings for commands that talk to a running server
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub base_url: String,
    pub session_token: Option<String>,
}

impl CliConfig {
    pub fn from_env() -> Self {
        let base_url = env::var("CAMPAIGN_API_URL")
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "http://localhost:3000".to_string());

        let session_token = env::var("CAMPAIGN_SESSION").ok().filter(|v| !v.is_empty());

        Self {
            base_url,
            session_token,
        }
    }

    /// Resolve the base URL, preferring an explicit flag over env
    pub fn resolve_url(&self, flag: Option<String>) -> String {
        flag.unwrap_or_else(|| self.base_url.clone())
    }
}
