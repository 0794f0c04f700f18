use crate::Config;

/// Shared, immutable per-process state. The client owns the connection pool and
/// carries the outbound user agent and timeout.
#[derive(Clone)]
pub struct AppState {
    pub client: reqwest::Client,
    pub relay_url: Option<String>,
}

impl AppState {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.fetch_timeout());
        if config.no_proxy {
            builder = builder.no_proxy();
        }

        Ok(Self {
            client: builder.build()?,
            relay_url: config.relay_url.clone(),
        })
    }
}
