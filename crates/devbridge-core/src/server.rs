//! Dev-server addressing and liveness/config probing.
//!
//! The dev server is probed exactly twice, at host setup time: once for its
//! plugin config and once for the bundler's client entry. Both probes treat
//! anything other than a clean 200 as "inactive" — an offline dev server is
//! the expected steady state in production, not a failure.

use std::time::Duration;

use tracing::{debug, info};
use url::Url;

use crate::config::ResolverConfig;
use crate::error::Error;

/// File name of the config endpoint served by the bundler plugin.
pub const CONFIG_ENDPOINT: &str = "devbridge.json";

/// Path of the bundler's client runtime below the base URL.
pub const CLIENT_ENTRY_PATH: &str = "@vite/client";

/// Default dev-server port.
pub const DEFAULT_PORT: u16 = 5173;

/// Outcome of one probe request.
///
/// Transport errors are captured here rather than raised; liveness is
/// decided purely from `status == 200 && error.is_none()`, collapsing every
/// kind of transport failure into "inactive".
#[derive(Debug)]
pub struct ProbeResponse {
    /// HTTP status code; `0` when the request never completed.
    pub status: u16,
    /// Transport-level failure, when the request never completed.
    pub error: Option<reqwest::Error>,
    /// JSON body, captured for 2xx responses that carry one.
    pub body: Option<serde_json::Value>,
}

impl ProbeResponse {
    /// No transport error and HTTP status exactly 200.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.error.is_none() && self.status == 200
    }
}

/// Dev-mode activation state of one client instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProbeState {
    /// No probe has run yet.
    Unprobed,
    /// Both probes succeeded; dev mode is on.
    Active,
    /// A probe failed. Terminal: a dev server started later requires a
    /// fresh process.
    Inactive,
}

/// Client for one bundler dev server.
///
/// Owns the addressing scheme (server, config, base, and client URLs), the
/// two setup-time probes, and the activation state machine. The probes are
/// blocking calls bounded by the client's timeouts; they run at most once
/// per instance via [`DevServerClient::activate`].
#[derive(Debug)]
pub struct DevServerClient {
    server_host: String,
    server_port: u16,
    config: Option<ResolverConfig>,
    state: ProbeState,
    http: reqwest::blocking::Client,
}

impl DevServerClient {
    /// Create a client for the dev server expected at `server_host`.
    ///
    /// `server_host` is scheme plus host without a port
    /// (e.g. `http://localhost`); the port defaults to [`DEFAULT_PORT`].
    pub fn new(server_host: impl Into<String>) -> Result<Self, Error> {
        let server_host = server_host.into();
        Url::parse(&server_host).map_err(|source| Error::InvalidHost {
            host: server_host.clone(),
            source,
        })?;

        // Liveness is judged on the probed URL itself, so redirects are
        // not followed.
        let http = reqwest::blocking::Client::builder()
            .connect_timeout(Duration::from_secs(1))
            .timeout(Duration::from_secs(3))
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(concat!("devbridge/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            server_host,
            server_port: DEFAULT_PORT,
            config: None,
            state: ProbeState::Unprobed,
            http,
        })
    }

    /// Use a non-default dev-server port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.server_port = port;
        self
    }

    /// Inject a config directly, bypassing the config probe.
    pub fn set_config(&mut self, config: ResolverConfig) {
        self.config = Some(config);
    }

    /// The active config, once a probe or injection has populated one.
    #[must_use]
    pub fn config(&self) -> Option<&ResolverConfig> {
        self.config.as_ref()
    }

    /// The configured server host (e.g. `http://localhost`).
    #[must_use]
    pub fn server_host(&self) -> &str {
        &self.server_host
    }

    /// The configured server port.
    #[must_use]
    pub fn server_port(&self) -> u16 {
        self.server_port
    }

    /// `{host}:{port}`.
    #[must_use]
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    /// URL of the plugin config endpoint.
    #[must_use]
    pub fn config_url(&self) -> String {
        format!("{}/{CONFIG_ENDPOINT}", self.server_url())
    }

    /// Server URL plus the configured base, without a trailing slash.
    ///
    /// Falls back to the bare server URL while no config is populated.
    #[must_use]
    pub fn base_url(&self) -> String {
        let base = self.config.as_ref().map_or("", |config| config.base.as_str());
        let url = format!("{}{base}", self.server_url());
        url.trim_end_matches('/').to_string()
    }

    /// URL the bundler serves its client runtime from.
    #[must_use]
    pub fn client_url(&self) -> String {
        format!("{}/{CLIENT_ENTRY_PATH}", self.base_url())
    }

    /// One GET against the dev server, transport errors captured.
    #[must_use]
    pub fn request(&self, url: &str) -> ProbeResponse {
        match self.http.get(url).send() {
            Ok(response) => {
                let status = response.status().as_u16();
                let body = if response.status().is_success() {
                    response.json().ok()
                } else {
                    None
                };
                ProbeResponse {
                    status,
                    error: None,
                    body,
                }
            }
            Err(error) => ProbeResponse {
                status: 0,
                error: Some(error),
                body: None,
            },
        }
    }

    /// Probe the config endpoint.
    ///
    /// On success the JSON body becomes the active config; this is the only
    /// path that populates config automatically. A body that fails to
    /// deserialize counts as a failed probe, not an error.
    pub fn probe_config(&mut self) -> bool {
        let url = self.config_url();
        let response = self.request(&url);
        if !response.is_success() {
            debug!(url = %url, status = response.status, "config probe failed");
            return false;
        }

        match response.body.map(serde_json::from_value::<ResolverConfig>) {
            Some(Ok(config)) => {
                self.config = Some(config);
                true
            }
            _ => {
                debug!(url = %url, "config probe returned an unusable body");
                false
            }
        }
    }

    /// Probe the client entry; any clean 200 means the bundler is serving.
    /// The body is ignored.
    #[must_use]
    pub fn probe_client(&self) -> bool {
        let url = self.client_url();
        let response = self.request(&url);
        if !response.is_success() {
            debug!(url = %url, status = response.status, "client probe failed");
            return false;
        }
        true
    }

    /// Decide dev-mode activation, at most once per instance.
    ///
    /// Runs the config probe, then the client probe; dev mode is active only
    /// when both succeed. The outcome is memoized: once inactive, the
    /// instance stays inactive for the life of the process.
    pub fn activate(&mut self) -> bool {
        match self.state {
            ProbeState::Active => true,
            ProbeState::Inactive => false,
            ProbeState::Unprobed => {
                let active = self.probe_config() && self.probe_client();
                if active {
                    info!(server = %self.server_url(), "dev server is live; serving unbundled sources");
                    self.state = ProbeState::Active;
                } else {
                    self.state = ProbeState::Inactive;
                }
                active
            }
        }
    }

    /// Whether activation settled on dev mode.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state == ProbeState::Active
    }
}
