//! # Availability Prober
//!
//! Decides whether the EduSync backend is reachable before a view commits to
//! live data. The probe is an unauthenticated GET against a collection that
//! is known to exist, bounded by a short timeout.
//!
//! Auth-gated endpoints answer 401/403 to an anonymous probe, and a missing
//! route answers 404. In all of those cases the server did respond, so they
//! count as up. Timeouts, connection failures and 5xx count as down.

use crate::client::config::Config;
use reqwest::Client;
use std::time::Duration;

/// Upper bound on a single probe
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Up,
    Down,
}

impl Availability {
    pub fn is_up(self) -> bool {
        self == Availability::Up
    }
}

/// Classify a probe response status
pub fn classify_status(status: u16) -> Availability {
    match status {
        200 | 401 | 403 | 404 => Availability::Up,
        _ => Availability::Down,
    }
}

#[derive(Debug, Clone)]
pub struct AvailabilityProber {
    client: Client,
    probe_path: String,
}

impl AvailabilityProber {
    pub fn new(probe_path: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            probe_path: probe_path.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.probe_path())
    }

    pub fn probe_path(&self) -> &str {
        &self.probe_path
    }

    /// Probe `base_url` and report whether the service is up
    pub async fn check_availability(&self, base_url: &str) -> bool {
        self.probe(base_url).await.is_up()
    }

    pub async fn probe(&self, base_url: &str) -> Availability {
        let url = format!("{}{}", base_url.trim_end_matches('/'), self.probe_path);
        let result = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .timeout(PROBE_TIMEOUT)
            .send()
            .await;

        let availability = match result {
            Ok(response) => classify_status(response.status().as_u16()),
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "availability probe failed");
                Availability::Down
            }
        };

        if availability == Availability::Down {
            tracing::warn!("API server appears to be offline or inaccessible");
        }
        availability
    }
}
