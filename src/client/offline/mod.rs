//! # Offline Fallback
//!
//! Data-dependent views load through a [`FallbackLoader`]:
//!
//! 1. Probe the backend.
//! 2. Up: fetch live data. A failed fetch is a load error, never a reason to
//!    fall back, since the backend did answer.
//! 3. Down: use the fixed synthetic dataset and mark the view degraded.
//! 4. Retry simply runs the whole sequence again with a fresh probe.
//!
//! Nothing loaded or edited in degraded mode is ever written back.
//!
//! ## Key Components
//!
//! - `synthetic.rs`: the hard-coded offline dataset
//! - `results_view.rs`: the results view built on the loader

pub mod results_view;
pub mod synthetic;

pub use results_view::{ActionError, OfflineBanner, ResultRow, ResultsState, ResultsView};
pub use synthetic::SyntheticDataset;

use crate::client::availability::AvailabilityProber;
use crate::client::http::ApiError;
use std::future::Future;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum LoadError {
    /// The prober classified the backend as down
    #[error("Backend API is currently unavailable. Working in offline mode with sample data.")]
    NetworkUnavailable,

    /// One lookup of a parallel batch failed; the rest of the batch stands
    #[error("failed to load {resource} {id}: {message}")]
    PartialFetchFailure {
        resource: &'static str,
        id: String,
        message: String,
    },

    /// Backend is up but a required fetch failed
    #[error(transparent)]
    Fetch(#[from] ApiError),
}

/// Where a view's data came from
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome<T> {
    Live(T),
    Degraded(T),
}

impl<T> LoadOutcome<T> {
    pub fn is_degraded(&self) -> bool {
        matches!(self, LoadOutcome::Degraded(_))
    }

    pub fn into_inner(self) -> T {
        match self {
            LoadOutcome::Live(data) | LoadOutcome::Degraded(data) => data,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FallbackLoader {
    prober: AvailabilityProber,
    base_url: String,
}

impl FallbackLoader {
    pub fn new(prober: AvailabilityProber, base_url: impl Into<String>) -> Self {
        Self {
            prober,
            base_url: base_url.into(),
        }
    }

    /// Probe, then run `live` when the backend is up or `synthetic` when it is down
    pub async fn load<T, F, Fut, S>(&self, live: F, synthetic: S) -> Result<LoadOutcome<T>, LoadError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, LoadError>>,
        S: FnOnce() -> T,
    {
        if self.prober.check_availability(&self.base_url).await {
            live().await.map(LoadOutcome::Live)
        } else {
            tracing::info!(base_url = %self.base_url, "backend unavailable, using synthetic data");
            Ok(LoadOutcome::Degraded(synthetic()))
        }
    }
}
