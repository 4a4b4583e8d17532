//! Prometheus metrics for the adoption backend.
//!
//! Counters are recorded through the `metrics` facade from anywhere in the
//! workspace; [`MetricsServer`] installs the Prometheus recorder and renders
//! the scrape body.
//!
//! # Example
//!
//! ```rust,no_run
//! use pet_adoption_runtime::metrics::{AdoptionMetrics, MetricsServer};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut server = MetricsServer::new("0.0.0.0:9090".parse()?);
//! server.start()?;
//!
//! AdoptionMetrics::record_request("created");
//! let body = server.render();
//! # Ok(())
//! # }
//! ```

use ::metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use pet_adoption_core::model::PetStatus;
use std::net::SocketAddr;
use thiserror::Error;

/// Errors from metrics operations.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Failed to build metrics exporter
    #[error("Failed to build metrics exporter: {0}")]
    Build(String),
    /// Failed to install metrics exporter
    #[error("Failed to install metrics exporter: {0}")]
    Install(String),
}

/// Prometheus recorder plus the address its scrape endpoint is served on.
pub struct MetricsServer {
    addr: SocketAddr,
    handle: Option<PrometheusHandle>,
}

impl MetricsServer {
    /// Create a new metrics server for `addr`
    #[must_use]
    pub const fn new(addr: SocketAddr) -> Self {
        Self { addr, handle: None }
    }

    /// Address the scrape endpoint should bind to
    #[must_use]
    pub const fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Install the global Prometheus recorder.
    ///
    /// A recorder that is already installed (several servers in one test
    /// binary) is tolerated; [`render`](Self::render) then returns `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the exporter cannot be built or installed.
    pub fn start(&mut self) -> Result<(), MetricsError> {
        register_metrics();

        let builder = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Suffix("duration_seconds".to_string()),
                &[0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0],
            )
            .map_err(|e| MetricsError::Build(e.to_string()))?;

        match builder.install_recorder() {
            Ok(handle) => {
                self.handle = Some(handle);
                tracing::info!(addr = %self.addr, "Metrics recorder installed");
                Ok(())
            },
            Err(e) => {
                let err_msg = e.to_string();
                if err_msg.contains("already initialized") {
                    tracing::warn!("Metrics recorder already initialized, skipping");
                    Ok(())
                } else {
                    Err(MetricsError::Install(err_msg))
                }
            },
        }
    }

    /// Recorder handle, if this server installed it
    #[must_use]
    pub const fn handle(&self) -> Option<&PrometheusHandle> {
        self.handle.as_ref()
    }

    /// Render current metrics in Prometheus text format
    #[must_use]
    pub fn render(&self) -> Option<String> {
        self.handle.as_ref().map(PrometheusHandle::render)
    }
}

fn register_metrics() {
    describe_counter!(
        "adoption_requests_total",
        "Adoption request submissions by outcome"
    );
    describe_counter!(
        "adoption_decisions_total",
        "Adoption request status decisions by outcome"
    );
    describe_counter!(
        "pet_status_transitions_total",
        "Pet status writes by source and target status"
    );
    describe_counter!(
        "pet_status_cas_conflicts_total",
        "Conditional pet status writes that lost to another writer"
    );
    describe_counter!("auth_logins_total", "Login attempts by outcome");
    describe_histogram!(
        "store.reducer.duration_seconds",
        "Time spent inside the reducer"
    );
}

/// Adoption workflow metrics recorder.
pub struct AdoptionMetrics;

impl AdoptionMetrics {
    /// Record a request submission outcome (`created` or an error kind)
    pub fn record_request(outcome: &'static str) {
        ::metrics::counter!("adoption_requests_total", "outcome" => outcome).increment(1);
    }

    /// Record a request decision outcome (`approved`, `rejected`, `unchanged`, or an error kind)
    pub fn record_decision(outcome: &'static str) {
        ::metrics::counter!("adoption_decisions_total", "outcome" => outcome).increment(1);
    }

    /// Record a successful pet status write
    pub fn record_transition(from: PetStatus, to: PetStatus) {
        ::metrics::counter!(
            "pet_status_transitions_total",
            "from" => from.as_str(),
            "to" => to.as_str()
        )
        .increment(1);
    }

    /// Record a lost compare-and-set on a pet status
    pub fn record_cas_conflict() {
        ::metrics::counter!("pet_status_cas_conflicts_total").increment(1);
    }
}

/// Auth metrics recorder.
pub struct AuthMetrics;

impl AuthMetrics {
    /// Record a login attempt outcome (`success` or `failure`)
    pub fn record_login(outcome: &'static str) {
        ::metrics::counter!("auth_logins_total", "outcome" => outcome).increment(1);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn server_starts_without_handle_until_installed() {
        let server = MetricsServer::new("127.0.0.1:0".parse().unwrap());
        assert!(server.handle().is_none());
        assert!(server.render().is_none());
    }

    #[test]
    fn adoption_metrics_render() {
        let mut server = MetricsServer::new("127.0.0.1:0".parse().unwrap());
        server.start().unwrap();

        AdoptionMetrics::record_request("created");
        AdoptionMetrics::record_transition(PetStatus::Available, PetStatus::InProcess);

        // Another test may have installed the recorder first.
        if let Some(rendered) = server.render() {
            assert!(rendered.contains("adoption_requests_total"));
            assert!(rendered.contains("pet_status_transitions_total"));
        }
    }
}
