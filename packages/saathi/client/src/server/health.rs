//! `GET /api/health`: database and backend reachability plus process stats.

use crate::api::ApiClient;
use async_trait::async_trait;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use saathi_core::DispatchError;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use sysinfo::{ProcessesToUpdate, System};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::warn;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("invalid database url: {0}")]
    InvalidUrl(String),

    #[error("connection failed: {0}")]
    Unreachable(String),

    #[error("no answer within {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error(transparent)]
    Backend(#[from] DispatchError),
}

/// A dependency the health endpoint can ping.
#[async_trait]
pub trait Probe: Send + Sync {
    async fn check(&self) -> Result<(), ProbeError>;
}

#[async_trait]
impl Probe for ApiClient {
    async fn check(&self) -> Result<(), ProbeError> {
        self.check_backend().await.map_err(ProbeError::from)
    }
}

/// Checks that something accepts TCP connections at the database address.
#[derive(Debug, Clone, PartialEq)]
pub struct TcpProbe {
    pub host: String,
    pub port: u16,
}

impl TcpProbe {
    pub fn from_url(database_url: &str) -> Result<Self, ProbeError> {
        let url = reqwest::Url::parse(database_url)
            .map_err(|e| ProbeError::InvalidUrl(format!("{}: {}", redact(database_url), e)))?;

        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| ProbeError::InvalidUrl("missing host".to_string()))?
            .to_string();

        let port = url
            .port()
            .or_else(|| default_port(url.scheme()))
            .ok_or_else(|| {
                ProbeError::InvalidUrl(format!("no port for scheme '{}'", url.scheme()))
            })?;

        Ok(Self { host, port })
    }
}

fn default_port(scheme: &str) -> Option<u16> {
    match scheme {
        "postgres" | "postgresql" => Some(5432),
        "mysql" | "mariadb" => Some(3306),
        "mongodb" => Some(27017),
        "redis" => Some(6379),
        _ => None,
    }
}

// Keep credentials out of error messages.
fn redact(database_url: &str) -> &str {
    match database_url.rfind('@') {
        Some(at) => &database_url[at + 1..],
        None => database_url,
    }
}

#[async_trait]
impl Probe for TcpProbe {
    async fn check(&self) -> Result<(), ProbeError> {
        TcpStream::connect((self.host.as_str(), self.port))
            .await
            .map(|_| ())
            .map_err(|e| ProbeError::Unreachable(format!("{}:{}: {}", self.host, self.port, e)))
    }
}

pub struct HealthState {
    pub started_at: Instant,
    pub database: Arc<dyn Probe>,
    pub backend: Arc<dyn Probe>,
    pub probe_timeout: Duration,
    pub environment: String,
}

impl HealthState {
    pub fn new(
        database: Arc<dyn Probe>,
        backend: Arc<dyn Probe>,
        probe_timeout: Duration,
        environment: impl Into<String>,
    ) -> Self {
        Self {
            started_at: Instant::now(),
            database,
            backend,
            probe_timeout,
            environment: environment.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Connection {
    Connected,
    Disconnected,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct MemoryUsage {
    /// Resident set size in bytes
    pub rss: u64,
    pub virtual_size: u64,
}

#[derive(Debug, Serialize)]
pub struct HealthyReport {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub uptime: f64,
    pub memory: MemoryUsage,
    pub database: Connection,
    pub backend: Connection,
    pub version: &'static str,
    pub environment: String,
}

#[derive(Debug, Serialize)]
pub struct UnhealthyReport {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub error: String,
    pub database: Connection,
    pub environment: String,
}

async fn probe(target: &dyn Probe, limit: Duration) -> Result<(), ProbeError> {
    match timeout(limit, target.check()).await {
        Ok(result) => result,
        Err(_) => Err(ProbeError::Timeout(limit)),
    }
}

fn process_memory() -> MemoryUsage {
    let Ok(pid) = sysinfo::get_current_pid() else {
        return MemoryUsage::default();
    };

    let mut sys = System::new();
    sys.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);

    sys.process(pid)
        .map(|p| MemoryUsage {
            rss: p.memory(),
            virtual_size: p.virtual_memory(),
        })
        .unwrap_or_default()
}

/// Database probe failure, answered with `503`.
#[derive(Debug)]
pub struct Unhealthy {
    pub error: ProbeError,
    pub environment: String,
}

impl IntoResponse for Unhealthy {
    fn into_response(self) -> Response {
        warn!(error = %self.error, "database probe failed");
        let report = UnhealthyReport {
            status: "unhealthy",
            timestamp: Utc::now(),
            error: self.error.to_string(),
            database: Connection::Disconnected,
            environment: self.environment,
        };
        (StatusCode::SERVICE_UNAVAILABLE, Json(report)).into_response()
    }
}

pub async fn get_health(
    State(state): State<Arc<HealthState>>,
) -> Result<Json<HealthyReport>, Unhealthy> {
    let (database, backend) = futures::join!(
        probe(state.database.as_ref(), state.probe_timeout),
        probe(state.backend.as_ref(), state.probe_timeout),
    );

    database.map_err(|error| Unhealthy {
        error,
        environment: state.environment.clone(),
    })?;

    let backend = match backend {
        Ok(()) => Connection::Connected,
        Err(e) => {
            warn!(error = %e, "backend probe failed");
            Connection::Disconnected
        }
    };

    Ok(Json(HealthyReport {
        status: "healthy",
        timestamp: Utc::now(),
        uptime: state.started_at.elapsed().as_secs_f64(),
        memory: process_memory(),
        database: Connection::Connected,
        backend,
        version: env!("CARGO_PKG_VERSION"),
        environment: state.environment.clone(),
    }))
}
