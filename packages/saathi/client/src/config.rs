//! Command line and environment configuration.
//!
//! Every option can be given as a flag or through its `SAATHI_*` variable,
//! and every option has a default so `saathi chat` works out of the box
//! against a local backend.

use crate::api::ApiClient;
use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Debug, Clone, Parser)]
#[command(name = "saathi")]
#[command(version, about = "Kisan Saathi farming assistant", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub client: ClientConfig,

    /// Tracing filter expression, e.g. `info` or `saathi_client=debug`
    #[arg(long, env = "SAATHI_LOG", default_value = "info", global = true)]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, env = "SAATHI_LOG_JSON", global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Where the advisory backend and the app's auth routes live.
#[derive(Debug, Clone, Args)]
pub struct ClientConfig {
    #[arg(
        long,
        env = "SAATHI_BACKEND_URL",
        default_value = "http://localhost:8000",
        global = true
    )]
    pub backend_url: String,

    #[arg(
        long,
        env = "SAATHI_APP_URL",
        default_value = "http://localhost:3000",
        global = true
    )]
    pub app_url: String,

    /// Per-request timeout in seconds
    #[arg(long, env = "SAATHI_REQUEST_TIMEOUT", default_value_t = 30, global = true)]
    pub request_timeout: u64,

    /// Language code sent with every query
    #[arg(long, env = "SAATHI_LANGUAGE", default_value = "en", global = true)]
    pub language: String,
}

impl ClientConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn api_client(&self) -> reqwest::Result<ApiClient> {
        ApiClient::new(
            self.backend_url.clone(),
            self.app_url.clone(),
            self.request_timeout(),
        )
    }
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Chat with the farming assistant
    Chat,

    /// Ask for crop recommendations for one field
    Recommend(RecommendArgs),

    /// Create an account and sign in
    Register(RegisterArgs),

    /// List the specialist agents
    Agents,

    /// Run the health endpoint
    Serve(ServeConfig),
}

#[derive(Debug, Clone, Args)]
pub struct RecommendArgs {
    #[arg(long)]
    pub soil_type: String,
    #[arg(long)]
    pub location: String,
    #[arg(long)]
    pub ph: Option<String>,
    #[arg(long)]
    pub nitrogen: Option<String>,
    #[arg(long)]
    pub phosphorus: Option<String>,
    #[arg(long)]
    pub potassium: Option<String>,
    #[arg(long)]
    pub season: Option<String>,
    #[arg(long)]
    pub previous_crop: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct RegisterArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct ServeConfig {
    #[arg(long, env = "SAATHI_BIND", default_value = "0.0.0.0:3000")]
    pub bind: SocketAddr,

    #[arg(
        long,
        env = "SAATHI_DATABASE_URL",
        default_value = "postgresql://localhost:5432/kisan_saathi"
    )]
    pub database_url: String,

    /// Upper bound on each health probe, in seconds
    #[arg(long, env = "SAATHI_HEALTH_TIMEOUT", default_value_t = 5)]
    pub health_timeout: u64,

    /// Reported as `environment` in health responses
    #[arg(long, env = "SAATHI_ENV", default_value = "development")]
    pub environment: String,
}

impl ServeConfig {
    pub fn health_timeout(&self) -> Duration {
        Duration::from_secs(self.health_timeout)
    }
}
