pub mod api;
pub mod config;
pub mod effects;
pub mod logging;
pub mod repl;
pub mod server;

pub use api::{AgentBackend, ApiClient};
pub use effects::{handle_effect, Store};
