pub mod actions;
pub mod agents;
pub mod effects;
pub mod error;
pub mod fallback;
pub mod forms;
pub mod reducer;
pub mod state;
pub mod types;

#[cfg(test)]
mod tests;

pub use actions::Action;
pub use agents::AgentKind;
pub use effects::Effect;
pub use error::{AuthError, DispatchError, ValidationError};
pub use reducer::reduce;
pub use state::AppState;
