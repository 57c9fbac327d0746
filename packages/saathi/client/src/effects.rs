use crate::api::AgentBackend;
use saathi_core::{reduce, Action, AppState, Effect};
use std::collections::VecDeque;
use tracing::{debug, info, warn};

/// Perform one effect and turn its outcome into the action that reports it.
pub async fn handle_effect<B>(backend: &B, effect: Effect) -> Action
where
    B: AgentBackend + ?Sized,
{
    match effect {
        Effect::DispatchQuery(request) => {
            let result = backend.submit_query(&request).await;
            match &result {
                Ok(response) => info!(
                    agent = response.agent_used.as_deref().unwrap_or("unknown"),
                    confidence = response.confidence,
                    "query answered"
                ),
                Err(e) => warn!(error = %e, "query dispatch failed, answering with fallback"),
            }
            Action::QueryResolved(result)
        }

        Effect::RequestRecommendation(request) => {
            let result = backend.recommend_crops(&request).await;
            match &result {
                Ok(crops) => info!(count = crops.len(), "crop recommendations received"),
                Err(e) => warn!(error = %e, "crop recommendation failed, showing sample set"),
            }
            Action::RecommendationResolved(result)
        }

        Effect::Register(request) => {
            let result = backend.register(&request).await;
            if let Err(e) = &result {
                warn!(error = %e, "registration failed");
            }
            Action::RegistrationResolved(result)
        }

        Effect::SignIn(credentials) => {
            let result = backend.sign_in(&credentials).await;
            if let Err(e) = &result {
                warn!(error = %e, "sign-in failed");
            }
            Action::SignInResolved(result)
        }
    }
}

/// Owns the application state and the backend it talks to.
///
/// Every action goes through [`reduce`]; effects run one at a time and their
/// results are fed back in before `dispatch` returns, so there is never more
/// than one request in flight per store.
pub struct Store<B> {
    state: AppState,
    backend: B,
}

impl<B: AgentBackend> Store<B> {
    pub fn new(backend: B) -> Self {
        Self::with_state(AppState::default(), backend)
    }

    pub fn with_state(state: AppState, backend: B) -> Self {
        Self { state, backend }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Apply `action` only, returning the effects it produced without running them.
    pub fn apply(&mut self, action: &Action) -> Vec<Effect> {
        let (new_state, effects) = reduce(&self.state, action);
        self.state = new_state;
        effects
    }

    /// Apply `action` and every action its effects lead to.
    pub async fn dispatch(&mut self, action: Action) -> &AppState {
        let mut queue = VecDeque::from([action]);

        while let Some(action) = queue.pop_front() {
            let effects = self.apply(&action);
            debug!(effects = effects.len(), "action reduced");

            for effect in effects {
                queue.push_back(handle_effect(&self.backend, effect).await);
            }
        }

        &self.state
    }
}
