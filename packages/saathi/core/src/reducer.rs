use crate::{
    actions::Action,
    effects::Effect,
    error::AuthError,
    fallback,
    forms::RecommendationFields,
    state::{AppState, ChatStatus, RecommendationResults, RegistrationStatus, ResultSource},
    types::*,
};

pub const QUERY_FAILED: &str = "Failed to get response. Please try again.";
pub const RECOMMENDATIONS_READY: &str = "Crop recommendations generated!";
pub const SAMPLE_RECOMMENDATIONS: &str = "Showing sample recommendations (backend not connected)";
pub const ACCOUNT_CREATED: &str = "Account created successfully!";
pub const AUTH_UNAVAILABLE: &str = "Something went wrong. Please try again.";
pub const DASHBOARD_ROUTE: &str = "/dashboard";

/// Pure state transition function
/// Returns new state and any effects that need to be performed
pub fn reduce(state: &AppState, action: &Action) -> (AppState, Vec<Effect>) {
    let mut new_state = state.clone();
    let mut effects = Vec::new();

    match action {
        // Chat
        Action::UpdateInput { content } => {
            new_state.input = content.clone();
        }

        Action::SetLanguage { language } => {
            if !language.trim().is_empty() {
                new_state.language = language.trim().to_string();
            }
        }

        Action::SubmitQuery => {
            let text = new_state.input.trim().to_string();
            if begin_query(&mut new_state, text, Modality::Text, &mut effects) {
                new_state.input.clear();
            }
        }

        Action::SubmitVoiceTranscript { transcript } => {
            begin_query(
                &mut new_state,
                transcript.trim().to_string(),
                Modality::Voice,
                &mut effects,
            );
        }

        Action::SubmitImage { file_name } => {
            if !file_name.trim().is_empty() {
                begin_query(
                    &mut new_state,
                    fallback::image_query(file_name.trim()),
                    Modality::Image,
                    &mut effects,
                );
            }
        }

        Action::AskSampleQuestion { index } => {
            if let Some(question) = fallback::SAMPLE_QUESTIONS.get(*index) {
                begin_query(
                    &mut new_state,
                    question.to_string(),
                    Modality::Text,
                    &mut effects,
                );
            }
        }

        Action::QueryResolved(result) => {
            // A result with nothing in flight is stale; appending it would
            // break the one-answer-per-question pairing.
            if new_state.is_awaiting_response() {
                match result {
                    Ok(response) => {
                        let response = response.clone().normalized();
                        let metadata = response.metadata();
                        new_state.session.append(
                            Role::Assistant,
                            response.response,
                            Some(metadata),
                        );
                    }
                    Err(_) => {
                        new_state.session.append(
                            Role::Assistant,
                            fallback::APOLOGY.to_string(),
                            Some(fallback::apology_metadata()),
                        );
                        new_state.notify(NotificationLevel::Error, QUERY_FAILED);
                    }
                }
                new_state.chat_status = ChatStatus::Idle;
            }
        }

        // Crop recommendation form
        Action::UpdateRecommendationField { field, value } => {
            new_state.recommendation.fields.set(*field, value.clone());
        }

        Action::SubmitRecommendation => {
            if !new_state.recommendation.loading {
                match new_state.recommendation.fields.to_request() {
                    Ok(request) => {
                        new_state.recommendation.error = None;
                        new_state.recommendation.loading = true;
                        effects.push(Effect::RequestRecommendation(request));
                    }
                    Err(error) => {
                        new_state.notify(NotificationLevel::Error, error.to_string());
                        new_state.recommendation.error = Some(error);
                    }
                }
            }
        }

        Action::RecommendationResolved(result) => {
            if new_state.recommendation.loading {
                new_state.recommendation.loading = false;
                let results = match result {
                    Ok(crops) => {
                        new_state.notify(NotificationLevel::Success, RECOMMENDATIONS_READY);
                        RecommendationResults {
                            source: ResultSource::Backend,
                            crops: crops.clone(),
                        }
                    }
                    Err(error) => {
                        new_state.notify(NotificationLevel::Info, SAMPLE_RECOMMENDATIONS);
                        RecommendationResults {
                            source: ResultSource::SampleFallback {
                                reason: error.to_string(),
                            },
                            crops: fallback::sample_recommendations(),
                        }
                    }
                };
                new_state.recommendation.results = Some(results);
            }
        }

        Action::ResetRecommendation => {
            new_state.recommendation.fields = RecommendationFields::default();
            new_state.recommendation.results = None;
            new_state.recommendation.error = None;
            // A response still in flight is dropped when it lands
            new_state.recommendation.loading = false;
        }

        // Registration form
        Action::UpdateRegistrationField { field, value } => {
            new_state.registration.fields.set(*field, value.clone());
        }

        Action::SubmitRegistration => {
            if !new_state.registration.is_busy() {
                match new_state.registration.fields.to_request() {
                    Ok(request) => {
                        new_state.registration.error = None;
                        new_state.registration.status = RegistrationStatus::Registering;
                        effects.push(Effect::Register(request));
                    }
                    Err(error) => {
                        new_state.notify(NotificationLevel::Error, error.to_string());
                        new_state.registration.error = Some(error);
                    }
                }
            }
        }

        Action::RegistrationResolved(result) => {
            if new_state.registration.status == RegistrationStatus::Registering {
                match result {
                    Ok(()) => {
                        new_state.notify(NotificationLevel::Success, ACCOUNT_CREATED);
                        new_state.registration.status = RegistrationStatus::SigningIn;
                        effects.push(Effect::SignIn(Credentials {
                            email: new_state.registration.fields.email.clone(),
                            password: new_state.registration.fields.password.clone(),
                        }));
                    }
                    Err(error) => {
                        new_state.notify(NotificationLevel::Error, auth_message(error));
                        new_state.registration.status = RegistrationStatus::Editing;
                    }
                }
            }
        }

        Action::SignInResolved(result) => {
            if new_state.registration.status == RegistrationStatus::SigningIn {
                match result {
                    Ok(()) => {
                        new_state.registration.status = RegistrationStatus::SignedIn;
                        new_state.redirect = Some(DASHBOARD_ROUTE.to_string());
                    }
                    Err(error) => {
                        new_state.notify(NotificationLevel::Error, auth_message(error));
                        new_state.registration.status = RegistrationStatus::Editing;
                    }
                }
            }
        }

        // Notifications
        Action::DismissNotification { id } => {
            new_state.notifications.retain(|n| n.id != *id);
        }

        Action::ClearRedirect => {
            new_state.redirect = None;
        }
    }

    (new_state, effects)
}

/// Move the chat from idle to awaiting a response.
/// Returns false when the submission was rejected.
fn begin_query(
    state: &mut AppState,
    text: String,
    modality: Modality,
    effects: &mut Vec<Effect>,
) -> bool {
    if text.is_empty() || state.is_awaiting_response() {
        return false;
    }

    let query = state.session.append(Role::User, text.clone(), None);
    state.chat_status = ChatStatus::AwaitingResponse { query };
    effects.push(Effect::DispatchQuery(QueryRequest {
        query: text,
        language: state.language.clone(),
        input_type: modality,
    }));
    true
}

fn auth_message(error: &AuthError) -> String {
    match error {
        AuthError::Rejected { message } => message.clone(),
        AuthError::Unavailable(_) => AUTH_UNAVAILABLE.to_string(),
    }
}
