use crate::error::{AuthError, DispatchError};
use crate::forms::{RecommendationField, RegistrationField};
use crate::types::*;

/// All possible user actions and backend results that can modify the state
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // Chat
    UpdateInput { content: String },
    SetLanguage { language: String },
    SubmitQuery,
    SubmitVoiceTranscript { transcript: String },
    SubmitImage { file_name: String },
    AskSampleQuestion { index: usize },
    QueryResolved(Result<AgentResponse, DispatchError>),

    // Crop recommendation form
    UpdateRecommendationField { field: RecommendationField, value: String },
    SubmitRecommendation,
    RecommendationResolved(Result<Vec<CropRecommendation>, DispatchError>),
    ResetRecommendation,

    // Registration form
    UpdateRegistrationField { field: RegistrationField, value: String },
    SubmitRegistration,
    RegistrationResolved(Result<(), AuthError>),
    SignInResolved(Result<(), AuthError>),

    // Notifications
    DismissNotification { id: u64 },
    ClearRedirect,
}
