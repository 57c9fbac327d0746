use crate::types::*;

/// Side effects that need to be performed (API calls)
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Ask the backend to answer a chat query
    DispatchQuery(QueryRequest),

    /// Ask the crop recommendation agent for ranked crops
    RequestRecommendation(CropRecommendationRequest),

    /// Create an account
    Register(RegistrationRequest),

    /// Sign in with the credentials that were just registered
    SignIn(Credentials),
}
