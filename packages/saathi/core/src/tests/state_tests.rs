use crate::{
    actions::Action,
    agents::AgentKind,
    fallback,
    reducer::reduce,
    state::{AppState, ChatSession, ChatStatus},
    types::*,
};
use pretty_assertions::assert_eq;

#[test]
fn test_default_state() {
    let state = AppState::default();

    assert_eq!(state.session.messages.len(), 1);
    assert_eq!(state.chat_status, ChatStatus::Idle);
    assert_eq!(state.input, "");
    assert_eq!(state.language, "en");
    assert!(state.notifications.is_empty());
    assert!(state.redirect.is_none());
    assert!(state.recommendation.results.is_none());
    assert!(!state.is_awaiting_response());
}

#[test]
fn test_session_is_seeded_with_greeting() {
    let session = ChatSession::default();

    let greeting = &session.messages[0];
    assert_eq!(greeting.id, 1);
    assert_eq!(greeting.role, Role::Assistant);
    assert_eq!(greeting.content, fallback::GREETING);

    let metadata = greeting.metadata.clone().unwrap();
    assert_eq!(metadata.agent_used.as_deref(), Some("greeting"));
    assert_eq!(metadata.confidence, Some(1.0));
}

#[test]
fn test_message_ids_are_monotonic() {
    let mut session = ChatSession::default();

    let a = session.append(Role::User, "one".to_string(), None);
    let b = session.append(Role::Assistant, "two".to_string(), None);
    let c = session.append(Role::User, "three".to_string(), None);

    assert!(a < b && b < c);
    let ids: Vec<MessageId> = session.messages.iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![1, a, b, c]);
}

#[test]
fn test_sessions_get_distinct_ids() {
    assert_ne!(ChatSession::default().id, ChatSession::default().id);
}

#[test]
fn test_confidence_bands() {
    assert_eq!(ConfidenceBand::from_confidence(0.95), ConfidenceBand::High);
    assert_eq!(ConfidenceBand::from_confidence(0.8), ConfidenceBand::High);
    assert_eq!(ConfidenceBand::from_confidence(0.6), ConfidenceBand::Medium);
    assert_eq!(ConfidenceBand::from_confidence(0.59), ConfidenceBand::Low);
    assert_eq!(ConfidenceBand::from_confidence(0.0), ConfidenceBand::Low);
}

#[test]
fn test_normalization_drops_non_finite_values() {
    let response = AgentResponse {
        response: "ok".to_string(),
        agent_used: None,
        confidence: Some(f64::NAN),
        processing_time: Some(-3.0),
        suggestions: vec![],
    }
    .normalized();

    assert_eq!(response.confidence, None);
    assert_eq!(response.processing_time, None);

    let negative = AgentResponse {
        confidence: Some(-0.4),
        ..response
    }
    .normalized();
    assert_eq!(negative.confidence, Some(0.0));
}

#[test]
fn test_agent_response_decodes_minimal_body() {
    let response: AgentResponse =
        serde_json::from_str(r#"{"response": "Irrigate every 10 days."}"#).unwrap();

    assert_eq!(response.response, "Irrigate every 10 days.");
    assert_eq!(response.agent_used, None);
    assert_eq!(response.confidence, None);
    assert!(response.suggestions.is_empty());
}

#[test]
fn test_query_request_wire_format() {
    let request = QueryRequest {
        query: "rain?".to_string(),
        language: "en".to_string(),
        input_type: Modality::Voice,
    };

    assert_eq!(
        serde_json::to_value(&request).unwrap(),
        serde_json::json!({"query": "rain?", "language": "en", "input_type": "voice"})
    );
}

#[test]
fn test_recommendation_request_omits_empty_optionals() {
    let request = CropRecommendationRequest {
        soil_type: "black".to_string(),
        location: "Akola".to_string(),
        potassium: Some(12.5),
        ..Default::default()
    };

    assert_eq!(
        serde_json::to_value(&request).unwrap(),
        serde_json::json!({"soil_type": "black", "location": "Akola", "potassium": 12.5})
    );
}

#[test]
fn test_agent_catalog() {
    let crop = AgentKind::from_name("crop_recommendation").unwrap();

    assert_eq!(crop, AgentKind::CropRecommendation);
    assert_eq!(crop.endpoint(), "/crop-recommendation");
    assert_eq!(crop.required_params(), &["soil_type", "location"]);
    assert_eq!(AgentKind::WeatherAdvisory.endpoint(), "/weather");
    assert_eq!(AgentKind::from_name("irrigation"), None);
    assert_eq!(AgentKind::MarketPrices.to_string(), "market_prices");
}

#[test]
fn test_dismiss_notification() {
    let mut state = AppState::default();
    state.notify(NotificationLevel::Info, "first");
    state.notify(NotificationLevel::Error, "second");
    let first = state.notifications[0].id;

    let (new_state, effects) = reduce(&state, &Action::DismissNotification { id: first });

    assert_eq!(new_state.notifications.len(), 1);
    assert_eq!(new_state.notifications[0].message, "second");
    assert!(effects.is_empty());
}

#[test]
fn test_blank_language_is_ignored() {
    let state = AppState::default();

    let (new_state, _) = reduce(
        &state,
        &Action::SetLanguage {
            language: " ".to_string(),
        },
    );

    assert_eq!(new_state.language, "en");
}
