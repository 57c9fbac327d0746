//! Fixed content shown when there is nothing from the backend to show.

use crate::types::{CropRecommendation, MessageMetadata};

pub const GREETING: &str = "Hello! I'm your AI farming assistant. I can help you with crop recommendations, disease detection, weather updates, market prices, and much more. What farming question do you have today?";

pub const GREETING_AGENT: &str = "greeting";

pub const APOLOGY: &str = "I apologize, but I'm having trouble connecting to my agricultural knowledge base right now. Please try again in a moment, or feel free to ask your question in a different way.";

pub const ERROR_AGENT: &str = "error_handler";

pub const SAMPLE_QUESTIONS: [&str; 6] = [
    "What's the best crop for this season?",
    "How to treat tomato blight disease?",
    "When should I irrigate my wheat field?",
    "Current market price of rice?",
    "Best fertilizer for cotton crop?",
    "How to control pest in my vegetable garden?",
];

pub fn greeting_metadata() -> MessageMetadata {
    MessageMetadata {
        agent_used: Some(GREETING_AGENT.to_string()),
        confidence: Some(1.0),
        ..Default::default()
    }
}

pub fn apology_metadata() -> MessageMetadata {
    MessageMetadata {
        agent_used: Some(ERROR_AGENT.to_string()),
        confidence: Some(0.0),
        ..Default::default()
    }
}

/// Query text sent on behalf of an uploaded crop image.
pub fn image_query(file_name: &str) -> String {
    format!(
        "[Image uploaded: {}] Can you analyze this crop image for any diseases or issues?",
        file_name
    )
}

/// Placeholder recommendations used while the backend is unreachable.
pub fn sample_recommendations() -> Vec<CropRecommendation> {
    vec![
        CropRecommendation {
            name: "Wheat".to_string(),
            confidence: 0.92,
            reasons: vec![
                "Suitable soil type".to_string(),
                "Optimal season".to_string(),
                "Good market demand".to_string(),
            ],
            expected_yield: 4.2,
            market_price: 2150.0,
        },
        CropRecommendation {
            name: "Barley".to_string(),
            confidence: 0.87,
            reasons: vec![
                "Compatible with soil pH".to_string(),
                "Low water requirement".to_string(),
                "Drought resistant".to_string(),
            ],
            expected_yield: 3.8,
            market_price: 1950.0,
        },
        CropRecommendation {
            name: "Mustard".to_string(),
            confidence: 0.83,
            reasons: vec![
                "Suitable for rotation".to_string(),
                "Good oil content".to_string(),
                "Market demand".to_string(),
            ],
            expected_yield: 1.5,
            market_price: 5200.0,
        },
    ]
}
