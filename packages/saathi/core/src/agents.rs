use serde::{Deserialize, Serialize};
use std::fmt;

/// Named backend capabilities and their request contracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    CropRecommendation,
    DiseaseDetection,
    WeatherAdvisory,
    MarketPrices,
}

impl AgentKind {
    pub const ALL: [AgentKind; 4] = [
        AgentKind::CropRecommendation,
        AgentKind::DiseaseDetection,
        AgentKind::WeatherAdvisory,
        AgentKind::MarketPrices,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            AgentKind::CropRecommendation => "crop_recommendation",
            AgentKind::DiseaseDetection => "disease_detection",
            AgentKind::WeatherAdvisory => "weather_advisory",
            AgentKind::MarketPrices => "market_prices",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            AgentKind::CropRecommendation => "Crop Recommendation",
            AgentKind::DiseaseDetection => "Disease Detection",
            AgentKind::WeatherAdvisory => "Weather Advisory",
            AgentKind::MarketPrices => "Market Prices",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AgentKind::CropRecommendation => {
                "Provides personalized crop recommendations based on soil, climate, and market conditions"
            }
            AgentKind::DiseaseDetection => {
                "Analyzes crop images to identify diseases and provides treatment recommendations"
            }
            AgentKind::WeatherAdvisory => "Provides weather forecasts and agricultural advisories",
            AgentKind::MarketPrices => {
                "Provides real-time market prices and trends for agricultural commodities"
            }
        }
    }

    /// Path relative to the backend base URL.
    pub fn endpoint(&self) -> &'static str {
        match self {
            AgentKind::CropRecommendation => "/crop-recommendation",
            AgentKind::DiseaseDetection => "/disease-detection",
            AgentKind::WeatherAdvisory => "/weather",
            AgentKind::MarketPrices => "/market-prices",
        }
    }

    pub fn required_params(&self) -> &'static [&'static str] {
        match self {
            AgentKind::CropRecommendation => &["soil_type", "location"],
            AgentKind::DiseaseDetection => &["image_data"],
            AgentKind::WeatherAdvisory => &["location"],
            AgentKind::MarketPrices => &["crop_name", "location"],
        }
    }

    pub fn optional_params(&self) -> &'static [&'static str] {
        match self {
            AgentKind::CropRecommendation => &[
                "ph_level",
                "nitrogen",
                "phosphorus",
                "potassium",
                "season",
                "previous_crop",
            ],
            AgentKind::DiseaseDetection => &["crop_type", "symptoms_description"],
            AgentKind::WeatherAdvisory => &["days"],
            AgentKind::MarketPrices => &["market_type"],
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|agent| agent.name() == name)
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
