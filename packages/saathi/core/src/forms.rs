//! Raw form input and the validation that turns it into backend requests.

use crate::error::ValidationError;
use crate::types::{CropRecommendationRequest, RegistrationRequest};

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecommendationField {
    SoilType,
    Location,
    PhLevel,
    Nitrogen,
    Phosphorus,
    Potassium,
    Season,
    PreviousCrop,
}

/// Crop recommendation inputs exactly as typed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecommendationFields {
    pub soil_type: String,
    pub location: String,
    pub ph_level: String,
    pub nitrogen: String,
    pub phosphorus: String,
    pub potassium: String,
    pub season: String,
    pub previous_crop: String,
}

impl RecommendationFields {
    pub fn set(&mut self, field: RecommendationField, value: String) {
        let slot = match field {
            RecommendationField::SoilType => &mut self.soil_type,
            RecommendationField::Location => &mut self.location,
            RecommendationField::PhLevel => &mut self.ph_level,
            RecommendationField::Nitrogen => &mut self.nitrogen,
            RecommendationField::Phosphorus => &mut self.phosphorus,
            RecommendationField::Potassium => &mut self.potassium,
            RecommendationField::Season => &mut self.season,
            RecommendationField::PreviousCrop => &mut self.previous_crop,
        };
        *slot = value;
    }

    pub fn to_request(&self) -> Result<CropRecommendationRequest, ValidationError> {
        let mut missing = Vec::new();
        if self.soil_type.trim().is_empty() {
            missing.push("soil_type");
        }
        if self.location.trim().is_empty() {
            missing.push("location");
        }
        if !missing.is_empty() {
            return Err(ValidationError::MissingRequiredFields { fields: missing });
        }

        Ok(CropRecommendationRequest {
            soil_type: self.soil_type.trim().to_string(),
            location: self.location.trim().to_string(),
            ph_level: parse_number("ph_level", &self.ph_level)?,
            nitrogen: parse_number("nitrogen", &self.nitrogen)?,
            phosphorus: parse_number("phosphorus", &self.phosphorus)?,
            potassium: parse_number("potassium", &self.potassium)?,
            season: non_empty(&self.season),
            previous_crop: non_empty(&self.previous_crop),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationField {
    Name,
    Email,
    Password,
    ConfirmPassword,
    Phone,
    Location,
}

#[derive(Clone, PartialEq, Default)]
pub struct RegistrationFields {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub phone: String,
    pub location: String,
}

impl std::fmt::Debug for RegistrationFields {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationFields")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("confirm_password", &"<redacted>")
            .field("phone", &self.phone)
            .field("location", &self.location)
            .finish()
    }
}

impl RegistrationFields {
    pub fn set(&mut self, field: RegistrationField, value: String) {
        let slot = match field {
            RegistrationField::Name => &mut self.name,
            RegistrationField::Email => &mut self.email,
            RegistrationField::Password => &mut self.password,
            RegistrationField::ConfirmPassword => &mut self.confirm_password,
            RegistrationField::Phone => &mut self.phone,
            RegistrationField::Location => &mut self.location,
        };
        *slot = value;
    }

    /// First failing rule wins: required fields, then confirmation, then length.
    pub fn to_request(&self) -> Result<RegistrationRequest, ValidationError> {
        let mut missing = Vec::new();
        if self.name.is_empty() {
            missing.push("name");
        }
        if self.email.is_empty() {
            missing.push("email");
        }
        if self.password.is_empty() {
            missing.push("password");
        }
        if !missing.is_empty() {
            return Err(ValidationError::MissingAccountFields { fields: missing });
        }

        if self.password != self.confirm_password {
            return Err(ValidationError::PasswordMismatch);
        }

        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ValidationError::PasswordTooShort {
                min: MIN_PASSWORD_LEN,
            });
        }

        Ok(RegistrationRequest {
            name: self.name.clone(),
            email: self.email.clone(),
            password: self.password.clone(),
            phone: non_empty(&self.phone),
            location: non_empty(&self.location),
        })
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn parse_number(field: &'static str, value: &str) -> Result<Option<f64>, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    match trimmed.parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(Some(n)),
        _ => Err(ValidationError::InvalidNumber {
            field,
            value: value.to_string(),
        }),
    }
}
