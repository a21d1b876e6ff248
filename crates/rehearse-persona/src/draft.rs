use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::profile::{ClientProfile, ClientType, PersonalityTrait};

/// Smallest budget the form accepts, in dollars.
pub const MIN_BUDGET: u64 = 50_000;

const MIN_NAME_LEN: usize = 2;

/// A single rejected form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProfileError {
    #[error("Invalid client parameters: {}", summarize(.0))]
    Invalid(Vec<FieldError>),
}

impl ProfileError {
    pub fn fields(&self) -> &[FieldError] {
        match self {
            ProfileError::Invalid(fields) => fields,
        }
    }
}

fn summarize(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(|f| f.message.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Raw values from the client configuration form.
///
/// Missing fields take the form's defaults, so an empty JSON object is a
/// valid draft that only fails on the name and client type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileDraft {
    pub client_name: String,
    pub client_type: Option<ClientType>,
    pub budget_min: u64,
    pub budget_max: u64,
    pub urgency_level: u8,
    pub personality_traits: Vec<PersonalityTrait>,
    pub property_preferences: String,
    pub special_requirements: String,
}

impl Default for ProfileDraft {
    fn default() -> Self {
        Self {
            client_name: String::new(),
            client_type: None,
            budget_min: 300_000,
            budget_max: 500_000,
            urgency_level: 5,
            personality_traits: vec![PersonalityTrait::Analytical],
            property_preferences: String::new(),
            special_requirements: String::new(),
        }
    }
}

impl ProfileDraft {
    /// Check every field and build a profile with a fresh session-unique id.
    ///
    /// All field errors are reported together, in form order.
    pub fn validate(&self) -> Result<ClientProfile, ProfileError> {
        let mut errors = Vec::new();

        let client_name = self.client_name.trim();
        if client_name.chars().count() < MIN_NAME_LEN {
            errors.push(FieldError::new(
                "clientName",
                "Client name must be at least 2 characters.",
            ));
        }

        if self.client_type.is_none() {
            errors.push(FieldError::new("clientType", "Please select a client type."));
        }

        if self.budget_min < MIN_BUDGET {
            errors.push(FieldError::new(
                "budgetMin",
                "Minimum budget must be at least $50,000.",
            ));
        }

        if self.budget_max < MIN_BUDGET {
            errors.push(FieldError::new(
                "budgetMax",
                "Maximum budget must be at least $50,000.",
            ));
        } else if self.budget_max < self.budget_min {
            errors.push(FieldError::new(
                "budgetMax",
                "Maximum budget must be greater than or equal to the minimum budget.",
            ));
        }

        if !(1..=10).contains(&self.urgency_level) {
            errors.push(FieldError::new(
                "urgencyLevel",
                "Urgency level must be between 1 and 10.",
            ));
        }

        if self.personality_traits.is_empty() {
            errors.push(FieldError::new(
                "personalityTraits",
                "Select at least one personality trait.",
            ));
        }

        let client_type = match self.client_type {
            Some(client_type) if errors.is_empty() => client_type,
            _ => {
                debug!(errors = errors.len(), "Profile draft rejected");
                return Err(ProfileError::Invalid(errors));
            }
        };

        let mut personality_traits = Vec::with_capacity(self.personality_traits.len());
        for personality in &self.personality_traits {
            if !personality_traits.contains(personality) {
                personality_traits.push(*personality);
            }
        }

        let special_requirements = self.special_requirements.trim();

        Ok(ClientProfile {
            id: uuid::Uuid::new_v4().to_string(),
            client_name: client_name.to_string(),
            client_type,
            budget_min: self.budget_min,
            budget_max: self.budget_max,
            urgency_level: self.urgency_level,
            personality_traits,
            property_preferences: self.property_preferences.trim().to_string(),
            special_requirements: (!special_requirements.is_empty())
                .then(|| special_requirements.to_string()),
        })
    }
}
