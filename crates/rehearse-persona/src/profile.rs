use serde::{Deserialize, Serialize};

use crate::format::format_currency;

/// The kind of buyer the virtual client plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClientType {
    FirstTimeBuyer,
    Investor,
    Downsizer,
    LuxuryBuyer,
    FamilyHome,
}

impl ClientType {
    pub const ALL: [ClientType; 5] = [
        ClientType::FirstTimeBuyer,
        ClientType::Investor,
        ClientType::Downsizer,
        ClientType::LuxuryBuyer,
        ClientType::FamilyHome,
    ];

    /// Wire identifier, e.g. `first-time-buyer`
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientType::FirstTimeBuyer => "first-time-buyer",
            ClientType::Investor => "investor",
            ClientType::Downsizer => "downsizer",
            ClientType::LuxuryBuyer => "luxury-buyer",
            ClientType::FamilyHome => "family-home",
        }
    }

    /// Title-cased badge text, e.g. `First Time Buyer`
    pub fn label(&self) -> String {
        self.as_str()
            .split('-')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl std::fmt::Display for ClientType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ClientType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ClientType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| format!("Unknown client type: {}", s))
    }
}

/// Personality vocabulary offered by the configuration form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersonalityTrait {
    Analytical,
    Emotional,
    Skeptical,
    Decisive,
    Cautious,
}

impl PersonalityTrait {
    pub const ALL: [PersonalityTrait; 5] = [
        PersonalityTrait::Analytical,
        PersonalityTrait::Emotional,
        PersonalityTrait::Skeptical,
        PersonalityTrait::Decisive,
        PersonalityTrait::Cautious,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PersonalityTrait::Analytical => "analytical",
            PersonalityTrait::Emotional => "emotional",
            PersonalityTrait::Skeptical => "skeptical",
            PersonalityTrait::Decisive => "decisive",
            PersonalityTrait::Cautious => "cautious",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PersonalityTrait::Analytical => "Analytical",
            PersonalityTrait::Emotional => "Emotional",
            PersonalityTrait::Skeptical => "Skeptical",
            PersonalityTrait::Decisive => "Decisive",
            PersonalityTrait::Cautious => "Cautious",
        }
    }
}

impl std::fmt::Display for PersonalityTrait {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PersonalityTrait {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PersonalityTrait::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| format!("Unknown personality trait: {}", s))
    }
}

/// Persona parameters for one practice session.
///
/// Built once by [`crate::ProfileDraft::validate`] and never mutated afterwards.
/// The JSON shape matches the `clientParams` object accepted by the chat API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientProfile {
    #[serde(default)]
    pub id: String,
    pub client_name: String,
    pub client_type: ClientType,
    pub budget_min: u64,
    pub budget_max: u64,
    pub urgency_level: u8,
    pub personality_traits: Vec<PersonalityTrait>,
    #[serde(default)]
    pub property_preferences: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_requirements: Option<String>,
}

impl ClientProfile {
    pub fn has_trait(&self, personality: PersonalityTrait) -> bool {
        self.personality_traits.contains(&personality)
    }

    /// Special requirements, if any were given with non-blank text.
    pub fn special_requirements(&self) -> Option<&str> {
        self.special_requirements
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// `$450,000 - $500,000`
    pub fn budget_label(&self) -> String {
        format!(
            "{} - {}",
            format_currency(self.budget_min),
            format_currency(self.budget_max)
        )
    }

    /// One-line summary shown above the conversation.
    pub fn header(&self) -> String {
        format!(
            "Budget: {} • Urgency: {}/10",
            self.budget_label(),
            self.urgency_level
        )
    }
}
