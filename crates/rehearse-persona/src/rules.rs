use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::profile::{ClientProfile, PersonalityTrait};
use crate::replies::Replies;

/// What the trainee's latest message is asking about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Budget,
    Location,
    Timeline,
    Features,
}

/// A keyword rule. The table order is the match priority.
struct Rule {
    intent: Intent,
    keywords: &'static [&'static str],
    reply: fn(&ClientProfile) -> String,
}

static RULES: &[Rule] = &[
    Rule {
        intent: Intent::Budget,
        keywords: &["price", "budget"],
        reply: Replies::budget,
    },
    Rule {
        intent: Intent::Location,
        keywords: &["location", "area"],
        reply: location,
    },
    Rule {
        intent: Intent::Timeline,
        keywords: &["timeline", "when"],
        reply: timeline,
    },
    Rule {
        intent: Intent::Features,
        keywords: &["feature", "looking for"],
        reply: Replies::features,
    },
];

fn location(_profile: &ClientProfile) -> String {
    Replies::LOCATION.to_string()
}

fn timeline(profile: &ClientProfile) -> String {
    if profile.urgency_level > 7 {
        Replies::TIMELINE_URGENT.to_string()
    } else {
        Replies::TIMELINE_RELAXED.to_string()
    }
}

impl Intent {
    /// Classify a message by case-insensitive substring match.
    ///
    /// Returns the first rule whose keywords appear, or `None` when the
    /// client should fall back to a personality-driven reply.
    pub fn classify(input: &str) -> Option<Self> {
        Self::matching_rule(&input.to_lowercase()).map(|rule| rule.intent)
    }

    fn matching_rule(lowered: &str) -> Option<&'static Rule> {
        RULES
            .iter()
            .find(|rule| rule.keywords.iter().any(|k| lowered.contains(k)))
    }
}

/// Produce the virtual client's reply to `input`.
///
/// Pure and total: every input yields a reply, nothing is mutated.
pub fn respond(input: &str, profile: &ClientProfile) -> String {
    let lowered = input.to_lowercase();

    if let Some(rule) = Intent::matching_rule(&lowered) {
        debug!(intent = ?rule.intent, "Matched keyword rule");
        return (rule.reply)(profile);
    }

    debug!("No keyword rule matched, using personality fallback");
    personality_reply(profile).to_string()
}

/// Opening line for a fresh conversation.
pub fn greeting(profile: &ClientProfile) -> String {
    Replies::greeting(profile)
}

// analytical wins over skeptical when both are present
fn personality_reply(profile: &ClientProfile) -> &'static str {
    if profile.has_trait(PersonalityTrait::Analytical) {
        Replies::ANALYTICAL
    } else if profile.has_trait(PersonalityTrait::Skeptical) {
        Replies::SKEPTICAL
    } else {
        Replies::ENTHUSIASTIC
    }
}
