use crate::format::format_currency;
use crate::profile::ClientProfile;

/// Reply templates spoken by the virtual client
pub struct Replies;

impl Replies {
    pub const LOCATION: &'static str = "I'm primarily interested in the downtown area, but I'm also open to the western suburbs if there are good schools nearby.";

    pub const TIMELINE_URGENT: &'static str =
        "I need to move within the next month. My current lease is ending soon.";

    pub const TIMELINE_RELAXED: &'static str = "I'm hoping to move within the next 3-4 months, but I'm not in a huge rush. I want to find the right place.";

    pub const ANALYTICAL: &'static str = "That's interesting. Can you provide more specific details about the properties in that area? I'd like to see some data on price per square foot and recent sales.";

    pub const SKEPTICAL: &'static str = "I'm not entirely convinced. What makes you think this property would be a good fit for my needs? I've heard mixed things about that neighborhood.";

    pub const ENTHUSIASTIC: &'static str = "That sounds promising! I'd love to hear more about the properties you have in mind. When can we schedule a viewing?";

    pub fn budget(profile: &ClientProfile) -> String {
        format!(
            "My budget is between {} and {}. I'm hoping to find something on the lower end of that range, but I can be flexible for the right property.",
            format_currency(profile.budget_min),
            format_currency(profile.budget_max)
        )
    }

    pub fn features(profile: &ClientProfile) -> String {
        match profile.special_requirements() {
            Some(requirements) => format!(
                "I'm looking for {}. Also, {}.",
                profile.property_preferences, requirements
            ),
            None => format!("I'm looking for {}.", profile.property_preferences),
        }
    }

    /// Opening line the client says when a session starts.
    pub fn greeting(profile: &ClientProfile) -> String {
        format!(
            "Hi there! I'm {}. I'm looking for a {}. My budget is between {} and {}. Can you help me find something suitable?",
            profile.client_name,
            profile.property_preferences,
            format_currency(profile.budget_min),
            format_currency(profile.budget_max)
        )
    }
}
