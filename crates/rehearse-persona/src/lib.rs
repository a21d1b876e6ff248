//! # rehearse-persona
//!
//! The virtual client a trainee practices against.
//!
//! ## Key Types
//!
//! - [`ClientProfile`] - Validated persona for one practice session
//! - [`ProfileDraft`] - Raw configuration form input, validated into a profile
//! - [`Intent`] - Keyword classifier for the latest trainee message
//! - [`respond`] - Deterministic keyword-to-reply engine
//!
//! Replies never depend on anything but the message text and the profile, so
//! the engine can be shared by the HTTP API and the session orchestrator.

mod draft;
mod format;
mod profile;
mod replies;
mod rules;

pub use draft::{FieldError, ProfileDraft, ProfileError, MIN_BUDGET};
pub use format::{format_currency, initials};
pub use profile::{ClientProfile, ClientType, PersonalityTrait};
pub use replies::Replies;
pub use rules::{greeting, respond, Intent};
