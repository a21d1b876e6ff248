//! Client configuration form for the terminal.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use dialoguer::{Input, MultiSelect, Select};

use rehearse_persona::{ClientProfile, ClientType, PersonalityTrait, ProfileDraft};

/// Load a profile from a JSON file holding a configuration form or a
/// `clientParams` object.
pub fn load_profile(path: &Path) -> Result<ClientProfile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let draft: ProfileDraft = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    draft
        .validate()
        .with_context(|| format!("Invalid client profile in {}", path.display()))
}

/// Ask for every field, re-asking until the form validates.
pub fn prompt_profile() -> Result<ClientProfile> {
    eprintln!("{}", "Configure your virtual client".bold());
    eprintln!();

    let mut draft = ProfileDraft::default();
    loop {
        fill_draft(&mut draft)?;

        match draft.validate() {
            Ok(profile) => return Ok(profile),
            Err(e) => {
                eprintln!();
                for field in e.fields() {
                    eprintln!("  {} {}", "✗".bright_red(), field.message);
                }
                eprintln!();
            }
        }
    }
}

fn fill_draft(draft: &mut ProfileDraft) -> Result<()> {
    draft.client_name = Input::new()
        .with_prompt("Client name")
        .with_initial_text(draft.client_name.clone())
        .interact_text()?;

    let labels: Vec<String> = ClientType::ALL.iter().map(ClientType::label).collect();
    let current = draft
        .client_type
        .and_then(|t| ClientType::ALL.iter().position(|c| *c == t))
        .unwrap_or(0);
    let selection = Select::new()
        .with_prompt("Client type")
        .items(&labels)
        .default(current)
        .interact()?;
    draft.client_type = Some(ClientType::ALL[selection]);

    draft.budget_min = Input::new()
        .with_prompt("Minimum budget ($)")
        .default(draft.budget_min)
        .interact_text()?;
    draft.budget_max = Input::new()
        .with_prompt("Maximum budget ($)")
        .default(draft.budget_max)
        .interact_text()?;
    draft.urgency_level = Input::new()
        .with_prompt("Urgency (1-10)")
        .default(draft.urgency_level)
        .interact_text()?;

    let trait_labels: Vec<&str> = PersonalityTrait::ALL.iter().map(|t| t.label()).collect();
    let checked: Vec<bool> = PersonalityTrait::ALL
        .iter()
        .map(|t| draft.personality_traits.contains(t))
        .collect();
    let picked = MultiSelect::new()
        .with_prompt("Personality traits (space to toggle)")
        .items(&trait_labels)
        .defaults(&checked)
        .interact()?;
    draft.personality_traits = picked.into_iter().map(|i| PersonalityTrait::ALL[i]).collect();

    draft.property_preferences = Input::new()
        .with_prompt("Property preferences")
        .with_initial_text(draft.property_preferences.clone())
        .allow_empty(true)
        .interact_text()?;
    draft.special_requirements = Input::new()
        .with_prompt("Special requirements")
        .with_initial_text(draft.special_requirements.clone())
        .allow_empty(true)
        .interact_text()?;

    Ok(())
}
