use std::env;

use whisperlog_core::config::{
    CompletionConfig, MirrorConfig, ENV_AI_API_KEY, ENV_MIRROR_TOKEN, ENV_OPENAI_API_KEY,
};
use whisperlog_core::util::{is_http_url, normalize_text_option};

use crate::cli::ConfigCommands;
use crate::config_profiles::{layered_lookup, CliProfile, CliProfilesConfig};
use crate::error::CliError;

pub fn run_config(command: ConfigCommands, global_profile: Option<&str>) -> Result<(), CliError> {
    match command {
        ConfigCommands::Init {
            profile,
            mirror_url,
            mirror_collection,
            mirror_document,
            ai_base_url,
            ai_model,
            no_activate,
        } => run_config_init(
            profile.as_deref().or(global_profile),
            CliProfile {
                mirror_url,
                mirror_collection,
                mirror_document,
                ai_base_url,
                ai_model,
            },
            no_activate,
        ),
        ConfigCommands::Show { profile } => run_config_show(profile.as_deref().or(global_profile)),
    }
}

pub fn run_config_init(
    profile_name: Option<&str>,
    updates: CliProfile,
    no_activate: bool,
) -> Result<(), CliError> {
    let mut config = CliProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = config.resolve_profile_name(profile_name);

    let profile = config.profile_mut_or_default(&profile_name);
    merge_profile(profile, updates);
    validate_profile_urls(profile)?;

    if !no_activate {
        config.active_profile = Some(profile_name.clone());
    }

    let path = config.save().map_err(CliError::Config)?;
    println!(
        "Profile '{}' initialized at {}",
        profile_name,
        path.display()
    );

    let missing_fields = config
        .profile(&profile_name)
        .map(CliProfile::missing_fields)
        .unwrap_or_default();
    if !missing_fields.is_empty() {
        println!(
            "Profile '{}' does not set: {} (environment variables or defaults apply)",
            profile_name,
            missing_fields.join(", ")
        );
    }

    Ok(())
}

pub fn run_config_show(profile_name: Option<&str>) -> Result<(), CliError> {
    let config = CliProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = config.resolve_profile_name(profile_name);
    let profile = config.profile(&profile_name).cloned();
    let active = config.active_profile.as_deref() == Some(profile_name.as_str());

    for line in describe_settings(&profile_name, active, profile, |key| env::var(key).ok())? {
        println!("{line}");
    }
    Ok(())
}

/// Effective mirror and AI settings, with secrets reduced to set/unset.
pub fn describe_settings(
    profile_name: &str,
    active: bool,
    profile: Option<CliProfile>,
    environment: impl Fn(&str) -> Option<String> + Copy,
) -> Result<Vec<String>, CliError> {
    let mut lines = vec![format!(
        "Profile:   {profile_name}{}{}",
        if active { " (active)" } else { "" },
        if profile.is_none() { " (not saved)" } else { "" }
    )];

    let settings = layered_lookup(profile, environment);
    match MirrorConfig::from_lookup(&settings)? {
        Some(mirror) => {
            lines.push(format!(
                "Mirror:    {} ({}/{}, every {}s)",
                mirror.url,
                mirror.collection,
                mirror.document,
                mirror.poll_interval.as_secs()
            ));
            lines.push(format!(
                "           token {}",
                secret_state(environment(ENV_MIRROR_TOKEN))
            ));
        }
        None => lines.push("Mirror:    local only".to_string()),
    }

    let completion = CompletionConfig::from_lookup(&settings)?;
    lines.push(format!(
        "AI:        {} at {}",
        completion.model, completion.base_url
    ));
    lines.push(format!(
        "           API key {}",
        secret_state(environment(ENV_AI_API_KEY).or_else(|| environment(ENV_OPENAI_API_KEY)))
    ));
    if !completion.is_configured() {
        lines.push("           (not configured)".to_string());
    }

    Ok(lines)
}

fn secret_state(value: Option<String>) -> &'static str {
    if normalize_text_option(value).is_some() {
        "set"
    } else {
        "not set"
    }
}

fn merge_profile(profile: &mut CliProfile, updates: CliProfile) {
    if let Some(value) = normalize_text_option(updates.mirror_url) {
        profile.mirror_url = Some(value);
    }
    if let Some(value) = normalize_text_option(updates.mirror_collection) {
        profile.mirror_collection = Some(value);
    }
    if let Some(value) = normalize_text_option(updates.mirror_document) {
        profile.mirror_document = Some(value);
    }
    if let Some(value) = normalize_text_option(updates.ai_base_url) {
        profile.ai_base_url = Some(value);
    }
    if let Some(value) = normalize_text_option(updates.ai_model) {
        profile.ai_model = Some(value);
    }
}

pub fn validate_profile_urls(profile: &CliProfile) -> Result<(), CliError> {
    if let Some(url) = normalize_text_option(profile.mirror_url.clone()) {
        if !is_http_url(&url) {
            return Err(CliError::Config(
                "mirror_url must include http:// or https://".to_string(),
            ));
        }
    }
    if let Some(url) = normalize_text_option(profile.ai_base_url.clone()) {
        if !is_http_url(&url) {
            return Err(CliError::Config(
                "ai_base_url must include http:// or https://".to_string(),
            ));
        }
    }
    Ok(())
}
