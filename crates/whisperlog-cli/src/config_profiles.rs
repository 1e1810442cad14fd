//! Persistent CLI profile configuration.
//!
//! Profiles hold non-secret endpoints only. Tokens and API keys are read
//! from the environment.

use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use whisperlog_core::config::{
    ENV_AI_BASE_URL, ENV_AI_MODEL, ENV_MIRROR_COLLECTION, ENV_MIRROR_DOCUMENT, ENV_MIRROR_URL,
};
use whisperlog_core::util::normalize_text_option;

const CONFIG_FILE_NAME: &str = "cli-config.json";
const ENV_PROFILE: &str = "WHISPERLOG_PROFILE";
const DEFAULT_PROFILE: &str = "default";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CliProfilesConfig {
    #[serde(default = "default_config_version")]
    pub version: u32,
    #[serde(default)]
    pub active_profile: Option<String>,
    #[serde(default)]
    pub profiles: BTreeMap<String, CliProfile>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CliProfile {
    #[serde(default)]
    pub mirror_url: Option<String>,
    #[serde(default)]
    pub mirror_collection: Option<String>,
    #[serde(default)]
    pub mirror_document: Option<String>,
    #[serde(default)]
    pub ai_base_url: Option<String>,
    #[serde(default)]
    pub ai_model: Option<String>,
}

const fn default_config_version() -> u32 {
    1
}

pub fn default_config_path() -> Result<PathBuf, String> {
    dirs::config_dir()
        .map(|dir| dir.join("whisperlog").join(CONFIG_FILE_NAME))
        .ok_or_else(|| "Failed to resolve CLI config directory".to_string())
}

pub fn normalize_profile_name(value: Option<&str>) -> Option<String> {
    normalize_text_option(value.map(str::to_string))
}

impl CliProfilesConfig {
    pub fn load() -> Result<Self, String> {
        Self::load_from_path(&default_config_path()?)
    }

    pub fn load_from_path(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|error| format!("Failed to read config at {}: {}", path.display(), error))?;
        let mut config = serde_json::from_str::<Self>(&raw)
            .map_err(|error| format!("Failed to parse config at {}: {}", path.display(), error))?;
        config.normalize();
        Ok(config)
    }

    pub fn save(&self) -> Result<PathBuf, String> {
        let path = default_config_path()?;
        self.save_to_path(&path)?;
        Ok(path)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|error| {
                format!(
                    "Failed to create config directory {}: {}",
                    parent.display(),
                    error
                )
            })?;
        }

        let mut normalized = self.clone();
        normalized.normalize();
        let serialized = serde_json::to_string_pretty(&normalized)
            .map_err(|error| format!("Failed to serialize config: {error}"))?;
        std::fs::write(path, serialized)
            .map_err(|error| format!("Failed to write config at {}: {}", path.display(), error))
    }

    pub fn resolve_profile_name(&self, explicit: Option<&str>) -> String {
        normalize_profile_name(explicit)
            .or_else(|| normalize_profile_name(env::var(ENV_PROFILE).ok().as_deref()))
            .or_else(|| normalize_profile_name(self.active_profile.as_deref()))
            .unwrap_or_else(|| DEFAULT_PROFILE.to_string())
    }

    pub fn profile(&self, name: &str) -> Option<&CliProfile> {
        self.profiles.get(name)
    }

    pub fn profile_mut_or_default(&mut self, name: &str) -> &mut CliProfile {
        self.profiles.entry(name.to_string()).or_default()
    }

    fn normalize(&mut self) {
        self.active_profile = normalize_profile_name(self.active_profile.as_deref());
        for profile in self.profiles.values_mut() {
            profile.normalize();
        }
    }
}

impl CliProfile {
    /// Profile value standing in for the environment variable `key`.
    pub fn value_for(&self, key: &str) -> Option<String> {
        let value = match key {
            ENV_MIRROR_URL => &self.mirror_url,
            ENV_MIRROR_COLLECTION => &self.mirror_collection,
            ENV_MIRROR_DOCUMENT => &self.mirror_document,
            ENV_AI_BASE_URL => &self.ai_base_url,
            ENV_AI_MODEL => &self.ai_model,
            _ => return None,
        };
        normalize_text_option(value.clone())
    }

    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.value_for(ENV_MIRROR_URL).is_none() {
            missing.push("mirror_url");
        }
        if self.value_for(ENV_AI_BASE_URL).is_none() {
            missing.push("ai_base_url");
        }
        missing
    }

    fn normalize(&mut self) {
        self.mirror_url = normalize_text_option(self.mirror_url.take())
            .map(|url| url.trim_end_matches('/').to_string());
        self.mirror_collection = normalize_text_option(self.mirror_collection.take());
        self.mirror_document = normalize_text_option(self.mirror_document.take());
        self.ai_base_url = normalize_text_option(self.ai_base_url.take())
            .map(|url| url.trim_end_matches('/').to_string());
        self.ai_model = normalize_text_option(self.ai_model.take());
    }
}

/// Layer the process environment over `profile`.
pub fn layered_lookup(
    profile: Option<CliProfile>,
    environment: impl Fn(&str) -> Option<String>,
) -> impl Fn(&str) -> Option<String> {
    move |key| {
        normalize_text_option(environment(key))
            .or_else(|| profile.as_ref().and_then(|profile| profile.value_for(key)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use whisperlog_core::config::ENV_MIRROR_TOKEN;

    fn work_profile() -> CliProfile {
        CliProfile {
            mirror_url: Some("https://mirror.example.com".to_string()),
            mirror_collection: None,
            mirror_document: Some("work".to_string()),
            ai_base_url: None,
            ai_model: Some("gpt-4o".to_string()),
        }
    }

    #[test]
    fn normalize_profile_name_rejects_empty() {
        assert_eq!(normalize_profile_name(None), None);
        assert_eq!(normalize_profile_name(Some(" ")), None);
        assert_eq!(normalize_profile_name(Some(" work ")), Some("work".to_string()));
    }

    #[test]
    fn config_roundtrip_preserves_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);

        let mut config = CliProfilesConfig {
            version: 1,
            active_profile: Some(" default ".to_string()),
            profiles: BTreeMap::new(),
        };
        config.profiles.insert(
            "default".to_string(),
            CliProfile {
                mirror_url: Some(" https://mirror.example.com/ ".to_string()),
                ai_base_url: Some("http://localhost:11434/v1/".to_string()),
                ai_model: Some("  ".to_string()),
                ..CliProfile::default()
            },
        );

        config.save_to_path(&path).unwrap();
        let loaded = CliProfilesConfig::load_from_path(&path).unwrap();
        assert_eq!(loaded.active_profile.as_deref(), Some("default"));
        let profile = loaded.profile("default").unwrap();
        assert_eq!(
            profile.mirror_url.as_deref(),
            Some("https://mirror.example.com")
        );
        assert_eq!(
            profile.ai_base_url.as_deref(),
            Some("http://localhost:11434/v1")
        );
        assert_eq!(profile.ai_model, None);
    }

    #[test]
    fn missing_file_is_empty_config() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = CliProfilesConfig::load_from_path(&dir.path().join("absent.json")).unwrap();
        assert_eq!(loaded, CliProfilesConfig::default());
    }

    #[test]
    fn resolve_profile_name_prefers_explicit_then_active() {
        let config = CliProfilesConfig {
            version: 1,
            active_profile: Some("work".to_string()),
            profiles: BTreeMap::new(),
        };
        assert_eq!(config.resolve_profile_name(Some("mobile")), "mobile");
        if env::var(ENV_PROFILE).is_err() {
            assert_eq!(config.resolve_profile_name(None), "work");
        }
    }

    #[test]
    fn environment_overrides_profile_values() {
        let lookup = layered_lookup(Some(work_profile()), |key| {
            (key == ENV_MIRROR_DOCUMENT).then(|| "personal".to_string())
        });

        assert_eq!(
            lookup(ENV_MIRROR_URL).as_deref(),
            Some("https://mirror.example.com")
        );
        assert_eq!(lookup(ENV_MIRROR_DOCUMENT).as_deref(), Some("personal"));
        assert_eq!(lookup(ENV_AI_MODEL).as_deref(), Some("gpt-4o"));
        assert_eq!(lookup(ENV_MIRROR_COLLECTION), None);
    }

    #[test]
    fn secrets_never_come_from_profiles() {
        let lookup = layered_lookup(Some(work_profile()), |_| None);
        assert_eq!(lookup(ENV_MIRROR_TOKEN), None);
    }

    #[test]
    fn missing_fields_reports_unset_endpoints() {
        assert_eq!(work_profile().missing_fields(), vec!["ai_base_url"]);
        assert_eq!(
            CliProfile::default().missing_fields(),
            vec!["mirror_url", "ai_base_url"]
        );
    }
}
