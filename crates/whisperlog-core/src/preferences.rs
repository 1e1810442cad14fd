//! Persisted user preferences

use crate::cache::{LocalCache, LANGUAGE_KEY};
use crate::error::Result;
use crate::models::Language;

/// Preferred language for interpretations and narration.
///
/// Missing or unrecognized stored values fall back to English.
pub fn load_language<C: LocalCache + ?Sized>(cache: &C) -> Result<Language> {
    let Some(raw) = cache.get(LANGUAGE_KEY)? else {
        return Ok(Language::default());
    };
    Ok(raw.parse().unwrap_or_else(|_| {
        tracing::warn!("Ignoring unknown stored language {raw:?}");
        Language::default()
    }))
}

pub fn save_language<C: LocalCache + ?Sized>(cache: &C, language: Language) -> Result<()> {
    cache.set(LANGUAGE_KEY, language.as_str())?;
    tracing::debug!("Saved language preference: {language}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;

    #[test]
    fn defaults_to_english() {
        let cache = MemoryCache::new();
        assert_eq!(load_language(&cache).unwrap(), Language::English);
    }

    #[test]
    fn round_trips_through_cache() {
        let cache = MemoryCache::new();
        save_language(&cache, Language::Bengali).unwrap();
        assert_eq!(cache.get(LANGUAGE_KEY).unwrap().as_deref(), Some("Bengali"));
        assert_eq!(load_language(&cache).unwrap(), Language::Bengali);
    }

    #[test]
    fn unknown_value_is_ignored() {
        let cache = MemoryCache::new();
        cache.set(LANGUAGE_KEY, "Klingon").unwrap();
        assert_eq!(load_language(&cache).unwrap(), Language::English);
    }
}
