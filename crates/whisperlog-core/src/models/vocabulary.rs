//! Closed vocabularies used by log entries.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::angel_number::ValidationError;

macro_rules! closed_vocabulary {
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal {
            $($variant:ident => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            /// Every member, in presentation order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }

            /// Comma separated list of members for help and error text.
            #[must_use]
            pub fn choices() -> String {
                Self::ALL
                    .iter()
                    .map(|member| member.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = normalize_label(s);
                Self::ALL
                    .iter()
                    .copied()
                    .find(|member| normalize_label(member.as_str()) == wanted)
                    .ok_or_else(|| ValidationError::UnknownChoice {
                        field: $field,
                        value: s.trim().to_string(),
                        allowed: Self::choices(),
                    })
            }
        }
    };
}

/// Lowercase and drop spaces, hyphens and underscores so `divine-feminine`
/// and `Divine Feminine` name the same member.
fn normalize_label(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

closed_vocabulary! {
    /// How the user felt when the number appeared.
    Emotion, "emotion" {
        Joyful => "Joyful",
        Anxious => "Anxious",
        Inspired => "Inspired",
        Confused => "Confused",
        Peaceful => "Peaceful",
        Curious => "Curious",
        Grateful => "Grateful",
        Overwhelmed => "Overwhelmed",
        Hopeful => "Hopeful",
        Introspective => "Introspective",
        Excited => "Excited",
        Serene => "Serene",
    }
}

closed_vocabulary! {
    /// What the user was doing when the number appeared.
    Activity, "activity" {
        Meditating => "Meditating",
        Working => "Working",
        Driving => "Driving",
        Reading => "Reading",
        Socializing => "Socializing",
        Resting => "Resting",
        Creating => "Creating",
        Exercising => "Exercising",
        Praying => "Praying",
        Contemplating => "Contemplating",
        Journaling => "Journaling",
        Walking => "Walking",
    }
}

closed_vocabulary! {
    /// Overall mood of the day.
    Mood, "mood" {
        Excellent => "Excellent",
        Good => "Good",
        Okay => "Okay",
        Bad => "Bad",
        Terrible => "Terrible",
    }
}

closed_vocabulary! {
    /// Languages interpretations and narrations can be generated in.
    Language, "language" {
        English => "English",
        Bengali => "Bengali",
        Hindi => "Hindi",
    }
}

closed_vocabulary! {
    /// Tone guidance for spoken narration.
    VoiceStyle, "voice style" {
        DivineFeminine => "Divine Feminine",
        CosmicNeutral => "Cosmic Neutral",
        SacredMasculine => "Sacred Masculine",
        Calm => "Calm",
        Energetic => "Energetic",
        Warm => "Warm",
        Wise => "Wise",
        Neutral => "Neutral",
    }
}

impl Default for Language {
    fn default() -> Self {
        Self::English
    }
}

impl Default for VoiceStyle {
    fn default() -> Self {
        Self::DivineFeminine
    }
}

impl Language {
    /// BCP-47 tag used by speech engines.
    #[must_use]
    pub const fn speech_code(self) -> &'static str {
        match self {
            Self::English => "en-US",
            Self::Bengali => "bn-IN",
            Self::Hindi => "hi-IN",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("joyful".parse::<Emotion>().unwrap(), Emotion::Joyful);
        assert_eq!(
            "MEDITATING".parse::<Activity>().unwrap(),
            Activity::Meditating
        );
        assert_eq!(
            "divine-feminine".parse::<VoiceStyle>().unwrap(),
            VoiceStyle::DivineFeminine
        );
        assert_eq!(
            "Cosmic Neutral".parse::<VoiceStyle>().unwrap(),
            VoiceStyle::CosmicNeutral
        );
    }

    #[test]
    fn unknown_member_lists_choices() {
        let error = "Sleepy".parse::<Mood>().unwrap_err();
        let message = error.to_string();
        assert!(message.contains("Sleepy"));
        assert!(message.contains("Excellent, Good, Okay, Bad, Terrible"));
    }

    #[test]
    fn serializes_with_display_labels() {
        assert_eq!(
            serde_json::to_string(&VoiceStyle::SacredMasculine).unwrap(),
            "\"Sacred Masculine\""
        );
        assert_eq!(
            serde_json::from_str::<Emotion>("\"Serene\"").unwrap(),
            Emotion::Serene
        );
        assert!(serde_json::from_str::<Emotion>("\"serene\"").is_err());
    }

    #[test]
    fn vocabularies_have_expected_sizes() {
        assert_eq!(Emotion::ALL.len(), 12);
        assert_eq!(Activity::ALL.len(), 12);
        assert_eq!(Mood::ALL.len(), 5);
        assert_eq!(Language::ALL.len(), 3);
        assert_eq!(VoiceStyle::ALL.len(), 8);
    }

    #[test]
    fn language_speech_codes() {
        assert_eq!(Language::English.speech_code(), "en-US");
        assert_eq!(Language::Bengali.speech_code(), "bn-IN");
        assert_eq!(Language::Hindi.speech_code(), "hi-IN");
        assert_eq!(Language::default(), Language::English);
    }
}
