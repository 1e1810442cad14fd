//! Structured interpretation of an angel number

use serde::{Deserialize, Serialize};

/// The seven-part reading produced by the interpretation flow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interpretation {
    pub the_message: String,
    pub spiritual_significance: String,
    pub ancient_wisdom: String,
    pub context: String,
    pub quote: String,
    pub metaphor: String,
    pub reflection_question: String,
}

impl Interpretation {
    /// JSON keys every interpretation carries.
    pub const FIELDS: [&'static str; 7] = [
        "theMessage",
        "spiritualSignificance",
        "ancientWisdom",
        "context",
        "quote",
        "metaphor",
        "reflectionQuestion",
    ];

    /// Titled sections in reading order.
    #[must_use]
    pub fn sections(&self) -> [(&'static str, &str); 7] {
        [
            ("The Message", &self.the_message),
            ("Spiritual Significance", &self.spiritual_significance),
            ("Ancient Wisdom", &self.ancient_wisdom),
            ("Context", &self.context),
            ("Quote", &self.quote),
            ("Metaphor", &self.metaphor),
            ("Reflection Question", &self.reflection_question),
        ]
    }

    /// True when any section is blank.
    #[must_use]
    pub fn is_incomplete(&self) -> bool {
        self.sections().iter().any(|(_, text)| text.trim().is_empty())
    }
}
