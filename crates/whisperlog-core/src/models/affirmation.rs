//! Cached daily affirmation

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An affirmation generated for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyAffirmation {
    pub date: NaiveDate,
    pub text: String,
}

impl DailyAffirmation {
    #[must_use]
    pub fn is_for(&self, day: NaiveDate) -> bool {
        self.date == day
    }
}
