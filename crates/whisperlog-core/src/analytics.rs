//! Frequency statistics over the entry collection.

use std::collections::HashMap;
use std::hash::Hash;

use serde::Serialize;

use crate::models::{Activity, AngelNumber, Emotion, LogEntry, Mood};

/// Number of angel numbers kept in the report.
pub const TOP_NUMBERS: usize = 10;

/// How often a value occurs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Count<T> {
    pub value: T,
    pub count: usize,
}

/// Sighting counts for the analytics view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrequencyReport {
    pub total_entries: usize,
    /// Most frequent first, ties broken by ascending number, at most ten.
    pub angel_numbers: Vec<Count<AngelNumber>>,
    /// In vocabulary order, members never logged omitted.
    pub emotions: Vec<Count<Emotion>>,
    pub activities: Vec<Count<Activity>>,
    pub moods: Vec<Count<Mood>>,
}

impl FrequencyReport {
    #[must_use]
    pub fn from_entries(entries: &[LogEntry]) -> Self {
        let mut numbers: HashMap<&AngelNumber, usize> = HashMap::new();
        for entry in entries {
            *numbers.entry(&entry.angel_number).or_default() += 1;
        }
        let mut angel_numbers: Vec<Count<AngelNumber>> = numbers
            .into_iter()
            .map(|(value, count)| Count {
                value: value.clone(),
                count,
            })
            .collect();
        angel_numbers.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));
        angel_numbers.truncate(TOP_NUMBERS);

        Self {
            total_entries: entries.len(),
            angel_numbers,
            emotions: distribution(Emotion::ALL, entries.iter().map(|entry| entry.emotion)),
            activities: distribution(Activity::ALL, entries.iter().map(|entry| entry.activity)),
            moods: distribution(Mood::ALL, entries.iter().filter_map(|entry| entry.mood)),
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.total_entries == 0
    }
}

fn distribution<T>(members: &[T], values: impl Iterator<Item = T>) -> Vec<Count<T>>
where
    T: Copy + Eq + Hash,
{
    let mut counts: HashMap<T, usize> = HashMap::new();
    for value in values {
        *counts.entry(value).or_default() += 1;
    }
    members
        .iter()
        .filter_map(|member| {
            counts.get(member).map(|count| Count {
                value: *member,
                count: *count,
            })
        })
        .collect()
}
