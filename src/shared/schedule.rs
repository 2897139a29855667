use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::validators::validate_time_hhmm;

/// Number of watering slots the controller stores.
///
/// The device firmware keeps a fixed table of this size; the UI never shows
/// more than this many rows.
pub const SCHEDULE_SLOTS: usize = 10;

/// Time used by empty slots
pub const BLANK_SLOT_TIME: &str = "00:00";

/// One watering slot: fire `amount_ml` at `time` (HH:MM) when enabled
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WateringScheduleEntry {
    pub time: String,
    pub amount_ml: u32,
    pub enabled: bool,
}

impl WateringScheduleEntry {
    pub fn new(time: impl Into<String>, amount_ml: u32, enabled: bool) -> Self {
        Self {
            time: time.into(),
            amount_ml,
            enabled,
        }
    }

    /// True for the `{00:00, 0, false}` filler used by unused slots
    pub fn is_blank(&self) -> bool {
        self.time == BLANK_SLOT_TIME && self.amount_ml == 0 && !self.enabled
    }
}

impl Default for WateringScheduleEntry {
    fn default() -> Self {
        Self::new(BLANK_SLOT_TIME, 0, false)
    }
}

/// Schedule editing errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("Maximum number of schedule entries reached (10)")]
    CapacityExceeded,

    #[error("Invalid schedule time '{0}', expected HH:MM")]
    InvalidTime(String),
}

/// Factory watering schedule: three daytime waterings, remaining slots blank
pub fn factory_schedule() -> [WateringScheduleEntry; SCHEDULE_SLOTS] {
    let mut editor = WateringScheduleEditor::new();
    for (time, amount_ml) in [("06:00", 50), ("12:00", 75), ("18:00", 100)] {
        editor.entries.push(WateringScheduleEntry::new(time, amount_ml, true));
    }
    editor.to_ordered_list()
}

/// Bounded, ordered list of watering entries being edited.
///
/// Holds between 0 and [`SCHEDULE_SLOTS`] entries in insertion order and
/// turns them back into the fixed-size slot table the device stores.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WateringScheduleEditor {
    entries: Vec<WateringScheduleEntry>,
}

impl WateringScheduleEditor {
    pub fn new() -> Self {
        Self {
            entries: Vec::with_capacity(SCHEDULE_SLOTS),
        }
    }

    /// Load the used slots of a stored schedule, skipping blank filler slots
    pub fn from_slots(slots: &[WateringScheduleEntry]) -> Self {
        let entries = slots
            .iter()
            .filter(|entry| !entry.is_blank())
            .take(SCHEDULE_SLOTS)
            .cloned()
            .collect();
        Self { entries }
    }

    /// Append an entry
    ///
    /// # Returns
    /// * `Ok(index)` - Position of the new entry
    /// * `Err(ScheduleError::CapacityExceeded)` - All slots are in use
    /// * `Err(ScheduleError::InvalidTime)` - `time` is not HH:MM
    pub fn add_entry(
        &mut self,
        time: &str,
        amount_ml: u32,
        enabled: bool,
    ) -> Result<usize, ScheduleError> {
        if self.is_full() {
            return Err(ScheduleError::CapacityExceeded);
        }
        if validate_time_hhmm(time).is_err() {
            return Err(ScheduleError::InvalidTime(time.to_string()));
        }

        self.entries
            .push(WateringScheduleEntry::new(time, amount_ml, enabled));
        Ok(self.entries.len() - 1)
    }

    /// Append the entry the settings page offers for a new row (08:00, 100 ml)
    pub fn add_default_entry(&mut self) -> Result<usize, ScheduleError> {
        self.add_entry("08:00", 100, true)
    }

    /// Remove the entry at `index`, shifting later entries up
    pub fn remove_entry(&mut self, index: usize) -> Option<WateringScheduleEntry> {
        if index < self.entries.len() {
            Some(self.entries.remove(index))
        } else {
            None
        }
    }

    pub fn entries(&self) -> &[WateringScheduleEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= SCHEDULE_SLOTS
    }

    /// Exactly [`SCHEDULE_SLOTS`] entries: the edited ones in order, then blank slots
    pub fn to_ordered_list(&self) -> [WateringScheduleEntry; SCHEDULE_SLOTS] {
        std::array::from_fn(|i| self.entries.get(i).cloned().unwrap_or_default())
    }
}

/// Serde adapter for the fixed slot table.
///
/// Serializes as a plain list. Deserializing accepts up to
/// [`SCHEDULE_SLOTS`] entries and pads the rest with blank slots; a longer
/// list is rejected.
pub mod slots {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{WateringScheduleEntry, SCHEDULE_SLOTS};

    pub fn serialize<S>(
        slots: &[WateringScheduleEntry; SCHEDULE_SLOTS],
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(slots.iter())
    }

    pub fn deserialize<'de, D>(
        deserializer: D,
    ) -> Result<[WateringScheduleEntry; SCHEDULE_SLOTS], D::Error>
    where
        D: Deserializer<'de>,
    {
        let entries = Vec::<WateringScheduleEntry>::deserialize(deserializer)?;
        if entries.len() > SCHEDULE_SLOTS {
            return Err(D::Error::custom(format!(
                "watering schedule has {} entries, maximum is {}",
                entries.len(),
                SCHEDULE_SLOTS
            )));
        }

        let mut entries = entries.into_iter();
        Ok(std::array::from_fn(|_| entries.next().unwrap_or_default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_entry_until_capacity() {
        let mut editor = WateringScheduleEditor::new();

        for i in 0..SCHEDULE_SLOTS {
            let index = editor.add_entry("07:30", 50, true).unwrap();
            assert_eq!(index, i);
        }

        assert!(editor.is_full());
        assert_eq!(
            editor.add_entry("07:30", 50, true),
            Err(ScheduleError::CapacityExceeded)
        );
        assert_eq!(editor.len(), SCHEDULE_SLOTS);
    }

    #[test]
    fn test_add_entry_rejects_bad_time() {
        let mut editor = WateringScheduleEditor::new();

        assert_eq!(
            editor.add_entry("25:00", 50, true),
            Err(ScheduleError::InvalidTime("25:00".to_string()))
        );
        assert!(editor.is_empty());
    }

    #[test]
    fn test_remove_entry_preserves_order() {
        let mut editor = WateringScheduleEditor::new();
        editor.add_entry("06:00", 10, true).unwrap();
        editor.add_entry("12:00", 20, true).unwrap();
        editor.add_entry("18:00", 30, false).unwrap();

        let removed = editor.remove_entry(1).unwrap();
        assert_eq!(removed.time, "12:00");

        let times: Vec<_> = editor.entries().iter().map(|e| e.time.as_str()).collect();
        assert_eq!(times, vec!["06:00", "18:00"]);

        assert!(editor.remove_entry(5).is_none());
    }

    #[test]
    fn test_to_ordered_list_pads_with_blank_slots() {
        let mut editor = WateringScheduleEditor::new();
        editor.add_entry("09:15", 120, true).unwrap();

        let slots = editor.to_ordered_list();

        assert_eq!(slots.len(), SCHEDULE_SLOTS);
        assert_eq!(slots[0], WateringScheduleEntry::new("09:15", 120, true));
        assert!(slots[1..].iter().all(WateringScheduleEntry::is_blank));
    }

    #[test]
    fn test_from_slots_skips_blank_filler() {
        let slots = factory_schedule();
        let editor = WateringScheduleEditor::from_slots(&slots);

        assert_eq!(editor.len(), 3);
        assert_eq!(editor.to_ordered_list(), slots);
    }

    #[test]
    fn test_from_slots_keeps_disabled_but_configured_entries() {
        let slots = [
            WateringScheduleEntry::new("00:00", 0, false),
            WateringScheduleEntry::new("00:00", 40, false),
            WateringScheduleEntry::new("05:00", 0, false),
        ];
        let editor = WateringScheduleEditor::from_slots(&slots);

        assert_eq!(editor.len(), 2);
    }

    #[test]
    fn test_slots_deserialize_rejects_more_than_capacity() {
        #[derive(Debug, Deserialize)]
        struct Wrapper {
            #[serde(with = "slots")]
            #[allow(dead_code)]
            schedule: [WateringScheduleEntry; SCHEDULE_SLOTS],
        }

        let entry = r#"{"time":"06:00","amount_ml":10,"enabled":true}"#;
        let list = vec![entry; SCHEDULE_SLOTS + 1].join(",");
        let json = format!(r#"{{"schedule":[{}]}}"#, list);

        let result: Result<Wrapper, _> = serde_json::from_str(&json);
        assert!(result.is_err());
    }
}
