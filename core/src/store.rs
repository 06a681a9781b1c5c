use std::collections::BTreeMap;

use tracing::warn;

use crate::models::{
    DailySummary, DayGroup, MealCategory, MealEntry, RawNumber, TrackerState, parse_calories,
};
use crate::storage::KeyValueStore;

/// Persisted key names. `target` and `burned` hold the raw input text,
/// `meals` a JSON array of entries.
pub const KEY_TARGET: &str = "target";
pub const KEY_BURNED: &str = "burned";
pub const KEY_MEALS: &str = "meals";

/// Single source of truth for tracker state.
///
/// Owns the in-memory `TrackerState` and the bridge to key-value storage;
/// every mutation is persisted immediately and every aggregate is recomputed
/// from the full meal list on demand (entry counts are small, bounded by
/// realistic daily logging).
pub struct TrackerStore<S> {
    storage: S,
    state: TrackerState,
    next_id: i64,
}

impl<S: KeyValueStore> TrackerStore<S> {
    /// Load state from storage. Corrupt or missing values never fail the
    /// caller: `target`/`burned` fall back to empty, `meals` to an empty
    /// list.
    pub fn load(storage: S) -> Self {
        let target = RawNumber::new(storage.get(KEY_TARGET).unwrap_or_default());
        let burned = RawNumber::new(storage.get(KEY_BURNED).unwrap_or_default());
        let meals = match storage.get(KEY_MEALS) {
            None => Vec::new(),
            Some(raw) => match serde_json::from_str::<Vec<MealEntry>>(&raw) {
                Ok(meals) => meals,
                Err(err) => {
                    warn!("discarding unreadable meal list: {err}");
                    Vec::new()
                }
            },
        };
        let next_id = meals.iter().map(|m| m.id).max().unwrap_or(0) + 1;
        Self {
            storage,
            state: TrackerState {
                target,
                burned,
                meals,
            },
            next_id,
        }
    }

    #[must_use]
    pub fn state(&self) -> &TrackerState {
        &self.state
    }

    #[must_use]
    pub fn target(&self) -> &RawNumber {
        &self.state.target
    }

    #[must_use]
    pub fn burned(&self) -> &RawNumber {
        &self.state.burned
    }

    #[must_use]
    pub fn meals(&self) -> &[MealEntry] {
        &self.state.meals
    }

    /// Hand back the underlying storage, consuming the store.
    pub fn into_storage(self) -> S {
        self.storage
    }

    // --- Mutations ---

    /// Store the raw target text. Numeric validation is deferred to read
    /// time so intermediate states while typing are kept, not rejected.
    pub fn set_target(&mut self, raw: impl Into<String>) {
        self.state.target = RawNumber::new(raw);
        self.save();
    }

    /// Store the raw burned text; same deferred validation as the target.
    pub fn set_burned(&mut self, raw: impl Into<String>) {
        self.state.burned = RawNumber::new(raw);
        self.save();
    }

    /// Append a meal for `date`. Empty, non-numeric, and non-positive
    /// calorie input is rejected as a no-op returning `None`; otherwise the
    /// new entry (with a freshly issued id) is returned.
    pub fn add_meal(
        &mut self,
        calories_input: &str,
        category: MealCategory,
        date: &str,
    ) -> Option<MealEntry> {
        let calories = parse_calories(calories_input)?;
        let entry = MealEntry {
            id: self.next_id,
            calories,
            category,
            date: date.to_string(),
        };
        self.next_id += 1;
        self.state.meals.push(entry.clone());
        self.save();
        Some(entry)
    }

    /// Remove the entry with the given id. Returns `false` when nothing
    /// matches; removing the same id twice is a no-op the second time.
    pub fn remove_meal(&mut self, id: i64) -> bool {
        let before = self.state.meals.len();
        self.state.meals.retain(|m| m.id != id);
        let removed = self.state.meals.len() < before;
        if removed {
            self.save();
        }
        removed
    }

    /// Clear everything, in memory and in storage. Callers are responsible
    /// for confirming with the user first.
    pub fn reset(&mut self) {
        self.state = TrackerState::default();
        for key in [KEY_TARGET, KEY_BURNED, KEY_MEALS] {
            if let Err(err) = self.storage.remove(key) {
                warn!("failed to remove persisted {key}: {err}");
            }
        }
    }

    /// Persist all three keys. Skipped while the state is still all-default
    /// so an untouched session cannot overwrite previously saved data with
    /// an all-empty state. Write failures are logged and absorbed; the
    /// in-memory state stays authoritative for the rest of the session.
    fn save(&mut self) {
        if self.state.is_default() {
            return;
        }
        let meals = match serde_json::to_string(&self.state.meals) {
            Ok(json) => json,
            Err(err) => {
                warn!("failed to encode meal list: {err}");
                return;
            }
        };
        let writes = [
            (KEY_TARGET, self.state.target.as_str().to_string()),
            (KEY_BURNED, self.state.burned.as_str().to_string()),
            (KEY_MEALS, meals),
        ];
        for (key, value) in &writes {
            if let Err(err) = self.storage.set(key, value) {
                warn!("failed to persist {key}: {err}");
            }
        }
    }

    // --- Derived computations ---

    fn filtered<'a>(&'a self, date: Option<&'a str>) -> impl Iterator<Item = &'a MealEntry> {
        self.state
            .meals
            .iter()
            .filter(move |m| date.is_none_or(|d| m.date == d))
    }

    /// Sum of calories over all meals, or only the given date's meals.
    #[must_use]
    pub fn total_calories(&self, date: Option<&str>) -> f64 {
        self.filtered(date).map(|m| m.calories).sum()
    }

    /// Total consumed minus calories burned (unset burned counts as zero).
    #[must_use]
    pub fn net_calories(&self, date: Option<&str>) -> f64 {
        self.total_calories(date) - self.state.burned.or_zero()
    }

    /// Target minus net calories; negative means the goal was exceeded.
    #[must_use]
    pub fn calories_left(&self, date: Option<&str>) -> f64 {
        self.state.target.or_zero() - self.net_calories(date)
    }

    /// Target minus total consumed, without crediting burned calories.
    #[must_use]
    pub fn calories_left_ignoring_burned(&self, date: Option<&str>) -> f64 {
        self.state.target.or_zero() - self.total_calories(date)
    }

    /// Progress toward the target as a percentage, clamped to [0, 100].
    /// Exactly zero when no usable target is set.
    #[must_use]
    pub fn progress_percentage(&self, date: Option<&str>) -> f64 {
        let target = self.state.target.or_zero();
        if target <= 0.0 {
            return 0.0;
        }
        (self.total_calories(date) / target * 100.0).clamp(0.0, 100.0)
    }

    /// Meals grouped per day with calorie subtotals, newest date first.
    #[must_use]
    pub fn history(&self) -> Vec<DayGroup> {
        let mut groups: BTreeMap<&str, Vec<MealEntry>> = BTreeMap::new();
        for meal in &self.state.meals {
            groups
                .entry(meal.date.as_str())
                .or_default()
                .push(meal.clone());
        }
        // ISO dates sort lexicographically, so reversing the map order
        // yields newest-first.
        groups
            .into_iter()
            .rev()
            .map(|(date, entries)| {
                let total_calories = entries.iter().map(|m| m.calories).sum();
                DayGroup {
                    date: date.to_string(),
                    entries,
                    total_calories,
                }
            })
            .collect()
    }

    /// Snapshot of everything the tracker view shows for one date.
    #[must_use]
    pub fn daily_summary(&self, date: &str) -> DailySummary {
        let entries: Vec<MealEntry> = self.filtered(Some(date)).cloned().collect();
        let total_calories: f64 = entries.iter().map(|m| m.calories).sum();
        DailySummary {
            date: date.to_string(),
            total_calories,
            net_calories: self.net_calories(Some(date)),
            calories_left: self.calories_left(Some(date)),
            calories_left_ignoring_burned: self.calories_left_ignoring_burned(Some(date)),
            progress_pct: self.progress_percentage(Some(date)),
            target: self.state.target.clone(),
            burned: self.state.burned.clone(),
            entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn empty_store() -> TrackerStore<MemoryStore> {
        TrackerStore::load(MemoryStore::new())
    }

    #[test]
    fn test_total_is_sum_of_added_meals() {
        let mut store = empty_store();
        store.add_meal("300", MealCategory::Breakfast, "2024-01-01");
        store.add_meal("450.5", MealCategory::Lunch, "2024-01-01");
        store.add_meal("200", MealCategory::Snack, "2024-01-02");

        assert!((store.total_calories(None) - 950.5).abs() < f64::EPSILON);
        assert!((store.total_calories(Some("2024-01-01")) - 750.5).abs() < f64::EPSILON);
        assert!((store.total_calories(Some("2024-01-02")) - 200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_invalid_meal_input_is_rejected() {
        let mut store = empty_store();
        assert!(store.add_meal("", MealCategory::Other, "2024-01-01").is_none());
        assert!(store.add_meal("abc", MealCategory::Other, "2024-01-01").is_none());
        assert!(store.add_meal("0", MealCategory::Other, "2024-01-01").is_none());
        assert!(store.add_meal("-50", MealCategory::Other, "2024-01-01").is_none());
        assert!(store.meals().is_empty());
        // Rejected input must not leave any trace in storage either.
        assert_eq!(store.into_storage().get(KEY_MEALS), None);
    }

    #[test]
    fn test_ids_are_unique_and_never_reused() {
        let mut store = empty_store();
        let first = store.add_meal("500", MealCategory::Dinner, "2024-01-01").unwrap();
        assert!(store.remove_meal(first.id));

        let second = store.add_meal("500", MealCategory::Dinner, "2024-01-01").unwrap();
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn test_remove_twice_is_idempotent() {
        let mut store = empty_store();
        let entry = store.add_meal("500", MealCategory::Dinner, "2024-01-01").unwrap();

        assert!(store.remove_meal(entry.id));
        assert!(!store.remove_meal(entry.id));
        assert!(!store.remove_meal(9999));
    }

    #[test]
    fn test_calories_left_formula_with_empty_defaults() {
        let mut store = empty_store();
        store.add_meal("400", MealCategory::Other, "2024-01-01");

        // Both target and burned unset: left = 0 - (400 - 0) = -400.
        assert!((store.calories_left(None) - -400.0).abs() < f64::EPSILON);

        store.set_target("2000");
        store.set_burned("300");
        // left = 2000 - (400 - 300) = 1900.
        assert!((store.calories_left(None) - 1900.0).abs() < f64::EPSILON);
        // Ignoring burned: 2000 - 400 = 1600.
        assert!((store.calories_left_ignoring_burned(None) - 1600.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_non_numeric_target_and_burned_count_as_zero() {
        let mut store = empty_store();
        store.set_target("-");
        store.set_burned("oops");
        store.add_meal("100", MealCategory::Other, "2024-01-01");

        assert!((store.net_calories(None) - 100.0).abs() < f64::EPSILON);
        assert!((store.calories_left(None) - -100.0).abs() < f64::EPSILON);
        assert_eq!(store.progress_percentage(None), 0.0);
        // The raw text survives for display.
        assert_eq!(store.target().as_str(), "-");
        assert_eq!(store.burned().as_str(), "oops");
    }

    #[test]
    fn test_progress_percentage_bounds() {
        let mut store = empty_store();
        store.add_meal("500", MealCategory::Other, "2024-01-01");

        // No target, zero target, unparseable target: all exactly 0.
        assert_eq!(store.progress_percentage(None), 0.0);
        store.set_target("0");
        assert_eq!(store.progress_percentage(None), 0.0);
        store.set_target("x");
        assert_eq!(store.progress_percentage(None), 0.0);

        store.set_target("1000");
        assert!((store.progress_percentage(None) - 50.0).abs() < f64::EPSILON);

        // Over-target clamps to 100.
        store.set_target("250");
        assert!((store.progress_percentage(None) - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_tracker_scenario() {
        let mut store = empty_store();
        store.set_target("2000");
        store.set_burned("300");
        store.add_meal("500", MealCategory::Breakfast, "2024-01-01");
        store.add_meal("700", MealCategory::Dinner, "2024-01-01");

        assert!((store.total_calories(None) - 1200.0).abs() < f64::EPSILON);
        assert!((store.net_calories(None) - 900.0).abs() < f64::EPSILON);
        assert!((store.calories_left(None) - 1100.0).abs() < f64::EPSILON);
        assert!((store.progress_percentage(None) - 60.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_no_target_scenario() {
        let mut store = empty_store();
        store.add_meal("400", MealCategory::Other, "2024-01-01");

        assert_eq!(store.progress_percentage(None), 0.0);
        assert!((store.calories_left(None) - -400.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_save_load_round_trip() {
        let mut store = empty_store();
        store.set_target("2000");
        store.set_burned("300");
        store.add_meal("500", MealCategory::Breakfast, "2024-01-01");
        store.add_meal("700", MealCategory::Dinner, "2024-01-02");
        let saved_state = store.state().clone();

        let reloaded = TrackerStore::load(store.into_storage());
        assert_eq!(reloaded.state(), &saved_state);
    }

    #[test]
    fn test_reloaded_store_issues_fresh_ids() {
        let mut store = empty_store();
        let entry = store.add_meal("500", MealCategory::Other, "2024-01-01").unwrap();

        let mut reloaded = TrackerStore::load(store.into_storage());
        let next = reloaded.add_meal("600", MealCategory::Other, "2024-01-01").unwrap();
        assert!(next.id > entry.id);
    }

    #[test]
    fn test_corrupt_meals_value_loads_as_empty() {
        let mut storage = MemoryStore::new();
        storage.set(KEY_MEALS, "not json").unwrap();
        storage.set(KEY_TARGET, "1800").unwrap();

        let store = TrackerStore::load(storage);
        assert!(store.meals().is_empty());
        assert_eq!(store.target().as_str(), "1800");
    }

    #[test]
    fn test_non_sequence_meals_value_loads_as_empty() {
        let mut storage = MemoryStore::new();
        storage.set(KEY_MEALS, r#"{"calories":500}"#).unwrap();

        let store = TrackerStore::load(storage);
        assert!(store.meals().is_empty());
    }

    #[test]
    fn test_reset_clears_state_and_storage() {
        let mut store = empty_store();
        store.set_target("2000");
        store.set_burned("300");
        store.add_meal("500", MealCategory::Breakfast, "2024-01-01");

        store.reset();
        assert!(store.state().is_default());

        let storage = store.into_storage();
        assert_eq!(storage.get(KEY_TARGET), None);
        assert_eq!(storage.get(KEY_BURNED), None);
        assert_eq!(storage.get(KEY_MEALS), None);
    }

    #[test]
    fn test_all_default_state_is_never_written() {
        let mut storage = MemoryStore::new();
        storage.set(KEY_TARGET, "1500").unwrap();

        let mut store = TrackerStore::load(storage);
        // Clearing the only non-empty field leaves an all-default state,
        // which must not overwrite what was previously persisted.
        store.set_target("");
        assert_eq!(store.into_storage().get(KEY_TARGET).as_deref(), Some("1500"));
    }

    #[test]
    fn test_mutations_persist_all_three_keys() {
        let mut store = empty_store();
        store.add_meal("500", MealCategory::Lunch, "2024-01-01");

        let storage = store.into_storage();
        assert_eq!(storage.get(KEY_TARGET).as_deref(), Some(""));
        assert_eq!(storage.get(KEY_BURNED).as_deref(), Some(""));
        let meals: Vec<MealEntry> =
            serde_json::from_str(&storage.get(KEY_MEALS).unwrap()).unwrap();
        assert_eq!(meals.len(), 1);
        assert_eq!(meals[0].category, MealCategory::Lunch);
    }

    #[test]
    fn test_history_groups_by_date_newest_first() {
        let mut store = empty_store();
        store.add_meal("300", MealCategory::Breakfast, "2024-01-01");
        store.add_meal("700", MealCategory::Dinner, "2024-01-03");
        store.add_meal("400", MealCategory::Lunch, "2024-01-01");

        let history = store.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].date, "2024-01-03");
        assert!((history[0].total_calories - 700.0).abs() < f64::EPSILON);
        assert_eq!(history[1].date, "2024-01-01");
        assert_eq!(history[1].entries.len(), 2);
        assert!((history[1].total_calories - 700.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_daily_summary_filters_by_date() {
        let mut store = empty_store();
        store.set_target("2000");
        store.add_meal("500", MealCategory::Breakfast, "2024-01-01");
        store.add_meal("999", MealCategory::Dinner, "2024-01-02");

        let summary = store.daily_summary("2024-01-01");
        assert_eq!(summary.entries.len(), 1);
        assert!((summary.total_calories - 500.0).abs() < f64::EPSILON);
        assert!((summary.calories_left - 1500.0).abs() < f64::EPSILON);
        assert!((summary.progress_pct - 25.0).abs() < f64::EPSILON);
    }
}
