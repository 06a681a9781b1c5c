use anyhow::{Result, bail};
use chrono::Local;
use serde::{Deserialize, Serialize};

/// Meal categories, lowercase on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealCategory {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
    #[default]
    Other,
}

pub const MEAL_CATEGORIES: &[&str] = &["breakfast", "lunch", "dinner", "snack", "other"];

impl MealCategory {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Breakfast => "breakfast",
            Self::Lunch => "lunch",
            Self::Dinner => "dinner",
            Self::Snack => "snack",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for MealCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn validate_category(category: &str) -> Result<MealCategory> {
    match category.to_lowercase().as_str() {
        "breakfast" => Ok(MealCategory::Breakfast),
        "lunch" => Ok(MealCategory::Lunch),
        "dinner" => Ok(MealCategory::Dinner),
        "snack" => Ok(MealCategory::Snack),
        "other" => Ok(MealCategory::Other),
        _ => bail!(
            "Invalid category '{category}'. Must be one of: {}",
            MEAL_CATEGORIES.join(", ")
        ),
    }
}

/// A raw numeric text field, kept exactly as the user typed it.
///
/// The empty string and "0" are distinct display states but identical
/// computational states: anything that does not parse as a number counts as
/// zero in derived arithmetic while the original text survives for display
/// and persistence. This keeps intermediate states while typing (a lone `-`,
/// a trailing `.`) instead of rejecting keystrokes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawNumber(String);

impl RawNumber {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parsed numeric value, if the text currently holds one.
    #[must_use]
    pub fn value(&self) -> Option<f64> {
        let trimmed = self.0.trim();
        if trimmed.is_empty() {
            return None;
        }
        trimmed.parse().ok()
    }

    /// The arithmetic view: unset or unparseable is zero.
    #[must_use]
    pub fn or_zero(&self) -> f64 {
        self.value().unwrap_or(0.0)
    }
}

impl std::fmt::Display for RawNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One logged consumption event.
///
/// `category` and `date` default on decode so meal lists written by earlier
/// versions without those fields still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealEntry {
    pub id: i64,
    pub calories: f64,
    #[serde(default)]
    pub category: MealCategory,
    #[serde(default)]
    pub date: String,
}

/// The canonical tracker state: target, burned, and the ordered meal list.
/// Entry order is insertion order; uniqueness is by `id` only.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrackerState {
    pub target: RawNumber,
    pub burned: RawNumber,
    pub meals: Vec<MealEntry>,
}

impl TrackerState {
    /// True while nothing has been entered. A fully-default state is never
    /// written to storage, so an untouched session cannot clobber
    /// previously saved data.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.target.is_empty() && self.burned.is_empty() && self.meals.is_empty()
    }
}

/// Everything the tracker page shows for one selected date.
#[derive(Debug, Clone, Serialize)]
pub struct DailySummary {
    pub date: String,
    pub entries: Vec<MealEntry>,
    pub total_calories: f64,
    pub net_calories: f64,
    pub calories_left: f64,
    pub calories_left_ignoring_burned: f64,
    pub progress_pct: f64,
    pub target: RawNumber,
    pub burned: RawNumber,
}

/// One day of the history view: the date's entries plus their calorie total.
#[derive(Debug, Clone, Serialize)]
pub struct DayGroup {
    pub date: String,
    pub entries: Vec<MealEntry>,
    pub total_calories: f64,
}

/// Parse a calorie input for a new meal. Empty, non-numeric, zero, and
/// negative values are all rejected.
#[must_use]
pub fn parse_calories(input: &str) -> Option<f64> {
    let value: f64 = input.trim().parse().ok()?;
    if value.is_finite() && value > 0.0 {
        Some(value)
    } else {
        None
    }
}

/// Today's date as an ISO `YYYY-MM-DD` string, local time.
#[must_use]
pub fn today() -> String {
    Local::now().date_naive().to_string()
}
