use anyhow::Result;
use std::process;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use kcal_core::storage::KeyValueStore;
use kcal_core::store::TrackerStore;

use super::helpers::parse_date;

pub(crate) fn cmd_summary<S: KeyValueStore>(
    store: &TrackerStore<S>,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let date = parse_date(date)?;
    let summary = store.daily_summary(&date);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    if summary.entries.is_empty() {
        eprintln!("No entries for {date}");
        process::exit(2);
    }

    println!("=== {date} ===\n");

    for entry in &summary.entries {
        let id = entry.id;
        let cal = entry.calories;
        let category = entry.category;
        println!("  [{id}] {cal:.0} kcal ({category})");
    }
    println!();

    let total = summary.total_calories;
    println!("  TOTAL: {total:.0} kcal");

    if !summary.burned.is_empty() {
        let burned = summary.burned.or_zero();
        let net = summary.net_calories;
        println!("  BURNED: {burned:.0} kcal  NET: {net:.0} kcal");
    }

    if let Some(target) = summary.target.value() {
        let left = summary.calories_left;
        let pct = summary.progress_pct;
        println!("  TARGET: {target:.0} kcal  REMAINING: {left:.0} kcal  PROGRESS: {pct:.1}%");
    }

    Ok(())
}

pub(crate) fn cmd_history<S: KeyValueStore>(store: &TrackerStore<S>, json: bool) -> Result<()> {
    #[derive(Tabled)]
    struct HistoryRow {
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Meals")]
        meals: usize,
        #[tabled(rename = "Calories")]
        calories: String,
    }

    let groups = store.history();

    if json {
        println!("{}", serde_json::to_string_pretty(&groups)?);
        return Ok(());
    }

    if groups.is_empty() {
        eprintln!("No meals logged yet");
        process::exit(2);
    }

    let rows: Vec<HistoryRow> = groups
        .iter()
        .map(|g| HistoryRow {
            date: g.date.clone(),
            meals: g.entries.len(),
            calories: format!("{:.0}", g.total_calories),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
        .to_string();
    println!("{table}");

    Ok(())
}
