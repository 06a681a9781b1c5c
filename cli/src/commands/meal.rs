use anyhow::Result;
use std::process;

use kcal_core::models::validate_category;
use kcal_core::storage::KeyValueStore;
use kcal_core::store::TrackerStore;

use super::helpers::{json_error, parse_date};

pub(crate) fn cmd_log<S: KeyValueStore>(
    store: &mut TrackerStore<S>,
    calories: &str,
    category: &str,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let category = validate_category(category)?;
    let date = parse_date(date)?;

    match store.add_meal(calories, category, &date) {
        Some(entry) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&entry)?);
            } else {
                let id = entry.id;
                let cal = entry.calories;
                let category = entry.category;
                let date = &entry.date;
                println!("[{id}] Logged {cal:.0} kcal ({category}) for {date}");
            }
            Ok(())
        }
        None => {
            let message = format!("Invalid calorie value '{calories}'. Use a number greater than 0");
            if json {
                println!("{}", json_error(&message));
            } else {
                eprintln!("{message}");
            }
            process::exit(2);
        }
    }
}

pub(crate) fn cmd_remove<S: KeyValueStore>(
    store: &mut TrackerStore<S>,
    entry_id: i64,
    json: bool,
) -> Result<()> {
    if store.remove_meal(entry_id) {
        if json {
            println!("{}", serde_json::json!({ "removed": entry_id }));
        } else {
            println!("Removed entry {entry_id}");
        }
        Ok(())
    } else {
        if json {
            println!("{}", json_error(&format!("Entry {entry_id} not found")));
        } else {
            eprintln!("Entry {entry_id} not found");
        }
        process::exit(2);
    }
}
