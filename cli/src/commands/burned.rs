use anyhow::Result;

use kcal_core::storage::KeyValueStore;
use kcal_core::store::TrackerStore;

use super::helpers::validate_non_negative;

pub(crate) fn cmd_burned_set<S: KeyValueStore>(
    store: &mut TrackerStore<S>,
    calories: f64,
    json: bool,
) -> Result<()> {
    validate_non_negative(calories, "Calories burned")?;
    store.set_burned(calories.to_string());

    if json {
        println!("{}", serde_json::json!({ "burned": store.burned().as_str() }));
    } else {
        let burned = store.burned();
        println!("Calories burned set to {burned} kcal");
    }
    Ok(())
}

pub(crate) fn cmd_burned_show<S: KeyValueStore>(store: &TrackerStore<S>, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::json!({ "burned": store.burned().as_str() }));
    } else if let Some(burned) = store.burned().value() {
        println!("Calories burned: {burned} kcal");
    } else {
        eprintln!("No burned calories recorded. Use `kcal burned set <calories>` to record them.");
    }
    Ok(())
}

pub(crate) fn cmd_burned_clear<S: KeyValueStore>(
    store: &mut TrackerStore<S>,
    json: bool,
) -> Result<()> {
    let had_burned = !store.burned().is_empty();
    store.set_burned("");

    if json {
        println!("{}", serde_json::json!({ "cleared": had_burned }));
    } else if had_burned {
        println!("Calories burned cleared");
    } else {
        eprintln!("No burned calories were recorded");
    }
    Ok(())
}
