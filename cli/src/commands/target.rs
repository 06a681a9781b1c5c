use anyhow::Result;

use kcal_core::storage::KeyValueStore;
use kcal_core::store::TrackerStore;

use super::helpers::validate_non_negative;

pub(crate) fn cmd_target_set<S: KeyValueStore>(
    store: &mut TrackerStore<S>,
    calories: f64,
    json: bool,
) -> Result<()> {
    validate_non_negative(calories, "Calorie target")?;
    store.set_target(calories.to_string());

    if json {
        println!("{}", serde_json::json!({ "target": store.target().as_str() }));
    } else {
        let target = store.target();
        println!("Target set to {target} kcal/day");
    }
    Ok(())
}

pub(crate) fn cmd_target_show<S: KeyValueStore>(store: &TrackerStore<S>, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::json!({ "target": store.target().as_str() }));
    } else if let Some(target) = store.target().value() {
        println!("Target: {target} kcal/day");
    } else {
        eprintln!("No target set. Use `kcal target set <calories>` to set one.");
    }
    Ok(())
}

pub(crate) fn cmd_target_clear<S: KeyValueStore>(
    store: &mut TrackerStore<S>,
    json: bool,
) -> Result<()> {
    let had_target = !store.target().is_empty();
    store.set_target("");

    if json {
        println!("{}", serde_json::json!({ "cleared": had_target }));
    } else if had_target {
        println!("Target cleared");
    } else {
        eprintln!("No target was set");
    }
    Ok(())
}
