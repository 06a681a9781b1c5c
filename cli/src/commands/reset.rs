use anyhow::Result;

use kcal_core::storage::KeyValueStore;
use kcal_core::store::TrackerStore;

use super::helpers::confirm;

pub(crate) fn cmd_reset<S: KeyValueStore>(
    store: &mut TrackerStore<S>,
    yes: bool,
    json: bool,
) -> Result<()> {
    if !yes && !confirm("Reset all tracked data? This cannot be undone.")? {
        eprintln!("Aborted");
        return Ok(());
    }

    store.reset();

    if json {
        println!("{}", serde_json::json!({ "reset": true }));
    } else {
        println!("All data cleared");
    }
    Ok(())
}
