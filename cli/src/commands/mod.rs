mod burned;
mod helpers;
mod meal;
mod reset;
mod summary;
mod target;

pub(crate) use burned::{cmd_burned_clear, cmd_burned_set, cmd_burned_show};
pub(crate) use meal::{cmd_log, cmd_remove};
pub(crate) use reset::cmd_reset;
pub(crate) use summary::{cmd_history, cmd_summary};
pub(crate) use target::{cmd_target_clear, cmd_target_set, cmd_target_show};
