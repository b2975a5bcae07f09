mod commands;
mod render;

pub use commands::{handle_diff, handle_sync};
pub use render::{plan_table, print_plan, print_report, report_table};
