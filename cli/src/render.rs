use colored::{ColoredString, Colorize};
use flowsync_defs::{ActionResult, ActionStatus, FieldChange, SyncReport, SyncVerb};
use prettytable::{row, Table};
use reconciler::{Plan, PlannedAction};
use serde_json::Value;

fn verb_label(verb: SyncVerb) -> ColoredString {
    match verb {
        SyncVerb::Create => "create".green().bold(),
        SyncVerb::Update => "update".yellow().bold(),
        SyncVerb::Unchanged => "unchanged".dimmed(),
        SyncVerb::Delete => "delete".red().bold(),
    }
}

fn status_label(status: &ActionStatus) -> ColoredString {
    match status {
        ActionStatus::Planned => "planned".blue(),
        ActionStatus::Applied => "ok".green(),
        ActionStatus::Skipped(reason) => format!("skipped: {}", reason).yellow(),
        ActionStatus::Failed(reason) => format!("failed: {}", reason).red(),
    }
}

fn changed_fields(result: &ActionResult) -> String {
    result
        .changes
        .iter()
        .map(|change| change.field.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn report_table(report: &SyncReport) -> Table {
    let mut table = Table::new();
    table.add_row(row![
        "Kind".purple().bold(),
        "Name".blue().bold(),
        "Action".green().bold(),
        "Status".yellow().bold(),
        "Changed fields".bold(),
    ]);
    for result in report.results.iter() {
        table.add_row(row![
            result.kind,
            result.name,
            verb_label(result.verb),
            status_label(&result.status),
            changed_fields(result),
        ]);
    }
    table
}

pub fn print_report(report: &SyncReport) {
    report_table(report).printstd();

    let changes = report.changes().len();
    let failures = report.failures().len();
    let summary = format!(
        "{}{} change(s), {} failure(s)",
        if report.dry_run { "[dry-run] " } else { "" },
        changes,
        failures
    );
    if failures > 0 {
        println!("{}", summary.red().bold());
    } else {
        println!("{}", summary.green().bold());
    }
}

fn compact(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}

fn change_rows(table: &mut Table, kind: &str, name: &str, changes: &[FieldChange]) {
    for change in changes {
        table.add_row(row![
            kind,
            name,
            change.field,
            compact(&change.existing).red(),
            compact(&change.new).green(),
        ]);
    }
}

/// Per-field view of a plan. Unchanged resources are left out.
pub fn plan_table(plan: &Plan) -> Table {
    let mut table = Table::new();
    table.add_row(row![
        "Kind".purple().bold(),
        "Name".blue().bold(),
        "Field".bold(),
        "Server".red().bold(),
        "Desired".green().bold(),
    ]);
    for action in plan.actions.iter() {
        match action {
            PlannedAction::EnsureParent { kind, name, id: None } => {
                table.add_row(row![kind, name, verb_label(SyncVerb::Create), "-", "(new)"]);
            }
            PlannedAction::Create { kind, name, .. } => {
                table.add_row(row![kind, name, verb_label(SyncVerb::Create), "-", "(new)"]);
            }
            PlannedAction::Update {
                kind,
                name,
                changes,
                ..
            }
            | PlannedAction::Replace {
                kind,
                name,
                changes,
                ..
            } => change_rows(&mut table, kind.label(), name, changes),
            PlannedAction::Skip { kind, name, reason } => {
                table.add_row(row![kind, name, "skipped".yellow(), "-", reason]);
            }
            PlannedAction::Delete { kind, name, id } => {
                table.add_row(row![kind, name, verb_label(SyncVerb::Delete), id, "(removed)"]);
            }
            PlannedAction::EnsureParent { .. } | PlannedAction::Unchanged { .. } => {}
        }
    }
    table
}

pub fn print_plan(plan: &Plan) {
    let table = plan_table(plan);
    // Header only
    if table.len() == 1 {
        println!("{}", format!("All {}s are up-to-date.", plan.kind).green());
        return;
    }
    table.printstd();
}
