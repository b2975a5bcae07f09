use flowsync_defs::{
    resource_name, NormalizeDefaults, NormalizedResource, ResourceKind, ScheduleSpec, Timing,
};
use serde_json::{json, Map, Value};

/// Reshapes a definition, from the desired-state document or from the server,
/// into the fixed field set of its kind. Unknown fields are dropped and absent
/// (or null) optional fields get their default.
pub fn normalize(
    kind: ResourceKind,
    raw: &Value,
    defaults: &NormalizeDefaults,
) -> NormalizedResource {
    let name = resource_name(raw).unwrap_or_default().to_string();
    let fields = match kind {
        ResourceKind::Flow => flow_fields(&name),
        ResourceKind::Deployment => deployment_fields(&name, raw, defaults),
        ResourceKind::Automation => automation_fields(&name, raw),
    };
    NormalizedResource { kind, name, fields }
}

/// Non-null value of `key`.
fn field<'a>(raw: &'a Value, key: &str) -> Option<&'a Value> {
    raw.get(key).filter(|value| !value.is_null())
}

fn field_or(raw: &Value, key: &str, default: Value) -> Value {
    field(raw, key).cloned().unwrap_or(default)
}

fn flow_fields(name: &str) -> Map<String, Value> {
    let mut fields = Map::new();
    fields.insert("name".to_string(), json!(name));
    fields
}

fn deployment_fields(name: &str, raw: &Value, defaults: &NormalizeDefaults) -> Map<String, Value> {
    // Work pool settings are either flat or nested under `work_pool`
    let work_pool = field(raw, "work_pool").unwrap_or(&Value::Null);
    let pool_setting = |flat_key: &str, nested_key: &str| {
        field(raw, flat_key)
            .or_else(|| field(work_pool, nested_key))
            .cloned()
    };

    let schedules: Vec<Value> = reshape_schedules(raw, &defaults.timezone)
        .iter()
        .map(ScheduleSpec::to_value)
        .collect();

    let mut fields = Map::new();
    fields.insert("name".to_string(), json!(name));
    fields.insert("flow_name".to_string(), field_or(raw, "flow_name", Value::Null));
    fields.insert("description".to_string(), field_or(raw, "description", Value::Null));
    fields.insert("version".to_string(), field_or(raw, "version", Value::Null));
    fields.insert("entrypoint".to_string(), field_or(raw, "entrypoint", Value::Null));
    fields.insert("parameters".to_string(), field_or(raw, "parameters", json!({})));
    fields.insert("tags".to_string(), sorted_tags(field(raw, "tags")));
    fields.insert(
        "work_pool_name".to_string(),
        pool_setting("work_pool_name", "name")
            .unwrap_or_else(|| json!(defaults.work_pool_name)),
    );
    fields.insert(
        "work_queue_name".to_string(),
        pool_setting("work_queue_name", "work_queue_name")
            .unwrap_or_else(|| json!(defaults.work_queue_name)),
    );
    fields.insert(
        "job_variables".to_string(),
        pool_setting("job_variables", "job_variables").unwrap_or_else(|| json!({})),
    );
    fields.insert("pull_steps".to_string(), field_or(raw, "pull_steps", json!([])));
    fields.insert("schedules".to_string(), Value::Array(schedules));
    fields.insert("paused".to_string(), field_or(raw, "paused", json!(false)));
    fields
}

fn automation_fields(name: &str, raw: &Value) -> Map<String, Value> {
    let mut fields = Map::new();
    fields.insert("name".to_string(), json!(name));
    fields.insert("description".to_string(), field_or(raw, "description", json!("")));
    fields.insert("enabled".to_string(), field_or(raw, "enabled", json!(true)));
    fields.insert("trigger".to_string(), field_or(raw, "trigger", json!({})));
    fields.insert("actions".to_string(), field_or(raw, "actions", json!([])));
    fields.insert(
        "actions_on_trigger".to_string(),
        field_or(raw, "actions_on_trigger", json!([])),
    );
    fields.insert(
        "actions_on_resolve".to_string(),
        field_or(raw, "actions_on_resolve", json!([])),
    );
    fields
}

/// Tags as a sorted set. Non-string tags keep their JSON representation.
fn sorted_tags(tags: Option<&Value>) -> Value {
    let mut tags: Vec<Value> = match tags {
        Some(Value::Array(items)) => items.clone(),
        Some(single) => vec![single.clone()],
        None => vec![],
    };
    tags.sort_by_key(value_sort_key);
    tags.dedup();
    Value::Array(tags)
}

pub(crate) fn value_sort_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Collects the schedules of a deployment whatever their source shape:
/// - `schedules` as a list of server items `{active, schedule: {cron, ...}, catchup}`
/// - `schedules` as a list of flat items `{cron, timezone, active, catchup}`
/// - a single `schedule` mapping, activated through `is_schedule_active`
///
/// `schedules` wins when both keys are present.
pub fn reshape_schedules(raw: &Value, default_timezone: &str) -> Vec<ScheduleSpec> {
    if let Some(Value::Array(items)) = field(raw, "schedules") {
        return items
            .iter()
            .filter(|item| item.is_object())
            .map(|item| match field(item, "schedule") {
                Some(nested) if nested.is_object() => ScheduleSpec {
                    active: bool_or(item, "active", true),
                    timing: timing(nested),
                    timezone: timezone(nested, default_timezone),
                    catchup: bool_or(item, "catchup", false),
                },
                _ => ScheduleSpec {
                    active: bool_or(item, "active", true),
                    timing: timing(item),
                    timezone: timezone(item, default_timezone),
                    catchup: bool_or(item, "catchup", false),
                },
            })
            .collect();
    }

    match field(raw, "schedule") {
        Some(schedule) if schedule.is_object() => vec![ScheduleSpec {
            active: bool_or(raw, "is_schedule_active", true),
            timing: timing(schedule),
            timezone: timezone(schedule, default_timezone),
            catchup: bool_or(schedule, "catchup", false),
        }],
        _ => vec![],
    }
}

fn bool_or(raw: &Value, key: &str, default: bool) -> bool {
    field(raw, key).and_then(Value::as_bool).unwrap_or(default)
}

fn timezone(schedule: &Value, default_timezone: &str) -> String {
    field(schedule, "timezone")
        .and_then(Value::as_str)
        .unwrap_or(default_timezone)
        .to_string()
}

// Cron wins when both are given.
fn timing(schedule: &Value) -> Option<Timing> {
    if let Some(cron) = field(schedule, "cron").and_then(Value::as_str) {
        return Some(Timing::Cron(cron.to_string()));
    }
    let seconds = match field(schedule, "interval")? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    Some(Timing::Interval(seconds))
}
