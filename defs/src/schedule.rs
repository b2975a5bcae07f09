use serde_json::{json, Map, Value};

/// Timing rule of a schedule. A schedule is either cron based or interval based.
#[derive(Debug, Clone, PartialEq)]
pub enum Timing {
    Cron(String),
    /// Interval in seconds.
    Interval(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleSpec {
    pub active: bool,
    pub timing: Option<Timing>,
    pub timezone: String,
    pub catchup: bool,
}

impl ScheduleSpec {
    /// Canonical representation, which is also the shape the server accepts:
    /// `{ active, schedule: { cron | interval, timezone }, catchup }`
    pub fn to_value(&self) -> Value {
        let mut schedule = Map::new();
        match &self.timing {
            Some(Timing::Cron(cron)) => {
                schedule.insert("cron".to_string(), Value::String(cron.clone()));
            }
            Some(Timing::Interval(seconds)) => {
                schedule.insert("interval".to_string(), json!(seconds));
            }
            None => {}
        }
        schedule.insert(
            "timezone".to_string(),
            Value::String(self.timezone.clone()),
        );

        json!({
            "active": self.active,
            "schedule": Value::Object(schedule),
            "catchup": self.catchup,
        })
    }
}
