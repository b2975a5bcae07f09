mod config;
mod diff;
mod loader;
mod logging;
mod normalize;
mod schema;

pub use config::{
    Credentials, ServerConfig, SyncConfig, DEFAULT_TIMEOUT_SECS, ENV_API_PASSWORD,
    ENV_API_TIMEOUT_SECS, ENV_API_TOKEN, ENV_API_URL, ENV_API_USER, ENV_DEFAULT_TIMEZONE,
    ENV_DEFAULT_WORK_POOL, ENV_DEFAULT_WORK_QUEUE,
};
pub use diff::{diff_resources, differs};
pub use loader::{load_desired_state, parse_desired_state};
pub use logging::{level_from_env, setup_logging};
pub use normalize::{normalize, reshape_schedules};
pub use schema::generate_parameter_schema;
