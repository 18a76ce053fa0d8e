use crate::actors::coordinator::{ControllerOptions, SessionStartMode, TaskSwitchStrategy};
use crate::launch::{LaunchParameters, DEFAULT_USER_ID_PARAM};

#[derive(Debug, Clone)]
pub struct Config {
    /// Port the controller listens on
    pub port: u16,
    /// Origin every player and host message must come from
    pub trusted_origin: String,
    /// Base URL or directory holding `controller/`, `assessments/` and `items/`
    pub config_base: String,
    /// Query string the assessment was launched with
    pub launch_query: String,
    /// Query parameter carrying the user id
    pub user_id_param: String,
    pub start_mode: SessionStartMode,
    pub switch_strategy: TaskSwitchStrategy,
    /// Origins allowed by CORS on the HTTP routes
    pub allowed_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let trusted_origin = env_str("CONTROLLER_ORIGIN", "http://localhost:8080");
        let allowed_origins = env_csv("CONTROLLER_ALLOWED_ORIGINS", &[trusted_origin.as_str()]);

        Ok(Self {
            port: env_parse("CONTROLLER_PORT", 8080)?,
            trusted_origin,
            config_base: env_str("CONTROLLER_CONFIG_BASE", "./public"),
            launch_query: env_str("CONTROLLER_LAUNCH_QUERY", ""),
            user_id_param: env_str("CONTROLLER_USER_ID_PARAM", DEFAULT_USER_ID_PARAM),
            start_mode: env_parse("CONTROLLER_START_MODE", SessionStartMode::default())?,
            switch_strategy: env_parse(
                "CONTROLLER_SWITCH_STRATEGY",
                TaskSwitchStrategy::default(),
            )?,
            allowed_origins,
        })
    }

    pub fn launch(&self) -> LaunchParameters {
        LaunchParameters::from_query(&self.launch_query, &self.user_id_param)
    }

    pub fn controller_options(&self) -> ControllerOptions {
        ControllerOptions {
            trusted_origin: self.trusted_origin.clone(),
            start_mode: self.start_mode,
            switch_strategy: self.switch_strategy,
        }
    }
}

fn env_str(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> anyhow::Result<T>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(val) => val
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("Failed to parse env var {key}={val}: {e}")),
        Err(_) => Ok(default),
    }
}

fn env_csv(key: &str, default: &[&str]) -> Vec<String> {
    match std::env::var(key) {
        Ok(raw) => raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
            .collect(),
        Err(_) => default.iter().map(|s| (*s).to_string()).collect(),
    }
}
