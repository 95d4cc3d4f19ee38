use std::env;
use std::fmt;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

pub const ENV_INFO_ENV: &str = "LSTN_INFO_ENV";
pub const DEFAULT_INFO_ENV: &str = "local";

/// Facts about this binary, built once in `main` and only read afterwards.
#[derive(Debug, Clone)]
pub struct BuildInfo {
    pub version: &'static str,
    // set by the build system, LSTN_BUILD_DATE=... cargo build
    pub build_date: &'static str,
    pub env: String,
    pub started_at: SystemTime,
    started: Instant,
}

impl BuildInfo {
    pub fn new(env: String) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            build_date: option_env!("LSTN_BUILD_DATE").unwrap_or("unknown"),
            env,
            started_at: SystemTime::now(),
            started: Instant::now(),
        }
    }

    pub fn from_env() -> Self {
        let env = env::var(ENV_INFO_ENV).unwrap_or_else(|_| DEFAULT_INFO_ENV.to_string());
        Self::new(env)
    }

    pub fn uptime(&self) -> Duration {
        self.started.elapsed()
    }
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let started = self
            .started_at
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        write!(
            f,
            "{{version: {}, build_date: {}, env: {}, started_at: {}}}",
            self.version, self.build_date, self.env, started
        )
    }
}
