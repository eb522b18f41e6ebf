//! Shared application state handed to every handler via [`axum::extract::State`].

use std::sync::Arc;

use chrono::{SecondsFormat, Utc};

use crate::{
    config::Config,
    counters::{CounterSource, ThreadRngSource},
    process::{ProcessInfo, SystemProcess},
};

/// Everything a handler may read. Nothing in here is mutated after startup.
pub struct AppState {
    pub config: Arc<Config>,
    pub process: Arc<dyn ProcessInfo>,
    pub counters: Arc<dyn CounterSource>,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        process: Arc<dyn ProcessInfo>,
        counters: Arc<dyn CounterSource>,
    ) -> Self {
        Self {
            config,
            process,
            counters,
        }
    }

    /// Production wiring: real process introspection and the thread RNG.
    pub fn system(config: Arc<Config>, process: Arc<SystemProcess>) -> Self {
        Self::new(config, process, Arc::new(ThreadRngSource))
    }

    /// Uptime in fractional seconds, the unit every endpoint reports.
    pub fn uptime_secs(&self) -> f64 {
        self.process.uptime().as_secs_f64()
    }
}

/// Current time as ISO-8601 UTC with millisecond precision, e.g.
/// `2024-05-01T12:34:56.789Z`.
pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;

    use super::*;

    #[test]
    fn timestamp_is_rfc3339_with_z_suffix() {
        let ts = timestamp();
        assert!(ts.ends_with('Z'), "{ts}");
        assert!(DateTime::parse_from_rfc3339(&ts).is_ok(), "{ts}");
    }
}
