//! Read-only view of the running process.
//!
//! Handlers never touch the OS directly; they go through [`ProcessInfo`] so
//! tests can pin uptime and memory to known values.

use std::{
    sync::Mutex,
    time::{Duration, Instant},
};

use serde::Serialize;
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

/// Memory counters reported by `/health` and `/metrics`, in bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryUsage {
    pub rss: u64,
    pub heap_used: u64,
    pub heap_total: u64,
}

/// Process introspection capability injected into every handler.
pub trait ProcessInfo: Send + Sync {
    /// Time since the service started.
    fn uptime(&self) -> Duration;
    fn pid(&self) -> u32;
    /// Fresh memory snapshot. Called once per request that reports memory.
    fn memory(&self) -> MemoryUsage;
    fn hostname(&self) -> &str;
}

/// [`ProcessInfo`] backed by the real OS via `sysinfo`.
pub struct SystemProcess {
    started_at: Instant,
    pid: Pid,
    hostname: String,
    system: Mutex<System>,
}

impl SystemProcess {
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            pid: Pid::from_u32(std::process::id()),
            hostname: os_hostname(),
            system: Mutex::new(System::new()),
        }
    }
}

impl Default for SystemProcess {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessInfo for SystemProcess {
    fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    fn pid(&self) -> u32 {
        self.pid.as_u32()
    }

    fn memory(&self) -> MemoryUsage {
        // A poisoned lock only means an earlier refresh panicked; the System
        // itself is still usable.
        let mut sys = self.system.lock().unwrap_or_else(|e| e.into_inner());
        sys.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[self.pid]),
            false,
            ProcessRefreshKind::new().with_memory(),
        );

        // Rust has no managed heap to report, so resident memory stands in for
        // "heap used" and the virtual size for "heap total".
        sys.process(self.pid)
            .map(|p| MemoryUsage {
                rss: p.memory(),
                heap_used: p.memory(),
                heap_total: p.virtual_memory(),
            })
            .unwrap_or_default()
    }

    fn hostname(&self) -> &str {
        &self.hostname
    }
}

/// Hostname as reported by the OS, or `localhost` if it cannot be read.
pub fn os_hostname() -> String {
    System::host_name()
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| "localhost".to_string())
}

#[cfg(test)]
pub mod testing {
    //! Fixed-value [`ProcessInfo`] for handler tests.

    use super::*;

    pub struct FakeProcess {
        pub uptime: Duration,
        pub pid: u32,
        pub memory: MemoryUsage,
        pub hostname: String,
    }

    impl FakeProcess {
        pub fn with_uptime(secs: f64) -> Self {
            Self {
                uptime: Duration::from_secs_f64(secs),
                pid: 4242,
                memory: MemoryUsage {
                    rss: 52_428_800,
                    heap_used: 20_971_520,
                    heap_total: 33_554_432,
                },
                hostname: "test-host".into(),
            }
        }
    }

    impl ProcessInfo for FakeProcess {
        fn uptime(&self) -> Duration {
            self.uptime
        }

        fn pid(&self) -> u32 {
            self.pid
        }

        fn memory(&self) -> MemoryUsage {
            self.memory
        }

        fn hostname(&self) -> &str {
            &self.hostname
        }
    }
}
