//! Process and runtime introspection.
//!
//! Handlers read live process facts (task count, heap, CPU count, hostname)
//! through the `RuntimeStats` trait. `SystemRuntimeStats` queries the tokio
//! runtime, the global allocator and the OS on every call;
//! `FixedRuntimeStats` returns canned values.

use std::alloc;
use std::time::Duration;

use cap::Cap;
use sysinfo::System;

/// Global allocator that counts live heap bytes.
#[global_allocator]
static ALLOCATOR: Cap<alloc::System> = Cap::new(alloc::System, usize::MAX);

/// Seconds in a minute
pub const SECONDS_PER_MINUTE: u64 = 60;
/// Seconds in an hour
pub const SECONDS_PER_HOUR: u64 = 3600;

const BYTES_PER_MEGABYTE: u64 = 1024 * 1024;

/// Source of live runtime statistics.
pub trait RuntimeStats: Send + Sync {
    /// Concurrently scheduled units of work currently alive, including the
    /// root future driving the server. Always at least 1.
    fn task_count(&self) -> usize;

    /// Heap bytes currently allocated and not yet freed.
    fn allocated_bytes(&self) -> u64;

    /// Logical processors visible to this process.
    fn num_cpu(&self) -> usize;

    /// CPU architecture the binary was built for.
    fn architecture(&self) -> &str {
        std::env::consts::ARCH
    }

    /// Hostname of the machine, if it can be resolved.
    fn hostname(&self) -> Option<String>;

    /// `allocated_bytes` in whole megabytes (truncated).
    fn memory_mb(&self) -> u64 {
        self.allocated_bytes() / BYTES_PER_MEGABYTE
    }
}

/// Live statistics from the tokio runtime and the operating system.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRuntimeStats;

impl RuntimeStats for SystemRuntimeStats {
    fn task_count(&self) -> usize {
        let spawned = tokio::runtime::Handle::try_current()
            .map(|handle| handle.metrics().num_alive_tasks())
            .unwrap_or(0);
        // +1 for the root future passed to block_on, which is not a spawned task
        spawned + 1
    }

    fn allocated_bytes(&self) -> u64 {
        ALLOCATOR.allocated() as u64
    }

    fn num_cpu(&self) -> usize {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }

    fn hostname(&self) -> Option<String> {
        System::host_name()
    }
}

/// Statistics with fixed values, for exercising handlers without touching
/// the real runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedRuntimeStats {
    pub task_count: usize,
    pub allocated_bytes: u64,
    pub num_cpu: usize,
    pub architecture: String,
    pub hostname: Option<String>,
}

impl Default for FixedRuntimeStats {
    fn default() -> Self {
        Self {
            task_count: 4,
            allocated_bytes: 12 * BYTES_PER_MEGABYTE,
            num_cpu: 2,
            architecture: "arm64".to_string(),
            hostname: Some("bench-node-1".to_string()),
        }
    }
}

impl RuntimeStats for FixedRuntimeStats {
    fn task_count(&self) -> usize {
        self.task_count
    }

    fn allocated_bytes(&self) -> u64 {
        self.allocated_bytes
    }

    fn num_cpu(&self) -> usize {
        self.num_cpu
    }

    fn architecture(&self) -> &str {
        &self.architecture
    }

    fn hostname(&self) -> Option<String> {
        self.hostname.clone()
    }
}

/// Format an elapsed duration compactly, e.g. `1h2m3.5s`, `4m0s`, `350ms`.
///
/// Hours are shown only when non-zero and minutes only when either they or the
/// hours are non-zero. Seconds carry millisecond precision with trailing zeros
/// trimmed. Anything under a second is shown in whole milliseconds.
pub fn format_uptime(elapsed: Duration) -> String {
    let total_millis = elapsed.as_millis();
    if total_millis == 0 {
        return "0s".to_string();
    }
    if total_millis < 1000 {
        return format!("{}ms", total_millis);
    }

    let secs = elapsed.as_secs();
    let hours = secs / SECONDS_PER_HOUR;
    let minutes = (secs % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE;
    let seconds = secs % SECONDS_PER_MINUTE;
    let millis = elapsed.subsec_millis();

    let mut out = String::new();
    if hours > 0 {
        out.push_str(&format!("{}h", hours));
    }
    if hours > 0 || minutes > 0 {
        out.push_str(&format!("{}m", minutes));
    }
    if millis == 0 {
        out.push_str(&format!("{}s", seconds));
    } else {
        let fraction = format!("{:03}", millis);
        out.push_str(&format!("{}.{}s", seconds, fraction.trim_end_matches('0')));
    }
    out
}
