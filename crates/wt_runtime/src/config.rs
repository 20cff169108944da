//! Runtime configuration.
use std::time::Duration;

/// Tuning knobs for the dispatch engine and its pools. Counts are
/// configuration, not fixed constants.
#[derive(Clone, Copy, Debug)]
pub struct RuntimeConfig {
    /// Worker threads running handler/function bodies.
    pub exec_workers: usize,
    /// Worker threads compiling script text off the caller's thread.
    pub compile_workers: usize,
    /// Worker threads running completion callbacks. Kept separate from the
    /// execution pool so listener work that enqueues more script execution
    /// cannot starve it.
    pub listener_workers: usize,
    /// Period of the idle/ambient message timer.
    pub idle_interval: Duration,
    /// Number of timer cycles idle dispatch stays suppressed after an
    /// idle-handler fault.
    pub idle_fault_suppress_cycles: u32,
    /// Frame-stack depth at which a runaway recursion is cut off with a
    /// fault instead of exhausting the thread stack.
    pub max_call_depth: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            // Scripts are short; a small pool keeps global-variable races
            // unlikely without serializing independent top-level sends.
            exec_workers: num_cpus::get().clamp(1, 4),
            compile_workers: 1,
            listener_workers: 1,
            idle_interval: Duration::from_millis(200),
            idle_fault_suppress_cycles: 4,
            max_call_depth: 128,
        }
    }
}
