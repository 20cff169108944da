//! Compile pool.
//!
//! Parses script text into a `Script` off the caller's thread. Besides
//! plain fire-and-wait compilation there is a best-effort mode for
//! keystroke-driven recompiles: a newly submitted best-effort job replaces
//! any best-effort job still waiting in the slot, but a job that a worker
//! has already picked up always runs to completion.
use std::sync::{Arc, Mutex};

use crossbeam_channel::{Receiver, Sender, bounded};
use log::debug;

use crate::error::RuntimeError;
use wt_ast::Script;

/// Result of a compile request.
#[derive(Clone, Debug)]
pub enum CompileOutcome {
    Done(Arc<Script>),
    Failed(RuntimeError),
    /// A later best-effort submission replaced this one before it started.
    Superseded,
}

pub struct CompileHandle {
    rx: Receiver<CompileOutcome>,
}

impl CompileHandle {
    /// Block until the compile finishes (or is superseded).
    pub fn wait(self) -> CompileOutcome {
        self.rx
            .recv()
            .unwrap_or(CompileOutcome::Failed(RuntimeError::Fault(
                "compile pool shut down".into(),
            )))
    }
}

struct PendingJob {
    text: String,
    done: Sender<CompileOutcome>,
}

pub struct CompilePool {
    pool: super::pool::WorkerPool,
    /// Best-effort slot: at most one queued-but-not-started job.
    slot: Arc<Mutex<Option<PendingJob>>>,
}

impl CompilePool {
    pub fn new(workers: usize) -> Self {
        Self {
            pool: super::pool::WorkerPool::new("wt-compile", workers),
            slot: Arc::new(Mutex::new(None)),
        }
    }

    /// Compile on the calling thread.
    pub fn compile_now(text: &str) -> Result<Arc<Script>, RuntimeError> {
        let result = wt_parser::parse_script(text);
        if let Some(first) = result
            .diagnostics
            .iter()
            .find(|d| d.severity == wt_syntax::Severity::Error)
        {
            return Err(RuntimeError::Syntax(match first.span {
                Some(span) => format!("{} (at byte {})", first.message, span.start),
                None => first.message.clone(),
            }));
        }
        Ok(Arc::new(result.script))
    }

    /// Compile in the background; the handle resolves when done.
    pub fn submit(&self, text: String) -> CompileHandle {
        let (done, rx) = bounded(1);
        self.pool.submit(move || {
            let outcome = match Self::compile_now(&text) {
                Ok(script) => CompileOutcome::Done(script),
                Err(e) => CompileOutcome::Failed(e),
            };
            let _ = done.send(outcome);
        });
        CompileHandle { rx }
    }

    /// Best-effort background compile: replaces any best-effort job that
    /// has not started yet. Never cancels a running compile.
    pub fn submit_preemptive(&self, text: String) -> CompileHandle {
        let (done, rx) = bounded(1);
        let replaced = {
            let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
            slot.replace(PendingJob { text, done })
        };
        if let Some(old) = replaced {
            debug!("superseding queued compile job");
            let _ = old.done.send(CompileOutcome::Superseded);
        }
        let slot = Arc::clone(&self.slot);
        self.pool.submit(move || {
            // Take whatever is newest in the slot; the submission that
            // woke us may already have been replaced (then the slot is
            // empty for us and a later wakeup does the work).
            let job = slot.lock().unwrap_or_else(|e| e.into_inner()).take();
            if let Some(job) = job {
                let outcome = match Self::compile_now(&job.text) {
                    Ok(script) => CompileOutcome::Done(script),
                    Err(e) => CompileOutcome::Failed(e),
                };
                let _ = job.done.send(outcome);
            }
        });
        CompileHandle { rx }
    }

    pub fn is_idle(&self) -> bool {
        self.pool.is_idle()
    }
}
