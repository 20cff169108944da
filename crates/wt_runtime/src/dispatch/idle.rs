//! Periodic `idle` delivery.
//!
//! A single timer thread sends `idle` to the current target whenever the
//! execution pool has nothing better to do. Cycle policy lives in
//! `IdlePolicy`, separate from the thread, so the skip and suppression
//! rules can be exercised without timers.
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Sender, bounded, select, tick};
use log::debug;

use super::engine::{DispatchEngine, ScriptTarget};

/// Decides, tick by tick, whether `idle` goes out.
///
/// Two rules: a tick is skipped while script work is running or queued,
/// and after a fault in an idle handler the next N otherwise-sendable
/// ticks are skipped so a broken handler cannot fault in a tight loop.
#[derive(Clone, Debug)]
pub struct IdlePolicy {
    suppress_after_fault: u32,
    suppressed: u32,
}

impl IdlePolicy {
    pub fn new(suppress_after_fault: u32) -> Self {
        Self {
            suppress_after_fault,
            suppressed: 0,
        }
    }

    /// Should this tick deliver `idle`? Busy ticks do not consume
    /// suppression; only ticks that would otherwise have sent do.
    pub fn should_send(&mut self, busy: bool) -> bool {
        if busy {
            return false;
        }
        if self.suppressed > 0 {
            self.suppressed -= 1;
            return false;
        }
        true
    }

    /// The idle handler faulted; back off.
    pub fn note_fault(&mut self) {
        self.suppressed = self.suppress_after_fault;
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppressed > 0
    }
}

/// The timer thread. One per engine; stops when dropped.
pub struct IdleMessenger {
    stop: Option<Sender<()>>,
    thread: Option<JoinHandle<()>>,
    target: Arc<Mutex<Option<ScriptTarget>>>,
}

impl IdleMessenger {
    pub fn start(engine: DispatchEngine) -> Self {
        let config = *engine.config();
        let target: Arc<Mutex<Option<ScriptTarget>>> = Arc::new(Mutex::new(None));
        let (stop, stop_rx) = bounded::<()>(0);
        let thread_target = Arc::clone(&target);
        let thread = thread::Builder::new()
            .name("wt-idle".into())
            .spawn(move || {
                let ticker = tick(config.idle_interval);
                let mut policy = IdlePolicy::new(config.idle_fault_suppress_cycles);
                loop {
                    select! {
                        recv(stop_rx) -> _ => break,
                        recv(ticker) -> _ => {
                            let target = thread_target
                                .lock()
                                .unwrap_or_else(|e| e.into_inner())
                                .clone();
                            let Some(target) = target else { continue };
                            if !policy.should_send(engine.exec_busy()) {
                                continue;
                            }
                            let outcome =
                                engine.dispatch_handler(&target, "idle", Vec::new()).wait();
                            if outcome.error.is_some() {
                                debug!("idle handler faulted; backing off");
                                policy.note_fault();
                            }
                        }
                    }
                }
            })
            .expect("failed to spawn idle thread");
        Self {
            stop: Some(stop),
            thread: Some(thread),
            target,
        }
    }

    /// Change (or clear) where `idle` goes. Takes effect on the next tick.
    pub fn set_target(&self, target: Option<ScriptTarget>) {
        *self.target.lock().unwrap_or_else(|e| e.into_inner()) = target;
    }
}

impl Drop for IdleMessenger {
    fn drop(&mut self) {
        self.stop = None; // disconnect; the select wakes and breaks
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}
