//! Fixed-size worker pool.
//!
//! Workers loop on a crossbeam channel of boxed jobs. The pool tracks both
//! queued and active jobs so the idle messenger can ask "is any script
//! work pending?" with one load. Nested sends never land here — they run
//! inline on the worker that is already executing the outer handler — so
//! the pool cannot deadlock on its own slots.
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, unbounded};
use log::{debug, error, trace};

type Job = Box<dyn FnOnce() + Send + 'static>;

pub struct WorkerPool {
    name: &'static str,
    tx: Option<Sender<Job>>,
    queued: Arc<AtomicUsize>,
    active: Arc<AtomicUsize>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    pub fn new(name: &'static str, size: usize) -> Self {
        let size = size.max(1);
        let (tx, rx) = unbounded::<Job>();
        let queued = Arc::new(AtomicUsize::new(0));
        let active = Arc::new(AtomicUsize::new(0));
        let mut workers = Vec::with_capacity(size);
        for n in 0..size {
            let rx = rx.clone();
            let queued = Arc::clone(&queued);
            let active = Arc::clone(&active);
            workers.push(
                thread::Builder::new()
                    .name(format!("{name}-{n}"))
                    .spawn(move || worker_loop(rx, queued, active))
                    .expect("failed to spawn pool worker"),
            );
        }
        debug!("{name} pool started with {size} workers");
        Self {
            name,
            tx: Some(tx),
            queued,
            active,
            workers,
        }
    }

    pub fn submit<F: FnOnce() + Send + 'static>(&self, job: F) {
        self.queued.fetch_add(1, Ordering::SeqCst);
        if let Some(tx) = &self.tx {
            // Send fails only after shutdown; the job is then dropped.
            if tx.send(Box::new(job)).is_err() {
                self.queued.fetch_sub(1, Ordering::SeqCst);
            }
        }
    }

    /// No job running and none waiting.
    pub fn is_idle(&self) -> bool {
        self.active.load(Ordering::SeqCst) == 0 && self.queued.load(Ordering::SeqCst) == 0
    }

    pub fn pending(&self) -> usize {
        self.active.load(Ordering::SeqCst) + self.queued.load(Ordering::SeqCst)
    }
}

/// Lowers `active` when dropped, unwinding included, so a panicking job
/// cannot leave its slot counted forever.
struct ActiveGuard<'a>(&'a AtomicUsize);

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

fn worker_loop(rx: Receiver<Job>, queued: Arc<AtomicUsize>, active: Arc<AtomicUsize>) {
    while let Ok(job) = rx.recv() {
        // Raise `active` before lowering `queued` so a job in flight is
        // never momentarily invisible to `is_idle`.
        active.fetch_add(1, Ordering::SeqCst);
        queued.fetch_sub(1, Ordering::SeqCst);
        let guard = ActiveGuard(&active);
        if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
            error!("pool job panicked; the job is abandoned, the worker continues");
        }
        drop(guard);
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.tx = None; // disconnect; workers drain and exit
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
        trace!("{} pool stopped", self.name);
    }
}
