// main_loop.rs - FIFO job queue pumped by the owning thread
//
// Background threads dispatch; the thread that owns the loop calls `pump`
// once per frame/tick. Jobs run outside the lock so a job may dispatch more
// work, which lands in the next pump.

use super::{run_job, DispatchQueue, Job};
use crate::error::DispatchError;
use crate::settings::DispatchSettings;
use std::collections::VecDeque;
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Job queue processed each frame by the thread that owns the main loop.
///
/// Cloning yields another handle to the same queue.
#[derive(Clone)]
pub struct MainLoopQueue {
    inner: Arc<Inner>,
}

struct Inner {
    label: String,
    max_jobs_per_pump: Option<NonZeroUsize>,
    panicked: AtomicUsize,
    state: Mutex<State>,
    ready: Condvar,
}

#[derive(Default)]
struct State {
    jobs: VecDeque<Job>,
    closed: bool,
}

impl MainLoopQueue {
    /// Create an unbounded queue with the given label.
    pub fn new(label: impl Into<String>) -> Self {
        Self::build(label.into(), None)
    }

    pub fn from_settings(settings: &DispatchSettings) -> Self {
        Self::build(settings.main_queue_label.clone(), settings.max_jobs_per_pump)
    }

    fn build(label: String, max_jobs_per_pump: Option<NonZeroUsize>) -> Self {
        Self {
            inner: Arc::new(Inner {
                label,
                max_jobs_per_pump,
                panicked: AtomicUsize::new(0),
                state: Mutex::new(State::default()),
                ready: Condvar::new(),
            }),
        }
    }

    /// Number of jobs waiting to run.
    pub fn pending(&self) -> usize {
        self.state().jobs.len()
    }

    /// Total number of jobs that panicked since the queue was created.
    pub fn panicked_jobs(&self) -> usize {
        self.inner.panicked.load(Ordering::Relaxed)
    }

    pub fn is_closed(&self) -> bool {
        self.state().closed
    }

    /// Reject further dispatches. Jobs already queued still run.
    pub fn close(&self) {
        self.state().closed = true;
        self.inner.ready.notify_all();
        tracing::debug!(queue = %self.inner.label, "queue closed");
    }

    /// Run the jobs queued before this call (bounded by `max_jobs_per_pump`).
    ///
    /// Returns how many jobs were run.
    pub fn pump(&self) -> usize {
        let batch: Vec<Job> = {
            let mut state = self.state();
            let take = match self.inner.max_jobs_per_pump {
                Some(limit) => limit.get().min(state.jobs.len()),
                None => state.jobs.len(),
            };
            state.jobs.drain(..take).collect()
        };

        let ran = batch.len();
        let mut panicked = 0;
        for job in batch {
            if !run_job(&self.inner.label, job) {
                panicked += 1;
            }
        }
        if panicked > 0 {
            self.inner.panicked.fetch_add(panicked, Ordering::Relaxed);
        }
        if ran > 0 {
            tracing::trace!(queue = %self.inner.label, ran, panicked, "pumped");
        }
        ran
    }

    /// Pump until the queue is empty.
    pub fn run_until_idle(&self) -> usize {
        let mut total = 0;
        loop {
            let ran = self.pump();
            if ran == 0 {
                return total;
            }
            total += ran;
        }
    }

    /// Block until a job is queued (or the queue closes, or `timeout`
    /// elapses), then pump once.
    pub fn wait_and_pump(&self, timeout: Duration) -> usize {
        {
            let state = self.state();
            let _state = self
                .inner
                .ready
                .wait_timeout_while(state, timeout, |s| s.jobs.is_empty() && !s.closed)
                .unwrap_or_else(PoisonError::into_inner);
        }
        self.pump()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl DispatchQueue for MainLoopQueue {
    fn label(&self) -> &str {
        &self.inner.label
    }

    fn dispatch(&self, job: Job) -> Result<(), DispatchError> {
        let mut state = self.state();
        if state.closed {
            return Err(DispatchError::Closed {
                label: self.inner.label.clone(),
            });
        }
        state.jobs.push_back(job);
        drop(state);
        self.inner.ready.notify_one();
        Ok(())
    }
}

impl fmt::Debug for MainLoopQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MainLoopQueue")
            .field("label", &self.inner.label)
            .field("pending", &self.pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn recorder() -> (Arc<Mutex<Vec<u32>>>, impl Fn(u32) -> Job) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = log.clone();
        let make = move |n: u32| -> Job {
            let sink = sink.clone();
            Box::new(move || sink.lock().unwrap().push(n))
        };
        (log, make)
    }

    #[test]
    fn runs_jobs_in_dispatch_order() {
        let queue = MainLoopQueue::new("main");
        let (log, job) = recorder();

        for n in 0..5 {
            queue.dispatch(job(n)).unwrap();
        }
        assert_eq!(queue.pending(), 5);
        assert!(log.lock().unwrap().is_empty());

        assert_eq!(queue.pump(), 5);
        assert_eq!(*log.lock().unwrap(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn pump_respects_per_pump_budget() {
        let settings = DispatchSettings {
            max_jobs_per_pump: NonZeroUsize::new(2),
            ..DispatchSettings::default()
        };
        let queue = MainLoopQueue::from_settings(&settings);
        let (log, job) = recorder();
        for n in 0..5 {
            queue.dispatch(job(n)).unwrap();
        }

        assert_eq!(queue.pump(), 2);
        assert_eq!(*log.lock().unwrap(), vec![0, 1]);
        assert_eq!(queue.run_until_idle(), 3);
        assert_eq!(*log.lock().unwrap(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn jobs_dispatched_while_pumping_wait_for_next_pump() {
        let queue = MainLoopQueue::new("main");
        let counter = Arc::new(AtomicUsize::new(0));

        let requeue = queue.clone();
        let inner_counter = counter.clone();
        queue
            .dispatch(Box::new(move || {
                let c = inner_counter.clone();
                requeue
                    .dispatch(Box::new(move || {
                        c.fetch_add(1, Ordering::SeqCst);
                    }))
                    .unwrap();
            }))
            .unwrap();

        assert_eq!(queue.pump(), 1);
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert_eq!(queue.pump(), 1);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn closed_queue_rejects_new_jobs_but_drains_old_ones() {
        let queue = MainLoopQueue::new("ui");
        let (log, job) = recorder();
        queue.dispatch(job(1)).unwrap();
        queue.close();

        let err = queue.dispatch(job(2)).unwrap_err();
        assert_eq!(err, DispatchError::Closed { label: "ui".to_string() });
        assert_eq!(queue.run_until_idle(), 1);
        assert_eq!(*log.lock().unwrap(), vec![1]);
    }

    #[test]
    fn panicking_job_does_not_stop_the_queue() {
        let queue = MainLoopQueue::new("main");
        let (log, job) = recorder();
        queue.dispatch(Box::new(|| panic!("boom"))).unwrap();
        queue.dispatch(job(7)).unwrap();

        assert_eq!(queue.pump(), 2);
        assert_eq!(*log.lock().unwrap(), vec![7]);
        assert_eq!(queue.panicked_jobs(), 1);
    }

    #[test]
    fn smallest_budget_still_drains_everything() {
        let settings = DispatchSettings::from_json_str(r#"{ "max_jobs_per_pump": 1 }"#).unwrap();
        let queue = MainLoopQueue::from_settings(&settings);
        let (log, job) = recorder();
        for n in 0..3 {
            queue.dispatch(job(n)).unwrap();
        }

        assert_eq!(queue.wait_and_pump(Duration::from_millis(50)), 1);
        assert_eq!(queue.run_until_idle(), 2);
        assert_eq!(queue.pending(), 0);
        assert_eq!(*log.lock().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn wait_and_pump_wakes_on_dispatch_from_another_thread() {
        let queue = MainLoopQueue::new("main");
        let (log, job) = recorder();

        let remote = queue.clone();
        let worker = thread::spawn(move || remote.dispatch(job(42)).unwrap());

        let mut ran = 0;
        while ran == 0 {
            ran = queue.wait_and_pump(Duration::from_millis(100));
        }
        worker.join().unwrap();
        assert_eq!(*log.lock().unwrap(), vec![42]);
    }

    #[test]
    fn wait_and_pump_times_out_when_idle() {
        let queue = MainLoopQueue::new("main");
        assert_eq!(queue.wait_and_pump(Duration::from_millis(5)), 0);
    }
}
