// channel.rs - Queue adapter for tokio hosts
//
// Jobs travel through an unbounded mpsc channel; whichever task owns the
// receiver runs them in order. Pair with a `LocalSet` to pin that task to
// the main thread.

use super::{run_job, DispatchQueue, Job};
use crate::error::DispatchError;
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};

/// Sending half: dispatches jobs into the channel.
#[derive(Clone, Debug)]
pub struct ChannelQueue {
    label: String,
    tx: UnboundedSender<Job>,
}

/// Receiving half: runs jobs on the task that drives it.
#[derive(Debug)]
pub struct JobReceiver {
    label: String,
    rx: UnboundedReceiver<Job>,
}

impl ChannelQueue {
    pub fn new(label: impl Into<String>) -> (Self, JobReceiver) {
        let label = label.into();
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                label: label.clone(),
                tx,
            },
            JobReceiver { label, rx },
        )
    }
}

impl DispatchQueue for ChannelQueue {
    fn label(&self) -> &str {
        &self.label
    }

    fn dispatch(&self, job: Job) -> Result<(), DispatchError> {
        self.tx
            .send(job)
            .map_err(|_| DispatchError::Disconnected {
                label: self.label.clone(),
            })
    }
}

impl JobReceiver {
    /// Run jobs as they arrive until every `ChannelQueue` handle is dropped.
    ///
    /// Returns how many jobs were run.
    pub async fn run(mut self) -> usize {
        let (mut ran, mut panicked) = (0, 0);
        while let Some(job) = self.rx.recv().await {
            if !run_job(&self.label, job) {
                panicked += 1;
            }
            ran += 1;
        }
        tracing::debug!(queue = %self.label, ran, panicked, "all senders dropped");
        ran
    }

    /// Run whatever is already queued without waiting.
    pub fn run_pending(&mut self) -> usize {
        let (mut ran, mut panicked) = (0, 0);
        loop {
            match self.rx.try_recv() {
                Ok(job) => {
                    if !run_job(&self.label, job) {
                        panicked += 1;
                    }
                    ran += 1;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => {
                    if panicked > 0 {
                        tracing::warn!(queue = %self.label, ran, panicked, "jobs panicked");
                    }
                    return ran;
                }
            }
        }
    }
}
