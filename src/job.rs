//! One-shot background jobs the UI loop polls without blocking.
//!
//! A job owns the abort handle of its task, so cancelling or dropping it stops the
//! network request and guarantees its result never reaches UI state.

use crossbeam_channel::{bounded, Receiver, TryRecvError};
use std::future::Future;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;

/// Outcome of a non-blocking poll.
#[derive(Debug, PartialEq)]
pub enum JobPoll<T> {
    /// Still running.
    Pending,
    /// Finished with a value; later polls return `Lost`.
    Ready(T),
    /// The task went away without a value (aborted or panicked).
    Lost,
}

pub struct Job<T> {
    label: &'static str,
    rx: Receiver<T>,
    abort: Option<AbortHandle>,
}

impl<T: Send + 'static> Job<T> {
    /// Run `future` on `runtime` and deliver its output to the returned job.
    pub fn spawn<F>(runtime: &Handle, label: &'static str, future: F) -> Self
    where
        F: Future<Output = T> + Send + 'static,
    {
        let (tx, rx) = bounded(1);
        let task = runtime.spawn(async move {
            let _ = tx.send(future.await);
        });
        Self {
            label,
            rx,
            abort: Some(task.abort_handle()),
        }
    }
}

impl<T> Job<T> {
    /// Wrap a plain receiver; whoever holds the sender completes the job.
    pub fn from_receiver(label: &'static str, rx: Receiver<T>) -> Self {
        Self {
            label,
            rx,
            abort: None,
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn poll(&self) -> JobPoll<T> {
        match self.rx.try_recv() {
            Ok(value) => JobPoll::Ready(value),
            Err(TryRecvError::Empty) => JobPoll::Pending,
            Err(TryRecvError::Disconnected) => JobPoll::Lost,
        }
    }

    /// Abort the underlying task. Idempotent.
    pub fn cancel(&mut self) {
        if let Some(abort) = self.abort.take() {
            if !abort.is_finished() {
                crate::log_debug(&format!("cancelling {} job", self.label));
            }
            abort.abort();
        }
    }
}

impl<T> Drop for Job<T> {
    fn drop(&mut self) {
        self.cancel();
    }
}
