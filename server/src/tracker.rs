//! Completion tracking for spawned tasks.
//!
//! Every task spawned through a [`TrackerHandle`] holds a clone of one mpsc
//! sender for as long as it runs. [`TaskTracker::wait`] drops the tracker's
//! own sender and then waits for the channel to report that no sender is left.

use std::future::Future;

use tokio::sync::mpsc::{self, Receiver, Sender};
use tokio::task::JoinHandle;

pub struct TaskTracker {
    token_tx: Sender<()>,
    token_rx: Receiver<()>,
}

#[derive(Clone)]
pub struct TrackerHandle {
    token_tx: Sender<()>,
}

impl TaskTracker {
    pub fn new() -> Self {
        // nothing is ever sent, the channel only counts senders
        let (token_tx, token_rx) = mpsc::channel(1);
        Self { token_tx, token_rx }
    }

    pub fn handle(&self) -> TrackerHandle {
        TrackerHandle {
            token_tx: self.token_tx.clone(),
        }
    }

    /// Resolves when every task registered through a handle has finished and
    /// every handle has been dropped.
    pub async fn wait(self) {
        let Self {
            token_tx,
            mut token_rx,
        } = self;
        drop(token_tx);
        let _ = token_rx.recv().await;
    }
}

impl Default for TaskTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackerHandle {
    /// Registers before the task is spawned; the registration is released
    /// when the future completes, panics or is aborted.
    pub fn spawn<F>(&self, task: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let token = self.token_tx.clone();
        tokio::spawn(async move {
            let _token = token;
            task.await
        })
    }
}
