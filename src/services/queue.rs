//! Lightweight in-process generation queue.
//!
//! Bounded FIFO with pure backpressure: `enqueue` awaits channel capacity and
//! never drops a request. Requests do not survive a restart; the durable path
//! in [`crate::services::jobs`] exists for runs that must.

use tokio::sync::{mpsc, watch};
use tracing::{info, warn};

use crate::errors::{GenerationError, GenerationResult};
use crate::services::generation::GenerationService;

pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationRequest {
    pub project_id: i32,
    pub user_id: i32,
}

/// Producer side of the queue. Cheap to clone into handlers.
#[derive(Clone)]
pub struct JobQueue {
    sender: mpsc::Sender<GenerationRequest>,
}

impl JobQueue {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<GenerationRequest>) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self { sender }, receiver)
    }

    /// Awaits until the queue has room. Fails only once the worker side has
    /// shut down and dropped the receiver.
    pub async fn enqueue(&self, request: GenerationRequest) -> GenerationResult<()> {
        self.sender
            .send(request)
            .await
            .map_err(|_| GenerationError::QueueClosed)
    }
}

/// Consumer loop. One worker drains the queue until the shutdown signal flips;
/// a failed run is logged and the loop moves on to the next request.
pub struct GenerationWorker {
    generation: GenerationService,
    receiver: mpsc::Receiver<GenerationRequest>,
    shutdown: watch::Receiver<bool>,
}

impl GenerationWorker {
    pub fn new(
        generation: GenerationService,
        receiver: mpsc::Receiver<GenerationRequest>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            generation,
            receiver,
            shutdown,
        }
    }

    pub async fn run(mut self) {
        info!("generation worker started");
        loop {
            tokio::select! {
                biased;
                changed = self.shutdown.changed() => {
                    if changed.is_err() || *self.shutdown.borrow() {
                        break;
                    }
                }
                request = self.receiver.recv() => {
                    match request {
                        Some(request) => self.process(request).await,
                        None => break,
                    }
                }
            }
        }
        // dropping the receiver here makes blocked producers fail fast
        info!("generation worker stopped");
    }

    async fn process(&self, request: GenerationRequest) {
        if let Err(err) = self
            .generation
            .generate(request.project_id, request.user_id)
            .await
        {
            warn!(
                project_id = request.project_id,
                error = %err,
                "queued generation failed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn enqueue_blocks_at_capacity_without_erroring() {
        let (queue, _receiver) = JobQueue::new(2);
        let request = GenerationRequest {
            project_id: 1,
            user_id: 1,
        };
        queue.enqueue(request).await.unwrap();
        queue.enqueue(request).await.unwrap();

        // third enqueue must wait for capacity, not return an error
        let blocked = tokio::time::timeout(Duration::from_millis(50), queue.enqueue(request));
        assert!(blocked.await.is_err());
    }

    #[tokio::test]
    async fn enqueue_resumes_once_capacity_frees_up() {
        let (queue, mut receiver) = JobQueue::new(1);
        let request = GenerationRequest {
            project_id: 1,
            user_id: 1,
        };
        queue.enqueue(request).await.unwrap();

        let pending = tokio::spawn({
            let queue = queue.clone();
            async move {
                queue
                    .enqueue(GenerationRequest {
                        project_id: 2,
                        user_id: 1,
                    })
                    .await
            }
        });

        assert_eq!(receiver.recv().await.unwrap().project_id, 1);
        pending.await.unwrap().unwrap();
        assert_eq!(receiver.recv().await.unwrap().project_id, 2);
    }

    #[tokio::test]
    async fn enqueue_after_close_fails() {
        let (queue, receiver) = JobQueue::new(1);
        drop(receiver);
        let err = queue
            .enqueue(GenerationRequest {
                project_id: 1,
                user_id: 1,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::QueueClosed));
    }
}
