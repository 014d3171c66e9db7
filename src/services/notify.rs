use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Event published when a project's generation state changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectUpdated {
    pub project_id: i32,
}

/// Outbound notification boundary.
///
/// Generation code publishes through this trait and never knows who listens.
/// Publishing is fire-and-forget: a sink with no listeners is not an error.
#[async_trait]
pub trait NotificationPublisher: Send + Sync {
    async fn project_updated(&self, project_id: i32);
}

/// Default sink that only logs.
pub struct LogPublisher;

#[async_trait]
impl NotificationPublisher for LogPublisher {
    async fn project_updated(&self, project_id: i32) {
        info!(project_id, "project updated");
    }
}

/// Broadcast-backed sink feeding the server-sent-events endpoint.
pub struct BroadcastPublisher {
    sender: tokio::sync::broadcast::Sender<ProjectUpdated>,
}

impl BroadcastPublisher {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = tokio::sync::broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<ProjectUpdated> {
        self.sender.subscribe()
    }
}

#[async_trait]
impl NotificationPublisher for BroadcastPublisher {
    async fn project_updated(&self, project_id: i32) {
        // send only fails when nobody is subscribed, which is fine
        let _ = self.sender.send(ProjectUpdated { project_id });
    }
}
