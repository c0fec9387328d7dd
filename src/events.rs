//! Lifecycle events emitted after successful writes.

use crate::entity::Entity;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleKind {
    Created,
    Updated,
    Deleted,
    Patched,
}

impl LifecycleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleKind::Created => "created",
            LifecycleKind::Updated => "updated",
            LifecycleKind::Deleted => "deleted",
            LifecycleKind::Patched => "patched",
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct LifecycleEvent {
    pub event_id: Uuid,
    pub kind: LifecycleKind,
    pub entity_type: String,
    /// State after the write; for deletes, the removed entity.
    pub entity: Entity,
    /// State before the write. Absent for creates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<Entity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patched_field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_body: Option<Value>,
    pub occurred_at: DateTime<Utc>,
}

impl LifecycleEvent {
    fn new(kind: LifecycleKind, entity_type: &str, entity: Entity, previous: Option<Entity>) -> Self {
        LifecycleEvent {
            event_id: Uuid::new_v4(),
            kind,
            entity_type: entity_type.to_string(),
            entity,
            previous,
            patched_field: None,
            request_body: None,
            occurred_at: Utc::now(),
        }
    }

    pub fn created(entity_type: &str, entity: Entity) -> Self {
        Self::new(LifecycleKind::Created, entity_type, entity, None)
    }

    pub fn updated(entity_type: &str, entity: Entity, previous: Entity) -> Self {
        Self::new(LifecycleKind::Updated, entity_type, entity, Some(previous))
    }

    pub fn deleted(entity_type: &str, removed: Entity) -> Self {
        Self::new(LifecycleKind::Deleted, entity_type, removed.clone(), Some(removed))
    }

    pub fn patched(entity_type: &str, field: &str, entity: Entity, previous: Entity) -> Self {
        let mut event = Self::new(LifecycleKind::Patched, entity_type, entity, Some(previous));
        event.patched_field = Some(field.to_string());
        event
    }

    pub fn with_request_body(mut self, body: Value) -> Self {
        self.request_body = Some(body);
        self
    }
}

/// Event collaborator. Publishing never fails the request.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn publish(&self, event: LifecycleEvent);
}

/// Logs each event.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingEventSink;

#[async_trait]
impl EventSink for TracingEventSink {
    async fn publish(&self, event: LifecycleEvent) {
        tracing::info!(
            event_id = %event.event_id,
            kind = event.kind.as_str(),
            entity_type = %event.entity_type,
            entity_id = ?event.entity.get(crate::entity::ID_KEY),
            patched_field = ?event.patched_field,
            "resource event"
        );
    }
}

/// Publishes events on a broadcast channel for in-process subscribers.
#[derive(Clone, Debug)]
pub struct BroadcastEventSink {
    sender: broadcast::Sender<LifecycleEvent>,
}

impl BroadcastEventSink {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        BroadcastEventSink { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.sender.subscribe()
    }
}

#[async_trait]
impl EventSink for BroadcastEventSink {
    async fn publish(&self, event: LifecycleEvent) {
        if let Err(err) = self.sender.send(event) {
            tracing::debug!(kind = err.0.kind.as_str(), "no event subscribers");
        }
    }
}

/// Forwards every event to each inner sink in order.
#[derive(Clone, Default)]
pub struct FanoutEventSink {
    sinks: Vec<Arc<dyn EventSink>>,
}

impl FanoutEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sinks.push(sink);
        self
    }
}

#[async_trait]
impl EventSink for FanoutEventSink {
    async fn publish(&self, event: LifecycleEvent) {
        for sink in &self.sinks {
            sink.publish(event.clone()).await;
        }
    }
}
