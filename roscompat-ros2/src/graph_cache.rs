//! Graph cache for entity discovery.
//!
//! Entities announce themselves through [`GraphEvent`]s, the in-process
//! equivalent of liveliness tokens. Events are queued when an entity is
//! created or dropped and only folded into the cache when the executor
//! refreshes it at the start of a dispatch cycle, so every count read from
//! the cache may lag by one cycle.

use std::collections::{HashMap, VecDeque};
use uuid::Uuid;

/// Kind of a graph entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// A node.
    Node,
    /// A message publisher.
    Publisher,
    /// A message subscriber.
    Subscriber,
}

/// Information about a discovered entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityInfo {
    /// Entity GID.
    pub gid: Uuid,
    /// Domain ID.
    pub domain_id: u32,
    /// Entity kind.
    pub kind: EntityKind,
    /// Node namespace.
    pub namespace: String,
    /// Node name.
    pub node_name: String,
    /// Topic name (`None` for nodes).
    pub topic_name: Option<String>,
    /// Type name (`None` for nodes).
    pub type_name: Option<&'static str>,
}

/// A discovery announcement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphEvent {
    /// An entity appeared.
    Put(EntityInfo),
    /// The entity with this GID went away.
    Delete(Uuid),
}

/// Graph cache storing discovered entities.
#[derive(Debug, Clone, Default)]
pub struct GraphCache {
    /// All discovered entities, keyed by GID.
    entities: HashMap<Uuid, EntityInfo>,
    /// Announcements not yet applied.
    pending: VecDeque<GraphEvent>,
}

impl GraphCache {
    /// Create a new empty graph cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an announcement. It becomes visible at the next [`refresh`].
    ///
    /// [`refresh`]: GraphCache::refresh
    pub fn announce(&mut self, event: GraphEvent) {
        self.pending.push_back(event);
    }

    /// Apply every queued announcement. Returns how many were applied.
    pub fn refresh(&mut self) -> usize {
        let count = self.pending.len();
        while let Some(event) = self.pending.pop_front() {
            self.handle_event(event);
        }
        if count > 0 {
            tracing::trace!(count, "graph cache refreshed");
        }
        count
    }

    /// Handle a single announcement.
    pub fn handle_event(&mut self, event: GraphEvent) {
        match event {
            GraphEvent::Put(info) => {
                self.entities.insert(info.gid, info);
            }
            GraphEvent::Delete(gid) => {
                self.entities.remove(&gid);
            }
        }
    }

    /// Get all fully qualified node names.
    pub fn get_node_names(&self) -> Vec<String> {
        self.entities
            .values()
            .filter(|e| e.kind == EntityKind::Node)
            .map(|e| roscompat_core::names::build_node_fqn(&e.namespace, &e.node_name))
            .collect()
    }

    /// Count publishers for a topic and type.
    pub fn count_publishers(&self, topic: &str, type_name: &str) -> usize {
        self.count(EntityKind::Publisher, topic, type_name)
    }

    /// Count subscribers for a topic and type.
    ///
    /// Subscribers of another type on the same topic are not matched.
    pub fn count_subscribers(&self, topic: &str, type_name: &str) -> usize {
        self.count(EntityKind::Subscriber, topic, type_name)
    }

    /// Get subscribers info for a topic, whatever their type.
    pub fn get_subscribers_info(&self, topic: &str) -> Vec<&EntityInfo> {
        self.entities
            .values()
            .filter(|e| e.kind == EntityKind::Subscriber && e.topic_name.as_deref() == Some(topic))
            .collect()
    }

    fn count(&self, kind: EntityKind, topic: &str, type_name: &str) -> usize {
        self.entities
            .values()
            .filter(|e| {
                e.kind == kind
                    && e.topic_name.as_deref() == Some(topic)
                    && e.type_name == Some(type_name)
            })
            .count()
    }
}
