//! Topic publisher.
//!
//! A [`Publisher`] owns its registration: it stays matched with subscribers
//! for as long as one clone of it is alive.

use crate::{
    context::Context,
    graph_cache::{EntityInfo, EntityKind, GraphEvent},
    node::Node,
};
use roscompat_core::{Result, RosPublisher, TypeSupport};
use std::{
    marker::PhantomData,
    rc::{Rc, Weak},
};
use uuid::Uuid;

/// Topic publisher.
///
/// Cloning shares the same publisher.
///
/// # Example
///
/// ```ignore
/// let publisher = node.create_publisher::<Detection2DArray>("detections", 25)?;
/// publisher.publish(&Detection2DArray::default())?;
/// ```
pub struct Publisher<T> {
    inner: Rc<PublisherInner<T>>,
}

pub(crate) struct PublisherInner<T> {
    context: Rc<Context>,
    /// Fully qualified topic name.
    topic_name: String,
    /// Publisher GID.
    gid: Uuid,
    queue_size: usize,
    _phantom: PhantomData<fn(&T)>,
}

impl<T: TypeSupport> Publisher<T> {
    /// Create a new publisher.
    ///
    /// # Arguments
    ///
    /// * `node` - Parent node
    /// * `fq_topic_name` - Fully qualified topic name (already expanded and remapped)
    /// * `queue_size` - History depth
    pub(crate) fn new(node: &Node, fq_topic_name: &str, queue_size: usize) -> Self {
        let context = Rc::clone(node.context());
        let gid = Uuid::new_v4();

        context.transport_mut().add_publisher::<T>(fq_topic_name, gid);
        context.announce(GraphEvent::Put(EntityInfo {
            gid,
            domain_id: context.domain_id(),
            kind: EntityKind::Publisher,
            namespace: node.get_namespace().to_string(),
            node_name: node.get_name().to_string(),
            topic_name: Some(fq_topic_name.to_string()),
            type_name: Some(T::type_name()),
        }));
        tracing::debug!(topic = fq_topic_name, type_name = T::type_name(), "publisher created");

        Publisher {
            inner: Rc::new(PublisherInner {
                context,
                topic_name: fq_topic_name.to_string(),
                gid,
                queue_size,
                _phantom: PhantomData,
            }),
        }
    }

    /// Get the fully qualified topic name.
    pub fn topic_name(&self) -> &str {
        &self.inner.topic_name
    }

    /// Get the publisher GID.
    pub fn gid(&self) -> &Uuid {
        &self.inner.gid
    }

    /// History depth requested at creation.
    pub fn queue_size(&self) -> usize {
        self.inner.queue_size
    }

    /// Publish a message.
    pub fn send(&self, msg: &T) -> Result<()> {
        self.inner.send(msg);
        Ok(())
    }

    /// Number of matched subscribers, as seen by the graph cache.
    pub fn get_subscription_count(&self) -> usize {
        self.inner.subscriber_count()
    }

    pub(crate) fn downgrade(&self) -> Weak<PublisherInner<T>> {
        Rc::downgrade(&self.inner)
    }
}

impl<T: TypeSupport> PublisherInner<T> {
    fn send(&self, msg: &T) {
        let delivered = self.context.transport().deliver(&self.topic_name, msg);
        tracing::trace!(topic = %self.topic_name, delivered, "published");
    }

    pub(crate) fn subscriber_count(&self) -> usize {
        self.context
            .graph_cache()
            .count_subscribers(&self.topic_name, T::type_name())
    }
}

impl<T> Drop for PublisherInner<T> {
    fn drop(&mut self) {
        self.context.transport_mut().remove(&self.topic_name, self.gid);
        self.context.announce(GraphEvent::Delete(self.gid));
        tracing::debug!(topic = %self.topic_name, "publisher dropped");
    }
}

impl<T> Clone for Publisher<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

// ============================================================================
// RosPublisher trait implementation
// ============================================================================

impl<T: TypeSupport> RosPublisher<T> for Publisher<T> {
    fn topic_name(&self) -> &str {
        Publisher::topic_name(self)
    }

    fn publish(&self, msg: &T) -> Result<()> {
        self.send(msg)
    }

    fn subscriber_count(&self) -> usize {
        self.get_subscription_count()
    }
}
