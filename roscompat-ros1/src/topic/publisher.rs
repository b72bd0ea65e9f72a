//! Topic publisher.
//!
//! A [`Publisher`] is a handle into the master, which owns the actual
//! publisher record. Handles are cheap to clone and never unadvertise; the
//! record lives as long as the node.

use crate::{context::Context, master::EntityId, node::Node};
use roscompat_core::{Error, Result, RosNode, RosPublisher, TypeSupport};
use std::{
    marker::PhantomData,
    rc::{Rc, Weak},
};

/// Topic publisher handle.
///
/// # Example
///
/// ```ignore
/// let publisher = node.create_publisher::<Detection2DArray>("detections", 25)?;
/// publisher.publish(&Detection2DArray::default())?;
/// ```
pub struct Publisher<T> {
    context: Weak<Context>,
    id: EntityId,
    /// Fully qualified topic name.
    topic_name: String,
    queue_size: usize,
    _phantom: PhantomData<fn(&T)>,
}

impl<T: TypeSupport> Publisher<T> {
    /// Advertise `fq_topic_name`, optionally with a connect callback.
    pub(crate) fn new(
        node: &Node,
        fq_topic_name: &str,
        queue_size: usize,
        connect: Option<Box<dyn FnMut()>>,
    ) -> Self {
        let context = node.context();
        let id = context.advertise::<T>(&node.fully_qualified_name(), fq_topic_name, connect);

        Publisher {
            context: Rc::downgrade(context),
            id,
            topic_name: fq_topic_name.to_string(),
            queue_size,
            _phantom: PhantomData,
        }
    }

    /// Get the fully qualified topic name.
    pub fn get_topic(&self) -> &str {
        &self.topic_name
    }

    /// Queue size requested when advertising.
    pub fn queue_size(&self) -> usize {
        self.queue_size
    }

    /// Publish a message to every connected subscriber.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ContextShutdown`] once the node is gone.
    pub fn send(&self, msg: &T) -> Result<()> {
        let Some(context) = self.context.upgrade() else {
            tracing::warn!(topic = %self.topic_name, "publishing after the node was dropped");
            return Err(Error::ContextShutdown);
        };
        match context.publish(self.id, msg) {
            Some(receivers) => {
                tracing::trace!(topic = %self.topic_name, receivers, "published");
                Ok(())
            }
            None => Err(Error::ContextShutdown),
        }
    }

    /// Number of connected subscribers. Zero once the node is gone.
    pub fn get_num_subscribers(&self) -> usize {
        let Some(context) = self.context.upgrade() else {
            tracing::trace!(topic = %self.topic_name, "node dropped, no subscribers");
            return 0;
        };
        context.master().num_subscribers(self.id)
    }
}

impl<T> Clone for Publisher<T> {
    fn clone(&self) -> Self {
        Self {
            context: self.context.clone(),
            id: self.id,
            topic_name: self.topic_name.clone(),
            queue_size: self.queue_size,
            _phantom: PhantomData,
        }
    }
}

// ============================================================================
// RosPublisher trait implementation
// ============================================================================

impl<T: TypeSupport> RosPublisher<T> for Publisher<T> {
    fn topic_name(&self) -> &str {
        self.get_topic()
    }

    fn publish(&self, msg: &T) -> Result<()> {
        self.send(msg)
    }

    fn subscriber_count(&self) -> usize {
        self.get_num_subscribers()
    }
}
