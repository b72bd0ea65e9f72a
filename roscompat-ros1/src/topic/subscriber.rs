//! Topic subscription.
//!
//! The subscription queue lives in the master. Every delivered message
//! queues one callback, which `spin` runs with the shared message.

use crate::{
    context::Context,
    master::{EntityId, MessageCallback, SubscriptionQueue},
    node::Node,
};
use roscompat_core::{RosNode, TypeSupport};
use std::rc::{Rc, Weak};

/// Topic subscription. Dropping it unsubscribes.
///
/// # Example
///
/// ```ignore
/// let _subscription = node.create_subscriber("image_in", 5, |img: Arc<Image>| {
///     tracing::info!(width = img.width, "image received");
/// })?;
/// node.spin()?;
/// ```
#[must_use = "dropping the subscription unsubscribes"]
pub struct Subscription<T> {
    context: Weak<Context>,
    id: EntityId,
    /// Fully qualified topic name.
    topic_name: String,
    queue: Weak<SubscriptionQueue<T>>,
}

impl<T: TypeSupport> Subscription<T> {
    pub(crate) fn new(
        node: &Node,
        fq_topic_name: &str,
        queue_size: usize,
        callback: MessageCallback<T>,
    ) -> Self {
        let context = node.context();
        let queue = Rc::new(SubscriptionQueue::new(queue_size, callback));
        let weak_queue = Rc::downgrade(&queue);
        let id = context.subscribe(&node.fully_qualified_name(), fq_topic_name, queue);

        Subscription {
            context: Rc::downgrade(context),
            id,
            topic_name: fq_topic_name.to_string(),
            queue: weak_queue,
        }
    }
}

impl<T> Subscription<T> {
    /// Get the fully qualified topic name.
    pub fn get_topic(&self) -> &str {
        &self.topic_name
    }

    /// Number of messages waiting for `spin`.
    pub fn pending(&self) -> usize {
        self.queue.upgrade().map_or(0, |queue| queue.len())
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        if let Some(context) = self.context.upgrade() {
            let removed = context.master_mut().unregister_subscriber(self.id);
            drop(removed);
        }
    }
}
