//! Topic subscription.
//!
//! Received samples wait in a bounded queue until the selector polls it
//! during `spin`. Dropping the [`Subscription`] unregisters it; the selector
//! then discards its poll handler at the next dispatch.

use crate::{
    context::Context,
    graph_cache::{EntityInfo, EntityKind, GraphEvent},
    node::Node,
    selector::CallbackResult,
    transport::SubscriptionQueue,
};
use roscompat_core::{TakenMsg, TypeSupport};
use std::{cell::RefCell, rc::Rc};
use uuid::Uuid;

/// Subscription callback.
pub(crate) type SubscriptionCallback<T> = Box<dyn FnMut(TakenMsg<T>)>;

/// Topic subscription.
///
/// # Example
///
/// ```ignore
/// let _subscription = node.create_subscriber::<Image, _>("image_in", 5, |img| {
///     tracing::info!(width = img.width, "image received");
/// })?;
/// node.spin()?;
/// ```
#[must_use = "dropping the subscription unsubscribes"]
pub struct Subscription<T> {
    inner: Rc<SubscriptionInner<T>>,
}

pub(crate) struct SubscriptionInner<T> {
    context: Rc<Context>,
    /// Fully qualified topic name.
    topic_name: String,
    /// Subscription GID.
    gid: Uuid,
    /// Message receiver channel.
    receiver: flume::Receiver<TakenMsg<T>>,
    callback: RefCell<SubscriptionCallback<T>>,
}

impl<T: TypeSupport> Subscription<T> {
    /// Create a new subscription and register its poll handler.
    ///
    /// # Arguments
    ///
    /// * `node` - Parent node
    /// * `fq_topic_name` - Fully qualified topic name (already expanded and remapped)
    /// * `queue_size` - Queue depth, the oldest sample is dropped when full
    /// * `callback` - Called for every received sample
    pub(crate) fn new(
        node: &Node,
        fq_topic_name: &str,
        queue_size: usize,
        callback: SubscriptionCallback<T>,
    ) -> Self {
        let context = Rc::clone(node.context());
        let gid = Uuid::new_v4();

        let (queue, receiver) = SubscriptionQueue::bounded(queue_size);
        context
            .transport_mut()
            .add_subscriber::<T>(fq_topic_name, gid, queue);
        context.announce(GraphEvent::Put(EntityInfo {
            gid,
            domain_id: context.domain_id(),
            kind: EntityKind::Subscriber,
            namespace: node.get_namespace().to_string(),
            node_name: node.get_name().to_string(),
            topic_name: Some(fq_topic_name.to_string()),
            type_name: Some(T::type_name()),
        }));

        let inner = Rc::new(SubscriptionInner {
            context,
            topic_name: fq_topic_name.to_string(),
            gid,
            receiver,
            callback: RefCell::new(callback),
        });

        let weak = Rc::downgrade(&inner);
        inner.context.selector().add_subscriber_handler(Box::new(move || {
            let Some(subscription) = weak.upgrade() else {
                return Some(CallbackResult::Remove);
            };
            (subscription.take_and_dispatch() > 0).then_some(CallbackResult::Ok)
        }));
        tracing::debug!(topic = fq_topic_name, type_name = T::type_name(), "subscription created");

        Subscription { inner }
    }

    /// Get the fully qualified topic name.
    pub fn topic_name(&self) -> &str {
        &self.inner.topic_name
    }

    /// Get the subscription GID.
    pub fn gid(&self) -> &Uuid {
        &self.inner.gid
    }

    /// Number of samples waiting to be dispatched.
    pub fn pending(&self) -> usize {
        self.inner.receiver.len()
    }
}

impl<T> SubscriptionInner<T> {
    /// Run the callback on the samples queued so far.
    fn take_and_dispatch(&self) -> usize {
        let pending = self.receiver.len();
        let mut callback = self.callback.borrow_mut();
        let mut count = 0;
        for msg in self.receiver.try_iter().take(pending) {
            callback(msg);
            count += 1;
        }
        count
    }
}

impl<T> Drop for SubscriptionInner<T> {
    fn drop(&mut self) {
        self.context.transport_mut().remove(&self.topic_name, self.gid);
        self.context.announce(GraphEvent::Delete(self.gid));
        tracing::debug!(topic = %self.topic_name, "subscription dropped");
    }
}
