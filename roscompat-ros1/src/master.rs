//! In-process master.
//!
//! The master is the registry of the ROS1 backend. It owns every publisher
//! record, every subscription queue and the global parameter store.
//! Application code only holds ids into it, so a publisher stays advertised
//! until the whole context goes away.
//!
//! Registration is immediate: a subscriber counts as connected as soon as it
//! is registered, and publishers that asked for connect callbacks get one
//! queued per new matching subscriber.

use crate::callback_queue::{CallbackInterface, CallbackQueue};
use roscompat_core::{
    TypeSupport,
    parameter::{Parameters, Value},
};
use std::{
    any::Any,
    cell::RefCell,
    collections::{BTreeMap, VecDeque},
    rc::{Rc, Weak},
    sync::Arc,
};

/// Id of a publisher or subscriber record.
pub(crate) type EntityId = u64;

/// Subscriber callback.
pub(crate) type MessageCallback<T> = Box<dyn FnMut(Arc<T>)>;

/// Incoming queue of one subscription.
///
/// Holds up to `depth` messages; each queued message has one matching entry
/// in the callback queue.
pub(crate) struct SubscriptionQueue<T> {
    depth: usize,
    messages: RefCell<VecDeque<Arc<T>>>,
    callback: RefCell<MessageCallback<T>>,
}

impl<T> SubscriptionQueue<T> {
    /// A queue of `depth` messages (at least one).
    pub(crate) fn new(depth: usize, callback: MessageCallback<T>) -> Self {
        let depth = depth.max(1);
        Self {
            depth,
            messages: RefCell::new(VecDeque::with_capacity(depth)),
            callback: RefCell::new(callback),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.messages.borrow().len()
    }

    /// Queue `msg`, dropping the oldest message when full.
    ///
    /// Returns `false` when a message was dropped: the dropped message's
    /// callback entry will serve the new one.
    fn push(&self, msg: Arc<T>) -> bool {
        let mut messages = self.messages.borrow_mut();
        let dropped = if messages.len() >= self.depth {
            messages.pop_front();
            true
        } else {
            false
        };
        messages.push_back(msg);
        !dropped
    }
}

impl<T> CallbackInterface for SubscriptionQueue<T> {
    fn call(&self) -> bool {
        let Some(msg) = self.messages.borrow_mut().pop_front() else {
            return false;
        };
        (self.callback.borrow_mut())(msg);
        true
    }
}

/// Callback run when a subscriber connects to a publisher.
pub(crate) struct ConnectCallback {
    topic: String,
    callback: RefCell<Box<dyn FnMut()>>,
}

impl CallbackInterface for ConnectCallback {
    fn call(&self) -> bool {
        tracing::debug!(topic = %self.topic, "subscriber connected");
        (self.callback.borrow_mut())();
        true
    }
}

struct PublisherRecord {
    node: String,
    topic: String,
    type_name: &'static str,
    connect: Option<Rc<ConnectCallback>>,
}

pub(crate) struct SubscriberRecord {
    node: String,
    topic: String,
    type_name: &'static str,
    /// `SubscriptionQueue<T>`.
    queue: Rc<dyn Any>,
    /// The same queue, as seen by the callback queue.
    callback: Weak<dyn CallbackInterface>,
}

/// Registry of publishers, subscribers and parameters.
#[derive(Default)]
pub(crate) struct Master {
    next_id: EntityId,
    publishers: BTreeMap<EntityId, PublisherRecord>,
    subscribers: BTreeMap<EntityId, SubscriberRecord>,
    params: Parameters,
}

impl Master {
    fn next_id(&mut self) -> EntityId {
        self.next_id += 1;
        self.next_id
    }

    /// Advertise a topic.
    ///
    /// With `connect`, one connect callback is queued for every matching
    /// subscriber already registered, and for every later one.
    pub(crate) fn register_publisher<T: TypeSupport>(
        &mut self,
        node: &str,
        topic: &str,
        connect: Option<Box<dyn FnMut()>>,
        callbacks: &CallbackQueue,
    ) -> EntityId {
        self.warn_on_type_mismatch(topic, T::type_name());

        let connect = connect.map(|callback| {
            Rc::new(ConnectCallback {
                topic: topic.to_string(),
                callback: RefCell::new(callback),
            })
        });
        if let Some(connect) = &connect {
            for _ in self.matching_subscribers(topic, T::type_name()) {
                callbacks.add_callback(Rc::downgrade(connect) as Weak<dyn CallbackInterface>);
            }
        }

        let id = self.next_id();
        self.publishers.insert(
            id,
            PublisherRecord {
                node: node.to_string(),
                topic: topic.to_string(),
                type_name: T::type_name(),
                connect,
            },
        );
        tracing::debug!(id, topic, type_name = T::type_name(), "publisher registered");
        id
    }

    /// Register a subscription queue and notify the matching publishers.
    pub(crate) fn register_subscriber<T: TypeSupport>(
        &mut self,
        node: &str,
        topic: &str,
        queue: Rc<SubscriptionQueue<T>>,
        callbacks: &CallbackQueue,
    ) -> EntityId {
        self.warn_on_type_mismatch(topic, T::type_name());

        for record in self.publishers.values() {
            if record.topic != topic || record.type_name != T::type_name() {
                continue;
            }
            if let Some(connect) = &record.connect {
                callbacks.add_callback(Rc::downgrade(connect) as Weak<dyn CallbackInterface>);
            }
        }

        let id = self.next_id();
        let callback = Rc::downgrade(&queue) as Weak<dyn CallbackInterface>;
        self.subscribers.insert(
            id,
            SubscriberRecord {
                node: node.to_string(),
                topic: topic.to_string(),
                type_name: T::type_name(),
                queue,
                callback,
            },
        );
        tracing::debug!(id, topic, type_name = T::type_name(), "subscriber registered");
        id
    }

    /// Remove a subscriber. Its pending callbacks are skipped.
    ///
    /// The record owns the user callback, so the caller must drop it only
    /// after releasing the master borrow.
    pub(crate) fn unregister_subscriber(&mut self, id: EntityId) -> Option<SubscriberRecord> {
        let record = self.subscribers.remove(&id)?;
        tracing::debug!(id, topic = %record.topic, "subscriber unregistered");
        Some(record)
    }

    /// Deliver `msg` from publisher `id` to every matching subscriber.
    ///
    /// All subscribers share one copy. Returns the number of receivers, or
    /// `None` for an unknown publisher.
    pub(crate) fn publish<T: TypeSupport>(
        &self,
        id: EntityId,
        msg: &T,
        callbacks: &CallbackQueue,
    ) -> Option<usize> {
        let publisher = self.publishers.get(&id)?;
        let mut shared = None;
        let mut receivers = 0;

        for record in self.matching_subscribers(&publisher.topic, T::type_name()) {
            let queue: &dyn Any = &*record.queue;
            let Some(queue) = queue.downcast_ref::<SubscriptionQueue<T>>() else {
                continue;
            };
            let sample = shared.get_or_insert_with(|| Arc::new(msg.clone()));
            if queue.push(Arc::clone(sample)) {
                callbacks.add_callback(record.callback.clone());
            }
            receivers += 1;
        }

        Some(receivers)
    }

    /// Number of subscribers connected to publisher `id`.
    pub(crate) fn num_subscribers(&self, id: EntityId) -> usize {
        self.publishers.get(&id).map_or(0, |publisher| {
            self.matching_subscribers(&publisher.topic, publisher.type_name)
                .count()
        })
    }

    /// Advertised topics and their types, without duplicates.
    pub(crate) fn published_topics(&self) -> Vec<(String, String)> {
        let topics: BTreeMap<&str, &str> = self
            .publishers
            .values()
            .map(|p| (p.topic.as_str(), p.type_name))
            .collect();
        topics
            .into_iter()
            .map(|(topic, type_name)| (topic.to_string(), type_name.to_string()))
            .collect()
    }

    /// Names of the nodes owning at least one publisher or subscriber.
    pub(crate) fn node_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .publishers
            .values()
            .map(|p| p.node.clone())
            .chain(self.subscribers.values().map(|s| s.node.clone()))
            .collect();
        names.sort();
        names.dedup();
        names
    }

    pub(crate) fn get_param(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }

    /// Set a parameter, replacing any value of any type.
    pub(crate) fn set_param(&mut self, name: String, value: Value) {
        tracing::debug!(name = %name, value = %value, "parameter set");
        self.params.set(name, value);
    }

    pub(crate) fn delete_param(&mut self, name: &str) -> bool {
        self.params.remove(name).is_some()
    }

    /// Parameter names, sorted.
    pub(crate) fn param_names(&self) -> Vec<String> {
        self.params.names().map(String::from).collect()
    }

    fn matching_subscribers<'a>(
        &'a self,
        topic: &'a str,
        type_name: &'a str,
    ) -> impl Iterator<Item = &'a SubscriberRecord> + 'a {
        self.subscribers
            .values()
            .filter(move |s| s.topic == topic && s.type_name == type_name)
    }

    fn warn_on_type_mismatch(&self, topic: &str, type_name: &str) {
        let existing = self
            .publishers
            .values()
            .map(|p| (p.topic.as_str(), p.type_name))
            .chain(self.subscribers.values().map(|s| (s.topic.as_str(), s.type_name)))
            .find(|(t, ty)| *t == topic && *ty != type_name);

        if let Some((_, existing)) = existing {
            tracing::warn!(
                topic,
                type_name,
                existing,
                "topic already used with another type, endpoints will not connect"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roscompat_core::msg::{sensor_msgs::Image, vision_msgs::Detection2DArray};
    use std::cell::Cell;

    fn queue<T: 'static>(depth: usize, seen: &Rc<RefCell<Vec<Arc<T>>>>) -> Rc<SubscriptionQueue<T>> {
        let seen = Rc::clone(seen);
        Rc::new(SubscriptionQueue::new(
            depth,
            Box::new(move |msg| seen.borrow_mut().push(msg)),
        ))
    }

    #[test]
    fn test_publish_shares_one_copy() {
        let mut master = Master::default();
        let callbacks = CallbackQueue::default();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let publisher = master.register_publisher::<Image>("/n", "/image", None, &callbacks);
        let _a = master.register_subscriber("/n", "/image", queue::<Image>(1, &seen), &callbacks);
        let _b = master.register_subscriber("/n", "/image", queue::<Image>(1, &seen), &callbacks);
        // queues are owned by the master
        assert_eq!(master.num_subscribers(publisher), 2);

        assert_eq!(master.publish(publisher, &Image::default(), &callbacks), Some(2));
        assert_eq!(callbacks.call_available(), 2);

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert!(Arc::ptr_eq(&seen[0], &seen[1]));
    }

    #[test]
    fn test_queue_drops_oldest() {
        let mut master = Master::default();
        let callbacks = CallbackQueue::default();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let publisher = master.register_publisher::<Image>("/n", "/image", None, &callbacks);
        master.register_subscriber("/n", "/image", queue::<Image>(2, &seen), &callbacks);

        for width in 1..=5 {
            let img = Image {
                width,
                ..Default::default()
            };
            master.publish(publisher, &img, &callbacks);
        }
        assert_eq!(callbacks.len(), 2);
        assert_eq!(callbacks.call_available(), 2);

        let widths: Vec<u32> = seen.borrow().iter().map(|m| m.width).collect();
        assert_eq!(widths, vec![4, 5]);
    }

    #[test]
    fn test_connect_callbacks() {
        let mut master = Master::default();
        let callbacks = CallbackQueue::default();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let connects = Rc::new(Cell::new(0));

        // subscribers registered before the publisher are reported too
        master.register_subscriber("/n", "/image", queue::<Image>(1, &seen), &callbacks);

        let counter = Rc::clone(&connects);
        let connect: Box<dyn FnMut()> = Box::new(move || counter.set(counter.get() + 1));
        let publisher =
            master.register_publisher::<Image>("/n", "/image", Some(connect), &callbacks);
        master.register_subscriber("/n", "/image", queue::<Image>(1, &seen), &callbacks);
        // a different type does not connect
        master.register_subscriber(
            "/n",
            "/image",
            queue::<Detection2DArray>(1, &Rc::new(RefCell::new(Vec::new()))),
            &callbacks,
        );

        assert_eq!(connects.get(), 0);
        assert_eq!(callbacks.call_available(), 2);
        assert_eq!(connects.get(), 2);
        assert_eq!(master.num_subscribers(publisher), 2);
    }

    #[test]
    fn test_unregister_skips_pending() {
        let mut master = Master::default();
        let callbacks = CallbackQueue::default();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let publisher = master.register_publisher::<Image>("/n", "/image", None, &callbacks);
        let subscriber =
            master.register_subscriber("/n", "/image", queue::<Image>(1, &seen), &callbacks);
        master.publish(publisher, &Image::default(), &callbacks);

        assert!(master.unregister_subscriber(subscriber).is_some());
        assert!(master.unregister_subscriber(subscriber).is_none());
        assert_eq!(master.num_subscribers(publisher), 0);
        assert_eq!(callbacks.call_available(), 0);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_introspection() {
        let mut master = Master::default();
        let callbacks = CallbackQueue::default();
        master.register_publisher::<Image>("/a", "/image", None, &callbacks);
        master.register_publisher::<Image>("/b", "/image", None, &callbacks);
        master.register_publisher::<Detection2DArray>("/b", "/detections", None, &callbacks);

        assert_eq!(
            master.published_topics(),
            vec![
                ("/detections".to_string(), "vision_msgs/Detection2DArray".to_string()),
                ("/image".to_string(), "sensor_msgs/Image".to_string()),
            ]
        );
        assert_eq!(master.node_names(), vec!["/a".to_string(), "/b".to_string()]);
        assert_eq!(master.publish(99, &Image::default(), &callbacks), None);
        assert_eq!(master.num_subscribers(99), 0);
    }

    #[test]
    fn test_params_replace_any_type() {
        let mut master = Master::default();
        master.set_param("/n/mode".into(), Value::I64(1));
        master.set_param("/n/mode".into(), Value::String("fast".into()));
        assert_eq!(
            master.get_param("/n/mode"),
            Some(&Value::String("fast".into()))
        );
        assert_eq!(master.param_names(), vec!["/n/mode".to_string()]);
        assert!(master.delete_param("/n/mode"));
        assert_eq!(master.get_param("/n/mode"), None);
    }
}
