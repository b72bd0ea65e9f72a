//! In-process data plane.
//!
//! Routes published samples to the queues of matching subscriptions. Data
//! routing is immediate; only the graph view of who is connected goes
//! through the [`GraphCache`](crate::graph_cache::GraphCache) delay.

use roscompat_core::{TakenMsg, TypeSupport};
use std::{any::Any, collections::HashMap, sync::Arc};
use uuid::Uuid;

/// Bounded queue of one subscription, keeping the most recent samples.
pub(crate) struct SubscriptionQueue<T> {
    sender: flume::Sender<TakenMsg<T>>,
    drain: flume::Receiver<TakenMsg<T>>,
}

impl<T> SubscriptionQueue<T> {
    /// A queue of `depth` samples (at least one) and its receiving end.
    pub(crate) fn bounded(depth: usize) -> (Self, flume::Receiver<TakenMsg<T>>) {
        let (sender, receiver) = flume::bounded(depth.max(1));
        let queue = Self {
            sender,
            drain: receiver.clone(),
        };
        (queue, receiver)
    }

    fn push(&self, msg: TakenMsg<T>) {
        // KeepLast(n): drop oldest first
        if self.sender.is_full() {
            let _ = self.drain.try_recv();
        }
        let _ = self.sender.try_send(msg);
    }
}

struct Endpoint {
    gid: Uuid,
    type_name: &'static str,
    /// `SubscriptionQueue<T>` for subscribers, `None` for publishers.
    queue: Option<Box<dyn Any>>,
}

/// Endpoints per fully qualified topic name.
#[derive(Default)]
pub(crate) struct Transport {
    topics: HashMap<String, Vec<Endpoint>>,
}

impl Transport {
    pub(crate) fn add_publisher<T: TypeSupport>(&mut self, topic: &str, gid: Uuid) {
        self.warn_on_type_mismatch(topic, T::type_name());
        self.topics.entry(topic.to_string()).or_default().push(Endpoint {
            gid,
            type_name: T::type_name(),
            queue: None,
        });
    }

    pub(crate) fn add_subscriber<T: TypeSupport>(
        &mut self,
        topic: &str,
        gid: Uuid,
        queue: SubscriptionQueue<T>,
    ) {
        self.warn_on_type_mismatch(topic, T::type_name());
        self.topics.entry(topic.to_string()).or_default().push(Endpoint {
            gid,
            type_name: T::type_name(),
            queue: Some(Box::new(queue)),
        });
    }

    pub(crate) fn remove(&mut self, topic: &str, gid: Uuid) {
        if let Some(endpoints) = self.topics.get_mut(topic) {
            endpoints.retain(|e| e.gid != gid);
            if endpoints.is_empty() {
                self.topics.remove(topic);
            }
        }
    }

    /// Push `msg` to every subscription of the same type on `topic`.
    ///
    /// A single receiver gets its own copy; several receivers share one.
    /// Returns the number of receivers.
    pub(crate) fn deliver<T: TypeSupport>(&self, topic: &str, msg: &T) -> usize {
        let queues: Vec<&SubscriptionQueue<T>> = self
            .topics
            .get(topic)
            .into_iter()
            .flatten()
            .filter(|e| e.type_name == T::type_name())
            .filter_map(|e| e.queue.as_ref()?.downcast_ref::<SubscriptionQueue<T>>())
            .collect();

        match queues.as_slice() {
            [] => {}
            [queue] => queue.push(TakenMsg::Copied(msg.clone())),
            queues => {
                let shared = Arc::new(msg.clone());
                for queue in queues {
                    queue.push(TakenMsg::Shared(Arc::clone(&shared)));
                }
            }
        }
        queues.len()
    }

    fn warn_on_type_mismatch(&self, topic: &str, type_name: &str) {
        let Some(endpoints) = self.topics.get(topic) else {
            return;
        };
        if let Some(other) = endpoints.iter().find(|e| e.type_name != type_name) {
            tracing::warn!(
                topic,
                type_name,
                existing = other.type_name,
                "topic already used with another type, endpoints will not connect"
            );
        }
    }
}
