//! Backend-agnostic node API.
//!
//! Both backends implement these traits, so application code written
//! against them compiles unchanged whichever backend the facade selects.
//!
//! # Traits
//!
//! - [`RosNode`] - the execution context: creates publishers and
//!   subscribers, answers parameter, namespace and time queries, runs the
//!   event loop
//! - [`RosPublisher`] - publishes messages and reports its subscriber count
//!
//! # Example
//!
//! ```ignore
//! use roscompat_core::api::*;
//! use roscompat_core::msg::vision_msgs::Detection2DArray;
//!
//! fn setup<N: RosNode>(node: &N) -> roscompat_core::Result<()> {
//!     let mut threshold = 0.5_f64;
//!     node.get_parameter_or("threshold", &mut threshold, 0.5);
//!     let publisher = node.create_publisher::<Detection2DArray>("detections", 25)?;
//!     publisher.publish(&Detection2DArray::default())?;
//!     Ok(())
//! }
//! ```

use crate::{
    Result, msg::TypeSupport, parameter::ParamValue, shutdown::ShutdownHandle, time::Time,
};
use std::{ops::Deref, time::Duration};

// ============================================================================
// Node Trait
// ============================================================================

/// The execution context of a node.
///
/// Exactly one exists per runtime. It is not `Send`: every operation and
/// every callback runs on the thread that created it.
pub trait RosNode: Sized {
    /// The publisher handle created by this node.
    type Publisher<T: TypeSupport>: RosPublisher<T>;

    /// The subscription registration created by this node.
    /// Dropping it unsubscribes.
    type Subscription<T: TypeSupport>;

    /// What a subscriber callback receives.
    type Received<T: TypeSupport>: Deref<Target = T>;

    /// Get the node base name.
    fn name(&self) -> &str;

    /// Get the namespace the node lives in.
    ///
    /// Stable for the lifetime of the process.
    fn namespace(&self) -> String;

    /// Get the fully qualified node name.
    fn fully_qualified_name(&self) -> String;

    /// Create a publisher.
    ///
    /// Several publishers may share a topic; each call creates a new one.
    ///
    /// # Arguments
    ///
    /// * `topic` - Topic name (relative, absolute or `~`-private)
    /// * `queue_size` - Depth of the queues of matching subscribers
    fn create_publisher<T: TypeSupport>(
        &self,
        topic: &str,
        queue_size: usize,
    ) -> Result<Self::Publisher<T>>;

    /// Create a publisher whose `on_subscriber` callback runs at least once
    /// each time its subscriber count increases, and never on a decrease.
    fn create_publisher_with_status<T, F>(
        &self,
        topic: &str,
        queue_size: usize,
        on_subscriber: F,
    ) -> Result<Self::Publisher<T>>
    where
        T: TypeSupport,
        F: FnMut() + 'static;

    /// Create a subscriber that runs `callback` for every received message.
    ///
    /// Callbacks only run inside [`RosNode::spin`] or [`RosNode::spin_once`].
    #[must_use = "dropping the subscription unsubscribes"]
    fn create_subscriber<T, F>(
        &self,
        topic: &str,
        queue_size: usize,
        callback: F,
    ) -> Result<Self::Subscription<T>>
    where
        T: TypeSupport,
        F: FnMut(Self::Received<T>) + 'static;

    /// Read a parameter.
    ///
    /// `None` when the parameter is not set or has an incompatible type.
    fn parameter<V: ParamValue>(&self, name: &str) -> Option<V>;

    /// Read a parameter into `out`.
    ///
    /// Returns `false`, leaving `out` untouched, when the parameter is not
    /// set or has an incompatible type.
    fn get_parameter<V: ParamValue>(&self, name: &str, out: &mut V) -> bool {
        match self.parameter(name) {
            Some(value) => {
                *out = value;
                true
            }
            None => false,
        }
    }

    /// Read a parameter into `out`, or write `default` when it is missing.
    ///
    /// The default is not stored.
    fn get_parameter_or<V: ParamValue>(&self, name: &str, out: &mut V, default: V) {
        *out = self.parameter(name).unwrap_or(default);
    }

    /// Set a parameter, declaring it if needed. Any previous type is
    /// replaced.
    fn set_parameter<V: ParamValue>(&self, name: &str, value: V);

    /// Current time of the node's clock.
    fn now(&self) -> Time;

    /// Run one dispatch cycle, waiting up to `timeout` for work.
    fn spin_once(&self, timeout: Duration) -> Result<()>;

    /// Dispatch callbacks until shutdown is requested.
    fn spin(&self) -> Result<()>;

    /// Handle that stops [`RosNode::spin`] from any thread.
    fn shutdown_handle(&self) -> ShutdownHandle;

    /// Whether the node is still running.
    fn ok(&self) -> bool {
        !self.shutdown_handle().is_shutdown()
    }
}

// ============================================================================
// Publisher Trait
// ============================================================================

/// A publisher handle.
pub trait RosPublisher<T: TypeSupport> {
    /// Get the fully qualified topic name.
    fn topic_name(&self) -> &str;

    /// Publish a message to every matching subscriber.
    fn publish(&self, msg: &T) -> Result<()>;

    /// Number of subscribers currently matched with this publisher.
    ///
    /// Never fails. It may lag the true count by one backend update cycle.
    fn subscriber_count(&self) -> usize;
}
