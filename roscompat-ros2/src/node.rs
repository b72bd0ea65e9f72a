//! ROS2 Node abstraction.
//!
//! The [`Node`] is the execution context returned by bootstrap. It owns the
//! parameters and the clock, and creates publishers and subscriptions that
//! share the runtime's graph cache, data plane and selector.

use crate::{
    args::RosArgs,
    context::{Context, POLL_INTERVAL},
    graph_cache::{EntityInfo, EntityKind, GraphCache, GraphEvent},
    parameter::load_startup_parameters,
    selector::CallbackResult,
    topic::{publisher::Publisher, subscriber::Subscription},
};
use roscompat_core::{
    Clock, ClockSource, ParamValue, Parameters, Result, RosNode, ShutdownHandle,
    SubscriberCountWatch, TakenMsg, Time, TypeSupport,
    clock::{CLOCK_TOPIC, USE_SIM_TIME},
    msg::rosgraph_msgs,
    names::{self, RemapRule},
};
use std::{cell::RefCell, rc::Rc, time::Duration};
use uuid::Uuid;

/// ROS2 Node.
///
/// The node lives in its private namespace: a node bootstrapped as
/// `detectnet` reports the namespace `/detectnet`, and relative topics
/// resolve under it.
///
/// # Example
///
/// ```
/// use roscompat_ros2::{Runtime, msg::vision_msgs::Detection2DArray};
/// use roscompat_core::{RosNode, RosPublisher};
///
/// let node = Runtime::with_domain_id(0).init("detectnet", ["detectnet"])?;
/// let publisher = node.create_publisher::<Detection2DArray>("detections", 25)?;
/// assert_eq!(publisher.topic_name(), "/detectnet/detections");
/// # Ok::<(), roscompat_core::Error>(())
/// ```
pub struct Node {
    context: Rc<Context>,
    /// Node name.
    name: String,
    /// Node namespace.
    namespace: String,
    /// Node GID.
    gid: Uuid,
    remap_rules: Vec<RemapRule>,
    params: RefCell<Parameters>,
    clock: Rc<Clock>,
    clock_subscription: Option<Subscription<rosgraph_msgs::Clock>>,
}

impl Node {
    /// Create a new node.
    pub(crate) fn new(
        context: Rc<Context>,
        name: &str,
        namespace: &str,
        ros_args: RosArgs,
    ) -> Result<Self> {
        let fqn = names::build_node_fqn(namespace, name);
        let params = load_startup_parameters(&ros_args, &fqn)?;

        let use_sim_time = params
            .get(USE_SIM_TIME)
            .and_then(bool::from_value)
            .unwrap_or(false);
        let clock = Rc::new(Clock::new(if use_sim_time {
            ClockSource::Simulated
        } else {
            ClockSource::Wall
        }));

        let gid = Uuid::new_v4();
        context.announce(GraphEvent::Put(EntityInfo {
            gid,
            domain_id: context.domain_id(),
            kind: EntityKind::Node,
            namespace: namespace.to_string(),
            node_name: name.to_string(),
            topic_name: None,
            type_name: None,
        }));

        let mut node = Node {
            context,
            name: name.to_string(),
            namespace: namespace.to_string(),
            gid,
            remap_rules: ros_args.remap_rules,
            params: RefCell::new(params),
            clock,
            clock_subscription: None,
        };

        if use_sim_time {
            let clock = Rc::clone(&node.clock);
            node.clock_subscription = Some(node.create_subscriber(
                CLOCK_TOPIC,
                1,
                move |msg: TakenMsg<rosgraph_msgs::Clock>| clock.set_sim_time(msg.clock),
            )?);
            tracing::info!(node = name, "using simulated time from {CLOCK_TOPIC}");
        }

        Ok(node)
    }

    /// Get the node name.
    pub fn get_name(&self) -> &str {
        &self.name
    }

    /// Get the node namespace.
    pub fn get_namespace(&self) -> &str {
        &self.namespace
    }

    /// Get the node GID.
    pub fn gid(&self) -> &Uuid {
        &self.gid
    }

    /// Get the ROS domain ID.
    pub fn domain_id(&self) -> u32 {
        self.context.domain_id()
    }

    /// Get a snapshot of the graph cache.
    pub fn graph_cache(&self) -> GraphCache {
        self.context.graph_cache().clone()
    }

    /// Get the node clock.
    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub(crate) fn context(&self) -> &Rc<Context> {
        &self.context
    }

    /// Expand a topic name to its fully qualified form and apply remapping rules.
    pub fn expand_and_remap_name(&self, name: &str) -> Result<String> {
        names::resolve_topic_name(&self.namespace, &self.name, name, &self.remap_rules)
    }
}

impl Drop for Node {
    fn drop(&mut self) {
        self.context.announce(GraphEvent::Delete(self.gid));
    }
}

// ============================================================================
// RosNode trait implementation
// ============================================================================

impl RosNode for Node {
    type Publisher<T: TypeSupport> = Publisher<T>;
    type Subscription<T: TypeSupport> = Subscription<T>;
    type Received<T: TypeSupport> = TakenMsg<T>;

    fn name(&self) -> &str {
        &self.name
    }

    fn namespace(&self) -> String {
        self.namespace.clone()
    }

    fn fully_qualified_name(&self) -> String {
        names::build_node_fqn(&self.namespace, &self.name)
    }

    fn create_publisher<T: TypeSupport>(
        &self,
        topic: &str,
        queue_size: usize,
    ) -> Result<Publisher<T>> {
        let fq_topic_name = self.expand_and_remap_name(topic)?;
        Ok(Publisher::new(self, &fq_topic_name, queue_size))
    }

    /// There is no connect notification in this backend: a timer samples
    /// the subscriber count every `status_poll_period` and calls
    /// `on_subscriber` once per observed increase. Increases happening
    /// between two samples are coalesced. The timer stops once every clone
    /// of the publisher is dropped.
    fn create_publisher_with_status<T, F>(
        &self,
        topic: &str,
        queue_size: usize,
        mut on_subscriber: F,
    ) -> Result<Publisher<T>>
    where
        T: TypeSupport,
        F: FnMut() + 'static,
    {
        let publisher = self.create_publisher::<T>(topic, queue_size)?;
        let period = self.context.options().status_poll_period;

        let weak = publisher.downgrade();
        let mut watch = SubscriberCountWatch::new();
        self.context.selector().add_timer(
            period,
            Box::new(move || {
                let Some(publisher) = weak.upgrade() else {
                    return CallbackResult::Remove;
                };
                if watch.observe(publisher.subscriber_count()) {
                    tracing::debug!(subscribers = watch.last(), "subscriber count increased");
                    on_subscriber();
                }
                CallbackResult::Ok
            }),
        );

        Ok(publisher)
    }

    fn create_subscriber<T, F>(
        &self,
        topic: &str,
        queue_size: usize,
        callback: F,
    ) -> Result<Subscription<T>>
    where
        T: TypeSupport,
        F: FnMut(TakenMsg<T>) + 'static,
    {
        let fq_topic_name = self.expand_and_remap_name(topic)?;
        Ok(Subscription::new(
            self,
            &fq_topic_name,
            queue_size,
            Box::new(callback),
        ))
    }

    fn parameter<V: ParamValue>(&self, name: &str) -> Option<V> {
        self.params
            .borrow()
            .get(name)
            .and_then(V::from_value)
    }

    fn set_parameter<V: ParamValue>(&self, name: &str, value: V) {
        self.params
            .borrow_mut()
            .set(name.to_string(), value.into_value());
    }

    fn now(&self) -> Time {
        self.clock.now()
    }

    fn spin_once(&self, timeout: Duration) -> Result<()> {
        self.context.spin_once(timeout)
    }

    fn spin(&self) -> Result<()> {
        tracing::debug!(node = %self.name, "spinning");
        let shutdown = self.context.shutdown_handle();
        while !shutdown.is_shutdown() {
            self.context.spin_once(POLL_INTERVAL)?;
        }
        tracing::info!(node = %self.name, "shutting down");
        Ok(())
    }

    fn shutdown_handle(&self) -> ShutdownHandle {
        self.context.shutdown_handle().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Runtime;

    fn node(args: &[&str]) -> Node {
        Runtime::with_domain_id(0)
            .init("detectnet", args.iter().copied())
            .unwrap()
    }

    #[test]
    fn test_private_namespace() {
        let node = node(&["detectnet"]);
        assert_eq!(node.namespace(), "/detectnet");
        assert_eq!(node.fully_qualified_name(), "/detectnet/detectnet");
        assert_eq!(
            node.expand_and_remap_name("overlay").unwrap(),
            "/detectnet/overlay"
        );
        assert_eq!(node.expand_and_remap_name("/abs").unwrap(), "/abs");
    }

    #[test]
    fn test_ns_and_node_remap() {
        let node = node(&[
            "detectnet",
            "--ros-args",
            "-r",
            "__ns:=/robot",
            "-r",
            "__node:=detector",
            "-r",
            "image_in:=/camera/image_raw",
        ]);
        assert_eq!(RosNode::name(&node), "detector");
        assert_eq!(node.namespace(), "/robot/detector");
        assert_eq!(
            node.expand_and_remap_name("image_in").unwrap(),
            "/camera/image_raw"
        );
    }

    #[test]
    fn test_invalid_names() {
        let runtime = Runtime::with_domain_id(0);
        assert!(runtime.init("9lives", ["x"]).is_err());
        assert!(!runtime.is_initialized());

        let node = runtime.init("ok", ["x"]).unwrap();
        assert!(node.create_publisher::<rosgraph_msgs::Clock>("bad//topic", 1).is_err());
    }

    #[test]
    fn test_graph_sees_node_after_refresh() {
        let node = node(&["detectnet"]);
        assert!(node.graph_cache().get_node_names().is_empty());
        node.spin_once(Duration::ZERO).unwrap();
        assert_eq!(
            node.graph_cache().get_node_names(),
            vec!["/detectnet/detectnet".to_string()]
        );
    }
}
