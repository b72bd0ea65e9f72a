//! ROS1 Node abstraction.
//!
//! The [`Node`] plays the part of a private node handle (`~`): relative
//! topic and parameter names resolve under `<ns>/<name>`. It owns the
//! execution context, so every publisher and subscription handle becomes
//! inert once the node is dropped.

use crate::{
    args::RosArgs,
    context::{Context, POLL_INTERVAL},
    topic::{publisher::Publisher, subscriber::Subscription},
};
use roscompat_core::{
    Clock, ClockSource, ParamValue, Result, RosNode, ShutdownHandle, Time, TypeSupport,
    clock::{CLOCK_TOPIC, USE_SIM_TIME},
    msg::rosgraph_msgs,
    names::{self, RemapRule},
    parameter::Value,
};
use std::{rc::Rc, sync::Arc, time::Duration};

/// ROS1 Node.
///
/// # Example
///
/// ```
/// use roscompat_ros1::{Runtime, msg::vision_msgs::Detection2DArray};
/// use roscompat_core::{RosNode, RosPublisher};
///
/// let node = Runtime::with_namespace("/").init("detectnet", ["detectnet"])?;
/// let publisher = node.create_publisher::<Detection2DArray>("detections", 25)?;
/// assert_eq!(publisher.topic_name(), "/detectnet/detections");
/// # Ok::<(), roscompat_core::Error>(())
/// ```
pub struct Node {
    context: Rc<Context>,
    /// Node base name.
    name: String,
    /// Namespace the node was started in.
    namespace: String,
    /// `<namespace>/<name>`, the namespace of the private handle.
    private_namespace: String,
    remappings: Vec<RemapRule>,
    clock: Rc<Clock>,
    clock_subscription: Option<Subscription<rosgraph_msgs::Clock>>,
}

impl Node {
    pub(crate) fn new(
        context: Rc<Context>,
        name: &str,
        namespace: &str,
        ros_args: RosArgs,
    ) -> Result<Self> {
        let private_namespace = names::build_node_fqn(namespace, name);

        {
            let mut master = context.master_mut();
            for (param, value) in ros_args.private_params {
                master.set_param(format!("{private_namespace}/{param}"), value);
            }
        }

        let mut node = Node {
            context,
            name: name.to_string(),
            namespace: namespace.to_string(),
            private_namespace,
            remappings: ros_args.remappings,
            clock: Rc::new(Clock::new(ClockSource::Wall)),
            clock_subscription: None,
        };

        // `/use_sim_time` is global in ROS1; a private `_use_sim_time:=true`
        // is honoured as well
        let use_sim_time = node
            .parameter::<bool>(&format!("/{USE_SIM_TIME}"))
            .or_else(|| node.parameter::<bool>(USE_SIM_TIME))
            .unwrap_or(false);
        if use_sim_time {
            let clock = Rc::new(Clock::new(ClockSource::Simulated));
            let sink = Rc::clone(&clock);
            node.clock = clock;
            node.clock_subscription = Some(node.create_subscriber(
                CLOCK_TOPIC,
                1,
                move |msg: Arc<rosgraph_msgs::Clock>| sink.set_sim_time(msg.clock),
            )?);
            tracing::info!(node = name, "using simulated time from {CLOCK_TOPIC}");
        }

        Ok(node)
    }

    /// Get the node base name.
    pub fn get_name(&self) -> &str {
        &self.name
    }

    /// Namespace the node was started in, as opposed to the private
    /// namespace reported by [`RosNode::namespace`].
    pub fn get_namespace(&self) -> &str {
        &self.namespace
    }

    /// Get the node clock.
    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub(crate) fn context(&self) -> &Rc<Context> {
        &self.context
    }

    /// Resolve a topic name and apply the remappings.
    ///
    /// Relative names resolve in the private namespace, `~` names under the
    /// node name, absolute names are kept.
    pub fn resolve_name(&self, name: &str) -> Result<String> {
        if name.starts_with('~') {
            names::resolve_topic_name(&self.namespace, &self.name, name, &self.remappings)
        } else {
            names::resolve_topic_name(
                &self.private_namespace,
                &self.name,
                name,
                &self.remappings,
            )
        }
    }

    /// Resolve a parameter name against the private namespace.
    pub fn resolve_param_name(&self, name: &str) -> String {
        if name.starts_with('/') {
            return name.to_string();
        }
        let relative = name
            .strip_prefix("~/")
            .or_else(|| name.strip_prefix('~'))
            .unwrap_or(name);
        if relative.is_empty() {
            self.private_namespace.clone()
        } else {
            format!("{}/{relative}", self.private_namespace)
        }
    }

    /// Whether a parameter is set.
    pub fn has_parameter(&self, name: &str) -> bool {
        self.context
            .master()
            .get_param(&self.resolve_param_name(name))
            .is_some()
    }

    /// Delete a parameter. Returns `false` when it was not set.
    pub fn delete_parameter(&self, name: &str) -> bool {
        let name = self.resolve_param_name(name);
        self.context.master_mut().delete_param(&name)
    }

    /// Every parameter on the master, fully qualified.
    pub fn parameter_names(&self) -> Vec<String> {
        self.context.master().param_names()
    }

    /// Advertised topics with their types.
    pub fn published_topics(&self) -> Vec<(String, String)> {
        self.context.master().published_topics()
    }

    /// Nodes known to the master.
    pub fn node_names(&self) -> Vec<String> {
        self.context.master().node_names()
    }
}

// ============================================================================
// RosNode trait implementation
// ============================================================================

impl RosNode for Node {
    type Publisher<T: TypeSupport> = Publisher<T>;
    type Subscription<T: TypeSupport> = Subscription<T>;
    type Received<T: TypeSupport> = Arc<T>;

    fn name(&self) -> &str {
        &self.name
    }

    fn namespace(&self) -> String {
        self.private_namespace.clone()
    }

    fn fully_qualified_name(&self) -> String {
        self.private_namespace.clone()
    }

    fn create_publisher<T: TypeSupport>(
        &self,
        topic: &str,
        queue_size: usize,
    ) -> Result<Publisher<T>> {
        let topic = self.resolve_name(topic)?;
        Ok(Publisher::new(self, &topic, queue_size, None))
    }

    /// The master queues one connect callback per matching subscriber,
    /// including those registered before the publisher.
    fn create_publisher_with_status<T, F>(
        &self,
        topic: &str,
        queue_size: usize,
        on_subscriber: F,
    ) -> Result<Publisher<T>>
    where
        T: TypeSupport,
        F: FnMut() + 'static,
    {
        let topic = self.resolve_name(topic)?;
        Ok(Publisher::new(
            self,
            &topic,
            queue_size,
            Some(Box::new(on_subscriber)),
        ))
    }

    fn create_subscriber<T, F>(
        &self,
        topic: &str,
        queue_size: usize,
        callback: F,
    ) -> Result<Subscription<T>>
    where
        T: TypeSupport,
        F: FnMut(Arc<T>) + 'static,
    {
        let topic = self.resolve_name(topic)?;
        Ok(Subscription::new(self, &topic, queue_size, Box::new(callback)))
    }

    fn parameter<V: ParamValue>(&self, name: &str) -> Option<V> {
        let name = self.resolve_param_name(name);
        self.context.master().get_param(&name).and_then(V::from_value)
    }

    fn set_parameter<V: ParamValue>(&self, name: &str, value: V) {
        let name = self.resolve_param_name(name);
        let value: Value = value.into_value();
        self.context.master_mut().set_param(name, value);
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
