//! Runtime and execution context.
//!
//! A [`Runtime`] accepts exactly one bootstrap, which yields the [`Node`].
//! The node owns the [`Context`]: the master and the callback queue. Every
//! handle the node gives out refers back to it weakly.

use crate::{
    args::{ROS_NAMESPACE, parse_ros_args},
    callback_queue::CallbackQueue,
    master::{EntityId, Master, SubscriptionQueue},
    node::Node,
};
use roscompat_core::{
    TypeSupport,
    error::{Error, Result},
    init::{InitOptions, claim_process},
    names,
    shutdown::ShutdownHandle,
};
use std::{
    cell::{Cell, Ref, RefCell, RefMut},
    env,
    rc::Rc,
    time::{Duration, Instant},
};

/// Longest sleep between two checks of the callback queue.
pub const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// State shared by the node and every handle it creates.
pub(crate) struct Context {
    shutdown: ShutdownHandle,
    master: RefCell<Master>,
    callback_queue: CallbackQueue,
}

impl Context {
    fn new(shutdown: ShutdownHandle) -> Self {
        Self {
            shutdown,
            master: RefCell::new(Master::default()),
            callback_queue: CallbackQueue::default(),
        }
    }

    pub(crate) fn shutdown_handle(&self) -> &ShutdownHandle {
        &self.shutdown
    }

    pub(crate) fn master(&self) -> Ref<'_, Master> {
        self.master.borrow()
    }

    pub(crate) fn master_mut(&self) -> RefMut<'_, Master> {
        self.master.borrow_mut()
    }

    pub(crate) fn advertise<T: TypeSupport>(
        &self,
        node: &str,
        topic: &str,
        connect: Option<Box<dyn FnMut()>>,
    ) -> EntityId {
        self.master
            .borrow_mut()
            .register_publisher::<T>(node, topic, connect, &self.callback_queue)
    }

    pub(crate) fn subscribe<T: TypeSupport>(
        &self,
        node: &str,
        topic: &str,
        queue: Rc<SubscriptionQueue<T>>,
    ) -> EntityId {
        self.master
            .borrow_mut()
            .register_subscriber(node, topic, queue, &self.callback_queue)
    }

    pub(crate) fn publish<T: TypeSupport>(&self, id: EntityId, msg: &T) -> Option<usize> {
        self.master.borrow().publish(id, msg, &self.callback_queue)
    }

    /// Drain the callback queue, waiting up to `timeout` when it is empty.
    /// At least one drain always runs.
    pub(crate) fn spin_once(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;

        loop {
            let processed = self.callback_queue.call_available();
            if processed > 0 || self.shutdown.is_shutdown() || !self.callback_queue.is_empty() {
                break;
            }

            let now = Instant::now();
            if now >= deadline {
                break;
            }
            std::thread::sleep((deadline - now).min(POLL_INTERVAL));
        }

        Ok(())
    }
}

/// An in-process ROS1 session.
///
/// # Example
///
/// ```
/// use roscompat_ros1::Runtime;
/// use roscompat_core::RosNode;
///
/// let runtime = Runtime::with_namespace("/");
/// let node = runtime.init("detectnet", ["detectnet"])?;
/// assert_eq!(node.namespace(), "/detectnet");
///
/// // one node per runtime
/// assert!(runtime.init("detectnet", ["detectnet"]).is_err());
/// # Ok::<(), roscompat_core::Error>(())
/// ```
pub struct Runtime {
    namespace: String,
    initialized: Cell<bool>,
}

impl Runtime {
    /// Create a runtime, taking the default namespace from `ROS_NAMESPACE`
    /// (default: root).
    pub fn new() -> Self {
        let namespace = env::var(ROS_NAMESPACE).unwrap_or_else(|_| "/".to_string());
        Self::with_namespace(namespace)
    }

    /// Create a runtime with a specific default namespace. `__ns:=` on the
    /// command line still overrides it.
    pub fn with_namespace(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            initialized: Cell::new(false),
        }
    }

    /// Whether the runtime has been bootstrapped.
    pub fn is_initialized(&self) -> bool {
        self.initialized.get()
    }

    /// Bootstrap the runtime with default options.
    pub fn init<I, S>(&self, name: &str, args: I) -> Result<Node>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.init_with_options(name, args, InitOptions::default())
    }

    /// Bootstrap the runtime.
    ///
    /// This will:
    /// 1. Parse the `:=` arguments
    /// 2. Apply `__name`/`__ns` and validate the names
    /// 3. Create the node with a private handle on `<ns>/<name>`
    /// 4. Store the `_param:=value` arguments as private parameters
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyInit`] on a second call, or an argument or
    /// name error.
    pub fn init_with_options<I, S>(&self, name: &str, args: I, options: InitOptions) -> Result<Node>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if self.initialized.get() {
            tracing::error!(node = name, "runtime already initialized");
            return Err(Error::AlreadyInit);
        }

        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        let (ros_args, _user_args) = parse_ros_args(&args)?;

        if options.init_logging {
            roscompat_core::logger::init_ros_logging_with_level(
                name,
                ros_args.log_level.as_deref(),
            );
        }

        let node_name = ros_args.node_name.clone().unwrap_or_else(|| name.to_string());
        names::validate_node_name(&node_name)?;
        let namespace = names::normalize_namespace(
            ros_args.namespace.as_deref().unwrap_or(&self.namespace),
        )?;

        let shutdown = ShutdownHandle::new();
        if options.install_signal_handlers {
            shutdown.install_signal_handlers()?;
        }

        let context = Rc::new(Context::new(shutdown));
        let node = Node::new(context, &node_name, &namespace, ros_args)?;
        self.initialized.set(true);

        tracing::info!(node = %node_name, namespace = %namespace, "node initialized");
        Ok(node)
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

/// Bootstrap the process.
///
/// Claims the process, initializes logging and installs SIGINT/SIGTERM
/// handlers stopping `spin`. Succeeds once per process; a failed bootstrap
/// leaves the process unclaimed.
///
/// ```ignore
/// let node = roscompat_ros1::init("detectnet", std::env::args())?;
/// ```
pub fn init<I, S>(name: &str, args: I) -> Result<Node>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let claim = claim_process(name)?;
    let node = Runtime::new().init_with_options(name, args, InitOptions::process())?;
    claim.keep();
    Ok(node)
}
