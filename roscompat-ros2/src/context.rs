//! Runtime and execution context.
//!
//! A [`Runtime`] stands for one middleware session. It accepts exactly one
//! bootstrap, which yields the [`Node`]. Everything the node creates shares
//! the runtime's [`Context`]: the graph cache, the data plane and the
//! selector.

use crate::{
    args::parse_ros_args,
    graph_cache::{GraphCache, GraphEvent},
    node::Node,
    selector::Selector,
    transport::Transport,
};
use roscompat_core::{
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

/// Environment variable for ROS domain ID.
pub const ROS_DOMAIN_ID: &str = "ROS_DOMAIN_ID";

/// Longest sleep between two polls of the subscription queues.
pub const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// State shared by the node and every entity it creates.
pub(crate) struct Context {
    domain_id: u32,
    options: InitOptions,
    shutdown: ShutdownHandle,
    graph_cache: RefCell<GraphCache>,
    transport: RefCell<Transport>,
    selector: Selector,
}

impl Context {
    fn new(domain_id: u32, options: InitOptions, shutdown: ShutdownHandle) -> Self {
        Self {
            domain_id,
            options,
            shutdown,
            graph_cache: RefCell::new(GraphCache::new()),
            transport: RefCell::new(Transport::default()),
            selector: Selector::new(),
        }
    }

    pub(crate) fn domain_id(&self) -> u32 {
        self.domain_id
    }

    pub(crate) fn options(&self) -> &InitOptions {
        &self.options
    }

    pub(crate) fn shutdown_handle(&self) -> &ShutdownHandle {
        &self.shutdown
    }

    pub(crate) fn graph_cache(&self) -> Ref<'_, GraphCache> {
        self.graph_cache.borrow()
    }

    pub(crate) fn transport(&self) -> Ref<'_, Transport> {
        self.transport.borrow()
    }

    pub(crate) fn transport_mut(&self) -> RefMut<'_, Transport> {
        self.transport.borrow_mut()
    }

    pub(crate) fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Queue a discovery announcement.
    pub(crate) fn announce(&self, event: GraphEvent) {
        self.graph_cache.borrow_mut().announce(event);
    }

    /// Run dispatch cycles until one does work, `timeout` elapses or
    /// shutdown is requested. At least one cycle always runs.
    pub(crate) fn spin_once(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;

        loop {
            // announcements made before this cycle become visible to it
            self.graph_cache.borrow_mut().refresh();

            let processed = self.selector.dispatch();
            if processed > 0 || self.shutdown.is_shutdown() {
                break;
            }

            let now = Instant::now();
            if now >= deadline {
                break;
            }

            let wake = self
                .selector
                .next_deadline()
                .map_or(deadline, |t| t.min(deadline));
            let sleep_time = wake.saturating_duration_since(now).min(POLL_INTERVAL);
            if sleep_time > Duration::ZERO {
                std::thread::sleep(sleep_time);
            }
        }

        Ok(())
    }
}

/// An in-process ROS2 session.
///
/// # Example
///
/// ```
/// use roscompat_ros2::Runtime;
/// use roscompat_core::RosNode;
///
/// let runtime = Runtime::with_domain_id(0);
/// let node = runtime.init("detectnet", ["detectnet"])?;
/// assert_eq!(node.namespace(), "/detectnet");
///
/// // one node per runtime
/// assert!(runtime.init("detectnet", ["detectnet"]).is_err());
/// # Ok::<(), roscompat_core::Error>(())
/// ```
pub struct Runtime {
    domain_id: u32,
    initialized: Cell<bool>,
}

impl Runtime {
    /// Create a runtime, reading `ROS_DOMAIN_ID` from the environment
    /// (default: 0).
    pub fn new() -> Self {
        let domain_id = env::var(ROS_DOMAIN_ID)
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(0);

        Self::with_domain_id(domain_id)
    }

    /// Create a runtime with a specific domain ID.
    pub fn with_domain_id(domain_id: u32) -> Self {
        Self {
            domain_id,
            initialized: Cell::new(false),
        }
    }

    /// Get the ROS domain ID.
    pub fn domain_id(&self) -> u32 {
        self.domain_id
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
    /// 1. Parse the `--ros-args` sections of `args`
    /// 2. Apply `__node`/`__ns` remappings and validate the names
    /// 3. Create the node in its private namespace `<ns>/<name>`
    /// 4. Load `--params-file` files then `-p` assignments
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
        let base_namespace =
            names::normalize_namespace(ros_args.namespace.as_deref().unwrap_or("/"))?;
        let namespace = names::build_node_fqn(&base_namespace, &node_name);

        let shutdown = ShutdownHandle::new();
        if options.install_signal_handlers {
            shutdown.install_signal_handlers()?;
        }

        let context = Rc::new(Context::new(self.domain_id, options, shutdown));
        let node = Node::new(context, &node_name, &namespace, ros_args)?;
        self.initialized.set(true);

        tracing::info!(
            node = %node_name,
            namespace = %namespace,
            domain_id = self.domain_id,
            "node initialized"
        );
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
/// let node = roscompat_ros2::init("detectnet", std::env::args())?;
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
