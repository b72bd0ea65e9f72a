//! Write a ROS node once, build it for ROS1 or ROS2.
//!
//! The backend is chosen at build time:
//!
//! - `ros2` (default) - owned publishers, asynchronous graph discovery,
//!   subscriber-connect notification emulated with a timer
//! - `ros1` - master registry, callback queue, native connect callbacks
//!
//! Both backends implement [`RosNode`] and [`RosPublisher`], so code written
//! against the traits and the names re-exported here builds unchanged with
//! either feature.
//!
//! # Example
//!
//! ```no_run
//! use roscompat::prelude::*;
//!
//! fn main() -> roscompat::Result<()> {
//!     let node = roscompat::init("detectnet", std::env::args())?;
//!
//!     let mut threshold = 0.5_f64;
//!     node.get_parameter_or("threshold", &mut threshold, 0.5);
//!
//!     let detections = node.create_publisher::<vision_msgs::Detection2DArray>("detections", 25)?;
//!     let _images = node.create_subscriber("image_in", 5, move |img: Received<sensor_msgs::Image>| {
//!         ros_info!(width = img.width, "processing image");
//!         let _ = detections.publish(&vision_msgs::Detection2DArray::default());
//!     })?;
//!
//!     node.spin()
//! }
//! ```

// Compile-time check: ensure exactly one backend is selected
#[cfg(all(feature = "ros1", feature = "ros2"))]
compile_error!(
    "Features `ros1` and `ros2` are mutually exclusive. Use `--no-default-features --features ros1` for ROS1."
);

#[cfg(not(any(feature = "ros1", feature = "ros2")))]
compile_error!("No backend selected. Enable one of: `ros1`, `ros2`.");

pub mod prelude;

// Re-export the selected backend
#[cfg(all(feature = "ros1", not(feature = "ros2")))]
pub use roscompat_ros1::{
    self as backend, Node, POLL_INTERVAL, Publisher, Runtime, Subscription, args, init, msg,
};

#[cfg(all(feature = "ros2", not(feature = "ros1")))]
pub use roscompat_ros2::{
    self as backend, Node, POLL_INTERVAL, Publisher, Runtime, Subscription, args, init, msg,
};

/// Name of the selected backend.
#[cfg(all(feature = "ros1", not(feature = "ros2")))]
pub const BACKEND: &str = "ros1";

/// Name of the selected backend.
#[cfg(all(feature = "ros2", not(feature = "ros1")))]
pub const BACKEND: &str = "ros2";

/// What a subscriber callback receives: `Arc<T>` with ROS1, `TakenMsg<T>`
/// with ROS2. Both deref to `T`.
#[cfg(any(feature = "ros1", feature = "ros2"))]
pub type Received<T> = <Node as RosNode>::Received<T>;

// Always re-export core types and traits
pub use roscompat_core::{
    self, Clock, Error, InitOptions, ParamValue, Result, RosNode, RosPublisher, ShutdownHandle,
    TakenMsg, Time, TypeSupport, Value, api, error, logger::init_ros_logging,
};

// Logging
pub use tracing::{debug, error, info, trace, warn};

#[doc(hidden)]
pub use tracing as __tracing;

/// Log at info level, like `ROS_INFO`.
///
/// ```
/// roscompat::ros_info!("detectnet ready");
/// roscompat::ros_info!(threshold = 0.5, "detectnet ready");
/// ```
#[macro_export]
macro_rules! ros_info {
    ($($arg:tt)*) => {
        $crate::__tracing::info!($($arg)*)
    };
}

/// Log at error level, like `ROS_ERROR`.
///
/// ```
/// roscompat::ros_error!("failed to load network");
/// ```
#[macro_export]
macro_rules! ros_error {
    ($($arg:tt)*) => {
        $crate::__tracing::error!($($arg)*)
    };
}
