//! ROS1-style backend of roscompat.
//!
//! This crate realises the roscompat node API on the ROS1 object model:
//!
//! - a [`Runtime`] yields one [`Node`], which acts as a private (`~`) node
//!   handle
//! - an in-process master owns every publisher; [`Publisher`] is a handle
//!   into it
//! - registration is immediate, so subscriber counts are never stale
//! - publishers can ask for a connect callback, queued once per new
//!   matching subscriber
//! - every event goes through one callback queue, drained by `spin`
//!
//! # Example
//!
//! ```
//! use roscompat_core::{RosNode, RosPublisher};
//! use roscompat_ros1::{Runtime, msg::sensor_msgs};
//! use std::{sync::Arc, time::Duration};
//!
//! let node = Runtime::with_namespace("/").init("detectnet", ["detectnet"])?;
//! let overlay = node.create_publisher::<sensor_msgs::Image>("overlay", 2)?;
//! let _viewer = node.create_subscriber("overlay", 2, |img: Arc<sensor_msgs::Image>| {
//!     tracing::info!(width = img.width, "overlay received");
//! })?;
//! assert_eq!(overlay.subscriber_count(), 1);
//!
//! overlay.publish(&sensor_msgs::Image::default())?;
//! node.spin_once(Duration::ZERO)?;
//! # Ok::<(), roscompat_core::Error>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod args;
mod callback_queue;
mod context;
mod master;
#[allow(missing_docs)]
pub mod msg;
mod node;
pub mod topic;

// Re-exports
pub use context::{POLL_INTERVAL, Runtime, init};
pub use node::Node;
pub use topic::{publisher::Publisher, subscriber::Subscription};

// Re-export core types
pub use roscompat_core::{
    Error, InitOptions, ParamValue, Result, RosNode, RosPublisher, ShutdownHandle, Time,
    TypeSupport, Value,
};
