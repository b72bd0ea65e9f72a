//! ROS2-style backend of roscompat.
//!
//! This crate realises the roscompat node API on the ROS2 object model:
//!
//! - a [`Runtime`] stands for a middleware session and yields one [`Node`]
//! - [`Publisher`]s are reference-counted owners; cloning shares them
//! - graph discovery is asynchronous: the [`GraphCache`] folds announcements
//!   in at the start of every dispatch cycle
//! - there is no subscriber-connect notification, so
//!   `create_publisher_with_status` polls the subscriber count on an
//!   executor timer
//! - subscription queues are polled by the [`Selector`] during `spin`
//!
//! # Example
//!
//! ```
//! use roscompat_core::{RosNode, RosPublisher};
//! use roscompat_ros2::{Runtime, msg::sensor_msgs};
//! use std::time::Duration;
//!
//! let node = Runtime::with_domain_id(0).init("detectnet", ["detectnet"])?;
//! let overlay = node.create_publisher::<sensor_msgs::Image>("overlay", 2)?;
//! let _viewer = node.create_subscriber("overlay", 2, |img: roscompat_core::TakenMsg<sensor_msgs::Image>| {
//!     tracing::info!(width = img.width, "overlay received");
//! })?;
//!
//! node.spin_once(Duration::ZERO)?;
//! assert_eq!(overlay.subscriber_count(), 1);
//! # Ok::<(), roscompat_core::Error>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod args;
mod context;
pub mod graph_cache;
#[allow(missing_docs)]
pub mod msg;
mod node;
pub mod parameter;
pub mod selector;
pub mod topic;
mod transport;

// Re-exports
pub use context::{POLL_INTERVAL, ROS_DOMAIN_ID, Runtime, init};
pub use graph_cache::GraphCache;
pub use node::Node;
pub use selector::{CallbackResult, Selector};
pub use topic::{publisher::Publisher, subscriber::Subscription};

// Re-export core types
pub use roscompat_core::{
    Error, InitOptions, ParamValue, Result, RosNode, RosPublisher, ShutdownHandle, TakenMsg,
    Time, TypeSupport, Value,
};
