//! Core traits and types for the roscompat ROS1/ROS2 compatibility layer.
//!
//! This crate holds everything that does not depend on a backend: the
//! [`RosNode`]/[`RosPublisher`] traits, naming rules, parameter values,
//! time and clock, the subscriber-count watch and the message catalog.
//! `roscompat-ros1` and `roscompat-ros2` implement the traits on their own
//! runtime model.

pub mod api;
pub mod clock;
pub mod error;
pub mod init;
#[cfg(feature = "logging")]
pub mod logger;
pub mod message;
pub mod msg;
pub mod names;
pub mod parameter;
pub mod shutdown;
pub mod status;
pub mod time;

// Re-export commonly used error types
pub use error::{DynError, Error, Result};

// Re-export API traits
pub use api::{RosNode, RosPublisher};

pub use clock::{Clock, ClockSource};
pub use init::InitOptions;
pub use message::TakenMsg;
pub use msg::TypeSupport;
pub use parameter::{ParamValue, Parameters, Value};
pub use shutdown::ShutdownHandle;
pub use status::SubscriberCountWatch;
pub use time::Time;
