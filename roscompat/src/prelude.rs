//! Prelude module for convenient imports.
//!
//! ```ignore
//! use roscompat::prelude::*;
//!
//! let node = roscompat::init("detectnet", std::env::args())?;
//! let publisher = node.create_publisher::<vision_msgs::Detection2DArray>("detections", 25)?;
//! ```

// Re-export error types
pub use roscompat_core::error::{Error, Result};

// Re-export API traits
pub use roscompat_core::api::{RosNode, RosPublisher};

pub use roscompat_core::{InitOptions, ParamValue, ShutdownHandle, Time, TypeSupport, Value};

// Backend types
pub use crate::{Node, Publisher, Received, Runtime, Subscription};

// Message packages
pub use crate::msg::{geometry_msgs, rosgraph_msgs, sensor_msgs, std_msgs, vision_msgs};

// Logging
pub use crate::{ros_error, ros_info};
pub use tracing::{debug, error, info, trace, warn};
