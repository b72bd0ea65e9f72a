//! Parser for ROS1 command-line arguments.
//!
//! Every argument containing `:=` is a ROS argument: a topic remapping,
//! a special key (`__name`, `__ns`, `__log`, ...) or a private parameter
//! (`_threshold:=0.5`). Anything else is handed back to the application.
//!
//! ```
//! use roscompat_ros1::args::parse_ros_args;
//!
//! let args = [
//!     "detectnet",
//!     "image_in:=/camera/image_raw",
//!     "_threshold:=0.6",
//!     "__ns:=/robot",
//!     "--user-flag",
//! ]
//! .map(String::from);
//!
//! let (ros_args, user_args) = parse_ros_args(&args)?;
//! assert_eq!(ros_args.remappings.len(), 1);
//! assert_eq!(ros_args.private_params.len(), 1);
//! assert_eq!(ros_args.namespace.as_deref(), Some("/robot"));
//! assert_eq!(user_args, ["detectnet", "--user-flag"]);
//! # Ok::<(), roscompat_core::Error>(())
//! ```

use roscompat_core::{
    error::{Error, Result},
    names::RemapRule,
    parameter::Value,
};

/// Special key renaming the node.
pub const NAME_KEY: &str = "__name";

/// Special key moving the node to another namespace.
pub const NAMESPACE_KEY: &str = "__ns";

/// Special key for the log destination or level.
pub const LOG_KEY: &str = "__log";

/// Special keys accepted for compatibility and otherwise ignored.
pub const IGNORED_KEYS: [&str; 3] = ["__ip", "__hostname", "__master"];

/// Environment variable giving the default namespace.
pub const ROS_NAMESPACE: &str = "ROS_NAMESPACE";

/// Arguments recognized on a ROS1 command line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RosArgs {
    /// Topic remappings, in command-line order.
    pub remappings: Vec<RemapRule>,

    /// `_name:=value` private parameters, without the leading underscore.
    pub private_params: Vec<(String, Value)>,

    /// `__name:=`.
    pub node_name: Option<String>,

    /// `__ns:=`.
    pub namespace: Option<String>,

    /// `__log:=` when it names a severity.
    pub log_level: Option<String>,
}

/// Parse ROS1 arguments.
///
/// Returns the parsed arguments and the remaining user arguments.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] for an empty side of `:=` or an
/// unknown `__` key.
pub fn parse_ros_args(args: &[String]) -> Result<(RosArgs, Vec<String>)> {
    let mut ros_args = RosArgs::default();
    let mut user_args = Vec::new();

    for arg in args {
        let Some((key, value)) = arg.split_once(":=") else {
            user_args.push(arg.clone());
            continue;
        };
        if key.is_empty() || value.is_empty() {
            return Err(Error::invalid_argument(
                arg,
                "both sides of ':=' must be non-empty",
            ));
        }

        match key {
            NAME_KEY => ros_args.node_name = Some(value.to_string()),
            NAMESPACE_KEY => ros_args.namespace = Some(value.to_string()),
            LOG_KEY => ros_args.log_level = parse_log_level(value),
            key if IGNORED_KEYS.contains(&key) => {
                tracing::debug!(key, value, "ignoring argument");
            }
            key if key.starts_with("__") => {
                return Err(Error::invalid_argument(arg, "unknown special key"));
            }
            key => match key.strip_prefix('_') {
                Some(name) => ros_args
                    .private_params
                    .push((name.to_string(), Value::parse(value))),
                None => ros_args.remappings.push(RemapRule::parse(arg)?),
            },
        }
    }

    Ok((ros_args, user_args))
}

/// `__log` usually names a log file. A severity is honoured, a path is not.
fn parse_log_level(value: &str) -> Option<String> {
    let level = match value.to_ascii_lowercase().as_str() {
        "debug" => "debug",
        "info" => "info",
        "warn" => "warn",
        "error" | "fatal" => "error",
        _ => {
            tracing::debug!(value, "log file destination ignored");
            return None;
        }
    };
    Some(level.to_string())
}
