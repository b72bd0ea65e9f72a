//! Parser for ROS2 command-line arguments.
//!
//! Only the `--ros-args` sections are interpreted; everything else is handed
//! back to the application untouched.
//!
//! ```
//! use roscompat_ros2::args::parse_ros_args;
//!
//! let args = [
//!     "detectnet",
//!     "--user-arg",
//!     "--ros-args",
//!     "-r",
//!     "image_in:=/camera/image_raw",
//!     "-p",
//!     "threshold:=0.6",
//!     "--",
//!     "--another-user-arg",
//! ]
//! .map(String::from);
//!
//! let (ros_args, user_args) = parse_ros_args(&args)?;
//! assert_eq!(ros_args.remap_rules.len(), 1);
//! assert_eq!(ros_args.param_assignments.len(), 1);
//! assert_eq!(user_args, ["detectnet", "--user-arg", "--another-user-arg"]);
//! # Ok::<(), roscompat_core::Error>(())
//! ```

use roscompat_core::{
    error::{Error, Result},
    names::RemapRule,
    parameter::Value,
};
use std::path::PathBuf;

/// Remap source renaming the node.
pub const NODE_NAME_REMAP: &str = "__node";

/// Remap source moving the node to another namespace.
pub const NAMESPACE_REMAP: &str = "__ns";

/// Arguments collected from every `--ros-args` section.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RosArgs {
    /// Topic remapping rules, in command-line order.
    pub remap_rules: Vec<RemapRule>,

    /// `-p name:=value` assignments.
    pub param_assignments: Vec<(String, Value)>,

    /// `--params-file` paths.
    pub param_files: Vec<PathBuf>,

    /// Last `--log-level`.
    pub log_level: Option<String>,

    /// `-r __node:=name`.
    pub node_name: Option<String>,

    /// `-r __ns:=/namespace`.
    pub namespace: Option<String>,
}

impl RosArgs {
    fn merge(&mut self, other: RosArgs) {
        self.remap_rules.extend(other.remap_rules);
        self.param_assignments.extend(other.param_assignments);
        self.param_files.extend(other.param_files);
        if other.log_level.is_some() {
            self.log_level = other.log_level;
        }
        if other.node_name.is_some() {
            self.node_name = other.node_name;
        }
        if other.namespace.is_some() {
            self.namespace = other.namespace;
        }
    }
}

/// Parse ROS2 arguments.
///
/// Returns the parsed arguments and the remaining user arguments.
///
/// # Errors
///
/// Returns an error for unknown flags inside a section, flags missing their
/// value and malformed `name:=value` assignments.
pub fn parse_ros_args(args: &[String]) -> Result<(RosArgs, Vec<String>)> {
    let mut ros_args = RosArgs::default();
    let mut user_args = Vec::new();
    let mut i = 0;

    while i < args.len() {
        if args[i] == "--ros-args" {
            let (section, next_idx) = extract_section(args, i + 1);
            ros_args.merge(parse_section(section)?);
            i = next_idx;
        } else {
            user_args.push(args[i].clone());
            i += 1;
        }
    }

    Ok((ros_args, user_args))
}

/// Returns the section and the index of the next argument to process.
fn extract_section(args: &[String], start_idx: usize) -> (&[String], usize) {
    let mut i = start_idx;
    while i < args.len() {
        match args[i].as_str() {
            "--" => return (&args[start_idx..i], i + 1),
            "--ros-args" => return (&args[start_idx..i], i),
            _ => i += 1,
        }
    }
    (&args[start_idx..], i)
}

fn parse_section(args: &[String]) -> Result<RosArgs> {
    let mut ros_args = RosArgs::default();
    let mut iter = args.iter();

    while let Some(flag) = iter.next() {
        let mut value = |name: &str| {
            iter.next()
                .ok_or_else(|| Error::MissingArgumentValue(name.to_string()))
        };

        match flag.as_str() {
            "--remap" | "-r" => {
                let rule = RemapRule::parse(value("--remap")?)?;
                match rule.from.as_str() {
                    NODE_NAME_REMAP => ros_args.node_name = Some(rule.to),
                    NAMESPACE_REMAP => ros_args.namespace = Some(rule.to),
                    _ => ros_args.remap_rules.push(rule),
                }
            }
            "--param" | "-p" => {
                let arg = value("--param")?;
                ros_args.param_assignments.push(parse_param_assignment(arg)?);
            }
            "--params-file" => {
                ros_args
                    .param_files
                    .push(PathBuf::from(value("--params-file")?));
            }
            "--log-level" => {
                ros_args.log_level = Some(parse_log_level(value("--log-level")?)?);
            }
            arg => {
                return Err(Error::invalid_argument(arg, "unexpected argument in --ros-args"));
            }
        }
    }

    Ok(ros_args)
}

fn parse_param_assignment(arg: &str) -> Result<(String, Value)> {
    let (name, value) = arg
        .split_once(":=")
        .ok_or_else(|| Error::invalid_argument(arg, "expected 'name:=value'"))?;
    if name.is_empty() {
        return Err(Error::invalid_argument(arg, "empty parameter name"));
    }
    Ok((name.to_string(), Value::parse(value)))
}

/// Map a ROS2 severity (`DEBUG`, `info`, `FATAL`, ...) to a tracing level.
fn parse_log_level(arg: &str) -> Result<String> {
    let level = match arg.to_ascii_lowercase().as_str() {
        "debug" => "debug",
        "info" => "info",
        "warn" | "warning" => "warn",
        "error" | "fatal" => "error",
        "unset" | "trace" => "trace",
        _ => return Err(Error::invalid_argument(arg, "unknown log level")),
    };
    Ok(level.to_string())
}
