//! Node-local parameter storage.
//!
//! Parameters are undeclared until first set, and a later set may change
//! the type, like a node created with `allow_undeclared_parameters`.

use crate::args::RosArgs;
use roscompat_core::{
    error::Result,
    parameter::{Parameters, load_params_file},
};

/// Build the initial parameters of a node.
///
/// `--params-file` files are loaded in order, then `-p` assignments, each
/// overriding what came before.
pub fn load_startup_parameters(ros_args: &RosArgs, node_fqn: &str) -> Result<Parameters> {
    let mut params = Parameters::new();

    for path in &ros_args.param_files {
        for (name, value) in load_params_file(path, node_fqn)? {
            params.set(name, value);
        }
    }

    for (name, value) in &ros_args.param_assignments {
        params.set(name.clone(), value.clone());
    }

    tracing::debug!(node = node_fqn, count = params.names().count(), "startup parameters loaded");
    Ok(params)
}
