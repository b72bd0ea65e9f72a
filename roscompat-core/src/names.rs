//! Name validation, expansion and remapping.
//!
//! Both backends share one set of naming rules so that a name accepted by one
//! is accepted by the other:
//!
//! - tokens start with a letter or an underscore and contain only
//!   alphanumerics and underscores
//! - repeated underscores (`__`) and repeated slashes (`//`) are rejected
//! - topic names may be absolute (`/a/b`), relative (`a/b`) or private
//!   (`~`, `~/a`)
//!
//! # Examples
//!
//! ```
//! use roscompat_core::names::{expand_topic_name, validate_topic_name};
//!
//! assert!(validate_topic_name("/cam/image").is_ok());
//! assert!(validate_topic_name("cam//image").is_err());
//!
//! let fq = expand_topic_name("/robot/detectnet", "detectnet", "detections").unwrap();
//! assert_eq!(fq, "/robot/detectnet/detections");
//! ```

use crate::error::{Error, Result};
use regex::Regex;
use std::{fmt, sync::LazyLock};

static NODE_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex"));

static NAMESPACE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(/|(/[A-Za-z_][A-Za-z0-9_]*)+)$").expect("valid regex")
});

static TOPIC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(~|~(/[A-Za-z_][A-Za-z0-9_]*)+|/?[A-Za-z_][A-Za-z0-9_]*(/[A-Za-z_][A-Za-z0-9_]*)*)$")
        .expect("valid regex")
});

/// What kind of name is being validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    /// A topic name.
    Topic,
    /// A node base name.
    Node,
    /// A namespace.
    Namespace,
}

impl fmt::Display for NameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Topic => write!(f, "topic"),
            Self::Node => write!(f, "node"),
            Self::Namespace => write!(f, "namespace"),
        }
    }
}

fn check(name: &str, kind: NameKind, re: &Regex) -> Result<()> {
    if name.is_empty() {
        return Err(Error::invalid_name(kind, name, "name must not be empty"));
    }
    if name.contains("__") {
        return Err(Error::invalid_name(
            kind,
            name,
            "name must not contain repeated underscores",
        ));
    }
    if !re.is_match(name) {
        return Err(Error::invalid_name(
            kind,
            name,
            "tokens must start with a letter or '_' and contain only alphanumerics and '_'",
        ));
    }
    Ok(())
}

/// Validate a node base name.
pub fn validate_node_name(name: &str) -> Result<()> {
    check(name, NameKind::Node, &NODE_NAME_RE)
}

/// Validate an absolute namespace (`/` is the root).
pub fn validate_namespace(namespace: &str) -> Result<()> {
    check(namespace, NameKind::Namespace, &NAMESPACE_RE)
}

/// Validate a topic name before expansion.
pub fn validate_topic_name(name: &str) -> Result<()> {
    check(name, NameKind::Topic, &TOPIC_RE)
}

/// Normalize a user supplied namespace: empty means root, a missing leading
/// slash is added.
pub fn normalize_namespace(namespace: &str) -> Result<String> {
    let ns = match namespace {
        "" => "/".to_string(),
        ns if ns.starts_with('/') => ns.to_string(),
        ns => format!("/{ns}"),
    };
    let ns = if ns.len() > 1 {
        ns.trim_end_matches('/').to_string()
    } else {
        ns
    };
    validate_namespace(&ns)?;
    Ok(ns)
}

/// Build the fully qualified node name.
///
/// ```
/// use roscompat_core::names::build_node_fqn;
///
/// assert_eq!(build_node_fqn("/", "talker"), "/talker");
/// assert_eq!(build_node_fqn("/robot", "talker"), "/robot/talker");
/// ```
pub fn build_node_fqn(namespace: &str, node_name: &str) -> String {
    if namespace == "/" || namespace.is_empty() {
        format!("/{node_name}")
    } else {
        format!("{namespace}/{node_name}")
    }
}

/// Expand a topic name to its fully qualified form.
///
/// - absolute names are returned as-is
/// - `~` and `~/...` are expanded under the node FQN
/// - relative names are prefixed with `namespace`
pub fn expand_topic_name(namespace: &str, node_name: &str, name: &str) -> Result<String> {
    validate_topic_name(name)?;

    let expanded = if name.starts_with('/') {
        name.to_string()
    } else if let Some(rest) = name.strip_prefix('~') {
        let fqn = build_node_fqn(namespace, node_name);
        format!("{fqn}{rest}")
    } else if namespace == "/" || namespace.is_empty() {
        format!("/{name}")
    } else {
        format!("{namespace}/{name}")
    };

    Ok(expanded)
}

/// A `from:=to` remapping rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemapRule {
    /// Name to match.
    pub from: String,
    /// Replacement.
    pub to: String,
}

impl RemapRule {
    /// Parse `from:=to`.
    pub fn parse(arg: &str) -> Result<Self> {
        let (from, to) = arg
            .split_once(":=")
            .ok_or_else(|| Error::invalid_argument(arg, "expected 'from:=to'"))?;
        if from.is_empty() || to.is_empty() {
            return Err(Error::invalid_argument(
                arg,
                "both sides of ':=' must be non-empty",
            ));
        }
        Ok(Self {
            from: from.to_string(),
            to: to.to_string(),
        })
    }
}

/// Expand `name` and apply the first matching remapping rule.
///
/// Rule sides are expanded against the same namespace as the name, so a
/// relative rule `image:=/cam/raw` matches the relative topic `image`.
pub fn resolve_topic_name(
    namespace: &str,
    node_name: &str,
    name: &str,
    rules: &[RemapRule],
) -> Result<String> {
    let fq_name = expand_topic_name(namespace, node_name, name)?;

    for rule in rules {
        let Ok(from) = expand_topic_name(namespace, node_name, &rule.from) else {
            continue;
        };
        if from == fq_name {
            let to = expand_topic_name(namespace, node_name, &rule.to)?;
            tracing::debug!(from = %fq_name, to = %to, "remapped topic");
            return Ok(to);
        }
    }

    Ok(fq_name)
}
