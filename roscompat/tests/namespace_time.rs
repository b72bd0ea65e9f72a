//! Namespace and time queries written once against the facade.

use roscompat::prelude::*;
use std::{error::Error as StdError, time::Duration};

#[test]
fn test_namespace_is_stable() -> std::result::Result<(), Box<dyn StdError>> {
    let node = Runtime::new().init("segnet", ["segnet"])?;
    let namespace = node.namespace();
    assert!(namespace.ends_with("/segnet"), "unexpected namespace {namespace}");

    for _ in 0..5 {
        node.spin_once(Duration::from_millis(1))?;
        assert_eq!(node.namespace(), namespace);
    }
    Ok(())
}

#[test]
fn test_time_is_monotonic() -> std::result::Result<(), Box<dyn StdError>> {
    let node = Runtime::new().init("posenet", ["posenet"])?;

    let mut last = node.now();
    for _ in 0..100 {
        let now = node.now();
        assert!(now >= last);
        last = now;
    }

    std::thread::sleep(Duration::from_millis(5));
    assert!(node.now() > last);
    Ok(())
}

#[test]
fn test_backend_name() {
    assert!(matches!(roscompat::BACKEND, "ros1" | "ros2"));
    ros_info!(backend = roscompat::BACKEND, "facade selected");
}
