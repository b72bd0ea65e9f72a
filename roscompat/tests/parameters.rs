//! Parameter access written once against the facade.

use roscompat::prelude::*;
use std::error::Error as StdError;

#[test]
fn test_round_trip() -> std::result::Result<(), Box<dyn StdError>> {
    let node = Runtime::new().init("detectnet", ["detectnet"])?;

    node.set_parameter("threshold", 0.35);
    let mut threshold = 0.0_f64;
    assert!(node.get_parameter("threshold", &mut threshold));
    assert_eq!(threshold, 0.35);

    node.set_parameter("model", "ssd-mobilenet-v2");
    let mut model = String::new();
    assert!(node.get_parameter("model", &mut model));
    assert_eq!(model, "ssd-mobilenet-v2");

    node.set_parameter("class_ids", vec![1_i64, 3, 5]);
    assert_eq!(node.parameter::<Vec<i64>>("class_ids"), Some(vec![1, 3, 5]));
    Ok(())
}

#[test]
fn test_default_fallback() -> std::result::Result<(), Box<dyn StdError>> {
    let node = Runtime::new().init("imagenet", ["imagenet"])?;

    let mut labels = String::from("unset");
    assert!(!node.get_parameter("class_labels", &mut labels));
    assert_eq!(labels, "unset");

    node.get_parameter_or("class_labels", &mut labels, "labels.txt".to_string());
    assert_eq!(labels, "labels.txt");

    let mut missing = true;
    assert!(!node.get_parameter("class_labels", &mut missing));
    Ok(())
}
