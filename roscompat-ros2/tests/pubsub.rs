//! Integration tests for publishers, subscriptions and the polled status
//! notification.

use roscompat_ros2::{
    InitOptions, Node, RosNode, RosPublisher, Runtime, TakenMsg,
    msg::{sensor_msgs::Image, vision_msgs::Detection2DArray},
};
use std::{
    cell::{Cell, RefCell},
    rc::Rc,
    time::{Duration, Instant},
};

const STATUS_PERIOD: Duration = Duration::from_millis(20);

fn create_node(name: &str) -> Node {
    let options = InitOptions::default().with_status_poll_period(STATUS_PERIOD);
    Runtime::with_domain_id(0)
        .init_with_options(name, [name], options)
        .expect("Failed to create node")
}

fn spin_for(node: &Node, duration: Duration) {
    let end = Instant::now() + duration;
    loop {
        let now = Instant::now();
        if now >= end {
            break;
        }
        node.spin_once(end - now).expect("spin_once failed");
    }
}

fn image(width: u32) -> Image {
    Image {
        width,
        ..Default::default()
    }
}

#[test]
fn test_end_to_end_count_and_delivery() {
    let node = create_node("e2e_node");
    let publisher = node
        .create_publisher::<Image>("overlay", 2)
        .expect("Failed to create publisher");
    assert_eq!(publisher.topic_name(), "/e2e_node/overlay");
    assert_eq!(publisher.subscriber_count(), 0);

    let received = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&received);
    let subscription = node
        .create_subscriber("overlay", 2, move |img: TakenMsg<Image>| {
            sink.borrow_mut().push(img.width)
        })
        .expect("Failed to create subscriber");

    // discovery is only folded in by the next dispatch cycle
    assert_eq!(publisher.subscriber_count(), 0);
    node.spin_once(Duration::ZERO).expect("spin_once failed");
    assert_eq!(publisher.subscriber_count(), 1);

    publisher.publish(&image(640)).expect("Failed to publish");
    assert!(received.borrow().is_empty());
    node.spin_once(Duration::ZERO).expect("spin_once failed");
    assert_eq!(*received.borrow(), vec![640]);

    drop(subscription);
    node.spin_once(Duration::ZERO).expect("spin_once failed");
    assert_eq!(publisher.subscriber_count(), 0);

    publisher.publish(&image(320)).expect("Failed to publish");
    node.spin_once(Duration::ZERO).expect("spin_once failed");
    assert_eq!(*received.borrow(), vec![640]);
}

#[test]
fn test_several_publishers_on_one_topic() {
    let node = create_node("multi_pub_node");
    let first = node
        .create_publisher::<Image>("/shared", 1)
        .expect("Failed to create publisher");
    let second = node
        .create_publisher::<Image>("/shared", 1)
        .expect("Failed to create publisher");
    assert_ne!(first.gid(), second.gid());

    let received = Rc::new(Cell::new(0));
    let counter = Rc::clone(&received);
    let _subscription = node
        .create_subscriber("/shared", 10, move |_: TakenMsg<Image>| {
            counter.set(counter.get() + 1)
        })
        .expect("Failed to create subscriber");
    node.spin_once(Duration::ZERO).expect("spin_once failed");

    assert_eq!(first.subscriber_count(), 1);
    assert_eq!(second.subscriber_count(), 1);

    first.publish(&image(1)).expect("Failed to publish");
    second.publish(&image(2)).expect("Failed to publish");
    node.spin_once(Duration::ZERO).expect("spin_once failed");
    assert_eq!(received.get(), 2);
}

#[test]
fn test_clone_shares_ownership() {
    let node = create_node("clone_node");
    let publisher = node
        .create_publisher::<Image>("image", 1)
        .expect("Failed to create publisher");
    let clone = publisher.clone();
    assert_eq!(publisher.gid(), clone.gid());
    drop(publisher);

    let received = Rc::new(Cell::new(false));
    let flag = Rc::clone(&received);
    let _subscription = node
        .create_subscriber("image", 1, move |_: TakenMsg<Image>| flag.set(true))
        .expect("Failed to create subscriber");

    clone.publish(&image(1)).expect("Failed to publish");
    node.spin_once(Duration::ZERO).expect("spin_once failed");
    assert!(received.get());
}

#[test]
fn test_queue_keeps_latest() {
    let node = create_node("queue_node");
    let publisher = node
        .create_publisher::<Image>("image", 10)
        .expect("Failed to create publisher");

    let received = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&received);
    let _subscription = node
        .create_subscriber("image", 2, move |img: TakenMsg<Image>| {
            sink.borrow_mut().push(img.width)
        })
        .expect("Failed to create subscriber");

    for width in 1..=5 {
        publisher.publish(&image(width)).expect("Failed to publish");
    }
    node.spin_once(Duration::ZERO).expect("spin_once failed");
    assert_eq!(*received.borrow(), vec![4, 5]);
}

#[test]
fn test_fan_out_shares_sample() {
    let node = create_node("fan_out_node");
    let publisher = node
        .create_publisher::<Image>("image", 1)
        .expect("Failed to create publisher");

    let kinds = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&kinds);
    let _single = node
        .create_subscriber("image", 1, move |img: TakenMsg<Image>| {
            sink.borrow_mut()
                .push(matches!(img, TakenMsg::Shared(_)))
        })
        .expect("Failed to create subscriber");

    publisher.publish(&image(1)).expect("Failed to publish");
    node.spin_once(Duration::ZERO).expect("spin_once failed");
    assert_eq!(*kinds.borrow(), vec![false]);

    let _second = node
        .create_subscriber("image", 1, |img: TakenMsg<Image>| {
            assert!(matches!(img, TakenMsg::Shared(_)))
        })
        .expect("Failed to create subscriber");

    publisher.publish(&image(2)).expect("Failed to publish");
    node.spin_once(Duration::ZERO).expect("spin_once failed");
    assert_eq!(*kinds.borrow(), vec![false, true]);
}

#[test]
fn test_type_mismatch_not_connected() {
    let node = create_node("mismatch_node");
    let publisher = node
        .create_publisher::<Detection2DArray>("detections", 1)
        .expect("Failed to create publisher");

    let received = Rc::new(Cell::new(false));
    let flag = Rc::clone(&received);
    let _subscription = node
        .create_subscriber("detections", 1, move |_: TakenMsg<Image>| flag.set(true))
        .expect("Failed to create subscriber");
    node.spin_once(Duration::ZERO).expect("spin_once failed");

    assert_eq!(publisher.subscriber_count(), 0);
    publisher
        .publish(&Detection2DArray::default())
        .expect("Failed to publish");
    node.spin_once(Duration::ZERO).expect("spin_once failed");
    assert!(!received.get());
}

#[test]
fn test_status_fires_on_each_increase() {
    let node = create_node("status_node");
    let fired = Rc::new(Cell::new(0));
    let counter = Rc::clone(&fired);
    let publisher = node
        .create_publisher_with_status::<Image, _>("overlay", 1, move || {
            counter.set(counter.get() + 1)
        })
        .expect("Failed to create publisher");

    let mut subscriptions = Vec::new();
    let mut history = Vec::new();
    // 0 -> 1 -> 1 -> 3 -> 2 -> 5
    for target in [1, 1, 3, 2, 5] {
        while subscriptions.len() < target {
            subscriptions.push(
                node.create_subscriber("overlay", 1, |_: TakenMsg<Image>| {})
                    .expect("Failed to create subscriber"),
            );
        }
        subscriptions.truncate(target);
        spin_for(&node, STATUS_PERIOD * 3);
        assert_eq!(publisher.subscriber_count(), target);
        history.push(fired.get());
    }

    assert_eq!(history, vec![1, 1, 2, 2, 3]);
}

#[test]
fn test_status_coalesces_within_period() {
    let options = InitOptions::default().with_status_poll_period(Duration::from_millis(60));
    let node = Runtime::with_domain_id(0)
        .init_with_options("coalesce_node", ["coalesce_node"], options)
        .expect("Failed to create node");

    let fired = Rc::new(Cell::new(0));
    let counter = Rc::clone(&fired);
    let _publisher = node
        .create_publisher_with_status::<Image, _>("overlay", 1, move || {
            counter.set(counter.get() + 1)
        })
        .expect("Failed to create publisher");

    let _a = node
        .create_subscriber("overlay", 1, |_: TakenMsg<Image>| {})
        .expect("Failed to create subscriber");
    let _b = node
        .create_subscriber("overlay", 1, |_: TakenMsg<Image>| {})
        .expect("Failed to create subscriber");

    spin_for(&node, Duration::from_millis(90));
    assert_eq!(fired.get(), 1);
}

#[test]
fn test_status_stops_with_publisher() {
    let node = create_node("status_drop_node");
    let fired = Rc::new(Cell::new(0));
    let counter = Rc::clone(&fired);
    let publisher = node
        .create_publisher_with_status::<Image, _>("overlay", 1, move || {
            counter.set(counter.get() + 1)
        })
        .expect("Failed to create publisher");
    drop(publisher);

    let _subscription = node
        .create_subscriber("overlay", 1, |_: TakenMsg<Image>| {})
        .expect("Failed to create subscriber");
    spin_for(&node, STATUS_PERIOD * 3);
    assert_eq!(fired.get(), 0);
}

#[test]
fn test_callback_can_publish() {
    let node = create_node("relay_node");
    let relay = node
        .create_publisher::<Image>("relayed", 1)
        .expect("Failed to create publisher");
    let input = node
        .create_publisher::<Image>("input", 1)
        .expect("Failed to create publisher");

    let _forward = node
        .create_subscriber("input", 1, move |img: TakenMsg<Image>| {
            relay.publish(&img).expect("Failed to relay");
        })
        .expect("Failed to create subscriber");

    let received = Rc::new(Cell::new(0));
    let width = Rc::clone(&received);
    let _sink = node
        .create_subscriber("relayed", 1, move |img: TakenMsg<Image>| width.set(img.width))
        .expect("Failed to create subscriber");

    input.publish(&image(7)).expect("Failed to publish");
    spin_for(&node, Duration::from_millis(30));
    assert_eq!(received.get(), 7);
}
