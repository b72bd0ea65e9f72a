//! Publisher/subscriber scenarios written once against the facade.

use roscompat::prelude::*;
use std::{
    cell::{Cell, RefCell},
    error::Error as StdError,
    rc::Rc,
    time::{Duration, Instant},
};

const STATUS_PERIOD: Duration = Duration::from_millis(20);

fn create_node(name: &str) -> Result<Node> {
    let options = InitOptions::default().with_status_poll_period(STATUS_PERIOD);
    Runtime::new().init_with_options(name, [name], options)
}

fn spin_for(node: &Node, duration: Duration) -> Result<()> {
    let end = Instant::now() + duration;
    loop {
        let now = Instant::now();
        if now >= end {
            return Ok(());
        }
        node.spin_once(end - now)?;
    }
}

#[test]
fn test_count_follows_subscribers() -> std::result::Result<(), Box<dyn StdError>> {
    let node = create_node("detectnet")?;
    let overlay = node.create_publisher::<sensor_msgs::Image>("overlay", 2)?;
    assert!(overlay.topic_name().ends_with("/detectnet/overlay"));
    assert_eq!(overlay.subscriber_count(), 0);

    let widths = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&widths);
    let viewer = node.create_subscriber("overlay", 2, move |img: Received<sensor_msgs::Image>| {
        sink.borrow_mut().push(img.width)
    })?;

    // one update cycle at most
    node.spin_once(Duration::ZERO)?;
    assert_eq!(overlay.subscriber_count(), 1);

    let image = sensor_msgs::Image {
        width: 1280,
        height: 720,
        encoding: sensor_msgs::image_encodings::RGB8.into(),
        ..Default::default()
    };
    overlay.publish(&image)?;
    spin_for(&node, Duration::from_millis(30))?;
    assert_eq!(*widths.borrow(), vec![1280]);

    drop(viewer);
    node.spin_once(Duration::ZERO)?;
    assert_eq!(overlay.subscriber_count(), 0);
    Ok(())
}

#[test]
fn test_status_callback_tracks_increases() -> std::result::Result<(), Box<dyn StdError>> {
    let node = create_node("imagenet")?;
    let fired = Rc::new(Cell::new(0));
    let counter = Rc::clone(&fired);
    let publisher = node.create_publisher_with_status::<vision_msgs::Classification2D, _>(
        "classification",
        5,
        move || counter.set(counter.get() + 1),
    )?;

    let mut subscriptions = Vec::new();
    let mut previous_count = 0;
    let mut previous_fired = 0;
    // 0 -> 1 -> 1 -> 3 -> 2 -> 5
    for target in [1, 1, 3, 2, 5] {
        while subscriptions.len() < target {
            subscriptions.push(node.create_subscriber(
                "classification",
                5,
                |_: Received<vision_msgs::Classification2D>| {},
            )?);
        }
        subscriptions.truncate(target);
        spin_for(&node, STATUS_PERIOD * 3)?;

        assert_eq!(publisher.subscriber_count(), target);
        if target > previous_count {
            assert!(fired.get() > previous_fired, "no callback for {target}");
        } else {
            assert_eq!(fired.get(), previous_fired, "callback without increase");
        }
        previous_count = target;
        previous_fired = fired.get();
    }
    Ok(())
}

#[test]
fn test_detections_round_trip() -> std::result::Result<(), Box<dyn StdError>> {
    let node = create_node("detector")?;
    let publisher = node.create_publisher::<vision_msgs::Detection2DArray>("detections", 25)?;

    let received = Rc::new(RefCell::new(None));
    let sink = Rc::clone(&received);
    let _subscription = node.create_subscriber(
        "detections",
        25,
        move |msg: Received<vision_msgs::Detection2DArray>| {
            *sink.borrow_mut() = Some((*msg).clone());
        },
    )?;

    let detection = vision_msgs::Detection2D {
        results: vec![vision_msgs::ObjectHypothesisWithPose {
            id: 7,
            score: 0.92,
            ..Default::default()
        }],
        bbox: vision_msgs::BoundingBox2D {
            center: geometry_msgs::Pose2D {
                x: 320.0,
                y: 240.0,
                theta: 0.0,
            },
            size_x: 64.0,
            size_y: 48.0,
        },
        ..Default::default()
    };
    let sent = vision_msgs::Detection2DArray {
        header: std_msgs::Header {
            stamp: node.now(),
            frame_id: "camera".into(),
        },
        detections: vec![detection],
    };
    publisher.publish(&sent)?;
    spin_for(&node, Duration::from_millis(30))?;

    assert_eq!(received.borrow().as_ref(), Some(&sent));
    Ok(())
}
