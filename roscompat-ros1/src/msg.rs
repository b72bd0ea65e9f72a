//! Message types, laid out the ROS1 way: one flat module per package, with
//! the `Ptr`/`ConstPtr` shared aliases next to the message.

pub use roscompat_core::msg::TypeSupport;

pub mod std_msgs {
    pub use roscompat_core::msg::std_msgs::Header;
}

pub mod rosgraph_msgs {
    pub use roscompat_core::msg::rosgraph_msgs::Clock;
}

pub mod geometry_msgs {
    pub use roscompat_core::msg::geometry_msgs::Pose2D;
}

pub mod sensor_msgs {
    use std::sync::Arc;

    pub use roscompat_core::msg::sensor_msgs::{Image, image_encodings};

    /// Shared image.
    pub type ImagePtr = Arc<Image>;

    /// Shared image, read-only.
    pub type ImageConstPtr = Arc<Image>;
}

pub mod vision_msgs {
    pub use roscompat_core::msg::vision_msgs::{
        BoundingBox2D, Classification2D, Detection2D, Detection2DArray, ObjectHypothesis,
        ObjectHypothesisWithPose, VisionInfo,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_aliases() {
        let image: sensor_msgs::ImageConstPtr = sensor_msgs::ImagePtr::new(sensor_msgs::Image {
            encoding: sensor_msgs::image_encodings::RGB8.to_string(),
            ..Default::default()
        });
        assert_eq!(sensor_msgs::image_encodings::num_channels(&image.encoding), Some(3));
        assert_eq!(
            <vision_msgs::Detection2DArray as TypeSupport>::type_name(),
            "vision_msgs/Detection2DArray"
        );
    }
}
