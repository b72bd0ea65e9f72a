//! Message types, laid out the ROS2 way.
//!
//! Every package has a `msg` module with the message structs. The types used
//! by the perception nodes are also re-exported one level up so that
//! `vision_msgs::Detection2DArray` and `sensor_msgs::ImagePtr` name the same
//! thing under both backends.

pub use roscompat_core::msg::TypeSupport;

pub mod std_msgs {
    pub mod msg {
        pub use roscompat_core::msg::std_msgs::Header;
    }
    pub use msg::Header;
}

pub mod builtin_interfaces {
    pub mod msg {
        pub use roscompat_core::time::Time;
    }
}

pub mod rosgraph_msgs {
    pub mod msg {
        pub use roscompat_core::msg::rosgraph_msgs::Clock;
    }
    pub use msg::Clock;
}

pub mod geometry_msgs {
    pub mod msg {
        pub use roscompat_core::msg::geometry_msgs::Pose2D;
    }
    pub use msg::Pose2D;
}

pub mod sensor_msgs {
    use std::sync::Arc;

    pub mod msg {
        pub use roscompat_core::msg::sensor_msgs::Image;

        /// `Image::SharedPtr`.
        pub type ImageSharedPtr = std::sync::Arc<Image>;
    }

    pub use msg::Image;
    pub use roscompat_core::msg::sensor_msgs::image_encodings;

    /// Shared image.
    pub type ImagePtr = Arc<Image>;

    /// Shared image, read-only.
    pub type ImageConstPtr = Arc<Image>;
}

pub mod vision_msgs {
    pub mod msg {
        pub use roscompat_core::msg::vision_msgs::{
            BoundingBox2D, Classification2D, Detection2D, Detection2DArray, ObjectHypothesis,
            ObjectHypothesisWithPose, VisionInfo,
        };
    }

    pub use msg::{
        BoundingBox2D, Classification2D, Detection2D, Detection2DArray, ObjectHypothesis,
        ObjectHypothesisWithPose, VisionInfo,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flattened_aliases() {
        let image: sensor_msgs::msg::Image = sensor_msgs::Image::default();
        let shared: sensor_msgs::ImageConstPtr = sensor_msgs::ImagePtr::new(image);
        assert_eq!(shared.encoding, "");

        let _: vision_msgs::Detection2DArray = vision_msgs::msg::Detection2DArray::default();
        assert_eq!(
            <vision_msgs::VisionInfo as TypeSupport>::type_name(),
            "vision_msgs/VisionInfo"
        );
    }
}
