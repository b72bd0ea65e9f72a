//! Message types shared by both backends.
//!
//! Only the messages the perception nodes exchange are defined here. Each
//! backend re-exports them under its own module layout (`sensor_msgs::Image`
//! for ROS1, `sensor_msgs::msg::Image` for ROS2) together with its shared
//! pointer aliases.

/// A message type that can travel on a topic.
///
/// Endpoints only connect when their type names match.
pub trait TypeSupport: Clone + 'static {
    /// Fully qualified type name, e.g. `"sensor_msgs/Image"`.
    fn type_name() -> &'static str;
}

macro_rules! ros_message {
    (
        $(#[$meta:meta])*
        $name:ident = $type_name:literal {
            $( $(#[$fmeta:meta])* $field:ident : $ty:ty ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name {
            $( $(#[$fmeta])* pub $field: $ty, )*
        }

        impl $crate::msg::TypeSupport for $name {
            fn type_name() -> &'static str {
                $type_name
            }
        }
    };
}

pub mod std_msgs {
    use crate::time::Time;

    ros_message! {
        /// Standard metadata for timestamped data.
        Header = "std_msgs/Header" {
            stamp: Time,
            /// Coordinate frame this data is associated with.
            frame_id: String,
        }
    }
}

pub mod rosgraph_msgs {
    use crate::time::Time;

    ros_message! {
        /// Simulated time sample published on `/clock`.
        Clock = "rosgraph_msgs/Clock" {
            clock: Time,
        }
    }
}

pub mod geometry_msgs {
    ros_message! {
        /// A position and orientation in the plane.
        Pose2D = "geometry_msgs/Pose2D" {
            x: f64,
            y: f64,
            theta: f64,
        }
    }
}

pub mod sensor_msgs {
    use super::std_msgs::Header;

    ros_message! {
        /// An uncompressed image. Pixel `(u, v)` starts at byte
        /// `v * step + u * bytes_per_pixel`.
        Image = "sensor_msgs/Image" {
            header: Header,
            height: u32,
            width: u32,
            /// One of [`image_encodings`].
            encoding: String,
            is_bigendian: u8,
            /// Row length in bytes.
            step: u32,
            data: Vec<u8>,
        }
    }

    impl Image {
        /// Bytes a full frame needs according to `height` and `step`.
        pub fn expected_len(&self) -> usize {
            self.height as usize * self.step as usize
        }
    }

    /// Pixel encodings understood by the image nodes.
    pub mod image_encodings {
        pub const RGB8: &str = "rgb8";
        pub const RGBA8: &str = "rgba8";
        pub const RGB16: &str = "rgb16";
        pub const RGBA16: &str = "rgba16";
        pub const BGR8: &str = "bgr8";
        pub const BGRA8: &str = "bgra8";
        pub const BGR16: &str = "bgr16";
        pub const BGRA16: &str = "bgra16";
        pub const MONO8: &str = "mono8";
        pub const MONO16: &str = "mono16";
        pub const TYPE_32FC1: &str = "32FC1";
        pub const TYPE_32FC3: &str = "32FC3";
        pub const TYPE_32FC4: &str = "32FC4";
        pub const YUV422: &str = "yuv422";

        /// Number of channels of a known encoding.
        pub fn num_channels(encoding: &str) -> Option<u32> {
            match encoding {
                MONO8 | MONO16 | TYPE_32FC1 => Some(1),
                YUV422 => Some(2),
                RGB8 | BGR8 | RGB16 | BGR16 | TYPE_32FC3 => Some(3),
                RGBA8 | BGRA8 | RGBA16 | BGRA16 | TYPE_32FC4 => Some(4),
                _ => None,
            }
        }

        /// Bits per channel of a known encoding.
        pub fn bit_depth(encoding: &str) -> Option<u32> {
            match encoding {
                RGB8 | RGBA8 | BGR8 | BGRA8 | MONO8 | YUV422 => Some(8),
                RGB16 | RGBA16 | BGR16 | BGRA16 | MONO16 => Some(16),
                TYPE_32FC1 | TYPE_32FC3 | TYPE_32FC4 => Some(32),
                _ => None,
            }
        }
    }
}

pub mod vision_msgs {
    use super::{geometry_msgs::Pose2D, sensor_msgs::Image, std_msgs::Header};

    ros_message! {
        /// A class and its confidence.
        ObjectHypothesis = "vision_msgs/ObjectHypothesis" {
            id: i64,
            score: f64,
        }
    }

    ros_message! {
        /// A class, its confidence and where the object is.
        ObjectHypothesisWithPose = "vision_msgs/ObjectHypothesisWithPose" {
            id: i64,
            score: f64,
            pose: Pose2D,
        }
    }

    ros_message! {
        /// An axis-aligned box in image coordinates.
        BoundingBox2D = "vision_msgs/BoundingBox2D" {
            /// Center of the box; `theta` is the rotation.
            center: Pose2D,
            size_x: f64,
            size_y: f64,
        }
    }

    ros_message! {
        /// Class probabilities for a whole image.
        Classification2D = "vision_msgs/Classification2D" {
            header: Header,
            results: Vec<ObjectHypothesis>,
            source_img: Image,
        }
    }

    ros_message! {
        /// One detected object.
        Detection2D = "vision_msgs/Detection2D" {
            header: Header,
            results: Vec<ObjectHypothesisWithPose>,
            bbox: BoundingBox2D,
            source_img: Image,
        }
    }

    ros_message! {
        /// All detections of one image.
        Detection2DArray = "vision_msgs/Detection2DArray" {
            header: Header,
            detections: Vec<Detection2D>,
        }
    }

    ros_message! {
        /// Metadata about the classifier producing the hypotheses.
        VisionInfo = "vision_msgs/VisionInfo" {
            header: Header,
            /// Name of the vision pipeline.
            method: String,
            /// Where the class labels are stored, usually a parameter name.
            database_location: String,
            database_version: i32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{sensor_msgs::image_encodings, *};

    #[test]
    fn test_type_names() {
        assert_eq!(sensor_msgs::Image::type_name(), "sensor_msgs/Image");
        assert_eq!(
            vision_msgs::Detection2DArray::type_name(),
            "vision_msgs/Detection2DArray"
        );
        assert_eq!(rosgraph_msgs::Clock::type_name(), "rosgraph_msgs/Clock");
    }

    #[test]
    fn test_encodings() {
        assert_eq!(image_encodings::num_channels(image_encodings::RGBA8), Some(4));
        assert_eq!(image_encodings::bit_depth(image_encodings::TYPE_32FC1), Some(32));
        assert_eq!(image_encodings::num_channels("nv12"), None);

        let img = sensor_msgs::Image {
            height: 2,
            width: 3,
            encoding: image_encodings::RGB8.into(),
            step: 9,
            ..Default::default()
        };
        assert_eq!(img.expected_len(), 18);
    }
}
