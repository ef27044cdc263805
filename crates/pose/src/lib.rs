//! Pose estimation behind a backend-independent keypoint contract.
//!
//! Every backend fills the same 33-slot [`Keypoints`] set, indexed by
//! [`Landmark`]. Joints a backend cannot see are left at [`Keypoint::MISSING`].

mod backend;
pub use backend::*;

mod blazepose;
pub use blazepose::*;

mod device;
pub use device::*;

mod error;
pub use error::*;

mod geometry;
pub use geometry::*;

mod keypoint;
pub use keypoint::*;

mod landmark;
pub use landmark::*;

#[cfg(feature = "onnx")]
mod onnx;
#[cfg(feature = "onnx")]
pub use onnx::*;

pub mod preprocess;

mod runtime;
pub use runtime::*;

mod selector;
pub use selector::*;

pub mod yolo;
pub use yolo::YoloPoseBackend;

/// A decoded RGB camera frame, `[height, width, 3]`.
pub type Frame = base::Tensor<u8>;
