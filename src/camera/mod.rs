//! Camera access: device enumeration, stream acquisition and frame capture.
//!
//! - Device enumeration via [`list_devices`]
//! - Stream acquisition via the [`MediaDevices`] trait ([`NativeMediaDevices`] on real hardware)
//! - A single live stream via [`CameraCapture`]

mod capture;
mod capture_loop;
mod device;
mod frame_utils;
mod media;
mod types;

pub use capture::CameraCapture;
pub use device::{find_device, list_devices};
pub use frame_utils::{frame_to_rgba, mirror_horizontal};
pub use media::{MediaConstraints, MediaDevices, MediaStream, NativeMediaDevices};
pub use types::{CameraError, CameraSettings, Frame, FrameFormat, Resolution, VideoInputDevice};
