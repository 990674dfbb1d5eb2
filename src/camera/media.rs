//! Media-capture seams: device enumeration and stream acquisition.
//!
//! [`MediaDevices`] is what the capture controller talks to. The native
//! implementation is backed by nokhwa; tests plug in scripted devices.

use std::sync::Arc;

use super::capture::CameraCapture;
use super::device::{find_device, list_devices};
use super::types::{CameraError, CameraSettings, Resolution, VideoInputDevice};
use crate::video::FrameSource;

/// Constraints for a stream request.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaConstraints {
    /// Exact device identifier; `None` lets the platform pick its default
    pub device_id: Option<String>,
    pub resolution: Resolution,
    pub fps: u32,
    pub mirror: bool,
}

impl Default for MediaConstraints {
    fn default() -> Self {
        Self {
            device_id: None,
            resolution: Resolution::default(),
            fps: 30,
            mirror: false,
        }
    }
}

/// A live camera stream with its video tracks.
pub trait MediaStream: Send {
    /// Identifier of the device backing this stream.
    fn device_id(&self) -> &str;

    /// Frame source to attach to a video element.
    fn video_source(&self) -> Arc<dyn FrameSource>;

    /// Stop every track. Must be safe to call more than once.
    fn stop_tracks(&mut self);

    /// Whether any track is still live.
    fn is_active(&self) -> bool;
}

/// Platform media-capture facility.
pub trait MediaDevices {
    /// List video-input devices in platform order.
    fn enumerate_devices(&self) -> Result<Vec<VideoInputDevice>, CameraError>;

    /// Acquire a started stream satisfying `constraints`.
    fn get_user_media(
        &self,
        constraints: &MediaConstraints,
    ) -> Result<Box<dyn MediaStream>, CameraError>;
}

/// nokhwa-backed media devices.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeMediaDevices;

impl NativeMediaDevices {
    pub fn new() -> Self {
        Self
    }
}

impl MediaDevices for NativeMediaDevices {
    fn enumerate_devices(&self) -> Result<Vec<VideoInputDevice>, CameraError> {
        list_devices()
    }

    fn get_user_media(
        &self,
        constraints: &MediaConstraints,
    ) -> Result<Box<dyn MediaStream>, CameraError> {
        let devices = list_devices()?;
        let device = match constraints.device_id.as_deref() {
            Some(id) => find_device(&devices, id)
                .ok_or_else(|| CameraError::DeviceNotFound(id.to_string()))?,
            None => devices
                .first()
                .ok_or_else(|| CameraError::DeviceNotFound("default".to_string()))?,
        };

        let settings = CameraSettings {
            device_index: device.index,
            resolution: constraints.resolution,
            fps: constraints.fps,
            mirror: constraints.mirror,
        };

        let mut capture = CameraCapture::new(device.device_id.clone(), settings);
        capture.start()?;
        Ok(Box::new(capture))
    }
}
