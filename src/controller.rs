//! Capture controller: sole owner of the live camera stream.

use crate::camera::{CameraError, MediaConstraints, MediaDevices, MediaStream, VideoInputDevice};
use crate::video::VideoElement;

/// Acquires and releases the camera stream and attaches it to the video element.
///
/// The stream handle never leaves this type; callers only see
/// `start`/`stop`/`enumerate_devices`.
pub struct CaptureController<D: MediaDevices> {
    devices: D,
    stream: Option<Box<dyn MediaStream>>,
    video: VideoElement,
    /// Template for every request; `device_id` is filled per `start`
    constraints: MediaConstraints,
}

impl<D: MediaDevices> std::fmt::Debug for CaptureController<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureController")
            .field("active_device", &self.active_device())
            .field("constraints", &self.constraints)
            .finish_non_exhaustive()
    }
}

impl<D: MediaDevices> CaptureController<D> {
    pub fn new(devices: D, video: VideoElement, constraints: MediaConstraints) -> Self {
        Self {
            devices,
            stream: None,
            video,
            constraints,
        }
    }

    /// Request the camera, constrained to `device_id` when given.
    ///
    /// A stream that is already held is stopped first, so two streams never
    /// overlap. Failures are logged and returned; nothing is retried.
    pub fn start(&mut self, device_id: Option<&str>) -> Result<(), CameraError> {
        self.stop();

        let constraints = MediaConstraints {
            device_id: device_id.map(str::to_string),
            ..self.constraints.clone()
        };

        match self.devices.get_user_media(&constraints) {
            Ok(stream) => {
                log::info!("Acquired camera stream from device '{}'", stream.device_id());
                self.video.set_src_object(Some(stream.video_source()));
                self.stream = Some(stream);
                Ok(())
            }
            Err(e) => {
                log::error!(
                    "Camera acquisition failed (device {}): {}",
                    device_id.unwrap_or("default"),
                    e
                );
                Err(e)
            }
        }
    }

    /// Stop all tracks, release the stream and clear the video source.
    ///
    /// Calling this without a stream only clears the video source.
    pub fn stop(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop_tracks();
            log::info!("Released camera stream from device '{}'", stream.device_id());
        }
        self.video.set_src_object(None);
    }

    /// List video inputs. Enumeration failures yield an empty list.
    pub fn enumerate_devices(&self) -> Vec<VideoInputDevice> {
        match self.devices.enumerate_devices() {
            Ok(devices) => {
                log::debug!("Found {} video input device(s)", devices.len());
                devices
            }
            Err(e) => {
                log::warn!("Device enumeration failed: {}", e);
                Vec::new()
            }
        }
    }

    pub fn has_stream(&self) -> bool {
        self.stream.is_some()
    }

    /// Device backing the held stream, if any.
    pub fn active_device(&self) -> Option<&str> {
        self.stream.as_ref().map(|s| s.device_id())
    }

    pub fn video(&self) -> &VideoElement {
        &self.video
    }

    pub fn media_devices(&self) -> &D {
        &self.devices
    }
}

impl<D: MediaDevices> Drop for CaptureController<D> {
    fn drop(&mut self) {
        self.stop();
    }
}
