//! Background capture thread implementation.

use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    CameraFormat, CameraIndex, FrameFormat as NokhwaFrameFormat, RequestedFormat,
    RequestedFormatType,
};
use nokhwa::Camera;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use super::frame_utils::{convert_to_rgb, mirror_horizontal};
use super::types::{CameraError, CameraSettings, Resolution};
use crate::video::FrameBuffer;

/// Commands sent to the capture thread.
pub enum CaptureCommand {
    Stop,
}

/// Run the capture loop in a background thread.
///
/// Reports the negotiated resolution and frame rate (or the open error)
/// through `info_tx` exactly once, then keeps the latest frame in `buffer`
/// until stopped.
pub fn run_capture_loop(
    settings: CameraSettings,
    buffer: FrameBuffer,
    stop: Arc<AtomicBool>,
    rx: Receiver<CaptureCommand>,
    info_tx: Sender<Result<(Resolution, u32), CameraError>>,
) {
    let index = CameraIndex::Index(settings.device_index);

    let mut camera = match open_camera_with_fallback(&index, &settings) {
        Ok(cam) => cam,
        Err(e) => {
            let _ = info_tx.send(Err(e));
            return;
        }
    };

    if let Err(e) = camera.open_stream() {
        let _ = info_tx.send(Err(classify_open_error(&e.to_string())));
        return;
    }

    let res = camera.resolution();
    let actual_res = Resolution {
        width: res.width(),
        height: res.height(),
    };
    let _ = info_tx.send(Ok((actual_res, camera.frame_rate())));

    while !stop.load(Ordering::Relaxed) {
        if let Ok(CaptureCommand::Stop) = rx.try_recv() {
            break;
        }

        if let Ok(raw_frame) = camera.frame() {
            // Undecodable frames are skipped
            if let Some(mut frame) = convert_to_rgb(&raw_frame) {
                if settings.mirror {
                    mirror_horizontal(&mut frame);
                }
                buffer.store(frame);
            }
        }

        thread::sleep(Duration::from_millis(1));
    }

    if let Err(e) = camera.stop_stream() {
        log::debug!("Camera stream stop reported: {}", e);
    }
}

/// Try to open a camera with multiple format fallback strategies.
fn open_camera_with_fallback(
    index: &CameraIndex,
    settings: &CameraSettings,
) -> Result<Camera, CameraError> {
    // NV12 first (native on macOS), then MJPEG, then whatever the camera prefers
    let format_attempts: Vec<RequestedFormat> = vec![
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(CameraFormat::new(
            nokhwa::utils::Resolution::new(settings.resolution.width, settings.resolution.height),
            NokhwaFrameFormat::NV12,
            settings.fps,
        ))),
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(CameraFormat::new(
            nokhwa::utils::Resolution::new(settings.resolution.width, settings.resolution.height),
            NokhwaFrameFormat::MJPEG,
            settings.fps,
        ))),
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestResolution),
    ];

    let mut last_error = String::from("no capture format accepted");

    for requested in format_attempts {
        match Camera::new(index.clone(), requested) {
            Ok(cam) => return Ok(cam),
            Err(e) => {
                log::debug!("Camera format attempt failed: {}", e);
                last_error = e.to_string();
            }
        }
    }

    Err(classify_open_error(&last_error))
}

/// Map a backend error message onto the acquisition failure kinds.
pub(crate) fn classify_open_error(message: &str) -> CameraError {
    let msg = message.to_lowercase();
    if msg.contains("permission")
        || msg.contains("denied")
        || msg.contains("authorization")
        || msg.contains("not authorized")
    {
        CameraError::PermissionDenied
    } else {
        CameraError::NotReadable(message.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_permission_errors() {
        assert_eq!(
            classify_open_error("Access Denied by user"),
            CameraError::PermissionDenied
        );
        assert_eq!(
            classify_open_error("AVFoundation: Permission not granted"),
            CameraError::PermissionDenied
        );
    }

    #[test]
    fn test_classify_busy_device_as_not_readable() {
        assert_eq!(
            classify_open_error("Device or resource busy"),
            CameraError::NotReadable("Device or resource busy".to_string())
        );
    }
}
