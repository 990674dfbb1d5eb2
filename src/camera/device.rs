//! Camera device enumeration.

use nokhwa::query;
use nokhwa::utils::{ApiBackend, CameraIndex};

use super::types::{CameraError, VideoInputDevice};

/// List all video-input devices on the system, in backend order.
///
/// If no cameras are found, returns an empty vector (not an error).
pub fn list_devices() -> Result<Vec<VideoInputDevice>, CameraError> {
    let devices = query(ApiBackend::Auto).map_err(|e| CameraError::QueryFailed(e.to_string()))?;

    Ok(devices
        .into_iter()
        .enumerate()
        .map(|(position, d)| {
            let (device_id, index) = match d.index() {
                CameraIndex::Index(i) => (i.to_string(), *i),
                CameraIndex::String(s) => (s.clone(), position as u32),
            };
            VideoInputDevice {
                device_id,
                index,
                label: d.human_name(),
            }
        })
        .collect())
}

/// Find the device matching an exact identifier.
pub fn find_device<'a>(
    devices: &'a [VideoInputDevice],
    device_id: &str,
) -> Option<&'a VideoInputDevice> {
    devices.iter().find(|d| d.device_id == device_id)
}
