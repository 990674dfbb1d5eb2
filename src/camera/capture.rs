//! Camera capture handle: one live stream from one device.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;

use super::capture_loop::{run_capture_loop, CaptureCommand};
use super::media::MediaStream;
use super::types::{CameraError, CameraSettings, Resolution};
use crate::video::{FrameBuffer, FrameSource};

/// Camera capture handle.
///
/// The camera is opened inside a background thread that continuously
/// captures frames and stores the latest one in a shared [`FrameBuffer`].
/// Call `start()` to begin capturing and `stop()` to release the device.
pub struct CameraCapture {
    /// Device identifier this stream was opened for
    device_id: String,
    /// Latest captured frame (shared with capture thread)
    frame_buffer: FrameBuffer,
    /// Capture thread handle
    capture_thread: Option<JoinHandle<()>>,
    /// Channel to send commands to capture thread
    command_tx: Option<Sender<CaptureCommand>>,
    /// Signal to stop capture thread
    stop_signal: Arc<AtomicBool>,
    settings: CameraSettings,
    /// Actual resolution (set after camera opens)
    actual_resolution: Option<Resolution>,
    /// Actual FPS (set after camera opens)
    actual_fps: Option<u32>,
}

impl std::fmt::Debug for CameraCapture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraCapture")
            .field("device_id", &self.device_id)
            .field("settings", &self.settings)
            .field("is_running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl CameraCapture {
    /// Prepare a capture for an already-resolved device.
    ///
    /// The camera itself is opened by `start()` on the capture thread.
    pub fn new(device_id: impl Into<String>, settings: CameraSettings) -> Self {
        Self {
            device_id: device_id.into(),
            frame_buffer: FrameBuffer::new(),
            capture_thread: None,
            command_tx: None,
            stop_signal: Arc::new(AtomicBool::new(false)),
            settings,
            actual_resolution: None,
            actual_fps: None,
        }
    }

    pub fn settings(&self) -> &CameraSettings {
        &self.settings
    }

    /// Resolution negotiated with the camera, once started.
    pub fn actual_resolution(&self) -> Option<Resolution> {
        self.actual_resolution
    }

    /// Frame rate negotiated with the camera, once started.
    pub fn actual_fps(&self) -> Option<u32> {
        self.actual_fps
    }

    /// Start capturing frames in a background thread.
    ///
    /// Blocks until the thread reports that the camera stream is open, so
    /// acquisition errors surface here.
    ///
    /// # Errors
    /// * `CameraError::AlreadyRunning` - If capture is already running
    /// * `CameraError::PermissionDenied` - If camera access is denied
    /// * `CameraError::NotReadable` - If the camera fails to open or stream
    pub fn start(&mut self) -> Result<(), CameraError> {
        if self.is_running() {
            return Err(CameraError::AlreadyRunning);
        }

        self.stop_signal.store(false, Ordering::SeqCst);

        let (tx, rx) = mpsc::channel();
        self.command_tx = Some(tx);

        let buffer = self.frame_buffer.clone();
        let stop = Arc::clone(&self.stop_signal);
        let settings = self.settings.clone();
        let (info_tx, info_rx) = mpsc::channel::<Result<(Resolution, u32), CameraError>>();

        let handle = std::thread::spawn(move || {
            run_capture_loop(settings, buffer, stop, rx, info_tx);
        });
        self.capture_thread = Some(handle);

        match info_rx.recv() {
            Ok(Ok((res, fps))) => {
                log::info!(
                    "Camera '{}' streaming at {}x{} @ {} fps",
                    self.device_id,
                    res.width,
                    res.height,
                    fps
                );
                self.actual_resolution = Some(res);
                self.actual_fps = Some(fps);
                Ok(())
            }
            Ok(Err(e)) => {
                self.stop();
                Err(e)
            }
            Err(_) => {
                self.stop();
                Err(CameraError::NotReadable(
                    "Capture thread terminated unexpectedly".to_string(),
                ))
            }
        }
    }

    /// Stop the capture thread and drop the last frame.
    pub fn stop(&mut self) {
        self.stop_signal.store(true, Ordering::SeqCst);

        // Also send stop command via channel (in case thread is blocked)
        if let Some(tx) = self.command_tx.take() {
            let _ = tx.send(CaptureCommand::Stop);
        }

        if let Some(handle) = self.capture_thread.take() {
            let _ = handle.join();
        }

        self.frame_buffer.clear();
    }

    pub fn is_running(&self) -> bool {
        self.capture_thread
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }
}

impl MediaStream for CameraCapture {
    fn device_id(&self) -> &str {
        &self.device_id
    }

    fn video_source(&self) -> Arc<dyn FrameSource> {
        Arc::new(self.frame_buffer.clone())
    }

    fn stop_tracks(&mut self) {
        self.stop();
    }

    fn is_active(&self) -> bool {
        self.is_running()
    }
}

impl Drop for CameraCapture {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_capture_is_idle() {
        let capture = CameraCapture::new("0", CameraSettings::default());
        assert!(!capture.is_running());
        assert!(capture.actual_resolution().is_none());
        assert!(capture.video_source().current_frame().is_none());
    }

    #[test]
    fn test_stop_before_start_is_noop() {
        let mut capture = CameraCapture::new("0", CameraSettings::default());
        capture.stop_tracks();
        capture.stop_tracks();
        assert!(!capture.is_active());
    }
}
