//! The studio: view state, streaming toggle and device selection, wired to
//! the capture controller, render loop and exporter through explicit handlers.
//!
//! Every handler mutates state first and then calls `restart_capture` or
//! `restart_render_loop` directly. Turning streaming off cancels the render
//! loop before the stream is released, so no frame is ever drawn from a
//! released source.

use std::path::PathBuf;
use std::sync::Arc;

use crate::camera::{CameraError, MediaConstraints, MediaDevices, VideoInputDevice};
use crate::canvas::{Canvas, SharedCanvas};
use crate::controller::CaptureController;
use crate::exporter::{ExportError, Exporter};
use crate::render_loop::{RenderLoop, DEFAULT_FPS};
use crate::sync::lock;
use crate::video::VideoElement;
use crate::view::{Filter, ViewState};

/// Default canvas width in pixels.
pub const DEFAULT_CANVAS_WIDTH: u32 = 700;
/// Default canvas height in pixels.
pub const DEFAULT_CANVAS_HEIGHT: u32 = 500;

/// Construction options for a [`Studio`].
#[derive(Debug, Clone)]
pub struct StudioOptions {
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Render loop refresh rate
    pub fps: u32,
    pub view: ViewState,
    /// Device to select before enumeration picks a default
    pub preferred_device: Option<String>,
    /// Request template for the camera
    pub constraints: MediaConstraints,
    pub exporter: Exporter,
}

impl Default for StudioOptions {
    fn default() -> Self {
        Self {
            canvas_width: DEFAULT_CANVAS_WIDTH,
            canvas_height: DEFAULT_CANVAS_HEIGHT,
            fps: DEFAULT_FPS,
            view: ViewState::default(),
            preferred_device: None,
            constraints: MediaConstraints::default(),
            exporter: Exporter::default(),
        }
    }
}

/// The webcam viewer/editor component.
pub struct Studio<D: MediaDevices> {
    view: ViewState,
    streaming: bool,
    devices: Vec<VideoInputDevice>,
    selected_device: Option<String>,
    capture: CaptureController<D>,
    render_loop: RenderLoop,
    canvas: SharedCanvas,
    exporter: Exporter,
    last_error: Option<CameraError>,
}

impl<D: MediaDevices> std::fmt::Debug for Studio<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Studio")
            .field("view", &self.view)
            .field("streaming", &self.streaming)
            .field("selected_device", &self.selected_device)
            .field("devices", &self.devices.len())
            .finish_non_exhaustive()
    }
}

impl<D: MediaDevices> Studio<D> {
    pub fn new(media: D, options: StudioOptions) -> Self {
        let video = VideoElement::new();
        Self {
            view: options.view,
            streaming: false,
            devices: Vec::new(),
            selected_device: options.preferred_device,
            capture: CaptureController::new(media, video, options.constraints),
            render_loop: RenderLoop::new(options.fps),
            canvas: Canvas::new(options.canvas_width, options.canvas_height).shared(),
            exporter: options.exporter,
            last_error: None,
        }
    }

    /// Discover devices; the first one becomes the selection if none is set.
    pub fn refresh_devices(&mut self) -> &[VideoInputDevice] {
        self.devices = self.capture.enumerate_devices();
        if self.selected_device.is_none() {
            if let Some(first) = self.devices.first() {
                log::debug!("Defaulting to device '{}'", first.device_id);
                self.selected_device = Some(first.device_id.clone());
            }
        }
        &self.devices
    }

    pub fn toggle_streaming(&mut self) {
        self.set_streaming(!self.streaming);
    }

    /// Turn streaming on or off. Repeating the current value does nothing.
    pub fn set_streaming(&mut self, streaming: bool) {
        if self.streaming == streaming {
            return;
        }
        self.streaming = streaming;

        if streaming {
            self.restart_capture();
            self.restart_render_loop();
        } else {
            self.release();
        }
    }

    /// Select a device. While streaming, the old stream is stopped once and
    /// the new device started once.
    ///
    /// Returns `false` if `device_id` was already selected.
    pub fn select_device(&mut self, device_id: &str) -> bool {
        if self.selected_device.as_deref() == Some(device_id) {
            return false;
        }
        self.selected_device = Some(device_id.to_string());

        if self.streaming {
            self.render_loop.cancel();
            self.capture.stop();
            self.restart_capture();
            self.restart_render_loop();
        }
        true
    }

    /// Select the device after the current one in the list (wrapping).
    pub fn select_next_device(&mut self) -> bool {
        if self.devices.is_empty() {
            return false;
        }
        let current = self
            .selected_device
            .as_deref()
            .and_then(|id| self.devices.iter().position(|d| d.device_id == id));
        let next = match current {
            Some(i) => (i + 1) % self.devices.len(),
            None => 0,
        };
        let id = self.devices[next].device_id.clone();
        self.select_device(&id)
    }

    pub fn zoom_in(&mut self) {
        self.view.zoom_in();
        self.view_changed();
    }

    pub fn zoom_out(&mut self) {
        self.view.zoom_out();
        self.view_changed();
    }

    /// Select a filter. Re-selecting the current filter changes nothing.
    pub fn set_filter(&mut self, filter: Filter) -> bool {
        let changed = self.view.set_filter(filter);
        if changed {
            self.view_changed();
        }
        changed
    }

    /// Snapshot the canvas and export it.
    pub async fn export(&self) -> Result<PathBuf, ExportError> {
        let snapshot = lock(&self.canvas).clone();
        self.exporter.export(&snapshot).await
    }

    /// Stop everything; the studio can be started again afterwards.
    pub fn shutdown(&mut self) {
        self.streaming = false;
        self.release();
    }

    fn view_changed(&mut self) {
        if self.streaming {
            self.restart_render_loop();
        }
    }

    fn restart_capture(&mut self) {
        let device = self.selected_device.clone();
        self.last_error = self.capture.start(device.as_deref()).err();
    }

    fn restart_render_loop(&mut self) {
        self.render_loop.start(
            self.view,
            self.capture.video().clone(),
            Arc::clone(&self.canvas),
        );
    }

    fn release(&mut self) {
        self.render_loop.cancel();
        self.capture.stop();
    }

    pub fn view(&self) -> ViewState {
        self.view
    }

    pub fn is_streaming(&self) -> bool {
        self.streaming
    }

    /// Whether a camera stream is currently held.
    pub fn has_stream(&self) -> bool {
        self.capture.has_stream()
    }

    pub fn devices(&self) -> &[VideoInputDevice] {
        &self.devices
    }

    pub fn selected_device(&self) -> Option<&str> {
        self.selected_device.as_deref()
    }

    pub fn active_device(&self) -> Option<&str> {
        self.capture.active_device()
    }

    pub fn is_rendering(&self) -> bool {
        self.render_loop.is_running()
    }

    pub fn frames_drawn(&self) -> u64 {
        self.render_loop.frames_drawn()
    }

    /// Error from the most recent acquisition attempt, if it failed.
    pub fn last_error(&self) -> Option<&CameraError> {
        self.last_error.as_ref()
    }

    pub fn canvas(&self) -> SharedCanvas {
        Arc::clone(&self.canvas)
    }

    pub fn video(&self) -> &VideoElement {
        self.capture.video()
    }

    pub fn exporter(&self) -> &Exporter {
        &self.exporter
    }

    pub fn media_devices(&self) -> &D {
        self.capture.media_devices()
    }
}

impl<D: MediaDevices> Drop for Studio<D> {
    fn drop(&mut self) {
        self.release();
    }
}
