//! Per-frame repaint of the live video onto the canvas.
//!
//! [`draw_frame`] is one tick: clear, set filter, compute the centred zoom
//! rectangle, draw. [`RenderLoop`] runs ticks on a background thread paced
//! to the configured refresh rate. A running loop renders one fixed
//! [`ViewState`]; changing the view means restarting the loop.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::camera::frame_to_rgba;
use crate::canvas::{Canvas, SharedCanvas};
use crate::sync::lock;
use crate::video::VideoElement;
use crate::view::ViewState;

/// Default refresh rate of the render loop.
pub const DEFAULT_FPS: u32 = 60;

/// Paint the current video frame onto `canvas` using `view`.
///
/// Returns `true` if a frame was drawn. With no source attached (or no frame
/// decoded yet) the canvas is left cleared.
pub fn draw_frame(canvas: &mut Canvas, video: &VideoElement, view: &ViewState) -> bool {
    canvas.clear();
    canvas.set_filter(view.filter.css());

    let rect = view.dest_rect(canvas.width(), canvas.height());

    let Some(frame) = video.current_frame() else {
        return false;
    };
    let Some(image) = frame_to_rgba(&frame) else {
        log::warn!(
            "Dropping malformed {}x{} frame ({} bytes)",
            frame.width,
            frame.height,
            frame.data.len()
        );
        return false;
    };

    canvas.draw_image(&image, rect.x, rect.y, rect.width, rect.height);
    true
}

/// Handle to the background repaint thread.
pub struct RenderLoop {
    thread: Option<JoinHandle<()>>,
    stop_signal: Arc<AtomicBool>,
    frames_drawn: Arc<AtomicU64>,
    frame_interval: Duration,
}

impl std::fmt::Debug for RenderLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderLoop")
            .field("frame_interval", &self.frame_interval)
            .field("is_running", &self.is_running())
            .field("frames_drawn", &self.frames_drawn())
            .finish()
    }
}

impl Default for RenderLoop {
    fn default() -> Self {
        Self::new(DEFAULT_FPS)
    }
}

impl RenderLoop {
    /// Create an idle loop that will tick `fps` times per second.
    pub fn new(fps: u32) -> Self {
        Self {
            thread: None,
            stop_signal: Arc::new(AtomicBool::new(false)),
            frames_drawn: Arc::new(AtomicU64::new(0)),
            frame_interval: Duration::from_secs(1) / fps.max(1),
        }
    }

    pub fn frame_interval(&self) -> Duration {
        self.frame_interval
    }

    /// Start (or restart) the loop for `view`.
    ///
    /// Any running loop is cancelled and joined first, so at most one loop
    /// ever paints the canvas.
    pub fn start(&mut self, view: ViewState, video: VideoElement, canvas: SharedCanvas) {
        self.cancel();

        let stop = Arc::new(AtomicBool::new(false));
        self.stop_signal = Arc::clone(&stop);
        let frames = Arc::clone(&self.frames_drawn);
        let interval = self.frame_interval;

        log::debug!(
            "Starting render loop (filter={}, zoom={:.3})",
            view.filter,
            view.zoom_in_scale
        );

        let handle = thread::spawn(move || {
            while !stop.load(Ordering::SeqCst) {
                let deadline = Instant::now() + interval;

                let drawn = {
                    let mut canvas = lock(&canvas);
                    draw_frame(&mut canvas, &video, &view)
                };
                if drawn {
                    frames.fetch_add(1, Ordering::Relaxed);
                }

                // Wait for the next refresh; cancel() unparks us early
                loop {
                    if stop.load(Ordering::SeqCst) {
                        return;
                    }
                    let now = Instant::now();
                    if now >= deadline {
                        break;
                    }
                    thread::park_timeout(deadline - now);
                }
            }
        });

        self.thread = Some(handle);
    }

    /// Cancel the pending reschedule and wait for the loop thread to exit.
    ///
    /// After this returns no further frame is drawn. Safe to call when idle.
    pub fn cancel(&mut self) {
        self.stop_signal.store(true, Ordering::SeqCst);
        if let Some(handle) = self.thread.take() {
            handle.thread().unpark();
            if handle.join().is_err() {
                log::error!("Render loop thread panicked");
            }
            log::debug!("Render loop cancelled");
        }
    }

    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Total frames painted since this loop handle was created.
    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn.load(Ordering::Relaxed)
    }
}

impl Drop for RenderLoop {
    fn drop(&mut self) {
        self.cancel();
    }
}
