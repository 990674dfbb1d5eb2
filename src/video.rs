//! The video element: the slot a live stream is attached to.
//!
//! The render loop only ever reads frames through a [`VideoElement`]. The
//! capture controller attaches a stream's [`FrameSource`] on start and clears
//! it on stop, so a cleared element yields no frames.

use std::sync::{Arc, Mutex};

use crate::camera::Frame;
use crate::sync::lock;

/// Something that produces the most recent video frame.
pub trait FrameSource: Send + Sync {
    /// The latest decoded frame, or `None` if nothing has arrived yet.
    fn current_frame(&self) -> Option<Frame>;
}

/// Shared latest-frame buffer written by a capture thread.
#[derive(Debug, Clone, Default)]
pub struct FrameBuffer {
    inner: Arc<Mutex<Option<Frame>>>,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored frame.
    pub fn store(&self, frame: Frame) {
        *lock(&self.inner) = Some(frame);
    }

    /// Drop the stored frame.
    pub fn clear(&self) {
        *lock(&self.inner) = None;
    }
}

impl FrameSource for FrameBuffer {
    fn current_frame(&self) -> Option<Frame> {
        lock(&self.inner).clone()
    }
}

/// Cloneable handle to the video element's source object.
#[derive(Clone, Default)]
pub struct VideoElement {
    src_object: Arc<Mutex<Option<Arc<dyn FrameSource>>>>,
}

impl std::fmt::Debug for VideoElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoElement")
            .field("has_source", &self.has_source())
            .finish()
    }
}

impl VideoElement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach (`Some`) or clear (`None`) the source.
    pub fn set_src_object(&self, source: Option<Arc<dyn FrameSource>>) {
        *lock(&self.src_object) = source;
    }

    pub fn has_source(&self) -> bool {
        lock(&self.src_object).is_some()
    }

    /// Read the current frame from the attached source.
    ///
    /// The source lock is released before the frame is fetched so that a
    /// concurrent `set_src_object` never waits on frame decoding.
    pub fn current_frame(&self) -> Option<Frame> {
        let source = lock(&self.src_object).clone()?;
        source.current_frame()
    }
}
