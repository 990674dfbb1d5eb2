//! Scripted camera devices shared by the integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use webcam_studio::camera::{
    CameraError, Frame, MediaConstraints, MediaDevices, MediaStream, VideoInputDevice,
};
use webcam_studio::video::FrameSource;

/// Counters observed across every stream a [`FakeDevices`] hands out.
#[derive(Debug, Default)]
pub struct Stats {
    pub starts: AtomicUsize,
    pub stops: AtomicUsize,
    pub live: AtomicUsize,
    pub max_live: AtomicUsize,
    /// Frames read from a source after its stream was stopped
    pub reads_after_release: AtomicUsize,
    pub requested: Mutex<Vec<Option<String>>>,
}

impl Stats {
    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    pub fn max_live(&self) -> usize {
        self.max_live.load(Ordering::SeqCst)
    }

    pub fn reads_after_release(&self) -> usize {
        self.reads_after_release.load(Ordering::SeqCst)
    }

    pub fn requested(&self) -> Vec<Option<String>> {
        self.requested.lock().unwrap().clone()
    }
}

/// Solid-colour frame source that records reads after release.
pub struct FakeSource {
    frame: Frame,
    released: AtomicBool,
    stats: Arc<Stats>,
}

impl FrameSource for FakeSource {
    fn current_frame(&self) -> Option<Frame> {
        if self.released.load(Ordering::SeqCst) {
            self.stats.reads_after_release.fetch_add(1, Ordering::SeqCst);
            return None;
        }
        Some(self.frame.clone())
    }
}

pub struct FakeStream {
    device_id: String,
    source: Arc<FakeSource>,
    stopped: bool,
}

impl MediaStream for FakeStream {
    fn device_id(&self) -> &str {
        &self.device_id
    }

    fn video_source(&self) -> Arc<dyn FrameSource> {
        self.source.clone()
    }

    fn stop_tracks(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        self.source.released.store(true, Ordering::SeqCst);
        self.source.stats.stops.fetch_add(1, Ordering::SeqCst);
        self.source.stats.live.fetch_sub(1, Ordering::SeqCst);
    }

    fn is_active(&self) -> bool {
        !self.stopped
    }
}

/// Scripted [`MediaDevices`]: each device streams a solid colour.
pub struct FakeDevices {
    pub devices: Vec<(VideoInputDevice, [u8; 3])>,
    pub fail_enumeration: bool,
    pub fail_acquisition: bool,
    pub frame_size: (u32, u32),
    pub stats: Arc<Stats>,
}

impl FakeDevices {
    /// Two cameras: "0" streams red, "1" streams blue.
    pub fn new() -> Self {
        Self {
            devices: vec![
                (device("0", "Front Camera", 0), [255, 0, 0]),
                (device("1", "USB Camera", 1), [0, 0, 255]),
            ],
            fail_enumeration: false,
            fail_acquisition: false,
            frame_size: (70, 50),
            stats: Arc::new(Stats::default()),
        }
    }

    pub fn with_color(mut self, device_id: &str, color: [u8; 3]) -> Self {
        if let Some(entry) = self.devices.iter_mut().find(|(d, _)| d.device_id == device_id) {
            entry.1 = color;
        }
        self
    }

    pub fn failing_enumeration(mut self) -> Self {
        self.fail_enumeration = true;
        self
    }

    pub fn failing_acquisition(mut self) -> Self {
        self.fail_acquisition = true;
        self
    }
}

impl MediaDevices for FakeDevices {
    fn enumerate_devices(&self) -> Result<Vec<VideoInputDevice>, CameraError> {
        if self.fail_enumeration {
            return Err(CameraError::QueryFailed("backend unavailable".to_string()));
        }
        Ok(self.devices.iter().map(|(d, _)| d.clone()).collect())
    }

    fn get_user_media(
        &self,
        constraints: &MediaConstraints,
    ) -> Result<Box<dyn MediaStream>, CameraError> {
        self.stats
            .requested
            .lock()
            .unwrap()
            .push(constraints.device_id.clone());

        if self.fail_acquisition {
            return Err(CameraError::PermissionDenied);
        }

        let (device, color) = match constraints.device_id.as_deref() {
            Some(id) => self
                .devices
                .iter()
                .find(|(d, _)| d.device_id == id)
                .ok_or_else(|| CameraError::DeviceNotFound(id.to_string()))?,
            None => self
                .devices
                .first()
                .ok_or_else(|| CameraError::DeviceNotFound("default".to_string()))?,
        };

        let (w, h) = self.frame_size;
        let data = color
            .iter()
            .copied()
            .cycle()
            .take((w * h * 3) as usize)
            .collect();

        self.stats.starts.fetch_add(1, Ordering::SeqCst);
        let live = self.stats.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.stats.max_live.fetch_max(live, Ordering::SeqCst);

        Ok(Box::new(FakeStream {
            device_id: device.device_id.clone(),
            source: Arc::new(FakeSource {
                frame: Frame::from_rgb(w, h, data),
                released: AtomicBool::new(false),
                stats: Arc::clone(&self.stats),
            }),
            stopped: false,
        }))
    }
}

pub fn device(id: &str, label: &str, index: u32) -> VideoInputDevice {
    VideoInputDevice {
        device_id: id.to_string(),
        label: label.to_string(),
        index,
    }
}

/// Poll `condition` until it holds or `timeout` passes.
pub fn wait_until(timeout: Duration, condition: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    condition()
}
