//! Live camera source backed by nokhwa.
//!
//! A background thread keeps the latest decoded frame in a shared slot.
//! [`CameraSource::grab`] waits for a frame newer than the last one it
//! returned, so the pipeline never reads the same frame twice and never
//! sees a partially decoded one.

use nokhwa::query;
use nokhwa::utils::ApiBackend;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::camera_loop::{run_capture_loop, FrameSlot, LoopSettings};
use super::convert::blit_rgb;
use super::{CameraInfo, CaptureConfig, CaptureError, CaptureSource};
use crate::frame::{FrameBuffer, FrameFormat};

/// How long `grab` waits for a fresh frame before giving up.
const FRAME_TIMEOUT: Duration = Duration::from_secs(2);
const POLL_INTERVAL: Duration = Duration::from_millis(2);

/// List all camera devices on the system.
///
/// An empty list is not an error.
pub fn list_devices() -> Result<Vec<CameraInfo>, CaptureError> {
    let devices = query(ApiBackend::Auto).map_err(|e| CaptureError::QueryFailed(e.to_string()))?;

    Ok(devices
        .into_iter()
        .map(|d| CameraInfo {
            index: d.index().as_index().unwrap_or(0),
            name: d.human_name(),
            description: d.description().to_string(),
        })
        .collect())
}

pub struct CameraSource {
    index: u32,
    fps: u32,
    mirror: bool,
    slot: FrameSlot,
    stop_signal: Arc<AtomicBool>,
    capture_thread: Option<JoinHandle<()>>,
    last_sequence: u64,
}

impl std::fmt::Debug for CameraSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraSource")
            .field("index", &self.index)
            .field("fps", &self.fps)
            .field("running", &self.capture_thread.is_some())
            .finish_non_exhaustive()
    }
}

impl CameraSource {
    /// Check that the device exists. The stream is opened by [`start`](Self::start).
    ///
    /// # Errors
    /// * `CaptureError::ChannelNotFound` - Cameras expose a single channel, 0
    /// * `CaptureError::DeviceNotFound` - If no camera has this index
    pub fn open(index: u32, config: &CaptureConfig) -> Result<Self, CaptureError> {
        if config.channel != 0 {
            return Err(CaptureError::ChannelNotFound {
                device: format!("camera {}", index),
                channel: config.channel,
            });
        }
        let devices = list_devices()?;
        if !devices.iter().any(|d| d.index == index) {
            return Err(CaptureError::DeviceNotFound(index));
        }

        Ok(Self {
            index,
            fps: config.norm.frame_rate(),
            mirror: config.mirror,
            slot: Arc::new(Mutex::new(None)),
            stop_signal: Arc::new(AtomicBool::new(false)),
            capture_thread: None,
            last_sequence: 0,
        })
    }

    /// Spawn the capture thread and wait until the stream is open.
    pub fn start(&mut self, format: FrameFormat) -> Result<(), CaptureError> {
        self.stop_signal.store(false, Ordering::SeqCst);

        let settings = LoopSettings {
            index: self.index,
            width: format.resolution.width,
            height: format.resolution.height,
            fps: self.fps,
        };
        let slot = Arc::clone(&self.slot);
        let stop = Arc::clone(&self.stop_signal);
        let (info_tx, info_rx) = mpsc::channel();

        self.capture_thread = Some(thread::spawn(move || {
            run_capture_loop(settings, slot, stop, info_tx);
        }));

        match info_rx.recv() {
            Ok(Ok(info)) => {
                self.fps = info.fps;
                log::info!(
                    "camera {} streaming {}x{} @ {} fps",
                    self.index,
                    info.width,
                    info.height,
                    info.fps
                );
                Ok(())
            }
            Ok(Err(e)) => {
                self.stop();
                Err(e)
            }
            Err(_) => {
                self.stop();
                Err(CaptureError::StreamFailed(
                    "capture thread terminated unexpectedly".to_string(),
                ))
            }
        }
    }

    /// Signal the capture thread to stop and wait for it.
    pub fn stop(&mut self) {
        self.stop_signal.store(true, Ordering::SeqCst);
        if let Some(handle) = self.capture_thread.take() {
            let _ = handle.join();
        }
    }
}

impl CaptureSource for CameraSource {
    fn describe(&self) -> String {
        format!("camera {} @ {} fps", self.index, self.fps)
    }

    fn grab(&mut self, target: &mut FrameBuffer) -> Result<(), CaptureError> {
        let deadline = Instant::now() + FRAME_TIMEOUT;
        loop {
            {
                let latest = self.slot.lock().map_err(|_| {
                    CaptureError::StreamFailed("capture thread panicked".to_string())
                })?;
                if let Some(frame) = latest.as_ref() {
                    if frame.sequence > self.last_sequence {
                        blit_rgb(&frame.data, frame.width, frame.height, target, self.mirror)?;
                        self.last_sequence = frame.sequence;
                        return Ok(());
                    }
                }
            }
            if Instant::now() >= deadline {
                return Err(CaptureError::Timeout);
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

impl Drop for CameraSource {
    fn drop(&mut self) {
        self.stop();
    }
}
