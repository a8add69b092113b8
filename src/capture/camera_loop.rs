//! Background capture thread for the camera source.

use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    CameraFormat, CameraIndex, FrameFormat as NokhwaFrameFormat, RequestedFormat,
    RequestedFormatType, Resolution as NokhwaResolution,
};
use nokhwa::Camera;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use super::CaptureError;

/// The most recent complete frame decoded by the capture thread.
pub struct RawFrame {
    /// Packed RGB24
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Increases by one per decoded frame
    pub sequence: u64,
}

/// Shared slot holding the latest frame.
pub type FrameSlot = Arc<Mutex<Option<RawFrame>>>;

/// What the thread reports once the stream is open.
pub struct StreamInfo {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
}

pub struct LoopSettings {
    pub index: u32,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
}

/// Run the capture loop until `stop` is set.
///
/// The camera is opened on this thread; the outcome is reported once
/// through `info_tx` before any frame is stored.
pub fn run_capture_loop(
    settings: LoopSettings,
    slot: FrameSlot,
    stop: Arc<AtomicBool>,
    info_tx: Sender<Result<StreamInfo, CaptureError>>,
) {
    let mut camera = match open_camera_with_fallback(&settings) {
        Ok(cam) => cam,
        Err(e) => {
            let _ = info_tx.send(Err(e));
            return;
        }
    };

    if let Err(e) = camera.open_stream() {
        let _ = info_tx.send(Err(CaptureError::StreamFailed(e.to_string())));
        return;
    }

    let res = camera.resolution();
    let _ = info_tx.send(Ok(StreamInfo {
        width: res.width(),
        height: res.height(),
        fps: camera.frame_rate(),
    }));

    let mut sequence = 0u64;
    while !stop.load(Ordering::Relaxed) {
        match camera.frame() {
            Ok(buffer) => {
                // Frames that fail to decode are skipped
                if let Ok(decoded) = buffer.decode_image::<RgbFormat>() {
                    sequence += 1;
                    let resolution = buffer.resolution();
                    let frame = RawFrame {
                        data: decoded.into_raw(),
                        width: resolution.width(),
                        height: resolution.height(),
                        sequence,
                    };
                    match slot.lock() {
                        Ok(mut latest) => *latest = Some(frame),
                        Err(_) => break,
                    }
                }
            }
            Err(e) => {
                log::debug!("camera frame error: {}", e);
                thread::sleep(Duration::from_millis(5));
            }
        }
    }

    let _ = camera.stop_stream();
}

/// Try the formats cameras most commonly offer, then let the camera decide.
fn open_camera_with_fallback(settings: &LoopSettings) -> Result<Camera, CaptureError> {
    let index = CameraIndex::Index(settings.index);
    let wanted = NokhwaResolution::new(settings.width, settings.height);
    let attempts = [
        RequestedFormatType::Closest(CameraFormat::new(
            wanted,
            NokhwaFrameFormat::YUYV,
            settings.fps,
        )),
        RequestedFormatType::Closest(CameraFormat::new(
            wanted,
            NokhwaFrameFormat::MJPEG,
            settings.fps,
        )),
        RequestedFormatType::AbsoluteHighestFrameRate,
    ];

    let mut last_error = None;
    for requested in attempts {
        match Camera::new(index.clone(), RequestedFormat::new::<RgbFormat>(requested)) {
            Ok(cam) => return Ok(cam),
            Err(e) => last_error = Some(e),
        }
    }

    Err(CaptureError::OpenFailed(
        last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no usable camera format".to_string()),
    ))
}
