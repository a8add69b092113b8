//! Conversion of raw RGB frames into pipeline buffers.

use super::CaptureError;
use crate::frame::{rgb, FrameBuffer};

/// Copy a packed RGB24 image into `target`, scaling with nearest neighbour
/// and optionally flipping left-right.
///
/// # Errors
/// * `CaptureError::StreamFailed` - If `data` is shorter than `width * height * 3`
pub fn blit_rgb(
    data: &[u8],
    width: u32,
    height: u32,
    target: &mut FrameBuffer,
    mirror: bool,
) -> Result<(), CaptureError> {
    let expected = width as usize * height as usize * 3;
    if width == 0 || height == 0 || data.len() < expected {
        return Err(CaptureError::StreamFailed(format!(
            "short frame: {} bytes for {}x{}",
            data.len(),
            width,
            height
        )));
    }

    let dst_w = target.width();
    let dst_h = target.height();
    // Source column for every destination column, computed once per frame
    let columns: Vec<usize> = (0..dst_w)
        .map(|x| {
            let x = if mirror { dst_w - 1 - x } else { x };
            (x as u64 * width as u64 / dst_w as u64) as usize
        })
        .collect();

    for y in 0..dst_h {
        let src_y = (y as u64 * height as u64 / dst_h as u64) as usize;
        let src_row = &data[src_y * width as usize * 3..(src_y + 1) * width as usize * 3];
        for (dst, &src_x) in target.row_mut(y).iter_mut().zip(&columns) {
            let i = src_x * 3;
            *dst = rgb(src_row[i], src_row[i + 1], src_row[i + 2]);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{FrameFormat, Resolution, Scale};

    fn buffer(width: u32, height: u32) -> FrameBuffer {
        FrameBuffer::allocate(FrameFormat::new(Resolution { width, height }, Scale::Single))
            .unwrap()
    }

    #[test]
    fn test_blit_same_size() {
        let mut target = buffer(2, 1);
        blit_rgb(&[1, 2, 3, 4, 5, 6], 2, 1, &mut target, false).unwrap();
        assert_eq!(target.pixels(), &[0x010203, 0x040506]);
    }

    #[test]
    fn test_blit_mirrored() {
        let mut target = buffer(2, 1);
        blit_rgb(&[1, 2, 3, 4, 5, 6], 2, 1, &mut target, true).unwrap();
        assert_eq!(target.pixels(), &[0x040506, 0x010203]);
    }

    #[test]
    fn test_blit_upscales_nearest_neighbour() {
        let mut target = buffer(4, 2);
        blit_rgb(&[10, 0, 0, 20, 0, 0], 2, 1, &mut target, false).unwrap();
        assert_eq!(
            target.pixels(),
            &[
                0x0a0000, 0x0a0000, 0x140000, 0x140000, // row 0
                0x0a0000, 0x0a0000, 0x140000, 0x140000, // row 1
            ]
        );
    }

    #[test]
    fn test_blit_downscales() {
        let mut target = buffer(1, 1);
        blit_rgb(&[9, 9, 9, 1, 1, 1, 2, 2, 2, 3, 3, 3], 2, 2, &mut target, false).unwrap();
        assert_eq!(target.pixels(), &[0x090909]);
    }

    #[test]
    fn test_blit_rejects_short_frame() {
        let mut target = buffer(2, 2);
        assert!(matches!(
            blit_rgb(&[0; 5], 2, 1, &mut target, false),
            Err(CaptureError::StreamFailed(_))
        ));
    }
}
