//! Frame annotation and JPEG encoding
//!
//! Overlays fixed-position alert banners and the monitored face region on a
//! frame, then encodes it for the multipart stream. Text is rendered with a
//! small built-in block font; no font file is shipped with the binary.

use camera_capture::VideoFrame;
use detection::FrameAnalysis;
use image::{ImageEncoder, Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

const RED: Rgb<u8> = Rgb([255, 0, 0]);
const YELLOW: Rgb<u8> = Rgb([255, 255, 0]);
const GREEN: Rgb<u8> = Rgb([0, 255, 0]);

const DROWSY_BANNER: &str = "DROWSINESS DETECTED!";
const YAWN_BANNER: &str = "YAWNING DETECTED";

/// JPEG quality for the transport stream
const JPEG_QUALITY: u8 = 80;

/// Overlay alert banners and the face region onto a copy of the frame.
///
/// Returns `None` only if the frame buffer does not match its dimensions.
pub fn annotate(frame: &VideoFrame, analysis: &FrameAnalysis) -> Option<RgbImage> {
    let mut image = RgbImage::from_raw(frame.width, frame.height, frame.data.clone())?;

    if let Some(region) = &analysis.region {
        let rect = Rect::at(region.x as i32, region.y as i32)
            .of_size(region.width.max(1.0) as u32, region.height.max(1.0) as u32);
        draw_hollow_rect_mut(&mut image, rect, GREEN);
    }

    if analysis.flags.drowsy {
        draw_label(&mut image, DROWSY_BANNER, 10, 30, RED);
    }
    if analysis.flags.yawning {
        draw_label(&mut image, YAWN_BANNER, 10, 60, YELLOW);
    }

    Some(image)
}

/// Encode an annotated frame to JPEG
pub fn encode_jpeg(image: &RgbImage) -> Result<Vec<u8>, image::ImageError> {
    let mut buffer = Vec::new();
    let encoder =
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, JPEG_QUALITY);
    encoder.write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        image::ExtendedColorType::Rgb8,
    )?;
    Ok(buffer)
}

const GLYPH_WIDTH: u32 = 5;
const GLYPH_HEIGHT: u32 = 7;
const GLYPH_SCALE: u32 = 2;

/// Draw uppercase block text with its top-left corner at (x, y)
pub fn draw_label(image: &mut RgbImage, text: &str, x: u32, y: u32, color: Rgb<u8>) {
    let advance = (GLYPH_WIDTH + 1) * GLYPH_SCALE;
    for (i, ch) in text.chars().enumerate() {
        draw_glyph(image, ch, x + i as u32 * advance, y, color);
    }
}

fn draw_glyph(image: &mut RgbImage, ch: char, x: u32, y: u32, color: Rgb<u8>) {
    let rows = glyph(ch);
    for (row, bits) in rows.iter().enumerate() {
        for col in 0..GLYPH_WIDTH {
            if bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                continue;
            }
            for dy in 0..GLYPH_SCALE {
                for dx in 0..GLYPH_SCALE {
                    let px = x + col * GLYPH_SCALE + dx;
                    let py = y + row as u32 * GLYPH_SCALE + dy;
                    if px < image.width() && py < image.height() {
                        image.put_pixel(px, py, color);
                    }
                }
            }
        }
    }
}

/// 5x7 bitmaps for the characters the banners use
fn glyph(ch: char) -> [u8; GLYPH_HEIGHT as usize] {
    match ch {
        'A' => [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'C' => [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E],
        'D' => [0x1E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x1E],
        'E' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F],
        'G' => [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0E],
        'I' => [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E],
        'N' => [0x11, 0x19, 0x15, 0x13, 0x11, 0x11, 0x11],
        'O' => [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'R' => [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11],
        'S' => [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E],
        'T' => [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04],
        'W' => [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0A],
        'Y' => [0x11, 0x11, 0x0A, 0x04, 0x04, 0x04, 0x04],
        '!' => [0x04, 0x04, 0x04, 0x04, 0x04, 0x00, 0x04],
        _ => [0; 7],
    }
}
