//! System clipboard bridge (arboard).
//!
//! Two one-shot operations: copying a message body out, and pulling pasted
//! image data in. A fresh `Clipboard` handle is opened per call; failures
//! are logged and reported as absence, never surfaced to the user.

use nesti_protocol::ImageFormat;

/// Copy `text` to the system clipboard. Returns whether the write
/// succeeded; failures are logged only.
pub(crate) fn copy_text(text: &str) -> bool {
    let mut clipboard = match arboard::Clipboard::new() {
        Ok(clipboard) => clipboard,
        Err(err) => {
            tracing::warn!("clipboard unavailable: {err}");
            return false;
        }
    };
    match clipboard.set_text(text) {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!("clipboard write failed: {err}");
            false
        }
    }
}

/// Read raw image data off the clipboard and encode it as a PNG data URI.
///
/// Blocking (arboard talks to the windowing system); call from
/// `spawn_blocking`.
pub(crate) fn read_image_data_uri() -> Option<String> {
    let mut clipboard = match arboard::Clipboard::new() {
        Ok(clipboard) => clipboard,
        Err(err) => {
            tracing::warn!("clipboard unavailable: {err}");
            return None;
        }
    };
    let image = match clipboard.get_image() {
        Ok(image) => image,
        Err(err) => {
            tracing::debug!("no image on clipboard: {err}");
            return None;
        }
    };

    encode_rgba_as_png_data_uri(&image.bytes, image.width, image.height)
}

fn encode_rgba_as_png_data_uri(rgba: &[u8], width: usize, height: usize) -> Option<String> {
    use image::ImageEncoder as _;

    let (Ok(width), Ok(height)) = (u32::try_from(width), u32::try_from(height)) else {
        return None;
    };
    if (width as usize) * (height as usize) * 4 != rgba.len() {
        tracing::warn!("clipboard image has inconsistent dimensions, dropping");
        return None;
    }

    let mut png = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut png);
    if let Err(err) = encoder.write_image(rgba, width, height, image::ExtendedColorType::Rgba8) {
        tracing::warn!("failed to encode clipboard image: {err}");
        return None;
    }
    Some(ImageFormat::Png.to_data_uri(&png))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nesti_protocol::image_data::parse_data_uri;
    use pretty_assertions::assert_eq;

    #[test]
    fn encodes_rgba_pixels_as_png_data_uri() {
        // 2x1 image: one red pixel, one transparent pixel.
        let rgba = [255, 0, 0, 255, 0, 0, 0, 0];
        let uri = encode_rgba_as_png_data_uri(&rgba, 2, 1).expect("encode");

        let (format, bytes) = parse_data_uri(&uri).expect("parse");
        assert_eq!(format, ImageFormat::Png);
        assert_eq!(ImageFormat::sniff(&bytes), Some(ImageFormat::Png));
    }

    #[test]
    fn rejects_inconsistent_dimensions() {
        let rgba = [0u8; 8];
        assert_eq!(encode_rgba_as_png_data_uri(&rgba, 3, 1), None);
    }
}
