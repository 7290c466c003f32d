//! Image attachment formats and `data:` URI encoding.
//!
//! Only PNG and JPEG are accepted anywhere in the client; everything else is
//! silently dropped by the callers.

use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum DataUriError {
    #[error("not a data URI")]
    NotADataUri,
    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),
    #[error("invalid base64 payload")]
    InvalidBase64,
}

impl ImageFormat {
    /// Short label for attachment chips in the UI.
    pub fn label(self) -> &'static str {
        match self {
            ImageFormat::Png => "PNG",
            ImageFormat::Jpeg => "JPEG",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
        }
    }

    /// Declared-type detection from a file extension. `jpg` is accepted as
    /// an alias for `jpeg`, matching the accept list of the original
    /// file picker.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("png") => Some(ImageFormat::Png),
            Some("jpg") | Some("jpeg") => Some(ImageFormat::Jpeg),
            _ => None,
        }
    }

    /// Content sniffing from magic bytes, used for clipboard payloads that
    /// carry no declared type.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";
        const JPEG_MAGIC: &[u8] = b"\xff\xd8\xff";
        if bytes.starts_with(PNG_MAGIC) {
            Some(ImageFormat::Png)
        } else if bytes.starts_with(JPEG_MAGIC) {
            Some(ImageFormat::Jpeg)
        } else {
            None
        }
    }

    /// Encode raw image bytes as a `data:` URI, the string form used both
    /// for preview bookkeeping and transmission.
    pub fn to_data_uri(self, bytes: &[u8]) -> String {
        format!("data:{};base64,{}", self.mime(), BASE64.encode(bytes))
    }
}

/// Parse a `data:` URI produced by [`ImageFormat::to_data_uri`] back into
/// its format and payload. Primarily a diagnostic/testing aid; the client
/// itself never decodes attachments.
pub fn parse_data_uri(uri: &str) -> Result<(ImageFormat, Vec<u8>), DataUriError> {
    let rest = uri.strip_prefix("data:").ok_or(DataUriError::NotADataUri)?;
    let (header, payload) = rest.split_once(";base64,").ok_or(DataUriError::NotADataUri)?;
    let format = match header {
        "image/png" => ImageFormat::Png,
        "image/jpeg" | "image/jpg" => ImageFormat::Jpeg,
        other => return Err(DataUriError::UnsupportedMediaType(other.to_string())),
    };
    let bytes = BASE64
        .decode(payload)
        .map_err(|_| DataUriError::InvalidBase64)?;
    Ok((format, bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn declared_type_from_extension() {
        assert_eq!(
            ImageFormat::from_path(Path::new("/a/b/shot.PNG")),
            Some(ImageFormat::Png)
        );
        assert_eq!(
            ImageFormat::from_path(Path::new("pic.jpg")),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(
            ImageFormat::from_path(Path::new("pic.JPEG")),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(ImageFormat::from_path(Path::new("anim.gif")), None);
        assert_eq!(ImageFormat::from_path(Path::new("noext")), None);
    }

    #[test]
    fn sniffs_magic_bytes() {
        assert_eq!(
            ImageFormat::sniff(b"\x89PNG\r\n\x1a\n....."),
            Some(ImageFormat::Png)
        );
        assert_eq!(
            ImageFormat::sniff(b"\xff\xd8\xff\xe0JFIF"),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(ImageFormat::sniff(b"GIF89a"), None);
        assert_eq!(ImageFormat::sniff(b""), None);
    }

    #[test]
    fn data_uri_round_trips() {
        let bytes = b"\x89PNG\r\n\x1a\nfake-payload";
        let uri = ImageFormat::Png.to_data_uri(bytes);
        assert!(uri.starts_with("data:image/png;base64,"));

        let (format, decoded) = parse_data_uri(&uri).expect("parse");
        assert_eq!(format, ImageFormat::Png);
        assert_eq!(decoded, bytes);
    }

    #[test]
    fn rejects_non_image_data_uris() {
        assert_eq!(
            parse_data_uri("data:text/plain;base64,aGk="),
            Err(DataUriError::UnsupportedMediaType("text/plain".to_string()))
        );
        assert_eq!(parse_data_uri("http://x/y.png"), Err(DataUriError::NotADataUri));
        assert_eq!(
            parse_data_uri("data:image/png;base64,!!!"),
            Err(DataUriError::InvalidBase64)
        );
    }
}
