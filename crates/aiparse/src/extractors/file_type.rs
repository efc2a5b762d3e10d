#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileType {
    pub ext: &'static str,
    pub mime: &'static str,
}

const PNG: FileType = FileType {
    ext: "png",
    mime: "image/png",
};
const JPEG: FileType = FileType {
    ext: "jpg",
    mime: "image/jpeg",
};
const GIF: FileType = FileType {
    ext: "gif",
    mime: "image/gif",
};
const WEBP: FileType = FileType {
    ext: "webp",
    mime: "image/webp",
};
const BMP: FileType = FileType {
    ext: "bmp",
    mime: "image/bmp",
};

/// Identifies an image from its leading magic bytes.
pub fn sniff_file_type(bytes: &[u8]) -> Option<FileType> {
    if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
        Some(PNG)
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some(JPEG)
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        Some(GIF)
    } else if bytes.len() >= 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WEBP" {
        Some(WEBP)
    } else if bytes.starts_with(b"BM") && bytes.len() > 14 {
        Some(BMP)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_known_images() {
        let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];
        assert_eq!(sniff_file_type(&png).map(|t| t.mime), Some("image/png"));

        assert_eq!(sniff_file_type(&[0xFF, 0xD8, 0xFF, 0xE0]).map(|t| t.ext), Some("jpg"));

        let mut webp = b"RIFF".to_vec();
        webp.extend_from_slice(&[0, 0, 0, 0]);
        webp.extend_from_slice(b"WEBPVP8 ");
        assert_eq!(sniff_file_type(&webp).map(|t| t.ext), Some("webp"));
    }

    #[test]
    fn test_sniff_unknown() {
        assert_eq!(sniff_file_type(b"not an image"), None);
        assert_eq!(sniff_file_type(&[]), None);
        assert_eq!(sniff_file_type(b"RIFF1234WAVE"), None);
    }
}
