//! Content type sniffing
//!
//! Classifies a body from its first [`SNIFF_LEN`] bytes, ignoring whatever
//! the server claims in `Content-Type`. The signature table follows the
//! WHATWG MIME sniffing standard: markup signatures tolerate leading
//! whitespace, binary signatures must appear at offset zero, and anything
//! unrecognised is either `text/plain` or `application/octet-stream`
//! depending on whether it contains binary control bytes.

/// Number of leading bytes examined
pub const SNIFF_LEN: usize = 512;

/// Returned for unrecognised content containing binary bytes
pub const FALLBACK_MIME: &str = "application/octet-stream";

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

enum Signature {
    /// Case-insensitive tag followed by a space or `>`, after optional whitespace
    HtmlTag(&'static [u8]),
    /// Exact prefix, optionally after leading whitespace
    Exact {
        prefix: &'static [u8],
        skip_whitespace: bool,
        mime: &'static str,
    },
    /// `pattern` compared under `mask` at offset zero
    Masked {
        mask: &'static [u8],
        pattern: &'static [u8],
        mime: &'static str,
    },
    /// MP4 `ftyp` box
    Mp4,
}

const HTML_MIME: &str = "text/html; charset=utf-8";

const SIGNATURES: &[Signature] = &[
    Signature::HtmlTag(b"<!DOCTYPE HTML"),
    Signature::HtmlTag(b"<HTML"),
    Signature::HtmlTag(b"<HEAD"),
    Signature::HtmlTag(b"<SCRIPT"),
    Signature::HtmlTag(b"<IFRAME"),
    Signature::HtmlTag(b"<H1"),
    Signature::HtmlTag(b"<DIV"),
    Signature::HtmlTag(b"<FONT"),
    Signature::HtmlTag(b"<TABLE"),
    Signature::HtmlTag(b"<A"),
    Signature::HtmlTag(b"<STYLE"),
    Signature::HtmlTag(b"<TITLE"),
    Signature::HtmlTag(b"<B"),
    Signature::HtmlTag(b"<BODY"),
    Signature::HtmlTag(b"<BR"),
    Signature::HtmlTag(b"<P"),
    Signature::HtmlTag(b"<!--"),
    Signature::Exact {
        prefix: b"<?xml",
        skip_whitespace: true,
        mime: "text/xml; charset=utf-8",
    },
    Signature::Exact {
        prefix: b"%PDF-",
        skip_whitespace: false,
        mime: "application/pdf",
    },
    Signature::Exact {
        prefix: b"%!PS-Adobe-",
        skip_whitespace: false,
        mime: "application/postscript",
    },
    // byte order marks
    Signature::Exact {
        prefix: b"\xFE\xFF",
        skip_whitespace: false,
        mime: "text/plain; charset=utf-16be",
    },
    Signature::Exact {
        prefix: b"\xFF\xFE",
        skip_whitespace: false,
        mime: "text/plain; charset=utf-16le",
    },
    Signature::Exact {
        prefix: b"\xEF\xBB\xBF",
        skip_whitespace: false,
        mime: TEXT_PLAIN,
    },
    // images
    Signature::Exact {
        prefix: b"\x00\x00\x01\x00",
        skip_whitespace: false,
        mime: "image/x-icon",
    },
    Signature::Exact {
        prefix: b"\x00\x00\x02\x00",
        skip_whitespace: false,
        mime: "image/x-icon",
    },
    Signature::Exact {
        prefix: b"BM",
        skip_whitespace: false,
        mime: "image/bmp",
    },
    Signature::Exact {
        prefix: b"GIF87a",
        skip_whitespace: false,
        mime: "image/gif",
    },
    Signature::Exact {
        prefix: b"GIF89a",
        skip_whitespace: false,
        mime: "image/gif",
    },
    Signature::Masked {
        mask: b"\xFF\xFF\xFF\xFF\x00\x00\x00\x00\xFF\xFF\xFF\xFF\xFF\xFF",
        pattern: b"RIFF\x00\x00\x00\x00WEBPVP",
        mime: "image/webp",
    },
    Signature::Exact {
        prefix: b"\x89PNG\x0D\x0A\x1A\x0A",
        skip_whitespace: false,
        mime: "image/png",
    },
    Signature::Exact {
        prefix: b"\xFF\xD8\xFF",
        skip_whitespace: false,
        mime: "image/jpeg",
    },
    // audio and video
    Signature::Masked {
        mask: b"\xFF\xFF\xFF\xFF\x00\x00\x00\x00\xFF\xFF\xFF\xFF",
        pattern: b"FORM\x00\x00\x00\x00AIFF",
        mime: "audio/aiff",
    },
    Signature::Exact {
        prefix: b"ID3",
        skip_whitespace: false,
        mime: "audio/mpeg",
    },
    Signature::Exact {
        prefix: b"OggS\x00",
        skip_whitespace: false,
        mime: "application/ogg",
    },
    Signature::Masked {
        mask: b"\xFF\xFF\xFF\xFF\x00\x00\x00\x00\xFF\xFF\xFF\xFF",
        pattern: b"RIFF\x00\x00\x00\x00WAVE",
        mime: "audio/wave",
    },
    Signature::Masked {
        mask: b"\xFF\xFF\xFF\xFF\x00\x00\x00\x00\xFF\xFF\xFF\xFF",
        pattern: b"RIFF\x00\x00\x00\x00AVI ",
        mime: "video/avi",
    },
    Signature::Mp4,
    Signature::Exact {
        prefix: b"\x1A\x45\xDF\xA3",
        skip_whitespace: false,
        mime: "video/webm",
    },
    // fonts
    Signature::Exact {
        prefix: b"wOFF",
        skip_whitespace: false,
        mime: "font/woff",
    },
    Signature::Exact {
        prefix: b"wOF2",
        skip_whitespace: false,
        mime: "font/woff2",
    },
    // archives
    Signature::Exact {
        prefix: b"\x1F\x8B\x08",
        skip_whitespace: false,
        mime: "application/x-gzip",
    },
    Signature::Exact {
        prefix: b"PK\x03\x04",
        skip_whitespace: false,
        mime: "application/zip",
    },
    Signature::Exact {
        prefix: b"Rar!\x1A\x07\x00",
        skip_whitespace: false,
        mime: "application/x-rar-compressed",
    },
    Signature::Exact {
        prefix: b"Rar!\x1A\x07\x01\x00",
        skip_whitespace: false,
        mime: "application/x-rar-compressed",
    },
    Signature::Exact {
        prefix: b"\x00\x61\x73\x6D",
        skip_whitespace: false,
        mime: "application/wasm",
    },
];

/// Returns the MIME type of `data`, looking at no more than [`SNIFF_LEN`] bytes
///
/// Never fails: unrecognised content is `text/plain; charset=utf-8` when it
/// has no binary control bytes, [`FALLBACK_MIME`] otherwise.
///
/// # Examples
///
/// ```
/// use baks::fetch::detect_content_type;
///
/// assert_eq!(detect_content_type(b"  <html><body>hi"), "text/html; charset=utf-8");
/// assert_eq!(detect_content_type(b"\x89PNG\r\n\x1a\n...."), "image/png");
/// assert_eq!(detect_content_type(b"just words"), "text/plain; charset=utf-8");
/// ```
pub fn detect_content_type(data: &[u8]) -> &'static str {
    let data = &data[..data.len().min(SNIFF_LEN)];

    let first_non_ws = data
        .iter()
        .position(|b| !is_whitespace(*b))
        .unwrap_or(data.len());
    let trimmed = &data[first_non_ws..];

    for signature in SIGNATURES {
        let matched = match signature {
            Signature::HtmlTag(tag) => html_tag_matches(trimmed, tag).then_some(HTML_MIME),
            Signature::Exact {
                prefix,
                skip_whitespace,
                mime,
            } => {
                let haystack = if *skip_whitespace { trimmed } else { data };
                haystack.starts_with(prefix).then_some(*mime)
            }
            Signature::Masked {
                mask,
                pattern,
                mime,
            } => masked_matches(data, mask, pattern).then_some(*mime),
            Signature::Mp4 => is_mp4(data).then_some("video/mp4"),
        };
        if let Some(mime) = matched {
            return mime;
        }
    }

    if data.iter().any(|b| is_binary(*b)) {
        FALLBACK_MIME
    } else {
        TEXT_PLAIN
    }
}

/// Returns true if a sniffed MIME type is HTML
pub fn is_html(mime: &str) -> bool {
    mime.starts_with("text/html")
}

fn html_tag_matches(data: &[u8], tag: &[u8]) -> bool {
    // tag plus one terminating byte
    if data.len() < tag.len() + 1 {
        return false;
    }
    if !data[..tag.len()].eq_ignore_ascii_case(tag) {
        return false;
    }
    matches!(data[tag.len()], b' ' | b'>')
}

fn masked_matches(data: &[u8], mask: &[u8], pattern: &[u8]) -> bool {
    data.len() >= pattern.len()
        && data
            .iter()
            .zip(mask.iter().zip(pattern))
            .all(|(byte, (mask, pattern))| byte & mask == *pattern)
}

fn is_mp4(data: &[u8]) -> bool {
    if data.len() < 12 {
        return false;
    }
    let box_size = u32::from_be_bytes([data[0], data[1], data[2], data[3]]) as usize;
    if box_size % 4 != 0 || data.len() < box_size || &data[4..8] != b"ftyp" {
        return false;
    }
    // major brand, then compatible brands after the minor version
    let brands = std::iter::once(8).chain((16..box_size).step_by(4));
    brands
        .filter(|offset| offset + 3 <= data.len())
        .any(|offset| &data[offset..offset + 3] == b"mp4")
}

fn is_whitespace(b: u8) -> bool {
    matches!(b, b'\t' | b'\n' | b'\x0C' | b'\r' | b' ')
}

fn is_binary(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0B | 0x0E..=0x1A | 0x1C..=0x1F)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_signatures() {
        assert_eq!(detect_content_type(b"<!DOCTYPE html>\n<html>"), HTML_MIME);
        assert_eq!(detect_content_type(b"<!doctype html>"), HTML_MIME);
        assert_eq!(detect_content_type(b"\n\n  <HTML lang=\"en\">"), HTML_MIME);
        assert_eq!(detect_content_type(b"<p>paragraph</p>"), HTML_MIME);
        assert_eq!(detect_content_type(b"<!-- comment -->"), HTML_MIME);
        assert!(is_html(detect_content_type(b"<title>t</title>")));
    }

    #[test]
    fn test_html_tag_needs_terminator() {
        // "<a" must be followed by space or '>'
        assert_eq!(detect_content_type(b"<abbr>x</abbr>"), TEXT_PLAIN);
        assert_eq!(detect_content_type(b"<html"), TEXT_PLAIN);
    }

    #[test]
    fn test_xml() {
        assert_eq!(
            detect_content_type(b"  <?xml version=\"1.0\"?><rss>"),
            "text/xml; charset=utf-8"
        );
    }

    #[test]
    fn test_binary_signatures() {
        assert_eq!(detect_content_type(b"%PDF-1.7\n"), "application/pdf");
        assert_eq!(detect_content_type(b"GIF89a\x01\x00"), "image/gif");
        assert_eq!(detect_content_type(b"\xFF\xD8\xFF\xE0"), "image/jpeg");
        assert_eq!(detect_content_type(b"PK\x03\x04\x14\x00"), "application/zip");
        assert_eq!(
            detect_content_type(b"RIFF\x24\x00\x00\x00WEBPVP8 "),
            "image/webp"
        );
        assert_eq!(
            detect_content_type(b"RIFF\x24\x00\x00\x00WAVEfmt "),
            "audio/wave"
        );
    }

    #[test]
    fn test_binary_signatures_do_not_skip_whitespace() {
        assert_ne!(detect_content_type(b" %PDF-1.7"), "application/pdf");
    }

    #[test]
    fn test_mp4() {
        let mut data = vec![0x00, 0x00, 0x00, 0x1C];
        data.extend_from_slice(b"ftypisom\x00\x00\x02\x00isomiso2mp41");
        assert_eq!(detect_content_type(&data), "video/mp4");
    }

    #[test]
    fn test_byte_order_marks() {
        assert_eq!(detect_content_type(b"\xEF\xBB\xBFhello"), TEXT_PLAIN);
        assert_eq!(
            detect_content_type(b"\xFE\xFF\x00h"),
            "text/plain; charset=utf-16be"
        );
    }

    #[test]
    fn test_fallbacks() {
        assert_eq!(detect_content_type(b""), TEXT_PLAIN);
        assert_eq!(detect_content_type(b"plain old text\r\n"), TEXT_PLAIN);
        assert_eq!(detect_content_type(b"\x00\x01\x02\x03"), FALLBACK_MIME);
    }

    #[test]
    fn test_only_prefix_is_examined() {
        let mut data = vec![b'a'; SNIFF_LEN];
        data.extend_from_slice(b"\x00\x00\x00");
        assert_eq!(detect_content_type(&data), TEXT_PLAIN);

        let mut late_html = vec![b'x'; SNIFF_LEN];
        late_html.extend_from_slice(b"<html>");
        assert!(!is_html(detect_content_type(&late_html)));
    }
}
