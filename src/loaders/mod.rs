//! Loaders: turn a source locator into a byte stream.
//!
//! A [`Loader`] is selected by scheme (`file`, `http`, `https`, `text`, or a caller-registered
//! name). Loaders only acquire bytes; [`prepare`] applies the shared text handling (BOM
//! stripping, character decoding, HTML and archive sniffing) on top of whatever a loader returns,
//! so custom loaders get the same treatment as built-in ones.

mod decode;
pub mod local;
pub mod remote;
pub mod text;

use std::io::{BufRead, BufReader, Read};

use encoding_rs::Encoding;

use decode::Transcoder;

use crate::error::{StreamError, StreamResult};
use crate::stream::OptionMap;

pub use local::LocalLoader;
pub use remote::RemoteLoader;
pub use text::TextLoader;

/// Boxed byte stream returned by loaders.
pub type ByteReader = Box<dyn Read>;

/// Whether the parser wants decoded UTF-8 text or raw bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
    /// Decode into UTF-8 and sniff for incompatible content.
    Text,
    /// Hand the bytes over untouched (spreadsheets, Parquet).
    Binary,
}

/// Per-open parameters passed to [`Loader::load`].
#[derive(Debug, Clone)]
pub struct LoadRequest<'a> {
    /// Text or binary handling.
    pub mode: LoadMode,
    /// Character encoding label (`utf-8`, `latin1`, `windows-1252`, ...); `None` means UTF-8.
    pub encoding: Option<&'a str>,
    /// Accept content that sniffs as HTML.
    pub allow_html: bool,
    /// Loader-specific options, already validated against [`Loader::options`].
    pub options: &'a OptionMap,
}

/// Byte acquisition for one scheme.
pub trait Loader {
    /// Option names this loader accepts.
    fn options(&self) -> &[&'static str] {
        &[]
    }

    /// Whether loading the same locator again replays the same content.
    fn rewindable(&self) -> bool {
        true
    }

    /// Open `locator` and return its bytes.
    fn load(&self, locator: &str, request: &LoadRequest<'_>) -> StreamResult<ByteReader>;
}

/// Apply text decoding and content sniffing to a freshly loaded byte stream.
///
/// In [`LoadMode::Binary`] the bytes are only buffered. In [`LoadMode::Text`] the returned reader
/// yields UTF-8 with any byte-order mark removed, and fails with [`StreamError::Format`] when the
/// content looks like an HTML page (unless `allow_html`) or a compressed archive.
pub fn prepare(reader: ByteReader, request: &LoadRequest<'_>) -> StreamResult<Box<dyn BufRead>> {
    let mut reader = BufReader::with_capacity(SNIFF_CAPACITY, reader);
    if request.mode == LoadMode::Binary {
        return Ok(Box::new(reader));
    }

    let encoding = match request.encoding {
        Some(label) => Encoding::for_label(label.trim().as_bytes())
            .ok_or_else(|| StreamError::options_error(format!("unknown encoding '{label}'")))?,
        None => encoding_rs::UTF_8,
    };

    let head = reader
        .fill_buf()
        .map_err(|e| StreamError::io_error("source", e))?;
    sniff(head, request.allow_html)?;

    if encoding == encoding_rs::UTF_8 {
        if head.starts_with(UTF8_BOM) {
            reader.consume(UTF8_BOM.len());
        }
        return Ok(Box::new(reader));
    }

    Ok(Box::new(BufReader::new(Transcoder::new(reader, encoding))))
}

const SNIFF_CAPACITY: usize = 64 * 1024;
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

fn sniff(head: &[u8], allow_html: bool) -> StreamResult<()> {
    if head.starts_with(b"PK\x03\x04") || head.starts_with(b"\x1F\x8B") {
        return Err(StreamError::format_error(
            "format has been detected as a compressed archive (not supported)",
        ));
    }
    if !allow_html && looks_like_html(head) {
        return Err(StreamError::format_error(
            "format has been detected as HTML (not supported)",
        ));
    }
    Ok(())
}

fn looks_like_html(head: &[u8]) -> bool {
    let head = head.strip_prefix(UTF8_BOM).unwrap_or(head);
    let start = head
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(head.len());
    let prefix: Vec<u8> = head[start..]
        .iter()
        .take(64)
        .map(u8::to_ascii_lowercase)
        .collect();
    ["<!doctype html", "<html", "<head", "<body", "<!--"]
        .iter()
        .any(|tag| prefix.starts_with(tag.as_bytes()))
}

/// Strip a `scheme://` prefix from a locator, if present.
pub(crate) fn strip_scheme<'a>(locator: &'a str, scheme: &str) -> &'a str {
    match locator.split_once("://") {
        Some((prefix, rest)) if prefix.eq_ignore_ascii_case(scheme) => rest,
        _ => locator,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn request<'a>(
        mode: LoadMode,
        encoding: Option<&'a str>,
        allow_html: bool,
        options: &'a OptionMap,
    ) -> LoadRequest<'a> {
        LoadRequest {
            mode,
            encoding,
            allow_html,
            options,
        }
    }

    fn read_all(mut r: Box<dyn BufRead>) -> String {
        let mut s = String::new();
        r.read_to_string(&mut s).unwrap();
        s
    }

    #[test]
    fn strips_utf8_bom() {
        let opts = OptionMap::new();
        let bytes = b"\xEF\xBB\xBFid,name\n".to_vec();
        let r = prepare(Box::new(Cursor::new(bytes)), &request(LoadMode::Text, None, false, &opts)).unwrap();
        assert_eq!(read_all(r), "id,name\n");
    }

    #[test]
    fn decodes_latin1() {
        let opts = OptionMap::new();
        let bytes = b"caf\xE9\n".to_vec();
        let r = prepare(
            Box::new(Cursor::new(bytes)),
            &request(LoadMode::Text, Some("latin1"), false, &opts),
        )
        .unwrap();
        assert_eq!(read_all(r), "café\n");
    }

    /// Counts the bytes handed out by the wrapped reader.
    struct Metered {
        inner: Cursor<Vec<u8>>,
        seen: Arc<AtomicUsize>,
    }

    impl Read for Metered {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            let n = self.inner.read(buf)?;
            self.seen.fetch_add(n, Ordering::SeqCst);
            Ok(n)
        }
    }

    #[test]
    fn declared_encoding_decodes_lazily() {
        let opts = OptionMap::new();
        let total = 4 * 1024 * 1024;
        let seen = Arc::new(AtomicUsize::new(0));
        let reader = Metered {
            inner: Cursor::new(b"caf\xE9\n".repeat(total / 5)),
            seen: Arc::clone(&seen),
        };
        let mut r = prepare(
            Box::new(reader),
            &request(LoadMode::Text, Some("latin1"), false, &opts),
        )
        .unwrap();

        let mut line = String::new();
        r.read_line(&mut line).unwrap();
        assert_eq!(line, "café\n");
        assert!(seen.load(Ordering::SeqCst) < total / 4);
    }

    #[test]
    fn rejects_unknown_encoding_label() {
        let opts = OptionMap::new();
        let err = prepare(
            Box::new(Cursor::new(b"a".to_vec())),
            &request(LoadMode::Text, Some("klingon"), false, &opts),
        )
        .err()
        .unwrap();
        assert!(err.to_string().contains("klingon"));
    }

    #[test]
    fn html_is_rejected_unless_allowed() {
        let opts = OptionMap::new();
        let page = b"  <!DOCTYPE html><html></html>".to_vec();
        let err = prepare(
            Box::new(Cursor::new(page.clone())),
            &request(LoadMode::Text, None, false, &opts),
        )
        .err()
        .unwrap();
        assert!(err.to_string().contains("HTML"));

        assert!(prepare(Box::new(Cursor::new(page)), &request(LoadMode::Text, None, true, &opts)).is_ok());
    }

    #[test]
    fn archives_are_rejected_in_text_mode_only() {
        let opts = OptionMap::new();
        let zip = b"PK\x03\x04rest".to_vec();
        assert!(prepare(Box::new(Cursor::new(zip.clone())), &request(LoadMode::Text, None, false, &opts)).is_err());
        assert!(prepare(Box::new(Cursor::new(zip)), &request(LoadMode::Binary, None, false, &opts)).is_ok());
    }

    #[test]
    fn strip_scheme_is_case_insensitive() {
        assert_eq!(strip_scheme("TEXT://a,b", "text"), "a,b");
        assert_eq!(strip_scheme("data/table.csv", "file"), "data/table.csv");
    }
}
