//! Inline text loader (`text` scheme): the locator is the content.

use std::io::Cursor;

use crate::error::StreamResult;

use super::{strip_scheme, ByteReader, LoadRequest, Loader};

/// Serves the locator itself (minus any `text://` prefix) as the source bytes.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextLoader;

impl Loader for TextLoader {
    fn load(&self, locator: &str, _request: &LoadRequest<'_>) -> StreamResult<ByteReader> {
        let content = strip_scheme(locator, "text");
        Ok(Box::new(Cursor::new(content.as_bytes().to_vec())))
    }
}
