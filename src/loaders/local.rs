//! Local filesystem loader (`file` scheme, and bare paths).

use std::fs::File;

use crate::error::{StreamError, StreamResult};

use super::{strip_scheme, ByteReader, LoadRequest, Loader};

/// Opens local files. Accepts bare paths and `file://` locators.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalLoader;

impl Loader for LocalLoader {
    fn load(&self, locator: &str, _request: &LoadRequest<'_>) -> StreamResult<ByteReader> {
        let path = strip_scheme(locator, "file");
        let file = File::open(path).map_err(|e| StreamError::io_error(path, e))?;
        Ok(Box::new(file))
    }
}
