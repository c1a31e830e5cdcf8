//! HTTP(S) loader.

use std::time::Duration;

use reqwest::blocking::Client;

use crate::error::{StreamError, StreamResult};

use super::{ByteReader, LoadRequest, Loader};

const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Fetches `http://` and `https://` locators with a blocking client.
///
/// The response body is streamed, not downloaded up front. Options:
///
/// - `timeout`: request timeout in seconds (default 120)
#[derive(Debug, Default, Clone, Copy)]
pub struct RemoteLoader;

impl Loader for RemoteLoader {
    fn options(&self) -> &[&'static str] {
        &["timeout"]
    }

    fn load(&self, locator: &str, request: &LoadRequest<'_>) -> StreamResult<ByteReader> {
        let timeout = match request.options.get("timeout") {
            Some(v) => v.as_u64().ok_or_else(|| {
                StreamError::options_error(format!("option 'timeout' must be a whole number of seconds, got {v}"))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout))
            .build()?;
        let response = client.get(locator).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(StreamError::Http {
                url: locator.to_string(),
                message: format!("server answered {status}"),
            });
        }
        Ok(Box::new(response))
    }
}
