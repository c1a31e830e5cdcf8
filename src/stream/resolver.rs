//! Scheme/format resolution and Loader/Parser/Writer selection.
//!
//! Precedence is explicit override, then locator structure (`scheme://` prefix, file extension).
//! Content sniffing happens later, when bytes are prepared (see [`crate::loaders::prepare`]).
//! Caller-registered implementations shadow built-ins with the same key.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{StreamError, StreamResult};
use crate::loaders::{LocalLoader, Loader, RemoteLoader, TextLoader};
use crate::parsers::{CsvParser, InlineParser, JsonParser, NdjsonParser, ParquetParser, Parser};
use crate::writers::{CsvWriter, JsonWriter, Writer};

use super::options::{OptionMap, SaveOptions, StreamOptions};
use super::source::Source;

/// Scheme reported for `Source::Reader` handles.
const READER_SCHEME: &str = "stream";
/// Format used for row sources when none is given.
const INLINE_FORMAT: &str = "inline";

const SPREADSHEET_FORMATS: [&str; 5] = ["xlsx", "xls", "xlsm", "xlsb", "ods"];

/// Outcome of resolving a source.
pub(crate) struct Resolved {
    /// `None` for row sources, which are not loaded.
    pub scheme: Option<String>,
    pub format: String,
    /// `None` for row and reader sources.
    pub loader: Option<Arc<dyn Loader>>,
    pub parser: Arc<dyn Parser>,
}

/// Resolve scheme and format, pick implementations, and validate passthrough options.
///
/// Nothing is loaded here, so every configuration error surfaces before I/O.
pub(crate) fn resolve(source: &Source, options: &StreamOptions) -> StreamResult<Resolved> {
    let (scheme, loader) = match source {
        Source::Locator(locator) => {
            let scheme = options
                .scheme
                .as_deref()
                .map(str::to_ascii_lowercase)
                .unwrap_or_else(|| detect_scheme(locator));
            let loader = find_loader(&scheme, &options.custom_loaders)
                .ok_or_else(|| StreamError::Scheme {
                    scheme: scheme.clone(),
                })?;
            (Some(scheme), Some(loader))
        }
        Source::Reader(_) => (Some(READER_SCHEME.to_string()), None),
        Source::Inline(_) | Source::Generator(_) | Source::Iter(_) => (None, None),
    };

    let format = match options.format.as_deref() {
        Some(format) => format.to_ascii_lowercase(),
        None => detect_format(source, scheme.as_deref())?,
    };
    let parser = find_parser(&format, &options.custom_parsers)?;

    let mut accepted: Vec<&str> = parser.options().to_vec();
    if let Some(loader) = &loader {
        accepted.extend_from_slice(loader.options());
    }
    validate_options(&options.options, &accepted)?;

    Ok(Resolved {
        scheme,
        format,
        loader,
        parser,
    })
}

/// Pick the writer for `target` and validate its options.
pub(crate) fn resolve_writer(
    target: &str,
    save: &SaveOptions,
    custom: &HashMap<String, Arc<dyn Writer>>,
) -> StreamResult<Arc<dyn Writer>> {
    let format = match save.format.as_deref() {
        Some(format) => format.to_ascii_lowercase(),
        None => extension(target).ok_or_else(|| {
            StreamError::format_error(format!("cannot infer a writer format from '{target}'"))
        })?,
    };
    let writer = custom
        .get(&format)
        .cloned()
        .or_else(|| builtin_writer(&format))
        .ok_or_else(|| {
            StreamError::format_error(format!("writing format '{format}' is not supported"))
        })?;
    validate_options(&save.options, writer.options())?;
    Ok(writer)
}

/// `scheme://...` prefix, lowercased; otherwise `file`.
fn detect_scheme(locator: &str) -> String {
    match locator.split_once("://") {
        Some((scheme, _))
            if !scheme.is_empty()
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) =>
        {
            scheme.to_ascii_lowercase()
        }
        _ => "file".to_string(),
    }
}

fn detect_format(source: &Source, scheme: Option<&str>) -> StreamResult<String> {
    match source {
        Source::Locator(locator) => {
            if scheme == Some("text") {
                return Err(StreamError::format_error(
                    "a format must be given for 'text' sources",
                ));
            }
            extension(locator).ok_or_else(|| {
                StreamError::format_error(format!("cannot infer a format from '{locator}'"))
            })
        }
        Source::Reader(_) => Err(StreamError::format_error(
            "a format must be given for reader sources",
        )),
        Source::Inline(_) | Source::Generator(_) | Source::Iter(_) => {
            Ok(INLINE_FORMAT.to_string())
        }
    }
}

/// Lowercased extension of the locator's last path segment, ignoring query and fragment.
fn extension(locator: &str) -> Option<String> {
    let path = locator
        .split(['?', '#'])
        .next()
        .unwrap_or(locator);
    let name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

fn find_loader(
    scheme: &str,
    custom: &HashMap<String, Arc<dyn Loader>>,
) -> Option<Arc<dyn Loader>> {
    if let Some(loader) = custom.get(scheme) {
        return Some(Arc::clone(loader));
    }
    match scheme {
        "file" => Some(Arc::new(LocalLoader)),
        "http" | "https" => Some(Arc::new(RemoteLoader)),
        "text" => Some(Arc::new(TextLoader)),
        _ => None,
    }
}

fn find_parser(
    format: &str,
    custom: &HashMap<String, Arc<dyn Parser>>,
) -> StreamResult<Arc<dyn Parser>> {
    if let Some(parser) = custom.get(format) {
        return Ok(Arc::clone(parser));
    }
    let parser: Arc<dyn Parser> = match format {
        "csv" => Arc::new(CsvParser::new()),
        "tsv" => Arc::new(CsvParser::tsv()),
        "json" => Arc::new(JsonParser),
        "ndjson" | "jsonl" => Arc::new(NdjsonParser),
        "inline" => Arc::new(InlineParser),
        "parquet" | "pq" => Arc::new(ParquetParser),
        f if SPREADSHEET_FORMATS.contains(&f) => return spreadsheet_parser(f),
        _ => {
            return Err(StreamError::format_error(format!(
                "format '{format}' is not supported"
            )));
        }
    };
    Ok(parser)
}

#[cfg(feature = "excel")]
fn spreadsheet_parser(_format: &str) -> StreamResult<Arc<dyn Parser>> {
    Ok(Arc::new(crate::parsers::ExcelParser))
}

#[cfg(not(feature = "excel"))]
fn spreadsheet_parser(format: &str) -> StreamResult<Arc<dyn Parser>> {
    Err(StreamError::format_error(format!(
        "format '{format}' requires the cargo feature 'excel'"
    )))
}

fn builtin_writer(format: &str) -> Option<Arc<dyn Writer>> {
    match format {
        "csv" => Some(Arc::new(CsvWriter)),
        "json" => Some(Arc::new(JsonWriter)),
        _ => None,
    }
}

fn validate_options(given: &OptionMap, accepted: &[&str]) -> StreamResult<()> {
    match given.keys().find(|name| !accepted.contains(&name.as_str())) {
        Some(name) => Err(StreamError::options_error(format!(
            "option '{name}' is not supported"
        ))),
        None => Ok(()),
    }
}
