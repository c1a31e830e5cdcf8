//! Incremental transcoding of non-UTF-8 byte streams.

use std::io::{self, Read};

use bytes::{Buf, BytesMut};
use encoding_rs::{CoderResult, Decoder, Encoding};

const CHUNK: usize = 8 * 1024;

/// A [`Read`] adapter that yields UTF-8 decoded from `encoding`, one chunk at a time.
///
/// A byte-order mark in the input overrides the declared encoding and is removed.
pub(crate) struct Transcoder<R> {
    inner: R,
    decoder: Decoder,
    input: Vec<u8>,
    start: usize,
    end: usize,
    decoded: BytesMut,
    eof: bool,
    finished: bool,
}

impl<R: Read> Transcoder<R> {
    pub(crate) fn new(inner: R, encoding: &'static Encoding) -> Self {
        Self {
            inner,
            decoder: encoding.new_decoder(),
            input: vec![0; CHUNK],
            start: 0,
            end: 0,
            decoded: BytesMut::new(),
            eof: false,
            finished: false,
        }
    }

    fn fill_decoded(&mut self) -> io::Result<()> {
        if self.start == self.end && !self.eof {
            let n = self.inner.read(&mut self.input)?;
            self.start = 0;
            self.end = n;
            self.eof = n == 0;
        }

        let pending = self.end - self.start;
        let capacity = self
            .decoder
            .max_utf8_buffer_length(pending)
            .unwrap_or(pending * 3 + 16)
            .max(16);
        let mut out = vec![0; capacity];
        let (result, read, written, _) =
            self.decoder
                .decode_to_utf8(&self.input[self.start..self.end], &mut out, self.eof);
        self.start += read;
        self.decoded.extend_from_slice(&out[..written]);
        if self.eof && result == CoderResult::InputEmpty {
            self.finished = true;
        }
        Ok(())
    }
}

impl<R: Read> Read for Transcoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        loop {
            if !self.decoded.is_empty() {
                let n = buf.len().min(self.decoded.len());
                buf[..n].copy_from_slice(&self.decoded[..n]);
                self.decoded.advance(n);
                return Ok(n);
            }
            if self.finished {
                return Ok(0);
            }
            self.fill_decoded()?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn decode_all(bytes: &[u8], encoding: &'static Encoding) -> String {
        let mut out = String::new();
        Transcoder::new(Cursor::new(bytes.to_vec()), encoding)
            .read_to_string(&mut out)
            .unwrap();
        out
    }

    #[test]
    fn decodes_across_chunk_boundaries() {
        let raw: Vec<u8> = std::iter::repeat_n(0xE9u8, CHUNK * 2 + 5).collect();
        let text = decode_all(&raw, encoding_rs::WINDOWS_1252);
        assert_eq!(text.chars().count(), CHUNK * 2 + 5);
        assert!(text.chars().all(|c| c == 'é'));
    }

    #[test]
    fn bom_overrides_the_label() {
        let raw = b"\xFF\xFEa\x00,\x00b\x00";
        assert_eq!(decode_all(raw, encoding_rs::WINDOWS_1252), "a,b");
    }

    #[test]
    fn empty_input_is_empty_output() {
        assert_eq!(decode_all(b"", encoding_rs::WINDOWS_1252), "");
    }
}
