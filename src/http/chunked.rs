use std::io;
use thiserror::Error;

const CRLF: &[u8] = b"\r\n";
const CHUNKED_MARKER: &[u8] = b"transfer-encoding: chunked";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChunkedError {
    #[error("chunked body: missing chunk-size line at byte {0}")]
    MissingSizeLine(usize),
    #[error("chunked body: invalid chunk size {0:?}")]
    InvalidSize(String),
    #[error("chunked body: chunk of {size} bytes overruns buffer ({remaining} bytes left)")]
    Overrun { size: usize, remaining: usize },
    #[error("chunked body: missing CRLF after chunk data at byte {0}")]
    MissingChunkTerminator(usize),
}

impl From<ChunkedError> for io::Error {
    fn from(err: ChunkedError) -> Self {
        io::Error::new(io::ErrorKind::InvalidData, err)
    }
}

/// Decodes an HTTP/1.1 chunked body (RFC 7230 §4.1) that has already been split
/// from its headers. Trailers after the last chunk are ignored.
pub fn decode_chunked(body: &[u8]) -> Result<Vec<u8>, ChunkedError> {
    let mut out = Vec::with_capacity(body.len());
    let mut pos = 0;

    loop {
        let line_len = find_crlf(&body[pos..]).ok_or(ChunkedError::MissingSizeLine(pos))?;
        let size = parse_chunk_size(&body[pos..pos + line_len])?;
        pos += line_len + CRLF.len();

        if size == 0 {
            break;
        }

        let remaining = body.len() - pos;
        if size.checked_add(CRLF.len()).map_or(true, |needed| needed > remaining) {
            return Err(ChunkedError::Overrun { size, remaining });
        }

        out.extend_from_slice(&body[pos..pos + size]);
        pos += size;

        if &body[pos..pos + CRLF.len()] != CRLF {
            return Err(ChunkedError::MissingChunkTerminator(pos));
        }
        pos += CRLF.len();
    }

    Ok(out)
}

pub fn header_block_indicates_chunked(headers: &[u8]) -> bool {
    headers
        .windows(CHUNKED_MARKER.len())
        .any(|w| w.eq_ignore_ascii_case(CHUNKED_MARKER))
}

fn parse_chunk_size(line: &[u8]) -> Result<usize, ChunkedError> {
    let token = match line.iter().position(|&b| b == b';') {
        Some(ext) => &line[..ext],
        None => line,
    };
    let invalid = || ChunkedError::InvalidSize(String::from_utf8_lossy(line).into_owned());

    let text = std::str::from_utf8(token).map_err(|_| invalid())?.trim_matches(|c: char| c == ' ' || c == '\t');
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    usize::from_str_radix(text, 16).map_err(|_| invalid())
}

fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(CRLF.len()).position(|w| w == CRLF)
}
