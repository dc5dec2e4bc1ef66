pub mod chunked;
pub mod transport;

use log::{ debug, warn };
use rustls::pki_types::ServerName;
use rustls::{ ClientConfig, RootCertStore };
use std::io;
use std::sync::Arc;
use thiserror::Error;
use tokio::io::{ AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt };
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;

use self::chunked::{ decode_chunked, header_block_indicates_chunked, ChunkedError };

pub const HTTPS_PORT: u16 = 443;
const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";
const READ_BUF_SIZE: usize = 8 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResult {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResult {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("Invalid host name '{0}'")]
    InvalidHost(String),
    #[error("TLS setup failed: {0}")]
    TlsConfig(String),
    #[error("Could not connect to {host}: {source}")]
    Connect {
        host: String,
        #[source]
        source: io::Error,
    },
    #[error("TLS handshake failed: {0}")]
    Handshake(#[source] io::Error),
    #[error("Failed to send request: {0}")]
    Write(#[source] io::Error),
    #[error("Failed to read response: {0}")]
    Read(#[source] io::Error),
    #[error("Malformed response: no header/body separator")]
    MalformedResponse,
    #[error("Malformed response: {0}")]
    Chunked(#[from] ChunkedError),
}

/// Builds a TLS connector trusting the platform's root certificates.
pub fn native_tls_connector() -> Result<TlsConnector, HttpError> {
    let native = rustls_native_certs::load_native_certs();
    for err in &native.errors {
        warn!("Skipping unreadable platform certificate: {}", err);
    }

    let mut roots = RootCertStore::empty();
    let (added, ignored) = roots.add_parsable_certificates(native.certs);
    debug!("Loaded {} platform root certificates ({} ignored)", added, ignored);
    if roots.is_empty() {
        return Err(HttpError::TlsConfig("no platform root certificates available".to_string()));
    }

    let config = ClientConfig::builder_with_provider(
        Arc::new(rustls::crypto::ring::default_provider())
    )
        .with_safe_default_protocol_versions()
        .map_err(|e| HttpError::TlsConfig(e.to_string()))?
        .with_root_certificates(roots)
        .with_no_client_auth();

    Ok(TlsConnector::from(Arc::new(config)))
}

/// One HTTPS POST of a JSON payload: connect, send, read until the server
/// closes, then parse. A single attempt; the connection is dropped on return.
pub async fn send_json_post(
    connector: &TlsConnector,
    host: &str,
    user_agent: &str,
    path: &str,
    payload: &[u8]
) -> Result<HttpResult, HttpError> {
    let server_name = ServerName::try_from(host.to_string()).map_err(|_|
        HttpError::InvalidHost(host.to_string())
    )?;

    let tcp = TcpStream::connect((host, HTTPS_PORT)).await.map_err(|source| HttpError::Connect {
        host: host.to_string(),
        source,
    })?;
    let tls = connector.connect(server_name, tcp).await.map_err(HttpError::Handshake)?;
    debug!("TLS session established with {}:{}", host, HTTPS_PORT);

    exchange(tls, host, user_agent, path, payload).await
}

/// Writes the framed request to `stream`, reads the full reply and parses it.
pub async fn exchange<S>(
    mut stream: S,
    host: &str,
    user_agent: &str,
    path: &str,
    payload: &[u8]
) -> Result<HttpResult, HttpError>
    where S: AsyncRead + AsyncWrite + Unpin
{
    let request = frame_request(host, user_agent, path, payload);
    stream.write_all(&request).await.map_err(HttpError::Write)?;
    stream.flush().await.map_err(HttpError::Write)?;
    debug!("Sent {} byte request ({} byte payload) to {}{}", request.len(), payload.len(), host, path);

    let raw = read_to_close(&mut stream).await?;
    debug!("Received {} bytes from {}", raw.len(), host);

    parse_response(&raw)
}

pub fn frame_request(host: &str, user_agent: &str, path: &str, payload: &[u8]) -> Vec<u8> {
    let head = format!(
        "POST {} HTTP/1.1\r\n\
         Host: {}\r\n\
         User-Agent: {}\r\n\
         Accept: application/json\r\n\
         Content-Type: application/json\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\
         \r\n",
        path,
        host,
        user_agent,
        payload.len()
    );
    let mut request = Vec::with_capacity(head.len() + payload.len());
    request.extend_from_slice(head.as_bytes());
    request.extend_from_slice(payload);
    request
}

async fn read_to_close<S>(stream: &mut S) -> Result<Vec<u8>, HttpError> where S: AsyncRead + Unpin {
    let mut raw = Vec::new();
    let mut buf = [0u8; READ_BUF_SIZE];
    loop {
        match stream.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => raw.extend_from_slice(&buf[..n]),
            // A TLS peer hanging up without close_notify may have truncated the reply.
            Err(e) => {
                debug!("Read failed after {} bytes: {}", raw.len(), e);
                return Err(HttpError::Read(e));
            }
        }
    }
    Ok(raw)
}

/// Splits a complete HTTP/1.1 response into status and (de-chunked) body.
pub fn parse_response(raw: &[u8]) -> Result<HttpResult, HttpError> {
    let split = raw
        .windows(HEADER_TERMINATOR.len())
        .position(|w| w == HEADER_TERMINATOR)
        .ok_or(HttpError::MalformedResponse)?;

    let head = &raw[..split];
    let body = &raw[split + HEADER_TERMINATOR.len()..];
    let status = parse_status_line(head);

    let body = if header_block_indicates_chunked(head) {
        decode_chunked(body)?
    } else {
        body.to_vec()
    };

    Ok(HttpResult { status, body })
}

/// Loose `HTTP/<version> <code>` match on the first line. Anything else is 0,
/// which callers reject as a non-success status.
fn parse_status_line(head: &[u8]) -> u16 {
    let line_end = head
        .windows(2)
        .position(|w| w == b"\r\n")
        .unwrap_or(head.len());
    let line = String::from_utf8_lossy(&head[..line_end]);

    let Some(rest) = line.strip_prefix("HTTP/") else {
        return 0;
    };
    let mut tokens = rest.split_whitespace();
    tokens.next();
    tokens
        .next()
        .map(|code| code.chars().take_while(|c| c.is_ascii_digit()).collect::<String>())
        .and_then(|digits| digits.parse().ok())
        .unwrap_or(0)
}
