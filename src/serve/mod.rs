// src/serve/mod.rs

//! Static file server for the output tree.
//!
//! One request per connection (`Connection: close`), GET and HEAD only.
//! Files are read from disk on every request so a rebuild is visible
//! immediately.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

use crate::errors::{AssetdagError, Result};

pub mod http;

use http::{content_type, parse_request_line, resolve_request_path, response_head, Method, Status};

/// Upper bound on header lines read per request.
const MAX_HEADER_LINES: usize = 100;

/// Upper bound on the bytes read for the request line and headers together.
pub const MAX_REQUEST_HEAD_BYTES: u64 = 8 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServeOptions {
    pub addr: String,
    /// URL prefix, always starting with `/`.
    pub base_path: String,
    /// Directory whose files are served.
    pub root: PathBuf,
}

impl ServeOptions {
    pub fn new(addr: &str, base_path: &str, root: PathBuf) -> Self {
        Self {
            addr: addr.to_string(),
            base_path: base_path.to_string(),
            root,
        }
    }
}

#[derive(Debug)]
pub struct StaticServer {
    listener: TcpListener,
    options: Arc<ServeOptions>,
}

impl StaticServer {
    /// Bind the listening socket. Failure maps to [`AssetdagError::ServerBind`].
    pub async fn bind(options: ServeOptions) -> Result<Self> {
        let listener = TcpListener::bind(&options.addr)
            .await
            .map_err(|source| AssetdagError::ServerBind {
                addr: options.addr.clone(),
                source,
            })?;

        Ok(Self {
            listener,
            options: Arc::new(options),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// `http://<addr><base_path>`
    pub fn url(&self) -> Result<String> {
        Ok(format!("http://{}{}", self.local_addr()?, self.options.base_path))
    }

    /// Accept connections forever, one Tokio task per connection.
    pub async fn run(self) -> Result<()> {
        info!(root = ?self.options.root, base = %self.options.base_path, "static server accepting connections");

        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    let options = Arc::clone(&self.options);
                    tokio::spawn(async move {
                        if let Err(err) = handle_connection(stream, &options).await {
                            debug!(%peer, error = %err, "connection ended with error");
                        }
                    });
                }
                Err(err) => {
                    warn!(error = %err, "failed to accept connection");
                }
            }
        }
    }
}

struct Response {
    status: Status,
    content_type: &'static str,
    body: Vec<u8>,
}

impl Response {
    fn error(status: Status) -> Self {
        Self {
            status,
            content_type: "text/plain; charset=utf-8",
            body: format!("{} {}\n", status.code(), status.reason()).into_bytes(),
        }
    }
}

async fn handle_connection(stream: TcpStream, options: &ServeOptions) -> anyhow::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader.take(MAX_REQUEST_HEAD_BYTES));

    let mut request_line = String::new();
    if reader.read_line(&mut request_line).await? == 0 {
        return Ok(());
    }
    let line_complete = request_line.ends_with('\n');

    for _ in 0..MAX_HEADER_LINES {
        let mut header = String::new();
        let n = reader.read_line(&mut header).await?;
        if n == 0 || header == "\r\n" || header == "\n" {
            break;
        }
    }

    let parsed = line_complete
        .then(|| parse_request_line(request_line.trim_end()))
        .flatten();
    let (response, head_only) = match parsed {
        None => (Response::error(Status::BadRequest), false),
        Some(req) if req.method == Method::Other => {
            (Response::error(Status::MethodNotAllowed), false)
        }
        Some(req) => {
            let response = serve_target(options, &req.target).await;
            debug!(
                request = %req.target,
                status = response.status.code(),
                "served request"
            );
            (response, req.method == Method::Head)
        }
    };

    let head = response_head(response.status, response.content_type, response.body.len());
    writer.write_all(head.as_bytes()).await?;
    if !head_only {
        writer.write_all(&response.body).await?;
    }
    writer.shutdown().await?;
    Ok(())
}

async fn serve_target(options: &ServeOptions, target: &str) -> Response {
    let Some(rel) = resolve_request_path(&options.base_path, target) else {
        return Response::error(Status::NotFound);
    };

    let mut path = options.root.join(&rel);
    if tokio::fs::metadata(&path).await.is_ok_and(|m| m.is_dir()) {
        path = path.join("index.html");
    }

    match tokio::fs::read(&path).await {
        Ok(body) => Response {
            status: Status::Ok,
            content_type: content_type(&path),
            body,
        },
        Err(err) if is_missing(&err) => Response::error(Status::NotFound),
        Err(err) => {
            warn!(path = ?path, error = %err, "failed to read file for request");
            Response::error(Status::InternalServerError)
        }
    }
}

fn is_missing(err: &std::io::Error) -> bool {
    matches!(
        err.kind(),
        std::io::ErrorKind::NotFound | std::io::ErrorKind::NotADirectory
    )
}

