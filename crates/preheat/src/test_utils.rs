//! # Test Utilities
//!
//! Shared helpers for exercising the warmer against real sockets in
//! tests, without standing up an actual site.

use std::io;
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Initializes tracing for a test, tolerating repeat initialization.
#[macro_export]
macro_rules! init_test_tracing {
    () => {
        $crate::init_test_tracing!("debug");
    };
    ($filter:expr) => {
        let _ = tracing_subscriber::fmt()
            .with_env_filter($filter)
            .with_test_writer()
            .try_init();
    };
}

/// Handle to a running canned-response server.
pub struct PageServer {
    /// Base URL of the server, e.g. `http://127.0.0.1:49152`.
    pub base_url: String,
    /// Raw request heads, in arrival order.
    pub requests: Arc<Mutex<Vec<String>>>,
}

impl PageServer {
    /// Request heads received so far.
    pub fn received(&self) -> Vec<String> {
        match self.requests.lock() {
            Ok(requests) => requests.clone(),
            Err(_) => Vec::new(),
        }
    }
}

/// Spawns a canned-response HTTP server on an ephemeral port.
///
/// Paths containing `server-error` answer 500 with an oversized body,
/// paths containing `missing` answer 404, and everything else answers
/// 200 with a small HTML body.
pub async fn spawn_page_server() -> io::Result<PageServer> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let address = listener.local_addr()?;
    let requests: Arc<Mutex<Vec<String>>> = Arc::default();
    let log = Arc::clone(&requests);

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let log = Arc::clone(&log);
            tokio::spawn(async move {
                let mut buffer = vec![0u8; 8192];
                let Ok(read) = socket.read(&mut buffer).await else {
                    return;
                };
                let head = String::from_utf8_lossy(&buffer[..read]).to_string();
                let path = head.split_whitespace().nth(1).unwrap_or("/").to_string();
                if let Ok(mut log) = log.lock() {
                    log.push(head);
                }

                let (status, body) = if path.contains("server-error") {
                    ("500 Internal Server Error", "boom ".repeat(200))
                } else if path.contains("missing") {
                    ("404 Not Found", "gone".to_string())
                } else {
                    ("200 OK", "<html>warm</html>".to_string())
                };
                let response = format!(
                    "HTTP/1.1 {status}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    Ok(PageServer {
        base_url: format!("http://{address}"),
        requests,
    })
}

/// URL of a local port with nothing listening behind it.
pub async fn refused_url() -> io::Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let address = listener.local_addr()?;
    drop(listener);
    Ok(format!("http://{address}"))
}
