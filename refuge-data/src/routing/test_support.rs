//! Test utilities for the OSRM adapter.
//!
//! [`CannedTableServer`] is a loopback HTTP server that answers every request
//! with the same status and body and records each request target. It lets
//! tests drive [`super::HttpDistanceMatrixProvider`] end to end without a
//! running OSRM instance.

use std::io;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

const HEADER_END: &[u8] = b"\r\n\r\n";

/// How the server treats each connection.
#[derive(Debug, Clone)]
enum Reply {
    Canned { status: u16, body: String },
    Silent,
}

/// Loopback server replaying a fixed response.
#[derive(Debug)]
pub struct CannedTableServer {
    base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
    task: JoinHandle<()>,
}

impl CannedTableServer {
    /// Start a server answering with `status` and `body`.
    ///
    /// # Errors
    ///
    /// Fails when the loopback listener cannot be bound.
    pub async fn start(status: u16, body: impl Into<String>) -> io::Result<Self> {
        Self::spawn(Reply::Canned {
            status,
            body: body.into(),
        })
        .await
    }

    /// Start a server that reads requests but never answers.
    ///
    /// # Errors
    ///
    /// Fails when the loopback listener cannot be bound.
    pub async fn silent() -> io::Result<Self> {
        Self::spawn(Reply::Silent).await
    }

    async fn spawn(reply: Reply) -> io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let base_url = format!("http://{}", listener.local_addr()?);
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&requests);
        let task = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let reply = reply.clone();
                let recorded = Arc::clone(&recorded);
                tokio::spawn(async move {
                    // Failed connections only matter to the test client.
                    let _ = serve(stream, reply, recorded).await;
                });
            }
        });
        Ok(Self {
            base_url,
            requests,
            task,
        })
    }

    /// Base URL to hand to the provider.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Request targets received so far, in arrival order.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Drop for CannedTableServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn serve(
    mut stream: TcpStream,
    reply: Reply,
    recorded: Arc<Mutex<Vec<String>>>,
) -> io::Result<()> {
    let head = read_head(&mut stream).await?;
    let target = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or_default()
        .to_owned();
    recorded
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(target);

    match reply {
        Reply::Canned { status, body } => {
            let response = format!(
                "HTTP/1.1 {status} Canned\r\nContent-Type: application/json\r\n\
                 Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await?;
            stream.shutdown().await
        }
        Reply::Silent => {
            // Keep the socket open until the client gives up.
            let mut sink = [0_u8; 64];
            while stream.read(&mut sink).await? > 0 {}
            Ok(())
        }
    }
}

async fn read_head(stream: &mut TcpStream) -> io::Result<String> {
    let mut head = Vec::new();
    let mut chunk = [0_u8; 1024];
    while !head.windows(HEADER_END.len()).any(|window| window == HEADER_END) {
        let read = stream.read(&mut chunk).await?;
        if read == 0 {
            break;
        }
        head.extend_from_slice(&chunk[..read]);
    }
    Ok(String::from_utf8_lossy(&head).into_owned())
}
