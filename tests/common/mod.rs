//! Shared utilities for integration testing.

#![allow(dead_code)]

use prism_log::{LogWriter, SinkError, SinkMetadata, SinkResult};

use async_trait::async_trait;
use std::collections::HashMap;
use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// A request captured by the mock InfluxDB server.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub target: String,
    pub headers: HashMap<String, String>,
    pub body: String,
}

/// Fixed responses for each endpoint.
#[derive(Debug, Clone)]
pub struct MockBehavior {
    pub health_status: u16,
    pub health_body: &'static str,
    pub ping_status: u16,
    pub write_status: u16,
}

impl Default for MockBehavior {
    fn default() -> Self {
        Self {
            health_status: 200,
            health_body: r#"{"name":"influxdb","message":"ready for queries and writes","status":"pass"}"#,
            ping_status: 204,
            write_status: 204,
        }
    }
}

/// Minimal InfluxDB v2 HTTP server.
pub struct MockInflux {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockInflux {
    pub async fn start(behavior: MockBehavior) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests: Arc<Mutex<Vec<RecordedRequest>>> = Arc::default();
        let recorded = requests.clone();

        tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((socket, _)) => {
                        let behavior = behavior.clone();
                        let recorded = recorded.clone();
                        tokio::spawn(async move {
                            let _ = serve(socket, behavior, recorded).await;
                        });
                    }
                    Err(_) => break,
                }
            }
        });

        Self { addr, requests }
    }

    /// Address without scheme, exercising normalization.
    pub fn address(&self) -> String {
        self.addr.to_string()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn writes(&self) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.target.starts_with("/api/v2/write"))
            .collect()
    }
}

async fn serve(
    mut socket: TcpStream,
    behavior: MockBehavior,
    recorded: Arc<Mutex<Vec<RecordedRequest>>>,
) -> io::Result<()> {
    let request = read_request(&mut socket).await?;

    let (status, body) = if request.target.starts_with("/health") {
        (behavior.health_status, behavior.health_body.to_string())
    } else if request.target.starts_with("/ping") {
        (behavior.ping_status, String::new())
    } else if request.target.starts_with("/api/v2/write") {
        let body = match behavior.write_status {
            400 => r#"{"code":"invalid","message":"unable to parse line"}"#.to_string(),
            status if status >= 300 => {
                r#"{"code":"unauthorized","message":"unauthorized access"}"#.to_string()
            }
            _ => String::new(),
        };
        (behavior.write_status, body)
    } else {
        (404, String::new())
    };

    recorded.lock().unwrap().push(request);

    let status_text = match status {
        200 => "200 OK",
        204 => "204 No Content",
        400 => "400 Bad Request",
        401 => "401 Unauthorized",
        404 => "404 Not Found",
        500 => "500 Internal Server Error",
        503 => "503 Service Unavailable",
        _ => "200 OK",
    };

    let response = if status == 204 {
        format!("HTTP/1.1 {}\r\nConnection: close\r\n\r\n", status_text)
    } else {
        format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_text,
            body.len(),
            body
        )
    };
    socket.write_all(response.as_bytes()).await?;
    socket.shutdown().await
}

async fn read_request(socket: &mut TcpStream) -> io::Result<RecordedRequest> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        if let Some(pos) = find_header_end(&buffer) {
            break pos;
        }
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "incomplete request"));
        }
        buffer.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8_lossy(&buffer[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next().unwrap_or_default().split_whitespace();
    let method = request_line.next().unwrap_or_default().to_string();
    let target = request_line.next().unwrap_or_default().to_string();

    let headers: HashMap<String, String> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
        .collect();

    let content_length: usize = headers
        .get("content-length")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);

    let body_start = header_end + 4;
    while buffer.len() < body_start + content_length {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..n]);
    }

    let body_end = (body_start + content_length).min(buffer.len());
    let body = String::from_utf8_lossy(&buffer[body_start..body_end]).to_string();

    Ok(RecordedRequest {
        method,
        target,
        headers,
        body,
    })
}

fn find_header_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(4).position(|w| w == b"\r\n\r\n")
}

/// Sink that stores every event it receives.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<Vec<u8>>>,
}

impl MemorySink {
    pub fn events(&self) -> Vec<Vec<u8>> {
        self.events.lock().unwrap().clone()
    }

    pub fn decoded(&self) -> Vec<serde_json::Map<String, serde_json::Value>> {
        self.events()
            .iter()
            .map(|bytes| serde_json::from_slice(bytes).unwrap())
            .collect()
    }
}

#[async_trait]
impl LogWriter for MemorySink {
    fn write(&self, event: &[u8]) -> SinkResult<usize> {
        self.events.lock().unwrap().push(event.to_vec());
        Ok(event.len())
    }

    fn name(&self) -> &'static str {
        "memory"
    }

    fn metadata(&self) -> SinkMetadata {
        SinkMetadata::new("memory".to_string())
    }
}

/// Sink that fails every write and counts attempts.
#[derive(Debug, Default)]
pub struct FailingSink {
    pub attempts: AtomicUsize,
}

#[async_trait]
impl LogWriter for FailingSink {
    fn write(&self, _event: &[u8]) -> SinkResult<usize> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(SinkError::Io(io::Error::new(
            io::ErrorKind::Other,
            "device unavailable",
        )))
    }

    fn name(&self) -> &'static str {
        "failing"
    }

    fn metadata(&self) -> SinkMetadata {
        SinkMetadata::new("failing".to_string())
    }
}

/// Shared in-memory `Write` target for the console sink.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(pub Arc<Mutex<Vec<u8>>>);

impl io::Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}
