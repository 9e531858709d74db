#![allow(dead_code)]

use async_trait::async_trait;
use pagamenti_pipeline::error::{PipelineError, Result};
use pagamenti_pipeline::services::publisher::Publisher;
use pagamenti_pipeline::PipelineConfig;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub target: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    pub fn path(&self) -> &str {
        self.target.split('?').next().unwrap_or(&self.target)
    }

    pub fn query(&self, name: &str) -> Option<String> {
        let url = reqwest::Url::parse(&format!("http://stub{}", self.target)).ok()?;
        url.query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

pub struct StubResponse {
    pub status: u16,
    pub body: String,
}

impl StubResponse {
    pub fn json(status: u16, body: serde_json::Value) -> Self {
        StubResponse {
            status,
            body: body.to_string(),
        }
    }

    pub fn text(status: u16, body: &str) -> Self {
        StubResponse {
            status,
            body: body.to_string(),
        }
    }
}

type Handler = Arc<dyn Fn(&RecordedRequest) -> StubResponse + Send + Sync>;

/// Minimal HTTP/1.1 server answering every request through `handler`.
pub struct StubServer {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl StubServer {
    pub async fn start<F>(handler: F) -> Self
    where
        F: Fn(&RecordedRequest) -> StubResponse + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let handler: Handler = Arc::new(handler);

        let recorded = requests.clone();
        tokio::spawn(async move {
            loop {
                let Ok((socket, _)) = listener.accept().await else {
                    break;
                };
                let handler = handler.clone();
                let recorded = recorded.clone();
                tokio::spawn(async move {
                    let _ = serve(socket, handler, recorded).await;
                });
            }
        });

        StubServer { addr, requests }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path() == path)
            .collect()
    }
}

async fn serve(
    mut socket: TcpStream,
    handler: Handler,
    recorded: Arc<Mutex<Vec<RecordedRequest>>>,
) -> std::io::Result<()> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buffer.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buffer.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buffer[..header_end]).into_owned();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next().unwrap_or_default().split_whitespace();
    let method = request_line.next().unwrap_or_default().to_string();
    let target = request_line.next().unwrap_or_default().to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
        .collect();

    let content_length = headers
        .iter()
        .find(|(k, _)| k == "content-length")
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);
    while buffer.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..n]);
    }
    let body = String::from_utf8_lossy(&buffer[header_end..]).into_owned();

    let request = RecordedRequest {
        method,
        target,
        headers,
        body,
    };
    let response = handler(&request);
    recorded.lock().unwrap().push(request);

    let payload = format!(
        "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        response.status,
        response.body.len(),
        response.body
    );
    socket.write_all(payload.as_bytes()).await?;
    socket.flush().await?;
    socket.shutdown().await
}

/// Configuration pointing every collaborator at `server`, with no waiting between retries.
pub fn stub_config(server: &StubServer, repo_root: &std::path::Path) -> PipelineConfig {
    let mut config = PipelineConfig::default().with_repo_root(repo_root);
    config.endpoint = server.url("/resource/78vt-im2v.json");
    config.api_base = server.url("/api");
    config.raw_base_url = server.url("/raw/");
    config.api_key = Some("secret-key".to_string());
    config.app_token = Some("app-token".to_string());
    config.http_timeout = Duration::from_secs(5);
    config.fetch_retry.max_attempts = 3;
    config.fetch_retry.backoff_base_secs = 0;
    config.availability.max_attempts = 3;
    config.availability.interval = Duration::ZERO;
    config.availability.request_timeout = Duration::from_secs(5);
    config
}

/// Records every call; fails the operations it is told to fail.
#[derive(Default)]
pub struct FakePublisher {
    pub calls: Mutex<Vec<String>>,
    pub fail_publish: bool,
    pub fail_unpublish: bool,
}

impl FakePublisher {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

fn git_failure(command: &str) -> PipelineError {
    PipelineError::Git {
        command: command.to_string(),
        detail: "exit status: 1".to_string(),
    }
}

#[async_trait]
impl Publisher for FakePublisher {
    async fn publish(&self, relative: &str) -> Result<()> {
        self.record(format!("publish {}", relative));
        if self.fail_publish {
            return Err(git_failure("git push"));
        }
        Ok(())
    }

    async fn unpublish(&self, relative: &str) -> Result<()> {
        self.record(format!("unpublish {}", relative));
        if self.fail_unpublish {
            return Err(git_failure("git rm"));
        }
        Ok(())
    }

    async fn purge(&self, relatives: &[String]) -> Result<()> {
        self.record(format!("purge {}", relatives.join(" ")));
        Ok(())
    }
}
