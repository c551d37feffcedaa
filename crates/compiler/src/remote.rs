//! TCP client for the compiling service.
//!
//! When a compiler executable is configured, it is launched first and the
//! connection is retried while it starts listening. The compile call itself
//! is never retried.

use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bdclip_common::config::CompilingSettings;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::process::{Child, Command};

use crate::error::TransportError;
use crate::progress::ProgressSink;
use crate::protocol::{encode_line, ClientMessage, ServiceMessage};
use crate::service::{CompileRequest, CompilingService, ServiceAddress, ServiceConnector};

const STARTUP_RETRY_INTERVAL: Duration = Duration::from_millis(100);
const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Connects to (and optionally launches) a compiling service over TCP.
#[derive(Debug, Clone)]
pub struct TcpConnector {
    settings: CompilingSettings,
}

impl TcpConnector {
    pub fn new(settings: CompilingSettings) -> Self {
        Self { settings }
    }

    fn launch(&self, path: &Path, address: &ServiceAddress) -> Result<Child, TransportError> {
        tracing::info!(compiler = %path.display(), port = address.port, "Launching compiler");
        Command::new(path)
            .arg("--port")
            .arg(address.port.to_string())
            .arg("--endpoint")
            .arg(&address.endpoint)
            .arg("--schema-dir")
            .arg(&self.settings.schema_dir)
            .arg("--temp-dir")
            .arg(&self.settings.temp_dir)
            .arg("--cache-size")
            .arg(self.settings.cache_size.to_string())
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| TransportError::Launch {
                path: path.to_path_buf(),
                source,
            })
    }
}

#[async_trait]
impl ServiceConnector for TcpConnector {
    async fn connect(
        &self,
        address: &ServiceAddress,
    ) -> Result<Box<dyn CompilingService>, TransportError> {
        let mut child = match &self.settings.compiler_path {
            Some(path) => Some(self.launch(path, address)?),
            None => None,
        };
        let attempts = if child.is_some() {
            self.settings.startup_attempts.max(1)
        } else {
            1
        };

        let stream = connect_with_retry(address, attempts, &mut child).await?;
        tracing::info!(address = %address, "Connected to compiling service");

        let (read_half, write_half) = stream.into_split();
        Ok(Box::new(RemoteCompilingService {
            lines: BufReader::new(read_half).lines(),
            writer: write_half,
            endpoint: address.endpoint.clone(),
            settings: self.settings.clone(),
            _child: child,
        }))
    }

    fn name(&self) -> &str {
        "tcp"
    }
}

async fn connect_with_retry(
    address: &ServiceAddress,
    attempts: u32,
    child: &mut Option<Child>,
) -> Result<TcpStream, TransportError> {
    let mut attempt = 1;
    loop {
        match TcpStream::connect((address.host.as_str(), address.port)).await {
            Ok(stream) => return Ok(stream),
            Err(source) if attempt >= attempts => {
                return Err(TransportError::Connect {
                    address: address.to_string(),
                    source,
                });
            }
            Err(err) => {
                if let Some(process) = child.as_mut() {
                    if let Some(status) = process.try_wait()? {
                        return Err(TransportError::CompilerExited { status });
                    }
                }
                tracing::debug!(attempt, error = %err, "Compiling service not reachable yet");
                attempt += 1;
                tokio::time::sleep(STARTUP_RETRY_INTERVAL).await;
            }
        }
    }
}

/// An open channel to the compiling service.
pub struct RemoteCompilingService {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
    endpoint: String,
    settings: CompilingSettings,
    // Launched compiler, killed when the channel is dropped.
    _child: Option<Child>,
}

impl RemoteCompilingService {
    async fn send(&mut self, message: &ClientMessage) -> Result<(), TransportError> {
        let line = encode_line(message)
            .map_err(|e| TransportError::protocol(format!("failed to encode request: {e}")))?;
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl CompilingService for RemoteCompilingService {
    async fn compile(
        &mut self,
        request: CompileRequest<'_>,
        progress: Arc<dyn ProgressSink>,
    ) -> Result<bool, TransportError> {
        let submit = ClientMessage::Compile {
            endpoint: self.endpoint.clone(),
            project_id: request.project_id,
            workspace: request.workspace.to_path_buf(),
            schema_dir: self.settings.schema_dir.clone(),
            cache_size: self.settings.cache_size,
            clip: request.clip.clone(),
        };
        self.send(&submit).await?;
        tracing::debug!(project_id = %request.project_id, "Compile request submitted");

        let mut cancel_sent = false;
        let mut cancel_poll = tokio::time::interval(CANCEL_POLL_INTERVAL);

        loop {
            tokio::select! {
                line = self.lines.next_line() => {
                    let Some(line) = line? else {
                        return Err(TransportError::protocol(
                            "connection closed before compilation finished",
                        ));
                    };
                    if line.trim().is_empty() {
                        continue;
                    }
                    let message: ServiceMessage = serde_json::from_str(&line).map_err(|e| {
                        TransportError::protocol(format!("malformed service message: {e}"))
                    })?;
                    match message {
                        ServiceMessage::Total { amount } => progress.set_total(amount),
                        ServiceMessage::Progress { value } => progress.set_progress(value),
                        ServiceMessage::Completed { success } => {
                            tracing::debug!(success, "Compiling service finished");
                            return Ok(success);
                        }
                        ServiceMessage::Fault { message } => {
                            return Err(TransportError::RemoteAbort { message });
                        }
                    }
                }
                _ = cancel_poll.tick(), if !cancel_sent => {
                    if progress.is_cancelled() {
                        tracing::warn!(project_id = %request.project_id, "Forwarding cancellation");
                        self.send(&ClientMessage::Cancel).await?;
                        cancel_sent = true;
                    }
                }
            }
        }
    }
}
