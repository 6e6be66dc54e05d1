use std::time::Duration;

use tokio::net::TcpStream;

use step_api::ComponentError;

/// Исходящее TCP соединение к feed'у сообщений.
///
/// Single-connection transport: одно соединение на весь запуск step'а.
pub struct TcpClientTransport {
    addr: String,
    connect_timeout: Duration,
}

impl TcpClientTransport {
    pub fn new(addr: impl Into<String>, connect_timeout: Duration) -> Self {
        Self { addr: addr.into(), connect_timeout }
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    pub async fn connect(&self) -> Result<TcpStream, ComponentError> {
        let stream = tokio::time::timeout(self.connect_timeout, TcpStream::connect(&self.addr))
            .await
            .map_err(|_| {
                ComponentError::io(format!(
                    "TCP connect to {}: timed out after {:?}",
                    self.addr, self.connect_timeout
                ))
            })?
            .map_err(|e| ComponentError::io(format!("TCP connect to {}: {e}", self.addr)))?;

        let peer = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "?".into());
        tracing::info!(addr = %self.addr, %peer, "tcp-client connected");
        Ok(stream)
    }
}
