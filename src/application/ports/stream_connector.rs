use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StreamError {
    #[error("Failed to connect: {0}")]
    Connect(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

/// Opens realtime connections to the backend push channels.
#[async_trait]
pub trait StreamConnector: Send + Sync {
    async fn connect(&self, url: &str) -> Result<Box<dyn StreamConnection>, StreamError>;
}

/// One live connection. `next_text` yields text frames until the peer
/// closes (`None`) or the transport fails.
#[async_trait]
pub trait StreamConnection: Send + Sync {
    async fn next_text(&mut self) -> Option<Result<String, StreamError>>;
    async fn close(&mut self);
}
