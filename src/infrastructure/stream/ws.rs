use crate::application::ports::stream_connector::{
    StreamConnection, StreamConnector, StreamError,
};
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

/// tokio-tungstenite implementation of the realtime channel connector.
pub struct WsConnector;

#[async_trait]
impl StreamConnector for WsConnector {
    async fn connect(&self, url: &str) -> Result<Box<dyn StreamConnection>, StreamError> {
        let (socket, _response) = connect_async(url)
            .await
            .map_err(|err| StreamError::Connect(err.to_string()))?;
        Ok(Box::new(WsConnection { socket }))
    }
}

struct WsConnection {
    socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl StreamConnection for WsConnection {
    async fn next_text(&mut self) -> Option<Result<String, StreamError>> {
        loop {
            match self.socket.next().await {
                Some(Ok(Message::Text(text))) => return Some(Ok(text)),
                // Control and binary frames carry nothing for us.
                Some(Ok(Message::Close(_))) => return None,
                Some(Ok(_)) => continue,
                Some(Err(err)) => return Some(Err(StreamError::Transport(err.to_string()))),
                None => return None,
            }
        }
    }

    async fn close(&mut self) {
        let _ = self.socket.close(None).await;
    }
}
