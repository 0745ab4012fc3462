mod url;
mod ws;

pub use url::build_stream_url;
pub use ws::WsConnector;
