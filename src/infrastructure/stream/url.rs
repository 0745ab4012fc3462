/// Derives a WebSocket endpoint from the HTTP base URL by scheme
/// substitution. Already-websocket URLs pass through; anything without a
/// recognized scheme defaults to secure.
pub fn build_stream_url(base_url: &str, path: &str) -> String {
    let trimmed = base_url.trim().trim_end_matches('/');
    let http_url = if path.starts_with('/') {
        format!("{trimmed}{path}")
    } else {
        format!("{trimmed}/{path}")
    };

    if http_url.starts_with("wss://") || http_url.starts_with("ws://") {
        http_url
    } else if let Some(rest) = http_url.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = http_url.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        format!("wss://{}", http_url.trim_start_matches('/'))
    }
}
