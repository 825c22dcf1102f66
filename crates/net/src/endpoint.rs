use thiserror::Error;
use url::Url;

/// Path of the room socket on the server origin.
pub const SOCKET_PATH: &str = "/ws";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EndpointError {
    #[error("invalid server origin {origin:?}: {reason}")]
    Parse { origin: String, reason: String },
    #[error("unsupported scheme {0:?}; expected http or https")]
    Scheme(String),
}

/// Socket URL for a server origin: same host and port, `ws` for plain
/// origins and `wss` for secure ones.
pub fn endpoint_url(origin: &str) -> Result<Url, EndpointError> {
    let trimmed = origin.trim();
    let mut url = Url::parse(trimmed).map_err(|err| EndpointError::Parse {
        origin: trimmed.to_string(),
        reason: err.to_string(),
    })?;
    let scheme = match url.scheme() {
        "https" | "wss" => "wss",
        "http" | "ws" => "ws",
        other => return Err(EndpointError::Scheme(other.to_string())),
    };
    if url.scheme() != scheme {
        url.set_scheme(scheme)
            .map_err(|()| EndpointError::Scheme(scheme.to_string()))?;
    }
    url.set_path(SOCKET_PATH);
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}
