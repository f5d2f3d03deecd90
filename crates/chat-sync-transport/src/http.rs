//! HTTP plumbing shared by the JSON-RPC and GraphQL transports.

use std::time::Duration;

use chat_sync_core::{InitializationError, TransportError};
use reqwest::{Client, Url};
use serde::{Serialize, de::DeserializeOwned};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Resolve `path` under `endpoint`, keeping any path prefix the endpoint has.
pub(crate) fn endpoint_url(endpoint: &str, path: &str) -> Result<Url, InitializationError> {
    let invalid =
        |reason: String| InitializationError::InvalidEndpoint(format!("{endpoint}: {reason}"));

    let base = Url::parse(&format!("{}/", endpoint.trim().trim_end_matches('/')))
        .map_err(|e| invalid(e.to_string()))?;
    if !matches!(base.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme `{}`", base.scheme())));
    }
    base.join(path).map_err(|e| invalid(e.to_string()))
}

pub(crate) fn build_client() -> Result<Client, InitializationError> {
    Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .build()
        .map_err(|e| InitializationError::Connect(e.to_string()))
}

/// POST `body` as JSON and decode the JSON reply.
pub(crate) async fn post_json<B, R>(
    client: &Client,
    url: &Url,
    body: &B,
) -> Result<R, TransportError>
where
    B: Serialize + Sync,
    R: DeserializeOwned,
{
    let response = client
        .post(url.clone())
        .json(body)
        .send()
        .await
        .map_err(network_error)?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(TransportError::Status {
            code: status.as_u16(),
            body,
        });
    }

    let bytes = response.bytes().await.map_err(network_error)?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn network_error(err: reqwest::Error) -> TransportError {
    TransportError::Network(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_url_keeps_prefix() {
        let url = endpoint_url("http://chat.local/api", "rpc").unwrap();
        assert_eq!(url.as_str(), "http://chat.local/api/rpc");

        let url = endpoint_url("http://127.0.0.1:8080/", "graphql").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/graphql");
    }

    #[test]
    fn test_endpoint_url_rejects_garbage() {
        assert!(matches!(
            endpoint_url("not a url", "rpc"),
            Err(InitializationError::InvalidEndpoint(_))
        ));
        assert!(matches!(
            endpoint_url("ftp://chat.local", "rpc"),
            Err(InitializationError::InvalidEndpoint(_))
        ));
    }
}
