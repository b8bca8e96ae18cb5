use std::time::Duration;

use async_trait::async_trait;
use futures::TryStreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use reqwest::{Body, Client, Method, RequestBuilder, Response, StatusCode};
use tracing::debug;

use super::dav_transport::{ByteStream, DavEntry, DavTransport, Result, TransportError};
use super::propfind::{PROPFIND_BODY, parse_multistatus};

/// Basic-auth credentials for the WebDAV share.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// An HTTP implementation of `DavTransport`.
///
/// Redirects are never followed: a 301 is surfaced to the caller as an error,
/// since it is the only signal that a path exists under its other shape.
pub struct HttpTransport {
    client: Client,
    credentials: Option<Credentials>,
}

impl HttpTransport {
    /// Create a transport with its own reqwest client.
    pub fn new(credentials: Option<Credentials>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .redirect(Policy::none())
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            credentials,
        })
    }

    /// Create a transport with a custom reqwest client.
    ///
    /// The client should not follow redirects.
    pub fn with_client(client: Client, credentials: Option<Credentials>) -> Self {
        Self {
            client,
            credentials,
        }
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let request = self.client.request(method, url);
        match &self.credentials {
            Some(credentials) => {
                request.basic_auth(&credentials.username, credentials.password.as_ref())
            }
            None => request,
        }
    }

    async fn propfind(&self, url: &str, depth: &str) -> Result<Vec<DavEntry>> {
        debug!(url, depth, "PROPFIND");
        let response = self
            .request(extension_method(b"PROPFIND")?, url)
            .header("Depth", depth)
            .header(CONTENT_TYPE, "application/xml; charset=utf-8")
            .body(PROPFIND_BODY)
            .send()
            .await?;
        let response = check_status(response, url)?;
        let body = response.text().await?;
        parse_multistatus(url, &body)
    }
}

fn extension_method(name: &[u8]) -> Result<Method> {
    Method::from_bytes(name).map_err(|e| TransportError::other(e.to_string()))
}

/// Turn any non-2xx status (207 included as success) into a `TransportError`.
fn check_status(response: Response, url: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() || status == StatusCode::MULTI_STATUS {
        Ok(response)
    } else {
        Err(TransportError::status(
            status.as_u16(),
            format!("{} {}", status.canonical_reason().unwrap_or("error"), url),
        ))
    }
}

#[async_trait]
impl DavTransport for HttpTransport {
    async fn list(&self, url: &str) -> Result<Vec<DavEntry>> {
        self.propfind(url, "1").await
    }

    async fn fetch_metadata(&self, url: &str) -> Result<DavEntry> {
        self.propfind(url, "0")
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| TransportError::status(404, format!("no properties for {}", url)))
    }

    async fn open_read(&self, url: &str) -> Result<ByteStream> {
        let response = self.request(Method::GET, url).send().await?;
        let response = check_status(response, url)?;
        Ok(Box::pin(response.bytes_stream().map_err(TransportError::from)))
    }

    async fn upload(&self, url: &str, content: ByteStream) -> Result<()> {
        debug!(url, "PUT");
        let response = self
            .request(Method::PUT, url)
            .body(Body::wrap_stream(content))
            .send()
            .await?;
        check_status(response, url)?;
        Ok(())
    }

    async fn create_container(&self, url: &str) -> Result<()> {
        debug!(url, "MKCOL");
        let response = self.request(extension_method(b"MKCOL")?, url).send().await?;
        check_status(response, url)?;
        Ok(())
    }

    async fn delete(&self, url: &str) -> Result<()> {
        debug!(url, "DELETE");
        let response = self.request(Method::DELETE, url).send().await?;
        check_status(response, url)?;
        Ok(())
    }
}
