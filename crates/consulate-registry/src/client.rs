//! HTTP client for the agent's registration and check endpoints.
//!
//! Each call opens a fresh HTTP/1 connection to the agent, sends one
//! request, and drops the response once its status is known. There is no
//! retry: a transport error or any status other than `200 OK` is returned
//! to the caller as the operation's error. Every request is bounded by the
//! client's timeout, so an agent that accepts a connection but never answers
//! surfaces as an error instead of a hang.

use std::time::Duration;

use bytes::Bytes;
use http::header::{CONTENT_TYPE, HOST, USER_AGENT};
use http::{Method, Request, StatusCode, Uri};
use http_body_util::Full;
use hyper_util::rt::TokioIo;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use tokio::net::TcpStream;
use tracing::{debug, info};

use crate::error::{RegistryError, RegistryResult};
use crate::types::{CheckStatus, Registration, ServiceRegistration, check_id_for};

const API_ROOT: &str = "/v1";
const DEFAULT_HTTP_PORT: u16 = 80;

/// Bound on a single request, connect through response headers.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Bytes escaped in a path segment. `:` stays literal so check ids read as
/// `service:<id>` on the wire.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Client for a single registry agent.
#[derive(Debug, Clone)]
pub struct RegistryClient {
    /// Normalized base address, e.g. `http://localhost:8500`.
    address: String,
    host: String,
    port: u16,
    /// Value for the `Host` header.
    authority: String,
    /// Path prefix from the address, without a trailing `/`.
    base_path: String,
    timeout: Duration,
}

impl RegistryClient {
    /// Create a client for the agent at `address`.
    ///
    /// `http://` is prepended when the address has no scheme and a single
    /// trailing `/` is removed.
    pub fn new(address: &str) -> RegistryResult<Self> {
        let address = normalize_address(address);
        let invalid = |reason: String| RegistryError::InvalidAddress {
            address: address.clone(),
            reason,
        };

        let uri: Uri = address
            .parse()
            .map_err(|e: http::uri::InvalidUri| invalid(e.to_string()))?;
        let authority = uri
            .authority()
            .ok_or_else(|| invalid("missing host".to_string()))?;

        let host = authority
            .host()
            .trim_start_matches('[')
            .trim_end_matches(']')
            .to_string();
        let port = authority.port_u16().unwrap_or(DEFAULT_HTTP_PORT);
        let authority = authority.as_str().to_string();
        let base_path = uri.path().trim_end_matches('/').to_string();

        Ok(Self {
            address,
            host,
            port,
            authority,
            base_path,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        })
    }

    /// Override the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The normalized base address.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Register a service and return its id and the id of its check.
    ///
    /// An empty `service.id` registers the service under its name.
    pub async fn register(&self, service: &ServiceRegistration) -> RegistryResult<Registration> {
        let service_id = service.resolved_id().to_string();
        let body = ServiceRegistration {
            id: service_id.clone(),
            ..service.clone()
        };
        let data = serde_json::to_vec(&body).map_err(|e| RegistryError::Encode(e.to_string()))?;

        let status = self
            .send(
                Method::POST,
                &format!("{API_ROOT}/agent/service/register"),
                Bytes::from(data),
            )
            .await
            .map_err(RegistryError::Registration)?;
        if status != StatusCode::OK {
            return Err(RegistryError::Registration(status.to_string()));
        }

        let check_id = check_id_for(&service_id);
        info!(%service_id, %check_id, "service registered");
        Ok(Registration {
            service_id,
            check_id,
        })
    }

    /// Remove a service from the agent.
    pub async fn deregister(&self, service_id: &str) -> RegistryResult<()> {
        let status = self
            .send(
                Method::GET,
                &format!("{API_ROOT}/agent/service/deregister/{}", segment(service_id)),
                Bytes::new(),
            )
            .await
            .map_err(RegistryError::Deregistration)?;
        if status != StatusCode::OK {
            return Err(RegistryError::Deregistration(status.to_string()));
        }

        info!(%service_id, "service deregistered");
        Ok(())
    }

    /// Set the status of a check, attaching `note` when it is non-empty.
    pub async fn update_check(
        &self,
        check_id: &str,
        note: &str,
        status: CheckStatus,
    ) -> RegistryResult<()> {
        let query = if note.is_empty() {
            String::new()
        } else {
            let encoded = serde_urlencoded::to_string([("note", note)])
                .map_err(|e| RegistryError::Encode(e.to_string()))?;
            format!("?{encoded}")
        };

        let code = self
            .send(
                Method::GET,
                &format!("{API_ROOT}/agent/check/{status}/{}{query}", segment(check_id)),
                Bytes::new(),
            )
            .await
            .map_err(RegistryError::CheckUpdate)?;
        if code != StatusCode::OK {
            return Err(RegistryError::CheckUpdate(code.to_string()));
        }

        debug!(%check_id, %status, "check updated");
        Ok(())
    }

    /// Send one request and return the response status.
    ///
    /// The response is dropped before returning, which releases its body
    /// exactly once on every path.
    async fn send(&self, method: Method, path: &str, body: Bytes) -> Result<StatusCode, String> {
        let uri = format!("{}{path}", self.base_path);

        match tokio::time::timeout(self.timeout, self.exchange(&method, &uri, body)).await {
            Ok(result) => result,
            Err(_) => Err(format!("{method} {uri}: timed out after {:?}", self.timeout)),
        }
    }

    async fn exchange(
        &self,
        method: &Method,
        uri: &str,
        body: Bytes,
    ) -> Result<StatusCode, String> {
        let stream = TcpStream::connect((self.host.as_str(), self.port))
            .await
            .map_err(|e| format!("connect to {}: {e}", self.address))?;

        let io = TokioIo::new(stream);
        let (mut sender, conn) = hyper::client::conn::http1::handshake(io)
            .await
            .map_err(|e| format!("handshake with {}: {e}", self.address))?;

        // Drive the connection in the background.
        tokio::spawn(async move {
            if let Err(e) = conn.await {
                debug!(error = %e, "registry connection closed with error");
            }
        });

        let mut request = Request::builder()
            .method(method)
            .uri(uri)
            .header(HOST, &self.authority)
            .header(USER_AGENT, "consulate/0.1");
        if !body.is_empty() {
            request = request.header(CONTENT_TYPE, "application/json");
        }
        let request = request.body(Full::new(body)).map_err(|e| e.to_string())?;

        debug!(%method, %uri, "registry request");
        let response = sender
            .send_request(request)
            .await
            .map_err(|e| format!("{method} {uri}: {e}"))?;
        Ok(response.status())
    }
}

/// Percent-encode one path segment.
fn segment(value: &str) -> String {
    utf8_percent_encode(value, PATH_SEGMENT).to_string()
}

/// Prepend `http://` when no scheme is present and strip one trailing `/`.
fn normalize_address(address: &str) -> String {
    let mut address = if address.starts_with("http") {
        address.to_string()
    } else {
        format!("http://{address}")
    };
    if address.ends_with('/') {
        address.pop();
    }
    address
}
