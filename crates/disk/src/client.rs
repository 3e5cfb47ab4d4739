//! REST client for the disk service
//!
//! Wraps reqwest and implements the DiskApi trait from ydg-core. Every call
//! is a single request (two for private download targets and publish); there
//! is no retry and no polling of asynchronous operations.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use ydg_core::config::{ApiConfig, TransportConfig};
use ydg_core::{
    DiskApi, DiskPath, DownloadSource, Error, ListPage, RemoteEntry, Result, TransferTarget,
};

use crate::wire::{Link, Resource, api_error, network_error};

/// Build the shared HTTP client
pub fn http_client(config: &TransportConfig) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
        .user_agent(concat!("ydg/", env!("CARGO_PKG_VERSION")));
    if let Some(timeout) = config.timeout_ms {
        builder = builder.timeout(Duration::from_millis(timeout));
    }
    builder
        .build()
        .map_err(|e| Error::Config(format!("cannot build HTTP client: {e}")))
}

/// Disk REST API client
#[derive(Debug, Clone)]
pub struct DiskClient {
    http: reqwest::Client,
    base_url: Url,
}

impl DiskClient {
    /// Create a client from configuration
    pub fn new(api: &ApiConfig, transport: &TransportConfig) -> Result<Self> {
        Self::with_http(http_client(transport)?, &api.base_url)
    }

    /// Create a client on an existing HTTP client (shares its connection pool)
    pub fn with_http(http: reqwest::Client, base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(Url::parse(&format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        ))?)
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> Result<RequestBuilder> {
        let mut request = self.http.request(method, self.endpoint(path)?);
        if let Some(token) = token {
            let value = HeaderValue::from_str(&format!("OAuth {token}"))
                .map_err(|_| Error::InvalidArguments("oauth token is not a valid header".into()))?;
            request = request.header(AUTHORIZATION, value);
        }
        Ok(request)
    }

    /// Send and return the response if its status is accepted
    async fn execute(
        &self,
        request: RequestBuilder,
        accepted: &[StatusCode],
    ) -> Result<reqwest::Response> {
        let response = request.send().await.map_err(network_error)?;
        let status = response.status();
        let accepted = if accepted.is_empty() {
            status.is_success()
        } else {
            accepted.contains(&status)
        };

        if accepted {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        debug!(status = status.as_u16(), "API request failed");
        Err(api_error(status, &body))
    }

    async fn execute_json<R: DeserializeOwned>(&self, request: RequestBuilder) -> Result<R> {
        let response = self.execute(request, &[]).await?;
        response
            .json()
            .await
            .map_err(|e| Error::Network(format!("malformed response: {}", e.without_url())))
    }

    async fn fetch_resource(&self, token: &str, path: &DiskPath) -> Result<Resource> {
        let request = self
            .request(Method::GET, "resources", Some(token))?
            .query(&[("path", path.as_str())]);
        self.execute_json(request).await
    }
}

#[async_trait]
impl DiskApi for DiskClient {
    async fn resource(&self, token: &str, path: &DiskPath) -> Result<RemoteEntry> {
        Ok(self.fetch_resource(token, path).await?.into())
    }

    async fn upload_target(
        &self,
        token: &str,
        path: &DiskPath,
        overwrite: bool,
    ) -> Result<TransferTarget> {
        let request = self
            .request(Method::GET, "resources/upload", Some(token))?
            .query(&[("path", path.as_str()), ("overwrite", bool_str(overwrite))]);
        let link: Link = self.execute_json(request).await?;
        debug!(path = %path, "upload link issued");
        Ok(TransferTarget {
            href: link.href,
            size: None,
        })
    }

    async fn download_target(&self, source: &DownloadSource) -> Result<TransferTarget> {
        match source {
            DownloadSource::Private { token, path } => {
                let resource = self.fetch_resource(token, path).await?;
                let entry = RemoteEntry::from(resource);
                if entry.is_dir() {
                    return Err(Error::InvalidArguments(format!(
                        "{path} is a directory, not a file"
                    )));
                }

                let request = self
                    .request(Method::GET, "resources/download", Some(token))?
                    .query(&[("path", path.as_str())]);
                let link: Link = self.execute_json(request).await?;
                Ok(TransferTarget {
                    href: link.href,
                    size: entry.size,
                })
            }
            DownloadSource::Public { key, path } => {
                let mut request = self
                    .request(Method::GET, "public/resources/download", None)?
                    .query(&[("public_key", key.as_str())]);
                if let Some(path) = path {
                    request = request.query(&[("path", path.as_str())]);
                }
                let link: Link = self.execute_json(request).await?;
                Ok(TransferTarget {
                    href: link.href,
                    size: None,
                })
            }
        }
    }

    async fn move_resource(
        &self,
        token: &str,
        from: &DiskPath,
        to: &DiskPath,
        overwrite: bool,
    ) -> Result<()> {
        let request = self
            .request(Method::POST, "resources/move", Some(token))?
            .query(&[
                ("from", from.as_str()),
                ("path", to.as_str()),
                ("overwrite", bool_str(overwrite)),
            ]);
        let response = self
            .execute(request, &[StatusCode::CREATED, StatusCode::ACCEPTED])
            .await?;
        if response.status() == StatusCode::ACCEPTED {
            debug!(from = %from, to = %to, "move accepted for background completion");
        }
        Ok(())
    }

    async fn delete(&self, token: &str, path: &DiskPath, permanently: bool) -> Result<()> {
        let request = self
            .request(Method::DELETE, "resources", Some(token))?
            .query(&[
                ("path", path.as_str()),
                ("permanently", bool_str(permanently)),
            ]);
        let response = self
            .execute(request, &[StatusCode::NO_CONTENT, StatusCode::ACCEPTED])
            .await?;
        if response.status() == StatusCode::ACCEPTED {
            debug!(path = %path, "delete accepted for background completion");
        }
        Ok(())
    }

    async fn list(
        &self,
        token: &str,
        path: &DiskPath,
        limit: u32,
        offset: u64,
    ) -> Result<ListPage> {
        let request = self
            .request(Method::GET, "resources", Some(token))?
            .query(&[("path", path.as_str())])
            .query(&[("limit", limit as u64), ("offset", offset)]);
        let resource: Resource = self.execute_json(request).await?;

        let listing = resource.embedded.ok_or_else(|| {
            Error::InvalidArguments(format!("{path} is a file, not a directory"))
        })?;
        Ok(ListPage {
            path: resource.path,
            items: listing.items.into_iter().map(RemoteEntry::from).collect(),
            limit: listing.limit.unwrap_or(limit),
            offset: listing.offset.unwrap_or(offset),
            total: listing.total,
        })
    }

    async fn publish(&self, token: &str, path: &DiskPath) -> Result<String> {
        let request = self
            .request(Method::PUT, "resources/publish", Some(token))?
            .query(&[("path", path.as_str())]);
        self.execute(request, &[]).await?;

        let resource = self.fetch_resource(token, path).await?;
        resource.public_url.ok_or_else(|| Error::Remote {
            status: 200,
            message: format!("{path} was published but no public URL was returned"),
        })
    }
}

const fn bool_str(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}
