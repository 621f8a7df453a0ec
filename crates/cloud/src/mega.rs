//! A minimal HTTP object-store cloud provider, named `mega` after the
//! original source's sole non-`none` backend.
//!
//! This is not a protocol-accurate MEGA client — mirroring MEGA's
//! client-side encryption and API quirks is out of scope (spec.md §1 frames
//! the cloud adapter as a peripheral collaborator). Instead this speaks a
//! small REST-ish contract against `base_url`: `PUT`/`GET`/`DELETE` on
//! `<base_url>/<path>` for file content, `HEAD` for [`CloudStat`], and a
//! `POST /_mkdir`/`POST /_rename` pair for the two operations that have no
//! natural HTTP verb. Any object store that speaks this shape (a small
//! reverse proxy in front of S3, for instance) is a valid backend.

use std::io::Read;
use std::path::Path;
use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use url::Url;

use crate::{CloudError, CloudProvider, CloudSession, CloudStat, Credentials};

/// Per-request timeout, matching spec.md §5's reference provider.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// A provider backed by one HTTP object-store endpoint.
#[derive(Clone, Debug)]
pub struct MegaProvider {
    base_url: Url,
}

impl MegaProvider {
    /// Builds a provider targeting `base_url` (e.g. `https://store.example/backups`).
    #[must_use]
    pub const fn new(base_url: Url) -> Self {
        Self { base_url }
    }
}

impl CloudProvider for MegaProvider {
    fn login(&self, creds: Option<&Credentials>) -> Result<Box<dyn CloudSession>, CloudError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| CloudError::Login(e.to_string()))?;

        let mut request = client.post(self.join("_login")?);
        if let Some(creds) = creds {
            request = request.basic_auth(&creds.user, Some(&creds.pass));
        }
        let response = request.send().map_err(|e| CloudError::Login(e.to_string()))?;
        if !response.status().is_success() {
            return Err(CloudError::Login(format!(
                "login rejected with status {}",
                response.status()
            )));
        }

        Ok(Box::new(MegaSession {
            client,
            base_url: self.base_url.clone(),
        }))
    }
}

impl MegaProvider {
    fn join(&self, suffix: &str) -> Result<Url, CloudError> {
        self.base_url.join(suffix).map_err(|e| CloudError::Login(e.to_string()))
    }
}

/// The session type returned by [`MegaProvider::login`].
pub struct MegaSession {
    client: Client,
    base_url: Url,
}

impl MegaSession {
    fn url_for(&self, remote_path: &str) -> Result<Url, CloudError> {
        self.base_url
            .join(remote_path.trim_start_matches('/'))
            .map_err(|e| CloudError::Transport {
                path: remote_path.to_string(),
                reason: e.to_string(),
            })
    }

    fn transport_err(path: &str, reason: impl ToString) -> CloudError {
        CloudError::Transport {
            path: path.to_string(),
            reason: reason.to_string(),
        }
    }

    fn ensure_success(path: &str, response: Response) -> Result<Response, CloudError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(Self::transport_err(path, format!("HTTP {}", response.status())))
        }
    }
}

impl CloudSession for MegaSession {
    fn mkdir(&mut self, path: &str) -> Result<(), CloudError> {
        let url = self.url_for("_mkdir")?;
        let response = self
            .client
            .post(url)
            .query(&[("path", path)])
            .send()
            .map_err(|e| Self::transport_err(path, e))?;
        Self::ensure_success(path, response)?;
        Ok(())
    }

    fn readdir(&mut self, path: &str) -> Result<Vec<String>, CloudError> {
        let url = self.url_for("_readdir")?;
        let response = self
            .client
            .get(url)
            .query(&[("path", path)])
            .send()
            .map_err(|e| Self::transport_err(path, e))?;
        let response = Self::ensure_success(path, response)?;
        let body = response.text().map_err(|e| Self::transport_err(path, e))?;
        Ok(body.lines().map(str::to_string).filter(|l| !l.is_empty()).collect())
    }

    fn stat(&mut self, path: &str) -> Result<Option<CloudStat>, CloudError> {
        let url = self.url_for(path)?;
        let response = self.client.head(url).send().map_err(|e| Self::transport_err(path, e))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = Self::ensure_success(path, response)?;
        let size = response
            .headers()
            .get("content-length")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        let is_dir = response
            .headers()
            .get("x-is-dir")
            .is_some_and(|v| v == "1" || v == "true");
        let mtime = response
            .headers()
            .get("x-mtime")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        Ok(Some(CloudStat { is_dir, size, mtime }))
    }

    fn rename(&mut self, old: &str, new: &str) -> Result<(), CloudError> {
        let url = self.url_for("_rename")?;
        let response = self
            .client
            .post(url)
            .query(&[("old", old), ("new", new)])
            .send()
            .map_err(|e| Self::transport_err(old, e))?;
        Self::ensure_success(old, response)?;
        Ok(())
    }

    fn upload(&mut self, local_src: &Path, remote_dst: &str) -> Result<(), CloudError> {
        let mut file = std::fs::File::open(local_src).map_err(|e| Self::transport_err(remote_dst, e))?;
        let mut body = Vec::new();
        file.read_to_end(&mut body).map_err(|e| Self::transport_err(remote_dst, e))?;

        let url = self.url_for(remote_dst)?;
        let response = self
            .client
            .put(url)
            .body(body)
            .send()
            .map_err(|e| Self::transport_err(remote_dst, e))?;
        Self::ensure_success(remote_dst, response)?;
        Ok(())
    }

    fn download(&mut self, remote_src: &str, local_dst: &Path) -> Result<(), CloudError> {
        let url = self.url_for(remote_src)?;
        let response = self.client.get(url).send().map_err(|e| Self::transport_err(remote_src, e))?;
        let response = Self::ensure_success(remote_src, response)?;
        let bytes = response.bytes().map_err(|e| Self::transport_err(remote_src, e))?;
        std::fs::write(local_dst, bytes).map_err(|e| Self::transport_err(remote_src, e))
    }

    fn remove(&mut self, remote_path: &str) -> Result<(), CloudError> {
        let url = self.url_for(remote_path)?;
        let response = self
            .client
            .delete(url)
            .send()
            .map_err(|e| Self::transport_err(remote_path, e))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        Self::ensure_success(remote_path, response)?;
        Ok(())
    }

    fn logout(self: Box<Self>) -> Result<(), CloudError> {
        let url = self.url_for("_logout")?;
        let response = self
            .client
            .post(url)
            .send()
            .map_err(|e| Self::transport_err("_logout", e))?;
        Self::ensure_success("_logout", response)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_url_joins_preserve_base_path() {
        let base = Url::parse("https://store.example/backups/").unwrap();
        let provider = MegaProvider::new(base);
        let joined = provider.join("_mkdir").unwrap();
        assert_eq!(joined.as_str(), "https://store.example/backups/_mkdir");
    }
}
