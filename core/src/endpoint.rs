//! Endpoint parsing and URL composition.
//!
//! A client endpoint such as `http://host:5000/api/` is split into the
//! network part (`http://host:5000`) and a base path (`/api`). Every request
//! URL is the network part, the base path, the slash-joined resource and an
//! optional query string.

use url::Url;

use crate::error::EndpointError;
use crate::types::Query;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    base: Url,
    origin: String,
    base_path: String,
}

impl Endpoint {
    /// Parse a raw endpoint. A single trailing slash is dropped first.
    pub fn parse(raw: &str) -> Result<Self, EndpointError> {
        let trimmed = raw.strip_suffix('/').unwrap_or(raw);
        let mut base = Url::parse(trimmed).map_err(|source| EndpointError::Parse {
            endpoint: raw.to_string(),
            source,
        })?;
        if base.cannot_be_a_base() {
            return Err(EndpointError::NotABase(raw.to_string()));
        }

        // `url` reports "/" for an absent path.
        let base_path = match base.path() {
            "/" if !trimmed.ends_with('/') => String::new(),
            path => path.to_string(),
        };
        base.set_query(None);
        base.set_fragment(None);
        let origin = origin_of(&base);

        Ok(Self {
            base,
            origin,
            base_path,
        })
    }

    /// Scheme, credentials, host and port; never a path. The host is
    /// normalized, so it comes back lowercased and a default port is omitted.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Path component of the original endpoint, without trailing slash.
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Compose the URL for `resource` (already slash-joined).
    ///
    /// With `close_slash` the path always ends with exactly one `/` unless the
    /// resource itself supplies more. Empty queries add no `?`.
    pub fn url_for(&self, resource: &str, query: Option<&Query>, close_slash: bool) -> String {
        let mut path = format!("{}/{}", self.base_path, resource);
        if close_slash && !path.ends_with('/') {
            path.push('/');
        }

        let mut url = self.base.clone();
        url.set_path(&path);
        match query {
            Some(query) if !query.is_empty() => url.set_query(Some(&query.encode())),
            _ => url.set_query(None),
        }
        url.into()
    }
}

fn origin_of(url: &Url) -> String {
    let mut origin = format!("{}://", url.scheme());
    if !url.username().is_empty() {
        origin.push_str(url.username());
        if let Some(password) = url.password() {
            origin.push(':');
            origin.push_str(password);
        }
        origin.push('@');
    }
    if let Some(host) = url.host_str() {
        origin.push_str(host);
    }
    if let Some(port) = url.port() {
        origin.push_str(&format!(":{port}"));
    }
    origin
}
