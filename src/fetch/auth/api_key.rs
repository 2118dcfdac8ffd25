use reqwest::blocking::{Request, Response};
use reqwest::header::{AUTHORIZATION, HeaderName, HeaderValue};

use crate::error::{Error, Result};
use crate::fetch::client::HttpClient;

/// An [`HttpClient`] wrapper that injects an API key as an HTTP header.
///
/// The header name and value are validated once at construction so every
/// request carries the same, already-checked credential.
pub struct ApiKey<C> {
    inner: C,
    header_name: HeaderName,
    value: HeaderValue,
}

impl<C> ApiKey<C> {
    /// Sends `key` verbatim in the `header_name` header (e.g. `api_key`).
    pub fn new(inner: C, header_name: &str, key: &str) -> Result<Self> {
        let header_name = HeaderName::from_bytes(header_name.as_bytes())
            .map_err(|e| Error::Config(format!("invalid auth header name '{header_name}': {e}")))?;
        Ok(Self {
            inner,
            header_name,
            value: sensitive(key)?,
        })
    }

    /// Sends `Authorization: Bearer <key>`.
    pub fn bearer(inner: C, key: &str) -> Result<Self> {
        Ok(Self {
            inner,
            header_name: AUTHORIZATION,
            value: sensitive(&format!("Bearer {key}"))?,
        })
    }

    pub fn header_name(&self) -> &HeaderName {
        &self.header_name
    }

    /// Adds the credential header to `req`, replacing any previous value.
    pub fn authorize(&self, req: &mut Request) {
        req.headers_mut()
            .insert(self.header_name.clone(), self.value.clone());
    }
}

fn sensitive(value: &str) -> Result<HeaderValue> {
    let mut value = HeaderValue::from_str(value)
        .map_err(|_| Error::Config("API key contains characters not allowed in a header".into()))?;
    value.set_sensitive(true);
    Ok(value)
}

impl<C: HttpClient> HttpClient for ApiKey<C> {
    fn execute(&self, mut req: Request) -> Result<Response> {
        self.authorize(&mut req);
        self.inner.execute(req)
    }
}
