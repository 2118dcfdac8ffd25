use reqwest::blocking::{Client, Request, Response};

use super::client::HttpClient;
use crate::error::Result;

/// Plain reqwest client with the transport's default timeouts.
pub struct BasicClient(Client);

impl BasicClient {
    pub fn new() -> Self {
        Self(Client::new())
    }
}

impl Default for BasicClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient for BasicClient {
    fn execute(&self, req: Request) -> Result<Response> {
        Ok(self.0.execute(req)?)
    }
}
