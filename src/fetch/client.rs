use reqwest::blocking::{Request, Response};

use crate::error::Result;

/// Blocking transport seam. Wrappers such as
/// [`ApiKey`](crate::fetch::auth::ApiKey) decorate an inner client.
pub trait HttpClient {
    fn execute(&self, req: Request) -> Result<Response>;
}

