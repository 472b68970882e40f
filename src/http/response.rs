use serde::de::DeserializeOwned;

use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    pub duration_ms: u128,
    pub size_bytes: usize,
    pub content_type: String,
    pub body: String,
}

impl HttpResponse {
    /// Decode the body as JSON. `what` names the expected shape in the error.
    pub fn json<T: DeserializeOwned>(&self, what: &'static str) -> Result<T> {
        serde_json::from_str(&self.body).map_err(|source| Error::Decode { what, source })
    }
}
