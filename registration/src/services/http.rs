use async_trait::async_trait;
use reqwest::Response;

/// Information about an unsuccessful response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotSuccessResponseInfo {
    pub status_code: u16,
    pub text: String,
}

impl std::fmt::Display for NotSuccessResponseInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}: {}", self.status_code, self.text)
    }
}

#[async_trait]
pub trait ResponseExt {
    /// Status code and body of the response. The body is read whatever the status, GraphQL
    /// servers may report errors with a 4xx status.
    async fn status_and_text(self) -> Result<(u16, String), reqwest::Error>;
}

#[async_trait]
impl ResponseExt for Response {
    async fn status_and_text(self) -> Result<(u16, String), reqwest::Error> {
        let status = self.status().as_u16();
        let text = self.text().await?;
        Ok((status, text))
    }
}
