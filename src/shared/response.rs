use serde::Serialize;
use utoipa::ToSchema;

/// Envelope wrapping every successful response body.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub status: u16,
    pub message: String,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<PageLinks>,
}

impl<T> ApiResponse<T> {
    pub fn new(status: u16, message: impl Into<String>, data: T) -> Self {
        Self {
            status,
            message: message.into(),
            data,
            links: None,
        }
    }

    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self::new(200, message, data)
    }

    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self::new(201, message, data)
    }

    pub fn with_links(mut self, links: PageLinks) -> Self {
        self.links = Some(links);
        self
    }
}

/// Navigation links attached to paginated responses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct PageLinks {
    #[serde(rename = "self", skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}
