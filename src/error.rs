use crate::formats::ListKind;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("GET {url}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("GET {url}: unexpected status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("read response body: {url}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    /// Whether another attempt at the same URL may succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Request { source, .. } => source.is_timeout() || source.is_connect(),
            Self::Status { status, .. } => {
                *status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
            Self::Body { .. } => true,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    /// A structural element with no fallback is absent.
    #[error("{kind} page is missing {what}")]
    MissingMarkup { kind: ListKind, what: &'static str },

    #[error("fetch first page")]
    Fetch(#[from] FetchError),
}
