//! Failure vocabulary shared by the fetch and search tiers.

/// A failed attempt at one external lookup. Always transient from the
/// pipeline's point of view: the next variant or tier is tried instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} ({message})")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FailureKind {
    #[error("invalid url")]
    InvalidUrl,
    #[error("http status {0}")]
    HttpStatus(u16),
    #[error("timed out")]
    Timeout,
    #[error("more than {0} redirects")]
    TooManyRedirects(usize),
    #[error("body larger than {max_bytes} bytes")]
    TooLarge { max_bytes: u64 },
    #[error("unsupported content type {0:?}")]
    UnsupportedContentType(String),
    #[error("undecodable body")]
    Decode,
    /// None of the extraction strategies found result containers.
    #[error("no result containers")]
    NoResultContainers,
    #[error("network error")]
    Network,
}
