//! Pinboard API errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PinboardError {
    #[error("No Pinboard API token configured. Run `pinboard-tags auth user:TOKEN` first")]
    MissingToken,

    #[error("Pinboard rejected the API token")]
    Unauthorized,

    #[error("Pinboard rate limit reached, try again in a few minutes")]
    RateLimited,

    #[error("Pinboard returned HTTP {status}")]
    Status { status: u16 },

    #[error("Pinboard request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to decode Pinboard response: {0}")]
    Decode(#[from] quick_xml::DeError),

    #[error("Pinboard reported: {0}")]
    Api(String),

    #[error("Invalid Pinboard API URL: {0}")]
    Url(#[from] url::ParseError),
}

impl PinboardError {
    /// Pinboard could not be reached or failed on its side. Anything else
    /// means the request itself was refused and retrying won't help.
    pub fn is_unreachable(&self) -> bool {
        match self {
            Self::Http(_) => true,
            Self::Status { status } => *status >= 500,
            _ => false,
        }
    }
}

pub type PinboardResult<T> = Result<T, PinboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_unreachable() {
        assert!(PinboardError::Status { status: 503 }.is_unreachable());
        assert!(!PinboardError::Status { status: 404 }.is_unreachable());
        assert!(!PinboardError::Unauthorized.is_unreachable());
        assert!(!PinboardError::MissingToken.is_unreachable());
        assert!(!PinboardError::RateLimited.is_unreachable());
        assert!(!PinboardError::Api("item already exists".to_string()).is_unreachable());
    }
}
