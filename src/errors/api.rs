use actix_web::{ResponseError, http::StatusCode};

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("Invalid identifier")]
    InvalidId(#[source] anyhow::Error),
    #[error("The promotion was not offered in this session and no display frequency was given")]
    UnknownFrequency,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidId(_) | Self::UnknownFrequency => StatusCode::BAD_REQUEST,
        }
    }
}
