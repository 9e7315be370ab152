#[derive(thiserror::Error, Debug)]
pub enum RemoteError {
    #[error("Remote store request failed")]
    RequestFailed(#[from] reqwest::Error),
    #[error("Remote store returned a malformed payload")]
    MalformedPayload(#[source] anyhow::Error),
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}
