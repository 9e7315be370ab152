#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("Visitor storage is unavailable")]
    Unavailable(#[source] anyhow::Error),
    #[error("Visitor storage is full")]
    QuotaExceeded(#[source] anyhow::Error),
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}
