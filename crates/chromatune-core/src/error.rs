use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("registry error: {0}")]
    Registry(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
