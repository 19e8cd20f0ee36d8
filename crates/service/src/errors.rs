use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("already exists: {0}")]
    AlreadyExists(String),
    #[error("storage error: {0}")]
    Storage(String),
}

impl ServiceError {
    /// The description clients receive when a looked-up id is absent.
    pub fn id_not_found() -> Self {
        Self::NotFound("ID is not valid, Please enter correct ID".into())
    }

    /// The description clients receive when a created id is already taken.
    pub fn id_exists() -> Self {
        Self::AlreadyExists("ID Already exists, a copy with same id would also not be created".into())
    }

    /// The human-readable message without the variant prefix.
    pub fn description(&self) -> &str {
        match self {
            Self::NotFound(msg) | Self::AlreadyExists(msg) | Self::Storage(msg) => msg,
        }
    }
}
