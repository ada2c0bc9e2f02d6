//! Wardrobe-specific error types.

use styleme_core::{AppError, RusqliteErrorExt, StorageError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WardrobeError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Invalid item: {0}")]
    InvalidItem(String),

    #[error("Item not found: {0}")]
    NotFound(i64),
}

impl WardrobeError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Storage(e) => e.user_message(),
            Self::InvalidItem(_) => "That item is missing required details.",
            Self::NotFound(_) => "That item is no longer in your wardrobe.",
        }
    }
}

impl From<rusqlite::Error> for WardrobeError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Storage(err.into_storage_error())
    }
}

impl From<WardrobeError> for AppError {
    fn from(err: WardrobeError) -> Self {
        match err {
            WardrobeError::Storage(e) => AppError::Storage(e),
            other => AppError::Other(other.into()),
        }
    }
}

pub type WardrobeResult<T> = Result<T, WardrobeError>;
