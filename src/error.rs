use thiserror::Error;

use crate::account::AccountError;
use crate::feed::FeedError;
use crate::session::SessionError;
use crate::storage::StorageError;

#[derive(Error, Debug)]
pub enum SinigangError {
    #[error(transparent)]
    Account(#[from] AccountError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Feed(#[from] FeedError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Account record missing for signed-in profile {0}")]
    MissingAccount(String),
}

pub type Result<T> = std::result::Result<T, SinigangError>;
