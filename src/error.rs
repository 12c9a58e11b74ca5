// ABOUTME: Crate-wide error type aggregating every module's failures.
// ABOUTME: Uses thiserror; all violations surface synchronously, never logged away.

use thiserror::Error;

use crate::class::ClassError;
use crate::hooks::DefineError;
use crate::marking::MarkError;
use crate::member::MemberError;
use crate::registry::FinalsError;
use crate::types::{MemberNameError, QualNameError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Define(#[from] DefineError),

    #[error(transparent)]
    Mark(#[from] MarkError),

    #[error(transparent)]
    Member(#[from] MemberError),

    #[error(transparent)]
    Class(#[from] ClassError),

    #[error(transparent)]
    Finals(#[from] FinalsError),

    #[error(transparent)]
    QualName(#[from] QualNameError),

    #[error(transparent)]
    MemberName(#[from] MemberNameError),
}

pub type Result<T> = std::result::Result<T, Error>;
