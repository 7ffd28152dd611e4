//! Convenience result type alias for plugreg.

use crate::error::AppError;

/// A specialized `Result` type for plugreg operations.
pub type AppResult<T> = Result<T, AppError>;
