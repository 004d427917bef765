// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Errors reported by field access, assignment and bulk copy.

use thiserror::Error;

/// Recoverable access errors.
///
/// Kind mismatches on the typed readers (`int32()`, `time()`, ...) are not
/// represented here: they abort with a panic naming the field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("field not found: {0}")]
    FieldNotFound(String),

    #[error("type mismatch: expected {expected}, got {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("to_struct: expected a non-nil pointer as an argument")]
    NilDestination,

    #[error("to_struct: expected a pointer to struct as an argument, got {0}")]
    NotAStruct(String),

    #[error("index out of bounds: {index} >= {length}")]
    IndexOutOfBounds { index: usize, length: usize },

    #[error("array of length {length} cannot grow")]
    FixedLength { length: usize },

    #[error("invalid map key: {0}")]
    InvalidKey(String),
}

impl AccessError {
    /// Shorthand for [`AccessError::TypeMismatch`].
    pub fn mismatch(expected: impl ToString, found: impl ToString) -> Self {
        Self::TypeMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }
}

/// Result alias for accessor operations.
pub type Result<T> = std::result::Result<T, AccessError>;
