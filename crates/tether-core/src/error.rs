//! Error types for member resolution and access

/// Result type for member operations
pub type MemberResult<T> = Result<T, MemberError>;

/// Errors raised during member resolution and member access
#[derive(Debug, Clone, thiserror::Error)]
pub enum MemberError {
    /// Two method candidates tied on priority during selection
    #[error("Ambiguous match: multiple '{member}' candidates of equal priority on {type_name}")]
    AmbiguousMatch {
        /// Name of the type the request was made against
        type_name: String,
        /// Requested member name
        member: String,
    },

    /// Read attempted on a member that has no getter
    #[error("Member '{member}' must be readable")]
    MustBeReadable {
        /// Member name
        member: String,
    },

    /// Write attempted on a member that has no setter
    #[error("Member '{member}' must be writable")]
    MustBeWritable {
        /// Member name
        member: String,
    },

    /// A value did not have the shape an operation required
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch {
        /// Expected type name
        expected: String,
        /// Actual type name
        got: String,
    },

    /// List element access outside the current bounds
    #[error("Index {index} out of bounds (length {len})")]
    IndexOutOfBounds {
        /// Requested element index
        index: usize,
        /// Current list length
        len: usize,
    },

    /// Member applied to a target it cannot serve
    #[error("Invalid target for member '{member}'")]
    InvalidTarget {
        /// Member name
        member: String,
    },

    /// Unique insert on a key that is already present
    #[error("Duplicate key: {key}")]
    DuplicateKey {
        /// Rendered key
        key: String,
    },
}

impl MemberError {
    /// Shorthand for a [`MemberError::TypeMismatch`]
    pub fn type_mismatch(expected: impl Into<String>, got: impl Into<String>) -> Self {
        MemberError::TypeMismatch {
            expected: expected.into(),
            got: got.into(),
        }
    }

    /// Shorthand for a [`MemberError::MustBeReadable`]
    pub fn must_be_readable(member: impl Into<String>) -> Self {
        MemberError::MustBeReadable {
            member: member.into(),
        }
    }

    /// Shorthand for a [`MemberError::MustBeWritable`]
    pub fn must_be_writable(member: impl Into<String>) -> Self {
        MemberError::MustBeWritable {
            member: member.into(),
        }
    }
}
