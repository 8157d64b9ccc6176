//! Error types for reading STEP data.

use thiserror::Error;

/// Errors raised while turning exchange-format bytes into a [`crate::StepShape`].
#[derive(Error, Debug)]
pub enum StepError {
    /// I/O error reading a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Unexpected character or malformed token.
    #[error("lexer error at line {line}, column {col}: {message}")]
    Lexer {
        /// Line number (1-indexed).
        line: usize,
        /// Column number (1-indexed).
        col: usize,
        /// Error message.
        message: String,
    },

    /// Token stream does not follow the Part 21 grammar.
    #[error("syntax error at line {line}, column {col}: {message}")]
    Syntax {
        /// Line number (1-indexed).
        line: usize,
        /// Column number (1-indexed).
        col: usize,
        /// Error message.
        message: String,
    },

    /// An entity's arguments do not have the expected shape.
    #[error("malformed entity #{entity_id}: {message}")]
    Entity {
        /// Entity ID where the error occurred.
        entity_id: u64,
        /// Error message.
        message: String,
    },

    /// Missing entity reference.
    #[error("missing entity reference: #{0}")]
    MissingEntity(u64),

    /// The same entity ID is defined twice in the DATA section.
    #[error("duplicate entity definition: #{0}")]
    DuplicateEntity(u64),

    /// Type mismatch (e.g., expected CARTESIAN_POINT but got DIRECTION).
    #[error("entity #{entity_id}: expected {expected}, got {actual}")]
    TypeMismatch {
        /// Entity ID that had the wrong type.
        entity_id: u64,
        /// Expected type name.
        expected: String,
        /// Actual type name.
        actual: String,
    },

    /// Invalid geometry (e.g., zero-length direction, negative radius).
    #[error("invalid geometry in #{entity_id}: {message}")]
    InvalidGeometry {
        /// Entity ID holding the geometry.
        entity_id: u64,
        /// Error message.
        message: String,
    },

    /// Invalid topology (e.g., a face without any bound).
    #[error("invalid topology in #{entity_id}: {message}")]
    InvalidTopology {
        /// Entity ID holding the topology.
        entity_id: u64,
        /// Error message.
        message: String,
    },

    /// The file parsed but holds no solid or shell to mesh.
    #[error("no solids or shells found in STEP data")]
    NoShapes,
}

impl StepError {
    /// Create a lexer error.
    pub fn lexer(line: usize, col: usize, message: impl Into<String>) -> Self {
        Self::Lexer {
            line,
            col,
            message: message.into(),
        }
    }

    /// Create a syntax error.
    pub fn syntax(line: usize, col: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            line,
            col,
            message: message.into(),
        }
    }

    /// Create an entity argument error.
    pub fn entity(entity_id: u64, message: impl Into<String>) -> Self {
        Self::Entity {
            entity_id,
            message: message.into(),
        }
    }

    /// Create a type mismatch error.
    pub fn type_mismatch(
        entity_id: u64,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            entity_id,
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create an invalid geometry error.
    pub fn geometry(entity_id: u64, message: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            entity_id,
            message: message.into(),
        }
    }

    /// Create an invalid topology error.
    pub fn topology(entity_id: u64, message: impl Into<String>) -> Self {
        Self::InvalidTopology {
            entity_id,
            message: message.into(),
        }
    }
}
