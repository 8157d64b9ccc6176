//! Typed views over raw STEP entities.
//!
//! Each submodule turns one family of AP203/AP214 entities into plain Rust
//! values. Parsers take the whole [`StepFile`] so they can follow references.

pub mod curves;
pub mod geometry;
pub mod surfaces;
pub mod topology;

pub use curves::*;
pub use geometry::*;
pub use surfaces::*;
pub use topology::*;

use crate::error::StepError;
use crate::parser::{StepEntity, StepFile, StepValue};

/// Typed argument accessors for STEP entities.
pub trait EntityArgs {
    /// Required real argument.
    fn real(&self, idx: usize) -> Result<f64, StepError>;

    /// Required enumeration argument.
    fn enumeration(&self, idx: usize) -> Result<&str, StepError>;

    /// Required logical argument (`.T.` / `.F.`).
    fn boolean(&self, idx: usize) -> Result<bool, StepError>;

    /// Required entity reference.
    fn entity_ref(&self, idx: usize) -> Result<u64, StepError>;

    /// Optional entity reference: `None` for `$`.
    fn optional_ref(&self, idx: usize) -> Result<Option<u64>, StepError>;

    /// Required list argument.
    fn list(&self, idx: usize) -> Result<&[StepValue], StepError>;

    /// List of reals.
    fn real_list(&self, idx: usize) -> Result<Vec<f64>, StepError>;

    /// List of entity references.
    fn entity_ref_list(&self, idx: usize) -> Result<Vec<u64>, StepError>;
}

impl StepEntity {
    fn arg_error(&self, idx: usize, what: &str) -> StepError {
        StepError::entity(
            self.id,
            format!("expected {what} at argument {idx} of {}", self.type_name),
        )
    }
}

impl EntityArgs for StepEntity {
    fn real(&self, idx: usize) -> Result<f64, StepError> {
        self.args
            .get(idx)
            .and_then(StepValue::as_real)
            .ok_or_else(|| self.arg_error(idx, "real"))
    }

    fn enumeration(&self, idx: usize) -> Result<&str, StepError> {
        self.args
            .get(idx)
            .and_then(StepValue::as_enum)
            .ok_or_else(|| self.arg_error(idx, "enumeration"))
    }

    fn boolean(&self, idx: usize) -> Result<bool, StepError> {
        match self.enumeration(idx)? {
            "T" | "TRUE" => Ok(true),
            "F" | "FALSE" => Ok(false),
            _ => Err(self.arg_error(idx, "logical")),
        }
    }

    fn entity_ref(&self, idx: usize) -> Result<u64, StepError> {
        self.args
            .get(idx)
            .and_then(StepValue::as_entity_ref)
            .ok_or_else(|| self.arg_error(idx, "entity reference"))
    }

    fn optional_ref(&self, idx: usize) -> Result<Option<u64>, StepError> {
        match self.args.get(idx) {
            None | Some(StepValue::Null) => Ok(None),
            Some(_) => self.entity_ref(idx).map(Some),
        }
    }

    fn list(&self, idx: usize) -> Result<&[StepValue], StepError> {
        self.args
            .get(idx)
            .and_then(StepValue::as_list)
            .ok_or_else(|| self.arg_error(idx, "list"))
    }

    fn real_list(&self, idx: usize) -> Result<Vec<f64>, StepError> {
        self.list(idx)?
            .iter()
            .map(|v| v.as_real().ok_or_else(|| self.arg_error(idx, "list of reals")))
            .collect()
    }

    fn entity_ref_list(&self, idx: usize) -> Result<Vec<u64>, StepError> {
        self.list(idx)?
            .iter()
            .map(|v| {
                v.as_entity_ref()
                    .ok_or_else(|| self.arg_error(idx, "list of entity references"))
            })
            .collect()
    }
}

/// Fetch an entity and check that its type is one of `expected`.
pub fn require_type<'a>(
    file: &'a StepFile,
    id: u64,
    expected: &[&str],
) -> Result<&'a StepEntity, StepError> {
    let entity = file.require(id)?;
    if expected.contains(&entity.type_name.as_str()) {
        Ok(entity)
    } else {
        Err(StepError::type_mismatch(id, expected.join(" | "), &entity.type_name))
    }
}
