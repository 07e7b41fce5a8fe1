//! Code generation failures.
//!
//! Every variant is a precondition violation: semantic analysis
//! guarantees none of these can occur for a correctly-typed program, so
//! surfacing one aborts compilation with an internal error rather than
//! producing a user diagnostic.

use cxx_ast::ClassId;
use cxx_layout::LayoutError;
use thiserror::Error;

/// An internal-consistency failure during class code generation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodegenError {
    #[error("{base:?} is not a base class of {derived:?}")]
    NotABase { derived: ClassId, base: ClassId },

    #[error("{base:?} is reachable from {derived:?} through multiple distinct non-virtual paths")]
    AmbiguousNonVirtualBase { derived: ClassId, base: ClassId },

    #[error(
        "cannot recover {derived:?} from a {base:?} sub-object: \
         a virtual base lies on the inheritance path"
    )]
    VirtualBaseOnPath { derived: ClassId, base: ClassId },

    #[error("variable-length array of {elem:?} reached code generation")]
    VariableLengthSubObject { elem: ClassId },

    #[error(transparent)]
    Layout(#[from] LayoutError),
}

pub type Result<T> = std::result::Result<T, CodegenError>;
