//! Layout lookup failures.
//!
//! Every variant indicates an internal-consistency bug in an upstream
//! phase (a query for a relationship that does not exist), never a user
//! diagnostic.

use cxx_ast::ClassId;
use thiserror::Error;

/// A failed layout or vtable-layout query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("no layout computed for {0:?}")]
    MissingLayout(ClassId),

    #[error("{base:?} is not a direct non-virtual base of {class:?}")]
    NotADirectBase { class: ClassId, base: ClassId },

    #[error("{base:?} is not a virtual base of {class:?}")]
    NotAVirtualBase { class: ClassId, base: ClassId },

    #[error("missing vtable address point for {sub:?} at offset {offset} in {complete:?}")]
    MissingAddressPoint {
        complete: ClassId,
        sub: ClassId,
        offset: u64,
    },

    #[error("no virtual-base offset slot for {vbase:?} in {class:?}")]
    MissingVBaseSlot { class: ClassId, vbase: ClassId },

    #[error("no sub-VTT index for {base:?} within {class:?}")]
    MissingSubVttIndex { class: ClassId, base: ClassId },
}
