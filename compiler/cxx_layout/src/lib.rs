//! Record layout and vtable-layout tables.
//!
//! This crate answers the byte-offset and vtable-slot queries the class
//! code generator needs: where each base sub-object lives, where each
//! virtual base lands in the complete object, which vtable slot holds a
//! virtual-base offset, and where each sub-object's vtable address point
//! sits. The code generator treats these as externally-supplied facts.
//!
//! [`ModuleLayout::compute`] implements a small deterministic layout
//! algorithm so tests can build hierarchies and get self-consistent
//! offsets without an external ABI library. The exact numbers are not an
//! ABI contract; only their mutual consistency is.

mod error;
mod module;
mod record;

pub use error::LayoutError;
pub use module::ModuleLayout;
pub use record::RecordLayout;

/// Pointer size of the abstract target, in bytes.
pub const POINTER_SIZE: u64 = 8;
