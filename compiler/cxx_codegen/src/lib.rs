//! C++ class code generation.
//!
//! Lowers a class's construction, destruction, copy, and vtable
//! semantics into the abstract instruction stream of `cxx_ir`, honoring
//! the C++ object model: base sub-objects are constructed before members
//! and destroyed after them, virtual bases exist exactly once per
//! complete object and are only touched by complete-object variants, and
//! vtable pointers are installed between base and member initialization.
//!
//! # Architecture
//!
//! ```text
//! ClassArena + ModuleLayout
//!        ↓
//!    CodegenCx            (per-compilation-unit caches)
//!        ↓
//!  ctor / dtor / synth    (entry points, one call per emitted function)
//!        ↓
//!  copy / arrays / vtable / vtt / address / paths
//!        ↓
//!    cxx_ir::Function
//! ```
//!
//! All failures here are internal-consistency errors: semantic analysis
//! has already validated the input, so `NotABase` or an ambiguous path
//! means an upstream phase is broken, not that the user wrote bad code.

pub mod address;
pub mod arrays;
pub mod calls;
mod context;
pub mod copy;
pub mod ctor;
pub mod dtor;
mod error;
pub mod paths;
pub mod synth;
pub mod vtable;
pub mod vtt;

pub use context::{CodegenCx, CodegenOptions, FnCtx};
pub use error::{CodegenError, Result};
