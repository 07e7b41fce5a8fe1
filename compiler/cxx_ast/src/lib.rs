//! AST-side data model for C++ class code generation.
//!
//! This crate holds what the code generator consumes from semantic
//! analysis: interned names, class descriptors with their base and field
//! lists, recognized triviality flags, and validated initializer lists.
//! Everything here is produced by upstream phases and trusted as-is; the
//! code generator never re-derives triviality or ambiguity facts.

mod class;
mod init;
mod interner;
mod name;

pub use class::{
    ArrayLen, BaseSpecifier, ClassArena, ClassDescriptor, ClassFlags, ClassId, FieldDescriptor,
    FieldType,
};
pub use init::{Constructor, CtorKind, DtorKind, InitExpr, InitTarget, Initializer};
pub use interner::StringInterner;
pub use name::Name;
