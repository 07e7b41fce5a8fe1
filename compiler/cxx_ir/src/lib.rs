//! Abstract three-address / control-flow-graph target.
//!
//! The class code generator does not target a concrete instruction set;
//! it emits address computations, calls, branches, and memory operations
//! against this small IR. Tests inspect the emitted instruction stream
//! directly, and the pretty printer renders functions for debugging.
//!
//! The [`FuncBuilder`] follows the positioned-builder pattern: it is
//! scoped to a current basic block, and every `build_*` method appends at
//! that position. Instruction ids are handed out in emission order, so
//! iterating [`Function::insts`] replays the generation sequence.

mod builder;
mod func;
mod inst;
mod print;

pub use builder::FuncBuilder;
pub use func::{Block, CallSite, Function};
pub use inst::{Callee, IcmpPred, Inst, SymbolRef, Term};

use std::fmt;

/// Identifier of one emitted instruction (and its result value).
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct ValueId(u32);

impl ValueId {
    #[inline]
    pub const fn from_index(index: u32) -> Self {
        ValueId(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Identifier of a basic block within one function.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct BlockId(u32);

impl BlockId {
    #[inline]
    pub const fn from_index(index: u32) -> Self {
        BlockId(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bb{}", self.0)
    }
}

/// Identifier of a synthesized helper function owned by the codegen
/// context (e.g. array-destructor thunks).
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct HelperId(u32);

impl HelperId {
    #[inline]
    pub const fn from_index(index: u32) -> Self {
        HelperId(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for HelperId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "helper{}", self.0)
    }
}
