//! Function and basic-block containers.

use crate::{BlockId, Callee, Inst, Term, ValueId};

/// A basic block: an ordered instruction list plus one terminator.
#[derive(Clone, Debug)]
pub struct Block {
    pub label: String,
    pub insts: Vec<ValueId>,
    pub term: Option<Term>,
}

/// A call instruction located within a function, in emission order.
#[derive(Clone, Debug)]
pub struct CallSite<'a> {
    pub value: ValueId,
    pub callee: &'a Callee,
    pub args: &'a [ValueId],
    pub unwind: Option<BlockId>,
}

/// One generated function.
///
/// Instructions live in a flat arena ordered by emission; blocks hold
/// references into it. Block 0 is the entry block.
#[derive(Clone, Debug)]
pub struct Function {
    pub name: String,
    pub num_params: u32,
    pub(crate) insts: Vec<Inst>,
    pub(crate) blocks: Vec<Block>,
}

impl Function {
    /// The instruction behind a value id.
    pub fn inst(&self, value: ValueId) -> &Inst {
        &self.insts[value.index()]
    }

    /// All instructions in emission order.
    pub fn insts(&self) -> impl Iterator<Item = (ValueId, &Inst)> {
        self.insts.iter().enumerate().map(|(i, inst)| {
            (
                ValueId::from_index(u32::try_from(i).unwrap_or(u32::MAX)),
                inst,
            )
        })
    }

    pub fn block(&self, id: BlockId) -> &Block {
        &self.blocks[id.index()]
    }

    /// All blocks in creation order.
    pub fn blocks(&self) -> impl Iterator<Item = (BlockId, &Block)> {
        self.blocks.iter().enumerate().map(|(i, block)| {
            (
                BlockId::from_index(u32::try_from(i).unwrap_or(u32::MAX)),
                block,
            )
        })
    }

    /// The block containing a given instruction, if any.
    pub fn block_of(&self, value: ValueId) -> Option<BlockId> {
        self.blocks()
            .find(|(_, b)| b.insts.contains(&value))
            .map(|(id, _)| id)
    }

    /// All call sites in emission order. Emission order matches the
    /// logical program order the generator produced, so ordering
    /// assertions in tests read straight off this sequence.
    pub fn calls(&self) -> Vec<CallSite<'_>> {
        self.insts()
            .filter_map(|(value, inst)| match inst {
                Inst::Call {
                    callee,
                    args,
                    unwind,
                } => Some(CallSite {
                    value,
                    callee,
                    args,
                    unwind: *unwind,
                }),
                _ => None,
            })
            .collect()
    }

    /// The callees of every call, in emission order.
    pub fn call_sequence(&self) -> Vec<Callee> {
        self.calls().iter().map(|c| c.callee.clone()).collect()
    }
}
