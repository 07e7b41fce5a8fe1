//! Positioned function builder.
//!
//! Scoped to a current basic block; every `build_*` method appends at the
//! current position. Terminators are set once per block. The builder also
//! tracks the current unwind destination so that calls emitted while
//! cleanups are pending automatically carry their landing edge.

use crate::{
    Block, BlockId, Callee, Function, IcmpPred, Inst, SymbolRef, Term, ValueId,
};

/// Builds one [`Function`], one instruction at a time.
pub struct FuncBuilder {
    func: Function,
    current: BlockId,
    unwind: Option<BlockId>,
}

impl FuncBuilder {
    /// Create a builder with an entry block and `num_params` parameter
    /// values (ids `0..num_params`).
    pub fn new(name: impl Into<String>, num_params: u32) -> Self {
        let mut func = Function {
            name: name.into(),
            num_params,
            insts: Vec::new(),
            blocks: vec![Block {
                label: "entry".to_owned(),
                insts: Vec::new(),
                term: None,
            }],
        };
        for i in 0..num_params {
            func.insts.push(Inst::Param(i));
            func.blocks[0].insts.push(ValueId::from_index(i));
        }
        Self {
            func,
            current: BlockId::from_index(0),
            unwind: None,
        }
    }

    /// The n-th parameter value.
    pub fn param(&self, index: u32) -> ValueId {
        debug_assert!(index < self.func.num_params, "parameter out of range");
        ValueId::from_index(index)
    }

    /// Append a new (empty, unpositioned) block.
    pub fn create_block(&mut self, label: &str) -> BlockId {
        let id = BlockId::from_index(u32::try_from(self.func.blocks.len()).unwrap_or(u32::MAX));
        self.func.blocks.push(Block {
            label: label.to_owned(),
            insts: Vec::new(),
            term: None,
        });
        id
    }

    /// Move the insertion position to `block`.
    pub fn switch_to_block(&mut self, block: BlockId) {
        self.current = block;
    }

    pub fn current_block(&self) -> BlockId {
        self.current
    }

    /// Set the landing block for calls that may throw. `None` means
    /// exceptions propagate past this function without local cleanup.
    pub fn set_unwind_dest(&mut self, dest: Option<BlockId>) {
        self.unwind = dest;
    }

    pub fn unwind_dest(&self) -> Option<BlockId> {
        self.unwind
    }

    fn push(&mut self, inst: Inst) -> ValueId {
        let id = ValueId::from_index(u32::try_from(self.func.insts.len()).unwrap_or(u32::MAX));
        self.func.insts.push(inst);
        self.func.blocks[self.current.index()].insts.push(id);
        id
    }

    pub fn build_const_int(&mut self, value: i64) -> ValueId {
        self.push(Inst::ConstInt(value))
    }

    pub fn build_null(&mut self) -> ValueId {
        self.push(Inst::Null)
    }

    pub fn build_alloca(&mut self, label: &'static str) -> ValueId {
        self.push(Inst::Alloca { label })
    }

    pub fn build_symbol(&mut self, symbol: SymbolRef) -> ValueId {
        self.push(Inst::Symbol(symbol))
    }

    pub fn build_load(&mut self, ptr: ValueId) -> ValueId {
        self.push(Inst::Load { ptr })
    }

    pub fn build_store(&mut self, value: ValueId, ptr: ValueId) -> ValueId {
        self.push(Inst::Store { value, ptr })
    }

    pub fn build_ptr_add_const(&mut self, ptr: ValueId, offset: i64) -> ValueId {
        if offset == 0 {
            return ptr;
        }
        self.push(Inst::PtrAddConst { ptr, offset })
    }

    pub fn build_ptr_add(&mut self, ptr: ValueId, offset: ValueId) -> ValueId {
        self.push(Inst::PtrAdd { ptr, offset })
    }

    pub fn build_slot_addr(&mut self, table: ValueId, slot: i64) -> ValueId {
        self.push(Inst::SlotAddr { table, slot })
    }

    pub fn build_elem_addr(&mut self, base: ValueId, index: ValueId) -> ValueId {
        self.push(Inst::ElemAddr { base, index })
    }

    pub fn build_add(&mut self, lhs: ValueId, rhs: ValueId) -> ValueId {
        self.push(Inst::Add { lhs, rhs })
    }

    pub fn build_sub(&mut self, lhs: ValueId, rhs: ValueId) -> ValueId {
        self.push(Inst::Sub { lhs, rhs })
    }

    pub fn build_icmp(&mut self, pred: IcmpPred, lhs: ValueId, rhs: ValueId) -> ValueId {
        self.push(Inst::ICmp { pred, lhs, rhs })
    }

    pub fn build_phi(&mut self, incoming: Vec<(ValueId, BlockId)>) -> ValueId {
        self.push(Inst::Phi { incoming })
    }

    /// Emit a call carrying the current unwind destination.
    pub fn build_call(&mut self, callee: Callee, args: Vec<ValueId>) -> ValueId {
        let unwind = self.unwind;
        self.push(Inst::Call {
            callee,
            args,
            unwind,
        })
    }

    /// Emit a call with no unwind edge regardless of pending cleanups.
    /// Used inside cleanup blocks: a destructor throwing during unwind
    /// terminates, it does not chain.
    pub fn build_call_nounwind(&mut self, callee: Callee, args: Vec<ValueId>) -> ValueId {
        self.push(Inst::Call {
            callee,
            args,
            unwind: None,
        })
    }

    pub fn build_memcpy(&mut self, dest: ValueId, src: ValueId, size: u64) -> ValueId {
        self.push(Inst::MemCpy { dest, src, size })
    }

    pub fn build_memset_zero(&mut self, dest: ValueId, size: u64) -> ValueId {
        self.push(Inst::MemSetZero { dest, size })
    }

    fn terminate(&mut self, term: Term) {
        let block = &mut self.func.blocks[self.current.index()];
        debug_assert!(
            block.term.is_none(),
            "block {} already terminated",
            block.label
        );
        block.term = Some(term);
    }

    pub fn build_br(&mut self, dest: BlockId) {
        self.terminate(Term::Br(dest));
    }

    pub fn build_cond_br(&mut self, cond: ValueId, then_bb: BlockId, else_bb: BlockId) {
        self.terminate(Term::CondBr {
            cond,
            then_bb,
            else_bb,
        });
    }

    pub fn build_ret(&mut self) {
        self.terminate(Term::Ret);
    }

    pub fn build_ret_value(&mut self, value: ValueId) {
        self.terminate(Term::RetValue(value));
    }

    pub fn build_resume(&mut self) {
        self.terminate(Term::Resume);
    }

    /// Finish building and take the function.
    pub fn finish(self) -> Function {
        debug_assert!(
            self.func.blocks.iter().all(|b| b.term.is_some()),
            "unterminated block in {}",
            self.func.name
        );
        self.func
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_params_land_in_entry() {
        let mut b = FuncBuilder::new("f", 2);
        b.build_ret();
        let f = b.finish();
        assert_eq!(f.num_params, 2);
        assert_eq!(f.block(BlockId::from_index(0)).insts.len(), 2);
        assert_eq!(f.inst(ValueId::from_index(1)), &Inst::Param(1));
    }

    #[test]
    fn test_positioning_routes_insts() {
        let mut b = FuncBuilder::new("f", 0);
        let other = b.create_block("other");
        let c0 = b.build_const_int(1);
        b.build_br(other);
        b.switch_to_block(other);
        let c1 = b.build_const_int(2);
        b.build_ret();
        let f = b.finish();

        assert_eq!(f.block_of(c0), Some(BlockId::from_index(0)));
        assert_eq!(f.block_of(c1), Some(other));
    }

    #[test]
    fn test_zero_offset_ptr_add_is_identity() {
        let mut b = FuncBuilder::new("f", 1);
        let p = b.param(0);
        let same = b.build_ptr_add_const(p, 0);
        let moved = b.build_ptr_add_const(p, 8);
        b.build_ret();
        assert_eq!(same, p);
        assert!(moved != p);
    }

    #[test]
    fn test_call_picks_up_unwind_dest() {
        let mut b = FuncBuilder::new("f", 1);
        let cleanup = b.create_block("cleanup");
        b.set_unwind_dest(Some(cleanup));
        let p = b.param(0);
        let call = b.build_call(
            Callee::Delete(cxx_ast::ClassId::from_index(0)),
            vec![p],
        );
        b.build_ret();
        b.switch_to_block(cleanup);
        b.build_resume();
        let f = b.finish();

        match f.inst(call) {
            Inst::Call { unwind, .. } => assert_eq!(*unwind, Some(cleanup)),
            other => panic!("expected call, got {other:?}"),
        }
    }
}
