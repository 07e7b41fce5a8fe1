//! Instruction and terminator definitions.

use cxx_ast::{ClassId, CtorKind, DtorKind, Name};

use crate::{BlockId, HelperId, ValueId};

/// Integer comparison predicate.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum IcmpPred {
    Eq,
    Ne,
    /// Unsigned less-than.
    Ult,
}

/// A module-level symbol addressable from generated code.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SymbolRef {
    /// A class's vtable.
    Vtable(ClassId),
    /// A class's VTT (virtual table table).
    Vtt(ClassId),
    /// An external named object (e.g. the target of a reference binding).
    Extern(Name),
}

/// The structured target of a call emitted by the class code generator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Callee {
    Ctor { class: ClassId, kind: CtorKind },
    Dtor { class: ClassId, kind: DtorKind },
    CopyAssign(ClassId),
    /// The class's `operator delete`.
    Delete(ClassId),
    /// A synthesized helper owned by the codegen context.
    Helper(HelperId),
}

/// One emitted instruction. The instruction's own id doubles as its
/// result value where one exists.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Inst {
    /// The n-th function parameter.
    Param(u32),
    ConstInt(i64),
    /// The null pointer value.
    Null,
    /// A stack temporary (loop indices and the like).
    Alloca { label: &'static str },
    /// Address of a module-level symbol.
    Symbol(SymbolRef),
    Load { ptr: ValueId },
    Store { value: ValueId, ptr: ValueId },
    /// Pointer plus compile-time byte offset.
    PtrAddConst { ptr: ValueId, offset: i64 },
    /// Pointer plus runtime byte offset.
    PtrAdd { ptr: ValueId, offset: ValueId },
    /// Address of a slot within a vtable-like table.
    SlotAddr { table: ValueId, slot: i64 },
    /// Address of an array element by runtime index.
    ElemAddr { base: ValueId, index: ValueId },
    Add { lhs: ValueId, rhs: ValueId },
    Sub { lhs: ValueId, rhs: ValueId },
    ICmp {
        pred: IcmpPred,
        lhs: ValueId,
        rhs: ValueId,
    },
    Phi { incoming: Vec<(ValueId, BlockId)> },
    /// A call; `unwind` names the landing block that runs pending
    /// cleanups if the callee throws.
    Call {
        callee: Callee,
        args: Vec<ValueId>,
        unwind: Option<BlockId>,
    },
    /// Flat byte-range copy.
    MemCpy {
        dest: ValueId,
        src: ValueId,
        size: u64,
    },
    MemSetZero { dest: ValueId, size: u64 },
}

/// Block terminator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Term {
    Br(BlockId),
    CondBr {
        cond: ValueId,
        then_bb: BlockId,
        else_bb: BlockId,
    },
    Ret,
    RetValue(ValueId),
    /// Continue unwinding an in-flight exception.
    Resume,
}
