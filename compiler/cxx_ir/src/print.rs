//! Textual rendering of functions, for debugging and test output.

use std::fmt;

use crate::{Callee, Function, IcmpPred, Inst, SymbolRef, Term};

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "fn {}({} params) {{", self.name, self.num_params)?;
        for (id, block) in self.blocks() {
            writeln!(f, "{:?}: ; {}", id, block.label)?;
            for &value in &block.insts {
                write!(f, "  {value:?} = ")?;
                fmt_inst(f, self.inst(value))?;
                writeln!(f)?;
            }
            match &block.term {
                Some(Term::Br(dest)) => writeln!(f, "  br {dest:?}")?,
                Some(Term::CondBr {
                    cond,
                    then_bb,
                    else_bb,
                }) => writeln!(f, "  condbr {cond:?}, {then_bb:?}, {else_bb:?}")?,
                Some(Term::Ret) => writeln!(f, "  ret")?,
                Some(Term::RetValue(v)) => writeln!(f, "  ret {v:?}")?,
                Some(Term::Resume) => writeln!(f, "  resume")?,
                None => writeln!(f, "  <unterminated>")?,
            }
        }
        write!(f, "}}")
    }
}

fn fmt_inst(f: &mut fmt::Formatter<'_>, inst: &Inst) -> fmt::Result {
    match inst {
        Inst::Param(i) => write!(f, "param {i}"),
        Inst::ConstInt(v) => write!(f, "const {v}"),
        Inst::Null => write!(f, "null"),
        Inst::Alloca { label } => write!(f, "alloca {label}"),
        Inst::Symbol(s) => write!(f, "symbol {}", symbol_name(*s)),
        Inst::Load { ptr } => write!(f, "load {ptr:?}"),
        Inst::Store { value, ptr } => write!(f, "store {value:?}, {ptr:?}"),
        Inst::PtrAddConst { ptr, offset } => write!(f, "ptradd {ptr:?}, {offset}"),
        Inst::PtrAdd { ptr, offset } => write!(f, "ptradd {ptr:?}, {offset:?}"),
        Inst::SlotAddr { table, slot } => write!(f, "slotaddr {table:?}, {slot}"),
        Inst::ElemAddr { base, index } => write!(f, "elemaddr {base:?}, {index:?}"),
        Inst::Add { lhs, rhs } => write!(f, "add {lhs:?}, {rhs:?}"),
        Inst::Sub { lhs, rhs } => write!(f, "sub {lhs:?}, {rhs:?}"),
        Inst::ICmp { pred, lhs, rhs } => {
            let p = match pred {
                IcmpPred::Eq => "eq",
                IcmpPred::Ne => "ne",
                IcmpPred::Ult => "ult",
            };
            write!(f, "icmp {p} {lhs:?}, {rhs:?}")
        }
        Inst::Phi { incoming } => {
            write!(f, "phi ")?;
            for (i, (value, block)) in incoming.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "[{value:?}, {block:?}]")?;
            }
            Ok(())
        }
        Inst::Call {
            callee,
            args,
            unwind,
        } => {
            write!(f, "call {}(", callee_name(callee))?;
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{arg:?}")?;
            }
            write!(f, ")")?;
            if let Some(dest) = unwind {
                write!(f, " unwind {dest:?}")?;
            }
            Ok(())
        }
        Inst::MemCpy { dest, src, size } => {
            write!(f, "memcpy {dest:?}, {src:?}, {size}")
        }
        Inst::MemSetZero { dest, size } => write!(f, "memset0 {dest:?}, {size}"),
    }
}

fn symbol_name(symbol: SymbolRef) -> String {
    match symbol {
        SymbolRef::Vtable(c) => format!("vtable.{}", c.index()),
        SymbolRef::Vtt(c) => format!("vtt.{}", c.index()),
        SymbolRef::Extern(n) => format!("extern.{}", n.index()),
    }
}

fn callee_name(callee: &Callee) -> String {
    match callee {
        Callee::Ctor { class, kind } => format!("ctor.{}.{kind:?}", class.index()),
        Callee::Dtor { class, kind } => format!("dtor.{}.{kind:?}", class.index()),
        Callee::CopyAssign(c) => format!("assign.{}", c.index()),
        Callee::Delete(c) => format!("delete.{}", c.index()),
        Callee::Helper(h) => format!("{h:?}"),
    }
}
