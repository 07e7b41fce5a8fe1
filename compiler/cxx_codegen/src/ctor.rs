//! Constructor prologue emission.
//!
//! The prologue runs before the user-written body: virtual bases (in the
//! complete-object variant only), then non-virtual bases in declaration
//! order, then vtable pointers, then members in field declaration order.
//! Written initializer-list order is irrelevant; sub-objects are visited
//! in the order destruction will later reverse.
//!
//! With exceptions enabled, each constructed sub-object that has a
//! non-trivial destructor pushes a cleanup: a block that destroys it and
//! chains to the previously pending cleanup (or resumes unwinding).
//! Calls emitted afterwards carry the newest cleanup as their landing
//! edge, so a throw mid-prologue destroys exactly the sub-objects built
//! so far, newest first.

use cxx_ast::{
    BaseSpecifier, ClassId, Constructor, CtorKind, DtorKind, FieldDescriptor, FieldType,
    InitExpr, InitTarget,
};
use cxx_ir::{BlockId, Callee, FuncBuilder, Function, SymbolRef, ValueId};
use rustc_hash::FxHashMap;

use crate::address::address_of_base_in_complete_object;
use crate::arrays::{array_dtor_helper, checked_len, emit_array_construct};
use crate::calls::{emit_constructor_call, CtorArgs};
use crate::vtable::initialize_vtable_ptrs;
use crate::vtt::vtt_parameter;
use crate::{CodegenCx, FnCtx, Result};

/// A cleanup block under construction. Between `open` and `close` the
/// builder is positioned inside the cleanup; destructor calls emitted
/// there must not themselves unwind.
struct CleanupScope {
    saved: BlockId,
    prev_unwind: Option<BlockId>,
    block: BlockId,
}

fn open_cleanup(b: &mut FuncBuilder) -> CleanupScope {
    let scope = CleanupScope {
        saved: b.current_block(),
        prev_unwind: b.unwind_dest(),
        block: b.create_block("eh.cleanup"),
    };
    b.switch_to_block(scope.block);
    scope
}

fn close_cleanup(b: &mut FuncBuilder, scope: CleanupScope) {
    // Chain to the next-older cleanup, or hand the exception back.
    match scope.prev_unwind {
        Some(next) => b.build_br(next),
        None => b.build_resume(),
    }
    b.switch_to_block(scope.saved);
    b.set_unwind_dest(Some(scope.block));
}

/// Push a cleanup that destroys the `class` sub-object at byte `offset`.
fn push_dtor_cleanup(
    cx: &CodegenCx<'_>,
    b: &mut FuncBuilder,
    fctx: &FnCtx,
    class: ClassId,
    kind: DtorKind,
    this: ValueId,
    offset: u64,
) -> Result<()> {
    let scope = open_cleanup(b);
    let addr = b.build_ptr_add_const(this, i64::try_from(offset).unwrap_or(i64::MAX));
    let vtt = vtt_parameter(cx, b, fctx, class, kind == DtorKind::Base)?;
    let mut args = vec![addr];
    args.extend(vtt);
    b.build_call_nounwind(Callee::Dtor { class, kind }, args);
    close_cleanup(b, scope);
    Ok(())
}

/// Push a cleanup that destroys the array sub-object at byte `offset`
/// through its synthesized helper.
fn push_array_cleanup(
    cx: &mut CodegenCx<'_>,
    b: &mut FuncBuilder,
    this: ValueId,
    offset: u64,
    elem: ClassId,
    count: u64,
) -> Result<()> {
    let helper = array_dtor_helper(cx, elem, count)?;
    let scope = open_cleanup(b);
    let addr = b.build_ptr_add_const(this, i64::try_from(offset).unwrap_or(i64::MAX));
    b.build_call_nounwind(Callee::Helper(helper), vec![addr]);
    close_cleanup(b, scope);
    Ok(())
}

fn ctor_args_for(expr: Option<&InitExpr>) -> CtorArgs<'_> {
    match expr {
        Some(InitExpr::Construct { args }) => CtorArgs::Values(args),
        _ => CtorArgs::None,
    }
}

/// Emit the full constructor prologue for one variant of `ctor`.
///
/// `this` is the object under construction; `fctx` carries the VTT
/// parameter when this is a base variant of a class with virtual bases.
#[tracing::instrument(level = "debug", skip_all, fields(class = ?ctor.class, kind = ?kind))]
pub fn emit_ctor_prologue(
    cx: &mut CodegenCx<'_>,
    b: &mut FuncBuilder,
    fctx: &FnCtx,
    ctor: &Constructor,
    kind: CtorKind,
    this: ValueId,
) -> Result<()> {
    let class = ctor.class;

    let mut base_inits: FxHashMap<ClassId, InitExpr> = FxHashMap::default();
    let mut member_inits: FxHashMap<usize, InitExpr> = FxHashMap::default();
    for init in &ctor.inits {
        let Some(expr) = &init.expr else { continue };
        match init.target {
            InitTarget::Base(base) => {
                base_inits.insert(base, expr.clone());
            }
            InitTarget::Member(index) => {
                member_inits.insert(index, expr.clone());
            }
        }
    }

    let vbases: Vec<ClassId> = cx.class(class).vbases.to_vec();
    let bases: Vec<BaseSpecifier> = cx.class(class).bases.to_vec();
    let fields: Vec<FieldDescriptor> = cx.class(class).fields.clone();
    let exceptions = cx.options.exceptions;

    // Virtual bases belong to the complete object; the base variant
    // never touches them.
    if kind == CtorKind::Complete {
        for vbase in vbases {
            let offset = cx.layout(class)?.vbase_offset(vbase)?;
            let addr = address_of_base_in_complete_object(cx, b, this, class, vbase, true)?;
            emit_constructor_call(
                cx,
                b,
                fctx,
                vbase,
                CtorKind::Base,
                addr,
                ctor_args_for(base_inits.get(&vbase)),
            )?;
            if exceptions && !cx.class(vbase).has_trivial_dtor() {
                push_dtor_cleanup(cx, b, fctx, vbase, DtorKind::Base, this, offset)?;
            }
        }
    }

    for spec in bases {
        if spec.is_virtual {
            continue;
        }
        let base = spec.class;
        let offset = cx.layout(class)?.base_offset(base)?;
        let addr = address_of_base_in_complete_object(cx, b, this, class, base, false)?;
        emit_constructor_call(
            cx,
            b,
            fctx,
            base,
            CtorKind::Base,
            addr,
            ctor_args_for(base_inits.get(&base)),
        )?;
        if exceptions && !cx.class(base).has_trivial_dtor() {
            push_dtor_cleanup(cx, b, fctx, base, DtorKind::Base, this, offset)?;
        }
    }

    initialize_vtable_ptrs(cx, b, fctx, this)?;

    for (index, field) in fields.iter().enumerate() {
        let offset = cx.layout(class)?.field_offset(index);
        let init = member_inits.get(&index);
        emit_member_init(cx, b, fctx, this, offset, field.ty, init, exceptions)?;
    }

    Ok(())
}

fn emit_member_init(
    cx: &mut CodegenCx<'_>,
    b: &mut FuncBuilder,
    fctx: &FnCtx,
    this: ValueId,
    offset: u64,
    ty: FieldType,
    init: Option<&InitExpr>,
    exceptions: bool,
) -> Result<()> {
    let addr = b.build_ptr_add_const(this, i64::try_from(offset).unwrap_or(i64::MAX));
    match ty {
        FieldType::Reference => {
            // Binding stores the referent's address; nothing is copied.
            if let Some(InitExpr::Reference(name)) = init {
                let referent = b.build_symbol(SymbolRef::Extern(*name));
                b.build_store(referent, addr);
            }
        }
        FieldType::Scalar { .. } => match init {
            Some(InitExpr::Scalar(v)) => {
                let value = b.build_const_int(*v);
                b.build_store(value, addr);
            }
            Some(InitExpr::Zero) => {
                let zero = b.build_const_int(0);
                b.build_store(zero, addr);
            }
            _ => {}
        },
        FieldType::Complex { size } => match init {
            Some(InitExpr::Complex(re, im)) => {
                let real = b.build_const_int(*re);
                b.build_store(real, addr);
                let imag = b.build_const_int(*im);
                let imag_addr =
                    b.build_ptr_add_const(addr, i64::try_from(size / 2).unwrap_or(i64::MAX));
                b.build_store(imag, imag_addr);
            }
            Some(InitExpr::Zero) => {
                b.build_memset_zero(addr, size);
            }
            _ => {}
        },
        FieldType::Class(member) => {
            match init {
                Some(InitExpr::Zero) => {
                    b.build_memset_zero(addr, cx.layout(member)?.size);
                }
                other => {
                    emit_constructor_call(
                        cx,
                        b,
                        fctx,
                        member,
                        CtorKind::Complete,
                        addr,
                        ctor_args_for(other),
                    )?;
                }
            }
            if exceptions && !cx.class(member).has_trivial_dtor() {
                push_dtor_cleanup(cx, b, fctx, member, DtorKind::Complete, this, offset)?;
            }
        }
        FieldType::Array { elem, len } => {
            let count = checked_len(elem, len)?;
            match init {
                Some(InitExpr::Construct { args }) => {
                    let args = args.clone();
                    emit_array_construct(cx, b, fctx, addr, elem, count, &args)?;
                }
                _ => {
                    // Members of array type with no written initializer
                    // are zero-filled.
                    let size = cx.layout(elem)?.size * count;
                    if size > 0 {
                        b.build_memset_zero(addr, size);
                    }
                }
            }
            if exceptions && !cx.class(elem).has_trivial_dtor() {
                push_array_cleanup(cx, b, this, offset, elem, count)?;
            }
        }
    }
    Ok(())
}

/// Build a complete constructor function for one variant: parameters,
/// prologue, and return. Base variants of classes with virtual bases
/// take the hidden VTT parameter after `this`.
pub fn emit_constructor(
    cx: &mut CodegenCx<'_>,
    ctor: &Constructor,
    kind: CtorKind,
) -> Result<Function> {
    let has_vtt = kind == CtorKind::Base && cx.needs_vtt(ctor.class);
    let num_params = if has_vtt { 2 } else { 1 };
    let mut b = FuncBuilder::new(cx.ctor_symbol(ctor.class, kind), num_params);
    let this = b.param(0);
    let fctx = if has_vtt {
        FnCtx::with_vtt(ctor.class, b.param(1))
    } else {
        FnCtx::new(ctor.class)
    };
    emit_ctor_prologue(cx, &mut b, &fctx, ctor, kind, this)?;
    b.build_ret();
    Ok(b.finish())
}
