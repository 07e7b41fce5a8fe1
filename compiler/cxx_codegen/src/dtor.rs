//! Destructor epilogue emission.
//!
//! Destruction exactly reverses construction. The deleting variant
//! destroys the complete object and frees it; the complete variant
//! delegates to the base variant and then destroys virtual bases in
//! reverse declaration order; the base variant destroys members in
//! reverse field order, then non-virtual bases in reverse declaration
//! order. Trivial destructors vanish at every level.

use cxx_ast::{BaseSpecifier, ClassId, DtorKind, FieldDescriptor, FieldType};
use cxx_ir::{Callee, FuncBuilder, Function, ValueId};

use crate::address::address_of_base_in_complete_object;
use crate::arrays::{checked_len, emit_array_destroy};
use crate::calls::emit_destructor_call;
use crate::{CodegenCx, FnCtx, Result};

/// Emit the destruction work for one variant of `class`'s destructor,
/// after the user-written body.
#[tracing::instrument(level = "debug", skip_all, fields(class = ?class, kind = ?kind))]
pub fn emit_dtor_epilogue(
    cx: &CodegenCx<'_>,
    b: &mut FuncBuilder,
    fctx: &FnCtx,
    class: ClassId,
    kind: DtorKind,
    this: ValueId,
) -> Result<()> {
    match kind {
        DtorKind::Deleting => {
            emit_destructor_call(cx, b, fctx, class, DtorKind::Complete, this)?;
            b.build_call(Callee::Delete(class), vec![this]);
        }
        DtorKind::Complete => {
            emit_destructor_call(cx, b, fctx, class, DtorKind::Base, this)?;
            let vbases: Vec<ClassId> = cx.class(class).vbases.to_vec();
            for vbase in vbases.into_iter().rev() {
                if cx.class(vbase).has_trivial_dtor() {
                    continue;
                }
                let addr = address_of_base_in_complete_object(cx, b, this, class, vbase, true)?;
                emit_destructor_call(cx, b, fctx, vbase, DtorKind::Base, addr)?;
            }
        }
        DtorKind::Base => {
            let fields: Vec<FieldDescriptor> = cx.class(class).fields.clone();
            for (index, field) in fields.iter().enumerate().rev() {
                emit_field_destroy(cx, b, fctx, class, this, index, field.ty)?;
            }
            let bases: Vec<BaseSpecifier> = cx.class(class).bases.to_vec();
            for spec in bases.into_iter().rev() {
                if spec.is_virtual || cx.class(spec.class).has_trivial_dtor() {
                    continue;
                }
                let addr =
                    address_of_base_in_complete_object(cx, b, this, class, spec.class, false)?;
                emit_destructor_call(cx, b, fctx, spec.class, DtorKind::Base, addr)?;
            }
        }
    }
    Ok(())
}

fn emit_field_destroy(
    cx: &CodegenCx<'_>,
    b: &mut FuncBuilder,
    fctx: &FnCtx,
    class: ClassId,
    this: ValueId,
    index: usize,
    ty: FieldType,
) -> Result<()> {
    match ty {
        FieldType::Class(member) => {
            if cx.class(member).has_trivial_dtor() {
                return Ok(());
            }
            let offset = cx.layout(class)?.field_offset(index);
            let addr = b.build_ptr_add_const(this, i64::try_from(offset).unwrap_or(i64::MAX));
            emit_destructor_call(cx, b, fctx, member, DtorKind::Complete, addr)
        }
        FieldType::Array { elem, len } => {
            if cx.class(elem).has_trivial_dtor() {
                return Ok(());
            }
            let count = checked_len(elem, len)?;
            let offset = cx.layout(class)?.field_offset(index);
            let addr = b.build_ptr_add_const(this, i64::try_from(offset).unwrap_or(i64::MAX));
            emit_array_destroy(cx, b, fctx, addr, elem, count)
        }
        FieldType::Scalar { .. } | FieldType::Complex { .. } | FieldType::Reference => Ok(()),
    }
}

/// Build a complete destructor function for one variant. Base variants
/// of classes with virtual bases take the hidden VTT parameter.
pub fn emit_destructor(cx: &CodegenCx<'_>, class: ClassId, kind: DtorKind) -> Result<Function> {
    let has_vtt = kind == DtorKind::Base && cx.needs_vtt(class);
    let num_params = if has_vtt { 2 } else { 1 };
    let mut b = FuncBuilder::new(cx.dtor_symbol(class, kind), num_params);
    let this = b.param(0);
    let fctx = if has_vtt {
        FnCtx::with_vtt(class, b.param(1))
    } else {
        FnCtx::new(class)
    };
    emit_dtor_epilogue(cx, &mut b, &fctx, class, kind, this)?;
    b.build_ret();
    Ok(b.finish())
}
