//! Synthesis of implicit copy operations.
//!
//! When a class does not declare a copy constructor or copy-assignment
//! operator, one is generated memberwise: bases first, then fields in
//! declaration order. The complete-object copy constructor copies each
//! virtual base exactly once, ahead of the non-virtual bases; the base
//! variant leaves virtual bases to the most-derived object. Implicit
//! copy assignment touches direct non-virtual bases only.

use cxx_ast::{ClassId, CtorKind, FieldType};
use cxx_ir::{FuncBuilder, Function, ValueId};
use tracing::debug;

use crate::address::address_of_base_in_complete_object;
use crate::arrays::{checked_len, emit_array_assign, emit_array_copy};
use crate::calls::{emit_constructor_call, CtorArgs};
use crate::copy::{emit_copy_assignment, emit_memberwise_copy};
use crate::vtable::initialize_vtable_ptrs;
use crate::{CodegenCx, FnCtx, Result};

fn field_addr(b: &mut FuncBuilder, object: ValueId, offset: u64) -> ValueId {
    b.build_ptr_add_const(object, i64::try_from(offset).unwrap_or(i64::MAX))
}

/// Copy one scalar-sized slot from `src + offset` to `dest + offset`.
fn copy_slot(b: &mut FuncBuilder, dest: ValueId, src: ValueId, offset: u64) {
    let from = field_addr(b, src, offset);
    let value = b.build_load(from);
    let to = field_addr(b, dest, offset);
    b.build_store(value, to);
}

/// Generate the implicit copy constructor for `class`.
///
/// Parameters: `this`, the hidden VTT pointer (base variant of a class
/// with virtual bases only), then the source object.
pub fn synthesize_copy_constructor(
    cx: &CodegenCx<'_>,
    class: ClassId,
    kind: CtorKind,
) -> Result<Function> {
    debug!(?class, ?kind, "synthesizing copy constructor");
    let has_vtt = kind == CtorKind::Base && cx.needs_vtt(class);
    let num_params = if has_vtt { 3 } else { 2 };
    let mut b = FuncBuilder::new(cx.ctor_symbol(class, kind), num_params);
    let this = b.param(0);
    let src = b.param(num_params - 1);
    let fctx = if has_vtt {
        FnCtx::with_vtt(class, b.param(1))
    } else {
        FnCtx::new(class)
    };

    if kind == CtorKind::Complete {
        let vbases: Vec<ClassId> = cx.class(class).vbases.to_vec();
        for vbase in vbases {
            let d = address_of_base_in_complete_object(cx, &mut b, this, class, vbase, true)?;
            let s = address_of_base_in_complete_object(cx, &mut b, src, class, vbase, true)?;
            emit_constructor_call(
                cx,
                &mut b,
                &fctx,
                vbase,
                CtorKind::Base,
                d,
                CtorArgs::Copy(s),
            )?;
        }
    }

    let bases: Vec<ClassId> = cx.class(class).non_virtual_bases().collect();
    for base in bases {
        emit_memberwise_copy(cx, &mut b, &fctx, this, src, Some(class), base)?;
    }

    let fields = cx.class(class).fields.clone();
    for (index, field) in fields.iter().enumerate() {
        let offset = cx.layout(class)?.field_offset(index);
        match field.ty {
            FieldType::Scalar { .. } | FieldType::Reference => {
                copy_slot(&mut b, this, src, offset);
            }
            FieldType::Complex { size } => {
                copy_slot(&mut b, this, src, offset);
                copy_slot(&mut b, this, src, offset + size / 2);
            }
            FieldType::Class(member) => {
                let d = field_addr(&mut b, this, offset);
                let s = field_addr(&mut b, src, offset);
                emit_memberwise_copy(cx, &mut b, &fctx, d, s, None, member)?;
            }
            FieldType::Array { elem, len } => {
                let count = checked_len(elem, len)?;
                let d = field_addr(&mut b, this, offset);
                let s = field_addr(&mut b, src, offset);
                emit_array_copy(cx, &mut b, &fctx, d, s, elem, count)?;
            }
        }
    }

    initialize_vtable_ptrs(cx, &mut b, &fctx, this)?;
    b.build_ret();
    Ok(b.finish())
}

/// Generate the implicit copy-assignment operator for `class`, returning
/// `*this`.
pub fn synthesize_copy_assignment(cx: &CodegenCx<'_>, class: ClassId) -> Result<Function> {
    debug!(?class, "synthesizing copy assignment");
    let name = format!("{}::operator=", cx.class_name(class));
    let mut b = FuncBuilder::new(name, 2);
    let this = b.param(0);
    let src = b.param(1);

    let bases: Vec<ClassId> = cx.class(class).non_virtual_bases().collect();
    for base in bases {
        emit_copy_assignment(cx, &mut b, this, src, Some(class), base)?;
    }

    let fields = cx.class(class).fields.clone();
    for (index, field) in fields.iter().enumerate() {
        let offset = cx.layout(class)?.field_offset(index);
        match field.ty {
            FieldType::Scalar { .. } | FieldType::Reference => {
                copy_slot(&mut b, this, src, offset);
            }
            FieldType::Complex { size } => {
                copy_slot(&mut b, this, src, offset);
                copy_slot(&mut b, this, src, offset + size / 2);
            }
            FieldType::Class(member) => {
                let d = field_addr(&mut b, this, offset);
                let s = field_addr(&mut b, src, offset);
                emit_copy_assignment(cx, &mut b, d, s, None, member)?;
            }
            FieldType::Array { elem, len } => {
                let count = checked_len(elem, len)?;
                let d = field_addr(&mut b, this, offset);
                let s = field_addr(&mut b, src, offset);
                emit_array_assign(cx, &mut b, d, s, elem, count)?;
            }
        }
    }

    b.build_ret_value(this);
    Ok(b.finish())
}
