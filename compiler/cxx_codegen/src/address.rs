//! Pointer adjustment between derived and base sub-objects.
//!
//! Non-virtual adjustments are compile-time constants summed along the
//! inheritance path. Crossing a virtual edge needs the runtime offset of
//! the virtual base, read from the object's vtable, because a virtual
//! base's placement depends on the most-derived type. Null-checked
//! variants branch around the arithmetic so that null maps to null.

use cxx_ast::ClassId;
use cxx_ir::{FuncBuilder, IcmpPred, ValueId};
use tracing::trace;

use crate::paths::resolve_base_path;
use crate::{CodegenCx, CodegenError, Result};

/// Load the runtime byte offset of `vbase` relative to an object whose
/// dynamic type is (at least) `class`: load the vtable pointer, index to
/// the virtual-base-offset slot, load the stored offset.
pub fn virtual_base_offset(
    cx: &CodegenCx<'_>,
    b: &mut FuncBuilder,
    object: ValueId,
    class: ClassId,
    vbase: ClassId,
) -> Result<ValueId> {
    let vtable = b.build_load(object);
    let slot = cx.layouts.vbase_slot(class, vbase)?;
    let slot_ptr = b.build_slot_addr(vtable, slot);
    Ok(b.build_load(slot_ptr))
}

struct NullCheck {
    null_bb: cxx_ir::BlockId,
    not_null_bb: cxx_ir::BlockId,
    end_bb: cxx_ir::BlockId,
    null_value: ValueId,
}

fn begin_null_check(b: &mut FuncBuilder, value: ValueId) -> NullCheck {
    let null_bb = b.create_block("cast.null");
    let not_null_bb = b.create_block("cast.notnull");
    let end_bb = b.create_block("cast.end");

    let null_value = b.build_null();
    let is_null = b.build_icmp(IcmpPred::Eq, value, null_value);
    b.build_cond_br(is_null, null_bb, not_null_bb);
    b.switch_to_block(not_null_bb);

    NullCheck {
        null_bb,
        not_null_bb,
        end_bb,
        null_value,
    }
}

fn end_null_check(b: &mut FuncBuilder, check: NullCheck, adjusted: ValueId) -> ValueId {
    b.build_br(check.end_bb);
    b.switch_to_block(check.null_bb);
    b.build_br(check.end_bb);
    b.switch_to_block(check.end_bb);
    b.build_phi(vec![
        (adjusted, check.not_null_bb),
        (check.null_value, check.null_bb),
    ])
}

/// Convert a pointer-to-`class` into a pointer to its `base` sub-object.
///
/// The result is byte-identical to a direct computation when the input
/// is non-null; with `null_check`, a null input yields null.
pub fn address_of_base(
    cx: &CodegenCx<'_>,
    b: &mut FuncBuilder,
    value: ValueId,
    class: ClassId,
    base: ClassId,
    null_check: bool,
) -> Result<ValueId> {
    if class == base {
        return Ok(value);
    }

    let path = resolve_base_path(cx.arena, class, base)?;
    let nv_offset = path.non_virtual_offset(cx.layouts)?;
    let vbase = path.virtual_anchor().map(|(_, c)| c);
    trace!(?class, ?base, nv_offset, ?vbase, "derived-to-base adjustment");

    if vbase.is_none() && nv_offset == 0 {
        return Ok(value);
    }

    let check = null_check.then(|| begin_null_check(b, value));

    let adjusted = if let Some(vbase) = vbase {
        let runtime = virtual_base_offset(cx, b, value, class, vbase)?;
        let offset = if nv_offset == 0 {
            runtime
        } else {
            let constant = b.build_const_int(to_i64(nv_offset));
            b.build_add(runtime, constant)
        };
        b.build_ptr_add(value, offset)
    } else {
        b.build_ptr_add_const(value, to_i64(nv_offset))
    };

    Ok(match check {
        Some(check) => end_null_check(b, check, adjusted),
        None => adjusted,
    })
}

/// Convert a pointer to a `base` sub-object back into a pointer to the
/// enclosing `derived` object.
///
/// Only valid when the derived-to-base offset is statically known; a
/// virtual base on the path makes the complete object unrecoverable
/// without runtime metadata this component does not resolve.
pub fn address_of_derived(
    cx: &CodegenCx<'_>,
    b: &mut FuncBuilder,
    value: ValueId,
    derived: ClassId,
    base: ClassId,
    null_check: bool,
) -> Result<ValueId> {
    if derived == base {
        return Ok(value);
    }

    let path = resolve_base_path(cx.arena, derived, base)?;
    if path.has_virtual_edge() {
        return Err(CodegenError::VirtualBaseOnPath { derived, base });
    }

    let offset = path.non_virtual_offset(cx.layouts)?;
    if offset == 0 {
        return Ok(value);
    }

    let check = null_check.then(|| begin_null_check(b, value));
    let adjusted = b.build_ptr_add_const(value, -to_i64(offset));
    Ok(match check {
        Some(check) => end_null_check(b, check, adjusted),
        None => adjusted,
    })
}

/// Address of a base sub-object when the object is known to be complete
/// (constructor/destructor bodies): a single constant offset, using the
/// complete-object virtual-base offset when `is_virtual`.
pub fn address_of_base_in_complete_object(
    cx: &CodegenCx<'_>,
    b: &mut FuncBuilder,
    value: ValueId,
    class: ClassId,
    base: ClassId,
    is_virtual: bool,
) -> Result<ValueId> {
    let layout = cx.layout(class)?;
    let offset = if is_virtual {
        layout.vbase_offset(base)?
    } else {
        layout.base_offset(base)?
    };
    Ok(b.build_ptr_add_const(value, to_i64(offset)))
}

fn to_i64(offset: u64) -> i64 {
    i64::try_from(offset).unwrap_or(i64::MAX)
}
