//! Vtable-pointer installation.
//!
//! After base sub-objects are constructed and before members are
//! initialized, every dynamic sub-object's hidden vtable pointer is set
//! to the matching address point inside the class's vtable. Virtual
//! bases get theirs exactly once, at their complete-object offset; the
//! non-virtual hierarchy is walked with a purely additive offset.

use cxx_ast::ClassId;
use cxx_ir::{FuncBuilder, SymbolRef, ValueId};
use tracing::trace;

use crate::{CodegenCx, FnCtx, Result};

/// Install vtable pointers for `this` and every dynamic sub-object.
///
/// No-op for non-dynamic classes.
pub fn initialize_vtable_ptrs(
    cx: &CodegenCx<'_>,
    b: &mut FuncBuilder,
    fctx: &FnCtx,
    this: ValueId,
) -> Result<()> {
    let class = fctx.class;
    if !cx.class(class).is_dynamic() {
        return Ok(());
    }

    let vtable = b.build_symbol(SymbolRef::Vtable(class));

    let vbases: Vec<ClassId> = cx.class(class).vbases.to_vec();
    for vbase in vbases {
        let offset = cx.layout(class)?.vbase_offset(vbase)?;
        install_recursive(cx, b, class, vbase, offset, this, vtable)?;
    }
    install_recursive(cx, b, class, class, 0, this, vtable)
}

/// Walk `current`'s non-virtual hierarchy, storing an address point at
/// each dynamic class. Virtual edges are never followed here; every
/// virtual base was already visited at its own complete-object offset.
fn install_recursive(
    cx: &CodegenCx<'_>,
    b: &mut FuncBuilder,
    complete: ClassId,
    current: ClassId,
    offset: u64,
    this: ValueId,
    vtable: ValueId,
) -> Result<()> {
    if !cx.class(current).is_dynamic() {
        return Ok(());
    }

    let bases: Vec<ClassId> = cx.class(current).non_virtual_bases().collect();
    for base in bases {
        let base_offset = cx.layout(current)?.base_offset(base)?;
        install_recursive(cx, b, complete, base, offset + base_offset, this, vtable)?;
    }

    let point = cx.layouts.address_point(complete, current, offset)?;
    trace!(?current, offset, point, "installing vtable pointer");
    let slot = b.build_slot_addr(vtable, i64::try_from(point).unwrap_or(i64::MAX));
    let field = b.build_ptr_add_const(this, i64::try_from(offset).unwrap_or(i64::MAX));
    b.build_store(slot, field);
    Ok(())
}
