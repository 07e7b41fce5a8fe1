//! VTT (virtual table table) parameter plumbing.
//!
//! Base-variant constructors and destructors of classes with virtual
//! bases take a hidden VTT pointer so they can find construction vtables
//! and virtual-base offsets for the complete object being built. This
//! module computes the argument to pass at each call site.

use cxx_ast::ClassId;
use cxx_ir::{FuncBuilder, SymbolRef, ValueId};

use crate::{CodegenCx, FnCtx, Result};

/// Compute the VTT argument for invoking a structor variant on `target`.
///
/// Returns `None` when the callee takes no VTT: every complete-object
/// variant, and base variants of classes without virtual bases.
///
/// When the caller itself has a VTT parameter the argument is carved out
/// of it at the target's sub-VTT index; otherwise the caller is a
/// complete-object variant and the argument addresses the class's own
/// VTT directly.
pub fn vtt_parameter(
    cx: &CodegenCx<'_>,
    b: &mut FuncBuilder,
    fctx: &FnCtx,
    target: ClassId,
    target_is_base_variant: bool,
) -> Result<Option<ValueId>> {
    if !target_is_base_variant || !cx.needs_vtt(target) {
        return Ok(None);
    }

    // Delegation to our own base variant reuses the whole (sub-)VTT;
    // constructing a base sub-object selects its sub-VTT.
    let sub_index = if fctx.class == target {
        0
    } else {
        i64::try_from(cx.layouts.sub_vtt_index(fctx.class, target)?).unwrap_or(i64::MAX)
    };

    let vtt = match fctx.vtt_param {
        Some(param) => param,
        None => b.build_symbol(SymbolRef::Vtt(fctx.class)),
    };
    Ok(Some(b.build_slot_addr(vtt, sub_index)))
}
