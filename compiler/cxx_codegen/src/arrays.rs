//! Array sub-object operations.
//!
//! Construction, copy, and assignment run ascending (element 0 first);
//! destruction runs descending, mirroring reverse construction order.
//! Loops use a stack index slot so the generated shape is identical for
//! every element count, including zero, where the loop body simply never
//! runs. Trivial element operations collapse the whole loop.

use cxx_ast::{ArrayLen, ClassId, CtorKind, DtorKind};
use cxx_ir::{FuncBuilder, HelperId, IcmpPred, ValueId};
use tracing::debug;

use crate::calls::{emit_constructor_call, emit_destructor_call, CtorArgs};
use crate::copy::emit_copy_assignment;
use crate::{CodegenCx, CodegenError, FnCtx, Result};

/// Resolve an array length to its constant element count.
///
/// Variable-length arrays are rejected by semantic analysis; one reaching
/// this point is an internal error.
pub fn checked_len(elem: ClassId, len: ArrayLen) -> Result<u64> {
    match len {
        ArrayLen::Fixed(n) => Ok(n),
        ArrayLen::Variable => Err(CodegenError::VariableLengthSubObject { elem }),
    }
}

/// Ascending index loop: runs `body` once per element with the loaded
/// index value, leaving the builder positioned after the loop.
fn ascending_loop<F>(b: &mut FuncBuilder, count: u64, body: F) -> Result<()>
where
    F: FnOnce(&mut FuncBuilder, ValueId) -> Result<()>,
{
    let cond_bb = b.create_block("arrayinit.cond");
    let body_bb = b.create_block("arrayinit.body");
    let inc_bb = b.create_block("arrayinit.inc");
    let end_bb = b.create_block("arrayinit.end");

    let index = b.build_alloca("arrayinit.index");
    let zero = b.build_const_int(0);
    b.build_store(zero, index);
    b.build_br(cond_bb);

    b.switch_to_block(cond_bb);
    let i = b.build_load(index);
    let n = b.build_const_int(i64::try_from(count).unwrap_or(i64::MAX));
    let in_bounds = b.build_icmp(IcmpPred::Ult, i, n);
    b.build_cond_br(in_bounds, body_bb, end_bb);

    b.switch_to_block(body_bb);
    let i = b.build_load(index);
    body(b, i)?;
    b.build_br(inc_bb);

    b.switch_to_block(inc_bb);
    let i = b.build_load(index);
    let one = b.build_const_int(1);
    let next = b.build_add(i, one);
    b.build_store(next, index);
    b.build_br(cond_bb);

    b.switch_to_block(end_bb);
    Ok(())
}

/// Construct `count` elements of `elem` in place at `base`, ascending.
pub fn emit_array_construct(
    cx: &CodegenCx<'_>,
    b: &mut FuncBuilder,
    fctx: &FnCtx,
    base: ValueId,
    elem: ClassId,
    count: u64,
    args: &[i64],
) -> Result<()> {
    if args.is_empty() && cx.class(elem).has_trivial_default_ctor() {
        return Ok(());
    }
    ascending_loop(b, count, |b, i| {
        let addr = b.build_elem_addr(base, i);
        emit_constructor_call(
            cx,
            b,
            fctx,
            elem,
            CtorKind::Complete,
            addr,
            CtorArgs::Values(args),
        )
    })
}

/// Copy-construct `count` elements from `src` into `dest`, ascending.
pub fn emit_array_copy(
    cx: &CodegenCx<'_>,
    b: &mut FuncBuilder,
    fctx: &FnCtx,
    dest: ValueId,
    src: ValueId,
    elem: ClassId,
    count: u64,
) -> Result<()> {
    if cx.class(elem).has_trivial_copy_ctor() {
        let size = cx.layout(elem)?.size * count;
        if size > 0 {
            b.build_memcpy(dest, src, size);
        }
        return Ok(());
    }
    ascending_loop(b, count, |b, i| {
        let d = b.build_elem_addr(dest, i);
        let s = b.build_elem_addr(src, i);
        emit_constructor_call(cx, b, fctx, elem, CtorKind::Complete, d, CtorArgs::Copy(s))
    })
}

/// Copy-assign `count` elements from `src` into `dest`, ascending.
pub fn emit_array_assign(
    cx: &CodegenCx<'_>,
    b: &mut FuncBuilder,
    dest: ValueId,
    src: ValueId,
    elem: ClassId,
    count: u64,
) -> Result<()> {
    if cx.class(elem).has_trivial_copy_assign() {
        let size = cx.layout(elem)?.size * count;
        if size > 0 {
            b.build_memcpy(dest, src, size);
        }
        return Ok(());
    }
    ascending_loop(b, count, |b, i| {
        let d = b.build_elem_addr(dest, i);
        let s = b.build_elem_addr(src, i);
        emit_copy_assignment(cx, b, d, s, None, elem)
    })
}

/// Destroy `count` elements at `base`, descending from the last.
pub fn emit_array_destroy(
    cx: &CodegenCx<'_>,
    b: &mut FuncBuilder,
    fctx: &FnCtx,
    base: ValueId,
    elem: ClassId,
    count: u64,
) -> Result<()> {
    if cx.class(elem).has_trivial_dtor() {
        return Ok(());
    }

    let cond_bb = b.create_block("arraydestroy.cond");
    let body_bb = b.create_block("arraydestroy.body");
    let done_bb = b.create_block("arraydestroy.done");

    let index = b.build_alloca("arraydestroy.index");
    let n = b.build_const_int(i64::try_from(count).unwrap_or(i64::MAX));
    b.build_store(n, index);
    b.build_br(cond_bb);

    b.switch_to_block(cond_bb);
    let i = b.build_load(index);
    let zero = b.build_const_int(0);
    let remaining = b.build_icmp(IcmpPred::Ne, i, zero);
    b.build_cond_br(remaining, body_bb, done_bb);

    b.switch_to_block(body_bb);
    let i = b.build_load(index);
    let one = b.build_const_int(1);
    let prev = b.build_sub(i, one);
    b.build_store(prev, index);
    let addr = b.build_elem_addr(base, prev);
    emit_destructor_call(cx, b, fctx, elem, DtorKind::Complete, addr)?;
    b.build_br(cond_bb);

    b.switch_to_block(done_bb);
    Ok(())
}

/// Get (or synthesize) the `__tcf_N` helper that destroys a fixed-size
/// array of `elem`, for use as a deferred cleanup callee.
///
/// One helper exists per distinct (element, length) pair; repeated
/// requests return the cached id.
pub fn array_dtor_helper(cx: &mut CodegenCx<'_>, elem: ClassId, count: u64) -> Result<HelperId> {
    if let Some(id) = cx.cached_helper(elem, count) {
        return Ok(id);
    }

    let name = format!("__tcf_{}", cx.next_helper_index());
    debug!(helper = %name, ?elem, count, "synthesizing array destructor helper");

    let mut b = FuncBuilder::new(name, 1);
    let base = b.param(0);
    let fctx = FnCtx::new(elem);
    emit_array_destroy(cx, &mut b, &fctx, base, elem, count)?;
    b.build_ret();

    Ok(cx.add_helper(elem, count, b.finish()))
}
