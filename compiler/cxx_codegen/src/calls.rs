//! Structor call emission with trivial-operation elision.
//!
//! Every constructor/destructor invocation funnels through here so that
//! the trivial fast paths apply uniformly: a trivial default constructor
//! emits nothing, a trivial copy constructor becomes a flat memcpy, a
//! trivial destructor emits nothing. Non-trivial calls pick up their VTT
//! argument automatically.

use cxx_ast::{ClassId, CtorKind, DtorKind};
use cxx_ir::{Callee, FuncBuilder, ValueId};
use tracing::trace;

use crate::vtt::vtt_parameter;
use crate::{CodegenCx, FnCtx, Result};

/// Arguments to a constructor invocation, beyond the object pointer.
#[derive(Copy, Clone, Debug)]
pub enum CtorArgs<'a> {
    /// Default construction.
    None,
    /// Copy construction from an existing object.
    Copy(ValueId),
    /// Construction with constant arguments.
    Values(&'a [i64]),
}

/// Emit a call to `class`'s constructor on `this`, or elide it when the
/// operation is trivial.
pub fn emit_constructor_call(
    cx: &CodegenCx<'_>,
    b: &mut FuncBuilder,
    fctx: &FnCtx,
    class: ClassId,
    kind: CtorKind,
    this: ValueId,
    args: CtorArgs<'_>,
) -> Result<()> {
    let desc = cx.class(class);
    match args {
        CtorArgs::None if desc.has_trivial_default_ctor() => {
            trace!(?class, "elided trivial default construction");
            return Ok(());
        }
        CtorArgs::Copy(src) if desc.has_trivial_copy_ctor() => {
            let layout = cx.layout(class)?;
            // Base sub-objects copy only the region embedded in the
            // derived class.
            let size = match kind {
                CtorKind::Complete => layout.size,
                CtorKind::Base => layout.nv_size,
            };
            b.build_memcpy(this, src, size);
            return Ok(());
        }
        _ => {}
    }

    let vtt = vtt_parameter(cx, b, fctx, class, kind == CtorKind::Base)?;
    let mut call_args = vec![this];
    call_args.extend(vtt);
    match args {
        CtorArgs::None => {}
        CtorArgs::Copy(src) => call_args.push(src),
        CtorArgs::Values(values) => {
            for &v in values {
                let c = b.build_const_int(v);
                call_args.push(c);
            }
        }
    }
    b.build_call(Callee::Ctor { class, kind }, call_args);
    Ok(())
}

/// Emit a call to `class`'s destructor on `this`, or elide it when the
/// destructor is trivial.
pub fn emit_destructor_call(
    cx: &CodegenCx<'_>,
    b: &mut FuncBuilder,
    fctx: &FnCtx,
    class: ClassId,
    kind: DtorKind,
    this: ValueId,
) -> Result<()> {
    if cx.class(class).has_trivial_dtor() {
        trace!(?class, "elided trivial destruction");
        return Ok(());
    }

    let vtt = vtt_parameter(cx, b, fctx, class, kind == DtorKind::Base)?;
    let mut call_args = vec![this];
    call_args.extend(vtt);
    b.build_call(Callee::Dtor { class, kind }, call_args);
    Ok(())
}
