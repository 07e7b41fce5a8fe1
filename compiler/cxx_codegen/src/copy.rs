//! Sub-object copy construction and copy assignment.
//!
//! Used by synthesized copy operations: given parallel dest/src pointers
//! into two objects of the same enclosing type, copy one base or member
//! sub-object. Trivially-copyable sub-objects collapse to a memcpy of
//! their extent; base sub-objects copy only their non-virtual region so
//! a shared virtual base is never written twice.

use cxx_ast::{ClassId, CtorKind};
use cxx_ir::{Callee, FuncBuilder, ValueId};

use crate::address::address_of_base;
use crate::calls::{emit_constructor_call, CtorArgs};
use crate::{CodegenCx, FnCtx, Result};

/// Copy-construct one `class` sub-object of `dest` from the matching
/// sub-object of `src`.
///
/// With `enclosing` set, `dest`/`src` point at the enclosing objects and
/// both are adjusted to the `class` base first; the base-object
/// constructor variant runs so virtual bases stay untouched. Without it,
/// the pointers already address complete `class` objects.
pub fn emit_memberwise_copy(
    cx: &CodegenCx<'_>,
    b: &mut FuncBuilder,
    fctx: &FnCtx,
    dest: ValueId,
    src: ValueId,
    enclosing: Option<ClassId>,
    class: ClassId,
) -> Result<()> {
    let (dest, src, kind) = match enclosing {
        Some(encl) => {
            let d = address_of_base(cx, b, dest, encl, class, false)?;
            let s = address_of_base(cx, b, src, encl, class, false)?;
            (d, s, CtorKind::Base)
        }
        None => (dest, src, CtorKind::Complete),
    };
    emit_constructor_call(cx, b, fctx, class, kind, dest, CtorArgs::Copy(src))
}

/// Copy-assign one `class` sub-object of `dest` from the matching
/// sub-object of `src`.
///
/// Assignment has no base/complete split; a synthesized assignment
/// operator assigns each non-virtual base and each member exactly once
/// and never walks virtual bases.
pub fn emit_copy_assignment(
    cx: &CodegenCx<'_>,
    b: &mut FuncBuilder,
    dest: ValueId,
    src: ValueId,
    enclosing: Option<ClassId>,
    class: ClassId,
) -> Result<()> {
    let (dest, src) = match enclosing {
        Some(encl) => {
            let d = address_of_base(cx, b, dest, encl, class, false)?;
            let s = address_of_base(cx, b, src, encl, class, false)?;
            (d, s)
        }
        None => (dest, src),
    };

    if cx.class(class).has_trivial_copy_assign() {
        let size = match enclosing {
            Some(_) => cx.layout(class)?.nv_size,
            None => cx.layout(class)?.size,
        };
        b.build_memcpy(dest, src, size);
        return Ok(());
    }

    b.build_call(Callee::CopyAssign(class), vec![dest, src]);
    Ok(())
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests use unwrap for brevity")]
mod tests {
    use super::*;
    use cxx_ast::{
        BaseSpecifier, ClassArena, ClassDescriptor, ClassFlags, FieldDescriptor, FieldType,
        StringInterner,
    };
    use cxx_ir::Inst;
    use cxx_layout::ModuleLayout;
    use pretty_assertions::assert_eq;

    fn padded_class(
        arena: &mut ClassArena,
        interner: &StringInterner,
        name: &str,
        flags: ClassFlags,
        bases: &[ClassId],
    ) -> ClassId {
        let mut desc = ClassDescriptor::new(interner.intern(name), flags);
        for &class in bases {
            desc.bases.push(BaseSpecifier {
                class,
                is_virtual: false,
            });
        }
        desc.fields.push(FieldDescriptor {
            name: interner.intern("x"),
            ty: FieldType::Scalar { size: 8 },
        });
        arena.alloc(desc)
    }

    #[test]
    fn test_base_sub_object_copy_adjusts_both_sides() {
        let interner = StringInterner::new();
        let mut arena = ClassArena::new();
        let first = padded_class(&mut arena, &interner, "First", ClassFlags::default(), &[]);
        let second = padded_class(&mut arena, &interner, "Second", ClassFlags::default(), &[]);
        let d = padded_class(
            &mut arena,
            &interner,
            "D",
            ClassFlags::default(),
            &[first, second],
        );
        let layouts = ModuleLayout::compute(&arena);
        let cx = CodegenCx::new(&arena, &layouts, &interner);

        let mut b = FuncBuilder::new("f", 2);
        let dest = b.param(0);
        let src = b.param(1);
        let fctx = FnCtx::new(d);
        emit_memberwise_copy(&cx, &mut b, &fctx, dest, src, Some(d), second).unwrap();
        b.build_ret();
        let f = b.finish();

        let calls = f.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0].callee,
            &Callee::Ctor {
                class: second,
                kind: CtorKind::Base
            }
        );
        // Both arguments were adjusted by the same constant.
        assert_eq!(
            f.inst(calls[0].args[0]),
            &Inst::PtrAddConst {
                ptr: dest,
                offset: 8
            }
        );
        assert_eq!(
            f.inst(calls[0].args[1]),
            &Inst::PtrAddConst {
                ptr: src,
                offset: 8
            }
        );
    }

    #[test]
    fn test_trivial_assign_copies_nv_region_only() {
        let interner = StringInterner::new();
        let mut arena = ClassArena::new();
        let v = padded_class(&mut arena, &interner, "V", ClassFlags::default(), &[]);
        let base = {
            let mut desc = ClassDescriptor::new(
                interner.intern("Base"),
                ClassFlags::TRIVIAL_COPY_ASSIGN,
            );
            desc.bases.push(BaseSpecifier {
                class: v,
                is_virtual: true,
            });
            desc.fields.push(FieldDescriptor {
                name: interner.intern("b"),
                ty: FieldType::Scalar { size: 8 },
            });
            arena.alloc(desc)
        };
        let d = padded_class(&mut arena, &interner, "D", ClassFlags::default(), &[base]);
        let layouts = ModuleLayout::compute(&arena);
        let cx = CodegenCx::new(&arena, &layouts, &interner);

        let mut b = FuncBuilder::new("f", 2);
        let dest = b.param(0);
        let src = b.param(1);
        emit_copy_assignment(&cx, &mut b, dest, src, Some(d), base).unwrap();
        b.build_ret();
        let f = b.finish();

        // The memcpy covers Base's non-virtual region, excluding V.
        let nv = layouts.layout(base).unwrap().nv_size;
        let full = layouts.layout(base).unwrap().size;
        assert!(nv < full);
        let memcpy = f
            .insts()
            .find_map(|(_, i)| match i {
                Inst::MemCpy { size, .. } => Some(*size),
                _ => None,
            })
            .unwrap();
        assert_eq!(memcpy, nv);
    }

    #[test]
    fn test_non_trivial_assign_calls_operator() {
        let interner = StringInterner::new();
        let mut arena = ClassArena::new();
        let c = padded_class(
            &mut arena,
            &interner,
            "C",
            ClassFlags::HAS_USER_COPY_ASSIGN,
            &[],
        );
        let layouts = ModuleLayout::compute(&arena);
        let cx = CodegenCx::new(&arena, &layouts, &interner);

        let mut b = FuncBuilder::new("f", 2);
        let dest = b.param(0);
        let src = b.param(1);
        emit_copy_assignment(&cx, &mut b, dest, src, None, c).unwrap();
        b.build_ret();
        let f = b.finish();

        assert_eq!(f.call_sequence(), vec![Callee::CopyAssign(c)]);
    }
}
