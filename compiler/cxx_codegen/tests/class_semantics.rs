// Test code uses unwrap/expect for clarity - panics provide good test failure messages
#![allow(clippy::unwrap_used, clippy::expect_used)]

//! End-to-end checks of the C++ object-model guarantees: construction
//! and destruction ordering across whole hierarchies, virtual-base
//! uniqueness, exception-cleanup sequencing, pointer adjustment round
//! trips, and trivial-operation elision.

use cxx_ast::{
    ArrayLen, BaseSpecifier, ClassArena, ClassDescriptor, ClassFlags, ClassId, Constructor,
    CtorKind, DtorKind, FieldDescriptor, FieldType, StringInterner,
};
use cxx_codegen::address::{address_of_base, address_of_derived};
use cxx_codegen::arrays::{emit_array_copy, emit_array_destroy};
use cxx_codegen::ctor::emit_constructor;
use cxx_codegen::dtor::emit_destructor;
use cxx_codegen::synth::{synthesize_copy_assignment, synthesize_copy_constructor};
use cxx_codegen::{CodegenCx, FnCtx};
use cxx_ir::{Callee, FuncBuilder, Function, Inst, Term};
use cxx_layout::ModuleLayout;
use pretty_assertions::assert_eq;

struct World {
    arena: ClassArena,
    interner: StringInterner,
}

impl World {
    fn new() -> Self {
        Self {
            arena: ClassArena::new(),
            interner: StringInterner::new(),
        }
    }

    fn class(
        &mut self,
        name: &str,
        flags: ClassFlags,
        bases: &[(ClassId, bool)],
        fields: &[FieldType],
    ) -> ClassId {
        let mut desc = ClassDescriptor::new(self.interner.intern(name), flags);
        for &(class, is_virtual) in bases {
            desc.bases.push(BaseSpecifier { class, is_virtual });
        }
        for (i, &ty) in fields.iter().enumerate() {
            desc.fields.push(FieldDescriptor {
                name: self.interner.intern(&format!("f{i}")),
                ty,
            });
        }
        self.arena.alloc(desc)
    }

    fn nontrivial(&mut self, name: &str) -> ClassId {
        self.class(
            name,
            ClassFlags::HAS_USER_COPY_CTOR,
            &[],
            &[FieldType::Scalar { size: 8 }],
        )
    }
}

fn ctor_order(f: &Function) -> Vec<(ClassId, CtorKind)> {
    f.call_sequence()
        .into_iter()
        .filter_map(|c| match c {
            Callee::Ctor { class, kind } => Some((class, kind)),
            _ => None,
        })
        .collect()
}

fn dtor_order(f: &Function) -> Vec<(ClassId, DtorKind)> {
    f.call_sequence()
        .into_iter()
        .filter_map(|c| match c {
            Callee::Dtor { class, kind } => Some((class, kind)),
            _ => None,
        })
        .collect()
}

#[test]
fn test_chain_copy_construction_runs_base_first() {
    let mut w = World::new();
    let base = w.nontrivial("Base");
    let mid = w.class(
        "Mid",
        ClassFlags::HAS_USER_COPY_CTOR,
        &[(base, false)],
        &[FieldType::Scalar { size: 8 }],
    );
    let field = w.nontrivial("Field");
    let derived = w.class(
        "Derived",
        ClassFlags::default(),
        &[(mid, false)],
        &[FieldType::Class(field)],
    );
    let layouts = ModuleLayout::compute(&w.arena);
    let cx = CodegenCx::new(&w.arena, &layouts, &w.interner);

    let f = synthesize_copy_constructor(&cx, derived, CtorKind::Complete).unwrap();
    // Mid's copy (as a base sub-object) strictly precedes the field's.
    assert_eq!(
        ctor_order(&f),
        vec![(mid, CtorKind::Base), (field, CtorKind::Complete)]
    );
}

#[test]
fn test_diamond_virtual_base_constructed_once_and_first() {
    let mut w = World::new();
    let v = w.nontrivial("V");
    let a = w.class("A", ClassFlags::default(), &[(v, true)], &[]);
    let b = w.class("B", ClassFlags::default(), &[(v, true)], &[]);
    let d = w.class("D", ClassFlags::default(), &[(a, false), (b, false)], &[]);
    let layouts = ModuleLayout::compute(&w.arena);
    let mut cx = CodegenCx::new(&w.arena, &layouts, &w.interner);

    let complete = emit_constructor(&mut cx, &Constructor::new(d), CtorKind::Complete).unwrap();
    let order = ctor_order(&complete);
    let v_count = order.iter().filter(|(c, _)| *c == v).count();
    assert_eq!(v_count, 1, "virtual base must be constructed exactly once");
    assert_eq!(order[0].0, v, "virtual base must be constructed first");
    assert_eq!(&order[1..], &[(a, CtorKind::Base), (b, CtorKind::Base)]);

    // The base variant constructs no virtual bases at all: A and B's
    // sub-objects only.
    let base = emit_constructor(&mut cx, &Constructor::new(d), CtorKind::Base).unwrap();
    assert_eq!(
        ctor_order(&base),
        vec![(a, CtorKind::Base), (b, CtorKind::Base)]
    );
}

#[test]
fn test_partial_construction_unwinds_in_reverse() {
    let mut w = World::new();
    let base = w.nontrivial("Base");
    let m1 = w.nontrivial("M1");
    let m2 = w.nontrivial("M2");
    let m3 = w.nontrivial("M3");
    let d = w.class(
        "D",
        ClassFlags::default(),
        &[(base, false)],
        &[
            FieldType::Class(m1),
            FieldType::Class(m2),
            FieldType::Class(m3),
        ],
    );
    let layouts = ModuleLayout::compute(&w.arena);
    let mut cx = CodegenCx::new(&w.arena, &layouts, &w.interner);

    let f = emit_constructor(&mut cx, &Constructor::new(d), CtorKind::Complete).unwrap();
    let calls = f.calls();

    // Construction of m3 lands on the cleanup chain covering m2, m1,
    // and the base, in that order, ending in a resume.
    let m3_call = calls
        .iter()
        .find(|c| matches!(c.callee, Callee::Ctor { class, .. } if *class == m3))
        .unwrap();
    let mut chain = Vec::new();
    let mut next = m3_call.unwind;
    while let Some(bb) = next {
        let destroyed = f
            .block(bb)
            .insts
            .iter()
            .find_map(|&v| match f.inst(v) {
                Inst::Call {
                    callee: Callee::Dtor { class, .. },
                    unwind,
                    ..
                } => {
                    assert_eq!(*unwind, None, "cleanup destructors must not unwind");
                    Some(*class)
                }
                _ => None,
            })
            .unwrap();
        chain.push(destroyed);
        next = match f.block(bb).term.as_ref().unwrap() {
            Term::Br(next) => Some(*next),
            Term::Resume => None,
            other => panic!("unexpected cleanup terminator {other:?}"),
        };
    }
    assert_eq!(chain, vec![m2, m1, base]);
}

#[test]
fn test_derived_base_round_trip_and_null_preservation() {
    let mut w = World::new();
    let first = w.nontrivial("First");
    let second = w.nontrivial("Second");
    let d = w.class(
        "D",
        ClassFlags::default(),
        &[(first, false), (second, false)],
        &[],
    );
    let layouts = ModuleLayout::compute(&w.arena);
    let cx = CodegenCx::new(&w.arena, &layouts, &w.interner);

    let mut b = FuncBuilder::new("round_trip", 1);
    let p = b.param(0);
    let down = address_of_base(&cx, &mut b, p, d, second, false).unwrap();
    let up = address_of_derived(&cx, &mut b, down, d, second, false).unwrap();
    b.build_ret();
    let f = b.finish();

    // The two constant adjustments cancel.
    let offset_of = |v| match f.inst(v) {
        Inst::PtrAddConst { offset, .. } => *offset,
        other => panic!("expected constant adjustment, got {other:?}"),
    };
    assert_eq!(offset_of(down), -offset_of(up));

    // With null checks, both directions merge through a phi whose
    // incoming values include null, so null maps to null.
    let mut b = FuncBuilder::new("null_checked", 1);
    let p = b.param(0);
    let down = address_of_base(&cx, &mut b, p, d, second, true).unwrap();
    b.build_ret();
    let f = b.finish();
    match f.inst(down) {
        Inst::Phi { incoming } => {
            assert!(incoming
                .iter()
                .any(|(v, _)| matches!(f.inst(*v), Inst::Null)));
        }
        other => panic!("expected phi merge, got {other:?}"),
    }
}

#[test]
fn test_array_operations_bound_by_element_count() {
    let mut w = World::new();
    let elem = w.nontrivial("Elem");
    let layouts = ModuleLayout::compute(&w.arena);
    let cx = CodegenCx::new(&w.arena, &layouts, &w.interner);

    // Copy guards on the element count; zero-length arrays still build
    // a well-formed loop whose body never runs.
    for count in [0u64, 4] {
        let mut b = FuncBuilder::new("copy", 2);
        let dest = b.param(0);
        let src = b.param(1);
        let fctx = FnCtx::new(elem);
        emit_array_copy(&cx, &mut b, &fctx, dest, src, elem, count).unwrap();
        b.build_ret();
        let f = b.finish();

        let bound = f
            .insts()
            .find_map(|(_, i)| match i {
                Inst::ICmp { rhs, .. } => Some(*rhs),
                _ => None,
            })
            .unwrap();
        assert_eq!(f.inst(bound), &Inst::ConstInt(i64::try_from(count).unwrap()));
        assert!(f.blocks().all(|(_, blk)| blk.term.is_some()));
    }

    // Destruction decrements from the count toward zero.
    let mut b = FuncBuilder::new("destroy", 1);
    let base = b.param(0);
    let fctx = FnCtx::new(elem);
    emit_array_destroy(&cx, &mut b, &fctx, base, elem, 4).unwrap();
    b.build_ret();
    let f = b.finish();
    let dtor = f.calls()[0].value;
    match f.inst(f.calls()[0].args[0]) {
        Inst::ElemAddr { index, .. } => {
            assert!(matches!(f.inst(*index), Inst::Sub { .. }));
        }
        other => panic!("expected element address, got {other:?}"),
    }
    assert!(f.block_of(dtor).is_some());
}

#[test]
fn test_trivially_copyable_class_copies_as_bytes() {
    let mut w = World::new();
    let pod = w.class(
        "Pod",
        ClassFlags::TRIVIAL_DEFAULT_CTOR
            | ClassFlags::TRIVIAL_COPY_CTOR
            | ClassFlags::TRIVIAL_COPY_ASSIGN
            | ClassFlags::TRIVIAL_DTOR,
        &[],
        &[FieldType::Scalar { size: 8 }, FieldType::Scalar { size: 8 }],
    );
    let holder = w.class(
        "Holder",
        ClassFlags::default(),
        &[],
        &[FieldType::Class(pod)],
    );
    let layouts = ModuleLayout::compute(&w.arena);
    let cx = CodegenCx::new(&w.arena, &layouts, &w.interner);

    // The synthesized copy of Holder moves Pod with a single memcpy of
    // its full size and emits no constructor call for it.
    let f = synthesize_copy_constructor(&cx, holder, CtorKind::Complete).unwrap();
    assert!(f.calls().is_empty());
    let sizes: Vec<u64> = f
        .insts()
        .filter_map(|(_, i)| match i {
            Inst::MemCpy { size, .. } => Some(*size),
            _ => None,
        })
        .collect();
    assert_eq!(sizes, vec![16]);

    // Same elision for assignment.
    let f = synthesize_copy_assignment(&cx, holder).unwrap();
    assert!(f.calls().is_empty());
}

#[test]
fn test_destruction_exactly_reverses_construction() {
    let mut w = World::new();
    let v = w.nontrivial("V");
    let b1 = w.class("B1", ClassFlags::default(), &[(v, true)], &[]);
    let b2 = w.nontrivial("B2");
    let m1 = w.nontrivial("M1");
    let m2 = w.nontrivial("M2");
    let d = w.class(
        "D",
        ClassFlags::default(),
        &[(b1, false), (b2, false)],
        &[FieldType::Class(m1), FieldType::Class(m2)],
    );
    let layouts = ModuleLayout::compute(&w.arena);
    let mut cx = CodegenCx::new(&w.arena, &layouts, &w.interner);

    let ctor = emit_constructor(&mut cx, &Constructor::new(d), CtorKind::Complete).unwrap();
    let built: Vec<ClassId> = ctor_order(&ctor).into_iter().map(|(c, _)| c).collect();
    assert_eq!(built, vec![v, b1, b2, m1, m2]);

    // The base variant destroys members then bases, reversed.
    let base_dtor = emit_destructor(&cx, d, DtorKind::Base).unwrap();
    assert_eq!(
        dtor_order(&base_dtor),
        vec![
            (m2, DtorKind::Complete),
            (m1, DtorKind::Complete),
            (b2, DtorKind::Base),
            (b1, DtorKind::Base),
        ]
    );

    // The complete variant delegates, then takes the virtual base.
    let complete_dtor = emit_destructor(&cx, d, DtorKind::Complete).unwrap();
    assert_eq!(
        dtor_order(&complete_dtor),
        vec![(d, DtorKind::Base), (v, DtorKind::Base)]
    );
}

#[test]
fn test_array_member_lifecycle_in_enclosing_class() {
    let mut w = World::new();
    let elem = w.nontrivial("Elem");
    let d = w.class(
        "D",
        ClassFlags::default(),
        &[],
        &[FieldType::Array {
            elem,
            len: ArrayLen::Fixed(3),
        }],
    );
    let layouts = ModuleLayout::compute(&w.arena);
    let cx = CodegenCx::new(&w.arena, &layouts, &w.interner);

    // Copying the enclosing class copies the array element-wise,
    // ascending; destroying it destroys element-wise, descending.
    let copy = synthesize_copy_constructor(&cx, d, CtorKind::Complete).unwrap();
    assert_eq!(ctor_order(&copy), vec![(elem, CtorKind::Complete)]);

    let dtor = emit_destructor(&cx, d, DtorKind::Base).unwrap();
    assert_eq!(dtor_order(&dtor), vec![(elem, DtorKind::Complete)]);
    // Ascending copy loop vs descending destroy loop.
    let has_ult = copy.insts().any(|(_, i)| {
        matches!(
            i,
            Inst::ICmp {
                pred: cxx_ir::IcmpPred::Ult,
                ..
            }
        )
    });
    let has_ne = dtor.insts().any(|(_, i)| {
        matches!(
            i,
            Inst::ICmp {
                pred: cxx_ir::IcmpPred::Ne,
                ..
            }
        )
    });
    assert!(has_ult && has_ne);
}
