//! Inheritance path resolution.
//!
//! Computes the path from a derived class to one of its bases,
//! distinguishing virtual from non-virtual edges. Two facts drive the
//! ambiguity rules:
//!
//! - A non-virtual base reached through two distinct paths denotes two
//!   distinct sub-objects, so the query is ambiguous.
//! - A virtual base denotes one sub-object no matter how many paths
//!   reach it, so paths that differ only before their last virtual edge
//!   collapse to the same logical base.

use cxx_ast::{ClassArena, ClassId};
use smallvec::SmallVec;

use crate::{CodegenError, Result};

/// One inheritance edge: `base` is a direct base of `enclosing`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BasePathSegment {
    pub enclosing: ClassId,
    pub base: ClassId,
    pub via_virtual: bool,
}

/// An ordered inheritance chain from a derived class down to a named
/// ancestor. Computed on demand and discarded after use.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BasePath {
    pub segments: SmallVec<[BasePathSegment; 4]>,
}

impl BasePath {
    /// The last virtual edge on the path, if any: segment index and the
    /// virtual base it enters.
    pub fn virtual_anchor(&self) -> Option<(usize, ClassId)> {
        self.segments
            .iter()
            .enumerate()
            .rev()
            .find(|(_, seg)| seg.via_virtual)
            .map(|(i, seg)| (i, seg.base))
    }

    pub fn has_virtual_edge(&self) -> bool {
        self.segments.iter().any(|seg| seg.via_virtual)
    }

    /// Sum of the compile-time base offsets along the non-virtual suffix
    /// (the segments after the last virtual edge, or the whole path when
    /// no edge is virtual). Non-virtual offsets never depend on the
    /// runtime type.
    pub fn non_virtual_offset(&self, layouts: &cxx_layout::ModuleLayout) -> Result<u64> {
        let start = self.virtual_anchor().map_or(0, |(i, _)| i + 1);
        let mut offset = 0u64;
        for seg in &self.segments[start..] {
            offset += layouts.layout(seg.enclosing)?.base_offset(seg.base)?;
        }
        Ok(offset)
    }
}

/// Sub-object identity of a path's endpoint: the last virtual base
/// crossed (or `None` for a purely non-virtual path) plus the class
/// sequence after it. Two paths reach the same sub-object iff their
/// identities agree.
type SubObjectKey = (Option<ClassId>, Vec<ClassId>);

fn sub_object_key(path: &BasePath) -> SubObjectKey {
    let (anchor, start) = match path.virtual_anchor() {
        Some((i, vbase)) => (Some(vbase), i + 1),
        None => (None, 0),
    };
    let suffix = path.segments[start..].iter().map(|s| s.base).collect();
    (anchor, suffix)
}

fn collect_paths(
    arena: &ClassArena,
    current: ClassId,
    target: ClassId,
    prefix: &mut Vec<BasePathSegment>,
    found: &mut Vec<BasePath>,
) {
    for spec in &arena.get(current).bases {
        prefix.push(BasePathSegment {
            enclosing: current,
            base: spec.class,
            via_virtual: spec.is_virtual,
        });
        if spec.class == target {
            found.push(BasePath {
                segments: SmallVec::from_slice(prefix),
            });
        } else {
            collect_paths(arena, spec.class, target, prefix, found);
        }
        prefix.pop();
    }
}

/// Resolve the inheritance path from `derived` to `base`.
///
/// Returns an empty path when the two are the same class. Fails with
/// [`CodegenError::NotABase`] when `base` is unreachable and with
/// [`CodegenError::AmbiguousNonVirtualBase`] when it is reachable
/// through two or more distinct non-virtual sub-objects. Both failures
/// are upstream-phase bugs: semantic analysis diagnoses them before code
/// generation is attempted.
pub fn resolve_base_path(arena: &ClassArena, derived: ClassId, base: ClassId) -> Result<BasePath> {
    if derived == base {
        return Ok(BasePath::default());
    }

    let mut found = Vec::new();
    let mut prefix = Vec::new();
    collect_paths(arena, derived, base, &mut prefix, &mut found);

    let Some(first) = found.first() else {
        return Err(CodegenError::NotABase { derived, base });
    };

    let key = sub_object_key(first);
    if found.iter().skip(1).any(|p| sub_object_key(p) != key) {
        return Err(CodegenError::AmbiguousNonVirtualBase { derived, base });
    }

    Ok(found.swap_remove(0))
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests use unwrap for brevity")]
mod tests {
    use super::*;
    use cxx_ast::{BaseSpecifier, ClassDescriptor, ClassFlags, StringInterner};
    use cxx_layout::ModuleLayout;
    use pretty_assertions::assert_eq;

    fn class(
        arena: &mut ClassArena,
        interner: &StringInterner,
        name: &str,
        bases: &[(ClassId, bool)],
    ) -> ClassId {
        let mut desc = ClassDescriptor::new(interner.intern(name), ClassFlags::default());
        for &(class, is_virtual) in bases {
            desc.bases.push(BaseSpecifier { class, is_virtual });
        }
        arena.alloc(desc)
    }

    #[test]
    fn test_identity_is_empty_path() {
        let interner = StringInterner::new();
        let mut arena = ClassArena::new();
        let a = class(&mut arena, &interner, "A", &[]);
        let path = resolve_base_path(&arena, a, a).unwrap();
        assert!(path.segments.is_empty());
    }

    #[test]
    fn test_not_a_base() {
        let interner = StringInterner::new();
        let mut arena = ClassArena::new();
        let a = class(&mut arena, &interner, "A", &[]);
        let b = class(&mut arena, &interner, "B", &[]);
        assert_eq!(
            resolve_base_path(&arena, a, b),
            Err(CodegenError::NotABase {
                derived: a,
                base: b
            })
        );
    }

    #[test]
    fn test_two_non_virtual_paths_are_ambiguous() {
        let interner = StringInterner::new();
        let mut arena = ClassArena::new();
        let x = class(&mut arena, &interner, "X", &[]);
        let a = class(&mut arena, &interner, "A", &[(x, false)]);
        let b = class(&mut arena, &interner, "B", &[(x, false)]);
        let d = class(&mut arena, &interner, "D", &[(a, false), (b, false)]);
        assert_eq!(
            resolve_base_path(&arena, d, x),
            Err(CodegenError::AmbiguousNonVirtualBase {
                derived: d,
                base: x
            })
        );
    }

    #[test]
    fn test_virtual_diamond_collapses() {
        let interner = StringInterner::new();
        let mut arena = ClassArena::new();
        let v = class(&mut arena, &interner, "V", &[]);
        let a = class(&mut arena, &interner, "A", &[(v, true)]);
        let b = class(&mut arena, &interner, "B", &[(v, true)]);
        let d = class(&mut arena, &interner, "D", &[(a, false), (b, false)]);

        let path = resolve_base_path(&arena, d, v).unwrap();
        assert_eq!(path.virtual_anchor().map(|(_, c)| c), Some(v));
    }

    #[test]
    fn test_non_virtual_offset_sums_chain() {
        let interner = StringInterner::new();
        let mut arena = ClassArena::new();
        let base = {
            let mut desc = ClassDescriptor::new(interner.intern("Base"), ClassFlags::default());
            desc.fields.push(cxx_ast::FieldDescriptor {
                name: interner.intern("b"),
                ty: cxx_ast::FieldType::Scalar { size: 8 },
            });
            arena.alloc(desc)
        };
        let pad = {
            let mut desc = ClassDescriptor::new(interner.intern("Pad"), ClassFlags::default());
            desc.fields.push(cxx_ast::FieldDescriptor {
                name: interner.intern("p"),
                ty: cxx_ast::FieldType::Scalar { size: 8 },
            });
            arena.alloc(desc)
        };
        let mid = class(&mut arena, &interner, "Mid", &[(pad, false), (base, false)]);
        let top = class(&mut arena, &interner, "Top", &[(pad, false), (mid, false)]);

        let layouts = ModuleLayout::compute(&arena);
        let path = resolve_base_path(&arena, top, base).unwrap();
        // Base sits behind Pad inside Mid, and Mid sits behind Pad in Top.
        assert_eq!(path.non_virtual_offset(&layouts).unwrap(), 16);
    }
}
