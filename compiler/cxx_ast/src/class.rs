//! Class, base, and field descriptors.
//!
//! A [`ClassDescriptor`] is the code generator's view of one validated
//! class: ordered direct bases, the de-duplicated transitive virtual-base
//! set, ordered fields, and the triviality/dynamic flags recognized by
//! semantic analysis. Descriptors are owned by a [`ClassArena`] and
//! referenced everywhere else by [`ClassId`].

use bitflags::bitflags;
use smallvec::SmallVec;
use std::fmt;

use crate::Name;

/// A 32-bit index into the class arena.
///
/// Classes are compared by index equality, not structurally.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct ClassId(u32);

impl ClassId {
    /// Create from a raw index.
    #[inline]
    pub const fn from_index(index: u32) -> Self {
        ClassId(index)
    }

    /// The raw index into the arena.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassId({})", self.0)
    }
}

bitflags! {
    /// Per-class facts recognized by semantic analysis.
    ///
    /// These already reflect language rules (union of base/member
    /// triviality); the code generator trusts them without re-derivation.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
    pub struct ClassFlags: u8 {
        /// The class declares a copy constructor.
        const HAS_USER_COPY_CTOR = 1 << 0;
        /// The class declares a copy-assignment operator.
        const HAS_USER_COPY_ASSIGN = 1 << 1;
        /// Destruction is a no-op.
        const TRIVIAL_DTOR = 1 << 2;
        /// Copy construction is a flat byte copy.
        const TRIVIAL_COPY_CTOR = 1 << 3;
        /// Copy assignment is a flat byte copy.
        const TRIVIAL_COPY_ASSIGN = 1 << 4;
        /// Default construction emits no code.
        const TRIVIAL_DEFAULT_CTOR = 1 << 5;
        /// The class has a vtable pointer (declares or inherits a
        /// virtual function).
        const DYNAMIC = 1 << 6;
    }
}

/// One entry in a class's base-specifier list.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BaseSpecifier {
    pub class: ClassId,
    pub is_virtual: bool,
}

/// Element count of a class-typed array sub-object.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ArrayLen {
    /// Fixed-size array; the count is a compile-time constant.
    Fixed(u64),
    /// Variable-length array. Semantic analysis rejects these before
    /// codegen; seeing one here is an upstream bug.
    Variable,
}

/// Declared type of a non-static data member.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FieldType {
    /// Built-in scalar of the given byte size.
    Scalar { size: u64 },
    /// Complex number: two scalars of `size / 2` bytes each.
    Complex { size: u64 },
    /// Reference member; stored as a pointer, bound without copying.
    Reference,
    /// Class-typed member.
    Class(ClassId),
    /// Array of class type.
    Array { elem: ClassId, len: ArrayLen },
}

/// A non-static data member.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: Name,
    pub ty: FieldType,
}

/// One class/struct/union type as seen by code generation.
#[derive(Clone, Debug)]
pub struct ClassDescriptor {
    pub name: Name,
    /// Direct bases in base-specifier declaration order (virtual and
    /// non-virtual interleaved as written).
    pub bases: SmallVec<[BaseSpecifier; 2]>,
    /// All virtual bases reachable through any path, de-duplicated, in
    /// depth-first left-to-right discovery order. Each appears exactly
    /// once in the complete-object layout.
    pub vbases: SmallVec<[ClassId; 2]>,
    /// Fields in declaration order.
    pub fields: Vec<FieldDescriptor>,
    pub flags: ClassFlags,
}

impl ClassDescriptor {
    /// A leaf class with no bases and no fields.
    pub fn new(name: Name, flags: ClassFlags) -> Self {
        Self {
            name,
            bases: SmallVec::new(),
            vbases: SmallVec::new(),
            fields: Vec::new(),
            flags,
        }
    }

    /// Direct non-virtual bases in declaration order.
    pub fn non_virtual_bases(&self) -> impl DoubleEndedIterator<Item = ClassId> + '_ {
        self.bases
            .iter()
            .filter(|b| !b.is_virtual)
            .map(|b| b.class)
    }

    /// Whether `class` is one of this class's virtual bases.
    pub fn is_virtual_base(&self, class: ClassId) -> bool {
        self.vbases.contains(&class)
    }

    pub fn is_dynamic(&self) -> bool {
        self.flags.contains(ClassFlags::DYNAMIC)
    }

    pub fn has_trivial_dtor(&self) -> bool {
        self.flags.contains(ClassFlags::TRIVIAL_DTOR)
    }

    pub fn has_trivial_copy_ctor(&self) -> bool {
        self.flags.contains(ClassFlags::TRIVIAL_COPY_CTOR)
    }

    pub fn has_trivial_copy_assign(&self) -> bool {
        self.flags.contains(ClassFlags::TRIVIAL_COPY_ASSIGN)
    }

    pub fn has_trivial_default_ctor(&self) -> bool {
        self.flags.contains(ClassFlags::TRIVIAL_DEFAULT_CTOR)
    }

    pub fn has_user_copy_ctor(&self) -> bool {
        self.flags.contains(ClassFlags::HAS_USER_COPY_CTOR)
    }

    pub fn has_user_copy_assign(&self) -> bool {
        self.flags.contains(ClassFlags::HAS_USER_COPY_ASSIGN)
    }
}

/// Owning storage for class descriptors.
///
/// Allocation order must be bases-before-derived: [`ClassArena::alloc`]
/// computes the transitive virtual-base closure of the new class from the
/// already-allocated bases.
#[derive(Default)]
pub struct ClassArena {
    classes: Vec<ClassDescriptor>,
}

impl ClassArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a class, computing its virtual-base closure.
    ///
    /// The closure is the union over each direct base of that base's own
    /// virtual bases, plus the base itself when the edge is virtual,
    /// de-duplicated in discovery order.
    pub fn alloc(&mut self, mut class: ClassDescriptor) -> ClassId {
        let mut vbases: SmallVec<[ClassId; 2]> = SmallVec::new();
        for spec in &class.bases {
            for &vb in &self.classes[spec.class.index()].vbases {
                if !vbases.contains(&vb) {
                    vbases.push(vb);
                }
            }
            if spec.is_virtual && !vbases.contains(&spec.class) {
                vbases.push(spec.class);
            }
        }
        class.vbases = vbases;

        let id = ClassId::from_index(u32::try_from(self.classes.len()).unwrap_or(u32::MAX));
        self.classes.push(class);
        id
    }

    pub fn get(&self, id: ClassId) -> &ClassDescriptor {
        &self.classes[id.index()]
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// All classes in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (ClassId, &ClassDescriptor)> {
        self.classes
            .iter()
            .enumerate()
            .map(|(i, c)| (ClassId::from_index(u32::try_from(i).unwrap_or(u32::MAX)), c))
    }
}
