//! Constructor/destructor variants and initializer lists.
//!
//! Initializer lists arrive from semantic analysis already validated.
//! The written order is preserved here; the code generator re-orders
//! bases into declaration order (virtual bases first) and members into
//! field declaration order, as the language mandates.

use crate::{ClassId, Name};

/// Constructor variant.
///
/// The complete-object variant constructs virtual bases; the base-object
/// variant is invoked on base sub-objects and never touches them.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CtorKind {
    Complete,
    Base,
}

/// Destructor variant.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DtorKind {
    /// Complete-object destruction followed by `operator delete`.
    Deleting,
    /// Destroys the full object including virtual bases.
    Complete,
    /// Destroys members and non-virtual bases only.
    Base,
}

/// What a single initializer targets.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InitTarget {
    /// A direct or virtual base class.
    Base(ClassId),
    /// A field, by declaration index.
    Member(usize),
}

/// The initialization expression, reduced to the shapes the class code
/// generator distinguishes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InitExpr {
    /// In-place construction of the sub-object with constant arguments.
    Construct { args: Vec<i64> },
    /// Direct store of a scalar constant.
    Scalar(i64),
    /// Store of a complex constant (real, imaginary).
    Complex(i64, i64),
    /// Reference binding to a named object; no copy occurs.
    Reference(Name),
    /// Explicit zero-initialization.
    Zero,
}

/// One base or member initializer, produced by semantic analysis.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Initializer {
    pub target: InitTarget,
    pub expr: Option<InitExpr>,
}

impl Initializer {
    pub fn base(class: ClassId, expr: InitExpr) -> Self {
        Self {
            target: InitTarget::Base(class),
            expr: Some(expr),
        }
    }

    pub fn member(field: usize, expr: InitExpr) -> Self {
        Self {
            target: InitTarget::Member(field),
            expr: Some(expr),
        }
    }
}

/// A constructor definition: the class it belongs to and its validated
/// initializer list in written order.
#[derive(Clone, Debug)]
pub struct Constructor {
    pub class: ClassId,
    pub inits: Vec<Initializer>,
}

impl Constructor {
    pub fn new(class: ClassId) -> Self {
        Self {
            class,
            inits: Vec::new(),
        }
    }

    pub fn with_inits(class: ClassId, inits: Vec<Initializer>) -> Self {
        Self { class, inits }
    }
}
