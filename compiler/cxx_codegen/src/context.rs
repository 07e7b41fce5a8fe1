//! Code generation context and per-function state.
//!
//! `CodegenCx` holds everything shared across the functions generated for
//! one compilation unit: the class arena, the layout tables, and the
//! helper caches. It is passed down explicitly through every emission
//! call; there is no global state, so generating different classes from
//! different contexts is safe.

use cxx_ast::{ClassArena, ClassDescriptor, ClassId, CtorKind, DtorKind, StringInterner};
use cxx_ir::{Function, HelperId, ValueId};
use cxx_layout::{ModuleLayout, RecordLayout};
use rustc_hash::FxHashMap;

use crate::Result;

/// Per-compilation-unit configuration.
#[derive(Copy, Clone, Debug)]
pub struct CodegenOptions {
    /// Whether to emit exception cleanups for partially-constructed
    /// objects. Mirrors `-fexceptions`.
    pub exceptions: bool,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self { exceptions: true }
    }
}

/// Per-compilation-unit code generation context.
pub struct CodegenCx<'a> {
    pub arena: &'a ClassArena,
    pub layouts: &'a ModuleLayout,
    pub interner: &'a StringInterner,
    pub options: CodegenOptions,
    /// Synthesized helper functions (array destructor thunks).
    helpers: Vec<Function>,
    /// Dedup cache: one helper per (element class, length).
    helper_cache: FxHashMap<(ClassId, u64), HelperId>,
}

impl<'a> CodegenCx<'a> {
    pub fn new(
        arena: &'a ClassArena,
        layouts: &'a ModuleLayout,
        interner: &'a StringInterner,
    ) -> Self {
        Self {
            arena,
            layouts,
            interner,
            options: CodegenOptions::default(),
            helpers: Vec::new(),
            helper_cache: FxHashMap::default(),
        }
    }

    pub fn with_options(mut self, options: CodegenOptions) -> Self {
        self.options = options;
        self
    }

    #[inline]
    pub fn class(&self, id: ClassId) -> &ClassDescriptor {
        self.arena.get(id)
    }

    #[inline]
    pub fn layout(&self, id: ClassId) -> Result<&RecordLayout> {
        Ok(self.layouts.layout(id)?)
    }

    pub fn class_name(&self, id: ClassId) -> &'static str {
        self.interner.lookup(self.class(id).name)
    }

    /// Whether constructing/destroying a base sub-object of this class
    /// requires a VTT.
    pub fn needs_vtt(&self, class: ClassId) -> bool {
        !self.class(class).vbases.is_empty()
    }

    /// Symbol name for a constructor variant, Itanium-style.
    pub fn ctor_symbol(&self, class: ClassId, kind: CtorKind) -> String {
        let variant = match kind {
            CtorKind::Complete => "C1",
            CtorKind::Base => "C2",
        };
        format!("{}::{variant}", self.class_name(class))
    }

    /// Symbol name for a destructor variant, Itanium-style.
    pub fn dtor_symbol(&self, class: ClassId, kind: DtorKind) -> String {
        let variant = match kind {
            DtorKind::Deleting => "D0",
            DtorKind::Complete => "D1",
            DtorKind::Base => "D2",
        };
        format!("{}::{variant}", self.class_name(class))
    }

    /// Look up a previously-synthesized array destructor helper.
    pub fn cached_helper(&self, elem: ClassId, len: u64) -> Option<HelperId> {
        self.helper_cache.get(&(elem, len)).copied()
    }

    /// Register a newly-synthesized helper and return its id.
    pub fn add_helper(&mut self, elem: ClassId, len: u64, func: Function) -> HelperId {
        let id = HelperId::from_index(u32::try_from(self.helpers.len()).unwrap_or(u32::MAX));
        self.helpers.push(func);
        self.helper_cache.insert((elem, len), id);
        id
    }

    /// Index the next helper will receive; used for `__tcf_N` naming.
    pub fn next_helper_index(&self) -> usize {
        self.helpers.len()
    }

    pub fn helper(&self, id: HelperId) -> &Function {
        &self.helpers[id.index()]
    }

    pub fn helpers(&self) -> &[Function] {
        &self.helpers
    }
}

/// State of the function currently being generated.
///
/// Carries what VTT plumbing needs to know: which class the function
/// belongs to and its own VTT parameter, present only on base-variant
/// constructors/destructors of classes with virtual bases.
#[derive(Copy, Clone, Debug)]
pub struct FnCtx {
    pub class: ClassId,
    pub vtt_param: Option<ValueId>,
}

impl FnCtx {
    pub fn new(class: ClassId) -> Self {
        Self {
            class,
            vtt_param: None,
        }
    }

    pub fn with_vtt(class: ClassId, vtt_param: ValueId) -> Self {
        Self {
            class,
            vtt_param: Some(vtt_param),
        }
    }
}
