//! Per-class record layout.

use cxx_ast::ClassId;
use rustc_hash::FxHashMap;

use crate::LayoutError;

/// Byte offsets of one class's sub-objects.
///
/// Non-virtual base offsets are relative to the class itself and never
/// depend on the runtime type. Virtual-base offsets are relative to the
/// complete object and are only meaningful when this class is the
/// most-derived type.
#[derive(Debug, Clone)]
pub struct RecordLayout {
    class: ClassId,
    /// Size of the complete object, virtual bases included.
    pub size: u64,
    /// Size of the non-virtual region (the part embedded into derived
    /// classes; excludes virtual bases).
    pub nv_size: u64,
    base_offsets: FxHashMap<ClassId, u64>,
    vbase_offsets: FxHashMap<ClassId, u64>,
    field_offsets: Vec<u64>,
}

impl RecordLayout {
    pub(crate) fn new(class: ClassId) -> Self {
        Self {
            class,
            size: 0,
            nv_size: 0,
            base_offsets: FxHashMap::default(),
            vbase_offsets: FxHashMap::default(),
            field_offsets: Vec::new(),
        }
    }

    pub(crate) fn set_base_offset(&mut self, base: ClassId, offset: u64) {
        self.base_offsets.insert(base, offset);
    }

    pub(crate) fn set_vbase_offset(&mut self, vbase: ClassId, offset: u64) {
        self.vbase_offsets.insert(vbase, offset);
    }

    pub(crate) fn push_field_offset(&mut self, offset: u64) {
        self.field_offsets.push(offset);
    }

    /// Offset of a direct non-virtual base within this class.
    pub fn base_offset(&self, base: ClassId) -> Result<u64, LayoutError> {
        self.base_offsets
            .get(&base)
            .copied()
            .ok_or(LayoutError::NotADirectBase {
                class: self.class,
                base,
            })
    }

    /// Offset of a virtual base within the complete object.
    pub fn vbase_offset(&self, vbase: ClassId) -> Result<u64, LayoutError> {
        self.vbase_offsets
            .get(&vbase)
            .copied()
            .ok_or(LayoutError::NotAVirtualBase {
                class: self.class,
                base: vbase,
            })
    }

    /// Offset of the field with the given declaration index.
    pub fn field_offset(&self, index: usize) -> u64 {
        self.field_offsets[index]
    }
}
