//! Module-wide layout and vtable-layout tables.

use cxx_ast::{ArrayLen, ClassArena, ClassId, FieldType};
use rustc_hash::FxHashMap;

use crate::{LayoutError, RecordLayout, POINTER_SIZE};

fn align_up(value: u64, align: u64) -> u64 {
    value.div_ceil(align) * align
}

/// All layout facts for one compilation unit.
///
/// Owns per-class [`RecordLayout`]s plus the vtable-side tables: address
/// points keyed by `(complete class, sub-object class, offset)`,
/// virtual-base offset slot indices keyed by `(derived, vbase)`, and
/// sub-VTT indices keyed by `(class, direct base)`. Immutable after
/// [`ModuleLayout::compute`].
pub struct ModuleLayout {
    layouts: Vec<RecordLayout>,
    address_points: FxHashMap<(ClassId, ClassId, u64), u64>,
    vbase_slots: FxHashMap<(ClassId, ClassId), i64>,
    sub_vtt_indices: FxHashMap<(ClassId, ClassId), u64>,
}

impl ModuleLayout {
    /// Lay out every class in the arena.
    ///
    /// Arena allocation order guarantees bases precede derived classes,
    /// so a single forward pass sees every dependency already laid out.
    pub fn compute(arena: &ClassArena) -> Self {
        let mut this = Self {
            layouts: Vec::with_capacity(arena.len()),
            address_points: FxHashMap::default(),
            vbase_slots: FxHashMap::default(),
            sub_vtt_indices: FxHashMap::default(),
        };

        for (id, class) in arena.iter() {
            let mut layout = RecordLayout::new(id);
            let mut offset = 0u64;

            if class.is_dynamic() {
                // Hidden vtable pointer at offset zero.
                offset = POINTER_SIZE;
            }

            for base in class.non_virtual_bases() {
                offset = align_up(offset, POINTER_SIZE);
                layout.set_base_offset(base, offset);
                offset += this.layouts[base.index()].nv_size;
            }

            for field in &class.fields {
                offset = align_up(offset, POINTER_SIZE);
                layout.push_field_offset(offset);
                offset += this.field_size(field.ty);
            }

            layout.nv_size = offset.max(1);

            // Virtual bases are placed once each, at the end of the
            // complete object, in closure discovery order.
            let mut total = align_up(layout.nv_size, POINTER_SIZE);
            for &vbase in &class.vbases {
                layout.set_vbase_offset(vbase, total);
                total += align_up(this.layouts[vbase.index()].nv_size, POINTER_SIZE);
            }
            layout.size = if class.vbases.is_empty() {
                layout.nv_size
            } else {
                total
            };

            this.layouts.push(layout);
        }

        this.compute_vtable_tables(arena);
        this
    }

    fn field_size(&self, ty: FieldType) -> u64 {
        match ty {
            FieldType::Scalar { size } | FieldType::Complex { size } => size,
            FieldType::Reference => POINTER_SIZE,
            FieldType::Class(id) => self.layouts[id.index()].size,
            FieldType::Array {
                elem,
                len: ArrayLen::Fixed(n),
            } => self.layouts[elem.index()].size * n,
            // Rejected upstream; occupies no space in the toy layout.
            FieldType::Array {
                len: ArrayLen::Variable,
                ..
            } => 0,
        }
    }

    fn compute_vtable_tables(&mut self, arena: &ClassArena) {
        for (id, class) in arena.iter() {
            // Virtual-base offset slots sit at fixed negative vtable
            // indices, assigned in closure order.
            for (i, &vbase) in class.vbases.iter().enumerate() {
                self.vbase_slots.insert((id, vbase), -(i as i64 + 3));
            }

            // Sub-VTT indices for bases whose construction needs a VTT.
            if !class.vbases.is_empty() {
                let mut next = 1u64;
                for spec in &class.bases {
                    if !arena.get(spec.class).vbases.is_empty() {
                        self.sub_vtt_indices.insert((id, spec.class), next);
                        next += 1;
                    }
                }
                for &vbase in &class.vbases {
                    if !arena.get(vbase).vbases.is_empty()
                        && !self.sub_vtt_indices.contains_key(&(id, vbase))
                    {
                        self.sub_vtt_indices.insert((id, vbase), next);
                        next += 1;
                    }
                }
            }

            if !class.is_dynamic() {
                continue;
            }

            // Address points, assigned in the exact order the installer
            // visits sub-objects: each virtual base at its complete-object
            // offset, then the non-virtual hierarchy depth-first with the
            // class itself last at each level.
            let mut next_slot = 0u64;
            for &vbase in &class.vbases {
                let offset = self.layouts[id.index()]
                    .vbase_offset(vbase)
                    .unwrap_or_default();
                self.assign_address_points(arena, id, vbase, offset, &mut next_slot);
            }
            self.assign_address_points(arena, id, id, 0, &mut next_slot);
        }
    }

    fn assign_address_points(
        &mut self,
        arena: &ClassArena,
        complete: ClassId,
        current: ClassId,
        offset: u64,
        next_slot: &mut u64,
    ) {
        if !arena.get(current).is_dynamic() {
            return;
        }
        for base in arena.get(current).non_virtual_bases() {
            let base_offset = self.layouts[current.index()]
                .base_offset(base)
                .unwrap_or_default();
            self.assign_address_points(arena, complete, base, offset + base_offset, next_slot);
        }
        self.address_points
            .entry((complete, current, offset))
            .or_insert_with(|| {
                let slot = *next_slot;
                *next_slot += 1;
                slot
            });
    }

    /// The record layout of a class.
    pub fn layout(&self, class: ClassId) -> Result<&RecordLayout, LayoutError> {
        self.layouts
            .get(class.index())
            .ok_or(LayoutError::MissingLayout(class))
    }

    /// Vtable slot of the address point for `sub` at `offset` within the
    /// complete object `complete`.
    pub fn address_point(
        &self,
        complete: ClassId,
        sub: ClassId,
        offset: u64,
    ) -> Result<u64, LayoutError> {
        self.address_points
            .get(&(complete, sub, offset))
            .copied()
            .ok_or(LayoutError::MissingAddressPoint {
                complete,
                sub,
                offset,
            })
    }

    /// Fixed vtable slot holding the byte offset of `vbase` relative to
    /// an object of (runtime) type `class`.
    pub fn vbase_slot(&self, class: ClassId, vbase: ClassId) -> Result<i64, LayoutError> {
        self.vbase_slots
            .get(&(class, vbase))
            .copied()
            .ok_or(LayoutError::MissingVBaseSlot { class, vbase })
    }

    /// Index of `base`'s sub-VTT within `class`'s VTT.
    pub fn sub_vtt_index(&self, class: ClassId, base: ClassId) -> Result<u64, LayoutError> {
        self.sub_vtt_indices
            .get(&(class, base))
            .copied()
            .ok_or(LayoutError::MissingSubVttIndex { class, base })
    }
}
