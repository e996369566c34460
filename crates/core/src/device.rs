use crate::{
    ApiError, BlendState, DepthStencilState, EffectError, ProgramError, RasterizerState, SamplerState, Shader,
    ShaderStage, SlotKind, Texture,
};
use std::rc::Rc;

/// The graphics device a pass is applied to.
///
/// Backends implement this the way they see fit; the pass applier only relies on the call
/// contract below. All calls happen on the thread that owns the device.
pub trait GraphicsDevice {
    /// Handle to a linked program. Cheap to clone.
    type Program: Clone;

    /// Location of a uniform inside a [`GraphicsDevice::Program`].
    type Location;

    /// Return the program for a shader pair, building it on first request.
    ///
    /// Implementations own the program cache and must hand back the same program for every
    /// request with the same [`ShaderPair`](crate::ShaderPair).
    fn program(&mut self, vertex: Option<&Shader>, pixel: Option<&Shader>) -> Result<Self::Program, ProgramError>;

    /// Make `program` the active program.
    fn use_program(&mut self, program: &Self::Program);

    /// Look up a uniform by name. `None` if the program does not use it.
    fn uniform_location(&mut self, program: &Self::Program, name: &str) -> Option<Self::Location>;

    /// Upload a value into the active program.
    fn upload_uniform(&mut self, location: &Self::Location, uniform: Uniform<'_>);

    /// Pop the error the API recorded since the last call, if any.
    fn take_error(&mut self) -> Option<ApiError>;

    fn stage_mut(&mut self, stage: ShaderStage) -> &mut StageSlots;

    fn set_rasterizer_state(&mut self, state: &RasterizerState);

    fn set_blend_state(&mut self, state: &BlendState);

    fn set_depth_stencil_state(&mut self, state: &DepthStencilState);
}

/// A single uniform upload call.
///
/// The slice is the parameter's whole value. How many components the backend reads is decided by
/// the variant, not by the slice length.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Uniform<'a> {
    /// `values.len()` single floats.
    Scalar(&'a [f32]),
    Vector2(&'a [f32]),
    Vector3(&'a [f32]),
    Vector4(&'a [f32]),
    /// One 4x4 matrix, not transposed.
    Matrix4(&'a [f32]),
}

/// Per-slot dirty bits.
#[derive(Clone, Debug)]
pub struct DirtyFlags {
    flags: Vec<bool>,
}

impl DirtyFlags {
    pub fn new(capacity: usize) -> Self {
        Self {
            flags: vec![false; capacity],
        }
    }

    pub fn capacity(&self) -> usize {
        self.flags.len()
    }

    /// Returns `false` if `index` is past the capacity.
    pub fn mark(&mut self, index: usize) -> bool {
        match self.flags.get_mut(index) {
            Some(flag) => {
                *flag = true;
                true
            }
            None => false,
        }
    }

    pub fn is_dirty(&self, index: usize) -> bool {
        self.flags.get(index).copied().unwrap_or(false)
    }

    pub fn clear(&mut self, index: usize) {
        if let Some(flag) = self.flags.get_mut(index) {
            *flag = false;
        }
    }

    pub fn any(&self) -> bool {
        self.flags.iter().any(|x| *x)
    }

    /// Clear every flag, yielding the indices that were set.
    pub fn drain(&mut self) -> impl Iterator<Item = usize> + '_ {
        self.flags
            .iter_mut()
            .enumerate()
            .filter_map(|(index, flag)| std::mem::take(flag).then_some(index))
    }
}

/// Fixed-capacity slot array that remembers which slots changed since the last flush.
#[derive(Clone, Debug)]
pub struct Slots<T> {
    slots: Vec<Option<T>>,
    dirty: DirtyFlags,
}

impl<T> Slots<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: std::iter::repeat_with(|| None).take(capacity).collect(),
            dirty: DirtyFlags::new(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Store `value` and mark the slot dirty. Returns `false` if `index` is past the capacity.
    pub fn set(&mut self, index: usize, value: Option<T>) -> bool {
        match self.slots.get_mut(index) {
            Some(slot) => {
                *slot = value;
                self.dirty.mark(index)
            }
            None => false,
        }
    }

    pub fn is_dirty(&self, index: usize) -> bool {
        self.dirty.is_dirty(index)
    }

    pub fn clear_dirty(&mut self, index: usize) {
        self.dirty.clear(index);
    }

    /// Clear the dirty bits, yielding the indices that were dirty together with their contents.
    pub fn drain_dirty(&mut self) -> impl Iterator<Item = (usize, Option<&T>)> + '_ {
        let slots = &self.slots;
        self.dirty.drain().map(move |index| (index, slots[index].as_ref()))
    }
}

/// Shader-stage state of a device: active shader, texture and sampler slots, constant buffers
/// waiting to be rebound.
#[derive(Clone, Debug)]
pub struct StageSlots {
    stage: ShaderStage,
    pub shader: Option<Rc<Shader>>,
    pub textures: Slots<Texture>,
    pub sampler_states: Slots<SamplerState>,
    pub constant_buffers: DirtyFlags,
}

impl StageSlots {
    pub fn new(stage: ShaderStage, texture_slots: usize, constant_buffer_slots: usize) -> Self {
        Self {
            stage,
            shader: None,
            textures: Slots::new(texture_slots),
            sampler_states: Slots::new(texture_slots),
            constant_buffers: DirtyFlags::new(constant_buffer_slots),
        }
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    pub fn set_texture(&mut self, slot: usize, texture: Option<Texture>) -> Result<(), EffectError> {
        let capacity = self.textures.capacity();
        if self.textures.set(slot, texture) {
            Ok(())
        } else {
            Err(self.out_of_range(SlotKind::Texture, slot, capacity))
        }
    }

    pub fn set_sampler_state(&mut self, slot: usize, state: SamplerState) -> Result<(), EffectError> {
        let capacity = self.sampler_states.capacity();
        if self.sampler_states.set(slot, Some(state)) {
            Ok(())
        } else {
            Err(self.out_of_range(SlotKind::SamplerState, slot, capacity))
        }
    }

    /// Flag a constant buffer slot as needing to be rebound before the next draw.
    pub fn mark_constant_buffer(&mut self, slot: usize) -> Result<(), EffectError> {
        if self.constant_buffers.mark(slot) {
            Ok(())
        } else {
            Err(self.out_of_range(SlotKind::ConstantBuffer, slot, self.constant_buffers.capacity()))
        }
    }

    fn out_of_range(&self, kind: SlotKind, index: usize, capacity: usize) -> EffectError {
        EffectError::SlotOutOfRange {
            stage: self.stage,
            kind,
            index,
            capacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_clears_and_reports_dirty_slots() {
        let mut slots = Slots::new(4);
        assert!(slots.set(1, Some(Texture(7))));
        assert!(slots.set(3, None));
        assert!(!slots.set(4, Some(Texture(1))));

        let drained = slots.drain_dirty().map(|(index, value)| (index, value.copied())).collect::<Vec<_>>();
        assert_eq!(drained, vec![(1, Some(Texture(7))), (3, None)]);
        assert!(!slots.is_dirty(1));
        assert_eq!(slots.get(1), Some(&Texture(7)));
    }

    #[test]
    fn clearing_one_slot_keeps_the_others_dirty() {
        let mut slots = Slots::new(3);
        slots.set(0, Some(Texture(1)));
        slots.set(2, Some(Texture(2)));

        slots.clear_dirty(0);
        slots.clear_dirty(7);

        assert!(!slots.is_dirty(0));
        assert!(slots.is_dirty(2));
        assert_eq!(slots.get(0), Some(&Texture(1)));
    }

    #[test]
    fn out_of_range_slot_is_reported() {
        let mut stage = StageSlots::new(ShaderStage::Pixel, 2, 2);

        assert!(stage.set_texture(1, Some(Texture(1))).is_ok());
        assert!(matches!(
            stage.set_texture(2, Some(Texture(1))),
            Err(EffectError::SlotOutOfRange {
                kind: SlotKind::Texture,
                index: 2,
                capacity: 2,
                ..
            })
        ));
        assert!(matches!(
            stage.mark_constant_buffer(5),
            Err(EffectError::SlotOutOfRange {
                kind: SlotKind::ConstantBuffer,
                ..
            })
        ));
    }
}
