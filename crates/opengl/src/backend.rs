use crate::opengl::{
    GlProgramCache, GlTexture, apply_blend, apply_depth_stencil, apply_rasterizer, apply_sampler, check_error,
    enable_debug,
};
use glfx_core::*;
use glow::HasContext;
use slotmap::{DefaultKey, Key, KeyData, SlotMap};
use std::ffi::CStr;

pub use crate::opengl::GlInfo as OpenGlInfo;
pub type OpenGlNativeDevice = OpenGlDevice<glow::Context>;

/// Texture units per stage. GL 3.0 and GLES 3.0 guarantee 16 fragment and 32 combined units.
const MAX_STAGE_TEXTURE_UNITS: u32 = 16;

/// A `glfx` graphics device that uses OpenGL.
pub struct OpenGlDevice<T: HasContext> {
    programs: GlProgramCache<T>,
    textures: SlotMap<DefaultKey, GlTexture<T>>,

    vertex: StageSlots,
    pixel: StageSlots,

    current_program: Option<T::Program>,
    current_rasterizer: Option<RasterizerState>,
    current_blend: Option<BlendState>,
    current_depth_stencil: Option<DepthStencilState>,

    position_fixup: [f32; 4],
    position_fixup_program: Option<T::Program>,

    gl_context: T,
    gl_info: OpenGlInfo,
    options: OpenGlOptions,

    scratch: Vec<usize>,
}

#[derive(Debug, Clone, Copy)]
pub struct OpenGlOptions {
    /// Query `glGetError` after every uniform upload.
    pub check_errors: bool,
    /// Route GL debug output to `log`.
    pub debug_output: bool,
    pub constant_buffer_slots: usize,
}

impl Default for OpenGlOptions {
    fn default() -> Self {
        Self {
            check_errors: true,
            debug_output: cfg!(debug_assertions),
            constant_buffer_slots: 16,
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum OpenGlError {
    #[error("unsupported OpenGL version {}.{}", .info.version.0, .info.version.1)]
    UnsupportedVersion { info: OpenGlInfo },
    #[error("unknown texture handle {0:?}")]
    UnknownTexture(Texture),
    #[error("image data holds {actual} bytes, expected {expected}")]
    InvalidImageData { expected: usize, actual: usize },
    #[error("failed to create texture: {0}")]
    CreateTexture(String),
}

impl OpenGlDevice<glow::Context> {
    /// Creates a new OpenGL device from a given loader function
    /// (a function that takes a GL function name and returns a pointer to that function).
    ///
    /// #### Requirements
    /// `glfx` requires at least OpenGL v3.0 or OpenGL ES v3.0.
    /// An older desktop context is accepted if `ARB_framebuffer_object` is present.
    ///
    /// #### Error Conditions
    /// - If the version is not supported [`OpenGlError::UnsupportedVersion`] is returned.
    ///
    /// #### Safety
    /// This function should be called only if the OpenGL context is currently active for the current thread.
    pub unsafe fn new<F>(loader: F) -> Result<Self, OpenGlError>
    where
        F: FnMut(&CStr) -> *const std::os::raw::c_void,
    {
        unsafe { Self::from_glow(glow::Context::from_loader_function_cstr(loader)) }
    }
}

impl<T: HasContext> OpenGlDevice<T> {
    /// Creates a new OpenGL device from a given `glow` context with default options.
    ///
    /// See [`OpenGlDevice::new`] for more details.
    pub unsafe fn from_glow(gl_context: T) -> Result<Self, OpenGlError> {
        unsafe { Self::from_glow_with_options(gl_context, OpenGlOptions::default()) }
    }

    /// Creates a new OpenGL device from a given `glow` context.
    ///
    /// #### Safety
    /// This function should be called only if the OpenGL context is currently active for the current thread.
    pub unsafe fn from_glow_with_options(mut gl_context: T, options: OpenGlOptions) -> Result<Self, OpenGlError> {
        let gl_info = OpenGlInfo::query(&gl_context);

        if !gl_info.is_baseline_supported() {
            return Err(OpenGlError::UnsupportedVersion { info: gl_info });
        }

        if options.debug_output {
            enable_debug(&mut gl_context);
        }

        let pixel_units = gl_info.max_texture_units.min(MAX_STAGE_TEXTURE_UNITS);
        let vertex_units = gl_info.max_vertex_texture_units.min(MAX_STAGE_TEXTURE_UNITS);

        log::debug!(
            "opengl {}.{} ({}), {pixel_units} pixel and {vertex_units} vertex texture units",
            gl_info.version.0,
            gl_info.version.1,
            gl_info.vendor,
        );

        Ok(Self {
            programs: GlProgramCache::new(pixel_units),
            textures: SlotMap::with_key(),

            vertex: StageSlots::new(ShaderStage::Vertex, vertex_units as usize, options.constant_buffer_slots),
            pixel: StageSlots::new(ShaderStage::Pixel, pixel_units as usize, options.constant_buffer_slots),

            current_program: None,
            current_rasterizer: None,
            current_blend: None,
            current_depth_stencil: None,

            position_fixup: [1.0, 1.0, 0.0, 0.0],
            position_fixup_program: None,

            gl_context,
            gl_info,
            options,

            scratch: Vec::new(),
        })
    }

    pub fn info(&self) -> &OpenGlInfo {
        &self.gl_info
    }

    pub fn context(&self) -> &T {
        &self.gl_context
    }

    /// Number of programs linked so far.
    pub fn compilations(&self) -> usize {
        self.programs.compilations()
    }

    pub fn cached_programs(&self) -> usize {
        self.programs.len()
    }

    /// Drop the cached program of a shader pair. Returns `false` if none was cached.
    pub fn evict_program(&mut self, key: ShaderPair) -> bool {
        // the evicted program may be the bound one
        self.current_program = None;
        self.position_fixup_program = None;
        self.programs.remove(&self.gl_context, key)
    }

    /// Set the value uploaded to the reserved `posFixup` uniform whenever a program is used.
    pub fn set_position_fixup(&mut self, value: [f32; 4]) {
        self.position_fixup = value;
        self.position_fixup_program = None;
    }

    /// Forget every piece of GL state this device assumes is current, e.g. after foreign code
    /// touched the context. Everything is sent again on the next apply and flush.
    pub fn invalidate_state(&mut self) {
        self.current_program = None;
        self.current_rasterizer = None;
        self.current_blend = None;
        self.current_depth_stencil = None;
        self.position_fixup_program = None;

        for slots in [&mut self.vertex, &mut self.pixel] {
            for slot in 0..slots.textures.capacity() {
                let texture = slots.textures.get(slot).copied();
                slots.textures.set(slot, texture);
            }
            for slot in 0..slots.sampler_states.capacity() {
                let state = slots.sampler_states.get(slot).copied();
                slots.sampler_states.set(slot, state);
            }
        }
    }

    pub fn create_texture(&mut self, data: ImageData) -> Result<Texture, OpenGlError> {
        let expected = data.expected_len();
        if data.data.len() != expected {
            return Err(OpenGlError::InvalidImageData {
                expected,
                actual: data.data.len(),
            });
        }

        let texture = GlTexture::new(&self.gl_context, data).map_err(OpenGlError::CreateTexture)?;
        let id = self.textures.insert(texture);

        Ok(Texture(id.data().as_ffi()))
    }

    /// Delete a texture. Slots still holding the handle fail the next [`OpenGlDevice::flush`].
    pub fn delete_texture(&mut self, texture: Texture) -> bool {
        match self.textures.remove(KeyData::from_ffi(texture.0).into()) {
            Some(texture) => {
                texture.delete(&self.gl_context);
                true
            }
            None => false,
        }
    }

    pub fn texture_size(&self, texture: Texture) -> Option<(u32, u32)> {
        self.textures
            .get(KeyData::from_ffi(texture.0).into())
            .map(GlTexture::size)
    }

    /// Bind the texture slots that changed since the last flush and configure their sampling.
    ///
    /// Pixel-stage slot `n` is texture unit `n`; vertex-stage slots follow the pixel-stage units.
    /// Call before issuing a draw. A slot holding an unknown texture stays dirty and the first such
    /// handle is reported after every other slot has been bound.
    pub fn flush(&mut self) -> Result<(), OpenGlError> {
        let pixel_units = self.pixel.textures.capacity() as u32;
        let anisotropy = self.gl_info.is_anisotropic_filtering_supported();
        let lod_bias = self.gl_info.is_lod_bias_supported();

        let gl = &self.gl_context;
        let textures = &self.textures;
        let mut result = Ok(());

        for (slots, unit_offset) in [(&mut self.pixel, 0), (&mut self.vertex, pixel_units)] {
            let stage = flush_slots(slots, &mut self.scratch, |slot, texture, state| unsafe {
                gl.active_texture(glow::TEXTURE0 + unit_offset + slot as u32);

                let Some(handle) = texture else {
                    gl.bind_texture(glow::TEXTURE_2D, None);
                    return Ok(());
                };

                let Some(texture) = textures.get(KeyData::from_ffi(handle.0).into()) else {
                    return Err(OpenGlError::UnknownTexture(handle));
                };

                gl.bind_texture(glow::TEXTURE_2D, Some(texture.texture()));

                if let Some(state) = state {
                    apply_sampler(gl, state, anisotropy, lod_bias);
                }

                Ok(())
            });

            result = result.and(stage);
        }

        unsafe {
            gl.active_texture(glow::TEXTURE0);
        }

        result
    }

    /// Delete all the resources associated with the OpenGL device.
    ///
    /// #### Safety
    /// This function should be called only if the OpenGL context is currently active for the current thread.
    pub unsafe fn delete(self) {
        self.programs.delete(&self.gl_context);

        for (_, texture) in self.textures.into_iter() {
            texture.delete(&self.gl_context);
        }
    }

    fn upload_position_fixup(&mut self, program: T::Program) {
        if self.position_fixup_program == Some(program) {
            return;
        }

        unsafe {
            if let Some(location) = self.gl_context.get_uniform_location(program, RESERVED_POSITION_FIXUP) {
                self.gl_context.uniform_4_f32_slice(Some(&location), &self.position_fixup);
            }
        }

        self.position_fixup_program = Some(program);
    }
}

impl<T: HasContext> GraphicsDevice for OpenGlDevice<T> {
    type Program = T::Program;
    type Location = T::UniformLocation;

    fn program(&mut self, vertex: Option<&Shader>, pixel: Option<&Shader>) -> Result<T::Program, ProgramError> {
        let (program, built) = self.programs.get_or_compile(&self.gl_context, vertex, pixel)?;
        if built {
            // linking leaves the new program bound
            self.current_program = Some(program);
        }

        Ok(program)
    }

    fn use_program(&mut self, program: &T::Program) {
        if self.current_program != Some(*program) {
            unsafe {
                self.gl_context.use_program(Some(*program));
            }
            self.current_program = Some(*program);
        }

        self.upload_position_fixup(*program);
    }

    fn uniform_location(&mut self, program: &T::Program, name: &str) -> Option<T::UniformLocation> {
        unsafe { self.gl_context.get_uniform_location(*program, name) }
    }

    fn upload_uniform(&mut self, location: &T::UniformLocation, uniform: Uniform<'_>) {
        let gl = &self.gl_context;
        let location = Some(location);

        unsafe {
            match uniform {
                Uniform::Scalar(values) => gl.uniform_1_f32_slice(location, values),
                Uniform::Vector2(values) => gl.uniform_2_f32_slice(location, &components::<2>(values)),
                Uniform::Vector3(values) => gl.uniform_3_f32_slice(location, &components::<3>(values)),
                Uniform::Vector4(values) => gl.uniform_4_f32_slice(location, &components::<4>(values)),
                Uniform::Matrix4(values) => {
                    gl.uniform_matrix_4_f32_slice(location, false, &components::<16>(values))
                }
            }
        }
    }

    fn take_error(&mut self) -> Option<ApiError> {
        if self.options.check_errors {
            check_error(&self.gl_context)
        } else {
            None
        }
    }

    fn stage_mut(&mut self, stage: ShaderStage) -> &mut StageSlots {
        match stage {
            ShaderStage::Vertex => &mut self.vertex,
            ShaderStage::Pixel => &mut self.pixel,
        }
    }

    fn set_rasterizer_state(&mut self, state: &RasterizerState) {
        if self.current_rasterizer.as_ref() != Some(state) {
            apply_rasterizer(&self.gl_context, state, self.gl_info.is_polygon_mode_supported());
            self.current_rasterizer = Some(*state);
        }
    }

    fn set_blend_state(&mut self, state: &BlendState) {
        if self.current_blend.as_ref() != Some(state) {
            apply_blend(&self.gl_context, state);
            self.current_blend = Some(*state);
        }
    }

    fn set_depth_stencil_state(&mut self, state: &DepthStencilState) {
        if self.current_depth_stencil.as_ref() != Some(state) {
            apply_depth_stencil(&self.gl_context, state);
            self.current_depth_stencil = Some(*state);
        }
    }
}

/// Hand every dirty slot of a stage to `bind`, in slot order. A slot's dirty bits are cleared
/// only once `bind` accepts it; the first error is returned after all slots were visited.
fn flush_slots<E>(
    slots: &mut StageSlots,
    scratch: &mut Vec<usize>,
    mut bind: impl FnMut(usize, Option<Texture>, Option<&SamplerState>) -> Result<(), E>,
) -> Result<(), E> {
    scratch.clear();
    scratch.extend(
        (0..slots.textures.capacity())
            .filter(|&slot| slots.textures.is_dirty(slot) || slots.sampler_states.is_dirty(slot)),
    );

    let mut result = Ok(());
    for &slot in scratch.iter() {
        match bind(slot, slots.textures.get(slot).copied(), slots.sampler_states.get(slot)) {
            Ok(()) => {
                slots.textures.clear_dirty(slot);
                slots.sampler_states.clear_dirty(slot);
            }
            Err(err) => result = result.and(Err(err)),
        }
    }

    result
}

/// The first `N` values, zero-padded when the parameter holds fewer.
fn components<const N: usize>(values: &[f32]) -> [f32; N] {
    let mut result = [0.0; N];
    let len = values.len().min(N);
    result[..len].copy_from_slice(&values[..len]);
    result
}
