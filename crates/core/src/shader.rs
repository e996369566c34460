use crate::SamplerState;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SHADER_ID: AtomicU64 = AtomicU64::new(1);

/// Pipeline stage a shader runs in.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Pixel,
}

/// Process-unique identity of a [`Shader`].
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ShaderId(pub u64);

/// Identity of a (vertex, pixel) shader combination. Compiled programs are cached by it.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct ShaderPair {
    pub vertex: Option<ShaderId>,
    pub pixel: Option<ShaderId>,
}

impl ShaderPair {
    pub fn new(vertex: Option<&Shader>, pixel: Option<&Shader>) -> Self {
        Self {
            vertex: vertex.map(Shader::id),
            pixel: pixel.map(Shader::id),
        }
    }
}

/// A shader-declared association between a texture parameter and a texture/sampler slot pair.
#[derive(Clone, Debug, PartialEq)]
pub struct SamplerBinding {
    /// Name of the effect parameter holding the texture.
    pub parameter: String,
    /// Name of the sampler uniform inside the shader source.
    pub uniform: String,
    pub texture_slot: usize,
    pub sampler_slot: usize,
    /// Sampler state forced by the shader, if any.
    pub state: Option<SamplerState>,
}

impl SamplerBinding {
    pub fn new(parameter: impl Into<String>, uniform: impl Into<String>, slot: usize) -> Self {
        Self {
            parameter: parameter.into(),
            uniform: uniform.into(),
            texture_slot: slot,
            sampler_slot: slot,
            state: None,
        }
    }

    pub fn with_state(mut self, state: SamplerState) -> Self {
        self.state = Some(state);
        self
    }
}

/// One compiled stage of an effect.
///
/// The source is opaque to the core; backends turn pairs of shaders into programs. Besides the
/// source a shader declares which constant buffers of its effect it reads and which textures it
/// samples.
#[derive(Debug)]
pub struct Shader {
    id: ShaderId,
    stage: ShaderStage,
    source: String,
    constant_buffers: Vec<usize>,
    samplers: Vec<SamplerBinding>,
}

impl Shader {
    pub fn new(stage: ShaderStage, source: impl Into<String>) -> Self {
        Self {
            id: ShaderId(NEXT_SHADER_ID.fetch_add(1, Ordering::Relaxed)),
            stage,
            source: source.into(),
            constant_buffers: Vec::new(),
            samplers: Vec::new(),
        }
    }

    pub fn vertex(source: impl Into<String>) -> Self {
        Self::new(ShaderStage::Vertex, source)
    }

    pub fn pixel(source: impl Into<String>) -> Self {
        Self::new(ShaderStage::Pixel, source)
    }

    /// Declare that this shader reads the effect's constant buffer at `index`.
    pub fn with_constant_buffer(mut self, index: usize) -> Self {
        self.constant_buffers.push(index);
        self
    }

    pub fn with_sampler(mut self, sampler: SamplerBinding) -> Self {
        self.samplers.push(sampler);
        self
    }

    pub fn id(&self) -> ShaderId {
        self.id
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn constant_buffers(&self) -> &[usize] {
        &self.constant_buffers
    }

    pub fn samplers(&self) -> &[SamplerBinding] {
        &self.samplers
    }
}
