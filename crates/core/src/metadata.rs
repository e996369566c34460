use crate::{
    BlendState, ConstantBuffer, DepthStencilState, Effect, EffectError, ParameterClass, ParameterCollection, Pass,
    PassId, RasterizerState, SamplerState, Shader, ShaderPair, ShaderStage,
};
use std::rc::Rc;

/// A sampler binding with its parameter resolved to an index.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedSampler {
    pub parameter: usize,
    pub texture_slot: usize,
    pub sampler_slot: usize,
    pub state: Option<SamplerState>,
}

/// Everything needed to bind one shader stage of a pass.
#[derive(Clone, Debug)]
pub struct StageMetadata {
    shader: Rc<Shader>,
    parameters: Vec<usize>,
    samplers: Vec<ResolvedSampler>,
}

impl StageMetadata {
    pub fn shader(&self) -> &Rc<Shader> {
        &self.shader
    }

    /// Parameter indices of every constant buffer the shader reads, flattened in declaration
    /// order. Parameters shared by several buffers appear once per buffer.
    pub fn parameters(&self) -> &[usize] {
        &self.parameters
    }

    pub fn samplers(&self) -> &[ResolvedSampler] {
        &self.samplers
    }
}

/// Per-pass cache of everything [`Effect::apply_pass`] needs.
///
/// Derived once, the first time the pass is initialized or applied, and reused for every later
/// application of the same pass.
#[derive(Clone, Debug)]
pub struct PassMetadata {
    shaders: ShaderPair,
    vertex: Option<StageMetadata>,
    pixel: Option<StageMetadata>,
    rasterizer_state: Option<RasterizerState>,
    blend_state: Option<BlendState>,
    depth_stencil_state: Option<DepthStencilState>,
}

impl PassMetadata {
    pub fn shader_pair(&self) -> ShaderPair {
        self.shaders
    }

    pub fn stage(&self, stage: ShaderStage) -> Option<&StageMetadata> {
        match stage {
            ShaderStage::Vertex => self.vertex.as_ref(),
            ShaderStage::Pixel => self.pixel.as_ref(),
        }
    }

    pub fn vertex_shader(&self) -> Option<&Rc<Shader>> {
        self.vertex.as_ref().map(StageMetadata::shader)
    }

    pub fn pixel_shader(&self) -> Option<&Rc<Shader>> {
        self.pixel.as_ref().map(StageMetadata::shader)
    }

    pub fn rasterizer_state(&self) -> Option<&RasterizerState> {
        self.rasterizer_state.as_ref()
    }

    pub fn blend_state(&self) -> Option<&BlendState> {
        self.blend_state.as_ref()
    }

    pub fn depth_stencil_state(&self) -> Option<&DepthStencilState> {
        self.depth_stencil_state.as_ref()
    }
}

impl Effect {
    /// Prepare every pass of every technique for application.
    pub fn initialize(&self) -> Result<(), EffectError> {
        for (technique_index, technique) in self.techniques.iter().enumerate() {
            for pass_index in 0..technique.passes().len() {
                self.initialize_pass(PassId::new(technique_index, pass_index))?;
            }
        }

        Ok(())
    }

    /// Derive the metadata of a pass if it has not been derived yet, and return it.
    ///
    /// Nothing is sent to the device. Calling this again for the same pass returns the same
    /// metadata without touching the effect.
    pub fn initialize_pass(&self, id: PassId) -> Result<&PassMetadata, EffectError> {
        let pass = self.pass_or_err(id)?;
        if let Some(metadata) = pass.metadata.get() {
            return Ok(metadata);
        }

        let metadata = Derive {
            effect: self.name(),
            parameters: &self.parameters,
            constant_buffers: &self.constant_buffers,
            pass,
        }
        .run()?;

        log::debug!(
            "derived metadata for pass `{}` ({id}) of effect `{}`: {} vertex / {} pixel parameters",
            pass.name(),
            self.name(),
            metadata.vertex.as_ref().map_or(0, |x| x.parameters.len()),
            metadata.pixel.as_ref().map_or(0, |x| x.parameters.len()),
        );

        Ok(pass.metadata.get_or_init(|| metadata))
    }
}

struct Derive<'a> {
    effect: &'a str,
    parameters: &'a ParameterCollection,
    constant_buffers: &'a [ConstantBuffer],
    pass: &'a Pass,
}

impl<'a> Derive<'a> {
    fn run(&self) -> Result<PassMetadata, EffectError> {
        let vertex = self.pass.vertex_shader().cloned();
        let pixel = self.pass.pixel_shader().cloned();

        Ok(PassMetadata {
            shaders: ShaderPair::new(vertex.as_deref(), pixel.as_deref()),
            vertex: vertex.map(|shader| self.stage(ShaderStage::Vertex, shader)).transpose()?,
            pixel: pixel.map(|shader| self.stage(ShaderStage::Pixel, shader)).transpose()?,
            rasterizer_state: self.pass.rasterizer_state().copied(),
            blend_state: self.pass.blend_state().copied(),
            depth_stencil_state: self.pass.depth_stencil_state().copied(),
        })
    }

    fn stage(&self, slot: ShaderStage, shader: Rc<Shader>) -> Result<StageMetadata, EffectError> {
        if shader.stage() != slot {
            return Err(EffectError::StageMismatch {
                effect: self.effect.to_owned(),
                pass: self.pass.name().to_owned(),
                slot,
                actual: shader.stage(),
            });
        }

        let mut parameters = Vec::new();
        for &index in shader.constant_buffers() {
            let buffer = self
                .constant_buffers
                .get(index)
                .ok_or_else(|| EffectError::MissingConstantBuffer {
                    effect: self.effect.to_owned(),
                    pass: self.pass.name().to_owned(),
                    stage: slot,
                    index,
                    available: self.constant_buffers.len(),
                })?;

            for &parameter in buffer.parameters() {
                if parameter >= self.parameters.len() {
                    return Err(EffectError::MissingParameter {
                        effect: self.effect.to_owned(),
                        buffer: buffer.name().to_owned(),
                        index: parameter,
                        available: self.parameters.len(),
                    });
                }

                parameters.push(parameter);
            }
        }

        let samplers = shader
            .samplers()
            .iter()
            .map(|sampler| {
                let parameter = self.parameters.index_of(&sampler.parameter).ok_or_else(|| {
                    EffectError::UnknownSamplerParameter {
                        effect: self.effect.to_owned(),
                        pass: self.pass.name().to_owned(),
                        stage: slot,
                        parameter: sampler.parameter.clone(),
                    }
                })?;

                let class = self.parameters[parameter].class();
                if class != ParameterClass::Object {
                    return Err(EffectError::NotATexture {
                        effect: self.effect.to_owned(),
                        pass: self.pass.name().to_owned(),
                        stage: slot,
                        parameter: sampler.parameter.clone(),
                        class,
                    });
                }

                Ok(ResolvedSampler {
                    parameter,
                    texture_slot: sampler.texture_slot,
                    sampler_slot: sampler.sampler_slot,
                    state: sampler.state,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(StageMetadata {
            shader,
            parameters,
            samplers,
        })
    }
}
