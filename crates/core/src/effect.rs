use crate::{
    BlendState, ConstantBuffer, DepthStencilState, EffectError, Parameter, ParameterCollection, PassMetadata,
    RasterizerState, Shader,
};
use std::{cell::OnceCell, fmt, rc::Rc};

/// Position of a pass inside an effect.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct PassId {
    pub technique: usize,
    pub pass: usize,
}

impl PassId {
    pub fn new(technique: usize, pass: usize) -> Self {
        Self { technique, pass }
    }
}

impl fmt::Display for PassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pass {} of technique {}", self.pass, self.technique)
    }
}

/// A shader pair plus the render states to apply before a draw call.
///
/// Passes do not change once they are part of an effect. The derived [`PassMetadata`] lives on
/// the pass itself, is computed the first time the pass is initialized or applied and is dropped
/// with it.
#[derive(Debug)]
pub struct Pass {
    name: String,
    vertex_shader: Option<Rc<Shader>>,
    pixel_shader: Option<Rc<Shader>>,
    rasterizer_state: Option<RasterizerState>,
    blend_state: Option<BlendState>,
    depth_stencil_state: Option<DepthStencilState>,
    pub(crate) metadata: OnceCell<PassMetadata>,
}

impl Pass {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vertex_shader: None,
            pixel_shader: None,
            rasterizer_state: None,
            blend_state: None,
            depth_stencil_state: None,
            metadata: OnceCell::new(),
        }
    }

    pub fn with_vertex_shader(mut self, shader: Rc<Shader>) -> Self {
        self.vertex_shader = Some(shader);
        self
    }

    pub fn with_pixel_shader(mut self, shader: Rc<Shader>) -> Self {
        self.pixel_shader = Some(shader);
        self
    }

    pub fn with_rasterizer_state(mut self, state: RasterizerState) -> Self {
        self.rasterizer_state = Some(state);
        self
    }

    pub fn with_blend_state(mut self, state: BlendState) -> Self {
        self.blend_state = Some(state);
        self
    }

    pub fn with_depth_stencil_state(mut self, state: DepthStencilState) -> Self {
        self.depth_stencil_state = Some(state);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vertex_shader(&self) -> Option<&Rc<Shader>> {
        self.vertex_shader.as_ref()
    }

    pub fn pixel_shader(&self) -> Option<&Rc<Shader>> {
        self.pixel_shader.as_ref()
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

    /// The metadata derived for this pass, if it has been initialized.
    pub fn metadata(&self) -> Option<&PassMetadata> {
        self.metadata.get()
    }
}

/// An ordered group of passes.
#[derive(Debug)]
pub struct Technique {
    name: String,
    passes: Vec<Pass>,
}

impl Technique {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passes: Vec::new(),
        }
    }

    pub fn with_pass(mut self, pass: Pass) -> Self {
        self.passes.push(pass);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn passes(&self) -> &[Pass] {
        &self.passes
    }
}

/// What the pre-apply hook decided.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Apply the requested pass.
    Proceed,
    /// Apply this pass instead.
    Redirect(PassId),
}

/// Pre-apply hook of an effect.
///
/// Runs every time a pass of the effect is applied, before anything reaches the device. It may
/// update parameters, switch the current technique and substitute a different pass. A hook must
/// not redirect twice in a row: when it redirects, the hook runs again for the substitute and
/// has to answer [`ApplyOutcome::Proceed`] there.
pub trait EffectHook {
    fn on_apply(&mut self, cx: &mut HookContext<'_>) -> ApplyOutcome;
}

impl<F> EffectHook for F
where
    F: FnMut(&mut HookContext<'_>) -> ApplyOutcome,
{
    fn on_apply(&mut self, cx: &mut HookContext<'_>) -> ApplyOutcome {
        self(cx)
    }
}

/// The part of an effect a hook can see and change.
pub struct HookContext<'a> {
    pass: PassId,
    parameters: &'a mut ParameterCollection,
    current_technique: &'a mut usize,
    techniques: &'a [Technique],
}

impl<'a> HookContext<'a> {
    /// The pass being applied.
    pub fn pass(&self) -> PassId {
        self.pass
    }

    pub fn parameters(&self) -> &ParameterCollection {
        self.parameters
    }

    pub fn parameters_mut(&mut self) -> &mut ParameterCollection {
        self.parameters
    }

    pub fn current_technique(&self) -> usize {
        *self.current_technique
    }

    /// Returns `false` and leaves the current technique alone if `index` does not exist.
    pub fn set_current_technique(&mut self, index: usize) -> bool {
        if index < self.techniques.len() {
            *self.current_technique = index;
            true
        } else {
            false
        }
    }

    pub fn technique_index(&self, name: &str) -> Option<usize> {
        self.techniques.iter().position(|technique| technique.name() == name)
    }

    /// Redirect to the first pass of whatever technique is current now.
    pub fn redirect_to_current_technique(&self) -> ApplyOutcome {
        ApplyOutcome::Redirect(PassId::new(*self.current_technique, 0))
    }
}

/// The top-level container of techniques and parameters.
pub struct Effect {
    name: String,
    pub(crate) parameters: ParameterCollection,
    pub(crate) constant_buffers: Vec<ConstantBuffer>,
    pub(crate) techniques: Vec<Technique>,
    current_technique: usize,
    hook: Option<Box<dyn EffectHook>>,
}

impl Effect {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: ParameterCollection::new(),
            constant_buffers: Vec::new(),
            techniques: Vec::new(),
            current_technique: 0,
            hook: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append a parameter and return its index.
    pub fn add_parameter(&mut self, parameter: Parameter) -> usize {
        self.parameters.push(parameter)
    }

    /// Append a constant buffer and return its index.
    pub fn add_constant_buffer(&mut self, buffer: ConstantBuffer) -> usize {
        self.constant_buffers.push(buffer);
        self.constant_buffers.len() - 1
    }

    /// Append a technique and return its index.
    pub fn add_technique(&mut self, technique: Technique) -> usize {
        self.techniques.push(technique);
        self.techniques.len() - 1
    }

    pub fn set_hook(&mut self, hook: impl EffectHook + 'static) {
        self.hook = Some(Box::new(hook));
    }

    /// Closure form of [`Effect::set_hook`].
    pub fn set_hook_fn<F>(&mut self, hook: F)
    where
        F: FnMut(&mut HookContext<'_>) -> ApplyOutcome + 'static,
    {
        self.hook = Some(Box::new(hook));
    }

    pub fn clear_hook(&mut self) {
        self.hook = None;
    }

    pub fn parameters(&self) -> &ParameterCollection {
        &self.parameters
    }

    pub fn parameters_mut(&mut self) -> &mut ParameterCollection {
        &mut self.parameters
    }

    pub fn constant_buffers(&self) -> &[ConstantBuffer] {
        &self.constant_buffers
    }

    pub fn techniques(&self) -> &[Technique] {
        &self.techniques
    }

    pub fn technique_index(&self, name: &str) -> Option<usize> {
        self.techniques.iter().position(|technique| technique.name() == name)
    }

    pub fn current_technique(&self) -> usize {
        self.current_technique
    }

    pub fn set_current_technique(&mut self, index: usize) -> Result<(), EffectError> {
        if index >= self.techniques.len() {
            return Err(EffectError::MissingTechnique {
                effect: self.name.clone(),
                technique: index,
            });
        }

        self.current_technique = index;
        Ok(())
    }

    pub fn pass(&self, id: PassId) -> Option<&Pass> {
        self.techniques.get(id.technique)?.passes.get(id.pass)
    }

    pub(crate) fn pass_or_err(&self, id: PassId) -> Result<&Pass, EffectError> {
        self.pass(id).ok_or_else(|| EffectError::MissingPass {
            effect: self.name.clone(),
            pass: id,
        })
    }

    /// Run the pre-apply hook for `pass`. Effects without a hook always proceed.
    pub(crate) fn run_hook(&mut self, pass: PassId) -> ApplyOutcome {
        match self.hook.as_deref_mut() {
            Some(hook) => hook.on_apply(&mut HookContext {
                pass,
                parameters: &mut self.parameters,
                current_technique: &mut self.current_technique,
                techniques: &self.techniques,
            }),
            None => ApplyOutcome::Proceed,
        }
    }
}

impl fmt::Debug for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Effect")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .field("constant_buffers", &self.constant_buffers)
            .field("techniques", &self.techniques)
            .field("current_technique", &self.current_technique)
            .field("hook", &self.hook.is_some())
            .finish()
    }
}
