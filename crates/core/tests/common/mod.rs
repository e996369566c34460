#![allow(dead_code)]

use glfx_core::*;
use std::{collections::HashMap, rc::Rc};

/// A call the device received, in order.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    UseProgram(u32),
    Upload { name: String, upload: Upload },
    Rasterizer(RasterizerState),
    Blend(BlendState),
    DepthStencil(DepthStencilState),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Upload {
    Scalar(Vec<f32>),
    Vector2(Vec<f32>),
    Vector3(Vec<f32>),
    Vector4(Vec<f32>),
    Matrix4(Vec<f32>),
}

/// A device that records everything the applier does to it.
pub struct RecordingDevice {
    pub events: Vec<Event>,
    pub programs: HashMap<ShaderPair, u32>,
    pub compilations: usize,
    pub vertex: StageSlots,
    pub pixel: StageSlots,
    /// Uniform names the program reports as unused.
    pub inactive: Vec<String>,
    /// Report an API error right after uploading this uniform.
    pub fail_after: Option<String>,
    pending_error: Option<ApiError>,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            programs: HashMap::new(),
            compilations: 0,
            vertex: StageSlots::new(ShaderStage::Vertex, 4, 8),
            pixel: StageSlots::new(ShaderStage::Pixel, 8, 8),
            inactive: Vec::new(),
            fail_after: None,
            pending_error: None,
        }
    }

    pub fn uploads(&self) -> Vec<(String, Upload)> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::Upload { name, upload } => Some((name.clone(), upload.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn uploaded_names(&self) -> Vec<String> {
        self.uploads().into_iter().map(|(name, _)| name).collect()
    }

    pub fn render_state_events(&self) -> Vec<Event> {
        self.events
            .iter()
            .filter(|event| matches!(event, Event::Rasterizer(_) | Event::Blend(_) | Event::DepthStencil(_)))
            .cloned()
            .collect()
    }
}

impl GraphicsDevice for RecordingDevice {
    type Program = u32;
    type Location = String;

    fn program(&mut self, vertex: Option<&Shader>, pixel: Option<&Shader>) -> Result<u32, ProgramError> {
        if vertex.is_none() && pixel.is_none() {
            return Err(ProgramError::Empty);
        }

        let next = self.programs.len() as u32 + 1;
        let compilations = &mut self.compilations;
        Ok(*self.programs.entry(ShaderPair::new(vertex, pixel)).or_insert_with(|| {
            *compilations += 1;
            next
        }))
    }

    fn use_program(&mut self, program: &u32) {
        self.events.push(Event::UseProgram(*program));
    }

    fn uniform_location(&mut self, _program: &u32, name: &str) -> Option<String> {
        if self.inactive.iter().any(|x| x == name) {
            None
        } else {
            Some(name.to_owned())
        }
    }

    fn upload_uniform(&mut self, location: &String, uniform: Uniform<'_>) {
        let upload = match uniform {
            Uniform::Scalar(x) => Upload::Scalar(x.to_vec()),
            Uniform::Vector2(x) => Upload::Vector2(x.to_vec()),
            Uniform::Vector3(x) => Upload::Vector3(x.to_vec()),
            Uniform::Vector4(x) => Upload::Vector4(x.to_vec()),
            Uniform::Matrix4(x) => Upload::Matrix4(x.to_vec()),
        };

        if self.fail_after.as_deref() == Some(location.as_str()) {
            self.pending_error = Some(ApiError {
                code: 0x0502,
                name: "GL_INVALID_OPERATION",
            });
        }

        self.events.push(Event::Upload {
            name: location.clone(),
            upload,
        });
    }

    fn take_error(&mut self) -> Option<ApiError> {
        self.pending_error.take()
    }

    fn stage_mut(&mut self, stage: ShaderStage) -> &mut StageSlots {
        match stage {
            ShaderStage::Vertex => &mut self.vertex,
            ShaderStage::Pixel => &mut self.pixel,
        }
    }

    fn set_rasterizer_state(&mut self, state: &RasterizerState) {
        self.events.push(Event::Rasterizer(*state));
    }

    fn set_blend_state(&mut self, state: &BlendState) {
        self.events.push(Event::Blend(*state));
    }

    fn set_depth_stencil_state(&mut self, state: &DepthStencilState) {
        self.events.push(Event::DepthStencil(*state));
    }
}

/// A textured, lit effect:
/// - parameters `World` (matrix), `Tint` (vector 3), `Weights` (scalar array of 5),
///   `posFixup` (vector 4) and `Diffuse` (texture)
/// - constant buffer 0 (`Transforms`) holds `World` and `posFixup`, buffer 1 (`Material`) holds
///   `Tint` and `Weights`
/// - technique `Main` with a single pass reading buffer 0 in the vertex stage and buffer 1 plus
///   the `Diffuse` sampler in the pixel stage
pub fn textured_effect() -> Effect {
    let mut effect = Effect::new("Textured");

    let world = effect.add_parameter(Parameter::matrix("World", identity()));
    let tint = effect.add_parameter(Parameter::vector("Tint", &[1.0, 0.5, 0.25]));
    let weights = effect.add_parameter(Parameter::scalar_array("Weights", &[0.1, 0.2, 0.3, 0.2, 0.1]));
    let fixup = effect.add_parameter(Parameter::vector(RESERVED_POSITION_FIXUP, &[1.0, 1.0, 0.0, 0.0]));
    effect.add_parameter(Parameter::texture("Diffuse", Some(Texture(42))));

    effect.add_constant_buffer(ConstantBuffer::new("Transforms", [world, fixup]));
    effect.add_constant_buffer(ConstantBuffer::new("Material", [tint, weights]));

    let (vertex, pixel) = textured_shaders();
    effect.add_technique(
        Technique::new("Main").with_pass(
            Pass::new("P0")
                .with_vertex_shader(vertex)
                .with_pixel_shader(pixel)
                .with_rasterizer_state(RasterizerState::CULL_NONE)
                .with_blend_state(BlendState::ALPHA_BLEND)
                .with_depth_stencil_state(DepthStencilState::DEPTH_READ),
        ),
    );

    effect
}

pub fn textured_shaders() -> (Rc<Shader>, Rc<Shader>) {
    let vertex = Shader::vertex("vertex source").with_constant_buffer(0);
    let pixel = Shader::pixel("pixel source")
        .with_constant_buffer(1)
        .with_sampler(SamplerBinding::new("Diffuse", "DiffuseSampler", 0).with_state(SamplerState::POINT_CLAMP));

    (Rc::new(vertex), Rc::new(pixel))
}

pub fn identity() -> [f32; 16] {
    [
        1.0, 0.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, //
        0.0, 0.0, 0.0, 1.0,
    ]
}

pub fn main_pass() -> PassId {
    PassId::new(0, 0)
}
