use crate::{ParameterClass, PassId, ShaderStage};
use std::fmt;
use thiserror::Error;

/// Errors produced while preparing or applying an effect pass.
///
/// Every variant except [`EffectError::Binding`] means the effect was put together incorrectly
/// and applying it again will fail the same way. A binding error is reported by the graphics API
/// after an upload; bindings written before it in the same apply call are kept.
#[derive(Debug, Error)]
pub enum EffectError {
    #[error("effect `{effect}` has no technique {technique}")]
    MissingTechnique { effect: String, technique: usize },

    #[error("effect `{effect}` has no {pass}")]
    MissingPass { effect: String, pass: PassId },

    #[error("pass `{pass}` of effect `{effect}` holds a {actual:?} shader in its {slot:?} slot")]
    StageMismatch {
        effect: String,
        pass: String,
        slot: ShaderStage,
        actual: ShaderStage,
    },

    #[error("{stage:?} shader of pass `{pass}` reads constant buffer {index}, effect `{effect}` has {available}")]
    MissingConstantBuffer {
        effect: String,
        pass: String,
        stage: ShaderStage,
        index: usize,
        available: usize,
    },

    #[error("constant buffer `{buffer}` of effect `{effect}` lists parameter {index}, effect has {available}")]
    MissingParameter {
        effect: String,
        buffer: String,
        index: usize,
        available: usize,
    },

    #[error("{stage:?} sampler of pass `{pass}` samples `{parameter}`, effect `{effect}` has no such parameter")]
    UnknownSamplerParameter {
        effect: String,
        pass: String,
        stage: ShaderStage,
        parameter: String,
    },

    #[error("{stage:?} sampler of pass `{pass}` samples `{parameter}` which holds no texture ({class:?})")]
    NotATexture {
        effect: String,
        pass: String,
        stage: ShaderStage,
        parameter: String,
        class: ParameterClass,
    },

    #[error("{stage:?} parameter `{parameter}` of pass `{pass}` (effect `{effect}`) is a {class:?} holding a texture")]
    ParameterDataMismatch {
        effect: String,
        pass: String,
        stage: ShaderStage,
        parameter: String,
        class: ParameterClass,
    },

    #[error("{stage:?} {kind} slot {index} is out of range (device has {capacity})")]
    SlotOutOfRange {
        stage: ShaderStage,
        kind: SlotKind,
        index: usize,
        capacity: usize,
    },

    #[error("no program for pass `{pass}` of effect `{effect}`")]
    Program {
        effect: String,
        pass: String,
        #[source]
        source: ProgramError,
    },

    #[error("uploading `{parameter}` for the {stage:?} stage of pass `{pass}` (effect `{effect}`) failed")]
    Binding {
        effect: String,
        pass: String,
        stage: ShaderStage,
        parameter: String,
        #[source]
        source: ApiError,
    },

    #[error("effect `{effect}` redirected {from} to {to}, which asked for another redirect")]
    RedirectLoop { effect: String, from: PassId, to: PassId },
}

/// Failure to turn a shader pair into a GPU program.
#[derive(Debug, Clone, Error)]
pub enum ProgramError {
    #[error("cannot create program object: {0}")]
    Create(String),

    #[error("{stage:?} shader failed to compile:\n{log}")]
    Compile { stage: ShaderStage, log: String },

    #[error("program failed to link:\n{0}")]
    Link(String),

    #[error("shader pair has neither a vertex nor a pixel shader")]
    Empty,
}

/// An error code reported by the graphics API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{name} (0x{code:04X})")]
pub struct ApiError {
    pub code: u32,
    pub name: &'static str,
}

/// Which per-stage slot array an index was written into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    Texture,
    SamplerState,
    ConstantBuffer,
}

impl fmt::Display for SlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SlotKind::Texture => "texture",
            SlotKind::SamplerState => "sampler state",
            SlotKind::ConstantBuffer => "constant buffer",
        })
    }
}
