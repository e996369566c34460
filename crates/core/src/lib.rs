mod apply;
mod data;
mod device;
mod effect;
mod error;
mod metadata;
mod parameter;
mod shader;
mod state;

pub use apply::uniform_for;
pub use data::*;
pub use device::{DirtyFlags, GraphicsDevice, Slots, StageSlots, Uniform};
pub use effect::{ApplyOutcome, Effect, EffectHook, HookContext, Pass, PassId, Technique};
pub use error::{ApiError, EffectError, ProgramError, SlotKind};
pub use metadata::{PassMetadata, ResolvedSampler, StageMetadata};
pub use parameter::{ConstantBuffer, Parameter, ParameterClass, ParameterCollection, ParameterData, RESERVED_POSITION_FIXUP};
pub use shader::{SamplerBinding, Shader, ShaderId, ShaderPair, ShaderStage};
pub use state::*;
