//! Render and sampler state descriptions.
//!
//! These are plain values. A pass carries an optional copy of each render state, `None` meaning
//! the pass leaves whatever the device currently has.

/// Which faces get culled.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum CullMode {
    None,
    CullClockwiseFace,
    CullCounterClockwiseFace,
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum FillMode {
    Solid,
    WireFrame,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RasterizerState {
    pub cull_mode: CullMode,
    pub fill_mode: FillMode,
    pub scissor_test_enable: bool,
    pub depth_bias: f32,
    pub slope_scale_depth_bias: f32,
}

impl RasterizerState {
    pub const CULL_NONE: Self = Self::with_cull(CullMode::None);
    pub const CULL_CLOCKWISE: Self = Self::with_cull(CullMode::CullClockwiseFace);
    pub const CULL_COUNTER_CLOCKWISE: Self = Self::with_cull(CullMode::CullCounterClockwiseFace);

    const fn with_cull(cull_mode: CullMode) -> Self {
        Self {
            cull_mode,
            fill_mode: FillMode::Solid,
            scissor_test_enable: false,
            depth_bias: 0.0,
            slope_scale_depth_bias: 0.0,
        }
    }
}

impl Default for RasterizerState {
    fn default() -> Self {
        Self::CULL_COUNTER_CLOCKWISE
    }
}

/// A blend factor.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum Blend {
    One,
    Zero,
    SourceColor,
    InverseSourceColor,
    SourceAlpha,
    InverseSourceAlpha,
    DestinationColor,
    InverseDestinationColor,
    DestinationAlpha,
    InverseDestinationAlpha,
    BlendFactor,
    InverseBlendFactor,
    SourceAlphaSaturation,
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum BlendFunction {
    Add,
    Subtract,
    ReverseSubtract,
    Min,
    Max,
}

bitflags::bitflags! {
    /// Colour channels the blend stage writes.
    #[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
    pub struct ColorWriteChannels: u8 {
        const RED = 1 << 0;
        const GREEN = 1 << 1;
        const BLUE = 1 << 2;
        const ALPHA = 1 << 3;
        const ALL = Self::RED.bits() | Self::GREEN.bits() | Self::BLUE.bits() | Self::ALPHA.bits();
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlendState {
    pub color_source_blend: Blend,
    pub color_destination_blend: Blend,
    pub color_blend_function: BlendFunction,
    pub alpha_source_blend: Blend,
    pub alpha_destination_blend: Blend,
    pub alpha_blend_function: BlendFunction,
    pub blend_factor: [f32; 4],
    pub color_write_channels: ColorWriteChannels,
}

impl BlendState {
    pub const OPAQUE: Self = Self::with_blend(Blend::One, Blend::Zero);
    pub const ALPHA_BLEND: Self = Self::with_blend(Blend::One, Blend::InverseSourceAlpha);
    pub const ADDITIVE: Self = Self::with_blend(Blend::SourceAlpha, Blend::One);
    pub const NON_PREMULTIPLIED: Self = Self::with_blend(Blend::SourceAlpha, Blend::InverseSourceAlpha);

    const fn with_blend(source: Blend, destination: Blend) -> Self {
        Self {
            color_source_blend: source,
            color_destination_blend: destination,
            color_blend_function: BlendFunction::Add,
            alpha_source_blend: source,
            alpha_destination_blend: destination,
            alpha_blend_function: BlendFunction::Add,
            blend_factor: [1.0; 4],
            color_write_channels: ColorWriteChannels::ALL,
        }
    }

    /// Whether this state writes the source colour through unchanged, so blending can be disabled.
    pub fn is_opaque(&self) -> bool {
        self.color_source_blend == Blend::One
            && self.color_destination_blend == Blend::Zero
            && self.color_blend_function == BlendFunction::Add
            && self.alpha_source_blend == Blend::One
            && self.alpha_destination_blend == Blend::Zero
            && self.alpha_blend_function == BlendFunction::Add
    }
}

impl Default for BlendState {
    fn default() -> Self {
        Self::OPAQUE
    }
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum CompareFunction {
    Always,
    Never,
    Less,
    LessEqual,
    Equal,
    GreaterEqual,
    Greater,
    NotEqual,
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum StencilOperation {
    Keep,
    Zero,
    Replace,
    Increment,
    Decrement,
    IncrementSaturation,
    DecrementSaturation,
    Invert,
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct DepthStencilState {
    pub depth_buffer_enable: bool,
    pub depth_buffer_write_enable: bool,
    pub depth_buffer_function: CompareFunction,
    pub stencil_enable: bool,
    pub stencil_function: CompareFunction,
    pub stencil_pass: StencilOperation,
    pub stencil_fail: StencilOperation,
    pub stencil_depth_buffer_fail: StencilOperation,
    pub reference_stencil: i32,
    pub stencil_mask: u32,
    pub stencil_write_mask: u32,
}

impl DepthStencilState {
    pub const DEFAULT: Self = Self::with_depth(true, true);
    pub const DEPTH_READ: Self = Self::with_depth(true, false);
    pub const NONE: Self = Self::with_depth(false, false);

    const fn with_depth(enable: bool, write: bool) -> Self {
        Self {
            depth_buffer_enable: enable,
            depth_buffer_write_enable: write,
            depth_buffer_function: CompareFunction::LessEqual,
            stencil_enable: false,
            stencil_function: CompareFunction::Always,
            stencil_pass: StencilOperation::Keep,
            stencil_fail: StencilOperation::Keep,
            stencil_depth_buffer_fail: StencilOperation::Keep,
            reference_stencil: 0,
            stencil_mask: u32::MAX,
            stencil_write_mask: u32::MAX,
        }
    }
}

impl Default for DepthStencilState {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum TextureFilter {
    Linear,
    Point,
    Anisotropic,
    LinearMipPoint,
    PointMipLinear,
    MinLinearMagPointMipLinear,
    MinLinearMagPointMipPoint,
    MinPointMagLinearMipLinear,
    MinPointMagLinearMipPoint,
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum TextureAddressMode {
    Wrap,
    Clamp,
    Mirror,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SamplerState {
    pub filter: TextureFilter,
    pub address_u: TextureAddressMode,
    pub address_v: TextureAddressMode,
    pub address_w: TextureAddressMode,
    pub max_anisotropy: u32,
    pub max_mip_level: u32,
    pub mip_map_level_of_detail_bias: f32,
}

impl SamplerState {
    pub const LINEAR_CLAMP: Self = Self::with(TextureFilter::Linear, TextureAddressMode::Clamp);
    pub const LINEAR_WRAP: Self = Self::with(TextureFilter::Linear, TextureAddressMode::Wrap);
    pub const POINT_CLAMP: Self = Self::with(TextureFilter::Point, TextureAddressMode::Clamp);
    pub const POINT_WRAP: Self = Self::with(TextureFilter::Point, TextureAddressMode::Wrap);
    pub const ANISOTROPIC_CLAMP: Self = Self::with(TextureFilter::Anisotropic, TextureAddressMode::Clamp);
    pub const ANISOTROPIC_WRAP: Self = Self::with(TextureFilter::Anisotropic, TextureAddressMode::Wrap);

    const fn with(filter: TextureFilter, address: TextureAddressMode) -> Self {
        Self {
            filter,
            address_u: address,
            address_v: address,
            address_w: address,
            max_anisotropy: 4,
            max_mip_level: 0,
            mip_map_level_of_detail_bias: 0.0,
        }
    }
}

impl Default for SamplerState {
    fn default() -> Self {
        Self::LINEAR_WRAP
    }
}
