use glfx_core::{
    Blend, BlendFunction, BlendState, ColorWriteChannels, CompareFunction, CullMode, DepthStencilState, FillMode,
    RasterizerState, SamplerState, StencilOperation, TextureAddressMode, TextureFilter,
};
use glow::HasContext;

// not exported by every glow build; same value for the EXT, ARB and core 4.6 names
const TEXTURE_MAX_ANISOTROPY: u32 = 0x84FE;

pub fn apply_rasterizer(gl: &impl HasContext, state: &RasterizerState, polygon_mode: bool) {
    unsafe {
        match state.cull_mode {
            CullMode::None => gl.disable(glow::CULL_FACE),
            mode => {
                gl.enable(glow::CULL_FACE);
                gl.cull_face(glow::BACK);
                gl.front_face(gl_front_face(mode));
            }
        }

        if polygon_mode {
            let mode = match state.fill_mode {
                FillMode::Solid => glow::FILL,
                FillMode::WireFrame => glow::LINE,
            };
            gl.polygon_mode(glow::FRONT_AND_BACK, mode);
        }

        set_enabled(gl, glow::SCISSOR_TEST, state.scissor_test_enable);

        if state.depth_bias != 0.0 || state.slope_scale_depth_bias != 0.0 {
            gl.enable(glow::POLYGON_OFFSET_FILL);
            gl.polygon_offset(state.slope_scale_depth_bias, state.depth_bias);
        } else {
            gl.disable(glow::POLYGON_OFFSET_FILL);
        }
    }
}

pub fn apply_blend(gl: &impl HasContext, state: &BlendState) {
    unsafe {
        set_enabled(gl, glow::BLEND, !state.is_opaque());

        gl.blend_func_separate(
            gl_blend(state.color_source_blend),
            gl_blend(state.color_destination_blend),
            gl_blend(state.alpha_source_blend),
            gl_blend(state.alpha_destination_blend),
        );
        gl.blend_equation_separate(
            gl_blend_function(state.color_blend_function),
            gl_blend_function(state.alpha_blend_function),
        );

        let [r, g, b, a] = state.blend_factor;
        gl.blend_color(r, g, b, a);

        let channels = state.color_write_channels;
        gl.color_mask(
            channels.contains(ColorWriteChannels::RED),
            channels.contains(ColorWriteChannels::GREEN),
            channels.contains(ColorWriteChannels::BLUE),
            channels.contains(ColorWriteChannels::ALPHA),
        );
    }
}

pub fn apply_depth_stencil(gl: &impl HasContext, state: &DepthStencilState) {
    unsafe {
        set_enabled(gl, glow::DEPTH_TEST, state.depth_buffer_enable);
        gl.depth_mask(state.depth_buffer_write_enable);
        gl.depth_func(gl_compare(state.depth_buffer_function));

        set_enabled(gl, glow::STENCIL_TEST, state.stencil_enable);
        if state.stencil_enable {
            gl.stencil_func(
                gl_compare(state.stencil_function),
                state.reference_stencil,
                state.stencil_mask,
            );
            gl.stencil_op(
                gl_stencil_op(state.stencil_fail),
                gl_stencil_op(state.stencil_depth_buffer_fail),
                gl_stencil_op(state.stencil_pass),
            );
            gl.stencil_mask(state.stencil_write_mask);
        }
    }
}

/// Configure the texture bound to `TEXTURE_2D` on the active unit.
///
/// Textures hold a single level, so `max_mip_level` has nothing to select and is not sent.
pub fn apply_sampler(gl: &impl HasContext, state: &SamplerState, anisotropy: bool, lod_bias: bool) {
    let (min, mag) = gl_filter(state.filter);

    unsafe {
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, min as _);
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, mag as _);
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, gl_wrap(state.address_u) as _);
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, gl_wrap(state.address_v) as _);
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_R, gl_wrap(state.address_w) as _);

        if anisotropy {
            let value = match state.filter {
                TextureFilter::Anisotropic => state.max_anisotropy.max(1) as f32,
                _ => 1.0,
            };
            gl.tex_parameter_f32(glow::TEXTURE_2D, TEXTURE_MAX_ANISOTROPY, value);
        }

        if lod_bias {
            gl.tex_parameter_f32(glow::TEXTURE_2D, glow::TEXTURE_LOD_BIAS, state.mip_map_level_of_detail_bias);
        }
    }
}

unsafe fn set_enabled(gl: &impl HasContext, capability: u32, enabled: bool) {
    unsafe {
        if enabled {
            gl.enable(capability);
        } else {
            gl.disable(capability);
        }
    }
}

/// Culled faces are always the back faces; the winding that counts as front is flipped instead.
pub fn gl_front_face(mode: CullMode) -> u32 {
    match mode {
        CullMode::CullClockwiseFace => glow::CCW,
        CullMode::None | CullMode::CullCounterClockwiseFace => glow::CW,
    }
}

pub fn gl_blend(blend: Blend) -> u32 {
    match blend {
        Blend::One => glow::ONE,
        Blend::Zero => glow::ZERO,
        Blend::SourceColor => glow::SRC_COLOR,
        Blend::InverseSourceColor => glow::ONE_MINUS_SRC_COLOR,
        Blend::SourceAlpha => glow::SRC_ALPHA,
        Blend::InverseSourceAlpha => glow::ONE_MINUS_SRC_ALPHA,
        Blend::DestinationColor => glow::DST_COLOR,
        Blend::InverseDestinationColor => glow::ONE_MINUS_DST_COLOR,
        Blend::DestinationAlpha => glow::DST_ALPHA,
        Blend::InverseDestinationAlpha => glow::ONE_MINUS_DST_ALPHA,
        Blend::BlendFactor => glow::CONSTANT_COLOR,
        Blend::InverseBlendFactor => glow::ONE_MINUS_CONSTANT_COLOR,
        Blend::SourceAlphaSaturation => glow::SRC_ALPHA_SATURATE,
    }
}

pub fn gl_blend_function(function: BlendFunction) -> u32 {
    match function {
        BlendFunction::Add => glow::FUNC_ADD,
        BlendFunction::Subtract => glow::FUNC_SUBTRACT,
        BlendFunction::ReverseSubtract => glow::FUNC_REVERSE_SUBTRACT,
        BlendFunction::Min => glow::MIN,
        BlendFunction::Max => glow::MAX,
    }
}

pub fn gl_compare(function: CompareFunction) -> u32 {
    match function {
        CompareFunction::Always => glow::ALWAYS,
        CompareFunction::Never => glow::NEVER,
        CompareFunction::Less => glow::LESS,
        CompareFunction::LessEqual => glow::LEQUAL,
        CompareFunction::Equal => glow::EQUAL,
        CompareFunction::GreaterEqual => glow::GEQUAL,
        CompareFunction::Greater => glow::GREATER,
        CompareFunction::NotEqual => glow::NOTEQUAL,
    }
}

pub fn gl_stencil_op(operation: StencilOperation) -> u32 {
    match operation {
        StencilOperation::Keep => glow::KEEP,
        StencilOperation::Zero => glow::ZERO,
        StencilOperation::Replace => glow::REPLACE,
        StencilOperation::Increment => glow::INCR_WRAP,
        StencilOperation::Decrement => glow::DECR_WRAP,
        StencilOperation::IncrementSaturation => glow::INCR,
        StencilOperation::DecrementSaturation => glow::DECR,
        StencilOperation::Invert => glow::INVERT,
    }
}

/// Minification and magnification filters.
pub fn gl_filter(filter: TextureFilter) -> (u32, u32) {
    match filter {
        TextureFilter::Linear | TextureFilter::Anisotropic => (glow::LINEAR_MIPMAP_LINEAR, glow::LINEAR),
        TextureFilter::Point => (glow::NEAREST_MIPMAP_NEAREST, glow::NEAREST),
        TextureFilter::LinearMipPoint => (glow::LINEAR_MIPMAP_NEAREST, glow::LINEAR),
        TextureFilter::PointMipLinear => (glow::NEAREST_MIPMAP_LINEAR, glow::NEAREST),
        TextureFilter::MinLinearMagPointMipLinear => (glow::LINEAR_MIPMAP_LINEAR, glow::NEAREST),
        TextureFilter::MinLinearMagPointMipPoint => (glow::LINEAR_MIPMAP_NEAREST, glow::NEAREST),
        TextureFilter::MinPointMagLinearMipLinear => (glow::NEAREST_MIPMAP_LINEAR, glow::LINEAR),
        TextureFilter::MinPointMagLinearMipPoint => (glow::NEAREST_MIPMAP_NEAREST, glow::LINEAR),
    }
}

pub fn gl_wrap(mode: TextureAddressMode) -> u32 {
    match mode {
        TextureAddressMode::Wrap => glow::REPEAT,
        TextureAddressMode::Clamp => glow::CLAMP_TO_EDGE,
        TextureAddressMode::Mirror => glow::MIRRORED_REPEAT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cull_modes_pick_front_winding() {
        assert_eq!(gl_front_face(CullMode::CullClockwiseFace), glow::CCW);
        assert_eq!(gl_front_face(CullMode::CullCounterClockwiseFace), glow::CW);
    }

    #[test]
    fn saturating_and_wrapping_stencil_ops_differ() {
        assert_eq!(gl_stencil_op(StencilOperation::Increment), glow::INCR_WRAP);
        assert_eq!(gl_stencil_op(StencilOperation::IncrementSaturation), glow::INCR);
        assert_eq!(gl_stencil_op(StencilOperation::Decrement), glow::DECR_WRAP);
    }

    #[test]
    fn point_filter_is_nearest() {
        assert_eq!(gl_filter(TextureFilter::Point), (glow::NEAREST_MIPMAP_NEAREST, glow::NEAREST));
        assert_eq!(gl_filter(SamplerState::ANISOTROPIC_CLAMP.filter).1, glow::LINEAR);
        assert_eq!(gl_wrap(SamplerState::POINT_CLAMP.address_u), glow::CLAMP_TO_EDGE);
    }

    #[test]
    fn alpha_blend_factors() {
        let state = BlendState::ALPHA_BLEND;
        assert_eq!(gl_blend(state.color_source_blend), glow::ONE);
        assert_eq!(gl_blend(state.color_destination_blend), glow::ONE_MINUS_SRC_ALPHA);
        assert!(!state.is_opaque());
        assert!(BlendState::OPAQUE.is_opaque());
    }
}
