use glow::{HasContext, MAX_TEXTURE_IMAGE_UNITS, MAX_VERTEX_TEXTURE_IMAGE_UNITS};
use std::collections::HashSet;

#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct GlInfo {
    pub version: (u32, u32),
    pub is_gles: bool,

    pub vendor: String,
    pub extensions: HashSet<String>,

    pub max_texture_units: u32,
    pub max_vertex_texture_units: u32,
}

impl GlInfo {
    pub fn query(gl: &impl HasContext) -> Self {
        unsafe {
            let version = gl.version();
            let max_texture_units = gl.get_parameter_i32(MAX_TEXTURE_IMAGE_UNITS as _) as u32;
            let max_vertex_texture_units = gl.get_parameter_i32(MAX_VERTEX_TEXTURE_IMAGE_UNITS as _) as u32;

            Self {
                version: (version.major, version.minor),
                is_gles: version.is_embedded,

                vendor: version.vendor_info.clone(),
                extensions: gl.supported_extensions().clone(),

                max_texture_units,
                max_vertex_texture_units,
            }
        }
    }

    pub(crate) fn is_baseline_supported(&self) -> bool {
        if self.is_gles {
            self.version >= (3, 0)
        } else {
            self.version >= (3, 0) || self.extensions.contains("GL_ARB_framebuffer_object")
        }
    }

    pub(crate) fn is_polygon_mode_supported(&self) -> bool {
        !self.is_gles
    }

    pub(crate) fn is_lod_bias_supported(&self) -> bool {
        !self.is_gles
    }

    pub(crate) fn is_anisotropic_filtering_supported(&self) -> bool {
        self.extensions.contains("GL_EXT_texture_filter_anisotropic")
            || self.extensions.contains("GL_ARB_texture_filter_anisotropic")
            || (self.version >= (4, 6) && !self.is_gles)
    }
}
