use glfx_core::{ImageData, ImageFormat};
use glow::{
    CLAMP_TO_EDGE, HasContext, LINEAR, PixelUnpackData, R8, RED, RGB, RGB8, RGBA, RGBA8, TEXTURE_2D,
    TEXTURE_MAG_FILTER, TEXTURE_MAX_LEVEL, TEXTURE_MIN_FILTER, TEXTURE_WRAP_S, TEXTURE_WRAP_T, UNPACK_ALIGNMENT, UNSIGNED_BYTE,
};

pub struct GlTexture<T: HasContext> {
    texture: T::Texture,
    width: u32,
    height: u32,
}

impl<T: HasContext> GlTexture<T> {
    /// Upload `data` into a new 2D texture. The caller checks the data length.
    pub fn new(gl: &T, data: ImageData) -> Result<Self, String> {
        unsafe {
            let texture = gl.create_texture()?;

            gl.bind_texture(TEXTURE_2D, Some(texture));

            gl.tex_parameter_i32(TEXTURE_2D, TEXTURE_MIN_FILTER, LINEAR as _);
            gl.tex_parameter_i32(TEXTURE_2D, TEXTURE_MAG_FILTER, LINEAR as _);
            gl.tex_parameter_i32(TEXTURE_2D, TEXTURE_WRAP_T, CLAMP_TO_EDGE as _);
            gl.tex_parameter_i32(TEXTURE_2D, TEXTURE_WRAP_S, CLAMP_TO_EDGE as _);
            gl.tex_parameter_i32(TEXTURE_2D, TEXTURE_MAX_LEVEL, 0);

            gl.pixel_store_i32(UNPACK_ALIGNMENT, 1);
            gl.tex_image_2d(
                TEXTURE_2D,
                0,
                match data.format {
                    ImageFormat::R8 => R8 as _,
                    ImageFormat::RGB8 => RGB8 as _,
                    ImageFormat::RGBA8 => RGBA8 as _,
                },
                data.width as _,
                data.height as _,
                0,
                match data.format {
                    ImageFormat::R8 => RED as _,
                    ImageFormat::RGB8 => RGB as _,
                    ImageFormat::RGBA8 => RGBA as _,
                },
                UNSIGNED_BYTE,
                PixelUnpackData::Slice(Some(data.data)),
            );

            gl.bind_texture(TEXTURE_2D, None);

            Ok(Self {
                texture,
                width: data.width,
                height: data.height,
            })
        }
    }

    pub fn texture(&self) -> T::Texture {
        self.texture
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn delete(self, gl: &T) {
        unsafe {
            gl.delete_texture(self.texture);
        }
    }
}
