/// Texture handle.
///
/// Textures are created and owned by the graphics device; effects only hold handles to them.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct Texture(pub u64);

/// Pixel format of an image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageFormat {
    R8,
    RGB8,
    RGBA8,
}

impl ImageFormat {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            ImageFormat::R8 => 1,
            ImageFormat::RGB8 => 3,
            ImageFormat::RGBA8 => 4,
        }
    }
}

/// Image/texture data. Used for uploading textures to a device.
#[derive(Clone, Copy, Debug)]
pub struct ImageData<'a> {
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
    pub data: &'a [u8],
}

impl ImageData<'_> {
    /// Number of bytes `data` should hold for the declared size and format.
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * self.format.bytes_per_pixel()
    }
}
