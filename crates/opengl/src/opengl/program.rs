use glfx_core::{ProgramError, Shader, ShaderStage};
use glow::{FRAGMENT_SHADER, HasContext, VERTEX_SHADER};

pub struct GlProgram<T: HasContext> {
    program: T::Program,
}

impl<T: HasContext> GlProgram<T> {
    /// Compile and link the present stages of a shader pair, then point every sampler uniform the
    /// shaders declare at its texture unit.
    ///
    /// Vertex-stage samplers use the units after the first `vertex_unit_offset` ones, which belong
    /// to the pixel stage.
    pub fn compile(
        gl: &T,
        vertex: Option<&Shader>,
        pixel: Option<&Shader>,
        vertex_unit_offset: u32,
    ) -> Result<Self, ProgramError> {
        if vertex.is_none() && pixel.is_none() {
            return Err(ProgramError::Empty);
        }

        unsafe {
            let program = gl.create_program().map_err(ProgramError::Create)?;

            let mut attached = Vec::with_capacity(2);
            for shader in [vertex, pixel].into_iter().flatten() {
                match compile_stage(gl, shader) {
                    Ok(stage) => {
                        gl.attach_shader(program, stage);
                        attached.push(stage);
                    }
                    Err(err) => {
                        delete_stages(gl, program, &attached);
                        gl.delete_program(program);
                        return Err(err);
                    }
                }
            }

            gl.link_program(program);
            let linked = gl.get_program_link_status(program);
            delete_stages(gl, program, &attached);

            if !linked {
                let log = gl.get_program_info_log(program);
                gl.delete_program(program);
                return Err(ProgramError::Link(log));
            }

            let result = Self { program };
            gl.use_program(Some(program));
            if let Some(vertex) = vertex {
                result.set_texture_sampler_bindings(gl, vertex, vertex_unit_offset);
            }
            if let Some(pixel) = pixel {
                result.set_texture_sampler_bindings(gl, pixel, 0);
            }

            Ok(result)
        }
    }

    fn set_texture_sampler_bindings(&self, gl: &T, shader: &Shader, unit_offset: u32) {
        for sampler in shader.samplers() {
            unsafe {
                if let Some(location) = gl.get_uniform_location(self.program, &sampler.uniform) {
                    gl.uniform_1_i32(Some(&location), (unit_offset as usize + sampler.texture_slot) as i32);
                }
            }
        }
    }

    pub fn program(&self) -> T::Program {
        self.program
    }

    pub fn delete(self, gl: &T) {
        unsafe {
            gl.delete_program(self.program);
        }
    }
}

unsafe fn compile_stage<T: HasContext>(gl: &T, shader: &Shader) -> Result<T::Shader, ProgramError> {
    let shader_type = match shader.stage() {
        ShaderStage::Vertex => VERTEX_SHADER,
        ShaderStage::Pixel => FRAGMENT_SHADER,
    };

    unsafe {
        let stage = gl.create_shader(shader_type).map_err(ProgramError::Create)?;
        gl.shader_source(stage, shader.source());
        gl.compile_shader(stage);

        if !gl.get_shader_compile_status(stage) {
            let log = gl.get_shader_info_log(stage);
            gl.delete_shader(stage);
            return Err(ProgramError::Compile {
                stage: shader.stage(),
                log,
            });
        }

        Ok(stage)
    }
}

unsafe fn delete_stages<T: HasContext>(gl: &T, program: T::Program, stages: &[T::Shader]) {
    for &stage in stages {
        unsafe {
            gl.detach_shader(program, stage);
            gl.delete_shader(stage);
        }
    }
}
