use super::GlProgram;
use glfx_core::{ProgramError, Shader, ShaderPair};
use glow::HasContext;
use std::collections::HashMap;

/// Linked programs keyed by the shader pair they were built from.
pub struct GlProgramCache<T: HasContext> {
    programs: HashMap<ShaderPair, GlProgram<T>>,
    vertex_unit_offset: u32,
    compilations: usize,
}

impl<T: HasContext> GlProgramCache<T> {
    pub fn new(vertex_unit_offset: u32) -> Self {
        Self {
            programs: HashMap::new(),
            vertex_unit_offset,
            compilations: 0,
        }
    }

    /// Number of programs built so far. Failed builds are not counted.
    pub fn compilations(&self) -> usize {
        self.compilations
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    /// Return the cached program for the pair, linking it first if this is the first request.
    /// The second value is `true` when a program was built by this call.
    pub fn get_or_compile(
        &mut self,
        gl: &T,
        vertex: Option<&Shader>,
        pixel: Option<&Shader>,
    ) -> Result<(T::Program, bool), ProgramError> {
        let key = ShaderPair::new(vertex, pixel);
        if let Some(program) = self.programs.get(&key) {
            return Ok((program.program(), false));
        }

        let program = GlProgram::compile(gl, vertex, pixel, self.vertex_unit_offset).inspect_err(|err| {
            log::warn!("failed to build program for {key:?}: {err}");
        })?;

        log::debug!("built program for {key:?}");
        self.compilations += 1;

        let handle = program.program();
        self.programs.insert(key, program);
        Ok((handle, true))
    }

    /// Drop a cached program, e.g. after one of its shaders was discarded.
    pub fn remove(&mut self, gl: &T, key: ShaderPair) -> bool {
        match self.programs.remove(&key) {
            Some(program) => {
                program.delete(gl);
                true
            }
            None => false,
        }
    }

    pub fn delete(self, gl: &T) {
        for (_, program) in self.programs {
            program.delete(gl);
        }
    }
}
