use crate::{
    ApplyOutcome, Effect, EffectError, GraphicsDevice, Parameter, ParameterClass, ParameterCollection, ParameterData,
    PassId, PassMetadata, RESERVED_POSITION_FIXUP, ShaderStage, StageMetadata, Uniform,
};

impl Effect {
    /// Apply a pass to `device`: pick the program for its shader pair, bind textures and
    /// parameters of each present stage, then set its render states.
    ///
    /// The effect's hook runs first and may substitute another pass, which is then applied in
    /// place of the requested one. At most one substitution happens per call; a hook that
    /// redirects again for the substitute yields [`EffectError::RedirectLoop`].
    ///
    /// On error the device keeps whatever was bound before the failure.
    pub fn apply_pass<D: GraphicsDevice>(&mut self, pass: PassId, device: &mut D) -> Result<(), EffectError> {
        let mut target = pass;
        let mut redirected = false;

        loop {
            self.initialize_pass(target)?;

            match self.run_hook(target) {
                ApplyOutcome::Proceed => break,
                ApplyOutcome::Redirect(next) if !redirected => {
                    log::trace!("effect `{}` redirected {target} to {next}", self.name());
                    redirected = true;
                    target = next;
                }
                ApplyOutcome::Redirect(next) => {
                    return Err(EffectError::RedirectLoop {
                        effect: self.name().to_owned(),
                        from: target,
                        to: next,
                    });
                }
            }
        }

        let metadata = self.initialize_pass(target)?;
        let pass_name = self.pass_or_err(target)?.name();

        let binder = Binder {
            effect: self.name(),
            pass: pass_name,
            parameters: &self.parameters,
        };

        binder.apply(device, metadata)
    }
}

struct Binder<'a> {
    effect: &'a str,
    pass: &'a str,
    parameters: &'a ParameterCollection,
}

impl Binder<'_> {
    fn apply<D: GraphicsDevice>(&self, device: &mut D, metadata: &PassMetadata) -> Result<(), EffectError> {
        let vertex = metadata.vertex_shader().map(|x| x.as_ref());
        let pixel = metadata.pixel_shader().map(|x| x.as_ref());

        let program = device
            .program(vertex, pixel)
            .map_err(|source| EffectError::Program {
                effect: self.effect.to_owned(),
                pass: self.pass.to_owned(),
                source,
            })?;

        device.use_program(&program);

        for stage in [ShaderStage::Vertex, ShaderStage::Pixel] {
            if let Some(stage_metadata) = metadata.stage(stage) {
                self.bind_stage(device, &program, stage, stage_metadata)?;
            }
        }

        if let Some(state) = metadata.rasterizer_state() {
            device.set_rasterizer_state(state);
        }

        if let Some(state) = metadata.blend_state() {
            device.set_blend_state(state);
        }

        if let Some(state) = metadata.depth_stencil_state() {
            device.set_depth_stencil_state(state);
        }

        Ok(())
    }

    fn bind_stage<D: GraphicsDevice>(
        &self,
        device: &mut D,
        program: &D::Program,
        stage: ShaderStage,
        metadata: &StageMetadata,
    ) -> Result<(), EffectError> {
        device.stage_mut(stage).shader = Some(metadata.shader().clone());
        self.bind_samplers(device, stage, metadata)?;

        for &index in metadata.parameters() {
            self.bind_parameter(device, program, stage, &self.parameters[index])?;
        }

        let slots = device.stage_mut(stage);
        for &buffer in metadata.shader().constant_buffers() {
            slots.mark_constant_buffer(buffer)?;
        }

        Ok(())
    }

    fn bind_samplers<D: GraphicsDevice>(
        &self,
        device: &mut D,
        stage: ShaderStage,
        metadata: &StageMetadata,
    ) -> Result<(), EffectError> {
        let slots = device.stage_mut(stage);

        for sampler in metadata.samplers() {
            let parameter = &self.parameters[sampler.parameter];
            let texture = match parameter.data() {
                ParameterData::Texture(texture) => *texture,
                ParameterData::Floats(_) => {
                    return Err(EffectError::NotATexture {
                        effect: self.effect.to_owned(),
                        pass: self.pass.to_owned(),
                        stage,
                        parameter: parameter.name().to_owned(),
                        class: parameter.class(),
                    });
                }
            };

            slots.set_texture(sampler.texture_slot, texture)?;

            if let Some(state) = sampler.state {
                slots.set_sampler_state(sampler.sampler_slot, state)?;
            }
        }

        Ok(())
    }

    fn bind_parameter<D: GraphicsDevice>(
        &self,
        device: &mut D,
        program: &D::Program,
        stage: ShaderStage,
        parameter: &Parameter,
    ) -> Result<(), EffectError> {
        if parameter.name() == RESERVED_POSITION_FIXUP {
            return Ok(());
        }

        // textures only reach the device through samplers
        if parameter.class() == ParameterClass::Object {
            return Ok(());
        }

        let Some(uniform) = uniform_for(parameter) else {
            return Err(EffectError::ParameterDataMismatch {
                effect: self.effect.to_owned(),
                pass: self.pass.to_owned(),
                stage,
                parameter: parameter.name().to_owned(),
                class: parameter.class(),
            });
        };

        let Some(location) = device.uniform_location(program, parameter.name()) else {
            log::trace!("`{}` is not used by the program of pass `{}`", parameter.name(), self.pass);
            return Ok(());
        };

        device.upload_uniform(&location, uniform);

        match device.take_error() {
            None => Ok(()),
            Some(source) => Err(EffectError::Binding {
                effect: self.effect.to_owned(),
                pass: self.pass.to_owned(),
                stage,
                parameter: parameter.name().to_owned(),
                source,
            }),
        }
    }
}

/// The upload call for a parameter, or `None` for textures, which only go through samplers.
pub fn uniform_for(parameter: &Parameter) -> Option<Uniform<'_>> {
    let values = parameter.floats()?;

    match parameter.class() {
        ParameterClass::Scalar => Some(Uniform::Scalar(values)),
        ParameterClass::Vector => Some(match values.len() {
            2 => Uniform::Vector2(values),
            3 => Uniform::Vector3(values),
            _ => Uniform::Vector4(values),
        }),
        ParameterClass::Matrix => Some(Uniform::Matrix4(values)),
        ParameterClass::Object => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vector_arity_follows_length() {
        let v2 = Parameter::vector("a", &[1.0, 2.0]);
        let v3 = Parameter::vector("b", &[1.0, 2.0, 3.0]);
        let v4 = Parameter::vector("c", &[1.0, 2.0, 3.0, 4.0]);
        let v1 = Parameter::vector("d", &[1.0]);

        assert!(matches!(uniform_for(&v2), Some(Uniform::Vector2(_))));
        assert!(matches!(uniform_for(&v3), Some(Uniform::Vector3(_))));
        assert!(matches!(uniform_for(&v4), Some(Uniform::Vector4(_))));
        assert!(matches!(uniform_for(&v1), Some(Uniform::Vector4(_))));
    }

    #[test]
    fn matrix_ignores_declared_shape() {
        let matrix = Parameter::matrix_with_shape("m", 3, 3, &[0.0; 9]);
        assert!(matches!(uniform_for(&matrix), Some(Uniform::Matrix4(values)) if values.len() == 9));
    }

    #[test]
    fn textures_have_no_uniform() {
        let texture = Parameter::texture("t", None);
        assert_eq!(uniform_for(&texture), None);
    }
}
