mod common;

use common::*;
use glfx_core::*;
use std::rc::Rc;

#[test]
fn routes_parameters_by_class() {
    let mut effect = textured_effect();
    let mut device = RecordingDevice::new();

    effect.apply_pass(main_pass(), &mut device).unwrap();

    assert_eq!(
        device.uploads(),
        vec![
            ("World".to_owned(), Upload::Matrix4(identity().to_vec())),
            ("Tint".to_owned(), Upload::Vector3(vec![1.0, 0.5, 0.25])),
            ("Weights".to_owned(), Upload::Scalar(vec![0.1, 0.2, 0.3, 0.2, 0.1])),
        ]
    );
}

#[test]
fn vector_uploads_match_arity() {
    let mut effect = Effect::new("Vectors");
    let v2 = effect.add_parameter(Parameter::vector("V2", &[1.0, 2.0]));
    let v3 = effect.add_parameter(Parameter::vector("V3", &[1.0, 2.0, 3.0]));
    let v4 = effect.add_parameter(Parameter::vector("V4", &[1.0, 2.0, 3.0, 4.0]));
    let m = effect.add_parameter(Parameter::matrix_with_shape("M", 3, 4, &[0.5; 12]));
    effect.add_constant_buffer(ConstantBuffer::new("Buffer", [v2, v3, v4, m]));
    effect.add_technique(
        Technique::new("T").with_pass(Pass::new("P").with_pixel_shader(Rc::new(Shader::pixel("").with_constant_buffer(0)))),
    );

    let mut device = RecordingDevice::new();
    effect.apply_pass(main_pass(), &mut device).unwrap();

    assert_eq!(
        device.uploads(),
        vec![
            ("V2".to_owned(), Upload::Vector2(vec![1.0, 2.0])),
            ("V3".to_owned(), Upload::Vector3(vec![1.0, 2.0, 3.0])),
            ("V4".to_owned(), Upload::Vector4(vec![1.0, 2.0, 3.0, 4.0])),
            ("M".to_owned(), Upload::Matrix4(vec![0.5; 12])),
        ]
    );
}

#[test]
fn reserved_parameter_is_never_uploaded() {
    let mut effect = textured_effect();
    let mut device = RecordingDevice::new();

    effect.apply_pass(main_pass(), &mut device).unwrap();
    effect.apply_pass(main_pass(), &mut device).unwrap();

    assert!(!device.uploaded_names().iter().any(|name| name == RESERVED_POSITION_FIXUP));
}

#[test]
fn parameter_changes_reach_the_next_apply() {
    let mut effect = textured_effect();
    let mut device = RecordingDevice::new();

    effect.apply_pass(main_pass(), &mut device).unwrap();
    effect.parameters_mut().by_name_mut("Tint").unwrap().set_floats(&[0.0, 0.0, 1.0]);
    device.events.clear();
    effect.apply_pass(main_pass(), &mut device).unwrap();

    assert!(device.uploads().contains(&("Tint".to_owned(), Upload::Vector3(vec![0.0, 0.0, 1.0]))));
}

#[test]
fn program_is_compiled_once_per_shader_pair() {
    let (vertex, pixel) = textured_shaders();
    let mut effect = textured_effect();
    effect.add_technique(
        Technique::new("Shared")
            .with_pass(Pass::new("A").with_vertex_shader(vertex.clone()).with_pixel_shader(pixel.clone()))
            .with_pass(Pass::new("B").with_vertex_shader(vertex).with_pixel_shader(pixel)),
    );

    let mut device = RecordingDevice::new();
    effect.apply_pass(PassId::new(1, 0), &mut device).unwrap();
    effect.apply_pass(PassId::new(1, 1), &mut device).unwrap();
    effect.apply_pass(PassId::new(1, 0), &mut device).unwrap();

    assert_eq!(device.compilations, 1);
    assert_eq!(
        device.events.iter().filter(|event| matches!(event, Event::UseProgram(1))).count(),
        3
    );
}

#[test]
fn binds_samplers_into_stage_slots() {
    let mut effect = textured_effect();
    let mut device = RecordingDevice::new();

    effect.apply_pass(main_pass(), &mut device).unwrap();

    assert_eq!(device.pixel.textures.get(0), Some(&Texture(42)));
    assert_eq!(device.pixel.sampler_states.get(0), Some(&SamplerState::POINT_CLAMP));
    assert!(device.pixel.textures.is_dirty(0));
    assert_eq!(device.vertex.textures.get(0), None);
}

#[test]
fn sampler_without_state_keeps_existing_sampler_state() {
    let mut effect = Effect::new("Plain");
    effect.add_parameter(Parameter::texture("Diffuse", Some(Texture(7))));
    let pixel = Shader::pixel("").with_sampler(SamplerBinding::new("Diffuse", "s", 1));
    effect.add_technique(Technique::new("T").with_pass(Pass::new("P").with_pixel_shader(Rc::new(pixel))));

    let mut device = RecordingDevice::new();
    device.pixel.set_sampler_state(1, SamplerState::ANISOTROPIC_WRAP).unwrap();
    effect.apply_pass(main_pass(), &mut device).unwrap();

    assert_eq!(device.pixel.textures.get(1), Some(&Texture(7)));
    assert_eq!(device.pixel.sampler_states.get(1), Some(&SamplerState::ANISOTROPIC_WRAP));
}

#[test]
fn empty_texture_parameter_clears_the_slot() {
    let mut effect = textured_effect();
    let mut device = RecordingDevice::new();

    effect.apply_pass(main_pass(), &mut device).unwrap();
    effect.parameters_mut().by_name_mut("Diffuse").unwrap().set_texture(None);
    effect.apply_pass(main_pass(), &mut device).unwrap();

    assert_eq!(device.pixel.textures.get(0), None);
}

#[test]
fn texture_slot_past_capacity_is_reported() {
    let mut effect = Effect::new("Wide");
    effect.add_parameter(Parameter::texture("Diffuse", Some(Texture(1))));
    let pixel = Shader::pixel("").with_sampler(SamplerBinding::new("Diffuse", "s", 8));
    effect.add_technique(Technique::new("T").with_pass(Pass::new("P").with_pixel_shader(Rc::new(pixel))));

    let mut device = RecordingDevice::new();
    assert!(matches!(
        effect.apply_pass(main_pass(), &mut device),
        Err(EffectError::SlotOutOfRange {
            stage: ShaderStage::Pixel,
            kind: SlotKind::Texture,
            index: 8,
            capacity: 8,
        })
    ));
}

#[test]
fn absent_vertex_stage_is_skipped() {
    let (_, pixel) = textured_shaders();
    let mut effect = textured_effect();
    effect.add_technique(Technique::new("PixelOnly").with_pass(Pass::new("P").with_pixel_shader(pixel)));

    let mut device = RecordingDevice::new();
    effect.apply_pass(PassId::new(1, 0), &mut device).unwrap();

    assert!(device.vertex.shader.is_none());
    assert!(!device.vertex.constant_buffers.any());
    assert!(device.vertex.textures.drain_dirty().next().is_none());
    assert_eq!(device.uploaded_names(), vec!["Tint", "Weights"]);
    assert!(device.pixel.constant_buffers.is_dirty(1));
    assert!(device.pixel.shader.is_some());
}

#[test]
fn marks_constant_buffers_of_each_stage() {
    let mut effect = textured_effect();
    let mut device = RecordingDevice::new();

    effect.apply_pass(main_pass(), &mut device).unwrap();

    assert_eq!(device.vertex.constant_buffers.drain().collect::<Vec<_>>(), vec![0]);
    assert_eq!(device.pixel.constant_buffers.drain().collect::<Vec<_>>(), vec![1]);
}

#[test]
fn render_states_follow_bindings_in_fixed_order() {
    let mut effect = textured_effect();
    let mut device = RecordingDevice::new();

    effect.apply_pass(main_pass(), &mut device).unwrap();

    let last_upload = device
        .events
        .iter()
        .rposition(|event| matches!(event, Event::Upload { .. }))
        .unwrap();
    let first_state = device
        .events
        .iter()
        .position(|event| matches!(event, Event::Rasterizer(_) | Event::Blend(_) | Event::DepthStencil(_)))
        .unwrap();

    assert!(last_upload < first_state);
    assert_eq!(
        device.render_state_events(),
        vec![
            Event::Rasterizer(RasterizerState::CULL_NONE),
            Event::Blend(BlendState::ALPHA_BLEND),
            Event::DepthStencil(DepthStencilState::DEPTH_READ),
        ]
    );
}

#[test]
fn absent_render_states_are_left_alone() {
    let (vertex, pixel) = textured_shaders();
    let mut effect = textured_effect();
    effect.add_technique(
        Technique::new("BlendOnly").with_pass(
            Pass::new("P")
                .with_vertex_shader(vertex)
                .with_pixel_shader(pixel)
                .with_blend_state(BlendState::ADDITIVE),
        ),
    );

    let mut device = RecordingDevice::new();
    effect.apply_pass(PassId::new(1, 0), &mut device).unwrap();

    assert_eq!(device.render_state_events(), vec![Event::Blend(BlendState::ADDITIVE)]);
}

#[test]
fn unused_uniforms_are_skipped() {
    let mut effect = textured_effect();
    let mut device = RecordingDevice::new();
    device.inactive.push("Tint".to_owned());

    effect.apply_pass(main_pass(), &mut device).unwrap();

    assert_eq!(device.uploaded_names(), vec!["World", "Weights"]);
}

#[test]
fn api_error_aborts_with_context() {
    let mut effect = textured_effect();
    let mut device = RecordingDevice::new();
    device.fail_after = Some("Tint".to_owned());

    let err = effect.apply_pass(main_pass(), &mut device).unwrap_err();

    match err {
        EffectError::Binding {
            effect,
            pass,
            stage,
            parameter,
            source,
        } => {
            assert_eq!(effect, "Textured");
            assert_eq!(pass, "P0");
            assert_eq!(stage, ShaderStage::Pixel);
            assert_eq!(parameter, "Tint");
            assert_eq!(source.code, 0x0502);
        }
        other => panic!("unexpected error: {other}"),
    }

    // earlier bindings stay, nothing after the failure is applied
    assert_eq!(device.uploaded_names(), vec!["World", "Tint"]);
    assert!(device.render_state_events().is_empty());
}

#[test]
fn program_failure_is_reported() {
    let mut effect = Effect::new("Empty");
    effect.add_technique(Technique::new("T").with_pass(Pass::new("P")));

    let mut device = RecordingDevice::new();
    let err = effect.apply_pass(main_pass(), &mut device).unwrap_err();

    assert!(matches!(
        err,
        EffectError::Program {
            source: ProgramError::Empty,
            ..
        }
    ));
}

#[test]
fn numeric_parameter_holding_a_texture_is_reported() {
    let mut effect = textured_effect();
    effect.parameters_mut().by_name_mut("Tint").unwrap().set_texture(Some(Texture(9)));

    let mut device = RecordingDevice::new();
    let err = effect.apply_pass(main_pass(), &mut device).unwrap_err();

    assert!(matches!(
        err,
        EffectError::ParameterDataMismatch {
            stage: ShaderStage::Pixel,
            class: ParameterClass::Vector,
            ref parameter,
            ..
        } if parameter == "Tint"
    ));
    assert_eq!(device.uploaded_names(), vec!["World"]);
}
