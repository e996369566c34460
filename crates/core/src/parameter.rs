use crate::Texture;
use std::{collections::HashMap, ops::Index};

/// Name of the built-in uniform the GL backend uses to fix up clip-space positions.
///
/// It is never user data and is never uploaded from the effect.
pub const RESERVED_POSITION_FIXUP: &str = "posFixup";

/// Data shape of a parameter, which decides how it is uploaded.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum ParameterClass {
    Scalar,
    Vector,
    Matrix,
    Object,
}

/// Current value of a parameter.
#[derive(Clone, Debug, PartialEq)]
pub enum ParameterData {
    Floats(Vec<f32>),
    Texture(Option<Texture>),
}

/// A named value on an effect.
#[derive(Clone, Debug, PartialEq)]
pub struct Parameter {
    name: String,
    class: ParameterClass,
    rows: u32,
    columns: u32,
    data: ParameterData,
}

impl Parameter {
    pub fn scalar(name: impl Into<String>, value: f32) -> Self {
        Self::scalar_array(name, &[value])
    }

    pub fn scalar_array(name: impl Into<String>, values: &[f32]) -> Self {
        Self::with_floats(name, ParameterClass::Scalar, 1, 1, values)
    }

    /// A vector parameter; its column count is the length of `values`.
    pub fn vector(name: impl Into<String>, values: &[f32]) -> Self {
        Self::with_floats(name, ParameterClass::Vector, 1, values.len() as u32, values)
    }

    pub fn matrix(name: impl Into<String>, values: [f32; 16]) -> Self {
        Self::with_floats(name, ParameterClass::Matrix, 4, 4, &values)
    }

    /// A matrix parameter with the row/column counts the shader declared.
    ///
    /// Uploads always go out as a single 4x4 matrix whatever the declared shape.
    pub fn matrix_with_shape(name: impl Into<String>, rows: u32, columns: u32, values: &[f32]) -> Self {
        Self::with_floats(name, ParameterClass::Matrix, rows, columns, values)
    }

    pub fn texture(name: impl Into<String>, texture: Option<Texture>) -> Self {
        Self {
            name: name.into(),
            class: ParameterClass::Object,
            rows: 0,
            columns: 0,
            data: ParameterData::Texture(texture),
        }
    }

    fn with_floats(name: impl Into<String>, class: ParameterClass, rows: u32, columns: u32, values: &[f32]) -> Self {
        Self {
            name: name.into(),
            class,
            rows,
            columns,
            data: ParameterData::Floats(values.to_vec()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn class(&self) -> ParameterClass {
        self.class
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn data(&self) -> &ParameterData {
        &self.data
    }

    pub fn floats(&self) -> Option<&[f32]> {
        match &self.data {
            ParameterData::Floats(values) => Some(values),
            ParameterData::Texture(_) => None,
        }
    }

    pub fn set_f32(&mut self, value: f32) {
        self.set_floats(&[value]);
    }

    /// Replace the numeric value, reusing the existing allocation.
    pub fn set_floats(&mut self, values: &[f32]) {
        match &mut self.data {
            ParameterData::Floats(current) => {
                current.clear();
                current.extend_from_slice(values);
            }
            data => *data = ParameterData::Floats(values.to_vec()),
        }
    }

    pub fn set_texture(&mut self, texture: Option<Texture>) {
        self.data = ParameterData::Texture(texture);
    }
}

/// Ordered parameter table of an effect, addressable by index or by name.
#[derive(Clone, Debug, Default)]
pub struct ParameterCollection {
    parameters: Vec<Parameter>,
    by_name: HashMap<String, usize>,
}

impl ParameterCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parameter and return its index.
    ///
    /// If the name is already taken, name lookups keep resolving to the first parameter.
    pub fn push(&mut self, parameter: Parameter) -> usize {
        let index = self.parameters.len();
        self.by_name.entry(parameter.name.clone()).or_insert(index);
        self.parameters.push(parameter);
        index
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Parameter> {
        self.parameters.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Parameter> {
        self.parameters.get_mut(index)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    pub fn by_name(&self, name: &str) -> Option<&Parameter> {
        self.index_of(name).map(|index| &self.parameters[index])
    }

    pub fn by_name_mut(&mut self, name: &str) -> Option<&mut Parameter> {
        self.index_of(name).map(|index| &mut self.parameters[index])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.iter()
    }
}

impl Index<usize> for ParameterCollection {
    type Output = Parameter;

    fn index(&self, index: usize) -> &Parameter {
        &self.parameters[index]
    }
}

/// A named group of parameters uploaded together to a shader stage.
#[derive(Clone, Debug, PartialEq)]
pub struct ConstantBuffer {
    name: String,
    parameters: Vec<usize>,
}

impl ConstantBuffer {
    pub fn new(name: impl Into<String>, parameters: impl IntoIterator<Item = usize>) -> Self {
        Self {
            name: name.into(),
            parameters: parameters.into_iter().collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Indices into the owning effect's parameter table, in buffer order.
    pub fn parameters(&self) -> &[usize] {
        &self.parameters
    }
}
