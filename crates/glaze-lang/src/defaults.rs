use serde::Serialize;

use crate::uniforms::SemanticType;

/// Initial value for a generated UI control.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum UniformValue {
    Float(f32),
    Int(i32),
    Bool(bool),
    Vector(Vec<f32>),
}

/// Default control value for a semantic type. Images have none: the host
/// must wait for the user to supply a texture.
pub fn default_value(ty: SemanticType) -> Option<UniformValue> {
    let value = match ty {
        SemanticType::Float => UniformValue::Float(0.5),
        SemanticType::Int => UniformValue::Int(1),
        SemanticType::Vec2 => UniformValue::Vector(vec![0.5, 0.5]),
        SemanticType::Vec3 => UniformValue::Vector(vec![1.0, 1.0, 1.0]),
        SemanticType::Color => UniformValue::Vector(vec![1.0, 0.0, 0.0, 1.0]),
        SemanticType::Bool => UniformValue::Bool(false),
        SemanticType::Image => return None,
    };
    Some(value)
}
