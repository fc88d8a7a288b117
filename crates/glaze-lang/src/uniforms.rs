//! Uniform declaration scanning for host UI generation.
//!
//! The scan is line based and never fails: a line that does not match the
//! declaration grammar is simply not reported.

use std::collections::HashSet;
use std::fmt;

use glaze_core::DialectConfig;
use serde::Serialize;

use crate::patterns::{color_layout_at, uniform_decl_at};
use crate::rewrite::TokenView;

/// Declared type token of an AGSL uniform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RawType {
    #[serde(rename = "float")]
    Float,
    #[serde(rename = "half")]
    Half,
    #[serde(rename = "int")]
    Int,
    #[serde(rename = "bool")]
    Bool,
    #[serde(rename = "vec2")]
    Vec2,
    #[serde(rename = "half2")]
    Half2,
    #[serde(rename = "vec3")]
    Vec3,
    #[serde(rename = "half3")]
    Half3,
    #[serde(rename = "vec4")]
    Vec4,
    #[serde(rename = "half4")]
    Half4,
    #[serde(rename = "shader")]
    Shader,
    #[serde(rename = "sampler2D")]
    Sampler2D,
}

impl RawType {
    pub fn from_token(token: &str) -> Option<Self> {
        let raw = match token {
            "float" => RawType::Float,
            "half" => RawType::Half,
            "int" => RawType::Int,
            "bool" => RawType::Bool,
            "vec2" => RawType::Vec2,
            "half2" => RawType::Half2,
            "vec3" => RawType::Vec3,
            "half3" => RawType::Half3,
            "vec4" => RawType::Vec4,
            "half4" => RawType::Half4,
            "shader" => RawType::Shader,
            "sampler2D" => RawType::Sampler2D,
            _ => return None,
        };
        Some(raw)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RawType::Float => "float",
            RawType::Half => "half",
            RawType::Int => "int",
            RawType::Bool => "bool",
            RawType::Vec2 => "vec2",
            RawType::Half2 => "half2",
            RawType::Vec3 => "vec3",
            RawType::Half3 => "half3",
            RawType::Vec4 => "vec4",
            RawType::Half4 => "half4",
            RawType::Shader => "shader",
            RawType::Sampler2D => "sampler2D",
        }
    }

    pub fn is_texture(self) -> bool {
        matches!(self, RawType::Shader | RawType::Sampler2D)
    }
}

impl fmt::Display for RawType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Uniform type as seen by the host UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SemanticType {
    Float,
    Int,
    Vec2,
    Vec3,
    Color,
    Bool,
    Image,
}

impl SemanticType {
    /// Textures are always images; a color annotation makes anything else a
    /// color, scalars included; 4-vectors default to color.
    pub fn classify(raw: RawType, has_color_annotation: bool) -> Self {
        if raw.is_texture() {
            return SemanticType::Image;
        }
        if has_color_annotation {
            return SemanticType::Color;
        }
        match raw {
            RawType::Bool => SemanticType::Bool,
            RawType::Int => SemanticType::Int,
            RawType::Vec2 | RawType::Half2 => SemanticType::Vec2,
            RawType::Vec3 | RawType::Half3 => SemanticType::Vec3,
            RawType::Vec4 | RawType::Half4 => SemanticType::Color,
            RawType::Float | RawType::Half => SemanticType::Float,
            RawType::Shader | RawType::Sampler2D => SemanticType::Image,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let ty = match name {
            "float" => SemanticType::Float,
            "int" => SemanticType::Int,
            "vec2" => SemanticType::Vec2,
            "vec3" => SemanticType::Vec3,
            "color" => SemanticType::Color,
            "bool" => SemanticType::Bool,
            "image" => SemanticType::Image,
            _ => return None,
        };
        Some(ty)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SemanticType::Float => "float",
            SemanticType::Int => "int",
            SemanticType::Vec2 => "vec2",
            SemanticType::Vec3 => "vec3",
            SemanticType::Color => "color",
            SemanticType::Bool => "bool",
            SemanticType::Image => "image",
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One user-authored uniform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Declaration {
    pub name: String,
    pub raw_type: RawType,
    pub has_color_annotation: bool,
    #[serde(rename = "type")]
    pub semantic_type: SemanticType,
    /// 1-based source line.
    pub line: usize,
}

/// Extracts user uniforms from AGSL source.
pub struct UniformParser<'c> {
    config: &'c DialectConfig,
}

impl<'c> UniformParser<'c> {
    pub fn new(config: &'c DialectConfig) -> Self {
        Self { config }
    }

    /// Declarations in first-appearance order, without reserved names or duplicates.
    pub fn parse(&self, source: &str) -> Vec<Declaration> {
        let mut declarations = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for (index, line) in source.split('\n').enumerate() {
            let trimmed = line.trim();
            if trimmed.starts_with("//") {
                continue;
            }

            // Block comments are not tracked: each line is lexed on its own.
            let view = TokenView::without_comments(trimmed);
            let has_color_annotation = (0..view.len()).any(|k| color_layout_at(&view, k).is_some());

            let Some((raw_type, name)) = (0..view.len()).find_map(|k| {
                let decl = uniform_decl_at(&view, k)?;
                Some((RawType::from_token(decl.type_name)?, decl.name))
            }) else {
                continue;
            };

            if self.config.is_reserved(name) || seen.contains(name) {
                continue;
            }
            seen.insert(name.to_string());

            declarations.push(Declaration {
                name: name.to_string(),
                raw_type,
                has_color_annotation,
                semantic_type: SemanticType::classify(raw_type, has_color_annotation),
                line: index + 1,
            });
        }

        tracing::trace!(count = declarations.len(), "parsed uniform declarations");
        declarations
    }
}

/// Parse with the default AGSL dialect configuration.
pub fn parse_uniforms(source: &str) -> Vec<Declaration> {
    UniformParser::new(&DialectConfig::default()).parse(source)
}
