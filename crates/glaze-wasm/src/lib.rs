//! # glaze-wasm
//!
//! WebAssembly bindings for the browser preview. Every export takes and
//! returns plain strings; structured results are JSON.

use glaze_core::DialectConfig;
use glaze_lang::{SemanticType, TranspileResult, Transpiler, Warning};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// What the preview needs from one transpilation.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PreviewSource {
    glsl: String,
    line_offset: usize,
    warnings: Vec<Warning>,
    textures: Vec<String>,
    mask_mode: glaze_lang::MaskMode,
}

fn preview_source(result: TranspileResult) -> PreviewSource {
    PreviewSource {
        glsl: result.generated_source,
        line_offset: result.line_offset,
        warnings: result.warnings,
        textures: result.textures,
        mask_mode: result.mask_mode,
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

/// Detect the user uniforms of an AGSL source.
///
/// Returns a JSON array of `{ name, rawType, hasColorAnnotation, type, line }`.
#[wasm_bindgen]
pub fn parse_uniforms(source: &str) -> Result<String, JsValue> {
    to_json(&glaze_lang::parse_uniforms(source))
}

/// Transpile AGSL to WebGL GLSL ES.
///
/// Returns a JSON string: { glsl, lineOffset, warnings, textures, maskMode }
#[wasm_bindgen]
pub fn transpile(source: &str) -> Result<String, JsValue> {
    to_json(&preview_source(glaze_lang::transpile(source)))
}

/// Transpile with a dialect configuration given as TOML text.
///
/// Returns the same JSON shape as [`transpile`]. Throws if the TOML does not
/// decode or names an invalid identifier.
#[wasm_bindgen]
pub fn transpile_with_config(source: &str, config_toml: &str) -> Result<String, JsValue> {
    let config = DialectConfig::from_toml_str(config_toml)
        .map_err(|e| JsValue::from_str(&format!("Config error: {}", e)))?;
    to_json(&preview_source(Transpiler::new(&config).transpile(source)))
}

/// Rewrite a WebGL shader info log into user-source line numbers.
#[wasm_bindgen]
pub fn remap_diagnostics(message: &str, line_offset: usize) -> String {
    glaze_lang::remap_diagnostics(message, line_offset)
}

/// Default control value for a semantic uniform type, as JSON
/// (`null` for `image`). Throws on an unknown type name.
#[wasm_bindgen]
pub fn default_value(semantic_type: &str) -> Result<String, JsValue> {
    let ty = SemanticType::from_name(semantic_type)
        .ok_or_else(|| JsValue::from_str(&format!("Unknown uniform type: {}", semantic_type)))?;
    to_json(&glaze_lang::default_value(ty))
}

#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transpile_json_shape() {
        let json = transpile("half4 main(float2 p) { return half4(1.0); }").unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value["glsl"].as_str().unwrap().contains("vec4 userMain(vec2 p)"));
        assert!(value["lineOffset"].as_u64().unwrap() > 0);
        assert!(value["warnings"].as_array().unwrap().is_empty());
        assert_eq!(value["maskMode"], "automatic");
    }

    #[test]
    fn test_transpile_with_config() {
        let toml = "renamed_entry_point = \"shaderMain\"\nmask_threshold = 0.5\n";
        let json = transpile_with_config("half4 main(float2 p) { return half4(1.0); }", toml)
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let glsl = value["glsl"].as_str().unwrap();
        assert!(glsl.contains("vec4 shaderMain(vec2 p)"));
        assert!(glsl.contains("if (maskAlpha < 0.5) {"));
    }

    #[test]
    fn test_parse_uniforms_json() {
        let json = parse_uniforms("uniform float uSpeed;").unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["name"], "uSpeed");
        assert_eq!(value[0]["type"], "float");
    }

    #[test]
    fn test_default_value_known_types() {
        assert_eq!(default_value("vec3").unwrap(), "[1.0,1.0,1.0]");
        assert_eq!(default_value("int").unwrap(), "1");
        assert_eq!(default_value("image").unwrap(), "null");
    }

    #[test]
    fn test_remap_passthrough() {
        assert_eq!(remap_diagnostics("ERROR: 0:50: x", 40), "ERROR: Line 10: x");
    }
}
