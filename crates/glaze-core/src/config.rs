use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{GlazeError, GlazeResult};

/// A uniform the preamble declares itself. Any user redeclaration whose type
/// is one of `types` is commented out before the preamble is prepended.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BuiltinUniform {
    pub name: String,
    pub types: Vec<String>,
}

impl BuiltinUniform {
    pub fn new(name: &str, types: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            types: types.iter().map(|t| t.to_string()).collect(),
        }
    }

    pub fn accepts(&self, type_name: &str) -> bool {
        self.types.iter().any(|t| t == type_name)
    }
}

/// A `#define` bridging an AGSL spelling to its GLSL ES counterpart.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MacroAlias {
    pub from: String,
    pub to: String,
}

impl MacroAlias {
    pub fn new(from: &str, to: &str) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

/// Names and spellings shared by the uniform parser and the transpiler.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DialectConfig {
    /// Names never reported as user uniforms.
    pub reserved_names: Vec<String>,
    /// Redeclarations suppressed by the transpiler.
    pub builtins: Vec<BuiltinUniform>,
    pub resolution_uniform: String,
    /// Extra names `#define`d onto `resolution_uniform`.
    pub resolution_aliases: Vec<String>,
    pub time_uniform: String,
    pub mouse_uniform: String,
    /// Shape mask sampler bound by the host.
    pub mask_uniform: String,
    pub aliases: Vec<MacroAlias>,
    pub entry_point: String,
    pub renamed_entry_point: String,
    /// Mask opacity below which the driver discards the fragment.
    pub mask_threshold: f32,
}

impl Default for DialectConfig {
    fn default() -> Self {
        Self {
            reserved_names: ["iResolution", "iTime", "uShapeMask", "resolution", "uResolution"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            builtins: vec![
                BuiltinUniform::new("resolution", &["vec2", "float2"]),
                BuiltinUniform::new("uResolution", &["vec2", "float2"]),
                BuiltinUniform::new("iResolution", &["vec2", "float2"]),
                BuiltinUniform::new("iTime", &["float"]),
                BuiltinUniform::new("iMouse", &["vec2", "float2", "vec4", "float4"]),
                BuiltinUniform::new("uShapeMask", &["sampler2D"]),
            ],
            resolution_uniform: "iResolution".to_string(),
            resolution_aliases: vec!["resolution".to_string(), "uResolution".to_string()],
            time_uniform: "iTime".to_string(),
            mouse_uniform: "iMouse".to_string(),
            mask_uniform: "uShapeMask".to_string(),
            aliases: vec![
                MacroAlias::new("half", "float"),
                MacroAlias::new("half2", "vec2"),
                MacroAlias::new("half3", "vec3"),
                MacroAlias::new("half4", "vec4"),
                MacroAlias::new("float2", "vec2"),
                MacroAlias::new("float3", "vec3"),
                MacroAlias::new("float4", "vec4"),
                MacroAlias::new("sk_FragCoord", "gl_FragCoord"),
            ],
            entry_point: "main".to_string(),
            renamed_entry_point: "userMain".to_string(),
            mask_threshold: 0.1,
        }
    }
}

impl DialectConfig {
    /// Reserved names plus every uniform the preamble declares itself.
    pub fn is_reserved(&self, name: &str) -> bool {
        self.reserved_names.iter().any(|n| n == name)
            || self.resolution_aliases.iter().any(|n| n == name)
            || [&self.resolution_uniform, &self.time_uniform, &self.mask_uniform]
                .into_iter()
                .any(|n| n == name)
    }

    pub fn builtin(&self, name: &str) -> Option<&BuiltinUniform> {
        self.builtins.iter().find(|b| b.name == name)
    }

    pub fn from_toml_str(contents: &str) -> GlazeResult<Self> {
        let config: DialectConfig = toml::from_str(contents)?;
        config.validate().map_err(GlazeError::InvalidArgument)?;
        Ok(config)
    }

    pub fn load_from_file(path: &Path) -> GlazeResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: DialectConfig = toml::from_str(&contents)?;
        config
            .validate()
            .map_err(|message| GlazeError::config(message, path))?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> GlazeResult<()> {
        let contents =
            toml::to_string_pretty(self).map_err(|e| GlazeError::Other(e.to_string()))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Every name spliced into generated code must be a plain identifier.
    fn validate(&self) -> Result<(), String> {
        let named = [
            ("resolution_uniform", &self.resolution_uniform),
            ("time_uniform", &self.time_uniform),
            ("mouse_uniform", &self.mouse_uniform),
            ("mask_uniform", &self.mask_uniform),
            ("entry_point", &self.entry_point),
            ("renamed_entry_point", &self.renamed_entry_point),
        ];
        for (field, value) in named {
            if !is_identifier(value) {
                return Err(format!("{field} must be an identifier, got '{value}'"));
            }
        }
        for alias in &self.resolution_aliases {
            if !is_identifier(alias) {
                return Err(format!("resolution alias '{alias}' is not an identifier"));
            }
        }
        if !(0.0..=1.0).contains(&self.mask_threshold) {
            return Err(format!(
                "mask_threshold must be within 0..=1, got {}",
                self.mask_threshold
            ));
        }
        Ok(())
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_reserved_names() {
        let config = DialectConfig::default();
        for name in ["iResolution", "resolution", "uResolution", "iTime", "uShapeMask"] {
            assert!(config.is_reserved(name), "{name} should be reserved");
        }
        assert!(!config.is_reserved("iMouse"));
        assert!(!config.is_reserved("uSpeed"));
    }

    #[test]
    fn test_renamed_builtins_stay_reserved() {
        let config = DialectConfig::from_toml_str(
            r#"
mask_uniform = "uCutout"
time_uniform = "uClock"
resolution_aliases = ["uSize"]
"#,
        )
        .unwrap();
        assert!(config.is_reserved("uCutout"));
        assert!(config.is_reserved("uClock"));
        assert!(config.is_reserved("uSize"));
        assert!(!config.reserved_names.iter().any(|n| n == "uCutout"));
    }

    #[test]
    fn test_builtin_lookup() {
        let config = DialectConfig::default();
        let mouse = config.builtin("iMouse").unwrap();
        assert!(mouse.accepts("float4"));
        assert!(!mouse.accepts("half4"));
        assert!(config.builtin("uSpeed").is_none());
    }

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let config = DialectConfig::from_toml_str(
            r#"
mask_uniform = "uClip"
mask_threshold = 0.25
"#,
        )
        .unwrap();
        assert_eq!(config.mask_uniform, "uClip");
        assert_eq!(config.mask_threshold, 0.25);
        assert_eq!(config.entry_point, "main");
        assert_eq!(config.aliases.len(), 8);
    }

    #[test]
    fn test_rejects_non_identifier_names() {
        let err = DialectConfig::from_toml_str("entry_point = \"my main\"").unwrap_err();
        assert!(err.to_string().contains("entry_point"));
    }

    #[test]
    fn test_rejects_out_of_range_threshold() {
        assert!(DialectConfig::from_toml_str("mask_threshold = 1.5").is_err());
    }

    #[test]
    fn test_roundtrip_through_file() {
        let path = std::env::temp_dir().join(format!("glaze-config-{}.toml", std::process::id()));
        let mut config = DialectConfig::default();
        config.renamed_entry_point = "agslMain".to_string();
        config.save_to_file(&path).unwrap();
        let loaded = DialectConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, config);
    }
}
