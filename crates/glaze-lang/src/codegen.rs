use glaze_core::DialectConfig;

/// How the generated driver composites the shape mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MaskMode {
    /// Discard below the threshold and multiply alpha by the mask.
    Automatic,
    /// The shader samples the mask itself; the driver leaves output untouched.
    Manual,
}

/// Emits the GLSL ES text wrapped around the rewritten user source.
pub struct Codegen<'c> {
    config: &'c DialectConfig,
    glsl: String,
}

impl<'c> Codegen<'c> {
    pub fn new(config: &'c DialectConfig) -> Self {
        Self {
            config,
            glsl: String::new(),
        }
    }

    /// Built-in declarations, aliases and helpers, then one sampler and one
    /// `<name>_eval` accessor per extracted texture. Always ends with a newline.
    pub fn preamble(mut self, textures: &[String]) -> String {
        let c = self.config;

        self.glsl.push_str("\nprecision mediump float;\n");
        self.push_line(&format!("uniform vec2 {};", c.resolution_uniform));
        self.push_line(&format!("uniform float {};", c.time_uniform));
        self.push_line(&format!("uniform vec4 {};", c.mouse_uniform));
        self.push_line(&format!("uniform sampler2D {};", c.mask_uniform));
        self.glsl.push('\n');

        for alias in &c.aliases {
            self.push_line(&format!("#define {} {}", alias.from, alias.to));
        }
        self.glsl.push('\n');

        if !c.resolution_aliases.is_empty() {
            self.push_line(&format!("// Resolution aliases map onto {}", c.resolution_uniform));
            for alias in &c.resolution_aliases {
                self.push_line(&format!("#define {} {}", alias, c.resolution_uniform));
            }
            self.glsl.push('\n');
        }

        self.glsl.push_str(
            "#define saturate(x) clamp(x, 0.0, 1.0)

vec3 toLinearSrgb(vec3 color) { return pow(color, vec3(2.2)); }
vec3 fromLinearSrgb(vec3 color) { return pow(color, vec3(1.0/2.2)); }
",
        );

        if !textures.is_empty() {
            self.glsl.push('\n');
            for name in textures {
                self.push_line(&format!("uniform sampler2D {};", name));
            }
            for name in textures {
                self.glsl.push_str(&format!(
                    "\nvec4 {name}_eval(vec2 p) {{\n    return texture2D({name}, p / {res}.xy);\n}}\n",
                    res = c.resolution_uniform
                ));
            }
        }

        self.glsl.push('\n');
        self.glsl
    }

    /// The parameterless `main()` that flips into AGSL's top-left origin,
    /// calls the renamed user entry point and applies the shape mask.
    pub fn driver(mut self, mask: MaskMode) -> String {
        let c = self.config;
        let res = &c.resolution_uniform;

        self.push_line("void main() {");
        self.push_line(&format!(
            "    vec2 fragCoord = vec2(gl_FragCoord.x, {res}.y - gl_FragCoord.y);"
        ));
        self.push_line(&format!("    vec2 uv = fragCoord / {res}.xy;"));
        self.push_line(&format!("    float maskAlpha = texture2D({}, uv).r;", c.mask_uniform));

        if mask == MaskMode::Automatic {
            self.push_line(&format!(
                "    if (maskAlpha < {}) {{",
                glsl_float(c.mask_threshold)
            ));
            self.push_line("        discard;");
            self.push_line("    }");
        }

        self.push_line(&format!("    gl_FragColor = {}(fragCoord);", c.renamed_entry_point));

        if mask == MaskMode::Automatic {
            self.push_line("    gl_FragColor.a *= maskAlpha;");
        }

        self.push_line("}");
        self.glsl
    }

    fn push_line(&mut self, text: &str) {
        self.glsl.push_str(text);
        self.glsl.push('\n');
    }
}

/// GLSL ES 1.00 float literals need a decimal point.
fn glsl_float(value: f32) -> String {
    let s = format!("{}", value);
    if s.contains('.') || s.contains('e') {
        s
    } else {
        format!("{}.0", s)
    }
}
