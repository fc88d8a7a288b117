//! AGSL → GLSL ES source-to-source transpiler.
//!
//! The pipeline is a fixed sequence of token-level rewrites. Each stage
//! re-lexes the output of the previous one, and every rewrite keeps the line
//! count of the text it replaces, so user line `k` always lands on generated
//! line `k + line_offset`.

use glaze_core::DialectConfig;
use serde::Serialize;

use crate::codegen::{Codegen, MaskMode};
use crate::diagnostics::{Warning, WarningKind};
use crate::lexer::TokenKind;
use crate::patterns::{color_layout_at, integral_float_literal, uniform_decl_at};
use crate::rewrite::{Edits, TokenView};
use crate::uniforms::UniformParser;

/// Output of one transpilation. `line_offset` is only meaningful for the
/// `generated_source` it was computed alongside.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranspileResult {
    pub generated_source: String,
    /// Number of preamble lines before the first user line.
    pub line_offset: usize,
    pub warnings: Vec<Warning>,
    /// Texture uniforms moved into the preamble, in declaration order.
    pub textures: Vec<String>,
    pub mask_mode: MaskMode,
}

pub struct Transpiler<'c> {
    config: &'c DialectConfig,
}

impl<'c> Transpiler<'c> {
    pub fn new(config: &'c DialectConfig) -> Self {
        Self { config }
    }

    /// Never fails; problems in the input surface when the GLSL compiler
    /// rejects the generated source.
    pub fn transpile(&self, source: &str) -> TranspileResult {
        let warnings = advisories(source);

        let glsl = self.suppress_builtins(source);
        let (glsl, textures) = self.extract_textures(&glsl);
        let glsl = rewrite_eval_calls(&glsl);
        let glsl = strip_color_layouts(&glsl);
        let glsl = rewrite_counter_loops(&glsl);
        let glsl = self.rename_entry_point(&glsl);

        let preamble = Codegen::new(self.config).preamble(&textures);
        let line_offset = preamble.matches('\n').count();

        // Any mention of the mask name, comments included, means the shader
        // composites the mask on its own.
        let mask_mode = if source.contains(&self.config.mask_uniform) {
            MaskMode::Manual
        } else {
            MaskMode::Automatic
        };
        let driver = Codegen::new(self.config).driver(mask_mode);

        tracing::debug!(
            line_offset,
            textures = textures.len(),
            warnings = warnings.len(),
            ?mask_mode,
            "transpiled AGSL source"
        );

        TranspileResult {
            generated_source: format!("{preamble}{glsl}\n{driver}"),
            line_offset,
            warnings,
            textures,
            mask_mode,
        }
    }

    /// Comment out user redeclarations of uniforms the preamble provides.
    fn suppress_builtins(&self, source: &str) -> String {
        let view = TokenView::new(source);
        let mut edits = Edits::new();

        let mut k = 0;
        while k < view.len() {
            if let Some(decl) = uniform_decl_at(&view, k) {
                let builtin = self
                    .config
                    .builtin(decl.name)
                    .filter(|b| b.accepts(decl.type_name));
                if let Some(builtin) = builtin {
                    edits.replace(
                        view.span(decl.start).start,
                        view.span(decl.end).end,
                        format!("/* {} removed */", builtin.name),
                    );
                    k = decl.end + 1;
                    continue;
                }
            }
            k += 1;
        }

        edits.apply(source)
    }

    /// Move `shader` / `sampler2D` uniforms out of the user source. Their
    /// declarations are re-emitted in the preamble next to `_eval` accessors.
    fn extract_textures(&self, source: &str) -> (String, Vec<String>) {
        let view = TokenView::new(source);
        let mut edits = Edits::new();

        let mut found: Vec<(usize, String)> = Vec::new();

        let mut k = 0;
        while k < view.len() {
            let Some(decl) = uniform_decl_at(&view, k) else {
                k += 1;
                continue;
            };
            if !matches!(decl.type_name, "shader" | "sampler2D") {
                k += 1;
                continue;
            }

            let comment = if decl.name == self.config.mask_uniform {
                "/* built-in mask */".to_string()
            } else {
                found.push((view.span(decl.start).line, decl.name.to_string()));
                format!("/* moved {} */", decl.name)
            };
            edits.replace(view.span(decl.start).start, view.span(decl.end).end, comment);
            k = decl.end + 1;
        }

        // Every image the uniform parser reports gets a sampler, including
        // declarations inside block comments, which stay commented.
        for decl in UniformParser::new(self.config).parse(source) {
            if decl.raw_type.is_texture() {
                found.push((decl.line, decl.name));
            }
        }
        found.sort_by_key(|(line, _)| *line);

        let mut textures: Vec<String> = Vec::new();
        for (_, name) in found {
            if !textures.contains(&name) {
                textures.push(name);
            }
        }

        if !textures.is_empty() {
            tracing::trace!(?textures, "extracted texture uniforms");
        }
        (edits.apply(source), textures)
    }

    /// `half4 main(float2 p)` → `vec4 userMain(vec2 p)`. First match only.
    fn rename_entry_point(&self, source: &str) -> String {
        let view = TokenView::new(source);

        for k in 0..view.len() {
            if !matches!(view.ident(k), Some("half4" | "vec4" | "float4"))
                || !view.is_ident(k + 1, &self.config.entry_point)
                || !view.is(k + 2, &TokenKind::LeftParen)
            {
                continue;
            }
            let param_type = if view.is_ident(k + 3, "in") { k + 4 } else { k + 3 };
            if !matches!(view.ident(param_type), Some("float2" | "vec2")) {
                continue;
            }
            let Some(param) = view.ident(param_type + 1) else {
                continue;
            };
            let close = param_type + 2;
            if !view.is(close, &TokenKind::RightParen) || !view.whitespace_run(k, close) {
                continue;
            }

            let mut edits = Edits::new();
            edits.replace(
                view.span(k).start,
                view.span(close).end,
                format!("vec4 {}(vec2 {})", self.config.renamed_entry_point, param),
            );
            tracing::trace!(line = view.span(k).line, "renamed entry point");
            return edits.apply(source);
        }

        source.to_string()
    }
}

/// Transpile with the default AGSL dialect configuration.
pub fn transpile(source: &str) -> TranspileResult {
    Transpiler::new(&DialectConfig::default()).transpile(source)
}

/// Scan the untouched user source for constructs that are likely to break in
/// WebGL. One warning per kind, at its first occurrence.
fn advisories(source: &str) -> Vec<Warning> {
    let view = TokenView::new(source);
    let mut warnings: Vec<Warning> = Vec::new();
    let mut report = |kind: WarningKind, k: usize| {
        if !warnings.iter().any(|w| w.kind == kind) {
            let span = view.span(k);
            warnings.push(Warning::new(kind, span.line, span.column));
        }
    };

    for k in 0..view.len() {
        if color_layout_at(&view, k).is_some() {
            report(WarningKind::ColorLayout, k);
        }
        if view.is(k, &TokenKind::Hash) && view.is_ident(k + 1, "define") && view.adjacent(k) {
            report(WarningKind::DefineDirective, k);
        }
        if view.is_ident(k, "for") && has_dynamic_bound(&view, k) {
            report(WarningKind::DynamicLoopBound, k);
        }
    }

    warnings.sort_by_key(|w| (w.line, w.column));
    warnings
}

/// `for (init; <name|number> <cmp> <identifier> ...` at `k`.
fn has_dynamic_bound(view: &TokenView, k: usize) -> bool {
    if !view.is(k + 1, &TokenKind::LeftParen) {
        return false;
    }

    let mut depth = 0usize;
    let mut j = k + 1;
    while j < view.len() {
        match view.kind(j) {
            Some(TokenKind::LeftParen) => depth += 1,
            Some(TokenKind::RightParen) => {
                depth -= 1;
                if depth == 0 {
                    return false;
                }
            }
            Some(TokenKind::Semicolon) if depth == 1 => {
                let lhs = matches!(
                    view.kind(j + 1),
                    Some(TokenKind::Identifier(_) | TokenKind::NumberLiteral(_))
                );
                let cmp = view.kind(j + 2).is_some_and(TokenKind::is_comparison);
                return lhs && cmp && view.ident(j + 3).is_some();
            }
            _ => {}
        }
        j += 1;
    }
    false
}

/// `tex.eval(p)` → `tex_eval(p)` for any identifier receiver.
fn rewrite_eval_calls(source: &str) -> String {
    let view = TokenView::new(source);
    let mut edits = Edits::new();

    for k in 0..view.len() {
        let Some(receiver) = view.ident(k) else {
            continue;
        };
        if view.is(k + 1, &TokenKind::Dot)
            && view.is_ident(k + 2, "eval")
            && view.is(k + 3, &TokenKind::LeftParen)
            && view.adjacent(k)
            && view.adjacent(k + 1)
            && view.whitespace_between(k + 2)
        {
            edits.replace(
                view.span(k).start,
                view.span(k + 3).end,
                format!("{receiver}_eval("),
            );
        }
    }

    edits.apply(source)
}

fn strip_color_layouts(source: &str) -> String {
    let view = TokenView::new(source);
    let mut edits = Edits::new();

    for k in 0..view.len() {
        if let Some(close) = color_layout_at(&view, k) {
            edits.replace(view.span(k).start, view.end_with_trailing_whitespace(close), "");
        }
    }

    edits.apply(source)
}

/// `for (float i = 0.0; i < 8.0; i++)` → `for (int i = 0; i < 8; i++)`.
/// Any other loop shape is left alone.
fn rewrite_counter_loops(source: &str) -> String {
    let view = TokenView::new(source);
    let mut edits = Edits::new();

    for k in 0..view.len() {
        if let Some((close, header)) = counter_loop_at(&view, k) {
            edits.replace(view.span(k).start, view.span(close).end, header);
        }
    }

    edits.apply(source)
}

fn counter_loop_at(view: &TokenView, k: usize) -> Option<(usize, String)> {
    if !view.is_ident(k, "for")
        || !view.is(k + 1, &TokenKind::LeftParen)
        || !view.is_ident(k + 2, "float")
    {
        return None;
    }
    let counter = view.ident(k + 3)?;
    if !view.is(k + 4, &TokenKind::Equals) {
        return None;
    }
    let lower = integral_float_literal(view.number(k + 5)?)?;
    if !view.is(k + 6, &TokenKind::Semicolon)
        || !view.is_ident(k + 7, counter)
        || !view.is(k + 8, &TokenKind::Less)
    {
        return None;
    }
    let upper = integral_float_literal(view.number(k + 9)?)?;
    if !view.is(k + 10, &TokenKind::Semicolon) || !view.is_ident(k + 11, counter) {
        return None;
    }

    let close = k + 13;
    if !view.is(k + 12, &TokenKind::PlusPlus)
        || !view.is(close, &TokenKind::RightParen)
        || !view.whitespace_run(k, close)
    {
        return None;
    }

    Some((
        close,
        format!("for (int {counter} = {lower}; {counter} < {upper}; {counter}++)"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uniforms::parse_uniforms;

    fn body(result: &TranspileResult) -> &str {
        let start = result
            .generated_source
            .match_indices('\n')
            .nth(result.line_offset - 1)
            .map(|(i, _)| i + 1)
            .unwrap();
        let end = result.generated_source.rfind("\nvoid main() {").unwrap();
        &result.generated_source[start..end]
    }

    #[test]
    fn test_builtin_redeclarations_suppressed() {
        let src = "uniform float2 resolution;\nuniform vec2 iResolution;\nuniform float iTime;\nuniform vec4 iMouse;\nuniform sampler2D uShapeMask;\n";
        let result = transpile(src);
        assert_eq!(
            body(&result),
            "/* resolution removed */\n/* iResolution removed */\n/* iTime removed */\n/* iMouse removed */\n/* uShapeMask removed */\n"
        );
    }

    #[test]
    fn test_builtin_type_must_match() {
        let result = transpile("uniform half2 resolution;\nuniform int iTime;\n");
        assert_eq!(body(&result), "uniform half2 resolution;\nuniform int iTime;\n");
    }

    #[test]
    fn test_texture_extraction() {
        let src = "uniform shader uTex;\nuniform sampler2D uNoise;\nuniform shader uShapeMask;\nuniform shader uTex;\n";
        let result = transpile(src);
        assert_eq!(result.textures, vec!["uTex".to_string(), "uNoise".to_string()]);
        assert_eq!(
            body(&result),
            "/* moved uTex */\n/* moved uNoise */\n/* built-in mask */\n/* moved uTex */\n"
        );
        assert_eq!(result.generated_source.matches("vec4 uTex_eval(vec2 p)").count(), 1);
        assert_eq!(result.generated_source.matches("uniform sampler2D uNoise;").count(), 1);
    }

    #[test]
    fn test_commented_texture_still_gets_a_sampler() {
        let src = "uniform shader uA;\n/* uniform shader uTex; */\nuniform sampler2D uB;\n";
        let result = transpile(src);
        assert_eq!(result.textures, vec!["uA", "uTex", "uB"]);
        assert_eq!(
            body(&result),
            "/* moved uA */\n/* uniform shader uTex; */\n/* moved uB */\n"
        );
        assert_eq!(result.generated_source.matches("uniform sampler2D uTex;").count(), 1);
        assert!(result.generated_source.contains("vec4 uTex_eval(vec2 p) {"));
        let images: Vec<_> = parse_uniforms(src).into_iter().map(|d| d.name).collect();
        assert_eq!(images, result.textures);
    }

    #[test]
    fn test_eval_rewrite_any_receiver() {
        let src = "half4 a = uTex.eval(coord * 2.0);\nhalf4 b = other.eval (p);\nhalf4 c = x . eval(p);\n";
        let result = transpile(src);
        assert_eq!(
            body(&result),
            "half4 a = uTex_eval(coord * 2.0);\nhalf4 b = other_eval(p);\nhalf4 c = x . eval(p);\n"
        );
    }

    #[test]
    fn test_color_layout_stripped_without_moving_lines() {
        let src = "layout(color) uniform half4 uColor;\nlayout ( color )\nuniform half4 uTint;\n";
        let result = transpile(src);
        assert_eq!(body(&result), "uniform half4 uColor;\n\nuniform half4 uTint;\n");
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].kind, WarningKind::ColorLayout);
        assert_eq!(result.warnings[0].line, 1);
    }

    #[test]
    fn test_counter_loop_rewrite() {
        let src = "for (float i = 0.0; i < 8.0; i++) {}\nfor(float  j=2.0;j<10.0;j++) {}\n";
        let result = transpile(src);
        assert_eq!(
            body(&result),
            "for (int i = 0; i < 8; i++) {}\nfor (int j = 2; j < 10; j++) {}\n"
        );
    }

    #[test]
    fn test_split_increment_is_not_a_counter_loop() {
        let src = "for (float i = 0.0; i < 4.0; i + +) {}\n";
        let result = transpile(src);
        assert_eq!(body(&result), src);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_other_loops_untouched() {
        let src = "\
for (float i = 0.0; i < uCount; i++) {}
for (float i = 0.0; i <= 8.0; i++) {}
for (float i = 0.5; i < 8.0; i++) {}
for (float i = 0.0; i < 8.0; i += 1.0) {}
for (int i = 0; i < 8; i++) {}
";
        let result = transpile(src);
        assert_eq!(body(&result), src);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].kind, WarningKind::DynamicLoopBound);
    }

    #[test]
    fn test_entry_point_renamed_once() {
        let src = "half4 main(float2 coord) {\n  return half4(1.0);\n}\nvec4 main( in vec2 p ) {}\n";
        let result = transpile(src);
        assert_eq!(
            body(&result),
            "vec4 userMain(vec2 coord) {\n  return half4(1.0);\n}\nvec4 main( in vec2 p ) {}\n"
        );
    }

    #[test]
    fn test_entry_point_with_in_qualifier() {
        let result = transpile("float4 main(in vec2 fragCoord) { return float4(0.0); }");
        assert!(body(&result).starts_with("vec4 userMain(vec2 fragCoord) {"));
    }

    #[test]
    fn test_entry_point_requires_coordinate_parameter() {
        let src = "half4 main(half2 p) {}\nhalf4 main() {}\n";
        let result = transpile(src);
        assert_eq!(body(&result), src);
    }

    #[test]
    fn test_define_warning() {
        let result = transpile("#define PI 3.14159\nfloat x = PI;\n#define TAU 6.28\n");
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].kind, WarningKind::DefineDirective);
        assert_eq!(result.warnings[0].line, 1);
        assert!(body(&result).starts_with("#define PI 3.14159\n"));
    }

    #[test]
    fn test_warnings_ordered_by_position() {
        let src = "for (float i = 0.0; i < n; i++) {}\n#define X 1\nlayout(color) uniform half4 c;\n";
        let kinds: Vec<_> = transpile(src).warnings.iter().map(|w| w.kind).collect();
        assert_eq!(
            kinds,
            vec![
                WarningKind::DynamicLoopBound,
                WarningKind::DefineDirective,
                WarningKind::ColorLayout,
            ]
        );
    }

    #[test]
    fn test_line_offset_matches_preamble() {
        let result = transpile("half4 main(float2 p) { return half4(1.0); }\n");
        let preamble_end = result.generated_source.find("vec4 userMain").unwrap();
        let preamble = &result.generated_source[..preamble_end];
        assert_eq!(preamble.matches('\n').count(), result.line_offset);
    }

    #[test]
    fn test_user_lines_keep_their_offset() {
        let src = "uniform float iTime;\nlayout(color)\n  uniform half4 c;\nuniform shader uTex;\nhalf4 main(float2 p) {\n  return uTex.eval(p);\n}\n";
        let result = transpile(src);
        let generated: Vec<&str> = result.generated_source.split('\n').collect();
        assert_eq!(generated[result.line_offset + 5], "  return uTex_eval(p);");
        assert_eq!(generated[result.line_offset + 4], "vec4 userMain(vec2 p) {");
    }

    #[test]
    fn test_mask_mode_from_substring() {
        let plain = transpile("half4 main(float2 p) { return half4(1.0); }");
        assert_eq!(plain.mask_mode, MaskMode::Automatic);
        let mentioned =
            transpile("// no uShapeMask here\nhalf4 main(float2 p) { return half4(1.0); }");
        assert_eq!(mentioned.mask_mode, MaskMode::Manual);
    }

    #[test]
    fn test_custom_config_names() {
        let mut config = DialectConfig::default();
        config.renamed_entry_point = "agslMain".to_string();
        config.mask_threshold = 0.5;
        let result =
            Transpiler::new(&config).transpile("half4 main(float2 p) { return half4(1.0); }");
        assert!(result.generated_source.contains("vec4 agslMain(vec2 p)"));
        assert!(result.generated_source.contains("gl_FragColor = agslMain(fragCoord);"));
        assert!(result.generated_source.contains("if (maskAlpha < 0.5) {"));
    }
}
