//! Token patterns shared by the uniform parser and the transpiler.

use crate::lexer::TokenKind;
use crate::rewrite::TokenView;

/// `uniform <type> <name> ;` matched at significant index `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct UniformDecl<'v> {
    pub type_name: &'v str,
    pub name: &'v str,
    pub start: usize,
    /// Index of the terminating `;`.
    pub end: usize,
}

pub(crate) fn uniform_decl_at<'v>(view: &'v TokenView, start: usize) -> Option<UniformDecl<'v>> {
    if !view.is_ident(start, "uniform") || !view.is(start + 3, &TokenKind::Semicolon) {
        return None;
    }
    let type_name = view.ident(start + 1)?;
    let name = view.ident(start + 2)?;
    if !view.whitespace_run(start, start + 3) {
        return None;
    }
    Some(UniformDecl {
        type_name,
        name,
        start,
        end: start + 3,
    })
}

/// `layout ( color )` at `start`; returns the index of the closing paren.
pub(crate) fn color_layout_at(view: &TokenView, start: usize) -> Option<usize> {
    let matched = view.is_ident(start, "layout")
        && view.is(start + 1, &TokenKind::LeftParen)
        && view.is_ident(start + 2, "color")
        && view.is(start + 3, &TokenKind::RightParen)
        && view.whitespace_run(start, start + 3);
    matched.then_some(start + 3)
}

/// `<digits>.0`, returning the integer part.
pub(crate) fn integral_float_literal(text: &str) -> Option<&str> {
    let digits = text.strip_suffix(".0")?;
    (!digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())).then_some(digits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_decl() {
        let view = TokenView::new("uniform  half4\tuColor ;");
        let decl = uniform_decl_at(&view, 0).unwrap();
        assert_eq!(decl.type_name, "half4");
        assert_eq!(decl.name, "uColor");
        assert_eq!(decl.end, 3);
    }

    #[test]
    fn test_uniform_decl_rejects_arrays_and_lists() {
        assert!(uniform_decl_at(&TokenView::new("uniform float x[4];"), 0).is_none());
        assert!(uniform_decl_at(&TokenView::new("uniform float a, b;"), 0).is_none());
        assert!(uniform_decl_at(&TokenView::new("uniform float x"), 0).is_none());
        assert!(uniform_decl_at(&TokenView::new("uniform /* c */ float x;"), 0).is_none());
    }

    #[test]
    fn test_color_layout() {
        assert_eq!(color_layout_at(&TokenView::new("layout ( color )"), 0), Some(3));
        assert_eq!(color_layout_at(&TokenView::new("layout(color)"), 0), Some(3));
        assert_eq!(color_layout_at(&TokenView::new("layout(binding)"), 0), None);
    }

    #[test]
    fn test_integral_float_literal() {
        assert_eq!(integral_float_literal("10.0"), Some("10"));
        assert_eq!(integral_float_literal("0.0"), Some("0"));
        assert_eq!(integral_float_literal("1.5"), None);
        assert_eq!(integral_float_literal("1.00"), None);
        assert_eq!(integral_float_literal(".0"), None);
        assert_eq!(integral_float_literal("10"), None);
    }
}
