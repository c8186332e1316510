//! Syntax highlighting for code blocks using syntect.
//!
//! The syntax set comes from two-face, which extends syntect's defaults with
//! grammars it lacks (TypeScript among them). Highlighted output is converted
//! to ratatui `Line`s.

use std::str::FromStr;
use std::sync::OnceLock;

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use syntect::easy::HighlightLines;
use syntect::highlighting::{FontStyle, Theme, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

use crate::config::DEFAULT_THEME;
use crate::language::Language;

static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
static THEME_SET: OnceLock<ThemeSet> = OnceLock::new();

/// Get the global SyntaxSet instance.
/// This is lazily initialized on first access.
pub fn syntax_set() -> &'static SyntaxSet {
    SYNTAX_SET.get_or_init(two_face::syntax::extra_newlines)
}

pub fn theme_set() -> &'static ThemeSet {
    THEME_SET.get_or_init(ThemeSet::load_defaults)
}

/// Syntax for a backend language name (`"python"`, `"typescript"`, ...).
///
/// Names this client does not know are tried as syntect tokens before
/// falling back to plain text.
pub fn syntax_for_language(language: &str) -> &'static SyntaxReference {
    let ss = syntax_set();
    Language::from_str(language)
        .ok()
        .and_then(|lang| ss.find_syntax_by_extension(lang.extension()))
        .or_else(|| ss.find_syntax_by_token(language.trim()))
        .unwrap_or_else(|| ss.find_syntax_plain_text())
}

/// Get a theme by name, falling back to "base16-ocean.dark" and then to any
/// bundled theme.
pub fn get_theme(name: &str) -> Option<&'static Theme> {
    let themes = &theme_set().themes;
    themes
        .get(name)
        .or_else(|| themes.get(DEFAULT_THEME))
        .or_else(|| themes.values().next())
}

/// Highlight `code` line by line.
///
/// Lines that fail to highlight are returned unstyled rather than dropped.
pub fn highlight_code(code: &str, language: &str, theme_name: &str) -> Vec<Line<'static>> {
    let Some(theme) = get_theme(theme_name) else {
        return plain_lines(code);
    };
    let mut highlighter = HighlightLines::new(syntax_for_language(language), theme);

    // newline-aware syntaxes need the line ending to close line-scoped rules
    LinesWithEndings::from(code)
        .map(|line| {
            let spans = highlight_code_line(line, &mut highlighter)
                .into_iter()
                .filter_map(strip_line_ending)
                .collect::<Vec<_>>();
            Line::from(spans)
        })
        .collect()
}

fn strip_line_ending(span: Span<'static>) -> Option<Span<'static>> {
    let content = span.content.trim_end_matches(['\n', '\r']);
    if content.is_empty() && !span.content.is_empty() {
        return None;
    }
    Some(Span::styled(content.to_string(), span.style))
}

fn plain_lines(code: &str) -> Vec<Line<'static>> {
    code.lines().map(|l| Line::raw(l.to_string())).collect()
}

/// Highlight a code line and return a vector of owned Spans.
pub fn highlight_code_line(code: &str, highlighter: &mut HighlightLines<'_>) -> Vec<Span<'static>> {
    match highlighter.highlight_line(code, syntax_set()) {
        Ok(ranges) => ranges
            .into_iter()
            .map(|(style, text)| Span::styled(text.to_string(), convert_syntect_style(&style)))
            .collect(),
        Err(e) => {
            tracing::debug!(error = ?e, "highlight failed");
            vec![Span::raw(code.to_string())]
        }
    }
}

/// Convert syntect Style to ratatui Style.
///
/// Background color is NOT applied: the theme background is meant for a
/// whole editor, and code blocks keep the terminal's background.
fn convert_syntect_style(style: &syntect::highlighting::Style) -> Style {
    let mut ratatui_style = Style::default();

    if style.foreground.a > 0 {
        ratatui_style = ratatui_style.fg(Color::Rgb(
            style.foreground.r,
            style.foreground.g,
            style.foreground.b,
        ));
    }

    if style.font_style.contains(FontStyle::BOLD) {
        ratatui_style = ratatui_style.add_modifier(Modifier::BOLD);
    }
    if style.font_style.contains(FontStyle::ITALIC) {
        ratatui_style = ratatui_style.add_modifier(Modifier::ITALIC);
    }
    if style.font_style.contains(FontStyle::UNDERLINE) {
        ratatui_style = ratatui_style.add_modifier(Modifier::UNDERLINED);
    }

    ratatui_style
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_language_has_a_syntax() {
        for lang in Language::ALL {
            let syntax = syntax_for_language(lang.as_str());
            assert_ne!(
                syntax.name, "Plain Text",
                "{} should resolve to a real syntax",
                lang
            );
        }
    }

    #[test]
    fn test_typescript_syntax_available() {
        assert_eq!(syntax_for_language("typescript").name, "TypeScript");
    }

    #[test]
    fn test_unknown_language_is_plain_text() {
        assert_eq!(syntax_for_language("cobol-2087").name, "Plain Text");
    }

    #[test]
    fn test_get_theme_fallback() {
        assert!(get_theme("base16-ocean.dark").is_some());
        assert!(get_theme("non_existent_theme_xyz").is_some());
    }

    #[test]
    fn test_highlight_code_python() {
        let lines = highlight_code("def f(x):\n    return x", "python", DEFAULT_THEME);
        assert_eq!(lines.len(), 2);

        let def_span = lines[0]
            .spans
            .iter()
            .find(|s| s.content.as_ref() == "def")
            .expect("'def' should be its own span");
        assert!(def_span.style.fg.is_some());
        assert!(def_span.style.bg.is_none());
    }

    #[test]
    fn test_highlight_code_keeps_text() {
        let code = "package main\n\nfunc main() {}";
        let lines = highlight_code(code, "go", DEFAULT_THEME);
        let text: Vec<String> = lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect();
        assert_eq!(text, vec!["package main", "", "func main() {}"]);
    }
}
