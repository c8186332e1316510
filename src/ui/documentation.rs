use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::common::{self, dim, section_title, text_lines};
use crate::api::{DocumentResponse, FieldDoc, FunctionDoc};
use crate::format::format_timestamp;
use crate::query::RequestState;

pub fn documentation_lines(response: &DocumentResponse, theme: &str) -> Vec<Line<'static>> {
    let docs = &response.documentation;
    let language = response.language.as_str();
    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                "Documentation",
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(response.language.clone(), Style::default().fg(Color::Yellow)),
            Span::raw("  "),
            dim(format_timestamp(&response.created_at)),
        ]),
        Line::from(""),
        section_title("Overview"),
    ];

    if docs.overview.trim().is_empty() {
        lines.push(Line::from(dim("  No overview")));
    } else {
        lines.extend(text_lines(&docs.overview, 2, Style::default()));
    }
    lines.push(Line::from(""));

    if !docs.functions.is_empty() {
        lines.push(section_title(format!("Functions ({})", docs.functions.len())));
        for function in &docs.functions {
            push_function(&mut lines, function, language, theme, 2);
        }
        lines.push(Line::from(""));
    }

    if !docs.classes.is_empty() {
        lines.push(section_title(format!("Classes ({})", docs.classes.len())));
        for class in &docs.classes {
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(
                    format!("class {}", class.name),
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ),
            ]));
            lines.extend(text_lines(&class.description, 4, Style::default()));
            if !class.attributes.is_empty() {
                lines.push(Line::from(dim("    Attributes:")));
                lines.extend(class.attributes.iter().map(|a| field_line(a, 6)));
            }
            if !class.methods.is_empty() {
                lines.push(Line::from(dim("    Methods:")));
                for method in &class.methods {
                    push_function(&mut lines, method, language, theme, 6);
                }
            }
        }
        lines.push(Line::from(""));
    }

    if !docs.usage_examples.is_empty() {
        lines.push(section_title("Usage Examples"));
        for (i, example) in docs.usage_examples.iter().enumerate() {
            if i > 0 {
                lines.push(Line::from(""));
            }
            lines.extend(common::snippet(example, language, theme, 2));
        }
        lines.push(Line::from(""));
    }

    lines.push(section_title("Code"));
    lines.extend(common::code_block(&response.code, language, theme));
    lines
}

fn push_function(
    lines: &mut Vec<Line<'static>>,
    function: &FunctionDoc,
    language: &str,
    theme: &str,
    indent: usize,
) {
    lines.push(Line::from(vec![
        Span::raw(" ".repeat(indent)),
        Span::styled(
            format!("{}()", function.name),
            Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
        ),
    ]));
    lines.extend(text_lines(&function.description, indent + 2, Style::default()));

    if !function.parameters.is_empty() {
        lines.push(Line::from(dim(format!("{}Parameters:", " ".repeat(indent + 2)))));
        lines.extend(function.parameters.iter().map(|p| field_line(p, indent + 4)));
    }
    if let Some(ref returns) = function.returns {
        let mut spans = vec![dim(format!("{}Returns: ", " ".repeat(indent + 2)))];
        if !returns.type_name.is_empty() {
            spans.push(Span::styled(
                returns.type_name.clone(),
                Style::default().fg(Color::Cyan),
            ));
            spans.push(Span::raw(" "));
        }
        spans.push(Span::raw(returns.description.clone()));
        lines.push(Line::from(spans));
    }
    if !function.examples.is_empty() {
        lines.push(Line::from(dim(format!("{}Examples:", " ".repeat(indent + 2)))));
        for example in &function.examples {
            lines.extend(common::snippet(example, language, theme, indent + 4));
        }
    }
}

fn field_line(field: &FieldDoc, indent: usize) -> Line<'static> {
    let mut spans = vec![
        Span::raw(format!("{}- ", " ".repeat(indent))),
        Span::styled(field.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
    ];
    if !field.type_name.is_empty() {
        spans.push(Span::styled(
            format!(" ({})", field.type_name),
            Style::default().fg(Color::Cyan),
        ));
    }
    if !field.description.is_empty() {
        spans.push(Span::raw(format!(": {}", field.description)));
    }
    Line::from(spans)
}

/// Right-hand panel of the Docs tab.
pub fn render_result(
    frame: &mut Frame,
    area: Rect,
    state: &RequestState<DocumentResponse>,
    theme: &str,
    scroll: u16,
    spinner: &str,
) {
    const TITLE: &str = "Documentation";
    match state {
        RequestState::Idle => {
            let hint = Paragraph::new(vec![
                Line::from("Press Enter to generate documentation for the code."),
                Line::from(""),
                Line::from(dim("s: docstring style | l: language | p: provider")),
            ])
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title(TITLE));
            frame.render_widget(hint, area);
        }
        RequestState::Loading => common::render_loading(
            frame,
            area,
            TITLE,
            spinner,
            "Generating documentation...",
        ),
        RequestState::Error(message) => common::render_error(frame, area, TITLE, message),
        RequestState::Success(response) => {
            let title = format!("{} {}", TITLE, response.doc_id);
            common::render_lines(
                frame,
                area,
                title,
                documentation_lines(response, theme),
                scroll,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ClassDoc, Documentation, ReturnDoc};
    use crate::config::DEFAULT_THEME;
    use crate::ui::common::test_support::{buffer_text, terminal};

    fn field(name: &str, ty: &str, desc: &str) -> FieldDoc {
        FieldDoc {
            name: name.to_string(),
            type_name: ty.to_string(),
            description: desc.to_string(),
        }
    }

    fn response() -> DocumentResponse {
        DocumentResponse {
            doc_id: "doc-9".to_string(),
            code: "class Stack:\n    pass".to_string(),
            language: "python".to_string(),
            documentation: Documentation {
                overview: "A tiny stack.".to_string(),
                functions: vec![FunctionDoc {
                    name: "push".to_string(),
                    description: "Push an item".to_string(),
                    parameters: vec![field("item", "Any", "value to push")],
                    returns: Some(ReturnDoc {
                        type_name: "None".to_string(),
                        description: "nothing".to_string(),
                    }),
                    examples: vec!["s.push(1)".to_string()],
                }],
                classes: vec![ClassDoc {
                    name: "Stack".to_string(),
                    description: "LIFO container".to_string(),
                    attributes: vec![field("items", "list", "")],
                    methods: vec![],
                }],
                usage_examples: vec!["s = Stack()".to_string()],
            },
            created_at: "2024-03-01T12:30:00Z".to_string(),
        }
    }

    #[test]
    fn test_documentation_render() {
        let mut terminal = terminal(90, 50);
        let state = RequestState::Success(response());
        terminal
            .draw(|frame| render_result(frame, frame.area(), &state, DEFAULT_THEME, 0, "⠋"))
            .unwrap();
        let text = buffer_text(terminal.backend().buffer());

        assert!(text.contains("Documentation doc-9"));
        assert!(text.contains("A tiny stack."));
        assert!(text.contains("Functions (1)"));
        assert!(text.contains("push()"));
        assert!(text.contains("- item (Any): value to push"));
        assert!(text.contains("Returns: None nothing"));
        assert!(text.contains("class Stack"));
        assert!(text.contains("- items (list)"));
        assert!(text.contains("Usage Examples"));
        assert!(text.contains("│ s = Stack()"));
    }

    #[test]
    fn test_sections_without_content_are_skipped() {
        let mut resp = response();
        resp.documentation.functions.clear();
        resp.documentation.classes.clear();
        resp.documentation.usage_examples.clear();
        let text: Vec<String> = documentation_lines(&resp, DEFAULT_THEME)
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect();
        assert!(!text.iter().any(|l| l.starts_with("Functions")));
        assert!(!text.iter().any(|l| l.starts_with("Classes")));
        assert!(text.iter().any(|l| l == "Code"));
    }
}
