use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, Borders, List, ListItem, ListState, Paragraph, Scrollbar, ScrollbarOrientation,
        ScrollbarState,
    },
    Frame,
};

use super::common::{self, dim};
use crate::api::{ReviewSummary, ReviewsListResponse};
use crate::app::{HistoryPager, HISTORY_FILTERS};
use crate::format::{format_score, format_timestamp, score_style, truncate};
use crate::query::RequestState;

const FILENAME_WIDTH: usize = 32;

pub fn render(
    frame: &mut Frame,
    area: Rect,
    state: &RequestState<ReviewsListResponse>,
    pager: &HistoryPager,
    selected: usize,
    spinner: &str,
) {
    let show_pagination = pager.has_multiple_pages()
        && matches!(state, RequestState::Success(list) if !list.reviews.is_empty());

    let mut constraints = vec![
        Constraint::Length(3), // Filter
        Constraint::Min(0),    // List
    ];
    if show_pagination {
        constraints.push(Constraint::Length(3));
    }
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    render_filter_bar(frame, chunks[0], pager);

    match state {
        RequestState::Idle | RequestState::Loading => {
            common::render_loading(frame, chunks[1], "Reviews", spinner, "Loading reviews...")
        }
        RequestState::Error(message) => common::render_error(frame, chunks[1], "Reviews", message),
        RequestState::Success(list) if list.reviews.is_empty() => {
            render_empty_state(frame, chunks[1])
        }
        RequestState::Success(list) => {
            render_list(frame, chunks[1], list, selected);
        }
    }

    if show_pagination {
        if let RequestState::Success(list) = state {
            render_pagination(frame, chunks[2], pager, list.pagination.total);
        }
    }
}

fn render_filter_bar(frame: &mut Frame, area: Rect, pager: &HistoryPager) {
    let mut spans = vec![Span::styled("Language: ", Style::default().fg(Color::Cyan))];
    for filter in HISTORY_FILTERS {
        let label = filter.unwrap_or("All");
        let style = if filter == pager.language() {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(format!(" {} ", label), style));
        spans.push(Span::raw(" "));
    }
    let bar = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL).title("Filter (f)"));
    frame.render_widget(bar, area);
}

fn render_empty_state(frame: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "No reviews found",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(dim("Reviews you run show up here.")),
        Line::from(""),
        Line::from(Span::styled(
            "Create your first review (press 1)",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )),
    ];
    let empty = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Reviews"));
    frame.render_widget(empty, area);
}

fn render_list(frame: &mut Frame, area: Rect, list: &ReviewsListResponse, selected: usize) {
    let selected = selected.min(list.reviews.len().saturating_sub(1));
    let items = build_review_items(&list.reviews, selected);
    let title = format!(
        "Reviews ({} total, page {}/{})",
        list.pagination.total,
        list.pagination.page,
        list.pagination.last_page()
    );

    let mut list_state = ListState::default().with_selected(Some(selected));
    let widget = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().bg(Color::DarkGray));
    frame.render_stateful_widget(widget, area, &mut list_state);

    if list.reviews.len() > 1 {
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("▲"))
            .end_symbol(Some("▼"));
        let mut scrollbar_state =
            ScrollbarState::new(list.reviews.len().saturating_sub(1)).position(selected);
        frame.render_stateful_widget(
            scrollbar,
            area.inner(Margin {
                vertical: 1,
                horizontal: 0,
            }),
            &mut scrollbar_state,
        );
    }
}

fn build_review_items(reviews: &[ReviewSummary], selected: usize) -> Vec<ListItem<'static>> {
    reviews
        .iter()
        .enumerate()
        .map(|(i, review)| {
            let is_selected = i == selected;
            let language_style = if is_selected {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Yellow)
            };

            let filename = review.filename.as_deref().unwrap_or("untitled");
            let filename = truncate(filename, FILENAME_WIDTH);

            let score = match review.quality_score {
                Some(score) => Span::styled(format!("{:>4}/10", format_score(score)), score_style(score)),
                None => dim("   —/10"),
            };

            ListItem::new(Line::from(vec![
                Span::styled(format!("{:<11}", review.language), language_style),
                Span::raw(format!("{:<width$}", filename, width = FILENAME_WIDTH)),
                Span::raw("  "),
                dim(format_timestamp(&review.created_at)),
                Span::raw("  "),
                score,
            ]))
        })
        .collect()
}

fn render_pagination(frame: &mut Frame, area: Rect, pager: &HistoryPager, total: u32) {
    let enabled = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let disabled = Style::default().fg(Color::DarkGray);

    let line = Line::from(vec![
        Span::styled(
            "◀ Previous (h)",
            if pager.can_prev() { enabled } else { disabled },
        ),
        Span::raw(format!(
            "   Page {} of {} ({} reviews)   ",
            pager.page,
            pager.last_page(),
            total
        )),
        Span::styled(
            "Next (l) ▶",
            if pager.can_next() { enabled } else { disabled },
        ),
    ]);
    let bar = Paragraph::new(line)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(bar, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Pagination;
    use crate::ui::common::test_support::{buffer_rows, buffer_text, terminal};

    fn summary(id: &str, language: &str, score: Option<f64>) -> ReviewSummary {
        ReviewSummary {
            review_id: id.to_string(),
            language: language.to_string(),
            quality_score: score,
            created_at: "2024-03-01T12:30:00".to_string(),
            filename: Some(format!("{}.{}", id, language)),
        }
    }

    fn list(page: u32, total: u32, reviews: Vec<ReviewSummary>) -> ReviewsListResponse {
        ReviewsListResponse {
            reviews,
            pagination: Pagination {
                page,
                limit: 10,
                total,
                pages: Pagination::expected_pages(total, 10),
            },
        }
    }

    fn draw(state: &RequestState<ReviewsListResponse>, pager: &HistoryPager) -> Vec<String> {
        let mut terminal = terminal(100, 20);
        terminal
            .draw(|frame| render(frame, frame.area(), state, pager, 0, "⠋"))
            .unwrap();
        buffer_rows(terminal.backend().buffer())
    }

    #[test]
    fn test_empty_state_has_call_to_action() {
        let mut pager = HistoryPager::new(10);
        pager.set_filter(Some("go"));
        let state = RequestState::Success(list(2, 0, vec![]));
        pager.apply(&list(2, 0, vec![]).pagination);

        let text = draw(&state, &pager).join("\n");
        assert!(text.contains("No reviews found"));
        assert!(text.contains("Create your first review"));
        assert!(!text.contains("Error"));
        assert!(!text.contains("Previous"));
    }

    #[test]
    fn test_rows_show_language_file_and_score() {
        let pager = HistoryPager::new(10);
        let state = RequestState::Success(list(
            1,
            2,
            vec![summary("a", "python", Some(9.2)), summary("b", "go", None)],
        ));
        let text = draw(&state, &pager).join("\n");
        assert!(text.contains("python"));
        assert!(text.contains("a.python"));
        assert!(text.contains(" 9.2/10"));
        assert!(text.contains("—/10"));
        // single page: no pagination controls
        assert!(!text.contains("Previous"));
    }

    #[test]
    fn test_pagination_controls_on_multiple_pages() {
        let mut pager = HistoryPager::new(10);
        let reviews = (0..10)
            .map(|i| summary(&i.to_string(), "java", Some(7.0)))
            .collect();
        let response = list(1, 25, reviews);
        pager.apply(&response.pagination);
        let state = RequestState::Success(response);

        let mut terminal = terminal(100, 20);
        terminal
            .draw(|frame| render(frame, frame.area(), &state, &pager, 0, "⠋"))
            .unwrap();
        let buffer = terminal.backend().buffer();
        let text = buffer_text(buffer);
        assert!(text.contains("Page 1 of 3 (25 reviews)"));

        // "Previous" is disabled on page 1, "Next" enabled
        let rows = buffer_rows(buffer);
        let y = rows.iter().position(|r| r.contains("Previous")).unwrap();
        let column = |needle: &str| {
            let byte = rows[y].find(needle).unwrap();
            rows[y][..byte].chars().count() as u16
        };
        assert_eq!(buffer[(column("◀"), y as u16)].fg, Color::DarkGray);
        assert_eq!(buffer[(column("Next"), y as u16)].fg, Color::Cyan);
    }

    #[test]
    fn test_error_state() {
        let pager = HistoryPager::new(10);
        let state: RequestState<ReviewsListResponse> =
            RequestState::Error("Network error: connection refused".to_string());
        let text = draw(&state, &pager).join("\n");
        assert!(text.contains("connection refused"));
    }

    #[test]
    fn test_filter_bar_lists_all_options() {
        let pager = HistoryPager::new(10);
        let text = draw(&RequestState::Loading, &pager).join("\n");
        for label in ["All", "python", "javascript", "typescript", "java", "go"] {
            assert!(text.contains(label), "missing filter {}", label);
        }
        assert!(text.contains("Loading reviews..."));
    }
}
