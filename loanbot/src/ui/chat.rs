//! Chat screen: the conversation transcript above a one-line input box.
//!
//! The transcript is flattened into pre-wrapped `Line`s every frame so the
//! scroll offset can be computed from the real line count. `transcript_scroll`
//! counts rows back from the bottom; 0 keeps the newest message in view.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Position, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use loanbot_core::types::{LoanResult, Message, MessageKind, Step};

use crate::app::{AppState, Mode};
use crate::theme::Theme;
use crate::ui::layout::{inner_rect, panel_block};

const INDENT: &str = "  ";
const ADVICE_DISCLAIMER: &str =
    "This advice is provided for informational purposes only and does not constitute legal or financial advice.";

pub fn render_chat(frame: &mut Frame, area: Rect, state: &mut AppState, theme: &Theme) {
    let [transcript_area, input_area] =
        area.layout(&Layout::vertical([Constraint::Fill(1), Constraint::Length(3)]));

    let inner = inner_rect(transcript_area);
    state.transcript_viewport_height = inner.height;

    let lines = transcript_lines(state, inner.width, theme);
    let total = u16::try_from(lines.len()).unwrap_or(u16::MAX);
    let max_scroll = total.saturating_sub(inner.height);
    state.transcript_scroll = state.transcript_scroll.min(max_scroll);
    let offset = max_scroll - state.transcript_scroll;

    frame.render_widget(panel_block(" Loan eligibility ", false, theme), transcript_area);
    frame.render_widget(Paragraph::new(lines).scroll((offset, 0)), inner);

    render_input(frame, input_area, state, theme);
}

fn transcript_lines(state: &AppState, width: u16, theme: &Theme) -> Vec<Line<'static>> {
    let body_width = usize::from(width).saturating_sub(INDENT.len()).max(1);
    let mut lines = Vec::new();

    for message in state.session.transcript() {
        match message.kind {
            MessageKind::Bot => push_text_message(&mut lines, message, "Bot", theme.bot_badge, body_width, theme),
            MessageKind::User => push_text_message(&mut lines, message, "You", theme.user_badge, body_width, theme),
            MessageKind::Result => {
                if let Some(result) = &message.result {
                    push_result(&mut lines, result, body_width, theme);
                }
            }
        }
        lines.push(Line::default());
    }

    if state.session.step() == Step::Processing || state.session.pending_prompt().is_some() {
        let dots = ".".repeat((state.tick % 4) as usize);
        let label = if state.session.step() == Step::Processing {
            "Analyzing your application"
        } else {
            "Bot is typing"
        };
        lines.push(Line::from(Span::styled(
            format!("{INDENT}{label}{dots}"),
            Style::default().fg(theme.muted).add_modifier(Modifier::ITALIC),
        )));
    }

    lines
}

fn push_text_message(
    lines: &mut Vec<Line<'static>>,
    message: &Message,
    speaker: &'static str,
    color: ratatui::style::Color,
    width: usize,
    theme: &Theme,
) {
    let alignment = if message.kind == MessageKind::User { Alignment::Right } else { Alignment::Left };
    let time = message.timestamp.with_timezone(&chrono::Local).format("%H:%M").to_string();

    lines.push(
        Line::from(vec![
            Span::styled(speaker, Style::default().fg(color).add_modifier(Modifier::BOLD)),
            Span::styled(format!(" {time}"), Style::default().fg(theme.muted)),
        ])
        .alignment(alignment),
    );
    for row in wrap_text(&message.content, width) {
        let row = if alignment == Alignment::Left { format!("{INDENT}{row}") } else { row };
        lines.push(
            Line::from(Span::styled(row, Style::default().fg(theme.message_text))).alignment(alignment),
        );
    }
}

fn push_result(lines: &mut Vec<Line<'static>>, result: &LoanResult, width: usize, theme: &Theme) {
    let color = theme.status_color(result.status);
    lines.push(Line::from(vec![
        Span::styled(
            format!(" {} ", result.status.label().to_uppercase()),
            Style::default().fg(theme.background).bg(color).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(result.title.clone(), Style::default().fg(color).add_modifier(Modifier::BOLD)),
    ]));
    for row in wrap_text(&result.message, width) {
        lines.push(Line::from(format!("{INDENT}{row}")));
    }

    if let Some(advice) = result.advice.as_deref().filter(|a| !a.trim().is_empty()) {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            format!("{INDENT}Improvement Plan"),
            Style::default().fg(theme.advice).add_modifier(Modifier::BOLD),
        )));
        let inner_width = width.saturating_sub(INDENT.len()).max(1);
        for row in wrap_text(advice, inner_width) {
            lines.push(Line::from(Span::styled(
                format!("{INDENT}{INDENT}{row}"),
                Style::default().fg(theme.advice),
            )));
        }
        for row in wrap_text(ADVICE_DISCLAIMER, inner_width) {
            lines.push(Line::from(Span::styled(
                format!("{INDENT}{INDENT}{row}"),
                Style::default().fg(theme.muted).add_modifier(Modifier::ITALIC),
            )));
        }
    }
}

fn render_input(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let enabled = state.session.is_input_enabled();
    frame.render_widget(panel_block(" Your answer ", enabled, theme), area);
    let inner = inner_rect(area);

    let paragraph = if state.input.is_empty() {
        let placeholder = match state.session.step() {
            Step::Processing => "Processing...",
            Step::Done => "Application processed",
            _ => "Type your answer...",
        };
        Paragraph::new(Span::styled(placeholder, Style::default().fg(theme.muted)))
    } else {
        // Keep the tail visible when the answer is wider than the box.
        let overflow = state.input.width().saturating_sub(inner.width.saturating_sub(1));
        Paragraph::new(state.input.as_str().to_owned()).scroll((0, overflow))
    };
    frame.render_widget(paragraph, inner);

    if enabled && state.mode == Mode::Normal && inner.width > 0 {
        let x = inner.x + state.input.width().min(inner.width.saturating_sub(1));
        frame.set_cursor_position(Position { x, y: inner.y });
    }
}

/// Greedy word wrap to `width` columns. Explicit newlines are kept and words
/// longer than a row are split.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut rows = Vec::new();

    for paragraph in text.split('\n') {
        let mut row = String::new();
        let mut row_len = 0;
        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            let sep = usize::from(row_len > 0);
            if row_len + sep + word.len() <= width {
                if sep == 1 {
                    row.push(' ');
                }
                row.extend(word.iter());
                row_len += sep + word.len();
                continue;
            }
            if row_len > 0 {
                rows.push(std::mem::take(&mut row));
                row_len = 0;
            }
            while word.len() > width {
                rows.push(word.drain(..width).collect());
            }
            row_len = word.len();
            row.extend(word);
        }
        if row_len > 0 || rows.is_empty() || paragraph.trim().is_empty() {
            rows.push(row);
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use loanbot_core::types::LoanStatus;

    fn plain(lines: &[Line]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect::<String>())
            .collect()
    }

    #[test]
    fn advice_block_has_heading_and_disclaimer() {
        let result = LoanResult {
            status: LoanStatus::Conditional,
            title: "Conditional".into(),
            message: "Reduce your EMI.".into(),
            advice: Some("Pay down the car loan.".into()),
        };
        let mut lines = Vec::new();
        push_result(&mut lines, &result, 200, &Theme::dark());
        let text = plain(&lines);

        assert!(text.iter().any(|l| l.trim() == "Improvement Plan"));
        assert!(text.iter().any(|l| l.trim() == "Pay down the car loan."));
        assert_eq!(text.last().map(|l| l.trim()), Some(ADVICE_DISCLAIMER));
    }

    #[test]
    fn result_without_advice_has_no_plan() {
        let result = LoanResult {
            status: LoanStatus::Approved,
            title: "Approved".into(),
            message: "ok".into(),
            advice: None,
        };
        let mut lines = Vec::new();
        push_result(&mut lines, &result, 200, &Theme::dark());
        assert!(!plain(&lines).iter().any(|l| l.contains("Improvement Plan")));
    }

    #[test]
    fn wraps_on_word_boundaries() {
        assert_eq!(
            wrap_text("What is your monthly income?", 12),
            vec!["What is your", "monthly", "income?"]
        );
    }

    #[test]
    fn splits_words_longer_than_a_row() {
        assert_eq!(wrap_text("abcdefgh ij", 3), vec!["abc", "def", "gh", "ij"]);
    }

    #[test]
    fn keeps_explicit_line_breaks() {
        assert_eq!(wrap_text("one\n\ntwo", 10), vec!["one", "", "two"]);
    }

    #[test]
    fn empty_text_is_one_empty_row() {
        assert_eq!(wrap_text("", 10), vec![""]);
    }
}
