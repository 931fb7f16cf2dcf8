//! Screen frame shared by every view: a main area plus a 1-row status bar.
//!
//! Pure layout arithmetic plus the two widgets every screen reuses (panel
//! blocks and the status bar). Called inside `terminal.draw()` on every render so
//! each frame reflects the current terminal size.

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Margin, Rect},
    style::{Modifier, Style},
    symbols::merge::MergeStrategy,
    text::{Line, Span},
    widgets::{Block, BorderType, Paragraph},
};

use loanbot_core::types::Step;

use crate::app::{AppState, DashboardView, Screen};
use crate::theme::Theme;

/// Returns `[main, status_bar]` for the current frame.
pub fn compute_layout(frame: &Frame) -> [Rect; 2] {
    frame
        .area()
        .layout(&Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]))
}

/// Returns the inner `Rect` of a panel after removing the 1-cell border on each side.
pub fn inner_rect(area: Rect) -> Rect {
    area.inner(Margin { vertical: 1, horizontal: 1 })
}

/// Builds a bordered `Block` for a panel.
///
/// Focused panels get a thick border in the active color. `MergeStrategy::Fuzzy`
/// keeps junctions correct where thick and plain borders meet.
pub fn panel_block<'a>(title: &'a str, is_focused: bool, theme: &Theme) -> Block<'a> {
    let border_style = if is_focused {
        Style::default().fg(theme.border_active)
    } else {
        Style::default().fg(theme.border_inactive)
    };
    let border_type = if is_focused { BorderType::Thick } else { BorderType::Plain };

    Block::bordered()
        .title(title)
        .border_type(border_type)
        .border_style(border_style)
        .merge_borders(MergeStrategy::Fuzzy)
}

/// Renders the status bar: screen indicator, progress, and the keys that matter now.
pub fn render_status_bar(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let screen_text = match state.screen {
        Screen::Chat => " CHAT ",
        Screen::Login => " LOGIN ",
        Screen::Dashboard => " ADMIN ",
    };

    let mut spans = vec![
        Span::styled(
            screen_text,
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
    ];
    spans.push(Span::raw(status_detail(state)));

    frame.render_widget(
        Paragraph::new(Line::from(spans))
            .style(Style::default().bg(theme.status_bar_bg).fg(theme.status_bar_fg)),
        area,
    );
}

fn status_detail(state: &AppState) -> String {
    match state.screen {
        Screen::Chat => {
            let step = state.session.step();
            let mut text = match step {
                Step::Processing => "Checking eligibility  Esc cancel".to_owned(),
                Step::Done => "Done  Ctrl-c quit  F2 admin".to_owned(),
                _ => {
                    let n = Step::QUESTIONS.iter().position(|s| *s == step).unwrap_or(0) + 1;
                    format!("Question {n}/{}  Enter send  F1 help  F2 admin", Step::QUESTIONS.len())
                }
            };
            if state.session.can_retry() && !state.is_submitting() {
                text.push_str("  Ctrl-r retry last application");
            }
            if state.transcript_scroll > 0 {
                text.push_str("  End follow");
            }
            text
        }
        Screen::Login if state.login.busy => "Checking credentials".to_owned(),
        Screen::Login => "Tab switch field  Enter sign in  Esc back".to_owned(),
        Screen::Dashboard => match state.dashboard {
            DashboardView::Checking | DashboardView::Loading => "Loading statistics".to_owned(),
            _ => "r reload  x sign out  Esc chat  q quit".to_owned(),
        },
    }
}
