//! Help overlay renderer for loanbot.
//!
//! Draws a centred modal box over the active screen using ratatui's `Clear`
//! widget to erase the background first. The overlay is rendered inside the same
//! `terminal.draw()` closure as everything else.

use ratatui::{
    Frame,
    layout::Constraint,
    style::{Modifier, Style},
    text::{Line, Text},
    widgets::{Block, Clear, Paragraph, Wrap},
};

use crate::theme::Theme;

/// Renders the help overlay as a centred modal, scrolled by `help_scroll` rows.
///
/// Skipped on terminals narrower than 60 columns.
pub fn render_help_overlay(frame: &mut Frame, theme: &Theme, help_scroll: u16) {
    if frame.area().width < 60 {
        return;
    }

    let overlay_area = frame
        .area()
        .centered(Constraint::Percentage(80), Constraint::Percentage(80));

    frame.render_widget(Clear, overlay_area);

    let block = Block::bordered()
        .title(" Help (j/k scroll, ? or Esc to dismiss) ")
        .border_style(Style::default().fg(theme.border_active));

    frame.render_widget(
        Paragraph::new(build_help_text(theme))
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((help_scroll, 0)),
        overlay_area,
    );
}

fn build_help_text(theme: &Theme) -> Text<'static> {
    let heading = |s: &'static str| {
        Line::styled(s, Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
    };
    Text::from(vec![
        heading("Chat"),
        Line::from("  Enter         Send the answer in the input box"),
        Line::from("  Backspace     Delete the last character"),
        Line::from("  Esc           Cancel a running submission, or clear the input"),
        Line::from("  Ctrl-r        Resubmit the last application after an error"),
        Line::from("  PgUp / PgDn   Scroll the conversation"),
        Line::from("  End           Follow the newest message"),
        Line::from("  F2            Open the admin dashboard"),
        Line::from(""),
        heading("Admin login"),
        Line::from("  Tab / Up / Dn Switch between username and password"),
        Line::from("  Enter         Next field, then sign in"),
        Line::from("  Esc           Back to the chat"),
        Line::from(""),
        heading("Dashboard"),
        Line::from("  r             Reload statistics"),
        Line::from("  x             Sign out"),
        Line::from("  Esc           Back to the chat"),
        Line::from("  q             Quit"),
        Line::from(""),
        heading("General"),
        Line::from("  ? / F1        Open or close this help (? only on an empty input)"),
        Line::from("  Ctrl-c        Quit from any screen"),
    ])
}
