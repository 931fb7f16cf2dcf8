//! Admin sign-in form, centred over the main area.

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Position, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph},
};

use crate::app::{AppState, LoginField, Mode};
use crate::theme::Theme;
use crate::ui::layout::{inner_rect, panel_block};

pub fn render_login(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let form_area = area.centered(Constraint::Length(50), Constraint::Length(12));
    frame.render_widget(Clear, form_area);
    frame.render_widget(panel_block(" Admin sign in ", true, theme), form_area);

    let [user_label, user_box, pass_label, pass_box, message] = inner_rect(form_area).layout(
        &Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Fill(1),
        ]),
    );

    let form = &state.login;
    let label_style = Style::default().fg(theme.muted);
    frame.render_widget(Paragraph::new(Span::styled("Username", label_style)), user_label);
    frame.render_widget(Paragraph::new(Span::styled("Password", label_style)), pass_label);

    let user_focused = form.field == LoginField::Username;
    frame.render_widget(
        Paragraph::new(form.username.as_str().to_owned()).block(panel_block("", user_focused, theme)),
        user_box,
    );
    frame.render_widget(
        Paragraph::new(form.password.masked()).block(panel_block("", !user_focused, theme)),
        pass_box,
    );

    let status = if form.busy {
        Line::from(Span::styled(
            "Checking credentials...",
            Style::default().fg(theme.muted).add_modifier(Modifier::ITALIC),
        ))
    } else if let Some(error) = &form.error {
        Line::from(Span::styled(error.clone(), Style::default().fg(theme.error)))
    } else {
        Line::default()
    };
    frame.render_widget(Paragraph::new(status), message);

    if state.mode == Mode::Normal && !form.busy {
        let (field_box, width) = if user_focused {
            (user_box, form.username.width())
        } else {
            (pass_box, form.password.width())
        };
        let inner = inner_rect(field_box);
        if inner.width > 0 {
            let x = inner.x + width.min(inner.width.saturating_sub(1));
            frame.set_cursor_position(Position { x, y: inner.y });
        }
    }
}
