//! Admin dashboard: four decision counters above two bar charts.
//!
//! The left chart shows the decision distribution. The right chart groups a
//! risk bar and a score bar per recent application, showing as many groups as
//! fit the panel width.

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Paragraph, Wrap},
};

use loanbot_core::types::{DashboardStats, RiskProfile};

use crate::app::{AppState, DashboardView};
use crate::theme::Theme;
use crate::ui::layout::{inner_rect, panel_block};

/// Columns taken by one risk/score group: two 3-wide bars plus a 2-wide gap.
const GROUP_WIDTH: u16 = 8;

pub fn render_dashboard(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    match &state.dashboard {
        DashboardView::Checking | DashboardView::Loading => {
            let dots = ".".repeat((state.tick % 4) as usize);
            render_message(
                frame,
                area,
                vec![Line::from(Span::styled(
                    format!("Loading statistics{dots}"),
                    Style::default().fg(theme.muted),
                ))],
                theme,
            );
        }
        DashboardView::Failed(error) => {
            render_message(
                frame,
                area,
                vec![
                    Line::from(Span::styled(
                        "Could not load statistics",
                        Style::default().fg(theme.error).add_modifier(Modifier::BOLD),
                    )),
                    Line::from(error.clone()),
                    Line::default(),
                    Line::from(Span::styled("Press r to reload.", Style::default().fg(theme.muted))),
                ],
                theme,
            );
        }
        DashboardView::Loaded(stats) => render_stats(frame, area, stats, theme),
    }
}

fn render_message(frame: &mut Frame, area: Rect, lines: Vec<Line<'static>>, theme: &Theme) {
    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(panel_block(" Admin dashboard ", false, theme)),
        area,
    );
}

fn render_stats(frame: &mut Frame, area: Rect, stats: &DashboardStats, theme: &Theme) {
    let [counters, charts] =
        area.layout(&Layout::vertical([Constraint::Length(4), Constraint::Fill(1)]));
    render_counters(frame, counters, stats, theme);

    let [distribution, risk] = charts.layout(&Layout::horizontal([
        Constraint::Percentage(35),
        Constraint::Percentage(65),
    ]));
    render_distribution(frame, distribution, stats, theme);
    render_risk_profiles(frame, risk, &stats.risk_profiles(DashboardStats::RISK_PROFILE_LIMIT), theme);
}

fn render_counters(frame: &mut Frame, area: Rect, stats: &DashboardStats, theme: &Theme) {
    let cells: [Rect; 4] = area.layout(&Layout::horizontal([Constraint::Ratio(1, 4); 4]));
    let summary = &stats.summary;
    let counters = [
        (" Total ", summary.total, theme.accent),
        (" Approved ", summary.approved, theme.approved),
        (" Rejected ", summary.rejected, theme.rejected),
        (" Conditional ", summary.conditional, theme.conditional),
    ];

    for ((title, value, color), cell) in counters.into_iter().zip(cells.iter()) {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                value.to_string(),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )))
            .centered()
            .block(panel_block(title, false, theme)),
            *cell,
        );
    }
}

fn render_distribution(frame: &mut Frame, area: Rect, stats: &DashboardStats, theme: &Theme) {
    let bars: Vec<Bar> = stats
        .decision_distribution()
        .into_iter()
        .map(|(status, count)| {
            Bar::default()
                .value(count)
                .label(Line::from(status.label()))
                .style(Style::default().fg(theme.status_color(status)))
        })
        .collect();

    frame.render_widget(
        BarChart::default()
            .block(panel_block(" Decisions ", false, theme))
            .data(BarGroup::default().bars(&bars))
            .bar_width(9)
            .bar_gap(2),
        area,
    );
}

fn render_risk_profiles(frame: &mut Frame, area: Rect, profiles: &[RiskProfile], theme: &Theme) {
    let block = panel_block(" Recent applications: risk % / score ", false, theme);

    if profiles.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled("No recent applications.", Style::default().fg(theme.muted)))
                .block(block),
            area,
        );
        return;
    }

    let fit = usize::from((inner_rect(area).width / GROUP_WIDTH).max(1));
    let mut chart = BarChart::default()
        .block(block)
        .bar_width(3)
        .bar_gap(0)
        .group_gap(2);

    for profile in profiles.iter().take(fit) {
        let bars = [
            Bar::default()
                .value(profile.risk_percent.round().max(0.0) as u64)
                .text_value(format!("{:.0}", profile.risk_percent))
                .style(Style::default().fg(theme.risk_bar)),
            Bar::default()
                .value(profile.score.round().max(0.0) as u64)
                .text_value(format!("{:.0}", profile.score))
                .style(Style::default().fg(theme.score_bar)),
        ];
        chart = chart.data(
            BarGroup::default()
                .label(Line::from(profile.label.clone()))
                .bars(&bars),
        );
    }

    frame.render_widget(chart, area);
}
