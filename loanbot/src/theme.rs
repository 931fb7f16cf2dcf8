//! Color theme system for loanbot.
//!
//! A `Theme` holds named `ratatui::style::Color` fields covering every UI surface
//! loanbot renders. Two built-in themes are provided:
//!
//! - `dark` uses ANSI 16 colors so it works on any terminal, including
//!   256-color SSH sessions with no truecolor support.
//! - `catppuccin_mocha` is the Catppuccin Mocha palette in RGB; requires truecolor.

use ratatui::style::Color;
use tracing::warn;

use loanbot_core::types::LoanStatus;

#[derive(Debug, Clone)]
pub struct Theme {
    // Panel borders
    /// Border color for the panel that takes input.
    pub border_active: Color,
    pub border_inactive: Color,

    // Conversation
    /// Speaker label for assistant messages.
    pub bot_badge: Color,
    /// Speaker label for applicant messages.
    pub user_badge: Color,
    pub message_text: Color,
    /// Timestamps, placeholders, and other secondary text.
    pub muted: Color,

    // Decisions
    pub approved: Color,
    pub rejected: Color,
    pub conditional: Color,
    /// Body text of the improvement advice block.
    pub advice: Color,

    // Dashboard
    /// Risk bars in the applicant risk chart.
    pub risk_bar: Color,
    /// Score bars in the applicant risk chart.
    pub score_bar: Color,

    pub error: Color,
    /// Headings and highlights.
    pub accent: Color,

    // Status bar
    pub status_bar_bg: Color,
    pub status_bar_fg: Color,

    pub background: Color,
}

impl Theme {
    /// Returns the built-in dark theme using ANSI 16 colors.
    pub fn dark() -> Self {
        Self {
            border_active: Color::Cyan,
            border_inactive: Color::DarkGray,

            bot_badge: Color::Cyan,
            user_badge: Color::Green,
            message_text: Color::Reset,
            muted: Color::DarkGray,

            approved: Color::Green,
            rejected: Color::Red,
            conditional: Color::Yellow,
            advice: Color::Blue,

            risk_bar: Color::Red,
            score_bar: Color::Cyan,

            error: Color::Red,
            accent: Color::Magenta,

            status_bar_bg: Color::DarkGray,
            status_bar_fg: Color::White,

            background: Color::Reset,
        }
    }

    /// Returns the Catppuccin Mocha theme using RGB truecolor values.
    ///
    /// Palette source: <https://github.com/catppuccin/catppuccin> Mocha variant.
    pub fn catppuccin_mocha() -> Self {
        // Catppuccin Mocha palette (selected subset)
        let green = Color::Rgb(166, 227, 161);    // #a6e3a1
        let red = Color::Rgb(243, 139, 168);      // #f38ba8
        let yellow = Color::Rgb(249, 226, 175);   // #f9e2af
        let blue = Color::Rgb(137, 180, 250);     // #89b4fa
        let teal = Color::Rgb(148, 226, 213);     // #94e2d5
        let lavender = Color::Rgb(180, 190, 254); // #b4befe
        let mauve = Color::Rgb(203, 166, 247);    // #cba6f7
        let overlay1 = Color::Rgb(127, 132, 156); // #7f849c
        let surface1 = Color::Rgb(69, 71, 90);    // #45475a
        let base = Color::Rgb(30, 30, 46);        // #1e1e2e
        let text = Color::Rgb(205, 214, 244);     // #cdd6f4

        Self {
            border_active: lavender,
            border_inactive: overlay1,

            bot_badge: teal,
            user_badge: green,
            message_text: text,
            muted: overlay1,

            approved: green,
            rejected: red,
            conditional: yellow,
            advice: blue,

            risk_bar: red,
            score_bar: teal,

            error: red,
            accent: mauve,

            status_bar_bg: surface1,
            status_bar_fg: text,

            background: base,
        }
    }

    /// Resolves a theme name from config. Unknown names fall back to `dark()`
    /// with a warning in the log.
    pub fn from_name(name: &str) -> Self {
        match name {
            "catppuccin-mocha" | "catppuccin_mocha" => Self::catppuccin_mocha(),
            "dark" => Self::dark(),
            other => {
                warn!(theme = other, "unknown theme, falling back to 'dark'");
                Self::dark()
            }
        }
    }

    pub fn status_color(&self, status: LoanStatus) -> Color {
        match status {
            LoanStatus::Approved => self.approved,
            LoanStatus::Rejected => self.rejected,
            LoanStatus::Conditional => self.conditional,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_name_falls_back_to_dark() {
        assert_eq!(Theme::from_name("solarized").approved, Theme::dark().approved);
        assert_eq!(
            Theme::from_name("catppuccin_mocha").background,
            Theme::catppuccin_mocha().background
        );
    }
}
