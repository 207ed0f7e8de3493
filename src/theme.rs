//! Theme mapping and sentence highlight styling for the practice view.

use crate::config::{HighlightColor, ThemeMode};
use iced::widget::button;
use iced::{Background, Color, Theme, border};

pub fn iced_theme(mode: ThemeMode) -> Theme {
    match mode {
        ThemeMode::Day => Theme::Light,
        ThemeMode::Night => Theme::Dark,
    }
}

pub fn to_color(c: HighlightColor) -> Color {
    Color {
        r: c.r.clamp(0.0, 1.0),
        g: c.g.clamp(0.0, 1.0),
        b: c.b.clamp(0.0, 1.0),
        a: c.a.clamp(0.0, 1.0),
    }
}

/// Style for one sentence row: a flat text button, tinted when the sentence
/// is the active one or sits inside the selected range.
pub fn sentence_style(tint: Option<Color>) -> impl Fn(&Theme, button::Status) -> button::Style {
    move |theme: &Theme, status: button::Status| {
        let palette = theme.extended_palette();
        let background = match (tint, status) {
            (Some(color), _) => Some(Background::Color(color)),
            (None, button::Status::Hovered) => {
                Some(Background::Color(palette.background.weak.color))
            }
            (None, _) => None,
        };
        button::Style {
            background,
            text_color: palette.background.base.text,
            border: border::rounded(4),
            ..button::Style::default()
        }
    }
}
