//! Medical-themed color palette and styles.

use ratatui::style::{Color, Modifier, Style};

/// Medical theme color palette.
pub struct MedicalTheme;

impl MedicalTheme {
    /// Deep teal (#0D9488)
    pub const PRIMARY: Color = Color::Rgb(13, 148, 136);
    pub const PRIMARY_LIGHT: Color = Color::Rgb(45, 212, 191);

    pub const SECONDARY_LIGHT: Color = Color::Rgb(148, 163, 184);

    pub const SUCCESS: Color = Color::Rgb(16, 185, 129);
    pub const WARNING: Color = Color::Rgb(251, 191, 36);
    pub const DANGER: Color = Color::Rgb(244, 63, 94);
    pub const INFO: Color = Color::Rgb(59, 130, 246);

    pub const BG_DARK: Color = Color::Rgb(15, 23, 42);

    pub const TEXT_PRIMARY: Color = Color::Rgb(248, 250, 252);
    pub const TEXT_SECONDARY: Color = Color::Rgb(148, 163, 184);
    pub const TEXT_MUTED: Color = Color::Rgb(100, 116, 139);

    #[must_use]
    pub fn title() -> Style {
        Style::default()
            .fg(Self::TEXT_PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn subtitle() -> Style {
        Style::default()
            .fg(Self::PRIMARY_LIGHT)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn text() -> Style {
        Style::default().fg(Self::TEXT_PRIMARY)
    }

    #[must_use]
    pub fn text_secondary() -> Style {
        Style::default().fg(Self::TEXT_SECONDARY)
    }

    #[must_use]
    pub fn text_muted() -> Style {
        Style::default().fg(Self::TEXT_MUTED)
    }

    #[must_use]
    pub fn warning() -> Style {
        Style::default().fg(Self::WARNING)
    }

    #[must_use]
    pub fn danger() -> Style {
        Style::default().fg(Self::DANGER)
    }

    #[must_use]
    pub fn info() -> Style {
        Style::default().fg(Self::INFO)
    }

    /// Highlighted choice in a selector
    #[must_use]
    pub fn selected() -> Style {
        Style::default()
            .fg(Self::BG_DARK)
            .bg(Self::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn focused() -> Style {
        Style::default()
            .fg(Self::PRIMARY_LIGHT)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn cursor() -> Style {
        Style::default().fg(Self::PRIMARY_LIGHT)
    }

    #[must_use]
    pub fn border() -> Style {
        Style::default().fg(Self::SECONDARY_LIGHT)
    }

    #[must_use]
    pub fn border_focused() -> Style {
        Style::default().fg(Self::PRIMARY)
    }

    #[must_use]
    pub fn key_hint() -> Style {
        Style::default()
            .fg(Self::PRIMARY_LIGHT)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn key_desc() -> Style {
        Style::default().fg(Self::TEXT_SECONDARY)
    }

    /// Line style for the survival curve
    #[must_use]
    pub fn curve() -> Style {
        Style::default().fg(Self::PRIMARY_LIGHT)
    }

    /// Headline color by survival probability (0.0-1.0).
    #[must_use]
    pub fn survival(probability: f64) -> Style {
        let color = if probability >= 0.7 {
            Self::SUCCESS
        } else if probability >= 0.4 {
            Self::WARNING
        } else {
            Self::DANGER
        };
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_survival_color_bands() {
        assert_eq!(MedicalTheme::survival(0.85).fg, Some(MedicalTheme::SUCCESS));
        assert_eq!(MedicalTheme::survival(0.7).fg, Some(MedicalTheme::SUCCESS));
        assert_eq!(MedicalTheme::survival(0.5).fg, Some(MedicalTheme::WARNING));
        assert_eq!(MedicalTheme::survival(0.1).fg, Some(MedicalTheme::DANGER));
    }
}
