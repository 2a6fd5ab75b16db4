use owo_colors::Style;
use std::sync::OnceLock;

static THEME: OnceLock<Theme> = OnceLock::new();

/// Terminal styles. Answer headlines get one style per kind of source so a
/// stored answer never looks like a generated one.
#[derive(Debug, Clone)]
pub struct Theme {
    pub header: Style,
    pub success: Style,
    pub error: Style,
    pub warn: Style,
    pub label: Style,
    pub dim: Style,
    /// Headline of an answer taken from the FAQ data
    pub stored: Style,
    /// Headline of a generated (unverified) answer
    pub generated: Style,
    pub prompt: Style,
}

impl Theme {
    /// Colors only when stdout is a terminal and `CLICOLOR`/`NO_COLOR` allow it
    pub fn detect() -> Self {
        if console::Term::stdout().is_term() && console::colors_enabled() {
            Self::colored()
        } else {
            Self::plain()
        }
    }

    pub fn colored() -> Self {
        Self {
            header: Style::new().cyan().bold(),
            success: Style::new().green().bold(),
            error: Style::new().red().bold(),
            warn: Style::new().yellow().bold(),
            label: Style::new().magenta(),
            dim: Style::new().bright_black(),
            stored: Style::new().green().bold(),
            generated: Style::new().blue().bold(),
            prompt: Style::new().cyan(),
        }
    }

    pub fn plain() -> Self {
        let none = Style::new();
        Self {
            header: none,
            success: none,
            error: none,
            warn: none,
            label: none,
            dim: none,
            stored: none,
            generated: none,
            prompt: none,
        }
    }
}

pub fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::detect)
}
