//! Theme shared between pages.

use std::sync::Arc;

use tokio::sync::watch;

use probehub_domain::settings::Theme;

/// Current theme, created once and handed to every page that reads or
/// switches it.
#[derive(Debug, Clone)]
pub struct ThemeContext {
    sender: Arc<watch::Sender<Theme>>,
}

impl Default for ThemeContext {
    fn default() -> Self {
        Self::new(Theme::default())
    }
}

impl ThemeContext {
    #[must_use]
    pub fn new(initial: Theme) -> Self {
        let (sender, _) = watch::channel(initial);
        Self {
            sender: Arc::new(sender),
        }
    }

    #[must_use]
    pub fn theme(&self) -> Theme {
        *self.sender.borrow()
    }

    pub fn set_theme(&self, theme: Theme) {
        self.sender.send_if_modified(|current| {
            let changed = *current != theme;
            *current = theme;
            changed
        });
    }

    pub fn toggle(&self) {
        self.set_theme(Theme::from_dark(!self.theme().is_dark()));
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Theme> {
        self.sender.subscribe()
    }
}
