use crate::error::GuildError;

use super::types::LinkOpener;

/// Opens provider pages in the system browser.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserOpener;

impl LinkOpener for BrowserOpener {
    fn open(&self, url: &str) -> Result<(), GuildError> {
        let trimmed = url.trim();
        if trimmed.is_empty() {
            return Err(GuildError::InvalidInput("empty URL".to_string()));
        }
        webbrowser::open(trimmed).map_err(GuildError::from)
    }
}
