use crate::error::{Error, Result};

pub trait ClipboardSink {
    /// Returns `true` only if the value was placed on the clipboard.
    fn try_send(&mut self, value: &str) -> bool;
}

/// On X11 the selection is served by this process, so keep the sink alive
/// until the result has been shown.
#[derive(Default)]
pub struct SystemClipboard {
    clipboard: Option<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    fn send(&mut self, value: &str) -> Result<()> {
        let clipboard = match self.clipboard.take() {
            Some(clipboard) => clipboard,
            None => arboard::Clipboard::new().map_err(|e| Error::SinkUnavailable(e.to_string()))?,
        };
        self.clipboard
            .insert(clipboard)
            .set_text(value)
            .map_err(|e| Error::SinkUnavailable(e.to_string()))
    }

    pub fn is_open(&self) -> bool {
        self.clipboard.is_some()
    }
}

impl ClipboardSink for SystemClipboard {
    fn try_send(&mut self, value: &str) -> bool {
        match self.send(value) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(error = %e, "clipboard copy skipped");
                false
            }
        }
    }
}
