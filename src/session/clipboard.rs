use std::error::Error;
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// How long the "copied" indicator stays up after a copy.
pub const COPIED_FLAG_DURATION: Duration = Duration::from_millis(1500);

#[derive(Debug)]
pub struct ClipboardError(pub(crate) String);

impl fmt::Display for ClipboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "clipboard error: {}", self.0)
    }
}

impl Error for ClipboardError {}

pub trait Clipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// The desktop clipboard. Opened on first use so headless hosts only fail
/// when a copy is actually attempted.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl Clipboard for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        if self.inner.is_none() {
            let clipboard =
                arboard::Clipboard::new().map_err(|e| ClipboardError(e.to_string()))?;
            self.inner = Some(clipboard);
        }

        match self.inner.as_mut() {
            Some(clipboard) => clipboard
                .set_text(text.to_owned())
                .map_err(|e| ClipboardError(e.to_string())),
            None => Err(ClipboardError("clipboard unavailable".to_string())),
        }
    }
}

#[derive(Debug, Default)]
pub struct CopyFlag {
    copied_at: Option<Instant>,
}

impl CopyFlag {
    pub fn mark(&mut self) {
        debug!("Output copied to clipboard");
        self.copied_at = Some(Instant::now());
    }

    pub fn clear(&mut self) {
        self.copied_at = None;
    }

    pub fn is_active(&self) -> bool {
        self.copied_at
            .is_some_and(|at| at.elapsed() < COPIED_FLAG_DURATION)
    }
}
