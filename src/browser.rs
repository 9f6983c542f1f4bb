use crate::error::{Error, Result};
use std::process::Command;
use url::Url;

#[cfg(target_os = "macos")]
pub const DEFAULT_OPENER: &str = "open";
#[cfg(not(target_os = "macos"))]
pub const DEFAULT_OPENER: &str = "xdg-open";

/// Something that can show the hosted payment page to the user.
pub trait PaymentBrowser {
    fn present(&self, url: &Url) -> Result<()>;
}

/// Hands the URL to the desktop's URL opener.
#[derive(Debug, Clone)]
pub struct SystemBrowser {
    opener: String,
}

impl SystemBrowser {
    pub fn new() -> SystemBrowser {
        SystemBrowser::with_opener(DEFAULT_OPENER)
    }

    pub fn with_opener<T: ToString>(opener: T) -> SystemBrowser {
        SystemBrowser {
            opener: opener.to_string(),
        }
    }

    pub fn opener(&self) -> &str {
        &self.opener
    }
}

impl Default for SystemBrowser {
    fn default() -> Self {
        SystemBrowser::new()
    }
}

impl PaymentBrowser for SystemBrowser {
    fn present(&self, url: &Url) -> Result<()> {
        tracing::info!(opener = %self.opener, url = %url, "opening payment page");

        let status = Command::new(&self.opener)
            .arg(url.as_str())
            .status()
            .map_err(|e| Error::Browser(format!("failed to launch {}: {}", self.opener, e)))?;

        if status.success() {
            Ok(())
        } else {
            Err(Error::Browser(format!("{} exited with {}", self.opener, status)))
        }
    }
}
