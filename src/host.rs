//! Browser services the augmented page relies on: opening a URL in a new
//! browsing context and writing to the clipboard.

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;

#[cfg(any(test, feature = "testing"))]
use mockall::automock;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("Clipboard access failed: {0}")]
    Clipboard(String),

    #[error("Could not open {url}: {reason}")]
    OpenUrl { url: String, reason: String },

    #[error("URL opening is unsupported on `{0}`")]
    UnsupportedPlatform(String),
}

#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait BrowserHost: Send + Sync {
    /// Open `url` in a new tab/window.
    async fn open_in_new_context(&self, url: &str) -> Result<(), HostError>;

    /// Replace the clipboard content with `text`.
    async fn write_clipboard(&self, text: &str) -> Result<(), HostError>;
}

/// Desktop implementation: system clipboard and the platform URL opener.
#[derive(Debug, Clone, Default)]
pub struct SystemHost;

const NO_ARGS: &[&str] = &[];
const WINDOWS_START_ARGS: &[&str] = &["/C", "start", ""];

impl SystemHost {
    fn opener_for_os(target_os: &str) -> Result<(&'static str, &'static [&'static str]), HostError> {
        match target_os {
            "macos" => Ok(("open", NO_ARGS)),
            "linux" | "freebsd" | "openbsd" | "netbsd" => Ok(("xdg-open", NO_ARGS)),
            "windows" => Ok(("cmd", WINDOWS_START_ARGS)),
            other => Err(HostError::UnsupportedPlatform(other.to_string())),
        }
    }
}

#[async_trait]
impl BrowserHost for SystemHost {
    async fn open_in_new_context(&self, url: &str) -> Result<(), HostError> {
        let (program, prefix_args) = Self::opener_for_os(std::env::consts::OS)?;
        let status = Command::new(program)
            .args(prefix_args)
            .arg(url)
            .status()
            .await
            .map_err(|e| HostError::OpenUrl {
                url: url.to_string(),
                reason: format!("failed to spawn '{program}': {e}"),
            })?;
        if !status.success() {
            return Err(HostError::OpenUrl {
                url: url.to_string(),
                reason: format!("'{program}' exited with status: {status}"),
            });
        }
        tracing::debug!(url, "Opened URL");
        Ok(())
    }

    async fn write_clipboard(&self, text: &str) -> Result<(), HostError> {
        let text = text.to_string();
        tokio::task::spawn_blocking(move || {
            let mut clipboard =
                arboard::Clipboard::new().map_err(|e| HostError::Clipboard(e.to_string()))?;
            clipboard
                .set_text(text)
                .map_err(|e| HostError::Clipboard(e.to_string()))
        })
        .await
        .map_err(|e| HostError::Clipboard(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opener_per_platform() {
        assert_eq!(SystemHost::opener_for_os("linux").unwrap().0, "xdg-open");
        assert_eq!(SystemHost::opener_for_os("macos").unwrap().0, "open");
        assert_eq!(
            SystemHost::opener_for_os("windows").unwrap(),
            ("cmd", &["/C", "start", ""][..])
        );
        assert_eq!(
            SystemHost::opener_for_os("plan9"),
            Err(HostError::UnsupportedPlatform("plan9".to_string()))
        );
    }
}
