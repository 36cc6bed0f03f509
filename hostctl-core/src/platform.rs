//! Platform detection and OS-specific directories.

use std::path::PathBuf;
use crate::constants;
use crate::error::{HcError, HcResult};

/// Detected operating system platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    Linux,
}

impl Platform {
    /// Detect the current platform at compile time.
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Linux
        }
    }

    /// Get the platform-specific application data directory.
    ///
    /// - Windows: `%APPDATA%/hostctl`
    /// - macOS: `~/Library/Application Support/hostctl`
    /// - Linux: `~/.local/share/hostctl`
    pub fn data_dir() -> HcResult<PathBuf> {
        let base = dirs::data_dir()
            .ok_or_else(|| HcError::Config("could not determine data directory".into()))?;
        Ok(base.join(constants::APP_NAME))
    }

    /// Get the platform-specific configuration directory.
    ///
    /// - Windows: `%APPDATA%/hostctl`
    /// - macOS: `~/Library/Application Support/hostctl`
    /// - Linux: `~/.config/hostctl`
    pub fn config_dir() -> HcResult<PathBuf> {
        let base = dirs::config_dir()
            .ok_or_else(|| HcError::Config("could not determine config directory".into()))?;
        Ok(base.join(constants::APP_NAME))
    }

    /// Get a human-readable platform name.
    pub fn name(&self) -> &'static str {
        match self {
            Platform::Windows => "Windows",
            Platform::MacOs => "macOS",
            Platform::Linux => "Linux",
        }
    }

    /// User-Agent header value sent with every request.
    pub fn user_agent() -> String {
        format!(
            "{}/{} ({})",
            constants::APP_NAME,
            constants::APP_VERSION,
            Self::current().name()
        )
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
