//! Platform detection for wisp
//!
//! Plugins list the operating systems they run on; the manager skips plugins
//! that do not list the current one.

/// Supported platforms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Macos,
    Linux,
    /// Unknown/unsupported platform
    Unknown,
}

impl Platform {
    /// Get the platform identifier string used in plugin metadata
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Windows => "Windows",
            Platform::Macos => "Macos",
            Platform::Linux => "Linux",
            Platform::Unknown => "Unknown",
        }
    }

    /// Whether a plugin's `supported_os` list includes this platform.
    /// Matching is case-insensitive; an empty list means every platform.
    pub fn is_listed_in(self, supported_os: &[String]) -> bool {
        supported_os.is_empty()
            || supported_os
                .iter()
                .any(|os| os.eq_ignore_ascii_case(self.as_str()))
    }
}

/// Detect the current platform
pub fn detect() -> Platform {
    #[cfg(target_os = "macos")]
    return Platform::Macos;

    #[cfg(target_os = "windows")]
    return Platform::Windows;

    #[cfg(target_os = "linux")]
    return Platform::Linux;

    #[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
    Platform::Unknown
}
