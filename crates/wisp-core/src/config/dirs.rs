use directories::ProjectDirs;
use std::path::PathBuf;

/// Application directories following XDG spec
#[derive(Debug, Clone)]
pub struct Directories {
    /// Config directory (~/.config/wisp)
    pub config: PathBuf,

    /// Config file path
    pub config_file: PathBuf,
}

impl Directories {
    /// Create a new `Directories` instance with standard XDG paths.
    ///
    /// Falls back to `./.wisp` when no home directory can be determined.
    #[must_use]
    pub fn new() -> Self {
        let Some(project) = ProjectDirs::from("", "", "wisp") else {
            return Self::with_base(PathBuf::from(".wisp"));
        };

        let config = project.config_dir().to_path_buf();

        Self {
            config_file: config.join("config.json"),
            config,
        }
    }

    #[must_use]
    pub fn with_base(base: PathBuf) -> Self {
        Self {
            config_file: base.join("config.json"),
            config: base,
        }
    }
}

impl Default for Directories {
    fn default() -> Self {
        Self::new()
    }
}
