use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    pub fn config_path() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("XDG_CONFIG_HOME") {
            Some(PathBuf::from(home).join("mathtower").join("config.json"))
        } else {
            ProjectDirs::from("", "", "mathtower")
                .map(|proj_dirs| proj_dirs.config_dir().join("config.json"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_path_ends_with_config_json() {
        if let Some(path) = AppDirs::config_path() {
            assert!(path.ends_with("config.json"));
            assert!(path.to_string_lossy().contains("mathtower"));
        }
    }
}
