use std::env;
use std::path::PathBuf;

pub const SHADER_DIR_VAR: &str = "TETRA_SHADER_DIR";
pub const ROTATE_VAR: &str = "TETRA_ROTATE";

/// Startup settings read from the environment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    /// Directory holding the WGSL sources; embedded sources are used when unset.
    pub shader_dir: Option<PathBuf>,
    /// Whether the model starts out auto-rotating.
    pub rotate: bool,
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_vars(env::var(SHADER_DIR_VAR).ok(), env::var(ROTATE_VAR).ok())
    }

    fn from_vars(shader_dir: Option<String>, rotate: Option<String>) -> Self {
        Settings {
            shader_dir: shader_dir.filter(|dir| !dir.is_empty()).map(PathBuf::from),
            rotate: rotate.as_deref().map_or(false, parse_flag),
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "on" | "yes"
    )
}
