use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

use super::InitError;

pub const VERTEX_FILE: &str = "simple.vert.wgsl";
pub const FRAGMENT_FILE: &str = "simple.frag.wgsl";

/// WGSL sources for the vertex and fragment stages.
#[derive(Clone, Debug)]
pub struct ShaderSources {
    pub vertex: Cow<'static, str>,
    pub fragment: Cow<'static, str>,
}

impl ShaderSources {
    pub fn embedded() -> Self {
        ShaderSources {
            vertex: Cow::Borrowed(include_str!("simple.vert.wgsl")),
            fragment: Cow::Borrowed(include_str!("simple.frag.wgsl")),
        }
    }

    /// Reads both stages from `dir`, which must contain
    /// `simple.vert.wgsl` and `simple.frag.wgsl`.
    pub fn from_dir(dir: &Path) -> Result<Self, InitError> {
        Ok(ShaderSources {
            vertex: Cow::Owned(read_source(dir.join(VERTEX_FILE))?),
            fragment: Cow::Owned(read_source(dir.join(FRAGMENT_FILE))?),
        })
    }

    pub fn load(dir: Option<&Path>) -> Result<Self, InitError> {
        match dir {
            Some(dir) => Self::from_dir(dir),
            None => Ok(Self::embedded()),
        }
    }
}

fn read_source(path: PathBuf) -> Result<String, InitError> {
    log::debug!("reading shader {}", path.display());
    fs::read_to_string(&path).map_err(|source| InitError::ShaderRead { path, source })
}
