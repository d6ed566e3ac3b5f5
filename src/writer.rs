use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

/// Mirrors single values into `{folder}/{name}.txt`.
///
/// Every write opens, truncates and closes the file so overlay software can
/// read it between updates without contending for a held handle.
#[derive(Debug, Clone)]
pub struct StatFileWriter {
    folder: PathBuf,
}

impl StatFileWriter {
    pub fn new(folder: impl Into<PathBuf>) -> Result<Self> {
        let folder = folder.into();
        fs::create_dir_all(&folder)
            .with_context(|| format!("failed creating output folder at {}", folder.display()))?;
        Ok(Self { folder })
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.folder.join(format!("{name}.txt"))
    }

    pub fn write_stat(&self, name: &str, value: &str) -> Result<()> {
        let path = self.path_for(name);
        fs::write(&path, value)
            .with_context(|| format!("failed writing stat file {}", path.display()))?;
        Ok(())
    }
}
