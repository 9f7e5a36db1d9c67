// Mon Oct 19 2026 - Alex

use crate::analysis::DEFAULT_PROCEDURE_WINDOW;
use crate::memory::{ByteImage, DEFAULT_VIRTUAL_BASE};
use crate::pattern::Matcher;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub virtual_base: u64,
    pub procedure_window: usize,
    pub ignore_whitespace: bool,
    pub map_files: bool,
    pub parallel: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            virtual_base: DEFAULT_VIRTUAL_BASE,
            procedure_window: DEFAULT_PROCEDURE_WINDOW,
            ignore_whitespace: false,
            map_files: false,
            parallel: true,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate().map_err(|e| anyhow::anyhow!(e))?;
        log::debug!("Loaded config from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn with_virtual_base(mut self, base: u64) -> Self {
        self.virtual_base = base;
        self
    }

    pub fn with_procedure_window(mut self, window: usize) -> Self {
        self.procedure_window = window;
        self
    }

    pub fn with_ignore_whitespace(mut self, ignore: bool) -> Self {
        self.ignore_whitespace = ignore;
        self
    }

    pub fn with_map_files(mut self, map: bool) -> Self {
        self.map_files = map;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.procedure_window == 0 {
            return Err("procedure_window must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Loads `path` the way this config asks for: mapped or read into memory.
    pub fn open_image<P: AsRef<Path>>(&self, path: P) -> Result<ByteImage<'static>, crate::memory::MemoryError> {
        let image = if self.map_files {
            ByteImage::map_file(path)?
        } else {
            ByteImage::from_file(path)?
        };
        Ok(image.with_virtual_base(self.virtual_base))
    }

    /// A fresh matcher over `image` with this config's scan settings.
    pub fn matcher<'a>(&self, image: &'a ByteImage<'a>) -> Matcher<'a> {
        image
            .matcher()
            .with_procedure_window(self.procedure_window)
            .with_lenient_patterns(self.ignore_whitespace)
    }
}
