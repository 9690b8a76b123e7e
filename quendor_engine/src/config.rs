//! The `.quendor` configuration file.
//!
//! The file is split into sections by lines holding only `%%`. The first
//! section carries defaults; each later section names the titles it applies
//! to on an `id:` line and overrides whichever fields it sets.
//!
//! ```text
//! width: 1024
//! height: 768
//! title: Unknown Program
//! %%
//! id: 41.890504 74.890714
//! title: Arthur: The Quest for Excalibur
//! blorb: arthur.blb
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use once_cell::sync::Lazy;
use quendor_formats::TitleIdentity;
use regex::Regex;
use serde::Serialize;

use crate::error::StartupError;
use crate::search::SearchPaths;

pub const CONFIG_FILE_NAME: &str = ".quendor";

static SECTION_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*%%[ \t]*\r?$").expect("section break pattern"));

static ID_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*id:(.*)$").expect("id line pattern"));

static FIELD_LINES: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    ProgramConfig::KEYS
        .iter()
        .map(|key| {
            let pattern = format!(r"(?m)^[ \t]*{}:(.*)$", regex::escape(key));
            (*key, Regex::new(&pattern).expect("field line pattern"))
        })
        .collect()
});

/// Resolved per-title settings. An empty string means the field is unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProgramConfig {
    pub title: String,
    pub width: String,
    pub height: String,
    pub blorb: String,
    pub terpnum: String,
}

impl ProgramConfig {
    pub const KEYS: [&'static str; 5] = ["title", "width", "height", "blorb", "terpnum"];

    /// Pull every recognised field out of one section of the file. The first
    /// line for a key wins; absent keys stay empty.
    pub fn from_section(section: &str) -> Self {
        let mut config = ProgramConfig::default();
        for (key, pattern) in FIELD_LINES.iter() {
            if let Some(caps) = pattern.captures(section) {
                let value = caps.get(1).map_or("", |m| m.as_str()).trim();
                if let Some(field) = config.field_mut(key) {
                    *field = value.to_string();
                }
            }
        }
        config
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        match key {
            "title" => Some(&self.title),
            "width" => Some(&self.width),
            "height" => Some(&self.height),
            "blorb" => Some(&self.blorb),
            "terpnum" => Some(&self.terpnum),
            _ => None,
        }
    }

    fn field_mut(&mut self, key: &str) -> Option<&mut String> {
        match key {
            "title" => Some(&mut self.title),
            "width" => Some(&mut self.width),
            "height" => Some(&mut self.height),
            "blorb" => Some(&mut self.blorb),
            "terpnum" => Some(&mut self.terpnum),
            _ => None,
        }
    }

    pub fn entries(&self) -> [(&'static str, &str); 5] {
        [
            ("title", &self.title),
            ("width", &self.width),
            ("height", &self.height),
            ("blorb", &self.blorb),
            ("terpnum", &self.terpnum),
        ]
    }

    /// Fill every empty field of `self` from `defaults`.
    pub fn overlay(mut self, defaults: &ProgramConfig) -> ProgramConfig {
        for key in Self::KEYS {
            let fallback = defaults.get(key).unwrap_or_default();
            if let Some(field) = self.field_mut(key) {
                if field.is_empty() {
                    *field = fallback.to_string();
                }
            }
        }
        self
    }
}

/// A parsed `.quendor` file, or an empty one when none was found.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    path: Option<PathBuf>,
    sections: Vec<String>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        ConfigFile::parse("")
    }
}

impl ConfigFile {
    /// Search the configuration directories. A missing file is not an
    /// error: every value then resolves to unset.
    pub fn locate(paths: &SearchPaths) -> Result<Self, StartupError> {
        match paths.locate_config(CONFIG_FILE_NAME) {
            Ok(path) => ConfigFile::read(&path),
            Err(checked) => {
                let checked = checked
                    .iter()
                    .map(|dir| dir.display().to_string())
                    .collect::<Vec<_>>()
                    .join("\n\t");
                warn!("Unable to locate a {CONFIG_FILE_NAME} config file.\n\nChecked in:\n\t{checked}");
                Ok(ConfigFile::default())
            }
        }
    }

    pub fn read(path: &Path) -> Result<Self, StartupError> {
        let bytes = fs::read(path).map_err(|source| StartupError::ConfigUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Reading configuration from {}", path.display());
        let mut config = ConfigFile::parse(&String::from_utf8_lossy(&bytes));
        config.path = Some(path.to_path_buf());
        Ok(config)
    }

    pub fn parse(text: &str) -> Self {
        let sections = SECTION_BREAK
            .split(text)
            .map(|section| section.to_string())
            .collect();
        ConfigFile {
            path: None,
            sections,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn defaults_section(&self) -> &str {
        self.sections.first().map(String::as_str).unwrap_or_default()
    }

    /// First title section whose `id:` list mentions `identity`.
    ///
    /// A listed id only has to contain the identity, so `1.000000` also
    /// selects a section listing `41.000000`.
    pub fn program_section(&self, identity: &TitleIdentity) -> Option<&str> {
        self.sections.iter().skip(1).map(String::as_str).find(|section| {
            ID_LINE
                .captures(section)
                .and_then(|caps| caps.get(1))
                .map(|ids| {
                    ids.as_str()
                        .split_whitespace()
                        .any(|id| id.contains(identity.as_str()))
                })
                .unwrap_or(false)
        })
    }

    pub fn defaults(&self) -> ProgramConfig {
        ProgramConfig::from_section(self.defaults_section())
    }

    /// Title-specific values where set, defaults everywhere else.
    pub fn resolve(&self, identity: &TitleIdentity) -> ProgramConfig {
        let defaults = self.defaults();
        let program = match self.program_section(identity) {
            Some(section) => {
                debug!("Configuration section found for {identity}");
                ProgramConfig::from_section(section)
            }
            None => {
                debug!("No configuration section for {identity}, using defaults");
                ProgramConfig::default()
            }
        };
        program.overlay(&defaults)
    }
}
