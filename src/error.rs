//! Setup-time failures
//!
//! Nothing inside a tick can fail; everything that can go wrong does so while
//! building the world, before any entity exists.

use std::fmt;

use crate::assets::SpriteKind;

#[derive(Clone, Debug, PartialEq)]
pub enum SetupError {
    /// A sprite the simulation needs has no texture in the catalog
    MissingTexture(SpriteKind),
    /// A settings value is outside its allowed range
    InvalidSettings { field: &'static str, reason: String },
    /// Settings JSON could not be decoded
    SettingsParse(String),
    /// Settings file could not be read
    SettingsIo(String),
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingTexture(kind) => write!(f, "missing texture for sprite {kind:?}"),
            Self::InvalidSettings { field, reason } => {
                write!(f, "invalid setting `{field}`: {reason}")
            }
            Self::SettingsParse(msg) => write!(f, "could not parse settings: {msg}"),
            Self::SettingsIo(msg) => write!(f, "could not read settings: {msg}"),
        }
    }
}

impl std::error::Error for SetupError {}
