use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// User preferences of the connect operation.
///
/// Stored as JSON. Fields missing from the stored file take their default
/// values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Let the user change the selection while the operation is running.
    /// Every change triggers a full rebuild, which is slow on large meshes.
    pub selection_enabled: bool,
    pub show_hud: bool,
    /// Show the hotkey hints next to the values in the HUD.
    pub show_keys: bool,
    pub hud_offset_x: i32,
    pub hud_offset_y: i32,
    pub hud_scale_percent: u32,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            selection_enabled: false,
            show_hud: true,
            show_keys: true,
            hud_offset_x: 100,
            hud_offset_y: 100,
            hud_scale_percent: 100,
        }
    }
}

impl Preferences {
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&contents)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
