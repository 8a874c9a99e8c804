//! Persistence for the custom font slot: a small YAML file, loaded at
//! startup and saved when the control boundary replaces the table. Both
//! paths run outside the render tick.

use std::fs;
use std::path::Path;

use log::info;
use thiserror::Error;

use crate::clock_font::CustomFont;

#[derive(Debug, Error)]
pub enum FontStoreError {
    #[error("font file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("font file format error: {0}")]
    Format(#[from] serde_yaml::Error),
}

pub fn load(path: &Path) -> Result<CustomFont, FontStoreError> {
    let text = fs::read_to_string(path)?;
    let font = serde_yaml::from_str(&text)?;
    info!("loaded custom font from {}", path.display());
    Ok(font)
}

pub fn save(path: &Path, font: &CustomFont) -> Result<(), FontStoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_yaml::to_string(font)?)?;
    info!("saved custom font to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_yaml() {
        let dir = std::env::temp_dir().join("tixel-fontstore-test");
        let path = dir.join("custom-font.yaml");
        let mut font = CustomFont::default();
        font.wide[3] = [0x18; 8];
        save(&path, &font).unwrap();
        assert_eq!(load(&path).unwrap(), font);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let missing = Path::new("/nonexistent/tixel/custom-font.yaml");
        assert!(matches!(load(missing), Err(FontStoreError::Io(_))));
    }
}
