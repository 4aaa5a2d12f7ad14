//! Backdrop descriptors and the background applier.

use std::fmt;
use std::str::FromStr;

use rigidview_world::color::Color;
use serde::{Deserialize, Serialize};

use crate::surface::Surface;

/// What the drawing surface shows behind everything else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BackgroundDesc {
    /// A solid color.
    Solid(Color),
    /// A tiled image source.
    Image(String),
}

/// Error returned for a backdrop string that is neither a color nor an
/// image source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid background '{0}' (expected a color or a .png/.jpg/.gif source)")]
pub struct ParseBackgroundError(pub String);

const IMAGE_SUFFIXES: &[&str] = &["png", "jpg", "gif"];

impl Default for BackgroundDesc {
    fn default() -> Self {
        BackgroundDesc::Solid(Color::rgb(0x14, 0x15, 0x1f))
    }
}

impl FromStr for BackgroundDesc {
    type Err = ParseBackgroundError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let lower = trimmed.to_ascii_lowercase();
        if IMAGE_SUFFIXES.iter().any(|ext| lower.ends_with(ext)) {
            return Ok(BackgroundDesc::Image(trimmed.to_owned()));
        }
        trimmed
            .parse::<Color>()
            .map(BackgroundDesc::Solid)
            .map_err(|_| ParseBackgroundError(s.to_owned()))
    }
}

impl TryFrom<String> for BackgroundDesc {
    type Error = ParseBackgroundError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BackgroundDesc> for String {
    fn from(b: BackgroundDesc) -> String {
        b.to_string()
    }
}

impl fmt::Display for BackgroundDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackgroundDesc::Solid(c) => write!(f, "{c}"),
            BackgroundDesc::Image(src) => f.write_str(src),
        }
    }
}

/// Push `desired` to the surface if it differs from what was last applied.
///
/// Returns whether the surface was touched.
pub fn apply_background(
    current: &mut Option<BackgroundDesc>,
    desired: &BackgroundDesc,
    surface: &mut dyn Surface,
) -> bool {
    if current.as_ref() == Some(desired) {
        return false;
    }
    tracing::debug!(background = %desired, "applying background");
    surface.set_background(desired);
    *current = Some(desired.clone());
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::RecordingSurface;

    #[test]
    fn image_sources_are_detected_by_suffix() {
        assert_eq!(
            "tiles/stone.PNG".parse::<BackgroundDesc>().unwrap(),
            BackgroundDesc::Image("tiles/stone.PNG".into())
        );
        assert_eq!(
            "#000".parse::<BackgroundDesc>().unwrap(),
            BackgroundDesc::Solid(Color::rgb(0, 0, 0))
        );
        assert!("stone.bmp".parse::<BackgroundDesc>().is_err());
    }

    #[test]
    fn applies_only_on_change() {
        let mut surface = RecordingSurface::new();
        let mut current = None;
        let bg = BackgroundDesc::default();
        assert!(apply_background(&mut current, &bg, &mut surface));
        assert!(!apply_background(&mut current, &bg, &mut surface));
        let other = BackgroundDesc::Image("sky.jpg".into());
        assert!(apply_background(&mut current, &other, &mut surface));
        assert_eq!(surface.stats().background_changes, 2);
        assert_eq!(surface.background(), Some(&other));
    }
}
