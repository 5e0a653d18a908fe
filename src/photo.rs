//! Shared types for the gallery pipeline.
//!
//! A [`Photo`] is one row of the media index: identifier, display orientation,
//! and the dimensions the index reported at query time. Photos are immutable —
//! the loader creates them, the view-state holds them, and a refresh replaces
//! the whole list rather than mutating entries.

use serde::{Deserialize, Serialize};

/// Rotation required to display an image upright, from media metadata.
///
/// Only the four pure rotations exist in the data model. Index rows carrying
/// any other value are rejected by the loader, so downstream code never has
/// to handle a partial rotation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum Orientation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Orientation {
    /// Rotation in degrees (0, 90, 180 or 270).
    pub fn degrees(self) -> u16 {
        match self {
            Orientation::Deg0 => 0,
            Orientation::Deg90 => 90,
            Orientation::Deg180 => 180,
            Orientation::Deg270 => 270,
        }
    }
}

impl TryFrom<u16> for Orientation {
    type Error = String;

    fn try_from(degrees: u16) -> Result<Self, Self::Error> {
        match degrees {
            0 => Ok(Orientation::Deg0),
            90 => Ok(Orientation::Deg90),
            180 => Ok(Orientation::Deg180),
            270 => Ok(Orientation::Deg270),
            other => Err(format!("invalid orientation: {} degrees", other)),
        }
    }
}

impl From<Orientation> for u16 {
    fn from(orientation: Orientation) -> u16 {
        orientation.degrees()
    }
}

/// One media item as reported by the index.
///
/// `width`/`height` are the index's idea of the source dimensions; they may
/// be stale relative to the actual file, which is why the decoder probes
/// intrinsic bounds itself instead of trusting these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    /// Stable identifier, unique per media item.
    pub id: String,
    pub orientation: Orientation,
    pub width: u32,
    pub height: u32,
}

/// Payload for the navigation boundary: everything the full-screen viewer
/// needs to do its own decode at viewport resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewerRequest {
    /// Resolved locator for the image source (e.g. a filesystem path).
    pub locator: String,
    pub orientation: Orientation,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orientation_accepts_quarter_turns() {
        assert_eq!(Orientation::try_from(0), Ok(Orientation::Deg0));
        assert_eq!(Orientation::try_from(90), Ok(Orientation::Deg90));
        assert_eq!(Orientation::try_from(180), Ok(Orientation::Deg180));
        assert_eq!(Orientation::try_from(270), Ok(Orientation::Deg270));
    }

    #[test]
    fn orientation_rejects_other_values() {
        assert!(Orientation::try_from(45).is_err());
        assert!(Orientation::try_from(360).is_err());
        assert!(Orientation::try_from(91).is_err());
    }

    #[test]
    fn orientation_roundtrips_through_degrees() {
        for degrees in [0u16, 90, 180, 270] {
            let o = Orientation::try_from(degrees).unwrap();
            assert_eq!(o.degrees(), degrees);
        }
    }

    #[test]
    fn photo_serializes_orientation_as_degrees() {
        let photo = Photo {
            id: "42".to_string(),
            orientation: Orientation::Deg90,
            width: 4000,
            height: 3000,
        };
        let json = serde_json::to_string(&photo).unwrap();
        assert!(json.contains("\"orientation\":90"), "got: {}", json);

        let back: Photo = serde_json::from_str(&json).unwrap();
        assert_eq!(back, photo);
    }
}
