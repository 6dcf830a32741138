#![allow(clippy::missing_errors_doc)]

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use maze_chase_core::{MazeData, MazeError, MazeLayout};
use thiserror::Error;

const TRANSFER_DOMAIN: &str = "maze";
const TRANSFER_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded maze payload.
pub(crate) const TRANSFER_HEADER: &str = "maze:v1";
/// Delimiter used to separate the prefix, grid dimensions and payload.
const FIELD_DELIMITER: char = ':';

/// Errors that can occur while encoding or decoding maze transfer strings.
#[derive(Debug, Error)]
pub(crate) enum LayoutTransferError {
    /// The provided string was empty or contained only whitespace.
    #[error("maze string was empty")]
    EmptyPayload,
    /// The encoded maze did not contain a version segment.
    #[error("maze string is missing the version")]
    MissingVersion,
    /// The encoded maze did not include grid dimensions.
    #[error("maze string is missing the grid dimensions")]
    MissingDimensions,
    /// The encoded maze did not include the payload segment.
    #[error("maze string is missing the payload")]
    MissingPayload,
    /// The encoded maze used an unexpected prefix segment.
    #[error("maze prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The encoded maze used an unsupported version identifier.
    #[error("maze version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The grid dimensions could not be parsed.
    #[error("could not parse grid dimensions '{0}'")]
    InvalidDimensions(String),
    /// The header dimensions disagree with the payload.
    #[error("header announces {header_width}x{header_height} but the layout is {width}x{height}")]
    DimensionMismatch {
        /// Columns announced by the header.
        header_width: i32,
        /// Rows announced by the header.
        header_height: i32,
        /// Columns stored in the payload.
        width: i32,
        /// Rows stored in the payload.
        height: i32,
    },
    /// The base64 payload could not be decoded.
    #[error("could not decode maze payload: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),
    /// The payload could not be converted from or to JSON.
    #[error("could not process maze payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),
    /// The decoded layout is not a playable maze.
    #[error("decoded maze is invalid: {0}")]
    InvalidMaze(#[from] MazeError),
}

/// Encodes the maze, with the pickups it still holds, into a single-line string.
pub(crate) fn encode(maze: &MazeData) -> Result<String, LayoutTransferError> {
    let layout = maze.to_layout();
    let json = serde_json::to_vec(&layout)?;
    let encoded = STANDARD_NO_PAD.encode(json);
    Ok(format!(
        "{TRANSFER_HEADER}:{}x{}:{encoded}",
        layout.width, layout.height
    ))
}

/// Decodes and validates a maze from its transfer string.
pub(crate) fn decode(value: &str) -> Result<MazeData, LayoutTransferError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LayoutTransferError::EmptyPayload);
    }

    let mut parts = trimmed.split(FIELD_DELIMITER);
    let domain = parts.next().unwrap_or_default();
    let version = parts.next().ok_or(LayoutTransferError::MissingVersion)?;
    let dimensions = parts
        .next()
        .ok_or(LayoutTransferError::MissingDimensions)?;
    let payload = parts.next().ok_or(LayoutTransferError::MissingPayload)?;

    if domain != TRANSFER_DOMAIN {
        return Err(LayoutTransferError::InvalidPrefix(domain.to_owned()));
    }
    if version != TRANSFER_VERSION {
        return Err(LayoutTransferError::UnsupportedVersion(version.to_owned()));
    }

    let (header_width, header_height) = parse_dimensions(dimensions)?;
    let bytes = STANDARD_NO_PAD.decode(payload.as_bytes())?;
    let layout: MazeLayout = serde_json::from_slice(&bytes)?;
    if layout.width != header_width || layout.height != header_height {
        return Err(LayoutTransferError::DimensionMismatch {
            header_width,
            header_height,
            width: layout.width,
            height: layout.height,
        });
    }

    Ok(MazeData::from_layout(layout)?)
}

fn parse_dimensions(dimensions: &str) -> Result<(i32, i32), LayoutTransferError> {
    let invalid = || LayoutTransferError::InvalidDimensions(dimensions.to_owned());
    let (columns, rows) = dimensions.split_once(['x', 'X']).ok_or_else(invalid)?;

    let columns = columns.trim().parse::<i32>().map_err(|_| invalid())?;
    let rows = rows.trim().parse::<i32>().map_err(|_| invalid())?;
    if columns <= 0 || rows <= 0 {
        return Err(invalid());
    }

    Ok((columns, rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_chase_core::TilePos;

    fn maze() -> MazeData {
        MazeData::from_ascii(&[
            "#########",
            "#o.....o#",
            "#.##.##.#",
            "#...G...#",
            ".........",
            "#.##.##.#",
            "#...P...#",
            "#o.....o#",
            "#########",
        ])
        .expect("valid maze")
    }

    #[test]
    fn encoded_maze_decodes_to_the_same_layout() {
        let maze = maze();
        let encoded = encode(&maze).expect("maze encodes");
        assert!(encoded.starts_with(&format!("{TRANSFER_HEADER}:9x9:")));
        assert!(!encoded.contains('\n'));

        let decoded = decode(&encoded).expect("maze decodes");
        assert_eq!(decoded, maze);
    }

    #[test]
    fn eaten_pickups_stay_eaten_on_export() {
        let mut maze = maze();
        assert!(maze.take_dot(TilePos::new(2, 1)));
        let decoded = decode(&encode(&maze).expect("maze encodes")).expect("maze decodes");
        assert!(!decoded.has_dot(TilePos::new(2, 1)));
        assert_eq!(decoded.dots_remaining(), maze.dots_remaining());
    }

    #[test]
    fn rejects_foreign_prefixes_and_versions() {
        assert!(matches!(decode("   "), Err(LayoutTransferError::EmptyPayload)));
        assert!(matches!(
            decode("grid:v1:9x9:e30"),
            Err(LayoutTransferError::InvalidPrefix(prefix)) if prefix == "grid"
        ));
        assert!(matches!(
            decode("maze:v2:9x9:e30"),
            Err(LayoutTransferError::UnsupportedVersion(version)) if version == "v2"
        ));
        assert!(matches!(
            decode("maze:v1:9by9:e30"),
            Err(LayoutTransferError::InvalidDimensions(_))
        ));
        assert!(matches!(
            decode("maze:v1:9x9"),
            Err(LayoutTransferError::MissingPayload)
        ));
    }

    #[test]
    fn rejects_mismatched_dimensions() {
        let encoded = encode(&maze()).expect("maze encodes");
        let tampered = encoded.replacen(":9x9:", ":11x9:", 1);
        assert!(matches!(
            decode(&tampered),
            Err(LayoutTransferError::DimensionMismatch {
                header_width: 11,
                width: 9,
                ..
            })
        ));
    }

    #[test]
    fn rejects_structurally_invalid_layouts() {
        let mut layout = maze().to_layout();
        layout.player_spawn = TilePos::new(0, 0);
        let json = serde_json::to_vec(&layout).expect("layout serializes");
        let encoded = format!("{TRANSFER_HEADER}:9x9:{}", STANDARD_NO_PAD.encode(json));
        assert!(matches!(
            decode(&encoded),
            Err(LayoutTransferError::InvalidMaze(MazeError::SpawnBlocked { .. }))
        ));
    }
}
