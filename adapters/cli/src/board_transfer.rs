use std::{error::Error, fmt};

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use saloon_world::BoardSnapshot;

const SNAPSHOT_DOMAIN: &str = "saloon";
const SNAPSHOT_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded board payload.
pub(crate) const SNAPSHOT_HEADER: &str = "saloon:v1";
/// Delimiter used to separate the prefix, board dimensions and payload.
const FIELD_DELIMITER: char = ':';

/// Whether the value looks like a board transfer string rather than a path.
pub(crate) fn is_transfer_string(value: &str) -> bool {
    value.trim_start().starts_with(SNAPSHOT_HEADER)
}

/// Encodes a board snapshot into a single-line string suitable for sharing.
pub(crate) fn encode(snapshot: &BoardSnapshot) -> Result<String, BoardTransferError> {
    let json = serde_json::to_vec(snapshot).map_err(BoardTransferError::InvalidPayload)?;
    let encoded = STANDARD_NO_PAD.encode(json);
    Ok(format!(
        "{SNAPSHOT_HEADER}:{}x{}:{encoded}",
        snapshot.width, snapshot.height
    ))
}

/// Decodes a board snapshot from its transfer string.
pub(crate) fn decode(value: &str) -> Result<BoardSnapshot, BoardTransferError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(BoardTransferError::EmptyPayload);
    }

    let mut parts = trimmed.split(FIELD_DELIMITER);
    let domain = parts.next().ok_or(BoardTransferError::MissingPrefix)?;
    let version = parts.next().ok_or(BoardTransferError::MissingVersion)?;
    let dimensions = parts.next().ok_or(BoardTransferError::MissingDimensions)?;
    let payload = parts.next().ok_or(BoardTransferError::MissingPayload)?;

    if domain != SNAPSHOT_DOMAIN {
        return Err(BoardTransferError::InvalidPrefix(domain.to_owned()));
    }
    if version != SNAPSHOT_VERSION {
        return Err(BoardTransferError::UnsupportedVersion(version.to_owned()));
    }

    let (width, height) = parse_dimensions(dimensions)?;
    let bytes = STANDARD_NO_PAD
        .decode(payload.as_bytes())
        .map_err(BoardTransferError::InvalidEncoding)?;
    let snapshot: BoardSnapshot =
        serde_json::from_slice(&bytes).map_err(BoardTransferError::InvalidPayload)?;

    if (snapshot.width, snapshot.height) != (width, height) {
        return Err(BoardTransferError::DimensionMismatch {
            header: (width, height),
            payload: (snapshot.width, snapshot.height),
        });
    }

    Ok(snapshot)
}

/// Errors that can occur while encoding or decoding board transfer strings.
#[derive(Debug)]
pub(crate) enum BoardTransferError {
    /// The provided string was empty or contained only whitespace.
    EmptyPayload,
    /// The prefix segment was missing from the encoded board.
    MissingPrefix,
    /// The encoded board did not contain a version segment.
    MissingVersion,
    /// The encoded board did not include its dimensions.
    MissingDimensions,
    /// The encoded board did not include the payload segment.
    MissingPayload,
    /// The encoded board used an unexpected prefix segment.
    InvalidPrefix(String),
    /// The encoded board used an unsupported version identifier.
    UnsupportedVersion(String),
    /// The board dimensions could not be parsed from the header.
    InvalidDimensions(String),
    /// The header and payload disagree on the board dimensions.
    DimensionMismatch {
        /// Dimensions announced in the header.
        header: (u32, u32),
        /// Dimensions stored in the payload.
        payload: (u32, u32),
    },
    /// The base64 payload could not be decoded.
    InvalidEncoding(base64::DecodeError),
    /// The payload could not be serialised or deserialised.
    InvalidPayload(serde_json::Error),
}

impl fmt::Display for BoardTransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPayload => write!(f, "board string was empty"),
            Self::MissingPrefix => write!(f, "board string is missing the prefix"),
            Self::MissingVersion => write!(f, "board string is missing the version"),
            Self::MissingDimensions => write!(f, "board string is missing the dimensions"),
            Self::MissingPayload => write!(f, "board string is missing the payload"),
            Self::InvalidPrefix(prefix) => write!(f, "board prefix '{prefix}' is not supported"),
            Self::UnsupportedVersion(version) => {
                write!(f, "board version '{version}' is not supported")
            }
            Self::InvalidDimensions(dimensions) => {
                write!(f, "could not parse board dimensions '{dimensions}'")
            }
            Self::DimensionMismatch { header, payload } => write!(
                f,
                "board header announces {}x{} but the payload is {}x{}",
                header.0, header.1, payload.0, payload.1
            ),
            Self::InvalidEncoding(error) => {
                write!(f, "could not decode board payload: {error}")
            }
            Self::InvalidPayload(error) => {
                write!(f, "could not parse board payload: {error}")
            }
        }
    }
}

impl Error for BoardTransferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidEncoding(error) => Some(error),
            Self::InvalidPayload(error) => Some(error),
            _ => None,
        }
    }
}

fn parse_dimensions(dimensions: &str) -> Result<(u32, u32), BoardTransferError> {
    let (width, height) = dimensions
        .split_once(['x', 'X'])
        .ok_or_else(|| BoardTransferError::InvalidDimensions(dimensions.to_owned()))?;

    let width = width
        .trim()
        .parse::<u32>()
        .map_err(|_| BoardTransferError::InvalidDimensions(dimensions.to_owned()))?;
    let height = height
        .trim()
        .parse::<u32>()
        .map_err(|_| BoardTransferError::InvalidDimensions(dimensions.to_owned()))?;

    if width == 0 || height == 0 {
        return Err(BoardTransferError::InvalidDimensions(
            dimensions.to_owned(),
        ));
    }

    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use saloon_world::layout::parse_layout;

    #[test]
    fn encoded_board_survives_transfer() {
        let snapshot = parse_layout(&["#.P.#", ".B<t.", "..H.."]).expect("valid layout");

        let encoded = encode(&snapshot).expect("snapshot encodes");
        assert!(encoded.starts_with(&format!("{SNAPSHOT_HEADER}:5x3:")));
        assert!(is_transfer_string(&encoded));
        assert!(!encoded.contains('\n'));

        let decoded = decode(&format!("  {encoded}\n")).expect("snapshot decodes");
        assert_eq!(decoded, snapshot);
    }

    #[test]
    fn malformed_strings_are_rejected() {
        assert!(matches!(decode("   "), Err(BoardTransferError::EmptyPayload)));
        assert!(matches!(
            decode("poker:v1:3x3:AAAA"),
            Err(BoardTransferError::InvalidPrefix(prefix)) if prefix == "poker"
        ));
        assert!(matches!(
            decode("saloon:v2:3x3:AAAA"),
            Err(BoardTransferError::UnsupportedVersion(_))
        ));
        assert!(matches!(
            decode("saloon:v1:0x3:AAAA"),
            Err(BoardTransferError::InvalidDimensions(_))
        ));
        assert!(matches!(
            decode("saloon:v1:3x3"),
            Err(BoardTransferError::MissingPayload)
        ));
        assert!(matches!(
            decode("saloon:v1:3x3:!!!"),
            Err(BoardTransferError::InvalidEncoding(_))
        ));
    }

    #[test]
    fn header_must_match_payload() {
        let snapshot = BoardSnapshot::new(4, 2);
        let encoded = encode(&snapshot).expect("snapshot encodes");
        let tampered = encoded.replacen(":4x2:", ":2x4:", 1);

        assert!(matches!(
            decode(&tampered),
            Err(BoardTransferError::DimensionMismatch {
                header: (2, 4),
                payload: (4, 2),
            })
        ));
    }
}
