//! The `.dna` container: a JSON header, a fixed delimiter, then the symbols.
//!
//! ```text
//! {"filename":"a.png","fileType":"image/png","originalSize":1,"dnaLength":4,...}
//! ---DNA-SEQUENCE---
//! TACT
//! ```
//!
//! The header is compact JSON, which never contains a raw newline, so the
//! delimiter (which starts and ends with one) cannot occur inside it. Nor can
//! it occur in the payload, which holds only alphabet letters.

use std::fmt;
use std::path::Path;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::alphabet;
use crate::error::CodecError;
use crate::sequence::{SymbolSequence, SYMBOLS_PER_BYTE};

/// Separates the header from the payload.
pub const DELIMITER: &str = "\n---DNA-SEQUENCE---\n";

/// Written into every new header.
pub const FORMAT_VERSION: &str = "1.0";

/// File extension of encoded artifacts, without the dot.
pub const ARTIFACT_EXTENSION: &str = "dna";

/// Metadata stored in front of the symbol sequence.
///
/// Field names on the wire (`fileType`, `dnaLength`, `timestamp`, `version`)
/// are those of the first `.dna` writers so that existing files stay
/// readable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Header {
    /// Name of the original file.
    pub filename: String,
    /// MIME type of the original file.
    #[serde(rename = "fileType")]
    pub mime_type: String,
    /// Length of the original file in bytes.
    #[serde(rename = "originalSize")]
    pub original_size: u64,
    /// Number of symbols in the payload; always `4 * original_size`.
    #[serde(rename = "dnaLength")]
    pub symbol_sequence_length: u64,
    /// Creation time, millisecond precision.
    #[serde(rename = "timestamp", with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "version")]
    pub format_version: String,
}

impl Header {
    /// Header for a file of `original_size` bytes, stamped now.
    pub fn new(filename: impl Into<String>, mime_type: impl Into<String>, original_size: u64) -> Self {
        Self {
            filename: filename.into(),
            mime_type: mime_type.into(),
            original_size,
            symbol_sequence_length: original_size * SYMBOLS_PER_BYTE as u64,
            created_at: Utc::now().trunc_subsecs(3),
            format_version: FORMAT_VERSION.to_string(),
        }
    }

    /// Check the declared lengths against a payload of `payload_len` symbols.
    ///
    /// `dnaLength` must equal the payload length, and `originalSize` must be a
    /// quarter of it.
    pub fn verify(&self, payload_len: usize) -> Result<(), CodecError> {
        let actual = payload_len as u64;
        if self.symbol_sequence_length != actual {
            return Err(CodecError::HeaderMismatch {
                field: "dnaLength",
                declared: self.symbol_sequence_length,
                actual,
            });
        }
        if self.original_size.checked_mul(SYMBOLS_PER_BYTE as u64) != Some(actual) {
            return Err(CodecError::HeaderMismatch {
                field: "originalSize",
                declared: self.original_size,
                actual: actual / SYMBOLS_PER_BYTE as u64,
            });
        }
        Ok(())
    }
}

/// A serialized container, ready to be written out as a `.dna` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedArtifact(String);

impl EncodedArtifact {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Parse this artifact back into header and payload.
    pub fn frame(&self) -> Result<Frame<'_>, CodecError> {
        unwrap(&self.0)
    }
}

impl fmt::Display for EncodedArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EncodedArtifact {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A parsed container. The payload is not yet checked against the alphabet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame<'a> {
    pub header: Header,
    pub payload: &'a str,
}

/// Serialize `header` and join it with `symbols` behind the delimiter.
pub fn wrap(header: &Header, symbols: &SymbolSequence) -> Result<EncodedArtifact, CodecError> {
    let header_json =
        serde_json::to_string(header).map_err(|e| CodecError::MalformedHeader(e.to_string()))?;

    let mut artifact = String::with_capacity(header_json.len() + DELIMITER.len() + symbols.len());
    artifact.push_str(&header_json);
    artifact.push_str(DELIMITER);
    artifact.push_str(symbols.as_str());
    Ok(EncodedArtifact(artifact))
}

/// Split an artifact into its header and payload.
///
/// Whitespace around the payload (a final newline added by an editor, say) is
/// ignored. Lengths are not checked here; see [`Header::verify`].
pub fn unwrap(artifact: &str) -> Result<Frame<'_>, CodecError> {
    let Some((head, payload)) = artifact.split_once(DELIMITER) else {
        return Err(CodecError::MalformedContainer(
            "sequence delimiter not found".into(),
        ));
    };
    if payload.contains(DELIMITER) {
        let count = artifact.matches(DELIMITER).count();
        return Err(CodecError::MalformedContainer(format!(
            "sequence delimiter found {count} times, expected once"
        )));
    }

    let header: Header =
        serde_json::from_str(head).map_err(|e| CodecError::MalformedHeader(e.to_string()))?;

    Ok(Frame {
        header,
        payload: payload.trim_matches(|c: char| c.is_ascii_whitespace()),
    })
}

/// View the raw contents of a `.dna` file as an artifact.
///
/// Only the header has to be UTF-8. A payload byte outside UTF-8 cannot be a
/// symbol either, so it is reported as [`CodecError::InvalidSymbol`] at its
/// offset in the payload, like any other foreign byte.
pub fn artifact_text(bytes: &[u8]) -> Result<&str, CodecError> {
    let utf8_error = match std::str::from_utf8(bytes) {
        Ok(text) => return Ok(text),
        Err(e) => e,
    };

    let delimiter = DELIMITER.as_bytes();
    let Some(at) = bytes
        .windows(delimiter.len())
        .position(|window| window == delimiter)
    else {
        return Err(CodecError::MalformedContainer(
            "sequence delimiter not found".into(),
        ));
    };
    serde_json::from_slice::<Header>(&bytes[..at])
        .map_err(|e| CodecError::MalformedHeader(e.to_string()))?;

    let payload = &bytes[at + delimiter.len()..];
    let leading = payload.iter().take_while(|b| b.is_ascii_whitespace()).count();
    let payload = &payload[leading..];
    match alphabet::first_invalid(payload) {
        Some(position) => Err(CodecError::InvalidSymbol {
            byte: payload[position],
            position,
        }),
        None => Err(CodecError::MalformedContainer(utf8_error.to_string())),
    }
}

/// Name of the artifact for an original file: the last extension is replaced
/// with `.dna`.
pub fn artifact_file_name(original: &str) -> String {
    let stem = Path::new(original)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "untitled".to_string());
    format!("{stem}.{ARTIFACT_EXTENSION}")
}

/// Whether `path` carries the artifact extension (case-insensitive).
pub fn has_artifact_extension(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(ARTIFACT_EXTENSION))
}

/// RFC 3339 timestamps with milliseconds and a `Z` suffix.
mod timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let text = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&text)
            .map(|t| t.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Codec, Sequential};
    use chrono::TimeZone;

    fn sample_header(original_size: u64) -> Header {
        Header {
            filename: "photo.png".into(),
            mime_type: "image/png".into(),
            original_size,
            symbol_sequence_length: original_size * 4,
            created_at: Utc.with_ymd_and_hms(2024, 5, 17, 9, 30, 0).unwrap(),
            format_version: FORMAT_VERSION.into(),
        }
    }

    #[test]
    fn test_wire_format() {
        let header = sample_header(1);
        let symbols = Sequential.encode(&[0x4D]);
        let artifact = wrap(&header, &symbols).unwrap();

        assert_eq!(
            artifact.as_str(),
            "{\"filename\":\"photo.png\",\"fileType\":\"image/png\",\"originalSize\":1,\
             \"dnaLength\":4,\"timestamp\":\"2024-05-17T09:30:00.000Z\",\"version\":\"1.0\"}\
             \n---DNA-SEQUENCE---\nTACT"
        );
    }

    #[test]
    fn test_wrap_unwrap_round_trip() {
        let bytes = b"hello, vault".to_vec();
        let header = sample_header(bytes.len() as u64);
        let symbols = Sequential.encode(&bytes);

        let artifact = wrap(&header, &symbols).unwrap();
        let frame = artifact.frame().unwrap();
        assert_eq!(frame.header, header);
        assert_eq!(frame.payload, symbols.as_str());
        assert!(frame.header.verify(frame.payload.len()).is_ok());
    }

    #[test]
    fn test_round_trip_empty_payload() {
        let header = sample_header(0);
        let artifact = wrap(&header, &SymbolSequence::new()).unwrap();
        let frame = unwrap(artifact.as_str()).unwrap();
        assert_eq!(frame.payload, "");
        assert_eq!(frame.header, header);
    }

    #[test]
    fn test_hostile_filename_cannot_forge_delimiter() {
        let mut header = sample_header(1);
        header.filename = "evil\n---DNA-SEQUENCE---\nAAAA".into();
        let artifact = wrap(&header, &Sequential.encode(&[1])).unwrap();
        let frame = artifact.frame().unwrap();
        assert_eq!(frame.header.filename, header.filename);
        assert_eq!(frame.payload, "AAAT");
    }

    #[test]
    fn test_missing_delimiter() {
        let result = unwrap("{\"filename\":\"x\"}TACT");
        assert!(matches!(result, Err(CodecError::MalformedContainer(_))));
    }

    #[test]
    fn test_mutated_delimiter() {
        let artifact = wrap(&sample_header(1), &Sequential.encode(&[7])).unwrap();
        let broken = artifact
            .as_str()
            .replace("---DNA-SEQUENCE---", "---DNA-SEQUENCF---");
        assert!(matches!(
            unwrap(&broken),
            Err(CodecError::MalformedContainer(_))
        ));
    }

    #[test]
    fn test_duplicate_delimiter() {
        let artifact = wrap(&sample_header(1), &Sequential.encode(&[7])).unwrap();
        let doubled = format!("{}{DELIMITER}AAAA", artifact.as_str());
        match unwrap(&doubled) {
            Err(CodecError::MalformedContainer(msg)) => assert!(msg.contains("2 times")),
            other => panic!("expected MalformedContainer, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_header() {
        for head in [
            "not json",
            "{}",
            // missing `version`
            r#"{"filename":"a","fileType":"b","originalSize":1,"dnaLength":4,"timestamp":"2024-01-01T00:00:00.000Z"}"#,
            // unknown field
            r#"{"filename":"a","fileType":"b","originalSize":1,"dnaLength":4,"timestamp":"2024-01-01T00:00:00.000Z","version":"1.0","extra":1}"#,
            // wrong type
            r#"{"filename":"a","fileType":"b","originalSize":"1","dnaLength":4,"timestamp":"2024-01-01T00:00:00.000Z","version":"1.0"}"#,
            // bad timestamp
            r#"{"filename":"a","fileType":"b","originalSize":1,"dnaLength":4,"timestamp":"yesterday","version":"1.0"}"#,
        ] {
            let artifact = format!("{head}{DELIMITER}TACT");
            assert!(
                matches!(unwrap(&artifact), Err(CodecError::MalformedHeader(_))),
                "header {head:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_header_fields_any_order() {
        let head = r#"{"version":"1.0","timestamp":"2024-05-17T09:30:00.000Z","dnaLength":4,"originalSize":1,"fileType":"image/png","filename":"photo.png"}"#;
        let artifact = format!("{head}{DELIMITER}TACT\n");
        let frame = unwrap(&artifact).unwrap();
        assert_eq!(frame.header, sample_header(1));
        assert_eq!(frame.payload, "TACT");
    }

    #[test]
    fn test_whitespace_around_payload() {
        let header = wrap(&sample_header(1), &SymbolSequence::new()).unwrap();
        let artifact = format!("{}\n\r\nTACT \n", header.as_str());
        let frame = unwrap(&artifact).unwrap();
        assert_eq!(frame.payload, "TACT");
        assert!(frame.header.verify(frame.payload.len()).is_ok());
    }

    #[test]
    fn test_artifact_text() {
        let artifact = wrap(&sample_header(2), &Sequential.encode(&[0x4D, 0x4D])).unwrap();
        assert_eq!(artifact_text(artifact.as_bytes()).unwrap(), artifact.as_str());

        let mut bytes = artifact.as_bytes().to_vec();
        let last = bytes.len() - 3;
        bytes[last] = 0xFF;
        assert_eq!(
            artifact_text(&bytes),
            Err(CodecError::InvalidSymbol {
                byte: 0xFF,
                position: 5
            })
        );

        // A foreign ASCII byte ahead of the broken one is reported first.
        bytes[last - 4] = b'N';
        assert_eq!(
            artifact_text(&bytes),
            Err(CodecError::InvalidSymbol {
                byte: b'N',
                position: 1
            })
        );

        let mut bad_header = artifact.as_bytes().to_vec();
        bad_header[14] = 0xFF;
        assert!(matches!(
            artifact_text(&bad_header),
            Err(CodecError::MalformedHeader(_))
        ));

        assert!(matches!(
            artifact_text(b"TACT\xFF"),
            Err(CodecError::MalformedContainer(_))
        ));
    }

    #[test]
    fn test_unwrap_does_not_check_lengths() {
        let mut header = sample_header(2);
        header.symbol_sequence_length = 12;
        let artifact = wrap(&header, &Sequential.encode(&[1, 2])).unwrap();
        let frame = artifact.frame().unwrap();
        assert_eq!(
            frame.header.verify(frame.payload.len()),
            Err(CodecError::HeaderMismatch {
                field: "dnaLength",
                declared: 12,
                actual: 8
            })
        );
    }

    #[test]
    fn test_verify_original_size() {
        let mut header = sample_header(2);
        header.original_size = 3;
        assert_eq!(
            header.verify(8),
            Err(CodecError::HeaderMismatch {
                field: "originalSize",
                declared: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn test_new_header_invariant() {
        let header = Header::new("notes.txt", "text/plain", 10);
        assert_eq!(header.symbol_sequence_length, 40);
        assert_eq!(header.format_version, FORMAT_VERSION);
        assert_eq!(header.created_at.timestamp_subsec_nanos() % 1_000_000, 0);
        assert!(header.verify(40).is_ok());
    }

    #[test]
    fn test_artifact_file_name() {
        assert_eq!(artifact_file_name("photo.png"), "photo.dna");
        assert_eq!(artifact_file_name("archive.tar.gz"), "archive.tar.dna");
        assert_eq!(artifact_file_name("README"), "README.dna");
        assert_eq!(artifact_file_name(".bashrc"), ".bashrc.dna");
        assert_eq!(artifact_file_name(""), "untitled.dna");
    }

    #[test]
    fn test_has_artifact_extension() {
        assert!(has_artifact_extension(Path::new("x/photo.dna")));
        assert!(has_artifact_extension(Path::new("PHOTO.DNA")));
        assert!(!has_artifact_extension(Path::new("photo.png")));
        assert!(!has_artifact_extension(Path::new("dna")));
    }
}
