//! End-to-end conversions: file -> artifact and artifact -> file.
//!
//! Joins the driver, the container and the vault hook. All per-call state
//! (who the caller is, where progress goes, whether to stop) is passed in;
//! nothing is kept between calls.

use log::{debug, info, warn};

use crate::container::{self, EncodedArtifact, Header};
use crate::driver::{CancelToken, Driver, ProgressSink};
use crate::error::CodecError;
use crate::vault::{Vault, VaultRecord};
use crate::sequence::{SymbolSequence, SYMBOLS_PER_BYTE};
use crate::alphabet;

/// A file handed over for encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }
}

/// Caller identity for one operation. Anonymous sessions leave no vault record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    user: Option<String>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn for_user(user: impl Into<String>) -> Self {
        Self {
            user: Some(user.into()),
        }
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }
}

/// Result of [`Pipeline::encode_file`].
#[derive(Debug, Clone)]
pub struct Encoded {
    pub header: Header,
    pub artifact: EncodedArtifact,
    /// Suggested name for the artifact file.
    pub file_name: String,
}

/// Result of [`Pipeline::decode_artifact`].
#[derive(Debug, Clone)]
pub struct Decoded {
    pub header: Header,
    pub bytes: Vec<u8>,
}

/// Summary of an artifact that passed every check without being decoded.
#[derive(Debug, Clone)]
pub struct Inspection {
    pub header: Header,
    pub payload_len: usize,
    pub artifact_len: usize,
}

/// Encode/decode pipeline around a [`Driver`].
#[derive(Debug, Clone, Copy)]
pub struct Pipeline {
    driver: Driver,
    verify_header: bool,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(Driver::default())
    }
}

impl Pipeline {
    pub fn new(driver: Driver) -> Self {
        Self {
            driver,
            verify_header: true,
        }
    }

    /// Skip the header length checks on decode.
    ///
    /// Together with [`TrailingGroup::Discard`](crate::TrailingGroup::Discard)
    /// this reproduces the permissive behaviour of early `.dna` readers, which
    /// decoded whatever symbols were present.
    pub fn without_header_checks(mut self) -> Self {
        self.verify_header = false;
        self
    }

    pub fn driver(&self) -> &Driver {
        &self.driver
    }

    /// Encode `source` into a `.dna` artifact.
    pub fn encode_file(
        &self,
        source: &SourceFile,
        session: &Session,
        sink: &mut impl ProgressSink,
        cancel: &CancelToken,
        vault: Option<&mut dyn Vault>,
    ) -> Result<Encoded, CodecError> {
        let symbols = self.driver.encode(&source.bytes, sink, cancel)?;
        self.finish_encode(source, symbols, session, vault)
    }

    /// Decode a `.dna` artifact back into the original bytes.
    pub fn decode_artifact(
        &self,
        artifact: &str,
        session: &Session,
        sink: &mut impl ProgressSink,
        cancel: &CancelToken,
        vault: Option<&mut dyn Vault>,
    ) -> Result<Decoded, CodecError> {
        let (header, payload) = self.open(artifact)?;
        let bytes = self.driver.decode(payload, sink, cancel)?;
        self.finish_decode(header, bytes, session, vault)
    }

    /// [`Pipeline::encode_file`] for cooperative async hosts.
    pub async fn encode_file_async(
        &self,
        source: &SourceFile,
        session: &Session,
        sink: &mut impl ProgressSink,
        cancel: &CancelToken,
        vault: Option<&mut dyn Vault>,
    ) -> Result<Encoded, CodecError> {
        let symbols = self.driver.encode_async(&source.bytes, sink, cancel).await?;
        self.finish_encode(source, symbols, session, vault)
    }

    /// [`Pipeline::decode_artifact`] for cooperative async hosts.
    pub async fn decode_artifact_async(
        &self,
        artifact: &str,
        session: &Session,
        sink: &mut impl ProgressSink,
        cancel: &CancelToken,
        vault: Option<&mut dyn Vault>,
    ) -> Result<Decoded, CodecError> {
        let (header, payload) = self.open(artifact)?;
        let bytes = self.driver.decode_async(payload, sink, cancel).await?;
        self.finish_decode(header, bytes, session, vault)
    }

    /// Run every check `decode_artifact` would, without producing bytes.
    pub fn inspect(&self, artifact: &str) -> Result<Inspection, CodecError> {
        let (header, payload) = self.open(artifact)?;
        let usable = self.driver.trailing_group().usable_len(payload.len())?;
        if let Some(position) = alphabet::first_invalid(&payload.as_bytes()[..usable]) {
            return Err(CodecError::InvalidSymbol {
                byte: payload.as_bytes()[position],
                position,
            });
        }
        Ok(Inspection {
            header,
            payload_len: payload.len(),
            artifact_len: artifact.len(),
        })
    }

    fn open<'a>(&self, artifact: &'a str) -> Result<(Header, &'a str), CodecError> {
        let frame = container::unwrap(artifact)?;
        if self.verify_header {
            frame.header.verify(frame.payload.len())?;
        } else if let Err(e) = frame.header.verify(frame.payload.len()) {
            warn!("ignoring header check failure: {e}");
        }
        Ok((frame.header, frame.payload))
    }

    fn finish_encode(
        &self,
        source: &SourceFile,
        symbols: SymbolSequence,
        session: &Session,
        vault: Option<&mut dyn Vault>,
    ) -> Result<Encoded, CodecError> {
        let header = Header::new(&source.name, &source.mime_type, source.bytes.len() as u64);
        debug_assert_eq!(header.symbol_sequence_length, symbols.len() as u64);

        let artifact = container::wrap(&header, &symbols)?;
        info!(
            "encoded {} ({} bytes -> {} symbols)",
            source.name,
            source.bytes.len(),
            symbols.len()
        );
        record(session, vault, || VaultRecord::encoded(&header));

        Ok(Encoded {
            file_name: container::artifact_file_name(&source.name),
            header,
            artifact,
        })
    }

    fn finish_decode(
        &self,
        header: Header,
        bytes: Vec<u8>,
        session: &Session,
        vault: Option<&mut dyn Vault>,
    ) -> Result<Decoded, CodecError> {
        info!(
            "decoded {} ({} symbols -> {} bytes)",
            header.filename,
            bytes.len() * SYMBOLS_PER_BYTE,
            bytes.len()
        );
        record(session, vault, || VaultRecord::decoded(&header));

        Ok(Decoded { header, bytes })
    }
}

/// Append a record when both a user and a vault are present.
///
/// The conversion already succeeded, so a vault failure is logged rather
/// than returned.
fn record(session: &Session, vault: Option<&mut dyn Vault>, make: impl FnOnce() -> VaultRecord) {
    let (Some(user), Some(vault)) = (session.user(), vault) else {
        debug!("no user or vault; skipping vault record");
        return;
    };
    let record = make();
    if let Err(e) = vault.append_record(user, record) {
        warn!("failed to append vault record for {user}: {e}");
    }
}
