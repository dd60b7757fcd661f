//! Chunked encode/decode with progress reporting and cancellation.
//!
//! A [`Job`] owns the accumulator of one operation and advances it one chunk
//! per [`Job::step`]. The [`Driver`] runs jobs either synchronously (batch
//! hosts) or with a cooperative yield between chunks (single-threaded async
//! hosts). Chunks are processed strictly in order and the result never
//! depends on the chunk size.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::debug;

use crate::error::CodecError;
use crate::sequence::{SymbolSequence, TrailingGroup, SYMBOLS_PER_BYTE};
use crate::{CodecConfig, CodecStrategy};

/// Elements per step when nothing else is configured.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Receives `(processed, total)` after every chunk.
///
/// Implementations may be slow; the driver hands over two numbers and keeps
/// no other state shared with the sink.
pub trait ProgressSink {
    fn on_progress(&mut self, processed: u64, total: u64);
}

impl<F: FnMut(u64, u64)> ProgressSink for F {
    fn on_progress(&mut self, processed: u64, total: u64) {
        self(processed, total)
    }
}

/// Sink that ignores progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_progress(&mut self, _processed: u64, _total: u64) {}
}

/// Cooperative cancellation flag, checked once per chunk boundary.
///
/// Clones share the flag, so one clone can be handed to whoever decides to
/// stop the operation.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// One encode or decode run, advanced a chunk at a time.
pub trait Job {
    type Output;

    /// Process the next chunk. Returns `Ok(false)` once the input is exhausted.
    fn step(&mut self) -> Result<bool, CodecError>;

    /// `(processed, total)` in input elements.
    fn progress(&self) -> (u64, u64);

    /// Hand over the accumulated output.
    fn finish(self) -> Self::Output;
}

/// Encodes a byte slice, `chunk_size` bytes per step.
#[derive(Debug)]
pub struct EncodeJob<'a> {
    input: &'a [u8],
    cursor: usize,
    chunk_size: usize,
    strategy: CodecStrategy,
    output: SymbolSequence,
}

impl<'a> EncodeJob<'a> {
    fn new(input: &'a [u8], chunk_size: usize, strategy: CodecStrategy) -> Self {
        Self {
            input,
            cursor: 0,
            chunk_size,
            strategy,
            output: SymbolSequence::with_byte_capacity(input.len()),
        }
    }
}

impl Job for EncodeJob<'_> {
    type Output = SymbolSequence;

    fn step(&mut self) -> Result<bool, CodecError> {
        if self.cursor >= self.input.len() {
            return Ok(false);
        }
        let end = self.cursor.saturating_add(self.chunk_size).min(self.input.len());
        let portion = self.strategy.encode(&self.input[self.cursor..end]);
        self.output.append(&portion);
        self.cursor = end;
        Ok(true)
    }

    fn progress(&self) -> (u64, u64) {
        (self.cursor as u64, self.input.len() as u64)
    }

    fn finish(self) -> SymbolSequence {
        self.output
    }
}

/// Decodes a symbol slice, a whole number of groups per step.
#[derive(Debug)]
pub struct DecodeJob<'a> {
    input: &'a [u8],
    cursor: usize,
    chunk_size: usize,
    strategy: CodecStrategy,
    output: Vec<u8>,
}

impl<'a> DecodeJob<'a> {
    /// Fails up front with `TruncatedSequence` under [`TrailingGroup::Reject`].
    fn new(
        symbols: &'a str,
        chunk_size: usize,
        strategy: CodecStrategy,
        trailing: TrailingGroup,
    ) -> Result<Self, CodecError> {
        let len = trailing.usable_len(symbols.len())?;
        Ok(Self {
            input: &symbols.as_bytes()[..len],
            cursor: 0,
            // A step never splits a group.
            chunk_size: whole_groups(chunk_size),
            strategy,
            output: Vec::with_capacity(len / SYMBOLS_PER_BYTE),
        })
    }
}

/// `chunk_size` rounded up to a whole number of groups, or the largest such
/// count below `usize::MAX`.
fn whole_groups(chunk_size: usize) -> usize {
    chunk_size
        .div_ceil(SYMBOLS_PER_BYTE)
        .checked_mul(SYMBOLS_PER_BYTE)
        .unwrap_or(usize::MAX - usize::MAX % SYMBOLS_PER_BYTE)
}

impl Job for DecodeJob<'_> {
    type Output = Vec<u8>;

    fn step(&mut self) -> Result<bool, CodecError> {
        if self.cursor >= self.input.len() {
            return Ok(false);
        }
        let end = self.cursor.saturating_add(self.chunk_size).min(self.input.len());
        let portion = self
            .strategy
            .decode_groups(&self.input[self.cursor..end])
            .map_err(|e| e.offset_by(self.cursor))?;
        self.output.extend_from_slice(&portion);
        self.cursor = end;
        Ok(true)
    }

    fn progress(&self) -> (u64, u64) {
        (self.cursor as u64, self.input.len() as u64)
    }

    fn finish(self) -> Vec<u8> {
        self.output
    }
}

/// Runs encode and decode jobs in bounded chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Driver {
    chunk_size: usize,
    strategy: CodecStrategy,
    trailing: TrailingGroup,
}

impl Default for Driver {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            strategy: CodecStrategy::default(),
            trailing: TrailingGroup::default(),
        }
    }
}

impl Driver {
    pub fn new(chunk_size: usize) -> Result<Self, CodecError> {
        if chunk_size == 0 {
            return Err(CodecError::InvalidChunkSize(chunk_size));
        }
        Ok(Self {
            chunk_size,
            ..Self::default()
        })
    }

    pub fn from_config(config: &CodecConfig) -> Result<Self, CodecError> {
        Ok(Self::new(config.chunk_size)?
            .with_strategy(config.strategy)
            .with_trailing_group(config.trailing_group))
    }

    pub fn with_strategy(mut self, strategy: CodecStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_trailing_group(mut self, trailing: TrailingGroup) -> Self {
        self.trailing = trailing;
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn strategy(&self) -> CodecStrategy {
        self.strategy
    }

    pub fn trailing_group(&self) -> TrailingGroup {
        self.trailing
    }

    /// Encode `bytes`, reporting progress in bytes.
    pub fn encode(
        &self,
        bytes: &[u8],
        sink: &mut impl ProgressSink,
        cancel: &CancelToken,
    ) -> Result<SymbolSequence, CodecError> {
        debug!("encoding {} bytes in chunks of {}", bytes.len(), self.chunk_size);
        run(EncodeJob::new(bytes, self.chunk_size, self.strategy), sink, cancel)
    }

    /// Decode `symbols`, reporting progress in symbols.
    pub fn decode(
        &self,
        symbols: &str,
        sink: &mut impl ProgressSink,
        cancel: &CancelToken,
    ) -> Result<Vec<u8>, CodecError> {
        debug!("decoding {} symbols in chunks of {}", symbols.len(), self.chunk_size);
        let job = DecodeJob::new(symbols, self.chunk_size, self.strategy, self.trailing)?;
        run(job, sink, cancel)
    }

    /// Like [`Driver::encode`], yielding to the async runtime between chunks.
    pub async fn encode_async(
        &self,
        bytes: &[u8],
        sink: &mut impl ProgressSink,
        cancel: &CancelToken,
    ) -> Result<SymbolSequence, CodecError> {
        run_async(EncodeJob::new(bytes, self.chunk_size, self.strategy), sink, cancel).await
    }

    /// Like [`Driver::decode`], yielding to the async runtime between chunks.
    pub async fn decode_async(
        &self,
        symbols: &str,
        sink: &mut impl ProgressSink,
        cancel: &CancelToken,
    ) -> Result<Vec<u8>, CodecError> {
        let job = DecodeJob::new(symbols, self.chunk_size, self.strategy, self.trailing)?;
        run_async(job, sink, cancel).await
    }
}

/// Run `job` to completion on the calling thread.
///
/// On cancellation the job, and with it the partial output, is dropped.
pub fn run<J: Job>(
    mut job: J,
    sink: &mut impl ProgressSink,
    cancel: &CancelToken,
) -> Result<J::Output, CodecError> {
    loop {
        if cancel.is_cancelled() {
            return Err(CodecError::Cancelled);
        }
        if !job.step()? {
            break;
        }
        let (processed, total) = job.progress();
        sink.on_progress(processed, total);
    }
    Ok(job.finish())
}

/// Run `job` to completion, yielding after every chunk.
pub async fn run_async<J: Job>(
    mut job: J,
    sink: &mut impl ProgressSink,
    cancel: &CancelToken,
) -> Result<J::Output, CodecError> {
    loop {
        if cancel.is_cancelled() {
            return Err(CodecError::Cancelled);
        }
        if !job.step()? {
            break;
        }
        let (processed, total) = job.progress();
        sink.on_progress(processed, total);
        tokio::task::yield_now().await;
    }
    Ok(job.finish())
}
