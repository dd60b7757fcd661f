use crate::error::CodecError;
use crate::sequence::{SymbolSequence, SYMBOLS_PER_BYTE};
use crate::strategies::Sequential;
use crate::traits::Codec;
use rayon::prelude::*;

/// Strategy: same table lookup as `Sequential`, partitioned across the rayon pool.
///
/// # How it works
///
/// Every byte's 4 symbols depend only on that byte, and every 4-symbol group
/// decodes independently, so the input is cut into fixed-size chunks
/// (1 MiB of bytes, or the 4 MiB of symbols that encode them), each chunk is
/// converted on a worker thread, and the results are concatenated in input
/// order. Output is byte-identical to `Sequential`.
///
/// Inputs no larger than one chunk skip the pool entirely.
#[derive(Debug, Clone, Copy, Default)]
pub struct Parallel;

// Bytes per task
const CHUNK_SIZE: usize = 1024 * 1024;

impl Codec for Parallel {
    fn encode(&self, bytes: &[u8]) -> SymbolSequence {
        if bytes.len() <= CHUNK_SIZE {
            return Sequential.encode(bytes);
        }

        let portions: Vec<SymbolSequence> = bytes
            .par_chunks(CHUNK_SIZE)
            .map(|chunk| Sequential.encode(chunk))
            .collect();

        let mut result = SymbolSequence::with_byte_capacity(bytes.len());
        for portion in &portions {
            result.append(portion);
        }
        result
    }

    fn decode_groups(&self, symbols: &[u8]) -> Result<Vec<u8>, CodecError> {
        let symbol_chunk = CHUNK_SIZE * SYMBOLS_PER_BYTE;
        if symbols.len() <= symbol_chunk {
            return Sequential.decode_groups(symbols);
        }

        // Keep every result so the first error in input order wins, whichever
        // worker finished first.
        let portions: Vec<Result<Vec<u8>, CodecError>> = symbols
            .par_chunks(symbol_chunk)
            .enumerate()
            .map(|(idx, chunk)| {
                Sequential
                    .decode_groups(chunk)
                    .map_err(|e| e.offset_by(idx * symbol_chunk))
            })
            .collect();

        let mut result = Vec::with_capacity(symbols.len() / SYMBOLS_PER_BYTE);
        for portion in portions {
            result.extend_from_slice(&portion?);
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_parallel_round_trip() {
        let mut rng = rand::thread_rng();
        // Larger than CHUNK_SIZE so the pool is used
        let size = CHUNK_SIZE + 500;
        let input: Vec<u8> = (0..size).map(|_| rng.gen()).collect();

        let encoded = Parallel.encode(&input);
        assert_eq!(encoded, Sequential.encode(&input));

        let decoded = Parallel.decode(encoded.as_str()).expect("Decoding failed");
        assert_eq!(decoded, input);
    }

    #[test]
    fn test_parallel_exact_chunk() {
        let mut rng = rand::thread_rng();
        let size = CHUNK_SIZE * 2; // Exactly 2 chunks
        let input: Vec<u8> = (0..size).map(|_| rng.gen()).collect();

        let encoded = Parallel.encode(&input);
        let decoded = Parallel.decode(encoded.as_str()).expect("Decoding failed");
        assert_eq!(decoded, input);
    }

    #[test]
    fn test_parallel_small_input() {
        let input = b"GeneStore".to_vec();
        let encoded = Parallel.encode(&input);
        assert_eq!(encoded, Sequential.encode(&input));
        assert_eq!(Parallel.decode(encoded.as_str()).unwrap(), input);
    }

    #[test]
    fn test_parallel_reports_first_error_with_absolute_position() {
        let input = vec![0u8; CHUNK_SIZE * 3];
        let mut symbols = Parallel.encode(&input).into_string().into_bytes();

        // One bad symbol in the second chunk, one in the third.
        let first_bad = CHUNK_SIZE * SYMBOLS_PER_BYTE + 17;
        let second_bad = 2 * CHUNK_SIZE * SYMBOLS_PER_BYTE + 3;
        symbols[first_bad] = b'N';
        symbols[second_bad] = b'X';
        let text = String::from_utf8(symbols).unwrap();

        assert_eq!(
            Parallel.decode(&text),
            Err(CodecError::InvalidSymbol {
                byte: b'N',
                position: first_bad
            })
        );
    }
}
