//! Streaming MD5 digest engine
//!
//! `Md5Hash` consumes an arbitrarily long byte stream in pieces of any size and
//! produces the 16-byte MD5 digest defined by RFC 1321. Output is independent of
//! how the caller chunks the input: bytes are staged in a 64-byte pending buffer
//! and the compression transform runs exactly once per complete block.
//!
//! Lifecycle: `start` -> `update`* -> `finish`. After `finish` the engine only
//! reports its result until `start` is called again.

mod source;

pub use source::ChunkSource;

use crate::error::DigestError;

/// Size of one compression block in bytes
pub const BLOCK_SIZE: usize = 64;

/// Size of the finalized digest in bytes
pub const DIGEST_SIZE: usize = 16;

/// Raw digest bytes
pub type Digest = [u8; DIGEST_SIZE];

const INITIAL_STATE: [u32; 4] = [0x67452301, 0xefcdab89, 0x98badcfe, 0x10325476];

/// Per-step additive constants, floor(abs(sin(i + 1)) * 2^32).
const K: [u32; 64] = [
    // Round 1
    0xd76aa478, 0xe8c7b756, 0x242070db, 0xc1bdceee, 0xf57c0faf, 0x4787c62a, 0xa8304613, 0xfd469501,
    0x698098d8, 0x8b44f7af, 0xffff5bb1, 0x895cd7be, 0x6b901122, 0xfd987193, 0xa679438e, 0x49b40821,
    // Round 2
    0xf61e2562, 0xc040b340, 0x265e5a51, 0xe9b6c7aa, 0xd62f105d, 0x02441453, 0xd8a1e681, 0xe7d3fbc8,
    0x21e1cde6, 0xc33707d6, 0xf4d50d87, 0x455a14ed, 0xa9e3e905, 0xfcefa3f8, 0x676f02d9, 0x8d2a4c8a,
    // Round 3
    0xfffa3942, 0x8771f681, 0x6d9d6122, 0xfde5380c, 0xa4beea44, 0x4bdecfa9, 0xf6bb4b60, 0xbebfbc70,
    0x289b7ec6, 0xeaa127fa, 0xd4ef3085, 0x04881d05, 0xd9d4d039, 0xe6db99e5, 0x1fa27cf8, 0xc4ac5665,
    // Round 4
    0xf4292244, 0x432aff97, 0xab9423a7, 0xfc93a039, 0x655b59c3, 0x8f0ccc92, 0xffeff47d, 0x85845dd1,
    0x6fa87e4f, 0xfe2ce6e0, 0xa3014314, 0x4e0811a1, 0xf7537e82, 0xbd3af235, 0x2ad7d2bb, 0xeb86d391,
];

/// Left-rotation amounts; each round repeats its four-entry schedule.
const SHIFTS: [[u32; 4]; 4] = [[7, 12, 17, 22], [5, 9, 14, 20], [4, 11, 16, 23], [6, 10, 15, 21]];

const PADDING: [u8; BLOCK_SIZE] = {
    let mut padding = [0u8; BLOCK_SIZE];
    padding[0] = 0x80;
    padding
};

/// Incremental MD5 hasher
#[derive(Clone)]
pub struct Md5Hash {
    /// Running A, B, C, D accumulators
    state: [u32; 4],
    /// Total input length in bits: [low, high]
    count: [u32; 2],
    buffer: [u8; BLOCK_SIZE],
    digest: Digest,
    finalized: bool,
}

impl Default for Md5Hash {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Md5Hash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Md5Hash")
            .field("bytes_consumed", &self.bytes_consumed())
            .field("finalized", &self.finalized)
            .finish()
    }
}

impl Md5Hash {
    /// Create an engine that is ready to accept input
    pub fn new() -> Self {
        let mut hash = Self {
            state: INITIAL_STATE,
            count: [0; 2],
            buffer: [0; BLOCK_SIZE],
            digest: [0; DIGEST_SIZE],
            finalized: false,
        };
        hash.start();
        hash
    }

    /// Reset to the initial accumulators and zero counters.
    ///
    /// Valid on a fresh engine and on a finalized one.
    pub fn start(&mut self) {
        self.state = INITIAL_STATE;
        self.count = [0; 2];
        self.buffer = [0; BLOCK_SIZE];
        self.digest = [0; DIGEST_SIZE];
        self.finalized = false;
    }

    /// Append `data` to the logical input stream.
    ///
    /// Zero-length input is accepted and changes nothing.
    pub fn update(&mut self, data: &[u8]) -> Result<(), DigestError> {
        if self.finalized {
            return Err(DigestError::Finalized);
        }
        self.absorb(data);
        Ok(())
    }

    /// Drain `source` into the engine using `buf` as the read scratch space.
    ///
    /// Returns the number of bytes consumed. A source error leaves the engine
    /// holding a prefix of the stream; callers must discard it.
    pub fn update_from<S>(&mut self, source: &mut S, buf: &mut [u8]) -> Result<u64, DigestError>
    where
        S: ChunkSource + ?Sized,
    {
        if self.finalized {
            return Err(DigestError::Finalized);
        }
        let mut total = 0u64;
        while let Some(len) = source.next_chunk(buf)? {
            self.absorb(&buf[..len]);
            total += len as u64;
        }
        Ok(total)
    }

    /// Pad the stream, append its bit length and produce the digest.
    ///
    /// Returns the lowercase hex fingerprint, or an empty string when the
    /// engine was already finalized.
    pub fn finish(&mut self) -> String {
        if self.finalized {
            return String::new();
        }

        let bits = encode_counter(&self.count);

        // Pad out to 56 mod 64, leaving room for the length.
        let index = self.pending_len();
        let pad_len = if index < 56 { 56 - index } else { 120 - index };
        self.absorb(&PADDING[..pad_len]);
        self.absorb(&bits);
        debug_assert_eq!(self.pending_len(), 0);

        for (chunk, word) in self.digest.chunks_exact_mut(4).zip(self.state.iter()) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }

        self.buffer = [0; BLOCK_SIZE];
        self.count = [0; 2];
        self.finalized = true;

        self.hash()
    }

    /// Finalized hex fingerprint, empty before `finish`
    pub fn hash(&self) -> String {
        if !self.finalized {
            return String::new();
        }
        hex::encode(self.digest)
    }

    /// Finalized raw digest
    pub fn digest(&self) -> Option<Digest> {
        self.finalized.then_some(self.digest)
    }

    /// Bytes consumed since the last `start`, modulo 2^61
    pub fn bytes_consumed(&self) -> u64 {
        ((u64::from(self.count[1]) << 32) | u64::from(self.count[0])) >> 3
    }

    fn pending_len(&self) -> usize {
        ((self.count[0] >> 3) as usize) % BLOCK_SIZE
    }

    fn absorb(&mut self, data: &[u8]) {
        let index = self.pending_len();

        // The low counter carries into the high one on overflow; bits above
        // bit 29 of the length go straight into the high word.
        let len = data.len() as u64;
        let added = (len << 3) as u32;
        self.count[0] = self.count[0].wrapping_add(added);
        if self.count[0] < added {
            self.count[1] = self.count[1].wrapping_add(1);
        }
        self.count[1] = self.count[1].wrapping_add((len >> 29) as u32);

        let first_part = BLOCK_SIZE - index;
        let mut rest = data;
        let mut index = index;

        if data.len() >= first_part {
            let (head, tail) = data.split_at(first_part);
            self.buffer[index..].copy_from_slice(head);
            transform(&mut self.state, &self.buffer);

            let mut blocks = tail.chunks_exact(BLOCK_SIZE);
            for block in &mut blocks {
                transform(&mut self.state, block);
            }
            rest = blocks.remainder();
            index = 0;
        }

        self.buffer[index..index + rest.len()].copy_from_slice(rest);
    }
}

/// Fingerprint a complete in-memory buffer
pub fn md5_hex(data: &[u8]) -> String {
    let mut hash = Md5Hash::new();
    hash.absorb(data);
    hash.finish()
}

fn encode_counter(count: &[u32; 2]) -> [u8; 8] {
    let mut out = [0u8; 8];
    out[..4].copy_from_slice(&count[0].to_le_bytes());
    out[4..].copy_from_slice(&count[1].to_le_bytes());
    out
}

/// Run the 64-step compression function over one block
fn transform(state: &mut [u32; 4], block: &[u8]) {
    debug_assert_eq!(block.len(), BLOCK_SIZE);
    let mut x = [0u32; 16];
    for (word, bytes) in x.iter_mut().zip(block.chunks_exact(4)) {
        *word = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    }

    let [mut a, mut b, mut c, mut d] = *state;

    for step in 0..64 {
        let round = step / 16;
        let (mix, word) = match round {
            0 => ((b & c) | (!b & d), step),
            1 => ((b & d) | (c & !d), (5 * step + 1) % 16),
            2 => (b ^ c ^ d, (3 * step + 5) % 16),
            _ => (c ^ (b | !d), (7 * step) % 16),
        };

        let rotated = a
            .wrapping_add(mix)
            .wrapping_add(x[word])
            .wrapping_add(K[step])
            .rotate_left(SHIFTS[round][step % 4]);

        a = d;
        d = c;
        c = b;
        b = b.wrapping_add(rotated);
    }

    state[0] = state[0].wrapping_add(a);
    state[1] = state[1].wrapping_add(b);
    state[2] = state[2].wrapping_add(c);
    state[3] = state[3].wrapping_add(d);

    // Scrub the decoded block.
    x.fill(0);
}
