//! Chunk sources feeding the digest engine

use std::io::{ErrorKind, Read};

/// Something that can hand out the next chunk of a byte stream.
pub trait ChunkSource {
    /// Fill the front of `buf` with the next chunk.
    ///
    /// Returns `Ok(Some(n))` with `n > 0` bytes written, or `Ok(None)` at end of data.
    fn next_chunk(&mut self, buf: &mut [u8]) -> std::io::Result<Option<usize>>;
}

impl<R: Read + ?Sized> ChunkSource for R {
    fn next_chunk(&mut self, buf: &mut [u8]) -> std::io::Result<Option<usize>> {
        if buf.is_empty() {
            return Err(std::io::Error::new(
                ErrorKind::InvalidInput,
                "chunk buffer must not be empty",
            ));
        }
        loop {
            match self.read(buf) {
                Ok(0) => return Ok(None),
                Ok(n) => return Ok(Some(n)),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}
