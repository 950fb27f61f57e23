//! Buffered byte copying with a reusable buffer.
//!
//! One [`CopyBuffer`] is allocated per job and reused for every file the
//! job writes, instead of letting `std::io::copy` allocate per call.

use std::io;
use std::io::Read;
use std::io::Write;

/// Buffer size for file copies (64KB), matching typical filesystem block
/// sizes.
pub const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Heap buffer reused across copy operations.
#[derive(Debug)]
pub struct CopyBuffer {
    buf: Box<[u8]>,
}

impl CopyBuffer {
    /// Creates a zeroed buffer of [`COPY_BUFFER_SIZE`] bytes.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: vec![0u8; COPY_BUFFER_SIZE].into_boxed_slice(),
        }
    }

    /// Returns the buffer size in bytes.
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        self.buf.len()
    }
}

impl Default for CopyBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Copies everything from `reader` to `writer` through `buffer`.
///
/// Returns the number of bytes copied. Interrupted reads are retried.
///
/// # Errors
///
/// Returns the first read or write error.
///
/// # Examples
///
/// ```
/// use unzipset_core::copy::CopyBuffer;
/// use unzipset_core::copy::copy_with_buffer;
///
/// let mut buffer = CopyBuffer::new();
/// let mut output = Vec::new();
/// let copied = copy_with_buffer(&mut &b"hello"[..], &mut output, &mut buffer).unwrap();
/// assert_eq!(copied, 5);
/// assert_eq!(output, b"hello");
/// ```
pub fn copy_with_buffer<R: Read + ?Sized, W: Write + ?Sized>(
    reader: &mut R,
    writer: &mut W,
    buffer: &mut CopyBuffer,
) -> io::Result<u64> {
    let mut total: u64 = 0;

    loop {
        let bytes_read = match reader.read(&mut buffer.buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };

        writer.write_all(&buffer.buf[..bytes_read])?;
        total = total.saturating_add(bytes_read as u64);
    }

    Ok(total)
}
