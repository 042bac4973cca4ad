//! Buffered Channel I/O
//!
//! Exact-count reads and writes over an internally buffered byte stream.
//! Reads are served from a fixed-size buffer refilled only when empty, so
//! line-by-line header parsing does not turn into one syscall per byte.
//! Transient interruptions (`ErrorKind::Interrupted`) are retried inside
//! this layer and never surface to callers.

use std::io;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Size of the internal read buffer in bytes
pub const READ_BUF_SIZE: usize = 8192;

// == Buffered Channel ==
/// A bidirectional byte stream with a read-side buffer.
///
/// Generic over the underlying stream so tests can drive it with in-memory
/// streams instead of sockets.
#[derive(Debug)]
pub struct BufferedChannel<S> {
    /// Underlying bidirectional stream
    stream: S,
    /// Internal read buffer
    buf: [u8; READ_BUF_SIZE],
    /// Position of the next unread byte in `buf`
    pos: usize,
    /// Number of unread bytes left in `buf`
    cnt: usize,
}

impl<S> BufferedChannel<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wraps a stream with an empty read buffer.
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            buf: [0u8; READ_BUF_SIZE],
            pos: 0,
            cnt: 0,
        }
    }

    // == Internal Buffer Management ==
    /// Refills the internal buffer from the stream if it is empty.
    ///
    /// Returns the number of unread bytes afterwards; `0` means the peer
    /// closed the stream. Interrupted reads are retried.
    async fn fill(&mut self) -> io::Result<usize> {
        while self.cnt == 0 {
            match self.stream.read(&mut self.buf).await {
                Ok(0) => return Ok(0),
                Ok(n) => {
                    self.pos = 0;
                    self.cnt = n;
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            }
        }
        Ok(self.cnt)
    }

    /// Copies up to `out.len()` buffered bytes into `out`, refilling first
    /// if needed. Returns `0` only at end-of-stream.
    async fn read_some(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if self.fill().await? == 0 {
            return Ok(0);
        }
        let take = out.len().min(self.cnt);
        out[..take].copy_from_slice(&self.buf[self.pos..self.pos + take]);
        self.pos += take;
        self.cnt -= take;
        Ok(take)
    }

    // == Public Read Operations ==
    /// Reads exactly `out.len()` bytes unless the peer closes first.
    ///
    /// # Returns
    /// The number of bytes actually transferred. This equals `out.len()`
    /// except when end-of-stream cuts the transfer short; a short count is
    /// never caused by a transient interruption.
    pub async fn read_full(&mut self, out: &mut [u8]) -> io::Result<usize> {
        let mut filled = 0;
        while filled < out.len() {
            let n = self.read_some(&mut out[filled..]).await?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        Ok(filled)
    }

    /// Reads one line into `line`, replacing its previous contents.
    ///
    /// Accumulates bytes up to and including the `\n` terminator, or until
    /// `max_len - 1` bytes have been captured, whichever comes first.
    ///
    /// # Returns
    /// The captured line length. `0` means end-of-stream with no data; a
    /// line cut short by end-of-stream is returned without its terminator.
    pub async fn read_line(&mut self, line: &mut Vec<u8>, max_len: usize) -> io::Result<usize> {
        line.clear();
        let cap = max_len.saturating_sub(1);

        while line.len() < cap {
            let mut byte = [0u8; 1];
            if self.read_some(&mut byte).await? == 0 {
                break;
            }
            line.push(byte[0]);
            if byte[0] == b'\n' {
                break;
            }
        }

        Ok(line.len())
    }

    // == Public Write Operation ==
    /// Writes the whole of `bytes`, retrying interrupted writes.
    ///
    /// Fails if the stream reports an error or stops accepting bytes before
    /// the transfer completes.
    pub async fn write_all(&mut self, mut bytes: &[u8]) -> io::Result<()> {
        while !bytes.is_empty() {
            match self.stream.write(bytes).await {
                Ok(0) => return Err(io::ErrorKind::WriteZero.into()),
                Ok(n) => bytes = &bytes[n..],
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }
}
