use std::io::{self, ErrorKind};

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

use super::error::{RequestError, Side};

/// Reads one line into `buf`, terminator included, up to `max_len` bytes.
/// Returns the number of bytes read.
pub(crate) async fn read_line<S>(
    reader: &mut BufReader<S>,
    buf: &mut Vec<u8>,
    side: Side,
    max_len: usize,
) -> Result<usize, RequestError>
where
    S: AsyncRead + Unpin,
{
    buf.clear();

    loop {
        let available = reader
            .fill_buf()
            .await
            .map_err(|source| RequestError::Read { side, source })?;

        if available.is_empty() {
            return Err(RequestError::EndOfStream { side });
        }

        let newline_pos = available.iter().position(|byte| *byte == b'\n');
        let consume = newline_pos.map(|idx| idx + 1).unwrap_or(available.len());

        if buf.len() + consume > max_len {
            return Err(RequestError::LineTooLong {
                side,
                limit: max_len,
            });
        }

        buf.extend_from_slice(&available[..consume]);
        reader.consume(consume);

        if newline_pos.is_some() {
            return Ok(buf.len());
        }
    }
}

/// Writes the whole of `buf`, continuing across short writes and retrying
/// interrupted ones. The error carries how many bytes made it out.
pub(crate) async fn write_all_bytes<W>(
    writer: &mut W,
    buf: &[u8],
    side: Side,
) -> Result<usize, RequestError>
where
    W: AsyncWrite + Unpin,
{
    let mut written = 0usize;
    while written < buf.len() {
        match writer.write(&buf[written..]).await {
            Ok(0) => {
                return Err(RequestError::Write {
                    side,
                    written,
                    source: io::Error::new(ErrorKind::WriteZero, "write returned zero bytes"),
                });
            }
            Ok(n) => written += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(source) => {
                return Err(RequestError::Write {
                    side,
                    written,
                    source,
                });
            }
        }
    }
    Ok(written)
}
