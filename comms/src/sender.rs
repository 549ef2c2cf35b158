//! Writing end of a framed channel.

use std::io;

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::{LEN_TYPE_SIZE, LenType, MAX_FRAME_LEN, Serialize};

/// Frames messages and writes them to the inner writer.
pub struct MsgSender<W>
where
    W: AsyncWrite + Unpin,
{
    tx: W,
    // Length prefix plus the serialized head of the frame being sent.
    head: Vec<u8>,
}

impl<W: AsyncWrite + Unpin> MsgSender<W> {
    pub(super) fn new(tx: W) -> Self {
        Self {
            tx,
            head: Vec::new(),
        }
    }

    /// Sends `msg` as a single frame.
    ///
    /// The length prefix and whatever `msg` serializes into the head buffer
    /// are written first, the borrowed tail follows without being copied.
    ///
    /// # Errors
    /// Returns `io::ErrorKind::InvalidInput` if the frame would exceed
    /// `MAX_FRAME_LEN`, or the writer's error.
    pub async fn send<'a, T: Serialize<'a>>(&mut self, msg: &'a T) -> io::Result<()> {
        self.head.clear();
        self.head.extend_from_slice(&[0; LEN_TYPE_SIZE]);

        let tail = msg.serialize(&mut self.head)?;
        let len = self.head.len() - LEN_TYPE_SIZE + tail.map_or(0, <[u8]>::len);

        if len > MAX_FRAME_LEN {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("frame of {len} bytes exceeds the {MAX_FRAME_LEN} bytes limit"),
            ));
        }

        self.head[..LEN_TYPE_SIZE].copy_from_slice(&(len as LenType).to_be_bytes());
        self.tx.write_all(&self.head).await?;

        if let Some(tail) = tail {
            self.tx.write_all(tail).await?;
        }

        self.tx.flush().await
    }

    /// Shuts the writer down, the peer reads an end of stream after the
    /// frames already sent.
    pub async fn shutdown(&mut self) -> io::Result<()> {
        self.tx.shutdown().await
    }
}
