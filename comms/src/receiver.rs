//! Reading end of a framed channel.

use std::io;

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::{Align8, Deserialize, LEN_TYPE_SIZE, LenType, MAX_FRAME_LEN};

/// Reads frames from the inner reader and decodes them in place.
pub struct MsgReceiver<R: AsyncRead + Unpin> {
    rx: R,
}

impl<R: AsyncRead + Unpin> MsgReceiver<R> {
    pub(super) fn new(rx: R) -> Self {
        Self { rx }
    }

    /// Waits for the next frame and decodes it.
    ///
    /// # Arguments
    /// * `buf` - Where the frame body is read into, the returned `T` borrows
    ///           from it. Its items are 8 byte aligned so numeric payloads
    ///           can be viewed in place.
    ///
    /// # Errors
    /// Returns `io::ErrorKind::UnexpectedEof` if the peer closed the channel,
    /// `io::ErrorKind::InvalidData` if the frame is too long or malformed.
    pub async fn recv_into<'buf, T, B>(&mut self, buf: &'buf mut Vec<B>) -> io::Result<T>
    where
        T: Deserialize<'buf>,
        B: Align8,
    {
        let mut prefix = [0; LEN_TYPE_SIZE];
        self.rx.read_exact(&mut prefix).await.map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => {
                io::Error::new(e.kind(), "the peer closed the channel")
            }
            _ => e,
        })?;

        let len = LenType::from_be_bytes(prefix);
        let len = usize::try_from(len)
            .ok()
            .filter(|&len| len <= MAX_FRAME_LEN)
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("frame of {len} bytes exceeds the {MAX_FRAME_LEN} bytes limit"),
                )
            })?;

        buf.clear();
        buf.resize(len.div_ceil(size_of::<B>()), bytemuck::Zeroable::zeroed());

        let body = &mut bytemuck::cast_slice_mut(buf)[..len];
        self.rx.read_exact(body).await?;

        T::deserialize(body)
    }
}
