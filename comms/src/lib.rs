mod align;
mod deserialize;
pub mod msg;
mod receiver;
mod sender;
mod serialize;
pub mod specs;

use tokio::io::{AsyncRead, AsyncWrite};

pub use align::Align8;
pub use deserialize::Deserialize;
pub use receiver::MsgReceiver;
pub use sender::MsgSender;
pub use serialize::Serialize;

type LenType = u64;
const LEN_TYPE_SIZE: usize = size_of::<LenType>();

/// Longest frame body either end accepts, in bytes.
pub const MAX_FRAME_LEN: usize = u32::MAX as usize;

/// Creates both `MsgReceiver` and `MsgSender` network channel parts.
///
/// Given a writer and reader creates and returns both ends of the communication.
///
/// # Arguments
/// * `rx` - An async readable.
/// * `tx` - An async writable.
///
/// # Returns
/// A communication stream in the form of a message receiver and sender.
pub fn channel<R, W>(rx: R, tx: W) -> (MsgReceiver<R>, MsgSender<W>)
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    (MsgReceiver::new(rx), MsgSender::new(tx))
}
