use std::io;

/// A type that can be written into a frame body.
pub trait Serialize<'a> {
    /// Writes the owned part of the message into `buf`.
    ///
    /// # Arguments
    /// * `buf` - The buffer to write into, it may already hold a prefix.
    ///
    /// # Returns
    /// An optional slice of bytes to be written right after `buf` without
    /// being copied into it, or an io error if serialization failed.
    fn serialize(&'a self, buf: &mut Vec<u8>) -> io::Result<Option<&'a [u8]>>;
}
