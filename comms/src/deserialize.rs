use std::io;

/// A type that can be read from a frame body, possibly borrowing from it.
pub trait Deserialize<'a>: Sized {
    fn deserialize(buf: &'a mut [u8]) -> io::Result<Self>;
}
