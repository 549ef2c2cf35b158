use std::{borrow::Cow, io};

use crate::{Deserialize, Serialize, specs::RunSpec};

// Eight bytes keep the payload that follows aligned for `u64` and `f64`.
type Header = u64;
const HEADER_SIZE: usize = size_of::<Header>();

const ERR: Header = 0;
const CONTROL: Header = 1;
const DISTANCES: Header = 2;
const RANDOMS: Header = 3;
const TOUR: Header = 4;
const TRAIL: Header = 5;

/// The payload data for the `Data` variant of the `Msg` enum.
#[derive(Debug)]
pub enum Payload<'a> {
    /// The distance matrix in row-major order.
    Distances(&'a [u32]),
    /// The whole random stream.
    Randoms(&'a [u64]),
    /// A tour as its city sequence, empty if the sender has none.
    Tour(&'a [u32]),
    /// Pheromone values along the edges of the tour sent alongside.
    Trail(&'a [f64]),
}

/// The command for the `Control` variant of the `Msg` enum.
#[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    Join,
    Setup(RunSpec),
    Standing {
        rank: usize,
        cost: Option<u64>,
        stagnation: u64,
    },
    Disconnect,
}

/// The application layer message for the entire system.
#[derive(Debug)]
pub enum Msg<'a> {
    Control(Command),
    Data(Payload<'a>),
    Err(Cow<'a, str>),
}

impl Msg<'_> {
    /// A short name of the message kind, for logs and errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Msg::Control(Command::Join) => "control/join",
            Msg::Control(Command::Setup(_)) => "control/setup",
            Msg::Control(Command::Standing { .. }) => "control/standing",
            Msg::Control(Command::Disconnect) => "control/disconnect",
            Msg::Data(Payload::Distances(_)) => "data/distances",
            Msg::Data(Payload::Randoms(_)) => "data/randoms",
            Msg::Data(Payload::Tour(_)) => "data/tour",
            Msg::Data(Payload::Trail(_)) => "data/trail",
            Msg::Err(_) => "err",
        }
    }

    fn buf_is_too_small<T>(size: usize) -> io::Result<T> {
        Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("The given buffer is too small {size}, must at least be {HEADER_SIZE} bytes"),
        ))
    }

    fn invalid_kind<T>(kind: Header) -> io::Result<T> {
        Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Received an invalid kind header {kind}"),
        ))
    }

    fn numbers<T: bytemuck::Pod>(bytes: &[u8]) -> io::Result<&[T]> {
        bytemuck::try_cast_slice(bytes).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Received a malformed numeric payload of {} bytes: {e}", bytes.len()),
            )
        })
    }
}

impl<'a> Serialize<'a> for Msg<'a> {
    fn serialize(&'a self, buf: &mut Vec<u8>) -> io::Result<Option<&'a [u8]>> {
        match self {
            Msg::Err(e) => {
                buf.extend_from_slice(&ERR.to_be_bytes());
                Ok(Some(e.as_bytes()))
            }
            Msg::Control(cmd) => {
                buf.extend_from_slice(&CONTROL.to_be_bytes());
                serde_json::to_writer(&mut *buf, cmd)?;
                Ok(None)
            }
            Msg::Data(payload) => {
                let (kind, bytes): (Header, &[u8]) = match payload {
                    Payload::Distances(nums) => (DISTANCES, bytemuck::cast_slice(nums)),
                    Payload::Randoms(nums) => (RANDOMS, bytemuck::cast_slice(nums)),
                    Payload::Tour(nums) => (TOUR, bytemuck::cast_slice(nums)),
                    Payload::Trail(nums) => (TRAIL, bytemuck::cast_slice(nums)),
                };

                buf.extend_from_slice(&kind.to_be_bytes());
                Ok(Some(bytes))
            }
        }
    }
}

impl<'a> Deserialize<'a> for Msg<'a> {
    fn deserialize(buf: &'a mut [u8]) -> io::Result<Self> {
        if buf.len() < HEADER_SIZE {
            return Self::buf_is_too_small(buf.len());
        }

        let buf: &'a [u8] = buf;
        let (kind_buf, rest) = buf.split_at(HEADER_SIZE);

        let mut kind = [0; HEADER_SIZE];
        kind.copy_from_slice(kind_buf);

        match Header::from_be_bytes(kind) {
            ERR => {
                let string = std::str::from_utf8(rest)
                    .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;

                Ok(Self::Err(Cow::Borrowed(string)))
            }
            CONTROL => {
                let cmd = serde_json::from_slice(rest)?;
                Ok(Self::Control(cmd))
            }
            DISTANCES => Ok(Self::Data(Payload::Distances(Self::numbers(rest)?))),
            RANDOMS => Ok(Self::Data(Payload::Randoms(Self::numbers(rest)?))),
            TOUR => Ok(Self::Data(Payload::Tour(Self::numbers(rest)?))),
            TRAIL => Ok(Self::Data(Payload::Trail(Self::numbers(rest)?))),
            kind => Self::invalid_kind(kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Lays `frame` out in an 8 byte aligned buffer, like the receiver does.
    fn aligned(frame: &[u8]) -> Vec<u64> {
        let mut buf = vec![0u64; frame.len().div_ceil(8)];
        bytemuck::cast_slice_mut::<u64, u8>(&mut buf)[..frame.len()].copy_from_slice(frame);
        buf
    }

    fn frame(msg: &Msg) -> Vec<u8> {
        let mut buf = Vec::new();
        let tail = msg.serialize(&mut buf).unwrap();
        buf.extend_from_slice(tail.unwrap_or_default());
        buf
    }

    #[test]
    fn trail_values_keep_every_bit() {
        let trail = [0.1, 1.0 / 3.0, f64::MIN_POSITIVE, 0.999_999_999_999_999_9];
        let bytes = frame(&Msg::Data(Payload::Trail(&trail)));
        let mut buf = aligned(&bytes);
        let view = &mut bytemuck::cast_slice_mut::<u64, u8>(&mut buf)[..bytes.len()];

        let Msg::Data(Payload::Trail(got)) = Msg::deserialize(view).unwrap() else {
            panic!("expected a trail");
        };

        let got: Vec<u64> = got.iter().map(|x| x.to_bits()).collect();
        let expected: Vec<u64> = trail.iter().map(|x| x.to_bits()).collect();
        assert_eq!(got, expected);
    }

    #[test]
    fn setup_floats_survive_json() {
        let spec = RunSpec {
            rank: 2,
            workers: 3,
            cities: 4,
            randoms: 10,
            ants: vec![2, 2, 1],
            params: crate::specs::ParamsSpec {
                external_iterations: 5,
                on_node_iterations: 3,
                alpha: 0.1 + 0.2,
                beta: 2.0_f64.sqrt(),
                evaporation: 0.95,
            },
        };

        let bytes = frame(&Msg::Control(Command::Setup(spec.clone())));
        let mut buf = aligned(&bytes);
        let view = &mut bytemuck::cast_slice_mut::<u64, u8>(&mut buf)[..bytes.len()];

        let Msg::Control(Command::Setup(got)) = Msg::deserialize(view).unwrap() else {
            panic!("expected a setup command");
        };

        assert_eq!(got, spec);
        assert_eq!(got.params.alpha.to_bits(), (0.1_f64 + 0.2).to_bits());
    }

    #[test]
    fn rejects_unknown_kind() {
        let mut bytes = 42u64.to_be_bytes().to_vec();
        bytes.extend_from_slice(&[1, 2, 3, 4]);

        let err = Msg::deserialize(&mut bytes).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn rejects_short_buffer() {
        let mut bytes = [0u8; 3];
        let err = Msg::deserialize(&mut bytes).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn rejects_truncated_numbers() {
        let mut bytes = TOUR.to_be_bytes().to_vec();
        bytes.extend_from_slice(&[0, 0, 0, 1, 0, 0]);
        let mut buf = aligned(&bytes);
        let view = &mut bytemuck::cast_slice_mut::<u64, u8>(&mut buf)[..bytes.len()];

        let err = Msg::deserialize(view).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
