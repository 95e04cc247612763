use crate::geometry::ShapeType;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A fixed-width read would run past the end of the buffer.
    InsufficientData { needed: usize, remaining: usize },
    /// The table header carries a dBASE version other than 3.
    UnsupportedVersion(u8),
    /// A shape payload starts with a type tag outside the known enumeration.
    UnknownShapeType(i32),
    /// The tag is known but this reader does not decode the variant.
    UnsupportedShapeType(ShapeType),
    /// A record declares more content than the buffer holds.
    ContentOverrun { declared: usize, available: usize },
    /// Part-start indices are not non-decreasing.
    InvalidPartTable { part: usize },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InsufficientData { needed, remaining } => {
                write!(
                    f,
                    "insufficient data: needed {needed} bytes, {remaining} remaining"
                )
            }
            Error::UnsupportedVersion(version) => {
                write!(f, "unsupported dBASE version: {version}")
            }
            Error::UnknownShapeType(tag) => write!(f, "unknown shape type tag: {tag}"),
            Error::UnsupportedShapeType(kind) => {
                write!(f, "shape type {kind:?} is tagged but not decoded")
            }
            Error::ContentOverrun {
                declared,
                available,
            } => {
                write!(
                    f,
                    "record declares {declared} content bytes but only {available} remain"
                )
            }
            Error::InvalidPartTable { part } => {
                write!(f, "part table not non-decreasing at part {part}")
            }
        }
    }
}

impl std::error::Error for Error {}
