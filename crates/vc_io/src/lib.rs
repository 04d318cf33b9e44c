#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

// -----------------------------------------------------------------------------
// Modules

mod codec;
mod error;
mod handler;
mod limits;
mod reader;
mod slice;
mod stream;
mod writer;

// -----------------------------------------------------------------------------
// Exports

pub use codec::{ReadExt, WriteExt};
pub use error::{ErrorKind, SerialError, SerialResult};
pub use handler::{ErrorHandler, ErrorLog, LogErrorHandler};
pub use limits::Limits;
pub use reader::{MAX_SEEK_BACK, Reader, SeekBack};
pub use slice::SliceReader;
pub use stream::{IoReader, IoWriter};
pub use writer::Writer;
