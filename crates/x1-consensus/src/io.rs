//! I/O traits shared with the `bitcoin` consensus encoder.

pub use std::io::{Cursor, Error, ErrorKind, Read, Write, sink};
