//! Input and output formats of the `splitter` binary.

pub mod csv;
