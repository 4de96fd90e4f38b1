//! io.rs
//! Normalised input and output for both pipelines.

use std::io::{Cursor, Read, Write};
use std::path::PathBuf;

use crate::types::CodecError;

/// Canonical input abstraction
pub enum InputSource {
    Reader(Box<dyn Read + Send>),
    File(PathBuf),
    Memory(Vec<u8>),
}

impl From<Vec<u8>> for InputSource {
    fn from(bytes: Vec<u8>) -> Self {
        InputSource::Memory(bytes)
    }
}

impl From<PathBuf> for InputSource {
    fn from(path: PathBuf) -> Self {
        InputSource::File(path)
    }
}

/// Canonical output abstraction
pub enum OutputSink {
    Writer(Box<dyn Write + Send>),
    File(PathBuf),
    Memory,
}

/// Normalize input source into a boxed reader
pub fn open_input(src: InputSource) -> Result<Box<dyn Read + Send>, CodecError> {
    let reader: Box<dyn Read + Send> = match src {
        InputSource::Reader(r) => r,
        InputSource::File(p) => Box::new(std::fs::File::open(p)?),
        InputSource::Memory(b) => Box::new(Cursor::new(b)),
    };
    Ok(reader)
}

/// Read the whole source; PDFs and payloads are parsed from memory.
pub fn read_all(src: InputSource) -> Result<Vec<u8>, CodecError> {
    if let InputSource::Memory(b) = src {
        return Ok(b);
    }
    let mut reader = open_input(src)?;
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf)?;
    Ok(buf)
}

/// Write `bytes` to the sink. `OutputSink::Memory` hands the bytes back.
pub fn write_all(sink: OutputSink, bytes: &[u8]) -> Result<Option<Vec<u8>>, CodecError> {
    match sink {
        OutputSink::Writer(mut w) => {
            w.write_all(bytes)?;
            w.flush()?;
            Ok(None)
        }
        OutputSink::File(p) => {
            std::fs::write(p, bytes)?;
            Ok(None)
        }
        OutputSink::Memory => Ok(Some(bytes.to_vec())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reader_and_memory_agree() {
        let from_reader = read_all(InputSource::Reader(Box::new(Cursor::new(b"abc".to_vec())))).unwrap();
        let from_memory = read_all(InputSource::from(b"abc".to_vec())).unwrap();
        assert_eq!(from_reader, from_memory);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = read_all(InputSource::File(PathBuf::from("/nonexistent/etax.pdf"))).unwrap_err();
        assert!(matches!(err, CodecError::Io(_)));
    }

    #[test]
    fn memory_sink_returns_bytes() {
        assert_eq!(write_all(OutputSink::Memory, b"pdf").unwrap(), Some(b"pdf".to_vec()));
    }
}
