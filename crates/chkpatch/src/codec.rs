//! Reading executables into memory and writing them back out.
//!
//! Output files are written to a temporary file in the destination directory
//! and then renamed over the destination, so a failed write never leaves a
//! truncated executable behind.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::bytes::ByteSequence;
use crate::error::{Error, Result};
use crate::signature::format_hex;

/// Bytes per line in hex exports.
pub const DEFAULT_CHUNK_SIZE: usize = 16;

/// Read the whole file at `path`.
pub fn decode<P: AsRef<Path>>(path: P) -> Result<ByteSequence> {
    let path = path.as_ref();
    info!("Loading {}", path.display());

    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::FileNotFound(path.to_path_buf()),
        _ => Error::Io(e),
    })?;

    let sequence = decode_reader(BufReader::new(file))?;
    info!("Read {} bytes", sequence.len());
    Ok(sequence)
}

/// Read an arbitrary stream to its end.
pub fn decode_reader<R: Read>(mut reader: R) -> Result<ByteSequence> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    ByteSequence::load(bytes)
}

/// Write `sequence` to `path`, creating parent directories as needed.
pub fn encode<P: AsRef<Path>>(sequence: &ByteSequence, path: P) -> Result<()> {
    let path = path.as_ref();
    let dir = ensure_parent_dir(path)?;

    let mut temp = NamedTempFile::new_in(dir)?;
    encode_writer(sequence, &mut temp)?;
    temp.as_file().sync_all()?;
    temp.persist(path)?;

    info!("Wrote {} bytes to {}", sequence.len(), path.display());
    Ok(())
}

/// Write `sequence` verbatim to an arbitrary sink.
pub fn encode_writer<W: Write>(sequence: &ByteSequence, mut writer: W) -> Result<()> {
    writer.write_all(sequence.as_slice())?;
    writer.flush()?;
    Ok(())
}

/// Lines of a hex export, one per `chunk_size` bytes.
pub fn hex_lines(sequence: &ByteSequence, chunk_size: usize) -> impl Iterator<Item = String> + '_ {
    sequence.chunks(chunk_size).map(format_hex)
}

/// Write a human-readable hex dump of `sequence` to `path`.
pub fn write_hex_dump<P: AsRef<Path>>(
    sequence: &ByteSequence,
    path: P,
    chunk_size: usize,
) -> Result<()> {
    let path = path.as_ref();
    ensure_parent_dir(path)?;

    let mut writer = BufWriter::new(File::create(path)?);
    for line in hex_lines(sequence, chunk_size) {
        writeln!(writer, "{}", line)?;
    }
    writer.flush()?;

    debug!("Wrote hex dump to {}", path.display());
    Ok(())
}

fn ensure_parent_dir(path: &Path) -> Result<&Path> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            fs::create_dir_all(dir)?;
            Ok(dir)
        }
        _ => Ok(Path::new(".")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_decode_missing_file() {
        let dir = tempdir().unwrap();
        let err = decode(dir.path().join("missing.exe")).unwrap_err();
        assert!(matches!(err, Error::FileNotFound(_)));
        assert!(err.is_not_found());
    }

    #[test]
    fn test_decode_directory_is_io_error() {
        let dir = tempdir().unwrap();
        let err = decode(dir.path()).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_decode_empty_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.exe");
        fs::write(&path, b"").unwrap();
        assert!(matches!(decode(&path), Err(Error::EmptyInput)));
    }

    #[test]
    fn test_decode_encode_roundtrip() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("game.exe");
        let bytes: Vec<u8> = (0..10_000u32).map(|i| (i * 7 % 256) as u8).collect();
        fs::write(&source, &bytes).unwrap();

        let seq = decode(&source).unwrap();
        let dest = dir.path().join("out").join("nested").join("copy.exe");
        encode(&seq, &dest).unwrap();

        assert_eq!(fs::read(&dest).unwrap(), bytes);
    }

    #[test]
    fn test_encode_overwrites_existing() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("copy.exe");
        fs::write(&dest, b"old contents that are longer").unwrap();

        let seq = ByteSequence::load(vec![1, 2, 3]).unwrap();
        encode(&seq, &dest).unwrap();
        assert_eq!(fs::read(&dest).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_encode_writer() {
        let seq = ByteSequence::load(vec![0x4D, 0x5A, 0x90]).unwrap();
        let mut out = Vec::new();
        encode_writer(&seq, &mut out).unwrap();
        assert_eq!(out, vec![0x4D, 0x5A, 0x90]);
    }

    #[test]
    fn test_decode_reader() {
        let seq = decode_reader(&b"MZ\x90\x00"[..]).unwrap();
        assert_eq!(seq.as_slice(), b"MZ\x90\x00");
        assert!(matches!(decode_reader(&b""[..]), Err(Error::EmptyInput)));
    }

    #[test]
    fn test_hex_dump_format() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dump").join("game.txt");
        let mut bytes = vec![
            0xDE, 0xAD, 0xBE, 0xEF, 0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99,
            0xAA, 0xBB,
        ];
        bytes.extend([0x01, 0x02]);
        let seq = ByteSequence::load(bytes).unwrap();

        write_hex_dump(&seq, &path, DEFAULT_CHUNK_SIZE).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "DE AD BE EF 00 11 22 33 44 55 66 77 88 99 AA BB\n01 02\n"
        );
    }

    #[test]
    fn test_hex_lines_chunk_size() {
        let seq = ByteSequence::load(vec![0x0a; 5]).unwrap();
        let lines: Vec<_> = hex_lines(&seq, 2).collect();
        assert_eq!(lines, vec!["0A 0A", "0A 0A", "0A"]);
    }
}
