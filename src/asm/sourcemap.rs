//! Source map: address → (file, line) lookup plus exported labels, and the
//! binary (`.bin`)/textual (`.map`) file formats that carry them.

use super::error::{AsmError, ErrorKind};
use std::io::{self, Read, Write};

const GO65_SIGNATURE: &[u8; 4] = b"go65";
const SM65_SIGNATURE: &[u8; 4] = b"sm65";
const SM65_VERSION_MAJOR: u8 = 1;
const SM65_VERSION_MINOR: u8 = 0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceMap {
    pub origin: u16,
    pub size: u32,
    pub crc: u32,
    pub files: Vec<String>,
    /// Ascending by address.
    pub lines: Vec<(u16, usize, usize)>,
    /// Ascending by address.
    pub exports: Vec<(String, u16)>,
}

impl SourceMap {
    pub fn new(origin: u16) -> SourceMap {
        SourceMap {
            origin,
            size: 0,
            crc: 0,
            files: Vec::new(),
            lines: Vec::new(),
            exports: Vec::new(),
        }
    }

    pub fn from_code(origin: u16, code: &[u8], files: Vec<String>) -> SourceMap {
        SourceMap {
            origin,
            size: code.len() as u32,
            crc: crc32fast::hash(code),
            files,
            lines: Vec::new(),
            exports: Vec::new(),
        }
    }

    pub fn add_line(&mut self, address: u16, file_index: usize, line: usize) {
        self.lines.push((address, file_index, line));
    }

    pub fn add_export(&mut self, label: String, address: u16) {
        self.exports.push((label, address));
    }

    pub fn finalize(&mut self) {
        self.lines.sort_by_key(|(addr, _, _)| *addr);
        self.exports.sort_by_key(|(_, addr)| *addr);
    }

    /// Binary search for an exact address match; returns the owning file's
    /// name and line number, or `None` if no entry was recorded at that
    /// exact address.
    pub fn find(&self, address: u16) -> Option<(&str, usize)> {
        self.lines
            .binary_search_by_key(&address, |(addr, _, _)| *addr)
            .ok()
            .map(|idx| {
                let (_, file_index, line) = self.lines[idx];
                (self.files[file_index].as_str(), line)
            })
    }

    /// Folds another source map's files/lines/exports into this one,
    /// remapping file indices and keeping both lists address-sorted.
    pub fn merge(&mut self, other: &SourceMap) {
        let offset = self.files.len();
        self.files.extend(other.files.iter().cloned());
        self.lines.extend(
            other
                .lines
                .iter()
                .map(|(addr, file_index, line)| (*addr, file_index + offset, *line)),
        );
        self.exports.extend(other.exports.iter().cloned());
        self.finalize();
    }

    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(SM65_SIGNATURE)?;
        w.write_all(&[SM65_VERSION_MAJOR, SM65_VERSION_MINOR])?;
        w.write_all(&self.origin.to_le_bytes())?;
        w.write_all(&self.size.to_le_bytes())?;
        w.write_all(&self.crc.to_le_bytes())?;

        w.write_all(&(self.files.len() as u32).to_le_bytes())?;
        for file in &self.files {
            write_string(w, file)?;
        }

        w.write_all(&(self.lines.len() as u32).to_le_bytes())?;
        for (addr, file_index, line) in &self.lines {
            w.write_all(&addr.to_le_bytes())?;
            w.write_all(&(*file_index as u32).to_le_bytes())?;
            w.write_all(&(*line as u32).to_le_bytes())?;
        }

        w.write_all(&(self.exports.len() as u32).to_le_bytes())?;
        for (label, addr) in &self.exports {
            write_string(w, label)?;
            w.write_all(&addr.to_le_bytes())?;
        }
        Ok(())
    }

    pub fn read_from<R: Read>(r: &mut R) -> Result<(usize, SourceMap), AsmError> {
        let io_err = |e: io::Error| {
            AsmError::new("<map>", 0, 0, "", ErrorKind::IoFailure(e.to_string()))
        };
        let mut bytes_read = 0usize;

        let mut signature = [0u8; 4];
        r.read_exact(&mut signature).map_err(io_err)?;
        bytes_read += 4;
        if &signature != SM65_SIGNATURE {
            return Err(AsmError::new(
                "<map>",
                0,
                0,
                "",
                ErrorKind::IoFailure("bad source map signature".to_string()),
            ));
        }

        let mut version = [0u8; 2];
        r.read_exact(&mut version).map_err(io_err)?;
        bytes_read += 2;

        let origin = read_u16(r, &mut bytes_read).map_err(io_err)?;
        let size = read_u32(r, &mut bytes_read).map_err(io_err)?;
        let crc = read_u32(r, &mut bytes_read).map_err(io_err)?;

        let file_count = read_u32(r, &mut bytes_read).map_err(io_err)?;
        let mut files = Vec::with_capacity(file_count as usize);
        for _ in 0..file_count {
            files.push(read_string(r, &mut bytes_read).map_err(io_err)?);
        }

        let line_count = read_u32(r, &mut bytes_read).map_err(io_err)?;
        let mut lines = Vec::with_capacity(line_count as usize);
        for _ in 0..line_count {
            let addr = read_u16(r, &mut bytes_read).map_err(io_err)?;
            let file_index = read_u32(r, &mut bytes_read).map_err(io_err)? as usize;
            let line = read_u32(r, &mut bytes_read).map_err(io_err)? as usize;
            lines.push((addr, file_index, line));
        }

        let export_count = read_u32(r, &mut bytes_read).map_err(io_err)?;
        let mut exports = Vec::with_capacity(export_count as usize);
        for _ in 0..export_count {
            let label = read_string(r, &mut bytes_read).map_err(io_err)?;
            let addr = read_u16(r, &mut bytes_read).map_err(io_err)?;
            exports.push((label, addr));
        }

        Ok((
            bytes_read,
            SourceMap {
                origin,
                size,
                crc,
                files,
                lines,
                exports,
            },
        ))
    }
}

fn write_string<W: Write>(w: &mut W, s: &str) -> io::Result<()> {
    w.write_all(&(s.len() as u16).to_le_bytes())?;
    w.write_all(s.as_bytes())
}

fn read_string<R: Read>(r: &mut R, bytes_read: &mut usize) -> io::Result<String> {
    let len = read_u16(r, bytes_read)? as usize;
    let mut buf = vec![0u8; len];
    r.read_exact(&mut buf)?;
    *bytes_read += len;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn read_u16<R: Read>(r: &mut R, bytes_read: &mut usize) -> io::Result<u16> {
    let mut buf = [0u8; 2];
    r.read_exact(&mut buf)?;
    *bytes_read += 2;
    Ok(u16::from_le_bytes(buf))
}

fn read_u32<R: Read>(r: &mut R, bytes_read: &mut usize) -> io::Result<u32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    *bytes_read += 4;
    Ok(u32::from_le_bytes(buf))
}

/// Writes the legacy `.bin` layout: an optional 6-byte `"go65"` + LE origin
/// header, followed by the raw code bytes.
pub fn write_binary<W: Write>(w: &mut W, origin: u16, code: &[u8], with_header: bool) -> io::Result<()> {
    if with_header {
        w.write_all(GO65_SIGNATURE)?;
        w.write_all(&origin.to_le_bytes())?;
    }
    w.write_all(code)
}

/// Reads a `.bin` file, accepting either the headered or the headerless
/// form. Returns the origin (if a header was present) and the code bytes.
pub fn read_binary(bytes: &[u8]) -> (Option<u16>, &[u8]) {
    if bytes.len() >= 6 && &bytes[0..4] == GO65_SIGNATURE {
        let origin = u16::from_le_bytes([bytes[4], bytes[5]]);
        (Some(origin), &bytes[6..])
    } else {
        (None, bytes)
    }
}
