//! Journal Reader
//!
//! Handles reading entries from the journal file.

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

use crate::error::{Result, ShelfError};

use super::entry::{FrameHeader, HEADER_SIZE};
use super::JournalEntry;

/// Reads entries from the journal file
pub struct JournalReader {
    reader: BufReader<File>,
    /// Offset just past the last complete frame
    position: u64,
}

impl JournalReader {
    /// Open a journal file for reading
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self {
            reader: BufReader::new(file),
            position: 0,
        })
    }

    /// Read the next entry.
    ///
    /// Returns `Ok(None)` at a clean end of file. A partial frame or a
    /// checksum failure is reported as `Corruption`.
    pub fn next_entry(&mut self) -> Result<Option<JournalEntry>> {
        let mut header = [0u8; HEADER_SIZE];
        let read = read_full(&mut self.reader, &mut header)?;
        if read == 0 {
            return Ok(None);
        }
        if read < HEADER_SIZE {
            return Err(ShelfError::Corruption(format!(
                "partial journal header at offset {}: {} of {} bytes",
                self.position, read, HEADER_SIZE
            )));
        }

        let frame = FrameHeader::parse(&header);
        // Grow with the data actually present; a damaged length must not
        // turn into a huge allocation.
        let mut payload = Vec::new();
        let read = (&mut self.reader)
            .take(frame.len as u64)
            .read_to_end(&mut payload)?;
        if read < frame.len {
            return Err(ShelfError::Corruption(format!(
                "partial journal payload at offset {}: {} of {} bytes",
                self.position, read, frame.len
            )));
        }

        let entry = JournalEntry::from_parts(&frame, &payload)?;
        self.position += (HEADER_SIZE + frame.len) as u64;
        Ok(Some(entry))
    }

    /// Offset just past the last complete frame read so far
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Iterate over all entries, stopping after the first error
    pub fn entries(self) -> JournalIterator {
        JournalIterator {
            reader: self,
            done: false,
        }
    }
}

/// Iterator over journal entries
pub struct JournalIterator {
    reader: JournalReader,
    done: bool,
}

impl Iterator for JournalIterator {
    type Item = Result<JournalEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.next_entry() {
            Ok(Some(entry)) => Some(Ok(entry)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Fill `buf` as far as the input allows, returning the bytes read
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}
