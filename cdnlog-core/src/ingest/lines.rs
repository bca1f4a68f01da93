use flate2::read::MultiGzDecoder;
use std::io::{BufRead, BufReader, Read};

/// A lazy stream of raw text lines.
pub type LineStream = Box<dyn Iterator<Item = String>>;

/// Wrap `reader` in a buffered reader, gunzipping when `compressed` is set.
///
/// Multi-member gzip files (concatenated archives) are read to the end.
pub fn decoded<R: Read + 'static>(reader: R, compressed: bool) -> Box<dyn BufRead> {
    if compressed {
        Box::new(BufReader::new(MultiGzDecoder::new(reader)))
    } else {
        Box::new(BufReader::new(reader))
    }
}

/// Line iterator over any buffered reader.
///
/// Invalid UTF-8 is replaced rather than rejected. A read or decode error ends
/// this source's sequence after logging it; the caller moves on to the next source.
pub struct Lines<R> {
    reader: R,
    origin: String,
    buf: Vec<u8>,
    done: bool,
}

impl<R: BufRead> Lines<R> {
    pub fn new(reader: R, origin: impl Into<String>) -> Self {
        Self {
            reader,
            origin: origin.into(),
            buf: Vec::with_capacity(512),
            done: false,
        }
    }
}

impl<R: BufRead> Iterator for Lines<R> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.done {
            return None;
        }

        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => {
                self.done = true;
                None
            }
            Ok(_) => {
                while matches!(self.buf.last(), Some(b'\n' | b'\r')) {
                    self.buf.pop();
                }
                Some(String::from_utf8_lossy(&self.buf).into_owned())
            }
            Err(e) => {
                tracing::error!(source = %self.origin, error = %e, "error while reading log data, skipping rest of source");
                self.done = true;
                None
            }
        }
    }
}
