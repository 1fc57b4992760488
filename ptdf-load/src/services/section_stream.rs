//! Section-aware reader for the data files
//!
//! Opens a (usually gzip compressed) data file, skips its preamble up to
//! the start markers and yields latin-1 decoded lines until the stop
//! marker. Lines are yielded without their line terminator.
//!
//! Free text files are further grouped into sections keyed by a header
//! line, see [`HashSections`] and [`TaggedSections`].

use crate::error::{LoadError, LoadResult};
use crate::sources::SourceSpec;
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Header prefixes of tagged sections
const SECTION_TAGS: &[&str] = &["MV: ", "NM: ", "OT: ", "MOVI"];

/// Lines of one data file between its start and stop markers
pub struct LineStream {
    reader: Box<dyn BufRead + Send>,
    path: PathBuf,
    stop: Option<&'static str>,
    buf: Vec<u8>,
    finished: bool,
    lines_read: u64,
}

impl LineStream {
    /// Open `spec.file` under `data_dir` and position it on the first data line
    ///
    /// A missing `.gz` file falls back to the uncompressed file of the same
    /// name. When neither exists the result is [`LoadError::MissingSource`].
    pub fn open(data_dir: &Path, spec: &SourceSpec) -> LoadResult<Self> {
        let path = data_dir.join(spec.file);
        let reader: Box<dyn BufRead + Send> = if path.is_file() {
            let file = File::open(&path)?;
            if spec.file.ends_with(".gz") {
                Box::new(BufReader::new(MultiGzDecoder::new(file)))
            } else {
                Box::new(BufReader::new(file))
            }
        } else {
            let plain = data_dir.join(spec.file.trim_end_matches(".gz"));
            if plain != path && plain.is_file() {
                debug!(file = %plain.display(), "Reading uncompressed data file");
                Box::new(BufReader::new(File::open(&plain)?))
            } else {
                return Err(LoadError::MissingSource(path));
            }
        };

        let mut stream = Self::from_reader(reader, path, spec.stop);
        stream.skip_preamble(spec.start)?;
        Ok(stream)
    }

    /// Stream over an already opened reader; no preamble is skipped
    pub fn from_reader(
        reader: Box<dyn BufRead + Send>,
        path: PathBuf,
        stop: Option<&'static str>,
    ) -> Self {
        Self {
            reader,
            path,
            stop,
            buf: Vec::with_capacity(256),
            finished: false,
            lines_read: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw lines consumed so far, preamble included
    pub fn lines_read(&self) -> u64 {
        self.lines_read
    }

    /// Consume lines until each start marker has matched, in order
    pub fn skip_preamble(&mut self, start: &[&str]) -> io::Result<()> {
        for marker in start {
            loop {
                match self.read_raw()? {
                    Some(line) if line.starts_with(marker) => break,
                    Some(_) => continue,
                    None => {
                        warn!(
                            file = %self.path.display(),
                            marker = %marker,
                            "Start marker not found, file has no data"
                        );
                        self.finished = true;
                        return Ok(());
                    }
                }
            }
        }
        Ok(())
    }

    pub fn hash_sections(self) -> HashSections {
        HashSections {
            inner: SectionGrouper::new(self),
        }
    }

    pub fn tagged_sections(self) -> TaggedSections {
        TaggedSections {
            inner: SectionGrouper::new(self),
        }
    }

    /// Next raw line, terminator included
    fn read_raw(&mut self) -> io::Result<Option<String>> {
        self.buf.clear();
        let read = self.reader.read_until(b'\n', &mut self.buf)?;
        if read == 0 {
            return Ok(None);
        }
        self.lines_read += 1;
        Ok(Some(decode_latin1(&self.buf)))
    }
}

impl Iterator for LineStream {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.read_raw() {
            Ok(Some(raw)) => {
                // Stop markers may match the terminator itself (blank line)
                if self.stop.is_some_and(|stop| raw.starts_with(stop)) {
                    self.finished = true;
                    return None;
                }
                Some(Ok(strip_terminator(raw)))
            }
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

/// Every byte is one latin-1 code point
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

fn strip_terminator(mut line: String) -> String {
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    line
}

/// Lines grouped under the header line that precedes them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Header text after the header prefix, untrimmed
    pub label: String,
    pub lines: Vec<String>,
}

/// Shared grouping of body lines under header lines
struct SectionGrouper {
    lines: LineStream,
    label: Option<String>,
    body: Vec<String>,
    done: bool,
}

impl SectionGrouper {
    fn new(lines: LineStream) -> Self {
        Self {
            lines,
            label: None,
            body: Vec::new(),
            done: false,
        }
    }

    /// Next complete section
    ///
    /// `header` returns the label of a header line. `keep` decides whether a
    /// body line belongs to the section. Lines before the first header are
    /// dropped, and sections with an empty body are never yielded.
    fn next_section(
        &mut self,
        header: impl Fn(&str) -> Option<String>,
        keep: impl Fn(&str) -> bool,
    ) -> Option<io::Result<Section>> {
        if self.done {
            return None;
        }

        loop {
            match self.lines.next() {
                Some(Ok(line)) => {
                    if let Some(label) = header(&line) {
                        let finished = self.take_section();
                        self.label = Some(label);
                        if finished.is_some() {
                            return finished.map(Ok);
                        }
                    } else if self.label.is_some() && keep(&line) {
                        self.body.push(line);
                    }
                }
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e));
                }
                None => {
                    self.done = true;
                    return self.take_section().map(Ok);
                }
            }
        }
    }

    fn take_section(&mut self) -> Option<Section> {
        let label = self.label.take();
        let lines = std::mem::take(&mut self.body);
        match label {
            Some(label) if !lines.is_empty() && !label.trim().is_empty() => {
                Some(Section { label, lines })
            }
            _ => None,
        }
    }
}

/// Sections introduced by `# Title` lines
pub struct HashSections {
    inner: SectionGrouper,
}

impl HashSections {
    pub fn path(&self) -> &Path {
        self.inner.lines.path()
    }
}

impl Iterator for HashSections {
    type Item = io::Result<Section>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next_section(
            |line| line.strip_prefix('#').map(|_| line.get(2..).unwrap_or("").to_string()),
            |_| true,
        )
    }
}

/// Sections introduced by `MV: `, `NM: `, `OT: ` or `MOVI` lines
///
/// Body lines starting with `-` are separators and are dropped.
pub struct TaggedSections {
    inner: SectionGrouper,
}

impl TaggedSections {
    pub fn path(&self) -> &Path {
        self.inner.lines.path()
    }
}

impl Iterator for TaggedSections {
    type Item = io::Result<Section>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next_section(tagged_label, |line| !line.starts_with('-'))
    }
}

fn tagged_label(line: &str) -> Option<String> {
    let tag = SECTION_TAGS.iter().find(|tag| line.starts_with(*tag))?;
    let skip = if *tag == "MOVI" { 6 } else { 4 };
    Some(line.get(skip..).unwrap_or("").to_string())
}
