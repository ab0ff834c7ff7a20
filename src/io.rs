//! JSON Lines frame exchange.
//!
//! Input carries one [`Frame`] per line; output carries one
//! [`FrameReport`] per line. A `-` path selects stdin or stdout.

use crate::error::Result;
use crate::frame::Frame;
use crate::pipeline::{FrameReport, FrameSink, FrameSource};
use log::warn;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};

/// Reads frames from JSON Lines text
pub struct JsonLinesSource<R> {
    reader: R,
    line: String,
    line_number: u64,
    skipped: u64,
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
            line_number: 0,
            skipped: 0,
        }
    }

    /// Lines that were not valid frames
    #[must_use]
    pub fn skipped(&self) -> u64 {
        self.skipped
    }
}

impl<R: BufRead> FrameSource for JsonLinesSource<R> {
    /// Blank lines are ignored; malformed lines are logged and skipped
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        loop {
            self.line.clear();
            if self.reader.read_line(&mut self.line)? == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            let text = self.line.trim();
            if text.is_empty() {
                continue;
            }
            match serde_json::from_str::<Frame>(text) {
                Ok(frame) => return Ok(Some(frame)),
                Err(e) => {
                    warn!("Skipping malformed frame on line {}: {}", self.line_number, e);
                    self.skipped += 1;
                }
            }
        }
    }
}

/// Writes frame reports as JSON Lines
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> FrameSink for JsonLinesSink<W> {
    fn write_report(&mut self, report: &FrameReport) -> Result<()> {
        serde_json::to_writer(&mut self.writer, report)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Open a frame source from a path, `-` meaning stdin
///
/// # Errors
///
/// Returns an error if the file cannot be opened
pub fn open_source(path: &str) -> Result<JsonLinesSource<Box<dyn BufRead>>> {
    let reader: Box<dyn BufRead> = if path == "-" {
        Box::new(io::stdin().lock())
    } else {
        Box::new(BufReader::new(File::open(path)?))
    };
    Ok(JsonLinesSource::new(reader))
}

/// Open a report sink at a path, `-` meaning stdout
///
/// # Errors
///
/// Returns an error if the file cannot be created
pub fn open_sink(path: &str) -> Result<JsonLinesSink<Box<dyn Write>>> {
    let writer: Box<dyn Write> = if path == "-" {
        Box::new(BufWriter::new(io::stdout().lock()))
    } else {
        Box::new(BufWriter::new(File::create(path)?))
    };
    Ok(JsonLinesSink::new(writer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::pipeline::PosturePipeline;
    use std::io::Cursor;

    const INPUT: &str = r#"{"index":0,"timestamp":0.0,"detections":[{"tracking_id":3,"bounding_box":{"x1":0,"y1":0,"x2":50,"y2":100},"confidence":0.9}]}

not json
{"index":1,"timestamp":0.04,"detections":[]}
"#;

    #[test]
    fn test_source_skips_blank_and_malformed_lines() {
        let mut source = JsonLinesSource::new(Cursor::new(INPUT));

        let first = source.next_frame().unwrap().unwrap();
        assert_eq!(first.index, 0);
        assert_eq!(first.detections()[0].tracking_id, 3);
        assert!(first.detections()[0].keypoints.is_empty());

        let second = source.next_frame().unwrap().unwrap();
        assert_eq!(second.index, 1);
        assert!(second.is_empty());

        assert!(source.next_frame().unwrap().is_none());
        assert_eq!(source.skipped(), 1);
    }

    #[test]
    fn test_sink_writes_one_line_per_report() {
        let mut pipeline = PosturePipeline::new(Config::default()).unwrap();
        let mut source = JsonLinesSource::new(Cursor::new(INPUT));
        let mut sink = JsonLinesSink::new(Vec::new());

        pipeline.run(&mut source, &mut sink).unwrap();

        let output = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        let report: FrameReport = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(report.annotations.summary.active_tracks, 1);
        assert!(!report.annotations.annotations[&3].any());
    }
}
