//! Session recordings.
//!
//! A recording is JSONL: one [`RecordedFrame`] per inbound server frame, in
//! arrival order, stamped with an RFC3339 UTC time. The frame text is kept
//! verbatim so a replay decodes exactly what the live session saw.

use crate::io_utils::{ensure_parent_dir, is_compressed, read_text_auto};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedFrame {
    pub ts: String,
    pub frame: String,
}

pub struct FrameRecorder {
    writer: Box<dyn Write>,
    frames: usize,
}

impl FrameRecorder {
    /// Creates (or truncates) a recording; `.zst` paths are compressed.
    pub fn create(path: &str) -> Result<Self, String> {
        ensure_parent_dir(Path::new(path))?;
        let file = File::create(path).map_err(|e| format!("{}: {}", path, e))?;
        let writer: Box<dyn Write> = if is_compressed(path) {
            let encoder = zstd::stream::write::Encoder::new(file, 0)
                .map_err(|e| format!("{}: {}", path, e))?;
            Box::new(BufWriter::new(encoder.auto_finish()))
        } else {
            Box::new(BufWriter::new(file))
        };
        Ok(Self { writer, frames: 0 })
    }

    pub fn record(&mut self, frame: &str) -> std::io::Result<()> {
        let entry = RecordedFrame {
            ts: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            frame: frame.to_string(),
        };
        let line = serde_json::to_string(&entry).map_err(std::io::Error::other)?;
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.frames += 1;
        Ok(())
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

impl Drop for FrameRecorder {
    fn drop(&mut self) {
        if let Err(e) = self.writer.flush() {
            tracing::warn!(error = %e, "failed to flush recording");
        }
    }
}

/// A recording line that could not be read back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadLine {
    pub line: usize,
    pub message: String,
}

/// Reads a recording, returning good frames and the lines that failed to parse.
pub fn read_recording(path: &str) -> Result<(Vec<RecordedFrame>, Vec<BadLine>), String> {
    let content = read_text_auto(path)?;
    let mut frames = Vec::new();
    let mut bad = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<RecordedFrame>(line) {
            Ok(frame) => frames.push(frame),
            Err(e) => bad.push(BadLine {
                line: idx + 1,
                message: e.to_string(),
            }),
        }
    }
    Ok((frames, bad))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONNECT: &str = r#"{"event":"connect","data":{"socketId":"me"}}"#;

    #[test]
    fn plain_recording_round_trip_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.jsonl");
        let path = path.to_str().unwrap();

        {
            let mut rec = FrameRecorder::create(path).unwrap();
            rec.record(CONNECT).unwrap();
            rec.record("not even json").unwrap();
            assert_eq!(rec.frames(), 2);
        }

        let (frames, bad) = read_recording(path).unwrap();
        assert!(bad.is_empty());
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].frame, CONNECT);
        assert_eq!(frames[1].frame, "not even json");
        assert!(chrono::DateTime::parse_from_rfc3339(&frames[0].ts).is_ok());
    }

    #[test]
    fn compressed_recording_is_readable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.jsonl.zst");
        let path = path.to_str().unwrap();

        {
            let mut rec = FrameRecorder::create(path).unwrap();
            rec.record(CONNECT).unwrap();
        }

        let raw = std::fs::read(path).unwrap();
        assert!(!raw.starts_with(b"{"));
        let (frames, _) = read_recording(path).unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].frame, CONNECT);
    }

    #[test]
    fn bad_lines_are_reported_with_their_number() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.jsonl");
        let line = serde_json::to_string(&RecordedFrame {
            ts: "2026-01-01T00:00:00Z".into(),
            frame: CONNECT.into(),
        })
        .unwrap();
        std::fs::write(&path, format!("{}\n\n{{oops\n", line)).unwrap();

        let (frames, bad) = read_recording(path.to_str().unwrap()).unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(bad.len(), 1);
        assert_eq!(bad[0].line, 3);
    }
}
