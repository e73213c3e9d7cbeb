//! Append-only decision journal in JSON Lines.
//!
//! Every committed decision becomes one line:
//!
//! ```json
//! {"seq":4,"recorded_at":"2026-01-02T03:04:05.678Z","event":"relationship_formed","detail":{"kind":"collar"}}
//! ```
//!
//! `seq` keeps counting across restarts (it resumes after the last line
//! already in the file), so a gap in the sequence means lost entries.

use chrono::{DateTime, SecondsFormat, Utc};
use denkeeper_application::ports::audit_log::{AuditEntry, AuditLog};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

#[derive(Serialize)]
struct Line<'a> {
    seq: u64,
    recorded_at: String,
    event: &'a str,
    detail: &'a serde_json::Value,
}

struct Journal {
    writer: BufWriter<File>,
    next_seq: u64,
}

impl Journal {
    fn append(&mut self, entry: &AuditEntry, at: DateTime<Utc>) -> io::Result<u64> {
        let seq = self.next_seq;
        let line = Line {
            seq,
            recorded_at: at.to_rfc3339_opts(SecondsFormat::Millis, true),
            event: entry.event_type,
            detail: &entry.payload,
        };
        serde_json::to_writer(&mut self.writer, &line)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        // Only a line that reached the file consumes its number.
        self.next_seq += 1;
        Ok(seq)
    }
}

/// [`AuditLog`] adapter that appends to a JSONL file.
pub struct JsonlAuditLog {
    journal: Mutex<Journal>,
    path: PathBuf,
}

impl JsonlAuditLog {
    /// Open the journal at `path`, creating it and its directories.
    ///
    /// Returns `None`, after a warning, when the file is unusable.
    pub fn open(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();
        match Self::try_open(path) {
            Ok(log) => Some(log),
            Err(e) => {
                warn!("Audit journal {} unavailable: {}", path.display(), e);
                None
            }
        }
    }

    fn try_open(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(path)?;

        let existing = BufReader::new(file.try_clone()?)
            .lines()
            .map_while(Result::ok)
            .filter(|line| !line.trim().is_empty())
            .count() as u64;
        debug!(
            "Audit journal {} opened with {} prior entries",
            path.display(),
            existing
        );

        Ok(Self {
            journal: Mutex::new(Journal {
                writer: BufWriter::new(file),
                next_seq: existing + 1,
            }),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AuditLog for JsonlAuditLog {
    fn record(&self, entry: AuditEntry) {
        let mut journal = self.journal.lock().unwrap_or_else(|e| e.into_inner());
        match journal.append(&entry, Utc::now()) {
            Ok(seq) => debug!("Audit #{} {}", seq, entry.event_type),
            Err(e) => warn!("Audit entry {} not written: {}", entry.event_type, e),
        }
    }
}

impl Drop for JsonlAuditLog {
    fn drop(&mut self) {
        let journal = self.journal.get_mut().unwrap_or_else(|e| e.into_inner());
        if let Err(e) = journal.writer.flush() {
            warn!("Audit journal {} not flushed: {}", self.path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn lines(path: &Path) -> Vec<Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_entries_are_enveloped_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit").join("decisions.jsonl");
        let log = JsonlAuditLog::open(&path).unwrap();

        log.record(AuditEntry::new(
            "relationship_formed",
            json!({ "kind": "collar", "party_a": 1, "party_b": 2 }),
        ));
        log.record(AuditEntry::new("note", json!("manual grant")));
        drop(log);

        let records = lines(&path);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["seq"], 1);
        assert_eq!(records[0]["event"], "relationship_formed");
        assert_eq!(records[0]["detail"]["party_b"], 2);
        assert!(records[0]["recorded_at"].as_str().unwrap().ends_with('Z'));
        assert_eq!(records[1]["seq"], 2);
        assert_eq!(records[1]["detail"], "manual grant");
    }

    #[test]
    fn test_payload_cannot_shadow_envelope() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("decisions.jsonl");
        let log = JsonlAuditLog::open(&path).unwrap();

        log.record(AuditEntry::new(
            "submission_decided",
            json!({ "event": "forged", "seq": 99 }),
        ));
        drop(log);

        let records = lines(&path);
        assert_eq!(records[0]["event"], "submission_decided");
        assert_eq!(records[0]["seq"], 1);
        assert_eq!(records[0]["detail"]["event"], "forged");
    }

    #[test]
    fn test_reopening_appends_and_continues_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("decisions.jsonl");

        for run in 0..3 {
            let log = JsonlAuditLog::open(&path).unwrap();
            log.record(AuditEntry::new("level_roles_synced", json!({ "run": run })));
        }

        let records = lines(&path);
        let seqs: Vec<_> = records.iter().map(|r| r["seq"].as_u64().unwrap()).collect();
        assert_eq!(seqs, vec![1, 2, 3]);
        assert_eq!(records[2]["detail"]["run"], 2);
    }

    #[test]
    fn test_unusable_path_is_none() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be opened as the journal file.
        assert!(JsonlAuditLog::open(dir.path()).is_none());
    }
}
