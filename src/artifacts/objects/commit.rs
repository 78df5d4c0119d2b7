//! Commit object
//!
//! A commit is a complete snapshot of the tracked files (path to blob id, never
//! a delta) plus the ids of its parents, a timestamp and a message. The root
//! commit of every repository is identical: no parents, no files, the Unix
//! epoch as timestamp and the message `initial commit`.
//!
//! ## Format
//!
//! On disk:
//! ```text
//! commit <size>\0
//! parent <parent-sha>           (zero, one or two lines, primary parent first)
//! timestamp <unix-seconds> <timezone>
//! track <blob-sha> <path>       (one line per tracked file, sorted by path)
//!
//! <commit message>
//! ```

use crate::artifacts::objects::object::Unpackable;
use crate::artifacts::objects::object::{Object, Packable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use bytes::Bytes;
use chrono::{DateTime, FixedOffset};
use std::collections::BTreeMap;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

/// Message of the root commit created by `init`
pub const INITIAL_COMMIT_MESSAGE: &str = "initial commit";

/// Environment variable pinning the timestamp of new commits
pub const COMMIT_DATE_ENV: &str = "TWIG_COMMIT_DATE";

/// Snapshot of tracked files: path to blob id
pub type Tracking = BTreeMap<PathBuf, ObjectId>;

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Commit {
    /// Parent commit IDs (empty for the root commit, two for merge commits)
    parents: Vec<ObjectId>,
    timestamp: DateTime<FixedOffset>,
    message: String,
    tracking: Tracking,
}

impl Commit {
    pub fn new(
        parents: Vec<ObjectId>,
        timestamp: DateTime<FixedOffset>,
        message: String,
        tracking: Tracking,
    ) -> Self {
        Commit {
            parents,
            timestamp,
            message,
            tracking,
        }
    }

    /// The root commit every repository starts from
    pub fn root() -> Self {
        Commit {
            parents: Vec::new(),
            timestamp: DateTime::UNIX_EPOCH.fixed_offset(),
            message: INITIAL_COMMIT_MESSAGE.to_string(),
            tracking: Tracking::new(),
        }
    }

    /// Timestamp for a new commit
    ///
    /// Reads `TWIG_COMMIT_DATE` (RFC 2822 or `%Y-%m-%d %H:%M:%S %z`) and falls
    /// back to the local wall clock.
    pub fn timestamp_from_env() -> DateTime<FixedOffset> {
        std::env::var(COMMIT_DATE_ENV)
            .ok()
            .and_then(|date_str| {
                DateTime::parse_from_rfc2822(&date_str)
                    .or_else(|_| DateTime::parse_from_str(&date_str, "%Y-%m-%d %H:%M:%S %z"))
                    .ok()
            })
            .unwrap_or_else(|| chrono::Local::now().fixed_offset())
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn parents(&self) -> &[ObjectId] {
        &self.parents
    }

    /// Primary parent
    pub fn parent(&self) -> Option<&ObjectId> {
        self.parents.first()
    }

    /// Second parent of a merge commit
    pub fn merge_parent(&self) -> Option<&ObjectId> {
        self.parents.get(1)
    }

    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    pub fn timestamp(&self) -> DateTime<FixedOffset> {
        self.timestamp
    }

    /// Timestamp as printed by `log`, e.g. `Thu Jan 01 00:00:00 1970 +0000`
    pub fn readable_timestamp(&self) -> String {
        self.timestamp.format("%a %b %d %H:%M:%S %Y %z").to_string()
    }

    pub fn tracking(&self) -> &Tracking {
        &self.tracking
    }

    pub fn tracked_oid(&self, path: &Path) -> Option<&ObjectId> {
        self.tracking.get(path)
    }

    pub fn tracks(&self, path: &Path) -> bool {
        self.tracking.contains_key(path)
    }
}

fn path_to_line(path: &Path) -> anyhow::Result<&str> {
    let path_str = path
        .to_str()
        .with_context(|| format!("path is not valid UTF-8: {}", path.display()))?;
    if path_str.contains('\n') {
        anyhow::bail!("path contains a newline: {path_str:?}");
    }

    Ok(path_str)
}

fn parse_offset(raw: &str) -> anyhow::Result<FixedOffset> {
    let (sign, digits) = match raw.split_at_checked(1) {
        Some(("+", digits)) => (1, digits),
        Some(("-", digits)) => (-1, digits),
        _ => anyhow::bail!("Invalid timezone: {raw}"),
    };
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        anyhow::bail!("Invalid timezone: {raw}");
    }

    let hours: i32 = digits[..2].parse()?;
    let minutes: i32 = digits[2..].parse()?;

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
        .with_context(|| format!("Invalid timezone: {raw}"))
}

fn parse_timestamp(raw: &str) -> anyhow::Result<DateTime<FixedOffset>> {
    let (seconds, timezone) = raw
        .split_once(' ')
        .context("Invalid commit object: malformed timestamp")?;
    let seconds = seconds
        .parse::<i64>()
        .context("Invalid commit object: timestamp is not a number")?;
    let offset = parse_offset(timezone)?;

    let datetime = DateTime::from_timestamp(seconds, 0)
        .context("Invalid commit object: timestamp out of range")?;

    Ok(datetime.with_timezone(&offset))
}

impl Packable for Commit {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut object_content = vec![];

        for parent in &self.parents {
            object_content.push(format!("parent {}", parent.as_ref()));
        }
        object_content.push(format!(
            "timestamp {} {}",
            self.timestamp.timestamp(),
            self.timestamp.format("%z")
        ));
        for (path, oid) in &self.tracking {
            object_content.push(format!("track {} {}", oid.as_ref(), path_to_line(path)?));
        }
        object_content.push(String::new());
        object_content.push(self.message.to_string());

        let object_content = object_content.join("\n");

        let mut commit_bytes = Vec::new();
        let header = format!("{} {}\0", self.object_type().as_str(), object_content.len());
        commit_bytes.write_all(header.as_bytes())?;
        commit_bytes.write_all(object_content.as_bytes())?;

        Ok(Bytes::from(commit_bytes))
    }
}

impl Unpackable for Commit {
    fn deserialize(reader: impl BufRead) -> anyhow::Result<Self> {
        let content = reader
            .bytes()
            .collect::<Result<Vec<u8>, std::io::Error>>()?;

        let content = String::from_utf8(content)?;
        let mut lines = content.split('\n');

        let mut parents = Vec::new();
        let mut next_line = lines
            .next()
            .context("Invalid commit object: missing timestamp line")?;

        while let Some(parent_oid) = next_line.strip_prefix("parent ") {
            parents.push(ObjectId::try_parse(parent_oid.to_string())?);

            next_line = lines
                .next()
                .context("Invalid commit object: missing timestamp line")?;
        }

        let timestamp = next_line
            .strip_prefix("timestamp ")
            .context("Invalid commit object: invalid timestamp line")?;
        let timestamp = parse_timestamp(timestamp)?;

        let mut tracking = Tracking::new();
        loop {
            let line = lines
                .next()
                .context("Invalid commit object: missing message separator")?;
            if line.is_empty() {
                break;
            }

            let entry = line
                .strip_prefix("track ")
                .context("Invalid commit object: invalid track line")?;
            let (oid, path) = entry
                .split_once(' ')
                .context("Invalid commit object: malformed track line")?;
            tracking.insert(PathBuf::from(path), ObjectId::try_parse(oid.to_string())?);
        }

        let message = lines.collect::<Vec<&str>>().join("\n");
        Ok(Self::new(parents, timestamp, message, tracking))
    }
}

impl Object for Commit {
    fn object_type(&self) -> ObjectType {
        ObjectType::Commit
    }

    fn display(&self) -> String {
        let mut lines = vec![];

        for parent in &self.parents {
            lines.push(format!("parent {}", parent.as_ref()));
        }
        lines.push(format!("date {}", self.readable_timestamp()));
        for (path, oid) in &self.tracking {
            lines.push(format!("{} {}", oid.as_ref(), path.display()));
        }
        lines.push(String::new());
        lines.push(self.message.to_string());

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::objects::object_type::ObjectType;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn oid(seed: char) -> ObjectId {
        ObjectId::try_parse(seed.to_string().repeat(40)).unwrap()
    }

    fn read_back(commit: &Commit) -> Commit {
        let bytes = commit.serialize().unwrap();
        let mut reader = Cursor::new(bytes.to_vec());
        assert_eq!(
            ObjectType::parse_object_type(&mut reader).unwrap(),
            ObjectType::Commit
        );
        Commit::deserialize(reader).unwrap()
    }

    #[test]
    fn root_commit_is_deterministic() {
        let first = Commit::root();
        let second = Commit::root();

        assert!(first.parents().is_empty());
        assert_eq!(first.message(), INITIAL_COMMIT_MESSAGE);
        assert_eq!(first.timestamp().timestamp(), 0);
        assert_eq!(first.object_id().unwrap(), second.object_id().unwrap());
        assert_eq!(first.readable_timestamp(), "Thu Jan 01 00:00:00 1970 +0000");
    }

    #[test]
    fn merge_commit_keeps_parent_order_and_snapshot() {
        let timestamp = DateTime::parse_from_str("2024-03-05 10:11:12 +0200", "%Y-%m-%d %H:%M:%S %z")
            .unwrap();
        let tracking = Tracking::from([
            (PathBuf::from("a.txt"), oid('a')),
            (PathBuf::from("dir/with space.txt"), oid('b')),
        ]);
        let commit = Commit::new(
            vec![oid('c'), oid('d')],
            timestamp,
            "Merged other into master.\n\nsecond paragraph".to_string(),
            tracking,
        );

        let parsed = read_back(&commit);

        assert_eq!(parsed, commit);
        assert_eq!(parsed.parent(), Some(&oid('c')));
        assert_eq!(parsed.merge_parent(), Some(&oid('d')));
        assert!(parsed.is_merge());
        assert_eq!(parsed.timestamp().offset().local_minus_utc(), 7200);
    }

    #[test]
    fn id_depends_on_every_field() {
        let base = Commit::root();
        let other_message = Commit::new(
            vec![],
            base.timestamp(),
            "different".to_string(),
            Tracking::new(),
        );

        assert_ne!(base.object_id().unwrap(), other_message.object_id().unwrap());
    }

    #[test]
    fn negative_timezones_are_parsed() {
        let offset = parse_offset("-0530").unwrap();
        assert_eq!(offset.local_minus_utc(), -(5 * 3600 + 30 * 60));
        assert!(parse_offset("0530").is_err());
    }
}
