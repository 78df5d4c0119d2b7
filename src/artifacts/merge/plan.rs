//! Three-way merge planning
//!
//! Given the snapshots at the split point, at HEAD (`current`) and at the
//! merged branch (`other`), decide for every path whether to take the other
//! side, stage a removal, write a conflict or keep HEAD's version.
//!
//! | split | current      | other         | outcome                    |
//! |-------|--------------|---------------|----------------------------|
//! | -     | -            | o             | take `o`                   |
//! | -     | c            | o, o != c     | conflict(c, o)             |
//! | s     | s            | o, o != s     | take `o`                   |
//! | s     | s            | -             | remove                     |
//! | s     | -            | o, o != s     | conflict(-, o)             |
//! | s     | c, c != s    | -             | conflict(c, -)             |
//! | s     | c, c != s    | o, o ∉ {s, c} | conflict(c, o)             |
//!
//! Every other combination keeps HEAD's version. Content is compared by blob
//! id. Planning is pure: nothing is read from or written to disk.

use crate::artifacts::merge::presence::Presence;
use crate::artifacts::objects::commit::Tracking;
use crate::artifacts::objects::object_id::ObjectId;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Both sides of a conflicted path; `None` is a deleted side
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictSides {
    pub current: Option<ObjectId>,
    pub other: Option<ObjectId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergePlan {
    /// Paths to check out and stage from the other side
    pub take_from_other: BTreeMap<PathBuf, ObjectId>,
    /// Paths to delete and stage for removal
    pub removals: BTreeSet<PathBuf>,
    /// Paths whose working file becomes a conflict file
    pub conflicts: BTreeMap<PathBuf, ConflictSides>,
}

impl MergePlan {
    pub fn build(split: &Tracking, current: &Tracking, other: &Tracking) -> Self {
        let mut plan = MergePlan::default();

        let paths = split
            .keys()
            .chain(current.keys())
            .chain(other.keys())
            .collect::<BTreeSet<_>>();

        for path in paths {
            let s = split.get(path);
            let c = current.get(path);
            let o = other.get(path);

            plan.classify(path, Presence::of(s, c, o), s, c, o);
        }

        tracing::debug!(
            take = plan.take_from_other.len(),
            remove = plan.removals.len(),
            conflicts = plan.conflicts.len(),
            "planned merge"
        );

        plan
    }

    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }

    fn classify(
        &mut self,
        path: &Path,
        presence: Presence,
        s: Option<&ObjectId>,
        c: Option<&ObjectId>,
        o: Option<&ObjectId>,
    ) {
        match (s, c, o) {
            (None, None, Some(o)) => self.take(path, o),
            (None, Some(c), Some(o)) if c != o => self.conflict(path, presence, Some(c), Some(o)),
            (Some(s), Some(c), Some(o)) if c == s && o != s => self.take(path, o),
            (Some(s), Some(c), None) if c == s => {
                self.removals.insert(path.to_path_buf());
            }
            (Some(s), None, Some(o)) if o != s => self.conflict(path, presence, None, Some(o)),
            (Some(s), Some(c), None) if c != s => self.conflict(path, presence, Some(c), None),
            (Some(s), Some(c), Some(o)) if c != s && o != s && c != o => {
                self.conflict(path, presence, Some(c), Some(o))
            }
            _ => {}
        }
    }

    fn take(&mut self, path: &Path, oid: &ObjectId) {
        self.take_from_other.insert(path.to_path_buf(), oid.clone());
    }

    fn conflict(
        &mut self,
        path: &Path,
        presence: Presence,
        current: Option<&ObjectId>,
        other: Option<&ObjectId>,
    ) {
        tracing::debug!(path = %path.display(), ?presence, "merge conflict");
        self.conflicts.insert(
            path.to_path_buf(),
            ConflictSides {
                current: current.cloned(),
                other: other.cloned(),
            },
        );
    }
}
