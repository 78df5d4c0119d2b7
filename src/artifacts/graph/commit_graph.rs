//! Commit graph queries
//!
//! Commits form a DAG through their parent edges. The graph is read lazily
//! through a parent loader, so the same algorithms run against the object
//! database and against in-memory stores in tests.
//!
//! ## Split point
//!
//! The split point of two commits `a` and `b` is found in two phases:
//!
//! 1. Collect every ancestor of `b` (including `b` itself).
//! 2. Walk breadth-first from `a` through the parent edges, primary parent
//!    first, visiting each commit at most once. The first visited commit that
//!    is an ancestor of `b` is the split point.
//!
//! In criss-cross histories this picks the common ancestor closest to `a` in
//! BFS order, which is not necessarily unique among the best common ancestors.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let graph = CommitGraph::new(|oid| Ok(database.load_commit(oid)?.parents().to_vec()));
//! let split = graph.split_point(&head, &other_head)?;
//! ```

use crate::artifacts::objects::object_id::ObjectId;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};

/// Read-only view over the commit DAG
///
/// Parents are loaded at most once per commit and cached for the lifetime of
/// the graph.
pub struct CommitGraph<ParentLoaderFn>
where
    ParentLoaderFn: Fn(&ObjectId) -> anyhow::Result<Vec<ObjectId>>,
{
    parent_loader: ParentLoaderFn,
    parents_cache: RefCell<HashMap<ObjectId, Vec<ObjectId>>>,
}

impl<ParentLoaderFn> CommitGraph<ParentLoaderFn>
where
    ParentLoaderFn: Fn(&ObjectId) -> anyhow::Result<Vec<ObjectId>>,
{
    pub fn new(parent_loader: ParentLoaderFn) -> Self {
        CommitGraph {
            parent_loader,
            parents_cache: RefCell::new(HashMap::new()),
        }
    }

    /// Parents of `oid`, primary parent first
    pub fn parents(&self, oid: &ObjectId) -> anyhow::Result<Vec<ObjectId>> {
        if let Some(parents) = self.parents_cache.borrow().get(oid) {
            return Ok(parents.clone());
        }

        let parents = (self.parent_loader)(oid)?;
        self.parents_cache
            .borrow_mut()
            .insert(oid.clone(), parents.clone());

        Ok(parents)
    }

    /// Transitive closure over all parent edges, including `oid` itself
    pub fn ancestors_of(&self, oid: &ObjectId) -> anyhow::Result<HashSet<ObjectId>> {
        let mut ancestors = HashSet::new();
        let mut pending = vec![oid.clone()];

        while let Some(current) = pending.pop() {
            if !ancestors.insert(current.clone()) {
                continue;
            }

            pending.extend(
                self.parents(&current)?
                    .into_iter()
                    .filter(|parent| !ancestors.contains(parent)),
            );
        }

        Ok(ancestors)
    }

    /// Whether `ancestor` is reachable from `descendant` (every commit is its own ancestor)
    pub fn is_ancestor(&self, ancestor: &ObjectId, descendant: &ObjectId) -> anyhow::Result<bool> {
        Ok(self.ancestors_of(descendant)?.contains(ancestor))
    }

    /// Latest common ancestor of `a` and `b` in BFS order from `a`
    ///
    /// Every pair of commits in a repository shares the root commit, so `None`
    /// only happens for commits from unrelated histories.
    pub fn split_point(&self, a: &ObjectId, b: &ObjectId) -> anyhow::Result<Option<ObjectId>> {
        let ancestors_of_b = self.ancestors_of(b)?;

        let mut visited = HashSet::new();
        let mut queue = VecDeque::from([a.clone()]);

        while let Some(current) = queue.pop_front() {
            if !visited.insert(current.clone()) {
                continue;
            }

            if ancestors_of_b.contains(&current) {
                tracing::debug!(a = %a, b = %b, split = %current, "found split point");
                return Ok(Some(current));
            }

            queue.extend(
                self.parents(&current)?
                    .into_iter()
                    .filter(|parent| !visited.contains(parent)),
            );
        }

        tracing::debug!(a = %a, b = %b, "no split point");
        Ok(None)
    }

    /// `start` followed by its primary-parent chain down to the root
    pub fn first_parent_history(&self, start: &ObjectId) -> FirstParentHistory<'_, ParentLoaderFn> {
        FirstParentHistory {
            graph: self,
            next: Some(start.clone()),
        }
    }
}

/// Iterator over a primary-parent chain
pub struct FirstParentHistory<'g, ParentLoaderFn>
where
    ParentLoaderFn: Fn(&ObjectId) -> anyhow::Result<Vec<ObjectId>>,
{
    graph: &'g CommitGraph<ParentLoaderFn>,
    next: Option<ObjectId>,
}

impl<ParentLoaderFn> Iterator for FirstParentHistory<'_, ParentLoaderFn>
where
    ParentLoaderFn: Fn(&ObjectId) -> anyhow::Result<Vec<ObjectId>>,
{
    type Item = anyhow::Result<ObjectId>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;

        match self.graph.parents(&current) {
            Ok(parents) => {
                self.next = parents.into_iter().next();
                Some(Ok(current))
            }
            Err(error) => Some(Err(error)),
        }
    }
}
