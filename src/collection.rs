use std::fmt;

use crate::context::AccessContext;
use crate::ids::IdTable;
use crate::node::{LayoutNode, NodeFactory};
use crate::sequence::{Renderable, Sequence};

/// Sentinel for "no slot" in link and scan-pointer fields.
const INVALID: u32 = u32::MAX;

type Spec<R, F> = <<F as NodeFactory<R>>::Node as LayoutNode>::Spec;
type Exit<R, F> = <<F as NodeFactory<R>>::Node as LayoutNode>::Exit;

/// One node plus the bookkeeping the collection keeps for it.
pub struct NodeEntry<R, N> {
    pub(crate) node: N,
    pub(crate) renderable: R,
    pub(crate) invalidated: bool,
    pub(crate) removing: bool,
    pub(crate) next: u32,
}

impl<R, N> NodeEntry<R, N> {
    /// Entry for `node` backing `renderable`, not yet touched by any pass.
    pub fn new(renderable: R, node: N) -> Self {
        Self {
            node,
            renderable,
            invalidated: false,
            removing: false,
            next: INVALID,
        }
    }

    pub fn node(&self) -> &N {
        &self.node
    }

    pub fn renderable(&self) -> &R {
        &self.renderable
    }

    /// `true` once touched during the current pass.
    pub fn is_invalidated(&self) -> bool {
        self.invalidated
    }

    pub fn is_removing(&self) -> bool {
        self.removing
    }
}

impl<R: fmt::Debug, N: fmt::Debug> fmt::Debug for NodeEntry<R, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeEntry")
            .field("renderable", &self.renderable)
            .field("node", &self.node)
            .field("invalidated", &self.invalidated)
            .field("removing", &self.removing)
            .finish_non_exhaustive()
    }
}

/// Options controlling [`NodeCollection`] allocation behavior.
#[derive(Clone, Debug)]
pub struct NodeCollectionOpts {
    /// Maximum number of destroyed nodes kept for [`NodeFactory::recycle`]. Ignored unless the
    /// factory sets [`NodeFactory::RECYCLES`].
    pub pool_capacity: usize,
    pub initial_capacity: usize,
}

impl Default for NodeCollectionOpts {
    fn default() -> Self {
        Self {
            pool_capacity: 0,
            initial_capacity: 16,
        }
    }
}

/// Counters for the most recent pass. Cleared by [`NodeCollection::begin`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct PassStats {
    pub fast_hits: u64,
    pub scan_hits: u64, // includes repeat requests answered in place
    pub created: u64,
    pub recycled: u64,
    pub marked_removing: u64,
    pub destroyed: u64,
    pub retained: u64,
}

/// Self-reorganizing collection mapping renderable identity to node instance.
///
/// Entries live in an arena threaded by a singly linked order. During a pass a scan pointer
/// walks that order; when the layout asks for renderables in the same order as last time,
/// each lookup is answered by the entry under the pointer. Out-of-order requests scan forward
/// and splice the match in front of the pointer, so the order converges on the latest
/// traversal.
///
/// A pass is `begin` → lookups through the returned [`AccessContext`] → `mark_remaining` →
/// `finalize_and_purge`.
pub struct NodeCollection<R, F: NodeFactory<R>> {
    slots: Vec<Option<NodeEntry<R, F::Node>>>,
    free: Vec<u32>,
    head: u32,
    len: usize,

    // Scan pointers; `prev` is the entry spliced or hit last, `current` the next expected one.
    prev: u32,
    current: u32,

    factory: F,
    pool: Vec<F::Node>,
    opts: NodeCollectionOpts,
    stats: PassStats,
}

impl<R, F: NodeFactory<R>> fmt::Debug for NodeCollection<R, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeCollection")
            .field("len", &self.len)
            .field("pooled", &self.pool.len())
            .field("opts", &self.opts)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl<R, F> NodeCollection<R, F>
where
    R: Renderable,
    F: NodeFactory<R>,
{
    pub fn new(factory: F) -> Self {
        Self::with_opts(factory, NodeCollectionOpts::default())
    }

    pub fn with_opts(factory: F, opts: NodeCollectionOpts) -> Self {
        Self {
            slots: Vec::with_capacity(opts.initial_capacity),
            free: Vec::new(),
            head: INVALID,
            len: 0,
            prev: INVALID,
            current: INVALID,
            factory,
            pool: Vec::new(),
            opts,
            stats: PassStats::default(),
        }
    }

    /// Start a pass.
    ///
    /// Resets every node, clears the touch flags and statistics, and rewinds the scan pointer
    /// to the head. The returned context borrows the collection for the lookup phase; drop it
    /// before calling [`mark_remaining`](Self::mark_remaining).
    #[tracing::instrument(skip_all, fields(nodes = self.len))]
    pub fn begin<'a, S>(
        &'a mut self,
        sequence: Option<S>,
        ids: Option<&'a IdTable<R>>,
    ) -> AccessContext<'a, R, F, S>
    where
        S: Sequence<Item = R>,
    {
        for entry in self.slots.iter_mut().flatten() {
            entry.node.reset();
            entry.invalidated = false;
        }
        self.prev = INVALID;
        self.current = self.head;
        self.stats = PassStats::default();
        AccessContext::new(self, sequence, ids)
    }

    /// Tell every entry not touched this pass to animate out.
    ///
    /// Entries already removing are skipped, so calling this twice in a pass is harmless.
    /// Returns the number of entries newly marked.
    #[tracing::instrument(skip_all)]
    pub fn mark_remaining(&mut self, exit: &Exit<R, F>) -> usize {
        let mut marked = 0;
        let mut idx = self.head;
        while idx != INVALID {
            let entry = self.entry_mut(idx);
            if !entry.invalidated && !entry.removing {
                entry.node.remove(exit);
                entry.removing = true;
                marked += 1;
                tracing::debug!(slot = idx, "node marked removing");
            }
            idx = entry.next;
        }
        self.stats.marked_removing += marked as u64;
        marked
    }

    /// Collect specs in collection order and destroy nodes that have none left.
    #[tracing::instrument(skip_all, fields(nodes = self.len))]
    pub fn finalize_and_purge(&mut self) -> Vec<Spec<R, F>> {
        let mut specs = Vec::with_capacity(self.len);
        let mut before = INVALID;
        let mut idx = self.head;
        while idx != INVALID {
            let entry = self.entry_mut(idx);
            let next = entry.next;
            match entry.node.spec() {
                Some(spec) => {
                    specs.push(spec);
                    before = idx;
                }
                None => {
                    if before == INVALID {
                        self.head = next;
                    } else {
                        self.entry_mut(before).next = next;
                    }
                    self.release(idx);
                }
            }
            idx = next;
        }
        self.prev = INVALID;
        self.current = INVALID;
        self.stats.retained = specs.len() as u64;
        tracing::debug!(
            retained = specs.len(),
            destroyed = self.stats.destroyed,
            "pass finalized"
        );
        specs
    }

    /// First entry backing `renderable`, by identity.
    pub fn find_by_renderable(&self, renderable: &R) -> Option<&NodeEntry<R, F::Node>> {
        self.iter()
            .find(|entry| entry.renderable.same_renderable(renderable))
    }

    /// Attach an externally built entry at the head of the collection.
    ///
    /// If an entry for the same renderable already exists, `entry` is handed back untouched.
    pub fn insert(
        &mut self,
        mut entry: NodeEntry<R, F::Node>,
    ) -> Option<NodeEntry<R, F::Node>> {
        if self.find_by_renderable(&entry.renderable).is_some() {
            return Some(entry);
        }
        entry.next = self.head;
        let idx = self.occupy(entry);
        self.head = idx;
        None
    }

    /// Destroy every node and empty the collection, pool included.
    pub fn clear(&mut self) {
        let mut idx = self.head;
        while idx != INVALID {
            let entry = self.entry_mut(idx);
            entry.node.destroy();
            idx = entry.next;
        }
        self.slots.clear();
        self.free.clear();
        self.pool.clear();
        self.head = INVALID;
        self.prev = INVALID;
        self.current = INVALID;
        self.len = 0;
    }

    pub fn iter(&self) -> Iter<'_, R, F::Node> {
        Iter {
            slots: &self.slots,
            cursor: self.head,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of destroyed nodes waiting to be recycled.
    pub fn pooled(&self) -> usize {
        self.pool.len()
    }

    pub fn stats(&self) -> PassStats {
        self.stats
    }

    pub fn opts(&self) -> &NodeCollectionOpts {
        &self.opts
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Find or create the slot for `renderable`, moving it in front of the scan pointer.
    pub(crate) fn resolve(&mut self, renderable: &R) -> u32 {
        let current = self.current;
        if current != INVALID && self.entry(current).renderable.same_renderable(renderable) {
            self.prev = current;
            self.current = self.entry(current).next;
            self.stats.fast_hits += 1;
            return current;
        }

        if current != INVALID {
            let mut before = current;
            let mut idx = self.entry(current).next;
            while idx != INVALID {
                let next = self.entry(idx).next;
                if self.entry(idx).renderable.same_renderable(renderable) {
                    self.entry_mut(before).next = next;
                    self.splice_before_current(idx);
                    self.stats.scan_hits += 1;
                    tracing::trace!(slot = idx, "node spliced before scan pointer");
                    return idx;
                }
                before = idx;
                idx = next;
            }
        }

        // Entries ahead of the scan pointer were already touched this pass; a repeat request
        // is answered in place.
        let mut idx = self.head;
        while idx != current {
            let entry = self.entry(idx);
            if entry.renderable.same_renderable(renderable) {
                self.stats.scan_hits += 1;
                return idx;
            }
            idx = entry.next;
        }

        let entry = NodeEntry::new(renderable.clone(), self.build_node(renderable));
        let idx = self.occupy(entry);
        self.splice_before_current(idx);
        idx
    }

    /// Mark the entry at `idx` as present this pass and hand out its node.
    pub(crate) fn touch(&mut self, idx: u32) -> &mut F::Node {
        let entry = self.entry_mut(idx);
        entry.invalidated = true;
        // A renderable that came back cancels its pending removal.
        entry.removing = false;
        &mut entry.node
    }

    fn build_node(&mut self, renderable: &R) -> F::Node {
        match self.pool.pop() {
            Some(node) => {
                self.stats.recycled += 1;
                tracing::debug!(pooled = self.pool.len(), "node recycled");
                self.factory.recycle(node, renderable)
            }
            None => {
                self.stats.created += 1;
                tracing::debug!(nodes = self.len + 1, "node created");
                self.factory.create(renderable)
            }
        }
    }

    fn splice_before_current(&mut self, idx: u32) {
        self.entry_mut(idx).next = self.current;
        if self.prev == INVALID {
            self.head = idx;
        } else {
            let prev = self.prev;
            self.entry_mut(prev).next = idx;
        }
        self.prev = idx;
    }

    fn occupy(&mut self, entry: NodeEntry<R, F::Node>) -> u32 {
        self.len += 1;
        if let Some(idx) = self.free.pop() {
            self.slots[idx as usize] = Some(entry);
            return idx;
        }
        let idx = u32::try_from(self.slots.len()).unwrap_or(INVALID);
        assert!(idx != INVALID, "node collection slot space exhausted");
        self.slots.push(Some(entry));
        idx
    }

    fn release(&mut self, idx: u32) {
        let Some(mut entry) = self.slots[idx as usize].take() else {
            unreachable!("released slot {idx} is vacant");
        };
        self.free.push(idx);
        self.len -= 1;
        entry.node.destroy();
        self.stats.destroyed += 1;
        tracing::debug!(slot = idx, "node destroyed");
        if F::RECYCLES && self.pool.len() < self.opts.pool_capacity {
            self.pool.push(entry.node);
        }
    }

    fn entry(&self, idx: u32) -> &NodeEntry<R, F::Node> {
        match &self.slots[idx as usize] {
            Some(entry) => entry,
            None => unreachable!("linked slot {idx} is vacant"),
        }
    }

    fn entry_mut(&mut self, idx: u32) -> &mut NodeEntry<R, F::Node> {
        match &mut self.slots[idx as usize] {
            Some(entry) => entry,
            None => unreachable!("linked slot {idx} is vacant"),
        }
    }
}

pub struct Iter<'a, R, N> {
    slots: &'a [Option<NodeEntry<R, N>>],
    cursor: u32,
}

impl<'a, R, N> Iterator for Iter<'a, R, N> {
    type Item = &'a NodeEntry<R, N>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor == INVALID {
            return None;
        }
        let entry = self.slots.get(self.cursor as usize)?.as_ref()?;
        self.cursor = entry.next;
        Some(entry)
    }
}
