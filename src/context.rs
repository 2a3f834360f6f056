use crate::collection::NodeCollection;
use crate::ids::{IdEntry, IdTable};
use crate::node::{LayoutNode, NodeFactory};
use crate::sequence::{Renderable, Sequence};

/// Result of [`AccessContext::by_id`].
#[derive(Debug)]
pub enum Lookup<'n, 'a, N, R> {
    Node(&'n mut N),
    /// The identifier named a group. Items are not resolved; feed each one to
    /// [`AccessContext::by_array_element`].
    Group(&'a [R]),
}

/// What [`AccessContext::set`] applies properties to.
#[derive(Clone, Copy, Debug)]
pub enum SetTarget<'t, R> {
    Id(&'t str),
    Item(&'t R),
}

/// Lookup facade handed to the layout computation for one pass.
///
/// Every node handed out is marked as present for the pass. Obtained from
/// [`NodeCollection::begin`].
pub struct AccessContext<'a, R, F: NodeFactory<R>, S> {
    nodes: &'a mut NodeCollection<R, F>,
    sequence: Option<S>,
    ids: Option<&'a IdTable<R>>,
}

impl<'a, R, F, S> AccessContext<'a, R, F, S>
where
    R: Renderable,
    F: NodeFactory<R>,
    S: Sequence<Item = R>,
{
    pub(crate) fn new(
        nodes: &'a mut NodeCollection<R, F>,
        sequence: Option<S>,
        ids: Option<&'a IdTable<R>>,
    ) -> Self {
        Self {
            nodes,
            sequence,
            ids,
        }
    }

    /// Node for the next item of the pass sequence, advancing the cursor.
    ///
    /// `None` once the sequence is exhausted, or when the pass has no sequence.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<&mut F::Node> {
        let cursor = self.sequence.take()?;
        let item = cursor.get()?;
        self.sequence = cursor.get_next();
        Some(self.resolve(&item))
    }

    /// Look `id` up in the pass id table.
    ///
    /// `None` when the pass has no table or `id` is unmapped.
    pub fn by_id(&mut self, id: &str) -> Option<Lookup<'_, 'a, F::Node, R>> {
        let ids = self.ids?;
        match ids.get(id)? {
            IdEntry::Single(item) => Some(Lookup::Node(self.resolve(item))),
            IdEntry::Group(items) => Some(Lookup::Group(items.as_slice())),
        }
    }

    /// Node for `item`, typically an element taken from a [`Lookup::Group`].
    pub fn by_array_element(&mut self, item: &R) -> &mut F::Node {
        self.resolve(item)
    }

    /// Apply `props` to the node `target` resolves to.
    ///
    /// Unmapped ids and group ids resolve to no node, which makes this a no-op.
    pub fn set(
        &mut self,
        target: SetTarget<'_, R>,
        props: <F::Node as LayoutNode>::Props,
    ) -> &mut Self {
        let node = match target {
            SetTarget::Id(id) => match self.by_id(id) {
                Some(Lookup::Node(node)) => Some(node),
                Some(Lookup::Group(_)) | None => None,
            },
            SetTarget::Item(item) => Some(self.by_array_element(item)),
        };
        match node {
            Some(node) => {
                node.set(props);
            }
            None => tracing::trace!("set target resolved to no node"),
        }
        self
    }

    pub fn ids(&self) -> Option<&'a IdTable<R>> {
        self.ids
    }

    fn resolve(&mut self, item: &R) -> &mut F::Node {
        let idx = self.nodes.resolve(item);
        self.nodes.touch(idx)
    }
}
