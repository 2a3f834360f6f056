/// Stateful object backing one renderable across layout passes.
///
/// Nodes are owned by a [`NodeCollection`](crate::NodeCollection); callers only ever borrow
/// them through an [`AccessContext`](crate::AccessContext).
pub trait LayoutNode {
    type Spec;
    type Props;
    type Exit;

    /// Called on every node at the start of a pass.
    fn reset(&mut self);

    /// Start animating out. Called at most once per disappearance.
    fn remove(&mut self, exit: &Self::Exit);

    /// Final teardown, right before the node leaves the collection.
    fn destroy(&mut self);

    /// Current descriptor, or `None` once there is nothing left to render.
    fn spec(&mut self) -> Option<Self::Spec>;

    /// Apply layout properties for this pass.
    fn set(&mut self, props: Self::Props) -> &mut Self;
}

/// Builds nodes for renderables seen for the first time.
pub trait NodeFactory<R> {
    type Node: LayoutNode;

    /// Whether destroyed nodes are worth keeping for [`recycle`](Self::recycle). When `false`
    /// the collection never pools this factory's nodes, whatever its pool capacity.
    const RECYCLES: bool = false;

    fn create(&mut self, renderable: &R) -> Self::Node;

    /// Rebind a previously destroyed node to `renderable`. Only called when
    /// [`RECYCLES`](Self::RECYCLES) is `true`.
    fn recycle(&mut self, node: Self::Node, renderable: &R) -> Self::Node {
        drop(node);
        self.create(renderable)
    }
}

impl<R, N, F> NodeFactory<R> for F
where
    F: FnMut(&R) -> N,
    N: LayoutNode,
{
    type Node = N;

    fn create(&mut self, renderable: &R) -> N {
        self(renderable)
    }
}
