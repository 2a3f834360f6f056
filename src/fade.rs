use std::rc::Rc;

use kurbo::{Affine, Vec2};

use crate::ease::Ease;
use crate::node::{LayoutNode, NodeFactory};

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FadeProps {
    pub transform: Affine,
    pub opacity: f64, // 0..1 clamped in spec()
}

impl Default for FadeProps {
    fn default() -> Self {
        Self {
            transform: Affine::IDENTITY,
            opacity: 1.0,
        }
    }
}

/// Exit transition: ramp from the last laid-out props toward `opacity`, shifted by `offset`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ExitTransition {
    pub frames: u32, // specs still emitted after removal; 0 disappears at once
    pub ease: Ease,
    pub opacity: f64,
    pub offset: Vec2,
}

impl Default for ExitTransition {
    fn default() -> Self {
        Self {
            frames: 0,
            ease: Ease::Linear,
            opacity: 0.0,
            offset: Vec2::ZERO,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct NodeSpec {
    pub label: String,
    pub transform: Affine,
    pub opacity: f64,
    pub exiting: bool,
}

#[derive(Clone, Copy, Debug)]
struct ExitState {
    transition: ExitTransition,
    from: FadeProps,
    step: u32,
}

/// Minimal [`LayoutNode`]: reports its last props every pass and plays a stepped fade when
/// removed. Each `spec()` call during an exit advances the fade by one step.
///
/// Props persist across passes; a node that is fetched but not `set` keeps reporting what it
/// had, or the defaults if it was never set.
#[derive(Clone, Debug)]
pub struct FadeNode {
    label: String,
    props: FadeProps,
    laid_out: bool, // set() called at least once
    exit: Option<ExitState>,
}

impl FadeNode {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            props: FadeProps::default(),
            laid_out: false,
            exit: None,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn props(&self) -> FadeProps {
        self.props
    }

    pub fn is_laid_out(&self) -> bool {
        self.laid_out
    }

    pub fn is_exiting(&self) -> bool {
        self.exit.is_some()
    }

    /// Reuse this node for a different renderable.
    pub fn rebind(&mut self, label: impl Into<String>) {
        *self = Self::new(label);
    }
}

impl LayoutNode for FadeNode {
    type Spec = NodeSpec;
    type Props = FadeProps;
    type Exit = ExitTransition;

    fn reset(&mut self) {}

    fn remove(&mut self, exit: &ExitTransition) {
        tracing::debug!(label = %self.label, frames = exit.frames, "fade out started");
        self.exit = Some(ExitState {
            transition: *exit,
            from: self.props,
            step: 0,
        });
    }

    fn destroy(&mut self) {
        tracing::trace!(label = %self.label, "fade node destroyed");
        self.exit = None;
    }

    fn spec(&mut self) -> Option<NodeSpec> {
        if let Some(exit) = self.exit.as_mut() {
            let tr = exit.transition;
            if exit.step >= tr.frames {
                return None;
            }
            let t = tr.ease.progress(exit.step, tr.frames);
            exit.step += 1;

            let from = exit.from;
            let opacity = from.opacity + (tr.opacity - from.opacity) * t;
            return Some(NodeSpec {
                label: self.label.clone(),
                transform: Affine::translate(tr.offset * t) * from.transform,
                opacity: opacity.clamp(0.0, 1.0),
                exiting: true,
            });
        }

        Some(NodeSpec {
            label: self.label.clone(),
            transform: self.props.transform,
            opacity: self.props.opacity.clamp(0.0, 1.0),
            exiting: false,
        })
    }

    fn set(&mut self, props: FadeProps) -> &mut Self {
        self.props = props;
        self.laid_out = true;
        self.exit = None;
        self
    }
}

/// Factory building [`FadeNode`]s labeled after their renderable, with pool recycling.
#[derive(Clone, Debug, Default)]
pub struct FadeFactory {
    built: u64,
}

impl FadeFactory {
    /// Nodes built from scratch so far.
    pub fn built(&self) -> u64 {
        self.built
    }
}

impl NodeFactory<Rc<str>> for FadeFactory {
    type Node = FadeNode;

    fn create(&mut self, renderable: &Rc<str>) -> FadeNode {
        self.built += 1;
        FadeNode::new(renderable.as_ref())
    }

    const RECYCLES: bool = true;

    fn recycle(&mut self, mut node: FadeNode, renderable: &Rc<str>) -> FadeNode {
        node.rebind(renderable.as_ref());
        node
    }
}
