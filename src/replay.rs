use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use std::rc::Rc;

use crate::collection::{NodeCollection, NodeCollectionOpts, PassStats};
use crate::context::{Lookup, SetTarget};
use crate::fade::{ExitTransition, FadeFactory, FadeProps, NodeSpec};
use crate::foundation::error::{LayoutError, LayoutResult};
use crate::ids::{IdEntry, IdTable};
use crate::node::LayoutNode;
use crate::sequence::ListSequence;

/// A scripted series of layout passes over named renderables.
///
/// Names are interned once per script, so the same name is the same renderable in every pass.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ReplayScript {
    pub exit: ExitTransition,
    pub pool_capacity: usize,
    pub passes: Vec<PassScript>,
}

/// One pass of a [`ReplayScript`].
///
/// Every sequence item and every id-table item is laid out with default props, then `set`
/// operations run in order.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PassScript {
    pub sequence: Vec<String>,
    pub ids: BTreeMap<String, IdValue>,
    pub set: Vec<SetOp>,
}

/// Id-table value in a script: a name or a list of names.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum IdValue {
    Single(String),
    Group(Vec<String>),
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct SetOp {
    pub target: ScriptTarget,
    #[serde(default)]
    pub props: FadeProps,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptTarget {
    Id(String),
    Item(String),
}

#[derive(Clone, Debug, serde::Serialize)]
pub struct PassReport {
    pub pass: usize,
    pub specs: Vec<NodeSpec>,
    pub stats: PassStats,
    pub live: usize,
    pub pooled: usize,
}

impl ReplayScript {
    pub fn from_json(s: &str) -> LayoutResult<Self> {
        let script: Self = serde_json::from_str(s)?;
        script.validate()?;
        Ok(script)
    }

    pub fn from_reader(r: impl Read) -> LayoutResult<Self> {
        let script: Self = serde_json::from_reader(r)?;
        script.validate()?;
        Ok(script)
    }

    pub fn validate(&self) -> LayoutResult<()> {
        let o = self.exit.opacity;
        if !o.is_finite() || !(0.0..=1.0).contains(&o) {
            return Err(LayoutError::validation(
                "exit.opacity must be finite and within 0..=1",
            ));
        }

        for (i, pass) in self.passes.iter().enumerate() {
            let names = pass.sequence.iter().chain(pass.ids.values().flat_map(|v| match v {
                IdValue::Single(name) => std::slice::from_ref(name),
                IdValue::Group(names) => names.as_slice(),
            }));
            for name in names {
                if name.trim().is_empty() {
                    return Err(LayoutError::validation(format!(
                        "pass {i}: renderable names must be non-empty"
                    )));
                }
            }

            for op in &pass.set {
                if !op.props.opacity.is_finite() {
                    return Err(LayoutError::validation(format!(
                        "pass {i}: set opacity must be finite"
                    )));
                }
                match &op.target {
                    ScriptTarget::Id(id) if !pass.ids.contains_key(id) => {
                        return Err(LayoutError::script(format!(
                            "pass {i}: set targets undeclared id '{id}'"
                        )));
                    }
                    ScriptTarget::Item(name) if name.trim().is_empty() => {
                        return Err(LayoutError::validation(format!(
                            "pass {i}: renderable names must be non-empty"
                        )));
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }
}

#[derive(Default)]
struct Interner {
    names: HashMap<String, Rc<str>>,
}

impl Interner {
    fn intern(&mut self, name: &str) -> Rc<str> {
        if let Some(r) = self.names.get(name) {
            return Rc::clone(r);
        }
        let r: Rc<str> = Rc::from(name);
        self.names.insert(name.to_string(), Rc::clone(&r));
        r
    }
}

/// Run every pass of `script` against a fresh collection of [`FadeNode`](crate::FadeNode)s.
#[tracing::instrument(skip(script), fields(passes = script.passes.len()))]
pub fn replay(script: &ReplayScript) -> LayoutResult<Vec<PassReport>> {
    script.validate()?;

    let opts = NodeCollectionOpts {
        pool_capacity: script.pool_capacity,
        ..NodeCollectionOpts::default()
    };
    let mut nodes = NodeCollection::with_opts(FadeFactory::default(), opts);
    let mut names = Interner::default();
    let mut reports = Vec::with_capacity(script.passes.len());

    for (i, pass) in script.passes.iter().enumerate() {
        let sequence: Vec<Rc<str>> = pass.sequence.iter().map(|n| names.intern(n)).collect();
        let ids: IdTable<Rc<str>> = pass
            .ids
            .iter()
            .map(|(id, value)| {
                let entry = match value {
                    IdValue::Single(name) => IdEntry::Single(names.intern(name)),
                    IdValue::Group(group) => {
                        IdEntry::Group(group.iter().map(|n| names.intern(n)).collect())
                    }
                };
                (id.clone(), entry)
            })
            .collect();
        let items: Vec<Option<Rc<str>>> = pass
            .set
            .iter()
            .map(|op| match &op.target {
                ScriptTarget::Item(name) => Some(names.intern(name)),
                ScriptTarget::Id(_) => None,
            })
            .collect();

        let mut ctx = nodes.begin(Some(ListSequence::new(sequence)), Some(&ids));
        while let Some(node) = ctx.next() {
            node.set(FadeProps::default());
        }
        for id in pass.ids.keys() {
            match ctx.by_id(id) {
                Some(Lookup::Node(node)) => {
                    node.set(FadeProps::default());
                }
                Some(Lookup::Group(group)) => {
                    for item in group {
                        ctx.by_array_element(item).set(FadeProps::default());
                    }
                }
                None => {}
            }
        }
        for (op, item) in pass.set.iter().zip(&items) {
            let target = match (&op.target, item) {
                (_, Some(item)) => SetTarget::Item(item),
                (ScriptTarget::Id(id), None) => SetTarget::Id(id.as_str()),
                (ScriptTarget::Item(_), None) => continue,
            };
            ctx.set(target, op.props);
        }
        drop(ctx);

        nodes.mark_remaining(&script.exit);
        let specs = nodes.finalize_and_purge();
        tracing::debug!(pass = i, specs = specs.len(), "pass replayed");
        reports.push(PassReport {
            pass: i,
            specs,
            stats: nodes.stats(),
            live: nodes.len(),
            pooled: nodes.pooled(),
        });
    }
    Ok(reports)
}
