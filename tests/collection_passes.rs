use std::cell::RefCell;
use std::rc::Rc;

use layoutnodes::{
    ExitTransition, FadeFactory, IdTable, LayoutNode, ListSequence, Lookup, NodeCollection,
    NodeCollectionOpts, NodeFactory, SetTarget,
};

#[derive(Clone, Debug, PartialEq)]
enum Call {
    Reset(u32),
    Remove(u32, &'static str),
    Destroy(u32),
}

type Log = Rc<RefCell<Vec<Call>>>;

/// Logs every call; after `remove` it keeps reporting a spec for `linger` more calls.
#[derive(Debug)]
struct Recorder {
    serial: u32,
    log: Log,
    linger: u32,
    exit_left: Option<u32>,
    props: Option<&'static str>,
}

impl LayoutNode for Recorder {
    type Spec = u32;
    type Props = &'static str;
    type Exit = &'static str;

    fn reset(&mut self) {
        self.log.borrow_mut().push(Call::Reset(self.serial));
    }

    fn remove(&mut self, exit: &&'static str) {
        self.log.borrow_mut().push(Call::Remove(self.serial, *exit));
        self.exit_left = Some(self.linger);
    }

    fn destroy(&mut self) {
        self.log.borrow_mut().push(Call::Destroy(self.serial));
    }

    fn spec(&mut self) -> Option<u32> {
        match self.exit_left {
            None => Some(self.serial),
            Some(0) => None,
            Some(n) => {
                self.exit_left = Some(n - 1);
                Some(self.serial)
            }
        }
    }

    fn set(&mut self, props: &'static str) -> &mut Self {
        self.props = Some(props);
        self.exit_left = None;
        self
    }
}

/// Hands out serials in creation order.
struct Counting {
    log: Log,
    linger: u32,
    created: u32,
    recycled: u32,
}

impl NodeFactory<Rc<str>> for Counting {
    type Node = Recorder;

    const RECYCLES: bool = true;

    fn create(&mut self, _renderable: &Rc<str>) -> Recorder {
        self.created += 1;
        Recorder {
            serial: self.created,
            log: Rc::clone(&self.log),
            linger: self.linger,
            exit_left: None,
            props: None,
        }
    }

    fn recycle(&mut self, mut node: Recorder, _renderable: &Rc<str>) -> Recorder {
        self.recycled += 1;
        node.exit_left = None;
        node.props = None;
        node
    }
}

type Nodes = NodeCollection<Rc<str>, Counting>;

fn collection(linger: u32, opts: NodeCollectionOpts) -> (Nodes, Log) {
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let factory = Counting {
        log: Rc::clone(&log),
        linger,
        created: 0,
        recycled: 0,
    };
    (NodeCollection::with_opts(factory, opts), log)
}

fn item(name: &str) -> Rc<str> {
    Rc::from(name)
}

/// One full pass over `items`; returns the serials handed out and the purged specs.
fn pass(nodes: &mut Nodes, items: &[Rc<str>]) -> (Vec<u32>, Vec<u32>) {
    let mut ctx = nodes.begin(Some(ListSequence::new(items.to_vec())), None);
    let mut serials = Vec::new();
    while let Some(node) = ctx.next() {
        serials.push(node.serial);
    }
    drop(ctx);
    nodes.mark_remaining(&"fade");
    (serials, nodes.finalize_and_purge())
}

fn count(log: &Log, pred: impl Fn(&Call) -> bool) -> usize {
    log.borrow().iter().filter(|c| pred(*c)).count()
}

#[test]
fn same_renderable_gets_same_node_across_passes() {
    let (mut nodes, _) = collection(0, NodeCollectionOpts::default());
    let (a, b) = (item("a"), item("b"));

    let (first, _) = pass(&mut nodes, &[a.clone(), b.clone()]);
    let (second, _) = pass(&mut nodes, &[a, b]);
    assert_eq!(first, second);
    assert_eq!(nodes.factory().created, 2);
}

#[test]
fn factory_runs_once_per_new_renderable() {
    let (mut nodes, _) = collection(0, NodeCollectionOpts::default());
    let (a, b, c) = (item("a"), item("b"), item("c"));

    pass(&mut nodes, &[a.clone()]);
    assert_eq!(nodes.factory().created, 1);

    pass(&mut nodes, &[a, b.clone(), c, b]);
    assert_eq!(nodes.factory().created, 3);
    assert_eq!(nodes.stats().created, 2);
    assert_eq!(nodes.len(), 3);
}

#[test]
fn reorder_converges_to_fast_path() {
    let (mut nodes, _) = collection(0, NodeCollectionOpts::default());
    let (a, b, c) = (item("a"), item("b"), item("c"));

    let (p1, _) = pass(&mut nodes, &[a.clone(), b.clone(), c.clone()]);
    let (p2, _) = pass(&mut nodes, &[c.clone(), a.clone(), b.clone()]);
    assert_eq!(p2, vec![p1[2], p1[0], p1[1]]);
    assert!(nodes.stats().scan_hits > 0);

    let (p3, _) = pass(&mut nodes, &[c, a, b]);
    assert_eq!(p3, p2);
    let stats = nodes.stats();
    assert_eq!(stats.fast_hits, 3);
    assert_eq!(stats.scan_hits, 0);
    assert_eq!(stats.created, 0);
}

#[test]
fn disappeared_renderable_is_removed_then_destroyed() {
    let (mut nodes, log) = collection(0, NodeCollectionOpts::default());
    let (x, y) = (item("X"), item("Y"));

    let (_, specs) = pass(&mut nodes, &[x.clone(), y.clone()]);
    assert_eq!(specs, vec![1, 2]);
    assert_eq!(nodes.len(), 2);

    let (_, specs) = pass(&mut nodes, &[y.clone()]);
    assert_eq!(specs, vec![2]);
    assert!(nodes.find_by_renderable(&x).is_none());
    assert!(nodes.find_by_renderable(&y).is_some());
    assert_eq!(count(&log, |c| *c == Call::Remove(1, "fade")), 1);
    assert_eq!(count(&log, |c| *c == Call::Destroy(1)), 1);
    assert_eq!(count(&log, |c| matches!(c, Call::Destroy(2))), 0);
}

#[test]
fn exiting_node_keeps_reporting_until_done() {
    let (mut nodes, log) = collection(1, NodeCollectionOpts::default());
    let (x, y) = (item("X"), item("Y"));

    pass(&mut nodes, &[x.clone(), y.clone()]);

    let (_, specs) = pass(&mut nodes, &[y.clone()]);
    assert_eq!(specs, vec![2, 1]);
    assert!(nodes.find_by_renderable(&x).unwrap().is_removing());

    let (_, specs) = pass(&mut nodes, &[y]);
    assert_eq!(specs, vec![2]);
    assert!(nodes.find_by_renderable(&x).is_none());
    assert_eq!(count(&log, |c| matches!(c, Call::Remove(1, _))), 1);
}

#[test]
fn mark_remaining_twice_removes_once() {
    let (mut nodes, log) = collection(0, NodeCollectionOpts::default());
    let (a, b) = (item("a"), item("b"));

    pass(&mut nodes, &[a.clone(), b.clone()]);

    let mut ctx = nodes.begin(Some(ListSequence::new(vec![b])), None);
    while ctx.next().is_some() {}
    drop(ctx);
    assert_eq!(nodes.mark_remaining(&"out"), 1);
    assert_eq!(nodes.mark_remaining(&"out"), 0);

    assert_eq!(count(&log, |c| matches!(c, Call::Remove(..))), 1);
    assert_eq!(nodes.stats().marked_removing, 1);
}

#[test]
fn returning_renderable_cancels_removal() {
    let (mut nodes, log) = collection(5, NodeCollectionOpts::default());
    let (a, b) = (item("a"), item("b"));

    let (first, _) = pass(&mut nodes, &[a.clone(), b.clone()]);
    pass(&mut nodes, &[a.clone()]);
    assert!(nodes.find_by_renderable(&b).unwrap().is_removing());

    let (again, _) = pass(&mut nodes, &[a.clone(), b.clone()]);
    assert_eq!(first, again);
    assert!(!nodes.find_by_renderable(&b).unwrap().is_removing());

    pass(&mut nodes, &[a]);
    assert_eq!(count(&log, |c| matches!(c, Call::Remove(2, _))), 2);
}

#[test]
fn begin_resets_every_node() {
    let (mut nodes, log) = collection(0, NodeCollectionOpts::default());
    pass(&mut nodes, &[item("a"), item("b")]);
    log.borrow_mut().clear();

    let ctx = nodes.begin(None::<ListSequence<Rc<str>>>, None);
    drop(ctx);
    assert_eq!(count(&log, |c| matches!(c, Call::Reset(_))), 2);
}

#[test]
fn id_table_singles_and_groups() {
    let (mut nodes, _) = collection(0, NodeCollectionOpts::default());
    let (a, b, c) = (item("itemA"), item("itemB"), item("itemC"));
    let mut ids = IdTable::new();
    ids.insert_single("a", a.clone())
        .insert_group("group", vec![b.clone(), c.clone()]);

    let mut ctx = nodes.begin(None::<ListSequence<Rc<str>>>, Some(&ids));
    let Some(Lookup::Node(node)) = ctx.by_id("a") else {
        panic!("expected node for 'a'");
    };
    let serial_a = node.serial;

    let Some(Lookup::Group(group)) = ctx.by_id("group") else {
        panic!("expected group for 'group'");
    };
    assert_eq!(group.len(), 2);
    let serials: Vec<u32> = group
        .iter()
        .map(|r| ctx.by_array_element(r).serial)
        .collect();
    ctx.set(SetTarget::Id("a"), "styled");
    drop(ctx);

    assert_eq!(serials, vec![2, 3]);
    assert_eq!(nodes.len(), 3);
    let entry_a = nodes.find_by_renderable(&a).unwrap();
    assert_eq!(entry_a.node().serial, serial_a);
    assert_eq!(entry_a.node().props, Some("styled"));
    assert!(nodes.find_by_renderable(&c).unwrap().is_invalidated());
}

#[test]
fn pooled_nodes_are_recycled() {
    let opts = NodeCollectionOpts {
        pool_capacity: 1,
        ..NodeCollectionOpts::default()
    };
    let (mut nodes, _) = collection(0, opts);
    let (a, b, c, d) = (item("a"), item("b"), item("c"), item("d"));

    pass(&mut nodes, &[a.clone(), b, c]);
    pass(&mut nodes, &[a.clone()]);
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes.pooled(), 1);
    assert_eq!(nodes.stats().destroyed, 2);

    pass(&mut nodes, &[a, d]);
    assert_eq!(nodes.stats().recycled, 1);
    assert_eq!(nodes.stats().created, 0);
    assert_eq!(nodes.factory().recycled, 1);
    assert_eq!(nodes.pooled(), 0);
    assert_eq!(nodes.len(), 2);
}

#[test]
fn fade_node_fetched_without_set_keeps_identity() {
    let mut nodes = NodeCollection::new(FadeFactory::default());
    let a = item("a");

    for _ in 0..3 {
        let mut ctx = nodes.begin(Some(ListSequence::new(vec![a.clone()])), None);
        while ctx.next().is_some() {}
        drop(ctx);
        nodes.mark_remaining(&ExitTransition::default());
        let specs = nodes.finalize_and_purge();
        assert_eq!(specs.len(), 1);
        assert!(!specs[0].exiting);
    }
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes.factory().built(), 1);
    assert_eq!(nodes.stats().destroyed, 0);
}
