use crate::draw::SeededDraw;
use crate::formula::{BinaryOp, Formula, UnaryOp, ALL, UNARY};

/// Expression tree node. Arity is carried by the variant, so a binary
/// formula can never end up with a single child.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Leaf(Formula),
    Unary(UnaryOp, Box<Node>),
    Binary(BinaryOp, Box<Node>, Box<Node>),
}

impl Node {
    pub fn unary(op: UnaryOp, child: Node) -> Self {
        Node::Unary(op, Box::new(child))
    }

    pub fn binary(op: BinaryOp, left: Node, right: Node) -> Self {
        Node::Binary(op, Box::new(left), Box::new(right))
    }

    pub fn formula(&self) -> Formula {
        match self {
            Node::Leaf(f) => *f,
            Node::Unary(op, _) => Formula::Unary(*op),
            Node::Binary(op, _, _) => Formula::Binary(*op),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    /// Edges on the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        match self {
            Node::Leaf(_) => 0,
            Node::Unary(_, c) => 1 + c.depth(),
            Node::Binary(_, l, r) => 1 + l.depth().max(r.depth()),
        }
    }

    pub fn node_count(&self) -> usize {
        match self {
            Node::Leaf(_) => 1,
            Node::Unary(_, c) => 1 + c.node_count(),
            Node::Binary(_, l, r) => 1 + l.node_count() + r.node_count(),
        }
    }

    /// Pre-order formula names, space separated. Two trees with the same
    /// dump have the same shape and labels.
    pub fn preorder(&self) -> String {
        let mut out = Vec::with_capacity(self.node_count());
        self.collect_preorder(&mut out);
        out.join(" ")
    }

    fn collect_preorder(&self, out: &mut Vec<&'static str>) {
        out.push(self.formula().name());
        match self {
            Node::Leaf(_) => {}
            Node::Unary(_, c) => c.collect_preorder(out),
            Node::Binary(_, l, r) => {
                l.collect_preorder(out);
                r.collect_preorder(out);
            }
        }
    }
}

/// Build a random tree for `(seed, generations)`.
pub fn build(seed: u32, generations: u32) -> Node {
    let mut draw = SeededDraw::new(seed);
    let root = draw.pick(&ALL);
    let tree = grow(root, generations as i64 - 1, &mut draw);
    log::debug!(
        "tree built: seed={} generations={} nodes={} depth={} draws={}",
        seed,
        generations,
        tree.node_count(),
        tree.depth(),
        draw.draws()
    );
    tree
}

fn grow(formula: Formula, remaining: i64, draw: &mut SeededDraw) -> Node {
    if remaining < 0 {
        return Node::Leaf(formula);
    }

    match formula {
        Formula::Unary(op) => {
            let child = if remaining > 0 {
                let f = draw.pick(&ALL);
                grow(f, remaining - 1, draw)
            } else {
                // final ply: unary leaves only
                Node::Leaf(draw.pick(&UNARY))
            };
            Node::unary(op, child)
        }
        Formula::Binary(op) => {
            if remaining > 0 {
                // both labels are drawn before either subtree grows
                let lf = draw.pick(&ALL);
                let rf = draw.pick(&ALL);
                let left = grow(lf, remaining - 1, draw);
                let right = grow(rf, remaining - 1, draw);
                Node::binary(op, left, right)
            } else {
                let lf = draw.pick(&UNARY);
                let rf = draw.pick(&UNARY);
                Node::binary(op, Node::Leaf(lf), Node::Leaf(rf))
            }
        }
    }
}
