use crate::tree::Node;

/// Raw value of `node` at pixel `(x, y)`. Unbounded; see
/// [`crate::color::normalize`].
pub fn evaluate(node: &Node, x: f64, y: f64, width: f64, height: f64) -> f64 {
    match node {
        Node::Leaf(f) => {
            if f.samples_x() {
                x / width
            } else {
                y / height
            }
        }
        Node::Unary(op, child) => op.apply(evaluate(child, x, y, width, height)),
        Node::Binary(op, left, right) => {
            let l = evaluate(left, x, y, width, height);
            let r = evaluate(right, x, y, width, height);
            op.apply(l, r)
        }
    }
}
