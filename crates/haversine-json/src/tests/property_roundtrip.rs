use quickcheck::QuickCheck;

use super::arbitrary::{GrammarString, Node, RootObject};
use crate::{INITIAL_CAPACITY, ObjectRef, ParserOptions, ValueRef, parse};

fn close(expected: f64, actual: f64) -> bool {
    let diff = if expected > actual {
        expected - actual
    } else {
        actual - expected
    };
    diff <= 1e-12 * if expected > 1.0 { expected } else { 1.0 }
}

fn capacity_fits(len: usize, capacity: usize) -> bool {
    capacity >= len
        && capacity % INITIAL_CAPACITY == 0
        && (capacity / INITIAL_CAPACITY).is_power_of_two()
}

fn node_matches(node: &Node, value: ValueRef<'_>) -> bool {
    match (node, value) {
        (Node::Number(n), ValueRef::Number(v)) => close(n.value(), v),
        (Node::String(s), ValueRef::String(v)) => v == s.0.as_str(),
        (Node::Object(members), ValueRef::Object(object)) => members_match(members, object),
        (Node::Array(items), ValueRef::Array(array)) => {
            items.len() == array.len()
                && capacity_fits(array.len(), array.capacity())
                && items
                    .iter()
                    .zip(array.iter())
                    .all(|(node, value)| node_matches(node, value))
        }
        _ => false,
    }
}

fn members_match(members: &[(GrammarString, Node)], object: ObjectRef<'_>) -> bool {
    members.len() == object.len()
        && capacity_fits(object.len(), object.capacity())
        && members
            .iter()
            .zip(object.iter())
            .all(|((key, node), (name, value))| name == key.0.as_str() && node_matches(node, value))
}

/// Property: rendering a tree to text and parsing it back yields the same
/// keys in the same order, the same array order, the same string bytes and
/// numerically equal numbers.
#[test]
fn parse_roundtrip_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(root: RootObject) -> bool {
        let src = root.render();
        match parse(src.as_bytes(), ParserOptions::default()) {
            Ok(doc) => members_match(&root.members, doc.root()),
            Err(_) => false,
        }
    }

    #[cfg(not(miri))]
    let tests = if is_ci::cached() { 10_000 } else { 1_000 };
    #[cfg(miri)]
    let tests = 10;

    QuickCheck::new()
        .tests(tests)
        .quickcheck(prop as fn(RootObject) -> bool);
}
