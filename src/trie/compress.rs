//! Subtree deduplication: raw tree to minimal DAG.

use std::collections::HashMap;

use super::builder::TrieBuilder;
use super::{Node, NodeTable};

/// Content-addressed memo: masks plus canonical child ids identify a
/// subtree.
type Memo = HashMap<(u16, u16, Vec<u32>), u32, ahash::RandomState>;

/// Collapse the builder's raw tree into a minimal DAG.
///
/// Two nodes are equivalent when their masks match and every corresponding
/// child pair is recursively equivalent; each distinct subtree is visited
/// once and emitted once. Nodes detached during building are dropped here,
/// since only the reachable tree is walked. The result is deterministic for
/// a given input range set: node 0 is the root and the remaining nodes
/// follow in breadth-first order.
pub fn compress(builder: &TrieBuilder) -> NodeTable {
    let mut memo = Memo::default();
    let mut interim: Vec<Node> = Vec::new();
    let root = canonicalize(builder, 0, &mut memo, &mut interim);

    log::debug!(
        "compressed {} raw nodes to {} canonical nodes",
        builder.node_count(),
        interim.len()
    );

    NodeTable::new(renumber(&interim, root))
}

/// Post-order walk assigning one canonical id per distinct subtree.
fn canonicalize(builder: &TrieBuilder, index: usize, memo: &mut Memo, out: &mut Vec<Node>) -> u32 {
    let children: Vec<u32> = builder
        .raw_children(index)
        .map(|child| canonicalize(builder, child, memo, out))
        .collect();

    let has_child = builder.raw_has_child(index);
    let set_child = builder.raw_set_child(index);

    *memo
        .entry((has_child, set_child, children.clone()))
        .or_insert_with(|| {
            out.push(Node {
                has_child,
                set_child,
                children,
            });
            (out.len() - 1) as u32
        })
}

/// Reorder canonical nodes breadth-first from the root, remapping child
/// references, so the root lands at index 0.
fn renumber(interim: &[Node], root: u32) -> Vec<Node> {
    const UNSEEN: u32 = u32::MAX;

    let mut map = vec![UNSEEN; interim.len()];
    let mut order = vec![root];
    map[root as usize] = 0;

    let mut head = 0;
    while head < order.len() {
        let id = order[head] as usize;
        head += 1;
        for &child in &interim[id].children {
            if map[child as usize] == UNSEEN {
                map[child as usize] = order.len() as u32;
                order.push(child);
            }
        }
    }

    order
        .iter()
        .map(|&id| {
            let node = &interim[id as usize];
            Node {
                has_child: node.has_child,
                set_child: node.set_child,
                children: node.children.iter().map(|&c| map[c as usize]).collect(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trie::Family;
    use ipnet::Ipv4Net;

    fn builder(ranges: &[&str]) -> TrieBuilder {
        let mut b = TrieBuilder::new(Family::V4);
        for r in ranges {
            b.insert_v4(&r.parse::<Ipv4Net>().unwrap()).unwrap();
        }
        b
    }

    #[test]
    fn test_root_is_index_zero() {
        let table = compress(&builder(&["2.0.0.0/12"]));
        assert!(!table.is_empty());
        // Root keeps the shape the builder gave it.
        assert_eq!(table.nodes()[0].has_child, 1 << 0);
        assert_eq!(table.nodes()[0].set_child, 0);
    }

    #[test]
    fn test_identical_subtrees_are_shared() {
        // 10.16.0.0/16 and 10.32.0.0/16 diverge at the third nibble and
        // end in structurally identical leaves below it.
        let b = builder(&["10.16.0.0/16", "10.32.0.0/16"]);
        let table = compress(&b);
        assert!(table.len() < b.node_count());

        let d1 = table.nodes()[0].child(0).unwrap();
        let d2 = table.nodes()[d1 as usize].child(0xa).unwrap();
        let branch = &table.nodes()[d2 as usize];
        // Both branches point at the same shared leaf.
        assert_eq!(branch.child(1).unwrap(), branch.child(2).unwrap());
    }

    #[test]
    fn test_compressed_not_larger_than_raw() {
        let b = builder(&["10.16.0.0/16", "10.32.0.0/16", "192.168.0.0/16"]);
        let table = compress(&b);
        assert!(table.len() <= b.node_count());
    }

    #[test]
    fn test_duplicate_free_tree_keeps_node_count() {
        // A single aligned prefix produces a pure path with no repeated
        // subtree, so nothing can be deduplicated.
        let b = builder(&["2.0.0.0/12"]);
        let table = compress(&b);
        assert_eq!(table.len(), b.node_count());
    }

    #[test]
    fn test_deterministic_output() {
        let a = compress(&builder(&["2.0.0.0/12", "5.44.0.0/14", "9.9.9.9/32"]));
        let b = compress(&builder(&["9.9.9.9/32", "2.0.0.0/12", "5.44.0.0/14"]));
        assert_eq!(a, b);
    }

    #[test]
    fn test_detached_nodes_are_dropped() {
        // The /16 builds deep structure that the /8 later replaces with a
        // flat leaf; the orphaned chain must not survive compression.
        let b = builder(&["10.1.0.0/16", "10.0.0.0/8"]);
        let only_wide = builder(&["10.0.0.0/8"]);
        assert_eq!(compress(&b), compress(&only_wide));
    }

    #[test]
    fn test_all_references_in_bounds_and_masks_disjoint() {
        let table = compress(&builder(&["2.0.0.0/12", "5.44.0.0/14", "10.0.0.0/8"]));
        for node in table.nodes() {
            assert_eq!(node.has_child & node.set_child, 0);
            assert_eq!(node.children.len(), node.has_child.count_ones() as usize);
            for &child in &node.children {
                assert!((child as usize) < table.len());
            }
        }
    }
}
