use alloc::{string::ToString, vec, vec::Vec};

use super::*;

fn three_kids(tree: &mut Tree) -> (NodeId, [NodeId; 3]) {
    let root = tree.new_node(0, "");
    let a = tree.add(root, 1, "").unwrap();
    let b = tree.add(root, 2, "").unwrap();
    let c = tree.add(root, 3, "").unwrap();
    (root, [a, b, c])
}

fn nested(tree: &mut Tree) -> NodeId {
    let root = tree.new_node(0, "");
    for kind in [1, 2, 3] {
        let child = tree.add(root, kind, "").unwrap();
        tree.add(child, kind * 11, "").unwrap();
    }
    root
}

/// Every link in the subtree agrees with its counterpart.
fn assert_consistent(tree: &Tree, root: NodeId) {
    tree.walk_levels(root, |n| {
        let id = n.id();
        let kids = tree.nodes(id);
        assert_eq!(kids.len(), tree.count(id), "count of {id}");
        assert_eq!(kids.first().copied(), tree.first_child(id));
        assert_eq!(kids.last().copied(), tree.last_child(id));
        for (i, &k) in kids.iter().enumerate() {
            assert_eq!(tree.parent(k), Some(id));
            assert_eq!(tree.left(k), i.checked_sub(1).map(|j| kids[j]));
            assert_eq!(tree.right(k), kids.get(i + 1).copied());
        }
        assert!(tree.value(id).is_empty() || kids.is_empty(), "{id} is leaf and branch");
    });
}

#[test]
fn new_and_init() {
    let mut tree = Tree::new();
    let n = tree.new_node(0, "");
    assert_eq!(tree.to_json(n), r#"{"T":0}"#);
    tree.set_value(n, "something").unwrap();
    assert_eq!(tree.to_json(n), r#"{"T":0,"V":"something"}"#);
    tree.init(n);
    assert_eq!(tree.to_json(n), r#"{"T":0}"#);
}

#[test]
fn init_detaches_children_and_keeps_position() {
    let mut tree = Tree::new();
    let root = nested(&mut tree);
    let middle = tree.nodes(root)[1];
    let grandchild = tree.nodes(middle)[0];
    tree.init(middle);
    assert_eq!(tree.parent(middle), Some(root));
    assert_eq!(tree.count(middle), 0);
    assert_eq!(tree.parent(grandchild), None);
    assert_eq!(
        tree.to_json(root),
        r#"{"T":0,"N":[{"T":1,"N":[{"T":11}]},{"T":0},{"T":3,"N":[{"T":33}]}]}"#
    );
    assert_consistent(&tree, root);
}

#[test]
fn add_maintains_links_and_count() {
    let mut tree = Tree::new();
    let n = tree.new_node(0, "");
    assert_eq!(tree.parent(n), None);
    let u = tree.add(n, 1, "").unwrap();
    assert_eq!(tree.count(n), 1);
    assert_eq!(tree.parent(u), Some(n));
    assert_eq!(tree.count(u), 0);

    tree.add(n, 2, "").unwrap();
    let m = tree.add(n, 3, "").unwrap();
    tree.add(m, 3, "").unwrap();
    tree.add(m, 3, "").unwrap();
    assert_eq!(tree.count(m), 2);
    assert_eq!(tree.count(n), 3);
    assert_eq!(
        tree.to_json(n),
        r#"{"T":0,"N":[{"T":1},{"T":2},{"T":3,"N":[{"T":3},{"T":3}]}]}"#
    );
    assert_consistent(&tree, n);
}

#[test]
fn leaf_rejects_children() {
    let mut tree = Tree::new();
    let n = tree.new_node(0, "");
    let u = tree.add(n, 1, "something").unwrap();
    assert_eq!(tree.add(u, 9001, "muhaha"), Err(NodeError::ChildUnderLeaf(u)));
    assert_eq!(tree.count(u), 0);
    assert_eq!(tree.value(u), "something");
    // the failed add allocated nothing
    assert_eq!(tree.len(), 2);
}

#[test]
fn branch_rejects_value() {
    let mut tree = Tree::new();
    let n = tree.new_node(0, "");
    tree.add(n, 1, "").unwrap();
    assert_eq!(tree.set_value(n, "x"), Err(NodeError::ValueOnBranch(n)));
    assert_eq!(tree.set_value(n, ""), Ok(()));
    assert_eq!(tree.value(n), "");
}

#[test]
fn cut_middle() {
    let mut tree = Tree::new();
    let (root, [_, b, _]) = three_kids(&mut tree);
    assert_eq!(tree.to_json(root), r#"{"T":0,"N":[{"T":1},{"T":2},{"T":3}]}"#);
    assert_eq!(tree.count(root), 3);
    let x = tree.cut(b);
    assert_eq!(x, b);
    assert_eq!(tree.to_json(root), r#"{"T":0,"N":[{"T":1},{"T":3}]}"#);
    assert_eq!(tree.count(root), 2);
    assert_eq!(tree.to_json(x), r#"{"T":2}"#);
    assert_eq!((tree.parent(x), tree.left(x), tree.right(x)), (None, None, None));
    assert_consistent(&tree, root);
}

#[test]
fn cut_first_and_last() {
    let mut tree = Tree::new();
    let (root, [a, _, c]) = three_kids(&mut tree);
    tree.cut(a);
    assert_eq!(tree.to_json(root), r#"{"T":0,"N":[{"T":2},{"T":3}]}"#);
    assert_eq!(tree.to_json(a), r#"{"T":1}"#);
    tree.cut(c);
    assert_eq!(tree.to_json(root), r#"{"T":0,"N":[{"T":2}]}"#);
    assert_eq!(tree.to_json(c), r#"{"T":3}"#);
    assert_consistent(&tree, root);
}

#[test]
fn cut_root_is_noop() {
    let mut tree = Tree::new();
    let (root, _) = three_kids(&mut tree);
    let before = tree.to_json(root);
    tree.cut(root);
    assert_eq!(tree.to_json(root), before);
}

#[test]
fn cut_everything_then_append_restores_order() {
    let mut tree = Tree::new();
    let root = nested(&mut tree);
    let before = tree.to_json(root);
    let kids = tree.nodes(root);
    for &k in &kids {
        tree.cut(k);
    }
    assert_eq!(tree.count(root), 0);
    assert_eq!(tree.to_json(root), r#"{"T":0}"#);
    for &k in &kids {
        tree.append(root, k).unwrap();
    }
    assert_eq!(tree.nodes(root), kids);
    assert_eq!(tree.to_json(root), before);
    assert_consistent(&tree, root);
}

#[test]
fn take_moves_all_children() {
    let mut tree = Tree::new();
    let (n, _) = three_kids(&mut tree);
    tree.set_kind(n, 10);
    assert_eq!(tree.to_json(n), r#"{"T":10,"N":[{"T":1},{"T":2},{"T":3}]}"#);

    let m = tree.new_node(20, "");
    assert_eq!(tree.count(m), 0);
    tree.take(m, n).unwrap();
    assert_eq!(tree.to_json(m), r#"{"T":20,"N":[{"T":1},{"T":2},{"T":3}]}"#);
    assert_eq!(tree.count(m), 3);
    assert_eq!(tree.to_json(n), r#"{"T":10}"#);
    assert_eq!(tree.count(n), 0);
    assert_eq!(tree.first_child(n), None);
    assert_eq!(tree.last_child(n), None);
    assert_consistent(&tree, m);
}

#[test]
fn take_reparents_every_moved_child() {
    let mut tree = Tree::new();
    let donor = tree.new_node(1, "");
    for k in 0..50 {
        tree.add(donor, k, "").unwrap();
    }
    let moved = tree.nodes(donor);
    let receiver = tree.new_node(2, "");
    tree.take(receiver, donor).unwrap();
    assert_eq!(tree.nodes(receiver), moved);
    assert!(moved.iter().all(|&c| tree.parent(c) == Some(receiver)));
    assert_eq!(tree.count(receiver), 50);
    assert_eq!(tree.count(donor), 0);
}

#[test]
fn take_appends_after_existing_children() {
    let mut tree = Tree::new();
    let (donor, _) = three_kids(&mut tree);
    let receiver = tree.new_node(7, "");
    tree.add(receiver, 70, "").unwrap();
    tree.take(receiver, donor).unwrap();
    assert_eq!(tree.count(receiver), 4);
    assert_eq!(
        tree.to_json(receiver),
        r#"{"T":7,"N":[{"T":70},{"T":1},{"T":2},{"T":3}]}"#
    );
    assert_consistent(&tree, receiver);
}

#[test]
fn take_guards() {
    let mut tree = Tree::new();
    let (donor, [a, _, _]) = three_kids(&mut tree);
    let leaf = tree.new_node(1, "v");
    assert_eq!(tree.take(leaf, donor), Err(NodeError::ChildUnderLeaf(leaf)));
    assert_eq!(tree.count(donor), 3);

    // taking from an empty donor is fine even for a leaf
    let empty = tree.new_node(0, "");
    assert_eq!(tree.take(leaf, empty), Ok(()));

    // a node cannot adopt the subtree it sits in
    let deep = tree.add(a, 11, "").unwrap();
    assert_eq!(
        tree.take(deep, donor),
        Err(NodeError::Cycle {
            parent: deep,
            child: a
        })
    );
    assert_eq!(tree.take(donor, donor), Ok(()));
    assert_eq!(tree.count(donor), 3);
    assert_consistent(&tree, donor);
}

#[test]
fn append_guards() {
    let mut tree = Tree::new();
    let (root, [a, _, _]) = three_kids(&mut tree);
    assert_eq!(tree.append(root, a), Err(NodeError::AlreadyAttached(a)));
    assert_eq!(
        tree.append(a, root),
        Err(NodeError::Cycle {
            parent: a,
            child: root
        })
    );
    assert_eq!(
        tree.append(root, root),
        Err(NodeError::Cycle {
            parent: root,
            child: root
        })
    );
    let leaf = tree.new_node(5, "x");
    let loose = tree.new_node(6, "");
    assert_eq!(tree.append(leaf, loose), Err(NodeError::ChildUnderLeaf(leaf)));
    tree.append(a, loose).unwrap();
    assert_eq!(tree.parent(loose), Some(a));
}

#[test]
fn walk_levels_is_breadth_first() {
    let mut tree = Tree::new();
    let root = nested(&mut tree);
    let mut seen = Vec::new();
    tree.walk_levels(root, |n| seen.push(n.kind()));
    assert_eq!(seen, [0, 1, 2, 3, 11, 22, 33]);
}

#[test]
fn walk_deep_pre_is_depth_first() {
    let mut tree = Tree::new();
    let root = nested(&mut tree);
    let mut seen = Vec::new();
    tree.walk_deep_pre(root, |n| seen.push(n.kind()));
    assert_eq!(seen, [0, 1, 11, 2, 22, 3, 33]);
}

#[test]
fn walks_handle_deep_chains() {
    let mut tree = Tree::new();
    let root = tree.new_node(0, "");
    let mut tip = root;
    for _ in 0..100_000 {
        tip = tree.add(tip, 1, "").unwrap();
    }
    let mut n = 0;
    tree.walk_deep_pre(root, |_| n += 1);
    assert_eq!(n, 100_001);
    // writer is iterative too
    assert!(tree.to_json(root).ends_with("}]}"));
}

#[test]
fn morph_preserves_identity() {
    let mut tree = Tree::new();
    let n = tree.new_node(0, "");
    tree.add(n, 2, "some").unwrap();
    let m = tree.new_node(0, "");
    tree.morph(m, n);
    assert_eq!(tree.to_json(n), r#"{"T":0,"N":[{"T":2,"V":"some"}]}"#);
    assert_eq!(tree.to_json(m), r#"{"T":0,"N":[{"T":2,"V":"some"}]}"#);

    // the two are independent afterwards
    tree.add(m, 3, "").unwrap();
    assert_eq!(tree.count(n), 1);
    assert_consistent(&tree, m);
}

#[test]
fn morph_keeps_place_under_parent() {
    let mut tree = Tree::new();
    let (root, [_, b, _]) = three_kids(&mut tree);
    let old_child = tree.add(b, 22, "").unwrap();
    let src = tree.new_node(9, "nine");
    tree.morph(b, src);
    assert_eq!(tree.parent(b), Some(root));
    assert_eq!(
        tree.to_json(root),
        r#"{"T":0,"N":[{"T":1},{"T":9,"V":"nine"},{"T":3}]}"#
    );
    assert_eq!(tree.parent(old_child), None);
    assert_consistent(&tree, root);
}

#[test]
fn morph_into_own_descendant() {
    let mut tree = Tree::new();
    let root = nested(&mut tree);
    let first = tree.nodes(root)[0];
    tree.morph(first, root);
    assert_eq!(
        tree.to_json(root),
        r#"{"T":0,"N":[{"T":0,"N":[{"T":1,"N":[{"T":11}]},{"T":2,"N":[{"T":22}]},{"T":3,"N":[{"T":33}]}]},{"T":2,"N":[{"T":22}]},{"T":3,"N":[{"T":33}]}]}"#
    );
    assert_consistent(&tree, root);
}

#[test]
fn copy_is_independent() {
    let mut tree = Tree::new();
    let n = tree.new_node(0, "");
    tree.add(n, 2, "some").unwrap();

    let c = tree.copy(n);
    assert_ne!(c, n);
    let added = tree.add(c, 3, "").unwrap();
    tree.add(added, 4, "deep").unwrap();

    assert_eq!(tree.to_json(n), r#"{"T":0,"N":[{"T":2,"V":"some"}]}"#);
    assert_eq!(
        tree.to_json(c),
        r#"{"T":0,"N":[{"T":2,"V":"some"},{"T":3,"N":[{"T":4,"V":"deep"}]}]}"#
    );
    assert_consistent(&tree, n);
    assert_consistent(&tree, c);
}

#[test]
fn copy_of_attached_node_is_standalone() {
    let mut tree = Tree::new();
    let root = nested(&mut tree);
    let middle = tree.nodes(root)[1];
    let c = tree.copy(middle);
    assert_eq!(tree.parent(c), None);
    assert_eq!(tree.left(c), None);
    assert_eq!(tree.right(c), None);
    assert_eq!(tree.to_json(c), r#"{"T":2,"N":[{"T":22}]}"#);
    let original = tree.nodes(middle)[0];
    let cloned = tree.nodes(c)[0];
    assert_ne!(original, cloned);
    assert_eq!(tree.parent(cloned), Some(c));
    assert_eq!(tree.count(root), 3);
}

#[test]
fn rollback_discards_new_nodes_and_detaches_survivors() {
    let mut tree = Tree::new();
    let (root, [a, _, _]) = three_kids(&mut tree);
    let before = tree.to_json(root);
    let orphan = tree.new_node(8, "");

    let cp = tree.checkpoint();
    let wrapper = tree.add(root, 4, "").unwrap();
    tree.add(wrapper, 41, "x").unwrap();
    tree.append(wrapper, orphan).unwrap();
    tree.add(a, 11, "").unwrap();
    tree.rollback(cp);

    assert_eq!(tree.len(), cp);
    assert_eq!(tree.to_json(root), before);
    assert_eq!(tree.parent(orphan), None);
    assert_eq!(tree.count(a), 0);
    assert_consistent(&tree, root);
}

#[test]
fn json_escapes_controls_but_not_html() {
    let mut tree = Tree::new();
    let n = tree.new_node(0, "<foo>");
    assert_eq!(tree.to_json(n), r#"{"T":0,"V":"<foo>"}"#);

    let n = tree.new_node(-1, "a\"b\\c\n\t\r\u{8}\u{c}\u{1}\u{1f}\u{2028}é👿");
    assert_eq!(
        tree.to_json(n),
        r#"{"T":-1,"V":"a\"b\\c\n\t\r\b\f\u0001\u001f\u2028é👿"}"#
    );
}

#[test]
fn json_scenario_single_leaf_child() {
    let mut tree = Tree::new();
    let n = tree.new_node(0, "");
    tree.add(n, 2, "some").unwrap();
    assert_eq!(tree.to_json(n), r#"{"T":0,"N":[{"T":2,"V":"some"}]}"#);
}

#[test]
fn json_of_inner_node_ignores_its_siblings() {
    let mut tree = Tree::new();
    let (_, [_, b, c]) = three_kids(&mut tree);
    assert_eq!(tree.to_json(b), r#"{"T":2}"#);
    assert_eq!(tree.get(c).to_string(), r#"{"T":3}"#);
}

#[test]
fn serde_serialize_matches_writer() {
    let mut tree = Tree::new();
    let root = nested(&mut tree);
    let first = tree.nodes(root)[0];
    tree.add(tree.nodes(first)[0], 5, "<v\n>").unwrap();
    let via_serde = serde_json::to_string(&tree.get(root)).unwrap();
    assert_eq!(via_serde, tree.to_json(root));
}

#[test]
fn insert_json_round_trips() {
    let mut tree = Tree::new();
    let src = r#"{"T":0,"N":[{"T":1,"N":[{"T":11,"V":"x"}]},{"T":2},{"T":3,"V":"<y>"}]}"#;
    let root = tree.insert_json(src).unwrap();
    assert_eq!(tree.to_json(root), src);
    assert_eq!(tree.parent(root), None);
    assert_consistent(&tree, root);

    let pretty = "{\n  \"T\": 4,\n  \"N\": [ { \"T\": 5, \"V\": \"v\" } ]\n}";
    let id = tree.insert_json(pretty).unwrap();
    assert_eq!(tree.to_json(id), r#"{"T":4,"N":[{"T":5,"V":"v"}]}"#);
}

#[test]
fn insert_json_rejects_bad_shapes() {
    let mut tree = Tree::new();
    tree.new_node(0, "");
    let len = tree.len();

    assert_eq!(
        tree.insert_json(r#"{"T":1,"N":[{"T":2,"V":"a","N":[]}]}"#),
        Err(NodeError::ValueAndNodes)
    );
    assert_eq!(tree.len(), len);

    for bad in [r#"{"V":"a"}"#, r#"{"T":1,"X":2}"#, r#"{"T":"1"}"#, "[", ""] {
        let err = tree.insert_json(bad).unwrap_err();
        assert!(matches!(err, NodeError::Json(_)), "{bad}: {err:?}");
    }
    assert_eq!(tree.len(), len);
}

#[test]
fn children_iterator_and_refs() {
    let mut tree = Tree::new();
    let (root, [a, b, c]) = three_kids(&mut tree);
    let kinds: Vec<i32> = tree.get(root).children().map(NodeRef::kind).collect();
    assert_eq!(kinds, [1, 2, 3]);
    assert_eq!(tree.get(b).parent().map(NodeRef::id), Some(root));
    assert_eq!(
        tree.refs(b),
        "self:  #2           parent: #0\nleft:  #1           right:  #3\nfirst: -            last:   -"
    );
    assert_eq!(tree.nodes(root), vec![a, b, c]);
    assert_eq!(b.to_string(), "#2");
}
