use super::*;

fn rose_abc() -> GraphWithInverses {
    GraphWithInverses::rose(Alphabet::from_chars("abc").unwrap())
}

/// Two vertices joined by `b`, loops `a` at 0 and `c` at 1.
fn theta_like() -> GraphWithInverses {
    let alphabet = Alphabet::from_chars("abc").unwrap();
    let initial = vec![
        VertexId(0), // a
        VertexId(0), // A
        VertexId(0), // b
        VertexId(1), // B
        VertexId(1), // c
        VertexId(1), // C
    ];
    GraphWithInverses::new(alphabet, initial).unwrap()
}

#[test]
fn endpoints_respect_involution() {
    let g = theta_like();
    let a = g.alphabet().letter("a").unwrap();
    let b = g.alphabet().letter("b").unwrap();
    assert_eq!(g.initial_vertex(b), VertexId(0));
    assert_eq!(g.terminal_vertex(b), VertexId(1));
    assert_eq!(g.initial_vertex(b.inverse()), g.terminal_vertex(b));
    assert_eq!(g.terminal_vertex(a), VertexId(0));
    assert_eq!(g.num_vertices(), 2);
}

#[test]
fn turns_enumerate_unordered_germ_pairs() {
    let g = rose_abc();
    let turns = g.turns();
    // 6 germs at the single vertex: C(6,2) pairs.
    assert_eq!(turns.len(), 15);
    for t in &turns {
        assert!(t.a < t.b);
        assert_eq!(g.initial_vertex(t.a), g.initial_vertex(t.b));
    }
}

#[test]
fn paths_check_continuity() {
    let g = theta_like();
    assert!(g.path_from_str("abc").is_ok());
    assert!(g.path_from_str("ba").is_err());
    let p = g.path_from_str("abc").unwrap();
    assert_eq!(g.reverse_path(&p).display(g.alphabet()), "CBA");
}

#[test]
fn reduce_path_cancels() {
    let g = rose_abc();
    let raw = Word::from_reduced(vec![
        g.alphabet().letter("a").unwrap(),
        g.alphabet().letter("b").unwrap(),
    ]);
    let back = raw.product(&raw.inverse());
    assert!(g.reduce_path(&back).is_empty());
}

#[test]
fn spanning_tree_reaches_all_vertices() {
    let g = theta_like();
    let tree = g.spanning_tree(VertexId(0));
    assert!(tree.iter().all(|p| p.is_some()));
    let to1 = tree[1].clone().unwrap();
    assert_eq!(to1.display(g.alphabet()), "b");
}

#[test]
fn fold_two_partial_edges() {
    let g = rose_abc();
    let a = g.alphabet().letter("a").unwrap();
    let b = g.alphabet().letter("b").unwrap();
    let (h, subst) = g.fold(&[], &[a, b]).unwrap();
    // a and b are subdivided; alphabet gains the shared edge and two
    // residuals: c + new edge + 2 residuals.
    assert_eq!(h.alphabet().rank(), 4);
    assert_eq!(h.num_vertices(), 2);
    let ia = subst.apply_letter(a);
    let ib = subst.apply_letter(b);
    assert_eq!(ia.len(), 2);
    assert_eq!(ib.len(), 2);
    assert_eq!(ia[0], ib[0]);
    assert_ne!(ia[1], ib[1]);
    assert!(h.is_path(&ia) && h.is_path(&ib));
    // c survives untouched.
    let c = g.alphabet().letter("c").unwrap();
    assert_eq!(subst.apply_letter(c).len(), 1);
}

#[test]
fn fold_full_edge_merges_vertices() {
    let g = theta_like();
    let b = g.alphabet().letter("b").unwrap();
    let a = g.alphabet().letter("a").unwrap();
    // Fold the whole of b with an initial segment of a: the far vertex of b
    // merges with the subdivision point.
    let (h, subst) = g.fold(&[b], &[a]).unwrap();
    assert_eq!(subst.apply_letter(b).len(), 1);
    assert_eq!(subst.apply_letter(a).len(), 2);
    assert_eq!(subst.apply_letter(a)[0], subst.apply_letter(b)[0]);
    // vertices: 0 and the merged tip (old vertex 1).
    assert_eq!(h.num_vertices(), 2);
    assert!(h.is_path(&subst.apply_letter(a)));
}

#[test]
fn fold_loop_at_both_ends() {
    let g = rose_abc();
    let a = g.alphabet().letter("a").unwrap();
    let (h, subst) = g.fold(&[], &[a, a.inverse()]).unwrap();
    let ia = subst.apply_letter(a);
    assert_eq!(ia.len(), 3);
    assert_eq!(ia[2], ia[0].inverse());
    assert!(h.is_path(&ia));
    assert_eq!(h.terminal_vertex(ia[1]), h.initial_vertex(ia[1]));
}

#[test]
fn fold_rejects_mismatched_germs() {
    let g = theta_like();
    let a = g.alphabet().letter("a").unwrap();
    let c = g.alphabet().letter("c").unwrap();
    assert!(g.fold(&[], &[a, c]).is_err());
}

#[test]
fn blow_up_vertices_inserts_class_edges() {
    let g = rose_abc();
    let al = g.alphabet();
    let (a, b, c) = (
        al.letter("a").unwrap(),
        al.letter("b").unwrap(),
        al.letter("c").unwrap(),
    );
    let comps = vec![
        vec![a, b, c.inverse()],
        vec![a.inverse(), c, b.inverse()],
    ];
    let (h, subst) = g.blow_up_vertices(&comps).unwrap();
    assert_eq!(h.alphabet().rank(), 5);
    assert_eq!(h.num_vertices(), 3);
    let ia = subst.apply_letter(a);
    // a is re-rooted on both sides.
    assert_eq!(ia.len(), 3);
    assert!(h.is_path(&ia));
    // The old letters keep their ids, so the witness stays readable.
    assert_eq!(ia[1], a);
}

#[test]
fn contract_edges_merges_endpoints() {
    let g = theta_like();
    let b = g.alphabet().letter("b").unwrap();
    let (h, subst) = g.contract_edges(&[b]).unwrap();
    assert_eq!(h.num_vertices(), 1);
    assert_eq!(h.alphabet().rank(), 2);
    assert!(subst.apply_letter(b).is_empty());
    let a = g.alphabet().letter("a").unwrap();
    assert_eq!(subst.apply_letter(a).len(), 1);
}

#[test]
fn contract_rejects_cycles() {
    let g = rose_abc();
    let a = g.alphabet().letter("a").unwrap();
    assert!(g.contract_edges(&[a]).is_err());
}

#[test]
fn subst_composition() {
    let g = rose_abc();
    let a = g.alphabet().letter("a").unwrap();
    let b = g.alphabet().letter("b").unwrap();
    let id = EdgeSubst::identity(g.alphabet());
    assert!(id.is_identity());
    let (h, s1) = g.fold(&[], &[a, b]).unwrap();
    let composed = id.then(&s1);
    assert_eq!(composed, s1);
    // fold again in the new graph and compose witnesses
    let germs = h.outgoing(VertexId(1));
    let (_, s2) = h.fold(&[], &[germs[0], germs[1]]).unwrap();
    let total = s1.then(&s2);
    assert_eq!(total.apply_letter(a), s2.apply(&s1.apply_letter(a)));
}
