use rstest::rstest;
use treepath::ScopedMap;

type Map = ScopedMap<String, String>;

fn bind(map: &Map, pairs: &[(&str, &str)]) -> Map {
    map.enter_scope(pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())))
}

fn get(map: &Map, key: &str) -> Option<String> {
    map.get(key)
}

#[rstest]
fn parent_does_not_see_child_bindings() {
    let root = Map::new();
    let outer = bind(&root, &[("a", "b"), ("c", "d")]);
    let inner = bind(&outer, &[("e", "f")]);
    assert_eq!(get(&inner, "e").as_deref(), Some("f"));
    assert_eq!(get(&outer, "e"), None);
    assert_eq!(get(&root, "a"), None);
}

#[rstest]
fn child_sees_parent_bindings() {
    let outer = bind(&Map::new(), &[("a", "b"), ("c", "d")]);
    let inner = bind(&outer, &[("c", "x")]);
    assert_eq!(get(&inner, "a").as_deref(), Some("b"));
    assert_eq!(get(&inner, "c").as_deref(), Some("x"));
    assert_eq!(get(&outer, "c").as_deref(), Some("d"));
}

#[rstest]
fn unbound_keys_are_absent() {
    let map = bind(&bind(&Map::new(), &[("a", "1")]), &[("b", "2")]);
    assert_eq!(get(&map, "zz"), None);
    assert!(!map.contains_key("zz"));
    assert!(map.contains_key("a"));
}

#[rstest]
fn dropping_a_child_restores_the_parent_view() {
    let outer = bind(&Map::new(), &[("k", "outer")]);
    let inner = bind(&outer, &[("k", "inner")]);
    assert_eq!(get(&inner, "k").as_deref(), Some("inner"));
    drop(inner);
    assert_eq!(get(&outer, "k").as_deref(), Some("outer"));
}

#[rstest]
fn leaf_maps_are_isolated() {
    let s0 = bind(&Map::new(), &[("a", "b"), ("c", "d")]);
    let s1 = bind(&s0, &[("a", "e")]);
    let s11 = bind(&s1, &[("a", "g"), ("c", "h")]);
    let s2 = bind(&s0, &[("a", "i")]);
    let s21 = bind(&s2, &[("a", "k"), ("c", "l")]);

    assert_eq!(get(&s11, "a").as_deref(), Some("g"));
    assert_eq!(get(&s11, "c").as_deref(), Some("h"));
    assert_eq!(get(&s1, "c").as_deref(), Some("d"));
    assert_eq!(get(&s21, "a").as_deref(), Some("k"));
    assert_eq!(get(&s2, "a").as_deref(), Some("i"));
    assert_eq!(get(&s2, "c").as_deref(), Some("d"));
}

#[rstest]
fn dropping_an_ancestor_handle_before_adding_leaves() {
    let s11;
    let s21;
    {
        let s0 = bind(&Map::new(), &[("a", "b"), ("c", "d")]);
        let s1 = bind(&s0, &[("a", "e")]);
        let s2 = bind(&s0, &[("a", "i")]);
        s11 = bind(&s1, &[("c", "h")]);
        s21 = bind(&s2, &[("c", "l")]);
    }
    let s12 = bind(&s11, &[("a", "o")]);
    let s22 = bind(&s21, &[("a", "q")]);

    assert_eq!(get(&s11, "a").as_deref(), Some("e"));
    assert_eq!(get(&s11, "c").as_deref(), Some("h"));
    assert_eq!(get(&s12, "a").as_deref(), Some("o"));
    assert_eq!(get(&s21, "a").as_deref(), Some("i"));
    assert_eq!(get(&s22, "a").as_deref(), Some("q"));
    assert_eq!(get(&s22, "c").as_deref(), Some("l"));
}

#[rstest]
fn dropping_the_middle_of_several_chains() {
    let s0 = bind(&Map::new(), &[("a", "b"), ("c", "d")]);
    let s11;
    let s21;
    let s22;
    {
        let s1 = bind(&s0, &[("a", "e")]);
        s11 = bind(&s1, &[("a", "g"), ("c", "h")]);
        let s2 = bind(&s0, &[("a", "i")]);
        s21 = bind(&s2, &[("a", "k"), ("c", "l")]);
        s22 = bind(&s0, &[("a", "m"), ("c", "n")]);
    }
    let s12 = bind(&s11, &[("a", "o"), ("c", "p")]);
    let s23 = bind(&s22, &[("a", "q"), ("c", "r")]);

    assert_eq!(get(&s0, "a").as_deref(), Some("b"));
    assert_eq!(get(&s0, "c").as_deref(), Some("d"));
    assert_eq!(get(&s11, "a").as_deref(), Some("g"));
    assert_eq!(get(&s11, "c").as_deref(), Some("h"));
    assert_eq!(get(&s12, "a").as_deref(), Some("o"));
    assert_eq!(get(&s12, "c").as_deref(), Some("p"));
    assert_eq!(get(&s21, "a").as_deref(), Some("k"));
    assert_eq!(get(&s21, "c").as_deref(), Some("l"));
    assert_eq!(get(&s22, "a").as_deref(), Some("m"));
    assert_eq!(get(&s22, "c").as_deref(), Some("n"));
    assert_eq!(get(&s23, "a").as_deref(), Some("q"));
    assert_eq!(get(&s23, "c").as_deref(), Some("r"));
}

#[rstest]
fn dropping_an_entire_chain() {
    let s21;
    let s22;
    {
        let s0 = bind(&Map::new(), &[("a", "b"), ("c", "d")]);
        let s1 = bind(&s0, &[("a", "e"), ("c", "f"), ("z", "a")]);
        let s11 = bind(&s1, &[("a", "g"), ("c", "h"), ("z", "b")]);
        let _s12 = bind(&s11, &[("a", "o"), ("c", "p"), ("z", "c")]);
        let s2 = bind(&s0, &[("a", "i"), ("c", "j")]);
        s21 = bind(&s2, &[("a", "k"), ("c", "l")]);
        s22 = bind(&s21, &[("a", "m"), ("c", "n")]);
    }
    let s23 = bind(&s22, &[("a", "o"), ("c", "p")]);
    let s24 = bind(&s23, &[("a", "q"), ("c", "r")]);
    let s3 = bind(&s21, &[("a", "s"), ("c", "t")]);
    let s31 = bind(&s3, &[("z", "d")]);

    for (map, a, c) in [(&s21, "k", "l"), (&s22, "m", "n"), (&s23, "o", "p"), (&s24, "q", "r"), (&s3, "s", "t")] {
        assert_eq!(get(map, "a").as_deref(), Some(a));
        assert_eq!(get(map, "c").as_deref(), Some(c));
        assert_eq!(get(map, "z"), None);
    }
    assert_eq!(get(&s31, "z").as_deref(), Some("d"));
}

#[rstest]
fn siblings_do_not_share_bindings() {
    let parent = bind(&Map::new(), &[("k", "parent")]);
    let left = bind(&parent, &[("k", "left"), ("only_left", "1")]);
    let right = bind(&parent, &[("only_right", "2")]);
    assert_eq!(get(&right, "k").as_deref(), Some("parent"));
    assert_eq!(get(&right, "only_left"), None);
    assert_eq!(get(&left, "only_right"), None);
    drop(left);
    assert_eq!(get(&right, "k").as_deref(), Some("parent"));
    assert_eq!(get(&right, "only_right").as_deref(), Some("2"));
}

#[rstest]
fn reassigning_a_handle_keeps_the_chain() {
    let s1 = bind(&Map::new(), &[("a", "b"), ("c", "d")]);
    let s3;
    {
        let s2 = bind(&s1, &[("e", "f"), ("g", "h")]);
        s3 = bind(&s2, &[("i", "j"), ("k", "l")]);
    }
    assert_eq!(get(&s1, "a").as_deref(), Some("b"));
    assert_eq!(get(&s3, "a").as_deref(), Some("b"));
    assert_eq!(get(&s3, "e").as_deref(), Some("f"));
    assert_eq!(get(&s3, "i").as_deref(), Some("j"));

    let copy = s3.clone();
    drop(s3);
    assert_eq!(get(&copy, "g").as_deref(), Some("h"));
    assert_eq!(get(&copy, "k").as_deref(), Some("l"));
}

#[rstest]
fn equality_compares_visible_bindings() {
    let root = Map::new();
    let a = bind(&root, &[("p", "1"), ("q", "2")]);
    let b = bind(&bind(&root, &[("p", "1")]), &[("q", "2")]);
    let c = bind(&a, &[]);
    assert_eq!(a, b);
    assert_eq!(a, c);
    assert_ne!(a, bind(&a, &[("q", "3")]));
    assert_eq!(a.bindings().len(), 2);
    assert_eq!(b.depth(), 2);
    assert!(root.is_empty());
    assert!(!a.is_empty());
}
