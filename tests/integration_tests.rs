//! End-to-end tests of the public rendering surface: built-in container
//! forms, hierarchy-aware resolution, suppression, recursion bounding, and
//! the propagation overrides.

use std::{
    cell::OnceCell,
    collections::{BTreeMap, BTreeSet, VecDeque},
    rc::Rc,
    sync::atomic::{AtomicUsize, Ordering},
};

use glimpse::{
    FnStrategy, Identity, Items, Lineage, Renderer, ReprError, RoutineId, Value, basic_repr, kinds,
    render,
};

macro_rules! declare_lineage {
    ($ty:ident => [$($ancestor:ty),*]) => {
        struct $ty;

        impl Value for $ty {
            fn lineage(&self) -> Lineage {
                Lineage::of::<Self>()$(.base::<$ancestor>())*
            }
        }
    };
}

#[test]
fn test_scalars_render_natively() {
    assert_eq!(render(&5i64), "5");
    assert_eq!(render(&-3i32), "-3");
    assert_eq!(render(&1.5f64), "1.5");
    assert_eq!(render(&true), "true");
    assert_eq!(render(&'a'), "'a'");
}

#[test]
fn test_list_truncates_after_six_elements() {
    assert_eq!(render(&Vec::<i64>::new()), "[]");
    assert_eq!(render(&vec![1i64, 2, 3]), "[1, 2, 3]");

    let repeated: Vec<i64> = [1i64, 2, 3].repeat(10);
    assert_eq!(render(&repeated), "[1, 2, 3, 1, 2, 3, ...]");
}

#[test]
fn test_arrays_render_like_sequences() {
    assert_eq!(render(&[1i64, 2, 3]), "[1, 2, 3]");
    assert_eq!(render(&[0i64; 10]), "[0, 0, 0, 0, 0, 0, ...]");
}

#[test]
fn test_maxparts_boundary_is_exact() {
    let six: Vec<i64> = (0..6).collect();
    assert_eq!(render(&six), "[0, 1, 2, 3, 4, 5]");

    let seven: Vec<i64> = (0..7).collect();
    assert_eq!(render(&seven), "[0, 1, 2, 3, 4, 5, ...]");
}

#[test]
fn test_tuples() {
    assert_eq!(render(&()), "()");
    assert_eq!(render(&(1i64,)), "(1,)");
    assert_eq!(render(&(1i64, 2i64, 3i64)), "(1, 2, 3)");
    assert_eq!(render(&(1i64, "two", 3.0f64)), "(1, \"two\", 3.0)");
}

#[test]
fn test_tuple_shaped_value_truncates() {
    struct Row(Vec<i64>);

    impl Value for Row {
        fn lineage(&self) -> Lineage {
            Lineage::of::<Self>().base::<kinds::Tuple>()
        }

        fn items(&self) -> Items<'_> {
            Items::Sequence(Box::new(self.0.iter().map(|item| item as &dyn Value)))
        }

        fn len_hint(&self) -> Option<usize> {
            Some(self.0.len())
        }
    }

    assert_eq!(render(&Row((0..10).collect())), "(0, 1, 2, 3, 4, 5, ...)");
}

#[test]
fn test_sets() {
    assert_eq!(render(&BTreeSet::<i64>::new()), "{}");

    let small: BTreeSet<i64> = (0..3).collect();
    assert_eq!(render(&small), "{0, 1, 2}");

    let large: BTreeSet<i64> = (0..10).collect();
    assert_eq!(render(&large), "{0, 1, 2, 3, 4, 5, ...}");
}

#[test]
fn test_mappings_truncate_after_four_entries() {
    assert_eq!(render(&BTreeMap::<i64, i64>::new()), "{}");

    let small: BTreeMap<i64, i64> = (0..3).map(|x| (x, x * 2)).collect();
    assert_eq!(render(&small), "{0: 0, 1: 2, 2: 4}");

    let large: BTreeMap<i64, i64> = (0..10).map(|x| (x, x * 2)).collect();
    assert_eq!(render(&large), "{0: 0, 1: 2, 2: 4, 3: 6, ...}");
}

#[test]
fn test_index_map_preserves_insertion_order() {
    let mut map = indexmap::IndexMap::new();
    map.insert(3i64, 30i64);
    map.insert(1, 10);
    map.insert(2, 20);
    assert_eq!(render(&map), "{3: 30, 1: 10, 2: 20}");
}

#[test]
fn test_deque_renders_tagged() {
    assert_eq!(render(&VecDeque::<i64>::new()), "VecDeque([])");

    let deque: VecDeque<i64> = (0..10).collect();
    assert_eq!(render(&deque), "VecDeque([0, 1, 2, 3, 4, 5, ...])");
}

#[test]
fn test_mapping_view_shape() {
    struct KeysView(Vec<i64>);

    impl Value for KeysView {
        fn lineage(&self) -> Lineage {
            Lineage::of::<Self>().base::<kinds::MappingView>()
        }

        fn items(&self) -> Items<'_> {
            Items::Sequence(Box::new(self.0.iter().map(|item| item as &dyn Value)))
        }
    }

    assert_eq!(render(&KeysView((0..3).collect())), "KeysView([0, 1, 2])");
    assert_eq!(
        render(&KeysView((0..10).collect())),
        "KeysView([0, 1, 2, 3, 4, 5, ...])"
    );
}

#[test]
fn test_typed_buffer_uses_tighter_budget() {
    struct Samples(Vec<i64>);

    impl Value for Samples {
        fn lineage(&self) -> Lineage {
            Lineage::of::<Self>().base::<kinds::TypedBuffer>()
        }

        fn items(&self) -> Items<'_> {
            Items::Sequence(Box::new(self.0.iter().map(|item| item as &dyn Value)))
        }
    }

    assert_eq!(render(&Samples((0..5).collect())), "Samples([0, 1, 2, 3, 4])");
    assert_eq!(
        render(&Samples((0..10).collect())),
        "Samples([0, 1, 2, 3, 4, ...])"
    );
}

struct Tally(BTreeMap<i64, usize>);

impl Value for Tally {
    fn lineage(&self) -> Lineage {
        Lineage::of::<Self>().base::<kinds::Multiset>()
    }

    fn items(&self) -> Items<'_> {
        Items::Pairs(Box::new(
            self.0.iter().map(|(k, v)| (k as &dyn Value, v as &dyn Value)),
        ))
    }

    fn len_hint(&self) -> Option<usize> {
        Some(self.0.len())
    }
}

#[test]
fn test_multiset_switches_form_instead_of_truncating() {
    let small = Tally((0..3).map(|x| (x * 2, x as usize)).collect());
    assert_eq!(render(&small), "Tally({0: 0, 2: 1, 4: 2})");

    let large = Tally((0..10).map(|x| (x * 2, x as usize)).collect());
    assert_eq!(render(&large), "Tally(10 keys)");

    assert_eq!(render(&Tally(BTreeMap::new())), "Tally({})");
}

#[test]
fn test_layered_mapping_renders_layers_recursively() {
    struct Overlay(Vec<BTreeMap<i64, i64>>);

    impl Value for Overlay {
        fn lineage(&self) -> Lineage {
            Lineage::of::<Self>().base::<kinds::LayeredMap>()
        }

        fn items(&self) -> Items<'_> {
            Items::Sequence(Box::new(self.0.iter().map(|layer| layer as &dyn Value)))
        }

        fn len_hint(&self) -> Option<usize> {
            Some(self.0.len())
        }
    }

    let two = Overlay(vec![
        [(1i64, 2i64), (3, 4)].into_iter().collect(),
        [(5i64, 6i64)].into_iter().collect(),
    ]);
    assert_eq!(render(&two), "Overlay([{1: 2, 3: 4}, {5: 6}])");

    let many = Overlay((0..10).map(|x| [(x, x)].into_iter().collect()).collect());
    assert_eq!(
        render(&many),
        "Overlay([{0: 0}, {1: 1}, {2: 2}, {3: 3}, {4: 4}, {5: 5}, ...])"
    );
}

#[test]
fn test_text_truncates_by_characters_with_middle_ellipsis() {
    assert_eq!(render(&String::new()), "\"\"");
    assert_eq!(render(&"123"), "\"123\"");

    let long = "abc".repeat(50);
    let expected = format!(
        "\"{}...{}\"",
        "abcabcabcabcabcabcabcabcabca", "bcabcabcabcabcabcabcabcabcabc"
    );
    assert_eq!(render(&long), expected);
    // content fits the 60-character ceiling exactly; quotes come on top
    assert_eq!(render(&long).chars().count(), 62);
}

#[test]
fn test_bytes_truncate_like_text() {
    assert_eq!(render(&bytes::Bytes::from_static(b"")), "b\"\"");
    assert_eq!(render(&bytes::Bytes::from_static(b"123")), "b\"123\"");

    let long = bytes::Bytes::from(b"abc".repeat(50));
    assert_eq!(
        render(&long),
        "b\"abcabcabcabcabcabcabcabcabca...bcabcabcabcabcabcabcabcabcabc\""
    );
}

#[test]
fn test_inheritance_resolution_prefers_most_derived_ancestor() {
    declare_lineage!(A => []);
    declare_lineage!(B => [A]);
    declare_lineage!(C => [A]);
    declare_lineage!(D => [C, A]);
    declare_lineage!(C2 => [C, A]);
    declare_lineage!(C3 => [C, B, A]);
    declare_lineage!(B2 => [B, C, A]);
    declare_lineage!(A2 => [A]);

    let renderer = Renderer::new();
    renderer.register_fn::<A>(|_, _| "A".into());
    renderer.register_fn::<B>(|_, _| "B".into());
    renderer.register_fn::<C>(|_, _| "C".into());
    renderer.register_fn::<D>(|_, _| "D".into());

    assert_eq!(renderer.render(&A), "A");
    assert_eq!(renderer.render(&B), "B");
    assert_eq!(renderer.render(&C), "C");
    assert_eq!(renderer.render(&D), "D");
    assert_eq!(renderer.render(&C2), "C");
    assert_eq!(renderer.render(&C3), "C");
    assert_eq!(renderer.render(&B2), "B");
    assert_eq!(renderer.render(&A2), "A");

    assert!(renderer.find_strategy(&C2).is_some());
    assert!(renderer.registered_strategy::<C2>().is_none());
}

#[test]
fn test_new_registration_invalidates_cached_resolution() {
    declare_lineage!(Base => []);
    declare_lineage!(Derived => [Base]);

    let renderer = Renderer::new();
    renderer.register_fn::<Base>(|_, _| "base".into());
    assert_eq!(renderer.render(&Derived), "base");

    renderer.register_fn::<Derived>(|_, _| "derived".into());
    assert_eq!(renderer.render(&Derived), "derived");
}

#[test]
fn test_unregistered_type_uses_basic_instance_form() {
    declare_lineage!(Plain => []);

    let rendered = render(&Plain);
    assert!(rendered.starts_with("<Plain instance at 0x"));
    assert!(rendered.ends_with('>'));
    assert!(glimpse::find_strategy(&Plain).is_none());
}

#[test]
fn test_registered_basic_repr_short_circuits_native() {
    struct Expensive;

    impl Value for Expensive {
        fn lineage(&self) -> Lineage {
            Lineage::of::<Self>()
        }

        fn native_repr(&self) -> Result<String, ReprError> {
            Ok("bad".into())
        }
    }

    let renderer = Renderer::new();
    renderer.register_fn::<Expensive>(|value, _| basic_repr(value));
    let rendered = renderer.render(&Expensive);
    assert!(rendered.starts_with("<Expensive instance at 0x"));
    assert!(rendered.ends_with('>'));
}

#[test]
fn test_custom_strategy_recurses_through_helper() {
    struct Wrapped(Vec<i64>);

    impl Value for Wrapped {
        fn lineage(&self) -> Lineage {
            Lineage::of::<Self>()
        }

        fn items(&self) -> Items<'_> {
            Items::Sequence(Box::new(self.0.iter().map(|item| item as &dyn Value)))
        }
    }

    let renderer = Renderer::new();
    renderer.register_fn::<Wrapped>(|value, helper| {
        let Items::Sequence(mut iter) = value.items() else {
            return basic_repr(value);
        };
        let first = iter.next().map(|item| helper.render(item)).unwrap_or_default();
        format!("Wrapped(first={first})")
    });

    assert_eq!(renderer.render(&Wrapped(vec![7, 8, 9])), "Wrapped(first=7)");
}

#[test]
fn test_maxparts_is_tunable_at_runtime() {
    let renderer = Renderer::new();
    let strategy = renderer.find_strategy(&vec![0i64]).unwrap();
    assert_eq!(strategy.max_parts(), Some(6));

    strategy.set_max_parts(10);
    let eight: Vec<i64> = (0..8).collect();
    assert_eq!(renderer.render(&eight), "[0, 1, 2, 3, 4, 5, 6, 7]");
    let twenty: Vec<i64> = (0..20).collect();
    assert_eq!(
        renderer.render(&twenty),
        "[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, ...]"
    );

    strategy.set_max_parts(6);
    assert_eq!(renderer.render(&eight), "[0, 1, 2, 3, 4, 5, ...]");
}

struct Flaky {
    fail: bool,
}

static FLAKY_CALLS: AtomicUsize = AtomicUsize::new(0);

impl Value for Flaky {
    fn lineage(&self) -> Lineage {
        Lineage::of::<Self>()
    }

    fn native_repr(&self) -> Result<String, ReprError> {
        FLAKY_CALLS.fetch_add(1, Ordering::Relaxed);
        if self.fail {
            Err(ReprError::new("boom"))
        } else {
            Ok("bob".into())
        }
    }
}

struct FlakyChild(Flaky);

impl Value for FlakyChild {
    fn lineage(&self) -> Lineage {
        Lineage::of::<Self>()
    }

    // Shares the parent's representation routine, and therefore its
    // suppression state.
    fn repr_routine(&self) -> RoutineId {
        self.0.repr_routine()
    }

    fn native_repr(&self) -> Result<String, ReprError> {
        self.0.native_repr()
    }
}

#[test]
fn test_suppression_is_permanent_and_keyed_by_routine() {
    let renderer = Renderer::new();

    assert_eq!(renderer.render(&Flaky { fail: false }), "bob");
    let after_success = FLAKY_CALLS.load(Ordering::Relaxed);

    let first_failure = renderer.render(&Flaky { fail: true });
    assert!(first_failure.starts_with("<Flaky instance at 0x"));
    assert!(first_failure.ends_with("(exception in repr)>"));
    assert_eq!(FLAKY_CALLS.load(Ordering::Relaxed), after_success + 1);

    // Subsequent renders return the placeholder without invoking the
    // routine, even for values that would have succeeded.
    let suppressed = renderer.render(&Flaky { fail: false });
    assert!(suppressed.ends_with("(exception in repr)>"));
    let again = renderer.render(&Flaky { fail: false });
    assert!(again.ends_with("(exception in repr)>"));
    assert_eq!(FLAKY_CALLS.load(Ordering::Relaxed), after_success + 1);

    // A delegating wrapper shares the routine, so it is suppressed too -
    // under its own label.
    let child = renderer.render(&FlakyChild(Flaky { fail: false }));
    assert!(child.starts_with("<FlakyChild instance at 0x"));
    assert!(child.ends_with("(exception in repr)>"));
    assert_eq!(FLAKY_CALLS.load(Ordering::Relaxed), after_success + 1);

    // Resetting the ledger lets the routine run again.
    renderer.reset_suppressions();
    assert_eq!(renderer.render(&Flaky { fail: false }), "bob");
}

struct Verbose;

impl Value for Verbose {
    fn lineage(&self) -> Lineage {
        Lineage::of::<Self>()
    }

    fn native_repr(&self) -> Result<String, ReprError> {
        Ok("long".repeat(500))
    }
}

#[test]
fn test_overlong_native_output_is_truncated_then_suppressed() {
    let renderer = Renderer::new();

    let first = renderer.render(&Verbose);
    assert_eq!(
        first,
        "longlonglonglonglonglonglong...glonglonglonglonglonglonglong"
    );
    assert_eq!(first.chars().count(), 60);

    let second = renderer.render(&Verbose);
    assert!(second.starts_with("<Verbose instance at 0x"));
    assert!(second.ends_with("(repr suppressed)>"));
}

#[test]
fn test_suppression_threshold_is_tunable() {
    let renderer = Renderer::new();
    renderer.fallback().set_suppression_threshold(5000);

    let rendered = renderer.render(&Verbose);
    assert_eq!(rendered, "long".repeat(500));
}

struct Panicky;

impl Value for Panicky {
    fn lineage(&self) -> Lineage {
        Lineage::of::<Self>()
    }

    fn native_repr(&self) -> Result<String, ReprError> {
        panic!("kaboom")
    }
}

#[test]
fn test_native_panic_is_contained_and_suppressed() {
    let renderer = Renderer::new();

    let first = renderer.render(&Panicky);
    assert!(first.starts_with("<Panicky instance at 0x"));
    assert!(first.ends_with("(exception in repr)>"));

    let second = renderer.render(&Panicky);
    assert!(second.ends_with("(exception in repr)>"));
}

#[test]
fn test_global_override_propagates_failures() {
    struct Erroring;

    impl Value for Erroring {
        fn lineage(&self) -> Lineage {
            Lineage::of::<Self>()
        }

        fn native_repr(&self) -> Result<String, ReprError> {
            Err(ReprError::new("boom"))
        }
    }

    let renderer = Renderer::new();
    renderer.set_raise_exceptions(true);

    let outcome = std::panic::catch_unwind(|| renderer.render(&Panicky));
    assert!(outcome.is_err());

    let outcome = std::panic::catch_unwind(|| renderer.render(&Erroring));
    assert!(outcome.is_err());
}

#[test]
fn test_fallback_only_override_propagates_native_failures() {
    let renderer = Renderer::new();
    renderer.fallback().set_raise_exceptions(true);

    let outcome = std::panic::catch_unwind(|| renderer.render(&Panicky));
    assert!(outcome.is_err());
}

#[test]
fn test_strategy_marked_to_raise_propagates() {
    declare_lineage!(Target => []);

    let renderer = Renderer::new();
    let strategy = FnStrategy::new(|_, _| panic!("bad strategy"));
    strategy.set_raise_exceptions(true);
    renderer.register::<Target>(strategy);

    let outcome = std::panic::catch_unwind(|| renderer.render(&Target));
    assert!(outcome.is_err());
}

#[test]
fn test_failing_strategy_is_contained_and_shared_with_derived_types() {
    declare_lineage!(Shaky => []);
    declare_lineage!(ShakyChild => [Shaky]);

    let renderer = Renderer::new();
    renderer.register::<Shaky>(FnStrategy::new(|_, _| panic!("bad strategy")));

    let first = renderer.render(&Shaky);
    assert!(first.starts_with("<Shaky instance at 0x"));
    assert!(first.ends_with("(exception in repr)>"));

    // The derived type resolves to the same registration and therefore the
    // same suppression entry; the strategy is not invoked again.
    let child = renderer.render(&ShakyChild);
    assert!(child.starts_with("<ShakyChild instance at 0x"));
    assert!(child.ends_with("(exception in repr)>"));
}

enum Node {
    Int(i64),
    List(OnceCell<Rc<NodeList>>),
}

struct NodeList(Vec<Node>);

impl Node {
    fn inner(&self) -> &dyn Value {
        match self {
            Node::Int(value) => value,
            Node::List(cell) => cell.get().expect("cycle not wired"),
        }
    }
}

impl Value for Node {
    fn lineage(&self) -> Lineage {
        self.inner().lineage()
    }

    fn type_label(&self) -> &'static str {
        self.inner().type_label()
    }

    fn identity(&self) -> Identity {
        self.inner().identity()
    }

    fn repr_routine(&self) -> RoutineId {
        self.inner().repr_routine()
    }

    fn native_repr(&self) -> Result<String, ReprError> {
        self.inner().native_repr()
    }

    fn items(&self) -> Items<'_> {
        self.inner().items()
    }

    fn len_hint(&self) -> Option<usize> {
        self.inner().len_hint()
    }
}

impl Value for NodeList {
    fn lineage(&self) -> Lineage {
        Lineage::of::<Self>().base::<kinds::Sequence>()
    }

    fn items(&self) -> Items<'_> {
        Items::Sequence(Box::new(self.0.iter().map(|node| node as &dyn Value)))
    }

    fn len_hint(&self) -> Option<usize> {
        Some(self.0.len())
    }
}

fn self_referential_list() -> Rc<NodeList> {
    let list = Rc::new(NodeList(vec![
        Node::Int(1),
        Node::Int(2),
        Node::Int(3),
        Node::List(OnceCell::new()),
    ]));
    let Node::List(cell) = &list.0[3] else {
        unreachable!();
    };
    assert!(cell.set(Rc::clone(&list)).is_ok());
    list
}

#[test]
fn test_self_reference_unrolls_three_times_then_collapses() {
    let list = self_referential_list();
    assert_eq!(render(&list), "[1, 2, 3, [1, 2, 3, [1, 2, 3, [...]]]]");
}

#[test]
fn test_repeat_limit_applies_independently_of_depth() {
    let list = self_referential_list();
    let renderer = Renderer::new();
    renderer.set_max_depth(10);
    assert_eq!(
        renderer.render(&list),
        "[1, 2, 3, [1, 2, 3, [1, 2, 3, [...]]]]"
    );

    renderer.set_repeat_limit(2);
    assert_eq!(renderer.render(&list), "[1, 2, 3, [1, 2, 3, [...]]]");
}

#[test]
fn test_deep_non_cyclic_nesting_collapses_at_depth_bound() {
    let deep = vec![vec![vec![vec![5i64]]]];
    assert_eq!(render(&deep), "[[[[...]]]]");

    // Scalars render at any depth; only recursing strategies collapse.
    let shallow = vec![vec![vec![5i64]]];
    assert_eq!(render(&shallow), "[[[5]]]");
}

#[test]
fn test_concurrent_renders_do_not_interfere() {
    let renderer = Renderer::new();
    std::thread::scope(|scope| {
        for offset in 0..4i64 {
            let renderer = &renderer;
            scope.spawn(move || {
                for _ in 0..100 {
                    let values: Vec<i64> = (offset..offset + 3).collect();
                    let expected = format!("[{}, {}, {}]", offset, offset + 1, offset + 2);
                    assert_eq!(renderer.render(&values), expected);
                }
            });
        }
    });
}
