use std::collections::BTreeMap;
use std::sync::Arc;

use snaprecall_testkit::fixture_path;

use crate::recall::{
	CaptureOptions, CaptureSession, Capturer, ClassInfo, ClassKind, Computation, DeserializerContext, FieldInfo, Heap, HeapDump, LiveValue,
	ObjectBody, ObjectId, Type, TypeManager, TypeUniverse, ValueGraph, ValueId, Visibility, matcher_adaptors,
};

use super::MatcherGenerator;

fn ty(signature: &str) -> Type {
	Type::parse(signature).expect("signature parses")
}

fn fields(entries: &[(&str, LiveValue)]) -> ObjectBody {
	ObjectBody::Fields {
		fields: entries.iter().map(|(name, value)| ((*name).to_owned(), value.clone())).collect::<BTreeMap<_, _>>(),
	}
}

fn strings(values: &[&str]) -> ObjectBody {
	ObjectBody::Elements {
		elements: values.iter().map(|value| LiveValue::Str((*value).to_owned())).collect(),
	}
}

fn capture(heap: &Heap, universe: &TypeUniverse, declared: &Type, value: &LiveValue) -> (ValueGraph, ValueId) {
	let options = CaptureOptions::default();
	let capturer = Capturer::new(heap, universe, &options).with_package("com.example");
	let mut session = CaptureSession::new();
	let id = capturer.serialize(declared, value, &mut session).expect("capture succeeds");
	(session.finish(), id)
}

fn generate(graph: &ValueGraph, universe: &TypeUniverse, package: &str, root: ValueId) -> (Computation, DeserializerContext) {
	let adaptors = matcher_adaptors().expect("built-in adaptors register");
	let context = DeserializerContext::new(TypeManager::new(package, Arc::new(universe.clone())), "src/test/resources");
	let mut generator = MatcherGenerator::new(graph, universe, &adaptors, context);
	let computation = generator.generate(root).expect("matcher generation succeeds");
	(computation, generator.into_context())
}

fn universe() -> TypeUniverse {
	let mut universe = TypeUniverse::builtin();
	universe.insert(ClassInfo::new("com.example.Node").field(FieldInfo::new("next", ty("com.example.Node"))));
	universe.insert(
		ClassInfo::new("com.example.Pair")
			.field(FieldInfo::new("left", Type::object()))
			.field(FieldInfo::new("right", Type::object())),
	);
	universe.insert(
		ClassInfo::new("com.example.internal.Secret")
			.visibility(Visibility::Package)
			.field(FieldInfo::new("code", ty("int"))),
	);
	universe.insert(
		ClassInfo::new("com.example.internal.Mode")
			.kind(ClassKind::Enum)
			.visibility(Visibility::Package)
			.enum_constants(&["FAST", "SLOW"]),
	);
	universe
}

#[test]
fn shop_order_matches_field_by_field() {
	let (_, dump) = HeapDump::open(fixture_path("shop.json")).expect("fixture opens");
	let universe = dump.universe();
	let (graph, root) = capture(&dump.heap, &universe, &ty("com.example.shop.Order"), &LiveValue::Ref(ObjectId(7)));

	let (computation, context) = generate(&graph, &universe, "com.example.shop", root);

	assert!(computation.statements.is_empty());
	assert_eq!(
		computation.value,
		[
			"new GenericMatcher() {",
			"\tMatcher<?> customer = new GenericMatcher() {",
			"\t\tString name = \"Ada\";",
			"\t\tMatcher<?> tags = contains(String.class, \"vip\");",
			"\t}.matching(Customer.class);",
			"\tlong id = 7L;",
			"\tMatcher<?> items = containsInOrder(Item.class, new GenericMatcher() {",
			"\t\tint quantity = 2;",
			"\t\tString sku = \"A-1\";",
			"\t}.matching(Item.class));",
			"\tMatcher<?> status = sameInstance(Status.OPEN);",
			"\tMatcher<?> total = equalTo(new BigDecimal(\"19.90\"));",
			"}.matching(Order.class)",
		]
		.join("\n")
	);

	let imports = context.types().imports();
	assert!(imports.contains(&"org.hamcrest.Matcher".to_owned()));
	assert!(imports.contains(&"snaprecall.runtime.GenericMatcher".to_owned()));
	assert!(imports.contains(&"java.math.BigDecimal".to_owned()));
	assert!(!imports.iter().any(|item| item.starts_with("com.example.shop.")));
	assert_eq!(
		context.types().static_imports(),
		[
			"snaprecall.runtime.Matchers.contains",
			"snaprecall.runtime.Matchers.containsInOrder",
			"org.hamcrest.Matchers.sameInstance",
			"org.hamcrest.Matchers.equalTo",
		]
	);
}

#[test]
fn self_reference_uses_a_recursive_matcher() {
	let universe = universe();
	let mut heap = Heap::new();
	let node = heap.alloc(ty("com.example.Node"), ObjectBody::fields());
	heap.set_field(node, "next", LiveValue::Ref(node)).expect("field set");
	let (graph, root) = capture(&heap, &universe, &ty("com.example.Node"), &LiveValue::Ref(node));

	let (computation, context) = generate(&graph, &universe, "com.example", root);

	assert_eq!(computation.value, "nodeMatcher1");
	assert!(computation.stored);
	assert_eq!(
		computation.statements,
		vec![
			"RecursiveMatcher nodeMatcher1 = new RecursiveMatcher();".to_owned(),
			"nodeMatcher1.define(new GenericMatcher() {\n\tMatcher<?> next = nodeMatcher1;\n}.matching(Node.class));".to_owned(),
		]
	);
	assert!(context.types().imports().contains(&"snaprecall.runtime.RecursiveMatcher".to_owned()));
	assert!(context.unresolved().is_none());
}

#[test]
fn shared_value_repeats_its_matcher() {
	let universe = universe();
	let mut heap = Heap::new();
	let shared = heap.alloc(ty("com.example.Node"), ObjectBody::fields());
	let pair = heap.alloc(
		ty("com.example.Pair"),
		fields(&[("left", LiveValue::Ref(shared)), ("right", LiveValue::Ref(shared))]),
	);
	let (graph, root) = capture(&heap, &universe, &ty("com.example.Pair"), &LiveValue::Ref(pair));

	let (computation, _) = generate(&graph, &universe, "com.example", root);

	let node = "new GenericMatcher() {\n\t\tNode next = null;\n\t}.matching(Node.class, Object.class)";
	assert!(computation.statements.is_empty());
	assert_eq!(
		computation.value,
		format!("new GenericMatcher() {{\n\tMatcher<?> left = {node};\n\tMatcher<?> right = {node};\n}}.matching(Pair.class)")
	);
}

#[test]
fn containers_pick_their_matcher_by_shape() {
	let universe = universe();
	let mut heap = Heap::new();
	let empty_list = heap.alloc(ty("java.util.ArrayList"), strings(&[]));
	let pair_set = heap.alloc(ty("java.util.LinkedHashSet"), strings(&["a", "b"]));
	let single_set = heap.alloc(ty("java.util.HashSet"), strings(&["a"]));
	let map = heap.alloc(
		ty("java.util.LinkedHashMap"),
		ObjectBody::Entries {
			entries: vec![(LiveValue::Str("a".to_owned()), LiveValue::Int(1)), (LiveValue::Str("b".to_owned()), LiveValue::Null)],
		},
	);
	let empty_map = heap.alloc(ty("java.util.HashMap"), ObjectBody::Entries { entries: Vec::new() });
	let ints = heap.alloc(ty("int[]"), ObjectBody::Elements { elements: vec![LiveValue::Int(1), LiveValue::Int(2)] });
	let no_strings = heap.alloc(ty("java.lang.String[]"), strings(&[]));
	let some_strings = heap.alloc(
		ty("java.lang.String[]"),
		ObjectBody::Elements {
			elements: vec![LiveValue::Str("x".to_owned()), LiveValue::Null],
		},
	);

	let render = |id: ObjectId, declared: &str| {
		let (graph, root) = capture(&heap, &universe, &ty(declared), &LiveValue::Ref(id));
		generate(&graph, &universe, "com.example", root).0.value
	};

	assert_eq!(render(empty_list, "java.util.List<java.lang.String>"), "empty(String.class)");
	assert_eq!(render(pair_set, "java.util.Set<java.lang.String>"), "containsInAnyOrder(String.class, \"a\", \"b\")");
	assert_eq!(render(single_set, "java.util.Set<java.lang.String>"), "contains(String.class, \"a\")");
	assert_eq!(
		render(map, "java.util.Map<java.lang.String, java.lang.Integer>"),
		"containsEntries(String.class, Integer.class).entry(\"a\", 1).entry(\"b\", nullValue())"
	);
	assert_eq!(
		render(empty_map, "java.util.Map<java.lang.String, java.lang.Integer>"),
		"noEntries(String.class, Integer.class)"
	);
	assert_eq!(render(ints, "int[]"), "intArrayContaining(1, 2)");
	assert_eq!(render(no_strings, "java.lang.String[]"), "emptyArray()");
	assert_eq!(render(some_strings, "java.lang.String[]"), "arrayContaining(String.class, \"x\", nullValue())");
}

#[test]
fn scalars_match_by_value_or_identity() {
	let universe = universe();
	let mut heap = Heap::new();
	let hidden_mode = heap.alloc(ty("com.example.internal.Mode"), ObjectBody::Constant { name: "FAST".to_owned() });
	let big = heap.alloc(ty("java.math.BigInteger"), ObjectBody::Immutable { repr: "12345678901234567890".to_owned() });

	let render = |value: LiveValue, declared: &str| {
		let (graph, root) = capture(&heap, &universe, &ty(declared), &value);
		generate(&graph, &universe, "com.example", root).0.value
	};

	assert_eq!(render(LiveValue::Str("x".to_owned()), "java.lang.String"), "equalTo(\"x\")");
	assert_eq!(render(LiveValue::Null, "com.example.Node"), "nullValue(Node.class)");
	assert_eq!(render(LiveValue::Null, "com.example.internal.Secret"), "nullValue()");
	assert_eq!(render(LiveValue::Ref(hidden_mode), "java.lang.Object"), "matchingEnum(\"FAST\")");
	assert_eq!(
		render(LiveValue::Ref(big), "java.math.BigInteger"),
		"equalTo(new BigInteger(\"12345678901234567890\"))"
	);
}

#[test]
fn hidden_object_is_matched_by_class_name() {
	let universe = universe();
	let mut heap = Heap::new();
	let secret = heap.alloc(ty("com.example.internal.Secret"), fields(&[("code", LiveValue::Int(42))]));
	let (graph, root) = capture(&heap, &universe, &Type::object(), &LiveValue::Ref(secret));

	let (computation, context) = generate(&graph, &universe, "com.example", root);

	assert_eq!(
		computation.value,
		"new GenericMatcher() {\n\tint code = 42;\n}.matching(clazz(\"com.example.internal.Secret\"), Object.class)"
	);
	assert!(context.types().static_imports().contains(&"snaprecall.runtime.Types.clazz".to_owned()));
}

#[test]
fn function_value_matches_its_interface() {
	let universe = universe();
	let mut heap = Heap::new();
	let lambda = heap.alloc(
		Type::class("com.example.Main$$Lambda$1"),
		ObjectBody::Lambda {
			interface: ty("java.lang.Runnable"),
			impl_class: "com.example.Main".to_owned(),
			impl_method: "lambda$main$0".to_owned(),
			captured: Vec::new(),
		},
	);
	let (graph, root) = capture(&heap, &universe, &ty("java.lang.Runnable"), &LiveValue::Ref(lambda));

	let (computation, _) = generate(&graph, &universe, "com.example", root);

	assert_eq!(computation.value, "instanceOf(Runnable.class)");
}

#[test]
fn element_order_is_kept_for_lists_and_sets() {
	let universe = universe();
	let mut heap = Heap::new();
	let words = ["first", "middle", "other", "last"];
	let list = heap.alloc(ty("java.util.ArrayList"), strings(&words));
	let set = heap.alloc(ty("java.util.HashSet"), strings(&words));

	let render = |id: ObjectId, declared: &str| {
		let (graph, root) = capture(&heap, &universe, &ty(declared), &LiveValue::Ref(id));
		generate(&graph, &universe, "com.example", root).0.value
	};

	assert_eq!(
		render(list, "java.util.List<java.lang.String>"),
		"containsInOrder(String.class, \"first\", \"middle\", \"other\", \"last\")"
	);
	assert_eq!(
		render(set, "java.util.Set<java.lang.String>"),
		"containsInAnyOrder(String.class, \"first\", \"middle\", \"other\", \"last\")"
	);
}

#[test]
fn class_objects_match_their_class_literal() {
	let universe = universe();
	let mut heap = Heap::new();
	let visible = heap.alloc(ty("java.lang.Class"), ObjectBody::Immutable { repr: "com.example.Node".to_owned() });
	let hidden = heap.alloc(ty("java.lang.Class"), ObjectBody::Immutable { repr: "com.example.internal.Secret".to_owned() });

	let render = |id: ObjectId| {
		let (graph, root) = capture(&heap, &universe, &Type::object(), &LiveValue::Ref(id));
		generate(&graph, &universe, "com.example", root).0.value
	};

	assert_eq!(render(visible), "equalTo(Node.class)");
	assert_eq!(render(hidden), "equalTo(clazz(\"com.example.internal.Secret\"))");
}
