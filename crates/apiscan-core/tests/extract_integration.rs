//! End-to-end extraction tests over hand-built syntax trees

use apiscan_core::api::{DeclarationKind, Visibility};
use apiscan_core::tree::ScopeInfo;
use apiscan_core::{ApiExtractor, Comment, NodeId, NodeKind, TreeBuilder};

fn ident(b: &mut TreeBuilder, parent: NodeId, name: &str, line: u32) -> NodeId {
    b.add(
        parent,
        NodeKind::Identifier {
            name: name.to_string(),
        },
        line,
    )
}

fn string(b: &mut TreeBuilder, parent: NodeId, value: &str, line: u32) -> NodeId {
    b.add(
        parent,
        NodeKind::String {
            value: value.to_string(),
        },
        line,
    )
}

fn number(b: &mut TreeBuilder, parent: NodeId, raw: &str, line: u32) -> NodeId {
    b.add(
        parent,
        NodeKind::Number {
            raw: raw.to_string(),
        },
        line,
    )
}

/// Build a dotted path expression under `parent`
fn dot(b: &mut TreeBuilder, parent: NodeId, path: &str, line: u32) -> NodeId {
    let mut parts = path.split('.');
    let first = parts.next().expect("empty path");
    let mut node = b.node(
        NodeKind::Identifier {
            name: first.to_string(),
        },
        line,
    );
    for part in parts {
        let chain = b.node(NodeKind::Dot, line);
        let member = b.node(
            NodeKind::Identifier {
                name: part.to_string(),
            },
            line,
        );
        b.attach(chain, node);
        b.attach(chain, member);
        node = chain;
    }
    b.attach(parent, node);
    node
}

/// Build `factory("unit.Name", { ... })` as a top-level statement and return
/// (statement, configuration map)
fn factory(b: &mut TreeBuilder, path: &str, line: u32) -> (NodeId, NodeId) {
    let root = b.root();
    let semi = b.add(root, NodeKind::Semicolon, line);
    let call = b.add(semi, NodeKind::Call, line);
    dot(b, call, path, line);
    string(b, call, "demo.Unit", line);
    let config = b.add(call, NodeKind::Map, line);
    (semi, config)
}

/// Add a `name: {...}` section to a factory configuration map
fn section(b: &mut TreeBuilder, config: NodeId, name: &str, line: u32) -> NodeId {
    let pair = b.add(config, NodeKind::PropertyInit, line);
    ident(b, pair, name, line);
    b.add(pair, NodeKind::Map, line)
}

/// Add a `key: <value goes here>` pair to a map and return the pair node
fn pair(b: &mut TreeBuilder, map: NodeId, key: &str, line: u32) -> NodeId {
    let p = b.add(map, NodeKind::PropertyInit, line);
    ident(b, p, key, line);
    p
}

#[test]
fn test_class_extraction_scenario() {
    let mut b = TreeBuilder::new();
    let (semi, config) = factory(&mut b, "core.Class", 1);
    b.comment(
        semi,
        Comment::doc("Demo class.").with_html("<p>Demo class.</p>"),
    );

    // construct: function(a, b) {}
    let construct = pair(&mut b, config, "construct", 3);
    b.add(
        construct,
        NodeKind::Function {
            params: vec!["a".to_string(), "b".to_string()],
        },
        3,
    );

    // members: { FOO: 1, _bar: function() { return "x"; } }
    let members = section(&mut b, config, "members", 5);
    let foo = pair(&mut b, members, "FOO", 6);
    number(&mut b, foo, "1", 6);
    let bar = pair(&mut b, members, "_bar", 7);
    let bar_fn = b.add(
        bar,
        NodeKind::Function {
            params: Vec::new(),
        },
        7,
    );
    let ret = b.add(bar_fn, NodeKind::Return, 8);
    string(&mut b, ret, "x", 8);

    let tree = b.build();
    let unit = ApiExtractor::new().extract(&tree, "demo.Unit");

    let main = unit.main.as_ref().expect("main descriptor");
    assert_eq!(main.kind, DeclarationKind::Class);
    assert_eq!(main.line, 1);
    assert_eq!(main.doc.as_deref(), Some("<p>Demo class.</p>"));

    let constructor = unit.constructor.as_ref().expect("constructor");
    let params = constructor.params.as_ref().expect("constructor params");
    assert_eq!(
        params.keys().collect::<Vec<_>>(),
        vec![&"a".to_string(), &"b".to_string()]
    );
    assert!(params["a"].ty.is_none() && params["a"].doc.is_none());

    let members = unit.members.as_ref().expect("members");

    let foo = &members["FOO"];
    assert_eq!(foo.ty, "Number");
    assert_eq!(foo.line, 6);
    assert_eq!(foo.visibility, Visibility::Public);
    assert!(foo.constant);
    assert_eq!(foo.value.as_deref(), Some("1"));

    let bar = &members["_bar"];
    assert_eq!(bar.ty, "Function");
    assert_eq!(bar.visibility, Visibility::Protected);
    assert!(!bar.constant);
    assert!(bar.params.as_ref().expect("params map").is_empty());
    assert_eq!(bar.returns.as_deref(), Some(&["String".to_string()][..]));
}

#[test]
fn test_ternary_resolves_through_informative_branch() {
    let mut b = TreeBuilder::new();
    let (_, config) = factory(&mut b, "core.Class", 1);
    let members = section(&mut b, config, "members", 2);

    // mode: flag ? undefined : "fast"  -- void then-branch is discarded
    let mode = pair(&mut b, members, "mode", 3);
    let hook = b.add(mode, NodeKind::Hook, 3);
    ident(&mut b, hook, "flag", 3);
    b.add(hook, NodeKind::Void, 3);
    string(&mut b, hook, "fast", 4);

    // speed: flag ? 10 : "slow"  -- then-branch wins while informative
    let speed = pair(&mut b, members, "speed", 5);
    let hook2 = b.add(speed, NodeKind::Hook, 5);
    ident(&mut b, hook2, "flag", 5);
    number(&mut b, hook2, "10", 5);
    string(&mut b, hook2, "slow", 5);

    let tree = b.build();
    let unit = ApiExtractor::new().extract(&tree, "demo.Unit");

    let members = unit.members.as_ref().expect("members");
    assert_eq!(members["mode"].ty, "String");
    assert_eq!(members["mode"].line, 4);
    assert_eq!(members["mode"].value.as_deref(), Some("\"fast\""));
    assert_eq!(members["speed"].ty, "Number");
}

#[test]
fn test_call_resolves_to_first_return() {
    let mut b = TreeBuilder::new();
    let (_, config) = factory(&mut b, "core.Class", 1);
    let members = section(&mut b, config, "members", 2);

    // size: (function() { return 42; })()
    let size = pair(&mut b, members, "size", 3);
    let call = b.add(size, NodeKind::Call, 3);
    let closure = b.add(
        call,
        NodeKind::Function {
            params: Vec::new(),
        },
        3,
    );
    let ret = b.add(closure, NodeKind::Return, 4);
    number(&mut b, ret, "42", 4);

    let tree = b.build();
    let unit = ApiExtractor::new().extract(&tree, "demo.Unit");

    let size = &unit.members.as_ref().expect("members")["size"];
    assert_eq!(size.ty, "Number");
    assert_eq!(size.value.as_deref(), Some("42"));
    assert_eq!(size.line, 4);
}

#[test]
fn test_identifier_alias_takes_type_from_documented_assignment() {
    let mut b = TreeBuilder::new();
    let root = b.root();

    // /** Default width. {Size} */ var defaultWidth = 100;
    let var = b.add(root, NodeKind::Var, 1);
    b.comment(
        var,
        Comment::doc("Default width.")
            .with_html("<p>Default width.</p>")
            .with_type("Size"),
    );
    let decl = b.add(
        var,
        NodeKind::Declaration {
            name: "defaultWidth".to_string(),
        },
        1,
    );
    number(&mut b, decl, "100", 1);

    let (_, config) = factory(&mut b, "core.Class", 3);
    let members = section(&mut b, config, "members", 4);
    let width = pair(&mut b, members, "width", 5);
    ident(&mut b, width, "defaultWidth", 5);

    let tree = b.build();
    let unit = ApiExtractor::new().extract(&tree, "demo.Unit");

    let width = &unit.members.as_ref().expect("members")["width"];
    assert_eq!(width.ty, "Size");
    assert_eq!(width.value.as_deref(), Some("100"));
    assert_eq!(width.doc.as_deref(), Some("<p>Default width.</p>"));
    assert_eq!(width.line, 1);
}

#[test]
fn test_unresolvable_identifier_keeps_its_own_name() {
    let mut b = TreeBuilder::new();
    let (_, config) = factory(&mut b, "core.Class", 1);
    let members = section(&mut b, config, "members", 2);
    let widget = pair(&mut b, members, "widget", 3);
    dot(&mut b, widget, "core.ui.Widget", 3);

    let tree = b.build();
    let unit = ApiExtractor::new().extract(&tree, "demo.Unit");

    let widget = &unit.members.as_ref().expect("members")["widget"];
    assert_eq!(widget.ty, "core.ui.Widget");
    assert!(widget.value.is_none());
}

#[test]
fn test_cyclic_assignments_terminate_with_diagnostic() {
    let mut b = TreeBuilder::new();
    let root = b.root();

    // var a = b; var b = a;
    let var_a = b.add(root, NodeKind::Var, 1);
    let decl_a = b.add(
        var_a,
        NodeKind::Declaration {
            name: "a".to_string(),
        },
        1,
    );
    ident(&mut b, decl_a, "b", 1);
    let var_b = b.add(root, NodeKind::Var, 2);
    let decl_b = b.add(
        var_b,
        NodeKind::Declaration {
            name: "b".to_string(),
        },
        2,
    );
    ident(&mut b, decl_b, "a", 2);

    let (_, config) = factory(&mut b, "core.Class", 4);
    let members = section(&mut b, config, "members", 5);
    let looped = pair(&mut b, members, "looped", 6);
    ident(&mut b, looped, "a", 6);

    let tree = b.build();
    let unit = ApiExtractor::new().extract(&tree, "demo.Unit");

    // Resolution terminated and left a determinate entry.
    assert!(unit.members.as_ref().expect("members").contains_key("looped"));
    assert!(unit
        .diagnostics()
        .warnings()
        .iter()
        .any(|w| w.message.contains("Circular value reference")));
}

#[test]
fn test_module_statics_and_unknown_section() {
    let mut b = TreeBuilder::new();
    let (_, config) = factory(&mut b, "core.Module", 1);

    let statics = section(&mut b, config, "statics", 2);
    let version = pair(&mut b, statics, "VERSION", 3);
    string(&mut b, version, "1.2", 3);

    let colors = section(&mut b, config, "colors", 5);
    let red = pair(&mut b, colors, "red", 6);
    string(&mut b, red, "#f00", 6);

    let tree = b.build();
    let unit = ApiExtractor::new().extract(&tree, "demo.Unit");

    assert_eq!(
        unit.main.as_ref().expect("main").kind,
        DeclarationKind::Module
    );
    let statics = unit.statics.as_ref().expect("statics");
    let version = &statics["VERSION"];
    assert_eq!(version.ty, "String");
    assert!(version.constant);
    assert_eq!(version.value.as_deref(), Some("\"1.2\""));

    // The unrecognized section was skipped with a warning.
    assert!(unit.members.is_none());
    assert!(unit
        .diagnostics()
        .warnings()
        .iter()
        .any(|w| w.message.contains("Invalid section in Module: colors")));
}

#[test]
fn test_multiple_factories_last_match_wins() {
    let mut b = TreeBuilder::new();
    let (_, module_config) = factory(&mut b, "core.Module", 1);
    let statics = section(&mut b, module_config, "statics", 2);
    let max = pair(&mut b, statics, "MAX", 3);
    number(&mut b, max, "8", 3);

    let (_, class_config) = factory(&mut b, "core.Class", 10);
    let members = section(&mut b, class_config, "members", 11);
    let run = pair(&mut b, members, "run", 12);
    b.add(
        run,
        NodeKind::Function {
            params: Vec::new(),
        },
        12,
    );

    let tree = b.build();
    let unit = ApiExtractor::new().extract(&tree, "demo.Unit");

    assert_eq!(
        unit.main.as_ref().expect("main").kind,
        DeclarationKind::Class
    );
    assert!(unit.statics.is_some());
    assert!(unit.members.is_some());
    assert!(unit
        .diagnostics()
        .warnings()
        .iter()
        .any(|w| w.message.contains("Multiple unit declarations")));
}

#[test]
fn test_property_fields_and_nullable_default() {
    let mut b = TreeBuilder::new();
    let (_, config) = factory(&mut b, "core.Class", 1);
    let properties = section(&mut b, config, "properties", 2);

    // width: { type: "Number", init: 100, apply: function() {},
    //          fire: "changeWidth", themeable: true }
    let width = pair(&mut b, properties, "width", 3);
    let width_map = b.add(width, NodeKind::Map, 3);
    let p = pair(&mut b, width_map, "type", 3);
    string(&mut b, p, "Number", 3);
    let p = pair(&mut b, width_map, "init", 4);
    number(&mut b, p, "100", 4);
    let p = pair(&mut b, width_map, "apply", 5);
    b.add(
        p,
        NodeKind::Function {
            params: Vec::new(),
        },
        5,
    );
    let p = pair(&mut b, width_map, "fire", 6);
    string(&mut b, p, "changeWidth", 6);
    let p = pair(&mut b, width_map, "themeable", 7);
    b.add(p, NodeKind::Boolean { value: true }, 7);

    // color: { init: null }
    let color = pair(&mut b, properties, "color", 9);
    let color_map = b.add(color, NodeKind::Map, 9);
    let p = pair(&mut b, color_map, "init", 9);
    b.add(p, NodeKind::Null, 9);

    // padding: { group: ["top", "bottom"], shorthand: true }
    let padding = pair(&mut b, properties, "padding", 11);
    let padding_map = b.add(padding, NodeKind::Map, 11);
    let p = pair(&mut b, padding_map, "group", 11);
    let group = b.add(p, NodeKind::Array, 11);
    string(&mut b, group, "top", 11);
    string(&mut b, group, "bottom", 11);
    let p = pair(&mut b, padding_map, "shorthand", 12);
    b.add(p, NodeKind::Boolean { value: true }, 12);

    let tree = b.build();
    let unit = ApiExtractor::new().extract(&tree, "demo.Unit");
    let properties = unit.properties.as_ref().expect("properties");

    let width = &properties["width"];
    assert_eq!(width.ty.as_deref(), Some("Number"));
    assert_eq!(width.init.as_deref(), Some("100"));
    assert_eq!(width.fire.as_deref(), Some("changeWidth"));
    assert!(!width.nullable);
    assert_eq!(width.apply, Some(true));
    assert_eq!(width.themeable, Some(true));
    assert!(width.inheritable.is_none());

    let color = &properties["color"];
    assert!(color.nullable);
    assert_eq!(color.init.as_deref(), Some("null"));

    let padding = &properties["padding"];
    assert!(padding.nullable);
    assert_eq!(
        padding.group.as_deref(),
        Some(&["top".to_string(), "bottom".to_string()][..])
    );
    assert_eq!(padding.shorthand, Some(true));
}

#[test]
fn test_event_resolution() {
    let mut b = TreeBuilder::new();
    let root = b.root();

    // var sharedEvent = core.event.Pointer;
    let var = b.add(root, NodeKind::Var, 1);
    let decl = b.add(
        var,
        NodeKind::Declaration {
            name: "sharedEvent".to_string(),
        },
        1,
    );
    dot(&mut b, decl, "core.event.Pointer", 1);

    let (_, config) = factory(&mut b, "core.Class", 3);
    let events = section(&mut b, config, "events", 4);

    // click: core.event.Mouse
    let click = pair(&mut b, events, "click", 5);
    dot(&mut b, click, "core.event.Mouse", 5);

    // move: sharedEvent  -- resolved through the assignment
    let mv = pair(&mut b, events, "move", 6);
    ident(&mut b, mv, "sharedEvent", 6);

    // key: carries a comment with a declared type that wins
    let key = pair(&mut b, events, "key", 7);
    b.comment(
        key,
        Comment::doc("Key pressed.")
            .with_html("<p>Key pressed.</p>")
            .with_type("core.event.Key"),
    );
    dot(&mut b, key, "core.event.Mouse", 7);

    // wheel: only return-style annotation, tolerated as the type
    let wheel = pair(&mut b, events, "wheel", 8);
    b.comment(
        wheel,
        Comment::doc("Wheel turned.").with_return("core.event.Wheel"),
    );
    ident(&mut b, wheel, "unknownCarrier", 8);

    let tree = b.build();
    let unit = ApiExtractor::new().extract(&tree, "demo.Unit");
    let events = unit.events.as_ref().expect("events");

    assert_eq!(events["click"].ty.as_deref(), Some("core.event.Mouse"));
    assert_eq!(events["move"].ty.as_deref(), Some("core.event.Pointer"));
    assert_eq!(events["key"].ty.as_deref(), Some("core.event.Key"));
    assert_eq!(events["key"].doc.as_deref(), Some("<p>Key pressed.</p>"));
    assert_eq!(events["wheel"].ty.as_deref(), Some("core.event.Wheel"));
}

#[test]
fn test_uses_passthrough_from_scope() {
    let mut b = TreeBuilder::new();
    let mut scope = ScopeInfo::default();
    scope
        .shared
        .insert("core.Module".to_string(), serde_json::json!(1));
    scope
        .packages
        .insert("core".to_string(), serde_json::json!(3));
    b.scope(scope);

    let tree = b.build();
    let unit = ApiExtractor::new().extract(&tree, "demo.Unit");

    assert_eq!(unit.uses.get("core.Module"), Some(&serde_json::json!(1)));
    assert_eq!(unit.uses.get("core"), Some(&serde_json::json!(3)));
}

#[test]
fn test_extraction_is_deterministic_and_round_trips() {
    let mut b = TreeBuilder::new();
    let (_, config) = factory(&mut b, "core.Class", 1);
    let members = section(&mut b, config, "members", 2);
    let foo = pair(&mut b, members, "FOO", 3);
    number(&mut b, foo, "1", 3);
    let concat = pair(&mut b, members, "label", 4);
    let plus = b.add(concat, NodeKind::Plus, 4);
    string(&mut b, plus, "v", 4);
    number(&mut b, plus, "2", 4);

    let tree = b.build();
    let extractor = ApiExtractor::new();
    let first = extractor.extract(&tree, "demo.Unit");
    let second = extractor.extract(&tree, "demo.Unit");

    assert_eq!(first, second);
    assert_eq!(
        first.export().expect("export"),
        second.export().expect("export")
    );

    // Additive coercion with a string operand documents as String.
    let members = first.members.as_ref().expect("members");
    assert_eq!(members["label"].ty, "String");
    assert_eq!(members["label"].value.as_deref(), Some("\"v\"+2"));

    // Textual and binary round-trips reproduce the export exactly.
    let export = first.export().expect("export");
    let compact: serde_json::Value =
        serde_json::from_str(&first.to_json(false).expect("compact")).expect("parse compact");
    assert_eq!(compact, export);
    let pretty: serde_json::Value =
        serde_json::from_str(&first.to_json(true).expect("pretty")).expect("parse pretty");
    assert_eq!(pretty, export);
    let unpacked: serde_json::Value =
        rmp_serde::from_slice(&first.to_msgpack().expect("msgpack")).expect("decode msgpack");
    assert_eq!(unpacked, export);
}

#[test]
fn test_terminal_type_invariant() {
    let mut b = TreeBuilder::new();
    let root = b.root();

    // var factor = function() { return 2; };
    let var = b.add(root, NodeKind::Var, 1);
    let decl = b.add(
        var,
        NodeKind::Declaration {
            name: "factor".to_string(),
        },
        1,
    );
    let factor_fn = b.add(
        decl,
        NodeKind::Function {
            params: Vec::new(),
        },
        1,
    );
    let ret = b.add(factor_fn, NodeKind::Return, 1);
    number(&mut b, ret, "2", 1);

    let (_, config) = factory(&mut b, "core.Class", 3);
    let members = section(&mut b, config, "members", 4);

    // Every transient shape in one section.
    let call = pair(&mut b, members, "fromCall", 5);
    let call_node = b.add(call, NodeKind::Call, 5);
    ident(&mut b, call_node, "factor", 5);

    let hook = pair(&mut b, members, "fromHook", 6);
    let hook_node = b.add(hook, NodeKind::Hook, 6);
    ident(&mut b, hook_node, "flag", 6);
    b.add(hook_node, NodeKind::Null, 6);
    string(&mut b, hook_node, "deep", 6);

    let alias = pair(&mut b, members, "fromAlias", 7);
    ident(&mut b, alias, "factor", 7);

    let plus = pair(&mut b, members, "fromPlus", 8);
    let plus_node = b.add(plus, NodeKind::Plus, 8);
    number(&mut b, plus_node, "1", 8);
    number(&mut b, plus_node, "2", 8);

    let tree = b.build();
    let unit = ApiExtractor::new().extract(&tree, "demo.Unit");

    let members = unit.members.as_ref().expect("members");
    for entry in members.values() {
        assert!(
            !matches!(entry.ty.as_str(), "Call" | "Hook" | "Identifier" | "Plus"),
            "transient label escaped: {}",
            entry.ty
        );
    }
    assert_eq!(members["fromCall"].ty, "Number");
    assert_eq!(members["fromHook"].ty, "String");
    assert_eq!(members["fromAlias"].ty, "Function");
    assert_eq!(members["fromPlus"].ty, "Number");
}
