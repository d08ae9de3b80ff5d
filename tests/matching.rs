//! End-to-end matching behavior.

use std::time::{Duration, Instant};

use dfa_router::constraints::{ConstraintMap, RegexSettings};
use dfa_router::routing::{DfaMatcherBuilder, Endpoint, MAX_SEGMENTS};

mod common;
use common::{endpoint, matched, matcher, matcher_from};

#[test]
fn test_literal_tree_shape() {
    let mut builder = DfaMatcherBuilder::new(ConstraintMap::default());
    for (name, template) in [("one", "a/b/c"), ("two", "a/b/d"), ("three", "a/e")] {
        builder.add_endpoint(endpoint(name, template)).unwrap();
    }
    let tree = builder.build_dfa_tree().unwrap();

    let root = tree.root();
    assert_eq!(root.literals.len(), 1);
    let a = tree.literal(0, "a").unwrap();
    assert_eq!(tree.node(a).literals.len(), 2);
    let b = tree.literal(a, "b").unwrap();
    assert_eq!(tree.node(b).literals.len(), 2);

    let cases: [(&[&str], usize, &str); 3] = [
        (&["a", "b", "c"], 3, "one"),
        (&["a", "b", "d"], 3, "two"),
        (&["a", "e"], 2, "three"),
    ];
    for (path, depth, name) in cases {
        let mut node = 0;
        for text in path {
            node = tree.literal(node, text).unwrap();
        }
        assert_eq!(tree.node(node).depth, depth);
        assert_eq!(tree.match_names(node), vec![name]);
        assert!(tree.node(node).parameters.is_none());
    }
}

#[test]
fn test_literal_beats_parameter() {
    let m = matcher(&[("literal", "a/b/c"), ("param", "a/{x}/c")]);

    let names: Vec<&str> = m
        .candidates_for("/a/b/c")
        .iter()
        .map(|c| c.endpoint().display_name())
        .collect();
    assert_eq!(names, vec!["literal", "param"]);
    assert_eq!(matched(&m, "GET", "/a/b/c").as_deref(), Some("literal"));

    let names: Vec<&str> = m
        .candidates_for("/a/q/c")
        .iter()
        .map(|c| c.endpoint().display_name())
        .collect();
    assert_eq!(names, vec!["param"]);

    let found = m.match_path("/a/q/c", "GET").unwrap();
    assert_eq!(found.values.get("x"), Some("q"));
}

#[test]
fn test_catch_all_self_loop_and_matching() {
    let mut builder = DfaMatcherBuilder::new(ConstraintMap::default());
    builder.add_endpoint(endpoint("rest", "{a}/{*b}")).unwrap();
    let tree = builder.build_dfa_tree().unwrap();

    let a = tree.root().parameters.unwrap();
    let catch_all = tree.node(a).catch_all.unwrap();
    assert_eq!(tree.node(catch_all).parameters, Some(catch_all));
    assert_eq!(tree.node(catch_all).catch_all, Some(catch_all));

    let m = builder.build().unwrap();
    let short = m.match_path("/x", "GET").unwrap();
    assert_eq!(short.values.get("a"), Some("x"));
    assert!(short.values.get("b").is_none());

    let long = m.match_path("/x/y/z", "GET").unwrap();
    assert_eq!(long.values.get("a"), Some("x"));
    assert_eq!(long.values.get("b"), Some("y/z"));
}

#[test]
fn test_lower_order_wins() {
    let m = matcher_from([
        Endpoint::builder("late", "items/{id}").order(5).build().unwrap(),
        Endpoint::builder("early", "items/{name}").order(1).build().unwrap(),
    ]);
    assert_eq!(matched(&m, "GET", "/items/1").as_deref(), Some("early"));

    // order beats precedence
    let m = matcher_from([
        Endpoint::builder("literal", "items/new").order(2).build().unwrap(),
        Endpoint::builder("param", "items/{id}").order(1).build().unwrap(),
    ]);
    assert_eq!(matched(&m, "GET", "/items/new").as_deref(), Some("param"));
}

#[test]
fn test_method_constrained_entry() {
    let m = matcher_from([
        Endpoint::builder("any", "orders/{id}").build().unwrap(),
        Endpoint::builder("create", "orders/{id}").method("POST").build().unwrap(),
    ]);
    assert_eq!(matched(&m, "POST", "/orders/7").as_deref(), Some("create"));
    assert_eq!(matched(&m, "post", "/orders/7").as_deref(), Some("create"));
    assert_eq!(matched(&m, "GET", "/orders/7").as_deref(), Some("any"));
}

#[test]
fn test_method_only_routes() {
    let m = matcher_from([
        Endpoint::builder("list", "orders").method("GET").build().unwrap(),
        Endpoint::builder("create", "orders").method("POST").build().unwrap(),
    ]);
    assert_eq!(matched(&m, "GET", "/orders").as_deref(), Some("list"));
    assert_eq!(matched(&m, "POST", "/orders").as_deref(), Some("create"));
    assert!(matched(&m, "DELETE", "/orders").is_none());
}

#[test]
fn test_reflexive_literal_routes() {
    let routes: Vec<(String, String)> = (0..40)
        .map(|i| (format!("route{}", i), format!("section{}/page{}/v{}", i % 4, i, i % 3)))
        .collect();
    let m = matcher_from(routes.iter().map(|(name, template)| endpoint(name, template)));

    for (name, template) in &routes {
        assert_eq!(matched(&m, "GET", &format!("/{}", template)).as_deref(), Some(name.as_str()));
        assert_eq!(
            matched(&m, "GET", &format!("/{}", template.to_uppercase())).as_deref(),
            Some(name.as_str())
        );
    }
    assert!(matched(&m, "GET", "/section0/page0").is_none());
}

#[test]
fn test_catastrophic_regex_fails_within_budget() {
    let settings = RegexSettings {
        timeout: Duration::from_secs(2),
        ..RegexSettings::default()
    };
    let mut builder = DfaMatcherBuilder::new(ConstraintMap::with_defaults(settings));
    builder
        .add_endpoint(endpoint("evil", "check/{value:regex(^(a+)+$)}"))
        .unwrap();
    let m = builder.build().unwrap();

    let path = format!("/check/{}!", "a".repeat(5000));
    let started = Instant::now();
    assert!(m.match_path(&path, "GET").is_none());
    assert!(started.elapsed() < Duration::from_secs(2));

    assert!(m.match_path("/check/aaaa", "GET").is_some());
}

#[test]
fn test_constraints_filter_candidates() {
    let m = matcher_from([
        Endpoint::builder("by-id", "products/{id:int}").build().unwrap(),
        Endpoint::builder("by-slug", "products/{slug}").order(1).build().unwrap(),
        Endpoint::builder("page", "pages/{n}")
            .constraint("n", "range(1,10)")
            .build()
            .unwrap(),
    ]);

    let found = m.match_path("/products/42", "GET").unwrap();
    assert_eq!(found.endpoint.display_name(), "by-id");
    assert_eq!(found.values.get("id"), Some("42"));

    let found = m.match_path("/products/shoes", "GET").unwrap();
    assert_eq!(found.endpoint.display_name(), "by-slug");
    assert_eq!(found.values.get("slug"), Some("shoes"));
    assert!(found.values.get("id").is_none());

    assert!(matched(&m, "GET", "/pages/5").is_some());
    assert!(matched(&m, "GET", "/pages/11").is_none());
}

#[test]
fn test_optional_and_default_values() {
    let m = matcher_from([
        Endpoint::builder("item", "items/{id:int?}").build().unwrap(),
        Endpoint::builder("report", "reports/{year}/{format=pdf}")
            .default_value("year", "2024")
            .default_value("area", "finance")
            .build()
            .unwrap(),
    ]);

    let found = m.match_path("/items", "GET").unwrap();
    assert!(found.values.get("id").is_none());
    assert!(matched(&m, "GET", "/items/3").is_some());
    assert!(matched(&m, "GET", "/items/three").is_none());

    let found = m.match_path("/reports", "GET").unwrap();
    assert_eq!(found.values.get("year"), Some("2024"));
    assert_eq!(found.values.get("format"), Some("pdf"));
    assert_eq!(found.values.get("area"), Some("finance"));

    let found = m.match_path("/reports/2020/csv", "GET").unwrap();
    assert_eq!(found.values.get("year"), Some("2020"));
    assert_eq!(found.values.get("format"), Some("csv"));
}

#[test]
fn test_complex_segments() {
    let m = matcher(&[("file", "files/{name}.{ext}"), ("folder", "files/{folder}")]);

    let found = m.match_path("/files/report.pdf", "GET").unwrap();
    assert_eq!(found.endpoint.display_name(), "file");
    assert_eq!(found.values.get("name"), Some("report"));
    assert_eq!(found.values.get("ext"), Some("pdf"));

    assert_eq!(matched(&m, "GET", "/files/docs").as_deref(), Some("folder"));
}

#[test]
fn test_path_edge_cases() {
    let m = matcher(&[("home", ""), ("a", "a"), ("tail", "t/{*rest}")]);

    assert_eq!(matched(&m, "GET", "/").as_deref(), Some("home"));
    assert_eq!(matched(&m, "GET", "/a/").as_deref(), Some("a"));
    assert_eq!(matched(&m, "GET", "/A").as_deref(), Some("a"));
    assert!(matched(&m, "GET", "/a//").is_none());
    assert_eq!(matched(&m, "GET", "/t//x").as_deref(), Some("tail"));

    let too_deep = "/t".to_string() + &"/x".repeat(MAX_SEGMENTS);
    assert!(matched(&m, "GET", &too_deep).is_none());
    let deep = "/t".to_string() + &"/x".repeat(MAX_SEGMENTS - 1);
    assert_eq!(matched(&m, "GET", &deep).as_deref(), Some("tail"));
}

#[test]
fn test_ambiguous_candidates_first_wins() {
    // Same order and precedence, different templates: one group, both match.
    let m = matcher(&[("b-route", "x/{b}"), ("a-route", "x/{a}")]);
    let found = m.match_path("/x/1", "GET").unwrap();
    assert_eq!(found.endpoint.display_name(), "a-route");
}
