//! Route syntax, conflict, and matching behavior across the whole
//! admission pipeline: what the checker admits, the trie must route
//! unambiguously.

use oreo_core::method::Method;
use oreo_core::route::check::{route_conflict_check, route_rule_check};
use oreo_core::route::trie::RouteTrie;

fn admit(templates: &[&str]) -> Vec<String> {
    let mut admitted: Vec<String> = Vec::new();
    for template in templates {
        route_rule_check(template).unwrap();
        assert_eq!(
            route_conflict_check(&admitted, template),
            None,
            "{template} unexpectedly conflicts"
        );
        admitted.push(template.to_string());
    }
    admitted
}

fn build(templates: &[&str]) -> RouteTrie {
    let mut trie = RouteTrie::new();
    for template in admit(templates) {
        trie.add(Method::Get, &template);
    }
    trie
}

#[test]
fn admitted_set_routes_every_template_to_itself() {
    let templates = [
        "/users",
        "/users/:id",
        "/users/:id/comments",
        "/orders/:id",
        "/static/*path",
    ];
    let trie = build(&templates);

    assert_eq!(trie.find(Method::Get, "/users"), Some("/users".into()));
    assert_eq!(trie.find(Method::Get, "/users/7"), Some("/users/:id".into()));
    assert_eq!(
        trie.find(Method::Get, "/users/7/comments"),
        Some("/users/:id/comments".into())
    );
    assert_eq!(trie.find(Method::Get, "/orders/9"), Some("/orders/:id".into()));
    assert_eq!(
        trie.find(Method::Get, "/static/css/site.css"),
        Some("/static/*path".into())
    );
}

#[test]
fn conflicts_are_symmetric() {
    let pairs = [
        ("/users/:id", "/users/1"),
        ("/files/*path", "/files/a/b"),
        ("/a/*x", "/a/b/*y"),
    ];
    for (a, b) in pairs {
        assert!(
            route_conflict_check(&[a.to_string()], b).is_some(),
            "{b} must conflict with {a}"
        );
        assert!(
            route_conflict_check(&[b.to_string()], a).is_some(),
            "{a} must conflict with {b}"
        );
    }
}

#[test]
fn admitted_length_mismatch_limitation_is_matchable() {
    // the documented checker limitation: both admitted, static precedence
    // decides at match time
    let trie = build(&["/users/:id/comments", "/:a/:b"]);
    assert_eq!(trie.find(Method::Get, "/users/1"), Some("/:a/:b".into()));
    assert_eq!(
        trie.find(Method::Get, "/users/1/comments"),
        Some("/users/:id/comments".into())
    );
    assert_eq!(trie.find(Method::Get, "/boozers/1"), Some("/:a/:b".into()));
}

#[test]
fn trailing_slash_variants_are_rejected_not_admitted() {
    assert!(route_rule_check("/users/").is_err());
    assert!(route_rule_check("/users").is_ok());
}

#[test]
fn rejected_inputs_never_reach_the_conflict_checker() {
    for bad in ["", "/", "users", "/a//b", "/a/:", "/a/*", "/a/*x/y", "/a/b:c"] {
        assert!(route_rule_check(bad).is_err(), "{bad:?} must be rejected");
    }
}
