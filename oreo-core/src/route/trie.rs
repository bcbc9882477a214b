use crate::method::Method;
use crate::route::check::{route_param_split, SegmentKind};
use std::collections::HashMap;

/// Prefix tree over the registered route templates of one group.
///
/// One root per HTTP method. Matching precedence is static > parameter >
/// wildcard, depth-first with backtracking, and a successful match returns
/// the original template string (e.g. `/users/:id`) so callers can key off
/// the canonical uri.
///
/// The trie is built once per snapshot and never mutated concurrently;
/// publishing a new generation is the route store's job.
#[derive(Debug, Default)]
pub struct RouteTrie {
    roots: HashMap<Method, Node>,
}

#[derive(Debug, Default)]
struct Node {
    static_children: HashMap<String, Node>,
    param_child: Option<Box<Node>>,
    /// Template terminating at this node (exact segment count).
    template: Option<String>,
    /// Template whose trailing `*` wildcard starts below this node. The
    /// wildcard consumes one or more remaining segments.
    wildcard_template: Option<String>,
}

impl RouteTrie {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a template under a method. The template is expected to have
    /// passed the syntax checker; it is lower-cased on the way in.
    pub fn add(&mut self, method: Method, template: &str) {
        let (segments, _) = route_param_split(template);
        let stored = template.trim().to_lowercase();

        let mut node = self.roots.entry(method).or_default();
        for segment in &segments {
            match segment.kind {
                SegmentKind::Static => {
                    node = node
                        .static_children
                        .entry(segment.value.clone())
                        .or_default();
                }
                SegmentKind::Param => {
                    node = node.param_child.get_or_insert_with(Box::default).as_mut();
                }
                SegmentKind::Wildcard => {
                    node.wildcard_template = Some(stored);
                    return;
                }
            }
        }
        node.template = Some(stored);
    }

    /// Match a concrete path, returning the registered template. The path
    /// is lower-cased before matching; `None` when nothing matches.
    pub fn find(&self, method: Method, path: &str) -> Option<String> {
        let root = self.roots.get(&method)?;

        let path = path.trim().to_lowercase();
        let trimmed = path.trim_matches('/');
        if trimmed.is_empty() {
            return None;
        }

        let segments: Vec<&str> = trimmed.split('/').collect();
        Self::find_node(root, &segments, 0).cloned()
    }

    fn find_node<'a>(node: &'a Node, segments: &[&str], depth: usize) -> Option<&'a String> {
        if depth == segments.len() {
            return node.template.as_ref();
        }

        if let Some(child) = node.static_children.get(segments[depth]) {
            if let Some(template) = Self::find_node(child, segments, depth + 1) {
                return Some(template);
            }
        }

        if let Some(child) = &node.param_child {
            if let Some(template) = Self::find_node(child, segments, depth + 1) {
                return Some(template);
            }
        }

        // wildcard swallows segments[depth..], which is non-empty here
        node.wildcard_template.as_ref()
    }

    /// Every registered (method, template) pair, for diagnostics.
    pub fn routes(&self) -> Vec<(Method, String)> {
        let mut out = Vec::new();
        for (method, root) in &self.roots {
            Self::collect(root, *method, &mut out);
        }
        out.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.bit().cmp(&b.0.bit())));
        out
    }

    fn collect(node: &Node, method: Method, out: &mut Vec<(Method, String)>) {
        if let Some(template) = &node.template {
            out.push((method, template.clone()));
        }
        if let Some(template) = &node.wildcard_template {
            out.push((method, template.clone()));
        }
        for child in node.static_children.values() {
            Self::collect(child, method, out);
        }
        if let Some(child) = &node.param_child {
            Self::collect(child, method, out);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trie(routes: &[(&str, &str)]) -> RouteTrie {
        let mut t = RouteTrie::new();
        for (method, template) in routes {
            t.add(Method::parse(method).unwrap(), template);
        }
        t
    }

    #[test]
    fn test_static_match() {
        let t = trie(&[("GET", "/users/list")]);
        assert_eq!(t.find(Method::Get, "/users/list"), Some("/users/list".into()));
        assert_eq!(t.find(Method::Get, "/users"), None);
        assert_eq!(t.find(Method::Get, "/users/list/extra"), None);
    }

    #[test]
    fn test_method_isolation() {
        let t = trie(&[("GET", "/users"), ("POST", "/orders")]);
        assert_eq!(t.find(Method::Get, "/users"), Some("/users".into()));
        assert_eq!(t.find(Method::Post, "/users"), None);
        assert_eq!(t.find(Method::Delete, "/users"), None);
    }

    #[test]
    fn test_param_match_returns_template() {
        let t = trie(&[("GET", "/users/:id")]);
        assert_eq!(t.find(Method::Get, "/users/42"), Some("/users/:id".into()));
        assert_eq!(t.find(Method::Get, "/users/42/x"), None);
    }

    #[test]
    fn test_deeper_param_route() {
        let t = trie(&[("GET", "/users/:id"), ("GET", "/users/:id/comments")]);
        assert_eq!(
            t.find(Method::Get, "/users/42/comments"),
            Some("/users/:id/comments".into())
        );
        assert_eq!(t.find(Method::Get, "/users/42"), Some("/users/:id".into()));
    }

    #[test]
    fn test_static_beats_param() {
        let t = trie(&[("GET", "/users/:id/comments"), ("GET", "/:a/:b")]);
        // static "users" wins at position 0, then needs "comments" at 2;
        // a two-segment path backtracks to the all-param route
        assert_eq!(t.find(Method::Get, "/boozers/1"), Some("/:a/:b".into()));
        assert_eq!(t.find(Method::Get, "/users/1"), Some("/:a/:b".into()));
        assert_eq!(
            t.find(Method::Get, "/users/1/comments"),
            Some("/users/:id/comments".into())
        );
    }

    #[test]
    fn test_wildcard_needs_a_segment() {
        let t = trie(&[("GET", "/files/*path")]);
        assert_eq!(t.find(Method::Get, "/files/a"), Some("/files/*path".into()));
        assert_eq!(
            t.find(Method::Get, "/files/a/b/c"),
            Some("/files/*path".into())
        );
        assert_eq!(t.find(Method::Get, "/files"), None);
    }

    #[test]
    fn test_param_beats_wildcard() {
        let t = trie(&[("GET", "/files/:name"), ("GET", "/static/*path")]);
        assert_eq!(t.find(Method::Get, "/files/a"), Some("/files/:name".into()));
        assert_eq!(t.find(Method::Get, "/static/a"), Some("/static/*path".into()));
    }

    #[test]
    fn test_match_is_case_insensitive() {
        let t = trie(&[("GET", "/Users/:id")]);
        assert_eq!(t.find(Method::Get, "/USERS/42"), Some("/users/:id".into()));
    }

    #[test]
    fn test_root_path_never_matches() {
        let t = trie(&[("GET", "/users")]);
        assert_eq!(t.find(Method::Get, "/"), None);
        assert_eq!(t.find(Method::Get, ""), None);
    }

    #[test]
    fn test_routes_listing() {
        let t = trie(&[("GET", "/b"), ("POST", "/b"), ("GET", "/a/*rest")]);
        let routes = t.routes();
        assert_eq!(
            routes,
            vec![
                (Method::Get, "/a/*rest".to_string()),
                (Method::Get, "/b".to_string()),
                (Method::Post, "/b".to_string()),
            ]
        );
    }
}
