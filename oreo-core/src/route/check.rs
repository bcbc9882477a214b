use crate::error::{OreoError, Result};

/// Characters a route may contain.
fn char_check(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '/' || c == ':' || c == '*' || c == '_' || c == '-'
}

/// Validate a single route template.
///
/// Routes must pick one canonical spelling: a trailing '/' would make the
/// match result ambiguous, so it is rejected outright, as are duplicate
/// slashes and the bare root.
pub fn route_rule_check(fullroute: &str) -> Result<()> {
    let route = fullroute.trim();

    if route.is_empty() {
        return Err(OreoError::Validation("route is null".into()));
    }

    if route.len() == 1 {
        return Err(OreoError::Validation("route can't be '/'".into()));
    }

    if !route.starts_with('/') {
        return Err(OreoError::Validation(
            "route first character must be '/'".into(),
        ));
    }

    if route.ends_with('/') {
        return Err(OreoError::Validation(
            "route last character mustn't be '/'".into(),
        ));
    }

    if !route.chars().all(char_check) {
        return Err(OreoError::Validation(format!(
            "route [{}] just support [a-zA-Z0-9-/_*:]",
            fullroute
        )));
    }

    if route.starts_with("//") {
        return Err(OreoError::Validation(
            "route prefix should just one '/'".into(),
        ));
    }

    let params: Vec<&str> = route.trim_matches('/').split('/').collect();

    for (index, param) in params.iter().enumerate() {
        if param.is_empty() {
            return Err(OreoError::Validation("route param is empty".into()));
        }

        let mut chars = param.chars();
        let head = chars.next().unwrap();

        if head == ':' {
            if param.len() == 1 {
                return Err(OreoError::Validation("route wildcard is empty".into()));
            }
            if chars.any(|c| c == ':' || c == '*') {
                return Err(OreoError::Validation(
                    "route wildcard have too many ':' or '*'".into(),
                ));
            }
            // parameter names must be unique within one route
            if params[..index].contains(param) {
                return Err(OreoError::Validation(
                    "params in route has duplicate names".into(),
                ));
            }
        } else if head == '*' {
            if param.len() == 1 {
                return Err(OreoError::Validation("route wildcard is empty".into()));
            }
            if chars.any(|c| c == ':' || c == '*') {
                return Err(OreoError::Validation(
                    "route wildcard have too many ':' or '*'".into(),
                ));
            }
            if index != params.len() - 1 {
                return Err(OreoError::Validation(
                    "route * wildcard must be last".into(),
                ));
            }
        } else if param.contains(':') || param.contains('*') {
            return Err(OreoError::Validation("route static has : or *".into()));
        }
    }

    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Static,
    Param,
    Wildcard,
}

#[derive(Debug, Clone)]
pub struct Segment {
    pub kind: SegmentKind,
    pub value: String,
}

/// Split a route into typed segments. The route is lower-cased first, so
/// matching and conflict checking are case-insensitive. The bool reports
/// whether the route ends in a `*` wildcard.
pub fn route_param_split(fullroute: &str) -> (Vec<Segment>, bool) {
    let route = fullroute.trim().to_lowercase();
    let route = route.trim_matches('/');

    let mut nodes = Vec::new();
    let mut matchall = false;

    if route.is_empty() {
        return (nodes, matchall);
    }

    for param in route.split('/') {
        if let Some(name) = param.strip_prefix(':') {
            nodes.push(Segment {
                kind: SegmentKind::Param,
                value: name.to_string(),
            });
        } else if let Some(name) = param.strip_prefix('*') {
            matchall = true;
            nodes.push(Segment {
                kind: SegmentKind::Wildcard,
                value: name.to_string(),
            });
        } else {
            nodes.push(Segment {
                kind: SegmentKind::Static,
                value: param.to_string(),
            });
        }
    }

    (nodes, matchall)
}

/// Decide whether a candidate route would ambiguously match against any of
/// the admitted ones. Returns the first conflicting admitted uri.
///
/// Parameter segments match anything positionally, so only static-vs-static
/// text can tell two routes apart. Routes that differ in segment count and
/// carry no wildcard never conflict, even when one is all-parameters
/// (`/users/:id/comments` vs `/:a/:b`): static precedence steers concrete
/// paths to one of them, and users are expected to avoid the overlap.
pub fn route_conflict_check(old_routes: &[String], new_route: &str) -> Option<String> {
    let (new_nodes, new_wild) = route_param_split(new_route);
    let new_len = new_nodes.len();

    for old_route in old_routes {
        let (old_nodes, old_wild) = route_param_split(old_route);
        let old_len = old_nodes.len();

        if !new_wild && !old_wild {
            if old_len != new_len {
                continue;
            }
            let mut i = 0;
            while i < old_len {
                let o = &old_nodes[i];
                let n = &new_nodes[i];
                if o.kind == SegmentKind::Static
                    && n.kind == SegmentKind::Static
                    && o.value != n.value
                {
                    break;
                }
                i += 1;
            }
            // every position matched, so some concrete path hits both
            if i >= old_len {
                return Some(old_route.clone());
            }
        } else if !new_wild && old_wild {
            let mut i = 0;
            while i < old_len {
                match old_nodes[i].kind {
                    SegmentKind::Static => {
                        if i >= new_len {
                            break;
                        }
                        let n = &new_nodes[i];
                        if n.kind == SegmentKind::Static && old_nodes[i].value != n.value {
                            break;
                        }
                    }
                    SegmentKind::Param => {}
                    SegmentKind::Wildcard => {
                        // the wildcard swallows whatever the new route
                        // still has; exhausted new route means no overlap
                        if i < new_len {
                            return Some(old_route.clone());
                        }
                    }
                }
                i += 1;
            }
        } else if new_wild && !old_wild {
            let mut i = 0;
            while i < new_len {
                match new_nodes[i].kind {
                    SegmentKind::Static => {
                        if i >= old_len {
                            break;
                        }
                        let o = &old_nodes[i];
                        if o.kind == SegmentKind::Static && new_nodes[i].value != o.value {
                            break;
                        }
                    }
                    SegmentKind::Param => {}
                    SegmentKind::Wildcard => {
                        if i < old_len {
                            return Some(old_route.clone());
                        }
                    }
                }
                i += 1;
            }
        } else {
            // both end in a wildcard: compare the shorter prefix; if every
            // static pair agrees, the longer route's tail falls inside the
            // shorter one's wildcard
            let new_prefix = &new_nodes[..new_len - 1];
            let old_prefix = &old_nodes[..old_len - 1];
            let (short, long) = if new_prefix.len() > old_prefix.len() {
                (old_prefix, new_prefix)
            } else {
                (new_prefix, old_prefix)
            };

            let mut i = 0;
            while i < short.len() {
                let s = &short[i];
                let l = &long[i];
                if s.kind == SegmentKind::Static
                    && l.kind == SegmentKind::Static
                    && s.value != l.value
                {
                    break;
                }
                i += 1;
            }
            if i >= short.len() {
                return Some(old_route.clone());
            }
        }
    }

    None
}
