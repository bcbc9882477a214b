pub mod check;
pub mod trie;

use crate::error::Result;
use crate::method::Method;
use serde::{Deserialize, Serialize};

/// A route registration request: one uri plus its admitted methods.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteData {
    pub url: String,
    pub url_desc: String,
    pub methods: Vec<RouteMethodData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteMethodData {
    pub enable: bool,
    pub method: String,
    pub method_desc: String,
}

/// Validate a batch of route registrations: uri syntax and method names.
pub fn route_check(routes: &[RouteData]) -> Result<()> {
    for route in routes {
        let url = route.url.trim().to_lowercase();
        check::route_rule_check(&url)?;

        for m in &route.methods {
            Method::parse(&m.method)?;
        }
    }

    Ok(())
}
