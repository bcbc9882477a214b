use crate::authorization::Authorization;
use arc_swap::ArcSwap;
use async_trait::async_trait;
use oreo_core::error::{OreoError, Result};
use oreo_core::method::Method;
use oreo_core::model::{RouterInfo, VerifyData};
use oreo_core::route::check::route_conflict_check;
use oreo_core::route::trie::RouteTrie;
use oreo_core::route::{route_check, RouteData};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};

/// Capability set of a route store. Selected at construction: the
/// concurrent variant for multi-reader deployments, the singleton variant
/// for single-process ones and tests.
#[async_trait]
pub trait RouteStore: Send + Sync {
    /// Validate, dedup against the persisted catalog, conflict-check the
    /// genuinely new uris, and persist the additions.
    async fn add_route(&self, group: &str, routes: &[RouteData]) -> Result<()>;

    async fn enable_route_data_auth(&self, group: &str, url: &str, method: &str) -> Result<()>;

    async fn disable_route_data_auth(&self, group: &str, url: &str, method: &str) -> Result<()>;

    async fn delete_route_by_method(&self, group: &str, url: &str, method: &str) -> Result<()>;

    async fn delete_route(&self, group: &str, url: &str) -> Result<()>;

    /// Rebuild the in-memory routing table from persistence.
    async fn load_routes_from_db(&self, group: &str) -> Result<()>;

    /// Periodically rebuild until the shutdown signal fires.
    async fn reload_routes_from_db(
        &self,
        group: &str,
        interval: Duration,
        shutdown: watch::Receiver<bool>,
    );

    /// Lock-free on the concurrent variant: resolve a concrete request to
    /// its registered template.
    fn match_route(&self, group: &str, method: &str, url: &str) -> Option<String>;

    /// Emit every registered route through tracing, for diagnostics.
    fn log_all_routes(&self);
}

/// Shared admission pipeline: syntax + method validation, merge against the
/// stored catalog (existing (uri, method) pairs are never overwritten and
/// an existing uri keeps its stored desc), conflict check of the new uris,
/// then batch upsert. Returns what was admitted.
async fn admit_routes(
    auth: &Authorization,
    group: &str,
    routes: &[RouteData],
) -> Result<Vec<RouterInfo>> {
    route_check(routes)?;

    let (db_routes, mut old_urls) = auth.router_get_info_and_urls().await?;

    let mut add_routes: Vec<RouterInfo> = Vec::new();
    let mut add_urls: Vec<String> = Vec::new();

    for route in routes {
        let uri = route.url.trim().to_lowercase();
        let mut info = RouterInfo {
            uri: uri.clone(),
            desc: route.url_desc.clone(),
            group_name: group.to_string(),
            method_map: HashMap::new(),
        };

        if let Some(db_route) = db_routes.iter().find(|r| r.uri == uri) {
            let mut has_new_method = false;
            for m in &route.methods {
                let method = Method::parse(&m.method)?;
                if !db_route.method_map.contains_key(method.bit_str()) {
                    info.method_map.insert(
                        method.bit_str().to_string(),
                        VerifyData {
                            enable: m.enable,
                            method_desc: m.method_desc.clone(),
                        },
                    );
                    has_new_method = true;
                }
            }
            if has_new_method {
                info.desc = db_route.desc.clone();
                add_routes.push(info);
            }
        } else {
            add_urls.push(uri.clone());
            for m in &route.methods {
                let method = Method::parse(&m.method)?;
                info.method_map.insert(
                    method.bit_str().to_string(),
                    VerifyData {
                        enable: m.enable,
                        method_desc: m.method_desc.clone(),
                    },
                );
            }
            add_routes.push(info);
        }
    }

    // only new uris can introduce ambiguity; method additions cannot
    for url in &add_urls {
        if let Some(existing) = route_conflict_check(&old_urls, url) {
            return Err(OreoError::RouteConflict {
                uri: url.clone(),
                existing,
            });
        }
        old_urls.push(url.clone());
    }

    auth.router_upsert_batch(&add_routes).await?;
    Ok(add_routes)
}

async fn build_trie(auth: &Authorization) -> Result<RouteTrie> {
    let routes = auth.router_get_method().await?;

    let mut trie = RouteTrie::new();
    for (uri, methods) in routes {
        for method in methods {
            trie.add(method, &uri);
        }
    }
    Ok(trie)
}

fn parse_toggle_args(url: &str, method: &str) -> Result<(String, Method)> {
    let method = Method::parse(method)?;
    Ok((url.trim().to_lowercase(), method))
}

// ── concurrent variant ──────────────────────────────────────────

/// Lock-free-read route store.
///
/// Writers build a fresh `group → trie` map and publish it with one atomic
/// pointer store (release semantics); readers load the current snapshot
/// and traverse it without locks. The previous generation stays alive only
/// until its in-flight readers drop their guards.
///
/// Catalog mutations here touch persistence only; the reload loop picks
/// them up on its next tick.
pub struct ConcurrentRouteStore {
    routers: ArcSwap<HashMap<String, RouteTrie>>,
    auth: Arc<Authorization>,
}

impl ConcurrentRouteStore {
    pub fn new(auth: Arc<Authorization>) -> Self {
        Self {
            routers: ArcSwap::new(Arc::new(HashMap::new())),
            auth,
        }
    }
}

#[async_trait]
impl RouteStore for ConcurrentRouteStore {
    async fn add_route(&self, group: &str, routes: &[RouteData]) -> Result<()> {
        admit_routes(&self.auth, group, routes).await?;
        Ok(())
    }

    async fn enable_route_data_auth(&self, _group: &str, url: &str, method: &str) -> Result<()> {
        let (url, method) = parse_toggle_args(url, method)?;
        self.auth.router_verify_data(&url, method, true).await
    }

    async fn disable_route_data_auth(&self, _group: &str, url: &str, method: &str) -> Result<()> {
        let (url, method) = parse_toggle_args(url, method)?;
        self.auth.router_verify_data(&url, method, false).await
    }

    async fn delete_route_by_method(&self, _group: &str, url: &str, method: &str) -> Result<()> {
        let (url, method) = parse_toggle_args(url, method)?;
        self.auth.router_del_method(&url, method).await
    }

    async fn delete_route(&self, _group: &str, url: &str) -> Result<()> {
        let url = url.trim().to_lowercase();
        self.auth.router_remove(&url).await
    }

    async fn load_routes_from_db(&self, group: &str) -> Result<()> {
        let trie = build_trie(&self.auth).await?;

        let mut routers = HashMap::new();
        routers.insert(group.to_string(), trie);

        self.routers.store(Arc::new(routers));
        Ok(())
    }

    async fn reload_routes_from_db(
        &self,
        group: &str,
        interval: Duration,
        mut shutdown: watch::Receiver<bool>,
    ) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // interval fires immediately once; the initial load already ran
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.load_routes_from_db(group).await {
                        // old generation stays active
                        warn!(error = %e, group = group, "route reload failed");
                    }
                }
                _ = shutdown.changed() => break,
            }
        }

        info!(group = group, "route reload loop stopped");
    }

    fn match_route(&self, group: &str, method: &str, url: &str) -> Option<String> {
        let method = Method::parse(method).ok()?;
        let routers = self.routers.load();
        routers.get(group)?.find(method, url)
    }

    fn log_all_routes(&self) {
        let routers = self.routers.load();
        for (group, trie) in routers.iter() {
            for (method, template) in trie.routes() {
                info!(group = %group, method = %method, template = %template, "route");
            }
        }
    }
}

// ── singleton variant ───────────────────────────────────────────

/// Single-process route store: one routing table behind a RwLock.
/// Additions are inserted into the live trie; deletions rebuild from
/// persistence immediately, so no reload loop is needed.
pub struct SingletonRouteStore {
    routers: RwLock<HashMap<String, RouteTrie>>,
    auth: Arc<Authorization>,
}

impl SingletonRouteStore {
    pub fn new(auth: Arc<Authorization>) -> Self {
        Self {
            routers: RwLock::new(HashMap::new()),
            auth,
        }
    }
}

#[async_trait]
impl RouteStore for SingletonRouteStore {
    async fn add_route(&self, group: &str, routes: &[RouteData]) -> Result<()> {
        let admitted = admit_routes(&self.auth, group, routes).await?;

        let mut routers = self
            .routers
            .write()
            .map_err(|_| OreoError::Internal("route table lock poisoned".into()))?;
        let trie = routers.entry(group.to_string()).or_default();
        for info in &admitted {
            for bit in info.method_map.keys() {
                if let Some(method) = Method::from_bit_str(bit) {
                    trie.add(method, &info.uri);
                }
            }
        }
        Ok(())
    }

    async fn enable_route_data_auth(&self, _group: &str, url: &str, method: &str) -> Result<()> {
        let (url, method) = parse_toggle_args(url, method)?;
        self.auth.router_verify_data(&url, method, true).await
    }

    async fn disable_route_data_auth(&self, _group: &str, url: &str, method: &str) -> Result<()> {
        let (url, method) = parse_toggle_args(url, method)?;
        self.auth.router_verify_data(&url, method, false).await
    }

    async fn delete_route_by_method(&self, group: &str, url: &str, method: &str) -> Result<()> {
        let (url, method) = parse_toggle_args(url, method)?;
        self.auth.router_del_method(&url, method).await?;
        self.load_routes_from_db(group).await
    }

    async fn delete_route(&self, group: &str, url: &str) -> Result<()> {
        let url = url.trim().to_lowercase();
        self.auth.router_remove(&url).await?;
        self.load_routes_from_db(group).await
    }

    async fn load_routes_from_db(&self, group: &str) -> Result<()> {
        let trie = build_trie(&self.auth).await?;

        let mut routers = self
            .routers
            .write()
            .map_err(|_| OreoError::Internal("route table lock poisoned".into()))?;
        routers.insert(group.to_string(), trie);
        Ok(())
    }

    async fn reload_routes_from_db(
        &self,
        _group: &str,
        _interval: Duration,
        _shutdown: watch::Receiver<bool>,
    ) {
        // deletions rebuild eagerly and additions are incremental, so the
        // singleton variant has nothing to refresh
    }

    fn match_route(&self, group: &str, method: &str, url: &str) -> Option<String> {
        let method = Method::parse(method).ok()?;
        let routers = self.routers.read().ok()?;
        routers.get(group)?.find(method, url)
    }

    fn log_all_routes(&self) {
        let Ok(routers) = self.routers.read() else {
            return;
        };
        for (group, trie) in routers.iter() {
            for (method, template) in trie.routes() {
                info!(group = %group, method = %method, template = %template, "route");
            }
        }
    }
}
