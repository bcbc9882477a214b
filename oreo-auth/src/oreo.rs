use crate::authorization::Authorization;
use crate::route_store::{ConcurrentRouteStore, RouteStore, SingletonRouteStore};
use oreo_core::config::OreoConfig;
use oreo_core::error::{OreoError, Result};
use oreo_core::method::Method;
use oreo_core::model::{
    AddUser, Address, AuthDecision, RoleListView, RoleUserListView, RouteListView, SignListView,
    UpsertRoleInfo, UpsertSignInfo, UserDetail, UserInfo, UserSignList,
};
use oreo_core::route::RouteData;
use oreo_store::AuthStore;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

/// Library facade: the verb surface the host binds.
///
/// Construction ensures the group record, builds the configured route-store
/// variant, loads the catalog, and (concurrent variant) spawns the reload
/// loop. `stop` fires the loop's shutdown signal.
pub struct Oreo {
    auth: Arc<Authorization>,
    route: Arc<dyn RouteStore>,
    group_name: String,
    shutdown: watch::Sender<bool>,
}

impl Oreo {
    pub async fn new(config: &OreoConfig, store: Arc<dyn AuthStore>) -> Result<Oreo> {
        let group_name = config.group_name.clone();
        let auth = Arc::new(Authorization::new(group_name.clone(), store).await?);

        let route: Arc<dyn RouteStore> = if config.singleton {
            Arc::new(SingletonRouteStore::new(auth.clone()))
        } else {
            Arc::new(ConcurrentRouteStore::new(auth.clone()))
        };

        route.load_routes_from_db(&group_name).await?;

        let (shutdown, shutdown_rx) = watch::channel(false);

        if !config.singleton {
            let route = route.clone();
            let group = group_name.clone();
            let interval = config.cache_interval();
            tokio::spawn(async move {
                route.reload_routes_from_db(&group, interval, shutdown_rx).await;
            });
        }

        info!(group = %group_name, singleton = config.singleton, "oreo initialized");

        Ok(Oreo {
            auth,
            route,
            group_name,
            shutdown,
        })
    }

    /// Stop the background reload loop.
    pub fn stop(&self) {
        let _ = self.shutdown.send(true);
    }

    pub fn group_name(&self) -> &str {
        &self.group_name
    }

    // ── auth ────────────────────────────────────────────────────

    /// Hot-path decision: role permission, then (when the matched route
    /// method requires it) data permission via the sign key.
    pub async fn check_user_auth(
        &self,
        url: &str,
        method: &str,
        user_id: &str,
        sign_key: &str,
    ) -> AuthDecision {
        let method = match Method::parse(method) {
            Ok(m) => m,
            Err(_) => {
                return AuthDecision::deny(
                    false,
                    format!("[{} {}] - unsupported method", method.trim(), url),
                );
            }
        };

        let Some(rawurl) = self.route.match_route(&self.group_name, method.as_str(), url) else {
            return AuthDecision::deny(
                false,
                format!("[{} {}] - route did not match", method, url),
            );
        };

        let (is_admin, role_auth, exist_data_auth) =
            self.auth.query_role_auth(&rawurl, method, user_id).await;

        if !role_auth {
            return AuthDecision::deny(
                is_admin,
                format!(
                    "[{}] has no role permission on route [{} {}]",
                    user_id, method, rawurl
                ),
            );
        }

        if !exist_data_auth {
            return AuthDecision::allow(is_admin);
        }

        if !self.auth.query_sign_auth(sign_key, &rawurl, method, user_id).await {
            return AuthDecision::deny(
                is_admin,
                format!(
                    "[{} {}] has no data permission on [{} {}]",
                    user_id, sign_key, method, rawurl
                ),
            );
        }

        AuthDecision::allow(is_admin)
    }

    /// Every (uri, methodValue) the user's roles grant, plus whether any
    /// of those roles is the super-admin.
    pub async fn query_user_grant_route(
        &self,
        user_id: &str,
    ) -> Result<(HashMap<String, u8>, bool)> {
        self.auth.user_grant_route(user_id).await
    }

    /// Sign keys usable to create data on the matched route.
    pub async fn query_user_create_data_sign_key(
        &self,
        url: &str,
        method: &str,
        user_id: &str,
    ) -> Result<HashMap<String, String>> {
        let m = Method::parse(method)?;
        let rawurl = self
            .route
            .match_route(&self.group_name, m.as_str(), url)
            .ok_or_else(|| {
                OreoError::NotFound(format!("[{} {}] - route did not match", url, method))
            })?;
        self.auth.user_create_data_sign_key(user_id, &rawurl, m).await
    }

    /// Sign keys the user holds for the matched route.
    pub async fn query_user_sign_by_url(
        &self,
        url: &str,
        method: &str,
        user_id: &str,
    ) -> Result<Vec<String>> {
        let m = Method::parse(method)?;
        let rawurl = self
            .route
            .match_route(&self.group_name, m.as_str(), url)
            .ok_or_else(|| {
                OreoError::NotFound(format!("[{} {}] - route did not match", url, method))
            })?;
        self.auth.user_own_signs_by_uri(user_id, &rawurl, m).await
    }

    /// Emit the active routing table through tracing.
    pub fn log_routes(&self) {
        self.route.log_all_routes();
    }

    // ── users ───────────────────────────────────────────────────

    /// All users, id and name only.
    pub async fn get_all_users(&self) -> Result<Vec<UserDetail>> {
        self.auth.get_all_users().await
    }

    /// Create a user with an auto-minted private sign key, enrolled into
    /// the default role.
    pub async fn add_user(&self, user_id: &str, name: &str) -> Result<()> {
        self.auth
            .user_add_info(AddUser {
                user_id: user_id.to_string(),
                name: name.to_string(),
            })
            .await
    }

    pub async fn check_user_exist(&self, user_id: &str) -> bool {
        self.auth.user_check_exist(user_id).await
    }

    /// Create a bare user without sign key or role enrollment.
    pub async fn add_user_no_role(&self, user_id: &str, name: &str) -> Result<()> {
        self.auth
            .user_add(AddUser {
                user_id: user_id.to_string(),
                name: name.to_string(),
            })
            .await
    }

    /// Every minted sign key mapped to its owner.
    pub async fn get_all_sign(&self) -> Result<HashMap<String, String>> {
        self.auth.get_all_user_sign().await
    }

    pub async fn get_user_by_id_regex(&self, user_id: &str) -> Result<Vec<UserInfo>> {
        self.auth.user_get_info_reg(user_id).await
    }

    /// Keys the user owns plus keys granted to them.
    pub async fn user_own_signs(&self, user_id: &str) -> Result<UserSignList> {
        self.auth.user_own_signs(user_id).await
    }

    pub async fn user_own_roles(&self, user_id: &str) -> Result<Vec<RoleUserListView>> {
        self.auth.user_own_roles(user_id).await
    }

    pub async fn user_own_role_types(&self, user_id: &str) -> Result<Vec<i32>> {
        self.auth.user_own_role_types(user_id).await
    }

    pub async fn create_user_sign_key(&self, user_id: &str, sign_desc: &str) -> Result<String> {
        self.auth.user_create_sign_key(user_id, sign_desc).await
    }

    pub async fn update_user_sign_key(
        &self,
        user_id: &str,
        sign_key: &str,
        sign_desc: &str,
    ) -> Result<()> {
        self.auth.user_update_sign_key(user_id, sign_key, sign_desc).await
    }

    /// Hand a sign key to another user. Three persistence writes, not
    /// atomic; retry on partial failure.
    pub async fn user_transfer_sign_key(
        &self,
        sign_key: &str,
        sign_desc: &str,
        src_user_id: &str,
        dest_user_id: &str,
    ) -> Result<()> {
        self.auth
            .user_transfer_sign_key(sign_key, sign_desc, src_user_id, dest_user_id)
            .await
    }

    // ── roles ───────────────────────────────────────────────────

    /// Upsert a role. The grant list replaces the stored one; there is no
    /// per-uri merge.
    pub async fn add_role(
        &self,
        role_name: &str,
        role_desc: &str,
        role_type: i32,
        is_default: bool,
        url_method: &HashMap<String, u8>,
    ) -> Result<()> {
        let addr_list = url_method
            .iter()
            .map(|(url, method_value)| Address {
                uri: url.trim().to_lowercase(),
                method_value: *method_value,
            })
            .collect();

        self.auth
            .role_upsert(UpsertRoleInfo {
                role_name: role_name.to_string(),
                role_type,
                desc: role_desc.to_string(),
                is_default,
                addr_list,
            })
            .await
    }

    pub async fn add_role_users(&self, role_name: &str, user_ids: &[String]) -> Result<()> {
        self.auth.role_add_user(role_name, user_ids).await
    }

    /// Remove a role. Grants referencing it and its member list are left
    /// as-is.
    pub async fn remove_role(&self, role_name: &str) -> Result<()> {
        self.auth.role_remove(role_name).await
    }

    pub async fn user_own_rolenames(&self, user_id: &str) -> Result<Vec<String>> {
        self.auth.user_own_rolenames(user_id).await
    }

    pub async fn remove_role_users(&self, role_name: &str, user_ids: &[String]) -> Result<()> {
        self.auth.role_remove_user(role_name, user_ids).await
    }

    /// Catalog methods the role has not been granted.
    pub async fn role_route_diff(&self, role_name: &str) -> Result<Vec<RouteListView>> {
        self.auth.role_route_diff(role_name).await
    }

    /// Role detail; an empty name lists all roles.
    pub async fn get_role_list(&self, role_name: &str) -> Result<Vec<RoleListView>> {
        self.auth.role_info_list(role_name).await
    }

    pub async fn set_default_role(&self, role_name: &str) -> Result<()> {
        self.auth.role_set_default(role_name).await
    }

    pub async fn update_role_type_desc(
        &self,
        role_name: &str,
        role_desc: &str,
        role_type: i32,
    ) -> Result<()> {
        self.auth.role_update_type_desc(role_name, role_desc, role_type).await
    }

    // ── routes ──────────────────────────────────────────────────

    /// Register routes. Existing (uri, method) pairs keep their stored
    /// enable/desc; new uris are conflict-checked before admission.
    pub async fn add_route(&self, routes: &[RouteData]) -> Result<()> {
        self.route.add_route(&self.group_name, routes).await
    }

    pub async fn update_route_desc(&self, url: &str, desc: &str) -> Result<()> {
        let url = url.trim().to_lowercase();
        self.auth.router_update_uri_desc(&url, desc).await
    }

    pub async fn update_route_method_desc(
        &self,
        url: &str,
        method: &str,
        desc: &str,
    ) -> Result<()> {
        let url = url.trim().to_lowercase();
        let method = Method::parse(method)?;
        self.auth.router_update_method_desc(&url, method, desc).await
    }

    /// Require data permission on (url, method) and cascade into role
    /// routerMaps.
    pub async fn enable_route_data_auth(&self, url: &str, method: &str) -> Result<()> {
        self.route
            .enable_route_data_auth(&self.group_name, url, method)
            .await
    }

    pub async fn disable_route_data_auth(&self, url: &str, method: &str) -> Result<()> {
        self.route
            .disable_route_data_auth(&self.group_name, url, method)
            .await
    }

    pub async fn delete_route_by_method(&self, url: &str, method: &str) -> Result<()> {
        self.route
            .delete_route_by_method(&self.group_name, url, method)
            .await
    }

    pub async fn delete_route(&self, url: &str) -> Result<()> {
        self.route.delete_route(&self.group_name, url).await
    }

    pub async fn get_route_list(&self) -> Result<Vec<RouteListView>> {
        self.auth.router_list(false).await
    }

    pub async fn get_route_by_url(&self, url: &str) -> Result<RouteListView> {
        let url = url.trim().to_lowercase();
        self.auth.router_info_by_uri(&url).await
    }

    pub async fn get_route_by_url_regex(&self, url: &str) -> Result<Vec<RouteListView>> {
        let url = url.trim().to_lowercase();
        self.auth.router_get_info_reg(&url).await
    }

    /// Routes with at least one data-auth-enabled method.
    pub async fn get_data_auth_routes(&self) -> Result<Vec<RouteListView>> {
        self.auth.router_list(true).await
    }

    // ── sign grants ─────────────────────────────────────────────

    /// Grant a sign key to a user, restricted to the data-auth-enabled
    /// subset of the given (url, methodValue) pairs. The grant list
    /// replaces the stored one; there is no merge.
    pub async fn add_sign(
        &self,
        sign_key: &str,
        user_id: &str,
        url_method: &HashMap<String, u8>,
    ) -> Result<()> {
        let addr_list = url_method
            .iter()
            .map(|(url, method_value)| Address {
                uri: url.clone(),
                method_value: *method_value,
            })
            .collect();

        self.auth
            .sign_upsert(UpsertSignInfo {
                sign_key: sign_key.to_string(),
                user_id: user_id.to_string(),
                addr_list,
            })
            .await
    }

    pub async fn remove_sign(&self, sign_key: &str, user_id: &str) -> Result<()> {
        self.auth.sign_remove(sign_key, user_id).await
    }

    pub async fn get_sign_by_key(&self, sign_key: &str) -> Result<SignListView> {
        self.auth.sign_get_info(sign_key).await
    }

    /// Copy a key's data authority to other users.
    pub async fn copy_user_sign(
        &self,
        sign_key: &str,
        src_user_id: &str,
        dest_user_ids: &[String],
    ) -> Result<()> {
        self.auth.sign_copy(sign_key, src_user_id, dest_user_ids).await
    }

    /// OR additional (url, methodValue) pairs into each user's grant.
    pub async fn append_user_sign(
        &self,
        sign_key: &str,
        user_ids: &[String],
        url_method: &HashMap<String, u8>,
    ) -> Result<()> {
        self.auth
            .sign_patch_verify_data(sign_key, user_ids, url_method)
            .await
    }

    /// XOR (url, methodValue) pairs out of each user's grant. Toggle
    /// semantics: bits not currently held get set instead of cleared.
    pub async fn remove_user_sign(
        &self,
        sign_key: &str,
        user_ids: &[String],
        url_method: &HashMap<String, u8>,
    ) -> Result<()> {
        self.auth
            .sign_remove_verify_data(sign_key, user_ids, url_method)
            .await
    }

    /// Data-auth-enabled catalog methods a user's grant does not cover.
    pub async fn user_sign_diff_global(
        &self,
        sign_key: &str,
        user_id: &str,
    ) -> Result<Vec<RouteListView>> {
        self.auth.sign_diff_global_data_auth_route(sign_key, user_id).await
    }
}
