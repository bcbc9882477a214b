use crate::authorization::Authorization;
use oreo_core::error::{OreoError, Result};
use oreo_core::method::{bits_to_methods, Method};
use oreo_core::model::{
    router_map_key, Address, RoleInfo, RoleListView, RoleUserListView, RouteListView,
    UpsertRoleInfo, SUPER_ADMIN_ROLE_TYPE,
};
use std::collections::HashMap;
use tracing::error;

/// Role operations.
impl Authorization {
    /// Compute a role's denormalized routerMap from its grant list. A key
    /// is written for every bit of every address whose uri exists in the
    /// catalog; its value mirrors the route method's data-auth enable bit
    /// (false when the route lacks the method).
    async fn router_map_by_req_addr(
        &self,
        addr_list: &[Address],
    ) -> Result<HashMap<String, bool>> {
        let router_infos = self.router_get_info().await?;

        let mut router_map = HashMap::new();
        for addr in addr_list {
            let Some(router) = router_infos.iter().find(|r| r.uri == addr.uri) else {
                continue;
            };
            for m in bits_to_methods(addr.method_value) {
                let enable = router
                    .method_map
                    .get(m.bit_str())
                    .map(|data| data.enable)
                    .unwrap_or(false);
                router_map.insert(router_map_key(m.bit_str(), &addr.uri), enable);
            }
        }

        Ok(router_map)
    }

    /// Upsert a role. The grant list replaces the stored one wholesale; no
    /// merging. A super-admin role can never be the default; the first
    /// regular role of a group always becomes the default.
    pub async fn role_upsert(&self, info: UpsertRoleInfo) -> Result<()> {
        let router_map = self.router_map_by_req_addr(&info.addr_list).await?;

        let mut is_default = info.is_default;
        if info.role_type == SUPER_ADMIN_ROLE_TYPE {
            is_default = false;
        } else if self.store().count_regular_roles(self.group_name()).await? == 0 {
            is_default = true;
        }

        let role = RoleInfo {
            role_name: info.role_name,
            desc: info.desc,
            group_name: self.group_name().to_string(),
            is_default,
            user_ids: vec![],
            router_map,
            address: info.addr_list,
            role_type: info.role_type,
        };

        self.store().upsert_role(&role).await
    }

    /// Remove a role. Sign grants and user cross-references are left
    /// untouched; dangling grants surface in the list views.
    pub async fn role_remove(&self, role_name: &str) -> Result<()> {
        self.store().remove_role(self.group_name(), role_name).await
    }

    /// Catalog methods the role has NOT been granted.
    pub async fn role_route_diff(&self, role_name: &str) -> Result<Vec<RouteListView>> {
        let oreo_routes = self.router_list(false).await?;

        let role = self
            .store()
            .get_role(self.group_name(), role_name)
            .await?
            .ok_or_else(|| OreoError::NotFound(format!("role {}", role_name)))?;

        Ok(Self::route_diff(&oreo_routes, Self::uri_method_set(&role.address)))
    }

    pub(crate) fn route_diff(
        routes: &[RouteListView],
        granted: std::collections::HashSet<String>,
    ) -> Vec<RouteListView> {
        let mut diff = Vec::new();
        for route in routes {
            let methods: Vec<_> = route
                .methods
                .iter()
                .filter(|m| !granted.contains(&format!("{}{}", route.uri, m.method)))
                .cloned()
                .collect();
            if !methods.is_empty() {
                diff.push(RouteListView {
                    uri: route.uri.clone(),
                    desc: route.desc.clone(),
                    methods,
                });
            }
        }
        diff.sort_by(|a, b| a.uri.cmp(&b.uri));
        diff
    }

    /// Role detail views; an empty name lists every role of the group.
    pub async fn role_info_list(&self, role_name: &str) -> Result<Vec<RoleListView>> {
        let roles: Vec<RoleInfo> = if role_name.is_empty() {
            self.store().get_roles(self.group_name()).await?
        } else {
            self.store()
                .get_role(self.group_name(), role_name)
                .await?
                .into_iter()
                .collect()
        };

        let router_infos = self.router_get_info().await?;
        let users = self.store().get_users(self.group_name()).await?;

        let mut views = Vec::with_capacity(roles.len());
        for role in roles {
            views.push(RoleListView {
                role_name: role.role_name,
                desc: role.desc,
                is_default: role.is_default,
                role_type: role.role_type,
                users: Self::user_detail(&users, &role.user_ids),
                routers: Self::router_detail_req_addr(&router_infos, &role.address),
            });
        }
        views.sort_by(|a, b| a.role_name.cmp(&b.role_name));
        Ok(views)
    }

    pub async fn role_add_user(&self, role_name: &str, user_ids: &[String]) -> Result<()> {
        self.store()
            .add_role_users(self.group_name(), role_name, user_ids)
            .await
    }

    pub async fn role_remove_user(&self, role_name: &str, user_ids: &[String]) -> Result<()> {
        self.store()
            .remove_role_users(self.group_name(), role_name, user_ids)
            .await
    }

    pub async fn role_set_default(&self, role_name: &str) -> Result<()> {
        self.store()
            .set_default_role(self.group_name(), role_name)
            .await
    }

    pub async fn role_update_type_desc(
        &self,
        role_name: &str,
        desc: &str,
        role_type: i32,
    ) -> Result<()> {
        self.store()
            .update_role_type_desc(self.group_name(), role_name, desc, role_type)
            .await
    }

    pub async fn user_own_rolenames(&self, user_id: &str) -> Result<Vec<String>> {
        let roles = self.store().roles_of_user(self.group_name(), user_id).await?;
        let mut names: Vec<String> = roles.into_iter().map(|r| r.role_name).collect();
        names.sort();
        Ok(names)
    }

    pub async fn user_own_roles(&self, user_id: &str) -> Result<Vec<RoleUserListView>> {
        let roles = self.store().roles_of_user(self.group_name(), user_id).await?;
        let router_infos = self.router_get_info().await?;

        let mut views = Vec::with_capacity(roles.len());
        for role in roles {
            views.push(RoleUserListView {
                role_name: role.role_name,
                desc: role.desc,
                is_default: role.is_default,
                role_type: role.role_type,
                routers: Self::router_detail_req_addr(&router_infos, &role.address),
            });
        }
        views.sort_by(|a, b| a.role_name.cmp(&b.role_name));
        Ok(views)
    }

    pub async fn user_own_role_types(&self, user_id: &str) -> Result<Vec<i32>> {
        let roles = self.store().roles_of_user(self.group_name(), user_id).await?;
        Ok(roles.into_iter().map(|r| r.role_type).collect())
    }

    /// Union of the user's role grants: `uri → methodValue`, plus whether
    /// any of the roles is the super-admin.
    pub async fn user_grant_route(&self, user_id: &str) -> Result<(HashMap<String, u8>, bool)> {
        let roles = self.store().roles_of_user(self.group_name(), user_id).await?;

        let mut is_admin = false;
        let mut grants: HashMap<String, u8> = HashMap::new();
        for role in &roles {
            if role.role_type == SUPER_ADMIN_ROLE_TYPE {
                is_admin = true;
            }
            for addr in &role.address {
                *grants.entry(addr.uri.clone()).or_insert(0) |= addr.method_value;
            }
        }

        Ok((grants, is_admin))
    }

    /// Stage one of the decision: `(is_admin, role_auth, exist_data_auth)`.
    ///
    /// Roles are filtered by membership plus presence of the routerMap key,
    /// so granting is a single field-presence check, not a join. A
    /// super-admin role short-circuits with no data-auth requirement;
    /// otherwise the data-auth requirement is the OR over every matching
    /// role's bit. Store failures deny.
    pub async fn query_role_auth(&self, url: &str, method: Method, user_id: &str) -> (bool, bool, bool) {
        let key = router_map_key(method.bit_str(), url);

        let roles = match self
            .store()
            .roles_of_user_with_route(self.group_name(), user_id, &key)
            .await
        {
            Ok(roles) => roles,
            Err(e) => {
                error!(error = %e, user_id = user_id, "role auth query failed");
                return (false, false, false);
            }
        };

        if roles.is_empty() {
            return (false, false, false);
        }

        let mut exist_data_auth = false;
        for role in &roles {
            if role.role_type == SUPER_ADMIN_ROLE_TYPE {
                return (true, true, false);
            }
            exist_data_auth |= role.router_map.get(&key).copied().unwrap_or(false);
        }

        (false, true, exist_data_auth)
    }
}
