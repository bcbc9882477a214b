use crate::schema;
use crate::store::AuthStore;
use async_trait::async_trait;
use dashmap::DashMap;
use oreo_core::error::{OreoError, Result};
use oreo_core::model::{GroupInfo, RoleInfo, RouterInfo, SignInfo, UserInfo, SUPER_ADMIN_ROLE_TYPE};
use regex::RegexBuilder;
use std::collections::HashMap;
use tracing::warn;

/// In-memory store backend.
///
/// One DashMap per collection, keyed by the same composite ids the etcd
/// backend encodes into its key paths. Backs tests and single-process
/// embeddings; the etcd backend is the deployment path.
#[derive(Default)]
pub struct MemStore {
    groups: DashMap<String, GroupInfo>,
    routes: DashMap<String, RouterInfo>,
    roles: DashMap<String, RoleInfo>,
    users: DashMap<String, UserInfo>,
    signs: DashMap<String, SignInfo>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn compile(pattern: &str) -> Result<regex::Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| OreoError::Validation(format!("invalid regex pattern: {}", e)))
}

#[async_trait]
impl AuthStore for MemStore {
    // ── groups ──────────────────────────────────────────────────

    async fn ensure_group(&self, group: &GroupInfo) -> Result<()> {
        self.groups
            .entry(group.group_name.clone())
            .or_insert_with(|| group.clone());
        Ok(())
    }

    async fn list_groups(&self) -> Result<Vec<GroupInfo>> {
        Ok(self.groups.iter().map(|g| g.value().clone()).collect())
    }

    // ── routes ──────────────────────────────────────────────────

    async fn upsert_routes(&self, routes: &[RouterInfo]) -> Result<()> {
        for info in routes {
            if !info.uri.starts_with('/') {
                return Err(OreoError::Validation(format!("invalid uri: {}", info.uri)));
            }
            let id = schema::route_id(&info.group_name, &info.uri);
            match self.routes.get_mut(&id) {
                Some(mut existing) => {
                    existing.desc = info.desc.clone();
                    for (bit, data) in &info.method_map {
                        existing.method_map.insert(bit.clone(), data.clone());
                    }
                }
                None => {
                    self.routes.insert(id, info.clone());
                }
            }
        }
        Ok(())
    }

    async fn get_routes(&self, group: &str) -> Result<Vec<RouterInfo>> {
        Ok(self
            .routes
            .iter()
            .filter(|r| r.group_name == group)
            .map(|r| r.value().clone())
            .collect())
    }

    async fn get_route_by_uri(&self, group: &str, uri: &str) -> Result<Option<RouterInfo>> {
        Ok(self
            .routes
            .get(&schema::route_id(group, uri))
            .map(|r| r.value().clone()))
    }

    async fn search_routes_by_uri(&self, group: &str, pattern: &str) -> Result<Vec<RouterInfo>> {
        let re = compile(pattern)?;
        Ok(self
            .routes
            .iter()
            .filter(|r| r.group_name == group && re.is_match(&r.uri))
            .map(|r| r.value().clone())
            .collect())
    }

    async fn set_route_method_enable(
        &self,
        group: &str,
        uri: &str,
        bit: &str,
        enable: bool,
    ) -> Result<()> {
        let mut route = self
            .routes
            .get_mut(&schema::route_id(group, uri))
            .ok_or_else(|| OreoError::NotFound(format!("route {}", uri)))?;
        let data = route
            .method_map
            .get_mut(bit)
            .ok_or_else(|| OreoError::NotFound(format!("route {} method bit {}", uri, bit)))?;
        data.enable = enable;
        Ok(())
    }

    async fn remove_route(&self, group: &str, uri: &str) -> Result<()> {
        self.routes
            .remove(&schema::route_id(group, uri))
            .map(|_| ())
            .ok_or_else(|| OreoError::NotFound(format!("route {}", uri)))
    }

    async fn remove_route_method(&self, group: &str, uri: &str, bit: &str) -> Result<()> {
        let mut route = self
            .routes
            .get_mut(&schema::route_id(group, uri))
            .ok_or_else(|| OreoError::NotFound(format!("route {}", uri)))?;
        route.method_map.remove(bit);
        Ok(())
    }

    async fn update_route_desc(&self, group: &str, uri: &str, desc: &str) -> Result<()> {
        let mut route = self
            .routes
            .get_mut(&schema::route_id(group, uri))
            .ok_or_else(|| OreoError::NotFound(format!("route {}", uri)))?;
        route.desc = desc.to_string();
        Ok(())
    }

    async fn update_route_method_desc(
        &self,
        group: &str,
        uri: &str,
        bit: &str,
        desc: &str,
    ) -> Result<()> {
        let mut route = self
            .routes
            .get_mut(&schema::route_id(group, uri))
            .ok_or_else(|| OreoError::NotFound(format!("route {}", uri)))?;
        route.method_map.entry(bit.to_string()).or_default().method_desc = desc.to_string();
        Ok(())
    }

    // ── roles ───────────────────────────────────────────────────

    async fn upsert_role(&self, role: &RoleInfo) -> Result<()> {
        let id = schema::role_id(&role.group_name, &role.role_name);
        match self.roles.get_mut(&id) {
            Some(mut existing) => {
                // membership survives a policy update
                existing.desc = role.desc.clone();
                existing.router_map = role.router_map.clone();
                existing.address = role.address.clone();
                existing.role_type = role.role_type;
                existing.is_default = role.is_default;
            }
            None => {
                self.roles.insert(id, role.clone());
            }
        }
        Ok(())
    }

    async fn remove_role(&self, group: &str, role_name: &str) -> Result<()> {
        self.roles
            .remove(&schema::role_id(group, role_name))
            .map(|_| ())
            .ok_or_else(|| OreoError::NotFound(format!("role {}", role_name)))
    }

    async fn get_role(&self, group: &str, role_name: &str) -> Result<Option<RoleInfo>> {
        Ok(self
            .roles
            .get(&schema::role_id(group, role_name))
            .map(|r| r.value().clone()))
    }

    async fn get_roles(&self, group: &str) -> Result<Vec<RoleInfo>> {
        Ok(self
            .roles
            .iter()
            .filter(|r| r.group_name == group)
            .map(|r| r.value().clone())
            .collect())
    }

    async fn count_regular_roles(&self, group: &str) -> Result<usize> {
        Ok(self
            .roles
            .iter()
            .filter(|r| r.group_name == group && r.role_type != SUPER_ADMIN_ROLE_TYPE)
            .count())
    }

    async fn add_role_users(
        &self,
        group: &str,
        role_name: &str,
        user_ids: &[String],
    ) -> Result<()> {
        let mut role = self
            .roles
            .get_mut(&schema::role_id(group, role_name))
            .ok_or_else(|| OreoError::NotFound(format!("role {}", role_name)))?;
        for user_id in user_ids {
            if !role.user_ids.contains(user_id) {
                role.user_ids.push(user_id.clone());
            }
        }
        Ok(())
    }

    async fn remove_role_users(
        &self,
        group: &str,
        role_name: &str,
        user_ids: &[String],
    ) -> Result<()> {
        let mut role = self
            .roles
            .get_mut(&schema::role_id(group, role_name))
            .ok_or_else(|| OreoError::NotFound(format!("role {}", role_name)))?;
        role.user_ids.retain(|id| !user_ids.contains(id));
        Ok(())
    }

    async fn add_user_to_default_role(&self, group: &str, user_id: &str) -> Result<()> {
        let mut role = self
            .roles
            .iter_mut()
            .find(|r| r.group_name == group && r.is_default)
            .ok_or_else(|| OreoError::NotFound(format!("default role of group {}", group)))?;
        if !role.user_ids.contains(&user_id.to_string()) {
            role.user_ids.push(user_id.to_string());
        }
        Ok(())
    }

    async fn set_default_role(&self, group: &str, role_name: &str) -> Result<()> {
        let defaults: Vec<String> = self
            .roles
            .iter()
            .filter(|r| r.group_name == group && r.is_default)
            .map(|r| r.key().clone())
            .collect();
        if defaults.len() > 1 {
            warn!(group = group, count = defaults.len(), "multiple default roles found, clearing all");
        }
        for id in defaults {
            if let Some(mut role) = self.roles.get_mut(&id) {
                role.is_default = false;
            }
        }

        let mut role = self
            .roles
            .get_mut(&schema::role_id(group, role_name))
            .ok_or_else(|| OreoError::NotFound(format!("role {}", role_name)))?;
        role.is_default = true;
        Ok(())
    }

    async fn update_role_type_desc(
        &self,
        group: &str,
        role_name: &str,
        desc: &str,
        role_type: i32,
    ) -> Result<()> {
        let mut role = self
            .roles
            .get_mut(&schema::role_id(group, role_name))
            .ok_or_else(|| OreoError::NotFound(format!("role {}", role_name)))?;
        role.desc = desc.to_string();
        role.role_type = role_type;
        Ok(())
    }

    async fn roles_of_user(&self, group: &str, user_id: &str) -> Result<Vec<RoleInfo>> {
        Ok(self
            .roles
            .iter()
            .filter(|r| r.group_name == group && r.user_ids.iter().any(|id| id == user_id))
            .map(|r| r.value().clone())
            .collect())
    }

    async fn roles_of_user_with_route(
        &self,
        group: &str,
        user_id: &str,
        router_key: &str,
    ) -> Result<Vec<RoleInfo>> {
        Ok(self
            .roles
            .iter()
            .filter(|r| {
                r.group_name == group
                    && r.user_ids.iter().any(|id| id == user_id)
                    && r.router_map.contains_key(router_key)
            })
            .map(|r| r.value().clone())
            .collect())
    }

    async fn refresh_role_router_maps(
        &self,
        group: &str,
        router_key: &str,
        enable: bool,
    ) -> Result<()> {
        for mut role in self.roles.iter_mut() {
            if role.group_name != group {
                continue;
            }
            if let Some(value) = role.router_map.get_mut(router_key) {
                *value = enable;
            }
        }
        Ok(())
    }

    // ── users ───────────────────────────────────────────────────

    async fn insert_user(&self, user: &UserInfo) -> Result<()> {
        let id = schema::user_id(&user.group_name, &user.user_id);
        if self.users.contains_key(&id) {
            return Err(OreoError::AlreadyExists(format!("user {}", user.user_id)));
        }
        self.users.insert(id, user.clone());
        Ok(())
    }

    async fn get_users(&self, group: &str) -> Result<Vec<UserInfo>> {
        Ok(self
            .users
            .iter()
            .filter(|u| u.group_name == group)
            .map(|u| u.value().clone())
            .collect())
    }

    async fn get_user(&self, group: &str, user_id: &str) -> Result<Option<UserInfo>> {
        Ok(self
            .users
            .get(&schema::user_id(group, user_id))
            .map(|u| u.value().clone()))
    }

    async fn search_users_by_id(&self, group: &str, pattern: &str) -> Result<Vec<UserInfo>> {
        let re = compile(pattern)?;
        Ok(self
            .users
            .iter()
            .filter(|u| u.group_name == group && re.is_match(&u.user_id))
            .map(|u| u.value().clone())
            .collect())
    }

    async fn set_user_sign_key(
        &self,
        group: &str,
        user_id: &str,
        sign_key: &str,
        desc: &str,
    ) -> Result<()> {
        let mut user = self
            .users
            .get_mut(&schema::user_id(group, user_id))
            .ok_or_else(|| OreoError::NotFound(format!("user {}", user_id)))?;
        user.sign_key.insert(sign_key.to_string(), desc.to_string());
        Ok(())
    }

    async fn update_user_sign_desc(
        &self,
        group: &str,
        user_id: &str,
        sign_key: &str,
        desc: &str,
    ) -> Result<()> {
        let mut user = self
            .users
            .get_mut(&schema::user_id(group, user_id))
            .ok_or_else(|| OreoError::NotFound(format!("user {}", user_id)))?;
        let entry = user
            .sign_key
            .get_mut(sign_key)
            .ok_or_else(|| OreoError::NotFound(format!("sign key {} of user {}", sign_key, user_id)))?;
        *entry = desc.to_string();
        Ok(())
    }

    async fn remove_user_sign_key(
        &self,
        group: &str,
        user_id: &str,
        sign_key: &str,
    ) -> Result<()> {
        let mut user = self
            .users
            .get_mut(&schema::user_id(group, user_id))
            .ok_or_else(|| OreoError::NotFound(format!("user {}", user_id)))?;
        user.sign_key.remove(sign_key);
        Ok(())
    }

    async fn find_sign_key_owner(&self, group: &str, sign_key: &str) -> Result<Option<UserInfo>> {
        Ok(self
            .users
            .iter()
            .find(|u| u.group_name == group && u.sign_key.contains_key(sign_key))
            .map(|u| u.value().clone()))
    }

    async fn user_owns_sign_key(
        &self,
        group: &str,
        user_id: &str,
        sign_key: &str,
    ) -> Result<bool> {
        Ok(self
            .users
            .get(&schema::user_id(group, user_id))
            .map(|u| u.sign_key.contains_key(sign_key))
            .unwrap_or(false))
    }

    // ── sign grants ─────────────────────────────────────────────

    async fn insert_sign(&self, sign: &SignInfo) -> Result<()> {
        let id = schema::sign_id(&sign.group_name, &sign.sign_key, &sign.user_id);
        if self.signs.contains_key(&id) {
            return Err(OreoError::AlreadyExists(format!(
                "sign grant ({}, {})",
                sign.sign_key, sign.user_id
            )));
        }
        self.signs.insert(id, sign.clone());
        Ok(())
    }

    async fn upsert_sign(&self, sign: &SignInfo) -> Result<()> {
        let id = schema::sign_id(&sign.group_name, &sign.sign_key, &sign.user_id);
        self.signs.insert(id, sign.clone());
        Ok(())
    }

    async fn remove_sign(&self, group: &str, sign_key: &str, user_id: &str) -> Result<()> {
        self.signs
            .remove(&schema::sign_id(group, sign_key, user_id))
            .map(|_| ())
            .ok_or_else(|| OreoError::NotFound(format!("sign grant ({}, {})", sign_key, user_id)))
    }

    async fn get_sign(
        &self,
        group: &str,
        sign_key: &str,
        user_id: &str,
    ) -> Result<Option<SignInfo>> {
        Ok(self
            .signs
            .get(&schema::sign_id(group, sign_key, user_id))
            .map(|s| s.value().clone()))
    }

    async fn signs_by_key(&self, group: &str, sign_key: &str) -> Result<Vec<SignInfo>> {
        Ok(self
            .signs
            .iter()
            .filter(|s| s.group_name == group && s.sign_key == sign_key)
            .map(|s| s.value().clone())
            .collect())
    }

    async fn signs_by_user(&self, group: &str, user_id: &str) -> Result<Vec<SignInfo>> {
        Ok(self
            .signs
            .iter()
            .filter(|s| s.group_name == group && s.user_id == user_id)
            .map(|s| s.value().clone())
            .collect())
    }

    async fn set_sign_verify_data(
        &self,
        group: &str,
        sign_key: &str,
        user_id: &str,
        verify_data_uri: &HashMap<String, u8>,
    ) -> Result<()> {
        let mut sign = self
            .signs
            .get_mut(&schema::sign_id(group, sign_key, user_id))
            .ok_or_else(|| OreoError::NotFound(format!("sign grant ({}, {})", sign_key, user_id)))?;
        sign.verify_data_uri = verify_data_uri.clone();
        Ok(())
    }

    async fn set_sign_create_user(
        &self,
        group: &str,
        sign_key: &str,
        create_user_id: &str,
    ) -> Result<()> {
        for mut sign in self.signs.iter_mut() {
            if sign.group_name == group && sign.sign_key == sign_key {
                sign.create_user_id = create_user_id.to_string();
            }
        }
        Ok(())
    }

    async fn sign_covers(
        &self,
        group: &str,
        sign_key: &str,
        user_id: &str,
        uri: &str,
        mask: u8,
    ) -> Result<bool> {
        Ok(self
            .signs
            .get(&schema::sign_id(group, sign_key, user_id))
            .and_then(|s| s.verify_data_uri.get(uri).copied())
            .map(|stored| stored & mask == mask)
            .unwrap_or(false))
    }

    async fn signs_of_user_all_bits(
        &self,
        group: &str,
        user_id: &str,
        uri: &str,
        mask: u8,
    ) -> Result<Vec<SignInfo>> {
        Ok(self
            .signs
            .iter()
            .filter(|s| {
                s.group_name == group
                    && s.user_id == user_id
                    && s.verify_data_uri
                        .get(uri)
                        .map(|stored| stored & mask == mask)
                        .unwrap_or(false)
            })
            .map(|s| s.value().clone())
            .collect())
    }

    async fn signs_of_user_any_bits(
        &self,
        group: &str,
        user_id: &str,
        uri: &str,
        mask: u8,
    ) -> Result<Vec<SignInfo>> {
        Ok(self
            .signs
            .iter()
            .filter(|s| {
                s.group_name == group
                    && s.user_id == user_id
                    && s.verify_data_uri
                        .get(uri)
                        .map(|stored| stored & mask != 0)
                        .unwrap_or(false)
            })
            .map(|s| s.value().clone())
            .collect())
    }
}
