use crate::schema::Schema;
use crate::store::AuthStore;
use async_trait::async_trait;
use etcd_client::{Client, Compare, CompareOp, ConnectOptions, GetOptions, Txn, TxnOp};
use oreo_core::error::{OreoError, Result};
use oreo_core::model::{GroupInfo, RoleInfo, RouterInfo, SignInfo, UserInfo, SUPER_ADMIN_ROLE_TYPE};
use regex::RegexBuilder;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{info, warn};

fn store_err(e: etcd_client::Error) -> OreoError {
    OreoError::Store(e.to_string())
}

fn compile(pattern: &str) -> Result<regex::Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| OreoError::Validation(format!("invalid regex pattern: {}", e)))
}

/// etcd store backend.
///
/// One JSON document per record under the `Schema` key layout; composite
/// unique indexes become the keys themselves. Cross-document updates are
/// prefix-scan read-modify-write: admin mutations serialize through
/// persistence, so last-writer-wins on a single document is acceptable.
pub struct EtcdStore {
    client: Client,
    schema: Schema,
}

impl EtcdStore {
    /// Connect to etcd.
    pub async fn connect(endpoints: &[String], prefix: &str, timeout: Duration) -> Result<Self> {
        let options = ConnectOptions::new().with_connect_timeout(timeout);
        let client = Client::connect(endpoints, Some(options))
            .await
            .map_err(store_err)?;
        info!(endpoints = ?endpoints, prefix = prefix, "Connected to etcd");
        Ok(Self {
            client,
            schema: Schema::new(prefix),
        })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    async fn get_doc<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let mut client = self.client.clone();
        let resp = client.get(key, None).await.map_err(store_err)?;
        match resp.kvs().first() {
            Some(kv) => Ok(Some(serde_json::from_slice(kv.value())?)),
            None => Ok(None),
        }
    }

    async fn put_doc<T: Serialize>(&self, key: &str, doc: &T) -> Result<()> {
        let value = serde_json::to_vec(doc)?;
        let mut client = self.client.clone();
        client.put(key, value, None).await.map_err(store_err)?;
        Ok(())
    }

    /// Create-only put: fails with `AlreadyExists` when the key is taken.
    async fn insert_doc<T: Serialize>(&self, key: &str, doc: &T, what: &str) -> Result<()> {
        let value = serde_json::to_vec(doc)?;
        let mut client = self.client.clone();
        let txn = Txn::new()
            .when(vec![Compare::version(key, CompareOp::Equal, 0)])
            .and_then(vec![TxnOp::put(key, value, None)]);
        let resp = client.txn(txn).await.map_err(store_err)?;
        if !resp.succeeded() {
            return Err(OreoError::AlreadyExists(what.to_string()));
        }
        Ok(())
    }

    async fn scan_docs<T: DeserializeOwned>(&self, prefix: &str) -> Result<Vec<T>> {
        let mut client = self.client.clone();
        let resp = client
            .get(prefix, Some(GetOptions::new().with_prefix()))
            .await
            .map_err(store_err)?;
        let mut docs = Vec::with_capacity(resp.kvs().len());
        for kv in resp.kvs() {
            match serde_json::from_slice(kv.value()) {
                Ok(doc) => docs.push(doc),
                Err(e) => warn!(
                    key = %String::from_utf8_lossy(kv.key()),
                    error = %e,
                    "Skipping undecodable document"
                ),
            }
        }
        Ok(docs)
    }

    async fn delete_doc(&self, key: &str, what: &str) -> Result<()> {
        let mut client = self.client.clone();
        let resp = client.delete(key, None).await.map_err(store_err)?;
        if resp.deleted() == 0 {
            return Err(OreoError::NotFound(what.to_string()));
        }
        Ok(())
    }

    async fn update_route<F>(&self, group: &str, uri: &str, apply: F) -> Result<()>
    where
        F: FnOnce(&mut RouterInfo) -> Result<()>,
    {
        let key = self.schema.route_key(group, uri);
        let mut route: RouterInfo = self
            .get_doc(&key)
            .await?
            .ok_or_else(|| OreoError::NotFound(format!("route {}", uri)))?;
        apply(&mut route)?;
        self.put_doc(&key, &route).await
    }

    async fn update_role<F>(&self, group: &str, role_name: &str, apply: F) -> Result<()>
    where
        F: FnOnce(&mut RoleInfo) -> Result<()>,
    {
        let key = self.schema.role_key(group, role_name);
        let mut role: RoleInfo = self
            .get_doc(&key)
            .await?
            .ok_or_else(|| OreoError::NotFound(format!("role {}", role_name)))?;
        apply(&mut role)?;
        self.put_doc(&key, &role).await
    }

    async fn update_user<F>(&self, group: &str, user_id: &str, apply: F) -> Result<()>
    where
        F: FnOnce(&mut UserInfo) -> Result<()>,
    {
        let key = self.schema.user_key(group, user_id);
        let mut user: UserInfo = self
            .get_doc(&key)
            .await?
            .ok_or_else(|| OreoError::NotFound(format!("user {}", user_id)))?;
        apply(&mut user)?;
        self.put_doc(&key, &user).await
    }
}

#[async_trait]
impl AuthStore for EtcdStore {
    // ── groups ──────────────────────────────────────────────────

    async fn ensure_group(&self, group: &GroupInfo) -> Result<()> {
        let key = self.schema.group_key(&group.group_name);
        match self.insert_doc(&key, group, "group").await {
            Ok(()) => Ok(()),
            Err(OreoError::AlreadyExists(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn list_groups(&self) -> Result<Vec<GroupInfo>> {
        self.scan_docs(&self.schema.groups_prefix()).await
    }

    // ── routes ──────────────────────────────────────────────────

    async fn upsert_routes(&self, routes: &[RouterInfo]) -> Result<()> {
        for info in routes {
            if !info.uri.starts_with('/') {
                return Err(OreoError::Validation(format!("invalid uri: {}", info.uri)));
            }
            let key = self.schema.route_key(&info.group_name, &info.uri);
            let merged = match self.get_doc::<RouterInfo>(&key).await? {
                Some(mut existing) => {
                    existing.desc = info.desc.clone();
                    for (bit, data) in &info.method_map {
                        existing.method_map.insert(bit.clone(), data.clone());
                    }
                    existing
                }
                None => info.clone(),
            };
            self.put_doc(&key, &merged).await?;
        }
        Ok(())
    }

    async fn get_routes(&self, group: &str) -> Result<Vec<RouterInfo>> {
        self.scan_docs(&self.schema.routes_prefix(group)).await
    }

    async fn get_route_by_uri(&self, group: &str, uri: &str) -> Result<Option<RouterInfo>> {
        self.get_doc(&self.schema.route_key(group, uri)).await
    }

    async fn search_routes_by_uri(&self, group: &str, pattern: &str) -> Result<Vec<RouterInfo>> {
        let re = compile(pattern)?;
        let routes: Vec<RouterInfo> = self.scan_docs(&self.schema.routes_prefix(group)).await?;
        Ok(routes.into_iter().filter(|r| re.is_match(&r.uri)).collect())
    }

    async fn set_route_method_enable(
        &self,
        group: &str,
        uri: &str,
        bit: &str,
        enable: bool,
    ) -> Result<()> {
        self.update_route(group, uri, |route| {
            let data = route
                .method_map
                .get_mut(bit)
                .ok_or_else(|| OreoError::NotFound(format!("route {} method bit {}", uri, bit)))?;
            data.enable = enable;
            Ok(())
        })
        .await
    }

    async fn remove_route(&self, group: &str, uri: &str) -> Result<()> {
        self.delete_doc(&self.schema.route_key(group, uri), &format!("route {}", uri))
            .await
    }

    async fn remove_route_method(&self, group: &str, uri: &str, bit: &str) -> Result<()> {
        self.update_route(group, uri, |route| {
            route.method_map.remove(bit);
            Ok(())
        })
        .await
    }

    async fn update_route_desc(&self, group: &str, uri: &str, desc: &str) -> Result<()> {
        self.update_route(group, uri, |route| {
            route.desc = desc.to_string();
            Ok(())
        })
        .await
    }

    async fn update_route_method_desc(
        &self,
        group: &str,
        uri: &str,
        bit: &str,
        desc: &str,
    ) -> Result<()> {
        self.update_route(group, uri, |route| {
            route.method_map.entry(bit.to_string()).or_default().method_desc = desc.to_string();
            Ok(())
        })
        .await
    }

    // ── roles ───────────────────────────────────────────────────

    async fn upsert_role(&self, role: &RoleInfo) -> Result<()> {
        let key = self.schema.role_key(&role.group_name, &role.role_name);
        let merged = match self.get_doc::<RoleInfo>(&key).await? {
            Some(existing) => {
                let mut updated = role.clone();
                updated.user_ids = existing.user_ids;
                updated
            }
            None => role.clone(),
        };
        self.put_doc(&key, &merged).await
    }

    async fn remove_role(&self, group: &str, role_name: &str) -> Result<()> {
        self.delete_doc(
            &self.schema.role_key(group, role_name),
            &format!("role {}", role_name),
        )
        .await
    }

    async fn get_role(&self, group: &str, role_name: &str) -> Result<Option<RoleInfo>> {
        self.get_doc(&self.schema.role_key(group, role_name)).await
    }

    async fn get_roles(&self, group: &str) -> Result<Vec<RoleInfo>> {
        self.scan_docs(&self.schema.roles_prefix(group)).await
    }

    async fn count_regular_roles(&self, group: &str) -> Result<usize> {
        let roles: Vec<RoleInfo> = self.scan_docs(&self.schema.roles_prefix(group)).await?;
        Ok(roles
            .iter()
            .filter(|r| r.role_type != SUPER_ADMIN_ROLE_TYPE)
            .count())
    }

    async fn add_role_users(
        &self,
        group: &str,
        role_name: &str,
        user_ids: &[String],
    ) -> Result<()> {
        self.update_role(group, role_name, |role| {
            for user_id in user_ids {
                if !role.user_ids.contains(user_id) {
                    role.user_ids.push(user_id.clone());
                }
            }
            Ok(())
        })
        .await
    }

    async fn remove_role_users(
        &self,
        group: &str,
        role_name: &str,
        user_ids: &[String],
    ) -> Result<()> {
        self.update_role(group, role_name, |role| {
            role.user_ids.retain(|id| !user_ids.contains(id));
            Ok(())
        })
        .await
    }

    async fn add_user_to_default_role(&self, group: &str, user_id: &str) -> Result<()> {
        let roles: Vec<RoleInfo> = self.scan_docs(&self.schema.roles_prefix(group)).await?;
        let default = roles
            .into_iter()
            .find(|r| r.is_default)
            .ok_or_else(|| OreoError::NotFound(format!("default role of group {}", group)))?;
        self.update_role(group, &default.role_name, |role| {
            if !role.user_ids.contains(&user_id.to_string()) {
                role.user_ids.push(user_id.to_string());
            }
            Ok(())
        })
        .await
    }

    async fn set_default_role(&self, group: &str, role_name: &str) -> Result<()> {
        let roles: Vec<RoleInfo> = self.scan_docs(&self.schema.roles_prefix(group)).await?;
        let defaults: Vec<&RoleInfo> = roles.iter().filter(|r| r.is_default).collect();
        if defaults.len() > 1 {
            warn!(group = group, count = defaults.len(), "multiple default roles found, clearing all");
        }
        for role in defaults {
            self.update_role(group, &role.role_name, |r| {
                r.is_default = false;
                Ok(())
            })
            .await?;
        }

        self.update_role(group, role_name, |r| {
            r.is_default = true;
            Ok(())
        })
        .await
    }

    async fn update_role_type_desc(
        &self,
        group: &str,
        role_name: &str,
        desc: &str,
        role_type: i32,
    ) -> Result<()> {
        self.update_role(group, role_name, |role| {
            role.desc = desc.to_string();
            role.role_type = role_type;
            Ok(())
        })
        .await
    }

    async fn roles_of_user(&self, group: &str, user_id: &str) -> Result<Vec<RoleInfo>> {
        let roles: Vec<RoleInfo> = self.scan_docs(&self.schema.roles_prefix(group)).await?;
        Ok(roles
            .into_iter()
            .filter(|r| r.user_ids.iter().any(|id| id == user_id))
            .collect())
    }

    async fn roles_of_user_with_route(
        &self,
        group: &str,
        user_id: &str,
        router_key: &str,
    ) -> Result<Vec<RoleInfo>> {
        let roles = self.roles_of_user(group, user_id).await?;
        Ok(roles
            .into_iter()
            .filter(|r| r.router_map.contains_key(router_key))
            .collect())
    }

    async fn refresh_role_router_maps(
        &self,
        group: &str,
        router_key: &str,
        enable: bool,
    ) -> Result<()> {
        let roles: Vec<RoleInfo> = self.scan_docs(&self.schema.roles_prefix(group)).await?;
        for mut role in roles {
            if let Some(value) = role.router_map.get_mut(router_key) {
                if *value != enable {
                    *value = enable;
                    let key = self.schema.role_key(group, &role.role_name);
                    self.put_doc(&key, &role).await?;
                }
            }
        }
        Ok(())
    }

    // ── users ───────────────────────────────────────────────────

    async fn insert_user(&self, user: &UserInfo) -> Result<()> {
        let key = self.schema.user_key(&user.group_name, &user.user_id);
        self.insert_doc(&key, user, &format!("user {}", user.user_id))
            .await
    }

    async fn get_users(&self, group: &str) -> Result<Vec<UserInfo>> {
        self.scan_docs(&self.schema.users_prefix(group)).await
    }

    async fn get_user(&self, group: &str, user_id: &str) -> Result<Option<UserInfo>> {
        self.get_doc(&self.schema.user_key(group, user_id)).await
    }

    async fn search_users_by_id(&self, group: &str, pattern: &str) -> Result<Vec<UserInfo>> {
        let re = compile(pattern)?;
        let users: Vec<UserInfo> = self.scan_docs(&self.schema.users_prefix(group)).await?;
        Ok(users.into_iter().filter(|u| re.is_match(&u.user_id)).collect())
    }

    async fn set_user_sign_key(
        &self,
        group: &str,
        user_id: &str,
        sign_key: &str,
        desc: &str,
    ) -> Result<()> {
        self.update_user(group, user_id, |user| {
            user.sign_key.insert(sign_key.to_string(), desc.to_string());
            Ok(())
        })
        .await
    }

    async fn update_user_sign_desc(
        &self,
        group: &str,
        user_id: &str,
        sign_key: &str,
        desc: &str,
    ) -> Result<()> {
        self.update_user(group, user_id, |user| {
            let entry = user.sign_key.get_mut(sign_key).ok_or_else(|| {
                OreoError::NotFound(format!("sign key {} of user {}", sign_key, user_id))
            })?;
            *entry = desc.to_string();
            Ok(())
        })
        .await
    }

    async fn remove_user_sign_key(
        &self,
        group: &str,
        user_id: &str,
        sign_key: &str,
    ) -> Result<()> {
        self.update_user(group, user_id, |user| {
            user.sign_key.remove(sign_key);
            Ok(())
        })
        .await
    }

    async fn find_sign_key_owner(&self, group: &str, sign_key: &str) -> Result<Option<UserInfo>> {
        let users: Vec<UserInfo> = self.scan_docs(&self.schema.users_prefix(group)).await?;
        Ok(users.into_iter().find(|u| u.sign_key.contains_key(sign_key)))
    }

    async fn user_owns_sign_key(
        &self,
        group: &str,
        user_id: &str,
        sign_key: &str,
    ) -> Result<bool> {
        Ok(self
            .get_user(group, user_id)
            .await?
            .map(|u| u.sign_key.contains_key(sign_key))
            .unwrap_or(false))
    }

    // ── sign grants ─────────────────────────────────────────────

    async fn insert_sign(&self, sign: &SignInfo) -> Result<()> {
        let key = self
            .schema
            .sign_key(&sign.group_name, &sign.sign_key, &sign.user_id);
        self.insert_doc(
            &key,
            sign,
            &format!("sign grant ({}, {})", sign.sign_key, sign.user_id),
        )
        .await
    }

    async fn upsert_sign(&self, sign: &SignInfo) -> Result<()> {
        let key = self
            .schema
            .sign_key(&sign.group_name, &sign.sign_key, &sign.user_id);
        self.put_doc(&key, sign).await
    }

    async fn remove_sign(&self, group: &str, sign_key: &str, user_id: &str) -> Result<()> {
        self.delete_doc(
            &self.schema.sign_key(group, sign_key, user_id),
            &format!("sign grant ({}, {})", sign_key, user_id),
        )
        .await
    }

    async fn get_sign(
        &self,
        group: &str,
        sign_key: &str,
        user_id: &str,
    ) -> Result<Option<SignInfo>> {
        self.get_doc(&self.schema.sign_key(group, sign_key, user_id))
            .await
    }

    async fn signs_by_key(&self, group: &str, sign_key: &str) -> Result<Vec<SignInfo>> {
        self.scan_docs(&self.schema.sign_key_prefix(group, sign_key))
            .await
    }

    async fn signs_by_user(&self, group: &str, user_id: &str) -> Result<Vec<SignInfo>> {
        let signs: Vec<SignInfo> = self.scan_docs(&self.schema.signs_prefix(group)).await?;
        Ok(signs.into_iter().filter(|s| s.user_id == user_id).collect())
    }

    async fn set_sign_verify_data(
        &self,
        group: &str,
        sign_key: &str,
        user_id: &str,
        verify_data_uri: &HashMap<String, u8>,
    ) -> Result<()> {
        let key = self.schema.sign_key(group, sign_key, user_id);
        let mut sign: SignInfo = self.get_doc(&key).await?.ok_or_else(|| {
            OreoError::NotFound(format!("sign grant ({}, {})", sign_key, user_id))
        })?;
        sign.verify_data_uri = verify_data_uri.clone();
        self.put_doc(&key, &sign).await
    }

    async fn set_sign_create_user(
        &self,
        group: &str,
        sign_key: &str,
        create_user_id: &str,
    ) -> Result<()> {
        let signs: Vec<SignInfo> = self
            .scan_docs(&self.schema.sign_key_prefix(group, sign_key))
            .await?;
        for mut sign in signs {
            sign.create_user_id = create_user_id.to_string();
            let key = self.schema.sign_key(group, sign_key, &sign.user_id);
            self.put_doc(&key, &sign).await?;
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
            .get_sign(group, sign_key, user_id)
            .await?
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
        let signs = self.signs_by_user(group, user_id).await?;
        Ok(signs
            .into_iter()
            .filter(|s| {
                s.verify_data_uri
                    .get(uri)
                    .map(|stored| stored & mask == mask)
                    .unwrap_or(false)
            })
            .collect())
    }

    async fn signs_of_user_any_bits(
        &self,
        group: &str,
        user_id: &str,
        uri: &str,
        mask: u8,
    ) -> Result<Vec<SignInfo>> {
        let signs = self.signs_by_user(group, user_id).await?;
        Ok(signs
            .into_iter()
            .filter(|s| {
                s.verify_data_uri
                    .get(uri)
                    .map(|stored| stored & mask != 0)
                    .unwrap_or(false)
            })
            .collect())
    }
}
