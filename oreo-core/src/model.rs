use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Separator between the method bit and the uri in role `routerMap` keys.
/// The route syntax checker keeps every character of this literal out of
/// admitted uris, so the key can never be ambiguous.
pub const ROUTER_MAP_SPLIT: &str = "_/oreo/_";

/// Maximum number of sign keys a single user may own. Sign keys are never
/// deleted once minted, so creation is capped.
pub const SIGN_KEY_LIMIT: usize = 50;

/// Role type marking the super-admin role; it bypasses data authorization.
pub const SUPER_ADMIN_ROLE_TYPE: i32 = 1;

/// Build a role `routerMap` key from a decimal method bit and a uri.
pub fn router_map_key(bit: &str, uri: &str) -> String {
    format!("{}{}{}", bit, ROUTER_MAP_SPLIT, uri)
}

/// Tenant-like namespace scoping every record. The token is minted once
/// when the group is first initialized and never rewritten.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupInfo {
    pub group_name: String,
    pub group_token: String,
}

/// Per-method state of a route: whether data authorization is required,
/// and the method description.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyData {
    pub enable: bool,
    pub method_desc: String,
}

/// A registered route template. `method_map` is keyed by the decimal bit
/// string of each admitted method.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouterInfo {
    pub uri: String,
    pub desc: String,
    pub group_name: String,
    pub method_map: HashMap<String, VerifyData>,
}

/// A granted (uri, methods) pair; `method_value` is the OR of method bits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub uri: String,
    pub method_value: u8,
}

/// A role: the canonical grant list lives in `address`, while `router_map`
/// is the denormalized per-(method, uri) view keyed by
/// `"{bit}_/oreo/_{uri}"`. The bool mirrors the route's data-auth enable
/// bit at upsert time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleInfo {
    pub role_name: String,
    pub desc: String,
    pub group_name: String,
    pub is_default: bool,
    pub user_ids: Vec<String>,
    pub router_map: HashMap<String, bool>,
    pub address: Vec<Address>,
    #[serde(rename = "type")]
    pub role_type: i32,
}

/// A user. `sign_key` enumerates the sign keys this user owns (created),
/// mapping key id to description.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub name: String,
    pub user_id: String,
    pub group_name: String,
    pub sign_key: HashMap<String, String>,
}

/// A sign grant: `user_id` may use `sign_key`'s data authority on the
/// (uri, methods) pairs in `verify_data_uri`. The key's owner never appears
/// here; ownership in `UserInfo::sign_key` implies full authority.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInfo {
    pub sign_key: String,
    pub create_user_id: String,
    pub user_id: String,
    pub group_name: String,
    pub verify_data_uri: HashMap<String, u8>,
}

// ── Admin inputs ─────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertRoleInfo {
    pub role_name: String,
    #[serde(rename = "type")]
    pub role_type: i32,
    pub desc: String,
    pub is_default: bool,
    pub addr_list: Vec<Address>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertSignInfo {
    pub sign_key: String,
    pub user_id: String,
    pub addr_list: Vec<Address>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddUser {
    pub user_id: String,
    pub name: String,
}

// ── Query views ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDetail {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteMethodView {
    pub method: String,
    pub desc: String,
    pub enable: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteListView {
    pub uri: String,
    pub desc: String,
    pub methods: Vec<RouteMethodView>,
}

/// Per-method detail inside a role/sign route view. `is_delete` marks a
/// grant whose backing route method no longer exists in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleRouteMethodInfo {
    pub method: String,
    pub method_desc: String,
    pub enable: bool,
    pub is_delete: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleRouteInfo {
    pub uri: String,
    pub uri_desc: String,
    pub is_delete: bool,
    pub methods: Vec<RoleRouteMethodInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleListView {
    pub role_name: String,
    pub desc: String,
    pub is_default: bool,
    #[serde(rename = "type")]
    pub role_type: i32,
    pub users: Vec<UserDetail>,
    pub routers: Vec<RoleRouteInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleUserListView {
    pub role_name: String,
    pub desc: String,
    pub is_default: bool,
    #[serde(rename = "type")]
    pub role_type: i32,
    pub routers: Vec<RoleRouteInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignView {
    pub user_id: String,
    pub name: String,
    pub routers: Vec<RoleRouteInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignListView {
    pub owner_id: String,
    pub name: String,
    pub sign_key: String,
    pub sign_views: Vec<SignView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnSign {
    pub sign_key: String,
    pub desc: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantSign {
    pub sign_key: String,
    pub desc: String,
    pub own_user: String,
    pub own_name: String,
    pub routers: Vec<RoleRouteInfo>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSignList {
    pub own_signs: Vec<OwnSign>,
    pub grant_signs: Vec<GrantSign>,
}

/// Outcome of the hot-path authorization check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthDecision {
    pub is_admin: bool,
    pub allowed: bool,
    pub reason: String,
}

impl AuthDecision {
    pub fn allow(is_admin: bool) -> Self {
        Self {
            is_admin,
            allowed: true,
            reason: String::new(),
        }
    }

    pub fn deny(is_admin: bool, reason: impl Into<String>) -> Self {
        Self {
            is_admin,
            allowed: false,
            reason: reason.into(),
        }
    }
}
