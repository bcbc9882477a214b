use async_trait::async_trait;
use oreo_core::error::Result;
use oreo_core::model::{GroupInfo, RoleInfo, RouterInfo, SignInfo, UserInfo};
use std::collections::HashMap;

/// Persistence port for the five policy collections.
///
/// Every operation is scoped by group unless the record carries it. The
/// document store's bit-test operators are translated here: a stored
/// `methodValue` covers a mask when `stored & mask == mask` (all-set) or
/// touches it when `stored & mask != 0` (any-set).
///
/// Mutations that target a missing record fail with `NotFound`; inserts
/// that collide with a composite unique key fail with `AlreadyExists`.
#[async_trait]
pub trait AuthStore: Send + Sync {
    // ── groups ──────────────────────────────────────────────────

    /// Insert the group record unless one already exists. The token of an
    /// existing record is never rewritten.
    async fn ensure_group(&self, group: &GroupInfo) -> Result<()>;

    async fn list_groups(&self) -> Result<Vec<GroupInfo>>;

    // ── routes ──────────────────────────────────────────────────

    /// Upsert a batch of routes. An existing route keeps its document and
    /// has the given desc set and the given method entries merged in;
    /// missing routes are created.
    async fn upsert_routes(&self, routes: &[RouterInfo]) -> Result<()>;

    async fn get_routes(&self, group: &str) -> Result<Vec<RouterInfo>>;

    async fn get_route_by_uri(&self, group: &str, uri: &str) -> Result<Option<RouterInfo>>;

    /// Case-insensitive regex search over uris.
    async fn search_routes_by_uri(&self, group: &str, pattern: &str) -> Result<Vec<RouterInfo>>;

    /// Flip the data-auth bit of one (uri, method). The method entry must
    /// already exist on the route.
    async fn set_route_method_enable(
        &self,
        group: &str,
        uri: &str,
        bit: &str,
        enable: bool,
    ) -> Result<()>;

    async fn remove_route(&self, group: &str, uri: &str) -> Result<()>;

    async fn remove_route_method(&self, group: &str, uri: &str, bit: &str) -> Result<()>;

    async fn update_route_desc(&self, group: &str, uri: &str, desc: &str) -> Result<()>;

    async fn update_route_method_desc(
        &self,
        group: &str,
        uri: &str,
        bit: &str,
        desc: &str,
    ) -> Result<()>;

    // ── roles ───────────────────────────────────────────────────

    /// Upsert a role by `(roleName, groupName)`. On update the membership
    /// list is preserved; only name/desc/type/default/address/routerMap are
    /// replaced.
    async fn upsert_role(&self, role: &RoleInfo) -> Result<()>;

    async fn remove_role(&self, group: &str, role_name: &str) -> Result<()>;

    async fn get_role(&self, group: &str, role_name: &str) -> Result<Option<RoleInfo>>;

    async fn get_roles(&self, group: &str) -> Result<Vec<RoleInfo>>;

    /// Number of roles that are not the super-admin type.
    async fn count_regular_roles(&self, group: &str) -> Result<usize>;

    /// Set-union the given user ids into the role's membership.
    async fn add_role_users(&self, group: &str, role_name: &str, user_ids: &[String])
        -> Result<()>;

    /// Set-difference the given user ids out of the role's membership.
    async fn remove_role_users(
        &self,
        group: &str,
        role_name: &str,
        user_ids: &[String],
    ) -> Result<()>;

    /// Enroll a user into the group's default role. `NotFound` when the
    /// group has no default role.
    async fn add_user_to_default_role(&self, group: &str, user_id: &str) -> Result<()>;

    /// Clear any prior default, then mark the target role default.
    async fn set_default_role(&self, group: &str, role_name: &str) -> Result<()>;

    async fn update_role_type_desc(
        &self,
        group: &str,
        role_name: &str,
        desc: &str,
        role_type: i32,
    ) -> Result<()>;

    /// Roles whose membership contains the user.
    async fn roles_of_user(&self, group: &str, user_id: &str) -> Result<Vec<RoleInfo>>;

    /// Roles whose membership contains the user AND whose routerMap has the
    /// given `"{bit}_/oreo/_{uri}"` key.
    async fn roles_of_user_with_route(
        &self,
        group: &str,
        user_id: &str,
        router_key: &str,
    ) -> Result<Vec<RoleInfo>>;

    /// Denormalization refresh: in every role whose routerMap has the key,
    /// overwrite the key's value with `enable`.
    async fn refresh_role_router_maps(
        &self,
        group: &str,
        router_key: &str,
        enable: bool,
    ) -> Result<()>;

    // ── users ───────────────────────────────────────────────────

    async fn insert_user(&self, user: &UserInfo) -> Result<()>;

    async fn get_users(&self, group: &str) -> Result<Vec<UserInfo>>;

    async fn get_user(&self, group: &str, user_id: &str) -> Result<Option<UserInfo>>;

    /// Case-insensitive regex search over user ids.
    async fn search_users_by_id(&self, group: &str, pattern: &str) -> Result<Vec<UserInfo>>;

    /// Add or overwrite one signKey entry on the user.
    async fn set_user_sign_key(
        &self,
        group: &str,
        user_id: &str,
        sign_key: &str,
        desc: &str,
    ) -> Result<()>;

    /// Update the description of an entry that must already exist.
    async fn update_user_sign_desc(
        &self,
        group: &str,
        user_id: &str,
        sign_key: &str,
        desc: &str,
    ) -> Result<()>;

    async fn remove_user_sign_key(&self, group: &str, user_id: &str, sign_key: &str)
        -> Result<()>;

    /// The user whose signKey map contains the key, if any.
    async fn find_sign_key_owner(&self, group: &str, sign_key: &str) -> Result<Option<UserInfo>>;

    async fn user_owns_sign_key(&self, group: &str, user_id: &str, sign_key: &str)
        -> Result<bool>;

    // ── sign grants ─────────────────────────────────────────────

    async fn insert_sign(&self, sign: &SignInfo) -> Result<()>;

    async fn upsert_sign(&self, sign: &SignInfo) -> Result<()>;

    async fn remove_sign(&self, group: &str, sign_key: &str, user_id: &str) -> Result<()>;

    async fn get_sign(&self, group: &str, sign_key: &str, user_id: &str)
        -> Result<Option<SignInfo>>;

    async fn signs_by_key(&self, group: &str, sign_key: &str) -> Result<Vec<SignInfo>>;

    async fn signs_by_user(&self, group: &str, user_id: &str) -> Result<Vec<SignInfo>>;

    /// Replace the grant's whole verifyDataUri mapping.
    async fn set_sign_verify_data(
        &self,
        group: &str,
        sign_key: &str,
        user_id: &str,
        verify_data_uri: &HashMap<String, u8>,
    ) -> Result<()>;

    /// Re-point `createUserId` on every grant of the key.
    async fn set_sign_create_user(
        &self,
        group: &str,
        sign_key: &str,
        create_user_id: &str,
    ) -> Result<()>;

    /// All-set bit test: does the grant's `verifyDataUri[uri]` cover every
    /// bit of the mask? Missing grant or missing uri is `false`.
    async fn sign_covers(
        &self,
        group: &str,
        sign_key: &str,
        user_id: &str,
        uri: &str,
        mask: u8,
    ) -> Result<bool>;

    /// Grants of the user whose `verifyDataUri[uri]` covers every bit of
    /// the mask.
    async fn signs_of_user_all_bits(
        &self,
        group: &str,
        user_id: &str,
        uri: &str,
        mask: u8,
    ) -> Result<Vec<SignInfo>>;

    /// Grants of the user whose `verifyDataUri[uri]` touches any bit of
    /// the mask.
    async fn signs_of_user_any_bits(
        &self,
        group: &str,
        user_id: &str,
        uri: &str,
        mask: u8,
    ) -> Result<Vec<SignInfo>>;
}
