//! Key layout for the document store.
//!
//! Five collections, one JSON document per record. Composite unique keys
//! are encoded into the key path, joined by `@`: the route syntax checker
//! keeps `@` out of uris, and it is reserved in group/user/role/key ids.

pub const GROUP_COLL: &str = "TC_OREO_GROUP";
pub const ROUTER_COLL: &str = "TC_OREO_ROUTER";
pub const ROLE_COLL: &str = "TC_OREO_ROLES";
pub const USER_COLL: &str = "TC_OREO_USER";
pub const SIGN_COLL: &str = "TC_OREO_SIGN";

/// `(uri, groupName)` composite key.
pub fn route_id(group: &str, uri: &str) -> String {
    format!("{}@{}", group, uri)
}

/// `(roleName, groupName)` composite key.
pub fn role_id(group: &str, role_name: &str) -> String {
    format!("{}@{}", group, role_name)
}

/// `(userId, groupName)` composite key.
pub fn user_id(group: &str, user_id: &str) -> String {
    format!("{}@{}", group, user_id)
}

/// `(userId, signKey, groupName)` composite key.
pub fn sign_id(group: &str, sign_key: &str, user_id: &str) -> String {
    format!("{}@{}@{}", group, sign_key, user_id)
}

/// etcd key schema.
pub struct Schema {
    prefix: String,
}

impl Schema {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.trim_end_matches('/').to_string(),
        }
    }

    pub fn group_key(&self, group: &str) -> String {
        format!("{}/{}/{}", self.prefix, GROUP_COLL, group)
    }

    pub fn groups_prefix(&self) -> String {
        format!("{}/{}/", self.prefix, GROUP_COLL)
    }

    pub fn route_key(&self, group: &str, uri: &str) -> String {
        format!("{}/{}/{}", self.prefix, ROUTER_COLL, route_id(group, uri))
    }

    pub fn routes_prefix(&self, group: &str) -> String {
        format!("{}/{}/{}@", self.prefix, ROUTER_COLL, group)
    }

    pub fn role_key(&self, group: &str, role_name: &str) -> String {
        format!("{}/{}/{}", self.prefix, ROLE_COLL, role_id(group, role_name))
    }

    pub fn roles_prefix(&self, group: &str) -> String {
        format!("{}/{}/{}@", self.prefix, ROLE_COLL, group)
    }

    pub fn user_key(&self, group: &str, uid: &str) -> String {
        format!("{}/{}/{}", self.prefix, USER_COLL, user_id(group, uid))
    }

    pub fn users_prefix(&self, group: &str) -> String {
        format!("{}/{}/{}@", self.prefix, USER_COLL, group)
    }

    pub fn sign_key(&self, group: &str, sign_key: &str, uid: &str) -> String {
        format!("{}/{}/{}", self.prefix, SIGN_COLL, sign_id(group, sign_key, uid))
    }

    pub fn signs_prefix(&self, group: &str) -> String {
        format!("{}/{}/{}@", self.prefix, SIGN_COLL, group)
    }

    pub fn sign_key_prefix(&self, group: &str, sign_key: &str) -> String {
        format!("{}/{}/{}@{}@", self.prefix, SIGN_COLL, group, sign_key)
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::new("/oreo")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        let schema = Schema::new("/oreo");
        assert_eq!(schema.group_key("g1"), "/oreo/TC_OREO_GROUP/g1");
        assert_eq!(
            schema.route_key("g1", "/users/:id"),
            "/oreo/TC_OREO_ROUTER/g1@/users/:id"
        );
        assert_eq!(schema.role_key("g1", "ops"), "/oreo/TC_OREO_ROLES/g1@ops");
        assert_eq!(schema.user_key("g1", "u1"), "/oreo/TC_OREO_USER/g1@u1");
        assert_eq!(
            schema.sign_key("g1", "k1", "u1"),
            "/oreo/TC_OREO_SIGN/g1@k1@u1"
        );
    }

    #[test]
    fn test_prefix_trims_trailing_slash() {
        let schema = Schema::new("/oreo/");
        assert_eq!(schema.groups_prefix(), "/oreo/TC_OREO_GROUP/");
    }

    #[test]
    fn test_sign_key_prefix_scopes_one_key() {
        let schema = Schema::new("/oreo");
        let prefix = schema.sign_key_prefix("g1", "k1");
        assert!(schema.sign_key("g1", "k1", "u9").starts_with(&prefix));
        assert!(!schema.sign_key("g1", "k10", "u9").starts_with(&prefix));
    }
}
