use oreo_core::error::Result;
use oreo_core::method::{method_value, Method};
use serde::Deserialize;
use std::collections::HashMap;

/// Fold boundary-shaped `url → [method name]` grants into the bitmask form
/// the engine works with. Unknown method names are rejected here, at the
/// boundary.
pub fn fold_url_methods(url_methods: &HashMap<String, Vec<String>>) -> Result<HashMap<String, u8>> {
    let mut folded = HashMap::with_capacity(url_methods.len());
    for (url, methods) in url_methods {
        let mut parsed = Vec::with_capacity(methods.len());
        for m in methods {
            parsed.push(Method::parse(m)?);
        }
        folded.insert(url.clone(), method_value(&parsed));
    }
    Ok(folded)
}

// ── request bodies ──────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AuthUrlMethod {
    pub url: String,
    pub method: String,
    #[serde(default)]
    pub desc: String,
}

#[derive(Debug, Deserialize)]
pub struct AuthMethod {
    pub method: String,
    #[serde(default)]
    pub desc: String,
}

#[derive(Debug, Deserialize)]
pub struct AuthUrlMethods {
    pub url: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub methods: Vec<AuthMethod>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthRole {
    pub role_name: String,
    #[serde(default)]
    pub role_desc: String,
    /// 1 marks the super-admin role
    #[serde(default)]
    pub role_type: i32,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub url_methods: HashMap<String, Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthRoleUser {
    pub role_name: String,
    pub role_users: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthRoleInfo {
    pub role_name: String,
    #[serde(default)]
    pub role_desc: String,
    #[serde(default)]
    pub role_type: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUserSign {
    pub user_id: String,
    #[serde(default)]
    pub sign_key: String,
    #[serde(default)]
    pub sign_desc: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSign {
    pub user_id: String,
    pub sign_key: String,
    #[serde(default)]
    pub url_methods: HashMap<String, Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSignCopy {
    pub sign_key: String,
    pub src_user_id: String,
    pub dest_user_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSignUri {
    pub sign_key: String,
    pub user_ids: Vec<String>,
    #[serde(default)]
    pub url_methods: HashMap<String, Vec<String>>,
}

// ── query strings ───────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UrlQuery {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct UrlMethodQuery {
    pub url: String,
    pub method: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleNameQuery {
    #[serde(default)]
    pub role_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdQuery {
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignKeyQuery {
    pub sign_key: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUserQuery {
    pub sign_key: String,
    pub user_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_url_methods() {
        let input = HashMap::from([
            ("/a".to_string(), vec!["GET".to_string(), "delete".to_string()]),
            ("/b".to_string(), vec![]),
        ]);
        let folded = fold_url_methods(&input).unwrap();
        assert_eq!(folded["/a"], 9);
        assert_eq!(folded["/b"], 0);
    }

    #[test]
    fn test_fold_rejects_unknown_method() {
        let input = HashMap::from([("/a".to_string(), vec!["PATCH".to_string()])]);
        assert!(fold_url_methods(&input).is_err());
    }

    #[test]
    fn test_role_body_field_names() {
        let body: AuthRole = serde_json::from_value(serde_json::json!({
            "roleName": "ops",
            "roleType": 1,
            "isDefault": true,
            "urlMethods": { "/a": ["GET"] }
        }))
        .unwrap();
        assert_eq!(body.role_name, "ops");
        assert_eq!(body.role_type, 1);
        assert!(body.is_default);
        assert_eq!(body.url_methods["/a"], vec!["GET".to_string()]);
    }
}
