//! End-to-end authorization flows against the in-memory store backend.

use oreo_auth::Oreo;
use oreo_core::config::OreoConfig;
use oreo_core::error::OreoError;
use oreo_core::route::{RouteData, RouteMethodData};
use oreo_store::MemStore;
use std::collections::HashMap;
use std::sync::Arc;

fn config() -> OreoConfig {
    let mut cfg = OreoConfig::default();
    cfg.group_name = "g1".to_string();
    cfg.singleton = true;
    cfg
}

async fn oreo() -> Oreo {
    Oreo::new(&config(), Arc::new(MemStore::new())).await.unwrap()
}

fn route(url: &str, methods: &[(&str, bool)]) -> RouteData {
    RouteData {
        url: url.to_string(),
        url_desc: format!("{} desc", url),
        methods: methods
            .iter()
            .map(|(m, enable)| RouteMethodData {
                enable: *enable,
                method: m.to_string(),
                method_desc: format!("{} {}", m, url),
            })
            .collect(),
    }
}

fn grants(pairs: &[(&str, u8)]) -> HashMap<String, u8> {
    pairs.iter().map(|(u, v)| (u.to_string(), *v)).collect()
}

/// The private key auto-minted at user creation.
async fn private_key_of(oreo: &Oreo, user_id: &str) -> String {
    let signs = oreo.user_own_signs(user_id).await.unwrap();
    signs.own_signs[0].sign_key.clone()
}

// ── route admission ─────────────────────────────────────────────

#[tokio::test]
async fn conflicting_route_is_rejected_and_names_the_existing_one() {
    let oreo = oreo().await;
    oreo.add_route(&[route("/users/:id", &[("GET", false)])])
        .await
        .unwrap();

    let err = oreo
        .add_route(&[route("/users/1", &[("GET", false)])])
        .await
        .unwrap_err();
    match err {
        OreoError::RouteConflict { existing, .. } => assert_eq!(existing, "/users/:id"),
        other => panic!("expected conflict, got {other}"),
    }
}

#[tokio::test]
async fn deeper_route_wins_the_match() {
    let oreo = oreo().await;
    oreo.add_route(&[
        route("/users/:id", &[("GET", false)]),
        route("/users/:id/comments", &[("GET", false)]),
    ])
    .await
    .unwrap();
    oreo.add_role("dev", "", 0, true, &grants(&[("/users/:id/comments", 1)]))
        .await
        .unwrap();
    oreo.add_user("u1", "Alice").await.unwrap();

    // role grants only the comments template; a match on it allows
    let decision = oreo.check_user_auth("/users/42/comments", "GET", "u1", "").await;
    assert!(decision.allowed, "reason: {}", decision.reason);

    // the shallower path resolves to /users/:id, which the role lacks
    let decision = oreo.check_user_auth("/users/42", "GET", "u1", "").await;
    assert!(!decision.allowed);
    assert!(decision.reason.contains("role permission"));
}

// ── decision engine ─────────────────────────────────────────────

#[tokio::test]
async fn role_grant_without_data_auth_allows() {
    let oreo = oreo().await;
    oreo.add_route(&[route("/x", &[("GET", false)])]).await.unwrap();
    oreo.add_role("dev", "", 0, false, &grants(&[("/x", 1)]))
        .await
        .unwrap();
    oreo.add_user("u1", "Alice").await.unwrap();

    let decision = oreo.check_user_auth("/x", "GET", "u1", "").await;
    assert!(!decision.is_admin);
    assert!(decision.allowed);
    assert!(decision.reason.is_empty());
}

#[tokio::test]
async fn unmatched_route_denies() {
    let oreo = oreo().await;
    let decision = oreo.check_user_auth("/nope", "GET", "u1", "").await;
    assert!(!decision.allowed);
    assert!(decision.reason.contains("route did not match"));
}

#[tokio::test]
async fn unsupported_method_denies() {
    let oreo = oreo().await;
    oreo.add_route(&[route("/x", &[("GET", false)])]).await.unwrap();
    let decision = oreo.check_user_auth("/x", "PATCH", "u1", "").await;
    assert!(!decision.allowed);
}

#[tokio::test]
async fn data_auth_without_grant_denies() {
    let oreo = oreo().await;
    oreo.add_route(&[route("/x", &[("GET", false)])]).await.unwrap();
    oreo.add_role("dev", "", 0, false, &grants(&[("/x", 1)]))
        .await
        .unwrap();
    oreo.add_user("u1", "Alice").await.unwrap();

    oreo.enable_route_data_auth("/x", "GET").await.unwrap();

    let decision = oreo.check_user_auth("/x", "GET", "u1", "").await;
    assert!(!decision.is_admin);
    assert!(!decision.allowed);
    assert!(decision.reason.contains("data permission"));
}

#[tokio::test]
async fn key_owner_short_circuits_data_auth() {
    let oreo = oreo().await;
    oreo.add_route(&[route("/a", &[("GET", true)])]).await.unwrap();
    oreo.add_role("dev", "", 0, false, &grants(&[("/a", 1)]))
        .await
        .unwrap();
    oreo.add_user("u1", "Alice").await.unwrap();

    let k1 = private_key_of(&oreo, "u1").await;
    let decision = oreo.check_user_auth("/a", "GET", "u1", &k1).await;
    assert!(decision.allowed, "reason: {}", decision.reason);

    let decision = oreo.check_user_auth("/a", "GET", "u1", "k2").await;
    assert!(!decision.allowed);
    assert!(decision.reason.contains("data permission"));
}

#[tokio::test]
async fn super_admin_bypasses_data_auth() {
    let oreo = oreo().await;
    oreo.add_route(&[route("/anything", &[("GET", true)])])
        .await
        .unwrap();
    oreo.add_role("root", "", 1, false, &grants(&[("/anything", 1)]))
        .await
        .unwrap();
    oreo.add_user_no_role("u1", "Alice").await.unwrap();
    oreo.add_role_users("root", &["u1".to_string()]).await.unwrap();

    let decision = oreo.check_user_auth("/anything", "GET", "u1", "").await;
    assert!(decision.is_admin);
    assert!(decision.allowed);
    assert!(decision.reason.is_empty());
}

#[tokio::test]
async fn granted_sign_key_passes_data_auth_per_method() {
    let oreo = oreo().await;
    oreo.add_route(&[route("/a", &[("GET", true), ("POST", true)])])
        .await
        .unwrap();
    oreo.add_role("dev", "", 0, true, &grants(&[("/a", 1 | 2)]))
        .await
        .unwrap();
    oreo.add_user("owner", "Owner").await.unwrap();
    oreo.add_user("u2", "Bob").await.unwrap();

    let key = private_key_of(&oreo, "owner").await;
    // grant only GET authority to u2
    oreo.add_sign(&key, "u2", &grants(&[("/a", 1)])).await.unwrap();

    let decision = oreo.check_user_auth("/a", "GET", "u2", &key).await;
    assert!(decision.allowed, "reason: {}", decision.reason);

    let decision = oreo.check_user_auth("/a", "POST", "u2", &key).await;
    assert!(!decision.allowed);
}

// ── data-auth cascade ───────────────────────────────────────────

#[tokio::test]
async fn disable_cascades_into_role_router_maps() {
    let oreo = oreo().await;
    oreo.add_route(&[route("/x", &[("GET", true)])]).await.unwrap();
    oreo.add_role("dev", "", 0, false, &grants(&[("/x", 1)]))
        .await
        .unwrap();
    oreo.add_user("u1", "Alice").await.unwrap();

    // enabled at registration: deny without a key
    let decision = oreo.check_user_auth("/x", "GET", "u1", "").await;
    assert!(!decision.allowed);

    // one admin call flips the route bit and every routerMap mirror
    oreo.disable_route_data_auth("/x", "GET").await.unwrap();
    let decision = oreo.check_user_auth("/x", "GET", "u1", "").await;
    assert!(decision.allowed, "reason: {}", decision.reason);
}

// ── roles ───────────────────────────────────────────────────────

#[tokio::test]
async fn first_regular_role_becomes_default_and_super_admin_never_does() {
    let oreo = oreo().await;
    oreo.add_role("root", "", 1, true, &grants(&[])).await.unwrap();
    oreo.add_role("dev", "", 0, false, &grants(&[])).await.unwrap();

    let roles = oreo.get_role_list("").await.unwrap();
    let root = roles.iter().find(|r| r.role_name == "root").unwrap();
    let dev = roles.iter().find(|r| r.role_name == "dev").unwrap();
    assert!(!root.is_default, "super admin can never be the default");
    assert!(dev.is_default, "first regular role is forced default");
}

#[tokio::test]
async fn set_default_role_moves_the_flag() {
    let oreo = oreo().await;
    oreo.add_role("a", "", 0, false, &grants(&[])).await.unwrap();
    oreo.add_role("b", "", 0, false, &grants(&[])).await.unwrap();

    oreo.set_default_role("b").await.unwrap();

    let roles = oreo.get_role_list("").await.unwrap();
    let defaults: Vec<_> = roles.iter().filter(|r| r.is_default).collect();
    assert_eq!(defaults.len(), 1);
    assert_eq!(defaults[0].role_name, "b");
}

#[tokio::test]
async fn role_route_diff_reports_ungranted_methods() {
    let oreo = oreo().await;
    oreo.add_route(&[
        route("/a", &[("GET", false), ("POST", false)]),
        route("/b", &[("GET", false)]),
    ])
    .await
    .unwrap();
    oreo.add_role("dev", "", 0, true, &grants(&[("/a", 1)]))
        .await
        .unwrap();

    let diff = oreo.role_route_diff("dev").await.unwrap();
    assert_eq!(diff.len(), 2);
    assert_eq!(diff[0].uri, "/a");
    assert_eq!(diff[0].methods.len(), 1);
    assert_eq!(diff[0].methods[0].method, "POST");
    assert_eq!(diff[1].uri, "/b");
}

#[tokio::test]
async fn user_role_queries() {
    let oreo = oreo().await;
    oreo.add_role("dev", "devs", 0, true, &grants(&[])).await.unwrap();
    oreo.add_role("root", "", 1, false, &grants(&[])).await.unwrap();
    oreo.add_user("u1", "Alice").await.unwrap();
    oreo.add_role_users("root", &["u1".to_string()]).await.unwrap();

    let names = oreo.user_own_rolenames("u1").await.unwrap();
    assert_eq!(names, vec!["dev".to_string(), "root".to_string()]);

    let mut types = oreo.user_own_role_types("u1").await.unwrap();
    types.sort();
    assert_eq!(types, vec![0, 1]);

    oreo.remove_role_users("root", &["u1".to_string()]).await.unwrap();
    assert_eq!(oreo.user_own_rolenames("u1").await.unwrap(), vec!["dev".to_string()]);
}

#[tokio::test]
async fn user_grant_route_unions_method_values() {
    let oreo = oreo().await;
    oreo.add_role("a", "", 0, true, &grants(&[("/x", 1)])).await.unwrap();
    oreo.add_role("b", "", 0, false, &grants(&[("/x", 2), ("/y", 4)]))
        .await
        .unwrap();
    oreo.add_user("u1", "Alice").await.unwrap();
    oreo.add_role_users("b", &["u1".to_string()]).await.unwrap();

    let (routes, is_admin) = oreo.query_user_grant_route("u1").await.unwrap();
    assert!(!is_admin);
    assert_eq!(routes["/x"], 3);
    assert_eq!(routes["/y"], 4);
}

// ── sign grants ─────────────────────────────────────────────────

#[tokio::test]
async fn add_sign_intersects_against_enabled_methods() {
    let oreo = oreo().await;
    oreo.add_route(&[route("/a", &[("GET", true), ("POST", false)])])
        .await
        .unwrap();
    oreo.add_role("dev", "", 0, true, &grants(&[])).await.unwrap();
    oreo.add_user("owner", "Owner").await.unwrap();
    oreo.add_user("u2", "Bob").await.unwrap();
    let key = private_key_of(&oreo, "owner").await;

    // POST has data-auth off, so only the GET bit survives
    oreo.add_sign(&key, "u2", &grants(&[("/a", 1 | 2)])).await.unwrap();

    let view = oreo.get_sign_by_key(&key).await.unwrap();
    assert_eq!(view.owner_id, "owner");
    assert_eq!(view.sign_views.len(), 1);
    assert_eq!(view.sign_views[0].user_id, "u2");

    // all bits disabled: silent no-op, no grant written
    oreo.add_sign(&key, "u2", &grants(&[("/a", 2)])).await.unwrap();
    let view = oreo.get_sign_by_key(&key).await.unwrap();
    assert_eq!(view.sign_views.len(), 1);
}

#[tokio::test]
async fn copy_from_owner_grants_full_enabled_set() {
    let oreo = oreo().await;
    oreo.add_route(&[route("/a", &[("GET", true)]), route("/b", &[("POST", true)])])
        .await
        .unwrap();
    oreo.add_role("dev", "", 0, true, &grants(&[("/a", 1), ("/b", 2)]))
        .await
        .unwrap();
    oreo.add_user("owner", "Owner").await.unwrap();
    oreo.add_user("u2", "Bob").await.unwrap();
    let key = private_key_of(&oreo, "owner").await;

    oreo.copy_user_sign(&key, "owner", &["u2".to_string()]).await.unwrap();

    let decision = oreo.check_user_auth("/a", "GET", "u2", &key).await;
    assert!(decision.allowed, "reason: {}", decision.reason);
    let decision = oreo.check_user_auth("/b", "POST", "u2", &key).await;
    assert!(decision.allowed, "reason: {}", decision.reason);

    // copying onto an existing grant is a duplicate-key error
    let err = oreo
        .copy_user_sign(&key, "owner", &["u2".to_string()])
        .await
        .unwrap_err();
    assert!(matches!(err, OreoError::AlreadyExists(_)));
}

#[tokio::test]
async fn copy_from_grantee_copies_verbatim() {
    let oreo = oreo().await;
    oreo.add_route(&[route("/a", &[("GET", true), ("POST", true)])])
        .await
        .unwrap();
    oreo.add_role("dev", "", 0, true, &grants(&[("/a", 3)])).await.unwrap();
    oreo.add_user("owner", "Owner").await.unwrap();
    oreo.add_user("u2", "Bob").await.unwrap();
    oreo.add_user("u3", "Carol").await.unwrap();
    let key = private_key_of(&oreo, "owner").await;

    oreo.add_sign(&key, "u2", &grants(&[("/a", 1)])).await.unwrap();
    oreo.copy_user_sign(&key, "u2", &["u3".to_string()]).await.unwrap();

    // u3 received exactly u2's restricted grant: GET yes, POST no
    assert!(oreo.check_user_auth("/a", "GET", "u3", &key).await.allowed);
    assert!(!oreo.check_user_auth("/a", "POST", "u3", &key).await.allowed);
}

#[tokio::test]
async fn append_ors_bits_and_remove_toggles() {
    let oreo = oreo().await;
    oreo.add_route(&[route("/a", &[("GET", true), ("POST", true), ("PUT", true)])])
        .await
        .unwrap();
    oreo.add_role("dev", "", 0, true, &grants(&[("/a", 7)])).await.unwrap();
    oreo.add_user("owner", "Owner").await.unwrap();
    oreo.add_user("u2", "Bob").await.unwrap();
    let key = private_key_of(&oreo, "owner").await;

    oreo.add_sign(&key, "u2", &grants(&[("/a", 1)])).await.unwrap();
    oreo.append_user_sign(&key, &["u2".to_string()], &grants(&[("/a", 2)]))
        .await
        .unwrap();
    assert!(oreo.check_user_auth("/a", "POST", "u2", &key).await.allowed);

    // XOR toggle: removing GET|PUT clears GET but SETS the absent PUT bit
    oreo.remove_user_sign(&key, &["u2".to_string()], &grants(&[("/a", 1 | 4)]))
        .await
        .unwrap();
    assert!(!oreo.check_user_auth("/a", "GET", "u2", &key).await.allowed);
    assert!(oreo.check_user_auth("/a", "PUT", "u2", &key).await.allowed);

    // toggling every remaining bit prunes the uri from the grant
    oreo.remove_user_sign(&key, &["u2".to_string()], &grants(&[("/a", 2 | 4)]))
        .await
        .unwrap();
    assert!(!oreo.check_user_auth("/a", "POST", "u2", &key).await.allowed);
    assert!(!oreo.check_user_auth("/a", "PUT", "u2", &key).await.allowed);
}

#[tokio::test]
async fn transfer_moves_ownership_and_repoints_grants() {
    let oreo = oreo().await;
    oreo.add_route(&[route("/a", &[("GET", true)])]).await.unwrap();
    oreo.add_role("dev", "", 0, true, &grants(&[("/a", 1)])).await.unwrap();
    oreo.add_user("src", "Src").await.unwrap();
    oreo.add_user("dest", "Dest").await.unwrap();
    oreo.add_user("u3", "Other").await.unwrap();
    let key = private_key_of(&oreo, "src").await;
    oreo.add_sign(&key, "u3", &grants(&[("/a", 1)])).await.unwrap();

    oreo.user_transfer_sign_key(&key, "handed over", "src", "dest")
        .await
        .unwrap();

    let all = oreo.get_all_sign().await.unwrap();
    assert_eq!(all[&key], "dest");

    // new owner short-circuits; old owner lost the authority
    assert!(oreo.check_user_auth("/a", "GET", "dest", &key).await.allowed);
    assert!(!oreo.check_user_auth("/a", "GET", "src", &key).await.allowed);

    let view = oreo.get_sign_by_key(&key).await.unwrap();
    assert_eq!(view.owner_id, "dest");
}

#[tokio::test]
async fn sign_key_quota_is_enforced() {
    let oreo = oreo().await;
    oreo.add_role("dev", "", 0, true, &grants(&[])).await.unwrap();
    oreo.add_user("u1", "Alice").await.unwrap();

    // the private key counts against the quota of 50
    for i in 0..49 {
        oreo.create_user_sign_key("u1", &format!("key {i}")).await.unwrap();
    }
    let err = oreo.create_user_sign_key("u1", "one too many").await.unwrap_err();
    assert!(matches!(err, OreoError::SignKeyLimit(50)));
}

#[tokio::test]
async fn user_sign_diff_global_reports_uncovered_enabled_methods() {
    let oreo = oreo().await;
    oreo.add_route(&[
        route("/a", &[("GET", true), ("POST", true)]),
        route("/b", &[("GET", false)]),
    ])
    .await
    .unwrap();
    oreo.add_role("dev", "", 0, true, &grants(&[])).await.unwrap();
    oreo.add_user("owner", "Owner").await.unwrap();
    oreo.add_user("u2", "Bob").await.unwrap();
    let key = private_key_of(&oreo, "owner").await;
    oreo.add_sign(&key, "u2", &grants(&[("/a", 1)])).await.unwrap();

    let diff = oreo.user_sign_diff_global(&key, "u2").await.unwrap();
    // /b has no data-auth-enabled method, so only /a POST is missing
    assert_eq!(diff.len(), 1);
    assert_eq!(diff[0].uri, "/a");
    assert_eq!(diff[0].methods.len(), 1);
    assert_eq!(diff[0].methods[0].method, "POST");
}

// ── sign-key discovery ──────────────────────────────────────────

#[tokio::test]
async fn query_user_sign_by_url_includes_owned_keys_and_get_grants() {
    let oreo = oreo().await;
    oreo.add_route(&[route("/a/:id", &[("GET", true), ("POST", true)])])
        .await
        .unwrap();
    oreo.add_role("dev", "", 0, true, &grants(&[("/a/:id", 3)]))
        .await
        .unwrap();
    oreo.add_user("owner", "Owner").await.unwrap();
    oreo.add_user("u2", "Bob").await.unwrap();
    let owner_key = private_key_of(&oreo, "owner").await;
    let u2_key = private_key_of(&oreo, "u2").await;
    oreo.add_sign(&owner_key, "u2", &grants(&[("/a/:id", 1)]))
        .await
        .unwrap();

    // grant holds only GET, but POST queries include GET-granted keys
    let keys = oreo.query_user_sign_by_url("/a/7", "POST", "u2").await.unwrap();
    assert!(keys.contains(&u2_key), "owned key always listed");
    assert!(keys.contains(&owner_key), "GET grant rides along on writes");
}

#[tokio::test]
async fn query_user_create_data_sign_key_resolves_descriptions() {
    let oreo = oreo().await;
    oreo.add_route(&[route("/a", &[("POST", true)])]).await.unwrap();
    oreo.add_role("dev", "", 0, true, &grants(&[("/a", 2)])).await.unwrap();
    oreo.add_user("owner", "Owner").await.unwrap();
    oreo.add_user("u2", "Bob").await.unwrap();
    let owner_key = private_key_of(&oreo, "owner").await;
    let u2_key = private_key_of(&oreo, "u2").await;
    oreo.add_sign(&owner_key, "u2", &grants(&[("/a", 2)])).await.unwrap();

    let keys = oreo
        .query_user_create_data_sign_key("/a", "POST", "u2")
        .await
        .unwrap();
    assert!(keys.contains_key(&u2_key));
    assert_eq!(keys[&owner_key], "user private sign key");

    // unmatched url is an error, not an empty result
    assert!(oreo
        .query_user_create_data_sign_key("/zzz", "POST", "u2")
        .await
        .is_err());
}

// ── user listings ───────────────────────────────────────────────

#[tokio::test]
async fn user_listings_and_regex_search() {
    let oreo = oreo().await;
    oreo.add_role("dev", "", 0, true, &grants(&[])).await.unwrap();
    oreo.add_user("alice", "Alice").await.unwrap();
    oreo.add_user("bob", "Bob").await.unwrap();

    assert!(oreo.check_user_exist("alice").await);
    assert!(!oreo.check_user_exist("carol").await);

    let all = oreo.get_all_users().await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].user_id, "alice");

    let found = oreo.get_user_by_id_regex("^ali").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].user_id, "alice");
}

#[tokio::test]
async fn add_user_without_default_role_fails() {
    let oreo = oreo().await;
    let err = oreo.add_user("u1", "Alice").await.unwrap_err();
    assert!(matches!(err, OreoError::NotFound(_)));
    // bare creation has no enrollment step
    oreo.add_user_no_role("u2", "Bob").await.unwrap();
}

#[tokio::test]
async fn user_own_signs_separates_owned_from_granted() {
    let oreo = oreo().await;
    oreo.add_route(&[route("/a", &[("GET", true)])]).await.unwrap();
    oreo.add_role("dev", "", 0, true, &grants(&[("/a", 1)])).await.unwrap();
    oreo.add_user("owner", "Owner").await.unwrap();
    oreo.add_user("u2", "Bob").await.unwrap();
    let key = private_key_of(&oreo, "owner").await;
    oreo.add_sign(&key, "u2", &grants(&[("/a", 1)])).await.unwrap();

    let list = oreo.user_own_signs("u2").await.unwrap();
    assert_eq!(list.own_signs.len(), 1, "the auto-minted private key");
    assert_eq!(list.grant_signs.len(), 1);
    assert_eq!(list.grant_signs[0].sign_key, key);
    assert_eq!(list.grant_signs[0].own_user, "owner");
    assert_eq!(list.grant_signs[0].own_name, "Owner");
    assert_eq!(list.grant_signs[0].routers.len(), 1);
    assert!(!list.grant_signs[0].routers[0].is_delete);
}

// ── route views ─────────────────────────────────────────────────

#[tokio::test]
async fn route_views_and_metadata_updates() {
    let oreo = oreo().await;
    oreo.add_route(&[route("/a", &[("GET", true), ("POST", false)])])
        .await
        .unwrap();

    oreo.update_route_desc("/a", "service a").await.unwrap();
    oreo.update_route_method_desc("/a", "GET", "read a").await.unwrap();

    let view = oreo.get_route_by_url("/a").await.unwrap();
    assert_eq!(view.desc, "service a");
    let get = view.methods.iter().find(|m| m.method == "GET").unwrap();
    assert_eq!(get.desc, "read a");
    assert!(get.enable);

    let data_auth = oreo.get_data_auth_routes().await.unwrap();
    assert_eq!(data_auth.len(), 1);
    assert_eq!(data_auth[0].methods.len(), 1);
    assert_eq!(data_auth[0].methods[0].method, "GET");

    let by_regex = oreo.get_route_by_url_regex("^/a$").await.unwrap();
    assert_eq!(by_regex.len(), 1);

    assert!(oreo.get_route_by_url("/zzz").await.is_err());
}

#[tokio::test]
async fn deleted_route_leaves_dangling_grants_flagged() {
    let oreo = oreo().await;
    oreo.add_route(&[route("/a", &[("GET", false)])]).await.unwrap();
    oreo.add_role("dev", "", 0, true, &grants(&[("/a", 1)])).await.unwrap();

    oreo.delete_route("/a").await.unwrap();

    let roles = oreo.get_role_list("dev").await.unwrap();
    assert_eq!(roles.len(), 1);
    let router = &roles[0].routers[0];
    assert!(router.is_delete);
    assert_eq!(router.uri_desc, "Unknown");
}
