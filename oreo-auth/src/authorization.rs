use oreo_core::error::Result;
use oreo_core::method::bits_to_methods;
use oreo_core::model::{
    Address, GroupInfo, RoleRouteInfo, RoleRouteMethodInfo, RouterInfo, UserDetail, UserInfo,
};
use oreo_store::AuthStore;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Mint an opaque identifier (group tokens, sign keys).
pub(crate) fn new_token() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Policy engine bound to one group.
///
/// Owns no in-memory policy state: every query and mutation goes through
/// the persistence port, which keeps `check_user_auth` a pure function of
/// the persisted state plus the route-store snapshot.
pub struct Authorization {
    group_name: String,
    store: Arc<dyn AuthStore>,
}

impl Authorization {
    /// Bind to a group, creating its record (with a freshly minted token)
    /// on first contact. An existing group keeps its token.
    pub async fn new(group_name: String, store: Arc<dyn AuthStore>) -> Result<Self> {
        let auth = Self { group_name, store };
        auth.init_group().await?;
        Ok(auth)
    }

    async fn init_group(&self) -> Result<()> {
        let group = GroupInfo {
            group_name: self.group_name.clone(),
            group_token: new_token(),
        };
        self.store.ensure_group(&group).await
    }

    pub fn group_name(&self) -> &str {
        &self.group_name
    }

    pub(crate) fn store(&self) -> &Arc<dyn AuthStore> {
        &self.store
    }

    pub async fn group_info(&self) -> Result<Vec<GroupInfo>> {
        self.store.list_groups().await
    }

    // ── shared view helpers ─────────────────────────────────────

    /// Expand a grant list into per-route detail, cross-referenced against
    /// the current catalog. Grants whose route (or method) is gone are kept
    /// and flagged `is_delete` with `Unknown` descriptions, so dangling
    /// permissions stay visible to operators.
    pub(crate) fn router_detail_req_addr(
        router_infos: &[RouterInfo],
        addr_list: &[Address],
    ) -> Vec<RoleRouteInfo> {
        let mut uri_index: HashMap<&str, usize> = HashMap::new();
        let mut uri_methods: HashSet<String> = HashSet::new();
        for (i, info) in router_infos.iter().enumerate() {
            uri_index.insert(info.uri.as_str(), i);
            for bit in info.method_map.keys() {
                uri_methods.insert(format!("{}{}", info.uri, bit));
            }
        }

        let mut routers = Vec::with_capacity(addr_list.len());

        for addr in addr_list {
            let methods = bits_to_methods(addr.method_value);
            let mut rri = RoleRouteInfo {
                uri: addr.uri.clone(),
                uri_desc: "Unknown".to_string(),
                is_delete: true,
                methods: methods
                    .iter()
                    .map(|m| RoleRouteMethodInfo {
                        method: m.as_str().to_string(),
                        method_desc: "Unknown".to_string(),
                        enable: false,
                        is_delete: true,
                    })
                    .collect(),
            };

            if let Some(&index) = uri_index.get(addr.uri.as_str()) {
                let info = &router_infos[index];
                rri.uri_desc = info.desc.clone();
                rri.is_delete = false;
                for (i, m) in methods.iter().enumerate() {
                    if uri_methods.contains(&format!("{}{}", addr.uri, m.bit_str())) {
                        if let Some(data) = info.method_map.get(m.bit_str()) {
                            rri.methods[i].method_desc = data.method_desc.clone();
                            rri.methods[i].enable = data.enable;
                            rri.methods[i].is_delete = false;
                        }
                    }
                }
            }

            routers.push(rri);
        }

        routers.sort_by(|a, b| a.uri.cmp(&b.uri));
        routers
    }

    /// Resolve user ids against the user list; unknown ids are dropped.
    pub(crate) fn user_detail(users: &[UserInfo], user_ids: &[String]) -> Vec<UserDetail> {
        let user_map: HashMap<&str, &str> = users
            .iter()
            .map(|u| (u.user_id.as_str(), u.name.as_str()))
            .collect();

        user_ids
            .iter()
            .filter_map(|id| {
                user_map.get(id.as_str()).map(|name| UserDetail {
                    user_id: id.clone(),
                    name: (*name).to_string(),
                })
            })
            .collect()
    }

    /// Convert a grant mapping (`uri → methodValue`) into an address list.
    pub(crate) fn addrs_of(verify_data_uri: &HashMap<String, u8>) -> Vec<Address> {
        verify_data_uri
            .iter()
            .map(|(uri, value)| Address {
                uri: uri.clone(),
                method_value: *value,
            })
            .collect()
    }

    /// "uri + METHOD" membership set over an address list.
    pub(crate) fn uri_method_set(addr_list: &[Address]) -> HashSet<String> {
        let mut set = HashSet::new();
        for addr in addr_list {
            for m in bits_to_methods(addr.method_value) {
                set.insert(format!("{}{}", addr.uri, m.as_str()));
            }
        }
        set
    }
}
