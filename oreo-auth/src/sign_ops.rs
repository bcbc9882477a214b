use crate::authorization::Authorization;
use oreo_core::error::{OreoError, Result};
use oreo_core::method::Method;
use oreo_core::model::{
    GrantSign, OwnSign, RouteListView, SignInfo, SignListView, SignView, UpsertSignInfo,
    UserSignList,
};
use std::collections::HashMap;
use tracing::error;

/// Sign-grant operations.
impl Authorization {
    /// Stage two of the decision: does the caller hold data authority?
    ///
    /// Owning the key grants everything; otherwise the grant's stored
    /// methodValue for the matched uri must cover every bit of the request
    /// method. Store failures deny.
    pub async fn query_sign_auth(
        &self,
        sign_key: &str,
        url: &str,
        method: Method,
        user_id: &str,
    ) -> bool {
        match self
            .store()
            .user_owns_sign_key(self.group_name(), user_id, sign_key)
            .await
        {
            Ok(true) => return true,
            Ok(false) => {}
            Err(e) => {
                error!(error = %e, user_id = user_id, "sign owner query failed");
                return false;
            }
        }

        match self
            .store()
            .sign_covers(self.group_name(), sign_key, user_id, url, method.bit())
            .await
        {
            Ok(covered) => covered,
            Err(e) => {
                error!(error = %e, user_id = user_id, "sign grant query failed");
                false
            }
        }
    }

    /// Grant a sign key to a user. The requested addresses are intersected
    /// against the catalog's data-auth-enabled methods; bits whose route
    /// method has data-auth off are dropped. An empty intersection is a
    /// silent no-op: nothing the grant could ever gate.
    pub async fn sign_upsert(&self, info: UpsertSignInfo) -> Result<()> {
        let owner = self.find_sign_key_owner(&info.sign_key).await?;

        let enabled = self.router_verify_data_ensure().await?;

        let mut verify_data_uri: HashMap<String, u8> = HashMap::new();
        for addr in &info.addr_list {
            let Some(enabled_mask) = enabled.get(&addr.uri) else {
                continue;
            };
            let mask = addr.method_value & enabled_mask;
            if mask > 0 {
                verify_data_uri.insert(addr.uri.clone(), mask);
            }
        }

        if verify_data_uri.is_empty() {
            return Ok(());
        }

        let sign = SignInfo {
            sign_key: info.sign_key,
            create_user_id: owner.user_id,
            user_id: info.user_id,
            group_name: self.group_name().to_string(),
            verify_data_uri,
        };

        self.store().upsert_sign(&sign).await
    }

    pub async fn sign_remove(&self, sign_key: &str, user_id: &str) -> Result<()> {
        self.store()
            .remove_sign(self.group_name(), sign_key, user_id)
            .await
    }

    /// Everything granted under one key: the owner plus per-grantee route
    /// detail.
    pub async fn sign_get_info(&self, sign_key: &str) -> Result<SignListView> {
        let signs = self
            .store()
            .signs_by_key(self.group_name(), sign_key)
            .await?;

        let router_infos = self.router_get_info().await?;
        let owner = self.find_sign_key_owner(sign_key).await?;
        let users = self.store().get_users(self.group_name()).await?;

        let user_names: HashMap<&str, &str> = users
            .iter()
            .map(|u| (u.user_id.as_str(), u.name.as_str()))
            .collect();

        let mut sign_views = Vec::with_capacity(signs.len());
        for sign in &signs {
            let addrs = Self::addrs_of(&sign.verify_data_uri);
            sign_views.push(SignView {
                user_id: sign.user_id.clone(),
                name: user_names
                    .get(sign.user_id.as_str())
                    .map(|n| (*n).to_string())
                    .unwrap_or_default(),
                routers: Self::router_detail_req_addr(&router_infos, &addrs),
            });
        }
        sign_views.sort_by(|a, b| a.user_id.cmp(&b.user_id));

        Ok(SignListView {
            owner_id: owner.user_id,
            name: owner.name,
            sign_key: sign_key.to_string(),
            sign_views,
        })
    }

    /// Copy a key's data authority to other users. The owner grants the
    /// full currently-enabled catalog (their own authority is implicit, not
    /// recorded); anyone else passes on exactly what their grant holds.
    /// Inserts, so copying onto an existing grant is a duplicate-key error.
    pub async fn sign_copy(
        &self,
        sign_key: &str,
        copy_user_id: &str,
        past_user_ids: &[String],
    ) -> Result<()> {
        let owns = self
            .store()
            .user_owns_sign_key(self.group_name(), copy_user_id, sign_key)
            .await?;

        let (verify_data_uri, create_user_id) = if owns {
            (self.router_verify_data_ensure().await?, copy_user_id.to_string())
        } else {
            let sign = self
                .store()
                .get_sign(self.group_name(), sign_key, copy_user_id)
                .await?
                .ok_or_else(|| {
                    OreoError::NotFound(format!("sign grant ({}, {})", sign_key, copy_user_id))
                })?;
            (sign.verify_data_uri, sign.create_user_id)
        };

        for past_user_id in past_user_ids {
            let sign = SignInfo {
                sign_key: sign_key.to_string(),
                create_user_id: create_user_id.clone(),
                user_id: past_user_id.clone(),
                group_name: self.group_name().to_string(),
                verify_data_uri: verify_data_uri.clone(),
            };
            self.store().insert_sign(&sign).await?;
        }

        Ok(())
    }

    /// OR the given (uri, methodValue) pairs into each user's grant.
    pub async fn sign_patch_verify_data(
        &self,
        sign_key: &str,
        user_ids: &[String],
        url_method: &HashMap<String, u8>,
    ) -> Result<()> {
        for user_id in user_ids {
            let mut sign = self
                .store()
                .get_sign(self.group_name(), sign_key, user_id)
                .await?
                .ok_or_else(|| {
                    OreoError::NotFound(format!("sign grant ({}, {})", sign_key, user_id))
                })?;

            for (uri, mask) in url_method {
                *sign.verify_data_uri.entry(uri.clone()).or_insert(0) |= mask;
            }

            self.store()
                .set_sign_verify_data(self.group_name(), sign_key, user_id, &sign.verify_data_uri)
                .await?;
        }

        Ok(())
    }

    /// XOR the given (uri, methodValue) pairs out of each user's grant,
    /// pruning uris that reach zero. XOR is a toggle, not a clear: naming
    /// bits the grant does not hold sets them. Callers depend on this, so
    /// it stays.
    pub async fn sign_remove_verify_data(
        &self,
        sign_key: &str,
        user_ids: &[String],
        url_method: &HashMap<String, u8>,
    ) -> Result<()> {
        for user_id in user_ids {
            let mut sign = self
                .store()
                .get_sign(self.group_name(), sign_key, user_id)
                .await?
                .ok_or_else(|| {
                    OreoError::NotFound(format!("sign grant ({}, {})", sign_key, user_id))
                })?;

            let uris: Vec<String> = sign.verify_data_uri.keys().cloned().collect();
            for uri in uris {
                let Some(mask) = url_method.get(&uri) else {
                    continue;
                };
                let stored = sign.verify_data_uri[&uri];
                let toggled = stored ^ mask;
                if toggled > 0 {
                    sign.verify_data_uri.insert(uri, toggled);
                } else {
                    sign.verify_data_uri.remove(&uri);
                }
            }

            self.store()
                .set_sign_verify_data(self.group_name(), sign_key, user_id, &sign.verify_data_uri)
                .await?;
        }

        Ok(())
    }

    /// Data-auth-enabled catalog methods one grant does NOT cover.
    pub async fn sign_diff_global_data_auth_route(
        &self,
        sign_key: &str,
        user_id: &str,
    ) -> Result<Vec<RouteListView>> {
        let data_auth_routes = self.router_list(true).await?;

        let sign = self
            .store()
            .get_sign(self.group_name(), sign_key, user_id)
            .await?
            .ok_or_else(|| {
                OreoError::NotFound(format!("sign grant ({}, {})", sign_key, user_id))
            })?;

        let granted = Self::uri_method_set(&Self::addrs_of(&sign.verify_data_uri));
        Ok(Self::route_diff(&data_auth_routes, granted))
    }

    /// Sign keys the user can wield: keys they own, plus keys granted to
    /// them with per-route detail and the owner resolved.
    pub async fn user_own_signs(&self, user_id: &str) -> Result<UserSignList> {
        let infos = self
            .store()
            .signs_by_user(self.group_name(), user_id)
            .await?;

        let users = self.store().get_users(self.group_name()).await?;

        struct OwnerEntry {
            user_id: String,
            name: String,
            desc: String,
        }

        let mut all_sign_descs: HashMap<String, OwnerEntry> = HashMap::new();
        let mut own_signs = Vec::new();
        for user in &users {
            for (sign_key, desc) in &user.sign_key {
                all_sign_descs.insert(
                    sign_key.clone(),
                    OwnerEntry {
                        user_id: user.user_id.clone(),
                        name: user.name.clone(),
                        desc: desc.clone(),
                    },
                );
            }
            if user.user_id == user_id {
                for (sign_key, desc) in &user.sign_key {
                    own_signs.push(OwnSign {
                        sign_key: sign_key.clone(),
                        desc: desc.clone(),
                    });
                }
            }
        }
        own_signs.sort_by(|a, b| a.sign_key.cmp(&b.sign_key));

        let router_infos = self.router_get_info().await?;

        let mut grant_signs = Vec::with_capacity(infos.len());
        for info in &infos {
            let addrs = Self::addrs_of(&info.verify_data_uri);
            let routers = Self::router_detail_req_addr(&router_infos, &addrs);
            let (desc, own_user, own_name) = match all_sign_descs.get(&info.sign_key) {
                Some(entry) => (entry.desc.clone(), entry.user_id.clone(), entry.name.clone()),
                None => (String::new(), String::new(), String::new()),
            };
            grant_signs.push(GrantSign {
                sign_key: info.sign_key.clone(),
                desc,
                own_user,
                own_name,
                routers,
            });
        }
        grant_signs.sort_by(|a, b| a.sign_key.cmp(&b.sign_key));

        Ok(UserSignList {
            own_signs,
            grant_signs,
        })
    }
}
