use crate::authorization::{new_token, Authorization};
use oreo_core::error::{OreoError, Result};
use oreo_core::method::Method;
use oreo_core::model::{AddUser, UserDetail, UserInfo, SIGN_KEY_LIMIT};
use std::collections::HashMap;

const PRIVATE_SIGN_DESC: &str = "user private sign key";

/// User operations.
impl Authorization {
    /// Move a sign key to another user: drop the entry from the source,
    /// write it on the destination with the new description, then re-point
    /// `createUserId` on every grant of the key.
    ///
    /// The three writes are not transactional. A failure in between can
    /// leave the key claimed by neither user (after step one) or by the
    /// destination with stale grant owners (after step two) until retried;
    /// each step is idempotent, so retrying the whole call converges.
    pub async fn user_transfer_sign_key(
        &self,
        sign_key: &str,
        sign_desc: &str,
        src_user_id: &str,
        dest_user_id: &str,
    ) -> Result<()> {
        self.store()
            .remove_user_sign_key(self.group_name(), src_user_id, sign_key)
            .await?;

        self.store()
            .set_user_sign_key(self.group_name(), dest_user_id, sign_key, sign_desc)
            .await?;

        self.store()
            .set_sign_create_user(self.group_name(), sign_key, dest_user_id)
            .await
    }

    /// All users, id + name only.
    pub async fn get_all_users(&self) -> Result<Vec<UserDetail>> {
        let users = self.store().get_users(self.group_name()).await?;

        let mut details: Vec<UserDetail> = users
            .into_iter()
            .map(|u| UserDetail {
                user_id: u.user_id,
                name: u.name,
            })
            .collect();
        details.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        Ok(details)
    }

    /// Every minted sign key mapped to its owning user.
    pub async fn get_all_user_sign(&self) -> Result<HashMap<String, String>> {
        let users = self.store().get_users(self.group_name()).await?;

        let mut signs = HashMap::new();
        for user in users {
            for sign_key in user.sign_key.keys() {
                signs.insert(sign_key.clone(), user.user_id.clone());
            }
        }
        Ok(signs)
    }

    pub async fn user_check_exist(&self, user_id: &str) -> bool {
        match self.store().get_user(self.group_name(), user_id).await {
            Ok(user) => user.is_some(),
            Err(_) => false,
        }
    }

    /// Create a user with an auto-minted private sign key and enroll them
    /// into the group's default role; a group without a default role
    /// rejects the call.
    pub async fn user_add_info(&self, info: AddUser) -> Result<()> {
        let sign_key = new_token();
        let private_key = HashMap::from([(sign_key, PRIVATE_SIGN_DESC.to_string())]);

        let user = UserInfo {
            name: info.name,
            user_id: info.user_id.clone(),
            group_name: self.group_name().to_string(),
            sign_key: private_key,
        };
        self.store().insert_user(&user).await?;

        self.store()
            .add_user_to_default_role(self.group_name(), &info.user_id)
            .await
    }

    /// Create a bare user: no sign key, no role enrollment.
    pub async fn user_add(&self, info: AddUser) -> Result<()> {
        let user = UserInfo {
            name: info.name,
            user_id: info.user_id,
            group_name: self.group_name().to_string(),
            sign_key: HashMap::new(),
        };
        self.store().insert_user(&user).await
    }

    pub async fn user_get_info(&self) -> Result<Vec<UserInfo>> {
        self.store().get_users(self.group_name()).await
    }

    pub async fn user_get_info_one(&self, user_id: &str) -> Result<UserInfo> {
        self.store()
            .get_user(self.group_name(), user_id)
            .await?
            .ok_or_else(|| OreoError::NotFound(format!("user {}", user_id)))
    }

    pub async fn user_get_info_reg(&self, user_id: &str) -> Result<Vec<UserInfo>> {
        let mut users = self
            .store()
            .search_users_by_id(self.group_name(), user_id)
            .await?;
        users.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        Ok(users)
    }

    /// Sign keys the user can mint data under for one (uri, method): their
    /// own keys always qualify, plus granted keys covering the method bit.
    /// Descriptions are resolved through the keys' owners.
    pub async fn user_create_data_sign_key(
        &self,
        user_id: &str,
        uri: &str,
        method: Method,
    ) -> Result<HashMap<String, String>> {
        let user = self.user_get_info_one(user_id).await?;
        let mut create_signs: HashMap<String, String> = user.sign_key.clone();

        let signs = self
            .store()
            .signs_of_user_all_bits(self.group_name(), user_id, uri, method.bit())
            .await?;

        if signs.is_empty() {
            return Ok(create_signs);
        }

        let descs = self.sign_descs_by_owner().await?;
        for sign in signs {
            let desc = descs.get(&sign.sign_key).cloned().unwrap_or_default();
            create_signs.insert(sign.sign_key, desc);
        }

        Ok(create_signs)
    }

    /// Sign keys usable by the user on one (uri, method): owned keys plus
    /// grants touching the method bit. GET authority is always offered
    /// alongside, reads being implied by any write grant.
    pub async fn user_own_signs_by_uri(
        &self,
        user_id: &str,
        uri: &str,
        method: Method,
    ) -> Result<Vec<String>> {
        let user = self.user_get_info_one(user_id).await?;

        let mut sign_keys: Vec<String> = user.sign_key.keys().cloned().collect();

        let mask = method.bit() | Method::Get.bit();
        let signs = self
            .store()
            .signs_of_user_any_bits(self.group_name(), user_id, uri, mask)
            .await?;
        sign_keys.extend(signs.into_iter().map(|s| s.sign_key));
        sign_keys.sort();

        Ok(sign_keys)
    }

    pub async fn find_sign_key_owner(&self, sign_key: &str) -> Result<UserInfo> {
        self.store()
            .find_sign_key_owner(self.group_name(), sign_key)
            .await?
            .ok_or_else(|| OreoError::NotFound(format!("owner of sign key {}", sign_key)))
    }

    /// Update the description of a key the user owns.
    pub async fn user_update_sign_key(
        &self,
        user_id: &str,
        sign_key: &str,
        sign_desc: &str,
    ) -> Result<()> {
        self.store()
            .update_user_sign_desc(self.group_name(), user_id, sign_key, sign_desc)
            .await
    }

    /// Mint a new sign key for the user. Keys are never deleted, so each
    /// user is capped at `SIGN_KEY_LIMIT` owned keys.
    pub async fn user_create_sign_key(&self, user_id: &str, sign_desc: &str) -> Result<String> {
        let user = self.user_get_info_one(user_id).await?;

        if user.sign_key.len() >= SIGN_KEY_LIMIT {
            return Err(OreoError::SignKeyLimit(SIGN_KEY_LIMIT));
        }

        let sign_key = new_token();
        self.store()
            .set_user_sign_key(self.group_name(), user_id, &sign_key, sign_desc)
            .await?;

        // the owner is never written into the grant collection: owning the
        // key already implies full data authority
        Ok(sign_key)
    }

    /// `sign key → description` over every user's owned keys.
    pub(crate) async fn sign_descs_by_owner(&self) -> Result<HashMap<String, String>> {
        let users = self.store().get_users(self.group_name()).await?;

        let mut descs = HashMap::new();
        for user in users {
            for (sign_key, desc) in user.sign_key {
                descs.insert(sign_key, desc);
            }
        }
        Ok(descs)
    }
}
