use crate::authorization::Authorization;
use oreo_core::error::{OreoError, Result};
use oreo_core::method::Method;
use oreo_core::model::{router_map_key, RouteListView, RouteMethodView, RouterInfo};
use std::collections::HashMap;

/// Route-catalog operations.
impl Authorization {
    pub async fn router_update_uri_desc(&self, uri: &str, desc: &str) -> Result<()> {
        self.store()
            .update_route_desc(self.group_name(), uri, desc)
            .await
    }

    pub async fn router_update_method_desc(
        &self,
        uri: &str,
        method: Method,
        desc: &str,
    ) -> Result<()> {
        self.store()
            .update_route_method_desc(self.group_name(), uri, method.bit_str(), desc)
            .await
    }

    pub async fn router_upsert_batch(&self, infos: &[RouterInfo]) -> Result<()> {
        self.store().upsert_routes(infos).await
    }

    pub async fn router_get_info(&self) -> Result<Vec<RouterInfo>> {
        self.store().get_routes(self.group_name()).await
    }

    pub async fn router_get_info_and_urls(&self) -> Result<(Vec<RouterInfo>, Vec<String>)> {
        let routers = self.router_get_info().await?;
        let urls = routers.iter().map(|r| r.uri.clone()).collect();
        Ok((routers, urls))
    }

    /// Every registered uri with its admitted methods; feeds trie builds.
    pub async fn router_get_method(&self) -> Result<Vec<(String, Vec<Method>)>> {
        let routers = self.router_get_info().await?;
        Ok(routers
            .into_iter()
            .map(|r| {
                let methods = r
                    .method_map
                    .keys()
                    .filter_map(|bit| Method::from_bit_str(bit))
                    .collect();
                (r.uri, methods)
            })
            .collect())
    }

    pub async fn router_info_by_uri(&self, uri: &str) -> Result<RouteListView> {
        let router = self
            .store()
            .get_route_by_uri(self.group_name(), uri)
            .await?
            .ok_or_else(|| OreoError::NotFound(format!("route {}", uri)))?;
        Ok(Self::route_view(&router, false))
    }

    pub async fn router_get_info_reg(&self, uri: &str) -> Result<Vec<RouteListView>> {
        let routers = self
            .store()
            .search_routes_by_uri(self.group_name(), uri)
            .await?;
        let mut views: Vec<RouteListView> =
            routers.iter().map(|r| Self::route_view(r, false)).collect();
        views.sort_by(|a, b| a.uri.cmp(&b.uri));
        Ok(views)
    }

    pub async fn router_remove(&self, uri: &str) -> Result<()> {
        self.store().remove_route(self.group_name(), uri).await
    }

    pub async fn router_del_method(&self, uri: &str, method: Method) -> Result<()> {
        self.store()
            .remove_route_method(self.group_name(), uri, method.bit_str())
            .await
    }

    /// Flip one (uri, method) data-auth bit and cascade the new value into
    /// every role's routerMap so the hot-path presence check stays honest.
    pub async fn router_verify_data(&self, uri: &str, method: Method, enable: bool) -> Result<()> {
        self.store()
            .set_route_method_enable(self.group_name(), uri, method.bit_str(), enable)
            .await?;

        self.store()
            .refresh_role_router_maps(
                self.group_name(),
                &router_map_key(method.bit_str(), uri),
                enable,
            )
            .await
    }

    /// Route list views; `enable_only` keeps just data-auth-enabled methods
    /// and drops routes left with none.
    pub async fn router_list(&self, enable_only: bool) -> Result<Vec<RouteListView>> {
        let routers = self.router_get_info().await?;

        let mut views = Vec::new();
        for router in &routers {
            let view = Self::route_view(router, enable_only);
            if !view.methods.is_empty() {
                views.push(view);
            }
        }

        views.sort_by(|a, b| a.uri.cmp(&b.uri));
        Ok(views)
    }

    /// `uri → set of data-auth-enabled method bits`, the reference the
    /// sign-grant writers intersect against.
    pub async fn router_verify_data_ensure(&self) -> Result<HashMap<String, u8>> {
        let routers = self.router_get_info().await?;

        let mut enabled = HashMap::new();
        for router in routers {
            let mut mask = 0u8;
            for (bit, data) in &router.method_map {
                if data.enable {
                    if let Some(m) = Method::from_bit_str(bit) {
                        mask |= m.bit();
                    }
                }
            }
            if mask > 0 {
                enabled.insert(router.uri, mask);
            }
        }

        Ok(enabled)
    }

    fn route_view(router: &RouterInfo, enable_only: bool) -> RouteListView {
        let mut methods: Vec<RouteMethodView> = router
            .method_map
            .iter()
            .filter_map(|(bit, data)| {
                let method = Method::from_bit_str(bit)?;
                if enable_only && !data.enable {
                    return None;
                }
                Some(RouteMethodView {
                    method: method.as_str().to_string(),
                    desc: data.method_desc.clone(),
                    enable: data.enable,
                })
            })
            .collect();
        methods.sort_by(|a, b| a.method.cmp(&b.method));

        RouteListView {
            uri: router.uri.clone(),
            desc: router.desc.clone(),
            methods,
        }
    }
}
