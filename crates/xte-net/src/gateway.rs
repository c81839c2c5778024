//! HTTP gateway
//!
//! Implements the service contracts against the server's AJAX routes.
//! Mutating calls are form-encoded POSTs, refresh calls are GETs, matching
//! what the rendered page itself issues.

use url::Url;

use crate::services::{
    DeleteModule, ElementService, InsertModule, KeyService, ModuleService, RemoveOutcome,
    RemoveReply,
};
use crate::NetError;

/// Endpoint URLs consumed by the gateway
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub insert_module: Url,
    pub delete_module: Url,
    pub generate_element: Url,
    pub remove_element: Url,
    pub changed_keys: Url,
    pub keyref: Url,
}

impl Endpoints {
    /// Build the default routes under a server base URL
    pub fn rooted(base: &Url) -> Result<Self, NetError> {
        let join = |route: &str| {
            base.join(route)
                .map_err(|e| NetError::Url(format!("{route}: {e}")))
        };
        Ok(Self {
            insert_module: join("template/module/insert")?,
            delete_module: join("template/module/delete")?,
            generate_element: join("element/generate")?,
            remove_element: join("element/remove")?,
            changed_keys: join("modules/core/get-updated-keys")?,
            keyref: join("modules/core/auto-keyref")?,
        })
    }
}

/// HTTP implementation of the editor's service contracts
#[derive(Debug)]
pub struct HttpGateway {
    client: reqwest::Client,
    endpoints: Endpoints,
}

impl HttpGateway {
    /// Create a gateway for the given endpoints
    pub fn new(endpoints: Endpoints) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoints,
        }
    }

    async fn post_form<T: serde::Serialize + ?Sized>(
        &self,
        url: &Url,
        form: &T,
    ) -> Result<reqwest::Response, NetError> {
        tracing::info!("HTTP POST {}", url);
        let response = self.client.post(url.clone()).form(form).send().await?;
        ok_status(response)
    }

    async fn get(&self, url: Url) -> Result<reqwest::Response, NetError> {
        tracing::info!("HTTP GET {}", url);
        let response = self.client.get(url).send().await?;
        ok_status(response)
    }
}

fn ok_status(response: reqwest::Response) -> Result<reqwest::Response, NetError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(NetError::Status(status.as_u16()))
    }
}

fn parse_remove_reply(body: &str) -> Result<RemoveOutcome, NetError> {
    let reply: RemoveReply =
        serde_json::from_str(body).map_err(|e| NetError::Parse(e.to_string()))?;
    reply.try_into()
}

fn parse_changed_keys(body: &str) -> Result<Vec<String>, NetError> {
    serde_json::from_str(body).map_err(|e| NetError::Parse(e.to_string()))
}

impl ModuleService for HttpGateway {
    async fn insert_module(&self, req: &InsertModule) -> Result<(), NetError> {
        self.post_form(&self.endpoints.insert_module, req).await?;
        Ok(())
    }

    async fn delete_module(&self, req: &DeleteModule) -> Result<(), NetError> {
        self.post_form(&self.endpoints.delete_module, req).await?;
        Ok(())
    }
}

impl ElementService for HttpGateway {
    async fn generate_element(&self, id: &str) -> Result<String, NetError> {
        let response = self
            .post_form(&self.endpoints.generate_element, &[("id", id)])
            .await?;
        Ok(response.text().await?)
    }

    async fn remove_element(&self, id: &str) -> Result<RemoveOutcome, NetError> {
        let response = self
            .post_form(&self.endpoints.remove_element, &[("id", id)])
            .await?;
        parse_remove_reply(&response.text().await?)
    }
}

impl KeyService for HttpGateway {
    async fn changed_keys(&self) -> Result<Vec<String>, NetError> {
        let response = self.get(self.endpoints.changed_keys.clone()).await?;
        parse_changed_keys(&response.text().await?)
    }

    async fn keyref_fragment(&self, id: &str) -> Result<String, NetError> {
        let mut url = self.endpoints.keyref.clone();
        url.query_pairs_mut().append_pair("module_id", id);
        let response = self.get(url).await?;
        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_rooted() {
        let base = Url::parse("https://editor.example.org/parser/").unwrap();
        let endpoints = Endpoints::rooted(&base).unwrap();
        assert_eq!(
            endpoints.insert_module.as_str(),
            "https://editor.example.org/parser/template/module/insert"
        );
        assert_eq!(
            endpoints.changed_keys.as_str(),
            "https://editor.example.org/parser/modules/core/get-updated-keys"
        );
    }

    #[test]
    fn test_parse_remove_reply_bodies() {
        assert_eq!(
            parse_remove_reply(r#"{"code": 1}"#).unwrap(),
            RemoveOutcome::HideRemoveControls
        );
        assert_eq!(
            parse_remove_reply(r#"{"code": 2, "html": "<div>x</div>"}"#).unwrap(),
            RemoveOutcome::Rewrite {
                html: "<div>x</div>".to_string()
            }
        );
        assert!(matches!(
            parse_remove_reply("not json"),
            Err(NetError::Parse(_))
        ));
    }

    #[test]
    fn test_parse_changed_keys_body() {
        assert_eq!(
            parse_changed_keys(r#"["key-1", "key-2"]"#).unwrap(),
            vec!["key-1", "key-2"]
        );
        assert!(matches!(
            parse_changed_keys(r#"{"nope": 1}"#),
            Err(NetError::Parse(_))
        ));
    }

    #[test]
    fn test_keyref_query() {
        let base = Url::parse("https://editor.example.org/").unwrap();
        let endpoints = Endpoints::rooted(&base).unwrap();
        let mut url = endpoints.keyref.clone();
        url.query_pairs_mut().append_pair("module_id", "key-3");
        assert_eq!(
            url.as_str(),
            "https://editor.example.org/modules/core/auto-keyref?module_id=key-3"
        );
    }
}
