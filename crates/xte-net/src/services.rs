//! Service contracts
//!
//! One trait per endpoint family. Implementations own transport and routes;
//! the editor sees only these contracts.

use serde::{Deserialize, Serialize};

use crate::NetError;

/// Insert-module request payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InsertModule {
    #[serde(rename = "moduleID")]
    pub module_id: String,
    #[serde(rename = "templateID")]
    pub template_id: String,
    pub xpath: String,
}

/// Delete-module request payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteModule {
    pub xpath: String,
    #[serde(rename = "templateID")]
    pub template_id: String,
}

/// Outcome of a remove-element call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// Last removable occurrence: hide remove controls on all siblings
    HideRemoveControls,
    /// Siblings must be rewritten with the returned markup
    Rewrite { html: String },
}

/// Wire form of the remove-element reply: `{code: 1}` or `{code: 2, html}`
#[derive(Debug, Deserialize)]
pub(crate) struct RemoveReply {
    pub code: u8,
    #[serde(default)]
    pub html: Option<String>,
}

impl TryFrom<RemoveReply> for RemoveOutcome {
    type Error = NetError;

    fn try_from(reply: RemoveReply) -> Result<Self, NetError> {
        match reply.code {
            1 => Ok(RemoveOutcome::HideRemoveControls),
            2 => Ok(RemoveOutcome::Rewrite {
                html: reply.html.unwrap_or_default(),
            }),
            other => Err(NetError::UnknownCode(other)),
        }
    }
}

/// Module attach/detach endpoints
#[allow(async_fn_in_trait)]
pub trait ModuleService {
    /// Create the attachment of a module at an xpath within a template
    async fn insert_module(&self, req: &InsertModule) -> Result<(), NetError>;

    /// Destroy the attachment at an xpath within a template
    async fn delete_module(&self, req: &DeleteModule) -> Result<(), NetError>;
}

/// Repeated-element endpoints
#[allow(async_fn_in_trait)]
pub trait ElementService {
    /// Generate a new occurrence fragment for the identified element
    async fn generate_element(&self, id: &str) -> Result<String, NetError>;

    /// Remove an occurrence of the identified element
    async fn remove_element(&self, id: &str) -> Result<RemoveOutcome, NetError>;
}

/// Auto-key refresh endpoints
#[allow(async_fn_in_trait)]
pub trait KeyService {
    /// Identifiers of the auto-key fields whose references changed
    async fn changed_keys(&self) -> Result<Vec<String>, NetError>;

    /// Refreshed key-reference fragment for one field
    async fn keyref_fragment(&self, id: &str) -> Result<String, NetError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_reply_code_one() {
        let reply: RemoveReply = serde_json::from_str(r#"{"code": 1}"#).unwrap();
        assert_eq!(
            RemoveOutcome::try_from(reply).unwrap(),
            RemoveOutcome::HideRemoveControls
        );
    }

    #[test]
    fn test_remove_reply_code_two() {
        let reply: RemoveReply =
            serde_json::from_str(r#"{"code": 2, "html": "<div>x</div>"}"#).unwrap();
        assert_eq!(
            RemoveOutcome::try_from(reply).unwrap(),
            RemoveOutcome::Rewrite {
                html: "<div>x</div>".to_string()
            }
        );
    }

    #[test]
    fn test_remove_reply_unknown_code() {
        let reply: RemoveReply = serde_json::from_str(r#"{"code": 9}"#).unwrap();
        assert!(matches!(
            RemoveOutcome::try_from(reply),
            Err(NetError::UnknownCode(9))
        ));
    }

    #[test]
    fn test_insert_module_wire_names() {
        let req = InsertModule {
            module_id: "42".to_string(),
            template_id: "7".to_string(),
            xpath: "ns:a[1]/ns:b[2]".to_string(),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["moduleID"], "42");
        assert_eq!(json["templateID"], "7");
        assert_eq!(json["xpath"], "ns:a[1]/ns:b[2]");
    }
}
