//! Path labels and XPath derivation
//!
//! A path label is a namespace-qualified, optionally indexed element name
//! (`ns:element[3]`). The derived "xpath" of a node is the `/`-joined chain
//! of labeled ancestors from below the schema root down to the node itself;
//! it is a tree-node address, not a full XPath expression.

use std::fmt;

use crate::{FormTree, NodeData, NodeId};

/// Path derivation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// Node not found in the tree
    #[error("node not found in tree")]
    NodeNotFound,
    /// Target node has no path label to contribute
    #[error("target node carries no path label")]
    UnlabeledTarget,
    /// Walked off the tree without meeting a schema root
    #[error("no schema root above target")]
    MissingSchemaRoot,
    /// Label text did not parse
    #[error("invalid path label: {0}")]
    InvalidLabel(String),
}

/// Namespace-qualified, optionally indexed element label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathLabel {
    /// Namespace prefix (`ns` in `ns:element[3]`)
    pub prefix: Option<String>,
    /// Local element name
    pub name: String,
    /// Occurrence index, 1-based
    pub index: Option<u32>,
}

impl PathLabel {
    /// Create an unprefixed, unindexed label
    pub fn new(name: &str) -> Self {
        Self {
            prefix: None,
            name: name.to_string(),
            index: None,
        }
    }

    /// Set the namespace prefix
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = Some(prefix.to_string());
        self
    }

    /// Set the occurrence index
    pub fn with_index(mut self, index: u32) -> Self {
        self.index = Some(index);
        self
    }

    /// Parse label text of the form `prefix:name[index]`
    pub fn parse(text: &str) -> Result<Self, PathError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(PathError::InvalidLabel(text.to_string()));
        }
        let (body, index) = match text.find('[') {
            Some(open) => {
                let close = text
                    .strip_suffix(']')
                    .ok_or_else(|| PathError::InvalidLabel(text.to_string()))?;
                let index: u32 = close[open + 1..]
                    .parse()
                    .map_err(|_| PathError::InvalidLabel(text.to_string()))?;
                (&text[..open], Some(index))
            }
            None => (text, None),
        };
        let (prefix, name) = match body.split_once(':') {
            Some((p, n)) => (Some(p.to_string()), n),
            None => (None, body),
        };
        if name.is_empty() {
            return Err(PathError::InvalidLabel(text.to_string()));
        }
        Ok(Self {
            prefix,
            name: name.to_string(),
            index,
        })
    }

    /// Same element as `other`, ignoring the occurrence index
    pub fn matches(&self, other: &Self) -> bool {
        self.prefix == other.prefix && self.name == other.name
    }

    /// Whether this label marks the schema root of the rendered template
    pub fn is_schema_root(&self) -> bool {
        self.name.contains("schema")
    }
}

impl fmt::Display for PathLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(prefix) = &self.prefix {
            write!(f, "{}:", prefix)?;
        }
        write!(f, "{}", self.name)?;
        if let Some(index) = self.index {
            write!(f, "[{}]", index)?;
        }
        Ok(())
    }
}

/// Derive the path of `target` from below the schema root.
///
/// Walks the parent chain, collecting each labeled ancestor's label and
/// skipping unlabeled wrapper rows, until a schema root is met; the root's
/// own label is excluded. Exhausting the chain without meeting one is an
/// explicit error, never an unterminated walk.
pub fn xpath(tree: &FormTree, target: NodeId) -> Result<String, PathError> {
    let node = tree.get(target).ok_or(PathError::NodeNotFound)?;
    let own = match &node.data {
        NodeData::Element(e) => e.label.as_ref().ok_or(PathError::UnlabeledTarget)?,
        _ => return Err(PathError::UnlabeledTarget),
    };

    let mut segments = vec![own.to_string()];
    let mut current = node.parent;
    loop {
        if current.is_none() {
            return Err(PathError::MissingSchemaRoot);
        }
        let n = tree.get(current).ok_or(PathError::NodeNotFound)?;
        match &n.data {
            NodeData::SchemaRoot => break,
            NodeData::Element(e) => {
                if let Some(label) = &e.label {
                    if label.is_schema_root() {
                        break;
                    }
                    segments.push(label.to_string());
                }
                // Unlabeled wrappers contribute nothing
            }
            NodeData::ModuleMarker(_) => {}
        }
        current = n.parent;
    }

    segments.reverse();
    Ok(segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ElementData;

    #[test]
    fn test_label_display() {
        let label = PathLabel::new("element").with_prefix("ns").with_index(3);
        assert_eq!(label.to_string(), "ns:element[3]");
        assert_eq!(PathLabel::new("element").to_string(), "element");
    }

    #[test]
    fn test_label_parse_roundtrip() {
        let label = PathLabel::parse("ns:element[3]").unwrap();
        assert_eq!(label.prefix.as_deref(), Some("ns"));
        assert_eq!(label.name, "element");
        assert_eq!(label.index, Some(3));

        let plain = PathLabel::parse("item").unwrap();
        assert_eq!(plain.prefix, None);
        assert_eq!(plain.index, None);
    }

    #[test]
    fn test_label_parse_invalid() {
        assert!(PathLabel::parse("").is_err());
        assert!(PathLabel::parse("ns:").is_err());
        assert!(PathLabel::parse("item[x]").is_err());
        assert!(PathLabel::parse("item[3").is_err());
    }

    #[test]
    fn test_label_matches_ignores_index() {
        let a = PathLabel::parse("ns:item[1]").unwrap();
        let b = PathLabel::parse("ns:item[5]").unwrap();
        let c = PathLabel::parse("other:item[1]").unwrap();
        assert!(a.matches(&b));
        assert!(!a.matches(&c));
    }

    #[test]
    fn test_xpath_excludes_schema_root() {
        // Labels `schema`, `ns:a[1]`, `ns:b[2]` at increasing depth
        // yield "ns:a[1]/ns:b[2]".
        let mut tree = FormTree::new();
        let schema = tree
            .add_element(
                NodeId::ROOT,
                ElementData::labeled(PathLabel::new("schema").with_prefix("xs")),
            )
            .unwrap();
        let a = tree
            .add_element(
                schema,
                ElementData::labeled(PathLabel::parse("ns:a[1]").unwrap()),
            )
            .unwrap();
        let b = tree
            .add_element(a, ElementData::labeled(PathLabel::parse("ns:b[2]").unwrap()))
            .unwrap();

        assert_eq!(xpath(&tree, b).unwrap(), "ns:a[1]/ns:b[2]");
        assert_eq!(xpath(&tree, a).unwrap(), "ns:a[1]");
    }

    #[test]
    fn test_xpath_skips_unlabeled_wrappers() {
        let mut tree = FormTree::new();
        let a = tree
            .add_element(
                NodeId::ROOT,
                ElementData::labeled(PathLabel::parse("ns:a[1]").unwrap()),
            )
            .unwrap();
        let wrapper = tree.add_element(a, ElementData::wrapper()).unwrap();
        let inner = tree.add_element(wrapper, ElementData::wrapper()).unwrap();
        let b = tree
            .add_element(
                inner,
                ElementData::labeled(PathLabel::parse("ns:b[1]").unwrap()),
            )
            .unwrap();

        assert_eq!(xpath(&tree, b).unwrap(), "ns:a[1]/ns:b[1]");
    }

    #[test]
    fn test_xpath_missing_schema_root() {
        let mut tree = FormTree::new();
        let orphan = tree.alloc(crate::Node::element(ElementData::labeled(
            PathLabel::new("stray"),
        )));
        assert_eq!(xpath(&tree, orphan), Err(PathError::MissingSchemaRoot));
    }

    #[test]
    fn test_xpath_unlabeled_target() {
        let mut tree = FormTree::new();
        let wrapper = tree.add_element(NodeId::ROOT, ElementData::wrapper()).unwrap();
        assert_eq!(xpath(&tree, wrapper), Err(PathError::UnlabeledTarget));
    }
}
