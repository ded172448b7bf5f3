//! Canonical node JSON: `{"T":<kind>,"V":<value>,"N":[<children>]}` with
//! `V` omitted when empty and `N` omitted when there are no children.
//!
//! The writer is iterative so arbitrarily deep trees do not grow the call
//! stack. HTML-significant characters (`<`, `>`, `&`) are written as-is.

use alloc::vec;
use core::fmt::{self, Write};

use super::{NodeId, NodeRef};

enum Step {
    Open(NodeId),
    Close,
}

impl fmt::Display for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nodes = &self.tree.nodes;
        let mut stack = vec![Step::Open(self.id)];
        while let Some(step) = stack.pop() {
            let id = match step {
                Step::Close => {
                    f.write_str("]}")?;
                    continue;
                }
                Step::Open(id) => id,
            };
            let node = &nodes[id.0];
            if id != self.id && node.left.is_some() {
                f.write_char(',')?;
            }
            write!(f, "{{\"T\":{}", node.kind)?;
            if !node.value.is_empty() {
                f.write_str(",\"V\":")?;
                write_escaped_string(&node.value, f)?;
            }
            if node.last.is_none() {
                f.write_char('}')?;
                continue;
            }
            f.write_str(",\"N\":[")?;
            stack.push(Step::Close);
            let mut child = node.last;
            while let Some(c) = child {
                stack.push(Step::Open(c));
                child = nodes[c.0].left;
            }
        }
        Ok(())
    }
}

/// Writes `src` as a quoted JSON string literal.
///
/// Quotes, backslashes and C0 controls are escaped, using the short forms
/// where JSON has them. U+2028 and U+2029 are escaped for consumers that
/// treat them as line breaks.
fn write_escaped_string<W: Write>(src: &str, f: &mut W) -> fmt::Result {
    f.write_char('"')?;
    let mut plain = 0;
    for (i, c) in src.char_indices() {
        let short = match c {
            '"' => "\\\"",
            '\\' => "\\\\",
            '\u{8}' => "\\b",
            '\u{c}' => "\\f",
            '\n' => "\\n",
            '\r' => "\\r",
            '\t' => "\\t",
            c if c < ' ' || c == '\u{2028}' || c == '\u{2029}' => "",
            _ => continue,
        };
        f.write_str(&src[plain..i])?;
        if short.is_empty() {
            write!(f, "\\u{:04x}", u32::from(c))?;
        } else {
            f.write_str(short)?;
        }
        plain = i + c.len_utf8();
    }
    f.write_str(&src[plain..])?;
    f.write_char('"')
}

#[cfg(any(test, feature = "serde"))]
mod serde_impl {
    use alloc::{
        string::{String, ToString},
        vec::Vec,
    };

    use serde::{
        Deserialize, Serialize, Serializer,
        ser::SerializeStruct,
    };

    use crate::{NodeError, NodeId, NodeRef, Tree};

    impl Serialize for NodeRef<'_> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let has_value = !self.value().is_empty();
            let has_nodes = self.count() > 0;
            let len = 1 + usize::from(has_value) + usize::from(has_nodes);
            let mut node = serializer.serialize_struct("Node", len)?;
            node.serialize_field("T", &self.kind())?;
            if has_value {
                node.serialize_field("V", self.value())?;
            }
            if has_nodes {
                node.serialize_field("N", &ChildList(*self))?;
            }
            node.end()
        }
    }

    struct ChildList<'a>(NodeRef<'a>);

    impl Serialize for ChildList<'_> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.collect_seq(self.0.children())
        }
    }

    #[derive(Deserialize)]
    #[serde(deny_unknown_fields)]
    struct RawNode {
        #[serde(rename = "T")]
        kind: i32,
        #[serde(rename = "V", default)]
        value: Option<String>,
        #[serde(rename = "N", default)]
        nodes: Option<Vec<RawNode>>,
    }

    impl RawNode {
        fn into_parts(self) -> Result<(i32, String, Vec<RawNode>), NodeError> {
            match (self.value, self.nodes) {
                (Some(_), Some(_)) => Err(NodeError::ValueAndNodes),
                (value, nodes) => Ok((
                    self.kind,
                    value.unwrap_or_default(),
                    nodes.unwrap_or_default(),
                )),
            }
        }
    }

    impl Tree {
        /// Decodes node JSON (compact or pretty) into new nodes of this tree
        /// and returns the new, standalone root.
        ///
        /// # Errors
        ///
        /// - [`NodeError::Json`] for malformed JSON, a missing `T`, or any
        ///   key other than `T`, `V` and `N`.
        /// - [`NodeError::ValueAndNodes`] if an object carries both `V` and
        ///   `N`. Nothing is added to the tree in that case.
        pub fn insert_json(&mut self, json: &str) -> Result<NodeId, NodeError> {
            let raw: RawNode =
                serde_json::from_str(json).map_err(|e| NodeError::Json(e.to_string()))?;
            let checkpoint = self.checkpoint();
            self.insert_raw(raw).inspect_err(|_| self.rollback(checkpoint))
        }

        fn insert_raw(&mut self, raw: RawNode) -> Result<NodeId, NodeError> {
            let (kind, value, nodes) = raw.into_parts()?;
            let root = self.new_node(kind, value);
            let mut pending: Vec<(RawNode, NodeId)> =
                nodes.into_iter().rev().map(|n| (n, root)).collect();
            while let Some((raw, parent)) = pending.pop() {
                let (kind, value, nodes) = raw.into_parts()?;
                let id = self.new_node(kind, value);
                self.link_last(parent, id);
                pending.extend(nodes.into_iter().rev().map(|n| (n, id)));
            }
            Ok(root)
        }
    }
}
