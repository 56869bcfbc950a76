use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::RuleError;

/// Boolean connective of a stored condition node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    And,
    Or,
    Not,
}

impl Condition {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Condition::And => "AND",
            Condition::Or => "OR",
            Condition::Not => "NOT",
        }
    }

    fn from_key(key: &str) -> Result<Self, RuleError> {
        match key {
            "AND" => Ok(Condition::And),
            "OR" => Ok(Condition::Or),
            "NOT" => Ok(Condition::Not),
            other => Err(RuleError::UnknownCondition {
                condition: other.to_owned(),
            }),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage-shaped permission rule: a binary tree of `AND`/`OR`/`NOT` nodes over
/// raw leaf strings (`r<role>`, `c<channel>`, `t<literal>`).
///
/// Deserializes from the persisted JSON shape, where a node is either a leaf
/// string or `{"condition": .., "left": .., "right": ..}`. `NOT` only reads
/// `right`. The empty object `{}` is [`ConditionTree::Empty`] and means
/// "no restriction"; it is only accepted at the root.
///
/// `Display` writes the text form accepted by [`parse`](crate::parse::parse).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawNode", into = "RawNode")]
pub enum ConditionTree {
    #[default]
    Empty,
    Leaf(String),
    And(Box<ConditionTree>, Box<ConditionTree>),
    Or(Box<ConditionTree>, Box<ConditionTree>),
    Not(Box<ConditionTree>),
}

impl ConditionTree {
    #[must_use]
    pub fn leaf(raw: impl Into<String>) -> Self {
        ConditionTree::Leaf(raw.into())
    }

    #[must_use]
    pub fn and(self, other: ConditionTree) -> Self {
        ConditionTree::And(Box::new(self), Box::new(other))
    }

    #[must_use]
    pub fn or(self, other: ConditionTree) -> Self {
        ConditionTree::Or(Box::new(self), Box::new(other))
    }

    #[must_use]
    pub fn negate(self) -> Self {
        ConditionTree::Not(Box::new(self))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, ConditionTree::Empty)
    }

    /// Parse and validate the persisted JSON shape.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError`] when the value is not a well-formed condition tree.
    pub fn from_json(value: serde_json::Value) -> Result<Self, RuleError> {
        let raw: RawNode = serde_json::from_value(value)?;
        ConditionTree::try_from(raw)
    }

    fn from_raw(raw: RawNode) -> Result<Self, RuleError> {
        let record = match raw {
            RawNode::Leaf(leaf) if leaf.is_empty() => return Err(RuleError::EmptyLeaf),
            RawNode::Leaf(leaf) => return Ok(ConditionTree::Leaf(leaf)),
            RawNode::Record(record) => record,
            RawNode::Invalid(value) => {
                return Err(RuleError::MalformedNode {
                    found: json_kind(&value),
                });
            }
        };
        let Some(key) = record.condition else {
            if record.left.is_none() && record.right.is_none() {
                return Ok(ConditionTree::Empty);
            }
            return Err(RuleError::MissingCondition);
        };
        let condition = Condition::from_key(&key)?;
        let right = record.right.ok_or(RuleError::MissingKey {
            key: "right",
            condition: condition.as_str(),
        })?;
        let right = Self::operand(*right, condition)?;
        if condition == Condition::Not {
            return Ok(ConditionTree::Not(Box::new(right)));
        }
        let left = record.left.ok_or(RuleError::MissingKey {
            key: "left",
            condition: condition.as_str(),
        })?;
        let left = Self::operand(*left, condition)?;
        Ok(match condition {
            Condition::And => ConditionTree::And(Box::new(left), Box::new(right)),
            _ => ConditionTree::Or(Box::new(left), Box::new(right)),
        })
    }

    fn operand(raw: RawNode, condition: Condition) -> Result<Self, RuleError> {
        match Self::from_raw(raw)? {
            ConditionTree::Empty => Err(RuleError::EmptyOperand {
                condition: condition.as_str(),
            }),
            tree => Ok(tree),
        }
    }
}

fn write_leaf(f: &mut fmt::Formatter<'_>, raw: &str) -> fmt::Result {
    let mut chars = raw.chars();
    if let Some(discriminator) = chars.next() {
        write!(f, "{discriminator}")?;
    }
    f.write_str("\"")?;
    for c in chars {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\t' => f.write_str("\\t")?,
            c => write!(f, "{c}")?,
        }
    }
    f.write_str("\"")
}

impl fmt::Display for ConditionTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConditionTree::Empty => Ok(()),
            ConditionTree::Leaf(raw) => write_leaf(f, raw),
            ConditionTree::And(a, b) => write!(f, "({a} AND {b})"),
            ConditionTree::Or(a, b) => write!(f, "({a} OR {b})"),
            ConditionTree::Not(inner) => write!(f, "(NOT {inner})"),
        }
    }
}

// -- Persisted shape --------------------------------------------------------

/// A node as stored, before validation. Anything that is neither a leaf
/// string nor a record lands in `Invalid`, so one bad node never fails the
/// surrounding document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawNode {
    Leaf(String),
    Record(RawRecord),
    Invalid(serde_json::Value),
}

impl RawNode {
    /// `true` for the empty record `{}`.
    pub(crate) fn is_empty(&self) -> bool {
        matches!(
            self,
            RawNode::Record(RawRecord {
                condition: None,
                left: None,
                right: None,
            })
        )
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object with mistyped fields",
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    left: Option<Box<RawNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    right: Option<Box<RawNode>>,
}

impl TryFrom<RawNode> for ConditionTree {
    type Error = RuleError;

    fn try_from(raw: RawNode) -> Result<Self, Self::Error> {
        ConditionTree::from_raw(raw)
    }
}

impl From<ConditionTree> for RawNode {
    fn from(tree: ConditionTree) -> Self {
        let record = |condition: Condition, left: Option<ConditionTree>, right: ConditionTree| {
            RawNode::Record(RawRecord {
                condition: Some(condition.as_str().to_owned()),
                left: left.map(|l| Box::new(RawNode::from(l))),
                right: Some(Box::new(RawNode::from(right))),
            })
        };
        match tree {
            ConditionTree::Empty => RawNode::Record(RawRecord::default()),
            ConditionTree::Leaf(raw) => RawNode::Leaf(raw),
            ConditionTree::And(a, b) => record(Condition::And, Some(*a), *b),
            ConditionTree::Or(a, b) => record(Condition::Or, Some(*a), *b),
            ConditionTree::Not(inner) => record(Condition::Not, None, *inner),
        }
    }
}
