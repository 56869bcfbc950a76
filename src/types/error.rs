use thiserror::Error;

/// A leaf could not be turned into a concrete role, channel or literal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("empty leaf; expected a discriminator such as 'r', 'c' or 't'")]
    EmptyLeaf,

    #[error("unknown leaf discriminator '{discriminator}' in '{leaf}'")]
    UnknownDiscriminator { leaf: String, discriminator: char },

    #[error("role '{name}' does not exist in this guild")]
    UnknownRole { name: String },

    #[error("channel '{name}' does not exist in this guild")]
    UnknownChannel { name: String },

    #[error("leaf '{leaf}' was not resolved before linearization")]
    Unresolved { leaf: String },
}

/// A stored condition tree does not have the expected shape.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("missing key '{key}' in {condition} node")]
    MissingKey {
        key: &'static str,
        condition: &'static str,
    },

    #[error("missing key 'condition' in node with operands")]
    MissingCondition,

    #[error("unknown condition '{condition}'; expected AND, OR or NOT")]
    UnknownCondition { condition: String },

    #[error("empty operand in {condition} node")]
    EmptyOperand { condition: &'static str },

    #[error("empty leaf string")]
    EmptyLeaf,

    #[error("expected a leaf string or condition record, found {found}")]
    MalformedNode { found: &'static str },

    #[error("invalid rule for {scope}: {source}")]
    InScope {
        scope: String,
        #[source]
        source: Box<RuleError>,
    },

    #[error("malformed permission document: {0}")]
    Json(#[from] serde_json::Error),
}
