mod cache;
mod checker;
mod compile;
mod config;
mod error;
mod evaluate;
mod linearize;
pub mod parse;
mod resolve;
mod types;

pub use cache::{GuildChecks, PermissionCache, Slot};
pub use checker::{PermissionChecker, SettingsStore};
pub use compile::{compile, compile_tokens};
pub use config::{CheckerConfig, CompileFailurePolicy, ConfigError, DEFAULT_COMPILE_FAILURE_POLICY};
pub use error::{CompileError, PermissionError, StoreError};
pub use evaluate::{DefaultPredicate, LeafPredicate};
pub use linearize::linearize;
pub use parse::{MAX_NESTING, ParseError, parse};
pub use resolve::{EntityResolver, ResolvedLeaves, collect_leaves, resolve_leaves};
pub use types::{
    ChannelId, Condition, ConditionTree, Decision, GuildId, Invocation, InvocationKind, LeafRef,
    Operator, PermissionRules, ResolutionError, ResolvedLeaf, RoleId, RuleError, Scope, Token,
};
