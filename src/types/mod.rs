mod condition;
mod decision;
mod error;
mod ids;
mod invocation;
mod leaf;
mod operator;
mod rules;
mod token;

pub use condition::{Condition, ConditionTree};
pub use decision::Decision;
pub use error::{ResolutionError, RuleError};
pub use ids::{ChannelId, GuildId, RoleId};
pub use invocation::{Invocation, InvocationKind};
pub use leaf::{LeafRef, ResolvedLeaf};
pub use operator::Operator;
pub use rules::{PermissionRules, Scope};
pub use token::Token;
