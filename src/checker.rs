use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, trace, warn};

use crate::cache::{GuildChecks, PermissionCache, Slot};
use crate::compile::compile;
use crate::config::{CheckerConfig, CompileFailurePolicy};
use crate::error::{CompileError, PermissionError, StoreError};
use crate::evaluate::LeafPredicate;
use crate::resolve::{EntityResolver, collect_leaves, resolve_leaves};
use crate::{Decision, GuildId, Invocation, PermissionRules, Scope};

/// Source of each guild's stored permission document.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn permissions(&self, guild: GuildId) -> Result<PermissionRules, StoreError>;
}

/// Decides which stored rules apply to an invocation and hands back a
/// compiled [`Decision`], compiling and caching per-scope checks on demand.
///
/// ```no_run
/// # use std::sync::Arc;
/// # use permgate::{EntityResolver, Invocation, PermissionChecker, SettingsStore};
/// # async fn gate(
/// #     store: Arc<dyn SettingsStore>,
/// #     resolver: Arc<dyn EntityResolver>,
/// #     invocation: Invocation,
/// # ) {
/// let checker = PermissionChecker::new(store, resolver);
/// if !checker.is_permitted(&invocation, "").await {
///     return;
/// }
/// # }
/// ```
pub struct PermissionChecker {
    cache: Arc<PermissionCache>,
    store: Arc<dyn SettingsStore>,
    resolver: Arc<dyn EntityResolver>,
    predicate: Arc<dyn LeafPredicate>,
    policy: CompileFailurePolicy,
}

impl PermissionChecker {
    /// A checker with [`CheckerConfig::default`] and a fresh cache.
    #[must_use]
    pub fn new(store: Arc<dyn SettingsStore>, resolver: Arc<dyn EntityResolver>) -> Self {
        Self::with_config(store, resolver, &CheckerConfig::default())
    }

    #[must_use]
    pub fn with_config(
        store: Arc<dyn SettingsStore>,
        resolver: Arc<dyn EntityResolver>,
        config: &CheckerConfig,
    ) -> Self {
        Self {
            cache: Arc::new(PermissionCache::new()),
            store,
            resolver,
            predicate: Arc::new(config.predicate()),
            policy: config.compile_failure_policy,
        }
    }

    /// Share an existing cache instead of the checker's own.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<PermissionCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Replace the leaf semantics used by returned decisions.
    #[must_use]
    pub fn with_predicate(mut self, predicate: Arc<dyn LeafPredicate>) -> Self {
        self.predicate = predicate;
        self
    }

    #[must_use]
    pub fn with_policy(mut self, policy: CompileFailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn cache(&self) -> &Arc<PermissionCache> {
        &self.cache
    }

    #[must_use]
    pub fn policy(&self) -> CompileFailurePolicy {
        self.policy
    }

    /// The check that gates `invocation`, or `None` when nothing restricts it.
    ///
    /// With an empty `event_type` the `all`, cog and command scopes apply and
    /// their checks are joined with AND. Otherwise only the scope of that event
    /// applies. Cache misses are filled from a single read of the settings store.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::Store`] if the settings store fails, and
    /// [`PermissionError::InvalidRule`] if a scope's rule does not compile while
    /// the policy is [`CompileFailurePolicy::Deny`].
    pub async fn get_permissions_check(
        &self,
        invocation: &Invocation,
        event_type: &str,
    ) -> Result<Option<Decision>, PermissionError> {
        let guild = invocation.guild();
        let entry = self.cache.guild(guild);

        let mut slots: Vec<(Scope, Option<Slot>)> = Scope::applicable(invocation, event_type)
            .into_iter()
            .map(|scope| {
                let cached = entry.lookup(&scope);
                trace!(%guild, %scope, hit = cached.is_some(), "permission cache lookup");
                (scope, cached)
            })
            .collect();

        let mut failure = None;
        if slots.iter().any(|(_, cached)| cached.is_none()) {
            debug!(%guild, "fetching permission settings");
            let rules = self.store.permissions(guild).await?;
            for (scope, cached) in slots.iter_mut().filter(|(_, cached)| cached.is_none()) {
                match self.fill(&entry, guild, scope, &rules).await {
                    Ok(slot) => *cached = Some(slot),
                    Err(source) => {
                        warn!(%guild, %scope, error = %source, policy = ?self.policy, "permission rule failed to compile");
                        if self.policy == CompileFailurePolicy::Deny && failure.is_none() {
                            failure = Some(PermissionError::InvalidRule {
                                scope: scope.clone(),
                                source,
                            });
                        }
                    }
                }
            }
        }
        if let Some(err) = failure {
            return Err(err);
        }

        let checks = slots.into_iter().filter_map(|(_, slot)| slot.flatten()).collect();
        Ok(Decision::combine(checks, Arc::clone(&self.predicate)))
    }

    /// Validate and compile the rule of one scope and cache the result.
    /// Failures are not cached.
    async fn fill(
        &self,
        entry: &GuildChecks,
        guild: GuildId,
        scope: &Scope,
        rules: &PermissionRules,
    ) -> Result<Slot, CompileError> {
        let slot = match rules.rule_for(scope)? {
            None => None,
            Some(tree) => {
                let leaves = collect_leaves(&tree)?;
                let resolved = resolve_leaves(guild, leaves, self.resolver.as_ref()).await?;
                compile(&tree, &resolved)?.map(Arc::new)
            }
        };
        debug!(%guild, %scope, present = slot.is_some(), "compiled permission check");
        entry.store(scope.clone(), slot.clone());
        Ok(slot)
    }

    /// Gate an invocation: `true` if it may proceed.
    ///
    /// No applicable rule permits. Any error denies.
    pub async fn is_permitted(&self, invocation: &Invocation, event_type: &str) -> bool {
        match self.get_permissions_check(invocation, event_type).await {
            Ok(None) => true,
            Ok(Some(decision)) => decision.evaluate(invocation),
            Err(err) => {
                warn!(
                    guild = %invocation.guild(),
                    command = invocation.qualified_name(),
                    event_type,
                    error = %err,
                    "denying invocation after permission check failure"
                );
                false
            }
        }
    }

    /// Forget the compiled checks of `guild` after its settings changed.
    pub fn settings_changed(&self, guild: GuildId) {
        self.cache.invalidate(guild);
    }

    /// Forget every compiled check after settings were reloaded.
    pub fn settings_reloaded(&self) {
        self.cache.clear();
    }
}
