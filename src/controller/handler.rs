//! Event handling seam between the watch loop and per-kind behavior.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::codec::decode_spec;
use crate::codec::encode_spec;
use crate::errors::HandlerError;
use crate::resources::ResourceSpec;
use crate::store::resource_key;
use crate::store::KvStore;
use crate::Result;

/// Typed event dispatch for one resource kind.
///
/// The watch loop decodes values into `Spec` and calls [`apply`] for puts
/// and [`cleanup`] for deletes; the reconcile loop calls [`reconcile`] on
/// its own cadence. All three must be idempotent, the same event can be
/// observed more than once.
///
/// [`apply`]: EventHandler::apply
/// [`cleanup`]: EventHandler::cleanup
/// [`reconcile`]: EventHandler::reconcile
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Decoded spec type for this kind.
    type Spec: DeserializeOwned + Send + 'static;

    /// Kind label for logs and error context.
    fn kind(&self) -> &'static str;

    /// Reacts to a created or updated resource.
    ///
    /// # Errors
    /// An error skips this event only; the watch loop logs it and moves
    /// on to the next event.
    async fn apply(
        &self,
        spec: Self::Spec,
    ) -> Result<()>;

    /// Reacts to a deleted resource, identified by name only. Deleted
    /// keys carry no value, so no spec is available here.
    ///
    /// # Errors
    /// An error skips this event only.
    async fn cleanup(
        &self,
        name: &str,
    ) -> Result<()>;

    /// Periodic convergence pass. Leaf kinds keep the no-op default.
    ///
    /// # Errors
    /// An error skips this pass; the reconcile loop logs it and waits for
    /// the next tick.
    async fn reconcile(&self) -> Result<()> {
        Ok(())
    }
}

/// Deterministic parent-to-children ownership policy for one kind pair.
///
/// [`children`] and [`child_names`] must agree on the names produced for
/// the same parent: the cascade-delete path re-derives the child key set
/// from the parent name alone and never consults stored child data.
///
/// [`children`]: Derivation::children
/// [`child_names`]: Derivation::child_names
pub trait Derivation: Send + Sync {
    type Parent: ResourceSpec + DeserializeOwned + Send + Sync + 'static;
    type Child: Serialize + Send + Sync;

    /// Kind label of the derived resources.
    fn child_kind(&self) -> &'static str;

    /// Key prefix owned by the derived kind's controller.
    fn child_prefix(&self) -> &'static str;

    /// Ordered `(name, spec)` pairs derived from a parent spec.
    fn children(
        &self,
        parent: &Self::Parent,
    ) -> Vec<(String, Self::Child)>;

    /// Child names derivable from the parent identity alone.
    fn child_names(
        &self,
        parent_name: &str,
    ) -> Vec<String>;
}

/// Handler for kinds that own derived children.
///
/// Fans a parent upsert out into one child write per derived name,
/// cascades a parent delete into child deletes, and converges drift on
/// reconcile. Every child operation is attempted even when an earlier one
/// fails; failures are reported as one aggregate error afterwards.
///
/// Child writes are independent store operations, not a transaction. A
/// reader can observe a partially fanned-out state; the reconcile pass
/// repairs whatever a failed fan-out left behind.
pub struct FanOutHandler<S, D>
where
    S: KvStore,
    D: Derivation,
{
    kind: &'static str,
    parent_prefix: String,
    store: Arc<S>,
    derivation: D,
}

impl<S, D> FanOutHandler<S, D>
where
    S: KvStore,
    D: Derivation,
{
    pub fn new(
        kind: &'static str,
        parent_prefix: impl Into<String>,
        store: Arc<S>,
        derivation: D,
    ) -> Self {
        Self {
            kind,
            parent_prefix: parent_prefix.into(),
            store,
            derivation,
        }
    }

    /// Desired child keys and values derived from every live parent.
    ///
    /// Undecodable parents and unencodable children are skipped with a
    /// warning; one bad entry must not stall convergence of the rest.
    async fn desired_children(&self) -> Result<BTreeMap<Bytes, Bytes>> {
        let parents = self
            .store
            .list_prefix(Bytes::from(self.parent_prefix.clone()))
            .await?;

        let mut desired = BTreeMap::new();
        for kv in &parents {
            let parent: D::Parent = match decode_spec(self.kind, &kv.value) {
                Ok(parent) => parent,
                Err(e) => {
                    warn!(
                        kind = self.kind,
                        key = ?kv.key,
                        error = %e,
                        "skipping undecodable parent during reconcile"
                    );
                    continue;
                }
            };
            for (name, child) in self.derivation.children(&parent) {
                match encode_spec(self.derivation.child_kind(), &child) {
                    Ok(value) => {
                        desired.insert(resource_key(self.derivation.child_prefix(), &name), value);
                    }
                    Err(e) => {
                        warn!(
                            kind = self.kind,
                            child = %name,
                            error = %e,
                            "skipping unencodable child during reconcile"
                        );
                    }
                }
            }
        }
        Ok(desired)
    }
}

#[async_trait]
impl<S, D> EventHandler for FanOutHandler<S, D>
where
    S: KvStore,
    D: Derivation,
{
    type Spec = D::Parent;

    fn kind(&self) -> &'static str {
        self.kind
    }

    async fn apply(
        &self,
        parent: D::Parent,
    ) -> Result<()> {
        let children = self.derivation.children(&parent);
        let total = children.len();
        let mut failed = 0;

        for (name, child) in children {
            let key = resource_key(self.derivation.child_prefix(), &name);
            let value = match encode_spec(self.derivation.child_kind(), &child) {
                Ok(value) => value,
                Err(e) => {
                    warn!(kind = self.kind, child = %name, error = %e, "child encode failed");
                    failed += 1;
                    continue;
                }
            };
            if let Err(e) = self.store.put(key, value).await {
                warn!(kind = self.kind, child = %name, error = %e, "child write failed");
                failed += 1;
            }
        }

        if failed > 0 {
            return Err(HandlerError::FanOutIncomplete {
                parent: parent.name().to_string(),
                failed,
                total,
            }
            .into());
        }
        debug!(kind = self.kind, parent = %parent.name(), children = total, "children upserted");
        Ok(())
    }

    async fn cleanup(
        &self,
        name: &str,
    ) -> Result<()> {
        let names = self.derivation.child_names(name);
        let total = names.len();
        let mut failed = 0;

        for child in &names {
            let key = resource_key(self.derivation.child_prefix(), child);
            if let Err(e) = self.store.delete(key).await {
                warn!(kind = self.kind, child = %child, error = %e, "child delete failed");
                failed += 1;
            }
        }

        if failed > 0 {
            return Err(HandlerError::CascadeIncomplete {
                parent: name.to_string(),
                failed,
                total,
            }
            .into());
        }
        debug!(kind = self.kind, parent = %name, children = total, "children deleted");
        Ok(())
    }

    /// Observe-diff-act pass: rewrite children that are missing or stale
    /// and delete children no parent derives anymore. Converged state
    /// issues no writes at all.
    async fn reconcile(&self) -> Result<()> {
        let desired = self.desired_children().await?;

        let observed = self
            .store
            .list_prefix(Bytes::copy_from_slice(
                self.derivation.child_prefix().as_bytes(),
            ))
            .await?;
        let observed: BTreeMap<Bytes, Bytes> = observed
            .into_iter()
            .map(|kv| (kv.key, kv.value))
            .collect();

        let mut corrected = 0usize;
        for (key, value) in &desired {
            if observed.get(key) != Some(value) {
                match self.store.put(key.clone(), value.clone()).await {
                    Ok(()) => corrected += 1,
                    Err(e) => {
                        warn!(kind = self.kind, key = ?key, error = %e, "reconcile write failed")
                    }
                }
            }
        }
        for key in observed.keys() {
            if !desired.contains_key(key) {
                match self.store.delete(key.clone()).await {
                    Ok(()) => corrected += 1,
                    Err(e) => {
                        warn!(kind = self.kind, key = ?key, error = %e, "reconcile delete failed")
                    }
                }
            }
        }

        if corrected > 0 {
            info!(kind = self.kind, corrected, "reconcile corrected drift");
        }
        Ok(())
    }
}
