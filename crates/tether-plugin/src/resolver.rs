// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability resolution: pick exactly one provider of a capability type,
//! load it on demand, and hand back its guarded accessor.

use std::collections::HashSet;
use std::sync::Arc;

use tether_core::{BoxError, CapabilityType, PluginId, ResolutionError};
use tracing::{debug, warn};

use crate::lifecycle::LifecycleController;
use crate::proxy::GuardedModule;
use crate::record::PluginRecord;
use crate::registry::PluginRegistry;

/// Outcome of a selector over the candidate providers.
#[derive(Debug, Clone)]
pub enum Selection {
    /// A single chosen provider.
    One(Arc<PluginRecord>),
    /// A narrowed candidate set.
    Many(Vec<Arc<PluginRecord>>),
    /// No acceptable provider.
    None,
}

impl Selection {
    fn into_records(self) -> Vec<Arc<PluginRecord>> {
        match self {
            Selection::One(record) => vec![record],
            Selection::Many(records) => records,
            Selection::None => Vec::new(),
        }
    }
}

impl From<Option<Arc<PluginRecord>>> for Selection {
    fn from(record: Option<Arc<PluginRecord>>) -> Self {
        record.map_or(Selection::None, Selection::One)
    }
}

impl From<Vec<Arc<PluginRecord>>> for Selection {
    fn from(records: Vec<Arc<PluginRecord>>) -> Self {
        Selection::Many(records)
    }
}

/// Narrows the providers of a capability type.
///
/// Implemented for closures taking the candidate slice, so ad-hoc rules can
/// be passed inline. Returned records that are not among the candidates are
/// discarded by the resolver.
pub trait Selector: Send + Sync {
    fn select(&self, candidates: &[Arc<PluginRecord>]) -> Result<Selection, BoxError>;
}

impl<F> Selector for F
where
    F: Fn(&[Arc<PluginRecord>]) -> Result<Selection, BoxError> + Send + Sync,
{
    fn select(&self, candidates: &[Arc<PluginRecord>]) -> Result<Selection, BoxError> {
        self(candidates)
    }
}

/// Selects the candidate with the given id.
pub fn by_id(id: PluginId) -> impl Selector {
    move |candidates: &[Arc<PluginRecord>]| -> Result<Selection, BoxError> {
        Ok(candidates.iter().find(|r| r.id() == id).cloned().into())
    }
}

/// Selects the candidates with the given manifest name.
pub fn by_name(name: impl Into<String>) -> impl Selector {
    let name = name.into();
    move |candidates: &[Arc<PluginRecord>]| -> Result<Selection, BoxError> {
        Ok(Selection::Many(
            candidates.iter().filter(|r| r.name() == name).cloned().collect(),
        ))
    }
}

/// Selects the first candidate (in name order) whose manifest lists
/// `instruct` among its instruction kinds.
pub fn supporting(instruct: impl Into<String>) -> impl Selector {
    let instruct = instruct.into();
    move |candidates: &[Arc<PluginRecord>]| -> Result<Selection, BoxError> {
        Ok(candidates.iter().find(|r| r.supports(&instruct)).cloned().into())
    }
}

/// Resolves capability requests against the registry.
#[derive(Debug)]
pub struct CapabilityResolver {
    registry: Arc<PluginRegistry>,
    controller: Arc<LifecycleController>,
}

impl CapabilityResolver {
    pub fn new(registry: Arc<PluginRegistry>, controller: Arc<LifecycleController>) -> Self {
        Self {
            registry,
            controller,
        }
    }

    /// Resolves `capability` to exactly one provider.
    ///
    /// Without a selector every provider is a candidate, so a type with more
    /// than one provider is [`ResolutionError::AmbiguousProviders`].
    pub async fn resolve(
        &self,
        capability: &CapabilityType,
        selector: Option<&dyn Selector>,
    ) -> Result<GuardedModule, ResolutionError> {
        let candidates = self.registry.get_by_type(capability).await.ok_or_else(|| {
            ResolutionError::NoProvidersForType {
                capability: capability.clone(),
            }
        })?;
        let offered: HashSet<PluginId> = candidates.iter().map(|r| r.id()).collect();

        let selection = match selector {
            Some(selector) => {
                selector
                    .select(&candidates)
                    .map_err(|source| ResolutionError::SelectorFailed {
                        capability: capability.clone(),
                        source,
                    })?
            }
            None => Selection::Many(candidates),
        };

        let mut chosen: Vec<_> = selection
            .into_records()
            .into_iter()
            .filter(|record| {
                let kept = offered.contains(&record.id());
                if !kept {
                    warn!(
                        capability = %capability,
                        plugin = %record.name(),
                        "selector returned a record outside the candidates, ignoring it"
                    );
                }
                kept
            })
            .collect();
        let record = match chosen.len() {
            0 => {
                return Err(ResolutionError::NoMatchingProvider {
                    capability: capability.clone(),
                });
            }
            1 => chosen.remove(0),
            _ => {
                return Err(ResolutionError::AmbiguousProviders {
                    capability: capability.clone(),
                    candidates: chosen
                        .iter()
                        .map(|r| format!("{} ({})", r.name(), r.id()))
                        .collect(),
                });
            }
        };

        debug!(capability = %capability, plugin = %record.name(), "provider selected");
        Ok(self.controller.ensure_loaded(&record).await?)
    }
}
