//! Process-wide model type registry
//!
//! A single write-once-per-name, read-many mapping from type name to model
//! definition, populated at definition time and consulted during hydration.
//! There is deliberately no removal and no reset: the registry lives for the
//! process lifetime, so tests must use uniquely-named types per case.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use once_cell::sync::Lazy;

use crate::definition::{Definition, ModelDef};
use crate::error::{OdmError, OdmResult};

static MODELS: Lazy<DashMap<String, Arc<ModelDef>>> = Lazy::new(DashMap::new);

/// Register a new model type under `name`.
///
/// Fails with [`OdmError::AlreadyDefined`] when the name is taken, regardless
/// of how the second definition differs. Concurrent definition of the same
/// name deterministically fails for the loser: the entry is claimed before
/// the definition is published.
pub fn define(name: impl Into<String>, definition: Definition) -> OdmResult<Arc<ModelDef>> {
    let name = name.into();
    match MODELS.entry(name.clone()) {
        Entry::Occupied(_) => Err(OdmError::AlreadyDefined { name }),
        Entry::Vacant(slot) => {
            let def = Arc::new(ModelDef::new(name, definition));
            slot.insert(Arc::clone(&def));
            tracing::debug!("defined model type \"{}\"", def.name());
            Ok(def)
        }
    }
}

/// Look up a registered model definition by type name
pub fn lookup(name: &str) -> Option<Arc<ModelDef>> {
    MODELS.get(name).map(|entry| Arc::clone(entry.value()))
}

/// True when a model type is registered under `name`
pub fn is_defined(name: &str) -> bool {
    MODELS.contains_key(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn define_registers_and_returns_the_definition() {
        let def = define("RegistryMonster", Definition::new()).unwrap();
        assert_eq!(def.name(), "RegistryMonster");
        assert!(is_defined("RegistryMonster"));

        let found = lookup("RegistryMonster").unwrap();
        assert!(Arc::ptr_eq(&def, &found));
    }

    #[test]
    fn redefinition_fails_and_keeps_the_first_definition() {
        let first = define("RegistryDuplicate", Definition::new()).unwrap();

        let error = define(
            "RegistryDuplicate",
            Definition::new().view("by_location"),
        )
        .unwrap_err();
        assert!(matches!(error, OdmError::AlreadyDefined { name } if name == "RegistryDuplicate"));

        let still = lookup("RegistryDuplicate").unwrap();
        assert!(Arc::ptr_eq(&first, &still));
        assert!(still.views().is_empty());
    }

    #[test]
    fn lookup_of_unknown_type_is_none() {
        assert!(lookup("RegistryNeverDefined").is_none());
        assert!(!is_defined("RegistryNeverDefined"));
    }

    #[test]
    fn concurrent_definition_has_exactly_one_winner() {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                std::thread::spawn(|| define("RegistryRace", Definition::new()).is_ok())
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
    }
}
