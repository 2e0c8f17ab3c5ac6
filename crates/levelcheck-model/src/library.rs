//! All model variants registered under their base key, with condition-based
//! lookup against a device's parameter string.

use indexmap::IndexMap;

use crate::error::{ModelError, Result};
use crate::model::Model;
use crate::parameter_map::ParameterMap;

/// Registered models keyed by model key (the text a `.model` card or
/// instance line names), each key fanning out to the one or more [`Model`]
/// variants distinguished by condition.
#[derive(Debug, Default)]
pub struct ModelLibrary {
    models: IndexMap<String, Vec<Model>>,
}

impl ModelLibrary {
    pub fn new() -> Self {
        Self { models: IndexMap::new() }
    }

    pub fn add_model(&mut self, key: impl Into<String>, model: Model) {
        self.models.entry(key.into()).or_default().push(model);
    }

    /// Find the first model variant under `key` whose conditions match
    /// `parameters`, in registration order. Mirrors first-match semantics:
    /// callers that need disambiguation order their `add_model` calls most-
    /// specific first.
    pub fn find_model(&self, key: &str, parameters: &ParameterMap) -> Option<&Model> {
        self.models.get(key)?.iter().find(|m| m.matches(parameters))
    }

    pub fn find_model_mut(&mut self, key: &str, parameters: &ParameterMap) -> Option<&mut Model> {
        self.models.get_mut(key)?.iter_mut().find(|m| m.matches(parameters))
    }

    /// Like [`Self::find_model`], but returns a typed error naming the key
    /// when nothing matches, for callers that treat a miss as fatal.
    pub fn require_model(
        &self,
        key: &str,
        key_id: levelcheck_core::TextId,
        parameters: &ParameterMap,
    ) -> Result<&Model> {
        self.find_model(key, parameters)
            .ok_or(ModelError::NoMatchingModel { key: key_id })
    }

    pub fn variants(&self, key: &str) -> &[Model] {
        self.models.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.models.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use levelcheck_core::{DeviceType, Interner};

    #[test]
    fn finds_first_matching_variant_in_registration_order() {
        let mut interner = Interner::new();
        let key_id = interner.intern("nmos");
        let mut lib = ModelLibrary::new();

        let mut thin = Model::new(DeviceType::Nmos, "nmos");
        thin.conditions = crate::condition::ConditionList::parse("L<0.2u");
        let thick = Model::new(DeviceType::Nmos, "nmos");

        lib.add_model("nmos", thin);
        lib.add_model("nmos", thick);

        let thin_params = ParameterMap::parse("L=0.15u");
        let thick_params = ParameterMap::parse("L=0.5u");

        assert!(lib.find_model("nmos", &thin_params).unwrap().conditions.len() == 1);
        assert!(lib.find_model("nmos", &thick_params).unwrap().conditions.is_empty());

        assert!(lib.require_model("nmos", key_id, &thin_params).is_ok());
    }

    #[test]
    fn missing_key_reports_no_matching_model() {
        let mut interner = Interner::new();
        let key_id = interner.intern("missing");
        let lib = ModelLibrary::new();
        let params = ParameterMap::parse("");
        let err = lib.require_model("missing", key_id, &params).unwrap_err();
        assert_eq!(err, ModelError::NoMatchingModel { key: key_id });
    }
}
