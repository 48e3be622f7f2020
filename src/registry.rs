use std::collections::HashSet;

use crate::error::MigrateError;
use crate::step::MutationStep;
use crate::steps;

/// The set of steps known to this build of the tool, held in ascending
/// version order. Steps may be supplied in any order; the registry owns the
/// ordering the runner relies on.
pub struct StepRegistry {
    steps: Vec<Box<dyn MutationStep>>,
}

impl StepRegistry {
    pub fn new(mut steps: Vec<Box<dyn MutationStep>>) -> Result<Self, MigrateError> {
        steps.sort_by(|a, b| a.version_id().cmp(b.version_id()));
        let mut seen = HashSet::new();
        for step in &steps {
            if !seen.insert(step.version_id().to_owned()) {
                return Err(MigrateError::DuplicateVersion {
                    version_id: step.version_id().to_owned(),
                });
            }
        }
        Ok(Self { steps })
    }

    /// The full catalog of shipped storefront steps.
    pub fn builtin() -> Result<Self, MigrateError> {
        Self::new(steps::all())
    }

    pub fn steps(&self) -> &[Box<dyn MutationStep>] {
        &self.steps
    }

    pub fn get(&self, version_id: &str) -> Option<&dyn MutationStep> {
        self.steps
            .iter()
            .find(|step| step.version_id() == version_id)
            .map(|step| step.as_ref())
    }

    pub fn contains(&self, version_id: &str) -> bool {
        self.get(version_id).is_some()
    }
}
