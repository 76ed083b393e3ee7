//! One staging run: snapshot the environment's config, assemble every
//! submitted entity, then replace the affected batch files.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::aspect::Aspect;
use crate::assembler::{assemble, assemble_removal};
use crate::config::{ConfigSource, MutationConfig};
use crate::error::StagingResult;
use crate::proposal::{ChangeProposal, EntityReference};
use crate::staging::{StagingArea, WrittenBatch};
use crate::taxonomy::EntityCategory;

/// An entity and the aspects to stage for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitySubmission {
    pub entity: EntityReference,
    #[serde(default)]
    pub aspects: Vec<Aspect>,
    /// Aspects to stage for deletion.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub removed_aspects: Vec<String>,
}

impl EntitySubmission {
    pub fn new(entity: EntityReference, aspects: Vec<Aspect>) -> Self {
        Self {
            entity,
            aspects,
            removed_aspects: Vec::new(),
        }
    }
}

/// Files replaced by [`StagingRun::stage`].
///
/// A failed stage returns an error instead, but directories written before
/// the failure keep their new batches; there is no cross-directory rollback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    pub environment_name: String,
    pub mutation_configured: bool,
    pub batches: Vec<WrittenBatch>,
}

impl StageReport {
    pub fn total_proposals(&self) -> usize {
        self.batches.iter().map(|b| b.proposals).sum()
    }

    pub fn paths(&self) -> impl Iterator<Item = &PathBuf> {
        self.batches.iter().map(|b| &b.path)
    }
}

/// Staging for a single environment with a fixed config snapshot.
///
/// The snapshot is taken once in [`StagingRun::begin`]; edits to the source
/// made while the run is alive are not seen by it, and a new run sees them.
#[derive(Debug, Clone)]
pub struct StagingRun {
    environment_name: String,
    config: Option<MutationConfig>,
    area: StagingArea,
}

impl StagingRun {
    pub fn begin(
        source: &dyn ConfigSource,
        environment_name: impl Into<String>,
        area: StagingArea,
    ) -> StagingResult<Self> {
        let environment_name = environment_name.into();
        let config = source.get_config(&environment_name)?;
        tracing::debug!(
            environment = %environment_name,
            configured = config.is_some(),
            "loaded mutation config snapshot"
        );
        Ok(Self {
            environment_name,
            config,
            area,
        })
    }

    pub fn environment_name(&self) -> &str {
        &self.environment_name
    }

    pub fn config(&self) -> Option<&MutationConfig> {
        self.config.as_ref()
    }

    /// Proposals for one submission: upserts in aspect order, then deletions.
    pub fn assemble(&self, submission: &EntitySubmission) -> StagingResult<Vec<ChangeProposal>> {
        let mut proposals = assemble(
            &submission.entity,
            submission
                .aspects
                .iter()
                .map(|a| (a.aspect_name.as_str(), &a.payload)),
            &self.environment_name,
            self.config.as_ref(),
        )?;
        proposals.extend(assemble_removal(
            &submission.entity,
            &submission.removed_aspects,
            &self.environment_name,
            self.config.as_ref(),
        ));
        Ok(proposals)
    }

    /// Assemble all submissions, grouped by category in submission order.
    /// Fails before any file is written if one submission fails.
    pub fn assemble_all(
        &self,
        submissions: &[EntitySubmission],
    ) -> StagingResult<BTreeMap<EntityCategory, Vec<ChangeProposal>>> {
        let mut batches: BTreeMap<EntityCategory, Vec<ChangeProposal>> = BTreeMap::new();
        for submission in submissions {
            let proposals = self.assemble(submission)?;
            batches
                .entry(submission.entity.category)
                .or_default()
                .extend(proposals);
        }
        Ok(batches)
    }

    /// Assemble and write. Only staging directories that received at least
    /// one submission are replaced.
    pub fn stage(&self, submissions: &[EntitySubmission]) -> StagingResult<StageReport> {
        let batches = self.assemble_all(submissions)?;
        let written = self.area.write_batches(&self.environment_name, &batches)?;
        Ok(StageReport {
            environment_name: self.environment_name.clone(),
            mutation_configured: self.config.is_some(),
            batches: written,
        })
    }

    /// Replace the batch of one category, even with an empty set. A sibling
    /// category sharing the directory keeps its staged records.
    pub fn stage_category(
        &self,
        category: EntityCategory,
        submissions: &[EntitySubmission],
    ) -> StagingResult<WrittenBatch> {
        let mut proposals = Vec::new();
        for submission in submissions.iter().filter(|s| s.entity.category == category) {
            proposals.extend(self.assemble(submission)?);
        }
        let path = self
            .area
            .write_batch(&self.environment_name, category, &proposals)?;
        Ok(WrittenBatch {
            staging_dir: category.staging_dir(),
            path,
            proposals: proposals.len(),
        })
    }
}
