//! Staged batch files.
//!
//! Layout, one file per environment and staging directory:
//!
//! ```text
//! <root>/<environment>/tags/mcp_file.json
//! <root>/<environment>/glossary/mcp_file.json
//! <root>/<environment>/structured_properties/mcp_file.json
//! <root>/<environment>/domains/mcp_file.json
//! <root>/<environment>/data_products/mcp_file.json
//! ```
//!
//! A batch file is the current staged set for its pairing, not a log: every
//! write replaces the whole file. Writes go to a temporary file in the same
//! directory that is then renamed over the target, so readers see either the
//! previous batch or the new one. Concurrent writers to the same pairing are
//! not coordinated; the last rename wins.
//!
//! Glossary terms and nodes share one file. Replacing one of them reads the
//! file first and carries the other's records over, so an unreadable shared
//! file fails the write instead of being overwritten.

use std::collections::BTreeMap;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use crate::config::StagingOptions;
use crate::error::{StagingError, StagingResult};
use crate::proposal::ChangeProposal;
use crate::taxonomy::EntityCategory;

#[derive(Debug, Clone)]
pub struct StagingArea {
    options: StagingOptions,
}

impl StagingArea {
    pub fn new(options: StagingOptions) -> Self {
        Self { options }
    }

    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self::new(StagingOptions::with_root(root))
    }

    pub fn root(&self) -> &Path {
        &self.options.root
    }

    /// `<root>/<environment>/<staging dir>/<file name>`.
    pub fn batch_path(
        &self,
        environment_name: &str,
        category: EntityCategory,
    ) -> StagingResult<PathBuf> {
        self.dir_batch_path(environment_name, category.staging_dir())
    }

    fn dir_batch_path(&self, environment_name: &str, staging_dir: &str) -> StagingResult<PathBuf> {
        validate_environment_name(environment_name)?;
        Ok(self
            .options
            .root
            .join(environment_name)
            .join(staging_dir)
            .join(&self.options.file_name))
    }

    /// Replace the batch for `(environment_name, category)` with `proposals`.
    ///
    /// In a shared directory the other category's staged records are kept,
    /// and the file is rewritten in staging order.
    pub fn write_batch(
        &self,
        environment_name: &str,
        category: EntityCategory,
        proposals: &[ChangeProposal],
    ) -> StagingResult<PathBuf> {
        let path = self.batch_path(environment_name, category)?;
        let mut groups = self.retained_siblings(&path, category.staging_dir(), &[category])?;
        groups.push((category, proposals.to_vec()));
        let merged = merge_in_staging_order(groups);
        write_atomic(&path, &encode_batch(&path, &merged)?)?;
        tracing::info!(
            environment = environment_name,
            category = %category,
            path = %path.display(),
            proposals = proposals.len(),
            retained = merged.len() - proposals.len(),
            "staged batch"
        );
        Ok(path)
    }

    /// Write several categories at once. Categories sharing a staging
    /// directory (glossary terms and nodes) are merged into one batch in
    /// staging order; a category absent from `batches` keeps whatever it
    /// already has staged there.
    ///
    /// Every batch is encoded before the first file is replaced, but the
    /// directories are then replaced one at a time: if a later write fails,
    /// the earlier directories already hold their new batches.
    pub fn write_batches(
        &self,
        environment_name: &str,
        batches: &BTreeMap<EntityCategory, Vec<ChangeProposal>>,
    ) -> StagingResult<Vec<WrittenBatch>> {
        let mut by_dir: BTreeMap<&'static str, Vec<(EntityCategory, Vec<ChangeProposal>)>> =
            BTreeMap::new();
        for (category, proposals) in batches {
            by_dir
                .entry(category.staging_dir())
                .or_default()
                .push((*category, proposals.clone()));
        }

        // Encode everything before touching the filesystem.
        let mut pending = Vec::with_capacity(by_dir.len());
        for (dir, mut groups) in by_dir {
            let path = self.dir_batch_path(environment_name, dir)?;
            let replacing: Vec<EntityCategory> = groups.iter().map(|(c, _)| *c).collect();
            groups.extend(self.retained_siblings(&path, dir, &replacing)?);
            let merged = merge_in_staging_order(groups);
            let bytes = encode_batch(&path, &merged)?;
            pending.push((dir, path, bytes, merged.len()));
        }

        let mut written = Vec::with_capacity(pending.len());
        for (dir, path, bytes, proposals) in pending {
            write_atomic(&path, &bytes)?;
            tracing::info!(
                environment = environment_name,
                staging_dir = dir,
                path = %path.display(),
                proposals,
                "staged batch"
            );
            written.push(WrittenBatch {
                staging_dir: dir,
                path,
                proposals,
            });
        }
        Ok(written)
    }

    /// Current staged batch file for the pairing, `None` if nothing is
    /// staged. For glossary categories this is the shared file holding both.
    pub fn read_batch(
        &self,
        environment_name: &str,
        category: EntityCategory,
    ) -> StagingResult<Option<Vec<ChangeProposal>>> {
        read_batch_file(&self.batch_path(environment_name, category)?)
    }

    /// Records already staged at `path` for the categories of `staging_dir`
    /// that are not being replaced.
    fn retained_siblings(
        &self,
        path: &Path,
        staging_dir: &str,
        replacing: &[EntityCategory],
    ) -> StagingResult<Vec<(EntityCategory, Vec<ChangeProposal>)>> {
        let siblings: Vec<EntityCategory> = EntityCategory::for_staging_dir(staging_dir)
            .into_iter()
            .filter(|c| !replacing.contains(c))
            .collect();
        if siblings.is_empty() {
            return Ok(Vec::new());
        }
        let Some(staged) = read_batch_file(path)? else {
            return Ok(Vec::new());
        };
        Ok(siblings
            .into_iter()
            .map(|sibling| {
                let kept = staged
                    .iter()
                    .filter(|p| p.category() == Some(sibling))
                    .cloned()
                    .collect();
                (sibling, kept)
            })
            .collect())
    }
}

fn read_batch_file(path: &Path) -> StagingResult<Option<Vec<ChangeProposal>>> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StagingError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    let proposals = serde_json::from_str(&text).map_err(|source| StagingError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(proposals))
}

fn merge_in_staging_order(
    mut groups: Vec<(EntityCategory, Vec<ChangeProposal>)>,
) -> Vec<ChangeProposal> {
    groups.sort_by_key(|(category, _)| category.staging_rank());
    groups.into_iter().flat_map(|(_, proposals)| proposals).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenBatch {
    pub staging_dir: &'static str,
    pub path: PathBuf,
    /// Records in the written file, including ones carried over from a
    /// sibling category.
    pub proposals: usize,
}

/// Pretty JSON array with a trailing newline; stable for identical input.
pub fn encode_batch(path: &Path, proposals: &[ChangeProposal]) -> StagingResult<Vec<u8>> {
    let mut bytes = serde_json::to_vec_pretty(proposals).map_err(|source| StagingError::Encode {
        path: path.to_path_buf(),
        source,
    })?;
    bytes.push(b'\n');
    Ok(bytes)
}

fn write_atomic(path: &Path, bytes: &[u8]) -> StagingResult<()> {
    let write_err = |source: std::io::Error| StagingError::Write {
        path: path.to_path_buf(),
        source,
    };
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir).map_err(write_err)?;

    let mut tmp = tempfile::Builder::new()
        .prefix(".mcp_file.")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(write_err)?;
    tmp.write_all(bytes).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}

fn validate_environment_name(environment_name: &str) -> StagingResult<()> {
    let unusable = environment_name.is_empty()
        || environment_name == "."
        || environment_name == ".."
        || environment_name.contains(['/', '\\']);
    if unusable {
        return Err(StagingError::InvalidEnvironment(environment_name.to_string()));
    }
    Ok(())
}
