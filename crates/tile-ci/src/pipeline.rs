//! Publish pipeline orchestration.

use crate::error::{PublishError, Result};
use crate::gate::ReviewGate;
use crate::review::{format_review_results, SkillReview, SkillReviewer};
use crate::skills::{discover_skills, has_skills};
use crate::version_check::is_published_version;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tessl_registry::{IdTokenProvider, TileRegistry, REGISTRY_AUDIENCE};
use tile_core::{
    archive_digest, emit_archive_built, emit_publish_skipped, emit_publish_started,
    emit_publish_uploaded, emit_review_completed, emit_version_checked, publish_span,
    TileArchive, TileManifest,
};
use tracing::{info, warn, Instrument};

/// Result of a successful pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub enum PublishOutcome {
    /// The manifest version already exists remotely; nothing was uploaded.
    AlreadyPublished { tile: String, version: String },

    /// A new version was uploaded.
    Published {
        tile: String,
        version: String,
        /// Size of the uploaded archive.
        archive_bytes: usize,
        /// SHA-256 of the uploaded archive, hex encoded.
        archive_digest: String,
        /// Reviews run before upload (empty when the gate is off).
        reviews: Vec<SkillReview>,
    },
}

impl PublishOutcome {
    pub fn tile(&self) -> &str {
        match self {
            PublishOutcome::AlreadyPublished { tile, .. } => tile,
            PublishOutcome::Published { tile, .. } => tile,
        }
    }

    pub fn version(&self) -> &str {
        match self {
            PublishOutcome::AlreadyPublished { version, .. } => version,
            PublishOutcome::Published { version, .. } => version,
        }
    }

    pub fn was_uploaded(&self) -> bool {
        matches!(self, PublishOutcome::Published { .. })
    }
}

/// Manifest → version check → review gate → archive → upload.
pub struct PublishPipeline {
    registry: Arc<dyn TileRegistry>,
    id_tokens: Arc<dyn IdTokenProvider>,
    reviewer: Option<Arc<dyn SkillReviewer>>,
    api_token: String,
}

impl PublishPipeline {
    pub fn new(
        registry: Arc<dyn TileRegistry>,
        id_tokens: Arc<dyn IdTokenProvider>,
        api_token: &str,
    ) -> Self {
        Self {
            registry,
            id_tokens,
            reviewer: None,
            api_token: api_token.to_string(),
        }
    }

    /// Gate the upload on a skill review.
    pub fn with_reviewer(mut self, reviewer: Arc<dyn SkillReviewer>) -> Self {
        self.reviewer = Some(reviewer);
        self
    }

    /// Publish the tile rooted at `root`.
    ///
    /// Steps run strictly in order and the first error aborts the run. An
    /// already-published version returns early without building an archive.
    pub async fn run(&self, root: &Path) -> Result<PublishOutcome> {
        let span = publish_span(&root.display().to_string());
        self.run_inner(root).instrument(span).await
    }

    async fn run_inner(&self, root: &Path) -> Result<PublishOutcome> {
        let manifest = TileManifest::load(root)?;
        let version = manifest.version.clone();
        emit_publish_started(&manifest.name, &version);

        let check = is_published_version(self.registry.as_ref(), &manifest.name, &version).await?;
        let tile = check.tile.to_string();
        emit_version_checked(&tile, &version, check.existing_versions, check.published);

        if check.published {
            emit_publish_skipped(&tile, &version);
            return Ok(PublishOutcome::AlreadyPublished { tile, version });
        }

        let reviews = match &self.reviewer {
            Some(reviewer) => review_skills(reviewer.as_ref(), root).await?,
            None => Vec::new(),
        };

        let (archive, files) = build_archive_blocking(root.to_path_buf()).await?;
        let archive_bytes = archive.len();
        let digest = archive_digest(&archive);
        emit_archive_built(files, archive_bytes, &digest);

        let oidc_token = self.id_tokens.id_token(REGISTRY_AUDIENCE).await?;
        self.registry
            .upload(archive, &self.api_token, &oidc_token)
            .await?;
        emit_publish_uploaded(&tile, &version, archive_bytes);

        Ok(PublishOutcome::Published {
            tile,
            version,
            archive_bytes,
            archive_digest: digest,
            reviews,
        })
    }
}

/// Review every skill under `root` in turn and apply the gate.
///
/// The reviewer is only prepared (and possibly installed) when the tile has
/// skills.
async fn review_skills(reviewer: &dyn SkillReviewer, root: &Path) -> Result<Vec<SkillReview>> {
    if !has_skills(root) {
        info!("No skills found, skipping review");
        return Ok(Vec::new());
    }

    reviewer.prepare().await;
    let threshold = reviewer.threshold();
    let skills: Vec<PathBuf> = discover_skills(root).collect();

    info!(count = skills.len(), "Reviewing skills");
    let mut reviews = Vec::with_capacity(skills.len());
    for path in skills {
        let result = reviewer.review(&path).await;
        let name = path.display().to_string();
        emit_review_completed(&name, result.score, threshold, result.passed);
        info!(skill = %name, "{}", format_review_results(&result, threshold));
        reviews.push(SkillReview { path, result });
    }

    let verdict = ReviewGate::evaluate(&reviews, threshold);
    if !verdict.passed {
        for violation in &verdict.violations {
            warn!("{}", violation);
        }
        return Err(PublishError::ReviewFailed {
            failed: verdict.violations.len(),
            threshold,
            violations: verdict.violations,
        });
    }

    info!("{}", verdict.message);
    Ok(reviews)
}

/// Collect and compress the tile off the async workers. Returns the archive
/// bytes and the number of files in it.
async fn build_archive_blocking(root: PathBuf) -> Result<(Vec<u8>, usize)> {
    tokio::task::spawn_blocking(move || -> Result<(Vec<u8>, usize)> {
        let archive = TileArchive::collect(&root)?;
        Ok((archive.to_tar_gz()?, archive.len()))
    })
    .await
    .map_err(|e| PublishError::Task(e.to_string()))?
}
