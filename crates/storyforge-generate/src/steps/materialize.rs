use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::{ImageFormat, Rgba, RgbaImage};
use rayon::prelude::*;
use storyforge_core::{Diagnostic, StoryError, StoryResult};
use storyforge_ir::ElementStream;
use storyforge_script::{token_name, AssetDescriptor, AssetProvider};

use crate::asset_cache::{AssetCache, CacheEntry, CACHE_FILE_NAME};
use crate::step::{GenerationStep, StepContext};

/// Output-relative directory receiving generated images.
pub const DEFAULT_ASSET_DIR: &str = "sb/generated";

/// Replaces `asset://name` element paths with rendered image files.
///
/// Files are named after the descriptor's content hash. A file is reused
/// when the cache says it was rendered from the same hash at the same
/// path and it still exists; otherwise it is rendered again. Names with
/// identical descriptors share one file, which is written once and
/// counted once in `assets_generated`. Elements whose token cannot be
/// resolved or rendered are dropped.
pub struct MaterializeAssets {
    provider: Arc<dyn AssetProvider>,
    output_dir: PathBuf,
    asset_dir: String,
}

struct RenderJob {
    name: String,
    descriptor: AssetDescriptor,
    hash: String,
    path: String,
}

impl MaterializeAssets {
    pub fn new(provider: Arc<dyn AssetProvider>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            provider,
            output_dir: output_dir.into(),
            asset_dir: DEFAULT_ASSET_DIR.to_string(),
        }
    }

    pub fn with_asset_dir(mut self, asset_dir: impl Into<String>) -> Self {
        self.asset_dir = asset_dir.into().trim_end_matches('/').to_string();
        self
    }

    pub fn cache_path(&self) -> PathBuf {
        self.output_dir.join(CACHE_FILE_NAME)
    }

    fn plan(&self, name: &str) -> StoryResult<RenderJob> {
        let descriptor = self.provider.resolve(name).ok_or_else(|| {
            StoryError::asset(format!("no descriptor registered for asset '{name}'"), name)
        })?;
        let hash = descriptor.content_hash()?.to_hex();
        let path = format!("{}/{}", self.asset_dir, descriptor.file_name()?);
        Ok(RenderJob {
            name: name.to_string(),
            descriptor,
            hash,
            path,
        })
    }
}

impl std::fmt::Debug for MaterializeAssets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaterializeAssets")
            .field("output_dir", &self.output_dir)
            .field("asset_dir", &self.asset_dir)
            .finish()
    }
}

impl GenerationStep for MaterializeAssets {
    fn name(&self) -> &str {
        "materialize-assets"
    }

    fn apply(&self, stream: &mut ElementStream, ctx: &mut StepContext<'_>) -> StoryResult<()> {
        let names: BTreeSet<String> = stream
            .entries
            .iter()
            .filter_map(|e| token_name(e.element.path()).map(str::to_string))
            .collect();
        if names.is_empty() {
            return Ok(());
        }

        let cache_path = self.cache_path();
        let mut cache = AssetCache::load(&cache_path);
        let mut resolved: BTreeMap<String, String> = BTreeMap::new();
        let mut failures: BTreeMap<String, String> = BTreeMap::new();

        // jobs sharing an output path share one file and are rendered once
        let mut fresh_paths: BTreeSet<String> = BTreeSet::new();
        let mut pending: BTreeMap<String, Vec<RenderJob>> = BTreeMap::new();
        for name in &names {
            match self.plan(name) {
                Ok(job) if cache.is_fresh(&job.name, &job.hash, &job.path, &self.output_dir) => {
                    ctx.assets_reused += 1;
                    fresh_paths.insert(job.path.clone());
                    resolved.insert(job.name, job.path);
                }
                Ok(job) => pending.entry(job.path.clone()).or_default().push(job),
                Err(e) => {
                    failures.insert(name.clone(), e.to_string());
                }
            }
        }

        let mut batches = Vec::with_capacity(pending.len());
        for (path, jobs) in pending {
            if fresh_paths.contains(&path) {
                for job in jobs {
                    ctx.assets_reused += 1;
                    cache.record(
                        job.name.clone(),
                        CacheEntry {
                            hash: job.hash,
                            path: job.path.clone(),
                        },
                    );
                    resolved.insert(job.name, job.path);
                }
            } else {
                batches.push((path, jobs));
            }
        }

        let rendered: Vec<(Vec<RenderJob>, StoryResult<()>)> = batches
            .into_par_iter()
            .map(|(path, jobs)| {
                let result = match jobs.first() {
                    Some(job) => write_png(&job.descriptor, &self.output_dir.join(&path)),
                    None => Ok(()),
                };
                (jobs, result)
            })
            .collect();

        for (jobs, result) in rendered {
            match result {
                Ok(()) => {
                    ctx.assets_generated += 1;
                    for job in jobs {
                        tracing::debug!(asset = %job.name, path = %job.path, "rendered asset");
                        cache.record(
                            job.name.clone(),
                            CacheEntry {
                                hash: job.hash,
                                path: job.path.clone(),
                            },
                        );
                        resolved.insert(job.name, job.path);
                    }
                }
                Err(e) => {
                    for job in jobs {
                        failures.insert(job.name, e.to_string());
                    }
                }
            }
        }

        if let Err(e) = cache.save(&cache_path) {
            ctx.warn(Diagnostic::warning(
                self.name(),
                format!("failed to save asset cache {}: {e}", cache_path.display()),
            ));
        }

        for entry in &mut stream.entries {
            let target = token_name(entry.element.path()).and_then(|name| resolved.get(name));
            if let Some(path) = target {
                entry.element.set_path(path.clone());
            }
        }

        let dropped: Vec<(usize, String)> = stream
            .entries
            .iter()
            .filter_map(|e| token_name(e.element.path()).map(|name| (e.group, name.to_string())))
            .collect();
        for (group, name) in &dropped {
            let reason = failures
                .get(name)
                .cloned()
                .unwrap_or_else(|| format!("asset '{name}' was not materialized"));
            let group = ctx.group_name(*group).to_string();
            ctx.warn(Diagnostic::warning(self.name(), format!("dropped element: {reason}")).in_group(group));
        }
        if !dropped.is_empty() {
            stream.retain(|e| token_name(e.element.path()).is_none());
        }

        tracing::info!(
            generated = ctx.assets_generated,
            reused = ctx.assets_reused,
            dropped = dropped.len(),
            "materialized assets"
        );
        Ok(())
    }
}

fn render(descriptor: &AssetDescriptor) -> RgbaImage {
    match descriptor {
        AssetDescriptor::SolidImage { width, height, color } => {
            let [r, g, b] = color.to_rgb8();
            RgbaImage::from_pixel(*width, *height, Rgba([r, g, b, 255]))
        }
        AssetDescriptor::LinearGradient {
            width,
            height,
            from,
            to,
            vertical,
        } => RgbaImage::from_fn(*width, *height, |x, y| {
            let (position, span) = if *vertical { (y, *height) } else { (x, *width) };
            let t = if span > 1 {
                position as f64 / (span - 1) as f64
            } else {
                0.0
            };
            let [r, g, b] = from.lerp(to, t).to_rgb8();
            Rgba([r, g, b, 255])
        }),
    }
}

/// Render to a temporary file and move it into place.
fn write_png(descriptor: &AssetDescriptor, path: &Path) -> StoryResult<()> {
    descriptor.validate()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("png.tmp");
    render(descriptor)
        .save_with_format(&tmp, ImageFormat::Png)
        .map_err(|e| StoryError::asset(format!("failed to encode image: {e}"), path))?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}
