//! Filesystem layout, tree writing, and zip packaging for generated output.
//!
//! All output lives under a single generation root:
//! `{root}/{owner_id}-{owner_folder}/{project}/Backend` holds the expanded
//! source tree and `{root}/{owner_id}-{owner_folder}/{project}/{project}-Backend.zip`
//! the packaged archive next to it. Regeneration deletes the Backend directory
//! before rewriting, so stale files from a previous schema never survive.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::errors::{GenerationError, GenerationResult};
use crate::synth::SourceTree;

/// Resolved on-disk locations for one project's generated output.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectPaths {
    pub project_dir: PathBuf,
    pub backend_dir: PathBuf,
    pub archive_path: PathBuf,
}

impl ProjectPaths {
    /// Owner segment is `{id}-{folder_name}` so two users with the same
    /// username can never collide on disk.
    pub fn new(root: &Path, owner_id: i32, owner_folder: &str, project: &str) -> Self {
        let project_dir = root
            .join(format!("{}-{}", owner_id, owner_folder))
            .join(project);
        let backend_dir = project_dir.join("Backend");
        let archive_path = project_dir.join(format!("{}-Backend.zip", project));
        Self {
            project_dir,
            backend_dir,
            archive_path,
        }
    }
}

/// Materialize a source tree under `backend_dir`, replacing any previous
/// contents wholesale.
pub fn write_tree(backend_dir: &Path, tree: &SourceTree) -> GenerationResult<()> {
    if backend_dir.exists() {
        fs::remove_dir_all(backend_dir)?;
    }
    fs::create_dir_all(backend_dir)?;

    for (relative, content) in tree {
        let target = contained_path(backend_dir, relative)?;
        crate::common::write_string_to_file(&target, content)?;
    }
    debug!(files = tree.len(), path = %backend_dir.display(), "wrote source tree");
    Ok(())
}

/// Package `backend_dir` into a deflated zip at `archive_path`. Entries are
/// added in sorted path order so identical trees produce identical archives.
pub fn pack(backend_dir: &Path, archive_path: &Path) -> GenerationResult<()> {
    let mut entries = Vec::new();
    collect_files(backend_dir, backend_dir, &mut entries)?;
    entries.sort();

    let file = fs::File::create(archive_path)?;
    let mut writer = ZipWriter::new(file);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    for relative in &entries {
        writer.start_file(relative.clone(), options)?;
        let bytes = fs::read(backend_dir.join(relative))?;
        writer.write_all(&bytes)?;
    }
    writer.finish()?;
    debug!(entries = entries.len(), path = %archive_path.display(), "packed archive");
    Ok(())
}

fn collect_files(base: &Path, dir: &Path, out: &mut Vec<String>) -> GenerationResult<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            collect_files(base, &path, out)?;
        } else {
            let relative = path
                .strip_prefix(base)
                .map_err(|_| GenerationError::PathEscape)?;
            // zip entry names always use forward slashes
            let name = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            out.push(name);
        }
    }
    Ok(())
}

/// Join `relative` onto `base` and prove the result stays inside `base`.
///
/// The base must already exist; the joined path is canonicalized through its
/// deepest existing ancestor so `..` segments and symlink hops cannot slip
/// past the prefix check.
pub fn contained_path(base: &Path, relative: &str) -> GenerationResult<PathBuf> {
    let base = base.canonicalize()?;
    let joined = base.join(relative);

    // canonicalize the deepest ancestor that exists, then re-append the rest
    let mut existing = joined.as_path();
    let mut remainder = Vec::new();
    while !existing.exists() {
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                remainder.push(name.to_os_string());
                existing = parent;
            }
            _ => return Err(GenerationError::PathEscape),
        }
    }
    let mut resolved = existing.canonicalize()?;
    for segment in remainder.iter().rev() {
        resolved.push(segment);
    }

    if resolved.starts_with(&base) {
        Ok(resolved)
    } else {
        Err(GenerationError::PathEscape)
    }
}
