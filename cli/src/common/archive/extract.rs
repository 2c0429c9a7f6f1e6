//! # unarchive Extraction Pipeline (`common::archive::extract`)
//!
//! File: cli/src/common/archive/extract.rs
//!
//! ## Overview
//!
//! Extracts one archive into a destination directory so that the destination
//! always ends up as the payload root, whether or not the archive wrapped its
//! content in a single top-level folder.
//!
//! ## Architecture
//!
//! [`Extractor::extract`] runs these steps, aborting on the first failure:
//!
//! 1. The source must be an existing file (`SourceNotFound`).
//! 2. The detector must recognise it (`UndetectableType`).
//! 3. The destination must not be claimed by another extraction through the
//!    same extractor (`DestinationBusy`), and must not already hold content.
//! 4. The destination's parent and a `.unarchive-<uuid>` scratch directory are
//!    created. The scratch directory lives next to the destination unless
//!    `scratch_root` is configured.
//! 5. `unzip` or `tar` unpacks into the scratch directory through the
//!    [`ProcessRunner`].
//! 6. Normalization: if the scratch directory holds exactly one entry and it
//!    is a directory, that directory becomes the destination and the scratch
//!    directory is removed. Otherwise the scratch directory itself becomes
//!    the destination. Only one level is ever collapsed.
//!
//! The scratch directory is owned by a [`ScratchDir`] guard, so it is removed
//! on every exit path, including cancellation.
//!
//! ## Usage
//!
//! ```rust
//! let extractor = Extractor::new(SystemRunner::default(), ExtractSettings::default());
//! let report = extractor
//!     .extract(Path::new("drupal-10.2.tar.gz"), Path::new("web"), &CancellationToken::new())
//!     .await?;
//! println!("{} files", report.files);
//! ```
//!
use crate::common::archive::detect::{self, ArchiveKind, ContentTypeProbe, InferProbe};
use crate::common::archive::scratch::ScratchDir;
use crate::common::fs::io;
use crate::common::process::{CommandSpec, ProcessRunner, RunError};
use crate::core::error::{ExtractResult, UnarchiveError};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Programs and locations used by an [`Extractor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractSettings {
    pub unzip_program: String,
    pub tar_program: String,
    /// Where scratch directories are created. `None` means next to the destination.
    pub scratch_root: Option<PathBuf>,
}

impl Default for ExtractSettings {
    fn default() -> Self {
        Self {
            unzip_program: "unzip".to_string(),
            tar_program: "tar".to_string(),
            scratch_root: None,
        }
    }
}

/// Summary of a successful extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionReport {
    pub kind: ArchiveKind,
    pub destination: PathBuf,
    /// Name of the encapsulating folder, if one was collapsed.
    pub collapsed_wrapper: Option<String>,
    pub files: usize,
    pub directories: usize,
}

/// Extracts archives through an injected [`ProcessRunner`].
pub struct Extractor<R: ProcessRunner> {
    runner: R,
    settings: ExtractSettings,
    probe: Box<dyn ContentTypeProbe + Send + Sync>,
    in_flight: Mutex<HashSet<PathBuf>>,
}

impl<R: ProcessRunner> Extractor<R> {
    pub fn new(runner: R, settings: ExtractSettings) -> Self {
        Self {
            runner,
            settings,
            probe: Box::new(InferProbe),
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Replaces the content-type probe used for the first detection tier.
    pub fn with_probe(mut self, probe: impl ContentTypeProbe + Send + Sync + 'static) -> Self {
        self.probe = Box::new(probe);
        self
    }

    /// Extracts `source` so that `destination` becomes the archive's payload root.
    ///
    /// # Errors
    ///
    /// - `SourceNotFound` if `source` is not an existing file.
    /// - `UndetectableType` if no detection tier recognises it.
    /// - `DestinationBusy` if another extraction into `destination` is running.
    /// - `ExtractionCommandFailed` if the external program is missing, fails or times out.
    /// - `Cancelled` if `cancel` fires while the program runs.
    /// - `FilesystemOperationFailed` for any directory, move or delete failure,
    ///   including a destination that already holds content.
    pub async fn extract(
        &self,
        source: &Path,
        destination: &Path,
        cancel: &CancellationToken,
    ) -> ExtractResult<ExtractionReport> {
        info!(
            "Extracting '{}' to '{}'",
            source.display(),
            destination.display()
        );

        if !source.is_file() {
            error!("Archive '{}' does not exist", source.display());
            return Err(UnarchiveError::SourceNotFound {
                path: source.to_path_buf(),
            });
        }

        let detection = detect::detect_with(source, self.probe.as_ref());
        if detection.kind == ArchiveKind::Unknown {
            error!("Could not determine type of '{}'", source.display());
            return Err(UnarchiveError::UndetectableType {
                path: source.to_path_buf(),
            });
        }
        info!(
            "'{}' is a {} archive (by {})",
            source.display(),
            detection.kind,
            detection.tier
        );

        let _claim = self.claim(destination)?;
        check_destination_vacant(destination)?;

        let parent = parent_dir(destination);
        io::ensure_dir_exists(&parent)?;
        let scratch_root = self.settings.scratch_root.clone().unwrap_or(parent);
        let scratch = ScratchDir::create_in(&scratch_root)?;

        let source = fs::canonicalize(source)
            .map_err(|e| UnarchiveError::fs("resolve archive path", source, e))?;
        let spec = self.command_for(detection.kind, &source, scratch.path())?;

        self.runner
            .run(&spec, cancel)
            .await
            .map_err(|e| command_error(e, &spec, destination))?;
        debug!("'{}' finished; normalizing", spec);

        let collapsed_wrapper = normalize(scratch, destination)?;
        let (files, directories) = io::count_tree(destination)?;

        info!(
            "Extracted '{}' to '{}' ({} files, {} directories)",
            source.display(),
            destination.display(),
            files,
            directories
        );
        Ok(ExtractionReport {
            kind: detection.kind,
            destination: destination.to_path_buf(),
            collapsed_wrapper,
            files,
            directories,
        })
    }

    /// Builds the external command for `kind`.
    fn command_for(
        &self,
        kind: ArchiveKind,
        source: &Path,
        scratch: &Path,
    ) -> ExtractResult<CommandSpec> {
        if kind == ArchiveKind::Zip {
            return Ok(CommandSpec::new(&self.settings.unzip_program)
                .arg("-q")
                .arg(source)
                .arg("-d")
                .arg(scratch));
        }
        match kind.tar_compression() {
            Some(compression) => Ok(CommandSpec::new(&self.settings.tar_program)
                .arg(compression.extract_flag())
                .arg(source)
                .arg("-C")
                .arg(scratch)),
            None => Err(UnarchiveError::UndetectableType {
                path: source.to_path_buf(),
            }),
        }
    }

    /// Registers `destination` as in flight until the returned claim is dropped.
    fn claim(&self, destination: &Path) -> ExtractResult<DestinationClaim<'_>> {
        let key = std::path::absolute(destination).unwrap_or_else(|_| destination.to_path_buf());
        let mut in_flight = self
            .in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if !in_flight.insert(key.clone()) {
            return Err(UnarchiveError::DestinationBusy {
                path: destination.to_path_buf(),
            });
        }
        Ok(DestinationClaim {
            registry: &self.in_flight,
            key,
        })
    }
}

/// Removes its destination from the in-flight registry on drop.
struct DestinationClaim<'a> {
    registry: &'a Mutex<HashSet<PathBuf>>,
    key: PathBuf,
}

impl Drop for DestinationClaim<'_> {
    fn drop(&mut self) {
        let mut in_flight = self
            .registry
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        in_flight.remove(&self.key);
    }
}

/// The destination may be missing or an empty directory, nothing else.
fn check_destination_vacant(destination: &Path) -> ExtractResult<()> {
    let metadata = match fs::symlink_metadata(destination) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(UnarchiveError::fs("inspect destination", destination, e)),
    };
    if metadata.is_dir() && io::is_empty_dir(destination)? {
        debug!("Destination {:?} exists and is empty", destination);
        return Ok(());
    }
    Err(UnarchiveError::fs(
        "prepare destination",
        destination,
        std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            "destination already exists and is not an empty directory",
        ),
    ))
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn command_error(err: RunError, spec: &CommandSpec, destination: &Path) -> UnarchiveError {
    error!("'{}' did not complete: {}", spec, err);
    let status = err.to_string();
    match err {
        RunError::Cancelled => UnarchiveError::Cancelled {
            path: destination.to_path_buf(),
        },
        RunError::Failed { stderr, .. } => UnarchiveError::ExtractionCommandFailed {
            cmd: spec.to_string(),
            status,
            output: stderr,
        },
        RunError::Launch(_) | RunError::TimedOut(_) => UnarchiveError::ExtractionCommandFailed {
            cmd: spec.to_string(),
            status,
            output: String::new(),
        },
    }
}

/// Moves the scratch content into place and returns the collapsed wrapper's name, if any.
fn normalize(scratch: ScratchDir, destination: &Path) -> ExtractResult<Option<String>> {
    let entries = io::list_entries(scratch.path())?;
    if let [single] = entries.as_slice() {
        if is_real_dir(single)? {
            let wrapper = single
                .file_name()
                .map(|name| name.to_string_lossy().into_owned());
            debug!("Collapsing encapsulating folder {:?}", wrapper);
            io::move_path(single, destination)?;
            scratch.close()?;
            return Ok(wrapper);
        }
    }
    debug!(
        "{} top-level entries; scratch directory becomes the destination",
        entries.len()
    );
    scratch.persist_as(destination)?;
    Ok(None)
}

/// Directory check that does not follow symbolic links.
fn is_real_dir(path: &Path) -> ExtractResult<bool> {
    fs::symlink_metadata(path)
        .map(|metadata| metadata.is_dir())
        .map_err(|e| UnarchiveError::fs("inspect entry", path, e))
}
