use crate::error::{ImportError, Result, RowError};
use crate::models::Activity;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

pub mod csv;
pub mod garmin_api;
pub mod parsing;
pub mod wellness;

/// Activities extracted from one or more sources, with everything that went wrong on
/// the way. Row errors and unknown labels never abort an import.
#[derive(Debug, Clone, Default)]
pub struct ActivityBatch {
    pub activities: Vec<Activity>,
    pub errors: Vec<RowError>,
    pub unknown_labels: BTreeSet<String>,
}

impl ActivityBatch {
    pub fn len(&self) -> usize {
        self.activities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }

    /// Append another batch
    pub fn merge(&mut self, other: ActivityBatch) {
        self.activities.extend(other.activities);
        self.errors.extend(other.errors);
        self.unknown_labels.extend(other.unknown_labels);
    }

    /// Order activities by start time; equal start times keep their input order
    pub fn sort_chronologically(&mut self) {
        self.activities.sort_by_key(|activity| activity.start_time);
    }
}

/// Trait for importing activity data from different file formats
pub trait ImportFormat {
    /// Check if this importer can handle the given file
    fn can_import(&self, file_path: &Path) -> bool;

    /// Import activity data from the file
    fn import_file(&self, file_path: &Path) -> Result<ActivityBatch>;

    /// Get the format name for this importer
    fn get_format_name(&self) -> &'static str;
}

/// Manager for coordinating different import formats
pub struct ImportManager {
    importers: Vec<Box<dyn ImportFormat>>,
    show_progress: bool,
    recursive: bool,
}

impl ImportManager {
    /// Create a new import manager with all available importers
    pub fn new() -> Self {
        let importers: Vec<Box<dyn ImportFormat>> = vec![
            Box::new(csv::CsvImporter::new()),
            Box::new(garmin_api::GarminApiImporter::new()),
        ];

        Self {
            importers,
            show_progress: false,
            recursive: false,
        }
    }

    /// Show a progress bar during directory imports
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Descend into subdirectories during directory imports
    pub fn with_recursion(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Import a single file, auto-detecting the format
    pub fn import_file(&self, file_path: &Path) -> Result<ActivityBatch> {
        if !file_path.exists() {
            return Err(ImportError::FileNotFound {
                path: file_path.to_path_buf(),
            }
            .into());
        }

        for importer in &self.importers {
            if importer.can_import(file_path) {
                tracing::info!(
                    file = %file_path.display(),
                    format = importer.get_format_name(),
                    "Importing activities"
                );
                let batch = importer.import_file(file_path)?;
                tracing::info!(
                    file = %file_path.display(),
                    activities = batch.len(),
                    row_errors = batch.errors.len(),
                    unknown_labels = batch.unknown_labels.len(),
                    "Import finished"
                );
                return Ok(batch);
            }
        }

        Err(ImportError::UnsupportedFormat {
            format: file_path
                .extension()
                .and_then(|ext| ext.to_str())
                .unwrap_or("<none>")
                .to_string(),
        }
        .into())
    }

    /// Import files and directories, merged into one chronologically sorted batch
    pub fn import_paths(&self, paths: &[PathBuf]) -> Result<ActivityBatch> {
        let mut batch = ActivityBatch::default();

        for path in paths {
            if path.is_dir() {
                batch.merge(self.import_directory(path)?);
            } else {
                batch.merge(self.import_file(path)?);
            }
        }

        batch.sort_chronologically();
        Ok(batch)
    }

    /// Import all files from a directory.
    ///
    /// A file that fails to import is reported and skipped.
    pub fn import_directory(&self, dir_path: &Path) -> Result<ActivityBatch> {
        let mut batch = ActivityBatch::default();

        let files = self.collect_importable_files(dir_path)?;

        if files.is_empty() {
            tracing::warn!(dir = %dir_path.display(), "No importable files found");
            return Ok(batch);
        }

        let pb = if self.show_progress {
            let pb = ProgressBar::new(files.len() as u64);
            if let Ok(style) = ProgressStyle::default_bar().template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({msg})",
            ) {
                pb.set_style(style.progress_chars("#>-"));
            }
            pb
        } else {
            ProgressBar::hidden()
        };

        for file_path in files {
            let file_name = file_path
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string();
            pb.set_message(format!("Processing {}", file_name));

            match self.import_file(&file_path) {
                Ok(imported) => {
                    pb.println(format!(
                        "✓ Imported {} activities from {}",
                        imported.len(),
                        file_name
                    ));
                    batch.merge(imported);
                }
                Err(e) => {
                    tracing::warn!(file = %file_path.display(), error = %e, "Skipping file");
                    pb.println(format!("✗ Failed to import {}: {}", file_name, e.user_message()));
                }
            }

            pb.inc(1);
        }

        pb.finish_with_message("Import complete");
        Ok(batch)
    }

    /// Collect all files that can be imported from a directory, sorted by path
    fn collect_importable_files(&self, dir_path: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        if !dir_path.is_dir() {
            return Err(ImportError::FileNotFound {
                path: dir_path.to_path_buf(),
            }
            .into());
        }

        for entry in std::fs::read_dir(dir_path)? {
            let path = entry?.path();

            if path.is_file() && self.can_import_file(&path) {
                files.push(path);
            } else if path.is_dir() && self.recursive {
                files.extend(self.collect_importable_files(&path)?);
            }
        }

        files.sort();
        Ok(files)
    }

    /// Check if this manager can import a given file
    pub fn can_import_file(&self, file_path: &Path) -> bool {
        self.importers.iter().any(|importer| importer.can_import(file_path))
    }
}

impl Default for ImportManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Case-insensitive extension check
pub(crate) fn has_extension(file_path: &Path, wanted: &str) -> bool {
    file_path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(wanted))
        .unwrap_or(false)
}
