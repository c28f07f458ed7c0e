//! Export and import summaries.

use std::path::PathBuf;

/// What `export_directory` wrote.
#[derive(Clone, Debug, PartialEq)]
pub struct ExportReport {
    /// Directory the files were written to
    pub output_dir: PathBuf,
    pub businesses: usize,
    pub reviews: usize,
    pub reports: usize,
    /// Every file written, in write order
    pub files: Vec<PathBuf>,
}

/// Per-entity counts of an import.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImportCounts {
    /// Records written to the store
    pub created: usize,
    /// Records skipped because their id already exists
    pub skipped: usize,
    /// Records rejected by validation or pointing at a missing business
    pub invalid: usize,
}

/// What `import_snapshot` did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub businesses: ImportCounts,
    pub reviews: ImportCounts,
    pub reports: ImportCounts,
}

impl ImportReport {
    pub fn created(&self) -> usize {
        self.businesses.created + self.reviews.created + self.reports.created
    }

    pub fn skipped(&self) -> usize {
        self.businesses.skipped + self.reviews.skipped + self.reports.skipped
    }
}
