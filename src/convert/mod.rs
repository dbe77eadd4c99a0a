//! Plan-to-workout conversion pipeline.
//!
//! Each row is parsed, built, composed and rendered on its own. A row that
//! fails is reported with its week and day; the other rows carry on.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::config::AppConfig;
use crate::intensity::IntensityTable;
use crate::plan::{PlanRow, PlanTable, RawRow, RowError};
use crate::workouts::{
    build_steps, compose, render, ConversionWarning, DocumentMetadata, ExportError, OutputFormat,
    Step, WorkoutDocument,
};

/// One successfully converted row.
#[derive(Debug, Clone)]
pub struct ConvertedWorkout {
    pub row: PlanRow,
    pub steps: Vec<Step>,
    pub document: WorkoutDocument,
    pub format: OutputFormat,
    /// Rendered file content
    pub rendered: String,
    pub warnings: Vec<ConversionWarning>,
}

impl ConvertedWorkout {
    /// Output file name, e.g. `Week 8 Thursday.zwo`.
    pub fn file_name(&self) -> String {
        format!("{}.{}", sanitize_file_stem(&self.document.name), self.format.extension())
    }
}

/// Errors that stop a single row.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error(transparent)]
    Row(#[from] RowError),

    #[error("Week {week} {day}: {error}")]
    Render {
        week: String,
        day: String,
        #[source]
        error: ExportError,
    },
}

/// Outcome of converting a whole table.
#[derive(Debug, Default)]
pub struct ConversionReport {
    /// Converted rows, in input order
    pub workouts: Vec<ConvertedWorkout>,
    /// Rejected rows, in input order
    pub failures: Vec<ConvertError>,
}

impl ConversionReport {
    pub fn warning_count(&self) -> usize {
        self.workouts.iter().map(|w| w.warnings.len()).sum()
    }
}

/// Converts plan rows with a fixed table and configuration.
pub struct Converter<'a> {
    table: &'a IntensityTable,
    config: &'a AppConfig,
}

impl<'a> Converter<'a> {
    pub fn new(table: &'a IntensityTable, config: &'a AppConfig) -> Self {
        Self { table, config }
    }

    /// Convert one raw record.
    pub fn convert_raw(&self, raw: &RawRow) -> Result<ConvertedWorkout, ConvertError> {
        let row = PlanRow::from_raw(raw)?;
        self.convert_row(row)
    }

    /// Convert one typed row.
    pub fn convert_row(&self, row: PlanRow) -> Result<ConvertedWorkout, ConvertError> {
        let id = row.id();
        let built = build_steps(&row, self.table, &self.config.builder)
            .map_err(|error| RowError::new(id.clone(), error))?;

        let metadata = DocumentMetadata {
            name: self.workout_name(&row),
            author: Some(self.config.output.author.clone()).filter(|a| !a.is_empty()),
            description: Some(row.summary()),
            tags: self.config.output.tags.clone(),
        };
        let (document, compose_warnings) =
            compose(&built.steps, metadata, self.config.capabilities());

        let format = self.config.output.format;
        let rendered = render(&document, format).map_err(|error| ConvertError::Render {
            week: id.week.clone(),
            day: id.day.clone(),
            error,
        })?;

        let mut warnings = built.warnings;
        warnings.extend(compose_warnings);

        Ok(ConvertedWorkout {
            row,
            steps: built.steps,
            document,
            format,
            rendered,
            warnings,
        })
    }

    /// Convert every row of a table.
    ///
    /// Rows run in parallel; the report keeps input order.
    pub fn convert_table(&self, table: &PlanTable) -> ConversionReport {
        let results: Vec<Result<ConvertedWorkout, ConvertError>> = table
            .rows
            .par_iter()
            .map(|raw| self.convert_raw(raw))
            .collect();

        let mut report = ConversionReport::default();
        for result in results {
            match result {
                Ok(workout) => {
                    for warning in &workout.warnings {
                        tracing::warn!("{}: {}", workout.document.name, warning);
                    }
                    report.workouts.push(workout);
                }
                Err(error) => {
                    tracing::warn!("Skipping row: {}", error);
                    report.failures.push(error);
                }
            }
        }

        tracing::info!(
            "Converted {} of {} rows ({} warnings)",
            report.workouts.len(),
            table.rows.len(),
            report.warning_count()
        );
        report
    }

    fn workout_name(&self, row: &PlanRow) -> String {
        let prefix = self.config.output.prefix.trim();
        if prefix.is_empty() {
            row.title()
        } else {
            format!("{prefix} {}", row.title())
        }
    }
}

/// Write every converted workout into `dir`.
///
/// Rows that share a name (same week and day) get a numbered suffix, e.g.
/// `Week 8 Thursday (2).zwo`, so none is overwritten.
pub fn write_outputs(
    workouts: &[ConvertedWorkout],
    dir: &Path,
) -> Result<Vec<PathBuf>, ExportError> {
    std::fs::create_dir_all(dir).map_err(|e| ExportError::WriteFailed(e.to_string()))?;

    let mut used: HashSet<String> = HashSet::new();
    let mut written = Vec::with_capacity(workouts.len());
    for workout in workouts {
        let file_name = unique_file_name(workout, &mut used);
        let path = dir.join(file_name);
        std::fs::write(&path, &workout.rendered)
            .map_err(|e| ExportError::WriteFailed(format!("{}: {e}", path.display())))?;
        tracing::debug!("Wrote {}", path.display());
        written.push(path);
    }

    Ok(written)
}

/// File name not yet in `used`; repeats are numbered from 2.
fn unique_file_name(workout: &ConvertedWorkout, used: &mut HashSet<String>) -> String {
    let stem = sanitize_file_stem(&workout.document.name);
    let extension = workout.format.extension();

    let mut name = format!("{stem}.{extension}");
    let mut copy = 1;
    // Compared case-insensitively
    while !used.insert(name.to_lowercase()) {
        copy += 1;
        name = format!("{stem} ({copy}).{extension}");
    }

    if copy > 1 {
        tracing::warn!(
            "Duplicate workout name {}, writing {}",
            workout.document.name,
            name
        );
    }
    name
}

/// Replace characters that are not allowed in file names.
fn sanitize_file_stem(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c => c,
        })
        .collect()
}
