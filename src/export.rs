//! CSV export of patient records.
//!
//! Columns are the properties of `PhenoTips.PatientClass` as declared by the
//! server, so the export follows whatever schema the server is configured
//! with.

use std::io::Write;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::client::PhenoTipsClient;
use crate::error::Result;
use crate::models::{ClassSchema, PropertyMap};

/// Where the exporter reads patient data from.
#[async_trait]
pub trait PatientSource {
    /// Schema that defines the exported columns.
    async fn patient_schema(&self) -> Result<ClassSchema>;

    /// Primary properties of one patient.
    async fn patient(&self, patient_id: &str) -> Result<PropertyMap>;
}

#[async_trait]
impl PatientSource for PhenoTipsClient {
    async fn patient_schema(&self) -> Result<ClassSchema> {
        self.list_patient_class_properties().await
    }

    async fn patient(&self, patient_id: &str) -> Result<PropertyMap> {
        self.get(patient_id).await
    }
}

/// Outcome of a finished export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportSummary {
    /// Number of patient rows written.
    pub exported: usize,
    pub elapsed: Duration,
}

/// Write one CSV row per patient, preceded by a header of property names.
///
/// `progress` is called with the number of patients handled so far, right
/// before each patient is fetched, so it sees `0..n-1`. The first failure
/// aborts the export; rows written before it stay in `out`.
pub async fn export_patients<S, W, F>(
    source: &S,
    patient_ids: &[String],
    out: W,
    mut progress: F,
) -> Result<ExportSummary>
where
    S: PatientSource + ?Sized,
    W: Write,
    F: FnMut(usize),
{
    let started = Instant::now();

    let schema = source.patient_schema().await?;
    let columns = schema.property_names();

    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(&columns)?;
    writer.flush()?;

    let mut exported = 0;
    for (index, patient_id) in patient_ids.iter().enumerate() {
        progress(index);

        let patient = source.patient(patient_id).await?;
        let row = columns
            .iter()
            .map(|column| patient.get(*column).map(String::as_str).unwrap_or_default());
        writer.write_record(row)?;
        // Keep completed rows visible if a later fetch fails
        writer.flush()?;
        exported += 1;
    }

    let summary = ExportSummary {
        exported,
        elapsed: started.elapsed(),
    };
    tracing::info!(exported, elapsed = ?summary.elapsed, "export finished");
    Ok(summary)
}

/// Format a duration as `H:MM:SS` with microseconds when non-zero.
///
/// ```
/// use std::time::Duration;
/// use phenotips::format_elapsed;
///
/// assert_eq!(format_elapsed(Duration::from_millis(83_500)), "0:01:23.500000");
/// assert_eq!(format_elapsed(Duration::from_secs(3_600)), "1:00:00");
/// ```
pub fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    let (hours, minutes, seconds) = (total / 3600, (total / 60) % 60, total % 60);
    let micros = elapsed.subsec_micros();
    if micros == 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{hours}:{minutes:02}:{seconds:02}.{micros:06}")
    }
}
