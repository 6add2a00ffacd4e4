//! # Output Writers Module
//!
//! ## Purpose
//! Serializes the final docket set to JSON and CSV files for downstream
//! consumers.
//!
//! ## Input/Output Specification
//! - **Input**: The merged, ordered record set and an output directory
//! - **Output**: `dockets.json` (pretty-printed) and `dockets.csv`
//! - **Contract**: No files are written when the record set is empty

use crate::errors::Result;
use crate::DocketRecord;
use std::path::{Path, PathBuf};
use tracing::info;

const JSON_FILE: &str = "dockets.json";
const CSV_FILE: &str = "dockets.csv";

/// CSV header matching the JSON field names, in record field order
const CSV_HEADER: &str = "docketId,court,caption,status,filingDate,primaryParticipants,dob,county,courtOffice,policeIncidentNo,docketUrl";

const ISO_DATE: &str = "%Y-%m-%d";

/// Write the record set as JSON and CSV into `dir`, returning the paths
/// written. An empty record set writes nothing.
pub fn write_outputs(records: &[DocketRecord], dir: &Path) -> Result<Vec<PathBuf>> {
    if records.is_empty() {
        info!("no dockets found, skipping output files");
        return Ok(Vec::new());
    }

    let json_path = dir.join(JSON_FILE);
    std::fs::write(&json_path, serde_json::to_string_pretty(records)?)?;
    info!(path = %json_path.display(), "saved dockets as JSON");

    let csv_path = dir.join(CSV_FILE);
    std::fs::write(&csv_path, to_csv(records))?;
    info!(path = %csv_path.display(), "saved dockets as CSV");

    Ok(vec![json_path, csv_path])
}

fn to_csv(records: &[DocketRecord]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for record in records {
        let fields = [
            record.docket_id.as_str(),
            record.court.as_str(),
            record.caption.as_str(),
            record.status.as_str(),
            &record.filing_date.format(ISO_DATE).to_string(),
            record.primary_participants.as_str(),
            &record.dob.format(ISO_DATE).to_string(),
            record.county.as_str(),
            record.court_office.as_str(),
            record.police_incident_no.as_str(),
            record.docket_url.as_str(),
        ]
        .map(csv_field);
        out.push_str(&fields.join(","));
        out.push('\n');
    }
    out
}

/// Quote a field only when it contains the delimiter or a quote, doubling
/// embedded quotes.
fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
