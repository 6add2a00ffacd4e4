//! # Table Extraction Module
//!
//! ## Purpose
//! Parses one page of the portal's search result markup into structured docket
//! records, filtering by court type and docket identifier shape.
//!
//! ## Input/Output Specification
//! - **Input**: Raw HTML of one county's search results
//! - **Output**: Qualifying [`DocketRecord`]s in input row order, deduplicated
//!   within the page
//! - **Failure**: A missing results table, or a retained row whose cells or
//!   dates do not match the assumed layout, is `ScrapeError::Extraction`
//!   (structural, never retried)
//!
//! ## Page structure (bit-exact, must be preserved)
//! - Results table: a `tbody` inside `div.table-wrapper`; rows are its `tr`s
//! - Cell positions: [2]=docket id, [3]=court, [4]=caption, [5]=status,
//!   [6]=filing date, [7]=participants, [8]=dob, [9]=county, [10]=court
//!   office, [13]=police incident no
//! - Detail link: `href` of the anchor in the 19th cell's first child `div`
//! - Dates arrive as `MM/DD/YYYY`
//!
//! Rows failing the court-type or identifier-shape test are silently skipped;
//! they are other court levels or pager artifacts, not errors.

use crate::errors::{Result, ScrapeError};
use crate::{DocketRecord, MAGISTERIAL_DISTRICT};
use chrono::NaiveDate;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use tracing::{debug, info};

const TABLE_SELECTOR: &str = "div.table-wrapper tbody";
const ROW_SELECTOR: &str = "tr";
const CELL_SELECTOR: &str = "td";
const DETAIL_LINK_SELECTOR: &str = "td:nth-child(19) div:nth-child(1) a";

/// Criminal docket number shape: two letters, 4-6 digits, literal CR,
/// 4-8 digits, 4 digits.
const DOCKET_ID_PATTERN: &str = r"[A-Z]{2}-\d{4,6}-CR-\d{4,8}-\d{4}";

const COL_DOCKET_ID: usize = 2;
const COL_COURT: usize = 3;
const COL_CAPTION: usize = 4;
const COL_STATUS: usize = 5;
const COL_FILING_DATE: usize = 6;
const COL_PARTICIPANTS: usize = 7;
const COL_DOB: usize = 8;
const COL_COUNTY: usize = 9;
const COL_COURT_OFFICE: usize = 10;
const COL_POLICE_INCIDENT_NO: usize = 13;

const SOURCE_DATE_FORMAT: &str = "%m/%d/%Y";

/// Extracts qualifying docket rows from one page of result markup
pub struct TableExtractor {
    origin: String,
    table: Selector,
    row: Selector,
    cell: Selector,
    detail_link: Selector,
    docket_id: Regex,
}

impl TableExtractor {
    /// Create an extractor; `origin` is prefixed onto relative detail links.
    pub fn new(origin: impl Into<String>) -> Result<Self> {
        Ok(Self {
            origin: origin.into(),
            table: parse_selector(TABLE_SELECTOR)?,
            row: parse_selector(ROW_SELECTOR)?,
            cell: parse_selector(CELL_SELECTOR)?,
            detail_link: parse_selector(DETAIL_LINK_SELECTOR)?,
            docket_id: Regex::new(DOCKET_ID_PATTERN).map_err(|e| ScrapeError::Internal {
                message: format!("invalid docket id pattern: {}", e),
            })?,
        })
    }

    /// Extract all qualifying rows from one page of markup. Cross-county
    /// deduplication is the merger's responsibility; this only removes
    /// repeats within the page, keeping the first occurrence.
    pub fn extract(&self, markup: &str) -> Result<Vec<DocketRecord>> {
        let document = Html::parse_document(markup);
        let table = document
            .select(&self.table)
            .next()
            .ok_or_else(|| ScrapeError::Extraction {
                details: format!("results table '{}' not found in markup", TABLE_SELECTOR),
            })?;

        let mut records = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut total_rows = 0usize;

        for row in table.select(&self.row) {
            total_rows += 1;
            let cells: Vec<ElementRef> = row.select(&self.cell).collect();

            // Placeholder rows (e.g. "No Results Found") carry too few cells
            // to even hold the identifier and court columns.
            if cells.len() <= COL_COURT {
                continue;
            }

            let docket_id = cell_text(&cells[COL_DOCKET_ID]);
            let court = cell_text(&cells[COL_COURT]);
            if court != MAGISTERIAL_DISTRICT || !self.docket_id.is_match(&docket_id) {
                continue;
            }

            if !seen.insert(docket_id.clone()) {
                debug!(%docket_id, "duplicate docket id within page, keeping first");
                continue;
            }

            records.push(self.extract_row(&row, &cells, docket_id, court)?);
        }

        info!(
            total_rows,
            dockets = records.len(),
            "extracted criminal dockets from results page"
        );
        Ok(records)
    }

    /// Read the remaining fixed-position cells of a retained row. Any missing
    /// cell, missing detail link, or malformed date means the assumed layout
    /// shifted, which fails the page the same way a missing table does.
    fn extract_row(
        &self,
        row: &ElementRef,
        cells: &[ElementRef],
        docket_id: String,
        court: String,
    ) -> Result<DocketRecord> {
        let relative_url = row
            .select(&self.detail_link)
            .next()
            .and_then(|anchor| anchor.value().attr("href"))
            .ok_or_else(|| ScrapeError::Extraction {
                details: format!("docket {}: detail link not found", docket_id),
            })?;

        Ok(DocketRecord {
            caption: require_cell(cells, COL_CAPTION, &docket_id)?,
            status: require_cell(cells, COL_STATUS, &docket_id)?,
            filing_date: parse_source_date(
                &require_cell(cells, COL_FILING_DATE, &docket_id)?,
                "filing date",
                &docket_id,
            )?,
            primary_participants: require_cell(cells, COL_PARTICIPANTS, &docket_id)?,
            dob: parse_source_date(
                &require_cell(cells, COL_DOB, &docket_id)?,
                "date of birth",
                &docket_id,
            )?,
            county: require_cell(cells, COL_COUNTY, &docket_id)?,
            court_office: require_cell(cells, COL_COURT_OFFICE, &docket_id)?,
            police_incident_no: require_cell(cells, COL_POLICE_INCIDENT_NO, &docket_id)?,
            docket_url: format!("{}{}", self.origin, relative_url),
            docket_id,
            court,
        })
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|_| ScrapeError::Internal {
        message: format!("invalid selector: {}", selector),
    })
}

fn cell_text(cell: &ElementRef) -> String {
    cell.text().collect::<String>().trim().to_string()
}

fn require_cell(cells: &[ElementRef], index: usize, docket_id: &str) -> Result<String> {
    cells
        .get(index)
        .map(cell_text)
        .ok_or_else(|| ScrapeError::Extraction {
            details: format!("docket {}: cell {} missing from row", docket_id, index),
        })
}

/// Normalize the portal's `MM/DD/YYYY` date text. Malformed text fails the
/// row rather than producing a record with an unparsed date.
fn parse_source_date(text: &str, field: &str, docket_id: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text, SOURCE_DATE_FORMAT).map_err(|_| ScrapeError::Extraction {
        details: format!("docket {}: cannot parse {} '{}'", docket_id, field, text),
    })
}
