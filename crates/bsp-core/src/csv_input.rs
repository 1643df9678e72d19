// ── CSV to input-file conversion ──
//
// Reads a header-first CSV export (columns `siteName`, `enterpriseUnitName`,
// `userName`, `coordinates`, `address`, `status`) into an `InputFile`.
// Columns may appear in any order; unknown columns are ignored and empty
// cells become absent fields. `coordinates` and `address` cells hold JSON
// objects.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use bsp_api::{Address, Coordinates, SiteStatus};

use crate::error::CoreError;
use crate::model::{InputFile, SiteInput};
use crate::store::write_json;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CsvRow {
    #[serde(default)]
    site_name: Option<String>,
    #[serde(default)]
    enterprise_unit_name: Option<String>,
    #[serde(default)]
    user_name: Option<String>,
    #[serde(default)]
    coordinates: Option<String>,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

/// Parse CSV text into an input file. Every row must carry a `siteName`.
pub fn parse_csv<R: Read>(reader: R) -> Result<InputFile, CoreError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = reader.headers()?.clone();

    let mut sites = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map_or(0, csv::Position::line);
        if record.iter().all(str::is_empty) {
            continue;
        }

        let row: CsvRow = record
            .deserialize(Some(&headers))
            .map_err(|e| CoreError::InvalidRow {
                line,
                reason: e.to_string(),
            })?;
        sites.push(convert_row(row, line)?);
    }

    Ok(InputFile { sites })
}

fn convert_row(row: CsvRow, line: u64) -> Result<SiteInput, CoreError> {
    let site_name = non_empty(row.site_name).ok_or_else(|| CoreError::InvalidRow {
        line,
        reason: "missing siteName".into(),
    })?;

    let status = non_empty(row.status)
        .map(|raw| {
            raw.parse::<SiteStatus>().map_err(|_| CoreError::InvalidRow {
                line,
                reason: format!("invalid status '{raw}' (expected ACTIVE or INACTIVE)"),
            })
        })
        .transpose()?;

    Ok(SiteInput {
        site_name,
        eu_name: non_empty(row.enterprise_unit_name),
        user_name: non_empty(row.user_name),
        coordinates: json_cell::<Coordinates>(row.coordinates, "coordinates", line)?,
        address: json_cell::<Address>(row.address, "address", line)?,
        status,
    })
}

fn non_empty(cell: Option<String>) -> Option<String> {
    cell.filter(|value| !value.is_empty())
}

fn json_cell<T: DeserializeOwned>(
    cell: Option<String>,
    column: &str,
    line: u64,
) -> Result<Option<T>, CoreError> {
    non_empty(cell)
        .map(|raw| {
            serde_json::from_str(&raw).map_err(|e| CoreError::InvalidRow {
                line,
                reason: format!("invalid {column}: {e}"),
            })
        })
        .transpose()
}

/// Convert `csv_path` into an input file at `out_path`. Returns the number
/// of sites written; a CSV with no data rows is an error.
pub fn convert_csv_file(csv_path: &Path, out_path: &Path) -> Result<usize, CoreError> {
    if !csv_path.exists() {
        return Err(CoreError::MissingFile {
            path: csv_path.to_path_buf(),
        });
    }
    debug!(path = %csv_path.display(), "reading CSV");
    let file = std::fs::File::open(csv_path).map_err(|e| CoreError::io(csv_path, e))?;
    let input = parse_csv(file)?;
    if input.sites.is_empty() {
        return Err(CoreError::EmptyInput {
            path: csv_path.to_path_buf(),
        });
    }

    write_json(out_path, &input)?;
    info!(sites = input.sites.len(), path = %out_path.display(), "wrote input file");
    Ok(input.sites.len())
}
