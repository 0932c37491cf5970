use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, AsArray, Float32Array, Float64Array, Int32Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::{Map as JsonMap, Value as JsonValue};

use super::model::GradationSheet;
use crate::engine::{parse_number, Sieve};

// Column names shared by every format. CSV headers, JSON keys and Parquet
// field names all match them case-insensitively.
pub const SIEVE: &str = "sieve";
pub const PASSING: &str = "passing";
pub const RETAINED: &str = "retained";
pub const LOWER: &str = "lower";
pub const UPPER: &str = "upper";
pub const TOTAL_WEIGHT: &str = "total_weight";

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a gradation table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row; `sieve` plus `passing` and/or `retained`,
///   optional `lower`, `upper`, `total_weight`
/// * `.json`    – `[{ "sieve": 4.75, "passing": 95.0, ... }, ...]` or
///   `{ "total_weight": 2000, "rows": [...] }`
/// * `.parquet` – same column names as CSV
pub fn load_file(path: &Path) -> Result<GradationSheet> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let sheet = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        "csv" => load_csv(path),
        other => bail!("Unsupported file extension: .{other}"),
    }?;

    if sheet.is_empty() {
        bail!("{} contains no sieve rows", path.display());
    }
    if sheet.passing.is_none() && sheet.retained.is_none() {
        bail!("{} has neither a '{PASSING}' nor a '{RETAINED}' column", path.display());
    }
    sheet.validate()?;
    Ok(sheet)
}

/// Accumulates rows into a sheet; a column exists iff its first row had it.
struct SheetBuilder {
    sheet: GradationSheet,
}

impl SheetBuilder {
    fn with_columns(passing: bool, retained: bool, lower: bool, upper: bool) -> Self {
        let col = |present: bool| present.then(Vec::new);
        SheetBuilder {
            sheet: GradationSheet {
                passing: col(passing),
                retained: col(retained),
                lower: col(lower),
                upper: col(upper),
                ..Default::default()
            },
        }
    }

    fn push_sieve(&mut self, sieve: Sieve) {
        self.sheet.sieve_sizes.push(sieve);
    }

    /// Push a cell into an optional column, requiring a value if the column exists.
    fn push(
        column: &mut Option<Vec<f64>>,
        value: Option<f64>,
        row: usize,
        name: &str,
    ) -> Result<()> {
        if let Some(values) = column {
            let v = value.with_context(|| format!("Row {row}: missing '{name}' value"))?;
            values.push(v);
        }
        Ok(())
    }

    fn push_total_weight(&mut self, value: Option<f64>) {
        if self.sheet.total_weight.is_none() {
            self.sheet.total_weight = value.filter(|w| *w > 0.0);
        }
    }

    fn finish(self) -> GradationSheet {
        self.sheet
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one row per sieve, largest
/// sieve first. Empty `total_weight` cells are ignored.
fn load_csv(path: &Path) -> Result<GradationSheet> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_ascii_lowercase())
        .collect();

    let find = |name: &str| headers.iter().position(|h| h == name);
    let sieve_idx = find(SIEVE).context("CSV missing 'sieve' column")?;
    let passing_idx = find(PASSING);
    let retained_idx = find(RETAINED);
    let lower_idx = find(LOWER);
    let upper_idx = find(UPPER);
    let weight_idx = find(TOTAL_WEIGHT);

    let mut builder = SheetBuilder::with_columns(
        passing_idx.is_some(),
        retained_idx.is_some(),
        lower_idx.is_some(),
        upper_idx.is_some(),
    );

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;

        let cell = |idx: Option<usize>, col: &str| -> Result<Option<f64>> {
            match idx.and_then(|i| record.get(i)).map(str::trim) {
                None | Some("") => Ok(None),
                Some(tok) => parse_number(tok)
                    .map(Some)
                    .with_context(|| format!("Row {row_no}, {col}: '{tok}' is not a number")),
            }
        };

        let sieve_text = record.get(sieve_idx).unwrap_or("");
        let sieve = sieve_text
            .parse::<Sieve>()
            .with_context(|| format!("Row {row_no}: '{sieve_text}' is not a sieve size"))?;
        builder.push_sieve(sieve);

        SheetBuilder::push(&mut builder.sheet.passing, cell(passing_idx, PASSING)?, row_no, PASSING)?;
        SheetBuilder::push(&mut builder.sheet.retained, cell(retained_idx, RETAINED)?, row_no, RETAINED)?;
        SheetBuilder::push(&mut builder.sheet.lower, cell(lower_idx, LOWER)?, row_no, LOWER)?;
        SheetBuilder::push(&mut builder.sheet.upper, cell(upper_idx, UPPER)?, row_no, UPPER)?;
        builder.push_total_weight(cell(weight_idx, TOTAL_WEIGHT)?);
    }

    Ok(builder.finish())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented):
///
/// ```json
/// {
///   "total_weight": 2000,
///   "rows": [
///     { "sieve": 4.75,  "passing": 96.0, "lower": 90, "upper": 100 },
///     { "sieve": "Pan", "passing": 0.0,  "lower": 0,  "upper": 0 }
///   ]
/// }
/// ```
///
/// A bare array of rows is accepted too.
fn load_json(path: &Path) -> Result<GradationSheet> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let (records, total_weight) = match root {
        JsonValue::Array(rows) => (rows, None),
        JsonValue::Object(obj) => {
            let mut obj = lowercase_keys(obj);
            let total_weight = obj.get(TOTAL_WEIGHT).and_then(|w| w.as_f64());
            match obj.remove("rows") {
                Some(JsonValue::Array(rows)) => (rows, total_weight),
                _ => bail!("Expected a 'rows' array"),
            }
        }
        _ => bail!("Expected top-level JSON array or object"),
    };

    let records = records
        .into_iter()
        .enumerate()
        .map(|(i, rec)| match rec {
            JsonValue::Object(obj) => Ok(lowercase_keys(obj)),
            _ => Err(anyhow::anyhow!("Row {i} is not a JSON object")),
        })
        .collect::<Result<Vec<_>>>()?;

    let first = records.first().context("JSON table has no rows")?;
    let mut builder = SheetBuilder::with_columns(
        first.contains_key(PASSING),
        first.contains_key(RETAINED),
        first.contains_key(LOWER),
        first.contains_key(UPPER),
    );
    builder.push_total_weight(total_weight);

    for (i, obj) in records.iter().enumerate() {
        let sieve = json_to_sieve(obj.get(SIEVE), i)?;
        builder.push_sieve(sieve);

        let num = |key: &str| -> Result<Option<f64>> {
            match obj.get(key) {
                None | Some(JsonValue::Null) => Ok(None),
                Some(v) => v
                    .as_f64()
                    .map(Some)
                    .with_context(|| format!("Row {i}, {key}: not a number")),
            }
        };

        SheetBuilder::push(&mut builder.sheet.passing, num(PASSING)?, i, PASSING)?;
        SheetBuilder::push(&mut builder.sheet.retained, num(RETAINED)?, i, RETAINED)?;
        SheetBuilder::push(&mut builder.sheet.lower, num(LOWER)?, i, LOWER)?;
        SheetBuilder::push(&mut builder.sheet.upper, num(UPPER)?, i, UPPER)?;
        builder.push_total_weight(num(TOTAL_WEIGHT)?);
    }

    Ok(builder.finish())
}

/// Keys are lowercased so column names match case-insensitively.
fn lowercase_keys(obj: JsonMap<String, JsonValue>) -> JsonMap<String, JsonValue> {
    obj.into_iter()
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v))
        .collect()
}

fn json_to_sieve(val: Option<&JsonValue>, row: usize) -> Result<Sieve> {
    match val {
        Some(JsonValue::Number(n)) => n
            .as_f64()
            .map(Sieve::Mesh)
            .with_context(|| format!("Row {row}: sieve out of range")),
        Some(JsonValue::String(s)) => s
            .parse()
            .with_context(|| format!("Row {row}: '{s}' is not a sieve size")),
        _ => bail!("Row {row}: missing or invalid 'sieve'"),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file containing a gradation table.
///
/// Expected schema:
/// - `sieve`: Utf8 (`"4.75"`, `"Pan"`) or a numeric column (pan as null)
/// - `passing`, `retained`, `lower`, `upper`, `total_weight`: numeric
///   (Float64, Float32, Int64 or Int32); all but `sieve` optional
fn load_parquet(path: &Path) -> Result<GradationSheet> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;

    let schema = builder.schema().clone();
    let has = |name: &str| field_index(&schema, name).is_some();
    let mut rows = SheetBuilder::with_columns(has(PASSING), has(RETAINED), has(LOWER), has(UPPER));

    let reader = builder.build().context("building parquet reader")?;
    let mut row_offset = 0;

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let sieve_col = column(&batch, SIEVE).context("Parquet file missing 'sieve' column")?;

        for row in 0..batch.num_rows() {
            let row_no = row_offset + row;
            let sieve = extract_sieve(sieve_col, row)
                .with_context(|| format!("Row {row_no}: failed to read 'sieve'"))?;
            rows.push_sieve(sieve);

            let num = |name: &str| -> Result<Option<f64>> {
                match column(&batch, name) {
                    Some(col) => extract_f64(col, row)
                        .with_context(|| format!("Row {row_no}: failed to read '{name}'")),
                    None => Ok(None),
                }
            };

            SheetBuilder::push(&mut rows.sheet.passing, num(PASSING)?, row_no, PASSING)?;
            SheetBuilder::push(&mut rows.sheet.retained, num(RETAINED)?, row_no, RETAINED)?;
            SheetBuilder::push(&mut rows.sheet.lower, num(LOWER)?, row_no, LOWER)?;
            SheetBuilder::push(&mut rows.sheet.upper, num(UPPER)?, row_no, UPPER)?;
            rows.push_total_weight(num(TOTAL_WEIGHT)?);
        }
        row_offset += batch.num_rows();
    }

    Ok(rows.finish())
}

// -- Parquet / Arrow helpers --

/// Position of the field called `name`, ignoring ASCII case.
fn field_index(schema: &Schema, name: &str) -> Option<usize> {
    schema
        .fields()
        .iter()
        .position(|f| f.name().trim().eq_ignore_ascii_case(name))
}

fn column<'a>(batch: &'a RecordBatch, name: &str) -> Option<&'a Arc<dyn Array>> {
    let idx = field_index(&batch.schema(), name)?;
    Some(batch.column(idx))
}

/// Read one numeric cell as `f64`; `None` for a null cell.
fn extract_f64(col: &Arc<dyn Array>, row: usize) -> Result<Option<f64>> {
    if col.is_null(row) {
        return Ok(None);
    }
    let any = col.as_any();
    let value = match col.data_type() {
        DataType::Float64 => any.downcast_ref::<Float64Array>().map(|a| a.value(row)),
        DataType::Float32 => any.downcast_ref::<Float32Array>().map(|a| a.value(row) as f64),
        DataType::Int64 => any.downcast_ref::<Int64Array>().map(|a| a.value(row) as f64),
        DataType::Int32 => any.downcast_ref::<Int32Array>().map(|a| a.value(row) as f64),
        other => bail!("Expected a numeric column, got {other:?}"),
    };
    value.map(Some).context("column type does not match its array")
}

/// Read a sieve label from a string or numeric column; a numeric null is the pan.
fn extract_sieve(col: &Arc<dyn Array>, row: usize) -> Result<Sieve> {
    match col.data_type() {
        DataType::Utf8 | DataType::LargeUtf8 => {
            if col.is_null(row) {
                bail!("null sieve label");
            }
            let text = if let Some(s) = col.as_any().downcast_ref::<StringArray>() {
                s.value(row).to_string()
            } else {
                col.as_string::<i64>().value(row).to_string()
            };
            Ok(text.parse()?)
        }
        _ => Ok(extract_f64(col, row)?.map_or(Sieve::Pan, Sieve::Mesh)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn loads_full_csv_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "fine.csv",
            "Sieve,Lower,Upper,Passing,Retained,Total_Weight\n\
             10,100,100,100,0,2000\n\
             4.75,90,100,96,80,\n\
             2.36,75,100,85,220,\n\
             Pan,0,0,0,1700,\n",
        );
        let sheet = load_file(&path).unwrap();
        assert_eq!(sheet.sieve_sizes, vec![
            Sieve::Mesh(10.0),
            Sieve::Mesh(4.75),
            Sieve::Mesh(2.36),
            Sieve::Pan
        ]);
        assert_eq!(sheet.passing, Some(vec![100.0, 96.0, 85.0, 0.0]));
        assert_eq!(sheet.retained, Some(vec![0.0, 80.0, 220.0, 1700.0]));
        assert_eq!(sheet.lower.as_ref().map(Vec::len), Some(4));
        assert_eq!(sheet.total_weight, Some(2000.0));
    }

    #[test]
    fn csv_with_only_retained_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "w.csv", "sieve,retained\n4.75,10\npan,90\n");
        let sheet = load_file(&path).unwrap();
        assert!(sheet.passing.is_none());
        assert_eq!(sheet.effective_total_weight(), Some(100.0));
    }

    #[test]
    fn csv_without_curve_columns_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "limits.csv", "sieve,lower,upper\n4.75,90,100\nPan,0,0\n");
        let err = load_file(&path).unwrap_err();
        assert!(format!("{err:#}").contains("neither"));
    }

    #[test]
    fn csv_bad_number_names_the_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "bad.csv", "sieve,passing\n4.75,ninety\nPan,0\n");
        let err = format!("{:#}", load_file(&path).unwrap_err());
        assert!(err.contains("Row 0"), "{err}");
        assert!(err.contains("ninety"), "{err}");
    }

    #[test]
    fn csv_missing_cell_in_present_column_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "gap.csv", "sieve,passing,lower\n4.75,95,\nPan,0,0\n");
        assert!(load_file(&path).is_err());
    }

    #[test]
    fn loads_json_object_form() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "coarse.json",
            r#"{
                "total_weight": 5000,
                "rows": [
                    {"sieve": 40, "passing": 100, "lower": 100, "upper": 100},
                    {"sieve": 20, "passing": 94, "lower": 90, "upper": 100},
                    {"sieve": "Pan", "passing": 0, "lower": 0, "upper": 0}
                ]
            }"#,
        );
        let sheet = load_file(&path).unwrap();
        assert_eq!(sheet.len(), 3);
        assert_eq!(sheet.sieve_sizes[2], Sieve::Pan);
        assert_eq!(sheet.total_weight, Some(5000.0));
        assert_eq!(sheet.upper, Some(vec![100.0, 100.0, 0.0]));
    }

    #[test]
    fn loads_json_array_form() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "rows.json",
            r#"[{"sieve": 4.75, "retained": 5}, {"sieve": "pan", "retained": 15}]"#,
        );
        let sheet = load_file(&path).unwrap();
        assert_eq!(sheet.retained, Some(vec![5.0, 15.0]));
        assert!(sheet.total_weight.is_none());
    }

    #[test]
    fn json_keys_match_case_insensitively() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "upper.json",
            r#"{"Total_Weight": 800, "Rows": [{"Sieve": 4.75, "PASSING": 90}, {"SIEVE": "Pan", "Passing": 0}]}"#,
        );
        let sheet = load_file(&path).unwrap();
        assert_eq!(sheet.passing, Some(vec![90.0, 0.0]));
        assert_eq!(sheet.sieve_sizes, vec![Sieve::Mesh(4.75), Sieve::Pan]);
        assert_eq!(sheet.total_weight, Some(800.0));
    }

    #[test]
    fn negative_retained_mass_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "neg.csv", "sieve,retained
10,-500
4.75,1500
Pan,2000
");
        let err = format!("{:#}", load_file(&path).unwrap_err());
        assert!(err.contains("retained column, row 0"), "{err}");
        assert!(err.contains("-500"), "{err}");
    }

    #[test]
    fn passing_above_hundred_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "over.json",
            r#"[{"sieve": 10, "passing": 116.7}, {"sieve": "Pan", "passing": 0}]"#,
        );
        let err = format!("{:#}", load_file(&path).unwrap_err());
        assert!(err.contains("passing column, row 0"), "{err}");
    }

    #[test]
    fn unsupported_extension() {
        let err = load_file(Path::new("table.xlsx")).unwrap_err();
        assert!(err.to_string().contains(".xlsx"));
    }

    #[test]
    fn parquet_round_trips_through_writer() {
        use crate::data::export::write_parquet;
        use crate::engine::{GradationEngine, MaterialKind, TotalWeightManager};

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fine.parquet");
        let spec = MaterialKind::Fine.spec();
        let passing = spec.midpoint_curve();
        let engine = GradationEngine::new(TotalWeightManager::new(2000.0));
        let retained = engine.passing_to_retained(&passing);

        write_parquet(&path, &spec, &passing, &retained, 2000.0).unwrap();
        let sheet = load_file(&path).unwrap();

        assert_eq!(sheet.sieve_sizes, spec.sieve_sizes());
        assert_eq!(sheet.passing, Some(passing));
        assert_eq!(sheet.retained, Some(retained));
        assert_eq!(sheet.lower.as_deref(), Some(spec.lower_limits()));
        assert_eq!(sheet.total_weight, Some(2000.0));
    }
}
