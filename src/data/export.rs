use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use super::loader::{LOWER, PASSING, RETAINED, SIEVE, TOTAL_WEIGHT, UPPER};
use crate::engine::error::ensure_len;
use crate::engine::{MaterialSpec, Sieve};

/// Clipboard text for a retained-weight column: one `{:.2}` value per line.
pub fn format_retained(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| format!("{v:.2}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn check_columns(spec: &MaterialSpec, passing: &[f64], retained: &[f64]) -> Result<()> {
    ensure_len("passing curve", spec.len(), passing.len())?;
    ensure_len("retained weights", spec.len(), retained.len())?;
    Ok(())
}

/// Write the full gradation table as CSV, using the importer's column names.
pub fn write_csv(
    path: &Path,
    spec: &MaterialSpec,
    passing: &[f64],
    retained: &[f64],
    total_weight: f64,
) -> Result<()> {
    check_columns(spec, passing, retained)?;
    let mut writer = csv::Writer::from_path(path).context("creating CSV file")?;
    writer
        .write_record([SIEVE, LOWER, UPPER, PASSING, RETAINED, TOTAL_WEIGHT])
        .context("writing CSV header")?;

    for i in 0..spec.len() {
        // Only the first row carries the total weight.
        let weight = if i == 0 {
            format!("{total_weight}")
        } else {
            String::new()
        };
        writer
            .write_record([
                spec.sieve_sizes()[i].to_string(),
                format!("{}", spec.lower_limits()[i]),
                format!("{}", spec.upper_limits()[i]),
                format!("{:.2}", passing[i]),
                format!("{:.2}", retained[i]),
                weight,
            ])
            .with_context(|| format!("writing CSV row {i}"))?;
    }
    writer.flush().context("flushing CSV file")?;
    Ok(())
}

/// Write the full gradation table in the loader's JSON object form.
pub fn write_json(
    path: &Path,
    spec: &MaterialSpec,
    passing: &[f64],
    retained: &[f64],
    total_weight: f64,
) -> Result<()> {
    check_columns(spec, passing, retained)?;
    let rows: Vec<serde_json::Value> = (0..spec.len())
        .map(|i| {
            let sieve = match spec.sieve_sizes()[i] {
                Sieve::Mesh(mm) => serde_json::json!(mm),
                Sieve::Pan => serde_json::json!("Pan"),
            };
            serde_json::json!({
                SIEVE: sieve,
                LOWER: spec.lower_limits()[i],
                UPPER: spec.upper_limits()[i],
                PASSING: passing[i],
                RETAINED: retained[i],
            })
        })
        .collect();
    let doc = serde_json::json!({
        "material": spec.name,
        TOTAL_WEIGHT: total_weight,
        "rows": rows,
    });
    let text = serde_json::to_string_pretty(&doc).context("serializing table")?;
    std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

/// Write the full gradation table as a single-batch Parquet file.
pub fn write_parquet(
    path: &Path,
    spec: &MaterialSpec,
    passing: &[f64],
    retained: &[f64],
    total_weight: f64,
) -> Result<()> {
    check_columns(spec, passing, retained)?;

    let sieve_array = StringArray::from(
        spec.sieve_sizes()
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>(),
    );

    let schema = Arc::new(Schema::new(vec![
        Field::new(SIEVE, DataType::Utf8, false),
        Field::new(LOWER, DataType::Float64, false),
        Field::new(UPPER, DataType::Float64, false),
        Field::new(PASSING, DataType::Float64, false),
        Field::new(RETAINED, DataType::Float64, false),
        Field::new(TOTAL_WEIGHT, DataType::Float64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(sieve_array),
            Arc::new(Float64Array::from(spec.lower_limits().to_vec())),
            Arc::new(Float64Array::from(spec.upper_limits().to_vec())),
            Arc::new(Float64Array::from(passing.to_vec())),
            Arc::new(Float64Array::from(retained.to_vec())),
            Arc::new(Float64Array::from(vec![total_weight; spec.len()])),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::load_file;
    use crate::engine::MaterialKind;

    #[test]
    fn clipboard_text_uses_two_decimals_per_line() {
        assert_eq!(format_retained(&[0.0, 250.0, 1234.567]), "0.00\n250.00\n1234.57");
        assert_eq!(format_retained(&[]), "");
    }

    #[test]
    fn exported_csv_reimports() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crm.csv");
        let spec = MaterialKind::Crm.spec();
        let passing = vec![100.0, 95.0, 45.0, 20.0, 3.5, 0.0];
        let retained = vec![0.0, 100.0, 1000.0, 500.0, 330.0, 70.0];

        write_csv(&path, &spec, &passing, &retained, 2000.0).unwrap();
        let sheet = load_file(&path).unwrap();

        assert_eq!(sheet.sieve_sizes.last(), Some(&Sieve::Pan));
        assert_eq!(sheet.passing, Some(passing));
        assert_eq!(sheet.retained, Some(retained));
        assert_eq!(sheet.upper.as_deref(), Some(spec.upper_limits()));
        assert_eq!(sheet.total_weight, Some(2000.0));
    }

    #[test]
    fn exported_json_reimports() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subbase.json");
        let spec = MaterialKind::SubBase.spec();
        let passing = spec.midpoint_curve();
        let retained = vec![1.0; spec.len()];

        write_json(&path, &spec, &passing, &retained, 5000.0).unwrap();
        let sheet = load_file(&path).unwrap();

        assert_eq!(sheet.sieve_sizes, spec.sieve_sizes());
        assert_eq!(sheet.passing, Some(passing));
        assert_eq!(sheet.lower.as_deref(), Some(spec.lower_limits()));
        assert_eq!(sheet.total_weight, Some(5000.0));
    }

    #[test]
    fn mismatched_columns_are_refused() {
        let dir = tempfile::tempdir().unwrap();
        let spec = MaterialKind::Fine.spec();
        let err = write_csv(&dir.path().join("x.csv"), &spec, &[1.0], &[1.0], 1.0);
        assert!(err.is_err());
    }
}
