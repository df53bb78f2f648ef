use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{
    Array, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array, LargeStringArray,
    StringArray,
};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{
    FIELD_A, FIELD_DEC, FIELD_KOI, FIELD_MSTAR, FIELD_PER, FIELD_RA, FIELD_RPLANET, FIELD_RSTAR,
    FIELD_TPLANET, FIELD_TSTAR, FieldValue, REQUIRED_FIELDS, RawRecord,
};

/// A row that cannot become a [`RawRecord`].
#[derive(Debug, Error, PartialEq)]
pub enum RecordError {
    #[error("row {row}: missing field '{field}'")]
    MissingField { row: usize, field: &'static str },
    #[error("row {row}: field '{field}' is not numeric: {value:?}")]
    NotNumeric {
        row: usize,
        field: &'static str,
        value: String,
    },
}

type Row = BTreeMap<String, FieldValue>;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load KOI records from a file. Dispatch by extension.
///
/// Supported formats:
/// * `.json`    – `[{ "KOI": 1.01, "A": 0.03, ... }, ...]`, the asterank
///   `kepler` API response saved to disk
/// * `.csv`     – header row with the field names
/// * `.parquet` – one flat column per field
///
/// Records with a non-positive (or missing) orbital period are dropped.
pub fn load_file(path: &Path) -> Result<Vec<RawRecord>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let rows = match ext.as_str() {
        "parquet" | "pq" => read_parquet(path)?,
        "json" => read_json(path)?,
        "csv" => read_csv(path)?,
        other => bail!("Unsupported file extension: .{other}"),
    };

    let records = rows_to_records(rows)?;
    let total = records.len();
    let records = retain_positive_period(records);
    log::info!(
        "Read {total} rows from {}, kept {} with a positive orbital period",
        path.display(),
        records.len()
    );
    Ok(records)
}

/// Keep only records whose orbital period is strictly positive.
pub fn retain_positive_period(mut records: Vec<RawRecord>) -> Vec<RawRecord> {
    records.retain(|r| r.per > 0.0);
    records
}

fn rows_to_records(rows: Vec<Row>) -> Result<Vec<RawRecord>> {
    rows.into_iter()
        .enumerate()
        .map(|(i, row)| record_from_row(i, row).map_err(anyhow::Error::from))
        .collect()
}

/// Split a flat row into the named fields and the passthrough columns.
pub fn record_from_row(row_no: usize, mut row: Row) -> Result<RawRecord, RecordError> {
    let mut take = |field: &'static str| -> Result<f64, RecordError> {
        let value = row
            .remove(field)
            .ok_or(RecordError::MissingField { row: row_no, field })?;
        numeric(row_no, field, &value)
    };

    let koi = take(FIELD_KOI)?;
    let record = RawRecord {
        koi: koi.is_finite().then(|| koi.trunc() as i64),
        a: take(FIELD_A)?,
        rplanet: take(FIELD_RPLANET)?,
        rstar: take(FIELD_RSTAR)?,
        tplanet: take(FIELD_TPLANET)?,
        mstar: take(FIELD_MSTAR)?,
        tstar: take(FIELD_TSTAR)?,
        ra: take(FIELD_RA)?,
        dec: take(FIELD_DEC)?,
        per: take(FIELD_PER)?,
        extra: BTreeMap::new(),
    };
    debug_assert!(REQUIRED_FIELDS.iter().all(|f| !row.contains_key(*f)));
    Ok(RawRecord { extra: row, ..record })
}

/// Numeric view of a required field. Nulls read as NaN so that they fall
/// outside every bin instead of rejecting the row.
fn numeric(row: usize, field: &'static str, value: &FieldValue) -> Result<f64, RecordError> {
    match value {
        FieldValue::Null => Ok(f64::NAN),
        FieldValue::String(s) => s.trim().parse::<f64>().map_err(|_| RecordError::NotNumeric {
            row,
            field,
            value: s.clone(),
        }),
        other => other.as_f64().ok_or_else(|| RecordError::NotNumeric {
            row,
            field,
            value: other.to_string(),
        }),
    }
}

// ---------------------------------------------------------------------------
// JSON reader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, as served by the asterank API):
///
/// ```json
/// [
///   { "KOI": 1.01, "A": 0.0367, "RPLANET": 13.04, "RSTAR": 1.04,
///     "TPLANET": 1339, "MSTAR": 1.02, "TSTAR": 5850, "RA": 286.808,
///     "DEC": 49.316, "PER": 2.470613, "KMAG": 10.44, "ROW": 1 },
///   ...
/// ]
/// ```
fn read_json(path: &Path) -> Result<Vec<Row>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    parse_json_rows(&text)
}

fn parse_json_rows(text: &str) -> Result<Vec<Row>> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    records
        .iter()
        .enumerate()
        .map(|(i, rec)| {
            let obj = rec
                .as_object()
                .with_context(|| format!("Row {i} is not a JSON object"))?;
            Ok(obj
                .iter()
                .map(|(key, val)| (key.clone(), json_to_field(val)))
                .collect())
        })
        .collect()
}

fn json_to_field(val: &JsonValue) -> FieldValue {
    match val {
        JsonValue::String(s) => FieldValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                FieldValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                FieldValue::Float(f)
            } else {
                FieldValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => FieldValue::Bool(*b),
        JsonValue::Null => FieldValue::Null,
        other => FieldValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one KOI per line.
/// Empty cells read as nulls.
fn read_csv(path: &Path) -> Result<Vec<Row>> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let row: Row = headers
            .iter()
            .zip(record.iter())
            .map(|(name, value)| (name.clone(), guess_field_type(value)))
            .collect();
        rows.push(row);
    }
    Ok(rows)
}

fn guess_field_type(s: &str) -> FieldValue {
    let s = s.trim();
    if s.is_empty() {
        return FieldValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return FieldValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return FieldValue::Float(f);
    }
    if s == "true" || s == "false" {
        return FieldValue::Bool(s == "true");
    }
    FieldValue::String(s.to_string())
}

// ---------------------------------------------------------------------------
// Parquet reader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one flat column per field.
///
/// Numeric columns may be Int32/Int64/Float32/Float64; string and boolean
/// columns are kept as passthrough values. Works with files written by
/// `df.to_parquet()` and by the bundled `generate_sample` tool.
fn read_parquet(path: &Path) -> Result<Vec<Row>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();
        let names: Vec<String> = schema.fields().iter().map(|f| f.name().clone()).collect();

        for row in 0..batch.num_rows() {
            let values: Row = names
                .iter()
                .enumerate()
                .map(|(col_idx, name)| (name.clone(), extract_field_value(batch.column(col_idx), row)))
                .collect();
            rows.push(values);
        }
    }

    Ok(rows)
}

/// Extract a single value from an Arrow column at a given row.
fn extract_field_value(col: &Arc<dyn Array>, row: usize) -> FieldValue {
    if col.is_null(row) {
        return FieldValue::Null;
    }
    let any = col.as_any();
    let value = match col.data_type() {
        DataType::Utf8 => any
            .downcast_ref::<StringArray>()
            .map(|a| FieldValue::String(a.value(row).to_string())),
        DataType::LargeUtf8 => any
            .downcast_ref::<LargeStringArray>()
            .map(|a| FieldValue::String(a.value(row).to_string())),
        DataType::Int32 => any
            .downcast_ref::<Int32Array>()
            .map(|a| FieldValue::Integer(a.value(row) as i64)),
        DataType::Int64 => any
            .downcast_ref::<Int64Array>()
            .map(|a| FieldValue::Integer(a.value(row))),
        DataType::Float32 => any
            .downcast_ref::<Float32Array>()
            .map(|a| FieldValue::Float(a.value(row) as f64)),
        DataType::Float64 => any
            .downcast_ref::<Float64Array>()
            .map(|a| FieldValue::Float(a.value(row))),
        DataType::Boolean => any
            .downcast_ref::<BooleanArray>()
            .map(|a| FieldValue::Bool(a.value(row))),
        _ => None,
    };
    value.unwrap_or_else(|| FieldValue::String(format!("{:?}", col.data_type())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;
    use std::path::PathBuf;

    const SAMPLE_JSON: &str = r#"[
        {"KOI": 1.01, "A": 0.0367, "RPLANET": 13.04, "RSTAR": 1.04, "TPLANET": 1339,
         "MSTAR": 1.02, "TSTAR": 5850, "RA": 286.808, "DEC": 49.316, "PER": 2.470613,
         "KMAG": 10.44, "ROW": 1},
        {"KOI": 7.02, "A": 1.0, "RPLANET": 1.1, "RSTAR": 0.7, "TPLANET": 260,
         "MSTAR": 0.8, "TSTAR": 4500, "RA": 290.0, "DEC": 41.2, "PER": 0,
         "KMAG": 12.0, "ROW": 2},
        {"KOI": 8.03, "A": 0.5, "RPLANET": 2.5, "RSTAR": 0.9, "TPLANET": null,
         "MSTAR": 0.9, "TSTAR": 5100, "RA": 291.0, "DEC": 40.0, "PER": 120.5,
         "KMAG": 13.1, "ROW": 3}
    ]"#;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("kepler-dash-{}-{name}", std::process::id()))
    }

    #[test]
    fn json_rows_become_records() {
        let rows = parse_json_rows(SAMPLE_JSON).expect("parse");
        let records = rows_to_records(rows).expect("records");
        assert_eq!(records.len(), 3);

        let first = &records[0];
        assert_eq!(first.koi, Some(1));
        assert_eq!(first.rplanet, 13.04);
        assert_eq!(first.tplanet, 1339.0);
        assert_eq!(first.extra.get("KMAG"), Some(&FieldValue::Float(10.44)));
        assert_eq!(first.extra.get("ROW"), Some(&FieldValue::Integer(1)));
        assert!(!first.extra.contains_key("RPLANET"));

        assert!(records[2].tplanet.is_nan());
    }

    #[test]
    fn non_positive_period_is_dropped() {
        let rows = parse_json_rows(SAMPLE_JSON).expect("parse");
        let records = retain_positive_period(rows_to_records(rows).expect("records"));
        let kois: Vec<Option<i64>> = records.iter().map(|r| r.koi).collect();
        assert_eq!(kois, vec![Some(1), Some(8)]);
    }

    #[test]
    fn missing_field_names_row_and_field() {
        let rows = parse_json_rows(r#"[{"KOI": 1, "A": 0.1}]"#).expect("parse");
        let err = record_from_row(0, rows.into_iter().next().expect("row")).expect_err("missing");
        assert_eq!(err, RecordError::MissingField { row: 0, field: FIELD_RPLANET });
    }

    #[test]
    fn non_numeric_field_is_rejected() {
        let mut row: Row = REQUIRED_FIELDS
            .iter()
            .map(|f| (f.to_string(), FieldValue::Float(1.0)))
            .collect();
        row.insert(FIELD_RSTAR.to_string(), FieldValue::String("big".to_string()));
        let err = record_from_row(4, row).expect_err("not numeric");
        assert!(matches!(err, RecordError::NotNumeric { row: 4, field: "RSTAR", .. }));
    }

    #[test]
    fn top_level_must_be_an_array() {
        assert!(parse_json_rows(r#"{"KOI": 1}"#).is_err());
    }

    #[test]
    fn loads_csv_file() {
        let path = temp_path("sample.csv");
        std::fs::write(
            &path,
            "KOI,A,RPLANET,RSTAR,TPLANET,MSTAR,TSTAR,RA,DEC,PER,KMAG\n\
             2.01,0.04,16.4,1.99,2025,1.39,6350,292.2,47.97,2.2047,10.46\n\
             3.01,0.05,4.8,0.75,801,0.83,4777,297.0,48.08,-1,\n",
        )
        .expect("write");
        let records = load_file(&path).expect("load");
        std::fs::remove_file(&path).ok();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].koi, Some(2));
        assert_eq!(records[0].rstar, 1.99);
        assert_eq!(records[0].extra.get("KMAG"), Some(&FieldValue::Float(10.46)));
    }

    #[test]
    fn loads_parquet_file() {
        let path = temp_path("sample.parquet");
        let float_cols = [
            (FIELD_KOI, vec![5.01, 6.02]),
            (FIELD_A, vec![0.9, 0.1]),
            (FIELD_RPLANET, vec![1.2, 3.4]),
            (FIELD_RSTAR, vec![0.95, 1.5]),
            (FIELD_TPLANET, vec![280.0, 900.0]),
            (FIELD_MSTAR, vec![1.0, 1.3]),
            (FIELD_TSTAR, vec![5600.0, 6400.0]),
            (FIELD_RA, vec![285.0, 295.0]),
            (FIELD_DEC, vec![39.0, 46.0]),
            (FIELD_PER, vec![300.0, 12.0]),
        ];
        let mut fields: Vec<Field> = float_cols
            .iter()
            .map(|(name, _)| Field::new(*name, DataType::Float64, false))
            .collect();
        fields.push(Field::new("ROW", DataType::Int64, false));
        let mut columns: Vec<Arc<dyn Array>> = float_cols
            .iter()
            .map(|(_, values)| Arc::new(Float64Array::from(values.clone())) as Arc<dyn Array>)
            .collect();
        columns.push(Arc::new(Int64Array::from(vec![1_i64, 2])));

        let schema = Arc::new(Schema::new(fields));
        let batch = RecordBatch::try_new(schema.clone(), columns).expect("batch");
        let file = std::fs::File::create(&path).expect("create");
        let mut writer = ArrowWriter::try_new(file, schema, None).expect("writer");
        writer.write(&batch).expect("write");
        writer.close().expect("close");

        let records = load_file(&path).expect("load");
        std::fs::remove_file(&path).ok();

        assert_eq!(records.len(), 2);
        assert_eq!(records[1].koi, Some(6));
        assert_eq!(records[1].tplanet, 900.0);
        assert_eq!(records[0].extra.get("ROW"), Some(&FieldValue::Integer(1)));
    }

    #[test]
    fn rejects_unknown_extension() {
        assert!(load_file(Path::new("planets.xlsx")).is_err());
    }
}
