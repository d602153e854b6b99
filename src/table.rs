//! Flat, one-row-per-municipality Parquet snapshot of a written master.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use itertools::Itertools;
use parquet::arrow::arrow_writer::ArrowWriter;
use parquet::file::properties::WriterProperties;

use crate::error::{Error, Result};
use crate::schema::Master;

#[derive(Debug, Clone, PartialEq)]
pub struct MunicipalityRow {
    pub prefecture_code: String,
    pub prefecture_name: String,
    pub city_code: String,
    pub city_name: String,
    pub city_type: String,
    pub population: i64,
    pub medical_facilities: i64,
    pub facilities_per_10000: f64,
}

/// Rows in master traversal order: prefectures, then their cities.
pub fn municipality_rows(master: &Master) -> Vec<MunicipalityRow> {
    master
        .regions
        .iter()
        .flat_map(|(pref_code, prefecture)| {
            prefecture.cities.iter().map(move |(city_code, city)| MunicipalityRow {
                prefecture_code: pref_code.clone(),
                prefecture_name: prefecture.name.clone(),
                city_code: city_code.clone(),
                city_name: city.name.clone(),
                city_type: city.kind.as_str().to_string(),
                population: city.fallback_data.population,
                medical_facilities: city.fallback_data.medical_facilities,
                facilities_per_10000: city.fallback_data.facilities_per_10000.as_f64().unwrap_or(0.0),
            })
        })
        .collect_vec()
}

pub fn table_schema() -> Schema {
    Schema::new(vec![
        Field::new("prefecture_code", DataType::Utf8, false),
        Field::new("prefecture_name", DataType::Utf8, false),
        Field::new("city_code", DataType::Utf8, false),
        Field::new("city_name", DataType::Utf8, false),
        Field::new("city_type", DataType::Utf8, false),
        Field::new("population", DataType::Int64, false),
        Field::new("medical_facilities", DataType::Int64, false),
        Field::new("facilities_per_10000", DataType::Float64, false),
    ])
}

fn text_column<'a>(
    rows: &'a [MunicipalityRow],
    field: impl Fn(&'a MunicipalityRow) -> &'a str,
) -> ArrayRef {
    Arc::new(StringArray::from(rows.iter().map(field).collect_vec()))
}

pub fn to_record_batch(rows: &[MunicipalityRow]) -> Result<RecordBatch> {
    if rows.is_empty() {
        return Err(Error::invariant(String::from("no municipalities to export")));
    }
    let columns: Vec<ArrayRef> = vec![
        text_column(rows, |r| r.prefecture_code.as_str()),
        text_column(rows, |r| r.prefecture_name.as_str()),
        text_column(rows, |r| r.city_code.as_str()),
        text_column(rows, |r| r.city_name.as_str()),
        text_column(rows, |r| r.city_type.as_str()),
        Arc::new(Int64Array::from(rows.iter().map(|r| r.population).collect_vec())) as ArrayRef,
        Arc::new(Int64Array::from(
            rows.iter().map(|r| r.medical_facilities).collect_vec(),
        )) as ArrayRef,
        Arc::new(Float64Array::from(
            rows.iter().map(|r| r.facilities_per_10000).collect_vec(),
        )) as ArrayRef,
    ];
    Ok(RecordBatch::try_new(Arc::new(table_schema()), columns)?)
}

pub fn write_parquet(path: &Path, batch: &RecordBatch) -> Result<()> {
    let file = File::create(path).map_err(|err| Error::output_unwritable(path, err))?;
    let props = WriterProperties::builder().build();
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))?;
    writer.write(batch)?;
    writer.close()?;
    tracing::info!(path = %path.display(), rows = batch.num_rows(), "wrote municipality table");
    Ok(())
}

/// Reads a written master and exports it; returns the row count.
pub fn export_master(master_path: &Path, output: &Path) -> Result<usize> {
    let master: Master = crate::source::read_json(master_path)?;
    let rows = municipality_rows(&master);
    let batch = to_record_batch(&rows)?;
    write_parquet(output, &batch)?;
    Ok(rows.len())
}
