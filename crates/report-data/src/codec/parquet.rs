//! Parquet 컬럼형 코덱.
//!
//! 컬럼 타입은 셀 값으로부터 추론합니다:
//! - 모든 값이 정수 → `Int64`
//! - 정수/Decimal 혼합 → `Decimal128(38, 최대 scale)`
//! - 그 외 → `Utf8`
//!
//! 모든 필드는 nullable이며, 압축은 ZSTD를 사용합니다.

use crate::error::{DataError, Result};
use crate::table::{Cell, Table};
use ::parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use ::parquet::arrow::ArrowWriter;
use ::parquet::basic::Compression;
use ::parquet::file::properties::WriterProperties;
use arrow::array::{
    Array, ArrayRef, Decimal128Array, Float32Array, Float64Array, Int32Array, Int64Array,
    LargeStringArray, StringArray,
};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::sync::Arc;

/// Decimal128 정밀도.
const DECIMAL_PRECISION: u8 = 38;

/// 컬럼 물리 타입.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Int,
    Decimal { scale: u32 },
    Text,
}

/// 테이블을 Parquet 바이트로 인코딩합니다.
pub fn encode(table: &Table) -> Result<Vec<u8>> {
    let kinds: Vec<ColumnKind> = (0..table.columns().len())
        .map(|idx| infer_kind(table, idx))
        .collect();

    let fields: Vec<Field> = table
        .columns()
        .iter()
        .zip(&kinds)
        .map(|(name, kind)| {
            let data_type = match kind {
                ColumnKind::Int => DataType::Int64,
                ColumnKind::Decimal { scale } => {
                    DataType::Decimal128(DECIMAL_PRECISION, *scale as i8)
                }
                ColumnKind::Text => DataType::Utf8,
            };
            Field::new(name, data_type, true)
        })
        .collect();
    let schema = Arc::new(Schema::new(fields));

    let arrays = kinds
        .iter()
        .enumerate()
        .map(|(idx, kind)| build_array(table, idx, *kind))
        .collect::<Result<Vec<ArrayRef>>>()?;

    let batch = RecordBatch::try_new(schema.clone(), arrays)?;

    let props = WriterProperties::builder()
        .set_compression(Compression::ZSTD(Default::default()))
        .build();
    let mut writer = ArrowWriter::try_new(Vec::new(), schema, Some(props))?;
    writer.write(&batch)?;
    // footer까지 기록된 버퍼 반환
    Ok(writer.into_inner()?)
}

/// Parquet 바이트를 테이블로 디코딩합니다.
pub fn decode(bytes: &[u8]) -> Result<Table> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(bytes::Bytes::copy_from_slice(bytes))?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build()?;

    let mut table = Table::new(columns);
    for batch in reader {
        let batch = batch?;
        let decoded = (0..batch.num_columns())
            .map(|idx| decode_column(batch.column(idx).as_ref()))
            .collect::<Result<Vec<Vec<Cell>>>>()?;

        for row_idx in 0..batch.num_rows() {
            let row = decoded.iter().map(|col| col[row_idx].clone()).collect();
            table.push_row(row)?;
        }
    }

    Ok(table)
}

fn infer_kind(table: &Table, idx: usize) -> ColumnKind {
    let mut kind: Option<ColumnKind> = None;
    for row in table.rows() {
        let cell_kind = match &row[idx] {
            Cell::Null => continue,
            Cell::Text(_) => return ColumnKind::Text,
            Cell::Int(_) => ColumnKind::Int,
            Cell::Decimal(d) => ColumnKind::Decimal { scale: d.scale() },
        };
        kind = Some(match (kind, cell_kind) {
            (None, k) => k,
            (Some(ColumnKind::Int), ColumnKind::Int) => ColumnKind::Int,
            (Some(ColumnKind::Int), ColumnKind::Decimal { scale })
            | (Some(ColumnKind::Decimal { scale }), ColumnKind::Int) => {
                ColumnKind::Decimal { scale }
            }
            (Some(ColumnKind::Decimal { scale: a }), ColumnKind::Decimal { scale: b }) => {
                ColumnKind::Decimal { scale: a.max(b) }
            }
            (Some(ColumnKind::Text), _) | (_, ColumnKind::Text) => ColumnKind::Text,
        });
    }
    kind.unwrap_or(ColumnKind::Text)
}

fn build_array(table: &Table, idx: usize, kind: ColumnKind) -> Result<ArrayRef> {
    let cells = table.rows().iter().map(|row| &row[idx]);

    let array: ArrayRef = match kind {
        ColumnKind::Int => {
            let values: Vec<Option<i64>> = cells
                .map(|cell| match cell {
                    Cell::Int(v) => Some(*v),
                    _ => None,
                })
                .collect();
            Arc::new(Int64Array::from(values))
        }
        ColumnKind::Decimal { scale } => {
            let values: Vec<Option<i128>> = cells
                .map(|cell| match cell {
                    Cell::Int(v) => Some(to_scaled_i128(Decimal::from(*v), scale)),
                    Cell::Decimal(d) => Some(to_scaled_i128(*d, scale)),
                    _ => None,
                })
                .collect();
            Arc::new(
                Decimal128Array::from(values)
                    .with_precision_and_scale(DECIMAL_PRECISION, scale as i8)?,
            )
        }
        ColumnKind::Text => {
            let values: Vec<Option<String>> =
                cells.map(|cell| cell.as_text().map(|s| s.into_owned())).collect();
            Arc::new(StringArray::from(values))
        }
    };
    Ok(array)
}

fn to_scaled_i128(mut value: Decimal, scale: u32) -> i128 {
    value.rescale(scale);
    value.mantissa()
}

fn decode_column(array: &dyn Array) -> Result<Vec<Cell>> {
    let len = array.len();
    let any = array.as_any();

    let cells = match array.data_type() {
        DataType::Utf8 => {
            let values = downcast::<StringArray>(any, "Utf8")?;
            collect_cells(len, values, |i| Cell::Text(values.value(i).to_string()))
        }
        DataType::LargeUtf8 => {
            let values = downcast::<LargeStringArray>(any, "LargeUtf8")?;
            collect_cells(len, values, |i| Cell::Text(values.value(i).to_string()))
        }
        DataType::Int64 => {
            let values = downcast::<Int64Array>(any, "Int64")?;
            collect_cells(len, values, |i| Cell::Int(values.value(i)))
        }
        DataType::Int32 => {
            let values = downcast::<Int32Array>(any, "Int32")?;
            collect_cells(len, values, |i| Cell::Int(i64::from(values.value(i))))
        }
        DataType::Decimal128(_, scale) => {
            let scale = u32::try_from(*scale).map_err(|_| {
                DataError::Schema(format!("음수 scale Decimal128은 지원하지 않습니다: {scale}"))
            })?;
            let values = downcast::<Decimal128Array>(any, "Decimal128")?;
            let mut cells = Vec::with_capacity(len);
            for i in 0..len {
                if values.is_null(i) {
                    cells.push(Cell::Null);
                } else {
                    let d = Decimal::try_from_i128_with_scale(values.value(i), scale)
                        .map_err(|e| DataError::ParseError(e.to_string()))?;
                    cells.push(Cell::Decimal(d));
                }
            }
            cells
        }
        DataType::Float64 => {
            let values = downcast::<Float64Array>(any, "Float64")?;
            collect_cells(len, values, |i| float_cell(values.value(i)))
        }
        DataType::Float32 => {
            let values = downcast::<Float32Array>(any, "Float32")?;
            collect_cells(len, values, |i| float_cell(f64::from(values.value(i))))
        }
        other => {
            return Err(DataError::Schema(format!(
                "지원하지 않는 Parquet 컬럼 타입: {other}"
            )))
        }
    };
    Ok(cells)
}

fn downcast<'a, T: 'static>(any: &'a dyn std::any::Any, expected: &str) -> Result<&'a T> {
    any.downcast_ref::<T>()
        .ok_or_else(|| DataError::Schema(format!("column is not {expected}")))
}

fn collect_cells<F>(len: usize, array: &dyn Array, mut cell_at: F) -> Vec<Cell>
where
    F: FnMut(usize) -> Cell,
{
    (0..len)
        .map(|i| if array.is_null(i) { Cell::Null } else { cell_at(i) })
        .collect()
}

fn float_cell(value: f64) -> Cell {
    Decimal::from_f64(value).map(Cell::Decimal).unwrap_or(Cell::Null)
}
