//! 오브젝트 스토어와 주고받는 테이블 모델.
//!
//! 이름 있는 컬럼 목록과 nullable 셀로 이루어진 행으로 구성됩니다.
//! CSV에서 읽은 셀은 모두 [`Cell::Text`]이며, Parquet에서 읽은 셀은
//! 컬럼 타입에 따라 [`Cell::Int`] / [`Cell::Decimal`]이 될 수 있습니다.

use crate::error::{DataError, Result};
use rust_decimal::Decimal;
use std::borrow::Cow;
use std::fmt;

/// 테이블 셀 값.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    /// 값 없음 (CSV의 빈 문자열 포함)
    Null,
    /// 문자열
    Text(String),
    /// 정수
    Int(i64),
    /// 고정 소수점
    Decimal(Decimal),
}

impl Cell {
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// 셀 값을 문자열로 반환합니다. `Null`이면 `None`.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Cell::Null => None,
            Cell::Text(s) => Some(Cow::Borrowed(s.as_str())),
            Cell::Int(v) => Some(Cow::Owned(v.to_string())),
            Cell::Decimal(d) => Some(Cow::Owned(d.to_string())),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => Ok(()),
            Cell::Text(s) => f.write_str(s),
            Cell::Int(v) => write!(f, "{v}"),
            Cell::Decimal(d) => write!(f, "{d}"),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Int(value)
    }
}

impl From<Decimal> for Cell {
    fn from(value: Decimal) -> Self {
        Cell::Decimal(value)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Cell::Null)
    }
}

/// 컬럼 이름이 있는 행 집합.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// 행이 없는 테이블을 생성합니다.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// 컬럼과 행으로 테이블을 생성합니다.
    ///
    /// 모든 행의 길이가 컬럼 수와 같아야 합니다.
    pub fn with_rows<I, S>(columns: I, rows: Vec<Vec<Cell>>) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Self::new(columns);
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// 행 수.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// 행이 하나도 없으면 `true`.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 컬럼 위치를 찾습니다.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// 행을 추가합니다.
    pub fn push_row(&mut self, row: Vec<Cell>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(DataError::Schema(format!(
                "행 길이 {}가 컬럼 수 {}와 다릅니다",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// 컬럼 이름을 기준으로 여러 테이블을 이어 붙입니다.
    ///
    /// 결과 컬럼은 처음 등장한 순서대로의 합집합이며,
    /// 특정 테이블에 없는 컬럼은 `Null`로 채워집니다.
    pub fn concat<I>(tables: I) -> Table
    where
        I: IntoIterator<Item = Table>,
    {
        let tables: Vec<Table> = tables.into_iter().collect();

        let mut columns: Vec<String> = Vec::new();
        for table in &tables {
            for column in &table.columns {
                if !columns.contains(column) {
                    columns.push(column.clone());
                }
            }
        }

        let mut rows = Vec::with_capacity(tables.iter().map(Table::len).sum());
        for table in tables {
            let mapping: Vec<Option<usize>> =
                columns.iter().map(|c| table.column_index(c)).collect();
            for mut row in table.rows {
                let aligned = mapping
                    .iter()
                    .map(|idx| match idx {
                        Some(i) => std::mem::replace(&mut row[*i], Cell::Null),
                        None => Cell::Null,
                    })
                    .collect();
                rows.push(aligned);
            }
        }

        Table { columns, rows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_push_row_checks_width() {
        let mut table = Table::new(["a", "b"]);
        assert!(table.push_row(vec![Cell::from("x")]).is_err());
        assert!(table.push_row(vec![Cell::from("x"), Cell::Null]).is_ok());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_concat_aligns_columns_by_name() {
        let first = Table::with_rows(["a", "b"], vec![vec![Cell::from("1"), Cell::from("2")]])
            .unwrap();
        let second = Table::with_rows(["b", "c"], vec![vec![Cell::from("3"), Cell::Int(4)]])
            .unwrap();

        let merged = Table::concat([first, second]);

        assert_eq!(merged.columns(), ["a", "b", "c"]);
        assert_eq!(
            merged.rows(),
            [
                vec![Cell::from("1"), Cell::from("2"), Cell::Null],
                vec![Cell::Null, Cell::from("3"), Cell::Int(4)],
            ]
        );
    }

    #[test]
    fn test_concat_of_nothing_is_empty() {
        let merged = Table::concat(Vec::new());
        assert!(merged.is_empty());
        assert!(merged.columns().is_empty());
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(Cell::Decimal(dec!(18.27)).as_text().unwrap(), "18.27");
        assert_eq!(Cell::Int(633).to_string(), "633");
        assert!(Cell::Null.as_text().is_none());
        assert_eq!(Cell::from(None::<i64>), Cell::Null);
    }
}
