//! 쉼표 구분 텍스트 코덱.

use crate::error::{DataError, Result};
use crate::table::{Cell, Table};

/// 테이블을 CSV로 인코딩합니다.
///
/// `with_header`가 `false`이면 헤더 행 없이 데이터 행만 기록합니다
/// (기존 파일 뒤에 덧붙일 때 사용).
pub fn encode(table: &Table, with_header: bool) -> Result<Vec<u8>> {
    let mut writer = ::csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    if with_header {
        writer.write_record(table.columns())?;
    }
    for row in table.rows() {
        writer.write_record(row.iter().map(|cell| cell.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|e| DataError::Io(e.into_error()))
}

/// CSV 바이트를 테이블로 디코딩합니다.
///
/// 첫 행을 헤더로 사용하며, 빈 값은 [`Cell::Null`]이 됩니다.
pub fn decode(bytes: &[u8]) -> Result<Table> {
    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(bytes);

    let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut table = Table::new(columns);

    for record in reader.records() {
        let record = record?;
        let row = record
            .iter()
            .map(|value| {
                if value.is_empty() {
                    Cell::Null
                } else {
                    Cell::Text(value.to_string())
                }
            })
            .collect();
        table.push_row(row)?;
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_with_nulls() {
        let data = b"ISIN,Mnemonic,Date\nAT0000A0E9W5,SANT,2021-12-17\nDE000A0DJ6J9,,2021-12-17\n";
        let table = decode(data).unwrap();

        assert_eq!(table.columns(), ["ISIN", "Mnemonic", "Date"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[1][1], Cell::Null);
        assert_eq!(table.rows()[0][0], Cell::from("AT0000A0E9W5"));
    }

    #[test]
    fn test_encode_quotes_and_nulls() {
        let table = Table::with_rows(
            ["name", "value"],
            vec![vec![Cell::from("a,b"), Cell::Null], vec![Cell::from("c"), Cell::Int(3)]],
        )
        .unwrap();

        let bytes = encode(&table, true).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "name,value\n\"a,b\",\nc,3\n");

        let body = encode(&table, false).unwrap();
        assert_eq!(String::from_utf8(body).unwrap(), "\"a,b\",\nc,3\n");
    }

    #[test]
    fn test_decode_empty_input() {
        let table = decode(b"").unwrap();
        assert!(table.is_empty());
        assert!(table.columns().is_empty());
    }

    #[test]
    fn test_ragged_rows_rejected() {
        assert!(decode(b"a,b\n1,2,3\n").is_err());
    }
}
