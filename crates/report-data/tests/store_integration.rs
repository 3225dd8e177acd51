//! 로컬 오브젝트 스토어 위의 테이블/워터마크 통합 테스트

use chrono::{NaiveDate, NaiveDateTime};
use report_core::TableFormat;
use report_data::{
    Cell, DataError, LocalObjectStore, ObjectStore, ReportSink, Table, TableStore,
    WatermarkStore, WarehouseSink,
};
use rust_decimal_macros::dec;
use std::collections::BTreeSet;
use std::sync::Arc;

// ============================================================================
// 테스트 헬퍼 함수
// ============================================================================

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn at(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
}

fn local_tables(dir: &tempfile::TempDir) -> (Arc<LocalObjectStore>, TableStore) {
    let store = Arc::new(LocalObjectStore::new(dir.path()));
    let tables = TableStore::new(store.clone());
    (store, tables)
}

fn report_table() -> Table {
    Table::with_rows(
        ["isin", "date", "opening_price_eur", "daily_traded_volume", "change_prev_closing_%"],
        vec![
            vec![
                Cell::from("AT0000A0E9W5"),
                Cell::from("2021-12-17"),
                Cell::Decimal(dec!(20.21)),
                Cell::Int(1088),
                Cell::Decimal(dec!(10.62)),
            ],
            vec![
                Cell::from("AT0000A0E9W5"),
                Cell::from("2021-12-18"),
                Cell::Decimal(dec!(20.58)),
                Cell::Int(10286),
                Cell::Null,
            ],
        ],
    )
    .unwrap()
}

// ============================================================================
// 테이블 저장
// ============================================================================

#[test]
fn test_csv_table_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let (store, tables) = local_tables(&dir);

    tables
        .write_table(&report_table(), "report1/daily.csv", TableFormat::Csv)
        .unwrap();

    let raw = String::from_utf8(store.get("report1/daily.csv").unwrap()).unwrap();
    assert_eq!(
        raw,
        "isin,date,opening_price_eur,daily_traded_volume,change_prev_closing_%\n\
         AT0000A0E9W5,2021-12-17,20.21,1088,10.62\n\
         AT0000A0E9W5,2021-12-18,20.58,10286,\n"
    );

    let decoded = tables.read_table("report1/daily.csv", TableFormat::Csv).unwrap();
    assert_eq!(decoded.len(), 2);
    assert_eq!(decoded.rows()[1][4], Cell::Null);
    assert_eq!(decoded.rows()[0][2], Cell::from("20.21"));
}

#[test]
fn test_parquet_table_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let (_, tables) = local_tables(&dir);

    tables
        .write_table(&report_table(), "report1/daily.parquet", TableFormat::Parquet)
        .unwrap();

    let decoded = tables
        .read_table("report1/daily.parquet", TableFormat::Parquet)
        .unwrap();
    assert_eq!(decoded, report_table());
}

#[test]
fn test_read_missing_key() {
    let dir = tempfile::tempdir().unwrap();
    let (_, tables) = local_tables(&dir);
    let err = tables.read_table("nope.csv", TableFormat::Csv).unwrap_err();
    assert!(err.is_not_found());
}

// ============================================================================
// 워터마크
// ============================================================================

#[test]
fn test_watermark_accumulates_across_runs() {
    let dir = tempfile::tempdir().unwrap();
    let (_, tables) = local_tables(&dir);
    let watermark = WatermarkStore::new(tables, "meta_file.csv", TableFormat::Csv);

    assert!(watermark.load().unwrap().is_none());

    let first: BTreeSet<_> = [date("2021-12-16"), date("2021-12-17")].into();
    watermark.update(&first, at("2021-12-18 06:00:00")).unwrap();

    let second: BTreeSet<_> = [date("2021-12-18")].into();
    watermark.update(&second, at("2021-12-19 06:00:00")).unwrap();

    let history = watermark.load().unwrap().unwrap();
    assert_eq!(history.len(), 3);
    assert_eq!(history.latest_source_date(), Some(date("2021-12-18")));
    let expected: BTreeSet<_> = [date("2021-12-16"), date("2021-12-17"), date("2021-12-18")].into();
    assert_eq!(history.processed_dates(), expected);
}

#[test]
fn test_watermark_schema_violation() {
    let dir = tempfile::tempdir().unwrap();
    let (store, tables) = local_tables(&dir);
    let bad = b"source_date,processed_date,extra\n2021-12-16,2021-12-17 00:00:00,x\n";
    store.put("meta_file.csv", bad).unwrap();

    let watermark = WatermarkStore::new(tables, "meta_file.csv", TableFormat::Csv);
    let dates: BTreeSet<_> = [date("2021-12-18")].into();

    assert!(matches!(
        watermark.update(&dates, at("2021-12-19 06:00:00")),
        Err(DataError::Schema(_))
    ));
    assert_eq!(store.get("meta_file.csv").unwrap(), bad);
}

#[test]
fn test_concurrent_updates_last_writer_wins() {
    let dir = tempfile::tempdir().unwrap();
    let (_, tables) = local_tables(&dir);
    let watermark = WatermarkStore::new(tables, "meta_file.csv", TableFormat::Csv);

    std::thread::scope(|scope| {
        for day in ["2021-12-16", "2021-12-17", "2021-12-18", "2021-12-19"] {
            let watermark = watermark.clone();
            scope.spawn(move || {
                let dates: BTreeSet<_> = [date(day)].into();
                watermark.update(&dates, at("2021-12-20 06:00:00")).unwrap();
            });
        }
    });

    // 잠금이 없으므로 일부 갱신은 유실될 수 있지만 파일은 항상 유효
    let history = watermark.load().unwrap().unwrap();
    assert!((1..=4).contains(&history.len()));
}

// ============================================================================
// 웨어하우스 싱크
// ============================================================================

#[test]
fn test_warehouse_sink_through_trait() {
    let dir = tempfile::tempdir().unwrap();
    let sink: Box<dyn ReportSink> = Box::new(WarehouseSink::new(dir.path()));

    sink.write(&report_table(), "xetra.daily_report").unwrap();
    sink.write(&report_table(), "xetra.daily_report").unwrap();

    let decoded = report_data::codec::csv::decode(
        &std::fs::read(dir.path().join("xetra.daily_report.csv")).unwrap(),
    )
    .unwrap();
    assert_eq!(decoded.len(), 4);
    assert_eq!(sink.name(), "warehouse");
}
