// ==========================================
// 供应商导入端到端测试
// ==========================================
// 真实 xlsx 文件 → ExcelSource → SupplierImporter → SQLite
// ==========================================


use std::path::Path;
use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use supplier_import::config::ImportSettings;
use supplier_import::domain::{RowStage, SupplierLookup};
use supplier_import::importer::{ExcelSource, ImportError, SupplierImporter};
use supplier_import::repository::{ScoreRepository, SupplierRepository};
use tempfile::TempDir;
use test_helpers::{count_rows, create_test_db, data_row, full_scores, write_workbook, Cell};

fn importer(conn: &Arc<Mutex<Connection>>, settings: ImportSettings) -> SupplierImporter<ExcelSource> {
    let source = ExcelSource::new(&settings.date_format).unwrap();
    SupplierImporter::new(conn.clone(), source, settings)
}

fn import(conn: &Arc<Mutex<Connection>>, path: &Path) -> supplier_import::ImportReport {
    importer(conn, ImportSettings::default()).process(path).unwrap()
}

#[test]
fn test_same_tax_id_creates_one_supplier_and_three_scores() {
    let (_db, conn) = create_test_db().unwrap();
    let dir = TempDir::new().unwrap();
    let path = write_workbook(
        dir.path(),
        "fornecedores.xlsx",
        &[
            data_row("ACME", "111", full_scores(1.0)),
            data_row("ACME Filial", "111", full_scores(2.0)),
            data_row("ACME", "111", full_scores(3.0)),
        ],
    )
    .unwrap();

    let report = import(&conn, &path);

    assert_eq!(report.total_rows, 3);
    assert_eq!(report.inserted_rows, 3);
    assert_eq!(report.suppliers_created, 1);
    assert_eq!(count_rows(&conn, "supplier"), 1);
    assert_eq!(count_rows(&conn, "score_record"), 3);

    let suppliers = SupplierRepository::from_connection(conn.clone());
    let supplier_id = suppliers.find_by_tax_id("111").unwrap().supplier_id().unwrap();
    let supplier = suppliers.find_by_id(supplier_id).unwrap().unwrap();
    // 首次出现的行决定供应商属性
    assert_eq!(supplier.fields.name, "ACME");
    assert_eq!(supplier.fields.fcpa, "OK");

    let scores = ScoreRepository::from_connection(conn.clone())
        .list_by_supplier(supplier_id)
        .unwrap();
    assert_eq!(scores.len(), 3);
    assert!(scores.iter().all(|s| s.supplier_id == supplier_id));
}

#[test]
fn test_reimport_creates_no_new_suppliers() {
    let (_db, conn) = create_test_db().unwrap();
    let dir = TempDir::new().unwrap();
    let path = write_workbook(
        dir.path(),
        "fornecedores.xlsx",
        &[
            data_row("ACME", "111", full_scores(1.0)),
            data_row("Beta", "222", full_scores(5.0)),
        ],
    )
    .unwrap();

    let first = import(&conn, &path);
    let second = import(&conn, &path);

    assert_eq!(first.suppliers_created, 2);
    assert_eq!(second.suppliers_created, 0);
    assert_eq!(second.inserted_rows, 2);
    assert_eq!(count_rows(&conn, "supplier"), 2);
    // 评分记录按行追加，不去重
    assert_eq!(count_rows(&conn, "score_record"), 4);
    assert_ne!(first.run_id, second.run_id);
}

#[test]
fn test_empty_tax_id_produces_nothing() {
    let (_db, conn) = create_test_db().unwrap();
    let dir = TempDir::new().unwrap();
    let path = write_workbook(
        dir.path(),
        "fornecedores.xlsx",
        &[data_row("Sem CNPJ", "", full_scores(1.0))],
    )
    .unwrap();

    let report = import(&conn, &path);

    assert_eq!(report.total_rows, 1);
    assert_eq!(report.skipped_rows, 1);
    assert_eq!(count_rows(&conn, "supplier"), 0);
    assert_eq!(count_rows(&conn, "score_record"), 0);
}

#[test]
fn test_empty_score_cells_are_stored_as_zero() {
    let (_db, conn) = create_test_db().unwrap();
    let dir = TempDir::new().unwrap();
    let mut scores = full_scores(1.0);
    scores[1] = None;
    scores[6] = None;
    let path = write_workbook(
        dir.path(),
        "fornecedores.xlsx",
        &[data_row("ACME", "111", scores)],
    )
    .unwrap();

    let report = import(&conn, &path);
    assert_eq!(report.inserted_rows, 1);

    let supplier_id = SupplierRepository::from_connection(conn.clone())
        .find_by_tax_id("111")
        .unwrap()
        .supplier_id()
        .unwrap();
    let record = ScoreRepository::from_connection(conn.clone())
        .list_by_supplier(supplier_id)
        .unwrap()
        .remove(0);

    assert_eq!(
        record.scores,
        [1.0, 0.0, 3.0, 4.0, 5.0, 6.0, 0.0, 8.0, 9.0, 10.0]
    );
}

#[test]
fn test_score_failure_does_not_stop_later_rows() {
    let (_db, conn) = create_test_db().unwrap();
    {
        let guard = conn.lock().unwrap();
        guard
            .execute_batch(
                "CREATE TRIGGER reject_score BEFORE INSERT ON score_record
                 WHEN NEW.n1 = 999
                 BEGIN SELECT RAISE(ABORT, 'score rejected'); END;",
            )
            .unwrap();
    }

    let dir = TempDir::new().unwrap();
    let path = write_workbook(
        dir.path(),
        "fornecedores.xlsx",
        &[
            data_row("ACME", "111", full_scores(1.0)),
            data_row("Beta", "222", full_scores(999.0)),
            data_row("Gama", "333", full_scores(2.0)),
        ],
    )
    .unwrap();

    let report = import(&conn, &path);

    assert_eq!(report.inserted_rows, 2);
    assert_eq!(report.failed_rows, 1);
    assert_eq!(report.failures[0].row_number, 3);
    assert_eq!(report.failures[0].tax_id.as_deref(), Some("222"));
    assert_eq!(report.failures[0].stage, RowStage::ScoreInsert);

    // 行级事务: 失败行新建的供应商被回滚
    let suppliers = SupplierRepository::from_connection(conn.clone());
    assert_eq!(suppliers.find_by_tax_id("222").unwrap(), SupplierLookup::NotFound);
    assert!(matches!(
        suppliers.find_by_tax_id("333").unwrap(),
        SupplierLookup::Found(_)
    ));
    assert_eq!(count_rows(&conn, "score_record"), 2);
}

#[test]
fn test_score_failure_keeps_supplier_when_rows_not_atomic() {
    let (_db, conn) = create_test_db().unwrap();
    {
        let guard = conn.lock().unwrap();
        guard
            .execute_batch(
                "CREATE TRIGGER reject_score BEFORE INSERT ON score_record
                 BEGIN SELECT RAISE(ABORT, 'score rejected'); END;",
            )
            .unwrap();
    }

    let dir = TempDir::new().unwrap();
    let path = write_workbook(
        dir.path(),
        "fornecedores.xlsx",
        &[data_row("ACME", "111", full_scores(1.0))],
    )
    .unwrap();

    let settings = ImportSettings {
        atomic_rows: false,
        ..ImportSettings::default()
    };
    let report = importer(&conn, settings).process(&path).unwrap();

    assert_eq!(report.failed_rows, 1);
    assert_eq!(count_rows(&conn, "supplier"), 1);
    assert_eq!(count_rows(&conn, "score_record"), 0);
}

#[test]
fn test_header_row_is_never_data() {
    let (_db, conn) = create_test_db().unwrap();
    let dir = TempDir::new().unwrap();
    // 表头本身就是一条合法的数据行
    let header = data_row("Header Co", "999", full_scores(1.0));
    let path = test_helpers::write_raw_workbook(
        dir.path(),
        "fornecedores.xlsx",
        &header,
        &[data_row("ACME", "111", full_scores(1.0))],
    )
    .unwrap();

    let report = import(&conn, &path);

    assert_eq!(report.total_rows, 1);
    let suppliers = SupplierRepository::from_connection(conn.clone());
    assert_eq!(suppliers.find_by_tax_id("999").unwrap(), SupplierLookup::NotFound);
    assert_eq!(suppliers.count().unwrap(), 1);
}

#[test]
fn test_date_cell_is_stored_formatted() {
    let (_db, conn) = create_test_db().unwrap();
    let dir = TempDir::new().unwrap();
    let mut row = data_row("ACME", "111", full_scores(1.0));
    row[2] = Cell::Date(2024, 3, 15);
    let path = write_workbook(dir.path(), "fornecedores.xlsx", &[row]).unwrap();

    import(&conn, &path);

    let suppliers = SupplierRepository::from_connection(conn.clone());
    let id = suppliers.find_by_tax_id("111").unwrap().supplier_id().unwrap();
    let supplier = suppliers.find_by_id(id).unwrap().unwrap();
    assert_eq!(supplier.fields.homologation_date, "15/03/2024");
}

#[test]
fn test_numeric_tax_id_is_matched_as_text() {
    let (_db, conn) = create_test_db().unwrap();
    let dir = TempDir::new().unwrap();
    let mut first = data_row("ACME", "", full_scores(1.0));
    first[1] = Cell::Number(111.0);
    let second = data_row("ACME", "111", full_scores(2.0));
    let path = write_workbook(dir.path(), "fornecedores.xlsx", &[first, second]).unwrap();

    let report = import(&conn, &path);

    assert_eq!(report.suppliers_created, 1);
    assert_eq!(count_rows(&conn, "score_record"), 2);
}

#[test]
fn test_zero_padded_numeric_tax_id_keeps_leading_zero() {
    let (_db, conn) = create_test_db().unwrap();
    let dir = TempDir::new().unwrap();
    let mut row = data_row("ACME", "", full_scores(1.0));
    row[1] = Cell::Formatted(1234567890.0, "00000000000");
    let path = write_workbook(dir.path(), "fornecedores.xlsx", &[row]).unwrap();

    let report = import(&conn, &path);
    assert_eq!(report.suppliers_created, 1);

    let suppliers = SupplierRepository::from_connection(conn.clone());
    let id = suppliers
        .find_by_tax_id("01234567890")
        .unwrap()
        .supplier_id()
        .unwrap();
    let supplier = suppliers.find_by_id(id).unwrap().unwrap();
    assert_eq!(supplier.fields.tax_id, "01234567890");
    assert!(suppliers.find_by_tax_id("1234567890").unwrap().supplier_id().is_none());
}

#[test]
fn test_masked_numeric_tax_id_matches_typed_text() {
    let (_db, conn) = create_test_db().unwrap();
    let dir = TempDir::new().unwrap();
    let mut masked = data_row("ACME", "", full_scores(1.0));
    masked[1] = Cell::Formatted(12345678000190.0, r"00\.000\.000\/0000\-00");
    let typed = data_row("ACME", "12.345.678/0001-90", full_scores(2.0));
    let path = write_workbook(dir.path(), "fornecedores.xlsx", &[masked, typed]).unwrap();

    let report = import(&conn, &path);

    assert_eq!(report.suppliers_created, 1);
    assert_eq!(count_rows(&conn, "score_record"), 2);
    let suppliers = SupplierRepository::from_connection(conn.clone());
    assert!(suppliers
        .find_by_tax_id("12.345.678/0001-90")
        .unwrap()
        .supplier_id()
        .is_some());
}

#[test]
fn test_grouped_score_display_value_is_parsed() {
    let (_db, conn) = create_test_db().unwrap();
    let dir = TempDir::new().unwrap();
    let mut row = data_row("ACME", "111", full_scores(1.0));
    // 显示为 "1,234.50"
    row[5] = Cell::Formatted(1234.5, "#,##0.00");
    let path = write_workbook(dir.path(), "fornecedores.xlsx", &[row]).unwrap();

    let report = import(&conn, &path);
    assert_eq!(report.inserted_rows, 1);

    let supplier_id = SupplierRepository::from_connection(conn.clone())
        .find_by_tax_id("111")
        .unwrap()
        .supplier_id()
        .unwrap();
    let scores = ScoreRepository::from_connection(conn.clone())
        .list_by_supplier(supplier_id)
        .unwrap();
    assert_eq!(scores[0].scores[0], 1234.5);
}

#[test]
fn test_narrow_sheet_fails_whole_run_in_strict_mode() {
    let (_db, conn) = create_test_db().unwrap();
    let dir = TempDir::new().unwrap();
    let header: Vec<Cell> = (0..12).map(|i| Cell::Text(format!("col{}", i))).collect();
    let row: Vec<Cell> = data_row("ACME", "111", full_scores(1.0))
        .into_iter()
        .take(12)
        .collect();
    let path =
        test_helpers::write_raw_workbook(dir.path(), "estreito.xlsx", &header, &[row]).unwrap();

    let err = importer(&conn, ImportSettings::default())
        .process(&path)
        .unwrap_err();

    assert!(matches!(
        err,
        ImportError::LayoutMismatch {
            required: 25,
            actual: 12
        }
    ));
    assert_eq!(count_rows(&conn, "supplier"), 0);
}

#[test]
fn test_narrow_sheet_in_lenient_mode_records_row_failures() {
    let (_db, conn) = create_test_db().unwrap();
    let dir = TempDir::new().unwrap();
    let header: Vec<Cell> = (0..12).map(|i| Cell::Text(format!("col{}", i))).collect();
    let row: Vec<Cell> = data_row("ACME", "111", full_scores(1.0))
        .into_iter()
        .take(12)
        .collect();
    let path =
        test_helpers::write_raw_workbook(dir.path(), "estreito.xlsx", &header, &[row]).unwrap();

    let settings = ImportSettings {
        strict_layout: false,
        ..ImportSettings::default()
    };
    let report = importer(&conn, settings).process(&path).unwrap();

    assert_eq!(report.failed_rows, 1);
    assert_eq!(report.failures[0].stage, RowStage::ScoreValidation);
    assert_eq!(count_rows(&conn, "supplier"), 0);
}

#[test]
fn test_unreadable_file_fails_whole_run() {
    let (_db, conn) = create_test_db().unwrap();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("quebrado.xlsx");
    std::fs::write(&path, b"not a workbook").unwrap();

    let err = importer(&conn, ImportSettings::default())
        .process(&path)
        .unwrap_err();

    assert!(matches!(err, ImportError::SourceFormat(_)));
}
