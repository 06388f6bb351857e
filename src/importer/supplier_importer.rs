// ==========================================
// 供应商资质表导入系统 - 供应商导入编排
// ==========================================
// 流程（逐行）:
// 1. 取税号（偏移 1），为空则跳过该行
// 2. 按税号查找供应商
// 3. 未找到: 拼接 [0,5) + [16,25) 插入供应商；插入失败则放弃该行
// 4. 取 [5,15) 评分，空值补 0，绑定供应商 id 插入
// 5. 无论 3/4 结果如何，继续下一行
// ==========================================
// 事务: atomic_rows=true 时，每行的供应商解析与评分插入在同一事务内，
//       评分失败会回滚本行新建的供应商
// 已知竞态: 并发导入同一新税号可能产生重复供应商（本流程单线程，不处理）
// ==========================================

use crate::config::ImportSettings;
use crate::domain::import_report::{ImportReport, RowOutcome, RowStage, SkipReason};
use crate::domain::score::SCORE_FIELD_COUNT;
use crate::domain::supplier::{SupplierLookup, SUPPLIER_FIELD_COUNT};
use crate::importer::column_layout::ColumnLayout;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::map_scores;
use crate::importer::importer_trait::TabularSource;
use crate::importer::sheet_rows::{Row, SheetRows};
use crate::repository::{RepositoryError, ScoreRepository, SupplierRepository};
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// SupplierImporter - 导入编排器
// ==========================================
pub struct SupplierImporter<S>
where
    S: TabularSource,
{
    // 共享连接（每行加锁一次，行级事务）
    conn: Arc<Mutex<Connection>>,

    // 数据源与映射
    source: S,
    layout: ColumnLayout,

    settings: ImportSettings,
}

impl<S> SupplierImporter<S>
where
    S: TabularSource,
{
    /// 创建导入器
    ///
    /// # 参数
    /// - conn: 本次导入共享的数据库连接
    /// - source: 表格数据源
    /// - settings: 导入配置快照
    pub fn new(conn: Arc<Mutex<Connection>>, source: S, settings: ImportSettings) -> Self {
        Self {
            conn,
            source,
            layout: ColumnLayout::standard(),
            settings,
        }
    }

    /// 替换列布局
    pub fn with_layout(mut self, layout: ColumnLayout) -> Self {
        self.layout = layout;
        self
    }

    /// 导入一个表格文件
    ///
    /// # 返回
    /// - Ok(ImportReport): 整次导入汇总（行级失败已记录在报告中）
    /// - Err: 整次导入失败（文件不可读、布局不符、存储不可用）
    #[instrument(skip(self, file_path), fields(file = %file_path.as_ref().display()))]
    pub fn process<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<ImportReport> {
        let path = file_path.as_ref();
        let rows = self.source.read(path).map_err(|e| {
            warn!(error = %e, "表格读取失败");
            e
        })?;

        self.process_rows(rows, &path.display().to_string())
    }

    /// 处理已打开的数据行序列
    pub fn process_rows(&self, rows: SheetRows, file_label: &str) -> ImportResult<ImportReport> {
        self.ensure_store_ready()?;

        if !self.layout.is_consistent() {
            return Err(ImportError::Config(format!(
                "列布局不一致: 供应商段需 {} 列，评分段需 {} 列",
                SUPPLIER_FIELD_COUNT, SCORE_FIELD_COUNT
            )));
        }

        let required = self.layout.required_width();
        if rows.width() > 0 && rows.width() < required {
            if self.settings.strict_layout {
                warn!(required, actual = rows.width(), "表格列宽不足，终止导入");
                self.layout.validate_width(rows.width())?;
            } else {
                warn!(required, actual = rows.width(), "表格列宽不足，按宽松模式继续");
            }
        }

        let run_id = Uuid::new_v4().to_string();
        info!(
            run_id = %run_id,
            file = file_label,
            atomic_rows = self.settings.atomic_rows,
            "开始导入供应商数据"
        );

        let mut report = ImportReport::new(run_id.clone(), file_label.to_string());
        for row in rows {
            let outcome = self.process_row(&row);
            report.record(row.row_number(), self.layout.tax_id(&row), outcome);
        }
        report.finish();

        info!(
            run_id = %run_id,
            total = report.total_rows,
            inserted = report.inserted_rows,
            skipped = report.skipped_rows,
            failed = report.failed_rows,
            suppliers_created = report.suppliers_created,
            "供应商数据导入完成"
        );
        if report.has_failures() {
            warn!(run_id = %run_id, failed = report.failed_rows, "部分行导入失败，详见导入报告");
        }

        Ok(report)
    }

    /// 处理单行，返回显式结果（不向上抛错）
    pub fn process_row(&self, row: &Row) -> RowOutcome {
        let tax_id = match self.layout.tax_id(row) {
            Some(tax_id) => tax_id,
            None => {
                debug!(row_number = row.row_number(), "税号为空，跳过该行");
                return RowOutcome::Skipped {
                    reason: SkipReason::MissingTaxId,
                };
            }
        };

        // 每行加锁一次，查找/插入共用同一连接
        let outcome = match self.conn.lock() {
            Ok(conn) if self.settings.atomic_rows => self.process_row_in_transaction(&conn, row, tax_id),
            Ok(conn) => self.resolve_and_insert(&conn, row, tax_id),
            Err(e) => failed(
                RowStage::SupplierLookup,
                RepositoryError::LockError(e.to_string()),
            ),
        };

        match &outcome {
            RowOutcome::Inserted {
                supplier_id,
                supplier_created,
                score_id,
            } => debug!(
                row_number = row.row_number(),
                tax_id,
                supplier_id = %supplier_id,
                supplier_created,
                score_id = score_id.0,
                "行导入成功"
            ),
            RowOutcome::Failed { stage, reason } => warn!(
                row_number = row.row_number(),
                tax_id,
                stage = %stage,
                error = %reason,
                "行导入失败，继续下一行"
            ),
            RowOutcome::Skipped { .. } => {}
        }

        outcome
    }

    /// 行级事务: 仅在评分写入成功时提交，其余情况随事务释放回滚
    fn process_row_in_transaction(&self, conn: &Connection, row: &Row, tax_id: &str) -> RowOutcome {
        let tx = match conn.unchecked_transaction() {
            Ok(tx) => tx,
            Err(e) => {
                return failed(
                    RowStage::SupplierLookup,
                    RepositoryError::DatabaseTransactionError(e.to_string()),
                )
            }
        };

        let outcome = self.resolve_and_insert(&tx, row, tax_id);
        if !matches!(outcome, RowOutcome::Inserted { .. }) {
            if let Err(e) = tx.rollback() {
                warn!(row_number = row.row_number(), error = %e, "行事务回滚失败");
            }
            return outcome;
        }

        match tx.commit() {
            Ok(()) => outcome,
            Err(e) => failed(
                RowStage::ScoreInsert,
                RepositoryError::DatabaseTransactionError(e.to_string()),
            ),
        }
    }

    fn resolve_and_insert(&self, conn: &Connection, row: &Row, tax_id: &str) -> RowOutcome {
        // === 供应商: 查找或新建 ===
        let (supplier_id, supplier_created) =
            match SupplierRepository::find_by_tax_id_tx(conn, tax_id) {
                Ok(SupplierLookup::Found(id)) => (id, false),
                Ok(SupplierLookup::NotFound) => {
                    let inserted = self.layout.supplier_fields(row).and_then(|supplier| {
                        SupplierRepository::insert_tx(conn, &supplier).map_err(ImportError::from)
                    });
                    match inserted {
                        Ok(id) => (id, true),
                        Err(e) => return failed(RowStage::SupplierInsert, e),
                    }
                }
                Err(e) => return failed(RowStage::SupplierLookup, e),
            };

        // === 评分: 补 0 后绑定供应商插入 ===
        let scores = match map_scores(self.layout.score_cells(row), row.row_number()) {
            Ok(scores) => scores,
            Err(e) => return failed(RowStage::ScoreValidation, e),
        };

        match ScoreRepository::insert_tx(conn, &scores, supplier_id) {
            Ok(score_id) => RowOutcome::Inserted {
                supplier_id,
                supplier_created,
                score_id,
            },
            Err(e) if e.is_validation() => failed(RowStage::ScoreValidation, e),
            Err(e) => failed(RowStage::ScoreInsert, e),
        }
    }

    /// 校验两张目标表存在（存储不可用属于整次导入失败）
    fn ensure_store_ready(&self) -> ImportResult<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ImportError::Database(format!("锁获取失败: {}", e)))?;

        for table in ["supplier", "score_record"] {
            let exists = conn
                .query_row(
                    "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
                    [table],
                    |_row| Ok(true),
                )
                .optional()
                .map_err(|e| ImportError::Database(e.to_string()))?
                .unwrap_or(false);

            if !exists {
                return Err(ImportError::Database(format!("缺少数据表: {}", table)));
            }
        }

        Ok(())
    }
}

fn failed(stage: RowStage, error: impl std::fmt::Display) -> RowOutcome {
    RowOutcome::Failed {
        stage,
        reason: error.to_string(),
    }
}
