// ==========================================
// 供应商资质表导入系统 - 导入结果模型
// ==========================================
// 用途: 每行显式结果 + 整次导入汇总（替代以异常做行级控制流）
// ==========================================

use crate::domain::score::ScoreRecordId;
use crate::domain::supplier::SupplierId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 行被跳过的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SkipReason {
    MissingTaxId, // 税号为空（不完整行容忍策略）
}

/// 行处理失败所处阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RowStage {
    SupplierLookup,
    SupplierInsert,
    ScoreValidation,
    ScoreInsert,
}

impl fmt::Display for RowStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RowStage::SupplierLookup => "SUPPLIER_LOOKUP",
            RowStage::SupplierInsert => "SUPPLIER_INSERT",
            RowStage::ScoreValidation => "SCORE_VALIDATION",
            RowStage::ScoreInsert => "SCORE_INSERT",
        };
        write!(f, "{}", s)
    }
}

// ==========================================
// RowOutcome - 单行处理结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RowOutcome {
    Inserted {
        supplier_id: SupplierId,
        supplier_created: bool,
        score_id: ScoreRecordId,
    },
    Skipped {
        reason: SkipReason,
    },
    Failed {
        stage: RowStage,
        reason: String,
    },
}

/// 失败行明细
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowFailure {
    pub row_number: usize, // 表格行号（1 起，含表头行）
    pub tax_id: Option<String>,
    pub stage: RowStage,
    pub reason: String,
}

// ==========================================
// ImportReport - 整次导入汇总
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportReport {
    pub run_id: String,
    pub file_path: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub total_rows: usize,        // 数据行数（不含表头）
    pub inserted_rows: usize,     // 成功写入评分的行
    pub skipped_rows: usize,      // 跳过（税号缺失）
    pub failed_rows: usize,       // 失败（校验/持久化）
    pub suppliers_created: usize, // 新建供应商数
    pub scores_created: usize,    // 新建评分数
    pub failures: Vec<RowFailure>,
}

impl ImportReport {
    pub fn new(run_id: String, file_path: String) -> Self {
        Self {
            run_id,
            file_path,
            started_at: Utc::now(),
            finished_at: None,
            total_rows: 0,
            inserted_rows: 0,
            skipped_rows: 0,
            failed_rows: 0,
            suppliers_created: 0,
            scores_created: 0,
            failures: Vec::new(),
        }
    }

    /// 累计一行结果
    pub fn record(&mut self, row_number: usize, tax_id: Option<&str>, outcome: RowOutcome) {
        self.total_rows += 1;
        match outcome {
            RowOutcome::Inserted {
                supplier_created, ..
            } => {
                self.inserted_rows += 1;
                self.scores_created += 1;
                if supplier_created {
                    self.suppliers_created += 1;
                }
            }
            RowOutcome::Skipped { .. } => self.skipped_rows += 1,
            RowOutcome::Failed { stage, reason } => {
                self.failed_rows += 1;
                self.failures.push(RowFailure {
                    row_number,
                    tax_id: tax_id.map(str::to_string),
                    stage,
                    reason,
                });
            }
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn has_failures(&self) -> bool {
        self.failed_rows > 0
    }
}
