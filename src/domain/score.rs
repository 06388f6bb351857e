// ==========================================
// 供应商资质表导入系统 - 评分（Nota）领域模型
// ==========================================
// 约束: 每条评分必须绑定一个有效的供应商 id
// 生命周期: 每个合格数据行新建一条，导入流程不更新、不删除
// ==========================================

use crate::domain::supplier::SupplierId;
use serde::{Deserialize, Serialize};

/// 评分字段数量（n1..n10）
pub const SCORE_FIELD_COUNT: usize = 10;

/// 评分列名
pub const SCORE_COLUMNS: [&str; SCORE_FIELD_COUNT] =
    ["n1", "n2", "n3", "n4", "n5", "n6", "n7", "n8", "n9", "n10"];

/// 存储层分配的评分记录标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreRecordId(pub i64);

// ==========================================
// ScoreRecord - 已落库的评分记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub id: ScoreRecordId,
    pub supplier_id: SupplierId,
    pub scores: [f64; SCORE_FIELD_COUNT],
}
