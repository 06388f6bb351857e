// ==========================================
// 供应商资质表导入系统 - 供应商领域模型
// ==========================================
// 身份: 税号（CNPJ/CPF）为自然去重键
// 对齐: schema supplier 表（14 个业务列）
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

/// 供应商业务字段数量（不含存储层生成的 id）
pub const SUPPLIER_FIELD_COUNT: usize = 14;

/// 供应商业务列名（与 [`NewSupplier::into_values`] 顺序一致）
pub const SUPPLIER_COLUMNS: [&str; SUPPLIER_FIELD_COUNT] = [
    "name",
    "tax_id",
    "homologation_date",
    "status",
    "service_scope",
    "qualified",
    "person_type",
    "contact_name",
    "phone",
    "email",
    "bank",
    "branch",
    "account",
    "fcpa",
];

// ==========================================
// SupplierId - 存储层分配的供应商标识
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SupplierId(pub i64);

impl SupplierId {
    pub fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for SupplierId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ==========================================
// SupplierLookup - 按税号查找结果
// ==========================================
// 显式区分“未找到”与任何合法 id（包括 0）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupplierLookup {
    Found(SupplierId),
    NotFound,
}

impl SupplierLookup {
    pub fn supplier_id(self) -> Option<SupplierId> {
        match self {
            SupplierLookup::Found(id) => Some(id),
            SupplierLookup::NotFound => None,
        }
    }
}

impl From<Option<i64>> for SupplierLookup {
    fn from(value: Option<i64>) -> Self {
        match value {
            Some(id) => SupplierLookup::Found(SupplierId(id)),
            None => SupplierLookup::NotFound,
        }
    }
}

// ==========================================
// NewSupplier - 待插入的供应商子记录
// ==========================================
// 来源: 行的 [0,5) 与 [16,25) 两段列拼接
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSupplier {
    // ===== 身份与资质 =====
    pub name: String,              // 供应商名称
    pub tax_id: String,            // 税号（CNPJ/CPF）
    pub homologation_date: String, // 认证日期（保留表格显示格式）
    pub status: String,            // 状态
    pub service_scope: String,     // 服务范围

    // ===== 联系与银行 =====
    pub qualified: String,    // 是否合格
    pub person_type: String,  // 法人/自然人
    pub contact_name: String, // 联系人
    pub phone: String,        // 电话
    pub email: String,        // 邮箱
    pub bank: String,         // 银行
    pub branch: String,       // 支行
    pub account: String,      // 账号
    pub fcpa: String,         // FCPA 标记
}

impl NewSupplier {
    /// 按固定列序构造
    pub fn from_fields(fields: [String; SUPPLIER_FIELD_COUNT]) -> Self {
        let [name, tax_id, homologation_date, status, service_scope, qualified, person_type, contact_name, phone, email, bank, branch, account, fcpa] =
            fields;

        Self {
            name,
            tax_id,
            homologation_date,
            status,
            service_scope,
            qualified,
            person_type,
            contact_name,
            phone,
            email,
            bank,
            branch,
            account,
            fcpa,
        }
    }

    /// 按 [`SUPPLIER_COLUMNS`] 顺序输出字段值
    pub fn values(&self) -> [&str; SUPPLIER_FIELD_COUNT] {
        [
            &self.name,
            &self.tax_id,
            &self.homologation_date,
            &self.status,
            &self.service_scope,
            &self.qualified,
            &self.person_type,
            &self.contact_name,
            &self.phone,
            &self.email,
            &self.bank,
            &self.branch,
            &self.account,
            &self.fcpa,
        ]
    }
}

// ==========================================
// SupplierRecord - 已落库的供应商
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierRecord {
    pub id: SupplierId,
    #[serde(flatten)]
    pub fields: NewSupplier,
}
