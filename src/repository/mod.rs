// ==========================================
// 供应商资质表导入系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// 约束: 连接由构造函数显式注入（共享同一个 Arc<Mutex<Connection>>）
// ==========================================

pub mod error;
pub mod score_repo;
pub mod supplier_repo;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use score_repo::ScoreRepository;
pub use supplier_repo::SupplierRepository;
