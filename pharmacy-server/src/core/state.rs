use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::JwtService;
use crate::core::Config;
use crate::db::DbService;
use crate::inventory::InventoryLedger;
use crate::orders::OrderCoordinator;

/// 服务器状态 - 持有所有服务的单例引用
///
/// 进程启动时构造一次，经 axum `State` 注入所有 handler；
/// Arc 浅拷贝，克隆成本极低。持久化句柄和协调器都在这里显式
/// 组装，请求路径上不会重建任何连接。
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | db | Surreal<Db> | 嵌入式数据库 |
/// | jwt_service | Arc<JwtService> | JWT 认证服务 |
/// | ledger | Arc<InventoryLedger> | 库存台账 (stock 唯一写入方) |
/// | coordinator | Arc<OrderCoordinator> | 订单事务协调器 |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 嵌入式数据库 (SurrealDB)
    pub db: Surreal<Db>,
    /// JWT 认证服务
    pub jwt_service: Arc<JwtService>,
    /// 库存台账
    pub ledger: Arc<InventoryLedger>,
    /// 订单事务协调器
    pub coordinator: Arc<OrderCoordinator>,
}

impl ServerState {
    /// 由已打开的数据库句柄组装状态 (测试和 initialize 共用)
    pub fn with_db(config: Config, db: Surreal<Db>) -> Self {
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let ledger = Arc::new(InventoryLedger::new(db.clone()));
        let coordinator = Arc::new(OrderCoordinator::new(db.clone(), ledger.clone()));

        Self {
            config,
            db,
            jwt_service,
            ledger,
            coordinator,
        }
    }

    /// 初始化服务器状态
    ///
    /// 1. 确保工作目录结构存在
    /// 2. 打开数据库 (work_dir/database)
    /// 3. 组装 JWT / 台账 / 协调器
    ///
    /// # Panics
    ///
    /// 工作目录或数据库初始化失败时 panic（启动期致命错误）
    pub async fn initialize(config: &Config) -> Self {
        config
            .ensure_work_dir_structure()
            .expect("Failed to create work directory structure");

        let db_service = DbService::new(config.database_dir())
            .await
            .expect("Failed to initialize database");

        Self::with_db(config.clone(), db_service.db)
    }

    /// 获取数据库实例
    pub fn get_db(&self) -> Surreal<Db> {
        self.db.clone()
    }

    /// 获取 JWT 服务
    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }
}
