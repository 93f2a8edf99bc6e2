//! Pharmacy Server - 多角色药房运营平台服务端
//!
//! # 架构概述
//!
//! 本模块是服务端主入口，提供以下核心功能：
//!
//! - **认证** (`auth`): JWT + Argon2 认证体系，封闭角色枚举门控
//! - **数据库** (`db`): 嵌入式 SurrealDB 存储
//! - **库存台账** (`inventory`): stock 的唯一写入方，批量预留/回补
//! - **处方生命周期** (`prescriptions`): active → completed/expired 状态机
//! - **订单协调器** (`orders`): 库存+订单+处方的全有或全无提交
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! pharmacy-server/src/
//! ├── core/           # 配置、状态、服务器
//! ├── auth/           # JWT 认证、角色门控
//! ├── db/             # 数据库层 (models + repositories)
//! ├── inventory/      # 库存台账
//! ├── prescriptions/  # 处方生命周期
//! ├── orders/         # 订单事务协调器
//! ├── reports/        # 管理端只读汇总
//! ├── api/            # HTTP 路由和处理器
//! └── utils/          # 错误、日志、校验
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod inventory;
pub mod orders;
pub mod prescriptions;
pub mod reports;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use inventory::{InventoryLedger, LedgerError, ReserveLine};
pub use orders::{OrderCommitError, OrderCoordinator};
pub use prescriptions::{LifecycleError, PrescriptionLifecycle};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// 设置进程环境 (dotenv + 日志)
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    utils::logger::init_logger();
    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
    ____  __
   / __ \/ /_  ____ __________ ___  ____ ________  __
  / /_/ / __ \/ __ `/ ___/ __ `__ \/ __ `/ ___/ / / /
 / ____/ / / / /_/ / /  / / / / / / /_/ / /__/ /_/ /
/_/   /_/ /_/\__,_/_/  /_/ /_/ /_/\__,_/\___/\__, /
                                            /____/
    "#
    );
}
