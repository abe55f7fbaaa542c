//! 应用层：路由、共享状态与各资源的处理器

pub mod health;
pub mod product;
pub mod receipt;

use axum::{extract::DefaultBodyLimit, middleware, routing::get, Router};
use tower::ServiceBuilder;

use crate::{
    config::Config,
    core::middleware::{cors_layer, request_logging_middleware},
    infrastructure::database::DatabasePool,
};
use product::service::ProductService;
use receipt::service::ReceiptService;

/// 显式构造的应用状态，替代进程级全局变量
#[derive(Clone)]
pub struct AppState {
    pub db: DatabasePool,
    pub product_service: ProductService,
    pub receipt_service: ReceiptService,
}

impl AppState {
    pub fn new(db: DatabasePool, config: &Config) -> Self {
        Self {
            product_service: ProductService::new(db.clone(), &config.database.product_table),
            receipt_service: ReceiptService::new(&config.storage.receipt_directory),
            db,
        }
    }
}

/// 注册全部路由，每个请求都经过日志与 CORS 中间件
pub fn build_router(state: AppState, config: &Config) -> Router {
    let base = config.server.base_path.as_str();

    Router::new()
        .route(
            &format!("{}/receipts", base),
            get(receipt::handler::list_receipts)
                .post(receipt::handler::upload_receipt)
                .layer(DefaultBodyLimit::max(config.storage.max_upload_size)),
        )
        .route(
            &format!("{}/receipts/*filename", base),
            get(receipt::handler::download_receipt),
        )
        .route(
            &format!("{}/products", base),
            get(product::handler::list_products),
        )
        .route(&format!("{}/health", base), get(health::health_check))
        .route(
            &format!("{}/health/ready", base),
            get(health::readiness_check),
        )
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_logging_middleware))
                .layer(cors_layer()),
        )
        .with_state(state)
}

/// 启动日志中列出的端点
pub fn endpoints(config: &Config) -> Vec<String> {
    let base = config.server.base_path.as_str();
    [
        ("GET", "/receipts"),
        ("POST", "/receipts"),
        ("GET", "/receipts/{filename}"),
        ("GET", "/products"),
        ("GET", "/health"),
        ("GET", "/health/ready"),
    ]
    .iter()
    .map(|(method, path)| format!("{:<6} {}{}", method, base, path))
    .collect()
}
