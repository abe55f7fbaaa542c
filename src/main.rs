use receipts_api::{
    app::{self, AppState},
    config::{Config, DEFAULT_CONFIG_PATH},
    infrastructure::{DatabaseManager, Logger},
    AppError,
};
use std::env;
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let config_path = env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("加载配置失败 ({}): {}", config_path, e);
            std::process::exit(1);
        }
    };

    Logger::init(&config.logging.level);

    if let Err(e) = run(config).await {
        error!("{}", e);
        std::process::exit(1);
    }

    info!("服务已停止");
}

async fn run(config: Config) -> receipts_api::Result<()> {
    let database = DatabaseManager::new(&config.database).await?;
    let state = AppState::new(database.into_pool(), &config);

    state
        .receipt_service
        .ensure_dir()
        .await
        .map_err(AppError::Storage)?;
    info!("收据目录: {:?}", state.receipt_service.dir());

    let router = app::build_router(state, &config);

    let addr = config.server_address();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| AppError::Bind {
            addr: addr.clone(),
            source,
        })?;

    info!("🚀 服务运行在 http://{}", addr);
    info!("📖 API 端点:");
    for endpoint in app::endpoints(&config) {
        info!("   {}", endpoint);
    }

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Serve)
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("无法监听 Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("无法监听 SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("收到 Ctrl+C 信号"),
        _ = terminate => info!("收到 SIGTERM 信号"),
    }

    info!("正在优雅关闭...");
}
