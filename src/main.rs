use axum::{routing::{get, post}, Router};
use inventory_import_rust::{api, create_pool, init_schema, AppConfig, ImportReconciler};
use std::sync::Arc;
use tower::ServiceBuilder;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志 - 使用本地时间格式
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    // 加载配置
    let config = AppConfig::from_env();
    info!("Starting server with config: {:?}", config);

    // 创建数据库连接池并确保表结构
    let pool = create_pool(&config.database.url).await?;
    init_schema(&pool).await?;
    info!("Database pool created");

    // 创建对账服务
    let reconciler = Arc::new(ImportReconciler::new(pool, config.matching.clone()));

    // 构建路由
    let app = Router::new()
        .route("/health", get(api::health_check))
        .route("/api/import/suggest-duplicates", post(api::suggest_duplicates))
        .route("/api/import/commit", post(api::commit_import))
        .with_state(reconciler)
        .layer(ServiceBuilder::new());

    // 启动服务器
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  POST /api/import/suggest-duplicates - score candidate rows, recommend actions");
    info!("  POST /api/import/commit             - apply confirmed batch atomically");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
