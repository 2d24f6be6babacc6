use crate::error::ImportError;
use crate::models::{CandidateItem, CommitDecision, DuplicateSuggestion, InventoryRecord};
use crate::service::ImportReconciler;
use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 请求体: 查重 (workspace 显式入参, 认证/会话在上游)
#[derive(Debug, Deserialize)]
pub struct SuggestDuplicatesRequest {
    pub workspace_id: i64,
    pub items: Vec<CandidateItem>,
}

/// 响应体: 每个输入行一条建议, 按 import_index 对应
#[derive(Debug, Serialize)]
pub struct SuggestDuplicatesResponse {
    pub suggestions: Vec<DuplicateSuggestion>,
}

/// 请求体: 提交批次
#[derive(Debug, Deserialize)]
pub struct CommitImportRequest {
    pub workspace_id: i64,
    pub items: Vec<CommitDecision>,
}

/// 响应体: 提交结果 (全部生效才会 success)
#[derive(Debug, Serialize)]
pub struct CommitImportResponse {
    pub success: bool,
    pub message: String,
    pub items: Vec<InventoryRecord>,
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

/// 批量查重接口
pub async fn suggest_duplicates(
    State(reconciler): State<Arc<ImportReconciler>>,
    Json(req): Json<SuggestDuplicatesRequest>,
) -> Response {
    match reconciler.suggest_duplicates(req.workspace_id, &req.items).await {
        Ok(suggestions) => {
            (StatusCode::OK, Json(SuggestDuplicatesResponse { suggestions })).into_response()
        }
        Err(e) => error_response(e),
    }
}

/// 提交导入批次接口 (全有或全无)
pub async fn commit_import(
    State(reconciler): State<Arc<ImportReconciler>>,
    Json(req): Json<CommitImportRequest>,
) -> Response {
    match reconciler.commit_import(req.workspace_id, &req.items).await {
        Ok(items) => {
            let response = CommitImportResponse {
                success: true,
                message: format!("Committed {} rows, {} records affected", req.items.len(), items.len()),
                items,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response(e),
    }
}

/// 校验类错误 400, 其余 500; message 带 import_index 定位出错行
fn error_response(e: ImportError) -> Response {
    let status = if e.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    let response = CommitImportResponse {
        success: false,
        message: format!("Error: {}", e),
        items: Vec::new(),
    };
    (status, Json(response)).into_response()
}
