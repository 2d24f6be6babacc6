use thiserror::Error;

/// 导入对账统一 Result 类型
pub type Result<T> = std::result::Result<T, ImportError>;

/// 导入对账错误分类
///
/// 校验类错误携带 `import_index`, 便于调用方定位出错的行。
/// 任何一行出错, 整个批次拒绝, 不做部分提交。
#[derive(Error, Debug)]
pub enum ImportError {
    /// 批次中仍有未裁决 (review) 的行
    #[error("row {import_index} ('{name}'): duplicate review not resolved, choose merge or create_new")]
    UnresolvedDuplicate { import_index: usize, name: String },

    /// merge/auto 行的合并目标不存在或无法解析
    #[error("row {import_index} ('{name}'): no valid merge target")]
    InvalidMergeTarget { import_index: usize, name: String },

    /// 行字段非法 (负数量、空名称等)
    #[error("row {import_index}: {message}")]
    Validation { import_index: usize, message: String },

    /// 数据库错误
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ImportError {
    /// 是否调用方可修正的请求错误 (对应 HTTP 400)
    pub fn is_client_error(&self) -> bool {
        !matches!(self, ImportError::Database(_))
    }
}
