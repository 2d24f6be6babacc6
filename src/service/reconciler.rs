use std::sync::Arc;

use dashmap::DashMap;
use indexmap::IndexMap;
use rayon::prelude::*;
use sqlx::{SqliteConnection, SqlitePool};
use tokio::sync::Mutex;
use tracing::info;

use crate::db::queries;
use crate::error::{ImportError, Result};
use crate::models::{
    status_for_new, CandidateItem, CommitDecision, DuplicateAction, DuplicateSuggestion,
    InventoryRecord, NewInventoryRecord,
};
use crate::service::normalizer;
use crate::service::recommend;
use crate::service::scorer::{self, MatchConfig};

/// 新建记录的系统默认低库存阈值
const DEFAULT_LOW_STOCK_THRESHOLD: f64 = 1.0;

/// 校验通过后的单行执行计划
#[derive(Debug)]
enum ResolvedOp<'a> {
    /// 插入新记录
    Create {
        import_index: usize,
        decision: &'a CommitDecision,
    },
    /// 合并到已确定的目标记录
    Merge {
        import_index: usize,
        decision: &'a CommitDecision,
        target_id: i64,
    },
    /// auto 且快照中无推荐目标: 事务内按规范名兜底匹配
    /// (能看到同批次先插入的行), 无匹配则新建
    AutoUpsert {
        import_index: usize,
        decision: &'a CommitDecision,
    },
}

/// 导入对账服务
///
/// 评分/推荐是只读纯计算, 可跨行并行; 提交是唯一的写路径,
/// 同一 workspace 串行执行, 批次内全部写入落在一个事务里。
pub struct ImportReconciler {
    pool: SqlitePool,
    config: MatchConfig,
    /// workspace 级写锁表
    workspace_locks: DashMap<i64, Arc<Mutex<()>>>,
}

impl ImportReconciler {
    pub fn new(pool: SqlitePool, config: MatchConfig) -> Self {
        Self {
            pool,
            config,
            workspace_locks: DashMap::new(),
        }
    }

    /// 批量查重: 每行候选独立评分, 返回与输入同序的建议列表
    pub async fn suggest_duplicates(
        &self,
        workspace_id: i64,
        items: &[CandidateItem],
    ) -> Result<Vec<DuplicateSuggestion>> {
        let snapshot = queries::list_items(&self.pool, workspace_id).await?;
        info!(
            "Workspace {}: 查重 {} 行候选, 库存快照 {} 条",
            workspace_id,
            items.len(),
            snapshot.len()
        );

        // 每行只读共享快照, 相互独立, 数据并行
        let suggestions: Vec<DuplicateSuggestion> = items
            .par_iter()
            .enumerate()
            .map(|(idx, item)| {
                let matches = scorer::score_candidate(item, &snapshot, &self.config);
                recommend::recommend(idx, item, matches, &self.config)
            })
            .collect();

        Ok(suggestions)
    }

    /// 提交用户确认后的批次, 全部生效或全部不生效
    ///
    /// Phase 1: 写库前校验整个批次。基于提交时的当前库状态而不是
    /// 评分时的快照 —— 人工评审期间库可能已经变化。
    /// Phase 2: 单事务应用全部决定, 任一失败整体回滚。
    pub async fn commit_import(
        &self,
        workspace_id: i64,
        decisions: &[CommitDecision],
    ) -> Result<Vec<InventoryRecord>> {
        // 同一 workspace 的提交串行化, 防止两笔合并都读到合并前的数量
        let lock = {
            let entry = self
                .workspace_locks
                .entry(workspace_id)
                .or_insert_with(|| Arc::new(Mutex::new(())));
            entry.value().clone()
        };
        let _guard = lock.lock().await;

        // Phase 1: 校验
        let snapshot = queries::list_items(&self.pool, workspace_id).await?;
        let plan = resolve_batch(decisions, &snapshot, &self.config)?;

        // Phase 2: 应用
        let mut tx = self.pool.begin().await?;
        let mut affected: IndexMap<i64, InventoryRecord> = IndexMap::new();
        for op in &plan {
            let record = match op {
                ResolvedOp::Create { decision, .. } => {
                    apply_create(&mut tx, workspace_id, decision).await?
                }
                ResolvedOp::Merge {
                    import_index,
                    decision,
                    target_id,
                } => apply_merge(&mut tx, workspace_id, *target_id, decision, *import_index).await?,
                ResolvedOp::AutoUpsert {
                    import_index,
                    decision,
                } => {
                    let normalized = normalizer::normalize_name(&decision.name);
                    match queries::find_by_normalized_name(&mut tx, workspace_id, &normalized)
                        .await?
                    {
                        Some(existing) => {
                            apply_merge(&mut tx, workspace_id, existing.id, decision, *import_index)
                                .await?
                        }
                        None => apply_create(&mut tx, workspace_id, decision).await?,
                    }
                }
            };
            affected.insert(record.id, record);
        }
        tx.commit().await?;

        info!(
            "Workspace {}: 提交完成, {} 行决定, 影响 {} 条记录",
            workspace_id,
            decisions.len(),
            affected.len()
        );
        Ok(affected.into_values().collect())
    }
}

/// Phase 1: 全批次校验 + 合并目标解析, 纯函数
///
/// 规则 (任一行失败整批拒绝):
/// - review 行未裁决 → UnresolvedDuplicate
/// - 名称为空 / 数量非法 → Validation
/// - merge/auto 行: 显式 merge_target 优先, 必须存在于本 workspace;
///   未给显式目标时现算推荐 —— merge 行无推荐目标即 InvalidMergeTarget,
///   auto 行退化为事务内按规范名兜底匹配
fn resolve_batch<'a>(
    decisions: &'a [CommitDecision],
    snapshot: &[InventoryRecord],
    config: &MatchConfig,
) -> Result<Vec<ResolvedOp<'a>>> {
    let mut plan = Vec::with_capacity(decisions.len());

    for (import_index, decision) in decisions.iter().enumerate() {
        if decision.name.trim().is_empty() {
            return Err(ImportError::Validation {
                import_index,
                message: "name must not be empty".to_string(),
            });
        }
        if !decision.quantity.is_finite() || decision.quantity < 0.0 {
            return Err(ImportError::Validation {
                import_index,
                message: format!("quantity must be a non-negative number, got {}", decision.quantity),
            });
        }
        if let Some(threshold) = decision.low_stock_threshold {
            if !threshold.is_finite() || threshold < 0.0 {
                return Err(ImportError::Validation {
                    import_index,
                    message: format!(
                        "low_stock_threshold must be a non-negative number, got {threshold}"
                    ),
                });
            }
        }

        match decision.duplicate_action {
            DuplicateAction::Review => {
                return Err(ImportError::UnresolvedDuplicate {
                    import_index,
                    name: decision.name.clone(),
                });
            }
            DuplicateAction::CreateNew => {
                plan.push(ResolvedOp::Create {
                    import_index,
                    decision,
                });
            }
            DuplicateAction::Merge | DuplicateAction::Auto => {
                // 显式目标优先于引擎早前的推荐
                if let Some(target_id) = decision.merge_target {
                    if !snapshot.iter().any(|r| r.id == target_id) {
                        return Err(ImportError::InvalidMergeTarget {
                            import_index,
                            name: decision.name.clone(),
                        });
                    }
                    plan.push(ResolvedOp::Merge {
                        import_index,
                        decision,
                        target_id,
                    });
                    continue;
                }

                // 无显式目标: 按当前快照重算推荐 (建议是瞬态的, 不跨请求缓存)
                let candidate = candidate_view(decision);
                let matches = scorer::score_candidate(&candidate, snapshot, config);
                let suggestion = recommend::recommend(import_index, &candidate, matches, config);
                match suggestion.recommended_merge_target {
                    Some(target_id) => plan.push(ResolvedOp::Merge {
                        import_index,
                        decision,
                        target_id,
                    }),
                    None if decision.duplicate_action == DuplicateAction::Merge => {
                        return Err(ImportError::InvalidMergeTarget {
                            import_index,
                            name: decision.name.clone(),
                        });
                    }
                    None => plan.push(ResolvedOp::AutoUpsert {
                        import_index,
                        decision,
                    }),
                }
            }
        }
    }

    Ok(plan)
}

/// 提交行转评分视图
fn candidate_view(decision: &CommitDecision) -> CandidateItem {
    CandidateItem {
        name: decision.name.clone(),
        quantity: decision.quantity,
        unit: decision.unit.clone(),
        category: decision.category.clone(),
        vendor: decision.vendor.clone(),
        price: decision.price,
    }
}

/// 合并: 数量相加, 重算状态, 采纳本次提交给出的 vendor/category/unit
async fn apply_merge(
    conn: &mut SqliteConnection,
    workspace_id: i64,
    target_id: i64,
    decision: &CommitDecision,
    import_index: usize,
) -> Result<InventoryRecord> {
    let Some(mut record) = queries::get_item(conn, workspace_id, target_id).await? else {
        // 校验和应用之间目标消失 (理论上被 workspace 锁挡住, 防御性保留)
        return Err(ImportError::InvalidMergeTarget {
            import_index,
            name: decision.name.clone(),
        });
    };

    record.quantity += decision.quantity;
    if let Some(vendor) = normalizer::normalize_vendor(decision.vendor.as_deref()) {
        record.vendor = Some(vendor);
    }
    if let Some(category) = normalizer::normalize_category(decision.category.as_deref()) {
        record.category = category;
    }
    if let Some(unit) = decision.unit.as_deref() {
        let trimmed = unit.trim();
        if !trimmed.is_empty() {
            record.unit = trimmed.to_string();
        }
    }
    record.status = crate::models::next_status(
        record.status,
        record.quantity,
        record.low_stock_threshold,
    );

    queries::update_item(conn, &record).await?;
    queries::get_item(conn, workspace_id, target_id)
        .await?
        .ok_or(ImportError::Database(sqlx::Error::RowNotFound))
}

/// 新建: 状态由数量 vs 阈值导出
async fn apply_create(
    conn: &mut SqliteConnection,
    workspace_id: i64,
    decision: &CommitDecision,
) -> Result<InventoryRecord> {
    let threshold = decision
        .low_stock_threshold
        .unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD);
    let unit = decision
        .unit
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .unwrap_or("units")
        .to_string();
    let new_record = NewInventoryRecord {
        workspace_id,
        name: decision.name.trim().to_string(),
        normalized_name: normalizer::normalize_name(&decision.name),
        vendor: normalizer::normalize_vendor(decision.vendor.as_deref()),
        category: normalizer::normalize_category(decision.category.as_deref())
            .unwrap_or_else(|| normalizer::suggest_category(&decision.name)),
        quantity: decision.quantity,
        unit,
        low_stock_threshold: threshold,
        status: status_for_new(decision.quantity, threshold),
    };

    let id = queries::insert_item(conn, &new_record).await?;
    queries::get_item(conn, workspace_id, id)
        .await?
        .ok_or(ImportError::Database(sqlx::Error::RowNotFound))
}
