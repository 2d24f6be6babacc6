//! 提交对账集成测试: 真实 SQLite 事务上的原子性/合并语义。

use inventory_import_rust::db::{init_schema, queries};
use inventory_import_rust::models::{
    CandidateItem, CommitDecision, DuplicateAction, InventoryStatus, NewInventoryRecord,
};
use inventory_import_rust::service::normalizer;
use inventory_import_rust::{ImportError, ImportReconciler, MatchConfig};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

async fn test_pool() -> SqlitePool {
    // 内存库必须单连接, 否则每个连接各自一张空库
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    init_schema(&pool).await.unwrap();
    pool
}

fn reconciler(pool: &SqlitePool) -> ImportReconciler {
    ImportReconciler::new(pool.clone(), MatchConfig::default())
}

async fn seed(
    pool: &SqlitePool,
    workspace_id: i64,
    name: &str,
    unit: &str,
    quantity: f64,
    threshold: f64,
    status: InventoryStatus,
) -> i64 {
    let mut conn = pool.acquire().await.unwrap();
    queries::insert_item(
        &mut conn,
        &NewInventoryRecord {
            workspace_id,
            name: name.to_string(),
            normalized_name: normalizer::normalize_name(name),
            vendor: None,
            category: "general".to_string(),
            quantity,
            unit: unit.to_string(),
            low_stock_threshold: threshold,
            status,
        },
    )
    .await
    .unwrap()
}

fn decision(name: &str, unit: &str, quantity: f64, action: DuplicateAction) -> CommitDecision {
    CommitDecision {
        name: name.to_string(),
        quantity,
        unit: Some(unit.to_string()),
        category: None,
        vendor: None,
        price: None,
        duplicate_action: action,
        merge_target: None,
        low_stock_threshold: None,
    }
}

fn candidate(name: &str, unit: &str, quantity: f64) -> CandidateItem {
    CandidateItem {
        name: name.to_string(),
        quantity,
        unit: Some(unit.to_string()),
        category: None,
        vendor: None,
        price: None,
    }
}

#[tokio::test]
async fn auto_merge_at_threshold_boundary_stays_low_stock() {
    // {id, "Paper Towels", case, qty 3, 阈值 5} + 候选 qty 2
    // 合并后 qty 5, 5 ≤ 5 仍 low_stock (含等于边界)
    let pool = test_pool().await;
    let id = seed(&pool, 1, "Paper Towels", "case", 3.0, 5.0, InventoryStatus::LowStock).await;
    let svc = reconciler(&pool);

    let items = svc
        .commit_import(1, &[decision("paper towels", "case", 2.0, DuplicateAction::Auto)])
        .await
        .unwrap();

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, id);
    assert_eq!(items[0].quantity, 5.0);
    assert_eq!(items[0].status, InventoryStatus::LowStock);
}

#[tokio::test]
async fn merge_crossing_threshold_transitions_to_in_stock() {
    let pool = test_pool().await;
    let id = seed(&pool, 1, "Paper Towels", "case", 3.0, 5.0, InventoryStatus::LowStock).await;
    let svc = reconciler(&pool);

    let mut d = decision("Paper Towels", "case", 4.0, DuplicateAction::Merge);
    d.merge_target = Some(id);
    let items = svc.commit_import(1, &[d]).await.unwrap();

    assert_eq!(items[0].quantity, 7.0);
    assert_eq!(items[0].status, InventoryStatus::InStock);
}

#[tokio::test]
async fn merge_adds_exactly_and_leaves_other_records_untouched() {
    let pool = test_pool().await;
    let target = seed(&pool, 1, "Copy Paper", "box", 3.5, 2.0, InventoryStatus::InStock).await;
    let bystander = seed(&pool, 1, "Stapler", "units", 9.0, 2.0, InventoryStatus::InStock).await;
    let svc = reconciler(&pool);

    let mut d = decision("Copy Paper", "box", 2.25, DuplicateAction::Merge);
    d.merge_target = Some(target);
    svc.commit_import(1, &[d]).await.unwrap();

    let all = queries::list_items(&pool, 1).await.unwrap();
    let merged = all.iter().find(|r| r.id == target).unwrap();
    let other = all.iter().find(|r| r.id == bystander).unwrap();
    assert_eq!(merged.quantity, 5.75);
    assert_eq!(other.quantity, 9.0);
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn review_row_rejects_batch_with_zero_side_effects() {
    let pool = test_pool().await;
    seed(&pool, 1, "Stapler", "units", 9.0, 2.0, InventoryStatus::InStock).await;
    let svc = reconciler(&pool);

    let before = queries::list_items(&pool, 1).await.unwrap();
    let batch = vec![
        decision("Brand New Thing", "units", 1.0, DuplicateAction::CreateNew),
        decision("Stapler", "units", 1.0, DuplicateAction::Review),
    ];
    let err = svc.commit_import(1, &batch).await.unwrap_err();
    assert!(matches!(
        err,
        ImportError::UnresolvedDuplicate { import_index: 1, .. }
    ));

    let after = queries::list_items(&pool, 1).await.unwrap();
    assert_eq!(before.len(), after.len());
    assert_eq!(before[0].quantity, after[0].quantity);
}

#[tokio::test]
async fn invalid_merge_target_rejects_whole_batch() {
    let pool = test_pool().await;
    seed(&pool, 1, "Stapler", "units", 9.0, 2.0, InventoryStatus::InStock).await;
    let svc = reconciler(&pool);

    let mut bad = decision("Stapler", "units", 1.0, DuplicateAction::Merge);
    bad.merge_target = Some(9999);
    let batch = vec![
        decision("Brand New Thing", "units", 1.0, DuplicateAction::CreateNew),
        bad,
    ];
    let err = svc.commit_import(1, &batch).await.unwrap_err();
    assert!(matches!(
        err,
        ImportError::InvalidMergeTarget { import_index: 1, .. }
    ));

    // 合法的第一行也不得落库
    let after = queries::list_items(&pool, 1).await.unwrap();
    assert_eq!(after.len(), 1);
}

#[tokio::test]
async fn merging_into_discontinued_changes_quantity_not_status() {
    let pool = test_pool().await;
    let id = seed(&pool, 1, "Fax Paper", "box", 2.0, 5.0, InventoryStatus::Discontinued).await;
    let svc = reconciler(&pool);

    let mut d = decision("Fax Paper", "box", 10.0, DuplicateAction::Merge);
    d.merge_target = Some(id);
    let items = svc.commit_import(1, &[d]).await.unwrap();

    assert_eq!(items[0].quantity, 12.0);
    assert_eq!(items[0].status, InventoryStatus::Discontinued);
}

#[tokio::test]
async fn auto_creates_when_nothing_matches() {
    let pool = test_pool().await;
    let svc = reconciler(&pool);

    let items = svc
        .commit_import(1, &[decision("USB-C Cable", "units", 2.0, DuplicateAction::Auto)])
        .await
        .unwrap();

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].normalized_name, "usb-c cable");
    assert_eq!(items[0].category, "electronics");
    // 默认阈值 1, 2 > 1 → in_stock
    assert_eq!(items[0].status, InventoryStatus::InStock);
    assert_eq!(items[0].low_stock_threshold, 1.0);
}

#[tokio::test]
async fn two_auto_rows_with_same_name_merge_within_batch() {
    // 同批次两条相同 auto 行: 第一条新建, 第二条合并进去, 不产生重复记录
    let pool = test_pool().await;
    let svc = reconciler(&pool);

    let batch = vec![
        decision("Paper Towels", "case", 2.0, DuplicateAction::Auto),
        decision("paper towels", "case", 3.0, DuplicateAction::Auto),
    ];
    let items = svc.commit_import(1, &batch).await.unwrap();

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity, 5.0);
    assert_eq!(queries::list_items(&pool, 1).await.unwrap().len(), 1);
}

#[tokio::test]
async fn merge_target_is_scoped_to_workspace() {
    let pool = test_pool().await;
    let foreign_id = seed(&pool, 1, "Stapler", "units", 9.0, 2.0, InventoryStatus::InStock).await;
    let svc = reconciler(&pool);

    let mut d = decision("Stapler", "units", 1.0, DuplicateAction::Merge);
    d.merge_target = Some(foreign_id);
    // workspace 2 看不到 workspace 1 的记录
    let err = svc.commit_import(2, &[d]).await.unwrap_err();
    assert!(matches!(err, ImportError::InvalidMergeTarget { .. }));
    assert!(queries::list_items(&pool, 2).await.unwrap().is_empty());
}

#[tokio::test]
async fn unit_conflict_merge_without_target_fails() {
    // flour(kg) vs flour(bags) 量纲冲突 → 推荐 review 无目标,
    // merge 行又没给显式目标 → InvalidMergeTarget
    let pool = test_pool().await;
    seed(&pool, 1, "Flour", "bags", 4.0, 2.0, InventoryStatus::InStock).await;
    let svc = reconciler(&pool);

    let err = svc
        .commit_import(1, &[decision("flour", "kg", 10.0, DuplicateAction::Merge)])
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ImportError::InvalidMergeTarget { import_index: 0, .. }
    ));
    assert_eq!(queries::list_items(&pool, 1).await.unwrap().len(), 1);
}

#[tokio::test]
async fn created_records_return_in_first_touch_order() {
    let pool = test_pool().await;
    let svc = reconciler(&pool);

    let batch = vec![
        decision("Alpha Widget", "units", 1.0, DuplicateAction::CreateNew),
        decision("Beta Widget", "units", 1.0, DuplicateAction::CreateNew),
    ];
    let items = svc.commit_import(1, &batch).await.unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].name, "Alpha Widget");
    assert_eq!(items[1].name, "Beta Widget");
}

#[tokio::test]
async fn create_honors_caller_supplied_threshold() {
    let pool = test_pool().await;
    let svc = reconciler(&pool);

    let mut d = decision("Printer Ink", "units", 5.0, DuplicateAction::CreateNew);
    d.low_stock_threshold = Some(5.0);
    let items = svc.commit_import(1, &[d]).await.unwrap();
    // 5 ≤ 5 → low_stock
    assert_eq!(items[0].status, InventoryStatus::LowStock);
    assert_eq!(items[0].low_stock_threshold, 5.0);
}

#[tokio::test]
async fn suggest_recommends_auto_for_confident_match() {
    let pool = test_pool().await;
    let id = seed(&pool, 1, "Paper Towels", "case", 3.0, 5.0, InventoryStatus::LowStock).await;
    let svc = reconciler(&pool);

    let suggestions = svc
        .suggest_duplicates(1, &[candidate("paper towels", "case", 2.0)])
        .await
        .unwrap();

    assert_eq!(suggestions.len(), 1);
    assert_eq!(suggestions[0].import_index, 0);
    assert_eq!(suggestions[0].recommended_action, DuplicateAction::Auto);
    assert_eq!(suggestions[0].recommended_merge_target, Some(id));
    assert_eq!(suggestions[0].candidates[0].record_id, id);
}

#[tokio::test]
async fn suggest_is_deterministic_across_calls() {
    let pool = test_pool().await;
    seed(&pool, 1, "Paper Towels", "case", 3.0, 5.0, InventoryStatus::LowStock).await;
    seed(&pool, 1, "Paper Towel", "case", 1.0, 5.0, InventoryStatus::LowStock).await;
    let svc = reconciler(&pool);

    let items = vec![
        candidate("paper towels", "case", 2.0),
        candidate("flour", "kg", 10.0),
    ];
    let first = svc.suggest_duplicates(1, &items).await.unwrap();
    let second = svc.suggest_duplicates(1, &items).await.unwrap();
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[tokio::test]
async fn suggest_scopes_to_workspace() {
    let pool = test_pool().await;
    seed(&pool, 1, "Paper Towels", "case", 3.0, 5.0, InventoryStatus::LowStock).await;
    let svc = reconciler(&pool);

    let suggestions = svc
        .suggest_duplicates(2, &[candidate("paper towels", "case", 2.0)])
        .await
        .unwrap();
    assert_eq!(suggestions[0].recommended_action, DuplicateAction::CreateNew);
    assert!(suggestions[0].candidates.is_empty());
}
