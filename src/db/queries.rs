use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};

use crate::models::{InventoryRecord, NewInventoryRecord};

/// 查询 workspace 下全部库存记录 (评分快照 / 提交前校验快照)
pub async fn list_items(
    pool: &SqlitePool,
    workspace_id: i64,
) -> Result<Vec<InventoryRecord>, sqlx::Error> {
    sqlx::query_as::<_, InventoryRecord>(
        r#"
        SELECT id, workspace_id, name, normalized_name, vendor, category,
               quantity, unit, low_stock_threshold, status, updated_at
        FROM inventory_items
        WHERE workspace_id = ?
        ORDER BY id
        "#,
    )
    .bind(workspace_id)
    .fetch_all(pool)
    .await
}

/// 按 id 查询单条记录 (workspace 约束), 事务内使用
pub async fn get_item(
    conn: &mut SqliteConnection,
    workspace_id: i64,
    item_id: i64,
) -> Result<Option<InventoryRecord>, sqlx::Error> {
    sqlx::query_as::<_, InventoryRecord>(
        r#"
        SELECT id, workspace_id, name, normalized_name, vendor, category,
               quantity, unit, low_stock_threshold, status, updated_at
        FROM inventory_items
        WHERE workspace_id = ? AND id = ?
        "#,
    )
    .bind(workspace_id)
    .bind(item_id)
    .fetch_optional(conn)
    .await
}

/// 按规范名查询 (auto 行的事务内兜底匹配, 能看到同批次先插入的行)
pub async fn find_by_normalized_name(
    conn: &mut SqliteConnection,
    workspace_id: i64,
    normalized_name: &str,
) -> Result<Option<InventoryRecord>, sqlx::Error> {
    sqlx::query_as::<_, InventoryRecord>(
        r#"
        SELECT id, workspace_id, name, normalized_name, vendor, category,
               quantity, unit, low_stock_threshold, status, updated_at
        FROM inventory_items
        WHERE workspace_id = ? AND normalized_name = ?
        ORDER BY id
        LIMIT 1
        "#,
    )
    .bind(workspace_id)
    .bind(normalized_name)
    .fetch_optional(conn)
    .await
}

/// 插入新记录, 返回自增 id
pub async fn insert_item(
    conn: &mut SqliteConnection,
    record: &NewInventoryRecord,
) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO inventory_items (
            workspace_id, name, normalized_name, vendor, category,
            quantity, unit, low_stock_threshold, status, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(record.workspace_id)
    .bind(&record.name)
    .bind(&record.normalized_name)
    .bind(record.vendor.clone())
    .bind(&record.category)
    .bind(record.quantity)
    .bind(&record.unit)
    .bind(record.low_stock_threshold)
    .bind(record.status)
    .bind(Utc::now())
    .execute(conn)
    .await?;
    Ok(result.last_insert_rowid())
}

/// 覆写记录的可变字段 (合并路径)
pub async fn update_item(
    conn: &mut SqliteConnection,
    record: &InventoryRecord,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE inventory_items
        SET quantity = ?, vendor = ?, category = ?, unit = ?,
            status = ?, updated_at = ?
        WHERE workspace_id = ? AND id = ?
        "#,
    )
    .bind(record.quantity)
    .bind(record.vendor.clone())
    .bind(&record.category)
    .bind(&record.unit)
    .bind(record.status)
    .bind(Utc::now())
    .bind(record.workspace_id)
    .bind(record.id)
    .execute(conn)
    .await?;
    Ok(())
}
