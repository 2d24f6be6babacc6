//! 相似度评分: 候选行 vs 同 workspace 库存快照。
//! 纯函数、无随机、无时钟依赖 —— 同样输入必然同样输出。

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::models::{CandidateItem, DuplicateCandidateMatch, InventoryRecord};
use crate::service::normalizer;

/// 复合得分权重: 名称主导, 单位/分类只作加成
const NAME_WEIGHT: f64 = 0.90;
const UNIT_BONUS: f64 = 0.07;
const CATEGORY_BONUS: f64 = 0.03;

/// 匹配阈值配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchConfig {
    /// ≥ high: 近乎确定重复
    pub high_threshold: f64,
    /// [low, high): 疑似区间; < low: 不算重复信号, 直接丢弃
    pub low_threshold: f64,
    /// 前两名差距 ≤ delta 视为真歧义, 转人工
    pub ambiguity_delta: f64,
    /// 每行最多返回的候选数
    pub top_n: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            high_threshold: 0.92,
            low_threshold: 0.60,
            ambiguity_delta: 0.05,
            top_n: 5,
        }
    }
}

/// 对单条候选行评分, 返回得分降序的匹配列表
///
/// 排序: 得分降序, 同分按 record_id 升序保证确定性; 低于 low_threshold
/// 的记录直接省略而不是当作噪声展示; 截断 top_n。
/// 单位量纲不可比时得分封顶在 high_threshold 之下, 名称完全一致也进不了
/// auto 区间。
pub fn score_candidate(
    candidate: &CandidateItem,
    records: &[InventoryRecord],
    config: &MatchConfig,
) -> Vec<DuplicateCandidateMatch> {
    let normalized_name = normalizer::normalize_name(&candidate.name);
    let unit_norm = normalizer::normalize_unit(candidate.unit.as_deref());
    let category_norm = normalizer::normalize_category(candidate.category.as_deref());

    let mut matches: Vec<DuplicateCandidateMatch> = Vec::new();
    for record in records {
        let name_sim = strsim::normalized_levenshtein(&normalized_name, &record.normalized_name);
        let record_unit_norm = normalizer::normalize_unit(Some(&record.unit));
        let unit_match = record_unit_norm == unit_norm;
        let unit_compatible = normalizer::units_compatible(&unit_norm, &record_unit_norm);
        let category_match = category_norm.as_deref() == Some(record.category.as_str());

        let mut score = name_sim * NAME_WEIGHT;
        if unit_match {
            score += UNIT_BONUS;
        }
        if category_match {
            score += CATEGORY_BONUS;
        }
        score = score.min(1.0);
        if !unit_compatible {
            score = score.min(config.high_threshold - 0.01);
        }
        if score < config.low_threshold {
            continue;
        }

        let exact = normalized_name == record.normalized_name;
        let mut reason = if exact {
            "exact name match".to_string()
        } else {
            "similar name".to_string()
        };
        if !unit_compatible {
            reason.push_str(", unit mismatch");
        }

        matches.push(DuplicateCandidateMatch {
            record_id: record.id,
            name: record.name.clone(),
            unit: record.unit.clone(),
            category: record.category.clone(),
            quantity: record.quantity,
            similarity_score: round3(score),
            reason,
            unit_compatible,
        });
    }

    matches.sort_by(|a, b| {
        b.similarity_score
            .partial_cmp(&a.similarity_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.record_id.cmp(&b.record_id))
    });
    matches.truncate(config.top_n);
    matches
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}
