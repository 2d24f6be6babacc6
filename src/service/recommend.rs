//! 推荐引擎: 把排好序的匹配列表映射成唯一的推荐动作。
//! 决策表是全函数 —— 每条候选行恰好得到一个 recommended_action。

use crate::models::{
    CandidateItem, DuplicateAction, DuplicateCandidateMatch, DuplicateSuggestion,
};
use crate::service::scorer::MatchConfig;

/// 生成单行查重建议
pub fn recommend(
    import_index: usize,
    candidate: &CandidateItem,
    matches: Vec<DuplicateCandidateMatch>,
    config: &MatchConfig,
) -> DuplicateSuggestion {
    let (recommended_action, recommended_merge_target) = decide(&matches, config);
    DuplicateSuggestion {
        import_index,
        import_name: candidate.name.clone(),
        import_unit: candidate.unit.clone(),
        candidates: matches,
        recommended_action,
        recommended_merge_target,
    }
}

/// 决策表 (见模块注释), matches 已按得分降序排列
///
/// 1. 无候选 → create_new
/// 2. 最佳 ≥ high 且单位可比且无近分竞争者 → auto, 目标 = 最佳记录
/// 3. 最佳 ≥ high 但单位不可比 → review (名称相同不足以抵消量纲冲突)
/// 4. 前两名差距 ≤ ambiguity_delta → review (两个都说得通, 转人工)
/// 5. 其余 (最佳落在疑似区间) → review
fn decide(
    matches: &[DuplicateCandidateMatch],
    config: &MatchConfig,
) -> (DuplicateAction, Option<i64>) {
    let Some(best) = matches.first() else {
        return (DuplicateAction::CreateNew, None);
    };

    if best.similarity_score >= config.high_threshold {
        if !best.unit_compatible {
            return (DuplicateAction::Review, None);
        }
        let contested = matches
            .get(1)
            .map(|second| best.similarity_score - second.similarity_score <= config.ambiguity_delta)
            .unwrap_or(false);
        if contested {
            return (DuplicateAction::Review, None);
        }
        return (DuplicateAction::Auto, Some(best.record_id));
    }

    (DuplicateAction::Review, None)
}
