//! 批改结果数据契约 - 数据层

use serde::{Deserialize, Serialize};

use crate::models::quiz::Question;

/// 批改后的一道题
///
/// 由批改环节产出，此后不可变
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradedQuestion {
    /// 原题（含题干与题型专属字段）
    #[serde(flatten)]
    pub question: Question,
    /// 用户提交的作答
    pub user_answer: String,
    /// 是否判定为正确
    pub is_correct: bool,
    /// 得分，取值范围 [0, 1]
    pub score: f64,
    /// 解析说明
    pub explanation: String,
    /// 具体纠正；答对时为肯定语
    pub ai_correction: String,
}

/// 一次测验的最终结果
///
/// `graded_questions` 的顺序与生成的题目顺序一致；重新开始时丢弃
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    /// 实得总分
    pub total_score: f64,
    /// 满分
    pub max_score: f64,
    /// 按原题顺序排列的批改明细
    pub graded_questions: Vec<GradedQuestion>,
    /// 总体评语
    pub overall_feedback: String,
}

impl QuizResult {
    /// 得分率（百分比）
    pub fn percentage(&self) -> f64 {
        if self.max_score <= 0.0 {
            0.0
        } else {
            self.total_score / self.max_score * 100.0
        }
    }
}
