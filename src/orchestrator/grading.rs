//! 批改编排器 - 编排层
//!
//! 围绕一次批改协作方调用的请求/响应适配：
//! 先把作答列表规整为"每题恰好一条"，再委托协作方，
//! 最后把结果按题目原顺序对齐并结算分数。
//! 作答层面的缺失/重复/多余在这里容忍，协作方调用层面仍是全有或全无。

use std::collections::HashMap;
use tracing::{info, warn};

use crate::error::GradingFailure;
use crate::models::{GradedQuestion, Question, QuizResult, UserAnswer};
use crate::services::GradingBackend;

/// 批改编排器
pub struct GradingOrchestrator<B: GradingBackend> {
    backend: B,
}

impl<B: GradingBackend> GradingOrchestrator<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// 执行一次批改
    ///
    /// 成功返回的结果满足：明细与题目同序同长、
    /// 单题得分在 [0, 1]、总分等于各题得分之和
    pub async fn grade(
        &self,
        questions: &[Question],
        answers: &[UserAnswer],
    ) -> Result<QuizResult, GradingFailure> {
        let normalized = normalize_answers(questions, answers);

        info!("📨 调用批改服务: {} 道题", questions.len());

        let result = self
            .backend
            .grade(questions, &normalized)
            .await
            .map_err(GradingFailure::collaborator)?;

        let result = settle(result, questions)?;

        info!(
            "✓ 批改完成: {:.1} / {:.1}",
            result.total_score, result.max_score
        );
        Ok(result)
    }
}

/// 把任意作答列表规整为"每题恰好一条、按题目顺序"
///
/// - 同一题多条作答：后写覆盖先写
/// - 缺失的题：以空字符串补齐
/// - 题目集之外的 id：丢弃
pub(crate) fn normalize_answers(
    questions: &[Question],
    answers: &[UserAnswer],
) -> Vec<UserAnswer> {
    let mut by_id: HashMap<u32, &str> = HashMap::new();
    for answer in answers {
        by_id.insert(answer.question_id, answer.answer.as_str());
    }

    let known: usize = questions
        .iter()
        .filter(|q| by_id.contains_key(&q.id))
        .count();
    if known < by_id.len() {
        warn!("⚠️ 丢弃 {} 条题目集之外的作答", by_id.len() - known);
    }

    questions
        .iter()
        .map(|q| UserAnswer {
            question_id: q.id,
            answer: by_id.get(&q.id).map(|a| a.to_string()).unwrap_or_default(),
        })
        .collect()
}

/// 对齐并结算批改结果
///
/// 协作方返回的明细按题目原顺序重排；缺题或多题视为结果不合法。
/// 单题得分收敛到 [0, 1]，总分重算为各题得分之和；
/// 协作方给出的满分为正时沿用，否则以题数为满分
fn settle(result: QuizResult, questions: &[Question]) -> Result<QuizResult, GradingFailure> {
    if result.graded_questions.len() != questions.len() {
        return Err(GradingFailure::MalformedResult {
            reason: format!(
                "批改明细 {} 条与题目数 {} 不一致",
                result.graded_questions.len(),
                questions.len()
            ),
        });
    }

    let mut by_id: HashMap<u32, GradedQuestion> = HashMap::new();
    for graded in result.graded_questions {
        if by_id.insert(graded.question.id, graded).is_some() {
            return Err(GradingFailure::MalformedResult {
                reason: "批改明细中出现重复题目".to_string(),
            });
        }
    }

    let mut graded_questions = Vec::with_capacity(questions.len());
    for question in questions {
        let mut graded =
            by_id
                .remove(&question.id)
                .ok_or_else(|| GradingFailure::MalformedResult {
                    reason: format!("批改明细缺少题目 {}", question.id),
                })?;
        graded.score = graded.score.clamp(0.0, 1.0);
        graded_questions.push(graded);
    }

    let total_score: f64 = graded_questions.iter().map(|g| g.score).sum();
    let max_score = if result.max_score > 0.0 {
        result.max_score
    } else {
        questions.len() as f64
    };

    Ok(QuizResult {
        total_score,
        max_score,
        graded_questions,
        overall_feedback: result.overall_feedback,
    })
}
