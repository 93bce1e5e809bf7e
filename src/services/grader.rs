//! AI 批改服务 - 业务能力层
//!
//! 只负责"批改一份答卷"能力，不关心流程。
//! 提交给协作方的题目列表包含隐藏的标准答案；
//! 回复按题目原顺序拼装为 [`QuizResult`]。

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, info};

use crate::config::Config;
use crate::models::{GradedQuestion, Question, QuizResult, UserAnswer};
use crate::services::{extract_json_block, GradingBackend, LlmChat};
use crate::utils::logging::truncate_text;

/// 批改回复的长度上限
const GRADING_MAX_TOKENS: u32 = 4096;

/// AI 批改服务
pub struct LlmGrader {
    chat: LlmChat,
    verbose_logging: bool,
}

impl LlmGrader {
    /// 创建新的批改服务
    pub fn new(config: &Config) -> Self {
        Self {
            chat: LlmChat::new(config),
            verbose_logging: config.verbose_logging,
        }
    }

    /// 构建批改消息
    ///
    /// 返回 (user_message, system_message)
    fn build_grading_messages(
        &self,
        questions: &[Question],
        answers: &[UserAnswer],
    ) -> (String, String) {
        let system_message = "你是一位严格而友善的阅卷老师。你依据题目的标准答案判分，\
                             主观题按语义相符程度给分，允许部分得分。\
                             你只返回 JSON，不返回任何其他内容。"
            .to_string();

        let questions_json = serde_json::to_string_pretty(questions).unwrap_or_default();
        let answers_json = serde_json::to_string_pretty(answers).unwrap_or_default();

        let user_message = format!(
            r#"请批改下面这份答卷。

【题目列表（含标准答案）】
{questions}

【学生作答】
{answers}

【批改规则】
1. 每道题满分 1 分，得分取值范围 [0, 1]
2. 选择题/判断题严格按标准答案判分
3. 填空题/简答题按语义判分，意思正确即可得分，部分正确给部分分
4. 连线题按配对正确的比例给分，排序题按顺序正确的程度给分
5. 作答为空字符串视为未作答，得 0 分，并在纠正中给出正确答案
6. explanation 解释判分依据；aiCorrection 在答错时给出具体纠正，答对时给予简短肯定

【输出格式】
只返回一个 JSON 对象，形如：
{{"totalScore": 2.5, "maxScore": 3, "overallFeedback": "总体评语",
  "gradedQuestions": [
    {{"id": 1, "isCorrect": true, "score": 1, "explanation": "…", "aiCorrection": "回答正确"}}
  ]}}

gradedQuestions 必须覆盖每一道题。评语语言与题目语言保持一致。"#,
            questions = questions_json,
            answers = answers_json,
        );

        (user_message, system_message)
    }

    /// 解析批改回复并按题目原顺序拼装结果
    fn parse_grading_reply(
        &self,
        raw: &str,
        questions: &[Question],
        answers: &[UserAnswer],
    ) -> Result<QuizResult> {
        let json = extract_json_block(raw)?;
        let reply: RawGradingReply = serde_json::from_str(json)
            .with_context(|| format!("无法解析批改结果: {}", truncate_text(json, 200)))?;

        let mut graded_by_id: HashMap<u32, RawGradedEntry> = reply
            .graded_questions
            .into_iter()
            .map(|entry| (entry.id, entry))
            .collect();
        let answer_by_id: HashMap<u32, &str> = answers
            .iter()
            .map(|a| (a.question_id, a.answer.as_str()))
            .collect();

        let graded_questions = questions
            .iter()
            .map(|question| {
                let entry = graded_by_id
                    .remove(&question.id)
                    .with_context(|| format!("批改结果缺少题目 {}", question.id))?;
                Ok(GradedQuestion {
                    question: question.clone(),
                    user_answer: answer_by_id
                        .get(&question.id)
                        .map(|a| a.to_string())
                        .unwrap_or_default(),
                    is_correct: entry.is_correct,
                    score: entry.score,
                    explanation: entry.explanation,
                    ai_correction: entry.ai_correction,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(QuizResult {
            total_score: reply.total_score,
            max_score: reply.max_score,
            graded_questions,
            overall_feedback: reply.overall_feedback,
        })
    }
}

impl GradingBackend for LlmGrader {
    async fn grade(&self, questions: &[Question], answers: &[UserAnswer]) -> Result<QuizResult> {
        info!("🧮 开始批改: {} 道题", questions.len());

        let (user_message, system_message) = self.build_grading_messages(questions, answers);

        let response = self
            .chat
            .send(&user_message, Some(&system_message), &[], GRADING_MAX_TOKENS)
            .await?;

        if self.verbose_logging {
            info!("LLM 批改原始返回: {}", truncate_text(&response, 400));
        } else {
            debug!("LLM 批改原始返回: {}", truncate_text(&response, 400));
        }

        self.parse_grading_reply(&response, questions, answers)
    }
}

/// 批改回复的线上格式
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawGradingReply {
    total_score: f64,
    max_score: f64,
    #[serde(default)]
    overall_feedback: String,
    graded_questions: Vec<RawGradedEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawGradedEntry {
    id: u32,
    is_correct: bool,
    score: f64,
    #[serde(default)]
    explanation: String,
    #[serde(default)]
    ai_correction: String,
}
