//! 业务能力层（Services）
//!
//! 描述"我能做什么"，封装对外协作方：
//! - [`LlmGenerator`] - AI 出题能力
//! - [`LlmGrader`] - AI 批改能力
//!
//! [`GenerationBackend`] / [`GradingBackend`] 是协作方的契约边界，
//! 编排层只依赖契约，不依赖具体实现（测试中以桩实现替换）。

pub mod generator;
pub mod grader;
pub mod llm_chat;

use anyhow::Result;
use regex::Regex;

use crate::models::{Question, QuizConfiguration, QuizResult, UserAnswer};

pub use generator::LlmGenerator;
pub use grader::LlmGrader;
pub use llm_chat::LlmChat;

/// 生成协作方契约
///
/// 输入完整的测验配置，输出有序题目列表；失败时返回错误，
/// 内部不做重试
#[allow(async_fn_in_trait)]
pub trait GenerationBackend {
    async fn generate(&self, config: &QuizConfiguration) -> Result<Vec<Question>>;
}

/// 批改协作方契约
///
/// 输入完整题目列表（含隐藏的标准答案）与作答列表，
/// 输出测验结果；失败时返回错误，内部不做重试
#[allow(async_fn_in_trait)]
pub trait GradingBackend {
    async fn grade(&self, questions: &[Question], answers: &[UserAnswer]) -> Result<QuizResult>;
}

/// 从 LLM 返回内容中提取 JSON 文本
///
/// 模型偶尔会把 JSON 包在 markdown 围栏里，先剥围栏再整体兜底
pub(crate) fn extract_json_block(raw: &str) -> Result<&str> {
    let fence = Regex::new(r"```(?:json)?\s*([\s\S]+?)\s*```")?;
    if let Some(captures) = fence.captures(raw) {
        if let Some(matched) = captures.get(1) {
            return Ok(matched.as_str().trim());
        }
    }
    Ok(raw.trim())
}
