//! 应用程序错误类型
//!
//! 两类边界失败：生成失败与批改失败。
//! 能力层内部使用 `anyhow::Result` 携带上下文，
//! 编排器在边界处转换为这里的类型化失败。

use thiserror::Error;

/// 生成阶段失败
#[derive(Debug, Error)]
pub enum GenerationFailure {
    /// 输入配置校验未通过
    #[error("配置无效: {reason}")]
    InvalidConfig { reason: String },
    /// 生成协作方调用失败（不可达、超时等）
    #[error("生成服务调用失败: {0}")]
    Collaborator(#[source] Box<dyn std::error::Error + Send + Sync>),
    /// 生成协作方返回了空题目列表
    #[error("生成服务返回了空题目列表")]
    EmptyQuestionSet,
    /// 题目集不合法（id 重复、题型与字段不匹配等）
    #[error("生成结果不合法: {reason}")]
    MalformedQuestionSet { reason: String },
}

impl GenerationFailure {
    /// 包装协作方返回的错误
    pub fn collaborator(err: anyhow::Error) -> Self {
        GenerationFailure::Collaborator(err.into())
    }

    /// 给用户的提示语（不暴露内部原因，引导重试）
    pub fn user_notice(&self) -> &'static str {
        "生成测验失败，请确认文档内容可读后重试。"
    }
}

/// 批改阶段失败
#[derive(Debug, Error)]
pub enum GradingFailure {
    /// 批改协作方调用失败（不可达、超时等）
    #[error("批改服务调用失败: {0}")]
    Collaborator(#[source] Box<dyn std::error::Error + Send + Sync>),
    /// 批改结果不合法（题目缺失、顺序错乱等）
    #[error("批改结果不合法: {reason}")]
    MalformedResult { reason: String },
}

impl GradingFailure {
    /// 包装协作方返回的错误
    pub fn collaborator(err: anyhow::Error) -> Self {
        GradingFailure::Collaborator(err.into())
    }

    /// 给用户的提示语（作答已保留，引导重新交卷）
    pub fn user_notice(&self) -> &'static str {
        "批改答卷失败，你的作答已保留，请重新交卷。"
    }
}
