//! # QuizGenius
//!
//! 把课程资料转化为互动测验的 Rust 应用程序：
//! AI 出题 → 限时作答 → AI 批改 → 结果反馈
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 数据层（Models）
//! - `models/` - 配置、题目、作答、批改结果等共享数据契约
//! - `models/loaders` - 测验任务装载（TOML 清单 + 文档编码）
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，封装对外协作方
//! - `LlmGenerator` - AI 出题能力
//! - `LlmGrader` - AI 批改能力
//! - `GenerationBackend` / `GradingBackend` - 协作方契约边界
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一次作答"的完整流程
//! - `QuizSession` - 答题会话（题目、作答、倒计时）
//! - `CountdownTimer` - 可取消的倒计时任务
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/lifecycle` - 生命周期状态机（唯一的状态持有者）
//! - `orchestrator/generation` / `orchestrator/grading` - 协作方调用编排
//!
//! ## 模块结构

pub mod app;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{GenerationFailure, GradingFailure};
pub use models::{
    Difficulty, GradedQuestion, MatchingPair, Question, QuestionType, QuestionView,
    QuizConfiguration, QuizResult, UploadedDocument, UserAnswer,
};
pub use orchestrator::{GenerationOrchestrator, GradingOrchestrator, QuizLifecycle, QuizState};
pub use services::{GenerationBackend, GradingBackend, LlmGenerator, LlmGrader};
pub use workflow::{CountdownTimer, QuizSession};
