//! 生命周期状态机 - 编排层
//!
//! 整个应用唯一的状态持有者，把生成、作答、批改三段编排为一条
//! 线性流程，并带失败恢复边：
//!
//! ```text
//! Upload → Generating → Quiz → Grading → Results
//!              │                  │          │
//!              └──失败──→ Upload  └──失败──→ Quiz（作答保留）
//!                                 Results ──重新开始──→ Upload
//! ```
//!
//! 状态用携带负载的枚举表示（Quiz 带会话、Results 带结果），
//! 不合法的组合在类型上即不可表示。状态机是单飞的：同一时刻
//! 只有一次配置/一次作答在进行，没有并发或排队的尝试。
//!
//! 协作方失败在这里被吸收为"状态转移 + 用户提示"，不会作为
//! 错误向表现层传播；在错误的状态上触发动作才会返回错误。

use anyhow::Result;
use tracing::{info, warn};

use crate::config::Config;
use crate::models::{QuestionView, QuizConfiguration, QuizResult};
use crate::orchestrator::generation::GenerationOrchestrator;
use crate::orchestrator::grading::GradingOrchestrator;
use crate::services::{GenerationBackend, GradingBackend, LlmGenerator, LlmGrader};
use crate::workflow::QuizSession;

/// 生成阶段的等待提示
pub const GENERATING_MESSAGE: &str = "正在分析课程资料并生成题目…";
/// 批改阶段的等待提示
pub const GRADING_MESSAGE: &str = "正在批改答卷并生成反馈…";

/// 生命周期状态
///
/// 负载随状态走：Quiz 携带答题会话，Results 携带测验结果
pub enum QuizState {
    /// 等待上传步骤提交测验配置（初始状态）
    Upload,
    /// 生成中（等待生成协作方返回，不接受用户输入）
    Generating,
    /// 答题中
    Quiz(QuizSession),
    /// 批改中（等待批改协作方返回，不接受用户输入）
    Grading,
    /// 展示结果
    Results(QuizResult),
}

impl QuizState {
    /// 状态标签（供表现层与日志使用）
    pub fn name(&self) -> &'static str {
        match self {
            QuizState::Upload => "UPLOAD",
            QuizState::Generating => "GENERATING",
            QuizState::Quiz(_) => "QUIZ",
            QuizState::Grading => "GRADING",
            QuizState::Results(_) => "RESULTS",
        }
    }
}

/// 生命周期状态机
pub struct QuizLifecycle<G: GenerationBackend, R: GradingBackend> {
    generation: GenerationOrchestrator<G>,
    grading: GradingOrchestrator<R>,
    state: QuizState,
    /// 最近一次失败的用户提示；下一次成功触发动作时清空
    notice: Option<String>,
}

impl QuizLifecycle<LlmGenerator, LlmGrader> {
    /// 以 LLM 协作方构建状态机
    pub fn from_config(config: &Config) -> Self {
        Self::new(LlmGenerator::new(config), LlmGrader::new(config))
    }
}

impl<G: GenerationBackend, R: GradingBackend> QuizLifecycle<G, R> {
    pub fn new(generator: G, grader: R) -> Self {
        Self {
            generation: GenerationOrchestrator::new(generator),
            grading: GradingOrchestrator::new(grader),
            state: QuizState::Upload,
            notice: None,
        }
    }

    // ========== 表现层接口 ==========

    /// 当前状态
    pub fn state(&self) -> &QuizState {
        &self.state
    }

    /// 最近一次失败的用户提示
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// 等待阶段的提示语（仅 Generating / Grading）
    pub fn loading_message(&self) -> Option<&'static str> {
        match self.state {
            QuizState::Generating => Some(GENERATING_MESSAGE),
            QuizState::Grading => Some(GRADING_MESSAGE),
            _ => None,
        }
    }

    /// 作答阶段的题目投影（已剥离答案信息）
    pub fn question_views(&self) -> Option<&[QuestionView]> {
        match &self.state {
            QuizState::Quiz(session) => Some(session.views()),
            _ => None,
        }
    }

    /// 某题当前的作答（仅 Quiz 状态）
    pub fn current_answer(&self, question_id: u32) -> Option<&str> {
        match &self.state {
            QuizState::Quiz(session) => session.answer(question_id),
            _ => None,
        }
    }

    /// 测验结果（仅 Results 状态）
    pub fn result(&self) -> Option<&QuizResult> {
        match &self.state {
            QuizState::Results(result) => Some(result),
            _ => None,
        }
    }

    // ========== 状态转移 ==========

    /// 提交测验配置: Upload → Generating → Quiz | Upload
    ///
    /// 生成失败时丢弃全部中间状态回到 Upload，配置不自动重试
    pub async fn submit_config(&mut self, config: QuizConfiguration) -> Result<()> {
        if !matches!(self.state, QuizState::Upload) {
            anyhow::bail!("当前状态 {} 不接受新配置", self.state.name());
        }

        self.notice = None;
        let time_limit_secs = config.time_limit_secs;
        self.state = QuizState::Generating;
        info!("⏳ {}", GENERATING_MESSAGE);

        match self.generation.generate(&config).await {
            Ok(questions) => {
                info!("✓ 进入答题阶段，共 {} 道题", questions.len());
                self.state = QuizState::Quiz(QuizSession::new(questions, time_limit_secs));
            }
            Err(failure) => {
                // 完整原因进日志，用户只看到通用提示
                warn!("⚠️ 生成失败: {}", failure);
                self.notice = Some(failure.user_notice().to_string());
                self.state = QuizState::Upload;
            }
        }
        Ok(())
    }

    /// 记录一次作答（仅 Quiz 状态）
    pub fn record_answer(&mut self, question_id: u32, answer: impl Into<String>) -> Result<()> {
        match &mut self.state {
            QuizState::Quiz(session) => session.record_answer(question_id, answer),
            other => anyhow::bail!("当前状态 {} 不接受作答", other.name()),
        }
    }

    /// 等待倒计时到期（强制交卷信号）
    ///
    /// 非 Quiz 状态或不限时的会话永远挂起——离开 Quiz 之后
    /// 迟到的过期信号不会再影响状态机
    pub async fn time_expired(&mut self) {
        match &mut self.state {
            QuizState::Quiz(session) => session.expired().await,
            _ => std::future::pending().await,
        }
    }

    /// 交卷: Quiz → Grading → Results | Quiz
    ///
    /// 手动交卷与超时强制交卷走同一条路径。
    /// 批改失败时带着同一个会话回到 Quiz，作答原样保留，
    /// 倒计时从满时限重新开始
    pub async fn submit_quiz(&mut self) -> Result<()> {
        let state = std::mem::replace(&mut self.state, QuizState::Grading);
        let mut session = match state {
            QuizState::Quiz(session) => session,
            other => {
                let name = other.name();
                self.state = other;
                anyhow::bail!("当前状态 {} 无法交卷", name);
            }
        };

        self.notice = None;
        // 先于一切转移取消倒计时，杜绝过期回调追着改状态
        session.cancel_timer();
        let answers = session.finalize_answers();
        info!("⏳ {}", GRADING_MESSAGE);

        match self.grading.grade(session.questions(), &answers).await {
            Ok(result) => {
                info!(
                    "✓ 进入结果阶段: {:.1} / {:.1}",
                    result.total_score, result.max_score
                );
                self.state = QuizState::Results(result);
            }
            Err(failure) => {
                warn!("⚠️ 批改失败: {}", failure);
                self.notice = Some(failure.user_notice().to_string());
                session.restart_timer();
                self.state = QuizState::Quiz(session);
            }
        }
        Ok(())
    }

    /// 重新开始: Results → Upload
    ///
    /// 清空题目、结果与时限
    pub fn restart(&mut self) -> Result<()> {
        if !matches!(self.state, QuizState::Results(_)) {
            anyhow::bail!("当前状态 {} 无法重新开始", self.state.name());
        }
        self.state = QuizState::Upload;
        self.notice = None;
        info!("🔄 已重置，等待新的测验配置");
        Ok(())
    }
}
