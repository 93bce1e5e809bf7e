//! 答题会话 - 流程层
//!
//! 持有一次作答的全部状态：题目集、展示投影、已收集的作答、
//! 倒计时。批改失败后状态机带着同一个会话回到 Quiz 状态，
//! 题目与作答原样保留。

use anyhow::Result;
use std::collections::HashMap;
use tokio::sync::mpsc;

use crate::models::{Question, QuestionView, UserAnswer};
use crate::workflow::timer::CountdownTimer;

/// 答题会话
pub struct QuizSession {
    questions: Vec<Question>,
    views: Vec<QuestionView>,
    /// 按题目 id 收集的作答；同一题重复作答时后写覆盖先写
    answers: HashMap<u32, String>,
    time_limit_secs: u64,
    timer: Option<CountdownTimer>,
    expired_rx: Option<mpsc::Receiver<()>>,
}

impl QuizSession {
    /// 创建会话并启动倒计时（时限为 0 时不启动）
    ///
    /// 展示投影只构建一次，打乱结果在整个会话内保持稳定
    pub fn new(questions: Vec<Question>, time_limit_secs: u64) -> Self {
        let mut rng = rand::thread_rng();
        let views = questions
            .iter()
            .map(|q| QuestionView::from_question(q, &mut rng))
            .collect();

        let mut session = Self {
            questions,
            views,
            answers: HashMap::new(),
            time_limit_secs,
            timer: None,
            expired_rx: None,
        };
        session.start_timer();
        session
    }

    fn start_timer(&mut self) {
        if self.time_limit_secs == 0 {
            return;
        }
        let (tx, rx) = mpsc::channel(1);
        self.timer = Some(CountdownTimer::start(self.time_limit_secs, tx));
        self.expired_rx = Some(rx);
    }

    /// 取消倒计时；必须在离开 Quiz 状态的每条路径上调用
    pub fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
        self.expired_rx = None;
    }

    /// 重新开始倒计时（批改失败后回到本会话时使用，从满时限重新计）
    pub fn restart_timer(&mut self) {
        self.cancel_timer();
        self.start_timer();
    }

    /// 记录一次作答；同一题重复作答时后写覆盖先写
    pub fn record_answer(&mut self, question_id: u32, answer: impl Into<String>) -> Result<()> {
        if !self.questions.iter().any(|q| q.id == question_id) {
            anyhow::bail!("未知题目 id: {}", question_id);
        }
        self.answers.insert(question_id, answer.into());
        Ok(())
    }

    /// 完整题目列表（含标准答案，仅供批改环节使用）
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// 剥离答案信息后的展示投影
    pub fn views(&self) -> &[QuestionView] {
        &self.views
    }

    /// 某题当前的作答
    pub fn answer(&self, question_id: u32) -> Option<&str> {
        self.answers.get(&question_id).map(|s| s.as_str())
    }

    /// 已作答的题数
    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    /// 配置的时限（秒），0 表示不限时
    pub fn time_limit_secs(&self) -> u64 {
        self.time_limit_secs
    }

    /// 产出最终作答列表：每题一条、按题目顺序，未作答以空字符串提交
    pub fn finalize_answers(&self) -> Vec<UserAnswer> {
        self.questions
            .iter()
            .map(|q| UserAnswer {
                question_id: q.id,
                answer: self.answers.get(&q.id).cloned().unwrap_or_default(),
            })
            .collect()
    }

    /// 等待倒计时到期（强制交卷信号）
    ///
    /// 不限时或倒计时已取消时永远挂起
    pub async fn expired(&mut self) {
        match self.expired_rx.as_mut() {
            Some(rx) => {
                if rx.recv().await.is_none() {
                    // 发送端已被取消，信号不会再来
                    std::future::pending::<()>().await;
                }
            }
            None => std::future::pending::<()>().await,
        }
    }
}
