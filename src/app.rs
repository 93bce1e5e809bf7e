//! 终端应用 - 表现层
//!
//! 用最薄的终端界面驱动完整的测验生命周期：
//! 装载任务 → 生成 → 逐题作答（stdin 与倒计时二选一）→
//! 交卷批改 → 打印结果 → 可选重新开始。
//! 状态机相关的一切判断都委托给编排层，这里只做输入输出。

use anyhow::Result;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::config::Config;
use crate::models::{load_quiz_job, QuestionView, QuizResult};
use crate::orchestrator::{QuizLifecycle, QuizState};
use crate::services::{LlmGenerator, LlmGrader};
use crate::utils::logging::log_startup;

type LlmLifecycle = QuizLifecycle<LlmGenerator, LlmGrader>;
type StdinLines = Lines<BufReader<Stdin>>;

/// 一次作答输入的结果
enum Step {
    Answer(String),
    Expired,
    Eof,
}

/// 应用主结构
pub struct App {
    config: Config,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<()> {
        log_startup(&self.config);

        let job = load_quiz_job(Path::new(&self.config.job_file)).await?;
        let mut lifecycle = QuizLifecycle::from_config(&self.config);
        let mut input = BufReader::new(tokio::io::stdin()).lines();

        loop {
            if let Some(message) = start_generation(&mut lifecycle, job.clone()).await? {
                // 生成失败：提示后结束，重试即重新运行
                eprintln!("{}", message);
                return Ok(());
            }

            self.administer(&mut lifecycle, &mut input).await?;

            match lifecycle.state() {
                QuizState::Results(_) => {
                    if let Some(result) = lifecycle.result() {
                        print_result(result);
                    }
                    println!("\n输入 r 重新开始，其他任意输入退出：");
                    match input.next_line().await? {
                        Some(line) if line.trim().eq_ignore_ascii_case("r") => {
                            lifecycle.restart()?;
                        }
                        _ => return Ok(()),
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    /// 作答阶段：逐题提示，stdin 与倒计时同时等待
    ///
    /// 批改失败后回到题目循环，已有作答保留，直接回车即跳过
    async fn administer(&self, lifecycle: &mut LlmLifecycle, input: &mut StdinLines) -> Result<()> {
        loop {
            let views: Vec<QuestionView> = match lifecycle.question_views() {
                Some(views) => views.to_vec(),
                None => return Ok(()),
            };
            if let QuizState::Quiz(session) = lifecycle.state() {
                print_quiz_header(views.len(), session.time_limit_secs());
            }

            for (idx, view) in views.iter().enumerate() {
                print_question(idx + 1, views.len(), view, lifecycle.current_answer(view.id));

                let step = tokio::select! {
                    line = input.next_line() => match line? {
                        Some(line) => Step::Answer(line),
                        None => Step::Eof,
                    },
                    _ = lifecycle.time_expired() => Step::Expired,
                };

                match step {
                    Step::Answer(line) => {
                        let text = line.trim();
                        // 空输入表示跳过本题/保留原作答
                        if !text.is_empty() {
                            lifecycle.record_answer(view.id, text)?;
                        }
                    }
                    Step::Expired => {
                        println!("\n⏰ 时间到，自动交卷");
                        break;
                    }
                    Step::Eof => {
                        println!("\n输入结束，按当前作答交卷");
                        break;
                    }
                }
            }

            lifecycle.submit_quiz().await?;

            match lifecycle.state() {
                QuizState::Results(_) => return Ok(()),
                QuizState::Quiz(_) => {
                    // 批改失败，作答已保留
                    if let Some(notice) = lifecycle.notice() {
                        eprintln!("{}", notice);
                    }
                    println!("输入 s 直接重新交卷，其他任意输入回到题目修改作答：");
                    match input.next_line().await? {
                        Some(line) if line.trim().eq_ignore_ascii_case("s") => {
                            lifecycle.submit_quiz().await?;
                            if matches!(lifecycle.state(), QuizState::Results(_)) {
                                return Ok(());
                            }
                            if let Some(notice) = lifecycle.notice() {
                                eprintln!("{}", notice);
                            }
                        }
                        Some(_) => {}
                        None => return Ok(()),
                    }
                }
                _ => return Ok(()),
            }
        }
    }
}

/// 提交配置并等待生成结束
///
/// 返回 `Some(提示)` 表示生成失败，`None` 表示已进入答题阶段
async fn start_generation(
    lifecycle: &mut LlmLifecycle,
    job: crate::models::QuizConfiguration,
) -> Result<Option<String>> {
    lifecycle.submit_config(job).await?;
    match lifecycle.state() {
        QuizState::Quiz(_) => Ok(None),
        _ => Ok(Some(
            lifecycle
                .notice()
                .unwrap_or("生成测验失败，请稍后重试。")
                .to_string(),
        )),
    }
}

// ========== 终端展示辅助函数 ==========

fn print_quiz_header(total: usize, time_limit_secs: u64) {
    println!("\n{}", "=".repeat(60));
    println!("📝 测验开始，共 {} 道题", total);
    if time_limit_secs > 0 {
        println!("⏱️ 时间限制: {} 秒，超时将自动交卷", time_limit_secs);
    } else {
        println!("⏱️ 本次测验不限时");
    }
    println!("{}", "=".repeat(60));
}

fn print_question(index: usize, total: usize, view: &QuestionView, current: Option<&str>) {
    println!("\n{}", "─".repeat(40));
    println!("第 {}/{} 题 【{}】", index, total, view.kind.label());
    println!("{}", view.text);

    if let Some(options) = &view.options {
        for (i, option) in options.iter().enumerate() {
            let letter = (b'A' + i as u8) as char;
            println!("  {}. {}", letter, option);
        }
        println!("请输入选项原文或字母：");
    } else if let (Some(left), Some(right)) = (&view.matching_left, &view.matching_right) {
        println!("左列：");
        for (i, item) in left.iter().enumerate() {
            println!("  {}. {}", i + 1, item);
        }
        println!("右列：");
        for (i, item) in right.iter().enumerate() {
            let letter = (b'A' + i as u8) as char;
            println!("  {}. {}", letter, item);
        }
        println!("请按 \"1-B,2-A\" 的格式输入配对：");
    } else if let Some(items) = &view.sequencing_items {
        for (i, item) in items.iter().enumerate() {
            println!("  {}. {}", i + 1, item);
        }
        println!("请按正确顺序输入编号，如 \"3,1,2\"：");
    } else {
        println!("请输入你的答案：");
    }

    if let Some(answer) = current {
        println!("（当前作答: {}，直接回车保留）", answer);
    }
}

fn print_result(result: &QuizResult) {
    println!("\n{}", "=".repeat(60));
    println!(
        "🎯 测验结果: {:.1} / {:.1}（{:.0}%）",
        result.total_score,
        result.max_score,
        result.percentage()
    );
    println!("{}", "=".repeat(60));

    for (idx, graded) in result.graded_questions.iter().enumerate() {
        let mark = if graded.is_correct { "✓" } else { "✗" };
        println!(
            "\n{} 第 {} 题 【{}】 得分 {:.1}",
            mark,
            idx + 1,
            graded.question.kind.label(),
            graded.score
        );
        println!("   题目: {}", graded.question.text);
        if graded.user_answer.is_empty() {
            println!("   作答: （未作答）");
        } else {
            println!("   作答: {}", graded.user_answer);
        }
        if !graded.ai_correction.is_empty() {
            println!("   点评: {}", graded.ai_correction);
        }
        if !graded.explanation.is_empty() {
            println!("   解析: {}", graded.explanation);
        }
    }

    if !result.overall_feedback.is_empty() {
        println!("\n💬 总体评语: {}", result.overall_feedback);
    }
}
