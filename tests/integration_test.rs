//! 生命周期状态机集成测试
//!
//! 协作方一律用桩实现替换，不依赖网络；
//! 真实 LLM 回路测试默认忽略，需要手动运行：
//! `cargo test -- --ignored`

use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::time::{Duration, Instant};

use quiz_genius::{
    Difficulty, GenerationBackend, GradedQuestion, GradingBackend, Question, QuestionType,
    QuizConfiguration, QuizLifecycle, QuizResult, UploadedDocument, UserAnswer,
};

/// 返回固定题目集的生成桩
struct StubGenerator {
    questions: Vec<Question>,
    fail: bool,
}

impl GenerationBackend for StubGenerator {
    async fn generate(&self, _config: &QuizConfiguration) -> anyhow::Result<Vec<Question>> {
        if self.fail {
            anyhow::bail!("生成服务不可达");
        }
        Ok(self.questions.clone())
    }
}

/// 作答非空即满分的批改桩；可配置先失败若干次
struct StubGrader {
    remaining_failures: AtomicUsize,
}

impl StubGrader {
    fn reliable() -> Self {
        Self {
            remaining_failures: AtomicUsize::new(0),
        }
    }

    fn failing_first(times: usize) -> Self {
        Self {
            remaining_failures: AtomicUsize::new(times),
        }
    }
}

impl GradingBackend for StubGrader {
    async fn grade(
        &self,
        questions: &[Question],
        answers: &[UserAnswer],
    ) -> anyhow::Result<QuizResult> {
        if self.remaining_failures.load(Ordering::SeqCst) > 0 {
            self.remaining_failures.fetch_sub(1, Ordering::SeqCst);
            anyhow::bail!("批改服务不可达");
        }
        let graded_questions: Vec<GradedQuestion> = questions
            .iter()
            .zip(answers.iter())
            .map(|(q, a)| GradedQuestion {
                question: q.clone(),
                user_answer: a.answer.clone(),
                is_correct: !a.answer.is_empty(),
                score: if a.answer.is_empty() { 0.0 } else { 1.0 },
                explanation: "桩批改".to_string(),
                ai_correction: if a.answer.is_empty() {
                    "未作答".to_string()
                } else {
                    "回答正确".to_string()
                },
            })
            .collect();
        let total_score = graded_questions.iter().map(|g| g.score).sum();
        Ok(QuizResult {
            total_score,
            max_score: questions.len() as f64,
            graded_questions,
            overall_feedback: "继续保持".to_string(),
        })
    }
}

fn document(id: &str, name: &str) -> UploadedDocument {
    UploadedDocument {
        id: id.to_string(),
        name: name.to_string(),
        // "光的反射" 的 UTF-8 base64
        base64: "5YWJ55qE5Y+N5bCE".to_string(),
        mime_type: "text/plain".to_string(),
    }
}

fn config(time_limit_secs: u64) -> QuizConfiguration {
    QuizConfiguration {
        documents: vec![document("doc-1", "lesson.md"), document("doc-2", "notes.txt")],
        num_questions: 3,
        selected_types: vec![QuestionType::MultipleChoice],
        auto_detect: false,
        difficulty: Difficulty::Easy,
        custom_instructions: None,
        time_limit_secs,
    }
}

fn mcq(id: u32) -> Question {
    Question {
        id,
        kind: QuestionType::MultipleChoice,
        text: format!("第 {} 题", id),
        options: Some(vec!["A".into(), "B".into(), "C".into(), "D".into()]),
        correct_answer: Some("A".to_string()),
        matching_pairs: None,
        sequencing_items: None,
    }
}

fn lifecycle_with(
    questions: Vec<Question>,
    grader: StubGrader,
) -> QuizLifecycle<StubGenerator, StubGrader> {
    QuizLifecycle::new(
        StubGenerator {
            questions,
            fail: false,
        },
        grader,
    )
}

/// 完整场景：2 篇文档、3 道选择题、不限时，
/// 全部作答后交卷，结果满分为 3
#[tokio::test]
async fn test_full_happy_path() {
    let mut lifecycle = lifecycle_with(vec![mcq(1), mcq(2), mcq(3)], StubGrader::reliable());
    assert_eq!(lifecycle.state().name(), "UPLOAD");

    lifecycle.submit_config(config(0)).await.unwrap();
    assert_eq!(lifecycle.state().name(), "QUIZ");

    // 题目投影非空且 id 唯一，答案字段已剥离
    let views = lifecycle.question_views().unwrap().to_vec();
    assert_eq!(views.len(), 3);
    let mut ids: Vec<u32> = views.iter().map(|v| v.id).collect();
    ids.dedup();
    assert_eq!(ids, vec![1, 2, 3]);

    for view in &views {
        lifecycle.record_answer(view.id, "A").unwrap();
    }

    lifecycle.submit_quiz().await.unwrap();
    assert_eq!(lifecycle.state().name(), "RESULTS");

    let result = lifecycle.result().unwrap();
    assert!((result.max_score - 3.0).abs() < f64::EPSILON);
    assert!((result.total_score - 3.0).abs() < f64::EPSILON);
    // 批改明细与原题同序
    for (graded, view) in result.graded_questions.iter().zip(views.iter()) {
        assert_eq!(graded.question.id, view.id);
    }
}

/// 生成失败：回到 Upload，不存任何题目，有用户提示
#[tokio::test]
async fn test_generation_failure_returns_to_upload() {
    let mut lifecycle = QuizLifecycle::new(
        StubGenerator {
            questions: Vec::new(),
            fail: true,
        },
        StubGrader::reliable(),
    );

    lifecycle.submit_config(config(0)).await.unwrap();
    assert_eq!(lifecycle.state().name(), "UPLOAD");
    assert!(lifecycle.question_views().is_none());
    assert!(lifecycle.result().is_none());
    assert!(lifecycle.notice().is_some());
}

/// 批改失败：回到 Quiz，题目与作答原样保留，重新交卷可成功
#[tokio::test]
async fn test_grading_failure_preserves_attempt() {
    let mut lifecycle = lifecycle_with(vec![mcq(1), mcq(2)], StubGrader::failing_first(1));

    lifecycle.submit_config(config(0)).await.unwrap();
    lifecycle.record_answer(1, "我的答案").unwrap();

    lifecycle.submit_quiz().await.unwrap();
    assert_eq!(lifecycle.state().name(), "QUIZ");
    assert!(lifecycle.notice().is_some());
    // 同一次作答被保留
    assert_eq!(lifecycle.current_answer(1), Some("我的答案"));
    assert_eq!(lifecycle.question_views().unwrap().len(), 2);

    // 重新交卷成功，作答进入批改明细
    lifecycle.submit_quiz().await.unwrap();
    assert_eq!(lifecycle.state().name(), "RESULTS");
    let result = lifecycle.result().unwrap();
    assert_eq!(result.graded_questions[0].user_answer, "我的答案");
    assert_eq!(result.graded_questions[1].user_answer, "");
}

/// 重新开始：回到 Upload，题目、结果全部清空
#[tokio::test]
async fn test_restart_resets_everything() {
    let mut lifecycle = lifecycle_with(vec![mcq(1)], StubGrader::reliable());

    lifecycle.submit_config(config(120)).await.unwrap();
    lifecycle.record_answer(1, "A").unwrap();
    lifecycle.submit_quiz().await.unwrap();
    assert_eq!(lifecycle.state().name(), "RESULTS");

    lifecycle.restart().unwrap();
    assert_eq!(lifecycle.state().name(), "UPLOAD");
    assert!(lifecycle.question_views().is_none());
    assert!(lifecycle.result().is_none());
    assert!(lifecycle.notice().is_none());

    // 重置后可以开始全新一轮
    lifecycle.submit_config(config(0)).await.unwrap();
    assert_eq!(lifecycle.state().name(), "QUIZ");
}

/// 限时 N 秒且无人交卷：到期后强制交卷，未作答以空字符串提交
#[tokio::test(start_paused = true)]
async fn test_timer_forces_submission() {
    let mut lifecycle = lifecycle_with(vec![mcq(1), mcq(2)], StubGrader::reliable());

    lifecycle.submit_config(config(5)).await.unwrap();
    assert_eq!(lifecycle.state().name(), "QUIZ");

    let started = Instant::now();
    lifecycle.time_expired().await;
    assert!(started.elapsed() >= Duration::from_secs(5));

    lifecycle.submit_quiz().await.unwrap();
    assert_eq!(lifecycle.state().name(), "RESULTS");
    let result = lifecycle.result().unwrap();
    assert!(result
        .graded_questions
        .iter()
        .all(|g| g.user_answer.is_empty()));
    assert!((result.total_score - 0.0).abs() < f64::EPSILON);
}

/// 状态机是单飞的：错误状态上的触发动作被拒绝且不改变状态
#[tokio::test]
async fn test_invalid_transitions_are_rejected() {
    let mut lifecycle = lifecycle_with(vec![mcq(1)], StubGrader::reliable());

    // Upload 状态下既不能交卷也不能作答、不能重新开始
    assert!(lifecycle.submit_quiz().await.is_err());
    assert!(lifecycle.record_answer(1, "A").is_err());
    assert!(lifecycle.restart().is_err());
    assert_eq!(lifecycle.state().name(), "UPLOAD");

    // Quiz 状态下不能再次提交配置
    lifecycle.submit_config(config(0)).await.unwrap();
    assert!(lifecycle.submit_config(config(0)).await.is_err());
    assert_eq!(lifecycle.state().name(), "QUIZ");
}

/// 真实 LLM 回路：出题 → 全部作答 → 批改
///
/// 需要配置 LLM_API_KEY 等环境变量后手动运行：
/// `cargo test test_live_llm_round_trip -- --ignored --nocapture`
#[tokio::test]
#[ignore]
async fn test_live_llm_round_trip() {
    use quiz_genius::Config;

    quiz_genius::utils::logging::init();
    let config = Config::from_env();
    let mut lifecycle = QuizLifecycle::from_config(&config);

    let quiz_config = QuizConfiguration {
        documents: vec![UploadedDocument {
            id: "doc-1".to_string(),
            name: "lesson.txt".to_string(),
            // 一段简短的光学课程资料
            base64: "5YWJ5Zyo5ZCM56eN5Z2H5YyA5LuL6LSo5Lit5rK/55u057q/5Lyg5pKt44CC5YWJ55qE5Y+N5bCE5a6a5b6L77ya5Y+N5bCE6KeS562J5LqO5YWl5bCE6KeS44CC".to_string(),
            mime_type: "text/plain".to_string(),
        }],
        num_questions: 2,
        selected_types: vec![QuestionType::MultipleChoice, QuestionType::TrueFalse],
        auto_detect: false,
        difficulty: Difficulty::Easy,
        custom_instructions: None,
        time_limit_secs: 0,
    };

    lifecycle.submit_config(quiz_config).await.expect("提交配置失败");
    assert_eq!(lifecycle.state().name(), "QUIZ", "生成应当成功进入答题阶段");

    let views = lifecycle.question_views().expect("应有题目投影").to_vec();
    println!("\n========== 生成的题目 ==========");
    for view in &views {
        println!("[{}] {}", view.kind.label(), view.text);
        lifecycle.record_answer(view.id, "True").unwrap();
    }

    lifecycle.submit_quiz().await.expect("交卷失败");
    assert_eq!(lifecycle.state().name(), "RESULTS", "批改应当成功");

    let result = lifecycle.result().expect("应有测验结果");
    println!("\n========== 批改结果 ==========");
    println!("得分: {:.1} / {:.1}", result.total_score, result.max_score);
    println!("评语: {}", result.overall_feedback);
    assert_eq!(result.graded_questions.len(), views.len());
}
