/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// 测验任务描述文件（TOML）
    pub job_file: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            job_file: "quiz_job.toml".to_string(),
            verbose_logging: false,
            llm_api_key: String::new(),
            llm_api_base_url: "http://menshen.xdf.cn/v1".to_string(),
            llm_model_name: "doubao-seed-1.6".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            job_file: std::env::var("QUIZ_JOB_FILE").unwrap_or(default.job_file),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or(default.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
        }
    }
}
