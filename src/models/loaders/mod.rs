pub mod job_loader;

pub use job_loader::{load_quiz_job, mime_for_path};
