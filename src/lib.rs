pub mod app;
pub mod config;
pub mod database;
pub mod error;
pub mod export;
pub mod models;

pub use config::{AppConfig, WeakSkillPolicy};
pub use error::{Error, Result};
pub use models::{
    BaselineDiagnostic, ChoiceLetter, Question, ReviewCard, ReviewGrade, ReviewSession,
    ShuffledQuestion, Skill, SkillProgress, StudyMode,
};
