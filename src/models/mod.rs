pub mod mastery;
pub mod question;
pub mod review_card;
pub mod review_queue;
pub mod review_session;
pub mod session_card;
pub mod shuffle;
pub mod skill;
pub mod sm2;
pub mod weak_skills;

pub use mastery::{MasteryLevel, MasteryRecord, Priority, WeakArea, WeakAreaStats};
pub use question::{ChoiceLetter, Question};
pub use review_card::ReviewCard;
pub use review_queue::StudyMode;
pub use review_session::ReviewSession;
pub use session_card::SessionCard;
pub use shuffle::{SeededRandom, ShuffledQuestion};
pub use skill::{BaselineDiagnostic, Skill, SkillProgress};
pub use sm2::ReviewGrade;
