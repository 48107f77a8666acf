//! Database operations for the ACT prep store
//!
//! Handles SQLite database initialization, question and skill catalogs, review
//! cards, attempt history, baseline diagnostics, and the simulated clock used
//! to walk review schedules forward.

use crate::error::{Error, Result};
use crate::models::{
    BaselineDiagnostic, MasteryLevel, MasteryRecord, Question, ReviewCard, Skill, SkillProgress,
};
use chrono::{DateTime, Duration, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::path::Path;
use tracing::info;

/// Opens (or creates) the database file and makes sure all tables exist.
pub fn init_database(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    init_schema(&conn)?;
    info!(path = %path.display(), "database ready");
    Ok(conn)
}

/// Creates tables for questions, skills, review cards, progress, baselines
/// and app state. Sets the current date to now if not already initialized.
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS questions (
            id TEXT PRIMARY KEY,
            section TEXT NOT NULL,
            skill_id TEXT,
            stem TEXT NOT NULL,
            choice_a TEXT NOT NULL,
            choice_b TEXT NOT NULL,
            choice_c TEXT NOT NULL,
            choice_d TEXT NOT NULL,
            answer TEXT NOT NULL,
            explanation TEXT
        );

        CREATE TABLE IF NOT EXISTS skills (
            id TEXT PRIMARY KEY,
            subject TEXT NOT NULL,
            cluster TEXT NOT NULL,
            name TEXT NOT NULL,
            position INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS review_cards (
            user_id TEXT NOT NULL,
            question_id TEXT NOT NULL,
            due_at INTEGER NOT NULL,
            interval_days INTEGER NOT NULL DEFAULT 0,
            ease INTEGER NOT NULL DEFAULT 250,
            lapses INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (user_id, question_id),
            FOREIGN KEY (question_id) REFERENCES questions(id)
        );

        CREATE TABLE IF NOT EXISTS skill_progress (
            user_id TEXT NOT NULL,
            skill_id TEXT NOT NULL,
            seen INTEGER NOT NULL DEFAULT 0,
            correct INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (user_id, skill_id)
        );

        CREATE TABLE IF NOT EXISTS baselines (
            user_id TEXT NOT NULL,
            section TEXT NOT NULL,
            score REAL NOT NULL,
            source TEXT NOT NULL,
            PRIMARY KEY (user_id, section)
        );

        CREATE TABLE IF NOT EXISTS app_state (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );",
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO app_state (key, value) VALUES ('current_date', ?1)",
        params![Utc::now().timestamp().to_string()],
    )?;

    Ok(())
}

fn timestamp_to_date(secs: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
}

/// Retrieves current simulated date from database
pub fn get_current_date(conn: &Connection) -> Result<DateTime<Utc>> {
    let value: String = conn.query_row(
        "SELECT value FROM app_state WHERE key = 'current_date'",
        [],
        |row| row.get(0),
    )?;

    value
        .parse::<i64>()
        .ok()
        .and_then(timestamp_to_date)
        .ok_or(Error::InvalidTimestamp(value))
}

/// Advances current date by 24 hours and returns the new date
pub fn advance_day(conn: &Connection) -> Result<DateTime<Utc>> {
    let next_day = get_current_date(conn)? + Duration::days(1);

    conn.execute(
        "UPDATE app_state SET value = ?1 WHERE key = 'current_date'",
        params![next_day.timestamp().to_string()],
    )?;

    Ok(next_day)
}

/// Adds a question to the bank. Questions are immutable once authored, so an
/// existing id is left untouched. Returns whether a row was inserted.
pub fn insert_question(question: &Question, conn: &Connection) -> Result<bool> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO questions
            (id, section, skill_id, stem, choice_a, choice_b, choice_c, choice_d, answer, explanation)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            question.id,
            question.section,
            question.skill_id,
            question.stem,
            question.choices[0],
            question.choices[1],
            question.choices[2],
            question.choices[3],
            question.answer,
            question.explanation
        ],
    )?;
    Ok(inserted > 0)
}

fn question_from_row(row: &Row<'_>) -> rusqlite::Result<Question> {
    Ok(Question {
        id: row.get(0)?,
        section: row.get(1)?,
        skill_id: row.get(2)?,
        stem: row.get(3)?,
        choices: [row.get(4)?, row.get(5)?, row.get(6)?, row.get(7)?],
        answer: row.get(8)?,
        explanation: row.get(9)?,
    })
}

const QUESTION_COLUMNS: &str =
    "id, section, skill_id, stem, choice_a, choice_b, choice_c, choice_d, answer, explanation";

pub fn get_question(question_id: &str, conn: &Connection) -> Result<Question> {
    conn.query_row(
        &format!("SELECT {QUESTION_COLUMNS} FROM questions WHERE id = ?1"),
        params![question_id],
        question_from_row,
    )
    .optional()?
    .ok_or_else(|| Error::QuestionNotFound(question_id.to_string()))
}

/// Retrieves questions, optionally restricted to one section, ordered by id
pub fn get_questions(section: Option<&str>, conn: &Connection) -> Result<Vec<Question>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {QUESTION_COLUMNS} FROM questions
         WHERE ?1 IS NULL OR section = ?1
         ORDER BY id"
    ))?;

    let questions = stmt
        .query_map(params![section], question_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(questions)
}

/// Adds a skill to the catalog, keeping the order in which skills were
/// authored. Re-adding an id updates its fields but keeps its position.
pub fn insert_skill(skill: &Skill, conn: &Connection) -> Result<()> {
    conn.execute(
        "INSERT INTO skills (id, subject, cluster, name, position)
         VALUES (?1, ?2, ?3, ?4, (SELECT COALESCE(MAX(position), -1) + 1 FROM skills))
         ON CONFLICT(id) DO UPDATE SET
            subject = excluded.subject,
            cluster = excluded.cluster,
            name = excluded.name",
        params![skill.id, skill.subject, skill.cluster, skill.name],
    )?;
    Ok(())
}

/// Loads the whole skill catalog in authoring order
pub fn load_skills(conn: &Connection) -> Result<Vec<Skill>> {
    let mut stmt =
        conn.prepare("SELECT id, subject, cluster, name FROM skills ORDER BY position")?;

    let skills = stmt
        .query_map([], |row| {
            Ok(Skill {
                id: row.get(0)?,
                subject: row.get(1)?,
                cluster: row.get(2)?,
                name: row.get(3)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(skills)
}

fn review_card_from_row(row: &Row<'_>) -> rusqlite::Result<ReviewCard> {
    let due_secs: i64 = row.get(2)?;
    Ok(ReviewCard {
        user_id: row.get(0)?,
        question_id: row.get(1)?,
        due_at: timestamp_to_date(due_secs)
            .ok_or(rusqlite::Error::IntegralValueOutOfRange(2, due_secs))?,
        interval_days: row.get(3)?,
        ease: row.get(4)?,
        lapses: row.get(5)?,
    })
}

const REVIEW_CARD_COLUMNS: &str = "user_id, question_id, due_at, interval_days, ease, lapses";

pub fn get_review_card(
    user_id: &str,
    question_id: &str,
    conn: &Connection,
) -> Result<Option<ReviewCard>> {
    let card = conn
        .query_row(
            &format!(
                "SELECT {REVIEW_CARD_COLUMNS} FROM review_cards
                 WHERE user_id = ?1 AND question_id = ?2"
            ),
            params![user_id, question_id],
            review_card_from_row,
        )
        .optional()?;
    Ok(card)
}

/// Inserts the card or replaces the stored state for (user, question)
pub fn upsert_review_card(card: &ReviewCard, conn: &Connection) -> Result<()> {
    conn.execute(
        "INSERT INTO review_cards (user_id, question_id, due_at, interval_days, ease, lapses)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(user_id, question_id) DO UPDATE SET
            due_at = excluded.due_at,
            interval_days = excluded.interval_days,
            ease = excluded.ease,
            lapses = excluded.lapses",
        params![
            card.user_id,
            card.question_id,
            card.due_at.timestamp(),
            card.interval_days,
            card.ease,
            card.lapses
        ],
    )?;
    Ok(())
}

/// Retrieves cards due for review
///
/// Returns cards where due_at <= `now`, ordered by due_at (oldest first).
pub fn get_cards_due_for_review(
    user_id: &str,
    now: DateTime<Utc>,
    conn: &Connection,
) -> Result<Vec<ReviewCard>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {REVIEW_CARD_COLUMNS} FROM review_cards
         WHERE user_id = ?1 AND due_at <= ?2
         ORDER BY due_at ASC, question_id ASC"
    ))?;

    let cards = stmt
        .query_map(params![user_id, now.timestamp()], review_card_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(cards)
}

/// Retrieves every card of a user, ordered by question id
pub fn get_review_cards(user_id: &str, conn: &Connection) -> Result<Vec<ReviewCard>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {REVIEW_CARD_COLUMNS} FROM review_cards
         WHERE user_id = ?1
         ORDER BY question_id"
    ))?;

    let cards = stmt
        .query_map(params![user_id], review_card_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(cards)
}

/// Counts one attempt at a skill
pub fn record_attempt(
    user_id: &str,
    skill_id: &str,
    correct: bool,
    conn: &Connection,
) -> Result<()> {
    conn.execute(
        "INSERT INTO skill_progress (user_id, skill_id, seen, correct)
         VALUES (?1, ?2, 1, ?3)
         ON CONFLICT(user_id, skill_id) DO UPDATE SET
            seen = seen + 1,
            correct = correct + excluded.correct",
        params![user_id, skill_id, u32::from(correct)],
    )?;
    Ok(())
}

/// Loads per-skill attempt history; mastery level is derived from the counts
pub fn load_progress(user_id: &str, conn: &Connection) -> Result<Vec<SkillProgress>> {
    let progress = load_mastery_records(user_id, conn)?
        .into_iter()
        .map(|record| SkillProgress {
            mastery_level: MasteryLevel::from_counts(record.correct, record.total).tier(),
            skill_id: record.skill_id,
            seen: record.total,
            correct: record.correct,
        })
        .collect();
    Ok(progress)
}

pub fn load_mastery_records(user_id: &str, conn: &Connection) -> Result<Vec<MasteryRecord>> {
    let mut stmt = conn.prepare(
        "SELECT skill_id, correct, seen FROM skill_progress
         WHERE user_id = ?1
         ORDER BY skill_id",
    )?;

    let records = stmt
        .query_map(params![user_id], |row| {
            Ok(MasteryRecord {
                skill_id: row.get(0)?,
                correct: row.get(1)?,
                total: row.get(2)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(records)
}

/// Stores a user's baseline score for one section. Re-scoring a section
/// updates it in place, so it keeps its original precedence.
pub fn set_baseline(
    user_id: &str,
    diagnostic: &BaselineDiagnostic,
    conn: &Connection,
) -> Result<()> {
    conn.execute(
        "INSERT INTO baselines (user_id, section, score, source)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(user_id, section) DO UPDATE SET
            score = excluded.score,
            source = excluded.source",
        params![
            user_id,
            diagnostic.section,
            diagnostic.score,
            diagnostic.source
        ],
    )?;
    Ok(())
}

/// Loads baselines in the order they were recorded
pub fn load_baselines(user_id: &str, conn: &Connection) -> Result<Vec<BaselineDiagnostic>> {
    let mut stmt = conn.prepare(
        "SELECT section, score, source FROM baselines
         WHERE user_id = ?1
         ORDER BY rowid",
    )?;

    let baselines = stmt
        .query_map(params![user_id], |row| {
            Ok(BaselineDiagnostic {
                section: row.get(0)?,
                score: row.get(1)?,
                source: row.get(2)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(baselines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn memory_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    fn question(id: &str, section: &str) -> Question {
        Question {
            id: id.to_string(),
            section: section.to_string(),
            skill_id: Some(format!("{section}-skill")),
            stem: format!("Stem of {id}"),
            choices: [
                "one".to_string(),
                "two".to_string(),
                "three".to_string(),
                "four".to_string(),
            ],
            answer: "C".to_string(),
            explanation: Some("because".to_string()),
        }
    }

    fn skill(id: &str, cluster: &str) -> Skill {
        Skill {
            id: id.to_string(),
            subject: "math".to_string(),
            cluster: cluster.to_string(),
            name: id.to_uppercase(),
        }
    }

    #[test]
    fn test_init_database_creates_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prep.sqlite3");
        let conn = init_database(&path).unwrap();
        assert!(path.exists());
        assert!(get_current_date(&conn).is_ok());
        // Re-opening keeps the stored clock.
        let before = get_current_date(&conn).unwrap();
        drop(conn);
        let conn = init_database(&path).unwrap();
        assert_eq!(get_current_date(&conn).unwrap(), before);
    }

    #[test]
    fn test_advance_day() {
        let conn = memory_db();
        let before = get_current_date(&conn).unwrap();
        let after = advance_day(&conn).unwrap();
        assert_eq!(after - before, Duration::days(1));
        assert_eq!(get_current_date(&conn).unwrap(), after);
    }

    #[test]
    fn test_question_insert_is_immutable() {
        let conn = memory_db();
        let original = question("q1", "math");
        assert!(insert_question(&original, &conn).unwrap());

        let mut edited = original.clone();
        edited.stem = "changed".to_string();
        assert!(!insert_question(&edited, &conn).unwrap());

        assert_eq!(get_question("q1", &conn).unwrap(), original);
    }

    #[test]
    fn test_get_missing_question() {
        let conn = memory_db();
        assert!(matches!(
            get_question("nope", &conn),
            Err(Error::QuestionNotFound(id)) if id == "nope"
        ));
    }

    #[test]
    fn test_get_questions_by_section() {
        let conn = memory_db();
        insert_question(&question("q2", "math"), &conn).unwrap();
        insert_question(&question("q1", "math"), &conn).unwrap();
        insert_question(&question("q3", "english"), &conn).unwrap();

        let math = get_questions(Some("math"), &conn).unwrap();
        let ids: Vec<_> = math.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids, vec!["q1", "q2"]);
        assert_eq!(get_questions(None, &conn).unwrap().len(), 3);
    }

    #[test]
    fn test_skills_keep_authoring_order() {
        let conn = memory_db();
        insert_skill(&skill("zeta", "geometry"), &conn).unwrap();
        insert_skill(&skill("alpha", "algebra"), &conn).unwrap();
        insert_skill(&skill("zeta", "trig"), &conn).unwrap();

        let skills = load_skills(&conn).unwrap();
        let ids: Vec<_> = skills.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["zeta", "alpha"]);
        assert_eq!(skills[0].cluster, "trig");
    }

    #[test]
    fn test_review_card_upsert_and_due() {
        let conn = memory_db();
        insert_question(&question("q1", "math"), &conn).unwrap();
        insert_question(&question("q2", "math"), &conn).unwrap();

        let now = Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap();
        let mut card = ReviewCard::new("u1", "q1", now);
        upsert_review_card(&card, &conn).unwrap();
        let later = ReviewCard {
            due_at: now + Duration::days(3),
            ..ReviewCard::new("u1", "q2", now)
        };
        upsert_review_card(&later, &conn).unwrap();

        assert_eq!(get_review_card("u1", "q1", &conn).unwrap(), Some(card.clone()));
        assert_eq!(get_review_card("u2", "q1", &conn).unwrap(), None);

        let due = get_cards_due_for_review("u1", now, &conn).unwrap();
        assert_eq!(due, vec![card.clone()]);

        card.interval_days = 6;
        card.lapses = 2;
        card.due_at = now + Duration::days(6);
        upsert_review_card(&card, &conn).unwrap();
        assert_eq!(get_review_card("u1", "q1", &conn).unwrap(), Some(card));

        let due = get_cards_due_for_review("u1", now + Duration::days(3), &conn).unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].question_id, "q2");
        assert_eq!(get_review_cards("u1", &conn).unwrap().len(), 2);
    }

    #[test]
    fn test_attempts_accumulate() {
        let conn = memory_db();
        record_attempt("u1", "alg", true, &conn).unwrap();
        record_attempt("u1", "alg", false, &conn).unwrap();
        record_attempt("u1", "alg", true, &conn).unwrap();
        record_attempt("u2", "alg", true, &conn).unwrap();

        let progress = load_progress("u1", &conn).unwrap();
        assert_eq!(progress.len(), 1);
        assert_eq!(progress[0].seen, 3);
        assert_eq!(progress[0].correct, 2);
        assert_eq!(progress[0].mastery_level, MasteryLevel::Learning.tier());
    }

    #[test]
    fn test_baselines_replace_per_section() {
        let conn = memory_db();
        let diag = |section: &str, score: f64| BaselineDiagnostic {
            section: section.to_string(),
            score,
            source: "self".to_string(),
        };
        set_baseline("u1", &diag("math", 0.4), &conn).unwrap();
        set_baseline("u1", &diag("english", 0.3), &conn).unwrap();
        set_baseline("u1", &diag("math", 0.45), &conn).unwrap();

        let baselines = load_baselines("u1", &conn).unwrap();
        assert_eq!(baselines, vec![diag("math", 0.45), diag("english", 0.3)]);
        assert!(load_baselines("u2", &conn).unwrap().is_empty());
    }
}
