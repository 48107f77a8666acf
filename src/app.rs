//! Command handlers behind the `act-prep` binary.
//!
//! Each `cmd_*` function works against an open connection and writes its
//! human-readable report to `out`, so commands can be driven from tests as
//! well as from the CLI.

use crate::config::WeakSkillPolicy;
use crate::database::db;
use crate::error::{Error, Result};
use crate::export::json;
use crate::models::mastery::{recommended_minutes, weak_area_stats, weak_areas};
use crate::models::review_queue::apply_answer;
use crate::models::shuffle::{choice_seed, shuffle_question_choices};
use crate::models::sm2::calculate_next_review;
use crate::models::weak_skills::choose_weak_skills;
use crate::models::{BaselineDiagnostic, ChoiceLetter, ReviewCard, ReviewGrade, ReviewSession, StudyMode};
use rusqlite::Connection;
use serde::Serialize;
use std::io::{BufRead, Write};
use std::path::Path;
use tracing::{info, warn};

/// Result of answering one question.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub chosen: ChoiceLetter,
    pub review_card: Option<ReviewCard>,
}

pub fn cmd_import_questions(path: &Path, conn: &Connection, out: &mut impl Write) -> Result<usize> {
    let questions = json::import_questions(path)?;
    let mut inserted = 0;
    for question in &questions {
        if question.answer_letter().is_none() {
            warn!(question_id = %question.id, answer = %question.answer, "question has a malformed answer key");
        }
        if db::insert_question(question, conn)? {
            inserted += 1;
        }
    }
    writeln!(
        out,
        "Imported {inserted} new questions ({} already present)",
        questions.len() - inserted
    )?;
    Ok(inserted)
}

pub fn cmd_import_skills(path: &Path, conn: &Connection, out: &mut impl Write) -> Result<usize> {
    let skills = json::import_skills(path)?;
    for skill in &skills {
        db::insert_skill(skill, conn)?;
    }
    writeln!(out, "Imported {} skills", skills.len())?;
    Ok(skills.len())
}

pub fn cmd_set_baseline(
    user_id: &str,
    diagnostic: &BaselineDiagnostic,
    conn: &Connection,
    out: &mut impl Write,
) -> Result<()> {
    db::set_baseline(user_id, diagnostic, conn)?;
    writeln!(
        out,
        "Baseline for {user_id}: {} = {:.0}% ({})",
        diagnostic.section,
        diagnostic.score * 100.0,
        diagnostic.source
    )?;
    Ok(())
}

/// Stores every baseline in a JSON list for one user, in file order.
pub fn cmd_import_baselines(
    user_id: &str,
    path: &Path,
    conn: &Connection,
    out: &mut impl Write,
) -> Result<usize> {
    let baselines = json::import_baselines(path)?;
    for diagnostic in &baselines {
        db::set_baseline(user_id, diagnostic, conn)?;
    }
    writeln!(out, "Imported {} baselines for {user_id}", baselines.len())?;
    Ok(baselines.len())
}

/// Prints the shuffled view of a question as JSON.
pub fn cmd_shuffle(
    question_id: &str,
    seed: Option<&str>,
    conn: &Connection,
    out: &mut impl Write,
) -> Result<()> {
    let question = db::get_question(question_id, conn)?;
    let shuffled = shuffle_question_choices(&question, seed);
    serde_json::to_writer_pretty(&mut *out, &shuffled)?;
    writeln!(out)?;
    Ok(())
}

/// Judges a click on the user's shuffled view of a question.
///
/// The attempt is counted toward the question's skill. A review card is
/// created on the first miss and moved along the study-mode ladder on every
/// later answer.
pub fn cmd_answer(
    user_id: &str,
    question_id: &str,
    selected_index: usize,
    mode: StudyMode,
    conn: &Connection,
    out: &mut impl Write,
) -> Result<AnswerOutcome> {
    let question = db::get_question(question_id, conn)?;
    let seed = choice_seed(user_id, question_id);
    let shuffled = shuffle_question_choices(&question, Some(&seed));

    let chosen = shuffled
        .letter_at(selected_index)
        .ok_or(Error::InvalidChoice(selected_index))?;
    let correct = shuffled.is_correct(selected_index);

    if let Some(skill_id) = &question.skill_id {
        db::record_attempt(user_id, skill_id, correct, conn)?;
    }

    let now = db::get_current_date(conn)?;
    let existing = db::get_review_card(user_id, question_id, conn)?;
    let review_card = if existing.is_some() || !correct {
        let card = apply_answer(existing.as_ref(), user_id, question_id, correct, mode, now);
        db::upsert_review_card(&card, conn)?;
        Some(card)
    } else {
        None
    };

    info!(user_id, question_id, %chosen, correct, "answer recorded");
    if correct {
        writeln!(out, "Correct! ({chosen})")?;
    } else {
        writeln!(
            out,
            "Incorrect: you chose {chosen}, the answer is {}",
            shuffled.choices[shuffled.correct_index]
        )?;
    }
    if let Some(card) = &review_card {
        writeln!(
            out,
            "Next review in {} day(s), on {}",
            card.interval_days,
            card.due_at.format("%Y-%m-%d")
        )?;
    }

    Ok(AnswerOutcome {
        correct,
        chosen,
        review_card,
    })
}

/// Grades an existing review card with the SM-2 scheduler.
pub fn cmd_review(
    user_id: &str,
    question_id: &str,
    grade: ReviewGrade,
    conn: &Connection,
    out: &mut impl Write,
) -> Result<ReviewCard> {
    let card = db::get_review_card(user_id, question_id, conn)?.ok_or_else(|| {
        Error::ReviewCardNotFound {
            user_id: user_id.to_string(),
            question_id: question_id.to_string(),
        }
    })?;

    let now = db::get_current_date(conn)?;
    let next = calculate_next_review(&card, grade, now);
    db::upsert_review_card(&next, conn)?;

    writeln!(
        out,
        "{question_id}: {grade} -> interval {} day(s), ease {}%, lapses {}, due {}",
        next.interval_days,
        next.ease,
        next.lapses,
        next.due_at.format("%Y-%m-%d")
    )?;
    Ok(next)
}

pub fn cmd_due(user_id: &str, conn: &Connection, out: &mut impl Write) -> Result<Vec<ReviewCard>> {
    let now = db::get_current_date(conn)?;
    let cards = db::get_cards_due_for_review(user_id, now, conn)?;

    if cards.is_empty() {
        writeln!(out, "Nothing due for {user_id} on {}", now.format("%Y-%m-%d"))?;
    }
    for card in &cards {
        writeln!(
            out,
            "{}  due {}  interval {}d  ease {}%  lapses {}",
            card.question_id,
            card.due_at.format("%Y-%m-%d"),
            card.interval_days,
            card.ease,
            card.lapses
        )?;
    }
    Ok(cards)
}

/// Runs a review session over the user's due cards, reading one grade per
/// line from `input`. A blank line or end of input stops the session early.
/// Returns the number of grades applied.
pub fn cmd_drill(
    user_id: &str,
    conn: &Connection,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<usize> {
    let now = db::get_current_date(conn)?;
    let due = db::get_cards_due_for_review(user_id, now, conn)?;
    let mut session = ReviewSession::new_from_due_cards(due);
    let mut graded = 0;
    let mut last_round = 0;

    while !session.is_completed() {
        let Some(current) = session.current_card() else {
            break;
        };
        if session.round_number != last_round {
            last_round = session.round_number;
            writeln!(out, "{}", session.phase_message())?;
        }

        let question = db::get_question(&current.card.question_id, conn)?;
        let shuffled =
            shuffle_question_choices(&question, Some(&choice_seed(user_id, &question.id)));
        writeln!(out, "\n{}", question.stem)?;
        for (idx, choice) in shuffled.choices.iter().enumerate() {
            writeln!(out, "  {}. {choice}", idx + 1)?;
        }
        writeln!(out, "Answer: {}", shuffled.choices[shuffled.correct_index])?;

        let grade = loop {
            write!(out, "Grade [again/hard/good/easy]: ")?;
            out.flush()?;
            let mut line = String::new();
            if input.read_line(&mut line)? == 0 || line.trim().is_empty() {
                writeln!(out, "\nStopped after {graded} grade(s)")?;
                return Ok(graded);
            }
            match line.parse::<ReviewGrade>() {
                Ok(grade) => break grade,
                Err(err) => writeln!(out, "{err}")?,
            }
        };

        if let Some(updated) = session.grade_current_card(grade, now) {
            db::upsert_review_card(&updated, conn)?;
            graded += 1;
        }
        session.next_card();
    }

    writeln!(out, "Session complete: {graded} grade(s) applied")?;
    Ok(graded)
}

pub fn cmd_weak_skills(
    user_id: &str,
    policy: &WeakSkillPolicy,
    conn: &Connection,
    out: &mut impl Write,
) -> Result<Vec<String>> {
    let baseline = db::load_baselines(user_id, conn)?;
    let progress = db::load_progress(user_id, conn)?;
    let catalog = db::load_skills(conn)?;

    let picked = choose_weak_skills(&baseline, &progress, &catalog, policy);
    if picked.is_empty() {
        writeln!(out, "No weak skills to focus on for {user_id}")?;
    }
    for skill_id in &picked {
        let name = catalog
            .iter()
            .find(|s| &s.id == skill_id)
            .map(|s| s.name.as_str())
            .unwrap_or("");
        writeln!(out, "{skill_id}  {name}")?;
    }
    Ok(picked)
}

pub fn cmd_weak_areas(
    user_id: &str,
    limit: usize,
    study_minutes: Option<u32>,
    conn: &Connection,
    out: &mut impl Write,
) -> Result<()> {
    let records = db::load_mastery_records(user_id, conn)?;
    let skills = db::load_skills(conn)?;
    let areas = weak_areas(&records, &skills, limit);
    let stats = weak_area_stats(&records);

    writeln!(
        out,
        "Weak areas for {user_id}: {} critical, {} high, {} medium",
        stats.critical, stats.high, stats.medium
    )?;
    for area in &areas {
        write!(
            out,
            "{:<12} {:<30} {:>5.1}% of {:<4} {}",
            area.priority.label(),
            area.skill_name,
            area.accuracy,
            area.total_attempts,
            area.mastery_level.label()
        )?;
        if let Some(minutes) = study_minutes {
            write!(out, "  ~{} min", recommended_minutes(area.priority, minutes))?;
        }
        writeln!(out)?;
    }
    Ok(())
}

pub fn cmd_export_reviews(
    user_id: &str,
    path: &Path,
    conn: &Connection,
    out: &mut impl Write,
) -> Result<usize> {
    let cards = db::get_review_cards(user_id, conn)?;
    json::export_review_cards_to_path(&cards, path)?;
    writeln!(out, "Exported {} review cards to {}", cards.len(), path.display())?;
    Ok(cards.len())
}

pub fn cmd_advance_day(conn: &Connection, out: &mut impl Write) -> Result<()> {
    let today = db::advance_day(conn)?;
    writeln!(out, "Current date is now {}", today.format("%Y-%m-%d"))?;
    Ok(())
}
