use std::fmt::{self, Write};

use rvt_app::{
    Screen,
    workflow::{
        Notice,
        auth::{AuthForm, AuthMode, AuthStatus},
        queue::QueueView,
        stats::StatsView,
        syllabus::{SyllabusPhase, SyllabusWorkflow},
        topics::TopicsView,
    },
};
use rvt_client::{ApiResult, models::QueueItem};

const BAR_CELLS: usize = 20;
const NAV: &str = "pages: queue | topics | syllabus | stats   (go <page>, logout, quit)";

pub fn render(screen: Screen<'_>) -> Result<String, fmt::Error> {
    let mut out = String::new();

    match screen {
        Screen::Loading => writeln!(out, "Loading...")?,
        Screen::Error(detail) => {
            writeln!(out, "Could not start: {detail}")?;
            writeln!(out, "Type `reload` to try again.")?;
        }
        Screen::Auth(form) => auth(&mut out, form)?,
        Screen::Queue(view) => queue(&mut out, view)?,
        Screen::Topics(view) => topics(&mut out, view)?,
        Screen::Syllabus(view) => syllabus(&mut out, view)?,
        Screen::Stats(view) => stats(&mut out, view)?,
        Screen::NoContent => {
            writeln!(out, "No content to display")?;
            writeln!(out, "{NAV}")?;
        }
        Screen::RenderFailure(detail) => {
            writeln!(out, "Something went wrong while drawing this screen: {detail}")?;
            writeln!(out, "Type `reload` to start over.")?;
        }
        Screen::Closed => writeln!(out, "Goodbye.")?,
    }

    Ok(out)
}

/// 20-cell bar filled in proportion to the item's priority
pub fn priority_bar(item: &QueueItem) -> String {
    let percent = item.priority_percent();
    let filled = ((percent / 100.0) * BAR_CELLS as f64).round() as usize;
    let filled = filled.min(BAR_CELLS);

    format!(
        "[{}{}] {percent:>3.0}%",
        "#".repeat(filled),
        ".".repeat(BAR_CELLS - filled)
    )
}

fn notice(out: &mut String, notice: Option<&Notice>) -> fmt::Result {
    match notice {
        Some(Notice::Error(text)) => writeln!(out, "! {text}"),
        Some(Notice::Info(text)) => writeln!(out, "* {text}"),
        None => Ok(()),
    }
}

fn auth(out: &mut String, form: &AuthForm) -> fmt::Result {
    match form.mode() {
        AuthMode::Login => {
            writeln!(out, "== Login ==")?;
            writeln!(out, "login <email> <password>   (switch register)")?;
        }
        AuthMode::Register => {
            writeln!(out, "== Register ==")?;
            writeln!(out, "register <email> <password> <confirm>   (switch login)")?;
        }
    }

    match form.status() {
        AuthStatus::Idle => Ok(()),
        AuthStatus::Submitting => writeln!(out, "Please wait..."),
        AuthStatus::Error(detail) => writeln!(out, "! {detail}"),
        AuthStatus::Success(text) => writeln!(out, "* {text}"),
    }
}

fn queue(out: &mut String, view: &QueueView) -> fmt::Result {
    writeln!(
        out,
        "== Revision queue ({}) ==",
        view.mode().unwrap_or("default mode")
    )?;

    if view.is_loading() {
        writeln!(out, "Loading...")?;
    } else if view.items().is_empty() {
        writeln!(out, "Nothing to revise right now.")?;
    }
    for item in view.items() {
        write!(out, "{}  {}", priority_bar(item), item.name)?;
        match (&item.subject, &item.unit) {
            (Some(subject), Some(unit)) => writeln!(out, " ({subject} / {unit})")?,
            (Some(subject), None) => writeln!(out, " ({subject})")?,
            _ => writeln!(out)?,
        }
    }

    if !view.modes().is_empty() {
        writeln!(out, "modes: {}   (mode <name>)", view.modes().join(", "))?;
    }
    notice(out, view.notice())?;
    writeln!(out, "{NAV}")
}

fn topics(out: &mut String, view: &TopicsView) -> fmt::Result {
    writeln!(out, "== Topics ==")?;

    if view.is_loading() {
        writeln!(out, "Loading...")?;
    } else if view.topics().is_empty() {
        writeln!(out, "No topics yet. Import a syllabus to get started.")?;
    }
    for topic in view.topics() {
        let marker = if view.pending() == Some(topic.id) { "~" } else { " " };
        let revised = topic
            .last_revised
            .map_or_else(|| "never".to_string(), |at| at.format("%Y-%m-%d").to_string());
        writeln!(
            out,
            "{marker} {}  {} [{}{}] difficulty {} importance {} last revised {revised}",
            topic.id,
            topic.name,
            topic.subject,
            topic.unit.as_deref().map(|unit| format!(" / {unit}")).unwrap_or_default(),
            topic.difficulty,
            topic.importance,
        )?;
    }

    notice(out, view.notice())?;
    writeln!(out, "revise <topic-id> [1-5]")?;
    writeln!(out, "{NAV}")
}

fn syllabus(out: &mut String, view: &SyllabusWorkflow) -> fmt::Result {
    writeln!(out, "== Syllabus import ==")?;
    writeln!(out, "subject: {}", view.subject().unwrap_or("(any)"))?;
    writeln!(
        out,
        "text: {}",
        if view.text().is_empty() { "(empty)" } else { view.text() }
    )?;

    match view.phase() {
        SyllabusPhase::Parsing => writeln!(out, "Parsing...")?,
        SyllabusPhase::Committing => writeln!(out, "Saving topics...")?,
        SyllabusPhase::Editing | SyllabusPhase::Previewing => {}
    }

    if !view.preview().is_empty() {
        writeln!(out, "preview ({} topics):", view.preview().len())?;
        for (index, topic) in view.preview().iter().enumerate() {
            writeln!(
                out,
                "  {:>2}. {} [{}] difficulty {} importance {}",
                index + 1,
                topic.name,
                topic.subject,
                topic.difficulty,
                topic.importance
            )?;
        }
        writeln!(out, "commit to save them, or leave the page to discard")?;
    }

    notice(out, view.notice())?;
    writeln!(out, "text <syllabus>, subject [name], parse")?;
    writeln!(out, "{NAV}")
}

fn piece<T>(
    out: &mut String,
    label: &str,
    result: &ApiResult<T>,
    show: impl FnOnce(&T) -> String,
) -> fmt::Result {
    match result {
        Ok(value) => writeln!(out, "{label}: {}", show(value)),
        Err(failure) => writeln!(out, "{label}: ! {failure}"),
    }
}

fn stats(out: &mut String, view: &StatsView) -> fmt::Result {
    writeln!(out, "== Stats ==")?;

    let Some(snapshot) = view.snapshot() else {
        writeln!(out, "Loading...")?;
        return writeln!(out, "{NAV}");
    };

    piece(out, "streak", &snapshot.streak, |streak| {
        format!(
            "{} days (longest {}){}",
            streak.current_streak,
            streak.longest_streak,
            if streak.active_today { ", revised today" } else { "" }
        )
    })?;
    piece(out, "today", &snapshot.daily_goal, |goal| {
        format!(
            "{}/{} revised{}",
            goal.revised_today,
            goal.goal,
            if goal.completed { ", goal reached" } else { "" }
        )
    })?;
    piece(out, "this week", &snapshot.weekly, |week| {
        format!(
            "{} revisions, {:.1} per day",
            week.total_revised, week.average_per_day
        )
    })?;
    piece(out, "balance", &snapshot.balance, |balance| {
        if balance.subjects.is_empty() {
            return balance.message.clone().unwrap_or_default();
        }
        balance
            .subjects
            .iter()
            .map(|subject| format!("{} {:.0}%", subject.subject, subject.share * 100.0))
            .collect::<Vec<_>>()
            .join(", ")
    })?;

    writeln!(out, "{NAV}")
}
