use crate::{
    client::Endpoint,
    models::{DailyGoal, Streak, SubjectBalance, SubjectGoals, SubjectWeeklySummary, WeeklySummary},
};

pub fn streak(mode: Option<&str>) -> Endpoint<Streak> {
    Endpoint::get("/revisions/streak").with_query("mode", mode)
}

pub fn daily_goal(mode: Option<&str>) -> Endpoint<DailyGoal> {
    Endpoint::get("/revisions/daily-goal").with_query("mode", mode)
}

/// Today's goal split across subjects by backlog and neglect
pub fn subject_daily_goals(mode: Option<&str>) -> Endpoint<SubjectGoals> {
    Endpoint::get("/revisions/daily-goal/subject").with_query("mode", mode)
}

pub fn weekly_summary(mode: Option<&str>) -> Endpoint<WeeklySummary> {
    Endpoint::get("/revisions/weekly-summary").with_query("mode", mode)
}

pub fn subject_weekly_summary(mode: Option<&str>) -> Endpoint<SubjectWeeklySummary> {
    Endpoint::get("/revisions/weekly-summary/subject").with_query("mode", mode)
}

pub fn subject_balance(mode: Option<&str>) -> Endpoint<SubjectBalance> {
    Endpoint::get("/revisions/subject-balance").with_query("mode", mode)
}
