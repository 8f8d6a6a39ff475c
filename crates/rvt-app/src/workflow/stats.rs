use rvt_client::{
    ApiClient, ApiResult,
    models::{DailyGoal, Streak, SubjectBalance, WeeklySummary},
    operations::analytics,
};

/// Analytics shown on the stats page. Each piece keeps its own outcome so
/// one failing call does not blank the others.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsSnapshot {
    pub streak: ApiResult<Streak>,
    pub daily_goal: ApiResult<DailyGoal>,
    pub weekly: ApiResult<WeeklySummary>,
    pub balance: ApiResult<SubjectBalance>,
}

impl StatsSnapshot {
    /// Details of every failed piece
    pub fn failures(&self) -> Vec<String> {
        [
            self.streak.as_ref().err(),
            self.daily_goal.as_ref().err(),
            self.weekly.as_ref().err(),
            self.balance.as_ref().err(),
        ]
        .into_iter()
        .flatten()
        .map(ToString::to_string)
        .collect()
    }
}

/// Load the four analytics calls one after another
pub async fn fetch(client: &ApiClient, mode: Option<&str>) -> StatsSnapshot {
    let streak = analytics::streak(mode).send(client).await;
    let daily_goal = analytics::daily_goal(mode).send(client).await;
    let weekly = analytics::weekly_summary(mode).send(client).await;
    let balance = analytics::subject_balance(mode).send(client).await;

    StatsSnapshot {
        streak,
        daily_goal,
        weekly,
        balance,
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsView {
    snapshot: Option<StatsSnapshot>,
    loading: bool,
}

impl StatsView {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn snapshot(&self) -> Option<&StatsSnapshot> {
        self.snapshot.as_ref()
    }

    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn begin_load(&mut self) {
        self.loading = true;
    }

    pub fn finish_load(&mut self, snapshot: StatsSnapshot) {
        self.loading = false;
        self.snapshot = Some(snapshot);
    }

    pub async fn load(&mut self, client: &ApiClient, mode: Option<&str>) {
        self.begin_load();
        let snapshot = fetch(client, mode).await;
        self.finish_load(snapshot);
    }
}
