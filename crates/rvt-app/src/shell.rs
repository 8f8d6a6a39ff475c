//! Application shell: the top-level state machine.
//!
//! The shell owns one inbox of [`Message`]s. User intents arrive through
//! [`Shell::sender`] or [`Shell::dispatch`]; network work is spawned and its
//! result comes back as [`Message::Completed`].
//!
//! Every view entry (startup, navigation, auth-mode switch, login, logout)
//! starts a new generation: the previous generation's cancellation token is
//! cancelled and completions stamped with an older [`Ticket`] are dropped, so
//! a slow fetch can never write into a view the user already left.

use std::{fmt, future::Future, str::FromStr, time::Duration};

use rvt_client::{
    ApiClient, ApiResult,
    metrics::record_auth_event,
    models::{
        ActiveMode, BulkCreated, Confidence, LoginResponse, OrEmpty, ParsedSyllabus,
        RegisteredUser, Topic,
    },
    operations::auth,
};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{
    error::ValidationError,
    workflow::{
        auth::{AuthForm, AuthMode},
        queue::{self, QueueLoad, QueueView},
        stats::{self, StatsSnapshot, StatsView},
        syllabus::SyllabusWorkflow,
        topics::{self, TopicsView},
    },
};

/// Authenticated pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Queue,
    Topics,
    Syllabus,
    Stats,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown page '{0}'")]
pub struct UnknownPage(pub String);

impl FromStr for Page {
    type Err = UnknownPage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "queue" => Ok(Self::Queue),
            "topics" => Ok(Self::Topics),
            "syllabus" => Ok(Self::Syllabus),
            "stats" => Ok(Self::Stats),
            _ => Err(UnknownPage(s.to_string())),
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Queue => "queue",
            Self::Topics => "topics",
            Self::Syllabus => "syllabus",
            Self::Stats => "stats",
        };
        f.write_str(name)
    }
}

/// Controller state of the page on screen
#[derive(Debug, Clone, PartialEq)]
pub enum PageView {
    Queue(QueueView),
    Topics(TopicsView),
    Syllabus(SyllabusWorkflow),
    Stats(StatsView),
}

impl PageView {
    pub const fn page(&self) -> Page {
        match self {
            Self::Queue(_) => Page::Queue,
            Self::Topics(_) => Page::Topics,
            Self::Syllabus(_) => Page::Syllabus,
            Self::Stats(_) => Page::Stats,
        }
    }
}

/// Authenticated state
#[derive(Debug, Clone, PartialEq)]
pub struct Workspace {
    token: String,
    mode: Option<String>,
    view: Option<PageView>,
}

impl Workspace {
    /// The shell's own copy of the session token
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Active prioritization mode, shared by the queue and stats pages
    pub fn mode(&self) -> Option<&str> {
        self.mode.as_deref()
    }

    pub const fn view(&self) -> Option<&PageView> {
        self.view.as_ref()
    }

    pub fn page(&self) -> Option<Page> {
        self.view.as_ref().map(PageView::page)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShellState {
    Loading,
    /// Session initialization failed
    Error(String),
    Unauthenticated(AuthForm),
    Authenticated(Workspace),
    /// Rendering failed; recoverable through [`Message::Reload`]
    RenderFailure(String),
    Closed,
}

/// Generation stamp carried by every spawned completion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug)]
pub enum Message {
    Init,
    Reload,
    SwitchAuthMode(AuthMode),
    Login {
        email: String,
        password: String,
    },
    Register {
        email: String,
        password: String,
        confirm: String,
    },
    /// Open a page by name; unknown names leave nothing to display
    Navigate(String),
    Logout,
    SetSyllabusText(String),
    SetSyllabusSubject(Option<String>),
    ParseSyllabus,
    CommitSyllabus,
    Revise {
        topic_id: Uuid,
        confidence: Option<Confidence>,
    },
    SelectMode(String),
    RenderFailed(String),
    Quit,
    Completed(Ticket, Completion),
}

/// Result of a spawned operation chain
#[derive(Debug)]
pub enum Completion {
    Login(ApiResult<LoginResponse>),
    Register(ApiResult<RegisteredUser>),
    RegisterRedirect,
    Queue(QueueLoad),
    ModeSelected(ApiResult<ActiveMode>),
    Topics(ApiResult<OrEmpty<Topic>>),
    Revised(ApiResult<Value>),
    Parsed(ApiResult<Option<ParsedSyllabus>>),
    Committed(ApiResult<BulkCreated>),
    Stats(StatsSnapshot),
}

/// What the renderer draws
#[derive(Debug, Clone, Copy)]
pub enum Screen<'a> {
    Loading,
    Error(&'a str),
    Auth(&'a AuthForm),
    Queue(&'a QueueView),
    Topics(&'a TopicsView),
    Syllabus(&'a SyllabusWorkflow),
    Stats(&'a StatsView),
    /// Page selection produced nothing to show
    NoContent,
    RenderFailure(&'a str),
    Closed,
}

#[derive(Debug)]
pub struct Shell {
    client: ApiClient,
    register_redirect: Duration,
    state: ShellState,
    generation: u64,
    cancel: CancellationToken,
    tx: UnboundedSender<Message>,
    rx: UnboundedReceiver<Message>,
}

impl Shell {
    pub fn new(client: ApiClient, register_redirect: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        Self {
            client,
            register_redirect,
            state: ShellState::Loading,
            generation: 0,
            cancel: CancellationToken::new(),
            tx,
            rx,
        }
    }

    /// Handle for feeding user intents from another task
    pub fn sender(&self) -> UnboundedSender<Message> {
        self.tx.clone()
    }

    pub const fn state(&self) -> &ShellState {
        &self.state
    }

    pub const fn ticket(&self) -> Ticket {
        Ticket(self.generation)
    }

    pub const fn is_closed(&self) -> bool {
        matches!(self.state, ShellState::Closed)
    }

    pub fn screen(&self) -> Screen<'_> {
        match &self.state {
            ShellState::Loading => Screen::Loading,
            ShellState::Error(detail) => Screen::Error(detail),
            ShellState::Unauthenticated(form) => Screen::Auth(form),
            ShellState::Authenticated(workspace) => match &workspace.view {
                Some(PageView::Queue(view)) => Screen::Queue(view),
                Some(PageView::Topics(view)) => Screen::Topics(view),
                Some(PageView::Syllabus(view)) => Screen::Syllabus(view),
                Some(PageView::Stats(view)) => Screen::Stats(view),
                None => Screen::NoContent,
            },
            ShellState::RenderFailure(detail) => Screen::RenderFailure(detail),
            ShellState::Closed => Screen::Closed,
        }
    }

    /// Wait for the next message and apply it. Returns `false` once the
    /// shell is closed.
    pub async fn step(&mut self) -> bool {
        match self.rx.recv().await {
            Some(message) => {
                self.dispatch(message);
                !self.is_closed()
            }
            None => false,
        }
    }

    pub fn dispatch(&mut self, message: Message) {
        match message {
            Message::Init | Message::Reload => self.start(),
            Message::Quit => {
                self.new_generation();
                self.state = ShellState::Closed;
            }
            Message::RenderFailed(reason) => {
                tracing::error!("Render failed: {reason}");
                self.new_generation();
                self.state = ShellState::RenderFailure(reason);
            }
            Message::Logout => self.logout(),
            Message::Completed(ticket, completion) => {
                if ticket == self.ticket() {
                    self.complete(completion);
                } else {
                    tracing::debug!(?ticket, current = ?self.ticket(), "Dropping stale completion");
                }
            }
            Message::SwitchAuthMode(mode) => self.switch_auth_mode(mode),
            Message::Login { email, password } => self.login(&email, &password),
            Message::Register {
                email,
                password,
                confirm,
            } => self.register(&email, &password, &confirm),
            Message::Navigate(name) => match name.parse::<Page>() {
                Ok(page) => self.open(Some(page)),
                Err(e) => {
                    tracing::warn!("{e}");
                    self.open(None);
                }
            },
            Message::SetSyllabusText(text) => {
                if let Some(PageView::Syllabus(view)) = self.view_mut() {
                    reject(view.set_text(text));
                }
            }
            Message::SetSyllabusSubject(subject) => {
                if let Some(PageView::Syllabus(view)) = self.view_mut() {
                    reject(view.set_subject(subject));
                }
            }
            Message::ParseSyllabus => self.parse_syllabus(),
            Message::CommitSyllabus => self.commit_syllabus(),
            Message::Revise {
                topic_id,
                confidence,
            } => self.revise(topic_id, confidence),
            Message::SelectMode(mode) => self.select_mode(&mode),
        }
    }

    fn new_generation(&mut self) {
        self.cancel.cancel();
        self.cancel = CancellationToken::new();
        self.generation += 1;
    }

    /// Run `work` in the background; its completion is tagged with the
    /// current ticket and abandoned when the generation changes
    fn spawn<F>(&self, work: F)
    where
        F: Future<Output = Completion> + Send + 'static,
    {
        let ticket = self.ticket();
        let cancel = self.cancel.clone();
        let tx = self.tx.clone();

        tokio::spawn(async move {
            tokio::select! {
                () = cancel.cancelled() => {
                    tracing::debug!(?ticket, "Operation cancelled");
                }
                completion = work => {
                    if tx.send(Message::Completed(ticket, completion)).is_err() {
                        tracing::debug!("Shell is gone, dropping completion");
                    }
                }
            }
        });
    }

    fn view_mut(&mut self) -> Option<&mut PageView> {
        match &mut self.state {
            ShellState::Authenticated(workspace) => workspace.view.as_mut(),
            _ => None,
        }
    }

    fn auth_form_mut(&mut self) -> Option<&mut AuthForm> {
        match &mut self.state {
            ShellState::Unauthenticated(form) => Some(form),
            _ => None,
        }
    }

    /// Read the stored token once and pick the first screen
    fn start(&mut self) {
        self.new_generation();
        self.state = ShellState::Loading;

        match self.client.session().restore() {
            Ok(Some(token)) => {
                tracing::info!("Restored stored session");
                self.enter_workspace(token);
            }
            Ok(None) => {
                self.state = ShellState::Unauthenticated(AuthForm::new(AuthMode::Login));
            }
            Err(e) => {
                tracing::error!("Failed to initialize session: {e}");
                self.state = ShellState::Error(e.to_string());
            }
        }
    }

    fn enter_workspace(&mut self, token: String) {
        self.state = ShellState::Authenticated(Workspace {
            token,
            mode: None,
            view: None,
        });
        self.open(Some(Page::Queue));
    }

    fn open(&mut self, page: Option<Page>) {
        if !matches!(self.state, ShellState::Authenticated(_)) {
            tracing::debug!(?page, "Navigation ignored while signed out");
            return;
        }
        self.new_generation();

        let client = self.client.clone();
        let ShellState::Authenticated(workspace) = &mut self.state else {
            return;
        };
        let mode = workspace.mode.clone();

        let view = match page {
            None => None,
            Some(Page::Queue) => {
                let mut view = QueueView::with_mode(mode.clone());
                view.begin_load();
                Some(PageView::Queue(view))
            }
            Some(Page::Topics) => {
                let mut view = TopicsView::new();
                view.begin_load();
                Some(PageView::Topics(view))
            }
            Some(Page::Syllabus) => Some(PageView::Syllabus(SyllabusWorkflow::new())),
            Some(Page::Stats) => {
                let mut view = StatsView::new();
                view.begin_load();
                Some(PageView::Stats(view))
            }
        };
        workspace.view = view;
        tracing::debug!(?page, "Opened page");

        match page {
            Some(Page::Queue) => self.spawn(async move {
                Completion::Queue(queue::fetch(&client, mode.as_deref()).await)
            }),
            Some(Page::Topics) => {
                self.spawn(async move { Completion::Topics(topics::fetch(&client).await) });
            }
            Some(Page::Stats) => self.spawn(async move {
                Completion::Stats(stats::fetch(&client, mode.as_deref()).await)
            }),
            Some(Page::Syllabus) | None => {}
        }
    }

    fn logout(&mut self) {
        self.client.session().logout();
        if matches!(self.state, ShellState::Authenticated(_)) {
            record_auth_event("logout", true);
            self.new_generation();
            self.state = ShellState::Unauthenticated(AuthForm::new(AuthMode::Login));
        }
    }

    fn switch_auth_mode(&mut self, mode: AuthMode) {
        if self.auth_form_mut().is_none() {
            return;
        }
        self.new_generation();
        if let Some(form) = self.auth_form_mut() {
            form.switch(mode);
        }
    }

    fn login(&mut self, email: &str, password: &str) {
        let Some(form) = self.auth_form_mut() else {
            return;
        };
        if reject(form.begin_login(email, password)).is_none() {
            return;
        }

        self.new_generation();
        let client = self.client.clone();
        let (email, password) = (email.to_string(), password.to_string());
        self.spawn(async move {
            Completion::Login(auth::login(&email, &password).send(&client).await)
        });
    }

    fn register(&mut self, email: &str, password: &str, confirm: &str) {
        let Some(form) = self.auth_form_mut() else {
            return;
        };
        if reject(form.begin_register(email, password, confirm)).is_none() {
            return;
        }

        let client = self.client.clone();
        let (email, password) = (email.to_string(), password.to_string());
        self.spawn(async move {
            Completion::Register(auth::register(&email, &password).send(&client).await)
        });
    }

    fn parse_syllabus(&mut self) {
        let Some(PageView::Syllabus(view)) = self.view_mut() else {
            return;
        };
        let Some(request) = reject(view.begin_parse()) else {
            return;
        };

        let client = self.client.clone();
        self.spawn(async move { Completion::Parsed(request.send(&client).await) });
    }

    fn commit_syllabus(&mut self) {
        let Some(PageView::Syllabus(view)) = self.view_mut() else {
            return;
        };
        let Some(request) = reject(view.begin_commit()) else {
            return;
        };

        let client = self.client.clone();
        self.spawn(async move { Completion::Committed(request.send(&client).await) });
    }

    fn revise(&mut self, topic_id: Uuid, confidence: Option<Confidence>) {
        let Some(PageView::Topics(view)) = self.view_mut() else {
            return;
        };
        let Some(request) = reject(view.begin_revise(topic_id, confidence)) else {
            return;
        };

        let client = self.client.clone();
        self.spawn(async move { Completion::Revised(request.send(&client).await) });
    }

    fn select_mode(&mut self, mode: &str) {
        let Some(PageView::Queue(view)) = self.view_mut() else {
            return;
        };
        let Some(mode) = reject(view.begin_select_mode(mode)) else {
            return;
        };

        let client = self.client.clone();
        self.spawn(async move {
            Completion::ModeSelected(queue::select_mode(&client, &mode).await)
        });
    }

    fn complete(&mut self, completion: Completion) {
        match completion {
            Completion::Login(result) => {
                let session = self.client.session().clone();
                let Some(form) = self.auth_form_mut() else {
                    return;
                };
                if let Some(token) = form.finish_login(result, &session) {
                    self.new_generation();
                    self.enter_workspace(token);
                }
            }
            Completion::Register(result) => {
                let Some(form) = self.auth_form_mut() else {
                    return;
                };
                if form.finish_register(result) {
                    let delay = self.register_redirect;
                    self.spawn(async move {
                        tokio::time::sleep(delay).await;
                        Completion::RegisterRedirect
                    });
                }
            }
            Completion::RegisterRedirect => {
                if self
                    .auth_form_mut()
                    .is_some_and(|form| form.mode() == AuthMode::Register)
                {
                    self.switch_auth_mode(AuthMode::Login);
                }
            }
            Completion::Queue(load) => {
                if let Some(PageView::Queue(view)) = self.view_mut() {
                    view.finish_load(load);
                }
            }
            Completion::ModeSelected(result) => self.mode_selected(result),
            Completion::Topics(result) => {
                if let Some(PageView::Topics(view)) = self.view_mut() {
                    view.finish_load(result);
                }
            }
            Completion::Revised(result) => {
                let Some(PageView::Topics(view)) = self.view_mut() else {
                    return;
                };
                if view.finish_revise(result) {
                    view.begin_load();
                    let client = self.client.clone();
                    self.spawn(async move { Completion::Topics(topics::fetch(&client).await) });
                }
            }
            Completion::Parsed(result) => {
                if let Some(PageView::Syllabus(view)) = self.view_mut() {
                    view.finish_parse(result);
                }
            }
            Completion::Committed(result) => {
                if let Some(PageView::Syllabus(view)) = self.view_mut() {
                    view.finish_commit(result);
                }
            }
            Completion::Stats(snapshot) => {
                if let Some(PageView::Stats(view)) = self.view_mut() {
                    view.finish_load(snapshot);
                }
            }
        }
    }

    fn mode_selected(&mut self, result: ApiResult<ActiveMode>) {
        let client = self.client.clone();
        let ShellState::Authenticated(workspace) = &mut self.state else {
            return;
        };
        let Some(PageView::Queue(view)) = workspace.view.as_mut() else {
            return;
        };
        if !view.finish_select_mode(result) {
            return;
        }

        let mode = view.mode().map(str::to_owned);
        view.begin_load();
        workspace.mode.clone_from(&mode);
        self.spawn(async move {
            Completion::Queue(queue::fetch(&client, mode.as_deref()).await)
        });
    }
}

/// Log a locally rejected action; the controller has already recorded any
/// message the user should see
fn reject<T>(result: Result<T, ValidationError>) -> Option<T> {
    result
        .map_err(|e| tracing::debug!("Action rejected: {e}"))
        .ok()
}
