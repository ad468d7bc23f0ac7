//! Terminal client state.
//!
//! `App` reacts to commands, replies and ticks and returns the network work to
//! start as [`Effect`]s; the runner performs them and feeds [`Reply`]s back.

use log::{debug, info};

use crate::catalog::{self, CatalogFilter, CategorySummary};
use crate::error::ApiError;
use crate::models::{Quiz, QuizId, QuizResult, User};
use crate::quiz::{AttemptTicket, Phase, PendingSubmission, QuizSession, ScoreLedger, TickOutcome};
use crate::scoring::ScoringPolicy;
use crate::session::SessionSnapshot;

/// Network work requested by the app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    LoadCatalog { request: u64 },
    FetchQuiz { ticket: AttemptTicket, quiz_id: QuizId },
    Submit(PendingSubmission),
}

/// Completion of an [`Effect`].
#[derive(Debug)]
pub enum Reply {
    Catalog {
        request: u64,
        result: Result<Vec<Quiz>, ApiError>,
    },
    Quiz {
        ticket: AttemptTicket,
        result: Result<Quiz, ApiError>,
    },
    Submitted {
        ticket: AttemptTicket,
        result: Result<QuizResult, ApiError>,
    },
}

/// User intent, already decoded from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Up,
    Down,
    Confirm,
    Back,
    Quit,
    NextQuestion,
    PreviousQuestion,
    JumpTo(usize),
    Submit,
    /// Retake a completed quiz or retry a failed load.
    Again,
    Reload,
    CycleCategory,
    CycleDifficulty,
    CycleSort,
}

/// Quiz list with its filter and cursor.
#[derive(Debug, Default)]
pub struct CatalogView {
    pub quizzes: Vec<Quiz>,
    pub categories: Vec<CategorySummary>,
    pub filter: CatalogFilter,
    pub cursor: usize,
    pub loading: bool,
    pub error: Option<String>,
    request: u64,
}

impl CatalogView {
    pub fn visible(&self) -> Vec<&Quiz> {
        self.filter.apply(&self.quizzes)
    }

    pub fn selected(&self) -> Option<&Quiz> {
        self.visible().get(self.cursor).copied()
    }

    fn clamp_cursor(&mut self) {
        let len = self.visible().len();
        self.cursor = self.cursor.min(len.saturating_sub(1));
    }
}

/// A quiz attempt plus the option cursor and review scroll.
pub struct QuizScreen {
    pub session: QuizSession,
    pub highlight: usize,
    pub scroll: usize,
}

impl QuizScreen {
    fn new(session: QuizSession) -> Self {
        Self {
            session,
            highlight: 0,
            scroll: 0,
        }
    }

    /// Put the cursor on the saved answer of the question now shown.
    fn sync_highlight(&mut self) {
        self.highlight = self.session.current_answer().unwrap_or(0);
    }
}

pub enum Screen {
    Catalog,
    Quiz(QuizScreen),
    SignedOut { message: String },
}

/// Discriminant of [`Screen`], used for key mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenKind {
    Catalog,
    Quiz(Phase),
    SignedOut,
}

pub struct App {
    pub screen: Screen,
    pub catalog: CatalogView,
    pub user: Option<User>,
    pub should_quit: bool,
    policy: ScoringPolicy,
}

impl App {
    /// Create the app; opens `start` directly when given, else the catalog.
    pub fn new(policy: ScoringPolicy, user: Option<User>, start: Option<QuizId>) -> (Self, Vec<Effect>) {
        let mut app = Self {
            screen: Screen::Catalog,
            catalog: CatalogView::default(),
            user,
            should_quit: false,
            policy,
        };

        let mut effects = vec![app.reload_catalog()];
        if let Some(quiz_id) = start {
            effects.push(app.open_quiz(quiz_id));
        }
        (app, effects)
    }

    pub fn kind(&self) -> ScreenKind {
        match &self.screen {
            Screen::Catalog => ScreenKind::Catalog,
            Screen::Quiz(quiz) => ScreenKind::Quiz(quiz.session.phase()),
            Screen::SignedOut { .. } => ScreenKind::SignedOut,
        }
    }

    /// Ticket of the attempt whose timer should be running, if any.
    pub fn timer_ticket(&self) -> Option<AttemptTicket> {
        match &self.screen {
            Screen::Quiz(quiz) if quiz.session.is_timer_running() => Some(quiz.session.ticket()),
            _ => None,
        }
    }

    fn reload_catalog(&mut self) -> Effect {
        self.catalog.request += 1;
        self.catalog.loading = true;
        self.catalog.error = None;
        Effect::LoadCatalog {
            request: self.catalog.request,
        }
    }

    fn open_quiz(&mut self, quiz_id: QuizId) -> Effect {
        let session = QuizSession::new(quiz_id, self.policy);
        let ticket = session.ticket();
        info!("Opening quiz {}", quiz_id);
        self.screen = Screen::Quiz(QuizScreen::new(session));
        Effect::FetchQuiz { ticket, quiz_id }
    }

    pub fn handle_command(&mut self, command: Command) -> Vec<Effect> {
        if command == Command::Quit {
            self.should_quit = true;
            return Vec::new();
        }

        match self.screen {
            Screen::Catalog => self.catalog_command(command),
            Screen::Quiz(_) => self.quiz_command(command),
            Screen::SignedOut { .. } => {
                if matches!(command, Command::Back | Command::Confirm) {
                    self.should_quit = true;
                }
                Vec::new()
            }
        }
    }

    fn catalog_command(&mut self, command: Command) -> Vec<Effect> {
        let catalog = &mut self.catalog;
        match command {
            Command::Up => catalog.cursor = catalog.cursor.saturating_sub(1),
            Command::Down => {
                catalog.cursor += 1;
                catalog.clamp_cursor();
            }
            Command::Confirm => {
                if let Some(quiz_id) = catalog.selected().map(|q| q.id) {
                    return vec![self.open_quiz(quiz_id)];
                }
            }
            Command::Reload => return vec![self.reload_catalog()],
            Command::CycleCategory => {
                let categories = catalog.categories.clone();
                catalog.filter.cycle_category(&categories);
                catalog.cursor = 0;
            }
            Command::CycleDifficulty => {
                catalog.filter.cycle_difficulty();
                catalog.cursor = 0;
            }
            Command::CycleSort => {
                catalog.filter.sort = catalog.filter.sort.cycle();
                catalog.cursor = 0;
            }
            Command::Back => self.should_quit = true,
            _ => {}
        }
        Vec::new()
    }

    fn quiz_command(&mut self, command: Command) -> Vec<Effect> {
        let Screen::Quiz(quiz) = &mut self.screen else {
            return Vec::new();
        };

        if command == Command::Back {
            debug!("Leaving quiz {}", quiz.session.quiz_id());
            self.screen = Screen::Catalog;
            return Vec::new();
        }

        match quiz.session.phase() {
            Phase::InProgress => match command {
                Command::Up => quiz.highlight = quiz.highlight.saturating_sub(1),
                Command::Down => {
                    let options = quiz
                        .session
                        .current_question()
                        .map(|q| q.options.len())
                        .unwrap_or(0);
                    quiz.highlight = (quiz.highlight + 1).min(options.saturating_sub(1));
                }
                Command::Confirm => {
                    quiz.session.select(quiz.highlight);
                }
                Command::NextQuestion => {
                    quiz.session.next();
                    quiz.sync_highlight();
                }
                Command::PreviousQuestion => {
                    quiz.session.previous();
                    quiz.sync_highlight();
                }
                Command::JumpTo(index) => {
                    quiz.session.jump_to(index);
                    quiz.sync_highlight();
                }
                Command::Submit => {
                    if let Some(pending) = quiz.session.submit() {
                        return vec![Effect::Submit(pending)];
                    }
                }
                _ => {}
            },
            Phase::Completed => match command {
                Command::Again => {
                    if quiz.session.retake() {
                        quiz.highlight = 0;
                        quiz.scroll = 0;
                    }
                }
                Command::Up => quiz.scroll = quiz.scroll.saturating_sub(1),
                Command::Down => {
                    let max = quiz.session.question_count().saturating_sub(1);
                    quiz.scroll = (quiz.scroll + 1).min(max);
                }
                _ => {}
            },
            Phase::Errored => {
                if command == Command::Again {
                    if let Some(ticket) = quiz.session.retry() {
                        return vec![Effect::FetchQuiz {
                            ticket,
                            quiz_id: quiz.session.quiz_id(),
                        }];
                    }
                }
            }
            Phase::Loading | Phase::Submitting => {}
        }
        Vec::new()
    }

    /// One second passed.
    pub fn tick(&mut self) -> Vec<Effect> {
        let Screen::Quiz(quiz) = &mut self.screen else {
            return Vec::new();
        };
        match quiz.session.tick() {
            TickOutcome::Expired(pending) => vec![Effect::Submit(pending)],
            TickOutcome::Running { .. } | TickOutcome::Ignored => Vec::new(),
        }
    }

    pub fn handle_reply(&mut self, reply: Reply, ledger: &dyn ScoreLedger) -> Vec<Effect> {
        match reply {
            Reply::Catalog { request, result } => self.catalog_loaded(request, result),
            Reply::Quiz { ticket, result } => {
                if let Screen::Quiz(quiz) = &mut self.screen {
                    quiz.session.on_loaded(ticket, result);
                    quiz.sync_highlight();
                } else {
                    debug!("Discarding quiz fetch reply, quiz screen is closed");
                }
            }
            Reply::Submitted { ticket, result } => {
                if let Screen::Quiz(quiz) = &mut self.screen {
                    quiz.session.on_submitted(ticket, result, ledger);
                } else {
                    debug!("Discarding submission reply, quiz screen is closed");
                }
            }
        }
        Vec::new()
    }

    fn catalog_loaded(&mut self, request: u64, result: Result<Vec<Quiz>, ApiError>) {
        if request != self.catalog.request {
            return;
        }
        self.catalog.loading = false;
        match result {
            Ok(quizzes) => {
                debug!("Catalog loaded with {} quizzes", quizzes.len());
                self.catalog.categories = catalog::categories(&quizzes);
                self.catalog.quizzes = quizzes;
                self.catalog.clamp_cursor();
            }
            Err(err) => self.catalog.error = Some(err.to_string()),
        }
    }

    /// The session store changed, possibly from another part of the client.
    pub fn on_session_changed(&mut self, snapshot: SessionSnapshot) {
        if !snapshot.is_signed_in() {
            info!("Session ended, leaving current screen");
            self.screen = Screen::SignedOut {
                message: "Your session has expired. Run `quiz login` to sign in again.".to_string(),
            };
        }
        self.user = snapshot.user;
    }
}
