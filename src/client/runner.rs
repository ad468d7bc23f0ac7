//! Event loop of the terminal client.
//!
//! Runs on the caller's (single-threaded) runtime. Network calls are spawned
//! tasks that report back over a channel, so the state only ever changes here.

use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyEventKind};
use futures_util::StreamExt;
use log::{debug, info};
use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};

use crate::api::QuizBackend;
use crate::error::ClientError;
use crate::models::QuizId;
use crate::quiz::AttemptTicket;
use crate::scoring::ScoringPolicy;
use crate::session::SessionStore;
use crate::terminal::TerminalGuard;

use super::app::{App, Effect, Reply};
use super::input::command_for;
use super::ui;

const TICK: Duration = Duration::from_secs(1);

/// Run the TUI until the user quits.
pub async fn run<B>(
    backend: B,
    store: SessionStore,
    policy: ScoringPolicy,
    start: Option<QuizId>,
) -> Result<(), ClientError>
where
    B: QuizBackend + Clone + 'static,
{
    let (mut app, effects) = App::new(policy, store.get_user(), start);
    let (tx, mut replies) = mpsc::unbounded_channel::<Reply>();
    dispatch(&backend, &tx, effects);

    let mut guard = TerminalGuard::enter()?;
    let mut events = EventStream::new();
    let mut session_changes = store.subscribe();
    let mut ticker = time::interval(TICK);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut armed: Option<AttemptTicket> = None;

    info!("Client started");
    while !app.should_quit {
        guard.terminal().draw(|frame| ui::render(frame, &app))?;

        // Restart the one-second cadence whenever a new attempt starts.
        let timer = app.timer_ticket();
        if timer != armed {
            ticker.reset();
            armed = timer;
        }

        let effects = tokio::select! {
            event = events.next() => match event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    match command_for(app.kind(), key) {
                        Some(command) => app.handle_command(command),
                        None => Vec::new(),
                    }
                }
                Some(Ok(_)) => Vec::new(),
                Some(Err(err)) => return Err(err.into()),
                None => {
                    app.should_quit = true;
                    Vec::new()
                }
            },
            Some(reply) = replies.recv() => app.handle_reply(reply, &store),
            _ = ticker.tick(), if armed.is_some() => app.tick(),
            Ok(()) = session_changes.changed() => {
                let snapshot = session_changes.borrow_and_update().clone();
                app.on_session_changed(snapshot);
                Vec::new()
            }
        };
        dispatch(&backend, &tx, effects);
    }

    info!("Client stopped");
    Ok(())
}

/// Start each effect as a task whose result comes back as a [`Reply`].
///
/// Replies sent after the loop has exited are dropped with the channel.
pub(crate) fn dispatch<B>(backend: &B, replies: &mpsc::UnboundedSender<Reply>, effects: Vec<Effect>)
where
    B: QuizBackend + Clone + 'static,
{
    for effect in effects {
        debug!("Dispatching {:?}", effect);
        let backend = backend.clone();
        let replies = replies.clone();
        tokio::spawn(async move {
            let reply = match effect {
                Effect::LoadCatalog { request } => Reply::Catalog {
                    request,
                    result: backend.list_quizzes().await,
                },
                Effect::FetchQuiz { ticket, quiz_id } => Reply::Quiz {
                    ticket,
                    result: backend.fetch_quiz(quiz_id).await,
                },
                Effect::Submit(pending) => Reply::Submitted {
                    ticket: pending.ticket,
                    result: backend.submit_attempt(pending.submission).await,
                },
            };
            let _ = replies.send(reply);
        });
    }
}
