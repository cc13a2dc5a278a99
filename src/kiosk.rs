//! Interactive terminal kiosk.
//!
//! One task owns the flow, the wishlist and every timer. Input lines, timer
//! ticks and backend completions all arrive as [`KioskEvent`]s on a single
//! channel, so state is only ever touched from this loop. Timer events carry
//! the generation they were armed under and backend completions carry the
//! flow epoch; anything from an older generation or epoch is dropped.

use std::io::{self, BufRead, BufReader, Write};
use std::ops::ControlFlow;
use std::sync::Arc;
use std::thread;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::api_types::{RecommendationResult, VibeReply};
use crate::attract::AttractOverlay;
use crate::backend::Backend;
use crate::chat::ChipRow;
use crate::config::Config;
use crate::errors::Error;
use crate::flow::{FlowController, FlowState, PendingSubmission, SubmissionOutcome};
use crate::passport::{PassportQr, RECOMMENDATIONS_QR_WIDTH, SIDEBAR_QR_WIDTH, passport_url};
use crate::render::{self, Extras};
use crate::timers::{IdlePolicy, IdleTimer, ScheduledTask, countdown};
use crate::wishlist::{LocalStorage, Wishlist};

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

#[derive(Debug)]
pub enum KioskEvent {
    /// One line of user input. Any input counts as activity.
    Input(String),
    InputClosed,
    Idle { generation: u64 },
    Slide { generation: u64 },
    Countdown { generation: u64, remaining: u64 },
    Submission {
        epoch: u64,
        result: Result<RecommendationResult, Error>,
    },
    ChatReply {
        session: Uuid,
        reply: Result<VibeReply, Error>,
    },
}

/// Timers armed for the current screen. Replacing a field drops (and aborts) the old task.
#[derive(Default)]
struct Timers {
    generation: u64,
    armed_for: Option<(usize, u64)>,
    idle: Option<IdleTimer>,
    slideshow: Option<ScheduledTask>,
    countdown: Option<ScheduledTask>,
}

pub struct Kiosk<S: LocalStorage> {
    config: Config,
    backend: Arc<dyn Backend>,
    flow: FlowController,
    wishlist: Wishlist<S>,
    qr: PassportQr,
    card_qr: PassportQr,
    sidebar_qr: PassportQr,
    overlay: Option<AttractOverlay>,
    remaining: Option<u64>,
    notice: Option<String>,
    timers: Timers,
    out: Box<dyn Write + Send>,
    tx: mpsc::UnboundedSender<KioskEvent>,
    rx: mpsc::UnboundedReceiver<KioskEvent>,
}

impl<S: LocalStorage> Kiosk<S> {
    pub fn new(
        config: Config,
        backend: Arc<dyn Backend>,
        wishlist: Wishlist<S>,
        flow: FlowController,
        out: Box<dyn Write + Send>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            qr: PassportQr::new(config.origin.clone(), config.qr_width_px),
            card_qr: PassportQr::new(config.origin.clone(), RECOMMENDATIONS_QR_WIDTH),
            sidebar_qr: PassportQr::new(config.origin.clone(), SIDEBAR_QR_WIDTH),
            config,
            backend,
            flow,
            wishlist,
            overlay: None,
            remaining: None,
            notice: None,
            timers: Timers::default(),
            out,
            tx,
            rx,
        }
    }

    pub fn flow(&self) -> &FlowController {
        &self.flow
    }

    pub fn wishlist(&self) -> &Wishlist<S> {
        &self.wishlist
    }

    pub fn overlay(&self) -> Option<&AttractOverlay> {
        self.overlay.as_ref()
    }

    pub fn countdown_remaining(&self) -> Option<u64> {
        self.remaining
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Channel for feeding events from outside the loop.
    pub fn sender(&self) -> mpsc::UnboundedSender<KioskEvent> {
        self.tx.clone()
    }

    /// Passport URL for the active session, if any.
    pub fn passport_url(&self) -> Option<String> {
        self.flow
            .state()
            .session_id()
            .map(|id| passport_url(&self.config.origin, id))
    }

    /// Read stdin lines until EOF or quit.
    pub async fn run(self) -> Result<(), Error> {
        self.run_with_input(BufReader::new(io::stdin())).await
    }

    /// Run the loop on lines from `input`. The reader lives on its own thread,
    /// so a blocked read never holds up shutdown.
    pub async fn run_with_input<R>(mut self, input: R) -> Result<(), Error>
    where
        R: BufRead + Send + 'static,
    {
        spawn_input_reader(input, self.sender())?;

        info!(backend = %self.config.backend_url, "kiosk started");
        self.sync_timers();
        self.redraw()?;
        while self.step().await?.is_continue() {}
        info!("kiosk stopped");
        Ok(())
    }

    /// Handle the next event, then re-arm timers and redraw.
    pub async fn step(&mut self) -> Result<ControlFlow<()>, Error> {
        let Some(event) = self.rx.recv().await else {
            return Ok(ControlFlow::Break(()));
        };
        let flow = self.handle(event);
        self.sync_timers();
        self.redraw()?;
        Ok(flow)
    }

    fn handle(&mut self, event: KioskEvent) -> ControlFlow<()> {
        match event {
            KioskEvent::Input(line) => {
                if let Some(idle) = &self.timers.idle {
                    idle.activity();
                }
                if self.overlay.take().is_some() {
                    debug!("attract overlay dismissed");
                    return ControlFlow::Continue(());
                }
                self.notice = None;
                return self.handle_input(line.trim());
            }
            KioskEvent::InputClosed => return ControlFlow::Break(()),
            KioskEvent::Idle { generation } if generation == self.timers.generation => {
                match IdlePolicy::for_state(self.flow.state(), &self.config) {
                    IdlePolicy::Attract(_) => {
                        debug!("raising attract overlay");
                        self.overlay = Some(AttractOverlay::new());
                    }
                    IdlePolicy::Reset(_) => {
                        info!(screen = self.flow.state().name(), "idle reset");
                        self.restart();
                    }
                }
            }
            KioskEvent::Slide { generation } if generation == self.timers.generation => {
                if let Some(overlay) = &mut self.overlay {
                    overlay.advance();
                }
            }
            KioskEvent::Countdown {
                generation,
                remaining,
            } if generation == self.timers.generation => {
                self.remaining = Some(remaining);
                if remaining == 0 {
                    info!("QR countdown finished");
                    self.restart();
                }
            }
            KioskEvent::Submission { epoch, result } => {
                match self.flow.complete_submission(epoch, result) {
                    Ok(SubmissionOutcome::Applied) | Ok(SubmissionOutcome::Stale) => {}
                    Err(_) => {
                        self.notice = Some(
                            "We couldn't load your recommendations. Please try again.".to_string(),
                        );
                    }
                }
            }
            KioskEvent::ChatReply { session, reply } => match self.flow.chat_mut() {
                Some(chat) if chat.id() == session => {
                    chat.resolve(reply);
                }
                _ => debug!(%session, "dropping reply for a closed chat"),
            },
            KioskEvent::Idle { .. } | KioskEvent::Slide { .. } | KioskEvent::Countdown { .. } => {
                debug!("ignoring timer event from an earlier screen");
            }
        }
        ControlFlow::Continue(())
    }

    fn handle_input(&mut self, line: &str) -> ControlFlow<()> {
        let result = match line {
            "q" | "quit" | "exit" => return ControlFlow::Break(()),
            "r" | "restart" => {
                self.restart();
                Ok(())
            }
            "b" | "back" => self.flow.back(),
            _ => self.handle_screen_input(line),
        };
        if let Err(e) = result {
            debug!(error = %e, "input rejected");
            self.notice = Some(e.to_string());
        }
        ControlFlow::Continue(())
    }

    fn handle_screen_input(&mut self, line: &str) -> Result<(), Error> {
        let (command, arg) = match line.split_once(char::is_whitespace) {
            Some((command, arg)) => (command, Some(arg.trim())),
            None => (line, None),
        };
        let position = || -> Result<usize, Error> {
            arg.unwrap_or(command)
                .trim_start_matches(|c: char| c.is_ascii_alphabetic())
                .parse::<usize>()
                .map_err(|_| Error::InvalidInput(format!("Expected a number: {line}")))
        };

        match self.flow.state() {
            FlowState::Welcome => self.flow.start(),
            FlowState::Survey(step) => {
                if line.is_empty() {
                    if step.next().is_some() {
                        self.flow.advance()
                    } else {
                        self.begin(FlowController::begin_submission)
                    }
                } else {
                    self.flow.choose(position()?)
                }
            }
            FlowState::Recommendations { .. } => match command {
                "d" => self.flow.view_details(position()?),
                "w" => {
                    let id = self.flow.product_at(position()?)?.id.clone();
                    let added = self.wishlist.toggle(&id)?;
                    info!(product = %id, added, "wishlist toggled");
                    Ok(())
                }
                "s" => self.flow.ask_stylist(),
                "p" => self.flow.get_on_phone(),
                _ => Err(Error::InvalidInput(format!("Unknown action: {line}"))),
            },
            FlowState::ChatDetail { .. } => self.handle_chat_input(line, command, arg),
            FlowState::Qr { .. } => Err(Error::InvalidInput(
                "Press r to start over or b to go back".to_string(),
            )),
        }
    }

    /// Chat commands are a bare letter (`c`, `f`), a chip pick (`o 2`) or a
    /// quick question (`q3`). Any other line is a question for the stylist.
    fn handle_chat_input(
        &mut self,
        line: &str,
        command: &str,
        arg: Option<&str>,
    ) -> Result<(), Error> {
        let number = arg.and_then(|a| a.parse::<usize>().ok());
        let row = match command {
            "o" => Some(ChipRow::Occasion),
            "t" => Some(ChipRow::Style),
            "m" => Some(ChipRow::Budget),
            _ => None,
        };
        match (command, arg, row, number) {
            ("c", None, ..) => return self.flow.continue_to_qr(),
            ("f", None, ..) => return self.begin(FlowController::begin_chat_submission),
            (_, _, Some(row), Some(position)) => {
                if let Some(chat) = self.flow.chat_mut() {
                    chat.chips_mut().pick(row, position)?;
                }
                return Ok(());
            }
            _ => {}
        }

        let quick = command
            .strip_prefix('q')
            .filter(|_| arg.is_none())
            .and_then(|n| n.parse::<usize>().ok());
        let Some(chat) = self.flow.chat_mut() else {
            return Ok(());
        };
        if let Some(position) = quick {
            chat.ask_quick(position)?;
            return Ok(());
        }

        let request = chat.prepare(line)?;
        let session = chat.id();
        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let reply = backend.ai_vibe(&request).await;
            let _ = tx.send(KioskEvent::ChatReply { session, reply });
        });
        Ok(())
    }

    /// Start a survey submission and post its completion back to the loop.
    fn begin(
        &mut self,
        begin: fn(&mut FlowController) -> Result<PendingSubmission, Error>,
    ) -> Result<(), Error> {
        let PendingSubmission { epoch, request } = begin(&mut self.flow)?;
        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = backend.submit_survey(&request).await;
            let _ = tx.send(KioskEvent::Submission { epoch, result });
        });
        Ok(())
    }

    fn restart(&mut self) {
        self.flow.restart();
        self.overlay = None;
        self.remaining = None;
    }

    /// Re-arm timers whenever the screen or the flow epoch changed.
    fn sync_timers(&mut self) {
        let key = (self.flow.step_index(), self.flow.epoch());
        let overlay_up = self.overlay.is_some();

        if self.timers.armed_for != Some(key) {
            self.timers.generation += 1;
            self.timers.armed_for = Some(key);
            self.timers.slideshow = None;
            self.timers.countdown = None;
            self.remaining = None;

            let generation = self.timers.generation;
            let policy = IdlePolicy::for_state(self.flow.state(), &self.config);
            let tx = self.tx.clone();
            self.timers.idle = Some(IdleTimer::spawn(policy.timeout(), move || {
                let _ = tx.send(KioskEvent::Idle { generation });
            }));

            if matches!(self.flow.state(), FlowState::Qr { .. }) {
                let from = self.config.qr_countdown_secs;
                self.remaining = Some(from);
                let tx = self.tx.clone();
                self.timers.countdown = Some(countdown(
                    from,
                    std::time::Duration::from_secs(1),
                    move |remaining| {
                        let _ = tx.send(KioskEvent::Countdown {
                            generation,
                            remaining,
                        });
                    },
                ));
            }
            debug!(?policy, generation, "timers armed");
        }

        match (overlay_up, self.timers.slideshow.is_some()) {
            (true, false) => {
                let generation = self.timers.generation;
                let tx = self.tx.clone();
                self.timers.slideshow = Some(ScheduledTask::every(
                    self.config.slide_interval(),
                    move || match tx.send(KioskEvent::Slide { generation }) {
                        Ok(()) => ControlFlow::Continue(()),
                        Err(_) => ControlFlow::Break(()),
                    },
                ));
            }
            (false, true) => self.timers.slideshow = None,
            _ => {}
        }
    }

    fn redraw(&mut self) -> Result<(), Error> {
        let text = match &self.overlay {
            Some(overlay) => render::attract(overlay),
            None => {
                let session = self.flow.state().session_id();
                let qr = match self.flow.state() {
                    FlowState::Recommendations { .. } => self.card_qr.for_session(session),
                    FlowState::ChatDetail { .. } => self.sidebar_qr.for_session(session),
                    FlowState::Qr { .. } => self.qr.for_session(session),
                    _ => None,
                };
                let qr_url = session.map(|id| passport_url(&self.config.origin, id));
                render::screen(
                    &self.flow,
                    &Extras {
                        wishlist: self.wishlist.ids(),
                        qr,
                        qr_url: qr_url.as_deref(),
                        countdown: self.remaining,
                        notice: self.notice.as_deref(),
                    },
                )
            }
        };
        write!(self.out, "{CLEAR_SCREEN}{text}\n> ")?;
        self.out.flush()?;
        Ok(())
    }
}

/// Forward input lines to the loop until EOF or until the loop is gone.
fn spawn_input_reader<R>(input: R, tx: mpsc::UnboundedSender<KioskEvent>) -> Result<(), Error>
where
    R: BufRead + Send + 'static,
{
    thread::Builder::new()
        .name("kiosk-input".to_string())
        .spawn(move || {
            for line in input.lines() {
                match line {
                    Ok(line) => {
                        if tx.send(KioskEvent::Input(line)).is_err() {
                            return;
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "input read failed");
                        break;
                    }
                }
            }
            let _ = tx.send(KioskEvent::InputClosed);
        })?;
    Ok(())
}

/// Convenience for the binary: log why the backend is unreachable, then keep going.
pub async fn probe_backend(backend: &dyn Backend) {
    if let Err(e) = backend.health().await {
        warn!(error = %e, "backend health check failed");
    }
}
