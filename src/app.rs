use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, info};
use ratatui::backend::Backend;

use crate::errors::{GraphError, Result};
use crate::history::{BandwidthSample, SampleWindow};
use crate::source::EventSource;
use crate::surface::Surface;
use crate::ui::GraphRenderer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardState {
    Idle,
    Active,
    Terminating,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardEvent {
    Sample(BandwidthSample),
    Resize,
    Quit,
    Interrupt,
}

#[derive(Debug, Clone)]
pub struct DashboardHandle {
    events: Sender<DashboardEvent>,
}

impl DashboardHandle {
    // Each method reports whether the dashboard is still listening.

    pub fn sample(&self, sample: BandwidthSample) -> bool {
        self.events.send(DashboardEvent::Sample(sample)).is_ok()
    }

    pub fn resize(&self) -> bool {
        self.events.send(DashboardEvent::Resize).is_ok()
    }

    pub fn quit(&self) -> bool {
        self.events.send(DashboardEvent::Quit).is_ok()
    }

    pub fn interrupt(&self) -> bool {
        self.events.send(DashboardEvent::Interrupt).is_ok()
    }
}

pub struct Dashboard<B: Backend, S: EventSource> {
    state: DashboardState,
    window: SampleWindow,
    renderer: GraphRenderer,
    surface: Surface<B>,
    source: S,
    subscribed: bool,
    events_tx: Sender<DashboardEvent>,
    events_rx: Receiver<DashboardEvent>,
}

impl<B: Backend, S: EventSource> Dashboard<B, S> {
    pub fn new(surface: Surface<B>, source: S, renderer: GraphRenderer) -> Self {
        let (events_tx, events_rx) = unbounded();
        Self {
            state: DashboardState::Idle,
            window: SampleWindow::new(),
            renderer,
            surface,
            source,
            subscribed: false,
            events_tx,
            events_rx,
        }
    }

    pub fn handle(&self) -> DashboardHandle {
        DashboardHandle {
            events: self.events_tx.clone(),
        }
    }

    /// Subscribes to the event source. Samples queue up until [`run`](Self::run).
    /// A failed first render tears the dashboard down again.
    pub fn start(&mut self) -> Result<()> {
        self.expect_state(DashboardState::Idle)?;

        let handle = self.handle();
        self.source.subscribe(Box::new(move |event| {
            if !handle.sample(event.into()) {
                debug!("dashboard gone, dropping {event:?}");
            }
        }))?;
        self.subscribed = true;
        self.window = SampleWindow::new();
        self.state = DashboardState::Active;
        info!("dashboard active");

        // Show an empty graph until the first sample lands
        if let Err(err) = self.renderer.render(&self.window, &mut self.surface) {
            self.stop();
            return Err(err);
        }
        Ok(())
    }

    /// Processes events until a key press or interrupt, then tears down,
    /// error or not.
    pub fn run(&mut self) -> Result<()> {
        if self.state == DashboardState::Idle {
            if let Err(err) = self.start() {
                self.stop();
                return Err(err);
            }
        }
        self.expect_state(DashboardState::Active)?;

        let result = self.event_loop();
        self.stop();
        result
    }

    fn event_loop(&mut self) -> Result<()> {
        // The dashboard holds a sender itself, so recv only fails if that is gone
        while let Ok(event) = self.events_rx.recv() {
            match event {
                DashboardEvent::Sample(sample) => self.on_sample(sample)?,
                DashboardEvent::Resize => self.renderer.render(&self.window, &mut self.surface)?,
                DashboardEvent::Quit | DashboardEvent::Interrupt => {
                    info!("{event:?} received, terminating");
                    self.state = DashboardState::Terminating;
                    return Ok(());
                }
            }
        }
        Ok(())
    }

    pub fn on_sample(&mut self, sample: BandwidthSample) -> Result<()> {
        if self.state != DashboardState::Active {
            debug!("ignoring sample while {:?}", self.state);
            return Ok(());
        }
        self.window.push(sample);
        self.renderer.render(&self.window, &mut self.surface)
    }

    // Unsubscribe and restore the terminal, once
    pub fn stop(&mut self) {
        if self.state == DashboardState::Stopped {
            return;
        }
        self.state = DashboardState::Terminating;

        if self.subscribed {
            self.source.unsubscribe();
            self.subscribed = false;
        }
        self.surface.restore();
        self.state = DashboardState::Stopped;
        info!("dashboard stopped");
    }

    pub fn state(&self) -> DashboardState {
        self.state
    }

    pub fn window(&self) -> &SampleWindow {
        &self.window
    }

    pub fn surface(&self) -> &Surface<B> {
        &self.surface
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    fn expect_state(&self, expected: DashboardState) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(GraphError::InvalidState {
                actual: self.state,
                expected,
            })
        }
    }
}

impl<B: Backend, S: EventSource> Drop for Dashboard<B, S> {
    fn drop(&mut self) {
        self.stop();
    }
}
