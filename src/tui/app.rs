//! Main TUI application state machine.
//!
//! Handles:
//! - Screen navigation
//! - Input event handling
//! - Prediction service integration

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};
use zeroize::Zeroize;

use crate::adapters::load_ensemble;
use crate::application::PredictionService;
use crate::config::RuntimeConfig;

use super::ui::{
    patient::{render_patient_form, PatientFormState},
    render_disclaimer,
    result::{render_result, ResultState},
};

/// Current screen/view in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    PatientForm,
    Result,
}

/// Main application state
pub struct App {
    screen: Screen,
    should_quit: bool,
    service: PredictionService,
    patient_form_state: PatientFormState,
    result_state: ResultState,
}

impl App {
    /// Create the application, loading the ensemble named by `config`.
    ///
    /// # Errors
    /// Returns error if the artifact is missing or fails verification; the
    /// application never starts without a usable ensemble.
    pub fn new(config: &RuntimeConfig) -> Result<Self> {
        let model_path = config.model_path.as_path();
        if !model_path.exists() {
            return Err(anyhow!(
                "Model path not found at {:?}. Set GASTRIC_RFS_MODEL_PATH to an artifact directory containing manifest.json.",
                model_path
            ));
        }

        let ensemble = load_ensemble(model_path)
            .map_err(|e| anyhow!("Failed to load model artifact from {:?}: {}", model_path, e))?;

        let service = PredictionService::new(Arc::new(ensemble));
        Ok(Self::with_service(service))
    }

    /// Create application with an injected service.
    #[must_use]
    pub fn with_service(service: PredictionService) -> Self {
        Self {
            screen: Screen::PatientForm,
            should_quit: false,
            service,
            patient_form_state: PatientFormState::default(),
            result_state: ResultState::default(),
        }
    }

    #[must_use]
    pub fn screen(&self) -> Screen {
        self.screen
    }

    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Run the main application loop.
    ///
    /// # Errors
    /// Returns error if terminal operations fail.
    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.main_loop(&mut terminal);

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        while !self.should_quit {
            terminal.draw(|f| {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Min(0), Constraint::Length(3)])
                    .split(f.area());

                match self.screen {
                    Screen::PatientForm => {
                        render_patient_form(f, chunks[0], &self.patient_form_state);
                    }
                    Screen::Result => render_result(f, chunks[0], &self.result_state),
                }

                render_disclaimer(f, chunks[1]);
            })?;

            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code, key.modifiers);
                    }
                }
            }
        }

        Ok(())
    }

    pub fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        if key == KeyCode::Char('q') && modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match self.screen {
            Screen::PatientForm => self.handle_patient_form_key(key),
            Screen::Result => self.handle_result_key(key),
        }
    }

    fn handle_patient_form_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Up | KeyCode::BackTab => self.patient_form_state.prev_field(),
            KeyCode::Down | KeyCode::Tab => self.patient_form_state.next_field(),
            KeyCode::Left => self.patient_form_state.cycle_choice(false),
            KeyCode::Right | KeyCode::Char(' ') => self.patient_form_state.cycle_choice(true),
            KeyCode::Char('s') | KeyCode::Char('S') => self.patient_form_state.load_sample_data(),
            KeyCode::Char(c) => self.patient_form_state.input_char(c),
            KeyCode::Backspace => self.patient_form_state.delete_char(),
            KeyCode::Delete => self.patient_form_state.clear_field(),
            KeyCode::Enter => self.submit_patient_form(),
            _ => {}
        }
    }

    fn handle_result_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Enter | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.result_state = ResultState::Idle;
                self.screen = Screen::PatientForm;
            }
            KeyCode::Esc => self.should_quit = true,
            _ => {}
        }
    }

    fn submit_patient_form(&mut self) {
        let mut raw = self.patient_form_state.to_raw_input();
        let outcome = self.service.predict(&raw);
        raw.zeroize();

        match outcome {
            Ok(prediction) => {
                self.result_state = ResultState::Complete { prediction };
            }
            // Input problems stay on the form so the user can correct them.
            Err(e) if e.is_input_error() => {
                self.patient_form_state.error_message = Some(e.to_string());
                return;
            }
            Err(e) => {
                tracing::error!("Prediction failed: {}", e);
                self.result_state = ResultState::Error {
                    message: e.to_string(),
                };
            }
        }

        self.patient_form_state.clear_sensitive();
        self.screen = Screen::Result;
    }
}
