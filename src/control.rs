//! Operator controls
//!
//! The encoder, push button and tempo commit of the front panel, driven from
//! text commands on the host.

use crate::engine::{EngineState, SharedEngine};
use crate::storage::{self, BpmStore};
use crate::tempo::Tempo;
use dialoguer::Input;
use log::{error, info};
use std::error::Error;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Encoder detents; positive is clockwise
    Nudge(i32),
    Set(u16),
    /// Push button
    Toggle,
    Start,
    Stop,
    /// Commit the current tempo to storage
    Save,
    Status,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlError {
    Empty,
    Unknown(String),
    BadNumber(String),
}

impl fmt::Display for ControlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlError::Empty => write!(f, "no command given"),
            ControlError::Unknown(cmd) => write!(f, "unknown command: {}", cmd),
            ControlError::BadNumber(arg) => write!(f, "not a number: {}", arg),
        }
    }
}

impl Error for ControlError {}

impl Command {
    pub fn parse(input: &str) -> Result<Command, ControlError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            // A line of only whitespace stands in for the transport button
            return if input.is_empty() {
                Err(ControlError::Empty)
            } else {
                Ok(Command::Toggle)
            };
        }

        if let Some(steps) = trimmed.strip_prefix('+') {
            return parse_steps(steps).map(Command::Nudge);
        }
        if let Some(steps) = trimmed.strip_prefix('-') {
            return parse_steps(steps).map(|n| Command::Nudge(-n));
        }

        let mut words = trimmed.split_whitespace();
        let word = words.next().unwrap_or_default().to_ascii_lowercase();
        match word.as_str() {
            "bpm" | "set" => {
                let arg = words.next().ok_or(ControlError::Empty)?;
                parse_bpm(arg).map(Command::Set)
            }
            "t" | "toggle" | "space" => Ok(Command::Toggle),
            "start" | "play" => Ok(Command::Start),
            "stop" => Ok(Command::Stop),
            "save" | "commit" => Ok(Command::Save),
            "status" | "s" => Ok(Command::Status),
            "quit" | "q" | "exit" => Ok(Command::Quit),
            _ if word.chars().all(|c| c.is_ascii_digit()) => parse_bpm(&word).map(Command::Set),
            _ => Err(ControlError::Unknown(trimmed.to_string())),
        }
    }
}

fn parse_steps(steps: &str) -> Result<i32, ControlError> {
    if steps.is_empty() {
        return Ok(1);
    }
    steps
        .trim()
        .parse::<i32>()
        .map_err(|_| ControlError::BadNumber(steps.to_string()))
}

fn parse_bpm(arg: &str) -> Result<u16, ControlError> {
    arg.parse::<u16>()
        .map_err(|_| ControlError::BadNumber(arg.to_string()))
}

/// Outcome of one command, for the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Tempo(Tempo),
    State(EngineState, Tempo),
    Saved { tempo: Tempo, written: bool },
    Quit,
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::Tempo(tempo) => write!(f, "{}", tempo),
            Response::State(state, tempo) => write!(f, "{:?} at {}", state, tempo),
            Response::Saved { tempo, written: true } => write!(f, "saved {}", tempo),
            Response::Saved {
                tempo,
                written: false,
            } => write!(f, "{} already saved", tempo),
            Response::Quit => write!(f, "bye"),
        }
    }
}

pub struct Controller<'a> {
    engine: SharedEngine,
    store: &'a mut dyn BpmStore,
}

impl<'a> Controller<'a> {
    pub fn new(engine: SharedEngine, store: &'a mut dyn BpmStore) -> Self {
        Controller { engine, store }
    }

    pub fn apply(&mut self, command: Command) -> Result<Response, Box<dyn Error>> {
        let mut engine = self
            .engine
            .lock()
            .map_err(|_| "clock engine lock poisoned")?;

        let response = match command {
            Command::Nudge(steps) => Response::Tempo(engine.nudge(steps)),
            Command::Set(bpm) => Response::Tempo(engine.retune(bpm)),
            Command::Toggle => {
                let state = engine.toggle();
                Response::State(state, engine.tempo())
            }
            Command::Start => {
                let bpm = u16::from(engine.bpm());
                engine.start(bpm);
                Response::State(engine.state(), engine.tempo())
            }
            Command::Stop => {
                engine.stop();
                Response::State(engine.state(), engine.tempo())
            }
            Command::Save => {
                let tempo = engine.tempo();
                let written = storage::commit_tempo(self.store, tempo)?;
                Response::Saved { tempo, written }
            }
            Command::Status => Response::State(engine.state(), engine.tempo()),
            Command::Quit => Response::Quit,
        };
        Ok(response)
    }
}

/// Interactive command prompt. Returns when the operator quits.
pub fn run_prompt(controller: &mut Controller<'_>) -> Result<(), Box<dyn Error>> {
    println!("Commands: +[n] -[n] bpm <n> toggle start stop save status quit");
    loop {
        let line: String = Input::new()
            .with_prompt("tempoclock")
            .allow_empty(true)
            .interact_text()?;

        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(ControlError::Empty) => continue,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };
        info!("Operator command: {:?}", command);

        match controller.apply(command) {
            Ok(Response::Quit) => return Ok(()),
            Ok(response) => println!("{}", response),
            Err(e) => {
                error!("Command {:?} failed: {}", command, e);
                println!("error: {}", e);
            }
        }
    }
}
