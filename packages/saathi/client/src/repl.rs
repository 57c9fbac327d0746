//! Line-based chat front-end: input parsing and plain-text rendering.

use crate::config::RegisterArgs;
use dialoguer::Password;
use saathi_core::fallback::SAMPLE_QUESTIONS;
use saathi_core::forms::RegistrationField;
use saathi_core::state::{RecommendationResults, ResultSource};
use saathi_core::types::{ConfidenceBand, Message, Notification, NotificationLevel, Role};
use saathi_core::{Action, AgentKind};
use std::fmt::Write;

pub const HELP: &str = "\
Type a farming question and press enter.
  /voice <text>   send text as a voice transcript
  /image <file>   ask about a crop photo
  /sample [n]     list sample questions, or ask number n
  /lang <code>    change reply language (en, hi, ...)
  /help           show this help
  /quit           leave the chat";

#[derive(Debug, Clone, PartialEq)]
pub enum ChatCommand {
    Dispatch(Vec<Action>),
    ListSamples,
    Help,
    Quit,
    Invalid(String),
    Empty,
}

pub fn parse_line(line: &str) -> ChatCommand {
    let line = line.trim();
    if line.is_empty() {
        return ChatCommand::Empty;
    }

    let Some(command) = line.strip_prefix('/') else {
        return ChatCommand::Dispatch(vec![
            Action::UpdateInput {
                content: line.to_string(),
            },
            Action::SubmitQuery,
        ]);
    };

    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };

    match (name, arg) {
        ("quit" | "exit", _) => ChatCommand::Quit,
        ("help", _) => ChatCommand::Help,
        ("sample", "") => ChatCommand::ListSamples,
        ("sample", n) => match n.parse::<usize>() {
            Ok(n) if (1..=SAMPLE_QUESTIONS.len()).contains(&n) => {
                ChatCommand::Dispatch(vec![Action::AskSampleQuestion { index: n - 1 }])
            }
            _ => ChatCommand::Invalid(format!(
                "pick a sample between 1 and {}",
                SAMPLE_QUESTIONS.len()
            )),
        },
        ("voice" | "image" | "lang", "") => ChatCommand::Invalid(format!("/{} needs an argument", name)),
        ("voice", text) => ChatCommand::Dispatch(vec![Action::SubmitVoiceTranscript {
            transcript: text.to_string(),
        }]),
        ("image", file) => ChatCommand::Dispatch(vec![Action::SubmitImage {
            file_name: file.to_string(),
        }]),
        ("lang", code) => ChatCommand::Dispatch(vec![Action::SetLanguage {
            language: code.to_string(),
        }]),
        _ => ChatCommand::Invalid(format!("unknown command /{}, try /help", name)),
    }
}

/// Read a password from the terminal without echoing it.
pub fn read_password(prompt: &str) -> Result<String, dialoguer::Error> {
    Password::new()
        .with_prompt(prompt)
        .allow_empty_password(true)
        .interact()
}

/// Field updates followed by the submission, for a registration from the command line.
pub fn registration_actions(args: RegisterArgs, password: String, confirm: String) -> Vec<Action> {
    let fields = [
        (RegistrationField::Name, Some(args.name)),
        (RegistrationField::Email, Some(args.email)),
        (RegistrationField::Password, Some(password)),
        (RegistrationField::ConfirmPassword, Some(confirm)),
        (RegistrationField::Phone, args.phone),
        (RegistrationField::Location, args.location),
    ];

    fields
        .into_iter()
        .filter_map(|(field, value)| {
            value.map(|value| Action::UpdateRegistrationField { field, value })
        })
        .chain(std::iter::once(Action::SubmitRegistration))
        .collect()
}

pub fn render_samples() -> String {
    let mut out = String::from("Sample questions:\n");
    for (i, question) in SAMPLE_QUESTIONS.iter().enumerate() {
        let _ = writeln!(out, "  {}. {}", i + 1, question);
    }
    out
}

pub fn render_message(message: &Message) -> String {
    let speaker = match message.role {
        Role::User => "You",
        Role::Assistant => "Saathi",
        Role::System => "System",
    };
    let mut out = format!(
        "[{}] {}: {}",
        message.timestamp.format("%H:%M"),
        speaker,
        message.content
    );

    if let Some(meta) = &message.metadata {
        let mut details = Vec::new();
        if let Some(agent) = &meta.agent_used {
            details.push(format!("agent {}", agent));
        }
        if let (Some(confidence), Some(band)) = (meta.confidence, meta.confidence_band()) {
            details.push(format!(
                "confidence {:.0}% ({})",
                confidence * 100.0,
                band_label(band)
            ));
        }
        if let Some(secs) = meta.processing_time {
            details.push(format!("{:.2}s", secs));
        }
        if !details.is_empty() {
            let _ = write!(out, "\n    {}", details.join(" | "));
        }
        for suggestion in &meta.suggestions {
            let _ = write!(out, "\n    > {}", suggestion);
        }
    }
    out
}

fn band_label(band: ConfidenceBand) -> &'static str {
    match band {
        ConfidenceBand::High => "high",
        ConfidenceBand::Medium => "medium",
        ConfidenceBand::Low => "low",
    }
}

pub fn render_notification(notification: &Notification) -> String {
    let tag = match notification.level {
        NotificationLevel::Info => "info",
        NotificationLevel::Success => "ok",
        NotificationLevel::Error => "error",
    };
    format!("({}) {}", tag, notification.message)
}

pub fn render_recommendations(results: &RecommendationResults) -> String {
    let mut out = String::new();
    if let ResultSource::SampleFallback { reason } = &results.source {
        let _ = writeln!(out, "Sample recommendations, backend not connected ({})", reason);
    }
    for (i, crop) in results.crops.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. {} - {:.0}% match, yield {} t/ha, price Rs {}/quintal",
            i + 1,
            crop.name,
            crop.confidence * 100.0,
            crop.expected_yield,
            crop.market_price
        );
        for reason in &crop.reasons {
            let _ = writeln!(out, "     - {}", reason);
        }
    }
    out
}

pub fn render_agents() -> String {
    let mut out = String::new();
    for agent in AgentKind::ALL {
        let _ = writeln!(
            out,
            "{} ({}) {}\n    {}",
            agent.display_name(),
            agent.name(),
            agent.endpoint(),
            agent.description()
        );
        if !agent.required_params().is_empty() {
            let _ = writeln!(out, "    requires: {}", agent.required_params().join(", "));
        }
        if !agent.optional_params().is_empty() {
            let _ = writeln!(out, "    optional: {}", agent.optional_params().join(", "));
        }
    }
    out
}
