use anyhow::{bail, Context, Result};
use clap::Parser;
use saathi_client::config::{Cli, Command, RecommendArgs, RegisterArgs};
use saathi_client::repl::{self, ChatCommand};
use saathi_client::{logging, server, ApiClient, Store};
use saathi_core::forms::RecommendationField;
use saathi_core::state::{AppState, RegistrationStatus};
use saathi_core::Action;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_level, cli.log_json);

    let client = cli
        .client
        .api_client()
        .context("failed to build HTTP client")?;
    info!(backend = %client.backend_url, app = %client.app_url, "saathi starting");

    match cli.command {
        Command::Chat => chat(client, cli.client.language).await,
        Command::Recommend(args) => recommend(client, args).await,
        Command::Register(args) => register(client, args).await,
        Command::Agents => {
            print!("{}", repl::render_agents());
            Ok(())
        }
        Command::Serve(config) => {
            server::serve(&config, client).await?;
            Ok(())
        }
    }
}

type Input = Lines<BufReader<Stdin>>;

fn stdin_lines() -> Input {
    BufReader::new(tokio::io::stdin()).lines()
}

async fn prompt(lines: &mut Input, label: &str) -> Result<Option<String>> {
    print!("{}", label);
    std::io::stdout().flush()?;
    Ok(lines.next_line().await?)
}

/// Print chat messages and toasts that appeared since the last call.
struct Printer {
    messages: usize,
    notifications: usize,
}

impl Printer {
    fn new() -> Self {
        Self {
            messages: 0,
            notifications: 0,
        }
    }

    fn flush(&mut self, state: &AppState) {
        for message in state.session.messages.iter().skip(self.messages) {
            println!("{}\n", repl::render_message(message));
        }
        self.messages = state.session.messages.len();

        for notification in state.notifications.iter().skip(self.notifications) {
            println!("{}", repl::render_notification(notification));
        }
        self.notifications = state.notifications.len();
    }
}

async fn chat(client: ApiClient, language: String) -> Result<()> {
    let mut store = Store::new(client);
    store.dispatch(Action::SetLanguage { language }).await;

    let mut printer = Printer::new();
    println!("{}\n", store.state().session.title);
    printer.flush(store.state());
    println!("{}", repl::render_samples());
    println!("Type /help for commands.\n");

    let mut lines = stdin_lines();
    while let Some(line) = prompt(&mut lines, "> ").await? {
        match repl::parse_line(&line) {
            ChatCommand::Empty => {}
            ChatCommand::Quit => break,
            ChatCommand::Help => println!("{}", repl::HELP),
            ChatCommand::ListSamples => println!("{}", repl::render_samples()),
            ChatCommand::Invalid(reason) => println!("{}", reason),
            ChatCommand::Dispatch(actions) => {
                for action in actions {
                    store.dispatch(action).await;
                }
                printer.flush(store.state());
            }
        }
    }

    info!(messages = store.state().session.messages.len(), "chat ended");
    Ok(())
}

async fn recommend(client: ApiClient, args: RecommendArgs) -> Result<()> {
    let fields = [
        (RecommendationField::SoilType, Some(args.soil_type)),
        (RecommendationField::Location, Some(args.location)),
        (RecommendationField::PhLevel, args.ph),
        (RecommendationField::Nitrogen, args.nitrogen),
        (RecommendationField::Phosphorus, args.phosphorus),
        (RecommendationField::Potassium, args.potassium),
        (RecommendationField::Season, args.season),
        (RecommendationField::PreviousCrop, args.previous_crop),
    ];

    let mut store = Store::new(client);
    for (field, value) in fields {
        if let Some(value) = value {
            store
                .dispatch(Action::UpdateRecommendationField { field, value })
                .await;
        }
    }
    let state = store.dispatch(Action::SubmitRecommendation).await;

    if let Some(error) = &state.recommendation.error {
        bail!("{}", error);
    }
    if let Some(results) = &state.recommendation.results {
        print!("{}", repl::render_recommendations(results));
    }
    if let Some(notification) = state.last_notification() {
        println!("{}", repl::render_notification(notification));
    }
    Ok(())
}

async fn register(client: ApiClient, args: RegisterArgs) -> Result<()> {
    let app_url = client.app_url.clone();

    let (password, confirm) = tokio::task::spawn_blocking(|| {
        Ok::<_, dialoguer::Error>((
            repl::read_password("Password")?,
            repl::read_password("Confirm password")?,
        ))
    })
    .await?
    .context("failed to read password")?;

    let mut store = Store::new(client);
    for action in repl::registration_actions(args, password, confirm) {
        store.dispatch(action).await;
    }
    let state = store.state();

    if let Some(error) = &state.registration.error {
        bail!("{}", error);
    }
    for notification in &state.notifications {
        println!("{}", repl::render_notification(notification));
    }

    match (&state.registration.status, &state.redirect) {
        (RegistrationStatus::SignedIn, Some(route)) => {
            println!("Signed in. Continue at {}{}", app_url, route);
            Ok(())
        }
        _ => bail!("registration did not complete"),
    }
}
