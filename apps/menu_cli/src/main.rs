use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use menu_core::{
    load_settings,
    save_queue::{
        save_queue, spawn_save_worker, AnswerStore, InMemoryAnswerStore, JsonFileAnswerStore,
    },
    signals::{recording_signal, SharedLocationTracking},
    FormSession, Menu, MenuController,
};
use shared::{
    domain::{AnswerValue, MenuItemId, ScreenAnswers},
    error::MenuError,
};
use tracing_subscriber::EnvFilter;

mod host;

use host::{parse_answer, ConsoleNavigator, ScreenInput, ScriptedSession};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Action {
    AddRepeat,
    GoTo,
    Preferences,
    ChangeLanguage,
    TrackLocation,
}

impl From<Action> for MenuItemId {
    fn from(value: Action) -> Self {
        match value {
            Action::AddRepeat => MenuItemId::AddRepeat,
            Action::GoTo => MenuItemId::GoTo,
            Action::Preferences => MenuItemId::Preferences,
            Action::ChangeLanguage => MenuItemId::ChangeLanguage,
            Action::TrackLocation => MenuItemId::TrackLocation,
        }
    }
}

/// Drives the form entry menu for one scripted screen.
#[derive(Parser, Debug)]
struct Args {
    /// TOML menu settings file.
    #[arg(long)]
    settings: Option<PathBuf>,
    /// Simulate a form that failed to load.
    #[arg(long)]
    no_session: bool,
    #[arg(long)]
    can_add_repeat: bool,
    /// Background audio recording is active.
    #[arg(long)]
    recording: bool,
    /// Answer on the current screen, as QUESTION=VALUE.
    #[arg(long = "answer", value_parser = parse_answer)]
    answers: Vec<(String, AnswerValue)>,
    #[arg(long, value_delimiter = ',')]
    languages: Vec<String>,
    #[arg(long)]
    background_location: bool,
    /// JSON file committed answers are merged into. Kept in memory when absent.
    #[arg(long)]
    store: Option<PathBuf>,
    #[arg(long = "action", value_enum)]
    actions: Vec<Action>,
}

enum Store {
    Memory(Arc<InMemoryAnswerStore>),
    File(Arc<JsonFileAnswerStore>),
}

impl Store {
    fn handle(&self) -> Arc<dyn AnswerStore> {
        match self {
            Store::Memory(store) => store.clone(),
            Store::File(store) => store.clone(),
        }
    }

    async fn committed(&self) -> Result<ScreenAnswers> {
        match self {
            Store::Memory(store) => Ok(store.snapshot().await),
            Store::File(store) => store.load().await,
        }
    }
}

fn print_menu(menu: &Menu) -> Result<()> {
    let visible: Vec<&str> = menu
        .iter()
        .filter(|(_, item)| item.visible)
        .map(|(id, _)| id.as_str())
        .collect();
    println!("visible items: {}", visible.join(", "));
    println!("menu: {}", serde_json::to_string(menu)?);
    Ok(())
}

/// Logs the error code before handing the error to anyhow.
fn log_menu_error(err: MenuError) -> MenuError {
    tracing::error!(code = ?err.code(), error = %err, "menu setup failed");
    err
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let settings = load_settings(args.settings.as_deref())
        .map_err(log_menu_error)
        .context("failed to load menu settings")?;
    let (saver, save_rx) = save_queue(settings.save_queue_capacity);
    let store = match &args.store {
        Some(path) => Store::File(Arc::new(JsonFileAnswerStore::new(path))),
        None => Store::Memory(Arc::new(InMemoryAnswerStore::new())),
    };
    let worker = spawn_save_worker(save_rx, store.handle());

    let (_recording_tx, recording_guard) = recording_signal(args.recording);
    let answers: ScreenAnswers = args.answers.into_iter().collect();

    let mut controller = MenuController::builder()
        .settings(settings)
        .answers_provider(Arc::new(ScreenInput::new(answers)))
        .save_coordinator(Arc::new(saver))
        .recording_guard(Arc::new(recording_guard))
        .location_tracking(Arc::new(SharedLocationTracking::new(false)))
        .navigator(Arc::new(ConsoleNavigator))
        .build()
        .map_err(log_menu_error)?;
    tracing::info!(settings = ?controller.settings(), "menu controller assembled");

    let session = (!args.no_session).then(|| {
        Arc::new(ScriptedSession::new(
            args.can_add_repeat,
            args.languages.clone(),
            args.background_location,
        ))
    });
    controller.attach_session(session.clone().map(|s| s as Arc<dyn FormSession>));
    println!("session loaded: {}", controller.has_session());

    let mut menu = Menu::new();
    controller.on_menu_created(&mut menu);
    controller.refresh(&mut menu);
    print_menu(&menu)?;

    for action in args.actions {
        let outcome = controller.invoke(action.into());
        println!("outcome: {}", serde_json::to_string(&outcome)?);
        controller.refresh(&mut menu);
        print_menu(&menu)?;
    }

    // Dropping the controller releases the last save coordinator so the worker can drain and stop.
    drop(controller);
    let committed = worker.await.context("save worker panicked")?;
    if let Some(session) = &session {
        println!("repeats added: {}", session.repeats_added());
    }
    println!("save requests committed: {committed}");
    println!(
        "committed answers: {}",
        serde_json::to_string(&store.committed().await?)?
    );

    Ok(())
}
