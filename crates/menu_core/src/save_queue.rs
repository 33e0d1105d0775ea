//! Queue-backed [`SaveCoordinator`] and the worker that commits queued screens to a store.

use std::{
    collections::BTreeMap,
    io,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use crossbeam_channel::{Receiver, Sender, TrySendError};
use serde::Serialize;
use shared::{
    domain::{AnswerValue, QuestionId, ScreenAnswers},
    error::MenuError,
};
use tokio::{
    runtime::Handle,
    sync::{Mutex, RwLock},
    task::JoinHandle,
};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::SaveCoordinator;

#[derive(Debug, Clone, Serialize)]
pub struct SaveRequest {
    pub id: Uuid,
    pub requested_at: DateTime<Utc>,
    pub answers: ScreenAnswers,
}

impl SaveRequest {
    pub fn new(answers: ScreenAnswers) -> Self {
        Self {
            id: Uuid::new_v4(),
            requested_at: Utc::now(),
            answers,
        }
    }
}

/// Bounded queue between the UI thread and the save worker.
pub fn save_queue(capacity: usize) -> (ChannelSaveCoordinator, Receiver<SaveRequest>) {
    let (tx, rx) = crossbeam_channel::bounded(capacity);
    (ChannelSaveCoordinator { tx }, rx)
}

#[derive(Clone)]
pub struct ChannelSaveCoordinator {
    tx: Sender<SaveRequest>,
}

impl ChannelSaveCoordinator {
    pub fn try_enqueue(&self, answers: ScreenAnswers) -> Result<Uuid, MenuError> {
        let request = SaveRequest::new(answers);
        let id = request.id;
        match self.tx.try_send(request) {
            Ok(()) => Ok(id),
            Err(TrySendError::Full(_)) => Err(MenuError::SaveFailed(
                "save queue is full".to_string(),
            )),
            Err(TrySendError::Disconnected(_)) => Err(MenuError::SaveFailed(
                "save worker disconnected".to_string(),
            )),
        }
    }
}

impl SaveCoordinator for ChannelSaveCoordinator {
    fn save_answers_for_screen(&self, answers: ScreenAnswers) {
        let count = answers.len();
        match self.try_enqueue(answers) {
            Ok(request_id) => {
                debug!(%request_id, answers = count, "queued screen answers for saving")
            }
            Err(err) => warn!(error = %err, answers = count, "dropped screen answers save"),
        }
    }
}

#[async_trait]
pub trait AnswerStore: Send + Sync {
    async fn commit_screen(&self, request: &SaveRequest) -> Result<()>;
}

/// Keeps the latest committed value per question.
#[derive(Default)]
pub struct InMemoryAnswerStore {
    answers: RwLock<BTreeMap<QuestionId, AnswerValue>>,
}

impl InMemoryAnswerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self) -> ScreenAnswers {
        self.answers
            .read()
            .await
            .iter()
            .map(|(question, value)| (question.clone(), value.clone()))
            .collect()
    }
}

#[async_trait]
impl AnswerStore for InMemoryAnswerStore {
    async fn commit_screen(&self, request: &SaveRequest) -> Result<()> {
        let mut answers = self.answers.write().await;
        for (question, value) in request.answers.iter() {
            answers.insert(question.clone(), value.clone());
        }
        Ok(())
    }
}

/// Merges committed answers into a single JSON object on disk.
pub struct JsonFileAnswerStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileAnswerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self) -> Result<ScreenAnswers> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(ScreenAnswers::new()),
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("failed to read answers file '{}'", self.path.display())
                })
            }
        };
        serde_json::from_slice(&raw)
            .with_context(|| format!("malformed answers file '{}'", self.path.display()))
    }
}

#[async_trait]
impl AnswerStore for JsonFileAnswerStore {
    async fn commit_screen(&self, request: &SaveRequest) -> Result<()> {
        // serde_json writes NaN and infinity as null, which no later load can read back.
        if let Some((question, _)) = request
            .answers
            .iter()
            .find(|(_, value)| matches!(value, AnswerValue::Decimal(v) if !v.is_finite()))
        {
            anyhow::bail!("answer to {question} is not a finite decimal");
        }

        let _guard = self.write_lock.lock().await;

        let mut merged: BTreeMap<QuestionId, AnswerValue> =
            self.load().await?.into_iter().collect();
        for (question, value) in request.answers.iter() {
            merged.insert(question.clone(), value.clone());
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.with_context(|| {
                format!("failed to create parent directory '{}'", parent.display())
            })?;
        }
        let body = serde_json::to_vec_pretty(&merged)?;

        // Write beside the target and rename so a crash never leaves a half-written file.
        let mut tmp_name = self.path.file_name().unwrap_or_default().to_os_string();
        tmp_name.push(".tmp");
        let tmp_path = self.path.with_file_name(tmp_name);
        tokio::fs::write(&tmp_path, body)
            .await
            .with_context(|| format!("failed to write answers file '{}'", tmp_path.display()))?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .with_context(|| format!("failed to replace answers file '{}'", self.path.display()))?;
        Ok(())
    }
}

/// Commits queued requests in arrival order until every coordinator is dropped. A failed commit
/// is logged and skipped. Resolves to the number of committed requests.
///
/// # Panics
///
/// Panics when called outside a tokio runtime.
pub fn spawn_save_worker(
    rx: Receiver<SaveRequest>,
    store: Arc<dyn AnswerStore>,
) -> JoinHandle<usize> {
    let handle = Handle::current();
    tokio::task::spawn_blocking(move || {
        let mut committed = 0;
        while let Ok(request) = rx.recv() {
            match handle.block_on(store.commit_screen(&request)) {
                Ok(()) => {
                    committed += 1;
                    debug!(
                        request_id = %request.id,
                        answers = request.answers.len(),
                        "committed screen answers"
                    );
                }
                Err(err) => {
                    let message = format!("{err:#}");
                    error!(
                        request_id = %request.id,
                        error = %message,
                        "failed to commit screen answers"
                    );
                }
            }
        }
        info!(committed, "save worker stopped");
        committed
    })
}

#[cfg(test)]
#[path = "tests/save_queue_tests.rs"]
mod tests;
