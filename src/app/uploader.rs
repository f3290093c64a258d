use std::{
    sync::mpsc::{self, Receiver, Sender, TryRecvError},
    thread,
};

use anyhow::{anyhow, Context, Result};
use reqwest::{
    blocking::{multipart, Client},
    StatusCode, Url,
};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::{
    config::{UploadConfig, IMAGE_FIELD},
    image_utils::ImageFile,
};

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("{0}")]
    Network(String),

    #[error("HTTP error! status: {}", .0.as_u16())]
    Http(StatusCode),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl UploadError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            UploadError::Http(status) => Some(*status),
            _ => None,
        }
    }
}

pub struct UploadRequest {
    pub id: u64,
    pub file: ImageFile,
}

pub struct UploadOutcome {
    pub id: u64,
    pub file_name: String,
    pub result: Result<String, UploadError>,
}

pub fn build_client(config: &UploadConfig) -> Result<Client> {
    Client::builder()
        .timeout(config.timeout)
        .build()
        .context("Building HTTP client")
}

/// POSTs `file` as the `image` part of a multipart form and returns the JSON
/// response pretty-printed.
pub fn upload_image(client: &Client, endpoint: &Url, file: &ImageFile) -> Result<String, UploadError> {
    let part = multipart::Part::bytes(file.bytes.clone())
        .file_name(file.name.clone())
        .mime_str(&file.mime_type)
        .map_err(|err| UploadError::Network(format!("Invalid content type {}: {err}", file.mime_type)))?;
    let form = multipart::Form::new().part(IMAGE_FIELD, part);

    let response = client
        .post(endpoint.clone())
        .multipart(form)
        .send()
        .map_err(|err| UploadError::Network(network_message(&err)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(UploadError::Http(status));
    }

    let body = response
        .bytes()
        .map_err(|err| UploadError::Network(network_message(&err)))?;
    let value: serde_json::Value = serde_json::from_slice(&body)
        .map_err(|err| UploadError::MalformedResponse(err.to_string()))?;
    serde_json::to_string_pretty(&value).map_err(|err| UploadError::MalformedResponse(err.to_string()))
}

fn network_message(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        return format!("Request timed out: {err}");
    }
    if err.is_connect() {
        return format!("Unable to reach server: {err}");
    }
    format!("Network error: {err}")
}

/// Runs uploads on a background thread so the UI never blocks on the network.
pub struct Uploader {
    request_tx: Sender<UploadRequest>,
    outcome_rx: Receiver<UploadOutcome>,
    next_id: u64,
    pub pending_uploads: Vec<u64>,
}

impl Uploader {
    pub fn new(config: &UploadConfig) -> Result<Self> {
        let client = build_client(config)?;
        let endpoint = config.endpoint.clone();
        Ok(Self::with_handler(move |file| {
            info!(name = %file.name, %endpoint, "uploading image");
            upload_image(&client, &endpoint, file)
        }))
    }

    /// Spawns the worker with a custom upload function.
    pub fn with_handler<F>(handler: F) -> Self
    where
        F: Fn(&ImageFile) -> Result<String, UploadError> + Send + 'static,
    {
        let (request_tx, request_rx) = mpsc::channel();
        let (outcome_tx, outcome_rx) = mpsc::channel();

        Self::spawn_upload_thread(handler, request_rx, outcome_tx);

        Self {
            request_tx,
            outcome_rx,
            next_id: 0,
            pending_uploads: Vec::new(),
        }
    }

    fn spawn_upload_thread<F>(handler: F, rx: Receiver<UploadRequest>, tx: Sender<UploadOutcome>)
    where
        F: Fn(&ImageFile) -> Result<String, UploadError> + Send + 'static,
    {
        thread::spawn(move || {
            while let Ok(req) = rx.recv() {
                let result = handler(&req.file);
                match &result {
                    Ok(_) => info!(id = req.id, "upload finished"),
                    Err(err) => warn!(id = req.id, "upload failed: {err}"),
                }
                let outcome = UploadOutcome {
                    id: req.id,
                    file_name: req.file.name,
                    result,
                };
                if tx.send(outcome).is_err() {
                    break;
                }
            }
        });
    }

    pub fn queue_upload(&mut self, file: ImageFile) -> Result<u64> {
        let id = self.next_id;
        self.next_id += 1;
        self.request_tx
            .send(UploadRequest { id, file })
            .map_err(|e| anyhow!("Failed to send upload request: {}", e))?;
        self.pending_uploads.push(id);
        Ok(id)
    }

    /// Drains finished uploads. If the worker has gone away, every pending
    /// upload is reported as failed.
    pub fn check_completions(&mut self) -> Vec<UploadOutcome> {
        let mut completed = Vec::new();
        loop {
            match self.outcome_rx.try_recv() {
                Ok(outcome) => {
                    self.pending_uploads.retain(|id| *id != outcome.id);
                    completed.push(outcome);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if !self.pending_uploads.is_empty() {
                        error!(pending = self.pending_uploads.len(), "upload worker stopped");
                    }
                    completed.extend(self.pending_uploads.drain(..).map(|id| UploadOutcome {
                        id,
                        file_name: String::new(),
                        result: Err(UploadError::Network("Upload worker stopped unexpectedly".into())),
                    }));
                    break;
                }
            }
        }
        completed
    }
}
