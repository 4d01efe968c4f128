//! The ffmpeg → whisper.cpp transcription pipeline.

use std::path::Path;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::args::{
    build_ffmpeg_args, build_whisper_args, is_blank, resolve_model_path, transcript_file_name,
    PREPROCESSED_AUDIO_FILE,
};
use super::config::PipelineConfig;
use super::error::{PipelineError, Stage};
use super::traits::PipelineObserver;
use super::types::{TranscriptionRequest, TranscriptionResult, Workspace};
use crate::metrics;
use crate::runner::{CommandLog, CommandRunner};

const WORKSPACE_PREFIX: &str = "media-transcriber-";

/// Runs one transcription request end to end.
///
/// Stages run strictly in order: validation, preprocessing (ffmpeg),
/// transcribing (whisper.cpp), exporting (read transcript). On failure the
/// workspace is removed before the error is returned; on success it is
/// handed to the caller inside [`TranscriptionResult`].
pub struct TranscriptionPipeline<R: CommandRunner> {
    config: PipelineConfig,
    runner: R,
}

impl<R: CommandRunner> TranscriptionPipeline<R> {
    pub fn new(config: PipelineConfig, runner: R) -> Self {
        Self { config, runner }
    }

    pub async fn run(
        &self,
        request: &TranscriptionRequest,
        observer: &dyn PipelineObserver,
        cancel: &CancellationToken,
    ) -> Result<TranscriptionResult, PipelineError> {
        let input = request.input_path.as_path();
        if is_blank(input) {
            return Err(PipelineError::validation(
                Stage::Preprocessing,
                "input media path is required",
            ));
        }
        tokio::fs::metadata(input).await.map_err(|e| {
            PipelineError::validation_io(
                Stage::Preprocessing,
                format!("cannot access input media: {}", input.display()),
                e,
            )
        })?;

        let model = resolve_model_path(&request.model_path).await?;

        let output_dir = request.output_dir.as_path();
        if is_blank(output_dir) {
            return Err(PipelineError::validation(
                Stage::Exporting,
                "output directory is required",
            ));
        }
        tokio::fs::create_dir_all(output_dir).await.map_err(|e| {
            PipelineError::validation_io(
                Stage::Exporting,
                format!("cannot create output directory: {}", output_dir.display()),
                e,
            )
        })?;

        let mut workspace = self.create_workspace().await?;
        debug!(workspace = %workspace.path().display(), "Created workspace");

        let mut logs = Vec::with_capacity(2);
        let outcome = self
            .run_stages(request, &model, &workspace, &mut logs, observer, cancel)
            .await;

        match outcome {
            Ok((preprocessed_audio_path, text_path, transcript)) => {
                info!(
                    text_path = %text_path.display(),
                    chars = transcript.len(),
                    "Transcription pipeline completed"
                );
                Ok(TranscriptionResult {
                    preprocessed_audio_path,
                    text_path,
                    transcript,
                    logs,
                    workspace,
                })
            }
            Err(e) => {
                if let Err(cleanup) = workspace.release() {
                    warn!(
                        workspace = %workspace.path().display(),
                        "Failed to remove workspace: {}", cleanup
                    );
                }
                Err(e)
            }
        }
    }

    async fn create_workspace(&self) -> Result<Workspace, PipelineError> {
        let to_error = |e: std::io::Error| {
            PipelineError::io(
                Stage::Preprocessing,
                "failed to create temporary workspace",
                e,
            )
        };

        if let Some(root) = &self.config.temp_dir {
            tokio::fs::create_dir_all(root).await.map_err(to_error)?;
        }

        let mut builder = tempfile::Builder::new();
        builder.prefix(WORKSPACE_PREFIX);
        let dir = match &self.config.temp_dir {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
        .map_err(to_error)?;

        Ok(Workspace::new(dir))
    }

    async fn run_stages(
        &self,
        request: &TranscriptionRequest,
        model: &Path,
        workspace: &Workspace,
        logs: &mut Vec<CommandLog>,
        observer: &dyn PipelineObserver,
        cancel: &CancellationToken,
    ) -> Result<(std::path::PathBuf, std::path::PathBuf, String), PipelineError> {
        // Preprocessing
        observer.on_stage(Stage::Preprocessing);
        let wav_path = workspace.path().join(PREPROCESSED_AUDIO_FILE);
        let args = build_ffmpeg_args(&request.input_path, &wav_path);
        let log = self
            .run_tool(
                Stage::Preprocessing,
                &self.config.ffmpeg_path,
                args,
                "ffmpeg audio conversion failed",
                logs,
                observer,
                cancel,
            )
            .await?;

        if tokio::fs::metadata(&wav_path).await.is_err() {
            return Err(PipelineError::MissingArtifact {
                stage: Stage::Preprocessing,
                message: "ffmpeg completed but output file is missing".to_string(),
                log,
            });
        }

        // Transcribing
        observer.on_stage(Stage::Transcribing);
        let text_path = request
            .output_dir
            .join(transcript_file_name(&request.input_path));
        let text_base = text_path.with_extension("");
        let args = build_whisper_args(model, &wav_path, &text_base, &request.language);
        let log = self
            .run_tool(
                Stage::Transcribing,
                &self.config.whisper_path,
                args,
                "whisper.cpp transcription failed",
                logs,
                observer,
                cancel,
            )
            .await?;

        if tokio::fs::metadata(&text_path).await.is_err() {
            return Err(PipelineError::MissingArtifact {
                stage: Stage::Exporting,
                message: "whisper.cpp completed but transcript .txt file is missing".to_string(),
                log,
            });
        }

        // Exporting
        observer.on_stage(Stage::Exporting);
        let contents = tokio::fs::read_to_string(&text_path).await.map_err(|e| {
            PipelineError::io(
                Stage::Exporting,
                format!("failed to read transcript file: {}", text_path.display()),
                e,
            )
        })?;

        Ok((wav_path, text_path, contents.trim().to_string()))
    }

    /// Runs one external command, records its log and reports it to the observer.
    #[allow(clippy::too_many_arguments)]
    async fn run_tool(
        &self,
        stage: Stage,
        program: &str,
        args: Vec<String>,
        failure_message: &str,
        logs: &mut Vec<CommandLog>,
        observer: &dyn PipelineObserver,
        cancel: &CancellationToken,
    ) -> Result<CommandLog, PipelineError> {
        info!(stage = %stage, command = program, "Running external command");
        let start = Instant::now();
        let result = self.runner.run(program, &args, cancel).await;
        metrics::COMMAND_DURATION
            .with_label_values(&[stage.as_str()])
            .observe(start.elapsed().as_secs_f64());

        let log = match &result {
            Ok(output) => CommandLog::from_output(program, &args, output),
            Err(_) => CommandLog::without_output(program, &args),
        };
        observer.on_command(&log);
        logs.push(log.clone());

        match result {
            Ok(output) if output.success() => {
                metrics::COMMANDS_TOTAL
                    .with_label_values(&[stage.as_str(), "success"])
                    .inc();
                Ok(log)
            }
            Ok(_) if cancel.is_cancelled() => {
                metrics::COMMANDS_TOTAL
                    .with_label_values(&[stage.as_str(), "cancelled"])
                    .inc();
                Err(PipelineError::Cancelled {
                    stage,
                    log: Some(log),
                })
            }
            Ok(output) => {
                metrics::COMMANDS_TOTAL
                    .with_label_values(&[stage.as_str(), "failed"])
                    .inc();
                warn!(
                    stage = %stage,
                    command = program,
                    exit_code = output.exit_code,
                    "External command failed"
                );
                Err(PipelineError::ExternalTool {
                    stage,
                    message: failure_message.to_string(),
                    log,
                    source: None,
                })
            }
            Err(e) if e.is_cancelled() => {
                metrics::COMMANDS_TOTAL
                    .with_label_values(&[stage.as_str(), "cancelled"])
                    .inc();
                debug!(stage = %stage, command = program, "External command cancelled");
                Err(PipelineError::Cancelled {
                    stage,
                    log: Some(log),
                })
            }
            Err(e) => {
                metrics::COMMANDS_TOTAL
                    .with_label_values(&[stage.as_str(), "error"])
                    .inc();
                warn!(stage = %stage, command = program, "External command could not run: {}", e);
                Err(PipelineError::ExternalTool {
                    stage,
                    message: failure_message.to_string(),
                    log,
                    source: Some(e),
                })
            }
        }
    }
}
