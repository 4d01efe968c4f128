//! Argument builders and path helpers for the external tools.

use std::path::{Path, PathBuf};

use super::error::{PipelineError, Stage};

/// File name of the converted audio inside the workspace.
pub const PREPROCESSED_AUDIO_FILE: &str = "preprocessed-16k-mono.wav";

/// Fallback transcript stem when the input has no usable name.
const DEFAULT_TRANSCRIPT_STEM: &str = "transcript";

const MODEL_EXTENSIONS: [&str; 2] = ["bin", "gguf"];

/// ffmpeg arguments producing 16 kHz mono signed 16-bit PCM WAV.
pub fn build_ffmpeg_args(input: &Path, output: &Path) -> Vec<String> {
    let mut args = vec![
        "-hide_banner".to_string(),
        "-nostdin".to_string(),
        "-y".to_string(),
        "-i".to_string(),
        input.to_string_lossy().to_string(),
    ];

    // Drop video, downmix, resample
    args.extend([
        "-vn".to_string(),
        "-ac".to_string(),
        "1".to_string(),
        "-ar".to_string(),
        "16000".to_string(),
        "-c:a".to_string(),
        "pcm_s16le".to_string(),
    ]);

    args.push(output.to_string_lossy().to_string());
    args
}

/// whisper.cpp arguments writing `<text_base>.txt`.
pub fn build_whisper_args(
    model: &Path,
    audio: &Path,
    text_base: &Path,
    language: &str,
) -> Vec<String> {
    let mut args = vec![
        "-m".to_string(),
        model.to_string_lossy().to_string(),
        "-f".to_string(),
        audio.to_string_lossy().to_string(),
        "-of".to_string(),
        text_base.to_string_lossy().to_string(),
        "-otxt".to_string(),
    ];

    if let Some(language) = normalize_language(language) {
        args.extend(["-l".to_string(), language.to_string()]);
    }

    args
}

/// Returns the explicit language to pass, or `None` for auto-detection.
pub fn normalize_language(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("auto") {
        None
    } else {
        Some(trimmed)
    }
}

/// Transcript file name derived from the input's base name.
///
/// The last extension is stripped and the rest trimmed; an empty result
/// falls back to `transcript`.
pub fn transcript_file_name(input: &Path) -> String {
    let base = input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let stem = match base.rfind('.') {
        Some(idx) => &base[..idx],
        None => base.as_str(),
    };
    let stem = stem.trim();

    let stem = if stem.is_empty() || stem == "." || stem == std::path::MAIN_SEPARATOR_STR {
        DEFAULT_TRANSCRIPT_STEM
    } else {
        stem
    };
    format!("{stem}.txt")
}

/// Resolves a model file from a file path or a directory of models.
///
/// A directory yields its lexicographically first `.bin` or `.gguf` file
/// (extension matched case-insensitively). Subdirectories are ignored.
pub async fn resolve_model_path(raw: &Path) -> Result<PathBuf, PipelineError> {
    if is_blank(raw) {
        return Err(PipelineError::validation(
            Stage::Transcribing,
            "model path is required",
        ));
    }

    let metadata = tokio::fs::metadata(raw).await.map_err(|e| {
        PipelineError::validation_io(
            Stage::Transcribing,
            format!("cannot access model path: {}", raw.display()),
            e,
        )
    })?;

    if !metadata.is_dir() {
        return Ok(raw.to_path_buf());
    }

    let read_dir_error = |e: std::io::Error| {
        PipelineError::validation_io(
            Stage::Transcribing,
            format!("cannot read model directory: {}", raw.display()),
            e,
        )
    };

    let mut entries = tokio::fs::read_dir(raw).await.map_err(read_dir_error)?;
    let mut candidates = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(read_dir_error)? {
        let is_dir = entry
            .file_type()
            .await
            .map(|t| t.is_dir())
            .unwrap_or(false);
        if is_dir {
            continue;
        }
        if has_model_extension(&entry.path()) {
            candidates.push(entry.file_name());
        }
    }

    candidates.sort();
    match candidates.first() {
        Some(name) => Ok(raw.join(name)),
        None => Err(PipelineError::validation(
            Stage::Transcribing,
            format!("no .bin or .gguf model files found in: {}", raw.display()),
        )),
    }
}

/// Matches on the text after the last `.`, so a bare `.bin` counts too.
fn has_model_extension(path: &Path) -> bool {
    let Some(name) = path.file_name() else {
        return false;
    };
    let name = name.to_string_lossy().to_ascii_lowercase();
    name.rsplit_once('.')
        .is_some_and(|(_, ext)| MODEL_EXTENSIONS.contains(&ext))
}

pub(crate) fn is_blank(path: &Path) -> bool {
    path.to_string_lossy().trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ffmpeg_args_exact() {
        let args = build_ffmpeg_args(Path::new("/in/clip.mp4"), Path::new("/tmp/w/out.wav"));
        assert_eq!(
            args,
            vec![
                "-hide_banner", "-nostdin", "-y", "-i", "/in/clip.mp4", "-vn", "-ac", "1", "-ar",
                "16000", "-c:a", "pcm_s16le", "/tmp/w/out.wav",
            ]
        );
    }

    #[test]
    fn test_whisper_args_auto_language_omits_flag() {
        for language in ["", "auto", "AUTO", "  Auto  "] {
            let args = build_whisper_args(
                Path::new("/m/base.bin"),
                Path::new("/tmp/a.wav"),
                Path::new("/out/clip"),
                language,
            );
            assert!(!args.contains(&"-l".to_string()), "language {language:?}");
            assert_eq!(
                args,
                vec!["-m", "/m/base.bin", "-f", "/tmp/a.wav", "-of", "/out/clip", "-otxt"]
            );
        }
    }

    #[test]
    fn test_whisper_args_explicit_language() {
        let args = build_whisper_args(
            Path::new("/m/base.bin"),
            Path::new("/tmp/a.wav"),
            Path::new("/out/clip"),
            "de",
        );
        let idx = args.iter().position(|a| a == "-l").unwrap();
        assert_eq!(args[idx + 1], "de");
    }

    #[test]
    fn test_normalize_language() {
        assert_eq!(normalize_language(""), None);
        assert_eq!(normalize_language("auto"), None);
        assert_eq!(normalize_language("AuTo"), None);
        assert_eq!(normalize_language(" en "), Some("en"));
    }

    #[test]
    fn test_transcript_file_name() {
        assert_eq!(transcript_file_name(Path::new("/media/clip.mp4")), "clip.txt");
        assert_eq!(transcript_file_name(Path::new("my.show.s01.mkv")), "my.show.s01.txt");
        assert_eq!(transcript_file_name(Path::new("noext")), "noext.txt");
        assert_eq!(transcript_file_name(Path::new("/media/ spaced .wav")), "spaced.txt");
        assert_eq!(transcript_file_name(Path::new(".mp4")), "transcript.txt");
        assert_eq!(transcript_file_name(Path::new("")), "transcript.txt");
        assert_eq!(transcript_file_name(Path::new("/")), "transcript.txt");
        assert_eq!(transcript_file_name(Path::new("   .mp3")), "transcript.txt");
    }

    #[tokio::test]
    async fn test_resolve_model_file_returned_as_is() {
        let dir = tempfile::tempdir().unwrap();
        let model = dir.path().join("anything.dat");
        std::fs::write(&model, b"m").unwrap();

        assert_eq!(resolve_model_path(&model).await.unwrap(), model);
    }

    #[tokio::test]
    async fn test_resolve_model_dir_picks_first_sorted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.gguf"), b"m").unwrap();
        std::fs::write(dir.path().join("a.bin"), b"m").unwrap();
        std::fs::write(dir.path().join("0-readme.txt"), b"t").unwrap();
        std::fs::create_dir(dir.path().join("0.bin")).unwrap();

        let resolved = resolve_model_path(dir.path()).await.unwrap();
        assert_eq!(resolved, dir.path().join("a.bin"));
    }

    #[tokio::test]
    async fn test_resolve_model_dir_orders_across_extensions() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("z-large.bin"), b"m").unwrap();
        std::fs::write(dir.path().join("a-small.gguf"), b"m").unwrap();

        let resolved = resolve_model_path(dir.path()).await.unwrap();
        assert_eq!(resolved, dir.path().join("a-small.gguf"));
    }

    #[tokio::test]
    async fn test_resolve_model_dir_accepts_bare_extension_name() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".bin"), b"m").unwrap();
        std::fs::write(dir.path().join("z.gguf"), b"m").unwrap();

        let resolved = resolve_model_path(dir.path()).await.unwrap();
        assert_eq!(resolved, dir.path().join(".bin"));
    }

    #[test]
    fn test_has_model_extension() {
        assert!(has_model_extension(Path::new("/m/ggml-base.BIN")));
        assert!(has_model_extension(Path::new("/m/.gguf")));
        assert!(!has_model_extension(Path::new("/m/model.bin.txt")));
        assert!(!has_model_extension(Path::new("/m/bin")));
    }

    #[tokio::test]
    async fn test_resolve_model_dir_uppercase_extension() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("large.GGUF"), b"m").unwrap();

        let resolved = resolve_model_path(dir.path()).await.unwrap();
        assert_eq!(resolved, dir.path().join("large.GGUF"));
    }

    #[tokio::test]
    async fn test_resolve_model_dir_without_models() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"t").unwrap();

        let err = resolve_model_path(dir.path()).await.unwrap_err();
        assert_eq!(err.stage(), Stage::Transcribing);
        assert!(err.to_string().contains("no .bin or .gguf model files found in"));
    }

    #[tokio::test]
    async fn test_resolve_model_missing_and_blank() {
        let err = resolve_model_path(Path::new("  ")).await.unwrap_err();
        assert_eq!(err.to_string(), "transcribing: model path is required");

        let err = resolve_model_path(Path::new("/definitely/not/here.bin"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("cannot access model path"));
    }
}
