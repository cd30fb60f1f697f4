//! Prompt construction from a local file.

use std::path::Path;

use crate::error::StreamError;

/// Default prompt file, resolved against the working directory.
pub const DEFAULT_PROMPT_FILE: &str = "chatgpt.py";

/// Default text placed before the file contents.
pub const DEFAULT_PREAMBLE: &str = "hi:\n\n";

/// Read the whole file at `path` and prefix it with `preamble`.
///
/// The file must be valid UTF-8. Nothing is trimmed or normalized.
pub fn read_prompt(path: &Path, preamble: &str) -> Result<String, StreamError> {
    let contents = std::fs::read_to_string(path).map_err(|source| StreamError::PromptFile {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(compose_prompt(preamble, &contents))
}

/// Concatenate the preamble and the file contents.
#[must_use]
pub fn compose_prompt(preamble: &str, contents: &str) -> String {
    let mut prompt = String::with_capacity(preamble.len() + contents.len());
    prompt.push_str(preamble);
    prompt.push_str(contents);
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compose_prefixes_preamble() {
        assert_eq!(compose_prompt(DEFAULT_PREAMBLE, "Hello"), "hi:\n\nHello");
    }

    #[test]
    fn compose_with_empty_contents() {
        assert_eq!(compose_prompt("hi:\n\n", ""), "hi:\n\n");
    }

    #[test]
    fn read_prompt_keeps_contents_verbatim() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("input.py");
        std::fs::write(&path, "print('x')\n\n").expect("write");
        let prompt = read_prompt(&path, DEFAULT_PREAMBLE).expect("read");
        assert_eq!(prompt, "hi:\n\nprint('x')\n\n");
    }

    #[test]
    fn missing_file_is_prompt_file_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("missing.py");
        let err = read_prompt(&path, DEFAULT_PREAMBLE).unwrap_err();
        match err {
            StreamError::PromptFile { path: p, source } => {
                assert_eq!(p, path);
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("expected PromptFile, got: {other:?}"),
        }
    }

    #[test]
    fn non_utf8_file_is_prompt_file_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("binary.bin");
        std::fs::write(&path, [0xff, 0xfe, 0x00]).expect("write");
        let err = read_prompt(&path, DEFAULT_PREAMBLE).unwrap_err();
        assert!(matches!(err, StreamError::PromptFile { .. }));
    }
}
