use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

use crate::error::Error;

/// Point every `IdentityFile` path in `source` at `key_dir`, keeping file names.
/// All other lines, and their line endings, are copied unchanged.
pub fn rewrite_identity_files(source: &str, key_dir: &Path) -> String {
    let mut out = String::with_capacity(source.len());

    for line in source.split_inclusive('\n') {
        let (body, terminator) = split_terminator(line);
        match rewrite_line(body, key_dir) {
            Some(rewritten) => {
                out.push_str(&rewritten);
                out.push_str(terminator);
            }
            None => out.push_str(line),
        }
    }

    out
}

fn split_terminator(line: &str) -> (&str, &str) {
    if let Some(body) = line.strip_suffix("\r\n") {
        (body, "\r\n")
    } else if let Some(body) = line.strip_suffix('\n') {
        (body, "\n")
    } else {
        (line, "")
    }
}

fn rewrite_line(line: &str, key_dir: &Path) -> Option<String> {
    let tokens = match split_words(line.trim()) {
        Ok(tokens) => tokens,
        Err(e) => {
            tracing::debug!("Passing line through unchanged: {}", e);
            return None;
        }
    };

    let (keyword, paths) = tokens.split_first()?;
    if !keyword.eq_ignore_ascii_case("IdentityFile") {
        return None;
    }

    let indent = &line[..line.len() - line.trim_start().len()];
    let mut rewritten = format!("{indent}IdentityFile");
    for path in paths {
        rewritten.push(' ');
        rewritten.push_str(&shell_words::quote(&relocate(path, key_dir)));
    }
    Some(rewritten)
}

/// Words of `line`, unquoted. A dangling `\` at the end is malformed too.
fn split_words(line: &str) -> Result<Vec<String>, Error> {
    let trailing = line.chars().rev().take_while(|&c| c == '\\').count();
    if trailing % 2 == 1 {
        return Err(Error::MalformedLine(format!("trailing backslash in {line:?}")));
    }
    shell_words::split(line).map_err(|e| Error::MalformedLine(format!("{e} in {line:?}")))
}

fn relocate(path: &str, key_dir: &Path) -> String {
    let name = path.rsplit('/').next().unwrap_or(path);
    if name.is_empty() || name == "." || name == ".." {
        return path.to_string();
    }
    key_dir.join(name).to_string_lossy().into_owned()
}

/// A rewritten copy of the SSH config living in the temp directory.
/// The file is removed when this value is dropped.
#[derive(Debug)]
pub struct DerivedConfig {
    file: Option<NamedTempFile>,
}

impl DerivedConfig {
    pub fn path(&self) -> &Path {
        match &self.file {
            Some(file) => file.path(),
            None => Path::new(""),
        }
    }
}

impl Drop for DerivedConfig {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            let path = file.path().to_path_buf();
            match file.close() {
                Ok(()) => tracing::debug!("Removed derived config {:?}", path),
                Err(e) => tracing::warn!("Failed to remove derived config {:?}: {}", path, e),
            }
        }
    }
}

pub fn write_derived_config(source: &Path, key_dir: &Path) -> Result<DerivedConfig> {
    let source_text = fs::read_to_string(source)
        .with_context(|| format!("Failed to read SSH config file: {}", source.display()))?;
    let derived = rewrite_identity_files(&source_text, key_dir);

    let mut file = tempfile::Builder::new()
        .prefix("ssh-connect-")
        .suffix(".config")
        .tempfile()
        .context("Failed to create derived SSH config")?;
    file.write_all(derived.as_bytes())
        .context("Failed to write derived SSH config")?;
    file.flush().context("Failed to write derived SSH config")?;

    tracing::info!(
        "Derived config {:?} from {:?} with keys in {:?}",
        file.path(),
        source,
        key_dir
    );
    Ok(DerivedConfig { file: Some(file) })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewrite_single_path() {
        let source = "## prod box\nHost web1\n  IdentityFile ~/.ssh/id_rsa\n";

        let derived = rewrite_identity_files(source, Path::new("/keys"));

        assert_eq!(derived, "## prod box\nHost web1\n  IdentityFile /keys/id_rsa\n");
    }

    #[test]
    fn test_rewrite_keeps_other_lines_byte_for_byte() {
        let source = "Host a\r\n\tHostName  x.example.com \r\n# IdentityFile ~/.ssh/old\n  User me";

        let derived = rewrite_identity_files(source, Path::new("/keys"));

        assert_eq!(derived, source);
    }

    #[test]
    fn test_rewrite_preserves_path_count_and_quotes() {
        let source = "\t identityfile ~/.ssh/a \"/other dir/b key\" /c\r\n";

        let derived = rewrite_identity_files(source, Path::new("/new keys"));

        assert_eq!(
            derived,
            "\t IdentityFile '/new keys/a' '/new keys/b key' '/new keys/c'\r\n"
        );
        let tokens = split_words(derived.trim()).unwrap();
        assert_eq!(tokens.len(), 4);
    }

    #[test]
    fn test_rewrite_quotes_awkward_key_dir() {
        let source = "IdentityFile ~/.ssh/id_rsa\n";

        let derived = rewrite_identity_files(source, Path::new("/it's $HOME"));

        assert_eq!(derived, "IdentityFile '/it'\\''s $HOME/id_rsa'\n");
        assert_eq!(
            split_words(derived.trim()).unwrap(),
            vec!["IdentityFile", "/it's $HOME/id_rsa"]
        );
    }

    #[test]
    fn test_rewrite_passes_trailing_backslash_through() {
        let source = "  IdentityFile ~/.ssh/a \\\n";

        let derived = rewrite_identity_files(source, Path::new("/keys"));

        assert_eq!(derived, source);
    }

    #[test]
    fn test_split_words_plain() {
        assert_eq!(
            split_words("IdentityFile  ~/.ssh/a\t~/.ssh/b").unwrap(),
            vec!["IdentityFile", "~/.ssh/a", "~/.ssh/b"]
        );
        assert!(split_words("   ").unwrap().is_empty());
    }

    #[test]
    fn test_split_words_quotes_and_escapes() {
        assert_eq!(
            split_words(r#"IdentityFile "/my keys/id rsa" 'it''s'"#).unwrap(),
            vec!["IdentityFile", "/my keys/id rsa", "its"]
        );
        assert_eq!(split_words("a '' b").unwrap(), vec!["a", "", "b"]);
        assert_eq!(split_words(r"a\ b c").unwrap(), vec!["a b", "c"]);
        assert_eq!(split_words(r"a\\").unwrap(), vec![r"a\"]);
    }

    #[test]
    fn test_split_words_rejects_malformed() {
        for line in ["IdentityFile 'oops", "IdentityFile \"oops", "trailing \\"] {
            assert!(
                matches!(split_words(line), Err(Error::MalformedLine(_))),
                "{line:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_rewrite_passes_malformed_line_through() {
        let source = "Host a\n  IdentityFile '~/.ssh/broken\n  IdentityFile ~/.ssh/ok\n";

        let derived = rewrite_identity_files(source, Path::new("/keys"));

        assert_eq!(
            derived,
            "Host a\n  IdentityFile '~/.ssh/broken\n  IdentityFile /keys/ok\n"
        );
    }

    #[test]
    fn test_rewrite_line_without_filename_keeps_path() {
        let derived = rewrite_identity_files("IdentityFile ~/.ssh/ ..\n", Path::new("/keys"));

        assert_eq!(
            split_words(derived.trim()).unwrap(),
            vec!["IdentityFile", "~/.ssh/", ".."]
        );
    }

    #[test]
    fn test_rewrite_never_touches_lines_without_keyword() {
        let lines = [
            "Host x",
            "  HostName IdentityFile",
            "  CertificateFile ~/.ssh/id_rsa-cert.pub",
            "",
            "   ",
            "IdentityFileX ~/.ssh/a",
        ];
        for line in lines {
            let text = format!("{line}\n");
            assert_eq!(rewrite_identity_files(&text, Path::new("/keys")), text);
        }
    }

    #[test]
    fn test_derived_config_is_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("config");
        let original = "Host a\n  IdentityFile ~/.ssh/id_ed25519\n";
        fs::write(&source, original).unwrap();

        let derived = write_derived_config(&source, Path::new("/keys")).unwrap();
        let path = derived.path().to_path_buf();

        assert_ne!(path, source);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "Host a\n  IdentityFile /keys/id_ed25519\n"
        );

        drop(derived);

        assert!(!path.exists());
        assert_eq!(fs::read_to_string(&source).unwrap(), original);
    }
}
