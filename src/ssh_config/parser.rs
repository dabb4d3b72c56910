use std::fs;
use std::ops::Range;
use std::path::Path;

use crate::error::Error;
use crate::models::{HostEntry, ParsedConfig, COMMENT_KEY};

/// Parse the SSH config at `path`. The file is only ever read.
pub fn parse_ssh_config(path: &Path) -> Result<ParsedConfig, Error> {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::ConfigNotFound(path.to_path_buf()));
        }
        Err(e) => return Err(Error::Io(e)),
    };

    let parsed = parse_ssh_config_content(&content);
    tracing::info!("Loaded {} hosts from {:?}", parsed.len(), path);
    Ok(parsed)
}

pub fn parse_ssh_config_content(content: &str) -> ParsedConfig {
    let mut hosts: Vec<HostEntry> = Vec::new();
    // Entries declared by the most recent `Host` line.
    let mut current: Option<Range<usize>> = None;
    let mut pending_comment: Option<String> = None;

    for line in content.lines() {
        let line = line.trim();

        if let Some(comment) = line.strip_prefix("##") {
            pending_comment = Some(comment.trim().to_string());
            continue;
        }

        let is_host_line = line
            .split_whitespace()
            .next()
            .is_some_and(|token| token.eq_ignore_ascii_case("host"));

        if is_host_line {
            let aliases: Vec<&str> = line.split_whitespace().skip(1).collect();
            if aliases.is_empty() {
                tracing::debug!("Skipping Host line without alias");
                current = None;
                continue;
            }

            let start = hosts.len();
            for alias in aliases {
                let mut entry = HostEntry::new(alias);
                if let Some(comment) = &pending_comment {
                    entry.attributes.set(COMMENT_KEY, comment);
                }
                hosts.push(entry);
            }
            pending_comment = None;
            current = Some(start..hosts.len());
        } else if let Some(block) = current.clone() {
            let Some((key, value)) = split_directive(line) else {
                continue;
            };
            if key == "#" {
                continue;
            }
            for entry in &mut hosts[block] {
                entry.attributes.set(key, value);
            }
        }
    }

    if let Some(comment) = pending_comment {
        tracing::debug!("Discarding trailing comment with no host: {:?}", comment);
    }

    ParsedConfig { hosts }
}

/// `Key value...` split on the first run of whitespace.
fn split_directive(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once(char::is_whitespace)?;
    Some((key, value.trim_start()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_two_hosts_in_order() {
        let content = "Host alpha\n  HostName 10.0.0.1\nHost beta\n  HostName 10.0.0.2\n";

        let parsed = parse_ssh_config_content(content);

        assert_eq!(parsed.aliases(), vec!["alpha", "beta"]);
        assert_eq!(
            parsed.find("beta").unwrap().attributes.get("HostName"),
            Some("10.0.0.2")
        );
    }

    #[test]
    fn test_parse_comment_attaches_to_next_host() {
        let content = "## prod box\nHost web1\n  IdentityFile ~/.ssh/id_rsa\nHost web2\n";

        let parsed = parse_ssh_config_content(content);

        assert_eq!(parsed.hosts[0].attributes.comment(), Some("prod box"));
        assert_eq!(
            parsed.hosts[0].attributes.get("IdentityFile"),
            Some("~/.ssh/id_rsa")
        );
        assert_eq!(parsed.hosts[1].attributes.comment(), None);
    }

    #[test]
    fn test_parse_last_comment_before_host_wins() {
        let content = "## first\n## second\nHost a\n";

        let parsed = parse_ssh_config_content(content);

        assert_eq!(parsed.hosts[0].attributes.comment(), Some("second"));
    }

    #[test]
    fn test_parse_trailing_comment_is_dropped() {
        let content = "Host a\n  User me\n## orphan\n";

        let parsed = parse_ssh_config_content(content);

        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed.hosts[0].attributes.comment(), None);
        assert_eq!(parsed.hosts[0].attributes.directives().count(), 1);
    }

    #[test]
    fn test_parse_empty_config() {
        let content = "# SSH config\n\n   \n";

        let parsed = parse_ssh_config_content(content);

        assert!(parsed.is_empty());
        assert!(parse_ssh_config_content("").is_empty());
    }

    #[test]
    fn test_parse_entry_count_matches_host_lines() {
        for n in 0..6 {
            let content: String = (0..n)
                .map(|i| format!("Host h{i}\n  Port {}\n", 2200 + i))
                .collect();

            let parsed = parse_ssh_config_content(&content);

            assert_eq!(parsed.len(), n);
            for (i, entry) in parsed.hosts.iter().enumerate() {
                assert_eq!(entry.alias, format!("h{i}"));
            }
        }
    }

    #[test]
    fn test_parse_repeated_key_last_write_wins() {
        let content = "Host a\n  User first\n  Port 22\n  User second\n";

        let parsed = parse_ssh_config_content(content);

        let attrs = &parsed.hosts[0].attributes;
        assert_eq!(attrs.get("User"), Some("second"));
        assert_eq!(attrs.directives().count(), 2);
    }

    #[test]
    fn test_parse_duplicate_aliases_are_independent() {
        let content = "Host dup\n  User one\nHost dup\n  Port 2222\n";

        let parsed = parse_ssh_config_content(content);

        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed.hosts[0].attributes.get("User"), Some("one"));
        assert_eq!(parsed.hosts[0].attributes.get("Port"), None);
        assert_eq!(parsed.hosts[1].attributes.get("User"), None);
        assert_eq!(parsed.hosts[1].attributes.get("Port"), Some("2222"));
    }

    #[test]
    fn test_parse_multi_alias_line_shares_block() {
        let content = "## pair\nHost one two\n  HostName shared.example.com\n";

        let parsed = parse_ssh_config_content(content);

        assert_eq!(parsed.aliases(), vec!["one", "two"]);
        for entry in &parsed.hosts {
            assert_eq!(
                entry.attributes.get("HostName"),
                Some("shared.example.com")
            );
            assert_eq!(entry.attributes.comment(), Some("pair"));
        }
    }

    #[test]
    fn test_parse_host_keyword_is_case_insensitive() {
        let content = "HOST upper\nhost lower\n\tHostName x\n";

        let parsed = parse_ssh_config_content(content);

        assert_eq!(parsed.aliases(), vec!["upper", "lower"]);
        assert_eq!(parsed.hosts[1].attributes.get("HostName"), Some("x"));
    }

    #[test]
    fn test_parse_directive_keys_keep_their_case() {
        let content = "Host a\n  HostName one\n  hostname two\n";

        let parsed = parse_ssh_config_content(content);

        let attrs = &parsed.hosts[0].attributes;
        assert_eq!(attrs.get("HostName"), Some("one"));
        assert_eq!(attrs.get("hostname"), Some("two"));
    }

    #[test]
    fn test_parse_skips_hash_lines_and_bare_tokens() {
        let content = "User orphan\nHost a\n  # disabled\n  Compression\n  User me\n";

        let parsed = parse_ssh_config_content(content);

        let attrs = &parsed.hosts[0].attributes;
        assert_eq!(attrs.directives().count(), 1);
        assert_eq!(attrs.get("User"), Some("me"));
    }

    #[test]
    fn test_parse_hostname_is_not_host() {
        let content = "Host a\n  HostName b\n";

        let parsed = parse_ssh_config_content(content);

        assert_eq!(parsed.len(), 1);
    }

    #[test]
    fn test_parse_value_keeps_inner_spacing() {
        let content = "Host a\n  LocalForward   8080 localhost:80\n";

        let parsed = parse_ssh_config_content(content);

        assert_eq!(
            parsed.hosts[0].attributes.get("LocalForward"),
            Some("8080 localhost:80")
        );
    }

    #[test]
    fn test_parse_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config");

        let err = parse_ssh_config(&path).unwrap_err();

        assert!(matches!(err, Error::ConfigNotFound(p) if p == path));
    }

    #[test]
    fn test_parse_file_is_left_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config");
        let content = "## c\nHost a\n  User me\n";
        std::fs::write(&path, content).unwrap();

        let parsed = parse_ssh_config(&path).unwrap();

        assert_eq!(parsed.aliases(), vec!["a"]);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), content);
    }
}
