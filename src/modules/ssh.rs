//! SSH key generation.
use std::path::PathBuf;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::engine::{ApplyError, Base, Change, Context, Dependable, Module};

const META: &str = "generate";

/// A stage's `ssh` table: generate a key pair with `ssh-keygen`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SshKeygen {
    /// Graph fields; the id is always `ssh`.
    #[serde(flatten)]
    pub base: Base,
    /// Include the module in its stage.
    #[serde(default)]
    pub enabled: bool,
    /// Ask before generating.
    #[serde(default)]
    pub optional: bool,
    /// Abort the run if generation fails.
    #[serde(default)]
    pub mandatory: bool,
    /// Key file (`-f`); an existing file means the key is already present.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub output: String,
    /// Key type (`-t`).
    #[serde(default, rename = "type", skip_serializing_if = "String::is_empty")]
    pub key_type: String,
    /// Passphrase (`-N`).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub passphrase: String,
    /// Key comment (`-C`).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub comment: String,
}

impl SshKeygen {
    /// Identifier every ssh module carries.
    pub const ID: &'static str = "ssh";

    fn args(&self) -> Vec<&str> {
        let mut args = Vec::new();
        for (flag, value) in [
            ("-f", &self.output),
            ("-t", &self.key_type),
            ("-N", &self.passphrase),
            ("-C", &self.comment),
        ] {
            if !value.is_empty() {
                args.push(flag);
                args.push(value.as_str());
            }
        }
        args
    }

    /// Output path with a leading `~/` expanded.
    fn output_path(&self) -> Option<PathBuf> {
        if self.output.is_empty() {
            return None;
        }
        match (self.output.strip_prefix("~/"), std::env::var_os("HOME")) {
            (Some(rest), Some(home)) => Some(PathBuf::from(home).join(rest)),
            _ => Some(PathBuf::from(&self.output)),
        }
    }
}

impl Dependable for SshKeygen {
    fn base(&self) -> &Base {
        &self.base
    }

    fn base_mut(&mut self) -> &mut Base {
        &mut self.base
    }
}

impl Module for SshKeygen {
    fn is_optional(&self) -> bool {
        self.enabled && self.optional
    }

    fn is_mandatory(&self) -> bool {
        self.enabled && self.mandatory
    }

    fn apply(&self, ctx: &Context) -> Result<Change, ApplyError> {
        if let Some(path) = self.output_path()
            && path.exists()
        {
            ctx.log
                .debug(&format!("ssh: key already present at {}", path.display()));
            return Ok(Change::unchanged(META));
        }
        ctx.executor
            .run_interactive("ssh-keygen", &self.args())
            .context("failed generating ssh key")
            .map_err(|e| ApplyError::new(META, e))?;
        Ok(Change::applied(META))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::confirm::AssumeYes;
    use crate::exec::Executor;
    use crate::exec::test_helpers::MockExecutor;
    use crate::logging::test_helpers::MemoryLog;

    fn ctx(executor: &Arc<MockExecutor>) -> Context {
        Context::new(
            Arc::new(MemoryLog::default()),
            Arc::clone(executor) as Arc<dyn Executor>,
            Arc::new(AssumeYes),
        )
    }

    fn keygen(output: &str) -> SshKeygen {
        SshKeygen {
            enabled: true,
            output: output.to_string(),
            key_type: "ed25519".to_string(),
            comment: "me@host".to_string(),
            ..SshKeygen::default()
        }
    }

    #[test]
    fn deserializes_type_key() {
        let ssh: SshKeygen = toml::from_str(
            r#"
            enabled = true
            optional = true
            type = "rsa"
            "#,
        )
        .unwrap();
        assert_eq!(ssh.key_type, "rsa");
        assert!(ssh.is_optional());
    }

    #[test]
    fn args_include_only_configured_flags() {
        let ssh = keygen("/tmp/key");
        assert_eq!(
            ssh.args(),
            ["-f", "/tmp/key", "-t", "ed25519", "-C", "me@host"]
        );
    }

    #[test]
    fn passphrase_uses_dash_n() {
        let mut ssh = keygen("");
        ssh.passphrase = "secret".to_string();
        assert!(ssh.args().windows(2).any(|w| w == ["-N", "secret"]));
    }

    #[test]
    fn flags_count_only_when_enabled() {
        let mut ssh = SshKeygen {
            optional: true,
            mandatory: true,
            ..SshKeygen::default()
        };
        assert!(!ssh.is_optional());
        assert!(!ssh.is_mandatory());
        ssh.enabled = true;
        assert!(ssh.is_optional());
        assert!(ssh.is_mandatory());
    }

    #[test]
    fn existing_key_is_unchanged() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let executor = Arc::new(MockExecutor::with_responses(vec![]));
        let change = keygen(&tmp.path().to_string_lossy())
            .apply(&ctx(&executor))
            .unwrap();
        assert!(!change.changed);
        assert_eq!(change.meta, "generate");
        assert_eq!(executor.call_count(), 0);
    }

    #[test]
    fn missing_key_is_generated() {
        let tmp = tempfile::tempdir().unwrap();
        let output = tmp.path().join("id_ed25519");
        let output = output.to_string_lossy();
        let executor = Arc::new(MockExecutor::ok(""));
        let change = keygen(&output).apply(&ctx(&executor)).unwrap();
        assert!(change.changed);
        assert_eq!(
            executor.calls(),
            [format!("ssh-keygen -f {output} -t ed25519 -C me@host")]
        );
    }

    #[test]
    fn generation_failure_keeps_meta() {
        let executor = Arc::new(MockExecutor::fail());
        let err = keygen("").apply(&ctx(&executor)).unwrap_err();
        assert_eq!(err.meta, "generate");
        assert!(err.to_string().contains("failed generating ssh key"));
    }
}
