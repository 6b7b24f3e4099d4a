use crate::Language;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Placeholder substituted with the script path in command arguments.
pub const FILE_PLACEHOLDER: &str = "{file}";

/// An external command line.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Arguments with `{file}` replaced by `file`.
    ///
    /// When no argument mentions the placeholder the path is appended.
    pub fn args_for(&self, file: &str) -> Vec<String> {
        if self.args.iter().any(|a| a.contains(FILE_PLACEHOLDER)) {
            self.args
                .iter()
                .map(|a| a.replace(FILE_PLACEHOLDER, file))
                .collect()
        } else {
            let mut args = self.args.clone();
            args.push(file.to_string());
            args
        }
    }
}

/// How one language is run, traced and formatted.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct InterpreterConfig {
    pub run: CommandSpec,
    /// Reads source on stdin, prints a JSON debug response.
    #[serde(default)]
    pub debug: Option<CommandSpec>,
    /// Reads source on stdin, prints the formatted source.
    #[serde(default)]
    pub format: Option<CommandSpec>,
    #[serde(default)]
    pub debug_prefix: String,
}

impl InterpreterConfig {
    pub fn default_for(language: Language) -> Self {
        match language {
            Language::Python => Self {
                run: CommandSpec::new("python3", &["-u", "-i", FILE_PLACEHOLDER]),
                debug: None,
                format: Some(CommandSpec::new("black", &["-q", "-"])),
                debug_prefix: String::new(),
            },
            Language::Scheme => Self {
                run: CommandSpec::new("scheme", &[FILE_PLACEHOLDER]),
                debug: None,
                format: None,
                debug_prefix: String::new(),
            },
            Language::Sql => Self {
                run: CommandSpec::new("sqlite3", &["-interactive", "-init", FILE_PLACEHOLDER]),
                debug: None,
                format: None,
                debug_prefix: String::new(),
            },
        }
    }
}

/// Session-wide behaviour.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Run saved files from disk rather than from the editor buffer.
    #[serde(default = "default_prefer_file_runs")]
    pub prefer_file_runs: bool,
    /// Upper bound for one debug-trace or format round trip.
    #[serde(default = "default_generation_timeout_secs")]
    pub generation_timeout_secs: u64,
    /// Where save-as writes files. Defaults to the current directory.
    #[serde(default)]
    pub save_dir: Option<PathBuf>,
    /// Where shared files are published. Defaults to `<data_dir>/workbench/shared`.
    #[serde(default)]
    pub share_dir: Option<PathBuf>,
}

fn default_prefer_file_runs() -> bool {
    true
}

fn default_generation_timeout_secs() -> u64 {
    10
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            prefer_file_runs: default_prefer_file_runs(),
            generation_timeout_secs: default_generation_timeout_secs(),
            save_dir: None,
            share_dir: None,
        }
    }
}

/// Root of `config.toml`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct WorkbenchConfig {
    #[serde(default = "default_python")]
    pub python: InterpreterConfig,
    #[serde(default = "default_scheme")]
    pub scheme: InterpreterConfig,
    #[serde(default = "default_sql")]
    pub sql: InterpreterConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

fn default_python() -> InterpreterConfig {
    InterpreterConfig::default_for(Language::Python)
}

fn default_scheme() -> InterpreterConfig {
    InterpreterConfig::default_for(Language::Scheme)
}

fn default_sql() -> InterpreterConfig {
    InterpreterConfig::default_for(Language::Sql)
}

impl Default for WorkbenchConfig {
    fn default() -> Self {
        Self {
            python: default_python(),
            scheme: default_scheme(),
            sql: default_sql(),
            session: SessionConfig::default(),
        }
    }
}

impl WorkbenchConfig {
    pub fn interpreter(&self, language: Language) -> &InterpreterConfig {
        match language {
            Language::Python => &self.python,
            Language::Scheme => &self.scheme,
            Language::Sql => &self.sql,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_for_substitutes_placeholder() {
        let spec = CommandSpec::new("python3", &["-i", "{file}"]);
        assert_eq!(spec.args_for("/tmp/a.py"), vec!["-i", "/tmp/a.py"]);
    }

    #[test]
    fn test_args_for_appends_without_placeholder() {
        let spec = CommandSpec::new("scheme", &["--quiet"]);
        assert_eq!(spec.args_for("a.scm"), vec!["--quiet", "a.scm"]);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: WorkbenchConfig = toml::from_str(
            r#"
            [scheme]
            run = { program = "racket", args = ["-i", "{file}"] }
            debug_prefix = "(define (f) 1)\n"

            [session]
            prefer_file_runs = false
            "#,
        )
        .unwrap();

        assert_eq!(config.scheme.run.program, "racket");
        assert_eq!(config.scheme.debug_prefix, "(define (f) 1)\n");
        assert_eq!(config.python, InterpreterConfig::default_for(Language::Python));
        assert!(!config.session.prefer_file_runs);
        assert_eq!(config.session.generation_timeout_secs, 10);
    }
}
