//! Shared heuristic vocabulary.
//!
//! Every check is composed from these extraction and classification
//! helpers. They are local and syntactic: nothing here resolves variables
//! or follows data across tasks.

use std::sync::LazyLock;

use regex::Regex;

use crate::ast::model::Task;
use crate::value::{Number, Value};

/// Parameter keys probed, in priority order, for a command string.
/// `_raw_params` is where free-form arguments land.
const COMMAND_KEYS: &[&str] = &["cmd", "command", "_raw_params"];

/// Modules that run an arbitrary command line.
pub const COMMAND_MODULES: &[&str] = &["command", "shell"];

/// Returns the task's representative command text, or an empty string.
pub fn command_string(task: &Task) -> String {
    match &task.parameters {
        Value::String(s) => s.clone(),
        Value::Mapping(params) => COMMAND_KEYS
            .iter()
            .filter_map(|key| params.get(*key))
            .find(|v| is_present(v))
            .map(Value::to_text)
            .unwrap_or_default(),
        _ => String::new(),
    }
}

pub fn is_command_module(task: &Task) -> bool {
    COMMAND_MODULES.contains(&task.short_module())
}

/// Treats null, empty strings and empty containers as absent.
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        Value::Sequence(items) => !items.is_empty(),
        Value::Mapping(entries) => !entries.is_empty(),
        _ => true,
    }
}

/// Classifies a loosely typed flag.
///
/// `Some(true)` for truthy, `Some(false)` for falsey, `None` when the value
/// is neither (null, unrecognized strings, containers).
pub fn truthiness(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" | "on" => Some(true),
            "false" | "no" | "0" | "off" => Some(false),
            _ => None,
        },
        Value::Number(Number::Integer(i)) => Some(*i != 0),
        Value::Number(Number::Float(x)) => Some(*x != 0.0),
        _ => None,
    }
}

pub fn is_truthy(value: &Value) -> bool {
    truthiness(value) == Some(true)
}

pub fn is_falsey(value: &Value) -> bool {
    truthiness(value) == Some(false)
}

/// World- or group-writable modes, octal and symbolic.
const DANGEROUS_MODES: &[&str] = &[
    "0777", "0776", "0775", "0766", "0666", "0664", "0770", "0660", "1777", "2777", "777",
    "776", "775", "766", "666", "664", "770", "660",
];

const DANGEROUS_SYMBOLIC: &[&str] = &["rwxrwxrwx", "a+rwx", "a+w", "o+w", "g+w", "ugo+rwx"];

/// True when `mode` grants group or other write access.
///
/// Beyond the enumerated values, any 3 or 4 digit numeric mode whose last
/// digit is 6 or 7 counts as dangerous. An integer is tested both as written
/// (`mode: 0777` loads as 777) and in octal (`mode: 0o777` loads as 511).
pub fn is_dangerous_mode(mode: &Value) -> bool {
    match mode {
        Value::String(s) => is_dangerous_mode_text(s),
        Value::Number(Number::Integer(i)) => {
            is_dangerous_mode_text(&i.to_string()) || is_dangerous_mode_text(&format!("{i:o}"))
        }
        _ => false,
    }
}

fn is_dangerous_mode_text(raw: &str) -> bool {
    let normalized: String = raw
        .trim()
        .chars()
        .filter(|c| *c != '"' && *c != '\'')
        .collect();
    let normalized = normalized.trim_start_matches("0o");

    if DANGEROUS_MODES.contains(&normalized) {
        return true;
    }
    if DANGEROUS_SYMBOLIC.iter().any(|s| normalized.contains(s)) {
        return true;
    }

    (3..=4).contains(&normalized.len())
        && normalized.chars().all(|c| c.is_ascii_digit())
        && normalized.ends_with(['6', '7'])
}

static INTERPOLATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([^}]+?)\s*\}\}").expect("valid interpolation regex"));

/// Substrings of variable names that suggest user-controlled input.
const USER_INPUT_KEYWORDS: &[&str] = &["input", "user", "param", "arg", "data"];

/// One `{{ ... }}` placeholder found in a text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpolation {
    /// Full inner expression, filters included.
    pub expression: String,
    /// Expression with any `| filter` suffix removed.
    pub variable: String,
}

impl Interpolation {
    pub fn is_user_controlled(&self) -> bool {
        let name = self.variable.to_ascii_lowercase();
        USER_INPUT_KEYWORDS.iter().any(|k| name.contains(k))
    }
}

/// All placeholders in `text`, in order of appearance.
pub fn interpolations(text: &str) -> Vec<Interpolation> {
    INTERPOLATION
        .captures_iter(text)
        .map(|caps| {
            let expression = caps[1].trim().to_string();
            let variable = expression
                .split('|')
                .next()
                .unwrap_or_default()
                .trim()
                .to_string();
            Interpolation {
                expression,
                variable,
            }
        })
        .collect()
}

/// Bare variable names of the placeholders that look user-controlled.
pub fn unvalidated_interpolations(text: &str) -> Vec<String> {
    interpolations(text)
        .into_iter()
        .filter(Interpolation::is_user_controlled)
        .map(|i| i.variable)
        .collect()
}

const TEMP_INDICATORS: &[&str] = &["/tmp/", "/var/tmp/", "/dev/shm/"];

/// Temp-looking paths that still hold sensitive material.
const TEMP_CARVE_OUTS: &[&str] = &["/secret", "/.ssh/"];

const SYSTEM_CONFIG_INDICATORS: &[&str] = &["/etc/"];

const CONFIG_EXTENSIONS: &[&str] = &[".conf", ".cfg", ".ini", ".cnf", ".yaml", ".yml", ".json", ".toml", ".service"];

pub fn is_temp_path(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    TEMP_INDICATORS.iter().any(|t| lower.contains(t))
}

/// A temporary path that is not one of the sensitive carve-outs.
pub fn is_safe_temp_path(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    is_temp_path(path) && !TEMP_CARVE_OUTS.iter().any(|c| lower.contains(c))
}

pub fn is_system_config_path(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    SYSTEM_CONFIG_INDICATORS.iter().any(|i| lower.contains(i))
        || CONFIG_EXTENSIONS.iter().any(|e| lower.ends_with(e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::build::build_task;

    fn task(yaml: &str) -> Task {
        build_task(&Value::from(serde_yaml::from_str::<serde_yaml::Value>(yaml).unwrap()))
    }

    #[test]
    fn command_string_probes_keys_in_priority_order() {
        assert_eq!(command_string(&task("command:\n  cmd: a\n  command: b\n")), "a");
        assert_eq!(command_string(&task("command:\n  command: b\n")), "b");
        assert_eq!(command_string(&task("shell:\n  _raw_params: c\n")), "c");
        assert_eq!(command_string(&task("shell:\n  cmd: ''\n  command: d\n")), "d");
    }

    #[test]
    fn command_string_accepts_free_form_and_rejects_other_shapes() {
        assert_eq!(command_string(&task("shell: ls -la\n")), "ls -la");
        assert_eq!(command_string(&task("shell: [a, b]\n")), "");
        assert_eq!(command_string(&task("copy:\n  dest: /x\n")), "");
    }

    #[test]
    fn truthiness_covers_common_spellings() {
        for v in [Value::Bool(true), Value::from("YES"), Value::from("on"), Value::from("1")] {
            assert_eq!(truthiness(&v), Some(true), "{v}");
        }
        for v in [
            Value::Bool(false),
            Value::from("No"),
            Value::from("off"),
            Value::Number(Number::Integer(0)),
        ] {
            assert_eq!(truthiness(&v), Some(false), "{v}");
        }
        assert_eq!(truthiness(&Value::Null), None);
        assert_eq!(truthiness(&Value::from("maybe")), None);
        assert!(is_truthy(&Value::Number(Number::Integer(2))));
        assert!(!is_falsey(&Value::Null));
    }

    #[test]
    fn dangerous_modes() {
        for mode in ["0777", "'0666'", "\"0664\"", "a+rwx", "u=rwx,o+w", "1777", "0o777"] {
            assert!(is_dangerous_mode(&Value::from(mode)), "{mode}");
        }
        assert!(is_dangerous_mode(&Value::Number(Number::Integer(777))));
        assert!(is_dangerous_mode(&Value::Number(Number::Integer(646))));
        for mode in ["0644", "0600", "u=rw,g=r,o=r", "0755"] {
            assert!(!is_dangerous_mode(&Value::from(mode)), "{mode}");
        }
        assert!(!is_dangerous_mode(&Value::Number(Number::Integer(644))));
        assert!(!is_dangerous_mode(&Value::Number(Number::Integer(7))));
        // 0o777 and 0o666 as loaded from YAML octal literals.
        assert!(is_dangerous_mode(&Value::Number(Number::Integer(511))));
        assert!(is_dangerous_mode(&Value::Number(Number::Integer(438))));
        // 0o644 and 0o600 stay safe.
        assert!(!is_dangerous_mode(&Value::Number(Number::Integer(420))));
        assert!(!is_dangerous_mode(&Value::Number(Number::Integer(384))));
        assert!(!is_dangerous_mode(&Value::Bool(true)));
    }

    #[test]
    fn interpolation_scanning_strips_filters() {
        let found = interpolations("echo {{ user_input | default('x') }} {{item}}");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].expression, "user_input | default('x')");
        assert_eq!(found[0].variable, "user_input");
        assert_eq!(found[1].variable, "item");

        assert_eq!(
            unvalidated_interpolations("rm -rf {{ dest_dir }}/{{ UserData }} {{ param1|quote }}"),
            vec!["UserData".to_string(), "param1".to_string()]
        );
        assert!(unvalidated_interpolations("no placeholders").is_empty());
    }

    #[test]
    fn path_classification() {
        assert!(is_temp_path("/tmp/build.log"));
        assert!(is_temp_path("/VAR/TMP/x"));
        assert!(is_safe_temp_path("/dev/shm/cache"));
        assert!(!is_safe_temp_path("/tmp/secrets/key"));
        assert!(!is_safe_temp_path("/tmp/home/.ssh/id_rsa"));
        assert!(!is_temp_path("/opt/app"));

        assert!(is_system_config_path("/etc/nginx/nginx.conf"));
        assert!(is_system_config_path("/opt/app/settings.ini"));
        assert!(!is_system_config_path("/opt/app/bin/run"));
    }
}
