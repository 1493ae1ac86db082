//! Structural checks for the plugin's static descriptors.
//!
//! Three JSON files ship with the plugin and are never read by the hooks at
//! runtime, so nothing else notices when they drift:
//! - `.claude-plugin/marketplace.json`
//! - `plugins/dp-cto/.claude-plugin/plugin.json`
//! - `plugins/dp-cto/hooks/hooks.json`
//!
//! Each check collects every finding instead of stopping at the first.

use serde_json::Value as JsonValue;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::error::GuardError;

pub const VALID_EVENTS: &[&str] = &[
    "SessionStart",
    "UserPromptSubmit",
    "PreToolUse",
    "PermissionRequest",
    "PostToolUse",
    "PostToolUseFailure",
    "Notification",
    "SubagentStart",
    "SubagentStop",
    "Stop",
    "TeammateIdle",
    "TaskCompleted",
    "ConfigChange",
    "WorktreeCreate",
    "WorktreeRemove",
    "PreCompact",
    "SessionEnd",
];

pub const VALID_HANDLER_TYPES: &[&str] = &["command", "prompt", "agent"];

const PLUGIN_ROOT_VAR: &str = "${CLAUDE_PLUGIN_ROOT}";

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Finding {
    pub file: String,
    /// JSON-pointer-ish location inside the file, `$` for the root.
    pub path: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct ManifestPaths {
    pub marketplace: PathBuf,
    pub plugin: PathBuf,
    pub hooks: PathBuf,
    pub plugin_root: PathBuf,
}

impl ManifestPaths {
    pub fn for_repo(root: &Path) -> Self {
        let plugin_root = root.join("plugins").join("dp-cto");
        Self {
            marketplace: root.join(".claude-plugin").join("marketplace.json"),
            plugin: plugin_root.join(".claude-plugin").join("plugin.json"),
            hooks: plugin_root.join("hooks").join("hooks.json"),
            plugin_root,
        }
    }
}

struct Checker<'a> {
    file: &'a str,
    findings: Vec<Finding>,
}

impl<'a> Checker<'a> {
    fn new(file: &'a str) -> Self {
        Self {
            file,
            findings: Vec::new(),
        }
    }

    fn fail(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.findings.push(Finding {
            file: self.file.to_string(),
            path: path.into(),
            message: message.into(),
        });
    }

    fn require_string(&mut self, obj: &serde_json::Map<String, JsonValue>, key: &str, at: &str) {
        if !obj.get(key).is_some_and(JsonValue::is_string) {
            self.fail(format!("{}.{}", at, key), "must be a string");
        }
    }

    fn optional(&mut self, obj: &serde_json::Map<String, JsonValue>, key: &str, kind: &str) {
        let Some(value) = obj.get(key) else {
            return;
        };
        let ok = match kind {
            "string" => value.is_string(),
            "object" => value.is_object(),
            "array" => value.is_array(),
            _ => true,
        };
        if !ok {
            self.fail(format!("$.{}", key), format!("must be {} {} when present", article(kind), kind));
        }
    }
}

fn article(kind: &str) -> &'static str {
    if kind.starts_with(['a', 'e', 'i', 'o', 'u']) {
        "an"
    } else {
        "a"
    }
}

fn root_object<'v>(checker: &mut Checker<'_>, value: &'v JsonValue) -> Option<&'v serde_json::Map<String, JsonValue>> {
    let obj = value.as_object();
    if obj.is_none() {
        checker.fail("$", "must be a JSON object");
    }
    obj
}

pub fn check_marketplace(value: &JsonValue) -> Vec<Finding> {
    let mut c = Checker::new("marketplace.json");
    let Some(obj) = root_object(&mut c, value) else {
        return c.findings;
    };
    c.require_string(obj, "name", "$");
    match obj.get("owner").and_then(JsonValue::as_object) {
        Some(owner) => c.require_string(owner, "name", "$.owner"),
        None => c.fail("$.owner", "must be an object with a name"),
    }
    match obj.get("plugins").and_then(JsonValue::as_array) {
        Some(plugins) => {
            for (i, plugin) in plugins.iter().enumerate() {
                let at = format!("$.plugins[{}]", i);
                let Some(plugin) = plugin.as_object() else {
                    c.fail(at, "must be an object");
                    continue;
                };
                c.require_string(plugin, "name", &at);
                if !plugin
                    .get("source")
                    .is_some_and(|s| s.is_string() || s.is_object())
                {
                    c.fail(format!("{}.source", at), "must be a string or an object");
                }
            }
        }
        None => c.fail("$.plugins", "must be an array"),
    }
    c.optional(obj, "version", "string");
    c.optional(obj, "description", "string");
    c.findings
}

pub fn check_plugin(value: &JsonValue) -> Vec<Finding> {
    let mut c = Checker::new("plugin.json");
    let Some(obj) = root_object(&mut c, value) else {
        return c.findings;
    };
    c.require_string(obj, "name", "$");
    c.optional(obj, "version", "string");
    c.optional(obj, "description", "string");
    c.optional(obj, "author", "object");
    c.optional(obj, "repository", "string");
    c.optional(obj, "keywords", "array");
    c.findings
}

/// `plugin_root` resolves `${CLAUDE_PLUGIN_ROOT}` in command handlers.
pub fn check_hooks(value: &JsonValue, plugin_root: &Path) -> Vec<Finding> {
    let mut c = Checker::new("hooks.json");
    let Some(obj) = root_object(&mut c, value) else {
        return c.findings;
    };
    let Some(hooks) = obj.get("hooks").and_then(JsonValue::as_object) else {
        c.fail("$.hooks", "must be an object");
        return c.findings;
    };
    for (event, matchers) in hooks {
        let at = format!("$.hooks.{}", event);
        if !VALID_EVENTS.contains(&event.as_str()) {
            c.fail(at.clone(), format!("unknown hook event '{}'", event));
        }
        let Some(matchers) = matchers.as_array() else {
            c.fail(at, "must be an array of matchers");
            continue;
        };
        for (i, matcher) in matchers.iter().enumerate() {
            let at = format!("{}[{}]", at, i);
            let Some(matcher) = matcher.as_object() else {
                c.fail(at, "must be an object");
                continue;
            };
            c.require_string(matcher, "matcher", &at);
            let Some(handlers) = matcher.get("hooks").and_then(JsonValue::as_array) else {
                c.fail(format!("{}.hooks", at), "must be an array");
                continue;
            };
            for (j, handler) in handlers.iter().enumerate() {
                let at = format!("{}.hooks[{}]", at, j);
                check_handler(&mut c, handler, &at, plugin_root);
            }
        }
    }
    c.findings
}

fn check_handler(c: &mut Checker<'_>, handler: &JsonValue, at: &str, plugin_root: &Path) {
    let kind = handler.get("type").and_then(JsonValue::as_str);
    match kind {
        Some(kind) if VALID_HANDLER_TYPES.contains(&kind) => {}
        Some(kind) => {
            c.fail(format!("{}.type", at), format!("unknown handler type '{}'", kind));
            return;
        }
        None => {
            c.fail(format!("{}.type", at), "must be a string");
            return;
        }
    }
    if kind != Some("command") {
        return;
    }
    let Some(command) = handler.get("command").and_then(JsonValue::as_str) else {
        return;
    };
    let Some(script) = command.split_whitespace().next() else {
        return;
    };
    if !script.contains(PLUGIN_ROOT_VAR) {
        return;
    }
    let resolved = script.replace(PLUGIN_ROOT_VAR, &plugin_root.to_string_lossy());
    if !Path::new(&resolved).is_file() {
        c.fail(
            format!("{}.command", at),
            format!("'{}' does not resolve to an existing file", script),
        );
    }
}

fn read_json(path: &Path) -> Result<JsonValue, GuardError> {
    if !path.exists() {
        return Err(GuardError::NotFound(path.display().to_string()));
    }
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Check all three descriptors under a repository root. Missing or
/// unparsable files are reported as findings, not errors.
pub fn check_repo(root: &Path) -> Vec<Finding> {
    let paths = ManifestPaths::for_repo(root);
    let mut findings = Vec::new();
    let inputs: [(&Path, &str); 3] = [
        (paths.marketplace.as_path(), "marketplace.json"),
        (paths.plugin.as_path(), "plugin.json"),
        (paths.hooks.as_path(), "hooks.json"),
    ];
    for (path, name) in inputs {
        let value = match read_json(path) {
            Ok(value) => value,
            Err(err) => {
                findings.push(Finding {
                    file: name.to_string(),
                    path: "$".to_string(),
                    message: err.to_string(),
                });
                continue;
            }
        };
        findings.extend(match name {
            "marketplace.json" => check_marketplace(&value),
            "plugin.json" => check_plugin(&value),
            _ => check_hooks(&value, &paths.plugin_root),
        });
    }
    findings
}
