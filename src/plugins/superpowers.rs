//! Tier policy for `superpowers:*` skills.
//!
//! The superpowers plugin ships its own planning and orchestration skills.
//! Running those inside a dp-cto session would fork the workflow, so they are
//! mapped onto four tiers, checked in order:
//!
//! 1. exact-match deny list (orchestration skills, each with its dp-cto
//!    replacement),
//! 2. exact-match allow list (quality and process skills),
//! 3. keyword heuristic: allowed but flagged with a warning,
//! 4. everything else passes silently.

use crate::core::config::SuperpowersConfig;

/// Orchestration skills and the dp-cto skill that replaces each.
pub const TIER1_DENY: &[(&str, &str)] = &[
    ("brainstorming", "dp-cto:start"),
    ("writing-plans", "dp-cto:start"),
    ("executing-plans", "dp-cto:execute"),
    ("subagent-driven-development", "dp-cto:execute"),
    ("dispatching-parallel-agents", "dp-cto:execute"),
    ("ralph-loop", "dp-cto:ralph"),
];

pub const TIER2_ALLOW: &[&str] = &[
    "test-driven-development",
    "requesting-code-review",
    "receiving-code-review",
    "systematic-debugging",
    "verification-before-completion",
    "writing-skills",
    "using-superpowers",
];

pub const TIER3_KEYWORDS: &[&str] = &[
    "parallel",
    "dispatch",
    "orchestrat",
    "subagent",
    "swarm",
    "plan",
    "execut",
    "brainstorm",
    "loop",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tier {
    /// Tier 1. `replacement` is the dp-cto skill to use instead, when known.
    Deny { replacement: Option<String> },
    /// Tier 2.
    Allow,
    /// Tier 3. `keyword` is the pattern that matched.
    Warn { keyword: String },
    /// Tier 4.
    Pass,
}

impl Tier {
    pub fn number(&self) -> u8 {
        match self {
            Tier::Deny { .. } => 1,
            Tier::Allow => 2,
            Tier::Warn { .. } => 3,
            Tier::Pass => 4,
        }
    }
}

/// Built-in tiers plus project additions from config.
#[derive(Debug, Clone, Default)]
pub struct SuperpowersPolicy {
    extra_deny: Vec<String>,
    extra_allow: Vec<String>,
    extra_keywords: Vec<String>,
}

impl SuperpowersPolicy {
    pub fn builtin() -> Self {
        Self::default()
    }

    pub fn from_config(config: &SuperpowersConfig) -> Self {
        let normalize = |items: &[String]| -> Vec<String> {
            items
                .iter()
                .map(|s| s.trim().to_ascii_lowercase())
                .filter(|s| !s.is_empty())
                .collect()
        };
        Self {
            extra_deny: normalize(&config.deny),
            extra_allow: normalize(&config.allow),
            extra_keywords: normalize(&config.warn_keywords),
        }
    }

    /// Classify the name after `superpowers:`.
    pub fn classify(&self, name: &str) -> Tier {
        if let Some((_, replacement)) = TIER1_DENY.iter().find(|(n, _)| *n == name) {
            return Tier::Deny {
                replacement: Some(replacement.to_string()),
            };
        }
        // configured names are stored lowercased
        let lowered = name.to_ascii_lowercase();
        if self.extra_deny.contains(&lowered) {
            return Tier::Deny { replacement: None };
        }
        if TIER2_ALLOW.contains(&name) || self.extra_allow.contains(&lowered) {
            return Tier::Allow;
        }
        let keyword = TIER3_KEYWORDS
            .iter()
            .map(|k| k.to_string())
            .chain(self.extra_keywords.iter().cloned())
            .find(|k| lowered.contains(k.as_str()));
        match keyword {
            Some(keyword) => Tier::Warn { keyword },
            None => Tier::Pass,
        }
    }
}

pub fn deny_message(name: &str, replacement: Option<&str>) -> String {
    match replacement {
        Some(replacement) => format!(
            "superpowers:{} conflicts with the dp-cto workflow. Use /{} instead.",
            name, replacement
        ),
        None => format!(
            "superpowers:{} is blocked by this project's dp-cto configuration.",
            name
        ),
    }
}

pub fn warn_message(name: &str, keyword: &str) -> String {
    format!(
        "superpowers:{} looks orchestration-related (matched '{}'). It is allowed, but check it does not compete with the dp-cto workflow.",
        name, keyword
    )
}
