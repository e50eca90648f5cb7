// ─── Rules ───
// Conditional applicability for libraries and data groups.

use serde::{Deserialize, Serialize};

/// Outcome of a single rule, or of a folded rule list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleResult {
    Allow,
    Deny,
    /// The rule's conditions did not match the context.
    Indeterminate,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RuleAction {
    Allow,
    Disallow,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OsRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arch: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rule {
    pub action: RuleAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<OsRule>,
    /// Execution side the rule is restricted to (`"client"`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side: Option<String>,
}

/// What rules are evaluated against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleContext {
    /// Mojang OS name: `windows`, `osx` or `linux`.
    pub os: String,
    pub arch: String,
    /// Execution side. Empty means the common context.
    pub side: String,
}

impl RuleContext {
    /// Context of the running platform on the given side.
    pub fn current(side: &str) -> Self {
        Self {
            os: current_os_name().to_string(),
            arch: std::env::consts::ARCH.to_string(),
            side: side.to_string(),
        }
    }

    pub fn client() -> Self {
        Self::current("client")
    }

    /// The side-less context used to recognize shared data.
    pub fn common() -> Self {
        Self::current("")
    }

    pub fn with_os(mut self, os: &str) -> Self {
        self.os = os.to_string();
        self
    }
}

impl Rule {
    pub fn allow() -> Self {
        Self {
            action: RuleAction::Allow,
            os: None,
            side: None,
        }
    }

    pub fn disallow() -> Self {
        Self {
            action: RuleAction::Disallow,
            os: None,
            side: None,
        }
    }

    pub fn for_os(mut self, name: &str) -> Self {
        self.os = Some(OsRule {
            name: Some(name.to_string()),
            arch: None,
        });
        self
    }

    pub fn for_side(mut self, side: &str) -> Self {
        self.side = Some(side.to_string());
        self
    }

    fn matches(&self, ctx: &RuleContext) -> bool {
        if let Some(os) = &self.os {
            if os.name.as_deref().is_some_and(|name| name != ctx.os) {
                return false;
            }
            if os.arch.as_deref().is_some_and(|arch| !arch_matches(arch, &ctx.arch)) {
                return false;
            }
        }
        if let Some(side) = &self.side {
            if side != &ctx.side {
                return false;
            }
        }
        true
    }

    pub fn apply(&self, ctx: &RuleContext) -> RuleResult {
        if !self.matches(ctx) {
            return RuleResult::Indeterminate;
        }
        match self.action {
            RuleAction::Allow => RuleResult::Allow,
            RuleAction::Disallow => RuleResult::Deny,
        }
    }
}

/// Fold a rule list left to right. The last decisive rule wins; with no
/// decisive rule the result is `Deny`.
pub fn evaluate(rules: &[Rule], ctx: &RuleContext) -> RuleResult {
    rules
        .iter()
        .map(|rule| rule.apply(ctx))
        .fold(RuleResult::Deny, |acc, result| match result {
            RuleResult::Indeterminate => acc,
            decisive => decisive,
        })
}

fn arch_matches(rule_arch: &str, ctx_arch: &str) -> bool {
    match rule_arch {
        "x86" => ctx_arch == "x86",
        "x86_64" | "x64" => ctx_arch == "x86_64",
        "arm64" | "aarch64" => ctx_arch == "aarch64",
        other => other == ctx_arch,
    }
}

/// Get the Mojang OS name for the current platform.
pub fn current_os_name() -> &'static str {
    if cfg!(target_os = "windows") {
        "windows"
    } else if cfg!(target_os = "macos") {
        "osx"
    } else {
        "linux"
    }
}
