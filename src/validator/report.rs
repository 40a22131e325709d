use std::fmt;

use serde::Serialize;

#[cfg(feature = "colorized_output")]
use console::style;

/// Outcome of one check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "lowercase")]
pub enum CheckStatus {
    /// Check passed
    Ok,
    /// File is usable but unusual
    Warning(String),
    /// File cannot be read as declared
    Failed(String),
}

impl CheckStatus {
    fn symbol(&self) -> &'static str {
        match self {
            CheckStatus::Ok => "✓",
            CheckStatus::Warning(_) => "⚠",
            CheckStatus::Failed(_) => "✗",
        }
    }

    /// Message attached to a warning or failure
    pub fn message(&self) -> Option<&str> {
        match self {
            CheckStatus::Ok => None,
            CheckStatus::Warning(m) | CheckStatus::Failed(m) => Some(m),
        }
    }
}

/// One named check and its outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationCheck {
    /// What was checked
    pub name: String,
    /// Outcome
    #[serde(flatten)]
    pub status: CheckStatus,
}

/// Passed / warning / failed tallies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Checks that passed
    pub passed: usize,
    /// Checks that raised a warning
    pub warnings: usize,
    /// Checks that failed
    pub failed: usize,
}

/// Every check run against one file
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    /// File that was validated
    pub file: String,
    /// Checks in the order they ran
    pub checks: Vec<ValidationCheck>,
}

impl ValidationReport {
    /// Empty report for `file`
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            checks: Vec::new(),
        }
    }

    /// Record a passed check
    pub fn pass(&mut self, name: impl Into<String>) {
        self.push(name, CheckStatus::Ok);
    }

    /// Record a warning
    pub fn warn(&mut self, name: impl Into<String>, message: impl Into<String>) {
        self.push(name, CheckStatus::Warning(message.into()));
    }

    /// Record a failure
    pub fn fail(&mut self, name: impl Into<String>, message: impl Into<String>) {
        self.push(name, CheckStatus::Failed(message.into()));
    }

    fn push(&mut self, name: impl Into<String>, status: CheckStatus) {
        self.checks.push(ValidationCheck {
            name: name.into(),
            status,
        });
    }

    /// Outcome of the first check with this name
    pub fn status_of(&self, name: &str) -> Option<&CheckStatus> {
        self.checks.iter().find(|c| c.name == name).map(|c| &c.status)
    }

    /// Tally of outcomes
    pub fn summary(&self) -> Summary {
        self.checks
            .iter()
            .fold(Summary::default(), |mut s, c| {
                match c.status {
                    CheckStatus::Ok => s.passed += 1,
                    CheckStatus::Warning(_) => s.warnings += 1,
                    CheckStatus::Failed(_) => s.failed += 1,
                }
                s
            })
    }

    /// True when any check failed
    pub fn has_failures(&self) -> bool {
        self.summary().failed > 0
    }

    /// Render for a terminal, coloured when the `colorized_output` feature is on
    pub fn format_colored(&self) -> String {
        #[cfg(feature = "colorized_output")]
        {
            let mut out = format!(
                "{}\n{}: {}\n\n",
                style("FCS Validation Report").bold().cyan(),
                style("File").bold(),
                self.file
            );
            for check in &self.checks {
                let line = match &check.status {
                    CheckStatus::Ok => format!("{}", style(&check.name).green()),
                    CheckStatus::Warning(m) => {
                        format!("{} - {}", style(&check.name).yellow(), m)
                    }
                    CheckStatus::Failed(m) => format!("{} - {}", style(&check.name).red(), m),
                };
                out.push_str(&format!("[{}] {}\n", check.status.symbol(), line));
            }
            let s = self.summary();
            out.push_str(&format!(
                "\n{}: {} passed, {} warnings, {} failed\n",
                style("Summary").bold(),
                style(s.passed).green(),
                style(s.warnings).yellow(),
                style(s.failed).red()
            ));
            out
        }

        #[cfg(not(feature = "colorized_output"))]
        {
            self.to_string()
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "FCS Validation Report")?;
        writeln!(f, "File: {}", self.file)?;
        writeln!(f)?;
        for check in &self.checks {
            write!(f, "[{}] {}", check.status.symbol(), check.name)?;
            match check.status.message() {
                Some(m) => writeln!(f, " - {m}")?,
                None => writeln!(f)?,
            }
        }
        let s = self.summary();
        writeln!(f)?;
        writeln!(
            f,
            "Summary: {} passed, {} warnings, {} failed",
            s.passed, s.warnings, s.failed
        )
    }
}
