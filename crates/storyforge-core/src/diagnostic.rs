use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticSeverity {
    Error,
    Warning,
    Info,
}

/// A non-fatal problem found while generating, attached to the run result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: DiagnosticSeverity,
    pub message: String,
    /// Step or subsystem that produced the diagnostic.
    pub source: String,
    /// Group owning the affected element, if any.
    pub group: Option<String>,
}

impl Diagnostic {
    pub fn warning(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Warning,
            message: message.into(),
            source: source.into(),
            group: None,
        }
    }

    pub fn error(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Error,
            message: message.into(),
            source: source.into(),
            group: None,
        }
    }

    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.severity {
            DiagnosticSeverity::Error => "error",
            DiagnosticSeverity::Warning => "warning",
            DiagnosticSeverity::Info => "info",
        };
        match &self.group {
            Some(group) => write!(f, "{prefix}[{}]: {} (group '{group}')", self.source, self.message),
            None => write!(f, "{prefix}[{}]: {}", self.source, self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_display() {
        let d = Diagnostic::warning("assets", "unknown asset 'glow'").in_group("Intro");
        assert_eq!(d.to_string(), "warning[assets]: unknown asset 'glow' (group 'Intro')");
        let e = Diagnostic::error("encode", "oops");
        assert_eq!(e.to_string(), "error[encode]: oops");
    }
}
