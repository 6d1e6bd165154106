use crate::template_ast::SourceRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Tip,
}

/// A non-fatal finding about the template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub message: String,
    pub range: Option<SourceRange>,
}

/// Ordered sink every compiler stage reports into.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<(Severity, Diagnostic)>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, message: impl Into<String>, range: Option<SourceRange>) {
        self.push(Severity::Error, message.into(), range);
    }

    pub fn tip(&mut self, message: impl Into<String>, range: Option<SourceRange>) {
        self.push(Severity::Tip, message.into(), range);
    }

    fn push(&mut self, severity: Severity, message: String, range: Option<SourceRange>) {
        log::trace!("{severity:?}: {message}");
        self.entries.push((severity, Diagnostic { message, range }));
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.of(Severity::Error)
    }

    pub fn tips(&self) -> impl Iterator<Item = &Diagnostic> {
        self.of(Severity::Tip)
    }

    fn of(&self, severity: Severity) -> impl Iterator<Item = &Diagnostic> {
        self.entries
            .iter()
            .filter(move |(s, _)| *s == severity)
            .map(|(_, d)| d)
    }

    /// Splits into `(errors, tips)`. With `rebase = Some(n)` every range is
    /// shifted by `n`; with `None` ranges are dropped.
    pub fn finish(self, rebase: Option<usize>) -> (Vec<Diagnostic>, Vec<Diagnostic>) {
        let mut errors = Vec::new();
        let mut tips = Vec::new();
        for (severity, mut d) in self.entries {
            d.range = match rebase {
                Some(n) => d.range.map(|r| SourceRange::new(r.start + n, r.end + n)),
                None => None,
            };
            match severity {
                Severity::Error => errors.push(d),
                Severity::Tip => tips.push(d),
            }
        }
        (errors, tips)
    }
}
