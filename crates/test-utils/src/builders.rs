#![allow(dead_code)]

/// Builder for rule-file text to simplify test setup.
///
/// ```
/// use dmake_test_utils::builders::RuleFileBuilder;
///
/// let text = RuleFileBuilder::new()
///     .rule("all", &["lib"], Some("echo all"))
///     .rule("lib", &[], Some("echo lib"))
///     .build();
/// assert!(text.starts_with("all: lib\n\techo all\n"));
/// ```
pub struct RuleFileBuilder {
    lines: Vec<String>,
}

impl RuleFileBuilder {
    pub fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Append a `target: deps` declaration plus an optional tab-indented
    /// command line.
    pub fn rule(mut self, target: &str, deps: &[&str], command: Option<&str>) -> Self {
        self.lines.push(format!("{target}: {}", deps.join(" ")));
        if let Some(command) = command {
            self.lines.push(format!("\t{command}"));
        }
        self
    }

    pub fn comment(mut self, text: &str) -> Self {
        self.lines.push(format!("# {text}"));
        self
    }

    pub fn blank_line(mut self) -> Self {
        self.lines.push(String::new());
        self
    }

    pub fn build(self) -> String {
        let mut text = self.lines.join("\n");
        text.push('\n');
        text
    }
}

impl Default for RuleFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}
