//! Leveled buffer of pending JavaScript statements.
//!
//! The base level collects top-level page code. Each handler invocation pushes
//! a fresh level so only the code it emits is shipped back to the browser.

use std::collections::HashMap;
use std::fmt;

use uuid::Uuid;

/// Opaque token keying a statement so later calls merge into it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChainId(String);

impl ChainId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }
}

impl Default for ChainId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One frame of output: ordered statements, some of them keyed.
#[derive(Debug, Default, Clone)]
pub struct Level {
    statements: Vec<String>,
    keyed: HashMap<ChainId, usize>,
}

impl Level {
    fn emit(&mut self, statement: &str, chain: Option<&ChainId>) {
        let Some(chain) = chain else {
            self.statements.push(statement.to_string());
            return;
        };

        match self.keyed.get(chain) {
            Some(&idx) => {
                let existing = &mut self.statements[idx];
                let trimmed = existing.trim_end_matches(';').len();
                existing.truncate(trimmed);
                existing.push_str(statement);
            }
            None => {
                self.keyed.insert(chain.clone(), self.statements.len());
                self.statements.push(statement.to_string());
            }
        }
    }

    fn chained(&self, chain: &ChainId) -> &str {
        self.keyed
            .get(chain)
            .map(|&idx| self.statements[idx].as_str())
            .unwrap_or("")
    }

    fn clear(&mut self) {
        self.statements.clear();
        self.keyed.clear();
    }

    pub fn statements(&self) -> &[String] {
        &self.statements
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct CodeBufferStack {
    base: Level,
    levels: Vec<Level>,
}

impl CodeBufferStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new level; it becomes the active one.
    pub fn push(&mut self) {
        self.levels.push(Level::default());
    }

    /// Discard the active level. Popping with no levels is a no-op.
    pub fn pop(&mut self) {
        self.levels.pop();
    }

    /// Empty the active level without changing the depth. Does nothing to
    /// the base level.
    pub fn clear(&mut self) {
        if let Some(level) = self.levels.last_mut() {
            level.clear();
        }
    }

    pub fn is_buffering(&self) -> bool {
        !self.levels.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    pub fn emit(&mut self, statement: &str, chain: Option<&ChainId>) {
        self.active_mut().emit(statement, chain);
    }

    /// The keyed statement in the active level, or `""`.
    pub fn get_chained(&self, chain: &ChainId) -> &str {
        self.active().chained(chain)
    }

    pub fn active(&self) -> &Level {
        self.levels.last().unwrap_or(&self.base)
    }

    fn active_mut(&mut self) -> &mut Level {
        match self.levels.last_mut() {
            Some(level) => level,
            None => &mut self.base,
        }
    }

    /// Render the active level wrapped in a self-invoking function that
    /// receives jQuery as `jq`.
    pub fn render(&self) -> String {
        self.render_with_preamble(None)
    }

    /// Like [`render`](Self::render) with an extra first statement.
    pub fn render_with_preamble(&self, preamble: Option<&str>) -> String {
        let mut body = String::new();
        if let Some(preamble) = preamble {
            body.push_str(preamble);
            body.push_str("\n  ");
        }
        body.push_str(&self.active().statements.join("\n  "));

        format!("(function(jq) {{\n  {body}\n}})(jQuery);\n")
    }
}
