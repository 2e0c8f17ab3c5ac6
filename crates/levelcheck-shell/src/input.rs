//! Input sources (§9 design note: "a readline-based loop becomes a thin
//! trait over an input source"). One line in, `Option<String>` out; `None`
//! means end of input.

use std::io::{self, BufRead, Write};

pub trait InputSource {
    /// Read the next line, prompting with `prompt` when the source is
    /// interactive. Returns `None` at end of input.
    fn next_line(&mut self, prompt: &str) -> Option<String>;
}

/// Reads from stdin, echoing `prompt` first. No line-editing or history of
/// its own; a CLI that wants readline-style editing wraps this with a crate
/// of its own choosing and only needs to satisfy [`InputSource`].
pub struct TerminalInput<R, W> {
    reader: io::BufReader<R>,
    writer: W,
}

impl<R: io::Read, W: Write> TerminalInput<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader: io::BufReader::new(reader), writer }
    }
}

impl<R: io::Read, W: Write> InputSource for TerminalInput<R, W> {
    fn next_line(&mut self, prompt: &str) -> Option<String> {
        let _ = write!(self.writer, "{prompt}");
        let _ = self.writer.flush();
        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim_end_matches(['\n', '\r']).to_string()),
            Err(_) => None,
        }
    }
}

/// Lines already read from a `source`d file, replayed in order. Never
/// prompts (a sourced script is non-interactive).
pub struct FileInput {
    lines: Vec<String>,
    index: usize,
}

impl FileInput {
    pub fn new(contents: &str) -> Self {
        Self { lines: contents.lines().map(str::to_string).collect(), index: 0 }
    }
}

impl InputSource for FileInput {
    fn next_line(&mut self, _prompt: &str) -> Option<String> {
        let line = self.lines.get(self.index)?.clone();
        self.index += 1;
        Some(line)
    }
}

/// A fixed script of lines, for tests driving [`crate::shell::Shell`]
/// without a real terminal or filesystem.
#[derive(Debug, Default)]
pub struct ScriptedInput {
    lines: Vec<String>,
    index: usize,
}

impl ScriptedInput {
    pub fn new(lines: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self { lines: lines.into_iter().map(Into::into).collect(), index: 0 }
    }
}

impl InputSource for ScriptedInput {
    fn next_line(&mut self, _prompt: &str) -> Option<String> {
        let line = self.lines.get(self.index)?.clone();
        self.index += 1;
        Some(line)
    }
}

/// The active input stack: the top-level source plus any `source`d files
/// pushed on top of it. `source foo.cmd` pushes a [`FileInput`]; reaching
/// its end pops back to whatever was underneath, matching the original
/// tool's nested-script behavior.
pub struct InputStack {
    top: Box<dyn InputSource>,
    sourced: Vec<FileInput>,
}

impl InputStack {
    pub fn new(top: Box<dyn InputSource>) -> Self {
        Self { top, sourced: Vec::new() }
    }

    pub fn push_source(&mut self, contents: &str) {
        self.sourced.push(FileInput::new(contents));
    }

    pub fn depth(&self) -> usize {
        self.sourced.len()
    }

    /// Read the next line, popping exhausted sourced files until either a
    /// line is produced or the whole stack (including `top`) is exhausted.
    pub fn next_line(&mut self, prompt: &str) -> Option<String> {
        loop {
            if let Some(file) = self.sourced.last_mut() {
                match file.next_line(prompt) {
                    Some(line) => return Some(line),
                    None => {
                        self.sourced.pop();
                        continue;
                    }
                }
            }
            return self.top.next_line(prompt);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_input_replays_lines_then_ends() {
        let mut input = ScriptedInput::new(["pwd", "quit"]);
        assert_eq!(input.next_line("> "), Some("pwd".to_string()));
        assert_eq!(input.next_line("> "), Some("quit".to_string()));
        assert_eq!(input.next_line("> "), None);
    }

    #[test]
    fn input_stack_pops_back_after_sourced_file_ends() {
        let mut stack = InputStack::new(Box::new(ScriptedInput::new(["after"])));
        stack.push_source("one\ntwo\n");
        assert_eq!(stack.next_line("> "), Some("one".to_string()));
        assert_eq!(stack.next_line("> "), Some("two".to_string()));
        assert_eq!(stack.next_line("> "), Some("after".to_string()));
        assert_eq!(stack.next_line("> "), None);
    }

    #[test]
    fn nested_source_unwinds_in_stack_order() {
        let mut stack = InputStack::new(Box::new(ScriptedInput::new(["outer-done"])));
        stack.push_source("a\n");
        stack.push_source("b\n");
        assert_eq!(stack.depth(), 2);
        assert_eq!(stack.next_line("> "), Some("b".to_string()));
        assert_eq!(stack.next_line("> "), Some("a".to_string()));
        assert_eq!(stack.next_line("> "), Some("outer-done".to_string()));
    }
}
