//! # Line Mapping
//!
//! Maps logical paths to 1-based line numbers.
//!
//! - [`LineIndex::from_source`] scans the document text as the user wrote
//!   it and records the line each value starts on, whatever the layout.
//! - [`LineIndex::build`] computes lines for the two-space pretty form
//!   produced by [`render_document`]: every scalar and every empty
//!   container takes one line, a non-empty container opens on its own
//!   line, its children follow one per line and its closing bracket takes
//!   a final line.
//!
//! A path that does not exist in the document (a missing required field)
//! resolves to its nearest existing ancestor, which is where the field
//! would have to be added.

use std::collections::HashMap;

use serde_json::Value;
use sfmt_core::LogicalPath;

/// Render a document in the layout [`LineIndex`] describes.
pub fn render_document(document: &Value) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(document)
}

/// Logical path to 1-based line number, for one rendered document.
#[derive(Debug, Clone, Default)]
pub struct LineIndex {
    lines: HashMap<LogicalPath, usize>,
}

impl LineIndex {
    /// Index every value of `document`.
    pub fn build(document: &Value) -> Self {
        let mut index = Self::default();
        index.walk(document, LogicalPath::root(), 1);
        index
    }

    /// Index the values of JSON `text` by the line each one starts on.
    /// Returns `None` if `text` is not a single JSON value.
    pub fn from_source(text: &str) -> Option<Self> {
        let mut scanner = Scanner {
            text,
            pos: 0,
            line: 1,
            index: Self::default(),
        };
        scanner.value(LogicalPath::root())?;
        scanner.skip_whitespace();
        (scanner.pos == text.len()).then_some(scanner.index)
    }

    /// Record `value` starting at `line` and return the number of lines it spans.
    fn walk(&mut self, value: &Value, path: LogicalPath, line: usize) -> usize {
        let mut next = line + 1;
        match value {
            Value::Object(map) if !map.is_empty() => {
                for (key, child) in map {
                    next += self.walk(child, path.key(key), next);
                }
            }
            Value::Array(items) if !items.is_empty() => {
                for (i, child) in items.iter().enumerate() {
                    next += self.walk(child, path.index(i), next);
                }
            }
            _ => {
                self.lines.insert(path, line);
                return 1;
            }
        }
        self.lines.insert(path, line);
        next - line + 1
    }

    /// Line of the value at `path`, or of its nearest existing ancestor.
    pub fn line_of(&self, path: &LogicalPath) -> Option<usize> {
        let mut current = Some(path.clone());
        while let Some(candidate) = current {
            if let Some(line) = self.lines.get(&candidate) {
                return Some(*line);
            }
            current = candidate.parent();
        }
        None
    }

    /// Returns true if `path` exists in the indexed document.
    pub fn contains(&self, path: &LogicalPath) -> bool {
        self.lines.contains_key(path)
    }
}

/// Recursive-descent pass over JSON text that only tracks positions.
struct Scanner<'t> {
    text: &'t str,
    pos: usize,
    line: usize,
    index: LineIndex,
}

impl Scanner<'_> {
    fn peek(&self) -> Option<u8> {
        self.text.as_bytes().get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while let Some(byte) = self.peek() {
            match byte {
                b'\n' => self.line += 1,
                b' ' | b'\t' | b'\r' => {}
                _ => return,
            }
            self.pos += 1;
        }
    }

    fn eat(&mut self, byte: u8) -> Option<()> {
        self.skip_whitespace();
        if self.peek()? != byte {
            return None;
        }
        self.pos += 1;
        Some(())
    }

    fn value(&mut self, path: LogicalPath) -> Option<()> {
        self.skip_whitespace();
        self.index.lines.insert(path.clone(), self.line);
        match self.peek()? {
            b'{' => self.object(&path),
            b'[' => self.array(&path),
            b'"' => self.string().map(|_| ()),
            _ => self.scalar(),
        }
    }

    fn object(&mut self, path: &LogicalPath) -> Option<()> {
        self.eat(b'{')?;
        if self.eat(b'}').is_some() {
            return Some(());
        }
        loop {
            self.skip_whitespace();
            let key = self.string()?;
            self.eat(b':')?;
            self.value(path.key(&key))?;
            self.skip_whitespace();
            match self.peek()? {
                b',' => self.pos += 1,
                b'}' => {
                    self.pos += 1;
                    return Some(());
                }
                _ => return None,
            }
        }
    }

    fn array(&mut self, path: &LogicalPath) -> Option<()> {
        self.eat(b'[')?;
        if self.eat(b']').is_some() {
            return Some(());
        }
        let mut index = 0;
        loop {
            self.value(path.index(index))?;
            index += 1;
            self.skip_whitespace();
            match self.peek()? {
                b',' => self.pos += 1,
                b']' => {
                    self.pos += 1;
                    return Some(());
                }
                _ => return None,
            }
        }
    }

    /// Consume a string literal and return its unescaped content.
    fn string(&mut self) -> Option<String> {
        let start = self.pos;
        if self.peek()? != b'"' {
            return None;
        }
        self.pos += 1;
        loop {
            match self.peek()? {
                b'\\' => self.pos += 2,
                b'"' => break,
                _ => self.pos += 1,
            }
        }
        self.pos += 1;
        serde_json::from_str(self.text.get(start..self.pos)?).ok()
    }

    /// Consume a number, `true`, `false` or `null`.
    fn scalar(&mut self) -> Option<()> {
        let start = self.pos;
        while let Some(byte) = self.peek() {
            if matches!(byte, b',' | b']' | b'}' | b' ' | b'\t' | b'\r' | b'\n') {
                break;
            }
            self.pos += 1;
        }
        let literal = self.text.get(start..self.pos)?;
        serde_json::from_str::<Value>(literal).ok().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn line_text(text: &str, line: usize) -> &str {
        text.lines().nth(line - 1).unwrap().trim()
    }

    #[test]
    fn test_lines_match_pretty_rendering() {
        let document = json!({
            "f1": {
                "TargetCapacity": 5,
                "LaunchSpecifications": [],
                "LaunchTemplateConfigs": [{
                    "Overrides": [
                        {"InstanceType": "c5.large"},
                        {"InstanceType": "m5.large", "SubnetId": ["a", "b"]}
                    ]
                }],
                "Type": "maintain"
            }
        });
        let text = render_document(&document).unwrap();
        let index = LineIndex::build(&document);
        let f1 = LogicalPath::fleet("f1");

        let overrides = f1.key("LaunchTemplateConfigs").index(0).key("Overrides");
        let cases = [
            (LogicalPath::root(), "{"),
            (f1.clone(), "\"f1\": {"),
            (f1.key("TargetCapacity"), "\"TargetCapacity\": 5,"),
            (f1.key("LaunchSpecifications"), "\"LaunchSpecifications\": [],"),
            (overrides.index(1).key("InstanceType"), "\"InstanceType\": \"m5.large\","),
            (overrides.index(1).key("SubnetId").index(1), "\"b\""),
            (f1.key("Type"), "\"Type\": \"maintain\""),
        ];
        for (path, expected) in cases {
            let line = index.line_of(&path).unwrap();
            assert_eq!(line_text(&text, line), expected, "path {path}");
        }
    }

    #[test]
    fn test_source_lines_follow_input_layout() {
        let text = "{\"f1\": {\"TargetCapacity\": \"2\", \"Type\": \"maintain\"}}";
        let index = LineIndex::from_source(text).unwrap();
        let f1 = LogicalPath::fleet("f1");
        assert_eq!(index.line_of(&f1.key("TargetCapacity")), Some(1));
        assert_eq!(index.line_of(&f1.key("Type")), Some(1));

        let text = "{\n  \"f1\": {\n    \"Type\": \"maintain\", \"LaunchTemplateConfigs\": [\n\n      {\"Overrides\": [ {},\n {\"SubnetId\": \"s\"} ]}\n    ],\n    \"a\\\"b\": null\n  }\n}";
        let index = LineIndex::from_source(text).unwrap();
        let groups = f1.key("LaunchTemplateConfigs");
        assert_eq!(index.line_of(&f1), Some(2));
        assert_eq!(index.line_of(&f1.key("Type")), Some(3));
        assert_eq!(index.line_of(&groups), Some(3));
        assert_eq!(index.line_of(&groups.index(0)), Some(5));
        assert_eq!(index.line_of(&groups.index(0).key("Overrides").index(0)), Some(5));
        let second = groups.index(0).key("Overrides").index(1);
        assert_eq!(index.line_of(&second.key("SubnetId")), Some(6));
        assert_eq!(index.line_of(&f1.key("a\"b")), Some(8));
        assert_eq!(index.line_of(&second.key("Priority")), Some(6));
    }

    #[test]
    fn test_source_index_rejects_malformed_text() {
        assert!(LineIndex::from_source("{\"a\": }").is_none());
        assert!(LineIndex::from_source("{} {}").is_none());
        assert!(LineIndex::from_source("[1, 2").is_none());
        assert!(LineIndex::from_source("  7\n").is_some());
    }

    #[test]
    fn test_missing_path_falls_back_to_ancestor() {
        let document = json!({"f1": {"TargetCapacity": 5}});
        let index = LineIndex::build(&document);
        let missing = LogicalPath::fleet("f1").key("IamFleetRole");
        assert!(!index.contains(&missing));
        assert_eq!(index.line_of(&missing), Some(2));
        assert_eq!(index.line_of(&LogicalPath::fleet("nope")), Some(1));
    }

    #[test]
    fn test_scalar_root() {
        let index = LineIndex::build(&json!(3));
        assert_eq!(index.line_of(&LogicalPath::root()), Some(1));
    }
}
