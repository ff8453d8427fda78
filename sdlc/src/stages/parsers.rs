//! Parsers for the two free-text stage outputs: multi-file generated code and
//! `---`-separated test cases.

use once_cell::sync::Lazy;
use regex::Regex;

/// File name used when the reply has a fenced block but no file markers.
pub const DEFAULT_CODE_FILENAME: &str = "main.py";

/// Marker line naming a file. The name is a bare identifier with an
/// extension and must be labelled or decorated: `Filename: api.py`,
/// `**File:** api.py`, `### models.py`, `**models.py**`, `` `config.py` ``.
/// A plain `os.path` line is not a marker.
static FILE_MARKER: Lazy<Regex> = Lazy::new(|| {
    let name = r"([A-Za-z_][A-Za-z0-9_-]*(?:\.[A-Za-z0-9]+)+)";
    Regex::new(&format!(
        r"(?i)^\s*(?:{label}|{heading}|{bold}|{code})\s*:?\s*$",
        label = format!(r"(?:#+\s*)?(?:\*\*)?\s*file(?:\s*name)?\s*:\s*(?:\*\*)?\s*`?{name}`?(?:\*\*)?"),
        heading = format!(r"#+\s*(?:\*\*)?`?{name}`?(?:\*\*)?"),
        bold = format!(r"\*\*`?{name}`?\*\*"),
        code = format!(r"`{name}`"),
    ))
    .expect("valid file marker regex")
});

fn marker_name(line: &str) -> Option<String> {
    FILE_MARKER
        .captures(line)
        .and_then(|caps| caps.iter().skip(1).flatten().next().map(|m| m.as_str().to_string()))
}

/// Optional `Code:` label between the marker and the fence.
static CODE_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?:\*\*)?\s*code\s*:\s*(?:\*\*)?\s*$").expect("valid code label regex")
});

/// Test case name line: `Name: x`, `**Test Case Name:** x`, `[Test Case Name]: x`.
static TEST_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?:[#*_\s]*)\[?\s*(?:test\s+case\s+)?name\s*\]?\s*(?:\*\*)?\s*:\s*(?:\*\*)?\s*(.*?)\s*$")
        .expect("valid test name regex")
});

/// One file extracted from the code stage's output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub filename: String,
    pub content: String,
}

fn is_fence(line: &str) -> bool {
    line.trim_start().starts_with("```")
}

/// Body of the fence opening at `lines[start]` and the index of its closing
/// line. An unclosed fence runs to the end of the text.
fn read_fence(lines: &[&str], start: usize) -> (String, usize) {
    let mut end = start + 1;
    while end < lines.len() && lines[end].trim() != "```" {
        end += 1;
    }
    (lines[start + 1..end.min(lines.len())].join("\n"), end)
}

/// Extracts `(filename, content)` pairs from the code stage's output.
///
/// Each file is a marker line followed (after blank lines and an optional
/// `Code:` label) by a fenced block whose body is taken verbatim. When no
/// marker matches, the first fenced block becomes [`DEFAULT_CODE_FILENAME`];
/// with no fence at all the result is empty.
pub fn parse_generated_code(text: &str) -> Vec<GeneratedFile> {
    let lines: Vec<&str> = text.lines().collect();
    let mut files = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        if is_fence(lines[i]) {
            // Unmarked block: its body is code, never a marker.
            let (_, end) = read_fence(&lines, i);
            i = end + 1;
            continue;
        }
        let Some(filename) = marker_name(lines[i]) else {
            i += 1;
            continue;
        };
        let mut j = i + 1;
        while j < lines.len() && (lines[j].trim().is_empty() || CODE_LABEL.is_match(lines[j])) {
            j += 1;
        }
        if j < lines.len() && is_fence(lines[j]) {
            let (content, end) = read_fence(&lines, j);
            files.push(GeneratedFile { filename, content });
            i = end + 1;
        } else {
            i += 1;
        }
    }
    if !files.is_empty() {
        return files;
    }

    match lines.iter().position(|l| is_fence(l)) {
        Some(start) => {
            tracing::debug!(
                filename = DEFAULT_CODE_FILENAME,
                "no file markers in generated code, using first fenced block"
            );
            let (content, _) = read_fence(&lines, start);
            vec![GeneratedFile {
                filename: DEFAULT_CODE_FILENAME.to_string(),
                content,
            }]
        }
        None => {
            tracing::debug!("no fenced block in generated code");
            Vec::new()
        }
    }
}

/// Splits test cases on lines consisting of exactly `---`, with no surrounding
/// whitespace. Blocks are trimmed; empty ones are dropped.
pub fn split_test_cases(text: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in text.lines() {
        if line == "---" {
            blocks.push(current.join("\n"));
            current.clear();
        } else {
            current.push(line);
        }
    }
    blocks.push(current.join("\n"));
    blocks
        .into_iter()
        .map(|b| b.trim().to_string())
        .filter(|b| !b.is_empty())
        .collect()
}

/// Filesystem-safe name for a test case block: the value of its first name
/// line with every character outside `[A-Za-z0-9]` replaced by `_`, or
/// `test_case_{index + 1}` when there is none.
pub fn test_case_file_name(block: &str, index: usize) -> String {
    let name = block.lines().find_map(|line| {
        TEST_NAME
            .captures(line)
            .map(|caps| caps[1].trim_matches(|c| c == '*' || c == '_').trim().to_string())
            .filter(|v| !v.is_empty())
    });
    match name {
        Some(name) => name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect(),
        None => format!("test_case_{}", index + 1),
    }
}
