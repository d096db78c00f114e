use crate::error::{FlowError, Result};
use regex::Regex;

/// One grouped network's selection pattern, compiled per consumed prefix
/// length so partial input can be judged without guessing continuations.
#[derive(Debug, Clone)]
struct SelectionPattern {
    code: String,
    /// Matcher for the first `k` pattern positions, `k` in `1..=len`. The
    /// last entry is end-open and accepts any longer input.
    prefixes: Vec<Regex>,
    len: usize,
}

impl SelectionPattern {
    /// A pattern stays consistent with the typed digits as long as every
    /// position typed so far matches; digits beyond the pattern length only
    /// need the full pattern to match at the start.
    fn consistent_with(&self, digits: &str) -> bool {
        let consumed = digits.len().min(self.len);
        self.prefixes[consumed - 1].is_match(digits)
    }
}

/// Progressive disambiguation of structurally-identical grouped networks
/// ("SmartSwitch").
///
/// Patterns are start-anchored expressions over digits-only input, restricted
/// to digit literals and `[a-b]` character classes so each token consumes
/// exactly one input position. On every keystroke the selection set is
/// narrowed to the networks whose pattern can still match the normalized
/// input; a single survivor becomes the active network. Structural equality
/// of the grouped networks' input elements is enforced earlier, at
/// model-build time.
#[derive(Debug, Clone, Default)]
pub struct NetworkDisambiguator {
    patterns: Vec<SelectionPattern>,
    selection: Vec<usize>,
    has_input: bool,
}

impl NetworkDisambiguator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the selection pattern for one grouped network. A malformed
    /// or unsupported pattern is a configuration error; detecting it here
    /// keeps `evaluate` infallible.
    pub fn add_selection_pattern(&mut self, code: &str, pattern: &str) -> Result<()> {
        let tokens = tokenize(code, pattern)?;
        let mut prefixes = Vec::with_capacity(tokens.len());
        for consumed in 1..=tokens.len() {
            let mut source = String::from("^");
            for token in &tokens[..consumed] {
                source.push_str(token);
            }
            if consumed < tokens.len() {
                source.push('$');
            }
            let regex = Regex::new(&source).map_err(|e| {
                FlowError::Configuration(format!("invalid selection pattern for {code}: {e}"))
            })?;
            prefixes.push(regex);
        }
        self.patterns.push(SelectionPattern {
            code: code.to_string(),
            len: tokens.len(),
            prefixes,
        });
        self.reset();
        Ok(())
    }

    /// Re-evaluates the selection set against the current input value.
    /// Returns whether the set changed, so callers know to update
    /// presentation.
    pub fn evaluate(&mut self, input: &str) -> bool {
        let digits: String = input.chars().filter(|c| c.is_ascii_digit()).collect();
        self.has_input = !digits.is_empty();
        let next: Vec<usize> = if digits.is_empty() {
            (0..self.patterns.len()).collect()
        } else {
            self.patterns
                .iter()
                .enumerate()
                .filter(|(_, pattern)| pattern.consistent_with(&digits))
                .map(|(index, _)| index)
                .collect()
        };
        let changed = next != self.selection;
        if changed {
            log::debug!(
                "smart switch narrowed to {:?}",
                next.iter().map(|&i| &self.patterns[i].code).collect::<Vec<_>>()
            );
        }
        self.selection = next;
        changed
    }

    /// The network the form currently stands for: the single survivor once
    /// the input determines one, the group's first network while nothing is
    /// typed or several still match, `None` when no pattern can match the
    /// input anymore (undetermined; submission must be blocked).
    pub fn active_network(&self) -> Option<&str> {
        let first = self.patterns.first().map(|p| p.code.as_str())?;
        if !self.has_input {
            return Some(first);
        }
        match self.selection.as_slice() {
            [] => None,
            [single] => Some(&self.patterns[*single].code),
            _ => Some(first),
        }
    }

    /// Exactly one network is consistent with non-empty input.
    pub fn is_determined(&self) -> bool {
        self.has_input && self.selection.len() == 1
    }

    /// Restores the full eligible set, regardless of prior input.
    pub fn reset(&mut self) {
        self.selection = (0..self.patterns.len()).collect();
        self.has_input = false;
    }

    pub fn selected_codes(&self) -> impl Iterator<Item = &str> {
        self.selection.iter().map(|&i| self.patterns[i].code.as_str())
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Splits a pattern into one-position tokens: a digit literal or a `[...]`
/// character class. A leading `^` is accepted and dropped, the anchor is
/// implied.
fn tokenize(code: &str, pattern: &str) -> Result<Vec<String>> {
    let trimmed = pattern.strip_prefix('^').unwrap_or(pattern);
    let mut tokens = Vec::new();
    let mut chars = trimmed.chars();
    while let Some(c) = chars.next() {
        match c {
            '0'..='9' => tokens.push(c.to_string()),
            '[' => {
                let mut class = String::from("[");
                let mut closed = false;
                for inner in chars.by_ref() {
                    class.push(inner);
                    if inner == ']' {
                        closed = true;
                        break;
                    }
                }
                if !closed {
                    return Err(FlowError::Configuration(format!(
                        "unterminated character class in selection pattern for {code}"
                    )));
                }
                tokens.push(class);
            }
            _ => {
                return Err(FlowError::Configuration(format!(
                    "unsupported token '{c}' in selection pattern for {code}"
                )));
            }
        }
    }
    if tokens.is_empty() {
        return Err(FlowError::Configuration(format!(
            "empty selection pattern for {code}"
        )));
    }
    Ok(tokens)
}
