use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::{BTreeSet, HashSet};

use crate::core::{Result, StringleError};

/// One search/replace pair, literal or regex depending on the run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplacementRule {
    pub pattern: String,
    pub replacement: String,
}

impl ReplacementRule {
    pub fn new(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: replacement.into(),
        }
    }
}

impl<P: Into<String>, R: Into<String>> From<(P, R)> for ReplacementRule {
    fn from((pattern, replacement): (P, R)) -> Self {
        Self::new(pattern, replacement)
    }
}

/// A rule ready to run against file content
#[derive(Debug, Clone)]
enum CompiledRule {
    /// Case-sensitive literal, plain substring scan
    Literal { needle: String, replacement: String },

    /// Case-insensitive literal; replacement is inserted verbatim
    LiteralIgnoreCase { regex: Regex, replacement: String },

    /// Regex with an expansion template
    Regex { regex: Regex, template: String },
}

impl CompiledRule {
    /// Replace every non-overlapping match left to right. `None` when nothing
    /// matched.
    fn apply(&self, content: &str) -> Option<(String, usize)> {
        match self {
            CompiledRule::Literal {
                needle,
                replacement,
            } => {
                let count = content.matches(needle.as_str()).count();
                if count == 0 {
                    return None;
                }
                Some((content.replace(needle.as_str(), replacement), count))
            }
            CompiledRule::LiteralIgnoreCase { regex, replacement } => {
                let mut output = String::with_capacity(content.len());
                let mut last = 0;
                let mut count = 0;

                for mat in regex.find_iter(content) {
                    output.push_str(&content[last..mat.start()]);
                    output.push_str(replacement);
                    last = mat.end();
                    count += 1;
                }

                if count == 0 {
                    return None;
                }
                output.push_str(&content[last..]);
                Some((output, count))
            }
            CompiledRule::Regex { regex, template } => {
                let mut output = String::with_capacity(content.len());
                let mut last = 0;
                let mut count = 0;

                for caps in regex.captures_iter(content) {
                    let Some(mat) = caps.get(0) else { continue };
                    output.push_str(&content[last..mat.start()]);
                    caps.expand(template, &mut output);
                    last = mat.end();
                    count += 1;
                }

                if count == 0 {
                    return None;
                }
                output.push_str(&content[last..]);
                Some((output, count))
            }
        }
    }
}

/// An ordered, validated rule list.
///
/// Built once before traversal, so a bad pattern fails the run before any file
/// is read.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<CompiledRule>,
}

impl RuleSet {
    pub fn compile(rules: &[ReplacementRule], case_sensitive: bool, use_regex: bool) -> Result<Self> {
        check_duplicates(rules)?;

        let compiled = rules
            .iter()
            .map(|rule| compile_rule(rule, case_sensitive, use_regex))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { rules: compiled })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Fold every rule over the content in order; each rule sees the previous
    /// rule's output. Returns the final content and total match count.
    pub fn apply<'a>(&self, content: &'a str) -> (Cow<'a, str>, usize) {
        let mut current: Cow<'a, str> = Cow::Borrowed(content);
        let mut total = 0;

        for rule in &self.rules {
            if let Some((next, count)) = rule.apply(&current) {
                current = Cow::Owned(next);
                total += count;
            }
        }

        (current, total)
    }
}

fn compile_rule(rule: &ReplacementRule, case_sensitive: bool, use_regex: bool) -> Result<CompiledRule> {
    if use_regex {
        let regex = build_regex(&rule.pattern, case_sensitive)?;
        return Ok(CompiledRule::Regex {
            regex,
            template: translate_template(&rule.replacement),
        });
    }

    if rule.pattern.is_empty() {
        return Err(StringleError::InvalidReplacement(
            "search pattern cannot be empty".to_string(),
        ));
    }

    if case_sensitive {
        Ok(CompiledRule::Literal {
            needle: rule.pattern.clone(),
            replacement: rule.replacement.clone(),
        })
    } else {
        Ok(CompiledRule::LiteralIgnoreCase {
            regex: build_regex(&regex::escape(&rule.pattern), false)?,
            replacement: rule.replacement.clone(),
        })
    }
}

fn build_regex(pattern: &str, case_sensitive: bool) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(!case_sensitive)
        .build()
        .map_err(|source| StringleError::InvalidRegex {
            pattern: pattern.to_string(),
            source,
        })
}

fn check_duplicates(rules: &[ReplacementRule]) -> Result<()> {
    let mut seen = HashSet::new();
    let mut duplicates = BTreeSet::new();

    for rule in rules {
        if !seen.insert(rule.pattern.as_str()) {
            duplicates.insert(rule.pattern.clone());
        }
    }

    if duplicates.is_empty() {
        Ok(())
    } else {
        Err(StringleError::DuplicatePattern(duplicates.into_iter().collect()))
    }
}

/// Rewrite `\1` and `\g<name>` backreferences into `${1}` / `${name}`, the
/// only group references a template understands. A bare `$` is literal and
/// becomes `$$`. `\\` is a literal backslash, `\n` and `\t` are control
/// characters, anything else after a backslash is kept as written.
pub fn translate_template(template: &str) -> String {
    let mut output = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' {
            output.push_str("$$");
            continue;
        }
        if c != '\\' {
            output.push(c);
            continue;
        }

        match chars.peek().copied() {
            Some(d) if d.is_ascii_digit() => {
                let mut group = String::new();
                while let Some(&d) = chars.peek() {
                    if !d.is_ascii_digit() {
                        break;
                    }
                    group.push(d);
                    chars.next();
                }
                output.push_str(&format!("${{{}}}", group));
            }
            Some('g') => {
                let rest: String = chars.clone().skip(1).take_while(|&c| c != '>').collect();
                let rest_len = rest.chars().count();
                let well_formed = rest.starts_with('<')
                    && rest_len > 1
                    && chars.clone().skip(1).nth(rest_len) == Some('>');

                if well_formed {
                    output.push_str(&format!("${{{}}}", &rest[1..]));
                    // 'g', '<', name, '>'
                    for _ in 0..rest_len + 2 {
                        chars.next();
                    }
                } else {
                    output.push('\\');
                }
            }
            Some('\\') => {
                chars.next();
                output.push('\\');
            }
            Some('n') => {
                chars.next();
                output.push('\n');
            }
            Some('t') => {
                chars.next();
                output.push('\t');
            }
            _ => output.push('\\'),
        }
    }

    output
}
