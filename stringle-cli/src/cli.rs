use crate::core::{Result, StringleError};
use crate::replace::ReplacementRule;

/// Parse `search:replace` arguments. The first colon not preceded by a
/// backslash separates the halves; `\:` stands for a literal colon on either
/// side. Other backslashes pass through so regex escapes survive.
pub fn parse_replacements<S: AsRef<str>>(args: &[S]) -> Result<Vec<ReplacementRule>> {
    args.iter().map(|arg| parse_replacement(arg.as_ref())).collect()
}

pub fn parse_replacement(arg: &str) -> Result<ReplacementRule> {
    let mut search = String::new();
    let mut replace = String::new();
    let mut in_replace = false;
    let mut chars = arg.chars().peekable();

    while let Some(c) = chars.next() {
        let target = if in_replace { &mut replace } else { &mut search };

        match c {
            '\\' if chars.peek() == Some(&':') => {
                chars.next();
                target.push(':');
            }
            ':' if !in_replace => in_replace = true,
            _ => target.push(c),
        }
    }

    if !in_replace {
        return Err(StringleError::InvalidReplacement(format!(
            "{}. Expected 'search:replace'",
            arg
        )));
    }

    Ok(ReplacementRule::new(search, replace))
}
