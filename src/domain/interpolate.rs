//! Placeholder interpolation for secrets and per-run values
//!
//! Expands `${NAME}` and `$NAME` against a two-tier lookup: a caller-supplied
//! override map (used only when the value is non-empty), then an [`EnvLookup`]
//! accessor, normally the process environment. `$$` produces a literal `$`.

use std::collections::HashMap;

/// Read access to environment-style variables
pub trait EnvLookup {
    fn lookup(&self, name: &str) -> Option<String>;
}

/// The real process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvLookup for ProcessEnv {
    fn lookup(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl EnvLookup for HashMap<String, String> {
    fn lookup(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Expands placeholders using an override map layered over an [`EnvLookup`]
pub struct Interpolator<'a> {
    overrides: &'a HashMap<String, String>,
    env: &'a dyn EnvLookup,
}

impl<'a> Interpolator<'a> {
    pub fn new(overrides: &'a HashMap<String, String>, env: &'a dyn EnvLookup) -> Self {
        Self { overrides, env }
    }

    /// Resolve a single variable name
    pub fn value_of(&self, name: &str) -> String {
        if name == "$" {
            return "$".to_string();
        }
        match self.overrides.get(name) {
            Some(value) if !value.is_empty() => value.clone(),
            _ => self.env.lookup(name).unwrap_or_default(),
        }
    }

    /// Expand every placeholder in `input`
    pub fn expand(&self, input: &str) -> String {
        let bytes = input.as_bytes();
        let mut out = String::with_capacity(input.len());
        // Start of the pending literal run
        let mut literal = 0;
        let mut i = 0;

        while i < bytes.len() {
            if bytes[i] == b'$' && i + 1 < bytes.len() {
                out.push_str(&input[literal..i]);
                let (name, width) = shell_name(&input[i + 1..]);
                match name {
                    Some(name) => out.push_str(&self.value_of(name)),
                    // `$` not followed by a name stays as-is
                    None if width == 0 => out.push('$'),
                    // Invalid syntax such as `${}`: the characters are dropped
                    None => {}
                }
                i += width + 1;
                literal = i;
            } else {
                i += 1;
            }
        }

        out.push_str(&input[literal..]);
        out
    }

    /// Expand each element, preserving order and length
    pub fn expand_all(&self, inputs: &[String]) -> Vec<String> {
        inputs.iter().map(|s| self.expand(s)).collect()
    }
}

fn is_special(b: u8) -> bool {
    matches!(b, b'*' | b'#' | b'$' | b'@' | b'!' | b'?' | b'-') || b.is_ascii_digit()
}

fn is_name_byte(b: u8) -> bool {
    b == b'_' || b.is_ascii_alphanumeric()
}

/// Parse the variable name following a `$`.
///
/// Returns the name (if any) and how many bytes after the `$` it consumed.
fn shell_name(s: &str) -> (Option<&str>, usize) {
    let bytes = s.as_bytes();

    if bytes[0] == b'{' {
        if bytes.len() > 2 && is_special(bytes[1]) && bytes[2] == b'}' {
            return (Some(&s[1..2]), 3);
        }
        return match s[1..].find('}') {
            // `${}`
            Some(0) => (None, 2),
            Some(end) => (Some(&s[1..end + 1]), end + 2),
            // Unterminated `${`
            None => (None, 1),
        };
    }

    if is_special(bytes[0]) {
        return (Some(&s[0..1]), 1);
    }

    let len = bytes.iter().take_while(|b| is_name_byte(**b)).count();
    if len == 0 {
        (None, 0)
    } else {
        (Some(&s[..len]), len)
    }
}
