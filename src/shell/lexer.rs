//! Shell-like tokenization of model-proposed command lines.
//!
//! Quote-aware, whitespace-separated, and runs of shell punctuation are
//! emitted as their own tokens so that `ls>out` and `ls > out` tokenize the
//! same way and the validator sees the operator either way. The lexer makes
//! no judgement about which tokens are allowed; that is the validator's job.

/// Characters that terminate a word and form operator tokens. Consecutive
/// punctuation characters group into a single token (`>>`, `&&`, `>&`).
const PUNCTUATION: &[char] = &['|', '&', '>', '<', ';', '(', ')'];

/// Strip the backtick fencing models like to wrap commands in, plus
/// surrounding whitespace. `` `ls -la` `` lexes identically to `ls -la`.
pub fn strip_backticks(raw: &str) -> &str {
    raw.trim().trim_matches('`').trim()
}

/// Tokenize one command line.
///
/// Single and double quotes group characters (including whitespace and
/// punctuation) into the surrounding token; the quotes themselves are
/// dropped. An unterminated quote runs to the end of the line.
pub fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '\'' | '"' => loop {
                match chars.next() {
                    Some(c) if c == ch => break,
                    Some(c) => current.push(c),
                    None => break,
                }
            },
            c if c.is_whitespace() => flush(&mut tokens, &mut current),
            c if PUNCTUATION.contains(&c) => {
                flush(&mut tokens, &mut current);
                let mut operator = String::from(c);
                while let Some(&next) = chars.peek() {
                    if PUNCTUATION.contains(&next) {
                        operator.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(operator);
            }
            c => current.push(c),
        }
    }
    flush(&mut tokens, &mut current);
    tokens
}

fn flush(tokens: &mut Vec<String>, current: &mut String) {
    if !current.is_empty() {
        tokens.push(std::mem::take(current));
    }
}
