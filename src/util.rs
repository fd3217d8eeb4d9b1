/// Wraps a value in single quotes for inclusion in a remote shell command
/// line. ssh always hands the remote side a shell string, so every
/// interpolated value goes through here; embedded single quotes become the
/// `'\''` dance.
pub fn sh_quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for ch in value.chars() {
        if ch == '\'' {
            quoted.push_str("'\\''");
        } else {
            quoted.push(ch);
        }
    }
    quoted.push('\'');
    quoted
}
