//! Minimal embedded HTML rendering: a page shell with a `{{content}}`
//! placeholder, filled with either the signup form or an outcome message.

const SHELL: &str = include_str!("../../pages/shell.html");
const FORM: &str = include_str!("../../pages/form.html");
const POLICY: &str = include_str!("../../pages/policy.html");

pub fn landing() -> String {
    SHELL.replace("{{content}}", FORM)
}

pub fn notice(message: &str) -> String {
    SHELL.replace(
        "{{content}}",
        &format!("<p class=\"notice\">{}</p>", escape(message)),
    )
}

pub fn error(message: &str) -> String {
    SHELL.replace(
        "{{content}}",
        &format!("<p class=\"error\">{}</p>", escape(message)),
    )
}

pub fn policy() -> String {
    SHELL.replace("{{content}}", POLICY)
}

/// Outcome messages embed user-supplied strings (emails, tokens), so they
/// are escaped before landing in markup.
fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
