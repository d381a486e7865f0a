//! Rendering of bound values for the command line.

use crate::store::ValueStore;
use crate::value::Value;

/// Single-quote a string for the shell. An embedded `'` becomes `'\''`.
fn quote_shell_value(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for c in value.chars() {
        match c {
            '\'' => quoted.push_str("'\\''"),
            _ => quoted.push(c),
        }
    }
    quoted.push('\'');
    quoted
}

/// Build a valid shell variable name from the prefix and a slot name.
fn to_shell_var_name(prefix: &str, name: &str) -> String {
    let mut var: String = prefix
        .chars()
        .chain(name.to_uppercase().chars())
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if var.is_empty() || var.starts_with(|c: char| c.is_ascii_digit()) {
        var.insert(0, '_');
    }
    var
}

/// Text of a value as the shell should see it. An unset char is empty.
fn env_text(value: &Value) -> String {
    match value {
        Value::Char('\0') => String::new(),
        other => other.to_string(),
    }
}

/// Render the store as a pretty-printed JSON object, in declaration order.
pub fn render_json(store: &ValueStore) -> serde_json::Result<String> {
    serde_json::to_string_pretty(store)
}

/// Render one `export PREFIX_NAME='value'` line per slot.
pub fn render_env(store: &ValueStore, prefix: &str) -> String {
    store
        .iter()
        .map(|(name, value)| {
            format!(
                "export {}={}\n",
                to_shell_var_name(prefix, name),
                quote_shell_value(&env_text(value))
            )
        })
        .collect()
}
