//! Template rendering: placeholder substitution and define injection.

use indexmap::IndexMap;
use serde_json::Value;

/// Replace every occurrence of `placeholder` with the entry's import path.
pub fn substitute(html: &str, placeholder: &str, import_path: &str) -> String {
    html.replace(placeholder, import_path)
}

/// JavaScript source for a define value.
///
/// Strings are already expressions (`"\"prod\""`, `"process.env.X"`);
/// everything else is emitted as a JSON literal.
pub fn js_literal(value: &Value) -> String {
    match value {
        Value::String(source) => source.clone(),
        other => other.to_string(),
    }
}

/// A `<script>` assigning each define as a global, or `None` when there is
/// nothing to assign.
///
/// Dotted names (`process.env.API`) create the intermediate objects they
/// need. `import.meta.*` only exists inside modules, so those defines are
/// left to the bundler.
pub fn define_script(define: &IndexMap<String, Value>) -> Option<String> {
    let body: String = define
        .iter()
        .filter_map(|(name, value)| define_assignment(name, value))
        .collect();
    if body.is_empty() {
        return None;
    }
    Some(format!("<script>\n{body}</script>\n"))
}

fn define_assignment(name: &str, value: &Value) -> Option<String> {
    let segments: Vec<&str> = name.split('.').collect();
    if segments.iter().any(|segment| segment.is_empty())
        || segments.starts_with(&["import", "meta"])
    {
        tracing::debug!(define = %name, "define not injectable in dev, skipped");
        return None;
    }

    let (last, parents) = segments.split_last()?;
    let mut path = String::from("globalThis");
    let mut out = String::new();
    for segment in parents {
        path.push_str(&property(segment));
        out.push_str(&format!("{path} = {path} || {{}};\n"));
    }
    path.push_str(&property(last));
    out.push_str(&format!("{path} = {};\n", js_literal(value)));
    Some(out)
}

/// `.name` for identifiers, `["name"]` otherwise.
fn property(segment: &str) -> String {
    let mut chars = segment.chars();
    let identifier = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
    if identifier {
        format!(".{segment}")
    } else {
        format!("[{}]", Value::String(segment.to_string()))
    }
}

/// Insert `script` before `</head>`, else before `<body`, else at the start.
pub fn inject_script(html: &str, script: &str) -> String {
    let lower = html.to_ascii_lowercase();
    let at = lower
        .find("</head>")
        .or_else(|| lower.find("<body"))
        .unwrap_or(0);

    let mut out = String::with_capacity(html.len() + script.len());
    out.push_str(&html[..at]);
    out.push_str(script);
    out.push_str(&html[at..]);
    out
}

/// Full dev-time rendering of a page template.
pub fn render_page(
    template: &str,
    placeholder: &str,
    import_path: &str,
    define: &IndexMap<String, Value>,
) -> String {
    let html = substitute(template, placeholder, import_path);
    match define_script(define) {
        Some(script) => inject_script(&html, &script),
        None => html,
    }
}
