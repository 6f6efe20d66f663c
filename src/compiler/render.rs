//! Minimal renderers for each output format.

use serde_json::{Map, Value};

use crate::models::{Renderer, Token, TransformGroup};

const HEADER: &str = "Do not edit directly, this file was auto-generated.";

/// Output name of a token for a transform group.
pub fn token_name(group: TransformGroup, path: &[String]) -> String {
    let words: Vec<String> = path
        .iter()
        .flat_map(|segment| split_words(segment))
        .collect();

    match group {
        TransformGroup::Web => words.join("-"),
        TransformGroup::Android => words.join("_"),
        TransformGroup::Ios => words.iter().map(|w| capitalize(w)).collect(),
    }
}

/// Splits a path segment on separators and lower/upper case boundaries,
/// lowercasing every word.
fn split_words(segment: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for c in segment.chars() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_lowercase() || c.is_ascii_digit();
        current.extend(c.to_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn flat_map(group: TransformGroup, tokens: &[&Token]) -> Map<String, Value> {
    tokens
        .iter()
        .map(|token| (token_name(group, &token.path), token.value.clone()))
        .collect()
}

fn variables(prefix: &str, group: TransformGroup, tokens: &[&Token]) -> String {
    tokens
        .iter()
        .map(|token| {
            let comment = token
                .comment
                .as_ref()
                .map(|c| format!(" /* {c} */"))
                .unwrap_or_default();
            format!(
                "{prefix}{}: {};{comment}\n",
                token_name(group, &token.path),
                token.value_string()
            )
        })
        .collect()
}

/// Renders the contents of one output file.
pub fn render(renderer: Renderer, group: TransformGroup, tokens: &[&Token]) -> String {
    match renderer {
        Renderer::CssVariables => {
            let body: String = variables("--", group, tokens)
                .lines()
                .map(|line| format!("  {line}\n"))
                .collect();
            format!("/**\n * {HEADER}\n */\n\n:root {{\n{body}}}\n")
        }
        Renderer::ScssVariables => {
            format!("// {HEADER}\n\n{}", variables("$", group, tokens))
        }
        Renderer::JavascriptModuleFlat => {
            let object = Value::Object(flat_map(group, tokens));
            let body = serde_json::to_string_pretty(&object).unwrap_or_else(|_| "{}".to_string());
            format!("/**\n * {HEADER}\n */\n\nmodule.exports = {body};\n")
        }
        Renderer::JsonFlat => {
            let object = Value::Object(flat_map(group, tokens));
            let body = serde_json::to_string_pretty(&object).unwrap_or_else(|_| "{}".to_string());
            format!("{body}\n")
        }
        Renderer::AndroidStrings | Renderer::AndroidColors => {
            let tag = if renderer == Renderer::AndroidColors {
                "color"
            } else {
                "string"
            };
            let body: String = tokens
                .iter()
                .map(|token| {
                    format!(
                        "  <{tag} name=\"{}\">{}</{tag}>\n",
                        token_name(group, &token.path),
                        escape_xml(&token.value_string())
                    )
                })
                .collect();
            format!(
                "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!--\n  {HEADER}\n-->\n<resources>\n{body}</resources>\n"
            )
        }
        Renderer::IosMacros => {
            let body: String = tokens
                .iter()
                .map(|token| {
                    let value = match &token.value {
                        Value::String(s) => format!("@\"{}\"", s.replace('"', "\\\"")),
                        other => other.to_string(),
                    };
                    format!("#define {} {value}\n", token_name(group, &token.path))
                })
                .collect();
            format!("// {HEADER}\n\n#import <Foundation/Foundation.h>\n\n{body}")
        }
    }
}
