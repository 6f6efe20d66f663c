//! Loading raw token sources into flat, reference-resolved tokens.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;
use walkdir::WalkDir;

use super::CompileError;
use crate::models::Token;

/// `{path.to.token}` inside a string value.
static REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^{}]+)\}").expect("valid regex"));

/// Attribute keys assigned from path positions, in order.
const CTI_KEYS: [&str; 5] = ["category", "type", "item", "subitem", "state"];

/// Loads every `.json`/`.json5` file below `source_dir`, merges them and
/// returns the flattened tokens with references resolved.
///
/// Files are read in file-name order; a later file overrides leaves of an
/// earlier one.
pub fn load_tokens(source_dir: &Path) -> Result<Vec<Token>, CompileError> {
    let mut tree = Value::Object(Map::new());

    for path in source_files(source_dir)? {
        let text = fs::read_to_string(&path).map_err(|source| CompileError::ReadSource {
            path: path.clone(),
            source,
        })?;
        let parsed: Value = json5::from_str(&text).map_err(|e| CompileError::ParseSource {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        debug!("Loaded token source {}", path.display());
        deep_merge(&mut tree, parsed);
    }

    let mut tokens = Vec::new();
    if let Value::Object(root) = &tree {
        flatten(root, &mut Vec::new(), &mut tokens);
    }

    resolve_references(&mut tokens)?;
    Ok(tokens)
}

fn source_files(source_dir: &Path) -> Result<Vec<PathBuf>, CompileError> {
    let mut files = Vec::new();

    for entry in WalkDir::new(source_dir).sort_by_file_name() {
        let entry = entry.map_err(|e| CompileError::ReadSource {
            path: e
                .path()
                .map_or_else(|| source_dir.to_path_buf(), Path::to_path_buf),
            source: e.into(),
        })?;

        let is_source = entry.file_type().is_file()
            && entry
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext == "json" || ext == "json5");

        if is_source {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

fn deep_merge(target: &mut Value, source: Value) {
    match (target, source) {
        (Value::Object(target), Value::Object(source)) => {
            for (key, value) in source {
                match target.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        target.insert(key, value);
                    }
                }
            }
        }
        (target, source) => *target = source,
    }
}

fn string_field<'a>(node: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|key| node.get(*key).and_then(Value::as_str))
}

/// Walks the merged tree. An object with `value` or `$value` is a token;
/// any other object is a group.
fn flatten(node: &Map<String, Value>, path: &mut Vec<String>, out: &mut Vec<Token>) {
    for (key, child) in node {
        let Value::Object(child) = child else {
            continue;
        };
        if key.starts_with('$') {
            continue;
        }

        path.push(key.clone());

        if let Some(value) = child.get("value").or_else(|| child.get("$value")) {
            out.push(make_token(path, value.clone(), child));
        } else {
            flatten(child, path, out);
        }

        path.pop();
    }
}

fn make_token(path: &[String], value: Value, node: &Map<String, Value>) -> Token {
    let mut attributes: BTreeMap<String, Value> = CTI_KEYS
        .iter()
        .zip(path)
        .map(|(key, segment)| ((*key).to_string(), Value::String(segment.clone())))
        .collect();

    if let Some(Value::Object(explicit)) = node.get("attributes") {
        for (key, value) in explicit {
            attributes.insert(key.clone(), value.clone());
        }
    }

    Token {
        name: path.join("-"),
        path: path.to_vec(),
        value,
        token_type: string_field(node, &["type", "$type"]).map(str::to_string),
        attributes: Some(attributes),
        comment: string_field(node, &["comment", "$description"]).map(str::to_string),
    }
}

fn resolve_references(tokens: &mut [Token]) -> Result<(), CompileError> {
    let index: HashMap<String, Value> = tokens
        .iter()
        .map(|token| (token.path.join("."), token.value.clone()))
        .collect();

    for token in tokens.iter_mut() {
        let owner = token.path.join(".");
        let mut stack = vec![owner.clone()];
        token.value = resolve_value(&token.value, &index, &owner, &mut stack)?;
    }

    Ok(())
}

fn lookup<'a>(index: &'a HashMap<String, Value>, reference: &str) -> Option<(&'a Value, String)> {
    let reference = reference.trim();
    if let Some(value) = index.get(reference) {
        return Some((value, reference.to_string()));
    }
    let stripped = reference.strip_suffix(".value")?;
    index.get(stripped).map(|value| (value, stripped.to_string()))
}

fn resolve_reference(
    reference: &str,
    index: &HashMap<String, Value>,
    owner: &str,
    stack: &mut Vec<String>,
) -> Result<Value, CompileError> {
    let (target, key) = lookup(index, reference).ok_or_else(|| CompileError::UnresolvedReference {
        token: owner.to_string(),
        reference: reference.to_string(),
    })?;

    if stack.contains(&key) {
        return Err(CompileError::CircularReference {
            token: owner.to_string(),
        });
    }

    stack.push(key);
    let resolved = resolve_value(target, index, owner, stack);
    stack.pop();
    resolved
}

fn resolve_value(
    value: &Value,
    index: &HashMap<String, Value>,
    owner: &str,
    stack: &mut Vec<String>,
) -> Result<Value, CompileError> {
    match value {
        Value::String(text) => {
            // A value that is exactly one reference takes the referenced
            // value as-is, keeping numbers and objects intact.
            if let Some(caps) = REFERENCE.captures(text) {
                if caps.get(0).is_some_and(|m| m.as_str().len() == text.len()) {
                    return resolve_reference(&caps[1], index, owner, stack);
                }
            } else {
                return Ok(value.clone());
            }

            let mut out = String::with_capacity(text.len());
            let mut last = 0;
            for caps in REFERENCE.captures_iter(text) {
                let Some(whole) = caps.get(0) else { continue };
                out.push_str(&text[last..whole.start()]);
                match resolve_reference(&caps[1], index, owner, stack)? {
                    Value::String(s) => out.push_str(&s),
                    other => out.push_str(&other.to_string()),
                }
                last = whole.end();
            }
            out.push_str(&text[last..]);
            Ok(Value::String(out))
        }
        Value::Array(items) => items
            .iter()
            .map(|item| resolve_value(item, index, owner, stack))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Value::Object(fields) => {
            let mut resolved = Map::new();
            for (key, field) in fields {
                resolved.insert(key.clone(), resolve_value(field, index, owner, stack)?);
            }
            Ok(Value::Object(resolved))
        }
        other => Ok(other.clone()),
    }
}
