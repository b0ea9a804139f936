//! Nuxt data extraction parser.
//!
//! Nuxt 3 serializes page state into `<script id="__NUXT_DATA__">` using the
//! devalue format: a flat JSON array where index 0 is the root and every
//! object field or array item is an index into that array. Typed values are
//! tagged arrays such as `["Reactive", 3]` or `["Date", "2024-01-01"]`.
//!
//! Nuxt 2 assigns `window.__NUXT__` in an inline script instead. Only the
//! plain-JSON form of that assignment is readable without a JS engine; the
//! browser renderer captures the live object for the rest.

use lazy_static::lazy_static;
use scraper::{Html, Selector};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};

const WINDOW_ASSIGNMENT: &str = "window.__NUXT__";

const MAX_REVIVE_DEPTH: usize = 64;

/// Upper bound on values produced from one payload.
const MAX_REVIVED_NODES: usize = 100_000;

lazy_static! {
    static ref NUXT_DATA: Selector =
        Selector::parse(r#"script[id="__NUXT_DATA__"]"#).expect("Invalid __NUXT_DATA__ selector");
    static ref INLINE_SCRIPT: Selector =
        Selector::parse("script:not([src])").expect("Invalid inline script selector");
}

/// Parse and revive the `__NUXT_DATA__` payload of a rendered page.
pub fn extract_nuxt_payload(document: &Html) -> Option<Value> {
    let element = document.select(&NUXT_DATA).next()?;
    let json_text = element.text().collect::<String>();
    let payload: Value = serde_json::from_str(json_text.trim()).ok()?;

    match payload {
        Value::Array(items) if !items.is_empty() => Some(revive(&items)),
        Value::Array(_) => None,
        other => Some(other),
    }
}

/// Read a `window.__NUXT__ = {...}` assignment whose right-hand side is JSON.
pub fn extract_nuxt_window_state(document: &Html) -> Option<Value> {
    document.select(&INLINE_SCRIPT).find_map(|script| {
        let text = script.text().collect::<String>();
        let start = text.find(WINDOW_ASSIGNMENT)? + WINDOW_ASSIGNMENT.len();
        let rest = text[start..].trim_start().strip_prefix('=')?;
        serde_json::Deserializer::from_str(rest)
            .into_iter::<Value>()
            .next()?
            .ok()
    })
}

/// Revives a devalue payload with every slot rebuilt at most once.
///
/// Back-references to a slot that is still being rebuilt (cycles) become
/// `null`, and so does anything past the node budget, since shared slots can
/// make the expanded tree exponentially larger than the payload.
struct Reviver<'a> {
    payload: &'a [Value],
    /// Revived value and its node count, per slot
    cache: HashMap<usize, (Value, usize)>,
    active: HashSet<usize>,
    budget: usize,
}

impl<'a> Reviver<'a> {
    fn new(payload: &'a [Value]) -> Self {
        Self {
            payload,
            cache: HashMap::new(),
            active: HashSet::new(),
            budget: MAX_REVIVED_NODES,
        }
    }

    /// Rebuild the value stored at `index`, returning it with its node count.
    fn revive(&mut self, index: i64) -> (Value, usize) {
        // Negative indices encode undefined, holes, NaN and infinities.
        let Some(slot) = usize::try_from(index).ok().filter(|&i| i < self.payload.len()) else {
            return (Value::Null, 1);
        };
        if self.active.contains(&slot) || self.active.len() >= MAX_REVIVE_DEPTH {
            return (Value::Null, 1);
        }
        if let Some((value, size)) = self.cache.get(&slot) {
            if *size > self.budget {
                return (Value::Null, 1);
            }
            self.budget -= size;
            return (value.clone(), *size);
        }
        if self.budget == 0 {
            return (Value::Null, 1);
        }

        self.budget -= 1;
        self.active.insert(slot);
        let payload = self.payload;
        let (value, size) = match &payload[slot] {
            Value::Array(items) => match items.split_first() {
                Some((Value::String(tag), args)) => self.revive_tagged(tag, args),
                _ => {
                    let (items, size) = self.revive_all(items);
                    (Value::Array(items), size)
                }
            },
            Value::Object(fields) => {
                let mut size = 1;
                let mut revived = Map::new();
                for (key, item) in fields {
                    let (value, item_size) = self.revive_ref(item);
                    size += item_size;
                    revived.insert(key.clone(), value);
                }
                (Value::Object(revived), size)
            }
            primitive => (primitive.clone(), 1),
        };
        self.active.remove(&slot);
        self.cache.insert(slot, (value.clone(), size));
        (value, size)
    }

    fn revive_ref(&mut self, reference: &Value) -> (Value, usize) {
        match reference.as_i64() {
            Some(index) => self.revive(index),
            None => (Value::Null, 1),
        }
    }

    fn revive_all(&mut self, references: &[Value]) -> (Vec<Value>, usize) {
        let mut size = 1;
        let values = references
            .iter()
            .map(|reference| {
                let (value, item_size) = self.revive_ref(reference);
                size += item_size;
                value
            })
            .collect();
        (values, size)
    }

    fn revive_tagged(&mut self, tag: &str, args: &[Value]) -> (Value, usize) {
        match tag {
            "Reactive" | "ShallowReactive" | "Ref" | "ShallowRef" | "NuxtError" | "Island" | "Object" => {
                match args.first() {
                    Some(reference) => self.revive_ref(reference),
                    None => (Value::Null, 1),
                }
            }
            "Set" => {
                let (items, size) = self.revive_all(args);
                (Value::Array(items), size)
            }
            "Map" => {
                let mut size = 1;
                let pairs = args
                    .chunks(2)
                    .map(|pair| {
                        let (pair, pair_size) = self.revive_all(pair);
                        size += pair_size;
                        Value::Array(pair)
                    })
                    .collect();
                (Value::Array(pairs), size)
            }
            // Literal payloads
            "Date" | "RegExp" | "BigInt" | "EmptyRef" | "EmptyShallowRef" => {
                (args.first().cloned().unwrap_or(Value::Null), 1)
            }
            _ => (Value::Null, 1),
        }
    }
}

/// Rebuild the root value of a devalue payload.
fn revive(payload: &[Value]) -> Value {
    Reviver::new(payload).revive(0).0
}
