use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::placement::Placement;

/// JSON-lines trace of layout decisions. One object per line; every event
/// type is also counted and the counts are written by `emit_summary`.
#[derive(Clone)]
pub struct DebugLogger {
    sink: Arc<Mutex<TraceSink>>,
}

struct TraceSink {
    out: BufWriter<File>,
    counts: BTreeMap<String, u64>,
}

/// A JSON value inside a trace line.
enum Field<'a> {
    Str(&'a str),
    Num(i64),
    Raw(String),
}

impl DebugLogger {
    pub fn new(path: impl AsRef<Path>) -> io::Result<Self> {
        let out = BufWriter::new(File::create(path)?);
        Ok(Self {
            sink: Arc::new(Mutex::new(TraceSink {
                out,
                counts: BTreeMap::new(),
            })),
        })
    }

    fn sink(&self) -> Option<MutexGuard<'_, TraceSink>> {
        self.sink.lock().ok()
    }

    pub fn log_json(&self, json: &str) {
        if let Some(mut sink) = self.sink() {
            let _ = writeln!(sink.out, "{json}");
        }
    }

    pub fn increment(&self, key: &str, amount: u64) {
        if let Some(mut sink) = self.sink() {
            let count = sink.counts.entry(key.to_string()).or_default();
            *count = count.saturating_add(amount);
        }
    }

    fn event(&self, kind: &str, fields: &[(&str, Field<'_>)]) {
        self.log_json(&render_event(kind, fields));
        self.increment(kind, 1);
    }

    pub(crate) fn log_params(&self, fingerprint: &str, effective_cards: usize, words_per_section: usize) {
        self.event(
            "layout.params",
            &[
                ("fingerprint", Field::Str(fingerprint)),
                ("effective_cards", Field::Num(effective_cards as i64)),
                ("words_per_section", Field::Num(words_per_section as i64)),
            ],
        );
    }

    pub(crate) fn log_page_open(&self, section: &str, page: usize) {
        self.event(
            "layout.page_open",
            &[("section", Field::Str(section)), ("page", Field::Num(page as i64))],
        );
    }

    pub(crate) fn log_card_placed(&self, card: usize, copy: usize, placement: &Placement) {
        self.event(
            "layout.card_placed",
            &[
                ("card", Field::Num(card as i64)),
                ("copy", Field::Num(copy as i64)),
                ("page", Field::Num(placement.page as i64)),
                ("row", Field::Num(placement.row as i64)),
                ("column", Field::Num(placement.column as i64)),
                ("x_milli", Field::Num(placement.origin.x.to_milli_i64())),
                ("y_milli", Field::Num(placement.origin.y.to_milli_i64())),
            ],
        );
    }

    pub(crate) fn log_reader_block(&self, card: usize, page: usize, rows: usize, words: usize) {
        self.event(
            "layout.reader_block",
            &[
                ("card", Field::Num(card as i64)),
                ("page", Field::Num(page as i64)),
                ("rows", Field::Num(rows as i64)),
                ("words", Field::Num(words as i64)),
            ],
        );
    }

    /// Writes the accumulated counts and resets them.
    pub fn emit_summary(&self, context: &str) {
        let counts = match self.sink() {
            Some(mut sink) => std::mem::take(&mut sink.counts),
            None => return,
        };
        let counts = counts
            .iter()
            .map(|(key, value)| format!("\"{}\":{}", json_escape(key), value))
            .collect::<Vec<_>>()
            .join(",");
        self.log_json(&render_event(
            "debug.summary",
            &[
                ("context", Field::Str(context)),
                ("counts", Field::Raw(format!("{{{counts}}}"))),
            ],
        ));
    }

    pub fn flush(&self) {
        if let Some(mut sink) = self.sink() {
            let _ = sink.out.flush();
        }
    }
}

fn render_event(kind: &str, fields: &[(&str, Field<'_>)]) -> String {
    let mut line = format!("{{\"type\":\"{}\"", json_escape(kind));
    for (name, value) in fields {
        line.push_str(&format!(",\"{}\":", json_escape(name)));
        match value {
            Field::Str(text) => line.push_str(&format!("\"{}\"", json_escape(text))),
            Field::Num(number) => line.push_str(&number.to_string()),
            Field::Raw(json) => line.push_str(json),
        }
    }
    line.push('}');
    line
}

pub(crate) fn json_escape(raw: &str) -> String {
    raw.chars().fold(String::with_capacity(raw.len()), |mut out, ch| {
        match ch {
            '"' | '\\' => {
                out.push('\\');
                out.push(ch);
            }
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
        out
    })
}
