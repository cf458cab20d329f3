//! Seed dataset rewriting.
//!
//! A [`Vocabulary`] maps each known display label to its identifier. JSON seeds
//! are rewritten structurally: every string value equal to a label is
//! replaced. Any other file is treated as opaque text and rewritten by exact
//! replacement of quoted literals (`'Code Review'` → `'code_review'`). Once a
//! file is rewritten its display literals are gone, so a second pass finds
//! nothing to do.

use crate::error::{CapnormError, Result};
use crate::normalize::normalize;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

/// Labels used by the generated mock agent registry.
pub const DEFAULT_VOCABULARY: &[&str] = &[
    "Code Review", "Deep Research", "System Audit", "issue_alpha_directive", "Deploy to Prod",
    "Neural Handoff", "Risk Analysis", "Emergency Shutdown", "Brainstorming",
    "Content Generation", "Market Research", "Schedule Meeting", "Task Prioritization",
    "Resource Allocation", "Performance Tracking", "Sprint Planning", "Team Retrospective",
    "Debug", "Git Push", "System Architecture Review", "Code Generation", "Unit Testing",
    "CI/CD Pipeline", "Refactoring", "Documentation", "Incident Response", "Copywriting",
    "SEO Analysis", "Campaign Launch", "Market Trend Analysis", "Lead Qualification",
    "Update CRM", "Quarterly Forecasting", "Client Onboarding", "User Interview", "Write Spec",
    "Feature Roadmap", "Check Server Health", "View Logs", "Pipeline Optimization",
    "Database Migration", "API Test", "Database Query", "Refactor Microservice",
    "API Documentation", "Generate Image", "UI Audit", "Design System Update",
    "Usability Testing", "Ticket Triage", "Knowledge Base Search", "Customer Incident Review",
    "Support Training", "Scan Vulnerabilities", "Security Audit", "Scale Cluster",
    "Analyze Feedback", "Product Sync", "Figma Sync", "Prototype Review", "Data Analysis",
    "Competitive Audit", "Edit Content", "Newsletter Draft", "Post Update", "Monitor Mentions",
    "Social Strategy", "Engagement Report", "Keyword Research", "Search Optimization",
    "Cold Call", "Pipeline Management", "Employee Onboarding", "Conflict Resolution",
    "Policy Review", "Team Building", "Analyze Budget", "Expense Tracking", "Finance Review",
    "Burn Rate Forecast", "Contract Review", "Legal Filing", "Risk Assessment",
    "Customer Chat", "Feedback Collection", "Code Audit", "Compliance Check",
    "Quality Gate Review",
];

const QUOTES: [char; 2] = ['\'', '"'];

// ---------------------------------------------------------------------------
// Vocabulary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VocabEntry {
    pub label: String,
    pub identifier: String,
}

#[derive(Debug, Clone)]
pub struct Vocabulary {
    entries: Vec<VocabEntry>,
    index: HashMap<String, usize>,
}

impl Vocabulary {
    /// Build a vocabulary, rejecting empty or duplicate labels and any label
    /// whose quoted literal occurs inside another label's quoted literal.
    pub fn new<I, S>(labels: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut entries = Vec::new();
        let mut index = HashMap::new();
        for label in labels {
            let label: String = label.into();
            if label.trim().is_empty() {
                return Err(CapnormError::EmptyLabel);
            }
            if index.contains_key(&label) {
                return Err(CapnormError::DuplicateLabel(label));
            }
            index.insert(label.clone(), entries.len());
            entries.push(VocabEntry {
                identifier: normalize(&label),
                label,
            });
        }

        for inner in &entries {
            for outer in &entries {
                if inner.label == outer.label {
                    continue;
                }
                let collides = QUOTES.iter().any(|q| {
                    quoted(*q, &outer.label).contains(&quoted(*q, &inner.label))
                });
                if collides {
                    return Err(CapnormError::VocabularyOverlap {
                        inner: inner.label.clone(),
                        outer: outer.label.clone(),
                    });
                }
            }
        }

        Ok(Self { entries, index })
    }

    pub fn builtin() -> Result<Self> {
        Self::new(DEFAULT_VOCABULARY.iter().copied())
    }

    pub fn entries(&self) -> &[VocabEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn identifier_for(&self, label: &str) -> Option<&str> {
        self.index
            .get(label)
            .map(|&i| self.entries[i].identifier.as_str())
    }

    /// Pairs `(inner, outer)` where `inner` is a bare substring of `outer`.
    /// Quoted replacement is immune to these; they are surfaced as warnings.
    pub fn overlaps(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        for inner in &self.entries {
            for outer in &self.entries {
                if inner.label != outer.label && outer.label.contains(&inner.label) {
                    out.push((inner.label.clone(), outer.label.clone()));
                }
            }
        }
        out
    }
}

fn quoted(q: char, s: &str) -> String {
    format!("{q}{s}{q}")
}

// ---------------------------------------------------------------------------
// Rewrite outcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Replacement {
    pub label: String,
    pub identifier: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RewriteOutcome {
    #[serde(skip)]
    pub text: String,
    pub replacements: Vec<Replacement>,
}

impl RewriteOutcome {
    pub fn total(&self) -> usize {
        self.replacements.iter().map(|r| r.count).sum()
    }

    pub fn is_changed(&self) -> bool {
        self.total() > 0
    }
}

fn record(replacements: &mut Vec<Replacement>, entry: &VocabEntry, count: usize) {
    if let Some(r) = replacements.iter_mut().find(|r| r.label == entry.label) {
        r.count += count;
    } else {
        replacements.push(Replacement {
            label: entry.label.clone(),
            identifier: entry.identifier.clone(),
            count,
        });
    }
}

// ---------------------------------------------------------------------------
// Literal substitution
// ---------------------------------------------------------------------------

/// Replace every single- or double-quoted occurrence of a vocabulary label
/// with the quoted identifier. Exact literal matching only.
pub fn rewrite_literals(text: &str, vocab: &Vocabulary) -> RewriteOutcome {
    let mut out = text.to_string();
    let mut replacements = Vec::new();
    for entry in vocab.entries() {
        if entry.label == entry.identifier {
            continue;
        }
        for q in QUOTES {
            let needle = quoted(q, &entry.label);
            let count = out.matches(&needle).count();
            if count > 0 {
                out = out.replace(&needle, &quoted(q, &entry.identifier));
                record(&mut replacements, entry, count);
            }
        }
    }
    RewriteOutcome {
        text: out,
        replacements,
    }
}

// ---------------------------------------------------------------------------
// Structured JSON rewrite
// ---------------------------------------------------------------------------

/// Replace every JSON string value equal to a label. Object keys are kept.
/// The input text is returned untouched when nothing matched.
pub fn rewrite_json(text: &str, vocab: &Vocabulary) -> Result<RewriteOutcome> {
    let mut doc: Value = serde_json::from_str(text)?;
    let mut replacements = Vec::new();
    rewrite_value(&mut doc, vocab, &mut replacements);

    let text = if replacements.is_empty() {
        text.to_string()
    } else {
        let mut pretty = serde_json::to_string_pretty(&doc)?;
        pretty.push('\n');
        pretty
    };
    Ok(RewriteOutcome { text, replacements })
}

fn rewrite_value(value: &mut Value, vocab: &Vocabulary, replacements: &mut Vec<Replacement>) {
    match value {
        Value::String(s) => {
            if let Some(&i) = vocab.index.get(s.as_str()) {
                let entry = &vocab.entries[i];
                if entry.identifier != *s {
                    *s = entry.identifier.clone();
                    record(replacements, entry, 1);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                rewrite_value(item, vocab, replacements);
            }
        }
        Value::Object(map) => {
            for (_, v) in map.iter_mut() {
                rewrite_value(v, vocab, replacements);
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

// ---------------------------------------------------------------------------
// Seed files
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedFormat {
    Json,
    Text,
}

impl SeedFormat {
    pub fn detect(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => SeedFormat::Json,
            _ => SeedFormat::Text,
        }
    }
}

/// Read the whole seed file, rewrite it, and write it back in one piece if
/// anything changed (and `dry_run` is off).
pub fn rewrite_seed_file(path: &Path, vocab: &Vocabulary, dry_run: bool) -> Result<RewriteOutcome> {
    let text = std::fs::read_to_string(path)?;
    let format = SeedFormat::detect(path);
    let outcome = match format {
        SeedFormat::Json => rewrite_json(&text, vocab)?,
        SeedFormat::Text => rewrite_literals(&text, vocab),
    };

    if outcome.is_changed() && !dry_run {
        crate::io::atomic_write(path, outcome.text.as_bytes())?;
    }
    tracing::info!(
        path = %path.display(),
        ?format,
        replaced = outcome.total(),
        dry_run,
        "seed rewrite finished"
    );
    Ok(outcome)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
