//! Signature catalog module
//!
//! Loads and holds the set of named failure signatures that console logs are
//! classified against. The source format is a mapping from signature name to
//! an entry with optional regex `patterns`, optional literal `literals` and
//! optional `bug` metadata:
//!
//! ```toml
//! [infra-oom]
//! patterns = ['java\.lang\.OutOfMemoryError.*heap']
//! literals = ["OutOfMemoryError"]
//! bug = { url = "https://bugs.example.com/1892011" }
//! ```
//!
//! TOML is the primary format; files ending in `.json` are parsed as JSON
//! with the same shape. The catalog is loaded once at startup, regexes are
//! compiled at load time (a bad pattern fails the load, not every report
//! run), and the result is immutable for the rest of the process.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors from catalog loading.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("cannot read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("catalog is not valid TOML: {0}")]
    Toml(String),

    #[error("catalog is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("signature '{name}': invalid pattern '{pattern}': {message}")]
    InvalidPattern {
        name: String,
        pattern: String,
        message: String,
    },
}

/// Tracked bug metadata attached to a signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BugRef {
    pub url: String,
}

/// Serde shape of one catalog entry. All fields are optional; an entry with
/// neither patterns nor literals is legal and simply never matches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignatureSpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub patterns: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub literals: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bug: Option<BugRef>,
}

/// One matching rule. Rules keep their declaration order: regex patterns
/// first, then literals, each in file order.
#[derive(Debug, Clone)]
pub enum Rule {
    /// Regular expression compiled with dot-matches-newline, so stack traces
    /// and multi-line error blocks are matchable with `.`.
    Pattern(Regex),
    /// Case-sensitive substring.
    Literal(String),
}

impl Rule {
    pub fn matches(&self, log_text: &str) -> bool {
        match self {
            Rule::Pattern(re) => re.is_match(log_text),
            Rule::Literal(s) => log_text.contains(s),
        }
    }
}

/// A named failure signature with its compiled rules.
#[derive(Debug, Clone)]
pub struct Signature {
    name: String,
    rules: Vec<Rule>,
    bug: Option<BugRef>,
}

impl Signature {
    fn compile(name: &str, spec: &SignatureSpec) -> Result<Self, CatalogError> {
        let mut rules = Vec::with_capacity(spec.patterns.len() + spec.literals.len());
        for pattern in &spec.patterns {
            let re = RegexBuilder::new(pattern)
                .dot_matches_new_line(true)
                .build()
                .map_err(|e| CatalogError::InvalidPattern {
                    name: name.to_string(),
                    pattern: pattern.clone(),
                    message: e.to_string(),
                })?;
            rules.push(Rule::Pattern(re));
        }
        for literal in &spec.literals {
            rules.push(Rule::Literal(literal.clone()));
        }
        Ok(Signature {
            name: name.to_string(),
            rules,
            bug: spec.bug.clone(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn bug_url(&self) -> Option<&str> {
        self.bug.as_ref().map(|b| b.url.as_str())
    }

    /// True when any rule matches. A signature with no rules never fires.
    pub fn matches(&self, log_text: &str) -> bool {
        self.rules.iter().any(|rule| rule.matches(log_text))
    }

    /// Rebuild the serde shape this signature was loaded from.
    fn to_spec(&self) -> SignatureSpec {
        let mut spec = SignatureSpec {
            bug: self.bug.clone(),
            ..SignatureSpec::default()
        };
        for rule in &self.rules {
            match rule {
                Rule::Pattern(re) => spec.patterns.push(re.as_str().to_string()),
                Rule::Literal(s) => spec.literals.push(s.clone()),
            }
        }
        spec
    }
}

/// The full signature collection, name-ordered for deterministic iteration.
#[derive(Debug, Clone)]
pub struct Catalog {
    signatures: Vec<Signature>,
}

impl Catalog {
    fn compile(specs: BTreeMap<String, SignatureSpec>) -> Result<Self, CatalogError> {
        let signatures = specs
            .iter()
            .map(|(name, spec)| Signature::compile(name, spec))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Catalog { signatures })
    }

    /// Parse a TOML catalog. Duplicate signature names are a parse error.
    pub fn from_toml_str(text: &str) -> Result<Self, CatalogError> {
        let specs: BTreeMap<String, SignatureSpec> =
            toml::from_str(text).map_err(|e| CatalogError::Toml(e.to_string()))?;
        Self::compile(specs)
    }

    /// Parse a JSON catalog with the same mapping shape.
    pub fn from_json_str(text: &str) -> Result<Self, CatalogError> {
        let specs: BTreeMap<String, SignatureSpec> = serde_json::from_str(text)?;
        Self::compile(specs)
    }

    /// Load from a file, picking the format by extension (`.json` is JSON,
    /// everything else TOML).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&text)
        } else {
            Self::from_toml_str(&text)
        }
    }

    /// Signatures in catalog order (sorted by name).
    pub fn signatures(&self) -> &[Signature] {
        &self.signatures
    }

    /// Look up one signature by name.
    pub fn get(&self, name: &str) -> Option<&Signature> {
        self.signatures.iter().find(|s| s.name == name)
    }

    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }

    /// Rebuild the source mapping. Together with `from_toml_str` this gives a
    /// lossless round trip of the catalog file.
    pub fn to_specs(&self) -> BTreeMap<String, SignatureSpec> {
        self.signatures
            .iter()
            .map(|s| (s.name.clone(), s.to_spec()))
            .collect()
    }

    /// Serialize back to TOML.
    pub fn to_toml_string(&self) -> Result<String, CatalogError> {
        toml::to_string_pretty(&self.to_specs()).map_err(|e| CatalogError::Toml(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[infra-oom]
patterns = ['java\.lang\.OutOfMemoryError']
literals = ["OutOfMemoryError"]
bug = { url = "https://bugs.example.com/1892011" }

[mirror-timeout]
literals = ["Timeout when fetching from mirror"]

[never-fires]
"#;

    #[test]
    fn loads_sample_catalog() {
        let catalog = Catalog::from_toml_str(SAMPLE).unwrap();
        assert_eq!(catalog.len(), 3);

        let oom = catalog.get("infra-oom").unwrap();
        assert_eq!(oom.rules().len(), 2);
        assert_eq!(oom.bug_url(), Some("https://bugs.example.com/1892011"));

        let timeout = catalog.get("mirror-timeout").unwrap();
        assert_eq!(timeout.rules().len(), 1);
        assert_eq!(timeout.bug_url(), None);
    }

    #[test]
    fn catalog_order_is_name_sorted() {
        let catalog = Catalog::from_toml_str(SAMPLE).unwrap();
        let names: Vec<_> = catalog.signatures().iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["infra-oom", "mirror-timeout", "never-fires"]);
    }

    #[test]
    fn empty_entry_is_legal_and_never_matches() {
        let catalog = Catalog::from_toml_str(SAMPLE).unwrap();
        let sig = catalog.get("never-fires").unwrap();
        assert!(sig.rules().is_empty());
        assert!(!sig.matches("anything at all"));
    }

    #[test]
    fn lookup_miss_returns_none() {
        let catalog = Catalog::from_toml_str(SAMPLE).unwrap();
        assert!(catalog.get("no-such-signature").is_none());
    }

    #[test]
    fn invalid_regex_fails_load_naming_the_signature() {
        let bad = r#"
[broken]
patterns = ['unclosed(']
"#;
        let err = Catalog::from_toml_str(bad).unwrap_err();
        match err {
            CatalogError::InvalidPattern { name, pattern, .. } => {
                assert_eq!(name, "broken");
                assert_eq!(pattern, "unclosed(");
            }
            other => panic!("expected InvalidPattern, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_names_are_rejected_by_toml() {
        let dup = r#"
[repeated]
literals = ["a"]

[repeated]
literals = ["b"]
"#;
        assert!(matches!(
            Catalog::from_toml_str(dup),
            Err(CatalogError::Toml(_))
        ));
    }

    #[test]
    fn json_catalog_loads() {
        let json = r#"{
            "infra-oom": {
                "patterns": ["OutOfMemoryError"],
                "bug": { "url": "https://bugs.example.com/1892011" }
            }
        }"#;
        let catalog = Catalog::from_json_str(json).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(
            catalog.get("infra-oom").unwrap().bug_url(),
            Some("https://bugs.example.com/1892011")
        );
    }

    #[test]
    fn round_trip_preserves_the_signature_set() {
        let catalog = Catalog::from_toml_str(SAMPLE).unwrap();
        let serialized = catalog.to_toml_string().unwrap();
        let reloaded = Catalog::from_toml_str(&serialized).unwrap();
        assert_eq!(catalog.to_specs(), reloaded.to_specs());
    }
}
