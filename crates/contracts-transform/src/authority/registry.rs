//! The local authority reference registry.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

use super::normalize::normalize_authority_name;
use crate::error::{Result, TransformError};

const REGISTRY_TABLE: &str = "authority registry";
const REQUIRED_HEADERS: [&str; 2] = ["local-authority-code", "official-name"];

/// One authority from the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorityRecord {
    pub code: String,
    pub official_name: String,
    pub nice_name: Option<String>,
    pub alt_names: Vec<String>,
    pub region: Option<String>,
    pub county: Option<String>,
    pub gss_code: Option<String>,
}

impl AuthorityRecord {
    pub fn new(code: impl Into<String>, official_name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            official_name: official_name.into(),
            nice_name: None,
            alt_names: Vec::new(),
            region: None,
            county: None,
            gss_code: None,
        }
    }

    pub fn with_nice_name(mut self, name: impl Into<String>) -> Self {
        self.nice_name = Some(name.into());
        self
    }

    pub fn with_alt_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.alt_names = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_county(mut self, county: impl Into<String>) -> Self {
        self.county = Some(county.into());
        self
    }

    pub fn with_gss_code(mut self, gss: impl Into<String>) -> Self {
        self.gss_code = Some(gss.into());
        self
    }

    /// Every name this authority is known by, official name first.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.official_name.as_str())
            .chain(self.nice_name.as_deref())
            .chain(self.alt_names.iter().map(String::as_str))
    }
}

/// Result of looking a name up in the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorityLookup<'a> {
    Unmatched,
    Matched(&'a AuthorityRecord),
    /// Several authorities share the key; `chosen` is the first registered.
    Ambiguous {
        chosen: &'a AuthorityRecord,
        candidates: Vec<&'a str>,
    },
}

impl<'a> AuthorityLookup<'a> {
    pub fn record(&self) -> Option<&'a AuthorityRecord> {
        match self {
            Self::Unmatched => None,
            Self::Matched(record) => Some(*record),
            Self::Ambiguous { chosen, .. } => Some(*chosen),
        }
    }
}

/// Normalized-name index over the authority registry.
#[derive(Debug, Clone, Default)]
pub struct AuthorityRegistry {
    records: Vec<AuthorityRecord>,
    index: HashMap<String, usize>,
    /// Keys claimed by more than one authority code, with every claimant in
    /// registry order.
    conflicts: BTreeMap<String, Vec<usize>>,
}

impl AuthorityRegistry {
    /// Builds the index. The first record to claim a key keeps it.
    pub fn new(records: Vec<AuthorityRecord>) -> Self {
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut conflicts: BTreeMap<String, Vec<usize>> = BTreeMap::new();

        for (position, record) in records.iter().enumerate() {
            for name in record.names() {
                let key = normalize_authority_name(name);
                if key.is_empty() {
                    continue;
                }
                let owner = index.get(&key).copied();
                match owner {
                    None => {
                        index.insert(key, position);
                    }
                    Some(owner) if records[owner].code == record.code => {}
                    Some(owner) => {
                        let claimants = conflicts.entry(key).or_insert_with(|| vec![owner]);
                        if !claimants.iter().any(|&c| records[c].code == record.code) {
                            claimants.push(position);
                        }
                    }
                }
            }
        }

        if !conflicts.is_empty() {
            debug!(keys = conflicts.len(), "authority names shared between codes");
        }
        Self {
            records,
            index,
            conflicts,
        }
    }

    /// Reads the registry CSV.
    ///
    /// `local-authority-code` and `official-name` are required headers;
    /// `nice-name`, `alt-names` (`;`-separated), `region`, `county` and
    /// `gss-code` are optional. Rows without a code are skipped.
    pub fn load_csv(path: &Path) -> Result<Self> {
        let registry_error = |message: String| TransformError::Registry {
            path: path.to_path_buf(),
            message,
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)
            .map_err(|e| registry_error(e.to_string()))?;

        let headers = reader
            .headers()
            .map_err(|e| registry_error(e.to_string()))?
            .clone();
        for required in REQUIRED_HEADERS {
            if !headers.iter().any(|h| h.trim() == required) {
                return Err(TransformError::schema(
                    REGISTRY_TABLE,
                    format!("required header '{required}' is absent"),
                ));
            }
        }

        let mut records = Vec::new();
        let mut skipped = 0usize;
        for row in reader.deserialize::<RegistryRow>() {
            let row = row.map_err(|e| registry_error(e.to_string()))?;
            match row.into_record() {
                Some(record) => records.push(record),
                None => skipped += 1,
            }
        }
        if skipped > 0 {
            warn!(path = %path.display(), skipped, "registry rows without a code were skipped");
        }
        debug!(path = %path.display(), authorities = records.len(), "authority registry loaded");
        Ok(Self::new(records))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[AuthorityRecord] {
        &self.records
    }

    /// Looks `name` up by its normalized form.
    pub fn lookup(&self, name: &str) -> AuthorityLookup<'_> {
        let key = normalize_authority_name(name);
        if key.is_empty() {
            return AuthorityLookup::Unmatched;
        }
        let Some(&position) = self.index.get(&key) else {
            return AuthorityLookup::Unmatched;
        };
        let chosen = &self.records[position];
        match self.conflicts.get(&key) {
            Some(claimants) => AuthorityLookup::Ambiguous {
                chosen,
                candidates: claimants
                    .iter()
                    .map(|&c| self.records[c].code.as_str())
                    .collect(),
            },
            None => AuthorityLookup::Matched(chosen),
        }
    }

    /// The authority `name` resolves to, ambiguous or not.
    pub fn resolve(&self, name: &str) -> Option<&AuthorityRecord> {
        self.lookup(name).record()
    }
}

#[derive(Debug, Deserialize)]
struct RegistryRow {
    #[serde(rename = "local-authority-code")]
    code: String,
    #[serde(rename = "official-name")]
    official_name: String,
    #[serde(rename = "nice-name", default)]
    nice_name: String,
    #[serde(rename = "alt-names", default)]
    alt_names: String,
    #[serde(default)]
    region: String,
    #[serde(default)]
    county: String,
    #[serde(rename = "gss-code", default)]
    gss_code: String,
}

impl RegistryRow {
    fn into_record(self) -> Option<AuthorityRecord> {
        let code = non_empty(&self.code)?;
        Some(AuthorityRecord {
            code,
            official_name: self.official_name.trim().to_string(),
            nice_name: non_empty(&self.nice_name),
            alt_names: split_alt_names(&self.alt_names),
            region: non_empty(&self.region),
            county: non_empty(&self.county),
            gss_code: non_empty(&self.gss_code),
        })
    }
}

fn split_alt_names(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
