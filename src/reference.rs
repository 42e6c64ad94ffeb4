//! Parsing of operation resource names into structured references.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

const OPERATIONS_COLLECTION: &str = "operations";
const DEFAULT_LOCATION: &str = "global";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReferenceError {
    #[error("operation reference is empty")]
    Empty,

    #[error("invalid operation reference '{input}': {reason}")]
    Malformed { input: String, reason: String },

    #[error("operation '{operation_id}' has no project; set --project or OPWAIT_PROJECT")]
    MissingProject { operation_id: String },
}

/// Parent values used to complete a bare operation id.
#[derive(Debug, Clone, Default)]
pub struct ParentDefaults {
    pub project: Option<String>,
    pub location: Option<String>,
}

/// A structured operation reference, e.g.
/// `projects/p/locations/l/operations/id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationRef {
    parents: Vec<(String, String)>,
    operation_id: String,
}

impl OperationRef {
    /// Parses a relative resource name or a full API URL.
    pub fn parse(input: &str) -> Result<Self, ReferenceError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ReferenceError::Empty);
        }

        let path = strip_url(trimmed);
        let segments: Vec<&str> = path.trim_matches('/').split('/').collect();

        if segments.iter().any(|s| s.is_empty()) {
            return Err(malformed(input, "empty path segment"));
        }
        if segments.len() % 2 != 0 {
            return Err(malformed(input, "expected collection/id pairs"));
        }

        let mut pairs: Vec<(String, String)> = Vec::with_capacity(segments.len() / 2);
        for chunk in segments.chunks(2) {
            let (collection, id) = (chunk[0], chunk[1]);
            if id.chars().any(char::is_whitespace) || collection.chars().any(char::is_whitespace) {
                return Err(malformed(input, "whitespace in resource name"));
            }
            pairs.push((collection.to_string(), id.to_string()));
        }

        let (collection, operation_id) = pairs
            .pop()
            .ok_or_else(|| malformed(input, "missing operation id"))?;
        if collection != OPERATIONS_COLLECTION {
            return Err(malformed(
                input,
                &format!("expected last collection 'operations', found '{}'", collection),
            ));
        }

        Ok(Self {
            parents: pairs,
            operation_id,
        })
    }

    /// Like [`OperationRef::parse`], but a bare operation id is completed
    /// from the default project and location.
    pub fn resolve(input: &str, defaults: &ParentDefaults) -> Result<Self, ReferenceError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ReferenceError::Empty);
        }
        if trimmed.contains('/') {
            return Self::parse(trimmed);
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(malformed(input, "whitespace in resource name"));
        }

        let project = defaults
            .project
            .clone()
            .ok_or_else(|| ReferenceError::MissingProject {
                operation_id: trimmed.to_string(),
            })?;
        let location = defaults
            .location
            .clone()
            .unwrap_or_else(|| DEFAULT_LOCATION.to_string());

        Ok(Self {
            parents: vec![
                ("projects".to_string(), project),
                ("locations".to_string(), location),
            ],
            operation_id: trimmed.to_string(),
        })
    }

    pub fn operation_id(&self) -> &str {
        &self.operation_id
    }

    pub fn project(&self) -> Option<&str> {
        self.segment("projects")
    }

    /// Location, region or zone the operation runs in.
    pub fn location(&self) -> Option<&str> {
        self.segment("locations")
            .or_else(|| self.segment("regions"))
            .or_else(|| self.segment("zones"))
    }

    /// Relative name of the resource owning the `operations` collection.
    pub fn parent(&self) -> Option<String> {
        if self.parents.is_empty() {
            return None;
        }
        Some(join_pairs(&self.parents))
    }

    pub fn relative_name(&self) -> String {
        match self.parent() {
            Some(parent) => format!("{}/{}/{}", parent, OPERATIONS_COLLECTION, self.operation_id),
            None => format!("{}/{}", OPERATIONS_COLLECTION, self.operation_id),
        }
    }

    fn segment(&self, collection: &str) -> Option<&str> {
        self.parents
            .iter()
            .find(|(c, _)| c == collection)
            .map(|(_, id)| id.as_str())
    }
}

impl fmt::Display for OperationRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.relative_name())
    }
}

impl FromStr for OperationRef {
    type Err = ReferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// True for API version path segments such as `v1`, `v1beta1` or `v2alpha`.
pub fn is_api_version(segment: &str) -> bool {
    let Some(rest) = segment.strip_prefix('v') else {
        return false;
    };
    let digits = rest.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return false;
    }
    let suffix = &rest[digits..];
    let track = ["alpha", "beta"]
        .iter()
        .find_map(|t| suffix.strip_prefix(*t));
    match track {
        None => suffix.is_empty(),
        Some(tail) => tail.chars().all(|c| c.is_ascii_digit()),
    }
}

// NOTE: Drops scheme, host, query and a leading API version segment
fn strip_url(input: &str) -> &str {
    let without_query = input.split(['?', '#']).next().unwrap_or(input);

    let path = match without_query.split_once("://") {
        Some((_, rest)) => rest.split_once('/').map(|(_, p)| p).unwrap_or(""),
        None => without_query,
    };

    let path = path.trim_start_matches('/');
    match path.split_once('/') {
        Some((first, rest)) if is_api_version(first) => rest,
        _ => path,
    }
}

fn join_pairs(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(c, id)| format!("{}/{}", c, id))
        .collect::<Vec<_>>()
        .join("/")
}

fn malformed(input: &str, reason: &str) -> ReferenceError {
    ReferenceError::Malformed {
        input: input.to_string(),
        reason: reason.to_string(),
    }
}
