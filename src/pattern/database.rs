// Mon Oct 19 2026 - Alex

use crate::memory::{Address, Scalar};
use crate::pattern::{MatchError, Matcher};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid signature file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Duplicate signature name: {0}")]
    DuplicateName(String),
}

/// One chained matcher step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    SearchHex {
        pattern: String,
        #[serde(default)]
        backward: bool,
        #[serde(default)]
        limit: usize,
    },
    SearchString {
        text: String,
    },
    Offset {
        by: i64,
    },
    Nth {
        index: usize,
    },
    ProcedureStart {
        #[serde(default)]
        limit: usize,
    },
    Reset,
}

impl Step {
    pub fn apply(&self, matcher: &mut Matcher<'_>) -> Result<(), MatchError> {
        match self {
            Step::SearchHex { pattern, backward, limit } => matcher.search_hex(pattern, *backward, *limit)?,
            Step::SearchString { text } => matcher.search_string(text)?,
            Step::Offset { by } => matcher.offsetted(*by)?,
            Step::Nth { index } => matcher.nth(*index)?,
            Step::ProcedureStart { limit } => matcher.search_procedure_start(*limit)?,
            Step::Reset => matcher.reset(),
        };
        Ok(())
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::SearchHex { pattern, backward, limit } => {
                write!(f, "search_hex({}", pattern)?;
                if *backward {
                    write!(f, ", backward")?;
                }
                if *limit != 0 {
                    write!(f, ", limit={:#x}", limit)?;
                }
                write!(f, ")")
            }
            Step::SearchString { text } => write!(f, "search_string({:?})", text),
            Step::Offset { by } => write!(f, "offsetted({})", by),
            Step::Nth { index } => write!(f, "nth({})", index),
            Step::ProcedureStart { limit } => write!(f, "search_procedure_start({})", limit),
            Step::Reset => write!(f, "reset()"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
}

/// Final value a signature produces.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Unsigned(u64),
    Signed(i64),
    Float(f64),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unsigned(v) => write!(f, "{:#x}", v),
            Value::Signed(v) if *v < 0 => write!(f, "-{:#x}", v.unsigned_abs()),
            Value::Signed(v) => write!(f, "{:#x}", v),
            Value::Float(v) => write!(f, "{}", v),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Resolution {
    #[default]
    Offset,
    RawOffset,
    RelativeTarget {
        #[serde(default)]
        instruction_len: Option<usize>,
    },
    Read {
        ty: ScalarType,
        #[serde(default)]
        offset: i64,
    },
}

impl Resolution {
    pub fn resolve(&self, matcher: &Matcher<'_>) -> Result<Value, MatchError> {
        fn unsigned<T: Scalar + Into<u64>>(m: &Matcher<'_>, offset: i64) -> Result<Value, MatchError> {
            Ok(Value::Unsigned(m.read::<T>(offset)?.into()))
        }
        fn signed<T: Scalar + Into<i64>>(m: &Matcher<'_>, offset: i64) -> Result<Value, MatchError> {
            Ok(Value::Signed(m.read::<T>(offset)?.into()))
        }

        match *self {
            Resolution::Offset => Ok(Value::Unsigned(matcher.offset()?)),
            Resolution::RawOffset => Ok(Value::Unsigned(matcher.raw_offset()?)),
            Resolution::RelativeTarget { instruction_len: None } => {
                Ok(Value::Unsigned(matcher.relative_target()?))
            }
            Resolution::RelativeTarget { instruction_len: Some(len) } => {
                Ok(Value::Unsigned(matcher.relative_target_with_len(len)?))
            }
            Resolution::Read { ty, offset } => match ty {
                ScalarType::U8 => unsigned::<u8>(matcher, offset),
                ScalarType::U16 => unsigned::<u16>(matcher, offset),
                ScalarType::U32 => unsigned::<u32>(matcher, offset),
                ScalarType::U64 => unsigned::<u64>(matcher, offset),
                ScalarType::I8 => signed::<i8>(matcher, offset),
                ScalarType::I16 => signed::<i16>(matcher, offset),
                ScalarType::I32 => signed::<i32>(matcher, offset),
                ScalarType::I64 => signed::<i64>(matcher, offset),
                ScalarType::F32 => Ok(Value::Float(matcher.read::<f32>(offset)? as f64)),
                ScalarType::F64 => Ok(Value::Float(matcher.read::<f64>(offset)?)),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signature {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub steps: Vec<Step>,
    #[serde(default)]
    pub resolve: Resolution,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolved {
    pub value: Value,
    pub address: Address,
    pub candidates: usize,
}

impl Signature {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: None,
            steps: Vec::new(),
            resolve: Resolution::default(),
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    pub fn resolve_with(mut self, resolution: Resolution) -> Self {
        self.resolve = resolution;
        self
    }

    /// Runs every step on `matcher`, then extracts the value at the
    /// surviving active candidate.
    pub fn evaluate(&self, mut matcher: Matcher<'_>) -> Result<Resolved, MatchError> {
        for step in &self.steps {
            step.apply(&mut matcher)?;
            log::trace!("[{}] {} -> {} candidate(s)", self.name, step, matcher.len());
        }

        if matcher.len() > 1 {
            log::warn!(
                "[{}] {} candidates remain, resolving the first",
                self.name,
                matcher.len()
            );
        }

        Ok(Resolved {
            value: self.resolve.resolve(&matcher)?,
            address: matcher.active()?,
            candidates: matcher.len(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignatureDatabase {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub signatures: Vec<Signature>,
}

impl SignatureDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(text: &str) -> Result<Self, DatabaseError> {
        let db: Self = serde_json::from_str(text)?;
        db.check_unique()?;
        Ok(db)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DatabaseError> {
        let content = fs::read_to_string(path.as_ref())?;
        let db = Self::from_json(&content)?;
        log::info!("Loaded {} signature(s) from {}", db.len(), path.as_ref().display());
        Ok(db)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), DatabaseError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn add(&mut self, signature: Signature) -> Result<(), DatabaseError> {
        if self.get(&signature.name).is_some() {
            return Err(DatabaseError::DuplicateName(signature.name));
        }
        self.signatures.push(signature);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Signature> {
        self.signatures.iter().find(|sig| sig.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Signature> {
        self.signatures.iter()
    }

    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }

    fn check_unique(&self) -> Result<(), DatabaseError> {
        let mut seen = std::collections::HashSet::new();
        for sig in &self.signatures {
            if !seen.insert(sig.name.as_str()) {
                return Err(DatabaseError::DuplicateName(sig.name.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::ByteImage;

    const SAMPLE: [u8; 13] = [
        0x55, 0x8b, 0xec, 0x90, 0x90, 0xe8, 0x10, 0x00, 0x00, 0x00, 0xcc, 0xcc, 0x90,
    ];

    const DATABASE: &str = r#"{
        "version": "1",
        "signatures": [
            {
                "name": "call_target",
                "steps": [
                    { "op": "search_hex", "pattern": "558BEC" },
                    { "op": "offset", "by": 5 }
                ],
                "resolve": { "kind": "relative_target" }
            },
            {
                "name": "call_displacement",
                "steps": [
                    { "op": "search_hex", "pattern": "E8????????" }
                ],
                "resolve": { "kind": "read", "ty": "i32", "offset": 1 }
            },
            {
                "name": "padding",
                "steps": [ { "op": "search_hex", "pattern": "CCCC" } ]
            }
        ]
    }"#;

    #[test]
    fn test_parse_and_evaluate() {
        let db = SignatureDatabase::from_json(DATABASE).unwrap();
        assert_eq!(db.len(), 3);
        let image = ByteImage::from_memory(&SAMPLE);

        let call = db.get("call_target").unwrap().evaluate(image.matcher()).unwrap();
        assert_eq!(call.value, Value::Unsigned(0x40001a));
        assert_eq!(call.address, image.start() + 5);

        let disp = db.get("call_displacement").unwrap().evaluate(image.matcher()).unwrap();
        assert_eq!(disp.value, Value::Signed(0x10));

        let padding = db.get("padding").unwrap().evaluate(image.matcher()).unwrap();
        assert_eq!(padding.value, Value::Unsigned(0x40000a));
        // 11 also matches: its second byte would sit on the last byte.
        assert_eq!(padding.candidates, 2);
    }

    #[test]
    fn test_missing_match_surfaces_no_active_candidate() {
        let image = ByteImage::from_memory(&SAMPLE);
        let sig = Signature::new("missing")
            .step(Step::SearchHex {
                pattern: "DEADBEEF".to_string(),
                backward: false,
                limit: 0,
            })
            .resolve_with(Resolution::RawOffset);
        let err = sig.evaluate(image.matcher()).unwrap_err();
        assert!(err.is_no_active_candidate());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let text = r#"{ "signatures": [
            { "name": "a", "steps": [] },
            { "name": "a", "steps": [] }
        ] }"#;
        assert!(matches!(
            SignatureDatabase::from_json(text),
            Err(DatabaseError::DuplicateName(ref name)) if name == "a"
        ));

        let mut db = SignatureDatabase::new();
        db.add(Signature::new("b")).unwrap();
        assert!(db.add(Signature::new("b")).is_err());
    }

    #[test]
    fn test_save_and_load() {
        let mut db = SignatureDatabase::new();
        db.add(
            Signature::new("entry")
                .with_description("frame setup")
                .step(Step::SearchHex {
                    pattern: "558BEC".to_string(),
                    backward: false,
                    limit: 0,
                })
                .step(Step::ProcedureStart { limit: 0 })
                .step(Step::Nth { index: 0 })
                .resolve_with(Resolution::RelativeTarget { instruction_len: Some(7) }),
        )
        .unwrap();

        let file = tempfile::NamedTempFile::new().unwrap();
        db.save(file.path()).unwrap();
        let loaded = SignatureDatabase::load(file.path()).unwrap();
        assert_eq!(loaded, db);
    }

    #[test]
    fn test_step_display() {
        let step = Step::SearchHex {
            pattern: "CCCC".to_string(),
            backward: true,
            limit: 0x100,
        };
        assert_eq!(step.to_string(), "search_hex(CCCC, backward, limit=0x100)");
        assert_eq!(Value::Signed(-16).to_string(), "-0x10");
    }
}
