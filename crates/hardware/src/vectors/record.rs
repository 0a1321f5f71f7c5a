//! Persisted test-vector records.
//!
//! This module reads and writes the JSON exchange form of test vectors. It provides:
//! 1. **Record shape:** [`VectorRecord`], one case with `test_name`, `opcode`,
//!    `A`, `B`, `expected_result` and `expected_flags`.
//! 2. **Collection shape:** [`VectorFile`], either a bare list of records or an
//!    object holding the list under `vectors` or `tests`; both are normalized
//!    to a plain list right after decoding.
//! 3. **Loading:** Per-file and batch loaders that turn records into
//!    [`TestVector`]s. A record missing a required field or carrying an
//!    out-of-range value fails its whole file; an opcode that names no
//!    operation does not, and is scored as a failed case instead. A batch
//!    loads one file at a time and isolates failures per file.
//! 4. **Export:** A streaming writer that serializes a sweep without holding
//!    it in memory.
//!
//! # Example
//!
//! ```
//! use alu8_core::vectors::record::parse_str;
//!
//! let json = r#"{ "tests": [ {
//!     "test_name": "ADD_01_01", "opcode": "00000", "A": 1, "B": 1,
//!     "expected_result": 2,
//!     "expected_flags": { "carry": false, "overflow": false, "zero": false, "negative": false }
//! } ] }"#;
//! let loaded = parse_str("inline", json).unwrap();
//! assert_eq!(loaded.len(), 1);
//! assert_eq!(loaded[0].vector.expected_result, 2);
//! ```

use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::generator::TestVector;
use crate::common::constants::{OPCODE_SPACE, UNRESOLVED_OPCODE};
use crate::common::{AluError, Flag, FlagMask, FlagSet, Result};
use crate::isa::{OperationKind, opcode_bits, parse_opcode};

/// A record's `opcode` field: a bit string such as `"01101"`, or an integer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OpcodeField {
    /// 5-character binary string (decimal strings are also accepted).
    Bits(String),
    /// Integer opcode.
    Number(i64),
}

impl OpcodeField {
    fn resolve(&self) -> Option<u8> {
        match self {
            Self::Bits(text) => parse_opcode(text).ok(),
            Self::Number(n) => u8::try_from(*n).ok().filter(|v| usize::from(*v) < OPCODE_SPACE),
        }
    }
}

impl fmt::Display for OpcodeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bits(text) => f.write_str(text),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

/// Expected flags of a record. Absent flags are not compared.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedFlags {
    /// Expected carry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carry: Option<bool>,
    /// Expected overflow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overflow: Option<bool>,
    /// Expected zero.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zero: Option<bool>,
    /// Expected negative.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negative: Option<bool>,
}

impl ExpectedFlags {
    /// All four flags present.
    pub const fn complete(flags: FlagSet) -> Self {
        Self {
            carry: Some(flags.carry),
            overflow: Some(flags.overflow),
            zero: Some(flags.zero),
            negative: Some(flags.negative),
        }
    }

    const fn get(&self, flag: Flag) -> Option<bool> {
        match flag {
            Flag::Carry => self.carry,
            Flag::Overflow => self.overflow,
            Flag::Zero => self.zero,
            Flag::Negative => self.negative,
        }
    }

    /// Splits into the flag values (absent flags read as clear) and the mask of present flags.
    pub fn split(&self) -> (FlagSet, FlagMask) {
        let mut flags = FlagSet::default();
        let mut mask = FlagMask::NONE;
        for flag in Flag::ALL {
            if let Some(value) = self.get(flag) {
                flags.set(flag, value);
                mask = mask.with(flag);
            }
        }
        (flags, mask)
    }
}

/// One persisted test case.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorRecord {
    /// Human-readable identifier.
    #[serde(default)]
    pub test_name: String,
    /// Opcode; may be omitted by legacy records that carry `operation` instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opcode: Option<OpcodeField>,
    /// Legacy mnemonic, used when `opcode` is absent or unregistered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    /// Operand A.
    #[serde(rename = "A")]
    pub a: i64,
    /// Operand B.
    #[serde(rename = "B")]
    pub b: i64,
    /// Expected 8-bit result.
    pub expected_result: i64,
    /// Expected flags.
    #[serde(default)]
    pub expected_flags: ExpectedFlags,
}

impl VectorRecord {
    /// Wire form of a generated vector.
    pub fn from_vector(vector: &TestVector) -> Self {
        Self {
            test_name: vector.label().to_string(),
            opcode: Some(OpcodeField::Bits(opcode_bits(vector.opcode))),
            operation: None,
            a: i64::from(vector.a),
            b: i64::from(vector.b),
            expected_result: i64::from(vector.expected_result),
            expected_flags: ExpectedFlags::complete(vector.expected_flags),
        }
    }

    /// Converts to a [`TestVector`], resolving the opcode.
    ///
    /// An opcode that is unregistered, or not a 5-bit code at all, is
    /// resolved through the legacy `operation` name when possible. Otherwise
    /// the vector has no operation and the evaluation counts it as an
    /// unknown-opcode failure; an opcode that did not parse is stored as
    /// [`UNRESOLVED_OPCODE`].
    ///
    /// # Errors
    ///
    /// A description of the problem if a value is out of range or the record
    /// identifies no opcode at all.
    pub fn to_vector(&self) -> std::result::Result<TestVector, String> {
        let by_name = self.operation.as_deref().and_then(OperationKind::from_name);
        let code = self
            .opcode
            .as_ref()
            .map(|field| field.resolve().unwrap_or(UNRESOLVED_OPCODE));

        let (opcode, operation) = match (code, by_name) {
            (Some(code), by_name) => match (OperationKind::from_opcode(code), by_name) {
                (Some(op), _) => (code, Some(op)),
                (None, Some(op)) => (op.opcode(), Some(op)),
                (None, None) => (code, None),
            },
            (None, Some(op)) => (op.opcode(), Some(op)),
            (None, None) => return Err("missing field `opcode`".into()),
        };

        let byte = |field: &str, value: i64| {
            u8::try_from(value).map_err(|_| format!("`{field}` = {value} is outside 0..=255"))
        };
        let (expected_flags, flag_mask) = self.expected_flags.split();

        Ok(TestVector {
            opcode,
            operation,
            a: byte("A", self.a)?,
            b: byte("B", self.b)?,
            expected_result: byte("expected_result", self.expected_result)?,
            expected_flags,
            flag_mask,
        })
    }
}

/// Top-level shape of a vector file.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum VectorFile {
    /// A bare list of records.
    List(Vec<Value>),
    /// An object with a `vectors` list.
    Vectors {
        /// The records.
        vectors: Vec<Value>,
    },
    /// An object with a `tests` list.
    Tests {
        /// The records.
        tests: Vec<Value>,
    },
}

impl VectorFile {
    /// The record list, whichever shape carried it.
    pub fn into_records(self) -> Vec<Value> {
        match self {
            Self::List(records) | Self::Vectors { vectors: records } | Self::Tests { tests: records } => {
                records
            }
        }
    }
}

/// A loaded vector together with the name its record carried.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamedVector {
    /// The record's `test_name`, or a generated label if it had none.
    pub test_name: String,
    /// The record's opcode as written, kept when it did not parse as a 5-bit code.
    pub opcode_text: Option<String>,
    /// The vector.
    pub vector: TestVector,
}

impl NamedVector {
    fn from_record(record: VectorRecord, vector: TestVector) -> Self {
        let opcode_text = record
            .opcode
            .as_ref()
            .filter(|_| vector.operation.is_none() && vector.opcode == UNRESOLVED_OPCODE)
            .map(ToString::to_string);
        let test_name = match (&opcode_text, record.test_name.is_empty()) {
            (_, false) => record.test_name,
            (Some(text), true) => format!("UNKNOWN({text})_{:02X}_{:02X}", vector.a, vector.b),
            (None, true) => vector.label().to_string(),
        };
        Self {
            test_name,
            opcode_text,
            vector,
        }
    }
}

fn normalize(source_name: &str, file: VectorFile) -> Result<Vec<NamedVector>> {
    let records = file.into_records();
    let mut loaded = Vec::with_capacity(records.len());
    // Each raw value is dropped as soon as it is converted.
    for (index, value) in records.into_iter().enumerate() {
        let malformed = |reason: String| AluError::MalformedVectorRecord {
            source_name: source_name.to_string(),
            index,
            reason,
        };
        let record: VectorRecord =
            serde_json::from_value(value).map_err(|e| malformed(e.to_string()))?;
        let vector = record.to_vector().map_err(malformed)?;
        let named = NamedVector::from_record(record, vector);
        if let Some(text) = &named.opcode_text {
            tracing::warn!(
                source = source_name,
                index,
                opcode = %text,
                "record opcode is not a 5-bit code; it will be scored as unknown"
            );
        }
        loaded.push(named);
    }
    Ok(loaded)
}

/// Parses vectors from JSON text. `source_name` is used in error messages.
///
/// # Errors
///
/// [`AluError::MalformedVectorRecord`] if the text is not a vector collection
/// or any record is malformed.
pub fn parse_str(source_name: &str, json: &str) -> Result<Vec<NamedVector>> {
    let file: VectorFile =
        serde_json::from_str(json).map_err(|e| AluError::MalformedVectorRecord {
            source_name: source_name.to_string(),
            index: 0,
            reason: format!("not a vector collection: {e}"),
        })?;
    normalize(source_name, file)
}

/// Loads every vector of one file.
///
/// # Errors
///
/// [`AluError::Io`] if the file cannot be read, [`AluError::Json`] if it is
/// not valid JSON of a collection shape, [`AluError::MalformedVectorRecord`]
/// if a record is malformed.
pub fn load_file(path: &Path) -> Result<Vec<NamedVector>> {
    let file = File::open(path).map_err(|source| AluError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: VectorFile =
        serde_json::from_reader(BufReader::new(file)).map_err(|source| AluError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    let vectors = normalize(&path.display().to_string(), parsed)?;
    tracing::debug!(path = %path.display(), count = vectors.len(), "loaded vector file");
    Ok(vectors)
}

/// Loads several files independently; one file's failure does not affect the others.
///
/// Files are read lazily as the iterator advances, so a caller that runs
/// each file before pulling the next holds only one file's vectors at a time.
pub fn load_batch<P: AsRef<Path>>(
    paths: &[P],
) -> impl Iterator<Item = (PathBuf, Result<Vec<NamedVector>>)> + '_ {
    paths.iter().map(|path| {
        let path = path.as_ref();
        let loaded = load_file(path);
        if let Err(e) = &loaded {
            tracing::error!(path = %path.display(), error = %e, "failed to load vector file");
        }
        (path.to_path_buf(), loaded)
    })
}

/// Streams vectors to `path` as a JSON list of records. Returns the count written.
///
/// # Errors
///
/// [`AluError::Io`] or [`AluError::Json`] if writing fails.
pub fn write_records<I>(path: &Path, vectors: I) -> Result<u64>
where
    I: IntoIterator<Item = TestVector>,
{
    let io_err = |source| AluError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(io_err)?;
    let mut out = BufWriter::new(file);

    let mut count = 0u64;
    out.write_all(b"[").map_err(io_err)?;
    for vector in vectors {
        if count > 0 {
            out.write_all(b",").map_err(io_err)?;
        }
        out.write_all(b"\n  ").map_err(io_err)?;
        serde_json::to_writer(&mut out, &VectorRecord::from_vector(&vector)).map_err(|source| {
            AluError::Json {
                path: path.to_path_buf(),
                source,
            }
        })?;
        count += 1;
    }
    out.write_all(b"\n]\n").map_err(io_err)?;
    out.flush().map_err(io_err)?;
    Ok(count)
}
