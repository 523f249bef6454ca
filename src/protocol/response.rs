//! Response descriptors and reply records
//!
//! Every operation declares, as static data, which response words it
//! accepts, which positional fields follow each word, and whether a
//! fixed-length body comes after the header line. The parser consults
//! this table and nothing else, so new operations are added by data,
//! not by new parsing code.

use bytes::Bytes;

use crate::error::{BeanError, Result};

/// Outcome tag for a completed reply, one per descriptor entry kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The operation's normal success word matched
    Ok,
    /// The server buried the job instead (put/release)
    Buried,
    /// A reserve-with-timeout expired with nothing to hand out
    TimedOut,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Ok => "ok",
            Outcome::Buried => "buried",
            Outcome::TimedOut => "timeout",
        }
    }
}

/// How to interpret the body following a header line, if any
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// No body follows the header line
    None,
    /// Opaque job payload bytes
    Raw,
    /// YAML block (stats and list replies)
    Yaml,
}

/// One acceptable response shape for an operation
#[derive(Debug)]
pub struct Expect {
    /// Status word opening the header line (e.g. "RESERVED")
    pub word: &'static str,

    /// Outcome tag recorded on the reply when this entry matches
    pub outcome: Outcome,

    /// Names for the positional values following the status word
    pub fields: &'static [&'static str],

    /// Body expectation; entries with a body always carry a `bytes` field
    pub body: BodyKind,
}

impl Expect {
    /// Decode raw body bytes per this entry's body kind.
    pub fn decode_body(&self, raw: Bytes) -> Result<Body> {
        match self.body {
            BodyKind::None => Err(BeanError::UnexpectedResponse(format!(
                "{} carries no body",
                self.word
            ))),
            BodyKind::Raw => Ok(Body::Raw(raw)),
            BodyKind::Yaml => {
                if raw.iter().all(|b| b.is_ascii_whitespace()) {
                    return Ok(Body::Structured(serde_yaml::Value::Null));
                }
                let value: serde_yaml::Value =
                    serde_yaml::from_slice(&raw).map_err(|e| BeanError::BodyDecode(e.to_string()))?;
                Ok(Body::Structured(value))
            }
        }
    }
}

/// Static descriptor for one operation: its name and every response
/// shape the server may legally answer with.
#[derive(Debug)]
pub struct OpSpec {
    pub name: &'static str,
    pub expects: &'static [Expect],
}

impl OpSpec {
    /// Find the entry matching a received status word, if any.
    pub fn lookup(&self, word: &str) -> Option<&'static Expect> {
        self.expects.iter().find(|e| e.word == word)
    }
}

// =============================================================================
// Descriptor Table
// =============================================================================

pub static PUT: OpSpec = OpSpec {
    name: "put",
    expects: &[
        Expect { word: "INSERTED", outcome: Outcome::Ok, fields: &["jid"], body: BodyKind::None },
        Expect { word: "BURIED", outcome: Outcome::Buried, fields: &["jid"], body: BodyKind::None },
    ],
};

pub static USE: OpSpec = OpSpec {
    name: "use",
    expects: &[Expect { word: "USING", outcome: Outcome::Ok, fields: &["tube"], body: BodyKind::None }],
};

pub static RESERVE: OpSpec = OpSpec {
    name: "reserve",
    expects: &[Expect {
        word: "RESERVED",
        outcome: Outcome::Ok,
        fields: &["jid", "bytes"],
        body: BodyKind::Raw,
    }],
};

pub static RESERVE_WITH_TIMEOUT: OpSpec = OpSpec {
    name: "reserve-with-timeout",
    expects: &[
        Expect { word: "RESERVED", outcome: Outcome::Ok, fields: &["jid", "bytes"], body: BodyKind::Raw },
        Expect { word: "TIMED_OUT", outcome: Outcome::TimedOut, fields: &[], body: BodyKind::None },
    ],
};

pub static DELETE: OpSpec = OpSpec {
    name: "delete",
    expects: &[Expect { word: "DELETED", outcome: Outcome::Ok, fields: &[], body: BodyKind::None }],
};

pub static RELEASE: OpSpec = OpSpec {
    name: "release",
    expects: &[
        Expect { word: "RELEASED", outcome: Outcome::Ok, fields: &[], body: BodyKind::None },
        Expect { word: "BURIED", outcome: Outcome::Buried, fields: &[], body: BodyKind::None },
    ],
};

pub static BURY: OpSpec = OpSpec {
    name: "bury",
    expects: &[Expect { word: "BURIED", outcome: Outcome::Ok, fields: &[], body: BodyKind::None }],
};

pub static WATCH: OpSpec = OpSpec {
    name: "watch",
    expects: &[Expect { word: "WATCHING", outcome: Outcome::Ok, fields: &["count"], body: BodyKind::None }],
};

pub static IGNORE: OpSpec = OpSpec {
    name: "ignore",
    expects: &[Expect { word: "WATCHING", outcome: Outcome::Ok, fields: &["count"], body: BodyKind::None }],
};

static FOUND_SHAPE: [Expect; 1] = [Expect {
    word: "FOUND",
    outcome: Outcome::Ok,
    fields: &["jid", "bytes"],
    body: BodyKind::Raw,
}];

pub static PEEK: OpSpec = OpSpec {
    name: "peek",
    expects: &FOUND_SHAPE,
};

pub static PEEK_READY: OpSpec = OpSpec {
    name: "peek-ready",
    expects: &FOUND_SHAPE,
};

pub static PEEK_DELAYED: OpSpec = OpSpec {
    name: "peek-delayed",
    expects: &FOUND_SHAPE,
};

pub static PEEK_BURIED: OpSpec = OpSpec {
    name: "peek-buried",
    expects: &FOUND_SHAPE,
};

pub static KICK: OpSpec = OpSpec {
    name: "kick",
    expects: &[Expect { word: "KICKED", outcome: Outcome::Ok, fields: &["count"], body: BodyKind::None }],
};

pub static TOUCH: OpSpec = OpSpec {
    name: "touch",
    expects: &[Expect { word: "TOUCHED", outcome: Outcome::Ok, fields: &[], body: BodyKind::None }],
};

static STATS_SHAPE: [Expect; 1] = [Expect {
    word: "OK",
    outcome: Outcome::Ok,
    fields: &["bytes"],
    body: BodyKind::Yaml,
}];

pub static STATS: OpSpec = OpSpec {
    name: "stats",
    expects: &STATS_SHAPE,
};

pub static STATS_JOB: OpSpec = OpSpec {
    name: "stats-job",
    expects: &STATS_SHAPE,
};

pub static STATS_TUBE: OpSpec = OpSpec {
    name: "stats-tube",
    expects: &STATS_SHAPE,
};

pub static LIST_TUBES: OpSpec = OpSpec {
    name: "list-tubes",
    expects: &STATS_SHAPE,
};

pub static LIST_TUBE_USED: OpSpec = OpSpec {
    name: "list-tube-used",
    expects: &[Expect { word: "USING", outcome: Outcome::Ok, fields: &["tube"], body: BodyKind::None }],
};

pub static LIST_TUBES_WATCHED: OpSpec = OpSpec {
    name: "list-tubes-watched",
    expects: &STATS_SHAPE,
};

// =============================================================================
// Reply Record
// =============================================================================

/// One positional header-line value, coerced to an integer when it
/// parses as one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Int(u64),
    Str(String),
}

impl FieldValue {
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            FieldValue::Int(n) => Some(*n),
            FieldValue::Str(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Int(_) => None,
            FieldValue::Str(s) => Some(s),
        }
    }
}

/// Best-effort integer coercion for header-line values.
///
/// A token that fails to parse is kept as a string rather than raising.
/// This forgiving policy is deliberate and isolated here so it can be
/// tightened without touching the parser; note it can mask a malformed
/// numeric field.
pub fn coerce_field(token: &str) -> FieldValue {
    match token.parse::<u64>() {
        Ok(n) => FieldValue::Int(n),
        Err(_) => FieldValue::Str(token.to_string()),
    }
}

/// Decoded response body
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Opaque job payload
    Raw(Bytes),
    /// Decoded YAML block
    Structured(serde_yaml::Value),
}

impl Body {
    pub fn as_raw(&self) -> Option<&Bytes> {
        match self {
            Body::Raw(b) => Some(b),
            Body::Structured(_) => None,
        }
    }

    pub fn as_yaml(&self) -> Option<&serde_yaml::Value> {
        match self {
            Body::Raw(_) => None,
            Body::Structured(v) => Some(v),
        }
    }
}

/// A fully decoded server reply
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    /// Which descriptor entry matched
    pub outcome: Outcome,

    /// Header-line values, in descriptor order, named per the descriptor
    pub fields: Vec<(&'static str, FieldValue)>,

    /// Decoded body, present iff the matched entry declares one
    pub body: Option<Body>,
}

impl Reply {
    /// Look up a header field by its descriptor name
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    /// Integer field accessor
    pub fn int_field(&self, name: &str) -> Option<u64> {
        self.field(name).and_then(FieldValue::as_u64)
    }

    /// String field accessor
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(FieldValue::as_str)
    }

    /// Job id, where the reply carries one (put, reserve, peek)
    pub fn jid(&self) -> Option<u64> {
        self.int_field("jid")
    }

    /// Declared body length, where the reply carries one
    pub fn byte_count(&self) -> Option<u64> {
        self.int_field("bytes")
    }

    /// Watched-tube or kicked-job count
    pub fn count(&self) -> Option<u64> {
        self.int_field("count")
    }

    /// Tube name (use, list-tube-used)
    pub fn tube(&self) -> Option<&str> {
        self.str_field("tube")
    }

    /// Raw body bytes, for payload-bearing replies
    pub fn raw_body(&self) -> Option<&Bytes> {
        self.body.as_ref().and_then(Body::as_raw)
    }

    /// Decoded YAML body, for stats and list replies
    pub fn yaml_body(&self) -> Option<&serde_yaml::Value> {
        self.body.as_ref().and_then(Body::as_yaml)
    }
}
