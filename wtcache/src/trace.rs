use std::fmt;
use std::io::BufRead;
use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;
use crate::hex::HEX_LOOKUP;

/// Longest data payload accepted on a STORE or MODIFY record, in bytes
pub const MAX_DATA_BYTES: usize = 64;

lazy_static! {
    // <op> <address>, <size>[, <data>]
    static ref TRACE_LINE: Regex = Regex::new(
        r"^\s*(?P<op>\S)\s+(?P<address>[^,\s]+)\s*,\s*(?P<size>[^,\s]+)\s*(?:,\s*(?P<data>\S*))?\s*$"
    ).unwrap();
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum OpKind {
    Load,
    Store,
    Modify,
    Instruction,
}

/// A decoded trace record
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct TraceOp {
    pub kind: OpKind,
    pub address: u32,
    pub size: u32,
    /// Bytes to write, empty for loads and instruction fetches
    pub data: Vec<u8>,
    /// The data as written in the trace, echoed unchanged in the operation log
    pub data_text: String,
}

#[derive(Debug, Error, Eq, PartialEq)]
pub enum TraceErrorKind {
    #[error("expected `<op> <address>, <size>[, <data>]`")]
    Malformed,
    #[error("unknown operation `{0}`")]
    UnknownOperation(String),
    #[error("invalid address `{0}`")]
    BadAddress(String),
    #[error("invalid size `{0}`")]
    BadSize(String),
    #[error("{0:?} requires data")]
    MissingData(OpKind),
    #[error("data `{0}` is not a sequence of hex byte pairs")]
    BadData(String),
    #[error("data is {0} bytes long, the maximum is {max}", max = MAX_DATA_BYTES)]
    DataTooLong(usize),
    #[error("couldn't read the trace: {0}")]
    Io(String),
}

/// A record which couldn't be decoded, with its 1-based line number
#[derive(Debug, Error, Eq, PartialEq)]
#[error("trace line {line}: {kind}")]
pub struct TraceError {
    pub line: usize,
    pub kind: TraceErrorKind,
}

impl TraceOp {
    /// Builds a record from decoded data, as if the trace spelt the data in lowercase hex
    pub fn new(kind: OpKind, address: u32, size: u32, data: Vec<u8>) -> Self {
        let data_text = data.iter().map(|byte| format!("{byte:02x}")).collect();
        Self {
            kind,
            address,
            size,
            data,
            data_text,
        }
    }
}

impl OpKind {
    pub fn letter(&self) -> char {
        match self {
            OpKind::Load => 'L',
            OpKind::Store => 'S',
            OpKind::Modify => 'M',
            OpKind::Instruction => 'I',
        }
    }

    fn from_letter(letter: &str) -> Option<Self> {
        match letter {
            "L" => Some(OpKind::Load),
            "S" => Some(OpKind::Store),
            "M" => Some(OpKind::Modify),
            "I" => Some(OpKind::Instruction),
            _ => None,
        }
    }

    pub fn writes(&self) -> bool {
        matches!(self, OpKind::Store | OpKind::Modify)
    }
}

/// Formats the record the way it appears in the trace, with the address in lowercase hex and the
/// data exactly as given
impl fmt::Display for TraceOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:x}, {}", self.kind.letter(), self.address, self.size)?;
        if self.kind.writes() {
            write!(f, ", {}", self.data_text)?;
        }
        Ok(())
    }
}

/// Decodes a single trace line. Blank lines give `Ok(None)`
///
/// # Examples
///
/// ```
/// use wtcache::trace::{parse_trace_line, OpKind};
/// let op = parse_trace_line(" S 7ff0, 2, beef").unwrap().unwrap();
/// assert_eq!(op.kind, OpKind::Store);
/// assert_eq!(op.address, 0x7ff0);
/// assert_eq!(op.data, vec![0xbe, 0xef]);
/// assert_eq!(parse_trace_line("   ").unwrap(), None);
/// ```
pub fn parse_trace_line(line: &str) -> Result<Option<TraceOp>, TraceErrorKind> {
    if line.trim().is_empty() {
        return Ok(None);
    }
    let tokens = TRACE_LINE.captures(line).ok_or(TraceErrorKind::Malformed)?;
    let letter = &tokens["op"];
    let kind = OpKind::from_letter(letter).ok_or_else(|| TraceErrorKind::UnknownOperation(letter.to_string()))?;
    let address = parse_address(&tokens["address"])?;
    let size = tokens["size"].parse::<u32>().map_err(|_| TraceErrorKind::BadSize(tokens["size"].to_string()))?;
    let (data, data_text) = match (kind.writes(), tokens.name("data")) {
        (true, Some(data)) if !data.as_str().is_empty() => (parse_data(data.as_str())?, data.as_str().to_string()),
        (true, _) => return Err(TraceErrorKind::MissingData(kind)),
        // Loads and instruction fetches carry no data, anything trailing is ignored
        (false, _) => (Vec::new(), String::new()),
    };
    Ok(Some(TraceOp {
        kind,
        address,
        size,
        data,
        data_text,
    }))
}

fn parse_address(text: &str) -> Result<u32, TraceErrorKind> {
    let digits = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")).unwrap_or(text);
    u32::from_str_radix(digits, 16).map_err(|_| TraceErrorKind::BadAddress(text.to_string()))
}

fn parse_data(text: &str) -> Result<Vec<u8>, TraceErrorKind> {
    if text.len() % 2 != 0 || !text.bytes().all(|c| c.is_ascii_hexdigit()) {
        return Err(TraceErrorKind::BadData(text.to_string()));
    }
    let data = decode_hex_pairs(text.as_bytes());
    if data.len() > MAX_DATA_BYTES {
        return Err(TraceErrorKind::DataTooLong(data.len()));
    }
    Ok(data)
}

/// Decodes pairs of hex digits into bytes using the generated pair lookup table
///
/// The input is assumed to be well formed: an even number of hex digits. Other characters decode
/// as zero nibbles rather than failing
///
/// # Examples
///
/// ```
/// use wtcache::trace::decode_hex_pairs;
/// assert_eq!(decode_hex_pairs(b"00fFa1"), vec![0x00, 0xff, 0xa1]);
/// ```
pub fn decode_hex_pairs(text: &[u8]) -> Vec<u8> {
    text.chunks_exact(2)
        .map(|pair| HEX_LOOKUP[pair[0] as usize][pair[1] as usize])
        .collect()
}

/// Iterates over the records of a trace, skipping blank lines
///
/// Each item is either a decoded record or the reason its line couldn't be decoded, so the caller
/// decides whether a bad line is fatal
pub struct TraceReader<R> {
    lines: std::io::Lines<R>,
    line_number: usize,
}

impl<R: BufRead> TraceReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_number: 0,
        }
    }
}

impl<R: BufRead> Iterator for TraceReader<R> {
    type Item = Result<TraceOp, TraceError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = self.lines.next()?;
            self.line_number += 1;
            let parsed = line
                .map_err(|e| TraceErrorKind::Io(e.to_string()))
                .and_then(|text| parse_trace_line(&text));
            match parsed {
                Ok(None) => continue,
                Ok(Some(op)) => return Some(Ok(op)),
                Err(kind) => {
                    return Some(Err(TraceError {
                        line: self.line_number,
                        kind,
                    }))
                }
            }
        }
    }
}
