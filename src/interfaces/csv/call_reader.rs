use crate::domain::account::{AccountId, Amount};
use crate::domain::call::Call;
use crate::error::{Result, SplitterError};
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum CallType {
    Fund,
    Register,
    Contribute,
    SetActive,
    Release,
}

/// One row of a call file: `type, caller, amount, first, second, active`.
///
/// Columns a call type does not use are left empty.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct CallRecord {
    pub r#type: CallType,
    pub caller: AccountId,
    pub amount: Option<u64>,
    pub first: Option<AccountId>,
    pub second: Option<AccountId>,
    pub active: Option<bool>,
}

fn required<T>(value: Option<T>, column: &str, call: CallType) -> Result<T> {
    value.ok_or_else(|| SplitterError::MalformedCall(format!("{call:?} requires '{column}'")))
}

impl TryFrom<CallRecord> for Call {
    type Error = SplitterError;

    fn try_from(record: CallRecord) -> Result<Self> {
        let kind = record.r#type;
        let call = match kind {
            CallType::Fund => Call::Fund {
                account: record.caller,
                amount: Amount::new(required(record.amount, "amount", kind)?)?,
            },
            CallType::Register => Call::RegisterParticipants {
                caller: record.caller,
                first: required(record.first, "first", kind)?,
                second: required(record.second, "second", kind)?,
            },
            // Left unvalidated: the mechanism itself rejects zero.
            CallType::Contribute => Call::Contribute {
                caller: record.caller,
                value: required(record.amount, "amount", kind)?,
            },
            CallType::SetActive => Call::SetActiveState {
                caller: record.caller,
                active: required(record.active, "active", kind)?,
            },
            CallType::Release => Call::ReleasePending {
                caller: record.caller,
            },
        };
        Ok(call)
    }
}

/// Reads calls from a CSV source.
///
/// This reader wraps `csv::Reader` and provides an iterator over `Result<Call>`.
/// It handles whitespace trimming and flexible record lengths automatically.
pub struct CallReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CallReader<R> {
    /// Creates a new `CallReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and converts calls.
    ///
    /// This allows for processing large files in a streaming fashion without loading
    /// the entire dataset into memory.
    pub fn calls(self) -> impl Iterator<Item = Result<Call>> {
        self.reader.into_deserialize::<CallRecord>().map(|result| {
            result
                .map_err(SplitterError::from)
                .and_then(Call::try_from)
        })
    }
}
