use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const ID_FIELD: &str = "id";
pub const TIMESTAMP_FIELD: &str = "timestamp";

pub type BookingId = i64;

/// One appointment record: the client's fields in submission order, with the
/// server-owned `id` and `timestamp` merged in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Booking {
    fields: Map<String, Value>,
}

impl Booking {
    /// Overwrites any client-supplied `id`/`timestamp` in place; otherwise
    /// they are appended after the client fields.
    pub fn new(mut fields: Map<String, Value>, id: BookingId, timestamp: String) -> Self {
        fields.insert(ID_FIELD.to_string(), Value::from(id));
        fields.insert(TIMESTAMP_FIELD.to_string(), Value::String(timestamp));
        Self { fields }
    }

    pub fn id(&self) -> Option<BookingId> {
        self.fields.get(ID_FIELD).and_then(Value::as_i64)
    }

    pub fn timestamp(&self) -> Option<&str> {
        self.fields.get(TIMESTAMP_FIELD).and_then(Value::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

impl From<Map<String, Value>> for Booking {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}
