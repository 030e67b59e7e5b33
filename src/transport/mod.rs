//! Transport layer: wire-format details (gateway form/JSON, outcome event JSON).

mod dispatch;
mod outcome;

pub use dispatch::{GatewayStatus, decode_dispatch_json_response, encode_dispatch_form};
pub use outcome::{decode_outcome_json, encode_outcome_json};
