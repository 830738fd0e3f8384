//! Transport layer: wire-format details (envelope decoding, request bodies).

mod collection;
mod envelope;
mod item;
mod messaging;

pub use collection::{
    decode_query_response, encode_insert_body, encode_put_body, encode_query_body,
    encode_update_body,
};
pub use envelope::{
    DecodeError, JsonKind, Shape, decode_api_error, decode_item, decode_items,
    decode_response, decode_response_list,
};
pub use item::{EXPIRES_ATTRIBUTE, EncodeError, encode_item, flatten_item, item_key, set_expiry};
pub use messaging::{
    encode_register_domain_body, encode_resend_otp_body, encode_send_otp_body,
    encode_send_text_body, encode_verify_otp_body,
};
