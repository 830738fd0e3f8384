use serde_json::{Map, Value, json};

use crate::domain::{OtpId, RegisterDomain, SendOtp, SendText};

pub fn encode_send_text_body(request: &SendText) -> Value {
    json!({
        "to": request.to().e164(),
        "message": request.message().as_str(),
    })
}

pub fn encode_send_otp_body(request: &SendOtp) -> Value {
    let mut body = Map::new();
    body.insert("to".to_owned(), Value::from(request.to().e164()));
    body.insert(
        "language".to_owned(),
        Value::from(request.otp_language().code()),
    );
    if let Some(name) = request.app_name() {
        body.insert("name".to_owned(), Value::from(name));
    }
    Value::Object(body)
}

pub fn encode_resend_otp_body(otp_id: &OtpId) -> Value {
    json!({ "otp_id": otp_id.as_str() })
}

pub fn encode_verify_otp_body(otp: &str, otp_id: &OtpId) -> Value {
    json!({
        "otp": otp,
        "otp_id": otp_id.as_str(),
    })
}

pub fn encode_register_domain_body(request: &RegisterDomain) -> Value {
    json!({
        "region": request.sending_region(),
        "custom_return_path": request.return_path(),
    })
}
