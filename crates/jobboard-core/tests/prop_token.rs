use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use jobboard_core::{access_token_expiry, ErrorBody};
use proptest::prelude::*;

proptest! {
    #[test]
    fn expiry_never_panics_on_arbitrary_input(token in ".{0,256}") {
        let _ = access_token_expiry(&token);
    }

    #[test]
    fn expiry_matches_encoded_claim(exp in 0i64..4_102_444_800i64, sub in "[a-z0-9]{1,12}") {
        let payload = format!(r#"{{"sub":"{sub}","exp":{exp}}}"#);
        let token = format!("e30.{}.c2ln", URL_SAFE_NO_PAD.encode(payload));
        let expiry = access_token_expiry(&token).expect("expiry");
        prop_assert_eq!(expiry.timestamp(), exp);
    }

    #[test]
    fn error_message_is_never_empty_for_non_blank_bodies(body in "[a-zA-Z0-9 ]{1,64}") {
        prop_assume!(!body.trim().is_empty());
        prop_assert!(!ErrorBody::message_from(&body).is_empty());
    }
}
