#![no_main]

use libfuzzer_sys::fuzz_target;

use registration::{
    claims,
    field::{self, Field, FieldErrors},
    guard::{self, Access},
    FormState,
};

use chrono::NaiveDate;
use std::str;

fuzz_target!(|data: &[u8]| {
    let input = match str::from_utf8(data) {
        Ok(s) => s,
        Err(_) => return,
    };

    // Whatever the token, decoding must not crash and the guard must agree with it.
    let decoded = claims::decode(Some(input));
    match guard::evaluate(Some(input)) {
        Access::Granted(claims) => {
            assert_eq!(claims.aud.as_deref(), Some(guard::REGISTRATION_AUDIENCE));
            assert_eq!(decoded.unwrap().claims(), claims);
            let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
            let form = FormState::new(&claims, today);
            let details = form.snapshot();
            assert!(!details.first_name.contains(char::is_whitespace));
        }
        Access::Denied(_) => {}
    }

    // The same input read as a list of server messages.
    let messages: Vec<&str> = input.lines().collect();
    let errors = FieldErrors::classify(Some(&messages[..]));
    for f in Field::ALL {
        let message = errors.get(f);
        assert_eq!(message, field::classify(Some(&messages[..]), f));
        assert!(message.is_empty() || message.starts_with(f.error_prefix()));
    }
});
