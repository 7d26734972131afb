//! Request validation: raw JSON / query / path input in, typed values or every field error out.

use crate::error::{AppError, FieldError};
use crate::model::{AddressPatch, AddressQuery, NewAddress, NewUser, UserPatch};
use axum::extract::rejection::JsonRejection;
use axum::Json;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::LazyLock;

static PINCODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{6}$").expect("pincode pattern compiles"));

static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+$").expect("digits pattern compiles"));

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[a-z0-9_'+\-.]*[a-z0-9_+\-]@([a-z0-9][a-z0-9\-]*\.)+[a-z]{2,}$")
        .expect("email pattern compiles")
});

pub struct RequestValidator;

impl RequestValidator {
    /// Unwrap an axum JSON extraction, reporting a malformed body as a field error.
    pub fn json_body(body: Result<Json<Value>, JsonRejection>) -> Result<Value, AppError> {
        body.map(|Json(v)| v)
            .map_err(|rejection| AppError::field("body", rejection.body_text()))
    }

    pub fn create_user(body: &Value) -> Result<NewUser, AppError> {
        let mut f = Fields::new(body);
        let first_name = f.text("first_name", true, non_empty("First Name is required"));
        let last_name = f.text("last_name", true, non_empty("Last Name is required"));
        let email = f.text("email", true, email());
        f.finish()?;
        match (first_name, last_name, email) {
            (Some(first_name), Some(last_name), Some(email)) => Ok(NewUser {
                first_name,
                last_name,
                email,
            }),
            _ => Err(AppError::field("body", "Required")),
        }
    }

    pub fn update_user(body: &Value) -> Result<UserPatch, AppError> {
        let mut f = Fields::new(body);
        let patch = UserPatch {
            first_name: f.text("first_name", false, non_empty("First Name is required")),
            last_name: f.text("last_name", false, non_empty("Last Name is required")),
            email: f.text("email", false, email()),
        };
        f.finish()?;
        Ok(patch)
    }

    pub fn create_address(body: &Value) -> Result<NewAddress, AppError> {
        let mut f = Fields::new(body);
        let user_id = f.positive_int("user_id", true, "User ID must be a positive integer");
        let street = f.text("street", true, non_empty("Street is required"));
        let city = f.text("city", true, non_empty("City is required"));
        let state = f.text("state", true, non_empty("State is required"));
        let pincode = f.text("pincode", true, pincode());
        f.finish()?;
        match (user_id, street, city, state, pincode) {
            (Some(user_id), Some(street), Some(city), Some(state), Some(pincode)) => Ok(NewAddress {
                user_id,
                street,
                city,
                state,
                pincode,
            }),
            _ => Err(AppError::field("body", "Required")),
        }
    }

    pub fn update_address(body: &Value) -> Result<AddressPatch, AppError> {
        let mut f = Fields::new(body);
        let patch = AddressPatch {
            user_id: f.positive_int("user_id", false, "User ID must be a positive integer"),
            street: f.text("street", false, non_empty("Street is required")),
            city: f.text("city", false, non_empty("City is required")),
            state: f.text("state", false, non_empty("State is required")),
            pincode: f.text("pincode", false, pincode()),
        };
        f.finish()?;
        Ok(patch)
    }

    /// `?pincode=&page=&limit=` for address listings. Unknown keys are ignored.
    pub fn address_query(params: &HashMap<String, String>) -> Result<AddressQuery, AppError> {
        let mut errors = Vec::new();
        let pincode = params.get("pincode").cloned();
        if let Some(p) = &pincode {
            if !PINCODE.is_match(p) {
                errors.push(FieldError::new("pincode", "Invalid pincode"));
            }
        }
        let page = number_param(params, "page", "Page must be a number", &mut errors);
        let limit = number_param(params, "limit", "Limit must be a number", &mut errors);
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }
        Ok(AddressQuery { pincode, page, limit })
    }

    /// Path `:id` as an integer; `label` names the resource in the message ("User ID").
    pub fn id_param(raw: &str, label: &str) -> Result<i64, AppError> {
        raw.trim()
            .parse::<i64>()
            .map_err(|_| AppError::field("id", format!("{} must be a number", label)))
    }
}

fn number_param(
    params: &HashMap<String, String>,
    key: &str,
    message: &str,
    errors: &mut Vec<FieldError>,
) -> Option<u32> {
    let raw = params.get(key)?;
    if !DIGITS.is_match(raw) {
        errors.push(FieldError::new(key, message));
        return None;
    }
    match raw.parse::<u32>() {
        Ok(n) => Some(n),
        Err(_) => {
            errors.push(FieldError::new(key, format!("{} is out of range", key)));
            None
        }
    }
}

/// `1.0` counts as an integer; fractions and values past 2^53 do not.
fn whole_number(value: &Value) -> Option<i64> {
    const MAX_SAFE: f64 = 9_007_199_254_740_991.0;
    value
        .as_f64()
        .filter(|f| f.fract() == 0.0 && f.abs() <= MAX_SAFE)
        .map(|f| f as i64)
}

type TextRule = Box<dyn Fn(&str) -> Option<&'static str>>;

fn non_empty(message: &'static str) -> TextRule {
    Box::new(move |s: &str| if s.is_empty() { Some(message) } else { None })
}

fn email() -> TextRule {
    Box::new(|s: &str| {
        if s.starts_with('.') || s.contains("..") || !EMAIL.is_match(s) {
            Some("Invalid email")
        } else {
            None
        }
    })
}

fn pincode() -> TextRule {
    Box::new(|s: &str| if PINCODE.is_match(s) { None } else { Some("Invalid pincode") })
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Collects field errors while reading an object body so every problem is reported at once.
struct Fields<'a> {
    object: Option<&'a Map<String, Value>>,
    errors: Vec<FieldError>,
}

impl<'a> Fields<'a> {
    fn new(body: &'a Value) -> Self {
        let mut errors = Vec::new();
        let object = body.as_object();
        if object.is_none() {
            errors.push(FieldError::new(
                "body",
                format!("Expected object, received {}", type_name(body)),
            ));
        }
        Self { object, errors }
    }

    fn get(&mut self, key: &str, required: bool) -> Option<&'a Value> {
        let object = self.object?;
        let value = object.get(key);
        if value.is_none() && required {
            self.errors.push(FieldError::new(key, "Required"));
        }
        value
    }

    fn text(&mut self, key: &str, required: bool, rule: TextRule) -> Option<String> {
        let value = self.get(key, required)?;
        let Some(s) = value.as_str() else {
            self.errors.push(FieldError::new(
                key,
                format!("Expected string, received {}", type_name(value)),
            ));
            return None;
        };
        if let Some(message) = rule(s) {
            self.errors.push(FieldError::new(key, message));
            return None;
        }
        Some(s.to_string())
    }

    fn positive_int(&mut self, key: &str, required: bool, message: &str) -> Option<i64> {
        let value = self.get(key, required)?;
        if !value.is_number() {
            self.errors.push(FieldError::new(
                key,
                format!("Expected number, received {}", type_name(value)),
            ));
            return None;
        }
        match value.as_i64().or_else(|| whole_number(value)) {
            Some(n) if n > 0 => Some(n),
            _ => {
                self.errors.push(FieldError::new(key, message));
                None
            }
        }
    }

    fn finish(self) -> Result<(), AppError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self.errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields_of(err: AppError) -> Vec<String> {
        match err {
            AppError::Validation(errors) => errors.into_iter().map(|e| e.field).collect(),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn create_user_accepts_valid_input() {
        let user = RequestValidator::create_user(&json!({
            "first_name": "Asha",
            "last_name": "Rao",
            "email": "asha.rao@example.com",
            "ignored": true
        }))
        .unwrap();
        assert_eq!(user.first_name, "Asha");
        assert_eq!(user.email, "asha.rao@example.com");
    }

    #[test]
    fn create_user_rejects_bad_email() {
        let err = RequestValidator::create_user(&json!({
            "first_name": "Asha",
            "last_name": "Rao",
            "email": "not-an-email"
        }))
        .unwrap_err();
        match err {
            AppError::Validation(errors) => {
                assert_eq!(errors, vec![FieldError::new("email", "Invalid email")]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn create_user_reports_all_fields() {
        let err = RequestValidator::create_user(&json!({ "first_name": "", "email": 7 })).unwrap_err();
        assert_eq!(fields_of(err), vec!["first_name", "last_name", "email"]);
    }

    #[test]
    fn email_edge_cases() {
        for bad in [".a@example.com", "a..b@example.com", "a@b", "a@example.c", "@example.com"] {
            let body = json!({ "first_name": "A", "last_name": "B", "email": bad });
            assert!(RequestValidator::create_user(&body).is_err(), "{bad} should be rejected");
        }
        for good in ["a+tag@example.co.in", "O'Neil@Example.COM", "x_y@sub-domain.example.org"] {
            let body = json!({ "first_name": "A", "last_name": "B", "email": good });
            assert!(RequestValidator::create_user(&body).is_ok(), "{good} should be accepted");
        }
    }

    #[test]
    fn non_object_body_is_rejected() {
        let err = RequestValidator::create_user(&json!([1, 2])).unwrap_err();
        assert_eq!(fields_of(err), vec!["body"]);
    }

    #[test]
    fn update_user_keeps_absent_fields_absent() {
        let patch = RequestValidator::update_user(&json!({ "last_name": "Iyer" })).unwrap();
        assert_eq!(
            patch,
            UserPatch {
                first_name: None,
                last_name: Some("Iyer".into()),
                email: None,
            }
        );
        assert_eq!(RequestValidator::update_user(&json!({})).unwrap(), UserPatch::default());
    }

    #[test]
    fn update_rejects_explicit_null() {
        let err = RequestValidator::update_user(&json!({ "email": null })).unwrap_err();
        assert_eq!(fields_of(err), vec!["email"]);
    }

    #[test]
    fn create_address_validates_pincode_and_user_id() {
        let err = RequestValidator::create_address(&json!({
            "user_id": -4,
            "street": "Main",
            "city": "X",
            "state": "Y",
            "pincode": "56001"
        }))
        .unwrap_err();
        assert_eq!(fields_of(err), vec!["user_id", "pincode"]);

        let ok = RequestValidator::create_address(&json!({
            "user_id": 1,
            "street": "Main",
            "city": "X",
            "state": "Y",
            "pincode": "560001"
        }))
        .unwrap();
        assert_eq!(ok.pincode, "560001");
    }

    #[test]
    fn whole_float_user_id_is_an_integer() {
        let patch = RequestValidator::update_address(&json!({ "user_id": 1.0 })).unwrap();
        assert_eq!(patch.user_id, Some(1));

        let err = RequestValidator::update_address(&json!({ "user_id": 1.5 })).unwrap_err();
        assert_eq!(fields_of(err), vec!["user_id"]);
        let err = RequestValidator::update_address(&json!({ "user_id": 1e300 })).unwrap_err();
        assert_eq!(fields_of(err), vec!["user_id"]);
    }

    #[test]
    fn update_address_partial() {
        let patch = RequestValidator::update_address(&json!({ "pincode": "110011" })).unwrap();
        assert_eq!(patch.pincode.as_deref(), Some("110011"));
        assert!(patch.street.is_none());
        assert!(RequestValidator::update_address(&json!({ "user_id": "1" })).is_err());
    }

    #[test]
    fn address_query_rules() {
        let mut params = HashMap::new();
        params.insert("pincode".to_string(), "560001".to_string());
        params.insert("page".to_string(), "2".to_string());
        let q = RequestValidator::address_query(&params).unwrap();
        assert_eq!(q.pincode.as_deref(), Some("560001"));
        assert_eq!(q.page, Some(2));
        assert_eq!(q.limit, None);

        params.insert("pincode".to_string(), "5600".to_string());
        params.insert("limit".to_string(), "ten".to_string());
        let err = RequestValidator::address_query(&params).unwrap_err();
        assert_eq!(fields_of(err), vec!["pincode", "limit"]);
    }

    #[test]
    fn id_param_must_be_integer() {
        assert_eq!(RequestValidator::id_param("42", "User ID").unwrap(), 42);
        match RequestValidator::id_param("abc", "Address ID").unwrap_err() {
            AppError::Validation(errors) => assert_eq!(errors[0].message, "Address ID must be a number"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
