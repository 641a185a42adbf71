use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use validator::{Validate, ValidateEmail, ValidationError, ValidationErrors, ValidationErrorsKind};

use super::{ContactInput, ContactPatch, Phone};

pub static NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\p{L}+$").unwrap());
pub static CITY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z\s]+$").unwrap());
pub static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+\d-\d{3}-\d{3}-\d{4}$").unwrap());
pub static POSTAL_CODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{5}(-\d{4})?$").unwrap());

pub const MAX_EMAIL_LEN: usize = 100;
const TAG_MIN_LEN: usize = 2;
const TAG_MAX_LEN: usize = 20;

/// Field path (`email.primary`, `phones[0].number`) to messages
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Validate a create payload
pub fn validate_input(input: &ContactInput) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    if let Err(e) = input.validate() {
        collect_errors("", &e, &mut errors);
    }
    if let Some(tags) = &input.tags {
        check_tags(tags, &mut errors);
    }
    finish(errors)
}

/// Validate the fields present in a patch
pub fn validate_patch(patch: &ContactPatch) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    if let Err(e) = patch.validate() {
        collect_errors("", &e, &mut errors);
    }
    if let Some(Some(address)) = &patch.address {
        if let Err(e) = address.validate() {
            collect_errors("address", &e, &mut errors);
        }
    }
    if let Some(Some(company)) = &patch.company {
        if let Err(e) = company.validate() {
            collect_errors("company", &e, &mut errors);
        }
    }
    if let Some(Some(tags)) = &patch.tags {
        if tags.len() > 10 {
            push(&mut errors, "tags", "At most 10 tags are allowed".to_string());
        }
        check_tags(tags, &mut errors);
    }
    finish(errors)
}

/// Exactly one phone carries the primary flag
pub fn has_single_primary_phone(phones: &[Phone]) -> bool {
    phones.iter().filter(|p| p.primary).count() == 1
}

/// Format check for a lone email address (lookup endpoint)
pub fn is_valid_email(email: &str) -> bool {
    email.chars().count() <= MAX_EMAIL_LEN && email.validate_email()
}

fn check_tags(tags: &[String], errors: &mut FieldErrors) {
    for (i, tag) in tags.iter().enumerate() {
        let len = tag.chars().count();
        if !(TAG_MIN_LEN..=TAG_MAX_LEN).contains(&len) {
            push(
                errors,
                &format!("tags[{}]", i),
                format!("must be between {} and {} characters", TAG_MIN_LEN, TAG_MAX_LEN),
            );
        }
    }
}

fn finish(errors: FieldErrors) -> Result<(), FieldErrors> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn push(errors: &mut FieldErrors, path: &str, message: String) {
    errors.entry(path.to_string()).or_default().push(message);
}

/// Flatten nested validator output into dotted, camelCase paths
pub fn collect_errors(prefix: &str, errors: &ValidationErrors, out: &mut FieldErrors) {
    for (field, kind) in errors.errors() {
        let name = wire_name(field);
        let path = if prefix.is_empty() { name } else { format!("{}.{}", prefix, name) };
        match kind {
            ValidationErrorsKind::Field(list) => {
                for error in list {
                    push(out, &path, describe(error));
                }
            }
            ValidationErrorsKind::Struct(inner) => collect_errors(&path, inner, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_errors(&format!("{}[{}]", path, index), inner, out);
                }
            }
        }
    }
}

fn wire_name(field: &str) -> String {
    if field == "kind" {
        return "type".to_string();
    }
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

fn describe(error: &ValidationError) -> String {
    if let Some(message) = &error.message {
        return message.to_string();
    }
    match error.code.as_ref() {
        "length" => {
            let min = error.params.get("min").and_then(|v| v.as_u64());
            let max = error.params.get("max").and_then(|v| v.as_u64());
            let equal = error.params.get("equal").and_then(|v| v.as_u64());
            match (equal, min, max) {
                (Some(n), _, _) => format!("must be exactly {} characters", n),
                (None, Some(min), Some(max)) => format!("must be between {} and {} characters", min, max),
                (None, Some(min), None) => format!("must be at least {} characters", min),
                (None, None, Some(max)) => format!("must be at most {} characters", max),
                _ => "has an invalid length".to_string(),
            }
        }
        "email" => "must be a valid email address".to_string(),
        "regex" => "has an invalid format".to_string(),
        other => format!("failed {} validation", other),
    }
}
