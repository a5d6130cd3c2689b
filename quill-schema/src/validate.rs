use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use crate::errors::SchemaErrors;

fn friendly_message(code: &str) -> Option<&'static str> {
    match code {
        "required" => Some("is required"),
        "length" => Some("has invalid length"),
        "range" => Some("is out of range"),
        _ => None,
    }
}

fn join_path(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{prefix}.{field}")
    }
}

fn push_validation_errors(out: &mut SchemaErrors, prefix: &str, errs: &ValidationErrors) {
    // validator keeps fields in a HashMap; sort so messages come out stable.
    let mut fields: Vec<_> = errs.errors().iter().collect();
    fields.sort_by(|a, b| a.0.cmp(b.0));

    for (field, kind) in fields {
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                let key = join_path(prefix, field);
                for e in field_errors {
                    let msg = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .or_else(|| friendly_message(&e.code).map(|m| format!("{key} {m}")))
                        .unwrap_or_else(|| e.code.to_string());
                    out.push_field(&key, msg);
                }
            }
            ValidationErrorsKind::Struct(nested) => {
                let next = join_path(prefix, field);
                push_validation_errors(out, &next, nested.as_ref());
            }
            ValidationErrorsKind::List(list) => {
                let base = join_path(prefix, field);
                for (idx, nested) in list {
                    push_validation_errors(out, &format!("{base}[{idx}]"), nested.as_ref());
                }
            }
        }
    }
}

/// Run `validator` rules on `value`, appending failures to `out`.
pub fn collect_validation_errors<T: Validate>(value: &T, out: &mut SchemaErrors) {
    if let Err(errs) = value.validate() {
        push_validation_errors(out, "", &errs);
    }
}
