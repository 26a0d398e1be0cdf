use std::collections::BTreeMap;

use super::domain::SubmissionForm;

/// Per-field error map keyed by the camelCase wire name.
pub type FieldErrors = BTreeMap<&'static str, &'static str>;

/// Check required fields and email shape. Pure; an empty map means the form
/// may proceed to persistence.
pub fn validate(form: &SubmissionForm) -> FieldErrors {
    let mut errors = FieldErrors::new();

    require(&mut errors, "firstName", &form.first_name, "First name is required");
    require(&mut errors, "surname", &form.surname, "Surname is required");
    require(&mut errors, "gender", &form.gender, "Gender is required");
    require(
        &mut errors,
        "dateOfBirth",
        &form.date_of_birth,
        "Date of birth is required",
    );
    require(
        &mut errors,
        "relationshipStatus",
        &form.relationship_status,
        "Relationship status is required",
    );
    require(
        &mut errors,
        "stateOfOrigin",
        &form.state_of_origin,
        "State of origin is required",
    );
    require(
        &mut errors,
        "localGovernment",
        &form.local_government,
        "Local government is required",
    );
    require(
        &mut errors,
        "employmentStatus",
        &form.employment_status,
        "Employment status is required",
    );
    require(
        &mut errors,
        "phoneNumber",
        &form.phone_number,
        "Phone number is required",
    );

    if form.email.trim().is_empty() {
        errors.insert("email", "Email is required");
    } else if !email_shape_ok(form.email.trim()) {
        errors.insert("email", "Email is invalid");
    }

    errors
}

fn require(
    errors: &mut FieldErrors,
    field: &'static str,
    value: &str,
    message: &'static str,
) {
    if value.trim().is_empty() {
        errors.insert(field, message);
    }
}

/// `<non-whitespace>@<non-whitespace>.<non-whitespace>`: something before the
/// first `@`, and a `.` with content on both sides after it.
fn email_shape_ok(email: &str) -> bool {
    if email.contains(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() {
        return false;
    }

    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}
