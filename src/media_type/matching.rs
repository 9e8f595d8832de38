//! Media-type matching predicates.
//!
//! Two relations over `(left, right)` pairs drive all codec selection:
//!
//! | Relation | Type/subtype | Parameters |
//! |----------|--------------|------------|
//! | [`is_subset_of`] | directional (right may hold wildcards) | left ⊆ right |
//! | [`is_match`] | directional (right may hold wildcards) | left ⊆ right AND right ⊆ left |
//!
//! `"text/plain"` is a subset of `"text/plain"`, `"text/*"` and `"*/*"`;
//! `"*/*"` is a subset only of `"*/*"`. Parameters named `q`, `*`, or
//! `charset` (case-insensitive) never participate in either relation,
//! regardless of value or side.
//!
//! The asymmetry of [`is_match`] - parameters checked both ways while
//! type/subtype stays one-directional - is a fixed contract; callers that
//! need the mirrored direction swap the arguments.
//!
//! Both predicates assume structurally valid inputs; parse failures are
//! reported by [`MediaType::parse`](super::MediaType::parse) before any
//! matching happens.

use super::MediaType;

/// Parameter names excluded from both relations: `q` separates the
/// media-range parameters from accept-params, `*` only marks a whole
/// media-type wildcard, and `charset` is appended by transports.
const EXCLUDED_PARAMETERS: &[&str] = &["q", "*", "charset"];

/// True iff every concrete aspect of `left` is covered by `right`.
///
/// Checks type match, subtype match, and parameter containment
/// (left ⊆ right) in that order, short-circuiting on the first failure.
pub fn is_subset_of(left: &MediaType, right: &MediaType) -> bool {
    matches_type(left, right)
        && matches_subtype(left, right)
        && contains_all_parameters(left, right)
}

/// True iff `left` and `right` agree on all parameters (both directions)
/// and `left`'s type/subtype is covered by `right`'s.
///
/// Used when deciding whether a codec whose supported type includes a
/// wildcard should accept a concrete request type, or vice versa.
pub fn is_match(left: &MediaType, right: &MediaType) -> bool {
    matches_type(left, right)
        && matches_subtype(left, right)
        && contains_all_parameters(left, right)
        && contains_all_parameters(right, left)
}

/// True iff `value` contains a wildcard: type `*`, subtype-without-suffix
/// `*`, or a parameter literally named `*`.
pub fn has_wildcard(value: &MediaType) -> bool {
    value.matches_all_types()
        || value.matches_all_subtypes_without_suffix()
        || value
            .parameters()
            .iter()
            .any(|parameter| parameter.is_named("*"))
}

fn matches_type(left: &MediaType, right: &MediaType) -> bool {
    right.matches_all_types() || right.type_().eq_ignore_ascii_case(left.type_())
}

fn matches_subtype(left: &MediaType, right: &MediaType) -> bool {
    if right.matches_all_subtypes() {
        return true;
    }

    if right.suffix().is_some() {
        // A suffixed set (e.g. "*+json" or "vnd.example+json") only
        // covers suffixed subtypes; there is no wildcard support on the
        // suffix alone.
        match left.suffix() {
            Some(_) => {
                matches_subtype_without_suffix(left, right) && matches_subtype_suffix(left, right)
            }
            None => false,
        }
    } else {
        // A plain subtype on the right also covers the left's suffix:
        // application/json > application/vnd.example+json.
        matches_either_subtype_or_suffix(left, right)
    }
}

fn matches_either_subtype_or_suffix(left: &MediaType, right: &MediaType) -> bool {
    right.subtype().eq_ignore_ascii_case(left.subtype())
        || left
            .suffix()
            .is_some_and(|suffix| right.subtype().eq_ignore_ascii_case(suffix))
}

fn matches_subtype_without_suffix(left: &MediaType, right: &MediaType) -> bool {
    right.matches_all_subtypes_without_suffix()
        || right
            .subtype_without_suffix()
            .eq_ignore_ascii_case(left.subtype_without_suffix())
}

fn matches_subtype_suffix(left: &MediaType, right: &MediaType) -> bool {
    match (left.suffix(), right.suffix()) {
        (Some(left_suffix), Some(right_suffix)) => {
            right_suffix.eq_ignore_ascii_case(left_suffix)
        }
        _ => false,
    }
}

/// Every parameter of `left` - excluding the names in
/// [`EXCLUDED_PARAMETERS`] - must appear in `right` with an equal name
/// (case-insensitive) and equal value (case-sensitive). Extra parameters
/// on `right` never fail the check.
fn contains_all_parameters(left: &MediaType, right: &MediaType) -> bool {
    left.parameters()
        .iter()
        .filter(|parameter| {
            !EXCLUDED_PARAMETERS
                .iter()
                .any(|excluded| parameter.is_named(excluded))
        })
        .all(|left_parameter| {
            right.parameters().iter().any(|right_parameter| {
                right_parameter.is_named(left_parameter.name())
                    && right_parameter.value() == left_parameter.value()
            })
        })
}
