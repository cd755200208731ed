use std::collections::HashMap;

/// Field names telephony providers use for the caller's number, highest
/// priority first.
pub const CALLER_NUMBER_FIELDS: [&str; 4] = ["CallerId", "phone_number", "CallFrom", "From"];

/// Pick the caller number out of a webhook request.
///
/// Field priority wins over source: for each name in [`CALLER_NUMBER_FIELDS`]
/// the form body is checked before the query string. The first value that is
/// not blank wins and is returned trimmed; phone formats are not normalized.
pub fn extract_caller_number(
    form: &HashMap<String, String>,
    query: &HashMap<String, String>,
) -> Option<String> {
    CALLER_NUMBER_FIELDS.iter().find_map(|field| {
        [form, query]
            .into_iter()
            .filter_map(|source| source.get(*field))
            .map(|value| value.trim())
            .find(|value| !value.is_empty())
            .map(str::to_string)
    })
}
