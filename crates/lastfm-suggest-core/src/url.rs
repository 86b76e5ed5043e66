use crate::{error::SuggestError, model::ActionTarget};

const HTTP_SCHEMES: [&str; 2] = ["http://", "https://"];

/// Qualifies a page URL from the web service with `http://` when the record
/// omitted the protocol. Already-qualified URLs pass through untouched.
pub fn normalize(raw: &str) -> Result<ActionTarget, SuggestError> {
    let url = raw.trim();
    if url.is_empty() {
        return Err(SuggestError::invalid("no URL given"));
    }

    if has_http_scheme(url) {
        Ok(ActionTarget::new(url.to_string()))
    } else {
        Ok(ActionTarget::new(format!("http://{url}")))
    }
}

fn has_http_scheme(url: &str) -> bool {
    HTTP_SCHEMES.iter().any(|scheme| {
        url.get(..scheme.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(scheme))
    })
}
