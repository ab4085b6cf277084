use reqwest::{
    header::{HeaderName, HeaderValue, AUTHORIZATION},
    Body, Request, Url,
};

use super::RequestParams;
use crate::error::Error;

/// Turns `params` and an optional raw body into a transport-ready request.
///
/// Caller headers go in first; the bearer token goes in last so it always wins
/// over a hand-written `Authorization` header.
pub(crate) fn build_request(
    params: &RequestParams,
    payload: Option<Vec<u8>>,
) -> Result<Request, Error> {
    let mut url = join_url(
        &params.base_url,
        [
            ("api version", params.api_version.as_str()),
            ("sender id", params.sender_id.as_str()),
            ("endpoint", params.endpoint.as_str()),
        ],
    )?;

    if !params.query.is_empty() {
        url.query_pairs_mut().extend_pairs(params.query.iter());
    }

    let mut request = Request::new(params.method.clone(), url);
    *request.timeout_mut() = params.timeout;

    // Raw bytes as given, no re-serialization
    if let Some(payload) = payload {
        *request.body_mut() = Some(Body::from(payload));
    }

    let headers = request.headers_mut();
    for (name, value) in &params.headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|err| Error::request(format!("invalid header name {name:?}: {err}")))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|err| Error::request(format!("invalid value for header {name:?}: {err}")))?;
        headers.insert(header_name, header_value);
    }

    if let Some(token) = params.bearer.as_deref().filter(|token| !token.is_empty()) {
        // Never echo the token back in the error.
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|err| Error::request(format!("invalid bearer token: {err}")))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
    }

    Ok(request)
}

/// Joins `parts` onto `base` as path segments.
///
/// Empty segments and `.` are dropped, `..` removes the previous segment, so
/// `"https://host/" + "/v22.0/" + "id" + "/messages"` and
/// `"https://host" + "v22.0" + "id/" + "messages"` land on the same URL.
pub(crate) fn join_url<'a, const N: usize>(
    base: &str,
    parts: [(&'static str, &'a str); N],
) -> Result<Url, Error> {
    if base.trim().is_empty() {
        return Err(Error::request("base url is empty"));
    }

    let mut url = Url::parse(base)
        .map_err(|err| Error::request(format!("failed to parse base url {base:?}: {err}")))?;

    let base_path = url.path().trim_end_matches('/').to_owned();
    url.set_path(&base_path);

    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|()| Error::request(format!("base url {base:?} cannot carry a path")))?;
        segments.pop_if_empty();

        for (what, part) in parts {
            if part.split('/').all(|segment| matches!(segment, "" | ".")) {
                return Err(Error::request(format!("{what} is empty")));
            }

            for segment in part.split('/') {
                match segment {
                    "" | "." => {}
                    ".." => {
                        segments.pop();
                    }
                    segment => {
                        segments.push(segment);
                    }
                }
            }
        }
    }

    Ok(url)
}
