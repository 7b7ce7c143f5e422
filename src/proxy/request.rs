use super::error::RequestError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RequestLine {
    pub method: String,
    pub uri: String,
    pub version: String,
}

pub(crate) fn parse_request_line(line: &str) -> Result<RequestLine, RequestError> {
    let mut parts = line.split_whitespace();
    let method = parts
        .next()
        .ok_or_else(|| RequestError::malformed("missing method in request line"))?;
    let uri = parts
        .next()
        .ok_or_else(|| RequestError::malformed("missing request target"))?;
    let version = parts
        .next()
        .ok_or_else(|| RequestError::malformed("missing HTTP version"))?;
    if parts.next().is_some() {
        return Err(RequestError::malformed(
            "unexpected data after HTTP version",
        ));
    }
    Ok(RequestLine {
        method: method.to_string(),
        uri: uri.to_string(),
        version: version.to_string(),
    })
}

/// Host, port, and path split out of an absolute-form request target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RequestTarget {
    pub host: String,
    pub port: String,
    pub path: String,
}

impl RequestTarget {
    /// Canonical cache key. Parsing fills in the default port, so
    /// `http://h/p` and `http://h:80/p` map to the same entry while
    /// distinct ports stay distinct.
    pub fn cache_key(&self) -> String {
        format!("{}:{}{}", self.host, self.port, self.path)
    }
}

/// Splits `http://host[:port]/path` into its parts. The path defaults to
/// `/` and the port to `80`; nothing else is validated here (the dialer
/// rejects ports that do not parse).
pub(crate) fn parse_absolute_uri(uri: &str) -> Result<RequestTarget, RequestError> {
    let authority_start = uri.find("//").map(|idx| idx + 2).ok_or_else(|| {
        RequestError::malformed(format!("request target '{uri}' is not an absolute http URI"))
    })?;
    let rest = &uri[authority_start..];

    let (authority, path) = match rest.find('/') {
        Some(idx) => (&rest[..idx], &rest[idx..]),
        None => (rest, "/"),
    };

    let (host, port) = match authority.find(':') {
        Some(idx) => (&authority[..idx], &authority[idx + 1..]),
        None => (authority, "80"),
    };

    Ok(RequestTarget {
        host: host.to_string(),
        port: port.to_string(),
        path: path.to_string(),
    })
}
