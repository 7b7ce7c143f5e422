use tokio::io::{AsyncRead, BufReader};

use super::MAX_LINE;
use super::error::{RequestError, Side};
use super::io_util::read_line;
use super::request::RequestTarget;

/// Fixed User-Agent presented to origins regardless of what the client sent.
pub const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:10.0.3) Gecko/20120305 Firefox/10.0.3";

const HOST_FIELD: &[u8] = b"host:";
const USER_AGENT_FIELD: &[u8] = b"user-agent:";
const CONNECTION_FIELD: &[u8] = b"connection:";
const PROXY_CONNECTION_FIELD: &[u8] = b"proxy-connection:";

/// Consumes the client's header block and assembles the origin-bound one:
/// request line, Host (the client's own line verbatim when present), the
/// fixed User-Agent, pass-through fields in arrival order, then the close
/// overrides and the blank line.
pub(crate) async fn build_upstream_header<S>(
    reader: &mut BufReader<S>,
    target: &RequestTarget,
) -> Result<Vec<u8>, RequestError>
where
    S: AsyncRead + Unpin,
{
    let mut host_line: Option<Vec<u8>> = None;
    let mut passthrough: Vec<u8> = Vec::new();
    let mut line = Vec::new();

    loop {
        match read_line(reader, &mut line, Side::Client, MAX_LINE).await {
            Ok(_) => {}
            Err(RequestError::EndOfStream { .. }) => {
                return Err(RequestError::malformed(
                    "client header block is missing the terminating blank line",
                ));
            }
            Err(err) => return Err(err),
        }

        if is_blank(&line) {
            break;
        }

        if field_name_matches(&line, HOST_FIELD) {
            host_line = Some(line.clone());
        } else if field_name_matches(&line, USER_AGENT_FIELD)
            || field_name_matches(&line, CONNECTION_FIELD)
            || field_name_matches(&line, PROXY_CONNECTION_FIELD)
        {
            // Replaced by the fixed overrides below.
        } else {
            passthrough.extend_from_slice(&line);
        }
    }

    let mut header = Vec::with_capacity(256 + passthrough.len());
    header.extend_from_slice(format!("GET {} HTTP/1.0\r\n", target.path).as_bytes());
    match host_line {
        Some(line) => header.extend_from_slice(&line),
        None => header
            .extend_from_slice(format!("Host: {}:{}\r\n", target.host, target.port).as_bytes()),
    }
    header.extend_from_slice(format!("User-Agent: {USER_AGENT}\r\n").as_bytes());
    header.extend_from_slice(&passthrough);
    header.extend_from_slice(b"Connection: close\r\n");
    header.extend_from_slice(b"Proxy-Connection: close\r\n");
    header.extend_from_slice(b"\r\n");
    Ok(header)
}

fn is_blank(line: &[u8]) -> bool {
    line.iter().all(|byte| *byte == b'\r' || *byte == b'\n')
}

/// Case-insensitive match on the field name including its colon, so names
/// that merely begin with a known field (e.g. `Hostile:`) pass through.
fn field_name_matches(line: &[u8], name: &[u8]) -> bool {
    line.len() >= name.len() && line[..name.len()].eq_ignore_ascii_case(name)
}
