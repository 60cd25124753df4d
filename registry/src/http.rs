//! Shared HTTP agent and bounded response helpers for the remote stores.

use std::{
    io::{self, Read},
    sync::OnceLock,
    time::Duration,
};

use crate::{RegistryErr, Result};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const READ_TIMEOUT: Duration = Duration::from_secs(60);
const WRITE_TIMEOUT: Duration = Duration::from_secs(60);

/// Largest object body the stores will read into memory.
pub const MAX_OBJECT_BYTES: usize = 256 * 1024 * 1024;

/// Largest error body kept for diagnostics.
const MAX_ERROR_BYTES: usize = 4 * 1024;

/// Returns a shared HTTP agent with consistent timeouts.
pub(crate) fn agent() -> &'static ureq::Agent {
    static AGENT: OnceLock<ureq::Agent> = OnceLock::new();
    AGENT.get_or_init(|| {
        ureq::AgentBuilder::new()
            .timeout_connect(CONNECT_TIMEOUT)
            .timeout_read(READ_TIMEOUT)
            .timeout_write(WRITE_TIMEOUT)
            .build()
    })
}

/// Reads a response into memory, enforcing a maximum byte size.
pub(crate) fn read_response_bytes(response: ureq::Response, max_bytes: usize) -> io::Result<Vec<u8>> {
    check_content_length(&response, max_bytes)?;
    let reader = response.into_reader();
    let mut limited = reader.take(max_bytes as u64 + 1);
    let mut bytes = Vec::new();
    limited.read_to_end(&mut bytes)?;
    if bytes.len() > max_bytes {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Response exceeded {max_bytes} bytes"),
        ));
    }
    Ok(bytes)
}

/// Turns a non-success status into a `RegistryErr::Http`, keeping a bounded copy of the body.
pub(crate) fn status_error(status: u16, response: ureq::Response) -> RegistryErr {
    let body = read_response_bytes(response, MAX_ERROR_BYTES)
        .map(|bytes| String::from_utf8_lossy(&bytes).trim().to_string())
        .unwrap_or_else(|err| err.to_string());
    RegistryErr::Http { status, body }
}

/// Sends a prepared request, splitting failures into status and transport errors.
///
/// # Returns
/// The response, `Ok(None)` for a 404 when `missing_ok` is set, or the failure.
pub(crate) fn send<F>(missing_ok: bool, call: F) -> Result<Option<ureq::Response>>
where
    F: FnOnce() -> std::result::Result<ureq::Response, ureq::Error>,
{
    match call() {
        Ok(response) => Ok(Some(response)),
        Err(ureq::Error::Status(404, _)) if missing_ok => Ok(None),
        Err(ureq::Error::Status(code, response)) => Err(status_error(code, response)),
        Err(ureq::Error::Transport(err)) => Err(err.into()),
    }
}

fn check_content_length(response: &ureq::Response, max_bytes: usize) -> io::Result<()> {
    let Some(length) = response.header("Content-Length") else {
        return Ok(());
    };
    let Ok(length) = length.parse::<u64>() else {
        return Ok(());
    };
    if length > max_bytes as u64 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Response too large: {length} bytes"),
        ));
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::{test_server::*, *};

    #[test]
    fn read_response_bytes_rejects_content_length_over_max() {
        let (url, server) = serve_once(response("200 OK", &"a".repeat(100)));
        let response = agent().get(&url).call().unwrap();
        let err = read_response_bytes(response, 10).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        server.join().unwrap();
    }

    #[test]
    fn read_response_bytes_accepts_under_limit() {
        let (url, server) = serve_once(response("200 OK", "hello"));
        let response = agent().get(&url).call().unwrap();
        let bytes = read_response_bytes(response, 16).unwrap();
        assert_eq!(bytes, b"hello");
        server.join().unwrap();
    }

    #[test]
    fn send_maps_missing_objects_and_statuses() {
        let (url, server) = serve_once(response("404 Not Found", "nope"));
        let res = send(true, || agent().get(&url).call()).unwrap();
        assert!(res.is_none());
        server.join().unwrap();

        let (url, server) = serve_once(response("403 Forbidden", "denied"));
        let err = send(true, || agent().get(&url).call()).unwrap_err();
        assert!(matches!(err, RegistryErr::Http { status: 403, ref body } if body == "denied"));
        server.join().unwrap();
    }

    #[test]
    fn send_reports_unreachable_hosts_as_transport_errors() {
        // bind then drop to get a port nobody listens on
        let addr = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap();
        let url = format!("http://{addr}");
        let err = send(false, || agent().get(&url).call()).unwrap_err();
        assert!(matches!(err, RegistryErr::Transport(_)));
    }
}
