use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Duration;

/// A request as seen by [`serve_json_once`].
#[derive(Debug)]
pub struct CapturedRequest {
    pub request_line: String,
    pub body: String,
}

impl CapturedRequest {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("request body is JSON")
    }
}

pub struct JsonStub {
    pub url: String,
    requests: Receiver<CapturedRequest>,
}

impl JsonStub {
    pub fn request(&self) -> CapturedRequest {
        self.requests
            .recv_timeout(Duration::from_secs(5))
            .expect("stub saw a request")
    }
}

/// Answer exactly one request with `status` and a JSON `body`.
pub fn serve_json_once(status: u16, body: &str) -> JsonStub {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub");
    let addr = listener.local_addr().expect("stub addr");
    let response = format!(
        "HTTP/1.1 {status} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    let (tx, requests) = mpsc::channel();
    thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let captured = read_request(&mut stream);
            let _ = stream.write_all(response.as_bytes());
            let _ = tx.send(captured);
        }
    });
    JsonStub {
        url: format!("http://{addr}"),
        requests,
    }
}

fn read_request(stream: &mut impl Read) -> CapturedRequest {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    let header_end = loop {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => break None,
            Ok(read) => data.extend_from_slice(&buf[..read]),
        }
        if let Some(pos) = data.windows(4).position(|window| window == b"\r\n\r\n") {
            break Some(pos + 4);
        }
    };
    let header_end = header_end.unwrap_or(data.len());
    let head = String::from_utf8_lossy(&data[..header_end]).to_string();
    let content_length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);
    let chunked = head.to_ascii_lowercase().contains("transfer-encoding: chunked");
    if chunked {
        while !data[header_end..].windows(5).any(|window| window == b"0\r\n\r\n") {
            match stream.read(&mut buf) {
                Ok(0) | Err(_) => break,
                Ok(read) => data.extend_from_slice(&buf[..read]),
            }
        }
        return CapturedRequest {
            request_line: head.lines().next().unwrap_or_default().to_string(),
            body: decode_chunked(&data[header_end..]),
        };
    }
    while data.len() < header_end + content_length {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => break,
            Ok(read) => data.extend_from_slice(&buf[..read]),
        }
    }
    let body_end = (header_end + content_length).min(data.len());
    CapturedRequest {
        request_line: head.lines().next().unwrap_or_default().to_string(),
        body: String::from_utf8_lossy(&data[header_end..body_end]).to_string(),
    }
}

fn decode_chunked(mut raw: &[u8]) -> String {
    let mut body = Vec::new();
    while let Some(line_end) = raw.windows(2).position(|window| window == b"\r\n") {
        let size_text = String::from_utf8_lossy(&raw[..line_end]).to_string();
        let size = usize::from_str_radix(size_text.trim(), 16).unwrap_or(0);
        raw = &raw[line_end + 2..];
        if size == 0 || raw.len() < size {
            break;
        }
        body.extend_from_slice(&raw[..size]);
        raw = raw.get(size + 2..).unwrap_or_default();
    }
    String::from_utf8_lossy(&body).to_string()
}
