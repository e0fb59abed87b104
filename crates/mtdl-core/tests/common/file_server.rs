//! Minimal HTTP/1.1 file server for integration tests.
//!
//! Serves a fixed set of files by path. `HEAD` answers 200 for the root and
//! known files; `GET` on a path ending in `/` returns the names directly under
//! that directory, one per line; unknown paths get 404.

use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Starts a server in a background thread. Returns the base URL
/// (e.g. "http://127.0.0.1:12345/"). The server runs until the process exits.
pub fn start(files: Vec<(String, Vec<u8>)>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let files: Arc<BTreeMap<String, Vec<u8>>> = Arc::new(
        files
            .into_iter()
            .map(|(path, body)| (path.trim_start_matches('/').to_string(), body))
            .collect(),
    );
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let files = Arc::clone(&files);
            thread::spawn(move || handle(stream, &files));
        }
    });
    format!("http://127.0.0.1:{}/", port)
}

/// A base URL nothing listens on.
pub fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/", port)
}

fn handle(mut stream: TcpStream, files: &BTreeMap<String, Vec<u8>>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let mut parts = request.lines().next().unwrap_or("").split_whitespace();
    let method = parts.next().unwrap_or("");
    let path = parts.next().unwrap_or("/").trim_start_matches('/').to_string();

    let body = if path.is_empty() || path.ends_with('/') {
        Some(listing(files, &path).into_bytes())
    } else {
        files.get(&path).cloned()
    };

    let response = match body {
        Some(body) => {
            let mut head = format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            )
            .into_bytes();
            if !method.eq_ignore_ascii_case("HEAD") {
                head.extend_from_slice(&body);
            }
            head
        }
        None => b"HTTP/1.1 404 Not Found\r\nContent-Length: 9\r\nConnection: close\r\n\r\nnot found".to_vec(),
    };
    let _ = stream.write_all(&response);
    let _ = stream.flush();
}

fn listing(files: &BTreeMap<String, Vec<u8>>, dir: &str) -> String {
    files
        .keys()
        .filter_map(|path| path.strip_prefix(dir))
        .filter(|rest| !rest.is_empty() && !rest.contains('/'))
        .map(|name| format!("{}\r\n", name))
        .collect()
}
