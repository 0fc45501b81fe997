use std::{
    io::{BufRead, BufReader, Write},
    net::TcpListener,
    thread,
};

use crate::http_client::configure_http_client;

/// Answers a single HTTP request on a loopback port with the given status
/// and body. Returns the base URL.
pub fn serve_once(status: u16, reason: &'static str, body: &'static str) -> String {
    configure_http_client(|cfg| cfg.proxy = None);

    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    thread::spawn(move || {
        let Ok((stream, _)) = listener.accept() else {
            return;
        };
        let mut reader = BufReader::new(stream);
        let mut line = String::new();
        while reader.read_line(&mut line).is_ok_and(|n| n > 0) {
            if line == "\r\n" || line == "\n" {
                break;
            }
            line.clear();
        }

        let mut stream = reader.into_inner();
        let _ = write!(
            stream,
            "HTTP/1.1 {status} {reason}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let _ = stream.flush();
    });

    format!("http://{addr}")
}
