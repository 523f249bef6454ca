//! Scripted-server helpers shared by the client tests.

use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::thread;

use beanqueue::{Config, Connection};

/// Spawn a minimal scripted beanstalkd: accept one connection, then for
/// each scripted response read one command line (plus the payload line
/// for put) and write the response verbatim. The connection closes when
/// the script runs out.
pub fn scripted_server(responses: Vec<Vec<u8>>) -> (String, thread::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind failed");
    let addr = listener.local_addr().expect("no local addr").to_string();

    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().expect("accept failed");
        let mut reader = BufReader::new(stream.try_clone().expect("clone failed"));
        let mut writer = stream;
        for response in responses {
            let mut line = String::new();
            reader.read_line(&mut line).expect("read command failed");
            if line.starts_with("put ") {
                let mut payload = String::new();
                reader.read_line(&mut payload).expect("read payload failed");
            }
            writer.write_all(&response).expect("write response failed");
            writer.flush().expect("flush failed");
        }
    });

    (addr, handle)
}

pub fn connect(addr: &str) -> Connection {
    let config = Config::builder().server_addr(addr).build();
    Connection::connect(&config).expect("connect failed")
}
