use s7_client::{client::Client, tcp, transport::Connection};
use std::io::{Read, Write};
use std::net::{IpAddr, Ipv4Addr, TcpListener};
use std::thread;
use std::time::Duration;

/// Minimal fake PLC: confirms the ISO connection, negotiates a PDU length of
/// 480, then answers one `db_read` request with three canned bytes. Exercises
/// the real connect sequencer and framing loop end to end without a live PLC.
fn serve_one_connection(listener: TcpListener) {
    let (mut stream, _) = listener.accept().unwrap();
    stream.set_nodelay(true).ok();

    // 1. ISO connection request (22 bytes in, 22 bytes Connection Confirm out).
    let mut iso_cr = [0u8; 22];
    stream.read_exact(&mut iso_cr).unwrap();
    let iso_cc: [u8; 22] = [
        3, 0, 0, 22, 17, 0xD0, 0, 0, 0, 1, 0, 192, 1, 10, 193, 2, 1, 0, 194, 2, 1, 2,
    ];
    stream.write_all(&iso_cc).unwrap();

    // 2. PDU negotiation request (25 bytes in, 27 bytes out, pdu length = 480).
    let mut pdu_req = [0u8; 25];
    stream.read_exact(&mut pdu_req).unwrap();
    let mut pdu_resp = [0u8; 27];
    pdu_resp[0] = 3;
    pdu_resp[3] = 27;
    pdu_resp[4] = 2;
    pdu_resp[5] = 240;
    pdu_resp[6] = 128;
    pdu_resp[7] = 50;
    pdu_resp[25] = 0x01;
    pdu_resp[26] = 0xE0; // 480
    stream.write_all(&pdu_resp).unwrap();

    // 3. db_read(1, 1, 3, ...): 31-byte read-var request, answered with 3 bytes.
    let mut read_req = [0u8; 31];
    stream.read_exact(&mut read_req).unwrap();
    let mut read_resp = [0u8; 28];
    read_resp[0] = 3;
    read_resp[3] = 28;
    read_resp[21] = 0xFF;
    read_resp[25] = 0x00;
    read_resp[26] = 0x64;
    read_resp[27] = 0x99;
    stream.write_all(&read_resp).unwrap();
}

#[test]
fn connects_negotiates_and_reads_db() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let server = thread::spawn(move || serve_one_connection(listener));

    let addr = IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1));
    let mut opts = tcp::Options::with_port(addr, port, 0, 2, Connection::PG);
    opts.read_timeout = Duration::from_secs(2);
    opts.write_timeout = Duration::from_secs(2);
    opts.idle_timeout = Duration::from_secs(0);

    let transport = tcp::Transport::connect(opts).unwrap();
    let mut client = Client::new(transport).unwrap();

    let mut buffer = vec![0u8; 3];
    client.db_read(1, 1, 3, &mut buffer).unwrap();
    assert_eq!(buffer, vec![0x00, 0x64, 0x99]);

    server.join().unwrap();
}

/// A host with nothing listening should surface as a connect error, not a panic.
#[test]
fn connect_to_closed_port_fails() {
    let addr = IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1));
    // bind-then-drop to get a port nothing is listening on.
    let port = {
        let l = TcpListener::bind("127.0.0.1:0").unwrap();
        l.local_addr().unwrap().port()
    };
    let mut opts = tcp::Options::with_port(addr, port, 0, 2, Connection::PG);
    opts.connection_timeout = Some(Duration::from_millis(500));

    assert!(tcp::Transport::connect(opts).is_err());
}
