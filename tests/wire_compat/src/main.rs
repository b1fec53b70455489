fn main() {
    println!("Run `cargo test -p wire-compat` to execute wire compatibility tests.");
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use filedock_protocol::{PUT_ACK, Reply, TransferRequest, Verb};
    use filedock_transfer::{
        Framing, RetryPolicy, TransferOptions, listing_payload, recv_listing, recv_stream,
        send_listing, send_stream,
    };

    /// Returns the path to the fixtures directory.
    fn fixtures_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
    }

    /// Loads a fixture as raw bytes, exactly as it appears on the wire.
    fn load_fixture(name: &str) -> Vec<u8> {
        let path = fixtures_dir().join(name);
        fs::read(&path)
            .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()))
    }

    fn opts(framing: Framing) -> TransferOptions {
        TransferOptions {
            retry: RetryPolicy::immediate(3),
            framing,
        }
    }

    // -----------------------------------------------------------------------
    // Handshake
    // -----------------------------------------------------------------------

    #[test]
    fn request_lines() {
        let cases = [
            ("put_request.bin", TransferRequest::put("report.txt")),
            ("get_request.bin", TransferRequest::get("report.txt")),
            ("list_request.bin", TransferRequest::list()),
        ];
        for (fixture, request) in cases {
            let bytes = load_fixture(fixture);
            assert_eq!(request.to_line().as_bytes(), bytes, "encode {fixture}");
            assert_eq!(
                TransferRequest::parse(&bytes).unwrap(),
                request,
                "decode {fixture}"
            );
        }
    }

    #[test]
    fn list_request_parses_to_list_verb() {
        let request = TransferRequest::parse(&load_fixture("list_request.bin")).unwrap();
        assert_eq!(request.verb(), Verb::List);
        assert_eq!(request.filename(), None);
    }

    #[test]
    fn replies() {
        let cases = [
            ("reply_ok.bin", Reply::Ok),
            ("reply_file_not_found.bin", Reply::file_not_found()),
            ("reply_file_exists.bin", Reply::file_exists()),
        ];
        for (fixture, reply) in cases {
            let bytes = load_fixture(fixture);
            assert_eq!(reply.as_str().as_bytes(), bytes, "encode {fixture}");
            assert_eq!(Reply::parse(&bytes).unwrap(), reply, "decode {fixture}");
        }
    }

    #[test]
    fn put_acknowledgement() {
        assert_eq!(PUT_ACK.as_bytes(), load_fixture("put_ack.bin"));
    }

    // -----------------------------------------------------------------------
    // Listing frames
    // -----------------------------------------------------------------------

    #[test]
    fn listing_of_two_files() {
        let expected = load_fixture("listing_two_files.bin");
        assert_eq!(listing_payload(&["a.txt", "b.txt"]).as_bytes(), expected);
    }

    #[test]
    fn listing_of_empty_directory() {
        let empty: [&str; 0] = [];
        assert_eq!(
            listing_payload(&empty).as_bytes(),
            load_fixture("listing_empty.bin")
        );
    }

    #[tokio::test]
    async fn listing_sent_and_received() {
        let mut wire = Vec::new();
        send_listing(&mut wire, &["a.txt", "b.txt"], &RetryPolicy::immediate(3))
            .await
            .unwrap();
        assert_eq!(wire, load_fixture("listing_two_files.bin"));

        let mut conn = &wire[..];
        let names = recv_listing(&mut conn, &RetryPolicy::immediate(3))
            .await
            .unwrap();
        assert_eq!(names, vec!["a.txt", "b.txt"]);

        let empty = load_fixture("listing_empty.bin");
        let mut conn = &empty[..];
        assert!(
            recv_listing(&mut conn, &RetryPolicy::immediate(3))
                .await
                .unwrap()
                .is_empty()
        );
    }

    // -----------------------------------------------------------------------
    // File streams
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn sentinel_stream() {
        let source = fixtures_dir().join("sample.txt");
        let mut wire = Vec::new();
        send_stream(&mut wire, &source, &opts(Framing::Sentinel))
            .await
            .unwrap();
        assert_eq!(wire, load_fixture("stream_sentinel.bin"));

        let fixture = load_fixture("stream_sentinel.bin");
        let mut conn = &fixture[..];
        let mut out = Vec::new();
        recv_stream(&mut conn, &mut out, &opts(Framing::Sentinel))
            .await
            .unwrap();
        assert_eq!(out, load_fixture("sample.txt"));
    }

    #[tokio::test]
    async fn length_prefixed_stream() {
        let source = fixtures_dir().join("sample.txt");
        let mut wire = Vec::new();
        send_stream(&mut wire, &source, &opts(Framing::LengthPrefixed))
            .await
            .unwrap();
        assert_eq!(wire, load_fixture("stream_length_prefixed.bin"));

        let fixture = load_fixture("stream_length_prefixed.bin");
        let mut conn = &fixture[..];
        let mut out = Vec::new();
        recv_stream(&mut conn, &mut out, &opts(Framing::LengthPrefixed))
            .await
            .unwrap();
        assert_eq!(out, load_fixture("sample.txt"));
    }

    #[tokio::test]
    async fn received_stream_written_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.txt");
        let fixture = load_fixture("stream_sentinel.bin");
        let mut conn = &fixture[..];

        filedock_transfer::recv_stream_to_path(&mut conn, &dest, &opts(Framing::Sentinel))
            .await
            .unwrap();
        assert_eq!(fs::read(&dest).unwrap(), load_fixture("sample.txt"));
    }
}
