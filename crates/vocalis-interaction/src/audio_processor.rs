//! Wire messages of the `audio_processor.AudioProcessor` gRPC service.
//!
//! The contract lives in `proto/audio_processor.proto` at the crate root.
//! The structs below are written by hand against it so the build needs no
//! `protoc`; `test_structs_match_proto` keeps the two in step.

/// Full method path of `ProcessContent`.
pub const PROCESS_CONTENT_PATH: &str = "/audio_processor.AudioProcessor/ProcessContent";

/// `status` value of a successful response.
pub const STATUS_OK: &str = "OK";

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AudioFile {
    #[prost(bytes = "vec", tag = "1")]
    pub data: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ContentRequest {
    #[prost(string, tag = "1")]
    pub text: String,
    /// Reference voice sample.
    #[prost(message, optional, tag = "2")]
    pub audio: Option<AudioFile>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AudioResult {
    #[prost(bytes = "vec", tag = "1")]
    pub processed_audio: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProcessingResponse {
    /// `"OK"`, or `"ERROR: <detail>"` when synthesis failed server-side.
    #[prost(string, tag = "1")]
    pub status: String,
    #[prost(message, optional, tag = "2")]
    pub result: Option<AudioResult>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message;

    const PROTO: &str = include_str!("../proto/audio_processor.proto");

    // Message body lines of `name` in the checked-in contract, trimmed.
    fn proto_fields(name: &str) -> Vec<&'static str> {
        let header = format!("message {name} {{");
        PROTO
            .lines()
            .skip_while(|line| line.trim() != header)
            .skip(1)
            .take_while(|line| line.trim() != "}")
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect()
    }

    #[test]
    fn test_structs_match_proto() {
        assert!(PROTO.contains("package audio_processor;"));
        assert!(
            PROTO.contains("rpc ProcessContent (ContentRequest) returns (ProcessingResponse);")
        );
        assert_eq!(
            PROCESS_CONTENT_PATH,
            "/audio_processor.AudioProcessor/ProcessContent"
        );

        assert_eq!(proto_fields("AudioFile"), ["bytes data = 1;"]);
        assert_eq!(
            proto_fields("ContentRequest"),
            ["string text = 1;", "AudioFile audio = 2;"]
        );
        assert_eq!(
            proto_fields("AudioResult"),
            ["bytes processed_audio = 1;"]
        );
        assert_eq!(
            proto_fields("ProcessingResponse"),
            ["string status = 1;", "AudioResult result = 2;"]
        );
    }

    #[test]
    fn test_request_wire_layout() {
        let request = ContentRequest {
            text: "hi".to_string(),
            audio: Some(AudioFile {
                data: vec![0xAA, 0xBB],
            }),
        };

        // field 1 (len-delimited) "hi", field 2 { field 1 [AA BB] }
        assert_eq!(
            request.encode_to_vec(),
            vec![0x0A, 0x02, b'h', b'i', 0x12, 0x04, 0x0A, 0x02, 0xAA, 0xBB]
        );
    }

    #[test]
    fn test_decode_error_response() {
        // field 1 "ERROR: x", field 2 empty message
        let mut bytes = vec![0x0A, 0x08];
        bytes.extend_from_slice(b"ERROR: x");
        bytes.extend_from_slice(&[0x12, 0x00]);

        let response = ProcessingResponse::decode(bytes.as_slice()).unwrap();
        assert_eq!(response.status, "ERROR: x");
        assert_eq!(response.result, Some(AudioResult::default()));
    }
}
