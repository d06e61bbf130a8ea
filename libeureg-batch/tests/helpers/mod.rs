#![allow(dead_code)]

mod mock_transport;

pub use mock_transport::{MockTransport, RecordingErrorSink};
