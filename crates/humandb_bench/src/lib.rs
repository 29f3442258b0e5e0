//! Benchmark inputs shared by the bench targets.

use humandb_protocol::{Request, Response};
use humandb_testkit::{sample_entries, sample_record};

/// An `insert` request carrying one full record.
pub fn insert_request(key: i32) -> Request {
    Request::new("insert")
        .with_key(key)
        .with_record(sample_record(key, "Benchmark"))
}

/// A `show` response listing `count` entries.
pub fn collection_response(count: usize) -> Response {
    Response::default().with_collection(sample_entries(count))
}
