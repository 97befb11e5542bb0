//! Trace and span identifier generation.

use uuid::Uuid;

/// A new trace id: 32 lowercase hex characters.
pub fn new_trace_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// A new span id: 16 lowercase hex characters.
pub fn new_span_id() -> String {
    format!("{:016x}", rand::random::<u64>())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_hex(s: &str) -> bool {
        s.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase())
    }

    #[test]
    fn test_id_shapes() {
        let trace_id = new_trace_id();
        let span_id = new_span_id();
        assert_eq!(trace_id.len(), 32);
        assert_eq!(span_id.len(), 16);
        assert!(is_hex(&trace_id));
        assert!(is_hex(&span_id));
    }

    #[test]
    fn test_ids_differ() {
        assert_ne!(new_trace_id(), new_trace_id());
        assert_ne!(new_span_id(), new_span_id());
    }
}
