use std::sync::atomic::{AtomicUsize, Ordering};

static COUNTER: AtomicUsize = AtomicUsize::new(1);

/// Unique DOM id for pairing a `<label for>` with its control.
pub fn use_random_id_for(element: &str) -> String {
    let n = COUNTER.fetch_add(1, Ordering::SeqCst);
    format!("{element}_engage_{n}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique_and_prefixed() {
        let a = use_random_id_for("contact_name");
        let b = use_random_id_for("contact_name");
        assert_ne!(a, b);
        assert!(a.starts_with("contact_name_engage_"));
    }
}
