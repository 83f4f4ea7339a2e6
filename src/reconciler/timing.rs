//! Timeout arithmetic on the wrapping `u32` millisecond clock.

/// `true` once strictly more than `timeout_ms` has elapsed since `since`.
///
/// When `since > now` the clock has wrapped (or the timestamp is from the
/// future); that case is treated as "not yet expired" until `now` catches
/// up, so a wrap can never fire a spurious timeout.
pub fn expired(since: u32, now: u32, timeout_ms: u32) -> bool {
    since <= now && now - since > timeout_ms
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_is_exclusive() {
        assert!(!expired(1_000, 6_000, 5_000));
        assert!(expired(1_000, 6_001, 5_000));
    }

    #[test]
    fn same_instant_never_expires() {
        assert!(!expired(42, 42, 0));
    }

    #[test]
    fn wrapped_clock_is_not_expired() {
        // Event recorded just before the wrap, evaluated just after it.
        assert!(!expired(u32::MAX - 10, 20_000, 5_000));
    }
}
