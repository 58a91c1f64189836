//! Physical memory detection used to bound the chunk size.

/// Total physical memory in bytes, or None when it cannot be determined on this platform.
#[cfg(target_os = "linux")]
pub(crate) fn total_memory() -> Option<u64> {
    let meminfo = std::fs::read_to_string("/proc/meminfo").ok()?;
    parse_mem_total(&meminfo)
}

#[cfg(not(target_os = "linux"))]
pub(crate) fn total_memory() -> Option<u64> {
    None
}

// Format: "MemTotal:       16384000 kB"
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_mem_total(meminfo: &str) -> Option<u64> {
    meminfo
        .lines()
        .find(|line| line.starts_with("MemTotal:"))
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|kb| kb.parse::<u64>().ok())
        .map(|kb| kb * 1024)
}

#[cfg(test)]
mod tests {
    use crate::memory::parse_mem_total;

    #[test]
    fn test_parse_mem_total() {
        let meminfo = "MemTotal:       16384000 kB\nMemFree:         1024 kB\n";
        assert_eq!(parse_mem_total(meminfo), Some(16_384_000 * 1024));
    }

    #[test]
    fn test_parse_mem_total_missing() {
        assert_eq!(parse_mem_total("MemFree:         1024 kB\n"), None);
        assert_eq!(parse_mem_total("MemTotal: lots\n"), None);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_total_memory_detected() {
        let total = crate::memory::total_memory();
        assert!(total.is_some());
        assert!(total.unwrap() > 0);
    }
}
