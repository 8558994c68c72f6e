/// Size of the legacy copier header some dumps carry in front of the ROM.
pub const COPIER_HEADER_SIZE: usize = 512;

/// Cartridge images are built from 32 KiB banks; a 512-byte residue means
/// a copier header is present.
pub const BANK_SIZE: usize = 0x8000;

/// Number of leading bytes to skip when slicing ROM data out of an image:
/// 512 if `len % 32768 == 512`, otherwise 0.
pub fn copier_header_size(len: usize) -> usize {
    if len % BANK_SIZE == COPIER_HEADER_SIZE {
        COPIER_HEADER_SIZE
    } else {
        0
    }
}

/// Match a file name against a wildcard pattern.
///
/// `*` matches any run of characters (including none) and `?` matches
/// exactly one. Matching is case-sensitive, like the manifest file names.
pub fn wildcard_match(pattern: &str, name: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let name: Vec<char> = name.chars().collect();

    let (mut p, mut n) = (0, 0);
    // Position after the last `*` seen, and the name index it was tried at
    let mut backtrack: Option<(usize, usize)> = None;

    while n < name.len() {
        match pattern.get(p) {
            Some('*') => {
                backtrack = Some((p + 1, n));
                p += 1;
            }
            Some(&c) if c == '?' || c == name[n] => {
                p += 1;
                n += 1;
            }
            _ => match backtrack {
                Some((star_p, star_n)) => {
                    p = star_p;
                    n = star_n + 1;
                    backtrack = Some((star_p, star_n + 1));
                }
                None => return false,
            },
        }
    }
    pattern[p..].iter().all(|&c| c == '*')
}

/// Format a byte count as a human-readable size string (e.g., "4 KB", "2 MB").
///
/// Values that aren't clean multiples of KB/MB are shown in bytes.
pub fn format_bytes(bytes: u64) -> String {
    if bytes >= 1024 * 1024 && bytes.is_multiple_of(1024 * 1024) {
        format!("{} MB", bytes / (1024 * 1024))
    } else if bytes >= 1024 && bytes.is_multiple_of(1024) {
        format!("{} KB", bytes / 1024)
    } else {
        format!("{} bytes", bytes)
    }
}

/// Read a fixed-length ASCII field from a ROM header.
///
/// Non-printable bytes are replaced with spaces, then the result is trimmed.
/// Header titles are padded with spaces, 0x00 or 0xFF rather than
/// null-terminated, so the whole field is processed.
pub fn read_ascii_fixed(buf: &[u8]) -> String {
    let s: String = buf
        .iter()
        .map(|&b| {
            if (0x20..0x7F).contains(&b) {
                b as char
            } else {
                ' '
            }
        })
        .collect();
    s.trim().to_string()
}
