//! Small integer hashes used for structure identity and pattern grouping.
//! All arithmetic wraps on 32 bits so hashes are stable across platforms.

pub fn hash1(i: i32) -> i32 {
    let mut a = i ^ (i >> 4);
    a = (a ^ 0xdeadbeef_u32 as i32).wrapping_add(a << 5);
    a ^ (a >> 11)
}

pub fn hash2(i: i32, j: i32) -> i32 {
    let mut a: i32 = 23;
    a = a.wrapping_mul(31).wrapping_add(i);
    a = a.wrapping_mul(31).wrapping_add(j);
    hash1(a)
}

pub fn hash3(i: i32, j: i32, k: i32) -> i32 {
    let mut a: i32 = 23;
    a = a.wrapping_mul(31).wrapping_add(i);
    a = a.wrapping_mul(31).wrapping_add(j);
    a = a.wrapping_mul(31).wrapping_add(k);
    hash1(a)
}

/// FNV-1a over 32-bit words.
pub fn hash_fnv32a(values: &[u32]) -> i32 {
    let mut hval: u32 = 0x811c9dc5;
    for &value in values {
        hval ^= value;
        hval = hval.wrapping_add(
            (hval << 1)
                .wrapping_add(hval << 4)
                .wrapping_add(hval << 7)
                .wrapping_add(hval << 8)
                .wrapping_add(hval << 24),
        );
    }
    hval as i32
}
